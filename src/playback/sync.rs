use std::path::{Path, PathBuf};

use crate::audio::analysis;
use crate::audio::decode::{self, SignalData};
use crate::audio::spectrum::{SliceSet, SpectrumSlice};
use crate::error::Result;
use crate::playback::timing;

/// Where a playback session currently stands. Analysis runs exactly once, on
/// the first play request; `Finished` keeps the slice set so the same track
/// can be replayed without re-analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Armed,
    Playing,
    Paused,
    Finished,
}

/// Loads the signal to analyze. File-backed in production; tests substitute
/// synthetic sources.
pub trait SignalSource {
    fn load(&mut self, path: &Path) -> Result<SignalData>;
}

/// Decodes from disk via the audio loader.
pub struct FileLoader;

impl SignalSource for FileLoader {
    fn load(&mut self, path: &Path) -> Result<SignalData> {
        decode::decode_signal(path)
    }
}

/// External playback engine. The controller only commands transport and
/// reads position/duration; decoding and output are the engine's business.
pub trait PlaybackEngine {
    fn set_source(&mut self, path: &Path);
    fn set_volume(&mut self, volume: u8);
    fn play(&mut self);
    fn pause(&mut self);
    fn position_ms(&self) -> u64;
    fn duration_ms(&self) -> u64;
}

/// External periodic tick source firing every refresh interval.
pub trait TickSource {
    fn start(&mut self);
    fn stop(&mut self);
}

/// Render surface for slices. `playback_finished` tells the sink to reset
/// its position display when the track ends.
pub trait DisplaySink {
    fn show_slice(&mut self, slice: &SpectrumSlice);
    fn show_full(&mut self, frequencies: &[f32], power: &[f32]);
    fn playback_finished(&mut self) {}
}

/// Orchestrates analyzer output against playback events: arms the analysis
/// on first play, then maps every tick and position change to the matching
/// precomputed slice and pushes it to the display sink.
///
/// The slice set is owned per controller instance and rebuilt only through
/// an explicit [`SyncController::reload`].
pub struct SyncController<L, P, T, D> {
    loader: L,
    player: P,
    ticker: T,
    display: D,
    source: PathBuf,
    refresh_interval_ms: u32,
    volume: u8,
    state: SessionState,
    slices: Option<SliceSet>,
    analyzed_duration_ms: u64,
}

impl<L, P, T, D> SyncController<L, P, T, D>
where
    L: SignalSource,
    P: PlaybackEngine,
    T: TickSource,
    D: DisplaySink,
{
    pub fn new(
        loader: L,
        player: P,
        ticker: T,
        display: D,
        source: PathBuf,
        refresh_interval_ms: u32,
        volume: u8,
    ) -> Self {
        Self {
            loader,
            player,
            ticker,
            display,
            source,
            refresh_interval_ms,
            volume: volume.min(100),
            state: SessionState::Idle,
            slices: None,
            analyzed_duration_ms: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn slices(&self) -> Option<&SliceSet> {
        self.slices.as_ref()
    }

    pub fn slice_count(&self) -> usize {
        self.slices().map_or(0, SliceSet::len)
    }

    /// Track duration derived from the analyzed signal; available once armed.
    pub fn analyzed_duration_ms(&self) -> u64 {
        self.analyzed_duration_ms
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    pub fn ticker(&self) -> &T {
        &self.ticker
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Single play/pause transport control.
    ///
    /// The first request from `Idle` blocks on decode + analysis before
    /// playback starts; a failed load leaves the controller `Idle` with the
    /// player untouched. From `Paused` or `Finished`, playback resumes
    /// against the already-computed slice set.
    pub fn toggle_play(&mut self) -> Result<()> {
        match self.state {
            SessionState::Idle => {
                self.arm()?;
                self.start_playing();
            }
            SessionState::Playing => {
                self.ticker.stop();
                self.player.pause();
                self.state = SessionState::Paused;
            }
            SessionState::Armed | SessionState::Paused | SessionState::Finished => {
                self.start_playing();
            }
        }
        Ok(())
    }

    fn arm(&mut self) -> Result<()> {
        let signal = self.loader.load(&self.source)?;
        self.analyzed_duration_ms = signal.duration_ms();
        self.slices = Some(analysis::analyze(&signal, self.refresh_interval_ms));
        self.player.set_source(&self.source);
        let volume = self.volume;
        self.set_volume(volume);
        self.state = SessionState::Armed;
        Ok(())
    }

    fn start_playing(&mut self) {
        self.player.play();
        self.ticker.start();
        self.state = SessionState::Playing;
    }

    /// Periodic refresh: reads the live position from the player and pushes
    /// the matching slice.
    pub fn on_tick(&mut self) {
        if self.state != SessionState::Playing {
            return;
        }
        let position = self.player.position_ms();
        self.push_slice(position);
    }

    /// Position-changed notification from the playback engine. Also the
    /// end-of-track trigger: at or past the duration the ticks stop, the
    /// sink is told to reset, and the session parks in `Finished`.
    pub fn on_position_changed(&mut self, position_ms: u64) {
        if self.state != SessionState::Playing {
            return;
        }
        self.push_slice(position_ms);

        let duration = self.effective_duration_ms();
        if duration > 0 && position_ms >= duration {
            self.ticker.stop();
            self.display.playback_finished();
            self.state = SessionState::Finished;
        }
    }

    /// Live volume control, forwarded straight to the player.
    pub fn set_volume(&mut self, volume: u8) {
        self.volume = volume.min(100);
        self.player.set_volume(self.volume);
    }

    /// Pushes the full concatenated spectrum for the on-demand plot.
    pub fn request_full_plot(&mut self) {
        if let Some(slices) = &self.slices {
            let full = slices.concat();
            self.display.show_full(&full.frequencies, &full.power);
        }
    }

    /// Switches to a new source, discarding any in-flight session state.
    /// Allowed in every state; the next play request re-runs analysis.
    pub fn reload(&mut self, source: PathBuf) {
        self.ticker.stop();
        if self.state == SessionState::Playing {
            self.player.pause();
        }
        self.slices = None;
        self.analyzed_duration_ms = 0;
        self.source = source;
        self.state = SessionState::Idle;
    }

    fn effective_duration_ms(&self) -> u64 {
        let reported = self.player.duration_ms();
        if reported > 0 {
            reported
        } else {
            self.analyzed_duration_ms
        }
    }

    fn push_slice(&mut self, position_ms: u64) {
        let Some(slices) = self.slices.as_ref() else {
            return;
        };
        let index = timing::slice_index(position_ms, slices.refresh_interval_ms(), slices.len());
        if let Some(slice) = slices.get(index) {
            self.display.show_slice(slice);
        }
    }
}
