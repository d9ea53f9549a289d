//! Offline stand-ins for the external collaborators, used by the command
//! line driver: a scripted playback engine, a tick flag the driver loop
//! advances by hand, and a display sink that logs slices and can dump the
//! full spectrum as JSON.

use std::path::{Path, PathBuf};

use crate::audio::spectrum::SpectrumSlice;
use crate::playback::sync::{DisplaySink, PlaybackEngine, TickSource};

/// Playback engine whose position is driven by the caller instead of a real
/// audio device.
pub struct HeadlessPlayer {
    position_ms: u64,
    duration_ms: u64,
    volume: u8,
    playing: bool,
    source: Option<PathBuf>,
}

impl HeadlessPlayer {
    pub fn new() -> Self {
        Self {
            position_ms: 0,
            duration_ms: 0,
            volume: 0,
            playing: false,
            source: None,
        }
    }

    pub fn seek(&mut self, position_ms: u64) {
        self.position_ms = position_ms;
    }

    pub fn set_duration_ms(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

impl Default for HeadlessPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackEngine for HeadlessPlayer {
    fn set_source(&mut self, path: &Path) {
        log::debug!("player source: {}", path.display());
        self.source = Some(path.to_path_buf());
        self.position_ms = 0;
    }

    fn set_volume(&mut self, volume: u8) {
        self.volume = volume;
    }

    fn play(&mut self) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn position_ms(&self) -> u64 {
        self.position_ms
    }

    fn duration_ms(&self) -> u64 {
        self.duration_ms
    }
}

/// Tick source reduced to a running flag; the driver loop takes the place
/// of the timer thread a GUI would own.
pub struct ManualTicker {
    running: bool,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self { running: false }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Default for ManualTicker {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for ManualTicker {
    fn start(&mut self) {
        self.running = true;
    }

    fn stop(&mut self) {
        self.running = false;
    }
}

/// Display sink for terminal runs: logs the dominant bin of each slice and
/// writes the full spectrum to a JSON file on request.
pub struct TerminalSink {
    plot_out: Option<PathBuf>,
    slices_shown: usize,
}

impl TerminalSink {
    pub fn new(plot_out: Option<PathBuf>) -> Self {
        Self {
            plot_out,
            slices_shown: 0,
        }
    }

    pub fn slices_shown(&self) -> usize {
        self.slices_shown
    }
}

impl DisplaySink for TerminalSink {
    fn show_slice(&mut self, slice: &SpectrumSlice) {
        self.slices_shown += 1;

        let peak = slice
            .power
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal));
        if let Some((idx, power)) = peak {
            log::debug!(
                "slice update: peak {:.1}Hz power {:.3e} ({} bins)",
                slice.frequencies[idx],
                power,
                slice.power.len()
            );
        }
    }

    fn show_full(&mut self, frequencies: &[f32], power: &[f32]) {
        let Some(path) = &self.plot_out else {
            return;
        };
        let payload = serde_json::json!({
            "frequencies": frequencies,
            "power": power,
        });
        match std::fs::write(path, payload.to_string()) {
            Ok(()) => log::info!("Wrote full spectrum ({} bins) to {}", power.len(), path.display()),
            Err(e) => log::warn!("Failed to write spectrum to {}: {}", path.display(), e),
        }
    }

    fn playback_finished(&mut self) {
        log::info!("Playback finished, position display reset");
    }
}
