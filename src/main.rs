mod audio;
mod cli;
mod config;
mod error;
mod playback;

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use cli::Cli;
use playback::headless::{HeadlessPlayer, ManualTicker, TerminalSink};
use playback::sync::{FileLoader, PlaybackEngine, SyncController};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    // Load config: explicit --config path, or auto-detect spectra.toml / global config
    let config_path = cli.config.clone().or_else(|| {
        let local = std::path::PathBuf::from("spectra.toml");
        if local.exists() {
            return Some(local);
        }
        if let Some(home) = dirs::home_dir() {
            let xdg = home.join(".config").join("spectra").join("config.toml");
            if xdg.exists() {
                return Some(xdg);
            }
        }
        None
    });

    let cfg = match config_path {
        Some(ref path) => match config::load_config(path) {
            Some(cfg) => {
                log::info!("Loaded config from {}", path.display());
                cfg
            }
            None => {
                log::warn!("Failed to load config from {}", path.display());
                config::Config::default()
            }
        },
        None => config::Config::default(),
    };

    // Merge: config values apply only when CLI is at its default
    if cli.refresh_interval == 500 {
        cli.refresh_interval = cfg.playback.refresh_interval_ms;
    }
    if cli.volume == 30 {
        cli.volume = cfg.playback.volume;
    }
    let input = cli.input.clone().unwrap_or(cfg.audio.path);

    if cli.refresh_interval == 0 {
        anyhow::bail!("Refresh interval must be positive");
    }
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    log::info!("spectra - offline spectrum display synced to playback");
    log::info!("Input: {}", input.display());
    log::info!("Refresh interval: {}ms, volume: {}", cli.refresh_interval, cli.volume);

    let mut controller = SyncController::new(
        FileLoader,
        HeadlessPlayer::new(),
        ManualTicker::new(),
        TerminalSink::new(cli.plot_out.clone()),
        input,
        cli.refresh_interval,
        cli.volume,
    );

    // First play request: blocking decode + analysis, then playback starts.
    controller.toggle_play()?;

    let duration_ms = controller.analyzed_duration_ms().max(1);
    controller.player_mut().set_duration_ms(duration_ms);
    log::debug!(
        "player armed: source {:?}, volume {}",
        controller.player().source(),
        controller.player().volume()
    );

    let total_slices = controller.slice_count();
    log::info!(
        "Total slices: {}, Duration: {:.1}s",
        total_slices,
        duration_ms as f64 / 1000.0
    );

    let pb = ProgressBar::new(total_slices as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} slices ({eta} remaining)")
            .unwrap()
            .progress_chars("=>-"),
    );

    // Replay the session in lockstep: the loop stands in for the timer,
    // seeking the scripted player one refresh interval at a time and firing
    // a tick plus a position event per step, until the position event
    // crosses the duration and the controller stops the tick source.
    let interval = u64::from(cli.refresh_interval);
    let mut position = 0u64;
    while controller.ticker().is_running() {
        controller.player_mut().seek(position);
        controller.on_tick();
        controller.on_position_changed(position);
        pb.set_position((position / interval).min(total_slices as u64));
        position += interval;
    }
    pb.finish_with_message("playback complete");

    // A real engine stops itself at end of stream.
    if controller.player().is_playing() {
        controller.player_mut().pause();
    }

    if cli.plot_out.is_some() {
        controller.request_full_plot();
    }

    log::info!(
        "Done: {} slice updates pushed across {} slices",
        controller.display().slices_shown(),
        total_slices
    );
    Ok(())
}
