use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "spectra", about = "Offline power-spectrum display synced to audio playback")]
pub struct Cli {
    /// Input audio file (16-bit PCM WAV)
    pub input: Option<PathBuf>,

    /// Display refresh interval in milliseconds
    #[arg(long, default_value_t = 500)]
    pub refresh_interval: u32,

    /// Initial playback volume (0-100)
    #[arg(long, default_value_t = 30)]
    pub volume: u8,

    /// Write the full power spectrum as JSON after playback
    #[arg(long)]
    pub plot_out: Option<PathBuf>,

    /// Config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
