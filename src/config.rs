use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub audio: AudioConfig,
}

#[derive(Debug, Deserialize)]
pub struct PlaybackConfig {
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u32,
    #[serde(default = "default_volume")]
    pub volume: u8,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_audio_path")]
    pub path: PathBuf,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: default_refresh_interval_ms(),
            volume: default_volume(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            path: default_audio_path(),
        }
    }
}

fn default_refresh_interval_ms() -> u32 { 500 }
fn default_volume() -> u8 { 30 }
fn default_audio_path() -> PathBuf { PathBuf::from("sample.wav") }

pub fn load_config(path: &PathBuf) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}
