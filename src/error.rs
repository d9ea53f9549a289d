use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, SpectraError>;

/// Errors produced by the analysis core. Playback-engine failures are the
/// collaborator's responsibility and never appear here.
#[derive(Debug, thiserror::Error)]
pub enum SpectraError {
    /// The audio file is missing, corrupt, or in an unsupported format.
    #[error("unreadable audio file {}: {}", .path.display(), .reason)]
    UnreadableFile { path: PathBuf, reason: String },
}

impl SpectraError {
    pub fn unreadable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::UnreadableFile {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
