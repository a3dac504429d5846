//! Path resolution for intervox data files.

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Platform-appropriate locations for intervox data.
///
/// # Directory Structure
///
/// ```text
/// ~/.local/share/intervox/
/// └── snapshots/               # One JSON file per interview
///     └── <interview-id>.json
/// ```
pub struct IntervoxPaths;

impl IntervoxPaths {
    /// Returns the intervox data directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to data directory (e.g., `~/.local/share/intervox/`)
    /// - `Err(PathError::HomeDirNotFound)`: Could not determine directory
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join("intervox"))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the dialogue snapshot directory.
    pub fn snapshots_dir() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("snapshots"))
    }
}
