use std::path::PathBuf;

/// A playable song in the library, named by its sanitized title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub title: String,
    pub path: PathBuf,
}
