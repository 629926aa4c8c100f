//! Track metadata used for display only.

use std::path::Path;
use std::time::Duration;

use lofty::file::AudioFile;

/// Reports the duration of an audio file.
pub trait MetadataReader {
    /// Returns `None` when the file cannot be read or has no usable properties.
    fn duration_of(&self, path: &Path) -> Option<Duration>;
}

/// `MetadataReader` backed by lofty's property parsing.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyMetadata;

impl MetadataReader for LoftyMetadata {
    fn duration_of(&self, path: &Path) -> Option<Duration> {
        match lofty::read_from_path(path) {
            Ok(tagged) => Some(tagged.properties().duration()),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "no duration available");
                None
            }
        }
    }
}

/// Format a duration as `HH:MM:SS`.
pub fn format_duration(d: Duration) -> String {
    let total = d.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
