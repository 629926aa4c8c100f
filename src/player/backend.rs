use std::path::Path;

use crate::error::PlaybackError;

/// Audio output used by the playback engine.
///
/// `load` prepares a track paused; `play` starts or resumes it.
pub trait AudioBackend: Send {
    fn load(&mut self, path: &Path) -> Result<(), PlaybackError>;

    fn play(&mut self);

    fn pause(&mut self);

    /// `volume` is a linear gain in `0.0..=1.0`.
    fn set_volume(&mut self, volume: f32);

    /// Returns `true` once for each loaded track that played to its end.
    fn take_finished(&mut self) -> bool;
}
