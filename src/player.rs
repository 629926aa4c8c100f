//! Playback: the engine state machine and the audio backends it drives.

mod backend;
mod engine;
mod rodio_backend;

pub use backend::AudioBackend;
pub use engine::{Direction, PlaybackEngine, PlaybackState};
pub use rodio_backend::RodioBackend;
