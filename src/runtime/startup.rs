use crate::config;
use crate::player::PlaybackEngine;

/// Apply the configured initial volume and shuffle mode to a fresh engine.
pub fn apply_playback_defaults(engine: &mut PlaybackEngine, settings: &config::PlaybackSettings) {
    if let Err(e) = engine.set_volume(i64::from(settings.volume)) {
        tracing::warn!(error = %e, "ignoring configured volume");
    }
    if settings.shuffle && !engine.state().is_shuffling {
        engine.toggle_shuffle();
    }
}
