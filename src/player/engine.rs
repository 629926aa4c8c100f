//! The playback state machine.
//!
//! `PlaybackEngine` owns the playlist (a snapshot of the library directory),
//! the current index and the play/shuffle flags. Callers share it behind a
//! single mutex so the auto-advance loop and user commands never interleave.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::PlaybackError;
use crate::library::{LibraryStore, MetadataReader, format_duration};

use super::backend::AudioBackend;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Navigation and transport flags owned by the engine.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct PlaybackState {
    /// Position in the playlist; only meaningful when the playlist is non-empty.
    pub current_index: usize,
    pub is_playing: bool,
    pub is_shuffling: bool,
}

pub struct PlaybackEngine {
    store: LibraryStore,
    backend: Box<dyn AudioBackend>,
    playlist: Vec<String>,
    state: PlaybackState,
    /// Whether the backend currently holds a track that `play` can resume.
    loaded: bool,
    volume: u8,
    rng: StdRng,
}

impl PlaybackEngine {
    /// Create an engine over `store` and load the initial playlist.
    pub fn new(store: LibraryStore, backend: Box<dyn AudioBackend>) -> Self {
        let mut engine = Self {
            store,
            backend,
            playlist: Vec::new(),
            state: PlaybackState::default(),
            loaded: false,
            volume: 100,
            rng: StdRng::from_os_rng(),
        };
        engine.refresh();
        engine
    }

    /// Replace the random source, e.g. with a seeded one.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn playlist(&self) -> &[String] {
        &self.playlist
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Rebuild the playlist from the library directory.
    ///
    /// The current index follows the current title if it still exists and is
    /// clamped into range otherwise.
    pub fn refresh(&mut self) {
        let current = self.current_title().map(str::to_string);
        self.playlist = self.store.titles();
        self.reindex(current.as_deref());
    }

    fn reindex(&mut self, previous_title: Option<&str>) {
        let len = self.playlist.len();
        let found = previous_title.and_then(|t| self.playlist.iter().position(|p| p == t));
        self.state.current_index = match found {
            Some(i) => i,
            None => self.state.current_index.min(len.saturating_sub(1)),
        };
    }

    fn current_title(&self) -> Option<&str> {
        self.playlist
            .get(self.state.current_index)
            .map(String::as_str)
    }

    /// Resume playback, or start the current track if nothing is loaded yet.
    pub fn play(&mut self) -> Result<(), PlaybackError> {
        if self.state.is_playing {
            return Err(PlaybackError::AlreadyPlaying);
        }
        if !self.loaded {
            if self.playlist.is_empty() {
                return Err(PlaybackError::EmptyPlaylist);
            }
            return self.play_current();
        }
        self.backend.play();
        self.state.is_playing = true;
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), PlaybackError> {
        if !self.state.is_playing {
            return Err(PlaybackError::NotPlaying);
        }
        self.backend.pause();
        self.state.is_playing = false;
        Ok(())
    }

    /// Move to the next or previous track and play it.
    ///
    /// In shuffle mode both directions draw a uniformly random index, which
    /// may be the current one.
    pub fn advance(&mut self, direction: Direction) -> Result<(), PlaybackError> {
        let len = self.playlist.len();
        if len == 0 {
            return Err(PlaybackError::EmptyPlaylist);
        }

        let i = self.state.current_index;
        self.state.current_index = if self.state.is_shuffling {
            self.rng.random_range(0..len)
        } else {
            match direction {
                Direction::Next => (i + 1) % len,
                Direction::Previous => (i + len - 1) % len,
            }
        };
        self.play_current()
    }

    /// Play the track at `index` of the freshly refreshed playlist.
    pub fn select_index(&mut self, index: usize) -> Result<(), PlaybackError> {
        self.refresh();
        let len = self.playlist.len();
        if len == 0 {
            return Err(PlaybackError::EmptyPlaylist);
        }
        if index >= len {
            return Err(PlaybackError::InvalidIndex { index, len });
        }
        self.state.current_index = index;
        self.play_current()
    }

    /// Flip shuffle mode and return the new setting.
    ///
    /// Turning it on permutes the playlist once; turning it off restores
    /// directory order.
    pub fn toggle_shuffle(&mut self) -> bool {
        self.state.is_shuffling = !self.state.is_shuffling;
        if self.state.is_shuffling {
            let current = self.current_title().map(str::to_string);
            self.playlist.shuffle(&mut self.rng);
            self.reindex(current.as_deref());
        } else {
            self.refresh();
        }
        self.state.is_shuffling
    }

    /// Set the output volume from a 0-100 level.
    pub fn set_volume(&mut self, level: i64) -> Result<(), PlaybackError> {
        let level = u8::try_from(level)
            .ok()
            .filter(|l| *l <= 100)
            .ok_or(PlaybackError::OutOfRange(level))?;
        self.backend.set_volume(f32::from(level) / 100.0);
        self.volume = level;
        Ok(())
    }

    /// All tracks in directory order with a `HH:MM:SS` duration, or `None`
    /// when the duration cannot be read.
    pub fn list_tracks(&self, reader: &dyn MetadataReader) -> Vec<(String, Option<String>)> {
        self.store
            .titles()
            .into_iter()
            .map(|title| {
                let duration = reader
                    .duration_of(&self.store.track_path(&title))
                    .map(format_duration);
                (title, duration)
            })
            .collect()
    }

    pub fn current_track(&self) -> Option<(usize, &str)> {
        self.current_title().map(|t| (self.state.current_index, t))
    }

    /// Auto-advance after the backend reported the end of a track.
    pub fn on_track_finished(&mut self) -> Result<(), PlaybackError> {
        self.state.is_playing = false;
        self.loaded = false;
        self.advance(Direction::Next)
    }

    /// Check the backend for a finished track and auto-advance if so.
    ///
    /// Returns `None` when nothing finished since the last poll.
    pub fn poll_finished(&mut self) -> Option<Result<(), PlaybackError>> {
        if self.backend.take_finished() {
            Some(self.on_track_finished())
        } else {
            None
        }
    }

    fn play_current(&mut self) -> Result<(), PlaybackError> {
        let Some(title) = self.current_title() else {
            return Err(PlaybackError::EmptyPlaylist);
        };
        let path = self.store.track_path(title);

        match self.backend.load(&path) {
            Ok(()) => {
                self.backend.play();
                self.loaded = true;
                self.state.is_playing = true;
                tracing::debug!(index = self.state.current_index, path = %path.display(), "playing");
                Ok(())
            }
            Err(e) => {
                self.loaded = false;
                self.state.is_playing = false;
                tracing::warn!(error = %e, "load failed");
                Err(e)
            }
        }
    }
}
