//! Error types shared across the jukebox.
//!
//! Every error here is recoverable: the runtime prints it and keeps the
//! command loop running.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the playback engine.
#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("a song is already playing")]
    AlreadyPlaying,

    #[error("no song is currently playing")]
    NotPlaying,

    #[error("no songs available")]
    EmptyPlaylist,

    #[error("invalid song index {index} (library has {len} songs)")]
    InvalidIndex { index: usize, len: usize },

    #[error("volume level must be between 0 and 100, got {0}")]
    OutOfRange(i64),

    /// The backend could not open or decode the file.
    #[error("failed to load {}: {reason}", .path.display())]
    Load { path: PathBuf, reason: String },

    #[error("audio output unavailable: {0}")]
    Device(String),
}

/// Errors for a single acquisition job.
#[derive(Error, Debug)]
pub enum AcquireError {
    #[error("no results found for \"{0}\"")]
    NotFound(String),

    #[error("search failed: {0}")]
    Resolve(String),

    #[error("download failed: {0}")]
    Fetch(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that abort a whole batch before any job is dispatched.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("cannot read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no songs found in {}", .0.display())]
    NoQueryList(PathBuf),
}

/// Malformed interactive commands.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("invalid command \"{0}\", type 'help' for available commands")]
    Unknown(String),

    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),

    #[error("\"{0}\" is not a number")]
    InvalidNumber(String),
}
