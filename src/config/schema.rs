use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/jukebox/config.toml` or `~/.config/jukebox/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `JUKEBOX__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub library: LibrarySettings,
    pub acquire: AcquireSettings,
    pub playback: PlaybackSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Directory holding finished, playable tracks.
    pub songs_dir: PathBuf,
    /// Directory holding in-flight downloads before promotion.
    pub staging_dir: PathBuf,
    /// Audio file extension of promoted tracks (without dot).
    pub extension: String,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            songs_dir: PathBuf::from("songs"),
            staging_dir: PathBuf::from("temp"),
            extension: "mp3".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AcquireSettings {
    /// Maximum number of resolve+fetch jobs running at once during a batch.
    pub concurrency: usize,
    /// Search results page queried by the resolver.
    pub search_url: String,
    /// Query-string parameter carrying the search text.
    pub search_param: String,
    /// Watch page prefix; the extracted video id is appended.
    pub watch_url: String,
    /// External downloader invoked by the fetcher.
    pub fetcher_program: String,
    /// Codec passed to the downloader's audio extraction.
    pub audio_format: String,
    /// Quality passed to the downloader's audio extraction.
    pub audio_quality: String,
}

impl AcquireSettings {
    /// File extension the downloader produces for `audio_format`, if known.
    pub fn staged_extension(&self) -> Option<&'static str> {
        match self.audio_format.trim().to_ascii_lowercase().as_str() {
            "mp3" => Some("mp3"),
            "m4a" | "alac" => Some("m4a"),
            "opus" => Some("opus"),
            "vorbis" | "ogg" => Some("ogg"),
            "flac" => Some("flac"),
            "wav" => Some("wav"),
            _ => None,
        }
    }
}

impl Default for AcquireSettings {
    fn default() -> Self {
        Self {
            concurrency: 10,
            search_url: "https://www.youtube.com/results".to_string(),
            search_param: "search_query".to_string(),
            watch_url: "https://www.youtube.com/watch?v=".to_string(),
            fetcher_program: "yt-dlp".to_string(),
            audio_format: "mp3".to_string(),
            audio_quality: "192".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// How often the auto-advance loop checks for a finished track (milliseconds).
    pub poll_interval_ms: u64,
    /// Whether shuffle starts enabled.
    pub shuffle: bool,
    /// Initial volume, 0 to 100.
    pub volume: u8,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            shuffle: false,
            volume: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing` filter directive used when `RUST_LOG` is not set.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}
