use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::AcquireSettings;
use crate::error::AcquireError;

use super::resolver::Locator;

/// Downloads a located resource into `dest_dir` as a playable audio file.
pub trait Fetcher: Send + Sync {
    /// Returns the path of the staged file inside `dest_dir`.
    fn fetch(&self, locator: &Locator, dest_dir: &Path) -> Result<PathBuf, AcquireError>;
}

/// `Fetcher` that shells out to `yt-dlp` and extracts the audio track.
#[derive(Debug, Clone)]
pub struct YtDlpFetcher {
    program: String,
    audio_format: String,
    audio_quality: String,
}

impl YtDlpFetcher {
    pub fn new(settings: &AcquireSettings) -> Self {
        Self {
            program: settings.fetcher_program.clone(),
            audio_format: settings.audio_format.clone(),
            audio_quality: settings.audio_quality.clone(),
        }
    }

    fn command(&self, locator: &Locator, dest_dir: &Path) -> Command {
        let template = dest_dir.join("%(title)s.%(ext)s");
        let mut cmd = Command::new(&self.program);
        cmd.args(["--quiet", "--no-warnings", "--no-playlist"])
            .args(["--format", "bestaudio/best", "--extract-audio"])
            .args(["--audio-format", &self.audio_format])
            .args(["--audio-quality", &self.audio_quality])
            .arg("--output")
            .arg(template)
            .arg(locator.as_str());
        cmd
    }
}

impl Fetcher for YtDlpFetcher {
    fn fetch(&self, locator: &Locator, dest_dir: &Path) -> Result<PathBuf, AcquireError> {
        tracing::debug!(%locator, dest = %dest_dir.display(), program = %self.program, "fetching");

        let output = self
            .command(locator, dest_dir)
            .output()
            .map_err(|e| AcquireError::Fetch(format!("cannot run {}: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("downloader exited with an error")
                .trim()
                .to_string();
            return Err(AcquireError::Fetch(reason));
        }

        staged_file(dest_dir)?
            .ok_or_else(|| AcquireError::Fetch(format!("{locator} produced no audio file")))
    }
}

/// The finished file in a job's staging directory, ignoring partial downloads.
pub(crate) fn staged_file(dir: &Path) -> Result<Option<PathBuf>, AcquireError> {
    let mut found: Option<(std::time::SystemTime, PathBuf)> = None;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() || is_partial(&path) {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(std::time::UNIX_EPOCH);
        if found.as_ref().is_none_or(|(t, _)| modified > *t) {
            found = Some((modified, path));
        }
    }
    Ok(found.map(|(_, p)| p))
}

fn is_partial(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("part" | "ytdl" | "temp" | "tmp")
    )
}
