use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::Track;
use super::sanitize::sanitize_title;

/// The authoritative set of tracks on disk.
///
/// The songs directory is the single source of truth for which tracks exist;
/// every listing is read fresh from disk. Only promotion writes into it.
#[derive(Debug, Clone)]
pub struct LibraryStore {
    songs_dir: PathBuf,
    staging_dir: PathBuf,
    extension: String,
}

impl LibraryStore {
    pub fn new(
        songs_dir: impl Into<PathBuf>,
        staging_dir: impl Into<PathBuf>,
        extension: &str,
    ) -> Self {
        Self {
            songs_dir: songs_dir.into(),
            staging_dir: staging_dir.into(),
            extension: extension.trim().trim_start_matches('.').to_string(),
        }
    }

    pub fn from_settings(settings: &LibrarySettings) -> Self {
        Self::new(
            settings.songs_dir.clone(),
            settings.staging_dir.clone(),
            &settings.extension,
        )
    }

    /// Create the songs and staging directories if they are missing.
    pub fn ensure_dirs(&self) -> io::Result<()> {
        fs::create_dir_all(&self.songs_dir)?;
        fs::create_dir_all(&self.staging_dir)
    }

    pub fn songs_dir(&self) -> &Path {
        &self.songs_dir
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    fn is_track_file(&self, path: &Path) -> bool {
        path.is_file()
            && path
                .extension()
                .and_then(|s| s.to_str())
                .map(|ext| ext == self.extension)
                .unwrap_or(false)
    }

    /// Titles of all tracks in directory-listing order (sorted by file stem).
    pub fn titles(&self) -> Vec<String> {
        let mut titles: Vec<String> = WalkDir::new(&self.songs_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| self.is_track_file(e.path()))
            .filter_map(|e| {
                e.path()
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .map(str::to_string)
            })
            .collect();
        titles.sort();
        titles
    }

    /// Number of tracks currently on disk.
    pub fn len(&self) -> usize {
        self.titles().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn track_path(&self, title: &str) -> PathBuf {
        self.songs_dir.join(format!("{title}.{}", self.extension))
    }

    pub fn contains(&self, title: &str) -> bool {
        self.track_path(title).is_file()
    }

    /// Create an empty staging directory for one download job.
    ///
    /// Leftovers from an earlier run with the same name are discarded.
    pub fn job_staging_dir(&self, job_id: usize) -> io::Result<PathBuf> {
        let dir = self.staging_dir.join(format!("job-{job_id}"));
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Remove a job's staging directory and anything the fetcher left in it.
    pub fn discard_job_dir(&self, dir: &Path) {
        if !dir.starts_with(&self.staging_dir) || dir == self.staging_dir {
            return;
        }
        if let Err(e) = fs::remove_dir_all(dir) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(dir = %dir.display(), error = %e, "failed to clean staging dir");
            }
        }
    }

    /// Pick a title that is free in the songs directory.
    ///
    /// Collisions get a numeric suffix: `name`, `name2`, `name3`, ...
    pub fn unique_title(&self, base: &str) -> String {
        if !self.contains(base) {
            return base.to_string();
        }
        let mut n = 2usize;
        loop {
            let candidate = format!("{base}{n}");
            if !self.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Move a staged download into the library under a sanitized, unique title.
    ///
    /// Callers must serialize promotions; two concurrent calls could pick
    /// the same free title. A staged file whose extension differs from the
    /// library's is rejected and left in place.
    pub fn promote(&self, staged: &Path) -> io::Result<Track> {
        let ext = staged.extension().and_then(|s| s.to_str()).unwrap_or("");
        if !ext.eq_ignore_ascii_case(&self.extension) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "staged file {} is not a .{} file",
                    staged.display(),
                    self.extension
                ),
            ));
        }

        let raw = staged
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let title = self.unique_title(&sanitize_title(&raw));
        let target = self.track_path(&title);

        move_file(staged, &target)?;

        Ok(Track {
            title,
            path: target,
        })
    }
}

fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        // Staging and songs may live on different filesystems.
        Err(_) => {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
    }
}
