use crate::error::AcquireError;
use crate::library::Track;

use super::resolver::Locator;

/// Terminal (or not yet terminal) state of a download job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Pending,
    Succeeded(Track),
    Failed(String),
}

/// One distinct query in a batch.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    pub id: usize,
    pub query: String,
    pub locator: Option<Locator>,
    pub outcome: JobOutcome,
}

impl DownloadJob {
    pub fn new(id: usize, query: String) -> Self {
        Self {
            id,
            query,
            locator: None,
            outcome: JobOutcome::Pending,
        }
    }

    pub(super) fn fail(&mut self, err: &AcquireError) {
        self.outcome = JobOutcome::Failed(err.to_string());
    }
}

/// Result of `acquire_batch`: every distinct query with its outcome, plus the
/// submitted items that never became jobs.
///
/// `succeeded() + failed() + duplicates + blank` equals the number of
/// submitted items.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub jobs: Vec<DownloadJob>,
    pub duplicates: usize,
    pub blank: usize,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.jobs
            .iter()
            .filter(|j| matches!(j.outcome, JobOutcome::Succeeded(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.jobs
            .iter()
            .filter(|j| matches!(j.outcome, JobOutcome::Failed(_)))
            .count()
    }

    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.jobs.iter().filter_map(|j| match &j.outcome {
            JobOutcome::Succeeded(t) => Some(t),
            _ => None,
        })
    }
}

/// Progress hooks for user-facing output. All methods default to no-ops.
///
/// Called from worker threads, hence `Sync`.
pub trait AcquireObserver: Sync {
    fn job_started(&self, _job_id: usize, _query: &str) {}

    fn job_failed(&self, _query: &str, _err: &AcquireError) {}

    /// `count` is the library size right after this promotion.
    fn promoted(&self, _count: usize, _track: &Track) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl AcquireObserver for Silent {}
