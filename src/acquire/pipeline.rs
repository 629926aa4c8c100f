use std::collections::VecDeque;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;

use crate::config::Settings;
use crate::error::{AcquireError, BatchError};
use crate::library::{LibraryStore, Track};

use super::fetcher::{Fetcher, YtDlpFetcher};
use super::job::{AcquireObserver, BatchReport, DownloadJob, JobOutcome};
use super::query_list::{DedupedQueries, dedup_queries, parse_query_list};
use super::resolver::{Locator, Resolver, WebSearchResolver};

/// A fetched file waiting in its job's staging directory.
struct Staged {
    dir: PathBuf,
    file: PathBuf,
}

/// What a worker hands back for one job.
struct Fetched {
    slot: usize,
    locator: Option<Locator>,
    result: Result<Staged, AcquireError>,
}

/// Resolves, fetches and promotes songs into a `LibraryStore`.
///
/// This is the only writer of new files into the songs directory. Promotions
/// go through `promote_lock`, so the library size observed after each one is
/// exact even when several acquisitions overlap.
pub struct AcquisitionPipeline {
    store: LibraryStore,
    resolver: Arc<dyn Resolver>,
    fetcher: Arc<dyn Fetcher>,
    concurrency: usize,
    next_job: AtomicUsize,
    promote_lock: Mutex<()>,
}

impl AcquisitionPipeline {
    pub fn new(
        store: LibraryStore,
        resolver: Arc<dyn Resolver>,
        fetcher: Arc<dyn Fetcher>,
        concurrency: usize,
    ) -> Self {
        Self {
            store,
            resolver,
            fetcher,
            concurrency: concurrency.max(1),
            next_job: AtomicUsize::new(1),
            promote_lock: Mutex::new(()),
        }
    }

    /// Build the pipeline with the web search resolver and `yt-dlp` fetcher.
    pub fn from_settings(settings: &Settings) -> Result<Self, AcquireError> {
        let resolver = WebSearchResolver::new(&settings.acquire)?;
        let fetcher = YtDlpFetcher::new(&settings.acquire);
        Ok(Self::new(
            LibraryStore::from_settings(&settings.library),
            Arc::new(resolver),
            Arc::new(fetcher),
            settings.acquire.concurrency,
        ))
    }

    pub fn store(&self) -> &LibraryStore {
        &self.store
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    fn next_job_id(&self) -> usize {
        self.next_job.fetch_add(1, Ordering::Relaxed)
    }

    /// Resolve, fetch and promote a single query, synchronously.
    pub fn acquire_one(
        &self,
        query: &str,
        observer: &dyn AcquireObserver,
    ) -> Result<Track, AcquireError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AcquireError::NotFound(String::new()));
        }

        let job_id = self.next_job_id();
        observer.job_started(job_id, query);

        let (_, fetched) = self.resolve_and_fetch(job_id, query);
        let result = fetched.and_then(|staged| self.promote(&staged, observer));
        if let Err(e) = &result {
            tracing::warn!(job = job_id, query, error = %e, "acquisition failed");
            observer.job_failed(query, e);
        }
        result
    }

    /// Acquire every distinct query, running at most `concurrency` fetches at once.
    ///
    /// Returns after every job has succeeded or failed. Failures are recorded
    /// per job and never stop sibling jobs.
    pub fn acquire_batch(&self, queries: &[String], observer: &dyn AcquireObserver) -> BatchReport {
        let DedupedQueries {
            unique,
            duplicates,
            blank,
        } = dedup_queries(queries);
        let mut jobs: Vec<DownloadJob> = unique
            .into_iter()
            .map(|q| DownloadJob::new(self.next_job_id(), q))
            .collect();

        tracing::info!(
            jobs = jobs.len(),
            duplicates,
            blank,
            width = self.concurrency,
            "starting batch"
        );

        let staged = self.fetch_all(&jobs, observer);

        // Single-writer phase: every fetch has finished, promote one at a time.
        for Fetched {
            slot,
            locator,
            result,
        } in staged
        {
            let job = &mut jobs[slot];
            job.locator = locator;
            match result.and_then(|s| self.promote(&s, observer)) {
                Ok(track) => job.outcome = JobOutcome::Succeeded(track),
                Err(e) => {
                    tracing::warn!(job = job.id, query = %job.query, error = %e, "job failed");
                    observer.job_failed(&job.query, &e);
                    job.fail(&e);
                }
            }
        }

        let report = BatchReport {
            jobs,
            duplicates,
            blank,
        };
        tracing::info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            duplicates = report.duplicates,
            blank = report.blank,
            "batch finished"
        );
        report
    }

    /// Read a query-list file and run it as a batch.
    pub fn acquire_batch_file(
        &self,
        path: &Path,
        observer: &dyn AcquireObserver,
    ) -> Result<BatchReport, BatchError> {
        let content = fs::read_to_string(path).map_err(|source| BatchError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let queries =
            parse_query_list(&content).ok_or_else(|| BatchError::NoQueryList(path.to_path_buf()))?;
        Ok(self.acquire_batch(&queries, observer))
    }

    /// Run resolve+fetch for all jobs on a bounded pool and wait for all of them.
    ///
    /// Results come back sorted by job slot.
    fn fetch_all(&self, jobs: &[DownloadJob], observer: &dyn AcquireObserver) -> Vec<Fetched> {
        if jobs.is_empty() {
            return Vec::new();
        }

        let width = self.concurrency.min(jobs.len());
        let queue: Mutex<VecDeque<(usize, usize, &str)>> = Mutex::new(
            jobs.iter()
                .enumerate()
                .map(|(slot, j)| (slot, j.id, j.query.as_str()))
                .collect(),
        );
        let (tx, rx) = mpsc::channel::<Fetched>();

        thread::scope(|scope| {
            for _ in 0..width {
                let tx = tx.clone();
                let queue = &queue;
                scope.spawn(move || {
                    loop {
                        let next = queue
                            .lock()
                            .unwrap_or_else(|e| e.into_inner())
                            .pop_front();
                        let Some((slot, job_id, query)) = next else {
                            break;
                        };

                        observer.job_started(job_id, query);
                        let (locator, result) = panic::catch_unwind(AssertUnwindSafe(|| {
                            self.resolve_and_fetch(job_id, query)
                        }))
                        .unwrap_or_else(|_| {
                            (None, Err(AcquireError::Fetch("download job panicked".to_string())))
                        });

                        if tx
                            .send(Fetched {
                                slot,
                                locator,
                                result,
                            })
                            .is_err()
                        {
                            break;
                        }
                    }
                });
            }
        });
        drop(tx);

        let mut fetched: Vec<Fetched> = rx.into_iter().collect();
        fetched.sort_by_key(|f| f.slot);
        fetched
    }

    fn resolve_and_fetch(
        &self,
        job_id: usize,
        query: &str,
    ) -> (Option<Locator>, Result<Staged, AcquireError>) {
        let locator = match self.resolver.resolve(query) {
            Ok(l) => l,
            Err(e) => return (None, Err(e)),
        };
        tracing::debug!(job = job_id, query, %locator, "resolved");

        let dir = match self.store.job_staging_dir(job_id) {
            Ok(d) => d,
            Err(e) => return (Some(locator), Err(e.into())),
        };

        match self.fetcher.fetch(&locator, &dir) {
            Ok(file) => (Some(locator), Ok(Staged { dir, file })),
            Err(e) => {
                self.store.discard_job_dir(&dir);
                (Some(locator), Err(e))
            }
        }
    }

    fn promote(&self, staged: &Staged, observer: &dyn AcquireObserver) -> Result<Track, AcquireError> {
        let _guard = self.promote_lock.lock().unwrap_or_else(|e| e.into_inner());

        let promoted = self.store.promote(&staged.file);
        self.store.discard_job_dir(&staged.dir);
        let track = promoted?;

        let count = self.store.len();
        tracing::info!(count, title = %track.title, "downloaded");
        observer.promoted(count, &track);
        Ok(track)
    }
}
