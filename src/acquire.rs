//! Song acquisition: resolve free-text queries to remote sources, fetch them
//! into staging and promote the results into the library.
//!
//! Batches run their network work on a bounded pool of worker threads and
//! promote the staged files one at a time once every job has finished.

mod fetcher;
mod job;
mod pipeline;
mod query_list;
mod resolver;

pub use fetcher::{Fetcher, YtDlpFetcher};
pub use job::{AcquireObserver, BatchReport, DownloadJob, JobOutcome, Silent};
pub use pipeline::AcquisitionPipeline;
pub use query_list::{DedupedQueries, dedup_queries, parse_query_list};
pub use resolver::{Locator, Resolver, WebSearchResolver};
