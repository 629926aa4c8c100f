//! The on-disk song library: finished tracks plus a staging area for
//! downloads that have not been promoted yet.

mod metadata;
mod model;
mod sanitize;
mod store;

pub use metadata::{LoftyMetadata, MetadataReader, format_duration};
pub use model::Track;
pub use sanitize::sanitize_title;
pub use store::LibraryStore;
