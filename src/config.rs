//! Configuration loader and schema types.
//!
//! This module exposes the configuration schema used to drive the library
//! layout, the download pipeline and playback, plus helpers to load it.

mod load;
mod schema;

pub use schema::*;
