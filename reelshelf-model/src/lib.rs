//! Core data model definitions shared across reelshelf crates.
#![allow(missing_docs)]

pub mod filter;
pub mod listing;
pub mod query;
pub mod record;

// Intentionally curated re-exports for downstream consumers.
pub use filter::FilterRequest;
pub use listing::{
    DirectoryListing, DurationsResponse, FolderEntry, MediaDuration,
    MediaEntry,
};
pub use query::{DirContentsQuery, PathQuery, ProgressUpdate};
pub use record::MetadataRecord;
