//! Metadata cache and directory-query engine for reelshelf.
//!
//! Files are keyed by a [`FileIdentity`] derived from their name and size,
//! so cached measurements follow a file wherever it is moved. The
//! [`MetadataStore`] keeps watch progress and durations in memory and writes
//! a flat snapshot back on a debounced schedule. Missing durations are
//! probed through [`DurationResolver`] with a small concurrency limit, and
//! listings can be narrowed with the fuzzy matcher in [`filter`].
//!
//! [`MediaLibrary`] is the entry point used by the HTTP layer.
#![allow(missing_docs)]

pub mod durations;
pub mod error;
pub mod filter;
pub mod identity;
pub mod library;
pub mod listing;
pub mod media_type;
pub mod metadata;
pub mod probe;

pub use durations::{DEFAULT_PROBE_CONCURRENCY, DurationResolver};
pub use error::{MediaError, Result};
pub use filter::{CompiledFilter, FilterError, passes_filter};
pub use identity::{FileIdentity, IdentityError};
pub use library::MediaLibrary;
pub use listing::{DirectoryLister, FsDirectoryLister, ListedEntry};
pub use media_type::is_media_file;
pub use metadata::{FlushPolicy, MetadataStore};
pub use probe::{DurationProbe, FfprobeDurationProbe, ProbeError};
