//! Persistent metadata cache keyed by [`FileIdentity`](crate::identity::FileIdentity).

mod flush;
mod snapshot;
mod store;

pub use flush::{DebouncedFlush, FlushPolicy, FlushTarget};
pub use snapshot::{
    ABSENT, SnapshotFile, SnapshotLineError, decode_line, encode_line,
    parse_snapshot, render_snapshot,
};
pub use store::MetadataStore;
