//! Read path over the snapshot tables written by the ingestion process.

mod memory_store;
mod pg_store;
mod query_spec;
mod snapshot_store;

pub use memory_store::{MemorySnapshotStore, SnapshotFixture};
pub use pg_store::PgSnapshotStore;
pub use query_spec::SnapshotQuery;
pub use snapshot_store::{SnapshotStore, StoreError};
