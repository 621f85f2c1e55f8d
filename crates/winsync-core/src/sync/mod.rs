//! Cross-device sync through a remote object store.

pub mod backends;
mod engine;
mod errors;
mod record;
mod traits;
mod types;

pub use backends::{DirectoryRemoteStore, MemoryRemoteStore};
pub use engine::SyncEngine;
pub use errors::{RemoteError, SyncError};
pub use record::{
    ARRANGEMENT_RECORD_TYPE, FIELD_CREATED_AT, FIELD_NAME, FIELD_ORIGIN_DEVICE, FIELD_TAGS,
    FIELD_UPDATED_AT, FIELD_WINDOWS, FieldValue, Predicate, RecordId, RemoteRecord,
    SortDescriptor,
};
pub use traits::{AccountStatus, RemoteStore};
pub use types::{SyncOutcome, SyncPhase, SyncReport, SyncStatus};
