use async_trait::async_trait;

use super::errors::RemoteError;
use super::record::{Predicate, RecordId, RemoteRecord, SortDescriptor};

/// Whether the remote account can be used right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Available,
    NoAccount,
    Restricted,
    CouldNotDetermine,
}

/// A remote object store shared between devices.
///
/// `query` fails as a whole only when the store cannot be read at all; a
/// single unreadable record comes back as an `Err` entry.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    fn name(&self) -> &'static str;

    async fn account_status(&self) -> Result<AccountStatus, RemoteError>;

    /// Create the record, replacing any record with the same id.
    async fn create(&self, record: RemoteRecord) -> Result<RecordId, RemoteError>;

    async fn query(
        &self,
        record_type: &str,
        predicate: &Predicate,
        sort: &SortDescriptor,
    ) -> Result<Vec<Result<RemoteRecord, RemoteError>>, RemoteError>;

    /// Fails with `RemoteError::NotFound` if no record has this id.
    async fn delete(&self, id: &RecordId) -> Result<(), RemoteError>;
}
