use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::sync::errors::RemoteError;
use crate::sync::record::{Predicate, RecordId, RemoteRecord, SortDescriptor};
use crate::sync::traits::{AccountStatus, RemoteStore};

#[derive(Debug)]
struct MemoryRemoteState {
    status: AccountStatus,
    offline: bool,
    records: Vec<RemoteRecord>,
    unreadable: Vec<RecordId>,
    requests: usize,
}

/// In-process remote store for tests and dry runs.
#[derive(Debug)]
pub struct MemoryRemoteStore {
    state: Mutex<MemoryRemoteState>,
}

impl Default for MemoryRemoteStore {
    fn default() -> Self {
        Self {
            state: Mutex::new(MemoryRemoteState {
                status: AccountStatus::Available,
                offline: false,
                records: Vec::new(),
                unreadable: Vec::new(),
                requests: 0,
            }),
        }
    }
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_account_status(&self, status: AccountStatus) {
        self.lock().status = status;
    }

    /// Make every request other than `account_status` fail.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Seed a record without counting a request.
    pub fn insert(&self, record: RemoteRecord) {
        let mut state = self.lock();
        state.records.retain(|r| r.id != record.id);
        state.records.push(record);
    }

    /// Report a record that exists but cannot be read.
    pub fn insert_unreadable(&self, id: RecordId) {
        self.lock().unreadable.push(id);
    }

    pub fn records(&self) -> Vec<RemoteRecord> {
        self.lock().records.clone()
    }

    /// Number of requests received, `account_status` included.
    pub fn request_count(&self) -> usize {
        self.lock().requests
    }

    fn lock(&self) -> MutexGuard<'_, MemoryRemoteState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn begin_request(&self) -> Result<MutexGuard<'_, MemoryRemoteState>, RemoteError> {
        let mut state = self.lock();
        state.requests += 1;
        if state.offline {
            return Err(RemoteError::Unavailable {
                message: "remote store is offline".to_string(),
            });
        }
        Ok(state)
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn account_status(&self) -> Result<AccountStatus, RemoteError> {
        let mut state = self.lock();
        state.requests += 1;
        Ok(state.status)
    }

    async fn create(&self, record: RemoteRecord) -> Result<RecordId, RemoteError> {
        let mut state = self.begin_request()?;
        let id = record.id.clone();
        state.records.retain(|r| r.id != id);
        state.records.push(record);
        Ok(id)
    }

    async fn query(
        &self,
        record_type: &str,
        predicate: &Predicate,
        sort: &SortDescriptor,
    ) -> Result<Vec<Result<RemoteRecord, RemoteError>>, RemoteError> {
        let state = self.begin_request()?;
        let mut matching: Vec<RemoteRecord> = state
            .records
            .iter()
            .filter(|r| r.record_type == record_type && predicate.matches(r))
            .cloned()
            .collect();
        matching.sort_by(|a, b| sort.compare(a, b));

        let unreadable = state.unreadable.iter().map(|id| {
            Err(RemoteError::DecodeFailed {
                id: id.to_string(),
                reason: "record payload is unreadable".to_string(),
            })
        });
        Ok(matching.into_iter().map(Ok).chain(unreadable).collect())
    }

    async fn delete(&self, id: &RecordId) -> Result<(), RemoteError> {
        let mut state = self.begin_request()?;
        let before = state.records.len();
        state.records.retain(|r| r.id != *id);
        if state.records.len() == before {
            return Err(RemoteError::NotFound { id: id.to_string() });
        }
        Ok(())
    }
}
