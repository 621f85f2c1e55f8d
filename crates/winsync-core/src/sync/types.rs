use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::arrangement::Arrangement;

use super::errors::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    Idle,
    Authorizing,
    Fetching,
    Merging,
}

impl std::fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let phase = match self {
            SyncPhase::Idle => "idle",
            SyncPhase::Authorizing => "authorizing",
            SyncPhase::Fetching => "fetching",
            SyncPhase::Merging => "merging",
        };
        f.write_str(phase)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncStatus {
    pub phase: SyncPhase,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

#[derive(Debug)]
pub enum SyncOutcome {
    Completed,
    /// Another session was already running; nothing was done.
    Dropped,
    Failed(SyncError),
}

#[derive(Debug)]
pub struct SyncReport {
    pub outcome: SyncOutcome,
    /// Remote arrangements added locally, in fetched order.
    pub adopted: Vec<Arrangement>,
    /// Remote arrangements whose id already existed locally.
    pub kept_local: usize,
    /// Remote records that could not be read or decoded.
    pub skipped_records: usize,
}

impl SyncReport {
    pub(crate) fn dropped() -> Self {
        Self::failed_with(SyncOutcome::Dropped)
    }

    pub(crate) fn failed(error: SyncError) -> Self {
        Self::failed_with(SyncOutcome::Failed(error))
    }

    fn failed_with(outcome: SyncOutcome) -> Self {
        Self {
            outcome,
            adopted: Vec::new(),
            kept_local: 0,
            skipped_records: 0,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, SyncOutcome::Completed)
    }

    pub fn error(&self) -> Option<&SyncError> {
        match &self.outcome {
            SyncOutcome::Failed(error) => Some(error),
            _ => None,
        }
    }
}
