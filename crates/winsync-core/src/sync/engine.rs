use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::arrangement::{Arrangement, ArrangementId};
use crate::errors::WinSyncError;
use crate::events::{ArrangementEvent, EventBus};
use crate::repository::ArrangementRepository;
use crate::settings::Settings;

use super::errors::{RemoteError, SyncError};
use super::record::{
    ARRANGEMENT_RECORD_TYPE, FIELD_CREATED_AT, Predicate, RecordId, SortDescriptor,
};
use super::traits::{AccountStatus, RemoteStore};
use super::types::{SyncOutcome, SyncPhase, SyncReport, SyncStatus};

#[derive(Debug)]
struct SyncState {
    phase: SyncPhase,
    last_sync_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

/// An active session. Dropping it, on any path, returns the engine to idle.
struct Session<'a> {
    state: &'a Mutex<SyncState>,
}

impl Session<'_> {
    fn advance(&self, phase: SyncPhase) {
        lock_state(self.state).phase = phase;
        debug!(event = "core.sync.phase_changed", phase = %phase);
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        lock_state(self.state).phase = SyncPhase::Idle;
    }
}

fn lock_state(state: &Mutex<SyncState>) -> MutexGuard<'_, SyncState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

struct Merged {
    adopted: Vec<Arrangement>,
    kept_local: usize,
    skipped_records: usize,
}

/// Additive sync between the local repository and a remote store.
///
/// `synchronize` only ever adds remote arrangements that are missing
/// locally. Local entries are never overwritten by a fetched copy, and local
/// arrangements reach the remote store only through `upload`.
pub struct SyncEngine {
    remote: Arc<dyn RemoteStore>,
    repository: Arc<ArrangementRepository>,
    settings: Settings,
    events: EventBus,
    state: Mutex<SyncState>,
}

impl SyncEngine {
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        repository: Arc<ArrangementRepository>,
        settings: Settings,
        events: EventBus,
    ) -> Self {
        let last_sync_at = settings.last_sync_date();
        Self {
            remote,
            repository,
            settings,
            events,
            state: Mutex::new(SyncState {
                phase: SyncPhase::Idle,
                last_sync_at,
                last_error: None,
            }),
        }
    }

    pub fn status(&self) -> SyncStatus {
        let state = lock_state(&self.state);
        SyncStatus {
            phase: state.phase,
            last_sync_at: state.last_sync_at,
            last_error: state.last_error.clone(),
        }
    }

    /// Run one sync session. A call made while another session is active
    /// does nothing and reports `SyncOutcome::Dropped`.
    pub async fn synchronize(&self) -> SyncReport {
        if !self.settings.sync_enabled() {
            debug!(event = "core.sync.session_skipped", reason = "disabled");
            return SyncReport::failed(SyncError::Disabled);
        }

        let Some(session) = self.begin() else {
            info!(event = "core.sync.session_dropped", reason = "already running");
            return SyncReport::dropped();
        };

        info!(event = "core.sync.session_started", remote = self.remote.name());
        self.events.publish(ArrangementEvent::SyncStarted);

        let result = self.run(&session).await;
        drop(session);

        match result {
            Ok(merged) => {
                let now = Utc::now();
                if let Err(e) = self.settings.set_last_sync_date(now) {
                    warn!(event = "core.sync.last_sync_date_failed", error = %e);
                }
                {
                    let mut state = lock_state(&self.state);
                    state.last_sync_at = Some(now);
                    state.last_error = None;
                }

                info!(
                    event = "core.sync.session_completed",
                    adopted = merged.adopted.len(),
                    kept_local = merged.kept_local,
                    skipped = merged.skipped_records
                );
                self.events.publish(ArrangementEvent::SyncCompleted {
                    adopted: merged.adopted.len(),
                });

                SyncReport {
                    outcome: SyncOutcome::Completed,
                    adopted: merged.adopted,
                    kept_local: merged.kept_local,
                    skipped_records: merged.skipped_records,
                }
            }
            Err(error) => {
                warn!(
                    event = "core.sync.session_failed",
                    error_code = error.error_code(),
                    error = %error
                );
                lock_state(&self.state).last_error = Some(error.to_string());
                self.events.publish(ArrangementEvent::SyncFailed {
                    code: error.error_code(),
                });
                SyncReport::failed(error)
            }
        }
    }

    /// Create or replace the remote record for `arrangement`.
    pub async fn upload(&self, arrangement: &Arrangement) -> Result<RecordId, SyncError> {
        self.ensure_enabled()?;
        self.ensure_account().await?;

        let record = arrangement.to_record()?;
        let id = self.remote.create(record).await.map_err(|e| {
            warn!(
                event = "core.sync.upload_failed",
                id = %arrangement.id(),
                error = %e
            );
            SyncError::from(e)
        })?;

        info!(
            event = "core.sync.upload_completed",
            id = %arrangement.id(),
            name = arrangement.name()
        );
        self.events.publish(ArrangementEvent::Uploaded {
            id: arrangement.id(),
        });
        Ok(id)
    }

    /// Remove the remote record for `arrangement`. A missing record is not an error.
    pub async fn delete(&self, arrangement: &Arrangement) -> Result<(), SyncError> {
        self.ensure_enabled()?;
        self.ensure_account().await?;

        match self.remote.delete(&RecordId::from(arrangement.id())).await {
            Ok(()) => {}
            Err(RemoteError::NotFound { .. }) => {
                debug!(
                    event = "core.sync.delete_skipped",
                    id = %arrangement.id(),
                    reason = "not on remote"
                );
                return Ok(());
            }
            Err(e) => {
                warn!(
                    event = "core.sync.delete_failed",
                    id = %arrangement.id(),
                    error = %e
                );
                return Err(e.into());
            }
        }

        info!(event = "core.sync.delete_completed", id = %arrangement.id());
        self.events.publish(ArrangementEvent::RemoteDeleted {
            id: arrangement.id(),
        });
        Ok(())
    }

    fn begin(&self) -> Option<Session<'_>> {
        let mut state = lock_state(&self.state);
        if state.phase != SyncPhase::Idle {
            return None;
        }
        state.phase = SyncPhase::Authorizing;
        Some(Session { state: &self.state })
    }

    async fn run(&self, session: &Session<'_>) -> Result<Merged, SyncError> {
        self.ensure_account().await?;

        session.advance(SyncPhase::Fetching);
        let results = self
            .remote
            .query(
                ARRANGEMENT_RECORD_TYPE,
                &Predicate::All,
                &SortDescriptor::descending(FIELD_CREATED_AT),
            )
            .await?;

        let mut fetched = Vec::with_capacity(results.len());
        let mut skipped_records = 0;
        for result in results {
            match result.and_then(|record| Arrangement::from_record(&record)) {
                Ok(arrangement) => fetched.push(arrangement),
                Err(e) => {
                    warn!(event = "core.sync.record_skipped", error = %e);
                    skipped_records += 1;
                }
            }
        }
        debug!(
            event = "core.sync.fetch_completed",
            fetched = fetched.len(),
            skipped = skipped_records
        );

        session.advance(SyncPhase::Merging);
        let fetched_count = fetched.len();
        // Counted per id: the same arrangement can come back under several records.
        let kept_local = fetched
            .iter()
            .map(|a| a.id())
            .filter(|id| self.repository.find_by_id(id).is_some())
            .collect::<HashSet<ArrangementId>>()
            .len();
        let adopted = self.repository.insert_missing(fetched)?;
        info!(
            event = "core.sync.merge_completed",
            adopted = adopted.len(),
            fetched = fetched_count
        );

        Ok(Merged {
            kept_local,
            adopted,
            skipped_records,
        })
    }

    fn ensure_enabled(&self) -> Result<(), SyncError> {
        if self.settings.sync_enabled() {
            Ok(())
        } else {
            Err(SyncError::Disabled)
        }
    }

    async fn ensure_account(&self) -> Result<(), SyncError> {
        match self.remote.account_status().await? {
            AccountStatus::Available => Ok(()),
            AccountStatus::NoAccount => Err(SyncError::AccountUnavailable {
                reason: "no sync account is available".to_string(),
            }),
            AccountStatus::Restricted => Err(SyncError::AccountUnavailable {
                reason: "access to the sync account is restricted".to_string(),
            }),
            AccountStatus::CouldNotDetermine => Err(SyncError::AccountIndeterminate),
        }
    }
}
