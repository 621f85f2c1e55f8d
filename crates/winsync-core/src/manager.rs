//! Front-end facade over capture, restore and the local repository.
//!
//! Capture and restore talk to the window server synchronously, so both run
//! on tokio's blocking pool. Repository mutations stay on the caller's task.

use std::sync::Arc;

use tracing::info;

use crate::arrangement::{Arrangement, ArrangementError, ArrangementId};
use crate::capture::{CaptureEngine, CaptureError, CaptureRequest};
use crate::errors::WinSyncError;
use crate::events::{ArrangementEvent, EventBus};
use crate::platform::{WindowController, WindowInspector};
use crate::repository::{ArrangementRepository, RepositoryError};
use crate::restore::{RestoreEngine, RestoreError, RestoreReport};
use crate::settings::Settings;

#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error("No arrangement matches '{query}'")]
    NotFound { query: String },

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Restore(#[from] RestoreError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Arrangement(#[from] ArrangementError),

    #[error("Background task failed: {message}")]
    TaskFailed { message: String },
}

impl From<tokio::task::JoinError> for ManagerError {
    fn from(e: tokio::task::JoinError) -> Self {
        ManagerError::TaskFailed {
            message: e.to_string(),
        }
    }
}

impl WinSyncError for ManagerError {
    fn error_code(&self) -> &'static str {
        match self {
            ManagerError::NotFound { .. } => "ARRANGEMENT_NOT_FOUND",
            ManagerError::Capture(e) => e.error_code(),
            ManagerError::Restore(e) => e.error_code(),
            ManagerError::Repository(e) => e.error_code(),
            ManagerError::Arrangement(e) => e.error_code(),
            ManagerError::TaskFailed { .. } => "MANAGER_TASK_FAILED",
        }
    }

    fn is_user_error(&self) -> bool {
        match self {
            ManagerError::NotFound { .. } => true,
            ManagerError::Capture(e) => e.is_user_error(),
            ManagerError::Restore(e) => e.is_user_error(),
            ManagerError::Repository(e) => e.is_user_error(),
            ManagerError::Arrangement(e) => e.is_user_error(),
            ManagerError::TaskFailed { .. } => false,
        }
    }
}

pub struct ArrangementManager {
    capture: CaptureEngine,
    restore: RestoreEngine,
    repository: Arc<ArrangementRepository>,
    settings: Settings,
    device_id: String,
    events: EventBus,
}

impl ArrangementManager {
    pub fn new(
        inspector: Arc<dyn WindowInspector>,
        controller: Arc<dyn WindowController>,
        repository: Arc<ArrangementRepository>,
        settings: Settings,
        device_id: String,
        events: EventBus,
    ) -> Self {
        Self {
            capture: CaptureEngine::new(inspector.clone()),
            restore: RestoreEngine::new(inspector, controller),
            repository,
            settings,
            device_id,
            events,
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn repository(&self) -> &Arc<ArrangementRepository> {
        &self.repository
    }

    /// Capture the current windows and save them under `name`.
    pub async fn save_current_arrangement(
        &self,
        name: &str,
        tags: &[String],
    ) -> Result<Arrangement, ManagerError> {
        let request = CaptureRequest::new(name, self.device_id.as_str())
            .with_tags(tags.to_vec())
            .with_excluded_apps(self.settings.excluded_apps());
        let engine = self.capture.clone();
        let arrangement =
            tokio::task::spawn_blocking(move || engine.capture(&request)).await??;

        self.repository.upsert(arrangement.clone())?;
        info!(
            event = "core.manager.save_completed",
            id = %arrangement.id(),
            window_count = arrangement.window_count()
        );
        Ok(arrangement)
    }

    pub async fn restore_arrangement(
        &self,
        id: &ArrangementId,
    ) -> Result<RestoreReport, ManagerError> {
        let arrangement = self.require(id)?;
        let engine = self.restore.clone();
        let report = tokio::task::spawn_blocking(move || engine.restore(&arrangement)).await??;

        self.events.publish(ArrangementEvent::Restored {
            id: *id,
            restored: report.restored_count(),
            total: report.total(),
        });
        Ok(report)
    }

    /// Delete locally. Returns `None` if nothing had this id.
    pub fn delete_arrangement(
        &self,
        id: &ArrangementId,
    ) -> Result<Option<Arrangement>, ManagerError> {
        Ok(self.repository.delete(id)?)
    }

    pub fn add_tag(&self, id: &ArrangementId, tag: &str) -> Result<Arrangement, ManagerError> {
        let current = self.require(id)?;
        let tagged = current.add_tag(tag)?;
        if tagged != current {
            self.repository.upsert(tagged.clone())?;
        }
        Ok(tagged)
    }

    pub fn remove_tag(&self, id: &ArrangementId, tag: &str) -> Result<Arrangement, ManagerError> {
        let current = self.require(id)?;
        let untagged = current.remove_tag(tag);
        if untagged != current {
            self.repository.upsert(untagged.clone())?;
        }
        Ok(untagged)
    }

    pub fn list(&self) -> Vec<Arrangement> {
        self.repository.list()
    }

    /// Resolve an id string, falling back to the first arrangement with that name.
    pub fn find(&self, query: &str) -> Option<Arrangement> {
        self.repository.lookup(query)
    }

    /// Like `find`, but a miss is an error.
    pub fn resolve(&self, query: &str) -> Result<Arrangement, ManagerError> {
        self.find(query).ok_or_else(|| ManagerError::NotFound {
            query: query.to_string(),
        })
    }

    fn require(&self, id: &ArrangementId) -> Result<Arrangement, ManagerError> {
        self.repository
            .find_by_id(id)
            .ok_or_else(|| ManagerError::NotFound {
                query: id.to_string(),
            })
    }
}
