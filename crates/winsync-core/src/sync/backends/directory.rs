use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::sync::errors::RemoteError;
use crate::sync::record::{Predicate, RecordId, RemoteRecord, SortDescriptor};
use crate::sync::traits::{AccountStatus, RemoteStore};

const RECORD_EXTENSION: &str = "json";

/// Remote store backed by a shared folder, typically inside a cloud-synced
/// drive. Records live at `<root>/<record type>/<record id>.json`.
///
/// The root folder stands in for the account: if it is missing, there is no
/// account to sync with.
#[derive(Debug, Clone)]
pub struct DirectoryRemoteStore {
    root: PathBuf,
}

impl DirectoryRemoteStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn type_dir(&self, record_type: &str) -> Result<PathBuf, RemoteError> {
        if !is_safe_component(record_type) {
            return Err(RemoteError::Unavailable {
                message: format!("invalid record type '{}'", record_type),
            });
        }
        Ok(self.root.join(record_type))
    }

    async fn read_record(path: &Path) -> Result<RemoteRecord, RemoteError> {
        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bytes = tokio::fs::read(path).await?;
        serde_json::from_slice(&bytes).map_err(|e| RemoteError::DecodeFailed {
            id,
            reason: e.to_string(),
        })
    }
}

/// Ids and record types become path components.
fn is_safe_component(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with('.')
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

fn record_file_name(id: &RecordId) -> Result<String, RemoteError> {
    if !is_safe_component(id.as_str()) {
        return Err(RemoteError::InvalidRecordId { id: id.to_string() });
    }
    Ok(format!("{}.{}", id, RECORD_EXTENSION))
}

#[async_trait]
impl RemoteStore for DirectoryRemoteStore {
    fn name(&self) -> &'static str {
        "directory"
    }

    async fn account_status(&self) -> Result<AccountStatus, RemoteError> {
        let status = match tokio::fs::metadata(&self.root).await {
            Ok(metadata) if metadata.is_dir() => AccountStatus::Available,
            Ok(_) => AccountStatus::NoAccount,
            Err(e) if e.kind() == ErrorKind::NotFound => AccountStatus::NoAccount,
            Err(e) if e.kind() == ErrorKind::PermissionDenied => AccountStatus::Restricted,
            Err(e) => {
                warn!(
                    event = "core.sync.directory_status_failed",
                    root = %self.root.display(),
                    error = %e
                );
                AccountStatus::CouldNotDetermine
            }
        };
        Ok(status)
    }

    async fn create(&self, record: RemoteRecord) -> Result<RecordId, RemoteError> {
        let dir = self.type_dir(&record.record_type)?;
        let file_name = record_file_name(&record.id)?;
        let bytes = serde_json::to_vec_pretty(&record).map_err(|e| RemoteError::EncodeFailed {
            message: e.to_string(),
        })?;

        tokio::fs::create_dir_all(&dir).await?;
        let target = dir.join(&file_name);
        let staging = dir.join(format!(".{}.tmp", file_name));
        tokio::fs::write(&staging, &bytes).await?;
        if let Err(e) = tokio::fs::rename(&staging, &target).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e.into());
        }

        debug!(
            event = "core.sync.directory_write_completed",
            path = %target.display()
        );
        Ok(record.id)
    }

    async fn query(
        &self,
        record_type: &str,
        predicate: &Predicate,
        sort: &SortDescriptor,
    ) -> Result<Vec<Result<RemoteRecord, RemoteError>>, RemoteError> {
        let dir = self.type_dir(record_type)?;
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        let mut failures = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_record = path.extension().is_some_and(|ext| ext == RECORD_EXTENSION)
                && !entry.file_name().to_string_lossy().starts_with('.');
            if !is_record {
                continue;
            }
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            match Self::read_record(&path).await {
                // `delete` finds records by file name, so the two must agree.
                Ok(record) if record.id.as_str() != stem => {
                    failures.push(Err(RemoteError::DecodeFailed {
                        id: stem,
                        reason: format!("file holds record '{}'", record.id),
                    }))
                }
                Ok(record) if record.record_type == record_type => {
                    if predicate.matches(&record) {
                        records.push(record);
                    }
                }
                Ok(record) => failures.push(Err(RemoteError::DecodeFailed {
                    id: record.id.to_string(),
                    reason: format!("stored under '{}'", record_type),
                })),
                Err(e) => failures.push(Err(e)),
            }
        }

        records.sort_by(|a, b| sort.compare(a, b));
        Ok(records.into_iter().map(Ok).chain(failures).collect())
    }

    async fn delete(&self, id: &RecordId) -> Result<(), RemoteError> {
        let file_name = record_file_name(id)?;
        let mut types = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = types.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            match tokio::fs::remove_file(entry.path().join(&file_name)).await {
                Ok(()) => return Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(RemoteError::NotFound { id: id.to_string() })
    }
}
