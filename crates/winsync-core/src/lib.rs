//! WinSync core library.
//!
//! Captures the layout of every open window into a named arrangement,
//! restores arrangements onto live windows, keeps them in a local
//! repository, and shares them between machines through a remote store.

pub mod arrangement;
pub mod capture;
pub mod config;
pub mod device;
pub mod errors;
pub mod events;
pub mod logging;
pub mod manager;
pub mod paths;
pub mod platform;
pub mod repository;
pub mod restore;
pub mod settings;
pub mod store;
pub mod sync;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use arrangement::{Arrangement, ArrangementId, Frame, WindowRecord};
pub use capture::{CaptureEngine, CaptureError, CaptureRequest};
pub use config::{ConfigError, WinSyncConfig, load_config};
pub use device::resolve_device_id;
pub use errors::{WinSyncError, WinSyncResult};
pub use events::{ArrangementEvent, EventBus};
pub use logging::init_logging;
pub use manager::{ArrangementManager, ManagerError};
pub use paths::WinSyncPaths;
pub use platform::{Providers, detect_backend};
pub use repository::{ArrangementRepository, RepositoryError};
pub use restore::{RestoreEngine, RestoreError, RestoreOutcome, RestoreReport, RestoreStatus};
pub use settings::{Settings, SettingsError};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use sync::{
    DirectoryRemoteStore, RemoteStore, SyncEngine, SyncError, SyncOutcome, SyncReport,
    SyncStatus,
};
