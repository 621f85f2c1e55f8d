use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use winsync_core::platform::PlatformError;
use winsync_core::sync::SyncEngine;
use winsync_core::{
    Arrangement, ArrangementManager, ArrangementRepository, DirectoryRemoteStore, EventBus,
    FileStore, KeyValueStore, Providers, Settings, WinSyncConfig, WinSyncError, WinSyncPaths,
    detect_backend, events, load_config, resolve_device_id,
};

use crate::color;

/// Everything a command needs, wired once per invocation.
pub(crate) struct AppContext {
    pub config: WinSyncConfig,
    pub repository: Arc<ArrangementRepository>,
    pub settings: Settings,
    pub device_id: String,
    events: EventBus,
    providers: Option<Providers>,
}

impl AppContext {
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let paths = WinSyncPaths::resolve();
        let config = match load_config(&paths) {
            Ok(config) => config,
            Err(e) => {
                report_failure("Failed to load configuration", &e);
                error!(event = "cli.config_load_failed", error = %e);
                return Err(e.into());
            }
        };
        Ok(Self::open(&paths, config, detect_backend()))
    }

    pub fn open(paths: &WinSyncPaths, config: WinSyncConfig, providers: Option<Providers>) -> Self {
        let store_dir = config.store_dir(paths);
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&store_dir));
        let events = EventBus::new();
        let repository = Arc::new(ArrangementRepository::new(store.clone(), events.clone()));

        match repository.migrate_legacy_storage() {
            Ok(0) => {}
            Ok(count) => info!(event = "cli.legacy_migration_completed", count = count),
            Err(e) => warn!(event = "cli.legacy_migration_failed", error = %e),
        }

        let settings = Settings::new(store.clone());
        let device_id = resolve_device_id(&config, store.as_ref());

        info!(
            event = "cli.context_ready",
            store_dir = %store_dir.display(),
            device_id = device_id.as_str(),
            sync_configured = config.is_sync_configured()
        );

        Self {
            config,
            repository,
            settings,
            device_id,
            events,
            providers,
        }
    }

    /// Manager over the detected window backend.
    pub fn manager(&self) -> Result<ArrangementManager, PlatformError> {
        let providers = self.providers.clone().ok_or(PlatformError::Unsupported)?;
        Ok(ArrangementManager::new(
            providers.inspector,
            providers.controller,
            self.repository.clone(),
            self.settings.clone(),
            self.device_id.clone(),
            self.events.clone(),
        ))
    }

    /// `None` when no remote folder is configured.
    pub fn sync_engine(&self) -> Option<SyncEngine> {
        let remote_dir = self.config.remote_dir()?;
        Some(SyncEngine::new(
            Arc::new(DirectoryRemoteStore::new(remote_dir)),
            self.repository.clone(),
            self.settings.clone(),
            self.events.clone(),
        ))
    }

    /// Look up an arrangement by id or name, printing a message on a miss.
    pub fn require_arrangement(
        &self,
        query: &str,
        failed_event: &'static str,
    ) -> Result<Arrangement, Box<dyn std::error::Error>> {
        match self.repository.lookup(query) {
            Some(arrangement) => Ok(arrangement),
            None => {
                eprintln!(
                    "{}",
                    color::error(&format!("No arrangement named or with id '{}'", query))
                );
                error!(event = failed_event, query = query, reason = "not_found");
                Err(format!("Arrangement '{}' not found", query).into())
            }
        }
    }
}

/// Run a future to completion on a single-threaded runtime.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output, Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(future))
}

/// Print a failure to stderr and record it.
///
/// User-actionable errors carry their own instructions, so they print as-is.
pub(crate) fn report_failure(action: &str, e: &dyn WinSyncError) {
    if e.is_user_error() {
        eprintln!("{}", color::error(&e.to_string()));
    } else {
        eprintln!("{}", color::error(&format!("{}: {}", action, e)));
    }
    events::log_app_error(e);
}

#[derive(Serialize)]
struct JsonError<'a> {
    error: String,
    code: &'a str,
}

/// Print a failure as a JSON object on stdout and return it as a boxed error.
pub(crate) fn print_json_error(e: &dyn WinSyncError) -> Box<dyn std::error::Error> {
    let payload = JsonError {
        error: e.to_string(),
        code: e.error_code(),
    };
    match serde_json::to_string_pretty(&payload) {
        Ok(json) => println!("{}", json),
        Err(ser) => error!(event = "cli.json_error_encode_failed", error = %ser),
    }
    events::log_app_error(e);
    e.to_string().into()
}

/// Report `e` in the active output mode and convert it for `?`.
pub(crate) fn fail(
    action: &str,
    e: &dyn WinSyncError,
    json_output: bool,
) -> Box<dyn std::error::Error> {
    if json_output {
        print_json_error(e)
    } else {
        report_failure(action, e);
        e.to_string().into()
    }
}

pub(crate) fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{} {}", count, one)
    } else {
        format!("{} {}", count, many)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use tempfile::TempDir;
    use winsync_core::Frame;
    use winsync_core::testing::{FakeApp, FakeDesktop, FakeWindow};

    pub struct TestContext {
        pub ctx: AppContext,
        pub desktop: Arc<FakeDesktop>,
        pub dir: TempDir,
    }

    pub fn desktop() -> FakeDesktop {
        FakeDesktop::new().with_app(
            FakeApp::regular(1, "com.apple.Safari", "Safari")
                .with_window(FakeWindow::new("Docs", Frame::new(0.0, 25.0, 1200.0, 800.0))),
        )
    }

    pub fn context_with(desktop: FakeDesktop, remote: bool) -> TestContext {
        let dir = TempDir::new().unwrap();
        let paths = WinSyncPaths::from_dir(dir.path().join("home"));
        let mut config = WinSyncConfig::default();
        config.device.id = Some("device-a".to_string());
        if remote {
            let remote_dir = dir.path().join("remote");
            std::fs::create_dir_all(&remote_dir).unwrap();
            config.sync.remote_dir = Some(remote_dir);
        }
        let desktop = Arc::new(desktop);
        let providers = Providers {
            inspector: desktop.clone(),
            controller: desktop.clone(),
        };
        TestContext {
            ctx: AppContext::open(&paths, config, Some(providers)),
            desktop,
            dir,
        }
    }

    pub fn context() -> TestContext {
        context_with(desktop(), false)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_open_uses_configured_device_id() {
        let t = context();
        assert_eq!(t.ctx.device_id, "device-a");
        assert!(t.ctx.manager().is_ok());
    }

    #[test]
    fn test_manager_without_backend_is_unsupported() {
        let dir = tempfile::TempDir::new().unwrap();
        let paths = WinSyncPaths::from_dir(dir.path());
        let ctx = AppContext::open(&paths, WinSyncConfig::default(), None);

        let err = ctx.manager().err().unwrap();
        assert_eq!(err.error_code(), "PLATFORM_UNSUPPORTED");
        assert!(err.is_user_error());
    }

    #[test]
    fn test_sync_engine_requires_remote_dir() {
        assert!(context().ctx.sync_engine().is_none());
        assert!(context_with(desktop(), true).ctx.sync_engine().is_some());
    }

    #[test]
    fn test_require_arrangement_misses_with_error() {
        let t = context();
        assert!(
            t.ctx
                .require_arrangement("Nope", "cli.test_failed")
                .is_err()
        );
    }

    #[test]
    fn test_block_on_runs_future() {
        assert_eq!(block_on(async { 7 }).unwrap(), 7);
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "window", "windows"), "1 window");
        assert_eq!(plural(3, "window", "windows"), "3 windows");
    }
}
