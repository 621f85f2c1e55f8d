use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::arrangement::{Arrangement, WindowRecord};
use crate::platform::{
    AppHandle, PlatformError, Point, Size, WindowAttribute, WindowController, WindowHandle,
    WindowInspector,
};

use super::errors::RestoreError;
use super::types::{RestoreOutcome, RestoreReport, RestoreStatus};

/// Moves live windows back to the frames recorded in an arrangement.
#[derive(Clone)]
pub struct RestoreEngine {
    inspector: Arc<dyn WindowInspector>,
    controller: Arc<dyn WindowController>,
}

impl RestoreEngine {
    pub fn new(inspector: Arc<dyn WindowInspector>, controller: Arc<dyn WindowController>) -> Self {
        Self {
            inspector,
            controller,
        }
    }

    /// Restore every record in order. A record that cannot be restored is
    /// reported and the remaining records are still attempted.
    pub fn restore(&self, arrangement: &Arrangement) -> Result<RestoreReport, RestoreError> {
        info!(
            event = "core.restore.started",
            id = %arrangement.id(),
            name = arrangement.name(),
            window_count = arrangement.window_count()
        );

        if !self.controller.is_authorized() || !self.inspector.is_authorized() {
            warn!(event = "core.restore.permission_denied", id = %arrangement.id());
            return Err(RestoreError::PermissionDenied);
        }

        let outcomes: Vec<RestoreOutcome> = arrangement
            .windows()
            .iter()
            .map(|record| {
                let status = self.restore_record(record);
                if status.is_restored() {
                    debug!(
                        event = "core.restore.record_restored",
                        app = %record.owning_app_id,
                        title = %record.window_title
                    );
                } else {
                    warn!(
                        event = "core.restore.record_failed",
                        app = %record.owning_app_id,
                        title = %record.window_title,
                        status = %status
                    );
                }
                RestoreOutcome::new(record, status)
            })
            .collect();

        let report = RestoreReport {
            arrangement_id: arrangement.id(),
            arrangement_name: arrangement.name().to_string(),
            outcomes,
        };

        info!(
            event = "core.restore.completed",
            id = %report.arrangement_id,
            restored = report.restored_count(),
            total = report.total()
        );

        Ok(report)
    }

    fn restore_record(&self, record: &WindowRecord) -> RestoreStatus {
        let apps = match self.inspector.list_running_apps() {
            Ok(apps) => apps,
            Err(e) => return control_failed(e),
        };
        let Some(app) = find_app(apps, &record.owning_app_id) else {
            return RestoreStatus::AppNotRunning;
        };

        if let Err(e) = self.controller.activate(&app) {
            debug!(
                event = "core.restore.activate_failed",
                app = %record.owning_app_id,
                error = %e
            );
        }

        let handles = match self.inspector.list_windows(&app) {
            Ok(handles) => handles,
            Err(e) => return control_failed(e),
        };

        // Duplicate titles resolve to the first window the platform lists.
        let Some(window) = handles
            .iter()
            .find(|handle| self.title_of(handle).as_deref() == Some(record.window_title.as_str()))
        else {
            return RestoreStatus::WindowNotFound;
        };

        match self.apply(window, record) {
            Ok(()) => RestoreStatus::Restored,
            Err(e) => control_failed(e),
        }
    }

    fn title_of(&self, handle: &WindowHandle) -> Option<String> {
        self.inspector
            .attribute(handle, WindowAttribute::Title)
            .and_then(|v| v.into_text())
    }

    /// Position, then size, then state flags. Flags are only ever set, never cleared.
    fn apply(&self, window: &WindowHandle, record: &WindowRecord) -> Result<(), PlatformError> {
        let frame = record.frame;
        self.controller.set_position(
            window,
            Point {
                x: frame.x,
                y: frame.y,
            },
        )?;
        self.controller.set_size(
            window,
            Size {
                width: frame.width,
                height: frame.height,
            },
        )?;
        if record.is_minimized {
            self.controller.set_minimized(window, true)?;
        }
        if record.is_full_screen {
            self.controller.set_full_screen(window, true)?;
        }
        Ok(())
    }
}

fn find_app(apps: Vec<AppHandle>, app_id: &str) -> Option<AppHandle> {
    apps.into_iter().find(|app| app.stable_id() == Some(app_id))
}

fn control_failed(error: PlatformError) -> RestoreStatus {
    RestoreStatus::ControlFailed {
        reason: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrangement::Frame;
    use crate::errors::WinSyncError;
    use crate::testing::{
        FakeApp, FakeCall, FakeCommand, FakeDesktop, FakeWindow, arrangement, window_record,
    };

    fn engine(desktop: FakeDesktop) -> (RestoreEngine, Arc<FakeDesktop>) {
        let desktop = Arc::new(desktop);
        (
            RestoreEngine::new(desktop.clone(), desktop.clone()),
            desktop,
        )
    }

    fn scrambled() -> Frame {
        Frame::new(500.0, 500.0, 200.0, 200.0)
    }

    #[test]
    fn test_restore_moves_window_position_before_size() {
        let target = Frame::new(10.0, 20.0, 800.0, 600.0);
        let (engine, desktop) = engine(FakeDesktop::new().with_app(
            FakeApp::regular(7, "com.apple.Safari", "Safari")
                .with_window(FakeWindow::new("Docs", scrambled())),
        ));
        let saved = arrangement(
            "Work",
            "device-a",
            vec![window_record("com.apple.Safari", "Docs", target)],
        );

        let report = engine.restore(&saved).unwrap();

        assert!(report.is_complete());
        assert_eq!(desktop.windows_of("com.apple.Safari")[0].frame(), target);
        let mutations: Vec<FakeCall> = desktop
            .calls()
            .into_iter()
            .filter(FakeCall::is_mutation)
            .collect();
        assert_eq!(
            mutations,
            [
                FakeCall::SetPosition {
                    pid: 7,
                    index: 1,
                    position: Point { x: 10.0, y: 20.0 }
                },
                FakeCall::SetSize {
                    pid: 7,
                    index: 1,
                    size: Size {
                        width: 800.0,
                        height: 600.0
                    }
                },
            ]
        );
    }

    #[test]
    fn test_restore_reports_app_not_running_and_continues() {
        let frame = Frame::new(0.0, 0.0, 640.0, 480.0);
        let (engine, desktop) = engine(
            FakeDesktop::new()
                .with_app(
                    FakeApp::regular(1, "com.example.one", "One")
                        .with_window(FakeWindow::new("first", scrambled())),
                )
                .with_app(
                    FakeApp::regular(3, "com.example.three", "Three")
                        .with_window(FakeWindow::new("third", scrambled())),
                ),
        );
        let saved = arrangement(
            "Three",
            "device-a",
            vec![
                window_record("com.example.one", "first", frame),
                window_record("com.example.two", "second", frame),
                window_record("com.example.three", "third", frame),
            ],
        );

        let report = engine.restore(&saved).unwrap();

        let statuses: Vec<&RestoreStatus> = report.outcomes.iter().map(|o| &o.status).collect();
        assert_eq!(
            statuses,
            [
                &RestoreStatus::Restored,
                &RestoreStatus::AppNotRunning,
                &RestoreStatus::Restored
            ]
        );
        assert_eq!(report.restored_count(), 2);
        assert_eq!(desktop.windows_of("com.example.three")[0].frame(), frame);
    }

    #[test]
    fn test_restore_window_not_found() {
        let (engine, desktop) = engine(FakeDesktop::new().with_app(
            FakeApp::regular(1, "com.example.app", "App")
                .with_window(FakeWindow::new("Other", scrambled())),
        ));
        let saved = arrangement(
            "Missing",
            "device-a",
            vec![window_record(
                "com.example.app",
                "Gone",
                Frame::new(0.0, 0.0, 1.0, 1.0),
            )],
        );

        let report = engine.restore(&saved).unwrap();

        assert_eq!(report.outcomes[0].status, RestoreStatus::WindowNotFound);
        assert_eq!(desktop.windows_of("com.example.app")[0].frame(), scrambled());
    }

    #[test]
    fn test_restore_control_failure_stops_only_that_record() {
        let frame = Frame::new(0.0, 0.0, 300.0, 300.0);
        let (engine, desktop) = engine(
            FakeDesktop::new()
                .with_app(
                    FakeApp::regular(1, "com.example.app", "App")
                        .with_window(FakeWindow::new("fixed", scrambled()))
                        .with_window(FakeWindow::new("free", scrambled())),
                )
                .fail_command("fixed", FakeCommand::SetPosition),
        );
        let saved = arrangement(
            "Partial",
            "device-a",
            vec![
                window_record("com.example.app", "fixed", frame),
                window_record("com.example.app", "free", frame),
            ],
        );

        let report = engine.restore(&saved).unwrap();

        assert!(matches!(
            report.outcomes[0].status,
            RestoreStatus::ControlFailed { .. }
        ));
        assert!(report.outcomes[1].status.is_restored());

        // The size command for the failing window was never sent.
        assert!(!desktop.calls().iter().any(|c| matches!(
            c,
            FakeCall::SetSize { index: 1, .. }
        )));
        let windows = desktop.windows_of("com.example.app");
        assert_eq!(windows[0].frame(), scrambled());
        assert_eq!(windows[1].frame(), frame);
    }

    #[test]
    fn test_restore_applies_state_flags_but_never_clears_them() {
        let frame = Frame::new(0.0, 0.0, 400.0, 400.0);
        let (engine, desktop) = engine(FakeDesktop::new().with_app(
            FakeApp::regular(1, "com.example.app", "App")
                .with_window(FakeWindow::new("docked", scrambled()).minimized())
                .with_window(FakeWindow::new("stage", scrambled())),
        ));
        let mut stage = window_record("com.example.app", "stage", frame);
        stage.is_minimized = true;
        stage.is_full_screen = true;
        let saved = arrangement(
            "Flags",
            "device-a",
            vec![window_record("com.example.app", "docked", frame), stage],
        );

        engine.restore(&saved).unwrap();

        let windows = desktop.windows_of("com.example.app");
        assert_eq!(windows[0].minimized, Some(true));
        assert_eq!(windows[1].minimized, Some(true));
        assert_eq!(windows[1].full_screen, Some(true));
        assert!(!desktop.calls().iter().any(|c| matches!(
            c,
            FakeCall::SetMinimized {
                minimized: false,
                ..
            }
        )));
    }

    #[test]
    fn test_restore_is_idempotent() {
        let target = Frame::new(100.0, 100.0, 500.0, 400.0);
        let (engine, desktop) = engine(FakeDesktop::new().with_app(
            FakeApp::regular(1, "com.example.app", "App")
                .with_window(FakeWindow::new("doc", scrambled())),
        ));
        let saved = arrangement(
            "Twice",
            "device-a",
            vec![window_record("com.example.app", "doc", target)],
        );

        let first = engine.restore(&saved).unwrap();
        let after_first = desktop.windows_of("com.example.app");
        let second = engine.restore(&saved).unwrap();

        assert_eq!(first.outcomes, second.outcomes);
        assert_eq!(desktop.windows_of("com.example.app"), after_first);
        assert_eq!(after_first[0].frame(), target);
    }

    #[test]
    fn test_restore_duplicate_titles_target_first_window() {
        let target = Frame::new(1.0, 1.0, 100.0, 100.0);
        let (engine, desktop) = engine(FakeDesktop::new().with_app(
            FakeApp::regular(1, "com.example.app", "App")
                .with_window(FakeWindow::new("Untitled", scrambled()))
                .with_window(FakeWindow::new("Untitled", scrambled())),
        ));
        let saved = arrangement(
            "Dupes",
            "device-a",
            vec![
                window_record("com.example.app", "Untitled", target),
                window_record("com.example.app", "Untitled", target),
            ],
        );

        let report = engine.restore(&saved).unwrap();

        assert_eq!(report.restored_count(), 2);
        let windows = desktop.windows_of("com.example.app");
        assert_eq!(windows[0].frame(), target);
        assert_eq!(windows[1].frame(), scrambled());
    }

    #[test]
    fn test_restore_activation_failure_is_ignored() {
        let target = Frame::new(0.0, 0.0, 10.0, 10.0);
        let (engine, _) = engine(
            FakeDesktop::new()
                .with_app(
                    FakeApp::regular(1, "com.example.app", "App")
                        .with_window(FakeWindow::new("w", scrambled())),
                )
                .fail_command("w", FakeCommand::Activate),
        );
        let saved = arrangement(
            "Activate",
            "device-a",
            vec![window_record("com.example.app", "w", target)],
        );
        assert!(engine.restore(&saved).unwrap().is_complete());
    }

    #[test]
    fn test_restore_window_listing_failure_is_control_failure() {
        let (engine, _) = engine(FakeDesktop::new().with_app(
            FakeApp::regular(1, "com.example.app", "App")
                .with_window(FakeWindow::new("w", scrambled()))
                .failing_window_listing(),
        ));
        let saved = arrangement(
            "Listing",
            "device-a",
            vec![window_record("com.example.app", "w", scrambled())],
        );
        let report = engine.restore(&saved).unwrap();
        assert!(matches!(
            report.outcomes[0].status,
            RestoreStatus::ControlFailed { .. }
        ));
    }

    #[test]
    fn test_restore_without_permission_fails() {
        let (engine, desktop) = engine(FakeDesktop::new().deny_control());
        let saved = arrangement(
            "Denied",
            "device-a",
            vec![window_record("com.example.app", "w", scrambled())],
        );
        let err = engine.restore(&saved).unwrap_err();
        assert_eq!(err.error_code(), "RESTORE_PERMISSION_DENIED");
        assert!(desktop.calls().is_empty());
    }

    #[test]
    fn test_restore_empty_arrangement() {
        let (engine, _) = engine(FakeDesktop::new());
        let report = engine
            .restore(&arrangement("Empty", "device-a", Vec::new()))
            .unwrap();
        assert_eq!(report.total(), 0);
        assert!(report.is_complete());
    }
}
