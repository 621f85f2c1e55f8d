use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::arrangement::{Arrangement, DEFAULT_SPACE_INDEX, Frame, WindowRecord};
use crate::platform::{AppHandle, WindowAttribute, WindowHandle, WindowInspector};

use super::errors::CaptureError;
use super::types::CaptureRequest;

/// Device attribution used when the caller supplies none.
const UNKNOWN_DEVICE: &str = "unknown";

/// Produces arrangements from the live window state. Read-only.
#[derive(Clone)]
pub struct CaptureEngine {
    inspector: Arc<dyn WindowInspector>,
}

impl CaptureEngine {
    pub fn new(inspector: Arc<dyn WindowInspector>) -> Self {
        Self { inspector }
    }

    /// Snapshot every window of every regular, identifiable application.
    ///
    /// An authorized capture that finds no windows returns an arrangement
    /// with no windows rather than failing.
    pub fn capture(&self, request: &CaptureRequest) -> Result<Arrangement, CaptureError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(CaptureError::InvalidName);
        }

        info!(
            event = "core.capture.started",
            name = name,
            backend = self.inspector.name()
        );

        if !self.inspector.is_authorized() {
            warn!(event = "core.capture.permission_denied", name = name);
            return Err(CaptureError::PermissionDenied);
        }

        let apps = self.inspector.list_running_apps().map_err(|e| {
            warn!(event = "core.capture.app_listing_failed", error = %e);
            CaptureError::EnumerationFailed {
                message: e.to_string(),
            }
        })?;

        let mut windows = Vec::new();
        for app in &apps {
            if !app.is_regular() {
                continue;
            }

            let Some(app_id) = app.stable_id() else {
                debug!(
                    event = "core.capture.app_skipped",
                    app = %app.name,
                    reason = "no bundle identifier"
                );
                continue;
            };

            if request.excluded_apps.iter().any(|excluded| excluded == app_id) {
                debug!(
                    event = "core.capture.app_skipped",
                    app = app_id,
                    reason = "excluded"
                );
                continue;
            }

            let handles = match self.inspector.list_windows(app) {
                Ok(handles) => handles,
                Err(e) => {
                    warn!(
                        event = "core.capture.window_listing_failed",
                        app = app_id,
                        error = %e
                    );
                    continue;
                }
            };

            windows.extend(
                handles
                    .iter()
                    .map(|handle| self.read_window(app, app_id, handle)),
            );
        }

        let origin_device = match request.origin_device.trim() {
            "" => UNKNOWN_DEVICE.to_string(),
            device => device.to_string(),
        };
        let arrangement =
            Arrangement::new(name.to_string(), windows, &request.tags, origin_device)?;

        info!(
            event = "core.capture.completed",
            id = %arrangement.id(),
            name = arrangement.name(),
            window_count = arrangement.window_count(),
            app_count = apps.len()
        );

        Ok(arrangement)
    }

    /// Read one window; attributes that cannot be read take their documented defaults.
    fn read_window(&self, app: &AppHandle, app_id: &str, handle: &WindowHandle) -> WindowRecord {
        let title = self
            .inspector
            .attribute(handle, WindowAttribute::Title)
            .and_then(|v| v.into_text())
            .unwrap_or_default();
        let position = self
            .inspector
            .attribute(handle, WindowAttribute::Position)
            .and_then(|v| v.as_point())
            .unwrap_or_default();
        let size = self
            .inspector
            .attribute(handle, WindowAttribute::Size)
            .and_then(|v| v.as_size())
            .unwrap_or_default();
        let is_minimized = self
            .inspector
            .attribute(handle, WindowAttribute::Minimized)
            .and_then(|v| v.as_flag())
            .unwrap_or(false);
        let is_full_screen = self
            .inspector
            .attribute(handle, WindowAttribute::FullScreen)
            .and_then(|v| v.as_flag())
            .unwrap_or(false);

        let app_display_name = if app.name.is_empty() {
            app_id.to_string()
        } else {
            app.name.clone()
        };

        WindowRecord {
            owning_app_id: app_id.to_string(),
            app_display_name,
            window_title: title,
            frame: Frame::new(position.x, position.y, size.width, size.height),
            is_minimized,
            is_full_screen,
            space_index: DEFAULT_SPACE_INDEX,
        }
    }
}
