//! Platform backend detection.

use std::sync::Arc;

use tracing::debug;

use super::traits::{WindowController, WindowInspector};

/// The inspector/controller pair of one platform backend.
#[derive(Clone)]
pub struct Providers {
    pub inspector: Arc<dyn WindowInspector>,
    pub controller: Arc<dyn WindowController>,
}

impl std::fmt::Debug for Providers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Providers")
            .field("backend", &self.inspector.name())
            .finish()
    }
}

/// Detect the window backend for the current platform.
///
/// Returns `None` on unsupported platforms or when the platform tooling is missing.
pub fn detect_backend() -> Option<Providers> {
    #[cfg(target_os = "macos")]
    {
        let backend = Arc::new(super::backends::SystemEventsBackend);
        if backend.is_available() {
            debug!(event = "core.platform.backend_detected", backend = "macos");
            return Some(Providers {
                inspector: backend.clone(),
                controller: backend,
            });
        }
    }

    debug!(
        event = "core.platform.backend_unavailable",
        os = std::env::consts::OS
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_backend_does_not_panic() {
        let _result = detect_backend();
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn detect_backend_is_none_off_macos() {
        assert!(detect_backend().is_none());
    }
}
