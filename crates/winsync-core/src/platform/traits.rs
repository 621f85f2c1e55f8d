//! Window provider trait definitions.
//!
//! Capture reads through `WindowInspector`; restore drives windows through
//! `WindowController`. Each supported platform implements both.

use super::errors::PlatformError;
use super::types::{AppHandle, AttributeValue, Point, Size, WindowAttribute, WindowHandle};

/// Read-only access to running applications and their windows.
pub trait WindowInspector: Send + Sync {
    /// The canonical name of this backend (e.g., "macos").
    fn name(&self) -> &'static str;

    /// Whether this process may inspect other applications' windows.
    fn is_authorized(&self) -> bool;

    fn list_running_apps(&self) -> Result<Vec<AppHandle>, PlatformError>;

    fn list_windows(&self, app: &AppHandle) -> Result<Vec<WindowHandle>, PlatformError>;

    /// Read one attribute. `None` means the attribute is unavailable for this window.
    fn attribute(&self, window: &WindowHandle, attribute: WindowAttribute)
    -> Option<AttributeValue>;
}

/// Commands that change window placement and state.
///
/// Every command may fail independently of the others.
pub trait WindowController: Send + Sync {
    /// Whether this process may control other applications' windows.
    fn is_authorized(&self) -> bool;

    /// Bring the application to the foreground.
    fn activate(&self, app: &AppHandle) -> Result<(), PlatformError>;

    fn set_position(&self, window: &WindowHandle, position: Point) -> Result<(), PlatformError>;

    fn set_size(&self, window: &WindowHandle, size: Size) -> Result<(), PlatformError>;

    fn set_minimized(&self, window: &WindowHandle, minimized: bool) -> Result<(), PlatformError>;

    fn set_full_screen(&self, window: &WindowHandle, full_screen: bool)
    -> Result<(), PlatformError>;
}
