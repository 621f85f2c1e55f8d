//! Scripted desktop for tests.
//!
//! `FakeDesktop` implements both window providers over an in-memory list of
//! applications and windows, records every command it receives, and can be
//! told to deny access or fail specific commands.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use crate::arrangement::{
    Arrangement, ArrangementId, ArrangementParts, DEFAULT_SPACE_INDEX, Frame, WindowRecord,
};
use crate::platform::{
    ActivationPolicy, AppHandle, AttributeValue, PlatformError, Point, Size, WindowAttribute,
    WindowController, WindowHandle, WindowInspector,
};

/// A window record with no state flags set.
pub fn window_record(app_id: &str, title: &str, frame: Frame) -> WindowRecord {
    WindowRecord {
        owning_app_id: app_id.to_string(),
        app_display_name: app_id.rsplit('.').next().unwrap_or(app_id).to_string(),
        window_title: title.to_string(),
        frame,
        is_minimized: false,
        is_full_screen: false,
        space_index: DEFAULT_SPACE_INDEX,
    }
}

/// An arrangement stamped now, attributed to `device`.
pub fn arrangement(name: &str, device: &str, windows: Vec<WindowRecord>) -> Arrangement {
    let now = Utc::now();
    Arrangement::from_parts(ArrangementParts {
        id: ArrangementId::generate(),
        name: name.to_string(),
        windows,
        created_at: now,
        updated_at: now,
        origin_device: device.to_string(),
        tags: Vec::new(),
    })
    .expect("fixture arrangement is valid")
}

/// Commands a `FakeDesktop` can be told to reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeCommand {
    Activate,
    SetPosition,
    SetSize,
    SetMinimized,
    SetFullScreen,
}

/// A command received by the fake controller, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum FakeCall {
    Activate { pid: u32 },
    SetPosition { pid: u32, index: usize, position: Point },
    SetSize { pid: u32, index: usize, size: Size },
    SetMinimized { pid: u32, index: usize, minimized: bool },
    SetFullScreen { pid: u32, index: usize, full_screen: bool },
}

impl FakeCall {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, FakeCall::Activate { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FakeWindow {
    pub title: Option<String>,
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub minimized: Option<bool>,
    pub full_screen: Option<bool>,
}

impl FakeWindow {
    pub fn new(title: &str, frame: Frame) -> Self {
        Self {
            title: Some(title.to_string()),
            position: Some(Point {
                x: frame.x,
                y: frame.y,
            }),
            size: Some(Size {
                width: frame.width,
                height: frame.height,
            }),
            minimized: Some(false),
            full_screen: Some(false),
        }
    }

    pub fn minimized(mut self) -> Self {
        self.minimized = Some(true);
        self
    }

    pub fn full_screen(mut self) -> Self {
        self.full_screen = Some(true);
        self
    }

    /// Make one attribute report as unavailable.
    pub fn without(mut self, attribute: WindowAttribute) -> Self {
        match attribute {
            WindowAttribute::Title => self.title = None,
            WindowAttribute::Position => self.position = None,
            WindowAttribute::Size => self.size = None,
            WindowAttribute::Minimized => self.minimized = None,
            WindowAttribute::FullScreen => self.full_screen = None,
        }
        self
    }

    /// Current frame, treating unavailable parts as zero.
    pub fn frame(&self) -> Frame {
        let position = self.position.unwrap_or_default();
        let size = self.size.unwrap_or_default();
        Frame::new(position.x, position.y, size.width, size.height)
    }
}

#[derive(Debug, Clone)]
pub struct FakeApp {
    pub handle: AppHandle,
    pub windows: Vec<FakeWindow>,
    pub fail_window_listing: bool,
}

impl FakeApp {
    pub fn regular(pid: u32, bundle_id: &str, name: &str) -> Self {
        Self {
            handle: AppHandle {
                pid,
                bundle_id: Some(bundle_id.to_string()),
                name: name.to_string(),
                activation: ActivationPolicy::Regular,
            },
            windows: Vec::new(),
            fail_window_listing: false,
        }
    }

    pub fn with_policy(mut self, activation: ActivationPolicy) -> Self {
        self.handle.activation = activation;
        self
    }

    pub fn without_bundle_id(mut self) -> Self {
        self.handle.bundle_id = None;
        self
    }

    pub fn with_window(mut self, window: FakeWindow) -> Self {
        self.windows.push(window);
        self
    }

    pub fn failing_window_listing(mut self) -> Self {
        self.fail_window_listing = true;
        self
    }
}

#[derive(Debug, Default)]
struct FakeState {
    inspection_denied: bool,
    control_denied: bool,
    app_listing_fails: bool,
    apps: Vec<FakeApp>,
    calls: Vec<FakeCall>,
    failing: Vec<(String, FakeCommand)>,
}

#[derive(Debug, Default)]
pub struct FakeDesktop {
    state: Mutex<FakeState>,
}

impl FakeDesktop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_app(self, app: FakeApp) -> Self {
        self.lock().apps.push(app);
        self
    }

    pub fn deny_inspection(self) -> Self {
        self.lock().inspection_denied = true;
        self
    }

    pub fn deny_control(self) -> Self {
        self.lock().control_denied = true;
        self
    }

    pub fn failing_app_listing(self) -> Self {
        self.lock().app_listing_fails = true;
        self
    }

    /// Reject `command` for any window whose title is `title`.
    pub fn fail_command(self, title: &str, command: FakeCommand) -> Self {
        self.lock().failing.push((title.to_string(), command));
        self
    }

    /// Quit an application.
    pub fn quit_app(&self, bundle_id: &str) {
        self.lock()
            .apps
            .retain(|a| a.handle.bundle_id.as_deref() != Some(bundle_id));
    }

    /// Move a window as a user would, without recording a command.
    pub fn move_window(&self, title: &str, frame: Frame) {
        let mut state = self.lock();
        for app in &mut state.apps {
            for window in &mut app.windows {
                if window.title.as_deref() == Some(title) {
                    *window = FakeWindow {
                        position: Some(Point {
                            x: frame.x,
                            y: frame.y,
                        }),
                        size: Some(Size {
                            width: frame.width,
                            height: frame.height,
                        }),
                        ..window.clone()
                    };
                }
            }
        }
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.lock().calls.clone()
    }

    /// Snapshot of every window of the application with `bundle_id`.
    pub fn windows_of(&self, bundle_id: &str) -> Vec<FakeWindow> {
        self.lock()
            .apps
            .iter()
            .find(|a| a.handle.bundle_id.as_deref() == Some(bundle_id))
            .map(|a| a.windows.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record `call`, then apply `apply` to the target window unless the command is scripted to fail.
    fn command(
        &self,
        window: &WindowHandle,
        command: FakeCommand,
        call: FakeCall,
        apply: impl FnOnce(&mut FakeWindow),
    ) -> Result<(), PlatformError> {
        let mut state = self.lock();
        state.calls.push(call);

        let FakeState { apps, failing, .. } = &mut *state;
        let target = apps
            .iter_mut()
            .find(|a| a.handle.pid == window.pid)
            .and_then(|a| a.windows.get_mut(window.index.checked_sub(1)?))
            .ok_or_else(|| PlatformError::CommandFailed {
                command: format!("{:?}", command),
                message: "window no longer exists".to_string(),
            })?;

        let title = target.title.clone().unwrap_or_default();
        if failing.iter().any(|(t, c)| *t == title && *c == command) {
            return Err(PlatformError::CommandFailed {
                command: format!("{:?}", command),
                message: format!("scripted failure for '{}'", title),
            });
        }

        apply(target);
        Ok(())
    }
}

impl WindowInspector for FakeDesktop {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn is_authorized(&self) -> bool {
        !self.lock().inspection_denied
    }

    fn list_running_apps(&self) -> Result<Vec<AppHandle>, PlatformError> {
        let state = self.lock();
        if state.app_listing_fails {
            return Err(PlatformError::EnumerationFailed {
                what: "applications".to_string(),
                message: "scripted failure".to_string(),
            });
        }
        Ok(state.apps.iter().map(|a| a.handle.clone()).collect())
    }

    fn list_windows(&self, app: &AppHandle) -> Result<Vec<WindowHandle>, PlatformError> {
        let state = self.lock();
        let fake = state
            .apps
            .iter()
            .find(|a| a.handle.pid == app.pid)
            .ok_or_else(|| PlatformError::EnumerationFailed {
                what: format!("windows of {}", app.name),
                message: "application exited".to_string(),
            })?;
        if fake.fail_window_listing {
            return Err(PlatformError::EnumerationFailed {
                what: format!("windows of {}", app.name),
                message: "scripted failure".to_string(),
            });
        }
        Ok((1..=fake.windows.len())
            .map(|index| WindowHandle {
                pid: app.pid,
                index,
            })
            .collect())
    }

    fn attribute(
        &self,
        window: &WindowHandle,
        attribute: WindowAttribute,
    ) -> Option<AttributeValue> {
        let state = self.lock();
        let fake = state
            .apps
            .iter()
            .find(|a| a.handle.pid == window.pid)?
            .windows
            .get(window.index.checked_sub(1)?)?;

        match attribute {
            WindowAttribute::Title => fake.title.clone().map(AttributeValue::Text),
            WindowAttribute::Position => fake.position.map(AttributeValue::Point),
            WindowAttribute::Size => fake.size.map(AttributeValue::Size),
            WindowAttribute::Minimized => fake.minimized.map(AttributeValue::Flag),
            WindowAttribute::FullScreen => fake.full_screen.map(AttributeValue::Flag),
        }
    }
}

impl WindowController for FakeDesktop {
    fn is_authorized(&self) -> bool {
        !self.lock().control_denied
    }

    fn activate(&self, app: &AppHandle) -> Result<(), PlatformError> {
        let mut state = self.lock();
        state.calls.push(FakeCall::Activate { pid: app.pid });
        let title_fails = state.failing.iter().any(|(_, c)| *c == FakeCommand::Activate);
        if title_fails {
            return Err(PlatformError::CommandFailed {
                command: "Activate".to_string(),
                message: "scripted failure".to_string(),
            });
        }
        Ok(())
    }

    fn set_position(&self, window: &WindowHandle, position: Point) -> Result<(), PlatformError> {
        let call = FakeCall::SetPosition {
            pid: window.pid,
            index: window.index,
            position,
        };
        self.command(window, FakeCommand::SetPosition, call, |w| {
            w.position = Some(position)
        })
    }

    fn set_size(&self, window: &WindowHandle, size: Size) -> Result<(), PlatformError> {
        let call = FakeCall::SetSize {
            pid: window.pid,
            index: window.index,
            size,
        };
        self.command(window, FakeCommand::SetSize, call, |w| w.size = Some(size))
    }

    fn set_minimized(&self, window: &WindowHandle, minimized: bool) -> Result<(), PlatformError> {
        let call = FakeCall::SetMinimized {
            pid: window.pid,
            index: window.index,
            minimized,
        };
        self.command(window, FakeCommand::SetMinimized, call, |w| {
            w.minimized = Some(minimized)
        })
    }

    fn set_full_screen(
        &self,
        window: &WindowHandle,
        full_screen: bool,
    ) -> Result<(), PlatformError> {
        let call = FakeCall::SetFullScreen {
            pid: window.pid,
            index: window.index,
            full_screen,
        };
        self.command(window, FakeCommand::SetFullScreen, call, |w| {
            w.full_screen = Some(full_screen)
        })
    }
}
