//! macOS window provider driven through System Events.
//!
//! Every query and command is a short AppleScript run by `osascript`;
//! the app list comes from NSWorkspace via AppleScriptObjC.
//! Authorization is the Accessibility trust of this process.

use std::process::Command;

use tracing::{debug, warn};

use crate::platform::errors::PlatformError;
use crate::platform::traits::{WindowController, WindowInspector};
use crate::platform::types::{
    ActivationPolicy, AppHandle, AttributeValue, Point, Size, WindowAttribute, WindowHandle,
};

// FFI declaration for accessibility check
#[link(name = "ApplicationServices", kind = "framework")]
unsafe extern "C" {
    fn AXIsProcessTrusted() -> bool;
}

const OSASCRIPT: &str = "/usr/bin/osascript";

// System Events has no notion of activation policy, so apps are listed
// through NSWorkspace instead.
const LIST_APPS_SCRIPT: &str = r#"use framework "AppKit"
use scripting additions
set out to ""
set apps to (current application's NSWorkspace's sharedWorkspace()'s runningApplications()) as list
repeat with a in apps
    set bid to a's bundleIdentifier()
    if bid is missing value then set bid to ""
    set appName to a's localizedName()
    if appName is missing value then set appName to ""
    set out to out & (a's processIdentifier()) & tab & (bid as text) & tab & (a's activationPolicy()) & tab & (appName as text) & linefeed
end repeat
return out"#;

pub struct SystemEventsBackend;

impl SystemEventsBackend {
    pub fn is_available(&self) -> bool {
        std::path::Path::new(OSASCRIPT).exists()
    }
}

impl WindowInspector for SystemEventsBackend {
    fn name(&self) -> &'static str {
        "macos"
    }

    fn is_authorized(&self) -> bool {
        accessibility_trusted()
    }

    fn list_running_apps(&self) -> Result<Vec<AppHandle>, PlatformError> {
        let output = run_script(LIST_APPS_SCRIPT).map_err(|e| PlatformError::EnumerationFailed {
            what: "applications".to_string(),
            message: e.to_string(),
        })?;
        Ok(output.lines().filter_map(parse_app_line).collect())
    }

    fn list_windows(&self, app: &AppHandle) -> Result<Vec<WindowHandle>, PlatformError> {
        let script = format!(
            r#"tell application "System Events" to count windows of {}"#,
            process_ref(app.pid)
        );
        let output = run_script(&script).map_err(|e| PlatformError::EnumerationFailed {
            what: format!("windows of {}", app.name),
            message: e.to_string(),
        })?;
        let count: usize = output
            .trim()
            .parse()
            .map_err(|_| PlatformError::EnumerationFailed {
                what: format!("windows of {}", app.name),
                message: format!("unexpected window count '{}'", output.trim()),
            })?;

        Ok((1..=count)
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
        let target = window_ref(window);
        let query = match attribute {
            WindowAttribute::Title => format!(r#"value of attribute "AXTitle" of {target}"#),
            WindowAttribute::Position => format!("position of {target}"),
            WindowAttribute::Size => format!("size of {target}"),
            WindowAttribute::Minimized => {
                format!(r#"value of attribute "AXMinimized" of {target}"#)
            }
            WindowAttribute::FullScreen => {
                format!(r#"value of attribute "AXFullScreen" of {target}"#)
            }
        };
        let script = format!(r#"tell application "System Events" to get {query}"#);

        let output = match run_script(&script) {
            Ok(output) => output,
            Err(e) => {
                debug!(
                    event = "core.platform.attribute_unavailable",
                    pid = window.pid,
                    index = window.index,
                    attribute = %attribute,
                    error = %e
                );
                return None;
            }
        };

        parse_attribute(attribute, &output)
    }
}

impl WindowController for SystemEventsBackend {
    fn is_authorized(&self) -> bool {
        accessibility_trusted()
    }

    fn activate(&self, app: &AppHandle) -> Result<(), PlatformError> {
        let script = format!(
            r#"tell application "System Events" to set frontmost of {} to true"#,
            process_ref(app.pid)
        );
        run_command("activate", &script)
    }

    fn set_position(&self, window: &WindowHandle, position: Point) -> Result<(), PlatformError> {
        let script = format!(
            r#"tell application "System Events" to set position of {} to {{{}, {}}}"#,
            window_ref(window),
            position.x.round() as i64,
            position.y.round() as i64
        );
        run_command("set_position", &script)
    }

    fn set_size(&self, window: &WindowHandle, size: Size) -> Result<(), PlatformError> {
        let script = format!(
            r#"tell application "System Events" to set size of {} to {{{}, {}}}"#,
            window_ref(window),
            size.width.round() as i64,
            size.height.round() as i64
        );
        run_command("set_size", &script)
    }

    fn set_minimized(&self, window: &WindowHandle, minimized: bool) -> Result<(), PlatformError> {
        let script = format!(
            r#"tell application "System Events" to set value of attribute "AXMinimized" of {} to {}"#,
            window_ref(window),
            minimized
        );
        run_command("set_minimized", &script)
    }

    fn set_full_screen(
        &self,
        window: &WindowHandle,
        full_screen: bool,
    ) -> Result<(), PlatformError> {
        let script = format!(
            r#"tell application "System Events" to set value of attribute "AXFullScreen" of {} to {}"#,
            window_ref(window),
            full_screen
        );
        run_command("set_full_screen", &script)
    }
}

fn accessibility_trusted() -> bool {
    unsafe { AXIsProcessTrusted() }
}

fn process_ref(pid: u32) -> String {
    format!("(first process whose unix id is {})", pid)
}

fn window_ref(window: &WindowHandle) -> String {
    format!("window {} of {}", window.index, process_ref(window.pid))
}

fn run_script(script: &str) -> Result<String, PlatformError> {
    let output = Command::new(OSASCRIPT).arg("-e").arg(script).output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(PlatformError::CommandFailed {
            command: "osascript".to_string(),
            message: stderr,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout)
        .trim_end_matches(['\r', '\n'])
        .to_string())
}

fn run_command(command: &str, script: &str) -> Result<(), PlatformError> {
    run_script(script).map(|_| ()).map_err(|e| {
        warn!(
            event = "core.platform.command_failed",
            command = command,
            error = %e
        );
        PlatformError::CommandFailed {
            command: command.to_string(),
            message: e.to_string(),
        }
    })
}

/// Parse `pid<TAB>bundle<TAB>policy<TAB>name`, where `policy` is the raw
/// `NSApplicationActivationPolicy` value.
fn parse_app_line(line: &str) -> Option<AppHandle> {
    let mut parts = line.splitn(4, '\t');
    let pid = parts.next()?.trim().parse().ok()?;
    let bundle_id = parts.next()?.trim();
    let activation = match parts.next()?.trim() {
        "0" => ActivationPolicy::Regular,
        "1" => ActivationPolicy::Accessory,
        "2" => ActivationPolicy::Prohibited,
        _ => return None,
    };
    let name = parts.next()?.trim().to_string();

    Some(AppHandle {
        pid,
        bundle_id: (!bundle_id.is_empty()).then(|| bundle_id.to_string()),
        name,
        activation,
    })
}

fn parse_pair(output: &str) -> Option<(f64, f64)> {
    let (a, b) = output.split_once(',')?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}

fn parse_attribute(attribute: WindowAttribute, output: &str) -> Option<AttributeValue> {
    let output = output.trim();
    if output == "missing value" {
        return None;
    }

    match attribute {
        WindowAttribute::Title => Some(AttributeValue::Text(output.to_string())),
        WindowAttribute::Position => {
            parse_pair(output).map(|(x, y)| AttributeValue::Point(Point { x, y }))
        }
        WindowAttribute::Size => parse_pair(output)
            .map(|(width, height)| AttributeValue::Size(Size { width, height })),
        WindowAttribute::Minimized | WindowAttribute::FullScreen => match output {
            "true" => Some(AttributeValue::Flag(true)),
            "false" => Some(AttributeValue::Flag(false)),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_app_line() {
        let app = parse_app_line("512\tcom.apple.Safari\t0\tSafari").unwrap();
        assert_eq!(app.pid, 512);
        assert_eq!(app.bundle_id.as_deref(), Some("com.apple.Safari"));
        assert_eq!(app.activation, ActivationPolicy::Regular);
        assert!(app.is_regular());

        let agent = parse_app_line("301\tcom.example.menubar\t1\tMenu Bar Agent").unwrap();
        assert_eq!(agent.activation, ActivationPolicy::Accessory);
        assert_eq!(agent.name, "Menu Bar Agent");
        assert!(!agent.is_regular());

        let helper = parse_app_line("77\t\t2\tloginwindow").unwrap();
        assert_eq!(helper.bundle_id, None);
        assert_eq!(helper.activation, ActivationPolicy::Prohibited);

        assert!(parse_app_line("88\tcom.example.odd\t7\tOdd").is_none());
        assert!(parse_app_line("garbage").is_none());
    }

    #[test]
    fn test_parse_attribute_values() {
        assert_eq!(
            parse_attribute(WindowAttribute::Position, "120, -40"),
            Some(AttributeValue::Point(Point { x: 120.0, y: -40.0 }))
        );
        assert_eq!(
            parse_attribute(WindowAttribute::Size, "800, 600"),
            Some(AttributeValue::Size(Size {
                width: 800.0,
                height: 600.0
            }))
        );
        assert_eq!(
            parse_attribute(WindowAttribute::Minimized, "true"),
            Some(AttributeValue::Flag(true))
        );
        assert_eq!(parse_attribute(WindowAttribute::Title, "missing value"), None);
        assert_eq!(parse_attribute(WindowAttribute::FullScreen, "maybe"), None);
    }

    #[test]
    fn test_window_ref_format() {
        let window = WindowHandle { pid: 10, index: 2 };
        assert_eq!(
            window_ref(&window),
            "window 2 of (first process whose unix id is 10)"
        );
    }
}
