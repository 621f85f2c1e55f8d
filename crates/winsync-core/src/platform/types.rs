use serde::{Deserialize, Serialize};

/// How an application presents itself to the user.
///
/// Only `Regular` applications (dock icon, user-facing windows) are captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationPolicy {
    Regular,
    Accessory,
    Prohibited,
}

/// A running application as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppHandle {
    pub pid: u32,
    /// Stable identifier (bundle id). `None` when the platform cannot resolve one.
    pub bundle_id: Option<String>,
    pub name: String,
    pub activation: ActivationPolicy,
}

impl AppHandle {
    /// Bundle id if present and non-empty.
    pub fn stable_id(&self) -> Option<&str> {
        self.bundle_id.as_deref().filter(|id| !id.trim().is_empty())
    }

    pub fn is_regular(&self) -> bool {
        self.activation == ActivationPolicy::Regular
    }
}

/// Reference to one window of a running application.
///
/// Only valid while the window list of the owning process is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowHandle {
    pub pid: u32,
    /// 1-based position in the application's window list.
    pub index: usize,
}

/// Window attributes that can be read individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowAttribute {
    Title,
    Position,
    Size,
    Minimized,
    FullScreen,
}

impl WindowAttribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowAttribute::Title => "title",
            WindowAttribute::Position => "position",
            WindowAttribute::Size => "size",
            WindowAttribute::Minimized => "minimized",
            WindowAttribute::FullScreen => "fullscreen",
        }
    }
}

impl std::fmt::Display for WindowAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Value of a window attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Text(String),
    Point(Point),
    Size(Size),
    Flag(bool),
}

impl AttributeValue {
    pub fn into_text(self) -> Option<String> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_point(&self) -> Option<Point> {
        match self {
            AttributeValue::Point(p) => Some(*p),
            _ => None,
        }
    }

    pub fn as_size(&self) -> Option<Size> {
        match self {
            AttributeValue::Size(s) => Some(*s),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            AttributeValue::Flag(b) => Some(*b),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(bundle_id: Option<&str>) -> AppHandle {
        AppHandle {
            pid: 42,
            bundle_id: bundle_id.map(String::from),
            name: "Safari".to_string(),
            activation: ActivationPolicy::Regular,
        }
    }

    #[test]
    fn test_stable_id_ignores_blank_bundle() {
        assert_eq!(app(Some("com.apple.Safari")).stable_id(), Some("com.apple.Safari"));
        assert_eq!(app(Some("  ")).stable_id(), None);
        assert_eq!(app(None).stable_id(), None);
    }

    #[test]
    fn test_attribute_value_accessors() {
        assert_eq!(
            AttributeValue::Text("Doc".to_string()).into_text(),
            Some("Doc".to_string())
        );
        assert_eq!(AttributeValue::Flag(true).as_flag(), Some(true));
        assert_eq!(AttributeValue::Flag(true).as_point(), None);
        assert_eq!(
            AttributeValue::Size(Size {
                width: 1.0,
                height: 2.0
            })
            .as_size()
            .map(|s| s.height),
            Some(2.0)
        );
    }
}
