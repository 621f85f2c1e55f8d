use chrono::{DateTime, Utc};
use serde::Serialize;

pub const SYNC_ENABLED_KEY: &str = "sync_enabled";
pub const EXCLUDED_APPS_KEY: &str = "excluded_apps";
pub const DEFAULT_ARRANGEMENT_KEY: &str = "default_arrangement";
pub const LAST_SYNC_DATE_KEY: &str = "last_sync_date";

/// System surfaces that are never worth restoring.
pub const DEFAULT_EXCLUDED_APPS: [&str; 3] =
    ["com.apple.finder", "com.apple.dock", "com.apple.menuBarExtra"];

/// All settings with defaults applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingsSnapshot {
    pub sync_enabled: bool,
    pub excluded_apps: Vec<String>,
    pub default_arrangement: Option<String>,
    pub last_sync_date: Option<DateTime<Utc>>,
}
