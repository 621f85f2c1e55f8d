//! User settings, one key/value entry per setting.

mod errors;
mod handler;
mod types;

pub use errors::SettingsError;
pub use handler::Settings;
pub use types::{
    DEFAULT_ARRANGEMENT_KEY, DEFAULT_EXCLUDED_APPS, EXCLUDED_APPS_KEY, LAST_SYNC_DATE_KEY,
    SYNC_ENABLED_KEY, SettingsSnapshot,
};
