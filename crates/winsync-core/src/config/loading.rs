use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, info};

use crate::paths::WinSyncPaths;

use super::errors::ConfigError;
use super::types::WinSyncConfig;

/// Load the config file for `paths`. A missing file yields the defaults.
pub fn load_config(paths: &WinSyncPaths) -> Result<WinSyncConfig, ConfigError> {
    load_config_from(paths.config_file())
}

pub fn load_config_from(path: &Path) -> Result<WinSyncConfig, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(
                event = "core.config.not_found",
                path = %path.display(),
                "Using default configuration"
            );
            return Ok(WinSyncConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::ReadFailed {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let config = parse_config(path, &content)?;
    info!(
        event = "core.config.load_completed",
        path = %path.display(),
        sync_configured = config.is_sync_configured()
    );
    Ok(config)
}

fn parse_config(path: &Path, content: &str) -> Result<WinSyncConfig, ConfigError> {
    let config: WinSyncConfig = toml::from_str(content).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &WinSyncConfig) -> Result<(), ConfigError> {
    if let Some(id) = &config.device.id
        && id.trim().is_empty()
    {
        return Err(ConfigError::InvalidConfiguration {
            message: "[device] id must not be empty".to_string(),
        });
    }
    if let Some(dir) = &config.sync.remote_dir
        && dir.as_os_str().is_empty()
    {
        return Err(ConfigError::InvalidConfiguration {
            message: "[sync] remote_dir must not be empty".to_string(),
        });
    }
    Ok(())
}
