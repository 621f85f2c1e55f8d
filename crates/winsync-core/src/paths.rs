use std::path::{Path, PathBuf};

/// Overrides the WinSync home directory.
pub const HOME_ENV: &str = "WINSYNC_HOME";

/// Overrides the config file location.
pub const CONFIG_ENV: &str = "WINSYNC_CONFIG";

const HOME_DIR_NAME: &str = ".winsync";
const CONFIG_FILE_NAME: &str = "config.toml";
const STORE_DIR_NAME: &str = "store";

/// Filesystem locations used by WinSync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinSyncPaths {
    home: PathBuf,
    config_file: PathBuf,
}

impl WinSyncPaths {
    /// Resolve from the environment, defaulting to `~/.winsync`.
    ///
    /// Falls back to `./.winsync` if the home directory cannot be determined.
    pub fn resolve() -> Self {
        let home = env_path(HOME_ENV).unwrap_or_else(|| match dirs::home_dir() {
            Some(home) => home.join(HOME_DIR_NAME),
            None => {
                tracing::error!(
                    event = "core.paths.home_dir_not_found",
                    fallback = ".",
                    "Could not determine home directory - using current directory as fallback"
                );
                PathBuf::from(".").join(HOME_DIR_NAME)
            }
        });
        let config_file = env_path(CONFIG_ENV).unwrap_or_else(|| home.join(CONFIG_FILE_NAME));
        Self { home, config_file }
    }

    /// Paths rooted at `home`, ignoring the environment.
    pub fn from_dir(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        let config_file = home.join(CONFIG_FILE_NAME);
        Self { home, config_file }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    pub fn default_store_dir(&self) -> PathBuf {
        self.home.join(STORE_DIR_NAME)
    }
}

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var(var)
        .ok()
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_dir_layout() {
        let paths = WinSyncPaths::from_dir("/tmp/ws");
        assert_eq!(paths.home(), Path::new("/tmp/ws"));
        assert_eq!(paths.config_file(), Path::new("/tmp/ws/config.toml"));
        assert_eq!(paths.default_store_dir(), PathBuf::from("/tmp/ws/store"));
    }

    #[test]
    fn test_resolve_honours_env_overrides() {
        temp_env::with_vars(
            [
                (HOME_ENV, Some("/tmp/ws-home")),
                (CONFIG_ENV, Some("/tmp/elsewhere.toml")),
            ],
            || {
                let paths = WinSyncPaths::resolve();
                assert_eq!(paths.home(), Path::new("/tmp/ws-home"));
                assert_eq!(paths.config_file(), Path::new("/tmp/elsewhere.toml"));
            },
        );
    }

    #[test]
    fn test_empty_env_is_ignored() {
        temp_env::with_vars([(HOME_ENV, Some("")), (CONFIG_ENV, None::<&str>)], || {
            let paths = WinSyncPaths::resolve();
            assert!(paths.home().ends_with(".winsync"));
            assert_eq!(paths.config_file(), paths.home().join("config.toml"));
        });
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home(Path::new("/abs/dir")), PathBuf::from("/abs/dir"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/Sync")), home.join("Sync"));
        }
    }
}
