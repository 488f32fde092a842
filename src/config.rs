use anyhow::{Context, Result};
#[cfg(target_os = "linux")]
use std::ffi::OsString;
use std::path::PathBuf;

const APP_DIR: &str = "gitwrap";

/// Cross-platform configuration directory manager
pub struct ConfigManager;

impl ConfigManager {
    /// Get the main configuration directory path following platform conventions:
    /// - Linux: $XDG_CONFIG_HOME/gitwrap or ~/.config/gitwrap
    /// - macOS: ~/Library/Application Support/gitwrap
    /// - Windows: %APPDATA%\gitwrap
    pub fn config_dir() -> Result<PathBuf> {
        #[cfg(target_os = "linux")]
        {
            linux_config_dir(std::env::var_os("XDG_CONFIG_HOME"), dirs::home_dir())
        }

        #[cfg(target_os = "macos")]
        {
            let home = dirs::home_dir().context("Failed to get home directory")?;
            Ok(home.join("Library").join("Application Support").join(APP_DIR))
        }

        #[cfg(target_os = "windows")]
        {
            Ok(dirs::config_dir()
                .context("Failed to get Windows config directory")?
                .join(APP_DIR))
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
        {
            let home = dirs::home_dir().context("Failed to get home directory")?;
            Ok(home.join(".gitwrap"))
        }
    }

    /// Get the settings file path (config.toml)
    pub fn settings_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Get the log file path
    pub fn log_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("gitwrap.log"))
    }

    /// Ensure the configuration directory exists
    pub fn ensure_config_dir() -> Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config directory: {}", config_dir.display()))?;
        Ok(config_dir)
    }
}

/// `$XDG_CONFIG_HOME/gitwrap`, falling back to `~/.config/gitwrap` when the
/// variable is unset or empty
#[cfg(target_os = "linux")]
fn linux_config_dir(xdg_config: Option<OsString>, home: Option<PathBuf>) -> Result<PathBuf> {
    match xdg_config.filter(|value| !value.is_empty()) {
        Some(xdg_config) => Ok(PathBuf::from(xdg_config).join(APP_DIR)),
        None => {
            let home = home.context("Failed to get home directory")?;
            Ok(home.join(".config").join(APP_DIR))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_paths() {
        let config_dir = ConfigManager::config_dir().unwrap();
        assert!(config_dir.to_string_lossy().contains("gitwrap"));

        let settings = ConfigManager::settings_path().unwrap();
        assert!(settings.to_string_lossy().ends_with("config.toml"));

        let log = ConfigManager::log_file_path().unwrap();
        assert!(log.to_string_lossy().ends_with("gitwrap.log"));
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_xdg_config_home_respected() {
        let config_dir = linux_config_dir(
            Some(OsString::from("/tmp/test-xdg-config")),
            Some(PathBuf::from("/home/someone")),
        )
        .unwrap();
        assert_eq!(config_dir, PathBuf::from("/tmp/test-xdg-config/gitwrap"));
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_home_fallback_when_xdg_unset_or_empty() {
        let home = Some(PathBuf::from("/home/someone"));
        let expected = PathBuf::from("/home/someone/.config/gitwrap");

        assert_eq!(linux_config_dir(None, home.clone()).unwrap(), expected);
        assert_eq!(
            linux_config_dir(Some(OsString::new()), home).unwrap(),
            expected
        );
        assert!(linux_config_dir(None, None).is_err());
    }
}
