use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::command;
use crate::config::ConfigManager;

/// Persistent settings for the `gitwrap` binary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Path or bare name of the git executable (platform default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_executable: Option<PathBuf>,

    /// Environment overrides applied to every repository the CLI opens
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Console log level used when `RUST_LOG` is not set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Settings {
    /// Load settings from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&ConfigManager::settings_path()?)
    }

    /// Load settings from `path`, falling back to defaults if it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&ConfigManager::settings_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Install the configured executable as the process-wide git executable
    pub fn apply(&self) {
        match &self.git_executable {
            Some(path) => command::set_git_executable(path),
            None => command::use_platform_default_executable(),
        }
    }
}

/// Parse a `KEY=VALUE` pair as given on the command line
pub fn parse_env_pair(pair: &str) -> Result<(String, String)> {
    let (key, value) = pair
        .split_once('=')
        .with_context(|| format!("Expected KEY=VALUE, got '{pair}'"))?;
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("Environment variable name is empty in '{pair}'");
    }
    Ok((key.to_string(), value.to_string()))
}

/// Update the stored settings
pub fn update_settings(git_executable: Option<PathBuf>, env: Vec<String>) -> Result<()> {
    let mut settings = Settings::load()?;

    if let Some(path) = git_executable {
        println!(
            "{}",
            format!("Set git executable to {}", path.display()).green()
        );
        settings.git_executable = Some(path);
    }

    for pair in env {
        let (key, value) = parse_env_pair(&pair)?;
        println!("{}", format!("Set {key}={value}").green());
        settings.env.insert(key, value);
    }

    settings.save()?;
    println!("{}", "Configuration saved successfully!".green().bold());

    Ok(())
}

/// Show the stored settings
pub fn show_settings() -> Result<()> {
    let settings = Settings::load()?;

    println!("{}", "Current Configuration:".bold());
    println!(
        "  {}: {}",
        "Git executable".cyan(),
        settings
            .git_executable
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| format!("{} (default)", command::platform_default_executable()))
    );
    println!(
        "  {}: {}",
        "Git available".cyan(),
        if command::is_available() {
            "Yes".green()
        } else {
            "No".red()
        }
    );
    if settings.env.is_empty() {
        println!("  {}: None", "Environment".cyan());
    } else {
        println!("  {}:", "Environment".cyan());
        for (key, value) in &settings.env {
            println!("    {key}={value}");
        }
    }

    Ok(())
}
