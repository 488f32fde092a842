use anyhow::{Context, Result};
use log::LevelFilter;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::config::ConfigManager;
use crate::error::GitError;

const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024; // 10MB

/// Initialize console logging
///
/// The level comes from `RUST_LOG` when set, otherwise from `fallback`
/// (the `log_level` setting), otherwise `warn`:
/// - `RUST_LOG=debug` - every git invocation with its working directory
/// - `RUST_LOG=warn` - failed git invocations only
/// - `RUST_LOG=off` - nothing
///
/// ```bash
/// RUST_LOG=debug gitwrap --repo ~/src/project log -n 5
/// ```
pub fn init_logger(fallback: Option<&str>) -> Result<()> {
    let default_level = std::env::var("RUST_LOG")
        .ok()
        .or_else(|| fallback.map(str::to_string))
        .and_then(|s| s.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Warn);

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{:5}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter_level(default_level)
        .target(env_logger::Target::Stderr)
        .try_init()
        .ok(); // Ignore error if logger is already initialized

    Ok(())
}

/// Append a line to the log file in the config directory
pub fn log_to_file(message: &str) -> Result<()> {
    ConfigManager::ensure_config_dir()?;
    append_line(&ConfigManager::log_file_path()?, message)
}

/// Record a failed git invocation, with its captured output, in the log file.
///
/// Errors that did not come from a git command exiting nonzero are skipped.
pub fn log_command_failure(error: &anyhow::Error) -> Result<()> {
    match failure_entry(error) {
        Some(entry) => log_to_file(&entry),
        None => Ok(()),
    }
}

fn failure_entry(error: &anyhow::Error) -> Option<String> {
    error.chain().find_map(|cause| match cause.downcast_ref::<GitError>() {
        Some(GitError::CommandFailed {
            command,
            status,
            message,
        }) => Some(format!(
            "'{command}' failed ({status}):\n{}",
            message.trim_end()
        )),
        _ => None,
    })
}

fn append_line(log_path: &Path, message: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    writeln!(
        file,
        "[{}] {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        message
    )?;

    Ok(())
}

/// Rotate the log file if it exceeds 10MB
pub fn rotate_log_if_needed() -> Result<()> {
    rotate(&ConfigManager::log_file_path()?, MAX_LOG_SIZE)
}

fn rotate(log_path: &Path, max_size: u64) -> Result<()> {
    if !log_path.exists() {
        return Ok(());
    }

    let metadata = std::fs::metadata(log_path)?;
    if metadata.len() > max_size {
        let old_log_path = log_path.with_extension("log.old");

        if old_log_path.exists() {
            std::fs::remove_file(&old_log_path)?;
        }

        std::fs::rename(log_path, &old_log_path)?;

        log::info!("Log file rotated to {}", old_log_path.display());
    }

    Ok(())
}
