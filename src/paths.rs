//! Platform-specific locations for the database, logs and config file.
//!
//! Uses the OS conventions from `directories`:
//! - Linux: ~/.local/share/tally, ~/.config/tally
//! - macOS: ~/Library/Application Support/tally
//! - Windows: %APPDATA%\tally

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::{Error, Result};

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "tally")
}

/// Data directory, created if missing.
pub fn data_dir() -> Result<PathBuf> {
    let dir = project_dirs().ok_or(Error::NoDataDir)?.data_dir().to_path_buf();
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

pub fn default_db_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("tally.db"))
}

pub fn log_dir() -> Result<PathBuf> {
    let dir = data_dir()?.join("logs");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}
