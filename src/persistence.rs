//! JSON persistence helpers for files under the data directory.

use crate::constants::{DATA_DIR_ENV, DATA_DIR_NAME};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Get the data directory path, creating it if needed.
///
/// Defaults to `~/.math-runner/`; `MATH_RUNNER_HOME` overrides it.
pub fn data_dir() -> io::Result<PathBuf> {
    let dir = match std::env::var_os(DATA_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let home_dir = dirs::home_dir().ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    "Could not determine home directory",
                )
            })?;
            home_dir.join(DATA_DIR_NAME)
        }
    };
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Get the full path for a file in the data directory.
pub fn data_path(filename: &str) -> io::Result<PathBuf> {
    Ok(data_dir()?.join(filename))
}

/// Load a JSON file from the data directory, returning `T::default()` if
/// missing or invalid.
pub fn load_json_or_default<T: Default + serde::de::DeserializeOwned>(filename: &str) -> T {
    match data_path(filename) {
        Ok(path) => read_json_or_default(&path),
        Err(_) => T::default(),
    }
}

/// Read a JSON file at an explicit path, returning `T::default()` if missing
/// or invalid.
pub fn read_json_or_default<T: Default + serde::de::DeserializeOwned>(path: &Path) -> T {
    match fs::read_to_string(path) {
        Ok(json) => serde_json::from_str(&json).unwrap_or_default(),
        Err(_) => T::default(),
    }
}

/// Write a value as pretty-printed JSON.
pub fn write_json<T: serde::Serialize>(path: &Path, data: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(path, json)
}
