//! Runtime configuration
//!
//! Paths come from the environment (optionally via a `.env` file):
//! `VERSEDECK_DATA_DIR` points at the directory of translation source
//! documents, `VERSEDECK_DB` overrides the store file location.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// Directory scanned for translation source documents
pub fn data_dir() -> PathBuf {
    match std::env::var("VERSEDECK_DATA_DIR") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => Path::new("data").to_path_buf(),
    }
}

/// Location of the SQLite store file.
///
/// `VERSEDECK_DB` wins when set; otherwise the per-user data directory,
/// falling back to the working directory when that cannot be resolved.
pub fn db_path() -> PathBuf {
    if let Ok(path) = std::env::var("VERSEDECK_DB") {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    let Some(dirs) = ProjectDirs::from("com", "versedeck", "versedeck") else {
        return Path::new("verses.db").to_path_buf();
    };
    dirs.data_dir().join("verses.db")
}

/// Load a `.env` file when present. A malformed file is a warning, not a
/// startup failure.
pub fn load_env() {
    match dotenvy::dotenv() {
        Ok(path) => eprintln!("[Config] Environment loaded from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => eprintln!("[Config] Warning: could not load .env file: {}", e),
    }
}
