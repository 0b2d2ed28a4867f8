use std::{env, fs, path::{Path, PathBuf}, time::Duration};

use rusqlite::Connection;

use crate::errors::{CrawlError, Result};

pub fn get_default_db_path() -> Result<PathBuf> {
    let os = std::env::consts::OS;
    let dir = match os {
        "windows" => {
            let v = "LOCALAPPDATA";
            let base = env::var(v)
                .map_err(|_| CrawlError::UnavailableEnvVariable(v.to_string()))?;
            PathBuf::from(base).join("bookcrawl")
        }
        "linux" | "macos" => crate::config::app_dir()?,
        x => return Err(CrawlError::UnsupportedOS(x.to_string())),
    };

    if !dir.exists() {
        fs::create_dir_all(&dir)
            .map_err(|_| CrawlError::PathCreationFailed(dir.display().to_string()))?;
    }

    Ok(dir.join("data.db3"))
}

/// Where the store lives. Every repository keeps its own copy and opens a
/// fresh connection per call.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
    pub busy_timeout: Duration,
}

impl DbConfig {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            busy_timeout: Duration::from_secs(5),
        }
    }

    pub fn from_custom_or_default(custom_path: Option<&str>) -> Result<Self> {
        let path = match custom_path {
            Some(p) => PathBuf::from(p),
            None => get_default_db_path()?,
        };
        Ok(Self::new(path))
    }

    pub fn open(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;

        // SQLite disables foreign keys by default
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(self.busy_timeout)?;

        Ok(conn)
    }
}
