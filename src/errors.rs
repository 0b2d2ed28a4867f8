use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("SQLite error : {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("HTTP client error : {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error : {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error : {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not parse config : {0}")]
    Config(#[from] toml::de::Error),

    #[error("Could not parse page : {0}")]
    Parse(String),

    #[error("Operating System is not supported : {0}")]
    UnsupportedOS(String),

    #[error("Could not get env value : {0}")]
    UnavailableEnvVariable(String),

    #[error("Could not create path : {0}")]
    PathCreationFailed(String),

    #[error("{0}")]
    Generic(String),
}

pub type Result<T> = std::result::Result<T, CrawlError>;
