use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use crate::errors::{CrawlError, Result};

const APP_DIR: &str = ".bookcrawl";

// ========== Delays ==========

/// Inclusive range of milliseconds a politeness sleep is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    #[cfg(test)]
    pub const fn none() -> Self {
        Self::new(0, 0)
    }

    /// Draw a uniformly distributed duration; a degenerate range yields `min_ms`
    pub fn sample(&self) -> Duration {
        if self.max_ms <= self.min_ms {
            return Duration::from_millis(self.min_ms);
        }
        let ms = rand::rng().random_range(self.min_ms..=self.max_ms);
        Duration::from_millis(ms)
    }

    /// Sleep for a sampled duration, skipping the timer entirely when it is zero
    pub async fn wait(&self) {
        let d = self.sample();
        if !d.is_zero() {
            tokio::time::sleep(d).await;
        }
    }
}

// ========== Database Configuration ==========

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite file; defaults to ~/.bookcrawl/data.db3
    pub path: Option<String>,
}

// ========== Site Configuration ==========

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "https://book.douban.com".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self { base_url: default_base_url() }
    }
}

// ========== Fetch Configuration ==========

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchConfig {
    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Total attempts per fetch, first one included
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Pool of user agents, one is drawn per fetch
    #[serde(default = "default_user_agents")]
    pub user_agents: Vec<String>,

    /// Sleep taken before every fetch
    #[serde(default = "default_pre_delay")]
    pub pre_delay_ms: DelayRange,

    /// Sleep taken between two failed attempts
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: DelayRange,
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_max_attempts() -> u32 {
    3
}

fn default_pre_delay() -> DelayRange {
    DelayRange::new(100, 2000)
}

fn default_retry_delay() -> DelayRange {
    DelayRange::new(1000, 2000)
}

fn default_user_agents() -> Vec<String> {
    [
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/117.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/117.0.0.0 Safari/537.36",
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/117.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/117.0",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:109.0) Gecko/20100101 Firefox/117.0",
        "Mozilla/5.0 (X11; Linux i686; rv:109.0) Gecko/20100101 Firefox/117.0",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/117.0.0.0 Safari/537.36 Edg/117.0.2040.0",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.5 Safari/605.1.15",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            user_agents: default_user_agents(),
            pre_delay_ms: default_pre_delay(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ========== Politeness Configuration ==========

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PolitenessConfig {
    /// Between tag listing pages and between tags
    #[serde(default = "default_tag_page_delay")]
    pub tag_page: DelayRange,

    /// Between two detail pages
    #[serde(default = "default_detail_delay")]
    pub detail: DelayRange,

    /// Between comment pages and between books
    #[serde(default = "default_comment_delay")]
    pub comment: DelayRange,
}

fn default_tag_page_delay() -> DelayRange {
    DelayRange::new(100, 1500)
}

fn default_detail_delay() -> DelayRange {
    DelayRange::new(1500, 3000)
}

fn default_comment_delay() -> DelayRange {
    DelayRange::new(100, 2000)
}

impl Default for PolitenessConfig {
    fn default() -> Self {
        Self {
            tag_page: default_tag_page_delay(),
            detail: default_detail_delay(),
            comment: default_comment_delay(),
        }
    }
}

// ========== Root Configuration ==========

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub site: SiteConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub politeness: PolitenessConfig,
}

impl Config {
    /// Load configuration from the given file, or ~/.bookcrawl/config.toml
    pub fn load(custom_path: Option<&Path>) -> Result<Self> {
        let config_path = match custom_path {
            Some(p) => p.to_path_buf(),
            None => Self::get_config_path()?,
        };

        if !config_path.exists() {
            // No config file, return default
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Get the path to the configuration file
    fn get_config_path() -> Result<PathBuf> {
        Ok(app_dir()?.join("config.toml"))
    }

    /// Create a sample configuration file
    pub fn create_sample(custom_path: Option<&Path>) -> Result<PathBuf> {
        let config_path = match custom_path {
            Some(p) => p.to_path_buf(),
            None => Self::get_config_path()?,
        };

        if config_path.exists() {
            return Err(CrawlError::Generic(format!(
                "Config file already exists at {}",
                config_path.display()
            )));
        }

        let sample = r#"# bookcrawl Configuration File

[database]
# SQLite file holding books, authors, tags and comments
# path = "/home/user/.bookcrawl/data.db3"

[site]
base_url = "https://book.douban.com"

[fetch]
# Per-request timeout in seconds
timeout_secs = 5
# Total attempts per page, the first one included
max_attempts = 3
# Random sleep before every request, and between failed attempts
pre_delay_ms = { min_ms = 100, max_ms = 2000 }
retry_delay_ms = { min_ms = 1000, max_ms = 2000 }

[politeness]
# Random sleeps between units of work, in milliseconds
tag_page = { min_ms = 100, max_ms = 1500 }
detail = { min_ms = 1500, max_ms = 3000 }
comment = { min_ms = 100, max_ms = 2000 }
"#;

        std::fs::write(&config_path, sample)?;

        info!("Sample config created at: {}", config_path.display());
        Ok(config_path)
    }
}

/// ~/.bookcrawl, created on first use
pub fn app_dir() -> Result<PathBuf> {
    let var = if cfg!(target_os = "windows") { "USERPROFILE" } else { "HOME" };
    let home = std::env::var(var)
        .map_err(|_| CrawlError::UnavailableEnvVariable(var.to_string()))?;

    let dir = PathBuf::from(home).join(APP_DIR);

    // Create directory if it doesn't exist
    if !dir.exists() {
        std::fs::create_dir_all(&dir)
            .map_err(|_| CrawlError::PathCreationFailed(dir.display().to_string()))?;
    }

    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let cfg = Config::from_toml("").unwrap();
        assert_eq!(cfg.site.base_url, "https://book.douban.com");
        assert_eq!(cfg.fetch.max_attempts, 3);
        assert_eq!(cfg.fetch.timeout_secs, 5);
        assert_eq!(cfg.fetch.user_agents.len(), 8);
        assert_eq!(cfg.politeness.detail, DelayRange::new(1500, 3000));
        assert!(cfg.database.path.is_none());
    }

    #[test]
    fn test_partial_sections() {
        let cfg = Config::from_toml(
            r#"
            [database]
            path = "/tmp/books.db3"

            [politeness]
            detail = { min_ms = 10, max_ms = 20 }
            "#,
        )
        .unwrap();
        assert_eq!(cfg.database.path.as_deref(), Some("/tmp/books.db3"));
        assert_eq!(cfg.politeness.detail, DelayRange::new(10, 20));
        assert_eq!(cfg.politeness.comment, DelayRange::new(100, 2000));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(Config::from_toml("[fetch\n"), Err(CrawlError::Config(_))));
    }

    #[test]
    fn test_delay_sample_bounds() {
        let range = DelayRange::new(100, 200);
        for _ in 0..50 {
            let d = range.sample().as_millis() as u64;
            assert!((100..=200).contains(&d));
        }
        assert_eq!(DelayRange::new(300, 100).sample(), Duration::from_millis(300));
        assert!(DelayRange::none().sample().is_zero());
    }

    #[test]
    fn test_sample_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        Config::create_sample(Some(&path)).unwrap();
        let cfg = Config::load(Some(&path)).unwrap();
        assert_eq!(cfg.fetch.retry_delay_ms, DelayRange::new(1000, 2000));
        assert!(Config::create_sample(Some(&path)).is_err());
    }
}
