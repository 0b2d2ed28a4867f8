use rand::seq::IndexedRandom;
use reqwest::{header::USER_AGENT, StatusCode};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::FetchConfig;
use crate::errors::Result;

/// Where crawlers get their HTML from. `None` means the page could not be
/// obtained and the caller should skip it.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn fetch(&self, url: &str) -> Option<String>;
}

#[derive(Debug, Error)]
enum AttemptError {
    #[error("status {0}")]
    Status(StatusCode),
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

/// Plain HTTP GET with a random user agent, a politeness pause before each
/// call and a bounded number of attempts.
pub struct HttpFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl HttpFetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .no_proxy()
            .build()?;
        Ok(Self { client, config })
    }

    fn pick_user_agent(&self) -> Option<String> {
        self.config.user_agents.choose(&mut rand::rng()).cloned()
    }

    async fn attempt(&self, url: &str, user_agent: Option<&str>) -> std::result::Result<String, AttemptError> {
        let mut req = self.client.get(url);
        if let Some(ua) = user_agent {
            req = req.header(USER_AGENT, ua);
        }

        let resp = req.send().await?;
        if resp.status() != StatusCode::OK {
            return Err(AttemptError::Status(resp.status()));
        }

        // The site does not always declare its charset; it is always UTF-8
        let body = resp.bytes().await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

impl PageSource for HttpFetcher {
    async fn fetch(&self, url: &str) -> Option<String> {
        self.config.pre_delay_ms.wait().await;

        let user_agent = self.pick_user_agent();
        let attempts = self.config.max_attempts.max(1);

        for attempt in 1..=attempts {
            debug!("GET {url} (attempt {attempt}/{attempts})");
            match self.attempt(url, user_agent.as_deref()).await {
                Ok(body) => return Some(body),
                Err(e) => warn!("Request to {url} failed: {e} (attempt {attempt}/{attempts})"),
            }

            if attempt < attempts {
                self.config.retry_delay_ms.wait().await;
            }
        }

        error!("Giving up on {url} after {attempts} attempts");
        None
    }
}
