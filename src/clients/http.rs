//! Plain HTTP page fetching with reqwest

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use tracing::debug;

use super::PageSource;
use crate::HttpConfig;
use crate::utils::{DEFAULT_FETCH_TIMEOUT_MS, SyndicationError, SyndicationResult, validate_fetch_timeout};

/// Fetches pages over HTTP, following a few redirects
#[derive(Clone)]
pub struct HttpPageSource {
    client: reqwest::Client,
}

impl HttpPageSource {
    pub fn new(config: &HttpConfig) -> SyndicationResult<Self> {
        let timeout = validate_fetch_timeout(config.timeout_ms, DEFAULT_FETCH_TIMEOUT_MS)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| SyndicationError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self, url: &str) -> SyndicationResult<String> {
        debug!("Fetching {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyndicationError::UpstreamFetch(format!("HTTP {status} for {url}")));
        }

        Ok(response.text().await?)
    }
}
