//! Microformats to wiki pages
//!
//! Reads the `h-review`, `h-entry`, `h-recipe` and `h-geo` markup of a web page,
//! merges reviews into the matching wiki page with a recomputed aggregate
//! rating, and maps the reviewed places of a category.

pub mod clients;
pub mod geo;
pub mod microformats;
pub mod review;
mod syndicator;
mod utils;
pub mod wiki;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use syndicator::{PageEdit, SyndicationReport, Syndicator, SyndicatorOptions};
pub use utils::constants;
pub use utils::{SyndicationError, SyndicationResult, validate_fetch_timeout};

/// Environment variable that overrides `wiki.password`
pub const PASSWORD_ENV: &str = "COFFEEBOT_WIKI_PASSWORD";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub wiki: WikiConfig,

    #[serde(default)]
    pub geocoder: GeocoderConfig,

    #[serde(default)]
    pub http: HttpConfig,

    /// Only accept submissions from authors who are wiki users
    #[serde(default)]
    pub require_authorized_author: bool,
}

/// Target wiki and the account the bot edits with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikiConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Prefix of canonical page URLs
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Login is skipped unless both username and password are set
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Name used in edit summaries
    #[serde(default = "default_bot_name")]
    pub bot_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    #[serde(default = "default_geocoder_endpoint")]
    pub endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout; validated against MAX_FETCH_TIMEOUT_MS
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Upper bound on parallel page fetches during aggregation
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
}

fn default_api_url() -> String {
    constants::DEFAULT_API_URL.to_string()
}

fn default_base_url() -> String {
    constants::DEFAULT_BASE_URL.to_string()
}

fn default_bot_name() -> String {
    "coffeebot".to_string()
}

fn default_geocoder_endpoint() -> String {
    constants::DEFAULT_GEOCODER_ENDPOINT.to_string()
}

fn default_user_agent() -> String {
    constants::BOT_USER_AGENT.to_string()
}

fn default_max_concurrent_fetches() -> usize {
    4
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wiki: WikiConfig::default(),
            geocoder: GeocoderConfig::default(),
            http: HttpConfig::default(),
            require_authorized_author: false,
        }
    }
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            base_url: default_base_url(),
            username: None,
            password: None,
            bot_name: default_bot_name(),
        }
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: default_geocoder_endpoint(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: None,
            user_agent: default_user_agent(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
        }
    }
}

impl WikiConfig {
    /// Username and password, when both are configured
    pub fn credentials(&self) -> Option<(String, String)> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some((username.clone(), password.clone())),
            _ => None,
        }
    }
}

/// Parse a config document; missing fields take their defaults
pub fn parse_yaml_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = serde_yaml::from_str(contents).context("Invalid config YAML")?;
    Ok(config)
}

/// Load config from `path`, or from config.yaml in package root
///
/// A missing file yields the defaults. The wiki password from the
/// environment wins over the file.
pub fn load_yaml_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config.yaml"));

    let mut config = if config_path.exists() {
        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        parse_yaml_config(&contents)?
    } else {
        Config::default()
    };

    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        config.wiki.password = Some(password);
    }

    Ok(config)
}

/// Wire the network collaborators described by `config` into a [`Syndicator`]
pub fn build_syndicator(config: &Config, dry_run: bool) -> SyndicationResult<Syndicator> {
    let timeout = validate_fetch_timeout(config.http.timeout_ms, utils::DEFAULT_FETCH_TIMEOUT_MS)?;

    let api_client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(config.http.user_agent.clone())
        .cookie_store(true)
        .build()
        .map_err(|e| SyndicationError::Config(format!("Failed to create wiki client: {e}")))?;

    let pages: Arc<dyn clients::PageSource> = Arc::new(clients::HttpPageSource::new(&config.http)?);
    let geocoder = Arc::new(clients::NominatimGeocoder::new(
        api_client.clone(),
        config.geocoder.endpoint.clone(),
    ));
    let wiki: Arc<dyn clients::WikiStore> = Arc::new(clients::MediaWikiClient::new(
        api_client,
        config.wiki.api_url.clone(),
        config.wiki.credentials(),
    ));

    let publisher = geo::CategoryMapPublisher::new(
        Arc::clone(&wiki),
        geo::GeoAggregator::new(Arc::clone(&pages), config.http.max_concurrent_fetches),
        config.wiki.base_url.clone(),
        config.wiki.bot_name.clone(),
    );

    Ok(Syndicator::new(
        pages,
        geocoder,
        wiki,
        publisher,
        SyndicatorOptions {
            bot_name: config.wiki.bot_name.clone(),
            require_authorized_author: config.require_authorized_author,
            dry_run,
        },
    ))
}
