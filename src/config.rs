//! # Unified Application Configuration
//!
//! All settings for one run are read once at process start into a single
//! [`AppConfig`], validated, and handed to each component explicitly.
//! Values come from environment variables (a `.env` file is loaded by the
//! binary beforehand).

use crate::errors::{AppError, AppResult};
use std::env;
use std::str::FromStr;

/// Default Cuelinks offers endpoint
pub const DEFAULT_OFFERS_ENDPOINT: &str = "https://www.cuelinks.com/api/v1/offers.json";

/// Default location of the posted-offer store
pub const DEFAULT_DB_PATH: &str = "posted_offers.db";

/// Merchant substrings used when `PREFERRED_SITES` is not set
pub const DEFAULT_PREFERRED_SITES: &[&str] = &[
    "zepto",
    "blinkit",
    "instamart",
    "zomato",
    "swiggy",
    "dominos",
    "pizzahut",
    "oyo",
    "makemytrip",
    "goibibo",
    "irctc",
    "redbus",
    "uber",
    "ola",
    "recharge",
    "insurance",
];

/// Telegram channel settings
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Telegram bot token
    pub token: String,
    /// Target channel: numeric chat id or `@username`
    pub channel_id: String,
    /// Bot API base URL override (local Bot API server, tests)
    pub api_url: Option<String>,
    /// HTTP client timeout in seconds for publish calls and image downloads
    pub http_timeout_secs: u64,
    /// Largest image downloaded for a photo post
    pub max_image_bytes: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            channel_id: String::new(),
            api_url: None,
            http_timeout_secs: 30,
            max_image_bytes: 10 * 1024 * 1024,
        }
    }
}

impl TelegramConfig {
    /// Validate Telegram configuration
    pub fn validate(&self) -> AppResult<()> {
        if self.token.trim().is_empty() {
            return Err(AppError::Config("Bot token cannot be empty".to_string()));
        }

        let parts: Vec<&str> = self.token.split(':').collect();
        if parts.len() != 2 {
            return Err(AppError::Config(
                "Bot token format is invalid. Expected format: 'bot_id:bot_token'".to_string(),
            ));
        }

        if parts[0].parse::<u64>().is_err() {
            return Err(AppError::Config(
                "Bot token bot ID must be numeric".to_string(),
            ));
        }

        if parts[1].len() < 20 {
            return Err(AppError::Config(
                "Bot token appears to be too short. Please verify it's a valid token".to_string(),
            ));
        }

        if self.channel_id.trim().is_empty() {
            return Err(AppError::Config("Channel id cannot be empty".to_string()));
        }

        if let Some(url) = &self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(AppError::Config(format!(
                    "Telegram API URL must start with http:// or https://: {}",
                    url
                )));
            }
        }

        if self.http_timeout_secs == 0 || self.http_timeout_secs > 300 {
            return Err(AppError::Config(
                "Telegram HTTP timeout must be between 1 and 300 seconds".to_string(),
            ));
        }

        if self.max_image_bytes == 0 {
            return Err(AppError::Config("Max image size cannot be 0".to_string()));
        }

        Ok(())
    }
}

/// Offers API settings
#[derive(Debug, Clone)]
pub struct OffersApiConfig {
    /// Cuelinks API token
    pub token: String,
    /// Offers endpoint URL
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum number of offers taken from one response
    pub fetch_limit: usize,
}

impl Default for OffersApiConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            endpoint: DEFAULT_OFFERS_ENDPOINT.to_string(),
            timeout_secs: 20,
            fetch_limit: 50,
        }
    }
}

impl OffersApiConfig {
    /// Validate offers API configuration
    pub fn validate(&self) -> AppResult<()> {
        if self.token.trim().is_empty() {
            return Err(AppError::Config("Offers API token cannot be empty".to_string()));
        }

        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(AppError::Config(format!(
                "Offers endpoint must start with http:// or https://: {}",
                self.endpoint
            )));
        }

        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(AppError::Config(
                "Offers API timeout must be between 1 and 300 seconds".to_string(),
            ));
        }

        if self.fetch_limit == 0 {
            return Err(AppError::Config("Fetch limit cannot be 0".to_string()));
        }

        Ok(())
    }
}

/// Per-run posting behaviour
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Maximum offers published in one run
    pub max_posts: usize,
    /// Pause between two publishes, in seconds
    pub post_delay_secs: u64,
    /// Consecutive publish failures that end the run early
    pub max_consecutive_failures: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_posts: 5,
            post_delay_secs: 2,
            max_consecutive_failures: 3,
        }
    }
}

impl RunConfig {
    /// Validate run configuration
    pub fn validate(&self) -> AppResult<()> {
        if self.max_posts == 0 {
            return Err(AppError::Config("MAX_POSTS must be at least 1".to_string()));
        }

        if self.max_consecutive_failures == 0 {
            return Err(AppError::Config(
                "MAX_CONSECUTIVE_FAILURES must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Merchant filter settings
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Lowercase merchant substrings
    pub preferred_sites: Vec<String>,
    /// Regex replacing the substring list when set
    pub merchant_pattern: Option<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            preferred_sites: DEFAULT_PREFERRED_SITES
                .iter()
                .map(|site| site.to_string())
                .collect(),
            merchant_pattern: None,
        }
    }
}

impl FilterConfig {
    /// Validate filter configuration
    pub fn validate(&self) -> AppResult<()> {
        if let Some(pattern) = &self.merchant_pattern {
            regex::Regex::new(pattern)?;
        } else if self.preferred_sites.is_empty() {
            return Err(AppError::Config(
                "Preferred sites list cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Parse a comma-separated site list into trimmed, lowercase, non-empty entries
pub fn parse_site_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|site| site.trim().to_lowercase())
        .filter(|site| !site.is_empty())
        .collect()
}

/// Unified application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Telegram configuration
    pub telegram: TelegramConfig,
    /// Offers API configuration
    pub offers: OffersApiConfig,
    /// Run configuration
    pub run: RunConfig,
    /// Merchant filter configuration
    pub filter: FilterConfig,
    /// Path of the posted-offer SQLite file
    pub db_path: String,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self {
            db_path: DEFAULT_DB_PATH.to_string(),
            ..Self::default()
        };

        // Required secrets
        config.telegram.token = required(&lookup, "TELEGRAM_BOT_TOKEN")?;
        config.telegram.channel_id = required(&lookup, "TELEGRAM_CHANNEL_ID")?;
        config.offers.token = required(&lookup, "CUELINKS_TOKEN")?;

        // Telegram
        config.telegram.api_url = optional(&lookup, "TELEGRAM_API_URL");
        config.telegram.http_timeout_secs =
            parsed(&lookup, "TELEGRAM_TIMEOUT_SECS", config.telegram.http_timeout_secs)?;
        config.telegram.max_image_bytes =
            parsed(&lookup, "MAX_IMAGE_BYTES", config.telegram.max_image_bytes)?;

        // Offers API
        if let Some(endpoint) = optional(&lookup, "CUELINKS_API_URL") {
            config.offers.endpoint = endpoint;
        }
        config.offers.timeout_secs =
            parsed(&lookup, "CUELINKS_TIMEOUT_SECS", config.offers.timeout_secs)?;
        config.offers.fetch_limit = parsed(&lookup, "FETCH_LIMIT", config.offers.fetch_limit)?;

        // Run behaviour
        config.run.max_posts = parsed(&lookup, "MAX_POSTS", config.run.max_posts)?;
        config.run.post_delay_secs =
            parsed(&lookup, "POST_DELAY_SECS", config.run.post_delay_secs)?;
        config.run.max_consecutive_failures = parsed(
            &lookup,
            "MAX_CONSECUTIVE_FAILURES",
            config.run.max_consecutive_failures,
        )?;

        // Filter
        if let Some(sites) = optional(&lookup, "PREFERRED_SITES") {
            config.filter.preferred_sites = parse_site_list(&sites);
        }
        config.filter.merchant_pattern = optional(&lookup, "MERCHANT_PATTERN");

        if let Some(path) = optional(&lookup, "POSTED_DB_PATH") {
            config.db_path = path;
        }

        Ok(config)
    }

    /// Validate all configuration sections
    pub fn validate(&self) -> AppResult<()> {
        self.telegram.validate()?;
        self.offers.validate()?;
        self.run.validate()?;
        self.filter.validate()?;

        if self.db_path.trim().is_empty() {
            return Err(AppError::Config("Database path cannot be empty".to_string()));
        }

        Ok(())
    }

    /// Get a summary of the current configuration for logging
    pub fn summary(&self) -> String {
        format!(
            "Configuration: bot_token=[REDACTED], cuelinks_token=[REDACTED], channel={}, endpoint={}, max_posts={}, fetch_limit={}, post_delay_secs={}, db_path={}, filter={}",
            self.telegram.channel_id,
            self.offers.endpoint,
            self.run.max_posts,
            self.offers.fetch_limit,
            self.run.post_delay_secs,
            self.db_path,
            match &self.filter.merchant_pattern {
                Some(pattern) => format!("pattern({})", pattern),
                None => format!("sites({})", self.filter.preferred_sites.len()),
            }
        )
    }
}

fn required<F>(lookup: &F, key: &str) -> AppResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, key)
        .ok_or_else(|| AppError::Config(format!("{} environment variable is required", key)))
}

fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> AppResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match optional(lookup, key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| AppError::Config(format!("{} must be a valid number", key))),
        None => Ok(default),
    }
}
