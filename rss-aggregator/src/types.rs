use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;
// Use the interfaces crate for core types
pub use interfaces::defs::{
    CategorizedArticle, Category, CategoryRule, CategoryRules, DateWindow, FilterSettings,
    FilteredArticle, MergedArticle, RawArticle, SourceFallback, SourceRef, TopicKey,
    TranslatedArticle, OTHERS_LABEL,
};
pub use interfaces::digest::{Digest, DigestSection};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_seconds: u64,
    pub max_feed_size_mb: usize,
    pub follow_redirects: bool,
    pub max_redirects: usize,
    /// Feeds fetched at the same time.
    pub concurrency: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "RSS-Aggregator/1.0".to_string(),
            timeout_seconds: 30,
            max_retries: 3,
            retry_delay_seconds: 5,
            max_feed_size_mb: 10,
            follow_redirects: true,
            max_redirects: 5,
            concurrency: 4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchResult {
    pub url: String,
    pub success: bool,
    pub error: Option<String>,
    pub fetch_time: DateTime<Utc>,
    pub response_time_ms: u64,
    pub http_status: Option<u16>,
    pub content: Option<String>, // RSS/XML content
}

impl FetchResult {
    pub(crate) fn failed(
        url: &str,
        fetch_time: DateTime<Utc>,
        elapsed: Duration,
        error: String,
    ) -> Self {
        Self {
            url: url.to_string(),
            success: false,
            error: Some(error),
            fetch_time,
            response_time_ms: elapsed.as_millis() as u64,
            http_status: None,
            content: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranslateConfig {
    pub enabled: bool,
    pub source_language: String,
    pub target_language: String,
    pub endpoint: String,
    pub request_delay_ms: u64,
    pub failure_delay_ms: u64,
    pub max_summary_chars: usize,
    pub timeout_seconds: u64,
}

impl TranslateConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn failure_delay(&self) -> Duration {
        Duration::from_millis(self.failure_delay_ms)
    }
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            source_language: "auto".to_string(),
            target_language: "zh-CN".to_string(),
            endpoint: "https://translate.googleapis.com/translate_a/single".to_string(),
            request_delay_ms: 500,
            failure_delay_ms: 1000,
            max_summary_chars: 2000,
            timeout_seconds: 15,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Feed size exceeds limit: {size_mb}MB")]
    FeedTooLarge { size_mb: usize },

    #[error("Translation failed: {0}")]
    Translation(String),

    #[error("Invalid date range {input:?}: {reason}. Use 'YYYYMMDD-YYYYMMDD'")]
    InvalidRange { input: String, reason: String },

    #[error("--days {days} reaches past the supported date range")]
    InvalidDays { days: u32 },

    #[error("Configuration error in {path}: {message}")]
    Config { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, AggregatorError>;
