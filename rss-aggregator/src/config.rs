use crate::renderer::RenderOptions;
use crate::types::{
    AggregatorError, CategoryRules, FetchConfig, FilterSettings, Result, SourceFallback,
    TranslateConfig,
};
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_CONFIG_PATH: &str = "config/settings.toml";
pub const DEFAULT_CATEGORIES_PATH: &str = "config/categories.json";

pub const ENV_CONFIG_PATH: &str = "RSS_DIGEST_CONFIG";

pub const DEFAULT_FEEDS: &[&str] = &[
    "https://techcrunch.com/category/artificial-intelligence/feed/",
    "https://www.theguardian.com/profile/editorial/rss",
    "https://cn.nytimes.com/rss/",
    "https://www.france24.com/en/rss",
    "https://www.lefigaro.fr/rss/figaro_actualites.xml",
    "https://feeds.washingtonpost.com/rss/politics",
    "https://search.cnbc.com/rs/search/combinedcms/view.xml?partnerId=wrss01&id=100003114",
];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CategoriesConfig {
    pub path: PathBuf,
}

impl Default for CategoriesConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_CATEGORIES_PATH),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub feeds: Vec<String>,
    pub filter: FilterSettings,
    pub categories: CategoriesConfig,
    pub fallback: SourceFallback,
    pub fetch: FetchConfig,
    pub translate: TranslateConfig,
    pub output: RenderOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            feeds: DEFAULT_FEEDS.iter().map(|s| s.to_string()).collect(),
            filter: FilterSettings::default(),
            categories: CategoriesConfig::default(),
            fallback: SourceFallback::default(),
            fetch: FetchConfig::default(),
            translate: TranslateConfig::default(),
            output: RenderOptions::default(),
        }
    }
}

impl Settings {
    /// Load settings using an explicit path, then fallbacks:
    /// 1) $RSS_DIGEST_CONFIG
    /// 2) config/settings.toml
    /// 3) built-in defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let path = PathBuf::from(p);
            if !path.exists() {
                return Err(AggregatorError::Config {
                    path: path.display().to_string(),
                    message: format!("{ENV_CONFIG_PATH} points to a non-existent file"),
                });
            }
            return Self::from_path(&path);
        }
        let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default_path.exists() {
            return Self::from_path(&default_path);
        }
        info!("No settings file found, using built-in defaults");
        Ok(Self::default())
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| AggregatorError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let settings = Self::from_toml_str(&content).map_err(|e| AggregatorError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        info!("Loaded settings from {} ({} feeds)", path.display(), settings.feeds.len());
        Ok(settings)
    }

    pub fn from_toml_str(s: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn category_rules(&self) -> CategoryRules {
        load_category_rules(&self.categories.path)
    }
}

/// Reads the ordered category map. A missing or malformed file is logged
/// and yields no rules, which sends every article to "Others".
pub fn load_category_rules(path: &Path) -> CategoryRules {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Could not read category config {}: {}", path.display(), e);
            return CategoryRules::default();
        }
    };
    match parse_category_rules(&content) {
        Ok(rules) => {
            info!("Loaded {} categories from {}", rules.len(), path.display());
            rules
        }
        Err(e) => {
            warn!("Failed to load category config {}: {}", path.display(), e);
            CategoryRules::default()
        }
    }
}

/// Parses a JSON object of label -> keywords, keeping key order.
pub fn parse_category_rules(json: &str) -> Result<CategoryRules> {
    let map: IndexMap<String, Vec<String>> = serde_json::from_str(json)?;
    Ok(map.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_means_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings.feeds.len(), DEFAULT_FEEDS.len());
        assert!(!settings.filter.show_images);
        assert_eq!(settings.fallback.category, "Politics");
        assert_eq!(settings.translate.target_language, "zh-CN");
        assert_eq!(settings.output.dir, PathBuf::from("output"));
    }

    #[test]
    fn sections_override_defaults() {
        let toml = r#"
            feeds = ["https://example.com/feed.xml"]

            [filter]
            blocked_keywords = ["sponsored", "advertorial"]
            show_images = true

            [fallback]
            category = "Politik"
            sources = ["reuters", "apnews"]

            [fetch]
            max_retries = 1
            concurrency = 2

            [translate]
            enabled = false
            request_delay_ms = 0

            [output]
            dir = "reports"
            summary_word_limit = 100
        "#;

        let settings = Settings::from_toml_str(toml).unwrap();

        assert_eq!(settings.feeds, vec!["https://example.com/feed.xml".to_string()]);
        assert_eq!(settings.filter.blocked_keywords.len(), 2);
        assert!(settings.filter.show_images);
        assert_eq!(settings.fallback.sources, vec!["reuters".to_string(), "apnews".to_string()]);
        assert_eq!(settings.fetch.max_retries, 1);
        assert_eq!(settings.fetch.timeout_seconds, 30);
        assert!(!settings.translate.enabled);
        assert_eq!(settings.translate.failure_delay_ms, 1000);
        assert_eq!(settings.output.summary_word_limit, Some(100));
    }

    #[test]
    fn malformed_settings_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "feeds = 42").unwrap();

        let err = Settings::load(Some(&path)).unwrap_err();
        assert!(matches!(err, AggregatorError::Config { .. }));
    }

    #[test]
    fn category_order_is_preserved() {
        let rules =
            parse_category_rules(r#"{"Tech": ["AI"], "Markets": ["stocks"], "Others": []}"#)
                .unwrap();
        let labels: Vec<_> = rules.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Tech", "Markets", "Others"]);
    }

    #[test]
    fn unreadable_category_files_degrade_to_no_rules() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_category_rules(&dir.path().join("missing.json")).is_empty());

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "[1, 2, 3]").unwrap();
        assert!(load_category_rules(&bad).is_empty());
    }
}
