use crate::traits::Translator;
use crate::types::{AggregatorError, FilteredArticle, Result, TranslateConfig, TranslatedArticle};
use crate::utils::text::truncate_chars;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Client for the free Google Translate web endpoint.
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
    source_language: String,
    target_language: String,
}

impl GoogleTranslator {
    pub fn new(config: &TranslateConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            source_language: config.source_language.clone(),
            target_language: config.target_language.clone(),
        })
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    fn name(&self) -> String {
        format!("google ({} -> {})", self.source_language, self.target_language)
    }

    async fn translate(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", self.source_language.as_str()),
                ("tl", self.target_language.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AggregatorError::Translation(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let body: Value = response.json().await?;
        parse_google_response(&body)
    }
}

/// Joins the translated segments of a `translate_a/single` response.
///
/// The payload looks like `[[["Hallo","Hello",...],["Welt","World",...]],null,"en"]`.
pub fn parse_google_response(body: &Value) -> Result<String> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| AggregatorError::Translation("unexpected response shape".to_string()))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.is_empty() {
        return Err(AggregatorError::Translation("empty translation".to_string()));
    }
    Ok(translated)
}

/// Leaves text untouched. Used when translation is switched off.
pub struct PassthroughTranslator;

#[async_trait]
impl Translator for PassthroughTranslator {
    fn name(&self) -> String {
        "passthrough".to_string()
    }

    async fn translate(&self, text: &str) -> Result<String> {
        Ok(text.to_string())
    }
}

/// A title is sent for translation when it has a Latin letter or any
/// non-ASCII character. Digits and punctuation alone are copied as-is.
pub fn needs_translation(title: &str) -> bool {
    !title.is_empty() && title.chars().any(|c| !c.is_ascii() || c.is_ascii_alphabetic())
}

async fn translate_article(
    translator: &dyn Translator,
    article: &FilteredArticle,
    config: &TranslateConfig,
) -> Result<(String, String)> {
    let title = if needs_translation(&article.title) {
        translator.translate(&article.title).await?
    } else {
        article.title.clone()
    };

    let summary = truncate_chars(&article.summary, config.max_summary_chars);
    let summary = if summary.is_empty() {
        String::new()
    } else {
        translator.translate(summary).await?
    };

    Ok((title, summary))
}

/// Translates every article, one at a time, pausing between requests.
///
/// A failed article keeps its original text and gets no topic key; the
/// batch always carries on.
pub async fn translate_articles(
    translator: &dyn Translator,
    articles: Vec<FilteredArticle>,
    config: &TranslateConfig,
) -> Vec<TranslatedArticle> {
    info!("Translating {} articles with {}", articles.len(), translator.name());

    let mut translated = Vec::with_capacity(articles.len());
    let mut failures = 0usize;

    for article in articles {
        match translate_article(translator, &article, config).await {
            Ok((title, summary)) => {
                debug!(original = %article.title, translated = %title, "translated");
                translated.push(TranslatedArticle::translated(article, title, summary));
                pause(config.request_delay()).await;
            }
            Err(e) => {
                failures += 1;
                warn!(
                    title = %article.title,
                    error = %e,
                    "translation failed, keeping original text"
                );
                translated.push(TranslatedArticle::untranslated(article));
                pause(config.failure_delay()).await;
            }
        }
    }

    info!(
        "Translated {} articles ({} fell back to original text)",
        translated.len(),
        failures
    );
    translated
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
