use crate::types::{AggregatorError, RawArticle, Result};
use feed_rs::parser;
use tracing::{debug, info, warn};

/// Placeholder for entries without a title or link.
pub const MISSING_FIELD: &str = "N/A";

pub struct FeedParser;

impl FeedParser {
    /// Parses RSS, Atom or JSON Feed content into raw articles attributed to
    /// `source_name`.
    pub fn parse_feed(content: &str, source_name: &str) -> Result<Vec<RawArticle>> {
        debug!("Parsing feed content ({} bytes)", content.len());

        let feed = parser::parse(content.as_bytes())
            .map_err(|e| AggregatorError::Parse(format!("Failed to parse feed: {}", e)))?;

        if let Some(title) = feed.title.as_ref() {
            debug!("Feed title: {}", title.content);
        }

        let articles: Vec<RawArticle> = feed
            .entries
            .into_iter()
            .map(|entry| Self::parse_entry(entry, source_name))
            .collect();

        info!("Parsed {} entries from {}", articles.len(), source_name);
        Ok(articles)
    }

    fn parse_entry(entry: feed_rs::model::Entry, source_name: &str) -> RawArticle {
        let title = entry
            .title
            .map(|t| t.content)
            .unwrap_or_else(|| MISSING_FIELD.to_string());

        let link = match entry.links.first() {
            Some(link) => link.href.clone(),
            None => {
                warn!("Entry {:?} from {} has no link", title, source_name);
                MISSING_FIELD.to_string()
            }
        };

        // Prefer the summary, fall back to the full content body
        let summary = entry
            .summary
            .map(|s| s.content)
            .or_else(|| entry.content.and_then(|c| c.body))
            .unwrap_or_default();

        let published = entry.published.or(entry.updated);

        RawArticle {
            title,
            link,
            summary,
            published,
            source_name: source_name.to_string(),
        }
    }
}
