use crate::traits::PullFeed;
use crate::types::{AggregatorError, RawArticle, Result};
use crate::utils::url::source_name_from_url;
use crate::{FeedParser, Fetcher};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Generic RSS/Atom feed source backed by a shared [`Fetcher`]
pub struct RssFeedSource {
    url: String,
    source_name: String,
    fetcher: Arc<Fetcher>,
}

impl RssFeedSource {
    pub fn new(url: impl Into<String>, fetcher: Arc<Fetcher>) -> Self {
        let url = url.into();
        let source_name = source_name_from_url(&url);
        Self {
            url,
            source_name,
            fetcher,
        }
    }
}

#[async_trait]
impl PullFeed for RssFeedSource {
    fn source_name(&self) -> &str {
        &self.source_name
    }

    fn feed_url(&self) -> &str {
        &self.url
    }

    async fn pull(&self) -> Result<Vec<RawArticle>> {
        info!("Pulling RSS feed: {}", self.url);

        let fetch_result = self.fetcher.fetch_feed(&self.url).await?;

        if !fetch_result.success {
            let error_msg = fetch_result
                .error
                .unwrap_or_else(|| "Fetch failed".to_string());
            return Err(AggregatorError::General(error_msg));
        }

        let content = match fetch_result.content {
            Some(content) => content,
            None => {
                warn!("No content returned for RSS feed {}", self.url);
                return Ok(Vec::new());
            }
        };

        let articles = FeedParser::parse_feed(&content, &self.source_name)?;
        info!(
            "Pulled {} articles from {} in {}ms",
            articles.len(),
            self.url,
            fetch_result.response_time_ms
        );
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FetchConfig;

    #[test]
    fn source_name_comes_from_the_feed_host() {
        let fetcher = Arc::new(Fetcher::new(FetchConfig::default()).unwrap());
        let source = RssFeedSource::new("https://feeds.washingtonpost.com/rss/politics", fetcher);
        assert_eq!(source.source_name(), "washingtonpost");
        assert_eq!(source.feed_url(), "https://feeds.washingtonpost.com/rss/politics");
    }
}
