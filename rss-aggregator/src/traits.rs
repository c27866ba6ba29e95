use crate::types::{RawArticle, Result};
use async_trait::async_trait;

/// Trait for pulling articles from a feed source once per run
#[async_trait]
pub trait PullFeed: Send + Sync {
    /// Short alias attributed to every article from this source
    fn source_name(&self) -> &str;

    /// Where the source is fetched from
    fn feed_url(&self) -> &str;

    /// Fetch and normalize the current entries of the source
    async fn pull(&self) -> Result<Vec<RawArticle>>;
}

/// Trait for translation backends
#[async_trait]
pub trait Translator: Send + Sync {
    /// Get the name of this translator
    fn name(&self) -> String;

    /// Translate a single piece of text into the configured target language
    async fn translate(&self, text: &str) -> Result<String>;
}
