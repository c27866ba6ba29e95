pub mod rss_feed;

pub use rss_feed::RssFeedSource;

use crate::traits::PullFeed;
use crate::types::RawArticle;
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

/// Pulls every source, at most `concurrency` at a time, and concatenates the
/// results in source order. A failing source contributes nothing.
pub async fn collect_articles(
    sources: &[Box<dyn PullFeed>],
    concurrency: usize,
) -> Vec<RawArticle> {
    let results: Vec<_> = stream::iter(sources.iter())
        .map(|source| async move { (source, source.pull().await) })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut articles = Vec::new();
    let mut failed = 0usize;
    for (source, result) in results {
        match result {
            Ok(mut pulled) => {
                info!("  - {}: {} articles", source.source_name(), pulled.len());
                articles.append(&mut pulled);
            }
            Err(e) => {
                failed += 1;
                warn!(feed = source.feed_url(), error = %e, "feed fetch failed");
            }
        }
    }

    info!(
        "Aggregated {} articles from {} feeds ({} failed)",
        articles.len(),
        sources.len(),
        failed
    );
    articles
}
