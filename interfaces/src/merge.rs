use crate::defs::{MergedArticle, TopicKey, TranslatedArticle};
use std::collections::HashMap;
use tracing::{debug, info};

/// Collapses articles sharing a topic key into one record per story.
///
/// Groups keep the order in which their first article appeared, and the
/// first article's content. Articles without a key are emitted on their own.
pub fn deduplicate_and_merge(articles: Vec<TranslatedArticle>) -> Vec<MergedArticle> {
    let total = articles.len();
    let mut merged: Vec<MergedArticle> = Vec::with_capacity(total);
    let mut groups: HashMap<TopicKey, usize> = HashMap::new();

    for article in articles {
        let Some(key) = article.topic_key.clone() else {
            merged.push(MergedArticle::new(article));
            continue;
        };

        match groups.get(&key) {
            Some(&index) => {
                let source = article.source();
                if merged[index].absorb(source) {
                    debug!(
                        topic = %key,
                        source = %article.article.source_name,
                        "merged duplicate story"
                    );
                } else {
                    debug!(topic = %key, link = %article.article.link, "link already attributed");
                }
            }
            None => {
                groups.insert(key, merged.len());
                merged.push(MergedArticle::new(article));
            }
        }
    }

    info!("Merged {} articles into {} stories", total, merged.len());
    merged
}
