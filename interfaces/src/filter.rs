use crate::defs::{DateWindow, FilterSettings, FilteredArticle, RawArticle};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info};

static RE_IMG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<img\b[^>]*>").expect("image tag regex"));
static RE_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)</?[^>]+>").expect("html tag regex"));

/// Result of the filter stage, with rejection tallies for reporting.
#[derive(Debug, Default)]
pub struct FilterOutcome {
    pub kept: Vec<FilteredArticle>,
    pub blocked: usize,
    pub out_of_window: usize,
}

/// Drops blocked articles, then everything published outside `window`.
///
/// Articles without a publication date are always kept. An article that is
/// both blocked and out of window counts once, as blocked.
pub fn filter_articles(
    articles: Vec<RawArticle>,
    window: &DateWindow,
    settings: &FilterSettings,
) -> FilterOutcome {
    let blocked_keywords: Vec<String> = settings
        .blocked_keywords
        .iter()
        .map(|k| k.to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();

    let mut outcome = FilterOutcome::default();

    for mut article in articles {
        if let Some(keyword) = find_blocked_keyword(&article, &blocked_keywords) {
            debug!(title = %article.title, keyword, "dropping blocked article");
            outcome.blocked += 1;
            continue;
        }

        if let Some(published) = article.published {
            if !window.contains(published) {
                debug!(title = %article.title, %published, "dropping article outside window");
                outcome.out_of_window += 1;
                continue;
            }
        }

        if !settings.show_images {
            article.summary = strip_markup(&article.summary);
        }

        outcome.kept.push(FilteredArticle(article));
    }

    info!(
        kept = outcome.kept.len(),
        blocked = outcome.blocked,
        out_of_window = outcome.out_of_window,
        "Filtered articles between {} and {}",
        window.start,
        window.end
    );

    outcome
}

/// First blocked keyword (already lower-cased) found in title or summary.
pub fn find_blocked_keyword<'a>(article: &RawArticle, keywords: &'a [String]) -> Option<&'a str> {
    if keywords.is_empty() {
        return None;
    }
    let title = article.title.to_lowercase();
    let summary = article.summary.to_lowercase();
    keywords
        .iter()
        .find(|k| title.contains(k.as_str()) || summary.contains(k.as_str()))
        .map(String::as_str)
}

/// Removes image markup, then any remaining HTML tags, and trims.
pub fn strip_markup(html: &str) -> String {
    let without_images = RE_IMG.replace_all(html, "");
    RE_TAGS.replace_all(&without_images, "").trim().to_string()
}
