/// URL utilities
pub mod url {
    use url::Url;

    /// Extract domain from URL
    pub fn extract_domain(url_str: &str) -> Option<String> {
        Url::parse(url_str)
            .ok()
            .and_then(|url| url.host_str().map(|d| d.to_string()))
    }

    /// Short feed alias derived from the feed URL's host.
    ///
    /// `feeds.washingtonpost.com` becomes `washingtonpost`, `techcrunch.com`
    /// becomes `techcrunch`.
    pub fn source_name_from_url(url_str: &str) -> String {
        let Some(host) = extract_domain(url_str) else {
            return url_str.to_string();
        };
        let domain = host.strip_prefix("www.").unwrap_or(&host);
        let labels: Vec<&str> = domain.split('.').collect();
        let name = if labels.len() > 2 {
            labels[labels.len() - 2]
        } else {
            labels[0]
        };
        if name.is_empty() {
            domain.to_string()
        } else {
            name.to_string()
        }
    }

    /// Validate RSS feed URL format
    pub fn is_valid_feed_url(url_str: &str) -> bool {
        if let Ok(url) = Url::parse(url_str) {
            url.scheme() == "http" || url.scheme() == "https"
        } else {
            false
        }
    }
}

/// Text processing utilities
pub mod text {
    /// First `max` characters of `text`, on a character boundary.
    pub fn truncate_chars(text: &str, max: usize) -> &str {
        match text.char_indices().nth(max) {
            Some((idx, _)) => &text[..idx],
            None => text,
        }
    }

    /// Keeps the first `limit` whitespace-separated words, appending `...`
    /// when anything was cut.
    pub fn truncate_words(text: &str, limit: usize) -> String {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.len() <= limit {
            return text.to_string();
        }
        format!("{}...", words[..limit].join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::text::{truncate_chars, truncate_words};
    use super::url::{is_valid_feed_url, source_name_from_url};

    #[test]
    fn source_names_from_feed_urls() {
        assert_eq!(
            source_name_from_url("https://feeds.washingtonpost.com/rss/politics"),
            "washingtonpost"
        );
        assert_eq!(
            source_name_from_url("https://techcrunch.com/category/artificial-intelligence/feed/"),
            "techcrunch"
        );
        assert_eq!(source_name_from_url("https://www.france24.com/en/rss"), "france24");
        assert_eq!(source_name_from_url("https://cn.nytimes.com/rss/"), "nytimes");
        assert_eq!(
            source_name_from_url("https://search.cnbc.com/rs/search/view.xml?partnerId=wrss01"),
            "cnbc"
        );
    }

    #[test]
    fn unparseable_urls_are_used_verbatim() {
        assert_eq!(source_name_from_url("not a url"), "not a url");
        assert!(!is_valid_feed_url("ftp://example.com/feed"));
        assert!(is_valid_feed_url("https://example.com/feed"));
    }

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("新闻摘要", 2), "新闻");
    }

    #[test]
    fn truncates_words_with_ellipsis() {
        assert_eq!(truncate_words("one two three", 2), "one two...");
        assert_eq!(truncate_words("one two", 2), "one two");
    }
}
