use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde::Deserialize;
use std::fmt;
use std::ops::Deref;

/// Label of the catch-all category. A configured rule carrying this label
/// is never used for matching.
pub const OTHERS_LABEL: &str = "Others";

/// Number of characters of a cleaned translated title kept as topic key.
pub const TOPIC_KEY_LEN: usize = 10;

/// An article as normalized by feed ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct RawArticle {
    pub title: String,
    pub link: String,
    pub summary: String,
    pub published: Option<DateTime<Utc>>,
    pub source_name: String,
}

impl RawArticle {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        summary: impl Into<String>,
        source_name: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            summary: summary.into(),
            published: None,
            source_name: source_name.into(),
        }
    }

    pub fn published_at(mut self, published: DateTime<Utc>) -> Self {
        self.published = Some(published);
        self
    }

    /// Timezone-less timestamps are taken to be UTC.
    pub fn published_naive(mut self, published: NaiveDateTime) -> Self {
        self.published = Some(published.and_utc());
        self
    }

    pub fn source(&self) -> SourceRef {
        SourceRef {
            name: self.source_name.clone(),
            link: self.link.clone(),
        }
    }
}

/// An article that passed the blocklist and the date window.
///
/// Only [`crate::filter::filter_articles`] produces values of this type, so
/// every later stage is guaranteed to work on filtered input.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredArticle(pub(crate) RawArticle);

impl Deref for FilteredArticle {
    type Target = RawArticle;

    fn deref(&self) -> &RawArticle {
        &self.0
    }
}

/// Exact-match merge key derived from a translated title.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopicKey(String);

impl TopicKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Drops everything but word characters and whitespace, keeps the first
    /// [`TOPIC_KEY_LEN`] characters and trims. Blank results carry no key.
    pub fn from_title(title: &str) -> Option<Self> {
        let head: String = title
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
            .take(TOPIC_KEY_LEN)
            .collect();
        let key = head.trim();
        if key.is_empty() {
            None
        } else {
            Some(Self(key.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TopicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedArticle {
    pub article: FilteredArticle,
    pub translated_title: String,
    pub translated_summary: String,
    /// `None` when translation failed; such articles are never merged.
    pub topic_key: Option<TopicKey>,
}

impl TranslatedArticle {
    pub fn translated(article: FilteredArticle, title: String, summary: String) -> Self {
        let topic_key = TopicKey::from_title(&title);
        Self {
            article,
            translated_title: title,
            translated_summary: summary,
            topic_key,
        }
    }

    /// Falls back to the original text and opts out of merging.
    pub fn untranslated(article: FilteredArticle) -> Self {
        Self {
            translated_title: article.title.clone(),
            translated_summary: article.summary.clone(),
            topic_key: None,
            article,
        }
    }

    pub fn source(&self) -> SourceRef {
        self.article.source()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub name: String,
    pub link: String,
}

/// One story, attributed to every source that carried it.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedArticle {
    /// First article seen for the topic; its content is what gets rendered.
    pub lead: TranslatedArticle,
    pub sources: Vec<SourceRef>,
}

impl MergedArticle {
    pub fn new(lead: TranslatedArticle) -> Self {
        let sources = vec![lead.source()];
        Self { lead, sources }
    }

    /// Adds a source unless one with the same link is already attributed.
    pub fn absorb(&mut self, source: SourceRef) -> bool {
        if self.sources.iter().any(|s| s.link == source.link) {
            return false;
        }
        self.sources.push(source);
        true
    }

    pub fn topic_key(&self) -> Option<&TopicKey> {
        self.lead.topic_key.as_ref()
    }

    pub fn source_name(&self) -> &str {
        &self.lead.article.source_name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Named(String),
    Others,
}

impl Category {
    pub fn from_label(label: &str) -> Self {
        if label == OTHERS_LABEL {
            Self::Others
        } else {
            Self::Named(label.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Named(label) => label,
            Self::Others => OTHERS_LABEL,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategorizedArticle {
    pub article: MergedArticle,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRule {
    pub label: String,
    pub keywords: Vec<String>,
}

/// Category rules in priority order; the first matching rule wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryRules(Vec<CategoryRule>);

impl CategoryRules {
    pub fn from_pairs<L, K, I>(pairs: I) -> Self
    where
        L: Into<String>,
        K: Into<String>,
        I: IntoIterator<Item = (L, Vec<K>)>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(label, keywords)| CategoryRule {
                    label: label.into(),
                    keywords: keywords.into_iter().map(Into::into).collect(),
                })
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryRule> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<IndexMap<String, Vec<String>>> for CategoryRules {
    fn from(map: IndexMap<String, Vec<String>>) -> Self {
        Self::from_pairs(map)
    }
}

/// Inclusive `[start, end]` publication window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The `days` days up to `now`. `None` when the start would fall outside
    /// the representable date range.
    pub fn trailing_days(now: DateTime<Utc>, days: u32) -> Option<Self> {
        let start = now.checked_sub_signed(Duration::try_days(i64::from(days))?)?;
        Some(Self { start, end: now })
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FilterSettings {
    #[serde(default)]
    pub blocked_keywords: Vec<String>,
    /// When false, image markup and HTML tags are stripped from summaries.
    #[serde(default)]
    pub show_images: bool,
}

/// Feed aliases whose unmatched articles land in a fixed category instead
/// of "Others".
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SourceFallback {
    pub category: String,
    pub sources: Vec<String>,
}

impl SourceFallback {
    pub fn applies_to(&self, source_name: &str) -> bool {
        self.sources
            .iter()
            .any(|s| s.eq_ignore_ascii_case(source_name))
    }
}

impl Default for SourceFallback {
    fn default() -> Self {
        Self {
            category: "Politics".to_string(),
            sources: vec!["washingtonpost".to_string(), "france24".to_string()],
        }
    }
}
