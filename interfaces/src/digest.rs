use crate::defs::{CategorizedArticle, Category, CategoryRules, SourceFallback, OTHERS_LABEL};
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq)]
pub struct DigestSection {
    pub category: Category,
    pub articles: Vec<CategorizedArticle>,
}

/// Categorized articles grouped into sections, ready for rendering.
///
/// Sections follow configuration order, with "Others" always last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Digest {
    sections: Vec<DigestSection>,
}

impl Digest {
    pub fn group(
        articles: Vec<CategorizedArticle>,
        rules: &CategoryRules,
        fallback: Option<&SourceFallback>,
    ) -> Self {
        let mut buckets: IndexMap<Category, Vec<CategorizedArticle>> = IndexMap::new();
        for rule in rules.iter().filter(|r| r.label != OTHERS_LABEL) {
            buckets.entry(Category::Named(rule.label.clone())).or_default();
        }
        if let Some(fallback) = fallback {
            buckets
                .entry(Category::from_label(&fallback.category))
                .or_default();
        }
        // Others goes last even if a fallback or rule tried to claim it earlier.
        buckets.shift_remove(&Category::Others);
        buckets.insert(Category::Others, Vec::new());

        for article in articles {
            match buckets.get_mut(&article.category) {
                Some(bucket) => bucket.push(article),
                None => buckets[&Category::Others].push(article),
            }
        }

        Self {
            sections: buckets
                .into_iter()
                .map(|(category, articles)| DigestSection { category, articles })
                .collect(),
        }
    }

    pub fn sections(&self) -> &[DigestSection] {
        &self.sections
    }

    pub fn non_empty_sections(&self) -> impl Iterator<Item = &DigestSection> {
        self.sections.iter().filter(|s| !s.articles.is_empty())
    }

    /// `(label, article count)` for every section, empty ones included.
    pub fn counts(&self) -> Vec<(String, usize)> {
        self.sections
            .iter()
            .map(|s| (s.category.label().to_string(), s.articles.len()))
            .collect()
    }

    pub fn total_articles(&self) -> usize {
        self.sections.iter().map(|s| s.articles.len()).sum()
    }
}
