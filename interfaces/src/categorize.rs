//! Keyword-driven category assignment.
//!
//! Rules are tried in configuration order and the first rule with any
//! matching keyword wins. Short ASCII keywords ("AI", "EU", "G7") only match
//! whole words; everything else, including non-Latin keywords, matches as a
//! plain substring.

use crate::defs::{
    CategorizedArticle, Category, CategoryRules, MergedArticle, SourceFallback, OTHERS_LABEL,
};
use anyhow::{Context, Result};
use regex::Regex;
use tracing::{debug, info, warn};

/// Keywords up to this many characters get word-boundary matching.
const SHORT_KEYWORD_MAX_CHARS: usize = 3;

#[derive(Debug)]
enum Matcher {
    Word(Regex),
    Substring(String),
}

impl Matcher {
    fn compile(keyword: &str) -> Result<Option<Self>> {
        let needle = keyword.to_lowercase();
        if needle.is_empty() {
            return Ok(None);
        }
        if is_short_ascii_word(&needle) {
            let re = Regex::new(&format!(r"\b{}\b", regex::escape(&needle)))
                .with_context(|| format!("compiling keyword {keyword:?}"))?;
            Ok(Some(Self::Word(re)))
        } else {
            Ok(Some(Self::Substring(needle)))
        }
    }

    fn is_match(&self, haystack: &str) -> bool {
        match self {
            Self::Word(re) => re.is_match(haystack),
            Self::Substring(needle) => haystack.contains(needle.as_str()),
        }
    }
}

fn is_short_ascii_word(keyword: &str) -> bool {
    keyword.chars().count() <= SHORT_KEYWORD_MAX_CHARS
        && keyword.chars().all(|c| c.is_ascii_alphanumeric())
}

#[derive(Debug)]
struct CompiledRule {
    category: Category,
    matchers: Vec<Matcher>,
}

#[derive(Debug)]
pub struct Categorizer {
    rules: Vec<CompiledRule>,
    fallback: Option<SourceFallback>,
    /// False when no category configuration was supplied at all.
    configured: bool,
}

impl Categorizer {
    pub fn new(rules: &CategoryRules, fallback: Option<SourceFallback>) -> Result<Self> {
        if rules.is_empty() {
            warn!("No category keywords configured; every article goes to {}", OTHERS_LABEL);
        }

        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules.iter() {
            if rule.label == OTHERS_LABEL {
                continue;
            }
            let mut matchers = Vec::with_capacity(rule.keywords.len());
            for keyword in &rule.keywords {
                if let Some(matcher) = Matcher::compile(keyword)
                    .with_context(|| format!("category {:?}", rule.label))?
                {
                    matchers.push(matcher);
                }
            }
            compiled.push(CompiledRule {
                category: Category::Named(rule.label.clone()),
                matchers,
            });
        }

        Ok(Self {
            rules: compiled,
            fallback,
            configured: !rules.is_empty(),
        })
    }

    /// Category for one article, without consuming it.
    pub fn classify(&self, article: &MergedArticle) -> Category {
        if !self.configured {
            return Category::Others;
        }

        let text = search_text(article);
        for rule in &self.rules {
            if rule.matchers.iter().any(|m| m.is_match(&text)) {
                return rule.category.clone();
            }
        }

        match &self.fallback {
            Some(fallback) if fallback.applies_to(article.source_name()) => {
                Category::from_label(&fallback.category)
            }
            _ => Category::Others,
        }
    }

    pub fn categorize(&self, article: MergedArticle) -> CategorizedArticle {
        let category = self.classify(&article);
        debug!(title = %article.lead.translated_title, %category, "categorized");
        CategorizedArticle { article, category }
    }

    /// Discards any previous assignment and categorizes again.
    pub fn recategorize(&self, article: CategorizedArticle) -> CategorizedArticle {
        self.categorize(article.article)
    }

    pub fn categorize_all(&self, articles: Vec<MergedArticle>) -> Vec<CategorizedArticle> {
        let categorized: Vec<CategorizedArticle> =
            articles.into_iter().map(|a| self.categorize(a)).collect();
        let others = categorized
            .iter()
            .filter(|a| a.category == Category::Others)
            .count();
        info!(
            "Categorized {} articles ({} in {})",
            categorized.len(),
            others,
            OTHERS_LABEL
        );
        categorized
    }
}

/// Original and translated title and summary, lower-cased.
fn search_text(article: &MergedArticle) -> String {
    let lead = &article.lead;
    format!(
        "{} {} {} {}",
        lead.article.title, lead.article.summary, lead.translated_title, lead.translated_summary
    )
    .to_lowercase()
}
