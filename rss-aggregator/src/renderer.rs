use crate::types::{CategorizedArticle, Digest, Result};
use crate::utils::text::truncate_words;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub dir: PathBuf,
    /// Overrides the dated default file name.
    pub file_name: Option<String>,
    /// Cut summaries to this many words.
    pub summary_word_limit: Option<usize>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            file_name: None,
            summary_word_limit: None,
        }
    }
}

impl RenderOptions {
    pub fn report_path(&self, date: NaiveDate) -> PathBuf {
        let file_name = self
            .file_name
            .clone()
            .unwrap_or_else(|| format!("News_Summary_{}.md", date.format("%Y-%m-%d")));
        self.dir.join(file_name)
    }
}

/// Renders the digest as Markdown, skipping empty categories.
pub fn render_markdown(digest: &Digest, date: NaiveDate, options: &RenderOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# News Summary ({})\n", date.format("%Y-%m-%d"));

    for section in digest.non_empty_sections() {
        let _ = writeln!(
            out,
            "## 📰 {} ({} items)\n",
            section.category,
            section.articles.len()
        );
        for article in &section.articles {
            render_article(&mut out, article, options);
        }
    }

    out
}

fn render_article(out: &mut String, article: &CategorizedArticle, options: &RenderOptions) {
    let merged = &article.article;
    let sources = merged
        .sources
        .iter()
        .map(|s| format!("[{}]({})", s.name, s.link))
        .collect::<Vec<_>>()
        .join(", ");

    let _ = writeln!(out, "### {} (Source: {})\n", merged.lead.translated_title, sources);

    let summary = merged.lead.translated_summary.trim();
    if !summary.is_empty() {
        let summary = match options.summary_word_limit {
            Some(limit) => truncate_words(summary, limit),
            None => summary.to_string(),
        };
        let _ = writeln!(out, "{}\n", summary);
    }

    out.push_str("---\n\n");
}

/// Writes the rendered digest under the output directory and returns the
/// report path.
pub async fn write_report(
    digest: &Digest,
    date: NaiveDate,
    options: &RenderOptions,
) -> Result<PathBuf> {
    let path = options.report_path(date);
    tokio::fs::create_dir_all(&options.dir).await?;
    tokio::fs::write(&path, render_markdown(digest, date, options)).await?;
    info!("Report saved to: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        Category, CategoryRules, DateWindow, FilterSettings, MergedArticle, RawArticle, SourceRef,
        TranslatedArticle,
    };
    use chrono::Utc;
    use interfaces::filter_articles;

    fn digest() -> Digest {
        let raw = vec![
            RawArticle::new("AI news", "https://a/1", "", "a"),
            RawArticle::new("Other news", "https://b/1", "", "b"),
        ];
        let window = DateWindow::trailing_days(Utc::now(), 1).unwrap();
        let mut kept = filter_articles(raw, &window, &FilterSettings::default()).kept;
        let second = kept.pop().unwrap();
        let first = kept.pop().unwrap();

        let mut ai = MergedArticle::new(TranslatedArticle::translated(
            first,
            "人工智能新闻".to_string(),
            "one two three four".to_string(),
        ));
        ai.absorb(SourceRef { name: "c".into(), link: "https://c/9".into() });
        let other = MergedArticle::new(TranslatedArticle::translated(
            second,
            "其他".to_string(),
            String::new(),
        ));

        Digest::group(
            vec![
                CategorizedArticle { article: ai, category: Category::Named("AI".into()) },
                CategorizedArticle { article: other, category: Category::Others },
            ],
            &CategoryRules::from_pairs(vec![("AI", vec!["AI"]), ("World", vec!["world"])]),
            None,
        )
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    }

    #[test]
    fn renders_sections_articles_and_sources() {
        let md = render_markdown(&digest(), date(), &RenderOptions::default());

        let expected = "# News Summary (2024-01-02)\n\n\
## 📰 AI (1 items)\n\n\
### 人工智能新闻 (Source: [a](https://a/1), [c](https://c/9))\n\n\
one two three four\n\n\
---\n\n\
## 📰 Others (1 items)\n\n\
### 其他 (Source: [b](https://b/1))\n\n\
---\n\n";
        assert_eq!(md, expected);
        assert!(!md.contains("World"));
    }

    #[test]
    fn truncates_summaries_when_configured() {
        let options = RenderOptions {
            summary_word_limit: Some(2),
            ..RenderOptions::default()
        };
        let md = render_markdown(&digest(), date(), &options);
        assert!(md.contains("one two...\n"));
    }

    #[test]
    fn default_report_name_is_dated() {
        let path = RenderOptions::default().report_path(date());
        assert_eq!(path, PathBuf::from("output/News_Summary_2024-01-02.md"));
    }

    #[tokio::test]
    async fn writes_report_into_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let options = RenderOptions {
            dir: dir.path().join("nested"),
            ..RenderOptions::default()
        };

        let path = write_report(&digest(), date(), &options).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# News Summary (2024-01-02)"));
    }
}
