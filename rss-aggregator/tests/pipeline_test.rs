use async_trait::async_trait;
use chrono::{Duration, Utc};
use rss_aggregator::{
    AggregatorError, CategoryRules, DateWindow, DigestPipeline, FilterSettings, HaltReason,
    PipelineOutcome, PullFeed, RawArticle, RenderOptions, Result, SourceFallback,
    TranslateConfig, Translator,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Once;

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

struct MemoryFeed {
    name: &'static str,
    articles: Vec<RawArticle>,
    fail: bool,
}

impl MemoryFeed {
    fn new(name: &'static str, articles: Vec<RawArticle>) -> Box<dyn PullFeed> {
        Box::new(Self { name, articles, fail: false })
    }

    fn broken(name: &'static str) -> Box<dyn PullFeed> {
        Box::new(Self { name, articles: Vec::new(), fail: true })
    }
}

#[async_trait]
impl PullFeed for MemoryFeed {
    fn source_name(&self) -> &str {
        self.name
    }

    fn feed_url(&self) -> &str {
        "memory://feed"
    }

    async fn pull(&self) -> Result<Vec<RawArticle>> {
        if self.fail {
            return Err(AggregatorError::General(format!("{} is down", self.name)));
        }
        Ok(self.articles.clone())
    }
}

/// Looks text up in a phrase book; anything unknown comes back unchanged.
struct PhraseBook(HashMap<&'static str, &'static str>);

#[async_trait]
impl Translator for PhraseBook {
    fn name(&self) -> String {
        "phrase-book".to_string()
    }

    async fn translate(&self, text: &str) -> Result<String> {
        Ok(self.0.get(text).map(|t| t.to_string()).unwrap_or_else(|| text.to_string()))
    }
}

fn phrase_book() -> Box<dyn Translator> {
    Box::new(PhraseBook(HashMap::from([
        ("OpenAI releases new model", "OpenAI发布新模型"),
        ("OpenAI unveils a new model", "OpenAI发布新模型啦"),
        ("Election results announced", "选举结果公布"),
        ("Weather is nice", "天气很好"),
    ])))
}

fn rules() -> CategoryRules {
    CategoryRules::from_pairs(vec![
        ("AI", vec!["OpenAI", "AI"]),
        ("Markets", vec!["stocks"]),
        ("Others", vec![]),
    ])
}

fn quiet_translation() -> TranslateConfig {
    TranslateConfig {
        request_delay_ms: 0,
        failure_delay_ms: 0,
        ..TranslateConfig::default()
    }
}

fn pipeline(sources: Vec<Box<dyn PullFeed>>, out: &Path) -> DigestPipeline {
    DigestPipeline::new(sources, phrase_book())
        .with_filter(FilterSettings {
            blocked_keywords: vec!["sponsored".to_string()],
            show_images: false,
        })
        .with_categories(rules(), Some(SourceFallback::default()))
        .with_translate_config(quiet_translation())
        .with_output(RenderOptions {
            dir: out.to_path_buf(),
            ..RenderOptions::default()
        })
}

#[tokio::test]
async fn writes_a_grouped_digest() {
    init_tracing();
    let now = Utc::now();
    let recent = now - Duration::hours(1);

    let sources = vec![
        MemoryFeed::new(
            "techcrunch",
            vec![
                RawArticle::new(
                    "OpenAI releases new model",
                    "https://techcrunch.example/1",
                    "<p>A new <img src=\"x.png\"> model</p>",
                    "techcrunch",
                )
                .published_at(recent),
                RawArticle::new(
                    "Sponsored: buy this",
                    "https://techcrunch.example/2",
                    "",
                    "techcrunch",
                )
                .published_at(recent),
                RawArticle::new("Old story", "https://techcrunch.example/3", "", "techcrunch")
                    .published_at(now - Duration::days(10)),
            ],
        ),
        MemoryFeed::broken("cnbc"),
        MemoryFeed::new(
            "france24",
            vec![
                RawArticle::new(
                    "OpenAI unveils a new model",
                    "https://france24.example/1",
                    "",
                    "france24",
                )
                .published_at(recent),
                RawArticle::new(
                    "Election results announced",
                    "https://france24.example/2",
                    "",
                    "france24",
                )
                .published_at(recent),
            ],
        ),
        MemoryFeed::new(
            "theguardian",
            vec![RawArticle::new(
                "Weather is nice",
                "https://guardian.example/1",
                "Sunny",
                "theguardian",
            )],
        ),
    ];

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let outcome = pipeline(sources, &out)
        .run(DateWindow::trailing_days(now, 1).unwrap())
        .await
        .unwrap();

    let PipelineOutcome::Completed { report, sections, .. } = outcome else {
        panic!("expected a report");
    };

    assert_eq!(
        sections,
        vec![
            ("AI".to_string(), 1),
            ("Markets".to_string(), 0),
            ("Politics".to_string(), 1),
            ("Others".to_string(), 1),
        ]
    );
    assert!(report.starts_with(&out));

    let markdown = std::fs::read_to_string(&report).unwrap();
    assert!(markdown.starts_with("# News Summary ("));
    assert!(markdown.contains(concat!(
        "### OpenAI发布新模型 (Source: [techcrunch](https://techcrunch.example/1), ",
        "[france24](https://france24.example/1))"
    )));
    assert!(markdown.contains("## 📰 Politics (1 items)"));
    assert!(markdown.contains("### 选举结果公布 (Source: [france24](https://france24.example/2))"));
    assert!(markdown.contains("## 📰 Others (1 items)"));
    assert!(!markdown.contains("Markets"));
    assert!(!markdown.contains("Sponsored"));
    assert!(!markdown.contains("Old story"));
    assert!(!markdown.contains("<img"));

    let ai = markdown.find("## 📰 AI").unwrap();
    let politics = markdown.find("## 📰 Politics").unwrap();
    let others = markdown.find("## 📰 Others").unwrap();
    assert!(ai < politics && politics < others);
}

#[tokio::test]
async fn halts_when_every_feed_fails() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");

    let outcome = pipeline(vec![MemoryFeed::broken("a"), MemoryFeed::broken("b")], &out)
        .run(DateWindow::trailing_days(Utc::now(), 1).unwrap())
        .await
        .unwrap();

    assert!(matches!(outcome, PipelineOutcome::Halted(HaltReason::NoArticlesFetched)));
    assert!(!out.exists());
}

#[tokio::test]
async fn halts_when_the_filter_removes_everything() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let now = Utc::now();

    let sources = vec![MemoryFeed::new(
        "a",
        vec![
            RawArticle::new("Sponsored post", "https://a/1", "", "a").published_at(now),
            RawArticle::new("Last year", "https://a/2", "", "a")
                .published_at(now - Duration::days(365)),
        ],
    )];

    let outcome = pipeline(sources, &out)
        .run(DateWindow::trailing_days(now, 1).unwrap())
        .await
        .unwrap();

    assert!(matches!(outcome, PipelineOutcome::Halted(HaltReason::NoArticlesAfterFilter)));
    assert!(!out.exists());
}

#[tokio::test]
async fn without_category_rules_everything_is_others() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let now = Utc::now();

    let sources = vec![MemoryFeed::new(
        "france24",
        vec![
            RawArticle::new("OpenAI releases new model", "https://f/1", "", "france24")
                .published_at(now),
            RawArticle::new("Weather is nice", "https://f/2", "", "france24").published_at(now),
        ],
    )];

    let outcome = DigestPipeline::new(sources, phrase_book())
        .with_categories(CategoryRules::default(), Some(SourceFallback::default()))
        .with_translate_config(quiet_translation())
        .with_output(RenderOptions {
            dir: dir.path().to_path_buf(),
            ..RenderOptions::default()
        })
        .run(DateWindow::trailing_days(now, 1).unwrap())
        .await
        .unwrap();

    let PipelineOutcome::Completed { sections, .. } = outcome else {
        panic!("expected a report");
    };
    let others = sections.iter().find(|(label, _)| label == "Others").unwrap();
    assert_eq!(others.1, 2);
}
