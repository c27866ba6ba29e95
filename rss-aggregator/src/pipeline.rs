use crate::config::Settings;
use crate::renderer::{write_report, RenderOptions};
use crate::sources::collect_articles;
use crate::traits::{PullFeed, Translator};
use crate::translator::translate_articles;
use crate::types::{
    AggregatorError, CategoryRules, DateWindow, Digest, FilterSettings, Result, SourceFallback,
    TranslateConfig,
};
use chrono::Utc;
use interfaces::{deduplicate_and_merge, filter_articles, Categorizer};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Why a run stopped before writing a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HaltReason {
    #[error("no articles were fetched from any feed")]
    NoArticlesFetched,
    #[error("no articles left after filtering")]
    NoArticlesAfterFilter,
    /// Guards the translate stage boundary. Unreachable while
    /// `translate_articles` falls back to the original text on failure.
    #[error("no articles came out of translation")]
    NoArticlesTranslated,
}

#[derive(Debug)]
pub enum PipelineOutcome {
    Completed {
        report: PathBuf,
        /// `(category, article count)` in report order, empty ones included.
        sections: Vec<(String, usize)>,
        elapsed: Duration,
    },
    Halted(HaltReason),
}

/// One-shot run: ingest, filter, translate, merge, categorize, group, write.
pub struct DigestPipeline {
    sources: Vec<Box<dyn PullFeed>>,
    translator: Box<dyn Translator>,
    filter: FilterSettings,
    rules: CategoryRules,
    fallback: Option<SourceFallback>,
    translate: TranslateConfig,
    output: RenderOptions,
    concurrency: usize,
}

impl DigestPipeline {
    pub fn new(sources: Vec<Box<dyn PullFeed>>, translator: Box<dyn Translator>) -> Self {
        Self {
            sources,
            translator,
            filter: FilterSettings::default(),
            rules: CategoryRules::default(),
            fallback: Some(SourceFallback::default()),
            translate: TranslateConfig::default(),
            output: RenderOptions::default(),
            concurrency: 4,
        }
    }

    pub fn from_settings(
        settings: &Settings,
        rules: CategoryRules,
        sources: Vec<Box<dyn PullFeed>>,
        translator: Box<dyn Translator>,
    ) -> Self {
        Self::new(sources, translator)
            .with_filter(settings.filter.clone())
            .with_categories(rules, Some(settings.fallback.clone()))
            .with_translate_config(settings.translate.clone())
            .with_output(settings.output.clone())
            .with_concurrency(settings.fetch.concurrency)
    }

    pub fn with_filter(mut self, filter: FilterSettings) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_categories(
        mut self,
        rules: CategoryRules,
        fallback: Option<SourceFallback>,
    ) -> Self {
        self.rules = rules;
        self.fallback = fallback;
        self
    }

    pub fn with_translate_config(mut self, translate: TranslateConfig) -> Self {
        self.translate = translate;
        self
    }

    pub fn with_output(mut self, output: RenderOptions) -> Self {
        self.output = output;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub async fn run(&self, window: DateWindow) -> Result<PipelineOutcome> {
        let started = Instant::now();
        let categorizer = Categorizer::new(&self.rules, self.fallback.clone())
            .map_err(|e| AggregatorError::General(format!("{e:#}")))?;

        info!("Fetching {} feeds", self.sources.len());
        let raw = collect_articles(&self.sources, self.concurrency).await;
        if raw.is_empty() {
            return Ok(halt(HaltReason::NoArticlesFetched));
        }

        let filtered = filter_articles(raw, &window, &self.filter);
        if filtered.kept.is_empty() {
            return Ok(halt(HaltReason::NoArticlesAfterFilter));
        }

        let translated =
            translate_articles(self.translator.as_ref(), filtered.kept, &self.translate).await;
        // Guard only: translation keeps every article it is given.
        if translated.is_empty() {
            return Ok(halt(HaltReason::NoArticlesTranslated));
        }

        let merged = deduplicate_and_merge(translated);

        let categorized = categorizer.categorize_all(merged);
        let digest = Digest::group(categorized, &self.rules, self.fallback.as_ref());

        let report = write_report(&digest, Utc::now().date_naive(), &self.output).await?;
        let elapsed = started.elapsed();
        info!(
            "Digest of {} stories written in {:.1}s",
            digest.total_articles(),
            elapsed.as_secs_f64()
        );

        Ok(PipelineOutcome::Completed {
            report,
            sections: digest.counts(),
            elapsed,
        })
    }
}

fn halt(reason: HaltReason) -> PipelineOutcome {
    warn!("Pipeline halted: {}", reason);
    PipelineOutcome::Halted(reason)
}
