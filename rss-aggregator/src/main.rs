use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use rss_aggregator::utils::url::is_valid_feed_url;
use rss_aggregator::{
    Cli, DigestPipeline, Fetcher, GoogleTranslator, PassthroughTranslator, PipelineOutcome,
    PullFeed, RssFeedSource, Settings, Translator,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = if verbose {
        EnvFilter::new(default_level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // A bad --range must fail before anything is fetched.
    let window = cli.window(Utc::now())?;

    let mut settings = Settings::load(cli.config.as_deref()).context("loading settings")?;
    if let Some(dir) = cli.output_dir {
        settings.output.dir = dir;
    }
    if cli.no_translate {
        settings.translate.enabled = false;
    }
    let rules = settings.category_rules();

    let fetcher = Arc::new(Fetcher::new(settings.fetch.clone()).context("building HTTP client")?);
    let mut sources: Vec<Box<dyn PullFeed>> = Vec::with_capacity(settings.feeds.len());
    for url in &settings.feeds {
        if is_valid_feed_url(url) {
            sources.push(Box::new(RssFeedSource::new(url.clone(), fetcher.clone())));
        } else {
            warn!("Skipping invalid feed URL: {}", url);
        }
    }

    let translator: Box<dyn Translator> = if settings.translate.enabled {
        Box::new(GoogleTranslator::new(&settings.translate).context("building translator")?)
    } else {
        info!("Translation disabled, keeping original text");
        settings.translate.request_delay_ms = 0;
        settings.translate.failure_delay_ms = 0;
        Box::new(PassthroughTranslator)
    };

    let pipeline = DigestPipeline::from_settings(&settings, rules, sources, translator);
    match pipeline.run(window).await? {
        PipelineOutcome::Completed { report, sections, elapsed } => {
            println!("Category counts:");
            for (category, count) in &sections {
                println!("  {category}: {count}");
            }
            println!("Report: {} ({:.1}s)", report.display(), elapsed.as_secs_f64());
        }
        PipelineOutcome::Halted(reason) => {
            println!("No report written: {reason}");
        }
    }
    Ok(())
}
