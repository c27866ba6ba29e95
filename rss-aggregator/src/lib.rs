pub mod cli;
pub mod config;
pub mod fetcher;
pub mod parser;
pub mod pipeline;
pub mod renderer;
pub mod sources;
pub mod traits;
pub mod translator;
pub mod types;
pub mod utils;

pub use cli::Cli;
pub use config::Settings;
pub use fetcher::Fetcher;
pub use parser::FeedParser;
pub use pipeline::{DigestPipeline, HaltReason, PipelineOutcome};
pub use renderer::RenderOptions;
pub use sources::RssFeedSource;
pub use traits::{PullFeed, Translator};
pub use translator::{GoogleTranslator, PassthroughTranslator};
pub use types::*;
