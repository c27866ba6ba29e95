use crate::types::{AggregatorError, DateWindow, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "rss-aggregator",
    version,
    about = "Fetch RSS feeds, translate and categorize the news, write a Markdown digest"
)]
pub struct Cli {
    /// Keep articles published in the last N days
    #[arg(long, default_value_t = 1, value_name = "N")]
    pub days: u32,

    /// Explicit inclusive window; overrides --days
    #[arg(long, value_name = "YYYYMMDD-YYYYMMDD")]
    pub range: Option<String>,

    /// Settings file (TOML)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Where the report is written
    #[arg(long, value_name = "PATH")]
    pub output_dir: Option<PathBuf>,

    /// Skip the translation service and keep the original text
    #[arg(long)]
    pub no_translate: bool,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// The filter window for this run. `--range` wins over `--days`.
    pub fn window(&self, now: DateTime<Utc>) -> Result<DateWindow> {
        match &self.range {
            Some(range) => parse_range(range),
            None => DateWindow::trailing_days(now, self.days)
                .ok_or(AggregatorError::InvalidDays { days: self.days }),
        }
    }
}

/// Parses `YYYYMMDD-YYYYMMDD` into a window with both ends at 00:00 UTC.
pub fn parse_range(input: &str) -> Result<DateWindow> {
    let invalid = |reason: &str| AggregatorError::InvalidRange {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let (start, end) = input
        .trim()
        .split_once('-')
        .ok_or_else(|| invalid("missing '-' separator"))?;

    let start = parse_day(start).ok_or_else(|| invalid("bad start date"))?;
    let end = parse_day(end).ok_or_else(|| invalid("bad end date"))?;
    if start > end {
        return Err(invalid("start date is after end date"));
    }

    Ok(DateWindow::between(midnight(start), midnight(end)))
}

fn parse_day(s: &str) -> Option<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y%m%d").ok()
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}
