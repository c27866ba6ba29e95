use crate::types::{AggregatorError, FetchConfig, FetchResult, Result};
use backoff::{backoff::Backoff, exponential::ExponentialBackoff};
use chrono::Utc;
use reqwest::{Client, Response};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use url::Url;

/// Minimum spacing between two requests to the same host.
const MIN_HOST_INTERVAL: Duration = Duration::from_secs(1);

pub struct Fetcher {
    client: Client,
    config: FetchConfig,
    rate_limiter: Arc<Mutex<HashMap<String, Instant>>>,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let redirect = if config.follow_redirects {
            reqwest::redirect::Policy::limited(config.max_redirects)
        } else {
            reqwest::redirect::Policy::none()
        };

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(redirect)
            .build()?;

        Ok(Self {
            client,
            config,
            rate_limiter: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Downloads one feed, retrying with exponential backoff.
    ///
    /// Transport and HTTP failures are reported through the returned
    /// [`FetchResult`] rather than as an `Err`, so one broken feed never
    /// stops the others. `Err` is reserved for an unusable URL.
    pub async fn fetch_feed(&self, url: &str) -> Result<FetchResult> {
        let start_time = Instant::now();
        let fetch_time = Utc::now();

        debug!("Fetching feed: {}", url);

        self.apply_rate_limit(url).await?;

        let mut backoff: ExponentialBackoff<backoff::SystemClock> = ExponentialBackoff {
            current_interval: Duration::from_secs(self.config.retry_delay_seconds),
            initial_interval: Duration::from_secs(self.config.retry_delay_seconds),
            max_interval: Duration::from_secs(self.config.retry_delay_seconds * 32),
            multiplier: 2.0,
            max_elapsed_time: Some(Duration::from_secs(self.config.retry_delay_seconds * 60)),
            ..Default::default()
        };

        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match self.send(url).await {
                Ok(response) => {
                    let status = response.status();

                    if !status.is_success() {
                        last_error = Some(AggregatorError::General(format!(
                            "HTTP {}: {}",
                            status,
                            status.canonical_reason().unwrap_or("Unknown")
                        )));
                    } else {
                        if let Some(content_length) = response.content_length() {
                            let size_mb = content_length as usize / (1024 * 1024);
                            if size_mb > self.config.max_feed_size_mb {
                                let err = AggregatorError::FeedTooLarge { size_mb };
                                warn!("Skipping {}: {}", url, err);
                                return Ok(FetchResult::failed(
                                    url,
                                    fetch_time,
                                    start_time.elapsed(),
                                    err.to_string(),
                                ));
                            }
                        }

                        match response.text().await {
                            Ok(content) => {
                                let size_mb = content.len() / (1024 * 1024);
                                if size_mb > self.config.max_feed_size_mb {
                                    let err = AggregatorError::FeedTooLarge { size_mb };
                                    warn!("Skipping {}: {}", url, err);
                                    return Ok(FetchResult::failed(
                                        url,
                                        fetch_time,
                                        start_time.elapsed(),
                                        err.to_string(),
                                    ));
                                }

                                info!(
                                    "Successfully fetched feed: {} ({} bytes)",
                                    url,
                                    content.len()
                                );
                                return Ok(FetchResult {
                                    url: url.to_string(),
                                    success: true,
                                    error: None,
                                    fetch_time,
                                    response_time_ms: start_time.elapsed().as_millis() as u64,
                                    http_status: Some(status.as_u16()),
                                    content: Some(content),
                                });
                            }
                            Err(e) => {
                                last_error = Some(AggregatorError::Http(e));
                            }
                        }
                    }
                }
                Err(e) => {
                    last_error = Some(e);
                }
            }

            if attempt < self.config.max_retries {
                if let Some(delay) = backoff.next_backoff() {
                    warn!("Attempt {} failed for {}, retrying in {:?}", attempt + 1, url, delay);
                    tokio::time::sleep(delay).await;
                    continue;
                }
            }
            break;
        }

        let error_msg = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Unknown error".to_string());
        error!(
            "Failed to fetch feed after {} attempts: {} ({})",
            self.config.max_retries + 1,
            url,
            error_msg
        );

        Ok(FetchResult::failed(url, fetch_time, start_time.elapsed(), error_msg))
    }

    async fn send(&self, url: &str) -> Result<Response> {
        let response = self.client.get(url).send().await?;
        Ok(response)
    }

    async fn apply_rate_limit(&self, url: &str) -> Result<()> {
        let parsed_url = Url::parse(url)?;
        let host = parsed_url.host_str().unwrap_or("").to_string();

        // Reserve the next slot for this host, then sleep outside the lock so
        // other hosts are not held up.
        let wait_time = {
            let mut rate_limiter = self.rate_limiter.lock().await;
            let now = Instant::now();
            let slot = match rate_limiter.get(&host) {
                Some(&last_request) if last_request + MIN_HOST_INTERVAL > now => {
                    last_request + MIN_HOST_INTERVAL
                }
                _ => now,
            };
            rate_limiter.insert(host.clone(), slot);
            slot.saturating_duration_since(now)
        };

        if !wait_time.is_zero() {
            debug!("Rate limiting {}: waiting {:?}", host, wait_time);
            tokio::time::sleep(wait_time).await;
        }

        Ok(())
    }
}
