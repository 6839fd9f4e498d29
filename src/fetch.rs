//! HTTP fetching with optional exponential backoff.
//!
//! Listing pages, speech pages and PDFs are all plain GET requests. The
//! [`FetchAsync`] trait abstracts a single fetch, and [`RetryFetch`] wraps any
//! implementation with bounded retries.
//!
//! # Retry Strategy
//!
//! - `max_retries` extra attempts (0 means a single attempt)
//! - Exponential backoff starting at 1 second
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to each delay

use rand::{Rng, rng};
use reqwest::Client;
use std::error::Error;
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

/// Default delay before the first retry.
pub const BASE_DELAY: StdDuration = StdDuration::from_secs(1);

/// Trait for a single async GET.
pub trait FetchAsync {
    /// The body type produced by the fetch.
    type Response;

    async fn fetch(&self, url: &str) -> Result<Self::Response, Box<dyn Error>>;
}

/// Wrapper that adds exponential backoff retry logic to any [`FetchAsync`]
/// implementation.
///
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..=max_jitter)
/// ```
pub struct RetryFetch<T> {
    inner: T,
    max_retries: usize,
    base_delay: StdDuration,
    max_delay: StdDuration,
    max_jitter: StdDuration,
}

impl<T> RetryFetch<T>
where
    T: FetchAsync,
{
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
            max_jitter: StdDuration::from_millis(250),
        }
    }

    #[cfg(test)]
    pub fn with_max_jitter(mut self, max_jitter: StdDuration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    fn delay_for(&self, attempt: usize) -> StdDuration {
        let shift = attempt.saturating_sub(1).min(31) as u32;
        let delay = self.base_delay.saturating_mul(1 << shift).min(self.max_delay);
        let jitter_ms: u64 = rng().random_range(0..=self.max_jitter.as_millis() as u64);
        delay + StdDuration::from_millis(jitter_ms)
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> FetchAsync for RetryFetch<T>
where
    T: FetchAsync + fmt::Debug,
{
    type Response = T::Response;

    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<Self::Response, Box<dyn Error>> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.inner.fetch(url).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    attempt += 1;
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        if self.max_retries > 0 {
                            error!(
                                attempt,
                                max = self.max_retries,
                                elapsed_ms_total = total_dt.as_millis(),
                                error = %e,
                                "fetch exhausted retries"
                            );
                        }
                        return Err(e);
                    }

                    let delay = self.delay_for(attempt);
                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_total = total_dt.as_millis(),
                        ?delay,
                        error = %e,
                        "fetch attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// GET returning the response body as text.
#[derive(Debug)]
pub struct TextFetcher<'a> {
    pub client: &'a Client,
}

impl FetchAsync for TextFetcher<'_> {
    type Response = String;

    async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>> {
        let t0 = Instant::now();
        let body = self.client.get(url).send().await?.error_for_status()?.text().await?;
        debug!(%url, bytes = body.len(), elapsed_ms = t0.elapsed().as_millis(), "Fetched page");
        Ok(body)
    }
}

/// GET returning the raw response bytes.
#[derive(Debug)]
pub struct BytesFetcher<'a> {
    pub client: &'a Client,
}

impl FetchAsync for BytesFetcher<'_> {
    type Response = Vec<u8>;

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, Box<dyn Error>> {
        let t0 = Instant::now();
        let body = self.client.get(url).send().await?.error_for_status()?.bytes().await?;
        debug!(%url, bytes = body.len(), elapsed_ms = t0.elapsed().as_millis(), "Fetched document");
        Ok(body.to_vec())
    }
}

/// Fetch a page as text, retrying up to `max_retries` times.
pub async fn get_text(client: &Client, url: &str, max_retries: usize) -> Result<String, Box<dyn Error>> {
    RetryFetch::new(TextFetcher { client }, max_retries, BASE_DELAY)
        .fetch(url)
        .await
}

/// Fetch a document as bytes, retrying up to `max_retries` times.
pub async fn get_bytes(client: &Client, url: &str, max_retries: usize) -> Result<Vec<u8>, Box<dyn Error>> {
    RetryFetch::new(BytesFetcher { client }, max_retries, BASE_DELAY)
        .fetch(url)
        .await
}
