//! Retrieval of external feeds.
//!
//! Each source is fetched independently under its own timeout. [`fetch_all`]
//! runs the fetches concurrently, never more than `max_in_flight` at once, and
//! waits for every one of them to succeed or fail before returning. A failed
//! source yields an `Err` in its own slot and has no effect on its siblings.
//! Dropping the returned future cancels whatever is still in flight.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use reqwest::Client;
use tokio::sync::Semaphore;
use tracing::{debug, instrument};

use crate::config::MergeConfig;
use crate::error::{MergeError, Result};
use crate::model::{FeedSource, RawDocument};

/// Outbound capability for reading one feed's raw text.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Fetch the document behind `source`. Any failure is `SourceUnavailable`.
    async fn fetch(&self, source: &FeedSource) -> Result<RawDocument>;
}

/// Concurrency, timeout and retry settings for [`fetch_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Timeout for each attempt.
    pub timeout: Duration,
    pub max_in_flight: usize,
    /// Extra attempts after the first failure. Zero disables retrying.
    pub retries: u32,
    pub retry_backoff: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        MergeConfig::default().fetch_policy()
    }
}

/// The result of fetching one source.
#[derive(Debug)]
pub struct FetchOutcome {
    pub source: FeedSource,
    pub result: Result<RawDocument>,
}

/// Fetch every source, returning one outcome per source in the order given.
#[instrument(level = "debug", skip_all, fields(sources = sources.len()))]
pub async fn fetch_all<F>(fetcher: &F, sources: &[FeedSource], policy: &FetchPolicy) -> Vec<FetchOutcome>
where
    F: FeedFetcher + ?Sized,
{
    if sources.is_empty() {
        return Vec::new();
    }

    let semaphore = Semaphore::new(policy.max_in_flight.max(1));
    let mut tasks = FuturesUnordered::new();

    for (idx, source) in sources.iter().enumerate() {
        let semaphore = &semaphore;
        tasks.push(async move {
            let result = async {
                let _permit = semaphore
                    .acquire()
                    .await
                    .map_err(|_| MergeError::unavailable(&source.platform, "fetch pool closed"))?;
                fetch_with_retry(fetcher, source, policy).await
            }
            .await;
            (idx, result)
        });
    }

    let mut finished = Vec::with_capacity(sources.len());
    while let Some(done) = tasks.next().await {
        finished.push(done);
    }
    finished.sort_by_key(|(idx, _)| *idx);

    sources
        .iter()
        .zip(finished)
        .map(|(source, (_, result))| FetchOutcome {
            source: source.clone(),
            result,
        })
        .collect()
}

async fn fetch_with_retry<F>(fetcher: &F, source: &FeedSource, policy: &FetchPolicy) -> Result<RawDocument>
where
    F: FeedFetcher + ?Sized,
{
    let attempts = policy.retries.saturating_add(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        let result = match tokio::time::timeout(policy.timeout, fetcher.fetch(source)).await {
            Ok(result) => result,
            Err(_) => Err(MergeError::unavailable(
                &source.platform,
                format!("timed out after {} ms", policy.timeout.as_millis()),
            )),
        };
        match result {
            Ok(doc) => return Ok(doc),
            Err(err) if attempt < attempts => {
                debug!(platform = %source.platform, attempt, error = %err, "retrying feed");
                tokio::time::sleep(policy.retry_backoff).await;
            }
            Err(err) => return Err(err),
        }
    }
}

/// [`FeedFetcher`] that performs an HTTP GET with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_body_bytes: usize,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, max_body_bytes: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("feed-merge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MergeError::Config(format!("http client: {e}")))?;
        Ok(Self::with_client(client, max_body_bytes))
    }

    pub fn from_config(config: &MergeConfig) -> Result<Self> {
        Self::new(
            Duration::from_millis(config.fetch_timeout_ms),
            config.max_body_bytes,
        )
    }

    pub fn with_client(client: Client, max_body_bytes: usize) -> Self {
        Self {
            client,
            max_body_bytes,
        }
    }
}

#[async_trait]
impl FeedFetcher for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(platform = %source.platform))]
    async fn fetch(&self, source: &FeedSource) -> Result<RawDocument> {
        let platform = source.platform.as_str();
        let mut response = self
            .client
            .get(&source.url)
            .send()
            .await
            .map_err(|e| MergeError::unavailable(platform, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MergeError::unavailable(platform, format!("HTTP {status}")));
        }
        if let Some(len) = response.content_length() {
            if len > self.max_body_bytes as u64 {
                return Err(MergeError::unavailable(
                    platform,
                    format!("body of {len} bytes exceeds {} byte limit", self.max_body_bytes),
                ));
            }
        }

        // Chunked responses carry no length, so the limit is enforced as the
        // body arrives.
        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| MergeError::unavailable(platform, e))?
        {
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(MergeError::unavailable(
                    platform,
                    format!(
                        "body exceeds {} byte limit after {} bytes",
                        self.max_body_bytes,
                        body.len() + chunk.len()
                    ),
                ));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(RawDocument {
            source: source.clone(),
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}
