//! Registry HTTP access: retried JSON queries and single-shot downloads.

use anyhow::{Context, Result};
use log::{debug, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::retry::{MAX_RETRIES, NonRetryableError, RETRY_DELAY_MS, check_retryable};

/// Client identifier sent with every registry request.
pub const USER_AGENT: &str = concat!("pacmine/", env!("PACMINE_VERSION"));

/// Upper bound for one catalog query (search, release listings, project lookups), retries included.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound for a single artifact download.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client with retry logic for registry queries.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    query_timeout: Duration,
    download_timeout: Duration,
}

impl HttpClient {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            query_timeout: QUERY_TIMEOUT,
            download_timeout: DOWNLOAD_TIMEOUT,
        }
    }

    /// Builds a client that identifies itself with [`USER_AGENT`].
    pub fn for_registry() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::new(client))
    }

    /// GET `url` and decode the JSON body, retrying transient failures.
    #[tracing::instrument(skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.get_json_with_query(url, &[]).await
    }

    /// Like [`get_json`](Self::get_json) with URL-encoded query parameters.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        debug!("Querying {} {:?}", url, query);

        self.with_retry(url, || async {
            let response = self
                .client
                .get(url)
                .query(query)
                .timeout(self.query_timeout)
                .send()
                .await
                .context("Registry request failed")?;

            let response = response.error_for_status().map_err(check_retryable)?;

            let result = response
                .json::<T>()
                .await
                .context("Registry returned malformed JSON")?;

            Ok(result)
        })
        .await
    }

    /// Downloads the full body of `url` into memory.
    ///
    /// Single attempt: a failed download is reported to the caller as-is.
    #[tracing::instrument(skip(self))]
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!("Downloading {}...", url);

        let response = self
            .client
            .get(url)
            .timeout(self.download_timeout)
            .send()
            .await
            .context("Download request failed")?;

        let response = response.error_for_status().map_err(check_retryable)?;

        let bytes = response
            .bytes()
            .await
            .context("Failed to read download body")?;

        debug!(
            "Downloaded {:.2} MB",
            bytes.len() as f64 / (1024.0 * 1024.0)
        );

        Ok(bytes.to_vec())
    }

    /// Up to [`MAX_RETRIES`] attempts, stopping early on a [`NonRetryableError`].
    ///
    /// `query_timeout` bounds the whole operation, retries and delays included.
    async fn with_retry<F, Fut, T>(&self, what: &str, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let attempts = async {
            let mut attempt = 1;
            loop {
                let e = match operation().await {
                    Ok(result) => return Ok(result),
                    Err(e) => e,
                };

                if !is_retryable_error(&e) {
                    debug!("{}: giving up, {}", what, e);
                    return Err(e);
                }
                if attempt >= MAX_RETRIES {
                    return Err(e.context(format!("{} failed after {} attempts", what, attempt)));
                }

                warn!(
                    "{}: attempt {}/{} failed ({:#}), retrying in {}ms",
                    what, attempt, MAX_RETRIES, e, RETRY_DELAY_MS
                );
                tokio::time::sleep(Duration::from_millis(RETRY_DELAY_MS)).await;
                attempt += 1;
            }
        };

        tokio::time::timeout(self.query_timeout, attempts)
            .await
            .map_err(|_| anyhow::anyhow!("{} timed out after {:?}", what, self.query_timeout))?
    }
}

fn is_retryable_error(e: &anyhow::Error) -> bool {
    e.downcast_ref::<NonRetryableError>().is_none()
}
