//! HTTP client module with retry logic and error handling.

mod client;
mod retry;

pub use client::{DOWNLOAD_TIMEOUT, HttpClient, QUERY_TIMEOUT, USER_AGENT};
pub use retry::{MAX_RETRIES, NonRetryableError, RETRY_DELAY_MS, check_retryable, classify_error};
