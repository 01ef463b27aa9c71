//! Retry logic for registry queries with error classification.

use reqwest::StatusCode;
use thiserror::Error;

/// Maximum number of attempts for a registry query.
pub const MAX_RETRIES: usize = 3;

/// Delay between retry attempts in milliseconds.
pub const RETRY_DELAY_MS: u64 = 1000;

/// Registry answers that will not improve by asking again.
#[derive(Error, Debug)]
pub enum NonRetryableError {
    /// HTTP 429
    #[error("Rate limit exceeded: {0}. Try again later.")]
    RateLimitExceeded(String),
    #[error("Not found: {0}")]
    NotFound(String),
    /// HTTP 401 or 403
    #[error("Access forbidden: {0}")]
    Forbidden(String),
    #[error("Request error: {0}")]
    ClientError(String),
}

/// Classifies an error as retryable or non-retryable.
/// Returns Ok(()) if the error is retryable, Err with a user-friendly message if not.
pub fn classify_error(error: &reqwest::Error) -> Result<(), NonRetryableError> {
    if let Some(status) = error.status() {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(NonRetryableError::Forbidden(format!(
                    "registry refused the request (HTTP {})",
                    status.as_u16()
                )));
            }
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(NonRetryableError::RateLimitExceeded(
                    "registry rate limit reached".to_string(),
                ));
            }
            StatusCode::NOT_FOUND => {
                return Err(NonRetryableError::NotFound(
                    "the requested resource was not found".to_string(),
                ));
            }
            s if s.is_client_error() => {
                return Err(NonRetryableError::ClientError(format!(
                    "HTTP {} error",
                    s.as_u16()
                )));
            }
            // 5xx server errors are retryable
            _ => {}
        }
    }

    // Connection errors, timeouts, etc. are retryable
    Ok(())
}

/// Checks if an error from `error_for_status()` should be retried.
/// Returns the original error if retryable, or a NonRetryableError if not.
pub fn check_retryable(error: reqwest::Error) -> anyhow::Error {
    match classify_error(&error) {
        Ok(()) => anyhow::Error::from(error),
        Err(non_retryable) => anyhow::Error::from(non_retryable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn status_error(status: usize) -> reqwest::Error {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/")
            .with_status(status)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let response = client.get(server.url()).send().await.unwrap();
        response.error_for_status().unwrap_err()
    }

    #[test]
    fn test_non_retryable_error_display() {
        let err = NonRetryableError::RateLimitExceeded("registry rate limit reached".into());
        assert_eq!(
            err.to_string(),
            "Rate limit exceeded: registry rate limit reached. Try again later."
        );
        assert!(
            NonRetryableError::ClientError("HTTP 400 error".into())
                .to_string()
                .contains("HTTP 400")
        );
    }

    #[tokio::test]
    async fn test_classify_registry_statuses() {
        for status in [401, 403] {
            let err = status_error(status).await;
            assert!(
                matches!(classify_error(&err), Err(NonRetryableError::Forbidden(_))),
                "{} should be forbidden",
                status
            );
        }

        let err = status_error(429).await;
        assert!(matches!(
            classify_error(&err),
            Err(NonRetryableError::RateLimitExceeded(_))
        ));

        let err = status_error(404).await;
        assert!(matches!(classify_error(&err), Err(NonRetryableError::NotFound(_))));

        let err = status_error(422).await;
        assert!(matches!(
            classify_error(&err),
            Err(NonRetryableError::ClientError(_))
        ));

        for status in [500, 502, 503] {
            let err = status_error(status).await;
            assert!(classify_error(&err).is_ok(), "{} should be retried", status);
        }
    }

    #[tokio::test]
    async fn test_check_retryable() {
        let err = status_error(404).await;
        assert!(
            check_retryable(err)
                .downcast_ref::<NonRetryableError>()
                .is_some()
        );

        let err = status_error(503).await;
        assert!(
            check_retryable(err)
                .downcast_ref::<NonRetryableError>()
                .is_none()
        );
    }
}
