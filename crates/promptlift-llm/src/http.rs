//! Shared HTTP client for HTTP-based providers
//!
//! One `reqwest::Client` per process with connect and request timeouts.
//! Response status codes are mapped into the [`LlmError`] taxonomy here so
//! every provider classifies failures identically. No retries happen at this
//! layer; the resilience decorator owns that policy.

use once_cell::sync::Lazy;
use promptlift_utils::LlmError;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::debug;

/// Connect timeout for all providers.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared client, built once per process.
static SHARED_CLIENT: Lazy<Result<Client, String>> = Lazy::new(|| {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .map_err(|e| e.to_string())
});

/// Handle to the shared HTTP client.
#[derive(Clone)]
pub(crate) struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Get the shared client.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Misconfiguration` if the client could not be built.
    pub fn shared() -> Result<Self, LlmError> {
        match &*SHARED_CLIENT {
            Ok(client) => Ok(Self {
                client: client.clone(),
            }),
            Err(e) => Err(LlmError::Misconfiguration(format!(
                "failed to build HTTP client: {e}"
            ))),
        }
    }

    /// Start a POST request on the shared client.
    pub fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.client.post(url)
    }

    /// Execute one request attempt with the given timeout and classify the
    /// outcome.
    ///
    /// # Errors
    ///
    /// - `LlmError::Auth` for 401/403
    /// - `LlmError::RateLimited` for 429
    /// - `LlmError::Overloaded` for 503 (other 5xx map to `Transport`)
    /// - `LlmError::Timeout` when the request timeout fires
    /// - `LlmError::Transport` for network failures and remaining statuses
    pub async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        timeout: Duration,
        provider: &str,
    ) -> Result<Response, LlmError> {
        let request = request
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Transport(format!("failed to build request: {e}")))?;

        debug!(
            provider = provider,
            timeout_secs = timeout.as_secs(),
            "executing HTTP request"
        );

        match self.client.execute(request).await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    Ok(response)
                } else {
                    Err(map_status(status, provider))
                }
            }
            Err(e) if e.is_timeout() => Err(LlmError::Timeout { duration: timeout }),
            Err(e) => Err(LlmError::Transport(format!(
                "{provider} request failed: {e}"
            ))),
        }
    }
}

/// Map a non-success HTTP status to the error taxonomy.
pub(crate) fn map_status(status: StatusCode, provider: &str) -> LlmError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            LlmError::Auth(format!("{provider} authentication failed: {status}"))
        }
        StatusCode::TOO_MANY_REQUESTS => {
            LlmError::RateLimited(format!("{provider} rate limit exceeded: {status}"))
        }
        StatusCode::SERVICE_UNAVAILABLE => {
            LlmError::Overloaded(format!("{provider} overloaded: {status}"))
        }
        _ => LlmError::Transport(format!("{provider} returned error status: {status}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_client_constructs() {
        assert!(HttpClient::shared().is_ok());
    }

    #[test]
    fn post_builds_on_the_shared_client() {
        let client = HttpClient::shared().unwrap();
        let request = client.post("http://localhost/v1/messages").build().unwrap();
        assert_eq!(request.method(), &reqwest::Method::POST);
        assert_eq!(request.url().as_str(), "http://localhost/v1/messages");
    }

    #[test]
    fn status_429_maps_to_rate_limited() {
        let err = map_status(StatusCode::TOO_MANY_REQUESTS, "anthropic");
        assert!(matches!(err, LlmError::RateLimited(_)));
        assert!(err.is_retryable());
        assert!(err.is_rate_limit());
    }

    #[test]
    fn status_503_maps_to_overloaded() {
        let err = map_status(StatusCode::SERVICE_UNAVAILABLE, "anthropic");
        assert!(matches!(err, LlmError::Overloaded(_)));
        assert!(err.is_retryable());
        assert!(!err.is_rate_limit());
    }

    #[test]
    fn auth_statuses_map_to_auth() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            let err = map_status(status, "anthropic");
            assert!(matches!(err, LlmError::Auth(_)));
            assert!(!err.is_retryable());
        }
    }

    #[test]
    fn other_statuses_map_to_transport() {
        for status in [
            StatusCode::BAD_REQUEST,
            StatusCode::NOT_FOUND,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
        ] {
            let err = map_status(status, "anthropic");
            assert!(matches!(err, LlmError::Transport(_)), "{status} mapping");
            assert!(!err.is_retryable());
        }
    }
}
