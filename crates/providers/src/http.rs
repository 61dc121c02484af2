//! Shared HTTP plumbing for the providers.

use agentura_core::error::ProviderError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::warn;

/// Upper bound on a single completion request.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Build a client that sends `headers` with every request.
pub(crate) fn build_client(
    headers: &BTreeMap<String, String>,
) -> Result<reqwest::Client, ProviderError> {
    let mut default_headers = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            ProviderError::ModelUnavailable(format!("Invalid header name '{name}': {e}"))
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            ProviderError::ModelUnavailable(format!("Invalid value for header '{name}': {e}"))
        })?;
        default_headers.insert(name, value);
    }

    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .default_headers(default_headers)
        .build()
        .map_err(|e| ProviderError::ModelUnavailable(format!("Failed to create HTTP client: {e}")))
}

pub(crate) fn map_send_error(provider: &str, e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::ModelTimeout(format!("{provider}: {e}"))
    } else {
        ProviderError::ModelUnavailable(format!("{provider}: {e}"))
    }
}

/// Turn a non-2xx response into an error, keeping the body for the log.
pub(crate) async fn check_status(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!(provider, status = status.as_u16(), body = %body, "Provider returned error");
    Err(ProviderError::ModelUnavailable(format!(
        "{provider} returned HTTP {}",
        status.as_u16()
    )))
}
