use reqwest::Response;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::{ExternalServiceError, FanError, Result};

const BODY_EXCERPT_CHARS: usize = 300;

/// One client per adapter, every request bounded by `timeout`.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("fan_intake/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| FanError::Config(format!("Failed to build HTTP client: {e}")))
}

/// Reads a JSON body, turning non-2xx statuses and undecodable bodies into service errors.
pub async fn read_json<T: DeserializeOwned>(
    service: &'static str,
    resp: Response,
) -> std::result::Result<T, ExternalServiceError> {
    let status = resp.status();
    let text = resp
        .text()
        .await
        .map_err(|e| ExternalServiceError::from_reqwest(service, e))?;
    if !status.is_success() {
        return Err(ExternalServiceError::Status {
            service,
            status: status.as_u16(),
            body: excerpt(&text),
        });
    }
    serde_json::from_str(&text).map_err(|e| ExternalServiceError::MalformedResponse {
        service,
        detail: format!("{e}: {}", excerpt(&text)),
    })
}

fn excerpt(text: &str) -> String {
    text.chars().take(BODY_EXCERPT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_truncates_long_bodies() {
        let long = "x".repeat(1000);
        assert_eq!(excerpt(&long).len(), BODY_EXCERPT_CHARS);
        assert_eq!(excerpt("short"), "short");
    }

    #[test]
    fn client_builds_with_timeout() {
        assert!(build_client(Duration::from_secs(5)).is_ok());
    }
}
