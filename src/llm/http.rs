use std::time::Duration;

use serde_json::Value;

use super::models::ChatPayload;
use crate::error::{ClientError, Result, TransportError};

pub(crate) const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

pub(crate) fn chat_completions_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), CHAT_COMPLETIONS_PATH)
}

pub(crate) fn build_http_client(
    timeout: Duration,
    headers: reqwest::header::HeaderMap,
) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()
        .map_err(|e| ClientError::Configuration(format!("failed to build HTTP client: {e}")))
}

/// Single POST, no retry. Non-2xx statuses are returned as errors with the
/// upstream body attached.
pub(crate) async fn post_chat(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
    payload: &ChatPayload<'_>,
) -> Result<Value> {
    let response = client
        .post(url)
        .json(payload)
        .send()
        .await
        .map_err(|e| TransportError::from_reqwest(e, url, timeout))?;

    let status = response.status();
    if !status.is_success() {
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => format!("<body unreadable: {e}>"),
        };
        return Err(TransportError::Status {
            status: status.as_u16(),
            body,
        }
        .into());
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| TransportError::from_reqwest(e, url, timeout))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| ClientError::MalformedResponse(format!("response body is not JSON: {e}")))
}
