use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use super::http::{build_http_client, chat_completions_url, post_chat};
use super::models::{ChatPayload, ModelRequest, ModelResponse};
use super::normalize::normalize;
use super::ModelClient;
use crate::config::VllmClientConfig;
use crate::error::{ClientError, Result};

/// Client for an OpenAI-compatible vLLM inference server.
///
/// Falls back to `default_model` when a request leaves its model empty.
/// Only whole replies are supported; a client configured for streaming
/// rejects every call.
pub struct VllmModelClient {
    base_url: String,
    default_model: String,
    timeout: Duration,
    streaming: bool,
    client: reqwest::Client,
}

impl VllmModelClient {
    pub fn new(config: VllmClientConfig) -> Result<Self> {
        let headers = header_map(&config)?;
        let client = build_http_client(config.timeout, headers)?;

        Ok(Self {
            base_url: config.base_url,
            default_model: config.default_model,
            timeout: config.timeout,
            streaming: config.streaming,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// The request's model, or the client default when the request has none.
    pub fn resolve_model<'a>(&'a self, request: &'a ModelRequest) -> Result<&'a str> {
        let model = if request.model().is_empty() {
            self.default_model.as_str()
        } else {
            request.model()
        };

        if model.is_empty() {
            return Err(ClientError::Configuration(
                "no model specified in request or client default_model".to_string(),
            ));
        }
        Ok(model)
    }
}

fn header_map(config: &VllmClientConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            ClientError::Configuration(format!("invalid header name '{name}': {e}"))
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            ClientError::Configuration(format!(
                "invalid value for header '{}': {e}",
                name.as_str()
            ))
        })?;
        headers.insert(name, value);
    }
    Ok(headers)
}

#[async_trait]
impl ModelClient for VllmModelClient {
    async fn chat(&self, request: &ModelRequest) -> Result<ModelResponse> {
        if self.streaming {
            return Err(ClientError::UnsupportedMode(
                "streaming is not supported by this client".to_string(),
            ));
        }

        let model = self.resolve_model(request)?;

        let url = chat_completions_url(&self.base_url);
        let payload = ChatPayload::new(model, request);
        let body = post_chat(&self.client, &url, self.timeout, &payload).await?;

        normalize(&body, model)
    }
}
