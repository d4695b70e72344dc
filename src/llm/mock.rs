use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;

use super::http::{build_http_client, chat_completions_url, post_chat};
use super::models::{ChatPayload, ModelRequest, ModelResponse};
use super::normalize::normalize;
use super::ModelClient;
use crate::config::MockClientConfig;
use crate::error::{ClientError, Result};

/// Client for the local simulation server (see [`crate::sim_server`]).
pub struct MockModelClient {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl MockModelClient {
    pub fn new(config: MockClientConfig) -> Result<Self> {
        let client = build_http_client(config.timeout, HeaderMap::new())?;
        Ok(Self {
            base_url: config.base_url,
            timeout: config.timeout,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    async fn chat(&self, request: &ModelRequest) -> Result<ModelResponse> {
        // No default model on this path.
        if request.model().is_empty() {
            return Err(ClientError::InvalidRequest(
                "model must not be empty for the simulation backend".to_string(),
            ));
        }

        let url = chat_completions_url(&self.base_url);
        let payload = ChatPayload::new(request.model(), request);
        let body = post_chat(&self.client, &url, self.timeout, &payload).await?;

        normalize(&body, request.model())
    }
}
