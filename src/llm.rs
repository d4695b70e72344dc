mod http;
mod mock;
mod models;
mod normalize;
#[cfg(test)]
mod test_server;
mod vllm;

pub use mock::MockModelClient;
pub use models::{
    Message, ModelRequest, ModelRequestBuilder, ModelResponse, Role, Usage, DEFAULT_MAX_TOKENS,
    DEFAULT_TEMPERATURE,
};
pub use normalize::normalize;
pub use vllm::VllmModelClient;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use crate::config::AppConfig;
use crate::error::{ClientError, Result};

/// A chat-completion backend.
///
/// Callers hold a `Box<dyn ModelClient>` and never depend on the concrete
/// backend. A call either yields a fully populated [`ModelResponse`] or fails.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn chat(&self, request: &ModelRequest) -> Result<ModelResponse>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Local simulation server with a canned reply.
    Mock,
    /// OpenAI-compatible vLLM inference server.
    Vllm,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Mock => f.write_str("mock"),
            Backend::Vllm => f.write_str("vllm"),
        }
    }
}

impl FromStr for Backend {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mock" => Ok(Backend::Mock),
            "vllm" => Ok(Backend::Vllm),
            other => Err(ClientError::Configuration(format!(
                "unknown backend '{other}', expected 'mock' or 'vllm'"
            ))),
        }
    }
}

pub fn create_client(backend: Backend, config: &AppConfig) -> Result<Box<dyn ModelClient>> {
    match backend {
        Backend::Mock => Ok(Box::new(MockModelClient::new(config.mock.clone())?)),
        Backend::Vllm => Ok(Box::new(VllmModelClient::new(config.vllm.clone())?)),
    }
}
