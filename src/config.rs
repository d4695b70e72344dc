//! Client configuration.
//!
//! Resolved once by the application, usually via [`AppConfig::from_env`] after
//! loading `.env`, then handed to client constructors. Clients never read the
//! environment themselves.

use std::collections::BTreeMap;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use crate::error::{ClientError, Result};

pub const DEFAULT_MOCK_SERVER_URL: &str = "http://localhost:8000";
pub const DEFAULT_VLLM_SERVER_URL: &str = "http://localhost:8080";
pub const DEFAULT_MOCK_SERVER_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct MockClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for MockClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_MOCK_SERVER_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl MockClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn from_env() -> Result<Self> {
        Ok(AppConfig::from_env()?.mock)
    }
}

#[derive(Debug, Clone)]
pub struct VllmClientConfig {
    pub base_url: String,
    /// Used when a request leaves its model empty.
    pub default_model: String,
    pub timeout: Duration,
    /// Sent with every request, e.g. `Authorization`.
    pub headers: BTreeMap<String, String>,
    pub streaming: bool,
}

impl Default for VllmClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_VLLM_SERVER_URL.to_string(),
            default_model: String::new(),
            timeout: DEFAULT_TIMEOUT,
            headers: BTreeMap::new(),
            streaming: false,
        }
    }
}

impl VllmClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_api_key(self, api_key: &str) -> Self {
        self.with_header("Authorization", format!("Bearer {api_key}"))
    }

    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    pub fn from_env() -> Result<Self> {
        Ok(AppConfig::from_env()?.vllm)
    }
}

/// Everything the binaries need, resolved in one place.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mock: MockClientConfig,
    pub vllm: VllmClientConfig,
    pub mock_server_addr: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let timeout = match get("MODEL_CLIENT_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or_else(|| {
                        ClientError::Configuration(format!(
                            "MODEL_CLIENT_TIMEOUT_SECS must be a positive whole number of seconds, got '{raw}'"
                        ))
                    })?;
                Duration::from_secs(secs)
            }
            None => DEFAULT_TIMEOUT,
        };

        let streaming = match get("VLLM_STREAMING") {
            Some(raw) => parse_flag("VLLM_STREAMING", &raw)?,
            None => false,
        };

        let mut vllm = VllmClientConfig::new(
            get("VLLM_SERVER_URL").unwrap_or_else(|| DEFAULT_VLLM_SERVER_URL.to_string()),
        )
        .with_default_model(get("VLLM_MODEL").unwrap_or_default())
        .with_timeout(timeout)
        .with_streaming(streaming);
        if let Some(api_key) = get("VLLM_API_KEY") {
            vllm = vllm.with_api_key(&api_key);
        }

        let mock = MockClientConfig::new(
            get("MOCK_MODEL_SERVER_URL").unwrap_or_else(|| DEFAULT_MOCK_SERVER_URL.to_string()),
        )
        .with_timeout(timeout);

        let addr = get("MOCK_SERVER_ADDR").unwrap_or_else(|| DEFAULT_MOCK_SERVER_ADDR.to_string());
        let mock_server_addr = addr.parse().map_err(|_| {
            ClientError::Configuration(format!("MOCK_SERVER_ADDR is not a socket address: '{addr}'"))
        })?;

        Ok(Self {
            mock,
            vllm,
            mock_server_addr,
        })
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ClientError::Configuration(format!(
            "{key} must be a boolean flag, got '{raw}'"
        ))),
    }
}
