use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ClientError, Result};

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "tool")]
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            "tool" => Ok(Role::Tool),
            other => Err(ClientError::InvalidRequest(format!(
                "unknown role '{other}', expected one of system, user, assistant, tool"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Build a message from an untyped role name.
    pub fn parse(role: &str, content: impl Into<String>) -> Result<Self> {
        Ok(Self::new(role.parse()?, content))
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn tool(content: impl Into<String>) -> Self {
        Self::new(Role::Tool, content)
    }
}

/// A validated chat-completion request.
///
/// Only obtainable through [`ModelRequest::builder`], [`ModelRequest::new`] or
/// deserialization, all of which run the same checks. Clients borrow it and
/// never mutate it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawModelRequest")]
pub struct ModelRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
    tools: Option<Vec<Value>>,
}

impl ModelRequest {
    pub fn builder(model: impl Into<String>) -> ModelRequestBuilder {
        ModelRequestBuilder::new(model)
    }

    /// Request with default sampling settings and no tools.
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Result<Self> {
        Self::builder(model).messages(messages).build()
    }

    /// Requested model; may be empty when the backend has a default.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn tools(&self) -> Option<&[Value]> {
        self.tools.as_deref()
    }
}

#[derive(Debug, Clone)]
pub struct ModelRequestBuilder {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
    tools: Option<Vec<Value>>,
}

impl ModelRequestBuilder {
    fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            tools: None,
        }
    }

    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn messages(mut self, messages: impl IntoIterator<Item = Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn tools(mut self, tools: Vec<Value>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn build(self) -> Result<ModelRequest> {
        if self.messages.is_empty() {
            return Err(ClientError::InvalidRequest(
                "messages must contain at least one message".to_string(),
            ));
        }
        if self.max_tokens == 0 {
            return Err(ClientError::InvalidRequest(
                "max_tokens must be greater than 0".to_string(),
            ));
        }
        if !self.temperature.is_finite() {
            return Err(ClientError::InvalidRequest(format!(
                "temperature must be a finite number, got {}",
                self.temperature
            )));
        }

        Ok(ModelRequest {
            model: self.model,
            messages: self.messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            tools: self.tools,
        })
    }
}

#[derive(Deserialize)]
struct RawModelRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(default = "default_temperature")]
    temperature: f32,
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,
    #[serde(default)]
    tools: Option<Vec<Value>>,
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

impl TryFrom<RawModelRequest> for ModelRequest {
    type Error = ClientError;

    fn try_from(raw: RawModelRequest) -> Result<Self> {
        let builder = ModelRequest::builder(raw.model)
            .messages(raw.messages)
            .temperature(raw.temperature)
            .max_tokens(raw.max_tokens);
        match raw.tools {
            Some(tools) => builder.tools(tools).build(),
            None => builder.build(),
        }
    }
}

/// Token counters reported by the upstream.
///
/// The three standard counters are always present. Any other integer counters
/// the upstream reports are kept in `extra`.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    #[serde(flatten)]
    pub extra: BTreeMap<String, u64>,
}

impl Usage {
    pub const PROMPT_TOKENS: &'static str = "prompt_tokens";
    pub const COMPLETION_TOKENS: &'static str = "completion_tokens";
    pub const TOTAL_TOKENS: &'static str = "total_tokens";

    /// Look up a counter by name.
    pub fn get(&self, name: &str) -> Option<u64> {
        match name {
            Self::PROMPT_TOKENS => Some(self.prompt_tokens),
            Self::COMPLETION_TOKENS => Some(self.completion_tokens),
            Self::TOTAL_TOKENS => Some(self.total_tokens),
            other => self.extra.get(other).copied(),
        }
    }
}

/// Canonical reply shared by every backend. Built only by the normalizer.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModelResponse {
    model: String,
    output_text: String,
    tool_calls: Option<Vec<Value>>,
    usage: Usage,
}

impl ModelResponse {
    pub(crate) fn new(
        model: String,
        output_text: String,
        tool_calls: Option<Vec<Value>>,
        usage: Usage,
    ) -> Self {
        Self {
            model,
            output_text,
            tool_calls,
            usage,
        }
    }

    /// The model the request was resolved to, not necessarily the one asked for.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn output_text(&self) -> &str {
        &self.output_text
    }

    pub fn tool_calls(&self) -> Option<&[Value]> {
        self.tool_calls.as_deref()
    }

    pub fn usage(&self) -> &Usage {
        &self.usage
    }
}

/// Outbound body for `POST /v1/chat/completions`.
#[derive(Debug, Serialize)]
pub(crate) struct ChatPayload<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub temperature: f32,
    pub max_tokens: u32,
    pub tools: Option<&'a [Value]>,
}

impl<'a> ChatPayload<'a> {
    pub fn new(model: &'a str, request: &'a ModelRequest) -> Self {
        Self {
            model,
            messages: request.messages(),
            temperature: request.temperature(),
            max_tokens: request.max_tokens(),
            tools: request.tools(),
        }
    }
}
