//! Uniform client for chat-completion backends.
//!
//! Build a validated [`ModelRequest`], pick a backend through
//! [`create_client`], and read the canonical [`ModelResponse`]. Upstream JSON
//! never reaches the caller.

pub mod config;
pub mod error;
pub mod llm;
pub mod sim_server;

pub use config::{AppConfig, MockClientConfig, VllmClientConfig};
pub use error::{ClientError, Result, TransportError};
pub use llm::{
    create_client, Backend, Message, MockModelClient, ModelClient, ModelRequest, ModelResponse,
    Role, Usage, VllmModelClient,
};
