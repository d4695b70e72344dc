//! Simulation server for offline development.
//!
//! Speaks just enough of the OpenAI chat-completion API for
//! [`crate::llm::MockModelClient`], and always answers with the same reply.

use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::{debug, info};

pub const MOCK_REPLY: &str = "Mock response for dev";

pub fn router() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/v1/chat/completions", post(chat_completions))
}

pub async fn serve(listener: TcpListener) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock LLM server listening");
    }
    axum::serve(listener, router()).await
}

async fn root() -> Json<Value> {
    Json(json!({"status": "running", "message": "Mock LLM server is up!"}))
}

async fn health() -> Json<Value> {
    Json(json!({"status": "healthy"}))
}

/// Only the fields the server checks; anything else in the body is ignored.
#[derive(Debug, Deserialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Value>,
}

async fn chat_completions(Json(request): Json<ChatRequest>) -> Json<Value> {
    debug!(
        model = %request.model,
        messages = request.messages.len(),
        "chat completion request"
    );

    Json(json!({
        "id": "mock",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": MOCK_REPLY}
        }]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    async fn spawn() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener));
        addr
    }

    #[tokio::test]
    async fn test_status_endpoints() {
        let addr = spawn().await;
        let http = reqwest::Client::new();

        let root: Value = http
            .get(format!("http://{addr}/"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(root["status"], "running");
        assert!(root["message"].is_string());

        let health: Value = http
            .get(format!("http://{addr}/health"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health, json!({"status": "healthy"}));
    }

    #[tokio::test]
    async fn test_chat_completion_is_fixed() {
        let addr = spawn().await;
        let response = reqwest::Client::new()
            .post(format!("http://{addr}/v1/chat/completions"))
            .json(&json!({
                "model": "anything",
                "messages": [{"role": "user", "content": "Hello"}],
                "temperature": 1.5
            }))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["choices"][0]["message"]["content"], MOCK_REPLY);
        assert!(body.get("usage").is_none());
    }

    #[tokio::test]
    async fn test_chat_completion_requires_model_and_messages() {
        let addr = spawn().await;
        let response = reqwest::Client::new()
            .post(format!("http://{addr}/v1/chat/completions"))
            .json(&json!({"messages": []}))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }
}
