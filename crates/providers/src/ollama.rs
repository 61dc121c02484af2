//! Native Ollama provider (`/api/chat`).
//!
//! Ollama also exposes an OpenAI-compatible endpoint, but reverse proxies in
//! front of Ollama commonly forward only the native API, so it is spoken
//! directly here.

use agentura_core::error::ProviderError;
use agentura_core::message::ChatMessage;
use agentura_core::provider::LanguageModel;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::http::{build_client, check_status, map_send_error};

pub struct OllamaProvider {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        headers: &BTreeMap<String, String>,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client: build_client(headers)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

#[async_trait]
impl LanguageModel for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "stream": false,
        });

        debug!(model = %self.model, messages = messages.len(), "Sending Ollama chat request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_send_error("ollama", e))?;

        let response = check_status("ollama", response).await?;

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            ProviderError::ModelUnavailable(format!("ollama: failed to parse response: {e}"))
        })?;

        Ok(parsed.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, routing::post};
    use serde_json::{Value, json};

    #[test]
    fn parse_chat_response() {
        let data = r#"{"model":"llama3.2","message":{"role":"assistant","content":"Hi there"},"done":true}"#;
        let parsed: ChatResponse = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.message.content, "Hi there");
    }

    #[tokio::test]
    async fn complete_against_local_server() {
        let router = Router::new().route(
            "/api/chat",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["stream"], false);
                let model = body["model"].as_str().unwrap().to_string();
                Json(json!({"message": {"role": "assistant", "content": format!("from {model}")}}))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

        let provider =
            OllamaProvider::new(format!("http://{addr}/"), "llama3.2", &BTreeMap::new()).unwrap();
        let reply = provider.complete(&[ChatMessage::user("hello")]).await.unwrap();
        assert_eq!(reply, "from llama3.2");
    }

    #[tokio::test]
    async fn unreachable_server_is_unavailable() {
        let provider = OllamaProvider::new("http://127.0.0.1:1", "m", &BTreeMap::new()).unwrap();
        let err = provider.complete(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, ProviderError::ModelUnavailable(_)));
    }
}
