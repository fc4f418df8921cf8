//! Ollama 本地推理后端

use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::client::{api_error, ChatBackend};
use super::format::build_ollama_endpoint;
use super::types::{ChatMessage, ChatOptions, LlmError};

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f64,
    num_predict: u32,
}

#[derive(Deserialize, Debug)]
struct OllamaResponse {
    message: Option<OllamaMessage>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize, Debug)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
}

/// 本地 Ollama 客户端
pub struct OllamaClient {
    client: Client,
    endpoint: String,
}

impl OllamaClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: build_ollama_endpoint(base_url),
        }
    }

    async fn send(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<String, LlmError> {
        let payload = OllamaRequest {
            model,
            messages,
            stream: false,
            options: OllamaOptions {
                temperature: options.temperature,
                num_predict: options.max_tokens,
            },
        };

        debug!("Ollama request: endpoint={}, model={}", self.endpoint, model);

        let response = self.client.post(&self.endpoint).json(&payload).send().await?;

        if !response.status().is_success() {
            let err = api_error(response).await;
            if let LlmError::ApiError { status, message } = &err {
                error!(
                    "Ollama request failed: status={}, body={}. Make sure Ollama is running with: ollama serve",
                    status, message
                );
            }
            return Err(err);
        }

        let body = response.text().await?;
        extract_reply(&body)
    }
}

impl ChatBackend for OllamaClient {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn chat<'a>(
        &'a self,
        model: &'a str,
        messages: &'a [ChatMessage],
        options: &'a ChatOptions,
    ) -> BoxFuture<'a, Result<String, LlmError>> {
        Box::pin(self.send(model, messages, options))
    }
}

/// 取出 `message.content`
fn extract_reply(body: &str) -> Result<String, LlmError> {
    let parsed: OllamaResponse = serde_json::from_str(body)?;

    if let Some(message) = parsed.error {
        return Err(LlmError::ApiError { status: 200, message });
    }

    parsed
        .message
        .map(|m| m.content)
        .ok_or(LlmError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_reply() {
        let body = r#"{
            "model": "llama3.2",
            "created_at": "2024-09-25T10:00:00Z",
            "message": {"role": "assistant", "content": "\nWhat value does x hold here?\n"},
            "done": true
        }"#;
        assert_eq!(extract_reply(body).unwrap(), "\nWhat value does x hold here?\n");
    }

    #[test]
    fn test_extract_reply_error_body() {
        let body = r#"{"error": "model \"llama3.2\" not found, try pulling it first"}"#;
        match extract_reply(body).unwrap_err() {
            LlmError::ApiError { message, .. } => assert!(message.contains("not found")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_extract_reply_missing_message() {
        assert!(matches!(
            extract_reply(r#"{"done": true}"#).unwrap_err(),
            LlmError::EmptyResponse
        ));
    }

    #[test]
    fn test_request_payload_shape() {
        let messages = vec![ChatMessage::user("hi")];
        let payload = OllamaRequest {
            model: "llama3.2",
            messages: &messages,
            stream: false,
            options: OllamaOptions {
                temperature: 0.7,
                num_predict: 1200,
            },
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["model"], "llama3.2");
        assert_eq!(value["stream"], false);
        assert_eq!(value["options"]["temperature"], 0.7);
        assert_eq!(value["options"]["num_predict"], 1200);
        assert_eq!(value["messages"][0]["role"], "user");
    }
}
