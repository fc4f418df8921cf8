//! OpenAI 兼容 Chat Completions 实现（托管后端，默认 OpenRouter）

use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::client::{api_error, ChatBackend};
use super::format::{build_openai_endpoint, get_attribution_headers};
use super::types::{ChatMessage, ChatOptions, LlmError};

/// OpenAI 请求载荷
#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    temperature: f64,
    max_tokens: u32,
}

/// OpenAI 响应
#[derive(Deserialize, Debug)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
    /// OpenRouter 在部分失败场景下以 200 返回 error 对象
    #[serde(default)]
    error: Option<OpenAiErrorBody>,
}

#[derive(Deserialize, Debug)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Deserialize, Debug)]
struct OpenAiMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct OpenAiErrorBody {
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// 托管后端客户端
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl OpenAiClient {
    /// 创建新的客户端，api_key 不能为空
    pub fn new(client: Client, api_key: impl Into<String>, base_url: &str) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::ConfigError("API Key is required".to_string()));
        }

        Ok(Self {
            client,
            api_key,
            endpoint: build_openai_endpoint(base_url),
        })
    }

    async fn send(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<String, LlmError> {
        let payload = OpenAiRequest {
            model,
            messages,
            stream: false,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");

        for (key, value) in get_attribution_headers() {
            request = request.header(key, value);
        }

        debug!("OpenAI API request: endpoint={}, model={}", self.endpoint, model);

        let response = request.json(&payload).send().await?;

        if !response.status().is_success() {
            let err = api_error(response).await;
            if let LlmError::ApiError { status, message } = &err {
                let preview: String = message.chars().take(500).collect();
                error!("OpenAI API error: status={}, body={}", status, preview);
            }
            return Err(err);
        }

        let body = response.text().await?;
        extract_reply(&body)
    }
}

impl ChatBackend for OpenAiClient {
    fn name(&self) -> &'static str {
        "openrouter"
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

/// 从响应体中取出第一个 choice 的文本
fn extract_reply(body: &str) -> Result<String, LlmError> {
    let parsed: OpenAiResponse = serde_json::from_str(body)?;

    if let Some(err) = parsed.error {
        let status = err
            .code
            .as_ref()
            .and_then(|c| c.as_u64())
            .and_then(|c| u16::try_from(c).ok())
            .unwrap_or(200);
        return Err(LlmError::ApiError {
            status,
            message: err.message,
        });
    }

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(LlmError::EmptyResponse)
}
