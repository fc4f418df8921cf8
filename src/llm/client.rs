//! 统一 LLM 后端接口

use futures::future::BoxFuture;
use reqwest::Client;
use std::time::Duration;

use super::types::{ChatMessage, ChatOptions, LlmError};

/// 聊天后端
///
/// 每次调用发送一次完整（非流式）请求，返回模型回复的原始文本。
pub trait ChatBackend: Send + Sync {
    /// 后端名称，用于日志
    fn name(&self) -> &'static str;

    /// 发送聊天请求
    fn chat<'a>(
        &'a self,
        model: &'a str,
        messages: &'a [ChatMessage],
        options: &'a ChatOptions,
    ) -> BoxFuture<'a, Result<String, LlmError>>;
}

/// 构建共享的 HTTP 客户端
pub fn build_http_client(timeout_secs: u64) -> Result<Client, LlmError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(5)
        .build()
        .map_err(LlmError::HttpError)
}

/// 读取非成功响应体并转换为 API 错误
pub(super) async fn api_error(response: reqwest::Response) -> LlmError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    LlmError::ApiError { status, message }
}
