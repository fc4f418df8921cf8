//! 后端分发服务
//!
//! 按请求选择托管（OpenRouter）或本地（Ollama）后端，使用固定解码参数，
//! 并把回复归一化为去除首尾空白的文本。后端内部的错误类型不会泄露给调用方。

use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::llm::{
    build_http_client, ChatBackend, ChatMessage, ChatOptions, ChatResult, LlmError, OllamaClient,
    OpenAiClient,
};
use crate::utils::RequestLogger;

/// 固定解码参数
pub const DECODING: ChatOptions = ChatOptions {
    temperature: 0.7,
    max_tokens: 1200,
};

/// 后端选择
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// 本地 Ollama
    Local,
    /// 托管 OpenAI 兼容服务（OpenRouter）
    Hosted,
}

impl Provider {
    /// 解析请求中的后端选择
    pub fn parse(selector: &str) -> AppResult<Self> {
        match selector.trim().to_lowercase().as_str() {
            "local" | "ollama" => Ok(Provider::Local),
            "hosted" | "openrouter" => Ok(Provider::Hosted),
            _ => Err(AppError::InvalidProvider(selector.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Local => "ollama",
            Provider::Hosted => "openrouter",
        }
    }
}

/// 后端分发器
///
/// 启动时根据配置构建一次，之后只读共享。
pub struct ProviderDispatcher {
    /// 未配置密钥时为 None
    hosted: Option<Arc<dyn ChatBackend>>,
    local: Arc<dyn ChatBackend>,
    hosted_default_model: String,
    local_model: String,
    logger: Option<Arc<RequestLogger>>,
}

impl ProviderDispatcher {
    /// 使用给定后端创建分发器
    pub fn new(
        hosted: Option<Arc<dyn ChatBackend>>,
        local: Arc<dyn ChatBackend>,
        hosted_default_model: impl Into<String>,
        local_model: impl Into<String>,
    ) -> Self {
        Self {
            hosted,
            local,
            hosted_default_model: hosted_default_model.into(),
            local_model: local_model.into(),
            logger: None,
        }
    }

    /// 根据配置构建真实后端
    pub fn from_config(config: &AppConfig) -> Result<Self, LlmError> {
        let http = build_http_client(config.request_timeout_secs)?;

        let hosted: Option<Arc<dyn ChatBackend>> = if config.hosted_available() {
            let client = OpenAiClient::new(
                http.clone(),
                &config.openrouter_api_key,
                &config.openrouter_base_url,
            )?;
            Some(Arc::new(client))
        } else {
            None
        };

        let local: Arc<dyn ChatBackend> = Arc::new(OllamaClient::new(http, &config.ollama_base_url));

        let mut dispatcher = Self::new(
            hosted,
            local,
            &config.hosted_default_model,
            &config.ollama_model,
        );

        if let Some(path) = &config.request_log_path {
            dispatcher = dispatcher.with_logger(Arc::new(RequestLogger::new(path)));
        }

        Ok(dispatcher)
    }

    /// 启用请求审计日志
    pub fn with_logger(mut self, logger: Arc<RequestLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// 分发到所选后端
    pub async fn dispatch(
        &self,
        messages: Vec<ChatMessage>,
        provider: &str,
        model_override: Option<&str>,
    ) -> AppResult<ChatResult> {
        match Provider::parse(provider)? {
            Provider::Hosted => self.dispatch_hosted(&messages, model_override).await,
            Provider::Local => self.dispatch_local(&messages).await,
        }
    }

    async fn dispatch_hosted(
        &self,
        messages: &[ChatMessage],
        model_override: Option<&str>,
    ) -> AppResult<ChatResult> {
        let backend = self
            .hosted
            .as_ref()
            .ok_or_else(|| AppError::Config("OpenRouter API key not configured".to_string()))?;

        let model = model_override
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.hosted_default_model);

        self.invoke(Provider::Hosted, backend.as_ref(), model, messages).await
    }

    /// 本地后端始终使用进程级默认模型，不接受请求覆盖
    async fn dispatch_local(&self, messages: &[ChatMessage]) -> AppResult<ChatResult> {
        self.invoke(Provider::Local, self.local.as_ref(), &self.local_model, messages)
            .await
    }

    /// 调用后端并归一化结果
    async fn invoke(
        &self,
        provider: Provider,
        backend: &dyn ChatBackend,
        model: &str,
        messages: &[ChatMessage],
    ) -> AppResult<ChatResult> {
        let request_id = Uuid::new_v4().to_string();
        let start_time = Instant::now();
        let entry = self
            .logger
            .as_ref()
            .map(|logger| logger.begin(&request_id, provider.as_str(), model, messages, &DECODING));

        info!(
            "LLM request: id={}, backend={}, model={}, messages={}",
            request_id,
            backend.name(),
            model,
            messages.len()
        );

        let outcome = backend
            .chat(model, messages, &DECODING)
            .await
            .and_then(|reply| {
                let text = reply.trim();
                if text.is_empty() {
                    Err(LlmError::EmptyResponse)
                } else {
                    Ok(text.to_string())
                }
            });

        match outcome {
            Ok(text) => {
                info!(
                    "LLM reply: id={}, chars={}, elapsed_ms={}",
                    request_id,
                    text.chars().count(),
                    start_time.elapsed().as_millis()
                );
                if let (Some(logger), Some(entry)) = (&self.logger, entry) {
                    logger.log_success(entry, start_time, &text);
                }
                Ok(ChatResult { text })
            }
            Err(e) => {
                error!(
                    "LLM backend call failed: id={}, backend={}, model={}, error={:?}",
                    request_id,
                    backend.name(),
                    model,
                    e
                );
                if let (Some(logger), Some(entry)) = (&self.logger, entry) {
                    logger.log_error(entry, start_time, &e);
                }
                Err(AppError::Provider(e.to_string()))
            }
        }
    }
}
