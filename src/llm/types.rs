//! LLM 类型定义

use serde::{Deserialize, Serialize};

/// 消息角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// 聊天消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// 角色：system, user, assistant
    pub role: Role,
    /// 消息内容
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[cfg(test)]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// 解码选项
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChatOptions {
    /// 温度参数
    pub temperature: f64,
    /// 最大输出 token 数
    pub max_tokens: u32,
}

/// 归一化后的模型回复
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatResult {
    /// 去除首尾空白后的回复文本，保证非空
    pub text: String,
}

/// LLM 错误类型
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// HTTP 请求错误
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// API 返回错误
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// 配置错误
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// JSON 解析错误
    #[error("failed to parse response JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// 回复为空
    #[error("model returned an empty reply")]
    EmptyResponse,
}
