//! 统一错误处理模块
//!
//! 定义管线级错误类型，并实现 axum 的 IntoResponse trait 以便自动转换为 HTTP 响应。
//! 代码分析失败不在此列：它总是降级为嵌入提示词的诊断文本。

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// 应用错误枚举
#[derive(Error, Debug)]
pub enum AppError {
    /// 提交的代码为空
    #[error("No code provided")]
    EmptyInput,

    /// 所选后端缺少必要配置
    #[error("{0}")]
    Config(String),

    /// 未知的后端选择
    #[error("Invalid llm_provider '{0}'. Use 'ollama' (local) or 'openrouter' (hosted)")]
    InvalidProvider(String),

    /// 后端调用失败，保留原始错误信息
    #[error("LLM backend error: {0}")]
    Provider(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::EmptyInput | AppError::InvalidProvider(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Provider(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // 前端读取 detail 字段
        let body = Json(json!({
            "detail": self.to_string()
        }));

        (self.status_code(), body).into_response()
    }
}

/// 便捷类型别名
pub type AppResult<T> = Result<T, AppError>;
