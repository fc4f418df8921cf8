//! LLM 模块
//!
//! 提供托管（OpenAI 兼容 / OpenRouter）与本地（Ollama）两种聊天后端。

mod client;
mod format;
mod ollama;
mod openai;
mod types;

pub use client::{build_http_client, ChatBackend};
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;
pub use types::*;
