//! 应用配置管理
//!
//! 启动时加载一次：先读取可执行文件同级的 config.json，再用环境变量覆盖。
//! 加载后的配置不可变，显式传入需要它的组件。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

/// 获取配置文件路径
fn get_config_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("config.json")
}

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// OpenRouter API 密钥，为空时托管后端不可用
    #[serde(default)]
    pub openrouter_api_key: String,

    /// OpenRouter API 基础 URL
    #[serde(default = "default_openrouter_base_url")]
    pub openrouter_base_url: String,

    /// 托管后端默认模型（请求未指定 model 时使用）
    #[serde(default = "default_hosted_model")]
    pub hosted_default_model: String,

    /// 本地 Ollama 模型
    #[serde(default = "default_ollama_model")]
    pub ollama_model: String,

    /// Ollama 服务地址
    #[serde(default = "default_ollama_base_url")]
    pub ollama_base_url: String,

    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// HTTP 客户端超时（秒）
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// LLM 请求审计日志路径（JSONL），为空则不记录
    #[serde(default)]
    pub request_log_path: Option<String>,
}

fn default_openrouter_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_hosted_model() -> String {
    "openai/gpt-4o".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2".to_string()
}

fn default_ollama_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openrouter_api_key: String::new(),
            openrouter_base_url: default_openrouter_base_url(),
            hosted_default_model: default_hosted_model(),
            ollama_model: default_ollama_model(),
            ollama_base_url: default_ollama_base_url(),
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout_secs(),
            request_log_path: None,
        }
    }
}

impl AppConfig {
    /// 从配置文件和进程环境加载配置
    pub fn load() -> Self {
        let base = load_config_from_file().unwrap_or_default();
        base.with_overrides(|key| std::env::var(key).ok())
    }

    /// 用 lookup 返回的值覆盖对应字段
    ///
    /// lookup 以环境变量名为键；空字符串视为未设置。
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get("OPENROUTER_API_KEY") {
            self.openrouter_api_key = v;
        }
        if let Some(v) = get("OPENROUTER_BASE_URL") {
            self.openrouter_base_url = v;
        }
        if let Some(v) = get("HOSTED_DEFAULT_MODEL") {
            self.hosted_default_model = v;
        }
        if let Some(v) = get("OLLAMA_MODEL") {
            self.ollama_model = v;
        }
        if let Some(v) = get("OLLAMA_HOST") {
            self.ollama_base_url = v;
        }
        if let Some(v) = get("HOST") {
            self.host = v;
        }
        if let Some(v) = get("PORT") {
            match v.parse() {
                Ok(port) => self.port = port,
                Err(_) => warn!("Ignoring invalid PORT value: {}", v),
            }
        }
        if let Some(v) = get("LLM_TIMEOUT_SECS") {
            match v.parse() {
                Ok(secs) => self.request_timeout_secs = secs,
                Err(_) => warn!("Ignoring invalid LLM_TIMEOUT_SECS value: {}", v),
            }
        }
        if let Some(v) = get("LLM_REQUEST_LOG") {
            self.request_log_path = Some(v);
        }

        self
    }

    /// 托管后端是否已配置密钥
    pub fn hosted_available(&self) -> bool {
        !self.openrouter_api_key.trim().is_empty()
    }

    /// 服务监听地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 从文件加载配置
fn load_config_from_file() -> Option<AppConfig> {
    let path = get_config_path();
    if !path.exists() {
        return None;
    }

    let content = fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!("Ignoring malformed config file {}: {}", path.display(), e);
            None
        }
    }
}
