//! 应用状态管理
//!
//! 定义在请求处理器之间共享的只读状态。

use std::sync::Arc;

use crate::config::AppConfig;
use crate::llm::LlmError;
use crate::services::{PromptService, ProviderDispatcher};

/// 应用共享状态
///
/// 启动后不再修改，请求之间没有可变共享数据
pub struct AppState {
    /// 启动时加载的配置
    pub config: Arc<AppConfig>,
    /// Prompt 组装
    pub prompts: PromptService,
    /// 后端分发
    pub dispatcher: ProviderDispatcher,
}

impl AppState {
    /// 使用给定分发器创建状态
    pub fn new(config: AppConfig, dispatcher: ProviderDispatcher) -> Self {
        Self {
            config: Arc::new(config),
            prompts: PromptService::new(),
            dispatcher,
        }
    }

    /// 根据配置构建真实后端
    pub fn from_config(config: AppConfig) -> Result<Self, LlmError> {
        let dispatcher = ProviderDispatcher::from_config(&config)?;
        Ok(Self::new(config, dispatcher))
    }
}

/// 创建可共享的应用状态
pub fn create_shared_state(config: AppConfig) -> Result<Arc<AppState>, LlmError> {
    Ok(Arc::new(AppState::from_config(config)?))
}
