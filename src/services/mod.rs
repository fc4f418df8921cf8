//! 服务层模块

mod dispatcher;
pub mod grounding;
mod prompt_service;

pub use dispatcher::ProviderDispatcher;
pub use prompt_service::PromptService;
