//! 请求/响应模型

mod api;

pub use api::{DebugRequest, DebugResponse};
