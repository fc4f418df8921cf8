//! 调试辅导端点

use axum::{extract::State, routing::post, Json, Router};
use std::sync::Arc;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{DebugRequest, DebugResponse};
use crate::state::AppState;

/// 处理一次辅导请求：组装 prompt 后分发到所选后端
async fn debug_code(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DebugRequest>,
) -> AppResult<Json<DebugResponse>> {
    let request_id = Uuid::new_v4();
    let span = info_span!(
        "debug",
        %request_id,
        provider = %req.llm_provider,
        language = %req.language
    );

    async move {
        if req.code.trim().is_empty() {
            return Err(AppError::EmptyInput);
        }

        let messages = state.prompts.assemble(&req);
        info!(
            "Assembled prompt: messages={}, history={}",
            messages.len(),
            req.conversation_history.len()
        );

        let result = state
            .dispatcher
            .dispatch(messages, &req.llm_provider, req.model.as_deref())
            .await?;

        Ok(Json(DebugResponse {
            response: result.text,
        }))
    }
    .instrument(span)
    .await
}

/// 创建调试辅导路由
pub fn debug_routes() -> Router<Arc<AppState>> {
    Router::new().route("/debug", post(debug_code))
}
