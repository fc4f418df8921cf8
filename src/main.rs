//! Socratic AI Debugging Tutor - Rust Backend
//!
//! 使用 axum 框架构建的后端服务：解析用户代码生成结构摘要，组装苏格拉底式辅导 prompt，
//! 并分发到 OpenRouter 或本地 Ollama。

use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod error;
mod llm;
mod models;
mod services;
mod state;
mod utils;

use api::create_api_routes;
use config::AppConfig;
use state::create_shared_state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 不存在时忽略
    dotenvy::dotenv().ok();

    // 初始化日志
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "socratic_tutor=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Socratic AI Debugging Tutor backend...");

    // 配置只加载一次
    let config = AppConfig::load();
    if !config.hosted_available() {
        warn!("OPENROUTER_API_KEY not set - OpenRouter mode will fail");
    }
    info!(
        "Local model: {} at {}, hosted default model: {}",
        config.ollama_model, config.ollama_base_url, config.hosted_default_model
    );

    let addr = config.bind_addr();
    let state = create_shared_state(config)?;

    // 前端运行在其他端口，允许所有来源
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(create_api_routes(Arc::clone(&state)))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on: {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
