use anyhow::{Context, Result};
use tracing::info;

use dealership_server::{build_router, config::AppConfig, db::init_db, AppState};

// ========================================
// メイン
// ========================================

#[tokio::main]
async fn main() -> Result<()> {
    // ログ初期化
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = AppConfig::from_env()?;

    // ストア初期化（プロセス終了で破棄）
    let state = AppState::new(init_db(config.seed_inventory));

    // ルーター構築
    let app = build_router(state);

    let addr = config.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("🚀 Dealership API Server listening on {}", addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
