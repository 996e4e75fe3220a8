mod app;
mod auth;
mod config;
mod db;
mod error;
mod exchange;
mod games;
mod state;
mod storage;
mod users;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "tokenquest=debug,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = state::AppState::init().await?;
    if std::env::args().any(|a| a == "--reset-data") {
        app_state.db.clear().await?;
    }
    tracing::info!(
        data_dir = %app_state.config.data_dir,
        users = app_state.db.users().await?.len(),
        "store opened"
    );

    let config = app_state.config.clone();
    app::serve(app::build_app(app_state), &config).await
}
