use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use frontdesk::config::AppConfig;
use frontdesk::handlers;
use frontdesk::services::assistant::Assistant;
use frontdesk::services::directory::intakeq::IntakeQDirectory;
use frontdesk::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    if config.directory_api_key.is_empty() {
        tracing::warn!("DIRECTORY_API_KEY is not set; directory calls will be rejected upstream");
    }

    let directory = IntakeQDirectory::new(
        config.directory_api_url.clone(),
        config.directory_api_key.clone(),
    );
    let assistant = Assistant::new(Arc::new(directory), config.assistant.clone())?;

    let state = Arc::new(AppState { config, assistant });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/webhook/voice", post(handlers::webhook::voice_webhook))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state.clone());

    let addr = format!("0.0.0.0:{}", state.config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
