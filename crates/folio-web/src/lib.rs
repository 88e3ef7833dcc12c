//! Folio Notify Web Server
//!
//! Axum endpoint exposing the notification broker over WebSocket.

pub mod config;
pub mod identity;
pub mod state;
pub mod websocket;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use config::ServerConfig;
use state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(websocket::ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the notification server until the process is stopped.
pub async fn run_server(host: &str, port: u16, config: ServerConfig) -> anyhow::Result<()> {
    let state = AppState::new(config);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{host}:{port}")).await?;
    tracing::info!("Notification server listening on ws://{host}:{port}/ws");

    axum::serve(listener, app).await?;
    Ok(())
}
