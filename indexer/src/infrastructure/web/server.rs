// Web server for the admin API

use axum::http::{header, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::application::sync::NetworkManager;
use crate::config::AppConfig;
use crate::utils::cancel::CancelSignal;
use crate::utils::logging;

use super::routes::{create_router, AppState};

/// Serve the admin API until `shutdown` is cancelled
pub async fn start_server(
    config: &AppConfig,
    manager: Arc<NetworkManager>,
    shutdown: CancelSignal,
) -> std::io::Result<()> {
    let state = AppState { manager };

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_origin(Any);

    let app = create_router(state).layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.web.api_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    logging::log_info(&format!(
        "🌐 Admin API listening on http://localhost:{}",
        config.web.api_port
    ));

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}
