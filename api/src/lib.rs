//! Chord Ledger HTTP API

mod error;
mod routes;
mod state;

pub use error::{ApiError, ApiResult};
pub use state::ApiState;

use axum::{
    http::{header::CONTENT_TYPE, Method},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the full router with state and middleware attached.
pub fn create_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    routes::create_routes()
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn start_server(
    addr: SocketAddr,
    state: ApiState,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Chord API listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
