use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::pipeline::Pipeline;

pub mod error;
pub mod handlers;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

pub fn create_router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/search", post(handlers::search_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(AppState { pipeline })
}
