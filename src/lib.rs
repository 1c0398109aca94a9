pub mod app;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use services::PixService;

pub fn router(service: Arc<PixService>) -> Router {
    Router::new()
        .route("/health", get(handlers::pix::health))
        .route("/api/pix/create", post(handlers::pix::create_pix))
        .with_state(service)
}
