use crate::state::AppState;
use axum::routing::post;
use axum::Router;

pub mod dto;
pub mod handler;
pub mod service;

pub fn router() -> Router<AppState> {
    Router::new().route("/generate", post(handler::generate_clip))
}
