use axum::Router;
use axum::routing::get;
use crate::state::AppState;

pub mod handler;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::root).head(handler::root_head))
        .route("/health", get(handler::health))
}
