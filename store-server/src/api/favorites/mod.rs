//! Favorites API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/favorites", favorite_routes())
}

fn favorite_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/{product_id}", get(handler::is_favorite))
        .route("/{product_id}/toggle", post(handler::toggle))
}
