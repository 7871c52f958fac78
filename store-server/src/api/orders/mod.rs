//! Order API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", order_routes())
}

fn order_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_mine).post(handler::buy_now))
        .route("/checkout", post(handler::checkout))
        .route("/{id}", get(handler::get_full))
        .route("/{id}/status", put(handler::set_status))
}
