//! Route definitions for the orders API.

pub mod health;
pub mod orders;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let order_routes = Router::new()
        .route("/orders/all", get(orders::list_all))
        .route("/orders/update", post(orders::update))
        .route("/orders/{id}", delete(orders::delete));

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/api", order_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
