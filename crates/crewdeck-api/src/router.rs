//! Router assembly.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{analytics, closers, crm, health, links};
use crate::state::AppState;

/// Build the full API router.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        // Closer lifecycle
        .route("/api/closers", get(closers::list_closers))
        .route("/api/closers/licenses", get(closers::licenses))
        .route("/api/closers/onboard", post(closers::onboard))
        .route("/api/closers/offboard/:id", delete(closers::offboard))
        .route("/api/closers/:id/platforms", get(closers::platforms))
        // Link reconciliation
        .route("/api/closer-links", get(links::closer_links))
        .route(
            "/api/closer-links-by-product",
            get(links::closer_links_by_product),
        )
        .route(
            "/api/closer-links/:email",
            get(links::links_for_closer).delete(links::delete_links_for_closer),
        )
        // Analytics (degraded/empty fallback, no local stores)
        .route("/api/analytics/overview", get(analytics::overview))
        .route("/api/analytics/calls", get(analytics::calls))
        .route("/api/analytics/setters", get(analytics::setters))
        // Raw CRM reads
        .route("/api/crm/users", get(crm::users))
        .with_state(state)
}
