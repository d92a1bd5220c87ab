//! Payment-link reconciliation endpoints.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/closer-links: flat per-closer grouping (legacy view).
pub async fn closer_links(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let groups = state.links.grouped_by_closer().await?;
    Ok(Json(json!({
        "success": true,
        "count": groups.len(),
        "data": groups,
    })))
}

/// GET /api/closer-links-by-product: per-product grouping.
pub async fn closer_links_by_product(
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let groups = state.links.grouped_by_product().await?;
    Ok(Json(json!({
        "success": true,
        "count": groups.len(),
        "data": groups,
    })))
}

/// GET /api/closer-links/:email: one closer's links.
///
/// The lookup races a fixed timeout budget so a stalled upstream does
/// not hang the caller; the loser of the race is abandoned.
pub async fn links_for_closer(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let budget = state.closer_links_timeout;
    let links = tokio::time::timeout(budget, state.links.links_for_closer(&email))
        .await
        .map_err(|_| {
            ApiError::Internal(format!(
                "request timed out after {} seconds",
                budget.as_secs()
            ))
        })??;

    Ok(Json(json!({
        "success": true,
        "count": links.len(),
        "data": links,
    })))
}

/// DELETE /api/closer-links/:email: delete all of a closer's links.
pub async fn delete_links_for_closer(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Value>, ApiError> {
    info!(email, "deleting closer links");
    let outcome = state.links.delete_for_closer(&email).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("deleted {} links for {email}", outcome.deleted_count),
        "deleted_count": outcome.deleted_count,
        "total_links": outcome.total_links,
        "errors": outcome.errors,
    })))
}
