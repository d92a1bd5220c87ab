//! Raw CRM reads.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/crm/users: the unfiltered staff list, straight from the
/// CRM API (there is no local copy to serve from).
pub async fn users(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let users = state.crm.list_users().await?;

    let rows: Vec<Value> = users
        .into_iter()
        .map(|u| {
            let email = (!u.email.is_empty()).then_some(u.email.clone());
            json!({
                "id": u.id,
                "name": u.display_name(),
                "email": email,
                "role": u.role,
                "first_name": u.first_name,
                "last_name": u.last_name,
            })
        })
        .collect();

    Ok(Json(json!({
        "success": true,
        "count": rows.len(),
        "users": rows,
        "source": "crm-api",
    })))
}
