//! Analytics endpoints.
//!
//! The system keeps no call/sales records of its own. These endpoints
//! return the degraded empty fallback with `source` set accordingly,
//! so callers can always tell they are not looking at live aggregation.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::models::SourcedData;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DaysQuery {
    pub days: Option<u32>,
}

/// Accepted call-log filters. The disabled source returns an empty set
/// regardless, but the parameters are validated by deserialization.
#[derive(Debug, Deserialize)]
pub struct CallsQuery {
    pub phone_number: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<u32>,
    pub status: Option<String>,
    pub setter: Option<String>,
}

/// GET /api/analytics/overview?days=N
pub async fn overview(
    State(_state): State<AppState>,
    Query(query): Query<DaysQuery>,
) -> Json<SourcedData<serde_json::Value>> {
    let days = query.days.unwrap_or(7);
    Json(SourcedData::disabled(json!({
        "period": format!("{days} days"),
        "total_calls": 0,
        "completed_calls": 0,
        "avg_duration_secs": 0,
        "numbers": [],
        "note": "call analytics stores are disabled; all reads go to live upstream APIs",
    })))
}

/// GET /api/analytics/calls?filters…
pub async fn calls(
    State(_state): State<AppState>,
    Query(query): Query<CallsQuery>,
) -> Json<SourcedData<serde_json::Value>> {
    Json(SourcedData::disabled(json!({
        "count": 0,
        "calls": [],
        "filters": {
            "phone_number": query.phone_number,
            "start_date": query.start_date,
            "end_date": query.end_date,
            "limit": query.limit.unwrap_or(1000),
            "status": query.status,
            "setter": query.setter,
        },
        "note": "call analytics stores are disabled; all reads go to live upstream APIs",
    })))
}

/// GET /api/analytics/setters?days=N
pub async fn setters(
    State(_state): State<AppState>,
    Query(query): Query<DaysQuery>,
) -> Json<SourcedData<serde_json::Value>> {
    let days = query.days.unwrap_or(7);
    Json(SourcedData::disabled(json!({
        "period": format!("{days} days"),
        "setters": [],
        "summary": {
            "total_setters": 0,
            "total_calls": 0,
            "avg_calls_per_setter": 0,
        },
        "note": "call analytics stores are disabled; all reads go to live upstream APIs",
    })))
}
