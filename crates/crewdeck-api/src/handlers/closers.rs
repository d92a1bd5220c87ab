//! Closer lifecycle endpoints.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};
use tracing::{info, warn};
use validator::Validate;

use crewdeck_core::{CrmUserId, Platform};
use crewdeck_provisioning::OnboardIdentity;

use crate::error::ApiError;
use crate::models::{
    CloserRow, OffboardRequest, OffboardResponse, OnboardRequest, OnboardResponse,
};
use crate::state::AppState;

/// GET /api/closers
///
/// CRM staff filtered to the employee domain, joined with their
/// assigned area-code numbers through the cached telephony inventory
/// and the CRM's number records.
pub async fn list_closers(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let users = state.crm.list_users().await?;
    info!(count = users.len(), "fetched CRM staff");

    let inventory = state
        .numbers
        .get_or_fetch(|| async { state.telephony.list_numbers().await })
        .await?;
    let area_numbers: Vec<_> = inventory
        .into_iter()
        .filter(|n| n.number.contains(&state.area_code))
        .collect();

    let statuses = state.crm.compare_numbers(&area_numbers).await?;
    let linked: Vec<_> = statuses.into_iter().filter(|s| s.in_crm).collect();

    let domain_suffix = format!("@{}", state.employee_domain.to_lowercase());
    let closers: Vec<CloserRow> = users
        .into_iter()
        .filter(|u| u.email.to_lowercase().ends_with(&domain_suffix))
        .map(|u| {
            let assigned = linked
                .iter()
                .find(|s| s.linked_user.as_ref().is_some_and(|l| l.as_str() == u.id));
            let name = u.display_name();
            CloserRow {
                first_name: u.first_name.clone().unwrap_or_else(|| {
                    name.split_whitespace().next().unwrap_or("Unknown").to_string()
                }),
                last_name: u.last_name.clone().unwrap_or_else(|| {
                    name.split_whitespace().skip(1).collect::<Vec<_>>().join(" ")
                }),
                name,
                email: if u.email.is_empty() { None } else { Some(u.email) },
                role: u.role,
                assigned_phone_number: assigned.map(|s| s.number.clone()),
                assigned_phone_sid: assigned.map(|s| s.sid.to_string()),
                id: u.id,
            }
        })
        .collect();

    Ok(Json(json!({
        "success": true,
        "count": closers.len(),
        "closers": closers,
    })))
}

/// GET /api/closers/licenses
///
/// License availability across the seat-licensed platforms. A platform
/// whose check fails is reported unavailable with its error, not a 500.
pub async fn licenses(State(state): State<AppState>) -> Json<Value> {
    let video = match state.video_licenses.license_info().await {
        Ok(info) => serde_json::to_value(info).unwrap_or_default(),
        Err(err) => {
            warn!(platform = %Platform::Video, error = %err, "license check failed");
            json!({
                "platform": Platform::Video,
                "error": err.to_string(),
                "has_available": false,
            })
        }
    };
    let scheduling = match state.scheduling_licenses.license_info().await {
        Ok(info) => serde_json::to_value(info).unwrap_or_default(),
        Err(err) => {
            warn!(platform = %Platform::Scheduling, error = %err, "license check failed");
            json!({
                "platform": Platform::Scheduling,
                "error": err.to_string(),
                "has_available": false,
            })
        }
    };

    let video_ok = video["has_available"].as_bool().unwrap_or(false);
    let scheduling_ok = scheduling["has_available"].as_bool().unwrap_or(false);
    let mut unavailable = Vec::new();
    if !video_ok {
        unavailable.push(Platform::Video);
    }
    if !scheduling_ok {
        unavailable.push(Platform::Scheduling);
    }

    Json(json!({
        "success": true,
        "can_onboard": video_ok && scheduling_ok,
        "licenses": {
            "video": video,
            "scheduling": scheduling,
        },
        "summary": {
            "all_available": video_ok && scheduling_ok,
            "unavailable_platforms": unavailable,
        },
    }))
}

/// POST /api/closers/onboard
pub async fn onboard(
    State(state): State<AppState>,
    Json(request): Json<OnboardRequest>,
) -> Result<Json<OnboardResponse>, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let report = state
        .onboarding
        .run(OnboardIdentity {
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
        })
        .await?;

    Ok(Json(OnboardResponse {
        success: true,
        message: "closer onboarding completed".to_string(),
        generated_email: report.work_email,
        progress: report.progress,
        summary: report.summary,
    }))
}

/// DELETE /api/closers/offboard/:id
pub async fn offboard(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<OffboardRequest>>,
) -> Result<Json<OffboardResponse>, ApiError> {
    let selection = body
        .and_then(|Json(b)| b.platforms)
        .unwrap_or_default();

    let report = state
        .offboarding
        .run(&CrmUserId::new(id), selection)
        .await?;

    Ok(Json(OffboardResponse {
        success: true,
        message: format!("closer {} offboarding completed", report.closer_name),
        closer_name: report.closer_name,
        closer_email: report.closer_email,
        progress: report.progress,
        summary: report.summary,
    }))
}

/// GET /api/closers/:id/platforms
///
/// Resolve the per-platform account identifiers for a CRM staff user.
/// A platform lookup failure degrades that platform to `null`.
pub async fn platforms(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = CrmUserId::new(id);
    let closer = state
        .crm
        .find_by_id(&id)
        .await?
        .filter(|c| !c.email.is_empty())
        .ok_or_else(|| ApiError::NotFound(format!("closer {id} not found or has no email")))?;
    let email = closer.email.clone();
    let name = closer.display_name();

    let mut platforms = json!({
        "directory": null,
        "scheduling": null,
        "video": null,
        "crm": {
            "user_id": closer.id,
            "email": email,
            "name": name,
        },
    });

    match state.directory.find_by_email(&email).await {
        Ok(Some(user)) => {
            platforms["directory"] = json!({
                "user_id": user.id,
                "email": user.email,
                "name": user.display_name(),
            });
        }
        Ok(None) => {}
        Err(err) => warn!(platform = %Platform::Directory, error = %err, "platform lookup failed"),
    }

    match state.scheduling.find_by_email(&email).await {
        Ok(Some(user)) => {
            platforms["scheduling"] = json!({
                "uri": user.id,
                "email": user.email,
                "role": user.role,
            });
        }
        Ok(None) => {}
        Err(err) => warn!(platform = %Platform::Scheduling, error = %err, "platform lookup failed"),
    }

    match state.video.find_by_email(&email).await {
        Ok(Some(user)) => {
            platforms["video"] = json!({
                "user_id": user.id,
                "email": user.email,
                "status": user.status,
            });
        }
        Ok(None) => {}
        Err(err) => warn!(platform = %Platform::Video, error = %err, "platform lookup failed"),
    }

    Ok(Json(json!({
        "success": true,
        "platforms": platforms,
    })))
}
