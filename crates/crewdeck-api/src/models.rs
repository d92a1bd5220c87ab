//! Request and response models for the HTTP surface.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crewdeck_provisioning::{LifecycleProgress, PlatformSelection, Summary};

/// POST /api/closers/onboard
#[derive(Debug, Deserialize, Validate)]
pub struct OnboardRequest {
    #[validate(length(min = 1, message = "first name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "last name is required"))]
    pub last_name: String,
    /// Explicit work email; derived from the name when absent.
    pub email: Option<String>,
    /// Accepted for forward compatibility; number assignment is driven
    /// by the telephony stage, not by the caller.
    pub phone_number: Option<String>,
}

/// Body of DELETE /api/closers/offboard/:id
#[derive(Debug, Default, Deserialize)]
pub struct OffboardRequest {
    pub platforms: Option<PlatformSelection>,
}

/// Envelope of a completed onboarding run.
#[derive(Debug, Serialize)]
pub struct OnboardResponse {
    pub success: bool,
    pub message: String,
    pub generated_email: String,
    pub progress: LifecycleProgress,
    pub summary: Summary,
}

/// Envelope of a completed offboarding run.
#[derive(Debug, Serialize)]
pub struct OffboardResponse {
    pub success: bool,
    pub message: String,
    pub closer_name: String,
    pub closer_email: String,
    pub progress: LifecycleProgress,
    pub summary: Summary,
}

/// A closer row in GET /api/closers.
#[derive(Debug, Serialize)]
pub struct CloserRow {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_phone_sid: Option<String>,
}

/// Generic `{success, data, source}` analytics envelope. `source`
/// distinguishes live aggregation from the degraded/empty fallback.
#[derive(Debug, Serialize)]
pub struct SourcedData<T> {
    pub success: bool,
    pub data: T,
    pub source: &'static str,
}

impl<T> SourcedData<T> {
    pub fn disabled(data: T) -> Self {
        Self {
            success: true,
            data,
            source: "disabled",
        }
    }
}
