//! Managed platform enumeration and lifecycle stage statuses.

use serde::{Deserialize, Serialize};

/// One of the external platforms a staff account lives on.
///
/// The variants are ordered the way lifecycle operations visit them:
/// the directory account must exist before downstream invitations
/// reference its email, and the CRM comes last because removing it
/// severs future lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// The directory service issuing organizational email accounts.
    Directory,
    /// The external booking/calendar service.
    Scheduling,
    /// The video-conferencing account provider.
    Video,
    /// The phone-number provisioning and call-infrastructure provider.
    Telephony,
    /// The internal operations platform tracking staff and resources.
    Crm,
    /// The checkout/subscription-link provider. Not part of the account
    /// lifecycle; queried by the link reconciliation engine.
    Payments,
}

impl Platform {
    /// The lifecycle platforms, in the order orchestration visits them.
    pub const ALL: [Platform; 5] = [
        Platform::Directory,
        Platform::Scheduling,
        Platform::Video,
        Platform::Telephony,
        Platform::Crm,
    ];
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Directory => write!(f, "directory"),
            Platform::Scheduling => write!(f, "scheduling"),
            Platform::Video => write!(f, "video"),
            Platform::Telephony => write!(f, "telephony"),
            Platform::Crm => write!(f, "crm"),
            Platform::Payments => write!(f, "payments"),
        }
    }
}

/// Outcome of one platform stage within a lifecycle run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    /// Stage has not completed yet.
    Pending,
    /// Stage completed (including the already-exists fast path).
    Success,
    /// Stage failed; the failure never aborts sibling stages.
    Failed,
    /// Stage was deselected by the caller.
    Skipped,
}

impl std::fmt::Display for StageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageStatus::Pending => write!(f, "pending"),
            StageStatus::Success => write!(f, "success"),
            StageStatus::Failed => write!(f, "failed"),
            StageStatus::Skipped => write!(f, "skipped"),
        }
    }
}
