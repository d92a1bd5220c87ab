//! Offboarding orchestrator.
//!
//! Three safety gates run before any destructive call: the identifier
//! must be plausible, the identity must exist in the CRM, and its email
//! must belong to the employee domain. The domain gate exists because
//! the CRM user listing also surfaces non-employee accounts; without it
//! a mistyped id could delete a customer-facing account.
//!
//! After gating, teardown visits the selected platforms in the fixed
//! order directory → scheduling → video → telephony → CRM. The CRM is
//! deliberately last: every other platform lookup depends on the
//! identity still being resolvable there. Telephony releases only the
//! numbers whose linked user equals the target, never by guess.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crewdeck_connector::error::ConnectorError;
use crewdeck_connector::traits::{CrmPlatform, NumberInventory, UserLifecycle};
use crewdeck_core::{CrmUserId, Platform};

use crate::cache::NumberCache;
use crate::progress::{LifecycleProgress, StageReport, Summary};

/// Minimum plausible length of a CRM user id.
const MIN_ID_LENGTH: usize = 10;

/// Per-platform selection for a teardown run. Defaults to everything.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlatformSelection {
    #[serde(default = "selected")]
    pub directory: bool,
    #[serde(default = "selected")]
    pub scheduling: bool,
    #[serde(default = "selected")]
    pub video: bool,
    #[serde(default = "selected")]
    pub telephony: bool,
    #[serde(default = "selected")]
    pub crm: bool,
}

fn selected() -> bool {
    true
}

impl Default for PlatformSelection {
    fn default() -> Self {
        Self {
            directory: true,
            scheduling: true,
            video: true,
            telephony: true,
            crm: true,
        }
    }
}

/// Gate failures and pre-flight errors that abort the run before any
/// destructive call.
#[derive(Debug, Error)]
pub enum OffboardError {
    /// The identifier is syntactically implausible.
    #[error("invalid user id: {0}")]
    InvalidIdentifier(String),

    /// No CRM staff user carries the identifier.
    #[error("staff user not found: {0}")]
    NotFound(String),

    /// The target's email is outside the employee domain.
    #[error("safety check failed: {0}")]
    DomainMismatch(String),

    /// The gate lookup itself failed upstream.
    #[error(transparent)]
    Connector(#[from] ConnectorError),
}

/// Final result of an offboarding run.
#[derive(Debug, Clone, Serialize)]
pub struct OffboardingReport {
    pub closer_name: String,
    pub closer_email: String,
    pub progress: LifecycleProgress,
    pub summary: Summary,
}

/// Drives the ordered multi-platform account-teardown sequence.
pub struct OffboardingEngine {
    directory: Arc<dyn UserLifecycle>,
    scheduling: Arc<dyn UserLifecycle>,
    video: Arc<dyn UserLifecycle>,
    telephony: Arc<dyn NumberInventory>,
    crm: Arc<dyn CrmPlatform>,
    numbers: Arc<NumberCache>,
    employee_domain: String,
    area_code: String,
}

impl OffboardingEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        directory: Arc<dyn UserLifecycle>,
        scheduling: Arc<dyn UserLifecycle>,
        video: Arc<dyn UserLifecycle>,
        telephony: Arc<dyn NumberInventory>,
        crm: Arc<dyn CrmPlatform>,
        numbers: Arc<NumberCache>,
        employee_domain: impl Into<String>,
        area_code: impl Into<String>,
    ) -> Self {
        Self {
            directory,
            scheduling,
            video,
            telephony,
            crm,
            numbers,
            employee_domain: employee_domain.into(),
            area_code: area_code.into(),
        }
    }

    /// Run the gated teardown sequence for a CRM user id.
    pub async fn run(
        &self,
        id: &CrmUserId,
        selection: PlatformSelection,
    ) -> Result<OffboardingReport, OffboardError> {
        // Gate 1: the identifier must look like a real CRM id.
        if id.as_str().trim().len() < MIN_ID_LENGTH {
            return Err(OffboardError::InvalidIdentifier(id.to_string()));
        }

        // Gate 2: the identity must exist in the CRM.
        let target = self
            .crm
            .find_by_id(id)
            .await?
            .ok_or_else(|| OffboardError::NotFound(id.to_string()))?;

        // Gate 3: only employee-domain accounts may be torn down.
        let email = target.email.clone();
        let domain_suffix = format!("@{}", self.employee_domain.to_lowercase());
        if email.is_empty() || !email.to_lowercase().ends_with(&domain_suffix) {
            return Err(OffboardError::DomainMismatch(format!(
                "user {id} does not have an @{} email",
                self.employee_domain
            )));
        }

        let name = target.display_name();
        info!(id = %id, email = %email, name = %name, "starting offboarding");

        let mut progress = LifecycleProgress {
            directory: StageReport::skipped(),
            scheduling: StageReport::skipped(),
            video: StageReport::skipped(),
            telephony: StageReport::skipped(),
            crm: StageReport::skipped(),
        };

        if selection.directory {
            progress.directory = self.delete_stage(self.directory.as_ref(), &email).await;
        }
        if selection.scheduling {
            progress.scheduling = self.delete_stage(self.scheduling.as_ref(), &email).await;
        }
        if selection.video {
            progress.video = self.delete_stage(self.video.as_ref(), &email).await;
        }
        if selection.telephony {
            progress.telephony = self.release_numbers_stage(id).await;
        }
        if selection.crm {
            progress.crm = self.delete_stage(self.crm.as_ref(), id.as_str()).await;
        }

        let summary = progress.summarize();
        info!(
            id = %id,
            successful = summary.successful,
            failed = summary.failed,
            skipped = summary.skipped,
            "offboarding complete"
        );

        Ok(OffboardingReport {
            closer_name: name,
            closer_email: email,
            progress,
            summary,
        })
    }

    /// Delete one platform's account, catching the error into the report.
    async fn delete_stage(&self, adapter: &dyn UserLifecycle, identifier: &str) -> StageReport {
        let platform = adapter.platform();
        match adapter.delete_user(identifier).await {
            Ok(()) => {
                info!(platform = %platform, identifier, "account removed");
                StageReport::success(json!({ "removed": identifier }))
            }
            Err(err) => {
                warn!(platform = %platform, error = %err, "offboarding stage failed");
                StageReport::failed(err.to_string())
            }
        }
    }

    /// Release the target's numbers: enumerate the live inventory and
    /// release only entries linked to this identity, one at a time.
    async fn release_numbers_stage(&self, id: &CrmUserId) -> StageReport {
        let owned = match self.telephony.list_numbers().await {
            Ok(numbers) => numbers,
            Err(err) => {
                warn!(platform = %Platform::Telephony, error = %err, "offboarding stage failed");
                return StageReport::failed(err.to_string());
            }
        };

        let matching: Vec<_> = owned
            .into_iter()
            .filter(|n| {
                n.number.contains(&self.area_code) && n.linked_user.as_ref() == Some(id)
            })
            .collect();

        if matching.is_empty() {
            info!(id = %id, "no numbers to release");
            return StageReport::success(json!({
                "released": [],
                "released_count": 0,
            }))
            .with_note("no numbers to release");
        }

        let mut released = Vec::new();
        let mut failures = Vec::new();
        for number in &matching {
            match self.telephony.release(&number.sid).await {
                Ok(()) => {
                    info!(number = %number.number, "number released");
                    released.push(number.number.clone());
                }
                Err(err) => {
                    warn!(number = %number.number, error = %err, "number release failed");
                    failures.push(format!("{}: {err}", number.number));
                }
            }
        }

        if !released.is_empty() {
            self.numbers.invalidate().await;
        }

        if failures.is_empty() {
            StageReport::success(json!({
                "released": released,
                "released_count": released.len(),
            }))
        } else {
            let mut report = StageReport::failed(format!(
                "failed to release {} of {} numbers: {}",
                failures.len(),
                matching.len(),
                failures.join("; ")
            ));
            report.data = Some(json!({
                "released": released,
                "released_count": released.len(),
            }));
            report
        }
    }
}
