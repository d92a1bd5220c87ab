//! Onboarding orchestrator.
//!
//! Five sequential stages in fixed order: directory → scheduling →
//! video → telephony → CRM. The directory account comes first because
//! downstream invitations reference its email; the CRM comes last
//! because it tolerates independent retry and is the stage most often
//! completed manually.
//!
//! Every stage looks up before it creates, so re-invoking a partially
//! completed run never issues a second creation call for a stage that
//! already succeeded. Stage errors become data in the progress report
//! and never abort the stages after them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crewdeck_connector::error::{ConnectorError, ConnectorResult};
use crewdeck_connector::traits::{EmailDirectory, NumberInventory, UserLifecycle};
use crewdeck_connector::types::{NewUser, NumberUpdate, PhoneNumber};
use crewdeck_core::Platform;

use crate::cache::NumberCache;
use crate::progress::{LifecycleProgress, StageReport, Summary};

/// How many purchasable candidates to request from the inventory search.
const SEARCH_COUNT: usize = 5;

/// The identity being onboarded.
#[derive(Debug, Clone, Deserialize)]
pub struct OnboardIdentity {
    pub first_name: String,
    pub last_name: String,
    /// Explicit work email; derived from the name when absent.
    pub email: Option<String>,
}

impl OnboardIdentity {
    fn friendly_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

/// Final result of an onboarding run.
#[derive(Debug, Clone, Serialize)]
pub struct OnboardingReport {
    pub work_email: String,
    pub progress: LifecycleProgress,
    pub summary: Summary,
}

/// Errors that abort an onboarding run before any stage executes.
#[derive(Debug, Error)]
pub enum OnboardError {
    /// The work email could not be derived, so no stage can run.
    #[error("failed to derive work email: {0}")]
    EmailDerivation(#[source] ConnectorError),
}

/// Drives the ordered multi-platform account-creation sequence.
pub struct OnboardingEngine {
    directory: Arc<dyn EmailDirectory>,
    scheduling: Arc<dyn UserLifecycle>,
    video: Arc<dyn UserLifecycle>,
    telephony: Arc<dyn NumberInventory>,
    crm: Arc<dyn UserLifecycle>,
    numbers: Arc<NumberCache>,
    area_code: String,
}

impl OnboardingEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        directory: Arc<dyn EmailDirectory>,
        scheduling: Arc<dyn UserLifecycle>,
        video: Arc<dyn UserLifecycle>,
        telephony: Arc<dyn NumberInventory>,
        crm: Arc<dyn UserLifecycle>,
        numbers: Arc<NumberCache>,
        area_code: impl Into<String>,
    ) -> Self {
        Self {
            directory,
            scheduling,
            video,
            telephony,
            crm,
            numbers,
            area_code: area_code.into(),
        }
    }

    /// Run the full onboarding sequence for an identity.
    pub async fn run(&self, identity: OnboardIdentity) -> Result<OnboardingReport, OnboardError> {
        let work_email = self.resolve_work_email(&identity).await?;

        info!(
            first_name = %identity.first_name,
            last_name = %identity.last_name,
            work_email = %work_email,
            "starting onboarding"
        );

        let mut progress = LifecycleProgress::default();

        progress.directory = self
            .account_stage(self.directory.as_ref(), &identity, &work_email, None, None)
            .await;
        progress.scheduling = self
            .account_stage(self.scheduling.as_ref(), &identity, &work_email, None, None)
            .await;
        progress.video = self
            .account_stage(
                self.video.as_ref(),
                &identity,
                &work_email,
                None,
                Some("may require manual license assignment"),
            )
            .await;
        progress.telephony = self.telephony_stage(&identity).await;
        progress.crm = self
            .account_stage(
                self.crm.as_ref(),
                &identity,
                &work_email,
                Some("user"),
                Some("phone number must be manually assigned in the CRM"),
            )
            .await;

        let summary = progress.summarize();
        info!(
            work_email = %work_email,
            successful = summary.successful,
            failed = summary.failed,
            "onboarding complete"
        );

        Ok(OnboardingReport {
            work_email,
            progress,
            summary,
        })
    }

    /// Resolve the work email for a run.
    ///
    /// An explicit email wins. Otherwise the base candidate is checked
    /// first: an account already holding it means a partially completed
    /// run is being resumed, and reusing the address is what lets every
    /// later stage take its already-exists path. Only a free base
    /// candidate goes through collision-aware generation.
    async fn resolve_work_email(&self, identity: &OnboardIdentity) -> Result<String, OnboardError> {
        if let Some(email) = identity.email.as_deref().map(str::trim) {
            if !email.is_empty() {
                return Ok(email.to_string());
            }
        }

        let expected = self
            .directory
            .base_email(&identity.first_name, &identity.last_name);
        match self.directory.find_by_email(&expected).await {
            Ok(Some(_)) => {
                info!(email = %expected, "directory account exists for base candidate, resuming");
                Ok(expected)
            }
            Ok(None) => self
                .directory
                .generate_email(&identity.first_name, &identity.last_name)
                .await
                .map_err(OnboardError::EmailDerivation),
            Err(err) => Err(OnboardError::EmailDerivation(err)),
        }
    }

    /// Lookup-before-create stage shared by the account-bearing platforms.
    async fn account_stage(
        &self,
        adapter: &dyn UserLifecycle,
        identity: &OnboardIdentity,
        email: &str,
        role: Option<&str>,
        note: Option<&str>,
    ) -> StageReport {
        let platform = adapter.platform();
        let report = match self.find_or_create(adapter, identity, email, role).await {
            Ok(data) => StageReport::success(data),
            Err(err) => {
                warn!(platform = %platform, error = %err, "onboarding stage failed");
                StageReport::failed(err.to_string())
            }
        };
        match note {
            Some(note) => report.with_note(note),
            None => report,
        }
    }

    async fn find_or_create(
        &self,
        adapter: &dyn UserLifecycle,
        identity: &OnboardIdentity,
        email: &str,
        role: Option<&str>,
    ) -> ConnectorResult<serde_json::Value> {
        let platform = adapter.platform();

        if let Some(existing) = adapter.find_by_email(email).await? {
            info!(platform = %platform, email, "account already exists, skipping creation");
            return Ok(json!({
                "id": existing.id,
                "email": existing.email,
                "already_exists": true,
            }));
        }

        let mut request = NewUser::new(&identity.first_name, &identity.last_name, email);
        if let Some(role) = role {
            request = request.with_role(role);
        }

        let created = adapter.create_user(&request).await?;
        info!(platform = %platform, email, "account created");
        Ok(json!({
            "id": created.id,
            "email": created.email,
            "already_exists": false,
        }))
    }

    /// The telephony stage: search, reuse-or-purchase, register.
    async fn telephony_stage(&self, identity: &OnboardIdentity) -> StageReport {
        let friendly_name = identity.friendly_name();
        match self.provision_number(&friendly_name).await {
            Ok(outcome) => {
                info!(number = %outcome.number, "telephony number provisioned");
                StageReport::success(json!({
                    "phone_number": outcome.number,
                    "sid": outcome.sid,
                    "friendly_name": friendly_name,
                    "already_exists": outcome.already_exists,
                    "added_to_campaign": outcome.added_to_campaign,
                }))
            }
            Err(err) => {
                warn!(platform = %Platform::Telephony, error = %err, "onboarding stage failed");
                StageReport::failed(err.to_string())
            }
        }
    }

    async fn provision_number(&self, friendly_name: &str) -> ConnectorResult<NumberOutcome> {
        let available = self
            .telephony
            .search_available(&self.area_code, SEARCH_COUNT)
            .await?;
        let Some(candidate) = available.first() else {
            return Err(ConnectorError::resource_exhausted(format!(
                "no available {} numbers found",
                self.area_code
            )));
        };

        // A retried run may already own a number for this identity:
        // match the intended friendly name (or the exact candidate)
        // against the inventory snapshot before purchasing anything.
        let inventory = self
            .numbers
            .get_or_fetch(|| async { self.telephony.list_numbers().await })
            .await?;
        let existing = inventory
            .iter()
            .find(|n| n.friendly_name == friendly_name || n.number == candidate.number);

        if let Some(existing) = existing {
            return self.adopt_existing(existing, friendly_name).await;
        }

        match self.telephony.purchase(&candidate.number, friendly_name).await {
            Ok(purchased) => {
                self.telephony.add_to_messaging_service(&purchased.sid).await?;
                self.telephony.add_to_campaign(&purchased.sid).await?;
                self.numbers.invalidate().await;
                Ok(NumberOutcome {
                    number: purchased.number,
                    sid: Some(purchased.sid.to_string()),
                    already_exists: false,
                    added_to_campaign: true,
                })
            }
            Err(err) if err.is_conflict() => self.resolve_purchase_conflict(friendly_name).await,
            Err(err) => Err(err),
        }
    }

    /// Reuse a number the inventory already holds for this identity.
    async fn adopt_existing(
        &self,
        existing: &PhoneNumber,
        friendly_name: &str,
    ) -> ConnectorResult<NumberOutcome> {
        info!(number = %existing.number, "number already purchased, reusing");

        if existing.friendly_name != friendly_name {
            self.telephony
                .update_number(
                    &existing.sid,
                    &NumberUpdate {
                        friendly_name: Some(friendly_name.to_string()),
                    },
                )
                .await?;
            self.numbers.invalidate().await;
        }
        self.telephony.add_to_messaging_service(&existing.sid).await?;

        Ok(NumberOutcome {
            number: existing.number.clone(),
            sid: Some(existing.sid.to_string()),
            already_exists: true,
            added_to_campaign: true,
        })
    }

    /// Fallback after a purchase conflict: the number may have been
    /// claimed by a concurrent or earlier run. Match by friendly name
    /// first, then by area-code substring among owned numbers.
    ///
    /// The substring match can misattribute another identity's number
    /// when two onboardings race; the alternative (failing outright)
    /// loses the common single-writer retry case, so the looser match
    /// is kept and the outcome is reviewable in the report.
    async fn resolve_purchase_conflict(
        &self,
        friendly_name: &str,
    ) -> ConnectorResult<NumberOutcome> {
        warn!(friendly_name, "purchase conflict, checking owned numbers");

        let owned = self.telephony.list_numbers().await?;
        let matched = owned
            .iter()
            .find(|n| n.friendly_name == friendly_name)
            .or_else(|| owned.iter().find(|n| n.number.contains(&self.area_code)));

        match matched {
            Some(number) => Ok(NumberOutcome {
                number: number.number.clone(),
                sid: Some(number.sid.to_string()),
                already_exists: true,
                added_to_campaign: false,
            }),
            None => Err(ConnectorError::conflict(
                "number purchase conflicted and no owned number matches; requires manual admin action",
            )),
        }
    }
}

struct NumberOutcome {
    number: String,
    sid: Option<String>,
    already_exists: bool,
    added_to_campaign: bool,
}
