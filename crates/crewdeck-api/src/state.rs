//! Shared application state for the API routers.

use std::sync::Arc;
use std::time::Duration;

use crewdeck_connector::traits::{
    CrmPlatform, EmailDirectory, LicenseInfoOp, NumberInventory, UserLifecycle,
};
use crewdeck_links::LinkService;
use crewdeck_provisioning::{NumberCache, OffboardingEngine, OnboardingEngine};

/// Everything the handlers need, behind trait objects so tests can
/// substitute in-memory adapters.
#[derive(Clone)]
pub struct AppState {
    pub onboarding: Arc<OnboardingEngine>,
    pub offboarding: Arc<OffboardingEngine>,
    pub links: Arc<LinkService>,

    pub directory: Arc<dyn EmailDirectory>,
    pub scheduling: Arc<dyn UserLifecycle>,
    pub video: Arc<dyn UserLifecycle>,
    pub telephony: Arc<dyn NumberInventory>,
    pub crm: Arc<dyn CrmPlatform>,

    /// License reporters for the seat-licensed platforms.
    pub video_licenses: Arc<dyn LicenseInfoOp>,
    pub scheduling_licenses: Arc<dyn LicenseInfoOp>,

    /// Shared snapshot of the telephony inventory.
    pub numbers: Arc<NumberCache>,

    pub employee_domain: String,
    pub area_code: String,
    /// Budget for the per-closer link lookup.
    pub closer_links_timeout: Duration,
}
