//! Capability-based trait definitions for platform adapters.
//!
//! Each external platform implements the subset of capabilities it
//! supports. The orchestrators hold adapters as trait objects, so a test
//! double implementing the same traits is a drop-in replacement.

use async_trait::async_trait;

use crewdeck_core::{CrmUserId, NumberSid, Platform};

use crate::error::ConnectorResult;
use crate::types::{
    AvailableNumber, LicenseInfo, NewUser, NumberCrmStatus, NumberUpdate, PhoneNumber, PlanPage,
    PlatformUser, Product,
};

/// Base trait for all platform adapters.
pub trait PlatformConnector: Send + Sync {
    /// Which platform this adapter fronts.
    fn platform(&self) -> Platform;

    /// Display name for this adapter instance.
    fn display_name(&self) -> &str;
}

/// Capability: look an account up by email.
///
/// An absent account is `Ok(None)`: upstream 404-equivalents are
/// normalized here, distinct from transport/auth failures which
/// propagate as errors.
#[async_trait]
pub trait LookupOp: PlatformConnector {
    async fn find_by_email(&self, email: &str) -> ConnectorResult<Option<PlatformUser>>;
}

/// Capability: create an account.
#[async_trait]
pub trait CreateOp: PlatformConnector {
    async fn create_user(&self, user: &NewUser) -> ConnectorResult<PlatformUser>;
}

/// Capability: delete an account.
///
/// Deletion is idempotent: deleting a non-existent account returns
/// success, since offboarding may be retried or may target an account
/// already removed.
#[async_trait]
pub trait DeleteOp: PlatformConnector {
    async fn delete_user(&self, identifier: &str) -> ConnectorResult<()>;
}

/// Capability: list all accounts.
#[async_trait]
pub trait ListOp: PlatformConnector {
    async fn list_users(&self) -> ConnectorResult<Vec<PlatformUser>>;
}

/// Marker trait for platforms supporting the full account lifecycle.
pub trait UserLifecycle: LookupOp + CreateOp + DeleteOp + ListOp {}

// Blanket implementation for any adapter with all four capabilities
impl<T> UserLifecycle for T where T: LookupOp + CreateOp + DeleteOp + ListOp {}

/// Capability: derive organizational email addresses (directory only).
#[async_trait]
pub trait EmailProvisioning: PlatformConnector {
    /// The base (pre-collision) work-email candidate for a name.
    ///
    /// Pure derivation, no upstream call. The orchestrator checks this
    /// candidate first: if an account already holds it, a partially
    /// completed run is being resumed and the address is reused.
    fn base_email(&self, first_name: &str, last_name: &str) -> String;

    /// Generate a free work email for the given name.
    ///
    /// The candidate sequence is deterministic: the base candidate
    /// first, then disambiguated variants with a running counter.
    /// Repeated calls against the same upstream state return the same
    /// address.
    async fn generate_email(&self, first_name: &str, last_name: &str) -> ConnectorResult<String>;
}

/// Marker for the directory platform: full lifecycle plus email derivation.
pub trait EmailDirectory: UserLifecycle + EmailProvisioning {}

impl<T> EmailDirectory for T where T: UserLifecycle + EmailProvisioning {}

/// Capability: report seat-license availability.
#[async_trait]
pub trait LicenseInfoOp: PlatformConnector {
    async fn license_info(&self) -> ConnectorResult<LicenseInfo>;
}

/// Capability: phone-number inventory management (telephony only).
///
/// Purchase, messaging-service registration and campaign registration
/// form a fixed sequence: each upstream step depends on the previous
/// one having succeeded.
#[async_trait]
pub trait NumberInventory: PlatformConnector {
    /// Search purchasable numbers matching an area-code prefix.
    async fn search_available(
        &self,
        area_code: &str,
        count: usize,
    ) -> ConnectorResult<Vec<AvailableNumber>>;

    /// Purchase a number, labelling it with a friendly name.
    async fn purchase(&self, number: &str, friendly_name: &str) -> ConnectorResult<PhoneNumber>;

    /// Register a purchased number with the messaging service.
    /// Idempotent: an already-registered number is success.
    async fn add_to_messaging_service(&self, sid: &NumberSid) -> ConnectorResult<()>;

    /// Register a purchased number with the regulatory bulk-messaging
    /// campaign. Idempotent like messaging-service registration.
    async fn add_to_campaign(&self, sid: &NumberSid) -> ConnectorResult<()>;

    /// Release an owned number back to the provider.
    /// Idempotent: releasing an unknown SID is success.
    async fn release(&self, sid: &NumberSid) -> ConnectorResult<()>;

    /// Update mutable fields of an owned number.
    async fn update_number(
        &self,
        sid: &NumberSid,
        update: &NumberUpdate,
    ) -> ConnectorResult<PhoneNumber>;

    /// List the full owned inventory, following pagination to the end.
    async fn list_numbers(&self) -> ConnectorResult<Vec<PhoneNumber>>;
}

/// Capability: CRM staff/number cross-referencing.
#[async_trait]
pub trait StaffQueryOp: PlatformConnector {
    /// For each telephony number, report whether the CRM knows it and
    /// which staff user it is linked to, joining on the number string.
    async fn compare_numbers(
        &self,
        numbers: &[PhoneNumber],
    ) -> ConnectorResult<Vec<NumberCrmStatus>>;

    /// Find a staff user by CRM id.
    async fn find_by_id(&self, id: &CrmUserId) -> ConnectorResult<Option<PlatformUser>>;
}

/// Marker for the CRM platform: full lifecycle plus staff queries.
pub trait CrmPlatform: UserLifecycle + StaffQueryOp {}

impl<T> CrmPlatform for T where T: UserLifecycle + StaffQueryOp {}

/// Capability: payments platform product/plan access.
#[async_trait]
pub trait PaymentsOp: Send + Sync {
    /// List the company's products.
    async fn list_products(&self) -> ConnectorResult<Vec<Product>>;

    /// Fetch one page of a product's plan listing.
    async fn plans_page(
        &self,
        product_id: &str,
        after: Option<&str>,
    ) -> ConnectorResult<PlanPage>;

    /// Delete a single plan.
    async fn delete_plan(&self, plan_id: &crewdeck_core::PlanId) -> ConnectorResult<()>;
}
