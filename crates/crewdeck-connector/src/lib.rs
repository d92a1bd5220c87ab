//! # Platform Connector Framework
//!
//! The uniform contract the lifecycle orchestrators program against.
//!
//! Every external platform is wrapped by an adapter implementing the
//! capability traits in [`traits`]: lookup-by-email, create, delete and
//! list, plus platform-specific extensions (number inventory, staff
//! queries, license availability, email generation). Adapters normalize
//! upstream "not found" responses into non-error results and surface
//! everything else through the [`error::ConnectorError`] taxonomy.
//!
//! The framework deliberately holds no local state of record: the
//! platforms themselves are authoritative, and every adapter call goes
//! to the live upstream API.

pub mod auth;
pub mod error;
pub mod http;
pub mod traits;
pub mod types;

pub use error::{ConnectorError, ConnectorResult};
pub use traits::{
    CreateOp, CrmPlatform, DeleteOp, EmailDirectory, EmailProvisioning, LicenseInfoOp, ListOp,
    LookupOp, NumberInventory, PaymentsOp, PlatformConnector, StaffQueryOp, UserLifecycle,
};
pub use types::{
    AvailableNumber, LicenseInfo, NewUser, NumberCrmStatus, NumberUpdate, PhoneNumber, Plan,
    PlanPage, PlatformUser, Product,
};
