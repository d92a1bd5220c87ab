//! # Platform Adapters
//!
//! Concrete adapters for the six external platforms, each implementing
//! the capability traits from `crewdeck-connector` over the platform's
//! REST API:
//!
//! - [`directory`]: organizational email accounts (service-account JWT
//!   with domain-wide admin impersonation)
//! - [`scheduling`]: booking/calendar memberships (long-lived API key)
//! - [`video`]: video-conferencing accounts (OAuth client-credentials
//!   with a cached, self-expiring bearer token)
//! - [`telephony`]: phone-number inventory (HTTP basic auth)
//! - [`crm`]: internal staff/resource tracking (API key)
//! - [`payments`]: checkout-link listing and deletion (API key)
//!
//! Base URLs are injected through each adapter's config, so integration
//! tests point the adapters at a mock HTTP server.

pub mod crm;
pub mod directory;
pub mod payments;
pub mod scheduling;
pub mod telephony;
pub mod video;

pub use crm::{CrmConfig, CrmConnector};
pub use directory::{DirectoryConfig, DirectoryConnector};
pub use payments::{PaymentsConfig, PaymentsConnector};
pub use scheduling::{SchedulingConfig, SchedulingConnector};
pub use telephony::{TelephonyConfig, TelephonyConnector};
pub use video::{VideoConfig, VideoConnector};
