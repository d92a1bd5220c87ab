//! Wire-facing record types shared by all adapters.
//!
//! These are the uniform shapes adapters translate upstream payloads
//! into. Nothing here is persisted; every value is a snapshot of live
//! upstream state.

use serde::{Deserialize, Serialize};

use crewdeck_core::{CrmUserId, NumberSid, PlanId};

/// The uniform account record returned by every user-bearing platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformUser {
    /// Platform-issued identifier (user id, membership URI, …).
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Full display name where the platform provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Platform-specific status string (e.g. "active", "pending").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl PlatformUser {
    /// Minimal record with just an id and email.
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            first_name: None,
            last_name: None,
            name: None,
            status: None,
            role: None,
        }
    }

    /// Best-effort display name: explicit name, else "first last".
    #[must_use]
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        let first = self.first_name.as_deref().unwrap_or("");
        let last = self.last_name.as_deref().unwrap_or("");
        format!("{first} {last}").trim().to_string()
    }
}

/// Request payload for account creation on any platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Initial password, where the platform takes one. `None` lets the
    /// adapter generate a random one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Platform role or license type (e.g. "user", licensed seat).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl NewUser {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            password: None,
            role: None,
        }
    }

    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// A phone number owned in the telephony platform's inventory.
///
/// The provider is authoritative; cached copies are TTL-bound snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumber {
    pub sid: NumberSid,
    /// E.164 number string.
    pub number: String,
    pub friendly_name: String,
    /// CRM user id the number is assigned to, when linked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_user: Option<CrmUserId>,
}

/// A purchasable number returned by an inventory search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableNumber {
    pub number: String,
}

/// Mutable fields of an owned phone number.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NumberUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
}

/// For one telephony number, whether the CRM knows it and who it is
/// linked to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumberCrmStatus {
    pub number: String,
    pub sid: NumberSid,
    pub in_crm: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_user: Option<CrmUserId>,
}

/// License availability for a seat-licensed platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseInfo {
    pub platform: crewdeck_core::Platform,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<u32>,
    pub has_available: bool,
}

/// A product in the payments platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub title: String,
}

/// A payment plan (checkout link) record as listed upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    /// Free-text annotation field the link classifier parses.
    #[serde(default)]
    pub internal_notes: Option<String>,
    #[serde(default)]
    pub initial_price: Option<f64>,
    #[serde(default)]
    pub member_count: u32,
    #[serde(default)]
    pub purchase_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// One page of a cursor-paged plan listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanPage {
    pub plans: Vec<Plan>,
    pub has_next_page: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_cursor: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_fallback() {
        let mut user = PlatformUser::new("u1", "a@b.c");
        assert_eq!(user.display_name(), "");

        user.first_name = Some("Ann".to_string());
        user.last_name = Some("Lee".to_string());
        assert_eq!(user.display_name(), "Ann Lee");

        user.name = Some("Ann L.".to_string());
        assert_eq!(user.display_name(), "Ann L.");
    }

    #[test]
    fn test_new_user_builder() {
        let req = NewUser::new("Ann", "Lee", "ann-l@example.com").with_role("user");
        assert_eq!(req.role.as_deref(), Some("user"));
        assert!(req.password.is_none());
    }
}
