//! Scheduling adapter: booking/calendar organization memberships.
//!
//! The platform has no direct lookup-by-email: membership is resolved by
//! listing the organization's members and matching case-insensitively.
//! "Creating" a user is sending an organization invitation; "deleting"
//! removes the membership, which releases the seat.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crewdeck_connector::error::{ConnectorError, ConnectorResult};
use crewdeck_connector::http::{build_client, error_for_response};
use crewdeck_connector::traits::{
    CreateOp, DeleteOp, LicenseInfoOp, ListOp, LookupOp, PlatformConnector,
};
use crewdeck_connector::types::{LicenseInfo, NewUser, PlatformUser};
use crewdeck_core::Platform;

/// Scheduling adapter configuration.
#[derive(Clone)]
pub struct SchedulingConfig {
    pub base_url: String,
    pub api_key: String,
    /// Optional seat ceiling for license reporting; `None` means the
    /// plan has no hard cap the adapter can see.
    pub seat_limit: Option<u32>,
}

impl std::fmt::Debug for SchedulingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulingConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[redacted]")
            .field("seat_limit", &self.seat_limit)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct ResourceEnvelope<T> {
    resource: T,
}

#[derive(Debug, Deserialize)]
struct CollectionEnvelope<T> {
    collection: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct CurrentUser {
    current_organization: String,
}

#[derive(Debug, Deserialize)]
struct Membership {
    /// Membership URI: the identifier removed on offboarding.
    uri: String,
    #[serde(default)]
    role: Option<String>,
    user: MemberUser,
}

#[derive(Debug, Deserialize)]
struct MemberUser {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Invitation {
    uri: String,
}

/// Scheduling platform adapter.
pub struct SchedulingConnector {
    config: SchedulingConfig,
    client: Client,
}

impl SchedulingConnector {
    pub fn new(config: SchedulingConfig) -> ConnectorResult<Self> {
        if config.api_key.is_empty() {
            return Err(ConnectorError::invalid_configuration(
                "scheduling API key is not configured",
            ));
        }
        Ok(Self {
            config,
            client: build_client()?,
        })
    }

    async fn current_organization(&self) -> ConnectorResult<String> {
        let response = self
            .client
            .get(format!("{}/users/me", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_response(Platform::Scheduling, status, &body));
        }

        let me: ResourceEnvelope<CurrentUser> = response.json().await?;
        Ok(me.resource.current_organization)
    }

    async fn memberships(&self) -> ConnectorResult<Vec<Membership>> {
        let organization = self.current_organization().await?;
        let response = self
            .client
            .get(format!(
                "{}/organization_memberships",
                self.config.base_url
            ))
            .query(&[("organization", organization.as_str()), ("count", "100")])
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_response(Platform::Scheduling, status, &body));
        }

        let list: CollectionEnvelope<Membership> = response.json().await?;
        Ok(list.collection)
    }

    fn membership_to_user(member: Membership) -> PlatformUser {
        let mut user = PlatformUser::new(
            member.uri,
            member.user.email.unwrap_or_default(),
        );
        user.name = member.user.name;
        user.role = member.role;
        user
    }

    /// Strip the API host from an absolute resource URI so it can be
    /// re-requested against the configured base URL.
    fn resource_path(&self, uri: &str) -> String {
        uri.strip_prefix(&self.config.base_url)
            .map(str::to_string)
            .unwrap_or_else(|| uri.to_string())
    }
}

impl PlatformConnector for SchedulingConnector {
    fn platform(&self) -> Platform {
        Platform::Scheduling
    }

    fn display_name(&self) -> &str {
        "scheduling"
    }
}

#[async_trait]
impl LookupOp for SchedulingConnector {
    async fn find_by_email(&self, email: &str) -> ConnectorResult<Option<PlatformUser>> {
        let members = self.memberships().await?;
        let member = members.into_iter().find(|m| {
            m.user
                .email
                .as_deref()
                .is_some_and(|e| e.eq_ignore_ascii_case(email))
        });
        match member {
            Some(m) => Ok(Some(Self::membership_to_user(m))),
            None => {
                debug!(email, "no scheduling membership for email");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl CreateOp for SchedulingConnector {
    async fn create_user(&self, user: &NewUser) -> ConnectorResult<PlatformUser> {
        let organization = self.current_organization().await?;
        let response = self
            .client
            .post(format!(
                "{}/organization_invitations",
                self.config.base_url
            ))
            .bearer_auth(&self.config.api_key)
            .json(&json!({
                "email": user.email,
                "organization": organization,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_response(Platform::Scheduling, status, &body));
        }

        let invitation: ResourceEnvelope<Invitation> = response.json().await?;
        info!(email = %user.email, "scheduling invitation sent");

        let mut invited = PlatformUser::new(invitation.resource.uri, user.email.clone());
        invited.status = Some("invited".to_string());
        Ok(invited)
    }
}

#[async_trait]
impl DeleteOp for SchedulingConnector {
    async fn delete_user(&self, identifier: &str) -> ConnectorResult<()> {
        // Offboarding passes an email; resolve it to the membership URI.
        let members = self.memberships().await?;
        let member = members.into_iter().find(|m| {
            m.user
                .email
                .as_deref()
                .is_some_and(|e| e.eq_ignore_ascii_case(identifier))
                || m.uri == identifier
        });

        let Some(member) = member else {
            debug!(identifier, "scheduling membership already absent");
            return Ok(());
        };

        let path = self.resource_path(&member.uri);
        let response = self
            .client
            .delete(format!("{}{path}", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_response(Platform::Scheduling, status, &body));
        }
        info!(identifier, "scheduling membership removed, seat released");
        Ok(())
    }
}

#[async_trait]
impl ListOp for SchedulingConnector {
    async fn list_users(&self) -> ConnectorResult<Vec<PlatformUser>> {
        let members = self.memberships().await?;
        Ok(members.into_iter().map(Self::membership_to_user).collect())
    }
}

#[async_trait]
impl LicenseInfoOp for SchedulingConnector {
    async fn license_info(&self) -> ConnectorResult<LicenseInfo> {
        let used = self.memberships().await?.len() as u32;
        let (available, has_available) = match self.config.seat_limit {
            Some(limit) => {
                let available = limit.saturating_sub(used);
                (Some(available), available > 0)
            }
            // No visible cap: assume a seat can be added.
            None => (None, true),
        };
        Ok(LicenseInfo {
            platform: Platform::Scheduling,
            total: self.config.seat_limit,
            used: Some(used),
            available,
            has_available,
        })
    }
}
