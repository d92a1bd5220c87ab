//! Video adapter: conferencing accounts.
//!
//! Server-to-server OAuth: the client-credentials grant
//! (`account_credentials`) is exchanged for a bearer token, cached
//! adapter-locally and refreshed a minute before expiry. New users are
//! created as licensed seats.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crewdeck_connector::auth::TokenCache;
use crewdeck_connector::error::{ConnectorError, ConnectorResult};
use crewdeck_connector::http::{build_client, error_for_response};
use crewdeck_connector::traits::{
    CreateOp, DeleteOp, LicenseInfoOp, ListOp, LookupOp, PlatformConnector,
};
use crewdeck_connector::types::{LicenseInfo, NewUser, PlatformUser};
use crewdeck_core::Platform;

/// Licensed seat type for new accounts.
const LICENSED_USER_TYPE: u8 = 2;

/// Video adapter configuration.
#[derive(Clone)]
pub struct VideoConfig {
    pub base_url: String,
    pub token_url: String,
    pub account_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for VideoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoConfig")
            .field("base_url", &self.base_url)
            .field("account_id", &self.account_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
struct VideoUser {
    id: String,
    email: String,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(rename = "type", default)]
    user_type: Option<u8>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserListResponse {
    #[serde(default)]
    users: Vec<VideoUser>,
}

#[derive(Debug, Deserialize)]
struct PlanUsageResponse {
    plan_base: PlanBase,
}

#[derive(Debug, Deserialize)]
struct PlanBase {
    hosts: u32,
    usage: u32,
}

/// Video conferencing platform adapter.
pub struct VideoConnector {
    config: VideoConfig,
    client: Client,
    token: TokenCache,
}

impl VideoConnector {
    pub fn new(config: VideoConfig) -> ConnectorResult<Self> {
        if config.client_id.is_empty() || config.client_secret.is_empty() {
            return Err(ConnectorError::invalid_configuration(
                "video OAuth client credentials are not configured",
            ));
        }
        Ok(Self {
            config,
            client: build_client()?,
            token: TokenCache::new(),
        })
    }

    async fn bearer_token(&self) -> ConnectorResult<String> {
        if let Some(token) = self.token.get().await {
            return Ok(token);
        }

        debug!("fetching video access token");
        let response = self
            .client
            .post(&self.config.token_url)
            .query(&[
                ("grant_type", "account_credentials"),
                ("account_id", self.config.account_id.as_str()),
            ])
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "video token exchange failed");
            return Err(ConnectorError::AuthenticationFailed {
                platform: Platform::Video,
            });
        }

        let token: TokenResponse = response.json().await?;
        self.token
            .store(&token.access_token, Duration::from_secs(token.expires_in))
            .await;
        Ok(token.access_token)
    }

    fn map_user(user: VideoUser) -> PlatformUser {
        let mut mapped = PlatformUser::new(user.id, user.email);
        mapped.first_name = user.first_name;
        mapped.last_name = user.last_name;
        mapped.status = user.status;
        mapped.role = user.user_type.map(|t| {
            if t == LICENSED_USER_TYPE {
                "licensed".to_string()
            } else {
                "basic".to_string()
            }
        });
        mapped
    }
}

impl PlatformConnector for VideoConnector {
    fn platform(&self) -> Platform {
        Platform::Video
    }

    fn display_name(&self) -> &str {
        "video"
    }
}

#[async_trait]
impl LookupOp for VideoConnector {
    async fn find_by_email(&self, email: &str) -> ConnectorResult<Option<PlatformUser>> {
        let token = self.bearer_token().await?;
        let response = self
            .client
            .get(format!("{}/users/{email}", self.config.base_url))
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!(email, "video user not found");
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_response(Platform::Video, status, &body));
        }

        let user: VideoUser = response.json().await?;
        Ok(Some(Self::map_user(user)))
    }
}

#[async_trait]
impl CreateOp for VideoConnector {
    async fn create_user(&self, user: &NewUser) -> ConnectorResult<PlatformUser> {
        let token = self.bearer_token().await?;
        let response = self
            .client
            .post(format!("{}/users", self.config.base_url))
            .bearer_auth(token)
            .json(&json!({
                "action": "create",
                "user_info": {
                    "email": user.email,
                    "type": LICENSED_USER_TYPE,
                    "first_name": user.first_name,
                    "last_name": user.last_name,
                },
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_response(Platform::Video, status, &body));
        }

        let created: VideoUser = response.json().await?;
        info!(email = %created.email, "video account created");
        Ok(Self::map_user(created))
    }
}

#[async_trait]
impl DeleteOp for VideoConnector {
    async fn delete_user(&self, identifier: &str) -> ConnectorResult<()> {
        let token = self.bearer_token().await?;
        let response = self
            .client
            .delete(format!("{}/users/{identifier}", self.config.base_url))
            .query(&[("action", "delete")])
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!(identifier, "video user already absent");
            return Ok(());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_response(Platform::Video, status, &body));
        }
        info!(identifier, "video account deleted, license released");
        Ok(())
    }
}

#[async_trait]
impl ListOp for VideoConnector {
    async fn list_users(&self) -> ConnectorResult<Vec<PlatformUser>> {
        let token = self.bearer_token().await?;
        let response = self
            .client
            .get(format!("{}/users", self.config.base_url))
            .query(&[("page_size", "300")])
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_response(Platform::Video, status, &body));
        }

        let list: UserListResponse = response.json().await?;
        Ok(list.users.into_iter().map(Self::map_user).collect())
    }
}

#[async_trait]
impl LicenseInfoOp for VideoConnector {
    async fn license_info(&self) -> ConnectorResult<LicenseInfo> {
        let token = self.bearer_token().await?;
        let response = self
            .client
            .get(format!(
                "{}/accounts/{}/plans/usage",
                self.config.base_url, self.config.account_id
            ))
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_response(Platform::Video, status, &body));
        }

        let usage: PlanUsageResponse = response.json().await?;
        let available = usage.plan_base.hosts.saturating_sub(usage.plan_base.usage);
        Ok(LicenseInfo {
            platform: Platform::Video,
            total: Some(usage.plan_base.hosts),
            used: Some(usage.plan_base.usage),
            available: Some(available),
            has_available: available > 0,
        })
    }
}
