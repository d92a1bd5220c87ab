//! CRM adapter: internal staff and resource tracking.
//!
//! Long-lived API key auth. The CRM has no lookup-by-email endpoint, so
//! lookups list the staff and match locally: the same listing the
//! offboarding safety gates rely on. `compare_numbers` joins the
//! telephony inventory against the CRM's own phone-number records on
//! the number string.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crewdeck_connector::error::{ConnectorError, ConnectorResult};
use crewdeck_connector::http::{build_client, error_for_response};
use crewdeck_connector::traits::{
    CreateOp, DeleteOp, ListOp, LookupOp, PlatformConnector, StaffQueryOp,
};
use crewdeck_connector::types::{NewUser, NumberCrmStatus, PhoneNumber, PlatformUser};
use crewdeck_core::{CrmUserId, Platform};

/// CRM adapter configuration.
#[derive(Clone)]
pub struct CrmConfig {
    pub base_url: String,
    pub api_key: String,
}

impl std::fmt::Debug for CrmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrmConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[redacted]")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct CrmUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CrmUserList {
    #[serde(default)]
    users: Vec<CrmUser>,
}

#[derive(Debug, Deserialize)]
struct CrmNumberRecord {
    phone_number: String,
    #[serde(default)]
    linked_user: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CrmNumberList {
    #[serde(default)]
    numbers: Vec<CrmNumberRecord>,
}

/// CRM platform adapter.
pub struct CrmConnector {
    config: CrmConfig,
    client: Client,
}

impl CrmConnector {
    pub fn new(config: CrmConfig) -> ConnectorResult<Self> {
        if config.api_key.is_empty() {
            return Err(ConnectorError::invalid_configuration(
                "CRM API key is not configured",
            ));
        }
        Ok(Self {
            config,
            client: build_client()?,
        })
    }

    fn map_user(user: CrmUser) -> PlatformUser {
        let mut mapped = PlatformUser::new(user.id, user.email.unwrap_or_default());
        mapped.name = user.name;
        mapped.first_name = user.first_name;
        mapped.last_name = user.last_name;
        mapped.role = user.role;
        mapped
    }

    /// The CRM's own phone-number records.
    pub async fn phone_numbers(&self) -> ConnectorResult<Vec<(String, Option<CrmUserId>)>> {
        let response = self
            .client
            .get(format!("{}/phone-numbers", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_response(Platform::Crm, status, &body));
        }

        let list: CrmNumberList = response.json().await?;
        Ok(list
            .numbers
            .into_iter()
            .map(|n| (n.phone_number, n.linked_user.map(CrmUserId::new)))
            .collect())
    }
}

impl PlatformConnector for CrmConnector {
    fn platform(&self) -> Platform {
        Platform::Crm
    }

    fn display_name(&self) -> &str {
        "crm"
    }
}

#[async_trait]
impl LookupOp for CrmConnector {
    async fn find_by_email(&self, email: &str) -> ConnectorResult<Option<PlatformUser>> {
        let users = self.list_users().await?;
        Ok(users
            .into_iter()
            .find(|u| u.email.eq_ignore_ascii_case(email)))
    }
}

#[async_trait]
impl CreateOp for CrmConnector {
    async fn create_user(&self, user: &NewUser) -> ConnectorResult<PlatformUser> {
        let response = self
            .client
            .post(format!("{}/users", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&json!({
                "first_name": user.first_name,
                "last_name": user.last_name,
                "email": user.email,
                "role": user.role.as_deref().unwrap_or("user"),
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_response(Platform::Crm, status, &body));
        }

        let created: CrmUser = response.json().await?;
        info!(email = %user.email, "CRM user created");
        Ok(Self::map_user(created))
    }
}

#[async_trait]
impl DeleteOp for CrmConnector {
    async fn delete_user(&self, identifier: &str) -> ConnectorResult<()> {
        let response = self
            .client
            .delete(format!("{}/users/{identifier}", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!(identifier, "CRM user already absent");
            return Ok(());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_response(Platform::Crm, status, &body));
        }
        info!(identifier, "CRM user deleted");
        Ok(())
    }
}

#[async_trait]
impl ListOp for CrmConnector {
    async fn list_users(&self) -> ConnectorResult<Vec<PlatformUser>> {
        let response = self
            .client
            .get(format!("{}/users", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_response(Platform::Crm, status, &body));
        }

        let list: CrmUserList = response.json().await?;
        Ok(list.users.into_iter().map(Self::map_user).collect())
    }
}

#[async_trait]
impl StaffQueryOp for CrmConnector {
    async fn compare_numbers(
        &self,
        numbers: &[PhoneNumber],
    ) -> ConnectorResult<Vec<NumberCrmStatus>> {
        let crm_numbers = self.phone_numbers().await?;

        Ok(numbers
            .iter()
            .map(|n| {
                let matched = crm_numbers.iter().find(|(num, _)| *num == n.number);
                NumberCrmStatus {
                    number: n.number.clone(),
                    sid: n.sid.clone(),
                    in_crm: matched.is_some(),
                    linked_user: matched.and_then(|(_, linked)| linked.clone()),
                }
            })
            .collect())
    }

    async fn find_by_id(&self, id: &CrmUserId) -> ConnectorResult<Option<PlatformUser>> {
        let users = self.list_users().await?;
        Ok(users.into_iter().find(|u| u.id == id.as_str()))
    }
}
