//! Telephony adapter: phone-number provisioning.
//!
//! HTTP basic auth with the account SID and auth token. Number
//! provisioning is a fixed sequence: purchase, then messaging-service
//! registration, then regulatory campaign registration: each upstream
//! step requires the previous one to have succeeded. Registration calls
//! are idempotent here (an already-registered number reports success)
//! because the onboarding flow re-runs them for numbers it finds
//! already purchased.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crewdeck_connector::error::{ConnectorError, ConnectorResult};
use crewdeck_connector::http::{build_client, error_for_response};
use crewdeck_connector::traits::{NumberInventory, PlatformConnector};
use crewdeck_connector::types::{AvailableNumber, NumberUpdate, PhoneNumber};
use crewdeck_core::{CrmUserId, NumberSid, Platform};

/// Telephony adapter configuration.
#[derive(Clone)]
pub struct TelephonyConfig {
    pub base_url: String,
    pub account_sid: String,
    pub auth_token: String,
    /// Messaging service numbers are registered with after purchase.
    pub messaging_service_sid: String,
    /// Regulatory bulk-messaging campaign.
    pub campaign_sid: String,
}

impl std::fmt::Debug for TelephonyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelephonyConfig")
            .field("base_url", &self.base_url)
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"[redacted]")
            .field("messaging_service_sid", &self.messaging_service_sid)
            .field("campaign_sid", &self.campaign_sid)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct AvailableNumbersResponse {
    #[serde(default)]
    available_phone_numbers: Vec<AvailableNumberRecord>,
}

#[derive(Debug, Deserialize)]
struct AvailableNumberRecord {
    phone_number: String,
}

#[derive(Debug, Deserialize)]
struct OwnedNumberRecord {
    sid: String,
    phone_number: String,
    #[serde(default)]
    friendly_name: String,
    #[serde(default)]
    linked_user: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwnedNumbersPage {
    #[serde(default)]
    incoming_phone_numbers: Vec<OwnedNumberRecord>,
    #[serde(default)]
    next_page_uri: Option<String>,
}

/// Telephony platform adapter.
pub struct TelephonyConnector {
    config: TelephonyConfig,
    client: Client,
}

impl TelephonyConnector {
    pub fn new(config: TelephonyConfig) -> ConnectorResult<Self> {
        if config.account_sid.is_empty() || config.auth_token.is_empty() {
            return Err(ConnectorError::invalid_configuration(
                "telephony account credentials are not configured",
            ));
        }
        Ok(Self {
            config,
            client: build_client()?,
        })
    }

    fn account_url(&self, suffix: &str) -> String {
        format!(
            "{}/Accounts/{}/{suffix}",
            self.config.base_url, self.config.account_sid
        )
    }

    fn map_number(record: OwnedNumberRecord) -> PhoneNumber {
        PhoneNumber {
            sid: NumberSid::new(record.sid),
            number: record.phone_number,
            friendly_name: record.friendly_name,
            linked_user: record.linked_user.map(CrmUserId::new),
        }
    }

    /// Register a number with a number-pool resource; an already-present
    /// number (409) counts as success.
    async fn register_number(
        &self,
        url: String,
        sid: &NumberSid,
        what: &str,
    ) -> ConnectorResult<()> {
        let response = self
            .client
            .post(url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[("PhoneNumberSid", sid.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::CONFLICT {
            debug!(sid = %sid, what, "number already registered");
            return Ok(());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_response(Platform::Telephony, status, &body));
        }
        debug!(sid = %sid, what, "number registered");
        Ok(())
    }
}

impl PlatformConnector for TelephonyConnector {
    fn platform(&self) -> Platform {
        Platform::Telephony
    }

    fn display_name(&self) -> &str {
        "telephony"
    }
}

#[async_trait]
impl NumberInventory for TelephonyConnector {
    async fn search_available(
        &self,
        area_code: &str,
        count: usize,
    ) -> ConnectorResult<Vec<AvailableNumber>> {
        let response = self
            .client
            .get(self.account_url("AvailablePhoneNumbers/US/Local.json"))
            .query(&[
                ("AreaCode", area_code),
                ("PageSize", &count.to_string()),
            ])
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_response(Platform::Telephony, status, &body));
        }

        let page: AvailableNumbersResponse = response.json().await?;
        Ok(page
            .available_phone_numbers
            .into_iter()
            .map(|r| AvailableNumber {
                number: r.phone_number,
            })
            .collect())
    }

    async fn purchase(&self, number: &str, friendly_name: &str) -> ConnectorResult<PhoneNumber> {
        let response = self
            .client
            .post(self.account_url("IncomingPhoneNumbers.json"))
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[("PhoneNumber", number), ("FriendlyName", friendly_name)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_response(Platform::Telephony, status, &body));
        }

        let record: OwnedNumberRecord = response.json().await?;
        info!(number = %record.phone_number, sid = %record.sid, "number purchased");
        Ok(Self::map_number(record))
    }

    async fn add_to_messaging_service(&self, sid: &NumberSid) -> ConnectorResult<()> {
        let url = format!(
            "{}/Services/{}/PhoneNumbers.json",
            self.config.base_url, self.config.messaging_service_sid
        );
        self.register_number(url, sid, "messaging service").await
    }

    async fn add_to_campaign(&self, sid: &NumberSid) -> ConnectorResult<()> {
        let url = format!(
            "{}/Campaigns/{}/PhoneNumbers.json",
            self.config.base_url, self.config.campaign_sid
        );
        self.register_number(url, sid, "messaging campaign").await
    }

    async fn release(&self, sid: &NumberSid) -> ConnectorResult<()> {
        let response = self
            .client
            .delete(self.account_url(&format!("IncomingPhoneNumbers/{sid}.json")))
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .send()
            .await?;

        let status = response.status();
        // Releasing an unknown SID is success: the number is gone either way.
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!(sid = %sid, "number already released");
            return Ok(());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_response(Platform::Telephony, status, &body));
        }
        info!(sid = %sid, "number released");
        Ok(())
    }

    async fn update_number(
        &self,
        sid: &NumberSid,
        update: &NumberUpdate,
    ) -> ConnectorResult<PhoneNumber> {
        let mut form: Vec<(&str, &str)> = Vec::new();
        if let Some(name) = update.friendly_name.as_deref() {
            form.push(("FriendlyName", name));
        }

        let response = self
            .client
            .post(self.account_url(&format!("IncomingPhoneNumbers/{sid}.json")))
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_response(Platform::Telephony, status, &body));
        }

        let record: OwnedNumberRecord = response.json().await?;
        Ok(Self::map_number(record))
    }

    async fn list_numbers(&self) -> ConnectorResult<Vec<PhoneNumber>> {
        let mut numbers = Vec::new();
        let mut url = format!("{}?PageSize=100", self.account_url("IncomingPhoneNumbers.json"));

        loop {
            let response = self
                .client
                .get(&url)
                .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(error_for_response(Platform::Telephony, status, &body));
            }

            let page: OwnedNumbersPage = response.json().await?;
            numbers.extend(page.incoming_phone_numbers.into_iter().map(Self::map_number));

            match page.next_page_uri {
                Some(next) if !next.is_empty() => {
                    url = format!("{}{next}", self.config.base_url);
                }
                _ => break,
            }
        }

        debug!(count = numbers.len(), "listed owned numbers");
        Ok(numbers)
    }
}
