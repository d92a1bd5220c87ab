//! Payments adapter: checkout-link (plan) listing and deletion.
//!
//! Bearer API key with a generous read timeout: plan listings are
//! cursor-paged and the link service walks every page. Checkout URLs
//! missing upstream are synthesized from the plan id.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crewdeck_connector::error::{ConnectorError, ConnectorResult};
use crewdeck_connector::http::{build_client_with_timeout, error_for_response};
use crewdeck_connector::traits::PaymentsOp;
use crewdeck_connector::types::{Plan, PlanPage, Product};
use crewdeck_core::{Platform, PlanId};

/// Page size for plan listings.
const PAGE_SIZE: u32 = 100;

/// Payments adapter configuration.
#[derive(Clone)]
pub struct PaymentsConfig {
    pub base_url: String,
    pub api_key: String,
    pub company_id: String,
}

impl std::fmt::Debug for PaymentsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentsConfig")
            .field("base_url", &self.base_url)
            .field("company_id", &self.company_id)
            .field("api_key", &"[redacted]")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct ProductListResponse {
    #[serde(default)]
    data: Vec<ProductRecord>,
}

#[derive(Debug, Deserialize)]
struct ProductRecord {
    id: String,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct PlanListResponse {
    #[serde(default)]
    data: Vec<PlanRecord>,
    #[serde(default)]
    page_info: Option<PageInfo>,
}

#[derive(Debug, Deserialize)]
struct PlanRecord {
    id: String,
    #[serde(default)]
    internal_notes: Option<String>,
    #[serde(default)]
    initial_price: Option<f64>,
    #[serde(default)]
    member_count: u32,
    #[serde(default)]
    purchase_url: Option<String>,
    #[serde(default)]
    created_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Deserialize)]
struct PageInfo {
    #[serde(default)]
    has_next_page: bool,
    #[serde(default)]
    end_cursor: Option<String>,
}

/// Payments platform adapter.
pub struct PaymentsConnector {
    config: PaymentsConfig,
    client: Client,
}

impl PaymentsConnector {
    pub fn new(config: PaymentsConfig) -> ConnectorResult<Self> {
        if config.api_key.is_empty() {
            return Err(ConnectorError::invalid_configuration(
                "payments API key is not configured",
            ));
        }
        Ok(Self {
            config,
            client: build_client_with_timeout(Duration::from_secs(30))?,
        })
    }

    fn map_plan(record: PlanRecord) -> Plan {
        Plan {
            id: PlanId::new(record.id),
            internal_notes: record.internal_notes,
            initial_price: record.initial_price,
            member_count: record.member_count,
            purchase_url: record.purchase_url,
            created_at: record.created_at,
        }
    }
}

#[async_trait]
impl PaymentsOp for PaymentsConnector {
    async fn list_products(&self) -> ConnectorResult<Vec<Product>> {
        let response = self
            .client
            .get(format!("{}/products", self.config.base_url))
            .query(&[("company_id", self.config.company_id.as_str())])
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_response(Platform::Payments, status, &body));
        }

        let list: ProductListResponse = response.json().await?;
        Ok(list
            .data
            .into_iter()
            .map(|p| Product {
                title: if p.title.is_empty() {
                    p.id.clone()
                } else {
                    p.title
                },
                id: p.id,
            })
            .collect())
    }

    async fn plans_page(
        &self,
        product_id: &str,
        after: Option<&str>,
    ) -> ConnectorResult<PlanPage> {
        let page_size = PAGE_SIZE.to_string();
        let mut query: Vec<(&str, &str)> = vec![
            ("company_id", self.config.company_id.as_str()),
            ("product_id", product_id),
            ("first", page_size.as_str()),
        ];
        if let Some(cursor) = after {
            query.push(("after", cursor));
        }

        let response = self
            .client
            .get(format!("{}/plans", self.config.base_url))
            .query(&query)
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_response(Platform::Payments, status, &body));
        }

        let list: PlanListResponse = response.json().await?;
        let (has_next_page, end_cursor) = list
            .page_info
            .map(|p| (p.has_next_page, p.end_cursor))
            .unwrap_or((false, None));

        debug!(
            product_id,
            plans = list.data.len(),
            has_next_page,
            "fetched plan page"
        );

        Ok(PlanPage {
            plans: list.data.into_iter().map(Self::map_plan).collect(),
            has_next_page,
            end_cursor,
        })
    }

    async fn delete_plan(&self, plan_id: &PlanId) -> ConnectorResult<()> {
        let response = self
            .client
            .delete(format!("{}/plans/{plan_id}", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_response(Platform::Payments, status, &body));
        }
        info!(plan_id = %plan_id, "payment plan deleted");
        Ok(())
    }
}
