//! The link service: pagination, caching, grouped views and deletion.
//!
//! Listings page through the upstream cursor API with a fixed
//! inter-page delay to stay under the provider's rate limits, and the
//! full sweep throttles between products the same way. The flat view is
//! memoized in a TTL cache; deletion always resolves the current link
//! set fresh and invalidates the cache afterwards.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crewdeck_connector::error::ConnectorResult;
use crewdeck_connector::traits::PaymentsOp;
use crewdeck_core::PlanId;
use crewdeck_provisioning::TtlCache;

use crate::model::{group_by_closer, group_by_product, CloserGroup, CloserLink, ProductGroup};
use crate::parse::classify;

/// A product fetched first (and exclusively, for the fast views).
#[derive(Debug, Clone)]
pub struct PriorityProduct {
    pub id: String,
    pub name: String,
}

/// Link service tuning. The delays exist to throttle request rate and
/// are dropped to zero in tests.
#[derive(Debug, Clone)]
pub struct LinkServiceConfig {
    pub employee_domain: String,
    pub priority_products: Vec<PriorityProduct>,
    pub cache_ttl: Duration,
    /// Delay between pagination requests within one product.
    pub page_delay: Duration,
    /// Delay between products in the priority views.
    pub product_delay: Duration,
    /// Delay between products in the full sweep.
    pub sweep_delay: Duration,
}

impl LinkServiceConfig {
    pub fn new(employee_domain: impl Into<String>, priority_products: Vec<PriorityProduct>) -> Self {
        Self {
            employee_domain: employee_domain.into(),
            priority_products,
            cache_ttl: Duration::from_secs(5 * 60),
            page_delay: Duration::from_millis(300),
            product_delay: Duration::from_millis(500),
            sweep_delay: Duration::from_millis(800),
        }
    }
}

/// Result of deleting a closer's links.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DeleteOutcome {
    pub deleted_count: usize,
    pub total_links: usize,
    pub errors: Vec<DeleteFailure>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct DeleteFailure {
    pub plan_id: PlanId,
    pub error: String,
}

/// Computes closer→link views from the live payments platform.
pub struct LinkService {
    payments: Arc<dyn PaymentsOp>,
    cache: TtlCache<Vec<CloserLink>>,
    config: LinkServiceConfig,
}

impl LinkService {
    pub fn new(payments: Arc<dyn PaymentsOp>, config: LinkServiceConfig) -> Self {
        Self {
            payments,
            cache: TtlCache::new(config.cache_ttl),
            config,
        }
    }

    /// Walk every page of one product's plan listing and classify the
    /// annotations. A product whose listing fails contributes nothing
    /// rather than failing the whole view.
    async fn collect_product_links(&self, product_id: &str, product_name: &str) -> Vec<CloserLink> {
        let mut links = Vec::new();
        let mut cursor: Option<String> = None;
        let mut page_count = 0u32;

        loop {
            if page_count > 0 {
                tokio::time::sleep(self.config.page_delay).await;
            }

            let page = match self.payments.plans_page(product_id, cursor.as_deref()).await {
                Ok(page) => page,
                Err(err) => {
                    warn!(product_id, error = %err, "plan listing failed, skipping product");
                    return links;
                }
            };
            page_count += 1;

            for plan in page.plans {
                let Some(notes) = plan.internal_notes.as_deref() else {
                    continue;
                };
                let Some(parsed) = classify(notes, &self.config.employee_domain) else {
                    continue;
                };
                links.push(CloserLink {
                    checkout_url: plan.purchase_url.clone().unwrap_or_else(|| {
                        format!("https://checkout/{}", plan.id)
                    }),
                    id: plan.id,
                    closer_email: parsed.email,
                    link_type: parsed.link_type,
                    link_type_label: parsed.link_type.label().to_string(),
                    price: plan.initial_price,
                    member_count: plan.member_count,
                    product_id: product_id.to_string(),
                    product_name: product_name.to_string(),
                    created_at: plan.created_at,
                    raw_note: notes.to_string(),
                });
            }

            if !page.has_next_page {
                break;
            }
            cursor = page.end_cursor;
            if cursor.is_none() {
                break;
            }
        }

        debug!(product_id, pages = page_count, links = links.len(), "product links collected");
        links
    }

    /// Links from the priority products only, with inter-product throttling.
    async fn priority_links(&self) -> Vec<CloserLink> {
        let mut links = Vec::new();
        for (i, product) in self.config.priority_products.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.config.product_delay).await;
            }
            links.extend(self.collect_product_links(&product.id, &product.name).await);
        }
        links
    }

    /// All closer links across every product, TTL-cached.
    pub async fn all_links(&self) -> ConnectorResult<Vec<CloserLink>> {
        self.cache
            .get_or_fetch(|| async {
                let products = self.payments.list_products().await?;

                // Priority products first, then the rest.
                let priority_ids: Vec<&str> = self
                    .config
                    .priority_products
                    .iter()
                    .map(|p| p.id.as_str())
                    .collect();
                let (priority, rest): (Vec<_>, Vec<_>) = products
                    .into_iter()
                    .partition(|p| priority_ids.contains(&p.id.as_str()));

                let mut links = Vec::new();
                for (i, product) in priority.iter().chain(rest.iter()).enumerate() {
                    if i > 0 {
                        tokio::time::sleep(self.config.sweep_delay).await;
                    }
                    links.extend(self.collect_product_links(&product.id, &product.title).await);
                }

                info!(links = links.len(), "full link sweep complete");
                Ok(links)
            })
            .await
    }

    /// Legacy flat view: all links grouped by closer email.
    pub async fn grouped_by_closer(&self) -> ConnectorResult<Vec<CloserGroup>> {
        let links = self.all_links().await?;
        Ok(group_by_closer(&links))
    }

    /// Priority products grouped by product, then by closer.
    pub async fn grouped_by_product(&self) -> ConnectorResult<Vec<ProductGroup>> {
        let links = self.priority_links().await;
        let priority_ids: Vec<String> = self
            .config
            .priority_products
            .iter()
            .map(|p| p.id.clone())
            .collect();
        Ok(group_by_product(&links, &priority_ids))
    }

    /// One closer's links, resolved from the priority products.
    pub async fn links_for_closer(&self, email: &str) -> ConnectorResult<Vec<CloserLink>> {
        let links = self.priority_links().await;
        Ok(links
            .into_iter()
            .filter(|l| l.closer_email.eq_ignore_ascii_case(email))
            .collect())
    }

    /// Delete every link belonging to a closer.
    ///
    /// Resolves the current link set fresh (never the cache), attempts
    /// each deletion independently collecting partial failures, then
    /// invalidates the cached flat view.
    pub async fn delete_for_closer(&self, email: &str) -> ConnectorResult<DeleteOutcome> {
        let links = self.links_for_closer(email).await?;
        if links.is_empty() {
            info!(email, "no links to delete");
            return Ok(DeleteOutcome {
                deleted_count: 0,
                total_links: 0,
                errors: Vec::new(),
            });
        }

        let total_links = links.len();
        let mut deleted_count = 0;
        let mut errors = Vec::new();

        for link in links {
            match self.payments.delete_plan(&link.id).await {
                Ok(()) => deleted_count += 1,
                Err(err) => {
                    warn!(plan_id = %link.id, error = %err, "plan deletion failed");
                    errors.push(DeleteFailure {
                        plan_id: link.id,
                        error: err.to_string(),
                    });
                }
            }
        }

        self.cache.invalidate().await;
        info!(email, deleted_count, total_links, "closer links deleted");

        Ok(DeleteOutcome {
            deleted_count,
            total_links,
            errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crewdeck_connector::error::ConnectorError;
    use crewdeck_connector::types::{Plan, PlanPage, Product};

    struct MockPayments {
        /// product id → its pages, served in order per request cursor.
        pages: HashMap<String, Vec<PlanPage>>,
        products: Vec<Product>,
        list_calls: AtomicUsize,
        deleted: Mutex<Vec<PlanId>>,
        fail_delete_for: Option<PlanId>,
    }

    impl MockPayments {
        fn new() -> Self {
            Self {
                pages: HashMap::new(),
                products: Vec::new(),
                list_calls: AtomicUsize::new(0),
                deleted: Mutex::new(Vec::new()),
                fail_delete_for: None,
            }
        }

        fn plan(id: &str, notes: &str, members: u32) -> Plan {
            Plan {
                id: PlanId::new(id),
                internal_notes: Some(notes.to_string()),
                initial_price: Some(250.0),
                member_count: members,
                purchase_url: None,
                created_at: None,
            }
        }
    }

    #[async_trait]
    impl PaymentsOp for MockPayments {
        async fn list_products(&self) -> ConnectorResult<Vec<Product>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.products.clone())
        }

        async fn plans_page(
            &self,
            product_id: &str,
            after: Option<&str>,
        ) -> ConnectorResult<PlanPage> {
            let pages = self
                .pages
                .get(product_id)
                .ok_or_else(|| ConnectorError::not_found(product_id))?;
            let index = after.map_or(0, |c| c.parse::<usize>().unwrap_or(0));
            Ok(pages[index].clone())
        }

        async fn delete_plan(&self, plan_id: &PlanId) -> ConnectorResult<()> {
            if self.fail_delete_for.as_ref() == Some(plan_id) {
                return Err(ConnectorError::upstream(500, "deletion rejected"));
            }
            self.deleted.lock().unwrap().push(plan_id.clone());
            Ok(())
        }
    }

    fn config() -> LinkServiceConfig {
        LinkServiceConfig::new(
            "example.com",
            vec![PriorityProduct {
                id: "prod_a".to_string(),
                name: "Product A".to_string(),
            }],
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_pagination_accumulates_every_page() {
        let mut payments = MockPayments::new();
        payments.pages.insert(
            "prod_a".to_string(),
            vec![
                PlanPage {
                    plans: vec![
                        MockPayments::plan("p1", "pif-jane@x.com", 2),
                        MockPayments::plan("p2", "SMC Simplified", 0),
                    ],
                    has_next_page: true,
                    end_cursor: Some("1".to_string()),
                },
                PlanPage {
                    plans: vec![MockPayments::plan("p3", "deposit500-jane@x.com", 1)],
                    has_next_page: false,
                    end_cursor: None,
                },
            ],
        );

        let service = LinkService::new(Arc::new(payments), config());
        let links = service.links_for_closer("jane@x.com").await.unwrap();

        // Both pages were read; the excluded sentinel plan was dropped.
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].id.as_str(), "p1");
        assert_eq!(links[1].id.as_str(), "p3");
        assert_eq!(links[1].link_type, crate::parse::LinkType::Deposit500);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_links_is_cached() {
        let mut payments = MockPayments::new();
        payments.products = vec![Product {
            id: "prod_a".to_string(),
            title: "Product A".to_string(),
        }];
        payments.pages.insert(
            "prod_a".to_string(),
            vec![PlanPage {
                plans: vec![MockPayments::plan("p1", "pif-jane@x.com", 2)],
                has_next_page: false,
                end_cursor: None,
            }],
        );
        let payments = Arc::new(payments);

        let service = LinkService::new(payments.clone(), config());
        assert_eq!(service.all_links().await.unwrap().len(), 1);
        assert_eq!(service.all_links().await.unwrap().len(), 1);
        assert_eq!(payments.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_collects_partial_failures_and_invalidates() {
        let mut payments = MockPayments::new();
        payments.products = vec![Product {
            id: "prod_a".to_string(),
            title: "Product A".to_string(),
        }];
        payments.pages.insert(
            "prod_a".to_string(),
            vec![PlanPage {
                plans: vec![
                    MockPayments::plan("p1", "pif-jane@x.com", 2),
                    MockPayments::plan("p2", "deposit-jane@x.com", 1),
                    MockPayments::plan("p3", "pif-other@x.com", 1),
                ],
                has_next_page: false,
                end_cursor: None,
            }],
        );
        payments.fail_delete_for = Some(PlanId::new("p2"));
        let payments = Arc::new(payments);

        let service = LinkService::new(payments.clone(), config());

        // Warm the cache so invalidation is observable.
        assert_eq!(service.all_links().await.unwrap().len(), 3);

        let outcome = service.delete_for_closer("jane@x.com").await.unwrap();
        assert_eq!(outcome.total_links, 2);
        assert_eq!(outcome.deleted_count, 1);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].plan_id.as_str(), "p2");

        // Only jane's plans were touched.
        let deleted = payments.deleted.lock().unwrap().clone();
        assert_eq!(deleted, vec![PlanId::new("p1")]);

        // The cache was invalidated: the next view refetches.
        service.all_links().await.unwrap();
        assert_eq!(payments.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_product_contributes_empty_set() {
        // No pages registered for prod_a: listing errors, view is empty.
        let payments = MockPayments::new();
        let service = LinkService::new(Arc::new(payments), config());

        let groups = service.grouped_by_product().await.unwrap();
        assert!(groups.is_empty());
    }
}
