//! Link records and computed grouped views.

use serde::{Deserialize, Serialize};

use crewdeck_core::PlanId;

use crate::parse::LinkType;

/// A classified payment link owned by a closer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloserLink {
    pub id: PlanId,
    pub closer_email: String,
    pub link_type: LinkType,
    pub link_type_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub member_count: u32,
    pub checkout_url: String,
    pub product_id: String,
    pub product_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    /// The raw annotation the classification came from.
    pub raw_note: String,
}

/// A closer's links, with membership totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloserGroup {
    pub email: String,
    pub closer_name: String,
    pub links: Vec<CloserLink>,
    pub total_members: u32,
}

/// A product's links grouped by closer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductGroup {
    pub product_id: String,
    pub product_name: String,
    pub closers: Vec<CloserGroup>,
    pub total_closers: usize,
    pub total_links: usize,
    pub link_types: Vec<LinkType>,
}

/// Display name derived from the email local part, dashes to spaces.
#[must_use]
pub fn closer_name_from_email(email: &str) -> String {
    email
        .split('@')
        .next()
        .unwrap_or(email)
        .replace('-', " ")
}

/// Flat per-closer grouping, sorted by email.
#[must_use]
pub fn group_by_closer(links: &[CloserLink]) -> Vec<CloserGroup> {
    let mut groups: Vec<CloserGroup> = Vec::new();

    for link in links {
        match groups.iter_mut().find(|g| g.email == link.closer_email) {
            Some(group) => {
                group.total_members += link.member_count;
                group.links.push(link.clone());
            }
            None => groups.push(CloserGroup {
                email: link.closer_email.clone(),
                closer_name: closer_name_from_email(&link.closer_email),
                links: vec![link.clone()],
                total_members: link.member_count,
            }),
        }
    }

    groups.sort_by(|a, b| a.email.cmp(&b.email));
    groups
}

/// Two-level grouping: by product, then by closer within each product.
///
/// Products named in `priority_ids` sort first, in the given order;
/// the rest sort alphabetically by name.
#[must_use]
pub fn group_by_product(links: &[CloserLink], priority_ids: &[String]) -> Vec<ProductGroup> {
    let mut products: Vec<(String, String, Vec<CloserLink>)> = Vec::new();

    for link in links {
        match products.iter_mut().find(|(id, _, _)| *id == link.product_id) {
            Some((_, _, bucket)) => bucket.push(link.clone()),
            None => products.push((
                link.product_id.clone(),
                link.product_name.clone(),
                vec![link.clone()],
            )),
        }
    }

    products.sort_by(|(a_id, a_name, _), (b_id, b_name, _)| {
        let a_rank = priority_ids
            .iter()
            .position(|p| p == a_id)
            .unwrap_or(usize::MAX);
        let b_rank = priority_ids
            .iter()
            .position(|p| p == b_id)
            .unwrap_or(usize::MAX);
        a_rank.cmp(&b_rank).then_with(|| a_name.cmp(b_name))
    });

    products
        .into_iter()
        .map(|(product_id, product_name, bucket)| {
            let mut link_types: Vec<LinkType> = Vec::new();
            for link in &bucket {
                if !link_types.contains(&link.link_type) {
                    link_types.push(link.link_type);
                }
            }
            let closers = group_by_closer(&bucket);
            ProductGroup {
                product_id,
                product_name,
                total_closers: closers.len(),
                total_links: bucket.len(),
                closers,
                link_types,
            }
        })
        .collect()
}
