//! Annotation classification.
//!
//! Upstream plan records carry a free-text annotation naming the closer
//! the link belongs to. Classification applies an ordered rule list,
//! most specific first, first match wins. Annotations containing the
//! exclusion sentinels are non-closer entries and classify to nothing,
//! as does anything no rule matches: either way the plan is dropped
//! from every view.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Annotation substrings marking non-closer entries.
const EXCLUSION_SENTINELS: [&str; 2] = ["Release", "SMC Simplified"];

/// The closed set of payment-link variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Pif,
    Deposit,
    Deposit500,
    Split,
    Psplit,
    Other,
}

impl LinkType {
    /// Human-readable label shown in grouped views.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            LinkType::Pif => "7k PIF",
            LinkType::Deposit => "Deposit $250",
            LinkType::Deposit500 => "Deposit $500",
            LinkType::Split => "3500 Split",
            LinkType::Psplit => "P-Split",
            LinkType::Other => "Other",
        }
    }
}

impl std::fmt::Display for LinkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkType::Pif => write!(f, "pif"),
            LinkType::Deposit => write!(f, "deposit"),
            LinkType::Deposit500 => write!(f, "deposit500"),
            LinkType::Split => write!(f, "split"),
            LinkType::Psplit => write!(f, "psplit"),
            LinkType::Other => write!(f, "other"),
        }
    }
}

/// A successfully classified annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedNote {
    /// Closer email, lowercased.
    pub email: String,
    pub link_type: LinkType,
}

/// Prefixed rules in match order. `deposit500-` must precede the plain
/// `deposit-` rule so the more specific variant wins.
static PREFIX_RULES: LazyLock<Vec<(Regex, LinkType)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"(?i)^pif-(.+@.+)$").expect("pif rule"),
            LinkType::Pif,
        ),
        (
            Regex::new(r"(?i)^deposit500-(.+@.+)$").expect("deposit500 rule"),
            LinkType::Deposit500,
        ),
        (
            Regex::new(r"(?i)^deposit-(.+@.+)$").expect("deposit rule"),
            LinkType::Deposit,
        ),
        (
            Regex::new(r"(?i)^split3500-(.+@.+)$").expect("split rule"),
            LinkType::Split,
        ),
        (
            Regex::new(r"(?i)^PSPLIT-(.+@.+)$").expect("psplit rule"),
            LinkType::Psplit,
        ),
    ]
});

/// Classify an annotation into `(closer email, link type)`.
///
/// `employee_domain` scopes the bare-email fallback rule: an annotation
/// that is exactly a work email (no prefix) classifies as `Other`.
#[must_use]
pub fn classify(notes: &str, employee_domain: &str) -> Option<ParsedNote> {
    let notes = notes.trim();
    if notes.is_empty() {
        return None;
    }

    if EXCLUSION_SENTINELS.iter().any(|s| notes.contains(s)) {
        return None;
    }

    for (rule, link_type) in PREFIX_RULES.iter() {
        if let Some(captures) = rule.captures(notes) {
            let email = captures.get(1)?.as_str().to_lowercase();
            return Some(ParsedNote {
                email,
                link_type: *link_type,
            });
        }
    }

    if is_bare_work_email(notes, employee_domain) {
        return Some(ParsedNote {
            email: notes.to_lowercase(),
            link_type: LinkType::Other,
        });
    }

    None
}

/// A bare `local@domain` annotation: alphanumeric/dash local part and
/// the configured employee domain.
fn is_bare_work_email(notes: &str, employee_domain: &str) -> bool {
    let Some((local, host)) = notes.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        && host.eq_ignore_ascii_case(employee_domain)
}
