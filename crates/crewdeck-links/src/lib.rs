//! # Link Reconciliation Engine
//!
//! Derives structured closer→payment-link associations from the
//! free-text annotation carried by upstream plan records. Nothing is
//! stored: the engine pages through the live plan listings, classifies
//! each annotation against an ordered rule set, and computes grouped
//! views on demand.

pub mod model;
pub mod parse;
pub mod service;

pub use model::{CloserGroup, CloserLink, ProductGroup};
pub use parse::{classify, LinkType, ParsedNote};
pub use service::{DeleteOutcome, LinkService, LinkServiceConfig, PriorityProduct};
