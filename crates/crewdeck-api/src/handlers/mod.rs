//! HTTP handlers, one module per surface.

pub mod analytics;
pub mod closers;
pub mod crm;
pub mod health;
pub mod links;
