//! # Lifecycle Orchestration
//!
//! The onboarding and offboarding engines drive ordered multi-platform
//! sequences against the live upstream platforms. There is no
//! transaction coordinator and no rollback: each stage is independently
//! fallible, its error becomes data in the progress report, and a
//! failed stage never blocks the stages after it. Idempotence comes
//! from lookup-before-create (onboarding) and idempotent deletes
//! (offboarding), so a partially completed run is safe to re-invoke.
//!
//! The [`cache`] module holds the TTL-bound snapshot of the telephony
//! inventory shared by the read paths.

pub mod cache;
pub mod offboarding;
pub mod onboarding;
pub mod progress;

pub use cache::{NumberCache, TtlCache};
pub use offboarding::{OffboardError, OffboardingEngine, OffboardingReport, PlatformSelection};
pub use onboarding::{OnboardError, OnboardIdentity, OnboardingEngine, OnboardingReport};
pub use progress::{LifecycleProgress, StageReport, Summary};
