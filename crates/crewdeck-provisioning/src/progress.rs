//! Per-stage progress bookkeeping for lifecycle runs.
//!
//! The progress report is the only record a run leaves behind: it
//! exists solely in the response payload, so it carries everything an
//! operator needs: status, platform data and the caught error message
//! per stage.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crewdeck_core::StageStatus;

/// Outcome of a single platform stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageReport {
    pub status: StageStatus,
    /// Platform data produced by a successful stage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Caught error message of a failed stage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Operator-facing note (e.g. manual follow-up needed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl StageReport {
    #[must_use]
    pub fn pending() -> Self {
        Self {
            status: StageStatus::Pending,
            data: None,
            error: None,
            note: None,
        }
    }

    #[must_use]
    pub fn skipped() -> Self {
        Self {
            status: StageStatus::Skipped,
            data: None,
            error: None,
            note: None,
        }
    }

    #[must_use]
    pub fn success(data: Value) -> Self {
        Self {
            status: StageStatus::Success,
            data: Some(data),
            error: None,
            note: None,
        }
    }

    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: StageStatus::Failed,
            data: None,
            error: Some(error.into()),
            note: None,
        }
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Collapse a stage result into a report.
    #[must_use]
    pub fn from_result(result: Result<Value, crewdeck_connector::ConnectorError>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(err) => Self::failed(err.to_string()),
        }
    }
}

impl Default for StageReport {
    fn default() -> Self {
        Self::pending()
    }
}

/// Ordered per-platform progress of one lifecycle run.
///
/// The field order is the stage order; serialization preserves it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LifecycleProgress {
    pub directory: StageReport,
    pub scheduling: StageReport,
    pub video: StageReport,
    pub telephony: StageReport,
    pub crm: StageReport,
}

impl LifecycleProgress {
    /// All five reports in stage order.
    fn reports(&self) -> [&StageReport; 5] {
        [
            &self.directory,
            &self.scheduling,
            &self.video,
            &self.telephony,
            &self.crm,
        ]
    }

    /// Count stage outcomes into a summary.
    #[must_use]
    pub fn summarize(&self) -> Summary {
        let reports = self.reports();
        let successful = reports
            .iter()
            .filter(|r| r.status == StageStatus::Success)
            .count();
        let failed = reports
            .iter()
            .filter(|r| r.status == StageStatus::Failed)
            .count();
        let skipped = reports
            .iter()
            .filter(|r| r.status == StageStatus::Skipped)
            .count();
        Summary {
            total: reports.len() - skipped,
            successful,
            failed,
            skipped,
        }
    }
}

/// Success/failure counts for a lifecycle run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Stages that were selected to run.
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
}
