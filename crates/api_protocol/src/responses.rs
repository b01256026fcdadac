//! API response types.

use entities::LeadStatus;
use serde::{Deserialize, Serialize};

/// Confirmation body for deletes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Report Responses
// ============================================================================

/// Body of `GET /report/summary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    /// Leads closed in the trailing seven days.
    pub closed_last_week: u64,
    /// Leads not yet closed.
    pub pipeline_leads: u64,
}

/// One row of `GET /report/by-agent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentClosedCount {
    /// Agent name.
    pub sales_agent: String,
    pub count: u64,
}

/// One row of `GET /report/status-distribution`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: LeadStatus,
    pub count: u64,
}
