//! API view types.

use chrono::{DateTime, Utc};
use entities::{LeadPriority, LeadSource, LeadStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Short form of a sales agent embedded in a lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub id: Uuid,
    pub name: String,
}

/// A sales agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesAgentView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A lead with its agents expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadView {
    pub id: Uuid,
    pub name: String,
    pub source: LeadSource,
    pub sales_agent: Vec<AgentSummary>,
    pub status: LeadStatus,
    pub tags: Vec<String>,
    pub time_to_close: u64,
    pub priority: LeadPriority,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One entry of a comment thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: Uuid,
    pub comment_text: String,
    /// Author name, or "Unknown" when the agent no longer exists.
    pub author: String,
    pub created_at: DateTime<Utc>,
}
