//! API request types.
//!
//! Lead bodies are not listed here: they arrive as raw JSON and go through
//! the server's validation layer field by field.

use serde::{Deserialize, Serialize};

// ============================================================================
// Sales Agent Requests
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateSalesAgentRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

// ============================================================================
// Lead Requests
// ============================================================================

/// Query string of `GET /leads`.
///
/// `salesAgent` and `tags` may repeat the key, carry comma-separated values,
/// or both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLeadsQuery {
    #[serde(default)]
    pub sales_agent: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub sort: Option<String>,
}

// ============================================================================
// Comment Requests
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentRequest {
    #[serde(default)]
    pub comment_text: Option<String>,
    /// Author; may be omitted when the lead has a single agent.
    #[serde(default)]
    pub agent_id: Option<String>,
}
