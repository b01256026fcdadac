//! Comment entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A timestamped note on a lead, written by one of its assigned agents.
///
/// Comments are never edited or deleted on their own; they go away with
/// their lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Unique identifier.
    pub id: Uuid,
    /// Lead this comment belongs to.
    pub lead_id: Uuid,
    /// Sales agent who wrote it.
    pub author_id: Uuid,
    /// Comment body.
    pub text: String,
    /// When this record was created. Threads sort on it.
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Creates a new comment.
    pub fn new(lead_id: Uuid, author_id: Uuid, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            lead_id,
            author_id,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}
