//! Sales agent entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A person who owns and comments on leads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesAgent {
    /// Unique identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Email address, unique ignoring case.
    pub email: String,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
}

impl SalesAgent {
    /// Creates a new sales agent.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            created_at: Utc::now(),
        }
    }

    /// Returns true if `email` belongs to this agent, ignoring case.
    pub fn has_email(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email)
    }
}
