//! Lead entity definitions.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Channel a lead came in through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeadSource {
    /// Inbound from the website.
    Website,
    /// Referred by an existing contact.
    Referral,
    /// Responded to an advertisement.
    Advertisement,
    /// Reached through cold calling.
    #[serde(rename = "Cold Call")]
    ColdCall,
    /// Reached through email outreach.
    Email,
    /// Anything else.
    Other,
}

impl LeadSource {
    /// Every source, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Website,
        Self::Referral,
        Self::Advertisement,
        Self::ColdCall,
        Self::Email,
        Self::Other,
    ];

    /// Returns the wire name of the source.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Website => "Website",
            Self::Referral => "Referral",
            Self::Advertisement => "Advertisement",
            Self::ColdCall => "Cold Call",
            Self::Email => "Email",
            Self::Other => "Other",
        }
    }

    /// Parses a source from its wire name.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|source| source.as_str() == s)
    }

    /// Returns all wire names.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Self::as_str).collect()
    }
}

impl fmt::Display for LeadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a lead in the sales pipeline.
///
/// Any status may be set from any other; only entering `Closed` has a side
/// effect (see [`Lead::apply_changes`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LeadStatus {
    /// Freshly created.
    New,
    /// First contact made.
    Contacted,
    /// Qualified as a real opportunity.
    Qualified,
    /// A proposal has been sent.
    #[serde(rename = "Proposal Sent")]
    ProposalSent,
    /// Deal closed.
    Closed,
}

impl LeadStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::New,
        Self::Contacted,
        Self::Qualified,
        Self::ProposalSent,
        Self::Closed,
    ];

    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Contacted => "Contacted",
            Self::Qualified => "Qualified",
            Self::ProposalSent => "Proposal Sent",
            Self::Closed => "Closed",
        }
    }

    /// Parses a status from its wire name.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }

    /// Returns all wire names.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Self::as_str).collect()
    }

    /// Returns true for the terminal `Closed` status.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How urgently a lead should be worked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeadPriority {
    Low,
    Medium,
    High,
}

impl LeadPriority {
    /// Every priority, lowest first.
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Returns the wire name of the priority.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Parses a priority from its wire name.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|priority| priority.as_str() == s)
    }

    /// Returns all wire names.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Self::as_str).collect()
    }
}

impl fmt::Display for LeadPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user-editable fields of a lead, already validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadFields {
    pub name: String,
    pub source: LeadSource,
    pub sales_agent_ids: Vec<Uuid>,
    pub status: LeadStatus,
    pub tags: Vec<String>,
    pub time_to_close: u64,
    pub priority: LeadPriority,
}

/// A prospective sales opportunity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    /// Unique identifier.
    pub id: Uuid,
    /// Lead name (usually the prospect's company).
    pub name: String,
    /// Where the lead came from.
    pub source: LeadSource,
    /// Assigned sales agents. Never empty.
    pub sales_agent_ids: Vec<Uuid>,
    /// Current pipeline status.
    pub status: LeadStatus,
    /// Classification labels.
    pub tags: Vec<String>,
    /// Estimated days to close.
    pub time_to_close: u64,
    /// Work priority.
    pub priority: LeadPriority,
    /// When the lead last entered `Closed`.
    pub closed_at: Option<DateTime<Utc>>,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    /// Creates a new lead from validated fields.
    pub fn new(fields: LeadFields) -> Self {
        Self::new_at(fields, Utc::now())
    }

    /// Creates a new lead as of `now`.
    ///
    /// A lead created directly as `Closed` counts as entering `Closed`, so
    /// `closed_at` is stamped.
    pub fn new_at(fields: LeadFields, now: DateTime<Utc>) -> Self {
        let closed_at = fields.status.is_closed().then_some(now);
        Self {
            id: Uuid::new_v4(),
            name: fields.name,
            source: fields.source,
            sales_agent_ids: fields.sales_agent_ids,
            status: fields.status,
            tags: fields.tags,
            time_to_close: fields.time_to_close,
            priority: fields.priority,
            closed_at,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the editable fields as of `now`.
    ///
    /// `closed_at` is stamped only on the edge from a non-closed status into
    /// `Closed`; a closed-to-closed update keeps the first timestamp.
    /// Returns true when this update closed the lead.
    pub fn apply_changes(&mut self, fields: LeadFields, now: DateTime<Utc>) -> bool {
        let closing = !self.status.is_closed() && fields.status.is_closed();
        if closing {
            self.closed_at = Some(now);
        }

        self.name = fields.name;
        self.source = fields.source;
        self.sales_agent_ids = fields.sales_agent_ids;
        self.status = fields.status;
        self.tags = fields.tags;
        self.time_to_close = fields.time_to_close;
        self.priority = fields.priority;
        self.updated_at = now;

        closing
    }

    /// Returns true if the agent is assigned to this lead.
    pub fn is_assigned_to(&self, agent_id: Uuid) -> bool {
        self.sales_agent_ids.contains(&agent_id)
    }

    /// Returns true if the lead carries every one of `tags`.
    pub fn has_all_tags(&self, tags: &[String]) -> bool {
        tags.iter().all(|tag| self.tags.contains(tag))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn fields(status: LeadStatus) -> LeadFields {
        LeadFields {
            name: "Acme".to_string(),
            source: LeadSource::Website,
            sales_agent_ids: vec![Uuid::new_v4()],
            status,
            tags: vec!["hot".to_string()],
            time_to_close: 10,
            priority: LeadPriority::High,
        }
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(LeadSource::parse("Cold Call"), Some(LeadSource::ColdCall));
        assert_eq!(LeadSource::parse("cold call"), None);
        assert_eq!(
            LeadStatus::parse("Proposal Sent"),
            Some(LeadStatus::ProposalSent)
        );
        assert_eq!(LeadPriority::parse("Urgent"), None);

        let json = serde_json::to_string(&LeadStatus::ProposalSent).unwrap();
        assert_eq!(json, "\"Proposal Sent\"");
        let source: LeadSource = serde_json::from_str("\"Cold Call\"").unwrap();
        assert_eq!(source, LeadSource::ColdCall);
    }

    #[test]
    fn test_new_lead_is_open() {
        let lead = Lead::new(fields(LeadStatus::New));
        assert_eq!(lead.status, LeadStatus::New);
        assert!(lead.closed_at.is_none());
        assert_eq!(lead.created_at, lead.updated_at);
    }

    #[test]
    fn test_new_closed_lead_is_stamped() {
        let now = Utc::now();
        let lead = Lead::new_at(fields(LeadStatus::Closed), now);
        assert_eq!(lead.closed_at, Some(now));
    }

    #[test]
    fn test_closing_stamps_closed_at() {
        let created = Utc::now() - Duration::days(3);
        let mut lead = Lead::new_at(fields(LeadStatus::Qualified), created);

        let now = Utc::now();
        let closed = lead.apply_changes(fields(LeadStatus::Closed), now);

        assert!(closed);
        assert_eq!(lead.closed_at, Some(now));
        assert_eq!(lead.created_at, created);
        assert_eq!(lead.updated_at, now);
    }

    #[test]
    fn test_closed_to_closed_keeps_closed_at() {
        let first = Utc::now() - Duration::days(2);
        let mut lead = Lead::new_at(fields(LeadStatus::New), first);
        lead.apply_changes(fields(LeadStatus::Closed), first);

        let mut renamed = fields(LeadStatus::Closed);
        renamed.name = "Acme Corp".to_string();
        let closed = lead.apply_changes(renamed, Utc::now());

        assert!(!closed);
        assert_eq!(lead.closed_at, Some(first));
        assert_eq!(lead.name, "Acme Corp");
    }

    #[test]
    fn test_reopen_keeps_history_and_reclose_restamps() {
        let first = Utc::now() - Duration::days(10);
        let mut lead = Lead::new_at(fields(LeadStatus::New), first);
        lead.apply_changes(fields(LeadStatus::Closed), first);

        lead.apply_changes(fields(LeadStatus::Contacted), Utc::now());
        assert_eq!(lead.closed_at, Some(first));

        let again = Utc::now();
        assert!(lead.apply_changes(fields(LeadStatus::Closed), again));
        assert_eq!(lead.closed_at, Some(again));
    }

    #[test]
    fn test_tag_and_assignment_helpers() {
        let mut lead = Lead::new(fields(LeadStatus::New));
        lead.tags = vec!["hot".to_string(), "enterprise".to_string()];

        assert!(lead.has_all_tags(&["hot".to_string()]));
        assert!(lead.has_all_tags(&["hot".to_string(), "enterprise".to_string()]));
        assert!(!lead.has_all_tags(&["hot".to_string(), "cold".to_string()]));
        assert!(lead.has_all_tags(&[]));

        let agent = lead.sales_agent_ids[0];
        assert!(lead.is_assigned_to(agent));
        assert!(!lead.is_assigned_to(Uuid::new_v4()));
    }
}
