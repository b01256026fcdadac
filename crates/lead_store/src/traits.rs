//! Lead store trait definitions.

use async_trait::async_trait;
use entities::{Comment, Lead, LeadSource, LeadStatus, SalesAgent, Tag};
use uuid::Uuid;

use crate::LeadStoreResult;

/// Ordering of listed leads by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeadOrder {
    /// Oldest first.
    #[default]
    Oldest,
    /// Newest first.
    Newest,
}

impl LeadOrder {
    /// Parses an order from its query-string name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "oldest" => Some(Self::Oldest),
            "newest" => Some(Self::Newest),
            _ => None,
        }
    }
}

/// Filter options for listing leads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadFilter {
    /// Match leads assigned to any of these agents.
    pub sales_agent_ids: Vec<Uuid>,
    /// Filter by status.
    pub status: Option<LeadStatus>,
    /// Filter by source.
    pub source: Option<LeadSource>,
    /// Match leads carrying all of these tags.
    pub tags: Vec<String>,
    /// Result ordering.
    pub order: LeadOrder,
}

impl LeadFilter {
    /// Creates an empty filter that matches every lead.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to leads assigned to one of `ids`.
    pub fn with_sales_agents(mut self, ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.sales_agent_ids.extend(ids);
        self
    }

    /// Restricts to a status.
    pub fn with_status(mut self, status: LeadStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts to a source.
    pub fn with_source(mut self, source: LeadSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Restricts to leads carrying every tag in `tags`.
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.tags.extend(tags);
        self
    }

    /// Sets the result ordering.
    pub fn with_order(mut self, order: LeadOrder) -> Self {
        self.order = order;
        self
    }

    /// Returns true if `lead` passes every predicate of this filter.
    pub fn matches(&self, lead: &Lead) -> bool {
        (self.sales_agent_ids.is_empty()
            || self.sales_agent_ids.iter().any(|id| lead.is_assigned_to(*id)))
            && self.status.is_none_or(|s| lead.status == s)
            && self.source.is_none_or(|s| lead.source == s)
            && lead.has_all_tags(&self.tags)
    }

    /// Sorts `leads` in place according to [`LeadFilter::order`].
    pub fn sort(&self, leads: &mut [Lead]) {
        leads.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        if self.order == LeadOrder::Newest {
            leads.reverse();
        }
    }
}

/// Trait for lead storage operations.
#[async_trait]
pub trait LeadStore: Send + Sync {
    // =========================================================================
    // Sales agent operations
    // =========================================================================

    /// Creates a new sales agent. Fails if the email is already taken.
    async fn create_sales_agent(&self, agent: SalesAgent) -> LeadStoreResult<SalesAgent>;

    /// Gets a sales agent by ID.
    async fn get_sales_agent(&self, id: Uuid) -> LeadStoreResult<Option<SalesAgent>>;

    /// Gets a sales agent by email, ignoring case.
    async fn get_sales_agent_by_email(&self, email: &str) -> LeadStoreResult<Option<SalesAgent>>;

    /// Lists all sales agents, oldest first.
    async fn list_sales_agents(&self) -> LeadStoreResult<Vec<SalesAgent>>;

    /// Deletes a sales agent.
    async fn delete_sales_agent(&self, id: Uuid) -> LeadStoreResult<()>;

    // =========================================================================
    // Lead operations
    // =========================================================================

    /// Creates a new lead.
    async fn create_lead(&self, lead: Lead) -> LeadStoreResult<Lead>;

    /// Gets a lead by ID.
    async fn get_lead(&self, id: Uuid) -> LeadStoreResult<Option<Lead>>;

    /// Lists leads matching the filter.
    async fn list_leads(&self, filter: LeadFilter) -> LeadStoreResult<Vec<Lead>>;

    /// Replaces a stored lead.
    async fn update_lead(&self, lead: Lead) -> LeadStoreResult<Lead>;

    /// Deletes a lead together with its comments.
    async fn delete_lead(&self, id: Uuid) -> LeadStoreResult<()>;

    // =========================================================================
    // Comment operations
    // =========================================================================

    /// Creates a new comment.
    async fn create_comment(&self, comment: Comment) -> LeadStoreResult<Comment>;

    /// Lists the comments of a lead, oldest first.
    async fn list_comments(&self, lead_id: Uuid) -> LeadStoreResult<Vec<Comment>>;

    // =========================================================================
    // Tag operations
    // =========================================================================

    /// Creates a new tag. Fails if the name is already taken.
    async fn create_tag(&self, tag: Tag) -> LeadStoreResult<Tag>;

    /// Lists all tags by name.
    async fn list_tags(&self) -> LeadStoreResult<Vec<Tag>>;

    /// Adds every name in `names` that is not yet in the vocabulary.
    ///
    /// Returns the number of tags created.
    async fn seed_tags(&self, names: &[String]) -> LeadStoreResult<usize> {
        let existing = self.list_tags().await?;
        let mut created = 0;
        for name in names {
            if existing.iter().any(|tag| &tag.name == name) {
                continue;
            }
            self.create_tag(Tag::new(name.clone())).await?;
            created += 1;
        }
        Ok(created)
    }
}

/// Sorts comments into thread order.
///
/// The sort is stable: comments sharing a timestamp stay in the order the
/// caller passed them, which both stores keep as insertion order.
pub(crate) fn sort_thread(comments: &mut [Comment]) {
    comments.sort_by_key(|comment| comment.created_at);
}

/// Sorts agents by creation.
pub(crate) fn sort_agents(agents: &mut [SalesAgent]) {
    agents.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
}
