//! In-memory lead store implementation for testing.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use entities::{Comment, Lead, SalesAgent, Tag};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    traits::{sort_agents, sort_thread},
    LeadFilter, LeadStore, LeadStoreError, LeadStoreResult,
};

/// In-memory lead store for tests and development.
#[derive(Debug, Default)]
pub struct MemoryLeadStore {
    sales_agents: Arc<RwLock<HashMap<Uuid, SalesAgent>>>,
    leads: Arc<RwLock<HashMap<Uuid, Lead>>>,
    /// Kept in insertion order; threads rely on it for timestamp ties.
    comments: Arc<RwLock<Vec<Comment>>>,
    tags: Arc<RwLock<HashMap<Uuid, Tag>>>,
}

impl MemoryLeadStore {
    /// Creates a new in-memory lead store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeadStore for MemoryLeadStore {
    // =========================================================================
    // Sales agent operations
    // =========================================================================

    async fn create_sales_agent(&self, agent: SalesAgent) -> LeadStoreResult<SalesAgent> {
        let mut agents = self.sales_agents.write().await;
        if agents.contains_key(&agent.id) {
            return Err(LeadStoreError::already_exists(
                "SalesAgent",
                agent.id.to_string(),
            ));
        }
        if agents.values().any(|a| a.has_email(&agent.email)) {
            return Err(LeadStoreError::already_exists("SalesAgent", agent.email));
        }
        agents.insert(agent.id, agent.clone());
        Ok(agent)
    }

    async fn get_sales_agent(&self, id: Uuid) -> LeadStoreResult<Option<SalesAgent>> {
        let agents = self.sales_agents.read().await;
        Ok(agents.get(&id).cloned())
    }

    async fn get_sales_agent_by_email(&self, email: &str) -> LeadStoreResult<Option<SalesAgent>> {
        let agents = self.sales_agents.read().await;
        Ok(agents.values().find(|a| a.has_email(email)).cloned())
    }

    async fn list_sales_agents(&self) -> LeadStoreResult<Vec<SalesAgent>> {
        let agents = self.sales_agents.read().await;
        let mut result: Vec<SalesAgent> = agents.values().cloned().collect();
        sort_agents(&mut result);
        Ok(result)
    }

    async fn delete_sales_agent(&self, id: Uuid) -> LeadStoreResult<()> {
        let mut agents = self.sales_agents.write().await;
        if agents.remove(&id).is_none() {
            return Err(LeadStoreError::not_found("SalesAgent", id.to_string()));
        }
        Ok(())
    }

    // =========================================================================
    // Lead operations
    // =========================================================================

    async fn create_lead(&self, lead: Lead) -> LeadStoreResult<Lead> {
        let mut leads = self.leads.write().await;
        if leads.contains_key(&lead.id) {
            return Err(LeadStoreError::already_exists("Lead", lead.id.to_string()));
        }
        leads.insert(lead.id, lead.clone());
        Ok(lead)
    }

    async fn get_lead(&self, id: Uuid) -> LeadStoreResult<Option<Lead>> {
        let leads = self.leads.read().await;
        Ok(leads.get(&id).cloned())
    }

    async fn list_leads(&self, filter: LeadFilter) -> LeadStoreResult<Vec<Lead>> {
        let leads = self.leads.read().await;
        let mut result: Vec<Lead> = leads
            .values()
            .filter(|l| filter.matches(l))
            .cloned()
            .collect();
        filter.sort(&mut result);
        Ok(result)
    }

    async fn update_lead(&self, lead: Lead) -> LeadStoreResult<Lead> {
        let mut leads = self.leads.write().await;
        if !leads.contains_key(&lead.id) {
            return Err(LeadStoreError::not_found("Lead", lead.id.to_string()));
        }
        leads.insert(lead.id, lead.clone());
        Ok(lead)
    }

    async fn delete_lead(&self, id: Uuid) -> LeadStoreResult<()> {
        let mut leads = self.leads.write().await;
        let mut comments = self.comments.write().await;
        if leads.remove(&id).is_none() {
            return Err(LeadStoreError::not_found("Lead", id.to_string()));
        }
        comments.retain(|c| c.lead_id != id);
        Ok(())
    }

    // =========================================================================
    // Comment operations
    // =========================================================================

    async fn create_comment(&self, comment: Comment) -> LeadStoreResult<Comment> {
        let mut comments = self.comments.write().await;
        if comments.iter().any(|c| c.id == comment.id) {
            return Err(LeadStoreError::already_exists(
                "Comment",
                comment.id.to_string(),
            ));
        }
        comments.push(comment.clone());
        Ok(comment)
    }

    async fn list_comments(&self, lead_id: Uuid) -> LeadStoreResult<Vec<Comment>> {
        let comments = self.comments.read().await;
        let mut result: Vec<Comment> = comments
            .iter()
            .filter(|c| c.lead_id == lead_id)
            .cloned()
            .collect();
        sort_thread(&mut result);
        Ok(result)
    }

    // =========================================================================
    // Tag operations
    // =========================================================================

    async fn create_tag(&self, tag: Tag) -> LeadStoreResult<Tag> {
        let mut tags = self.tags.write().await;
        if tags.values().any(|t| t.name == tag.name) {
            return Err(LeadStoreError::already_exists("Tag", tag.name));
        }
        tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    async fn list_tags(&self) -> LeadStoreResult<Vec<Tag>> {
        let tags = self.tags.read().await;
        let mut result: Vec<Tag> = tags.values().cloned().collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }
}
