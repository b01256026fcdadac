//! API endpoints.

pub mod agent;
pub mod comment;
pub mod lead;
pub mod report;
pub mod tag;

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};
use entities::SalesAgent;
use lead_store::LeadStore;
use uuid::Uuid;

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router<S: LeadStore + 'static>() -> Router<Arc<AppState<S>>> {
    Router::new()
        // Lead endpoints
        .route("/leads", post(lead::create_lead).get(lead::list_leads))
        .route(
            "/leads/:id",
            get(lead::get_lead)
                .put(lead::update_lead)
                .delete(lead::delete_lead),
        )
        // Comment endpoints
        .route(
            "/leads/:id/comments",
            post(comment::add_comment).get(comment::list_comments),
        )
        // Sales agent endpoints
        .route(
            "/sales-agents",
            post(agent::create_sales_agent).get(agent::list_sales_agents),
        )
        .route("/sales-agents/:id", delete(agent::delete_sales_agent))
        .route(
            "/agents",
            post(agent::create_sales_agent).get(agent::list_sales_agents),
        )
        .route("/agents/:id", delete(agent::delete_sales_agent))
        // Tag endpoints
        .route("/tags", get(tag::list_tags))
        // Report endpoints
        .route("/report/summary", get(report::summary))
        .route("/report/by-agent", get(report::by_agent))
        .route(
            "/report/status-distribution",
            get(report::status_distribution),
        )
        // Health check
        .route("/health", get(health_check))
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

/// Parses an identifier taken from a path segment or request body.
pub(crate) fn parse_id(raw: &str, what: &str) -> ServerResult<Uuid> {
    raw.trim()
        .parse()
        .map_err(|_| ServerError::InvalidId(format!("Invalid {what} id: '{raw}'")))
}

/// Loads every sales agent keyed by id, for expanding references.
pub(crate) async fn agent_directory<S: LeadStore>(
    store: &S,
) -> ServerResult<HashMap<Uuid, SalesAgent>> {
    let agents = store.list_sales_agents().await?;
    Ok(agents.into_iter().map(|agent| (agent.id, agent)).collect())
}
