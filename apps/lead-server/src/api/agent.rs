//! Sales agent endpoints.

use std::sync::Arc;

use api_protocol::{requests::CreateSalesAgentRequest, responses::MessageResponse, SalesAgentView};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use entities::SalesAgent;
use lead_store::{LeadFilter, LeadStore};

use super::parse_id;
use crate::error::{ServerError, ServerResult};
use crate::state::AppState;
use crate::validation::validate_sales_agent;

fn agent_to_view(agent: &SalesAgent) -> SalesAgentView {
    SalesAgentView {
        id: agent.id,
        name: agent.name.clone(),
        email: agent.email.clone(),
        created_at: agent.created_at,
    }
}

/// Creates a new sales agent.
pub async fn create_sales_agent<S: LeadStore>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<CreateSalesAgentRequest>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<SalesAgentView>)> {
    let Json(request) = payload?;
    let (name, email) = validate_sales_agent(request.name.as_deref(), request.email.as_deref())?;

    if state.store.get_sales_agent_by_email(&email).await?.is_some() {
        return Err(ServerError::Conflict(format!(
            "Sales agent with email '{email}' already exists"
        )));
    }

    let agent = state
        .store
        .create_sales_agent(SalesAgent::new(name, email))
        .await?;

    tracing::info!(agent_id = %agent.id, "Sales agent created");

    Ok((StatusCode::CREATED, Json(agent_to_view(&agent))))
}

/// Lists all sales agents.
pub async fn list_sales_agents<S: LeadStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ServerResult<Json<Vec<SalesAgentView>>> {
    let agents = state.store.list_sales_agents().await?;
    Ok(Json(agents.iter().map(agent_to_view).collect()))
}

/// Deletes a sales agent that no lead references.
pub async fn delete_sales_agent<S: LeadStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> ServerResult<Json<MessageResponse>> {
    let id = parse_id(&id, "sales agent")?;

    state
        .store
        .get_sales_agent(id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Sales agent not found".to_string()))?;

    let assigned = state
        .store
        .list_leads(LeadFilter::new().with_sales_agents([id]))
        .await?;
    if !assigned.is_empty() {
        return Err(ServerError::Conflict(format!(
            "Sales agent is still assigned to {} lead(s)",
            assigned.len()
        )));
    }

    state.store.delete_sales_agent(id).await?;

    tracing::info!(agent_id = %id, "Sales agent deleted");

    Ok(Json(MessageResponse::new("Sales agent deleted successfully")))
}
