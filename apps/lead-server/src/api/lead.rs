//! Lead endpoints.

use std::collections::HashMap;
use std::sync::Arc;

use api_protocol::{
    requests::ListLeadsQuery,
    responses::MessageResponse,
    AgentSummary, LeadView,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::{Query, QueryRejection};
use chrono::Utc;
use entities::{Lead, LeadSource, LeadStatus, SalesAgent};
use lead_store::{LeadFilter, LeadOrder, LeadStore};
use serde_json::Value;
use uuid::Uuid;

use super::{agent_directory, parse_id};
use crate::config::parse_list;
use crate::error::{ServerError, ServerResult};
use crate::state::AppState;
use crate::validation::{merge_lead_payload, validate_lead};

/// Converts a lead to its wire form, expanding agents found in `agents`.
pub(crate) fn lead_to_view(lead: &Lead, agents: &HashMap<Uuid, SalesAgent>) -> LeadView {
    LeadView {
        id: lead.id,
        name: lead.name.clone(),
        source: lead.source,
        sales_agent: lead
            .sales_agent_ids
            .iter()
            .filter_map(|id| agents.get(id))
            .map(|agent| AgentSummary {
                id: agent.id,
                name: agent.name.clone(),
            })
            .collect(),
        status: lead.status,
        tags: lead.tags.clone(),
        time_to_close: lead.time_to_close,
        priority: lead.priority,
        closed_at: lead.closed_at,
        created_at: lead.created_at,
        updated_at: lead.updated_at,
    }
}

/// Resolves every referenced agent, failing on the first unknown id.
async fn resolve_agents<S: LeadStore>(
    store: &S,
    ids: &[Uuid],
) -> ServerResult<HashMap<Uuid, SalesAgent>> {
    let mut agents = HashMap::with_capacity(ids.len());
    for id in ids {
        let agent = store
            .get_sales_agent(*id)
            .await?
            .ok_or_else(|| ServerError::NotFound(format!("Sales agent with ID '{id}' not found")))?;
        agents.insert(agent.id, agent);
    }
    Ok(agents)
}

async fn load_lead<S: LeadStore>(store: &S, id: Uuid) -> ServerResult<Lead> {
    store
        .get_lead(id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Lead not found".to_string()))
}

/// Builds a store filter from the query string. Empty values are ignored.
fn lead_filter(query: &ListLeadsQuery) -> ServerResult<LeadFilter> {
    let mut filter = LeadFilter::new();

    let ids = split_values(&query.sales_agent)
        .iter()
        .map(|id| {
            id.parse::<Uuid>().map_err(|_| {
                ServerError::InvalidReference(format!("Invalid salesAgent id: '{id}'"))
            })
        })
        .collect::<ServerResult<Vec<_>>>()?;
    filter = filter.with_sales_agents(ids);

    if let Some(raw) = non_empty(query.status.as_deref()) {
        let status = LeadStatus::parse(raw).ok_or_else(|| {
            ServerError::InvalidRequest(format!(
                "Invalid status filter '{raw}'. Must be one of: {}",
                LeadStatus::names().join(", ")
            ))
        })?;
        filter = filter.with_status(status);
    }

    if let Some(raw) = non_empty(query.source.as_deref()) {
        let source = LeadSource::parse(raw).ok_or_else(|| {
            ServerError::InvalidRequest(format!(
                "Invalid source filter '{raw}'. Must be one of: {}",
                LeadSource::names().join(", ")
            ))
        })?;
        filter = filter.with_source(source);
    }

    filter = filter.with_tags(split_values(&query.tags));

    if let Some(raw) = non_empty(query.sort.as_deref()) {
        let order = LeadOrder::parse(raw).ok_or_else(|| {
            ServerError::InvalidRequest(format!(
                "Invalid sort '{raw}'. Must be 'newest' or 'oldest'"
            ))
        })?;
        filter = filter.with_order(order);
    }

    Ok(filter)
}

/// Flattens repeated and comma-separated query values.
fn split_values(values: &[String]) -> Vec<String> {
    values.iter().flat_map(|value| parse_list(value)).collect()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Creates a new lead.
pub async fn create_lead<S: LeadStore>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<LeadView>)> {
    let Json(payload) = payload?;
    if !payload.is_object() {
        return Err(ServerError::InvalidRequest(
            "Request body must be a JSON object".to_string(),
        ));
    }

    let fields = validate_lead(&payload)?;
    let agents = resolve_agents(&state.store, &fields.sales_agent_ids).await?;

    let lead = state.store.create_lead(Lead::new(fields)).await?;

    tracing::info!(lead_id = %lead.id, status = %lead.status, "Lead created");

    Ok((StatusCode::CREATED, Json(lead_to_view(&lead, &agents))))
}

/// Lists leads matching the query filters.
pub async fn list_leads<S: LeadStore>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<ListLeadsQuery>, QueryRejection>,
) -> ServerResult<Json<Vec<LeadView>>> {
    let Query(query) = query?;
    let filter = lead_filter(&query)?;

    let leads = state.store.list_leads(filter).await?;
    let agents = agent_directory(&state.store).await?;

    Ok(Json(
        leads.iter().map(|lead| lead_to_view(lead, &agents)).collect(),
    ))
}

/// Gets a lead by ID.
pub async fn get_lead<S: LeadStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> ServerResult<Json<LeadView>> {
    let id = parse_id(&id, "lead")?;
    let lead = load_lead(&state.store, id).await?;
    let agents = agent_directory(&state.store).await?;

    Ok(Json(lead_to_view(&lead, &agents)))
}

/// Updates a lead with a full or partial payload.
pub async fn update_lead<S: LeadStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ServerResult<Json<LeadView>> {
    let id = parse_id(&id, "lead")?;
    let Json(payload) = payload?;
    let patch = payload.as_object().ok_or_else(|| {
        ServerError::InvalidRequest("Request body must be a JSON object".to_string())
    })?;

    let mut lead = load_lead(&state.store, id).await?;

    let fields = validate_lead(&merge_lead_payload(&lead, patch))?;
    let agents = resolve_agents(&state.store, &fields.sales_agent_ids).await?;

    let closed = lead.apply_changes(fields, Utc::now());
    let lead = state.store.update_lead(lead).await?;

    if closed {
        tracing::info!(lead_id = %lead.id, closed_at = ?lead.closed_at, "Lead closed");
    } else {
        tracing::info!(lead_id = %lead.id, status = %lead.status, "Lead updated");
    }

    Ok(Json(lead_to_view(&lead, &agents)))
}

/// Deletes a lead and its comments.
pub async fn delete_lead<S: LeadStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> ServerResult<Json<MessageResponse>> {
    let id = parse_id(&id, "lead")?;

    // Verify lead exists
    load_lead(&state.store, id).await?;

    state.store.delete_lead(id).await?;

    tracing::info!(lead_id = %id, "Lead deleted");

    Ok(Json(MessageResponse::new("Lead deleted successfully")))
}
