//! Report endpoints.

use std::sync::Arc;

use api_protocol::responses::{AgentClosedCount, StatusCount, SummaryReport};
use axum::{extract::State, Json};
use chrono::Utc;
use lead_store::{LeadFilter, LeadStore};

use crate::error::ServerResult;
use crate::reporting;
use crate::state::AppState;

/// Closed-last-week and pipeline counts.
pub async fn summary<S: LeadStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ServerResult<Json<SummaryReport>> {
    let leads = state.store.list_leads(LeadFilter::new()).await?;
    Ok(Json(reporting::summarize(&leads, Utc::now())))
}

/// Closed leads per agent.
pub async fn by_agent<S: LeadStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ServerResult<Json<Vec<AgentClosedCount>>> {
    let leads = state.store.list_leads(LeadFilter::new()).await?;
    let agents = state.store.list_sales_agents().await?;
    Ok(Json(reporting::closed_by_agent(&leads, &agents)))
}

/// Open leads per status.
pub async fn status_distribution<S: LeadStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ServerResult<Json<Vec<StatusCount>>> {
    let leads = state.store.list_leads(LeadFilter::new()).await?;
    Ok(Json(reporting::status_distribution(&leads)))
}
