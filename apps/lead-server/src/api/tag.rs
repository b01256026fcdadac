//! Tag endpoints.

use std::sync::Arc;

use axum::{extract::State, Json};
use lead_store::LeadStore;

use crate::error::ServerResult;
use crate::state::AppState;

/// Lists tag names alphabetically.
pub async fn list_tags<S: LeadStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ServerResult<Json<Vec<String>>> {
    let tags = state.store.list_tags().await?;
    Ok(Json(tags.into_iter().map(|tag| tag.name).collect()))
}
