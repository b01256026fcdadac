//! Comment endpoints.
//!
//! Only agents assigned to a lead may comment on it. Both endpoints answer
//! with the lead's whole thread, oldest first.

use std::collections::HashMap;
use std::sync::Arc;

use api_protocol::{requests::AddCommentRequest, CommentView};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use entities::{Comment, Lead, SalesAgent};
use lead_store::LeadStore;
use uuid::Uuid;

use super::{agent_directory, parse_id};
use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Shown in place of an author that no longer exists.
const UNKNOWN_AUTHOR: &str = "Unknown";

fn comment_to_view(comment: &Comment, agents: &HashMap<Uuid, SalesAgent>) -> CommentView {
    CommentView {
        id: comment.id,
        comment_text: comment.text.clone(),
        author: agents
            .get(&comment.author_id)
            .map_or_else(|| UNKNOWN_AUTHOR.to_string(), |agent| agent.name.clone()),
        created_at: comment.created_at,
    }
}

/// Picks the comment author, enforcing lead assignment.
fn resolve_author(lead: &Lead, agent_id: Option<Uuid>) -> ServerResult<Uuid> {
    match (agent_id, lead.sales_agent_ids.as_slice()) {
        (Some(id), _) if lead.is_assigned_to(id) => Ok(id),
        (Some(id), _) => Err(ServerError::Forbidden(format!(
            "Sales agent '{id}' is not assigned to this lead"
        ))),
        (None, [only]) => Ok(*only),
        (None, _) => Err(ServerError::InvalidRequest(
            "'agentId' is required when a lead has several sales agents".to_string(),
        )),
    }
}

async fn thread<S: LeadStore>(store: &S, lead_id: Uuid) -> ServerResult<Vec<CommentView>> {
    let comments = store.list_comments(lead_id).await?;
    let agents = agent_directory(store).await?;
    Ok(comments
        .iter()
        .map(|comment| comment_to_view(comment, &agents))
        .collect())
}

/// Adds a comment to a lead and returns the updated thread.
pub async fn add_comment<S: LeadStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<AddCommentRequest>, JsonRejection>,
) -> ServerResult<Json<Vec<CommentView>>> {
    let lead_id = parse_id(&id, "lead")?;
    let Json(request) = payload?;

    let text = request
        .comment_text
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| {
            ServerError::InvalidRequest("'commentText' must be a non-empty string".to_string())
        })?;
    let agent_id = request
        .agent_id
        .as_deref()
        .map(|raw| parse_id(raw, "agent"))
        .transpose()?;

    let lead = state
        .store
        .get_lead(lead_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Lead not found".to_string()))?;

    let author_id = resolve_author(&lead, agent_id)?;
    let comment = state
        .store
        .create_comment(Comment::new(lead.id, author_id, text))
        .await?;

    tracing::info!(lead_id = %lead.id, comment_id = %comment.id, author_id = %author_id, "Comment added");

    Ok(Json(thread(&state.store, lead.id).await?))
}

/// Lists a lead's comment thread.
pub async fn list_comments<S: LeadStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> ServerResult<Json<Vec<CommentView>>> {
    let lead_id = parse_id(&id, "lead")?;

    state
        .store
        .get_lead(lead_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Lead not found".to_string()))?;

    Ok(Json(thread(&state.store, lead_id).await?))
}

#[cfg(test)]
mod tests {
    use entities::{LeadFields, LeadPriority, LeadSource, LeadStatus};

    use super::*;

    fn lead_with(agents: Vec<Uuid>) -> Lead {
        Lead::new(LeadFields {
            name: "Acme".to_string(),
            source: LeadSource::Referral,
            sales_agent_ids: agents,
            status: LeadStatus::New,
            tags: Vec::new(),
            time_to_close: 14,
            priority: LeadPriority::Medium,
        })
    }

    #[test]
    fn test_resolve_author() {
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

        let solo = lead_with(vec![alice]);
        assert_eq!(resolve_author(&solo, None).unwrap(), alice);
        assert_eq!(resolve_author(&solo, Some(alice)).unwrap(), alice);
        assert!(matches!(
            resolve_author(&solo, Some(bob)),
            Err(ServerError::Forbidden(_))
        ));

        let pair = lead_with(vec![alice, bob]);
        assert_eq!(resolve_author(&pair, Some(bob)).unwrap(), bob);
        assert!(matches!(
            resolve_author(&pair, None),
            Err(ServerError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_unknown_author() {
        let comment = Comment::new(Uuid::new_v4(), Uuid::new_v4(), "Called them");
        let view = comment_to_view(&comment, &HashMap::new());
        assert_eq!(view.author, UNKNOWN_AUTHOR);
        assert_eq!(view.comment_text, "Called them");
    }
}
