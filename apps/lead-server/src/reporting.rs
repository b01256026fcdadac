//! Pipeline report aggregations.
//!
//! These run over a snapshot of the lead collection. `now` is passed in so
//! the trailing window can be pinned in tests.

use std::collections::HashMap;

use api_protocol::responses::{AgentClosedCount, StatusCount, SummaryReport};
use chrono::{DateTime, Duration, Utc};
use entities::{Lead, LeadStatus, SalesAgent};
use uuid::Uuid;

/// Length of the "closed last week" window.
pub const CLOSED_WINDOW_DAYS: i64 = 7;

/// Counts recently closed leads and open pipeline leads.
///
/// A lead closed exactly `CLOSED_WINDOW_DAYS` ago is still inside the window.
pub fn summarize(leads: &[Lead], now: DateTime<Utc>) -> SummaryReport {
    let since = now - Duration::days(CLOSED_WINDOW_DAYS);
    let mut report = SummaryReport::default();

    for lead in leads {
        if !lead.status.is_closed() {
            report.pipeline_leads += 1;
        } else if lead.closed_at.is_some_and(|at| at >= since) {
            report.closed_last_week += 1;
        }
    }
    report
}

/// Counts closed leads per assigned agent.
///
/// A lead with several agents counts once for each of them. Agents missing
/// from `agents` are left out. Rows are sorted by count, then by name.
pub fn closed_by_agent(leads: &[Lead], agents: &[SalesAgent]) -> Vec<AgentClosedCount> {
    let mut counts: HashMap<Uuid, u64> = HashMap::new();
    for lead in leads.iter().filter(|l| l.status.is_closed()) {
        for agent_id in &lead.sales_agent_ids {
            *counts.entry(*agent_id).or_default() += 1;
        }
    }

    let mut rows: Vec<AgentClosedCount> = agents
        .iter()
        .filter_map(|agent| {
            counts.get(&agent.id).map(|count| AgentClosedCount {
                sales_agent: agent.name.clone(),
                count: *count,
            })
        })
        .collect();
    rows.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.sales_agent.cmp(&b.sales_agent))
    });
    rows
}

/// Counts open leads per status, in lifecycle order, skipping empty groups.
pub fn status_distribution(leads: &[Lead]) -> Vec<StatusCount> {
    let mut counts: HashMap<LeadStatus, u64> = HashMap::new();
    for lead in leads.iter().filter(|l| !l.status.is_closed()) {
        *counts.entry(lead.status).or_default() += 1;
    }

    LeadStatus::ALL
        .into_iter()
        .filter_map(|status| {
            counts
                .get(&status)
                .map(|count| StatusCount { status, count: *count })
        })
        .collect()
}
