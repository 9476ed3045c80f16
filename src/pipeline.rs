//! Derivation/filter pipeline: joins raw todos with the user's workflow
//! states into display-ready records, then applies the toolbar filters.
//!
//! Everything here is pure; it is recomputed per request with no caching.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::models::{Priority, Todo, WorkflowState};

/// Sentinel shown for a todo whose `state_id` no longer resolves.
pub const UNKNOWN_STATE: &str = "Unknown";

/// A todo with its state reference resolved to a name, timestamps normalized
/// to concrete instants, and the deadline flags precomputed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayTodo {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub state_id: Option<String>,
    pub state: String,
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub overdue: bool,
    pub due_soon: bool,
}

/// Toolbar filters. Empty search matches everything; an empty priority or
/// state list accepts all records.
#[derive(Debug, Clone, Default)]
pub struct TodoFilters {
    pub search: String,
    pub priorities: Vec<Priority>,
    pub state_names: Vec<String>,
}

/// Parses a stored timestamp, trying RFC 3339 first and falling back to a
/// bare `YYYY-MM-DD` date taken as midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn coerce_timestamp(raw: &str, fallback: DateTime<Utc>) -> DateTime<Utc> {
    parse_timestamp(raw).unwrap_or(fallback)
}

fn is_done(state: &str) -> bool {
    let state = state.to_lowercase();
    state == "done" || state == "completed"
}

/// Resolves each todo against the state set, preserving input order.
pub fn derive(todos: &[Todo], states: &[WorkflowState], now: DateTime<Utc>) -> Vec<DisplayTodo> {
    let names: HashMap<&str, &str> = states
        .iter()
        .map(|s| (s.id.as_str(), s.name.as_str()))
        .collect();

    todos
        .iter()
        .map(|todo| {
            let state = todo
                .state_id
                .as_deref()
                .and_then(|id| names.get(id))
                .map_or_else(|| UNKNOWN_STATE.to_string(), |name| (*name).to_string());

            let due_date = coerce_timestamp(&todo.due_date, now);
            let done = is_done(&state);
            let overdue = !done && due_date < now;
            let due_soon = !done && !overdue && due_date - now <= Duration::days(2);

            DisplayTodo {
                id: todo.id.clone(),
                label: todo.label.clone(),
                description: todo.description.clone(),
                priority: todo.priority,
                state_id: todo.state_id.clone(),
                state,
                due_date,
                created_at: coerce_timestamp(&todo.created_at, now),
                updated_at: coerce_timestamp(&todo.updated_at, now),
                overdue,
                due_soon,
            }
        })
        .collect()
}

/// Applies the filters as conjunctive predicates, preserving order.
///
/// The state-name filter is translated back to ids against the current state
/// set; a name that matches no state contributes no id and so filters
/// nothing extra.
pub fn filter(
    display: Vec<DisplayTodo>,
    states: &[WorkflowState],
    filters: &TodoFilters,
) -> Vec<DisplayTodo> {
    let search = filters.search.to_lowercase();
    let state_ids: HashSet<&str> = states
        .iter()
        .filter(|s| filters.state_names.iter().any(|n| n == &s.name))
        .map(|s| s.id.as_str())
        .collect();

    display
        .into_iter()
        .filter(|todo| todo.label.to_lowercase().contains(&search))
        .filter(|todo| filters.priorities.is_empty() || filters.priorities.contains(&todo.priority))
        .filter(|todo| {
            state_ids.is_empty()
                || todo
                    .state_id
                    .as_deref()
                    .is_some_and(|id| state_ids.contains(id))
        })
        .collect()
}
