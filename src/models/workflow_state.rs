use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user-defined workflow stage a task can occupy.
///
/// `position` is the insertion order and is authoritative for listing.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowState {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub position: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStateRequest {
    pub name: String,
}
