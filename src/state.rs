use std::sync::Arc;

use sqlx::SqlitePool;

use crate::hooks::TodoCreatedHook;
use crate::suggest::SuggestionClient;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub created_hooks: Arc<Vec<Arc<dyn TodoCreatedHook>>>,
    pub suggester: Arc<dyn SuggestionClient>,
}
