pub mod webhook;

pub use webhook::WebhookNotifier;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::error::AppError;
use crate::models::{Todo, UserProfile};

/// A side effect chained off a successful todo creation.
#[async_trait]
pub trait TodoCreatedHook: Send + Sync {
    fn name(&self) -> &'static str;

    async fn on_created(
        &self,
        todo: &Todo,
        profile: Option<&UserProfile>,
    ) -> Result<(), AppError>;
}

/// Runs every hook on its own task, fire-and-forget.
///
/// A hook's failure is logged and cannot affect the write that triggered it,
/// the caller's response, or any other hook. Nothing here is cancellable once
/// dispatched.
pub fn dispatch_created(
    hooks: &[Arc<dyn TodoCreatedHook>],
    todo: &Todo,
    profile: Option<&UserProfile>,
) {
    for hook in hooks {
        let hook = Arc::clone(hook);
        let todo = todo.clone();
        let profile = profile.cloned();
        tokio::spawn(async move {
            if let Err(err) = hook.on_created(&todo, profile.as_ref()).await {
                warn!("post-commit hook {} failed: {}", hook.name(), err);
            }
        });
    }
}
