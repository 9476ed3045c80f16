use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

use crate::error::AppError;
use crate::hooks::TodoCreatedHook;
use crate::models::{Todo, UserProfile};

/// POSTs the complete created record as JSON to the owner's configured
/// webhook URL. One attempt, no retry, no signature; the response body is
/// ignored beyond the status check.
pub struct WebhookNotifier {
    client: Client,
}

impl WebhookNotifier {
    pub fn new() -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Upstream(format!("Failed to build http client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl TodoCreatedHook for WebhookNotifier {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn on_created(
        &self,
        todo: &Todo,
        profile: Option<&UserProfile>,
    ) -> Result<(), AppError> {
        // No configured URL means nothing to deliver.
        let Some(url) = profile
            .and_then(|p| p.webhook_url.as_deref())
            .filter(|u| !u.is_empty())
        else {
            return Ok(());
        };

        let response = self
            .client
            .post(url)
            .json(todo)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("webhook delivery failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "webhook returned {}",
                response.status()
            )));
        }

        info!("webhook delivered for todo {}", todo.id);
        Ok(())
    }
}
