pub mod dto;

use std::env;

use async_trait::async_trait;
use reqwest::Client;
use tracing::warn;

use crate::error::AppError;
use self::dto::{SuggestionRequest, SuggestionResponse};

#[derive(Clone, Debug)]
pub struct SuggestConfig {
    pub api_url: String,
    pub api_token: Option<String>,
}

impl SuggestConfig {
    /// `None` when no endpoint is configured; the service then runs with the
    /// no-op client and every suggestion comes back empty.
    pub fn new_from_env() -> Option<Self> {
        let api_url = env::var("SUGGEST_API_URL").ok()?;
        let api_token = env::var("SUGGEST_API_TOKEN").ok();
        Some(Self { api_url, api_token })
    }
}

#[async_trait]
pub trait SuggestionClient: Send + Sync {
    async fn suggest(&self, req: &SuggestionRequest) -> Result<String, AppError>;
}

pub struct HttpSuggestionClient {
    client: Client,
    config: SuggestConfig,
}

impl HttpSuggestionClient {
    pub fn new(config: SuggestConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Upstream(format!("Failed to build http client: {e}")))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl SuggestionClient for HttpSuggestionClient {
    async fn suggest(&self, req: &SuggestionRequest) -> Result<String, AppError> {
        let mut request = self.client.post(&self.config.api_url).json(req);
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("suggestion call failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "suggestion endpoint returned {}",
                response.status()
            )));
        }

        let body: SuggestionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse suggestion response: {e}")))?;

        Ok(body.suggested_state)
    }
}

/// Stand-in while no suggestion endpoint is configured.
pub struct NoopSuggestionClient;

#[async_trait]
impl SuggestionClient for NoopSuggestionClient {
    async fn suggest(&self, _req: &SuggestionRequest) -> Result<String, AppError> {
        Ok(String::new())
    }
}

/// Applies the caller contract: any failure, and any returned state that is
/// not a member of `available_states`, collapses to the empty string, which
/// means "no suggestion" and leaves the current selection untouched.
pub async fn resolve_suggestion(client: &dyn SuggestionClient, req: &SuggestionRequest) -> String {
    match client.suggest(req).await {
        Ok(state) if req.available_states.iter().any(|s| *s == state) => state,
        Ok(state) => {
            if !state.is_empty() {
                warn!("discarding suggestion outside the available states: {state}");
            }
            String::new()
        }
        Err(err) => {
            warn!("suggestion failed: {err}");
            String::new()
        }
    }
}
