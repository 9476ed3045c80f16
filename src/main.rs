use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskflow_backend::config::Config;
use taskflow_backend::hooks::{TodoCreatedHook, WebhookNotifier};
use taskflow_backend::routes::router;
use taskflow_backend::state::AppState;
use taskflow_backend::suggest::{
    HttpSuggestionClient, NoopSuggestionClient, SuggestConfig, SuggestionClient,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "taskflow_backend=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let suggester: Arc<dyn SuggestionClient> = match SuggestConfig::new_from_env() {
        Some(cfg) => Arc::new(HttpSuggestionClient::new(cfg)?),
        None => Arc::new(NoopSuggestionClient),
    };

    let webhook: Arc<dyn TodoCreatedHook> = Arc::new(WebhookNotifier::new()?);
    let created_hooks = Arc::new(vec![webhook]);

    let state = AppState {
        db: pool.clone(),
        created_hooks,
        suggester,
    };

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
