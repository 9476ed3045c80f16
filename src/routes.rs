use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::MaybeIdentity;
use crate::error::AppError;
use crate::hooks::dispatch_created;
use crate::models::{
    NewStateRequest, NewTodoRequest, Priority, UpdateProfileRequest, UpdateTodoRequest,
    UserProfile, WorkflowState,
};
use crate::pipeline::{self, DisplayTodo, TodoFilters};
use crate::repository;
use crate::state::AppState;
use crate::suggest::dto::SuggestionRequest;
use crate::suggest::resolve_suggestion;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/states", get(list_states).post(create_state))
        .route("/states/{id}", delete(delete_state))
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", patch(update_todo).delete(delete_todo))
        .route("/me", get(get_profile).patch(update_profile))
        .route("/suggest-state", post(suggest_state))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

/// Listing the states is also the bootstrap point: the first time a user is
/// observed with zero states, the default set is seeded.
async fn list_states(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
) -> Result<Json<Vec<WorkflowState>>, AppError> {
    let Some(identity) = identity else {
        return Ok(Json(Vec::new()));
    };

    repository::seed_default_states(&state.db, &identity.user_id).await?;
    let states = repository::fetch_states(&state.db, &identity.user_id).await?;
    Ok(Json(states))
}

/// Duplicate or empty names are a no-op; either way the response is the
/// user's current ordered state set.
async fn create_state(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
    Json(req): Json<NewStateRequest>,
) -> Result<Json<Vec<WorkflowState>>, AppError> {
    let Some(identity) = identity else {
        return Ok(Json(Vec::new()));
    };

    repository::insert_state(&state.db, &identity.user_id, &req.name).await?;
    let states = repository::fetch_states(&state.db, &identity.user_id).await?;
    Ok(Json(states))
}

async fn delete_state(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let Some(identity) = identity else {
        return Ok(StatusCode::NO_CONTENT);
    };

    if repository::delete_state(&state.db, &identity.user_id, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

#[derive(Debug, Default, Deserialize)]
struct TodoQueryParams {
    #[serde(default)]
    search: String,
    priority: Option<String>,
    state: Option<String>,
}

fn parse_filters(params: TodoQueryParams) -> Result<TodoFilters, AppError> {
    let mut priorities = Vec::new();
    if let Some(raw) = params.priority {
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let priority = Priority::from_str(part)
                .map_err(|_| AppError::BadRequest(format!("unknown priority: {part}")))?;
            priorities.push(priority);
        }
    }

    let state_names = params
        .state
        .map(|raw| {
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();

    Ok(TodoFilters {
        search: params.search,
        priorities,
        state_names,
    })
}

async fn list_todos(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
    Query(params): Query<TodoQueryParams>,
) -> Result<Json<Vec<DisplayTodo>>, AppError> {
    let Some(identity) = identity else {
        return Ok(Json(Vec::new()));
    };

    let filters = parse_filters(params)?;
    let todos = repository::fetch_todos(&state.db, &identity.user_id).await?;
    let states = repository::fetch_states(&state.db, &identity.user_id).await?;

    let display = pipeline::derive(&todos, &states, Utc::now());
    Ok(Json(pipeline::filter(display, &states, &filters)))
}

fn validate_new_todo(req: &NewTodoRequest) -> Result<(), AppError> {
    if req.label.trim().is_empty() {
        return Err(AppError::Validation {
            field: "label",
            message: "is required",
        });
    }
    if req.due_date.trim().is_empty() {
        return Err(AppError::Validation {
            field: "dueDate",
            message: "is required",
        });
    }
    if req.state_id.as_deref().is_none_or(|s| s.is_empty()) {
        return Err(AppError::Validation {
            field: "state",
            message: "is required",
        });
    }
    Ok(())
}

async fn create_todo(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
    Json(req): Json<NewTodoRequest>,
) -> Result<Response, AppError> {
    let Some(identity) = identity else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    validate_new_todo(&req)?;
    let todo = repository::insert_todo(&state.db, &identity.user_id, req).await?;

    // Post-commit side effects run detached; the response never waits on
    // them and their failures stay in the logs.
    let profile = repository::fetch_profile(&state.db, &identity.user_id).await?;
    dispatch_created(&state.created_hooks, &todo, profile.as_ref());

    Ok(Json(todo).into_response())
}

async fn update_todo(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
    Path(id): Path<String>,
    Json(req): Json<UpdateTodoRequest>,
) -> Result<Response, AppError> {
    let Some(identity) = identity else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    if req.label.as_deref().is_some_and(|l| l.trim().is_empty()) {
        return Err(AppError::Validation {
            field: "label",
            message: "must not be empty",
        });
    }
    if req.due_date.as_deref().is_some_and(|d| d.trim().is_empty()) {
        return Err(AppError::Validation {
            field: "dueDate",
            message: "must not be empty",
        });
    }

    let todo = repository::update_todo(&state.db, &identity.user_id, &id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(todo).into_response())
}

async fn delete_todo(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let Some(identity) = identity else {
        return Ok(StatusCode::NO_CONTENT);
    };

    if repository::delete_todo(&state.db, &identity.user_id, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn get_profile(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
) -> Result<Json<Option<UserProfile>>, AppError> {
    let Some(identity) = identity else {
        return Ok(Json(None));
    };

    let profile = repository::fetch_profile(&state.db, &identity.user_id).await?;
    Ok(Json(profile))
}

async fn update_profile(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<Option<UserProfile>>, AppError> {
    let Some(identity) = identity else {
        return Ok(Json(None));
    };

    let profile = repository::update_profile(&state.db, &identity, req).await?;
    Ok(Json(Some(profile)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuggestStateParams {
    #[serde(default)]
    description: String,
    #[serde(default)]
    due_date: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SuggestStateResponse {
    suggested_state: String,
}

/// An empty `suggestedState` means "no suggestion"; the caller leaves the
/// current selection untouched.
async fn suggest_state(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
    Json(params): Json<SuggestStateParams>,
) -> Result<Json<SuggestStateResponse>, AppError> {
    let Some(identity) = identity else {
        return Ok(Json(SuggestStateResponse {
            suggested_state: String::new(),
        }));
    };

    let available_states: Vec<String> = repository::fetch_states(&state.db, &identity.user_id)
        .await?
        .into_iter()
        .map(|s| s.name)
        .collect();

    let req = SuggestionRequest {
        description: params.description,
        due_date: params.due_date,
        available_states,
    };
    let suggested_state = resolve_suggestion(state.suggester.as_ref(), &req).await;

    Ok(Json(SuggestStateResponse { suggested_state }))
}
