use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::auth::Identity;
use crate::models::{
    NewTodoRequest, Todo, UpdateProfileRequest, UpdateTodoRequest, UserProfile, WorkflowState,
};

pub const DEFAULT_STATES: [&str; 4] = ["To-do", "In Progress", "Done", "Canceled"];

pub async fn fetch_states(
    db: &SqlitePool,
    user_id: &str,
) -> Result<Vec<WorkflowState>, sqlx::Error> {
    sqlx::query_as::<_, WorkflowState>(
        "SELECT id, user_id, name, position FROM states WHERE user_id = ? ORDER BY position",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

/// Seeds the four default states for a user that currently has none.
///
/// The zero-count check and the inserts run in one transaction, so two
/// concurrent first-reads cannot both seed. Returns whether seeding happened.
pub async fn seed_default_states(db: &SqlitePool, user_id: &str) -> Result<bool, sqlx::Error> {
    let mut tx = db.begin().await?;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM states WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
    if count > 0 {
        return Ok(false);
    }

    for (position, name) in DEFAULT_STATES.iter().enumerate() {
        sqlx::query("INSERT INTO states (id, user_id, name, position) VALUES (?, ?, ?, ?)")
            .bind(Uuid::new_v4().to_string())
            .bind(user_id)
            .bind(name)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(true)
}

/// Appends a state to the user's set. A no-op (returns `None`) when the name
/// is empty or already present by case-sensitive exact match.
pub async fn insert_state(
    db: &SqlitePool,
    user_id: &str,
    name: &str,
) -> Result<Option<WorkflowState>, sqlx::Error> {
    if name.is_empty() {
        return Ok(None);
    }

    let existing: Option<String> =
        sqlx::query_scalar("SELECT id FROM states WHERE user_id = ? AND name = ?")
            .bind(user_id)
            .bind(name)
            .fetch_optional(db)
            .await?;
    if existing.is_some() {
        return Ok(None);
    }

    let position: i64 =
        sqlx::query_scalar("SELECT COALESCE(MAX(position) + 1, 0) FROM states WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(db)
            .await?;

    let state = WorkflowState {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        name: name.to_string(),
        position,
    };

    sqlx::query("INSERT INTO states (id, user_id, name, position) VALUES (?, ?, ?, ?)")
        .bind(&state.id)
        .bind(&state.user_id)
        .bind(&state.name)
        .bind(state.position)
        .execute(db)
        .await?;

    Ok(Some(state))
}

/// Removes the state only. Todos referencing it keep the dangling id and
/// resolve to "Unknown" at display time.
pub async fn delete_state(db: &SqlitePool, user_id: &str, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM states WHERE user_id = ? AND id = ?")
        .bind(user_id)
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn fetch_todos(db: &SqlitePool, user_id: &str) -> Result<Vec<Todo>, sqlx::Error> {
    sqlx::query_as::<_, Todo>(
        "SELECT id, user_id, label, description, priority, state_id, due_date, created_at, updated_at \
         FROM todos WHERE user_id = ? ORDER BY created_at DESC, id",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn find_todo_by_id(
    db: &SqlitePool,
    user_id: &str,
    id: &str,
) -> Result<Option<Todo>, sqlx::Error> {
    sqlx::query_as::<_, Todo>(
        "SELECT id, user_id, label, description, priority, state_id, due_date, created_at, updated_at \
         FROM todos WHERE user_id = ? AND id = ?",
    )
    .bind(user_id)
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_todo(
    db: &SqlitePool,
    user_id: &str,
    req: NewTodoRequest,
) -> Result<Todo, sqlx::Error> {
    let now = Utc::now().to_rfc3339();
    let todo = Todo {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        label: req.label,
        description: req.description,
        priority: req.priority,
        state_id: req.state_id,
        due_date: req.due_date,
        created_at: now.clone(),
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO todos (id, user_id, label, description, priority, state_id, due_date, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&todo.id)
    .bind(&todo.user_id)
    .bind(&todo.label)
    .bind(&todo.description)
    .bind(todo.priority)
    .bind(&todo.state_id)
    .bind(&todo.due_date)
    .bind(&todo.created_at)
    .bind(&todo.updated_at)
    .execute(db)
    .await?;

    Ok(todo)
}

/// Merges only the supplied fields into the existing record and refreshes
/// `updated_at`. `created_at` is never touched.
pub async fn update_todo(
    db: &SqlitePool,
    user_id: &str,
    id: &str,
    req: UpdateTodoRequest,
) -> Result<Option<Todo>, sqlx::Error> {
    let mut current = match find_todo_by_id(db, user_id, id).await? {
        Some(t) => t,
        None => return Ok(None),
    };

    if let Some(label) = req.label {
        current.label = label;
    }
    if let Some(description) = req.description {
        current.description = Some(description);
    }
    if let Some(priority) = req.priority {
        current.priority = priority;
    }
    if let Some(state_id) = req.state_id {
        current.state_id = Some(state_id);
    }
    if let Some(due_date) = req.due_date {
        current.due_date = due_date;
    }
    current.updated_at = Utc::now().to_rfc3339();

    sqlx::query(
        "UPDATE todos SET label = ?, description = ?, priority = ?, state_id = ?, due_date = ?, updated_at = ? \
         WHERE user_id = ? AND id = ?",
    )
    .bind(&current.label)
    .bind(&current.description)
    .bind(current.priority)
    .bind(&current.state_id)
    .bind(&current.due_date)
    .bind(&current.updated_at)
    .bind(user_id)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn delete_todo(db: &SqlitePool, user_id: &str, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM todos WHERE user_id = ? AND id = ?")
        .bind(user_id)
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn fetch_profile(
    db: &SqlitePool,
    user_id: &str,
) -> Result<Option<UserProfile>, sqlx::Error> {
    sqlx::query_as::<_, UserProfile>(
        "SELECT id, email, display_name, webhook_url, created_at, updated_at \
         FROM profiles WHERE id = ?",
    )
    .bind(user_id)
    .fetch_optional(db)
    .await
}

/// Creates the profile lazily on first write, defaulting email and display
/// name from the identity, then merges supplied fields. Always refreshes
/// `updated_at`.
pub async fn update_profile(
    db: &SqlitePool,
    identity: &Identity,
    req: UpdateProfileRequest,
) -> Result<UserProfile, sqlx::Error> {
    let now = Utc::now().to_rfc3339();

    match fetch_profile(db, &identity.user_id).await? {
        Some(mut current) => {
            if let Some(display_name) = req.display_name {
                current.display_name = display_name;
            }
            if let Some(webhook_url) = req.webhook_url {
                current.webhook_url = Some(webhook_url);
            }
            current.updated_at = now;

            sqlx::query(
                "UPDATE profiles SET display_name = ?, webhook_url = ?, updated_at = ? WHERE id = ?",
            )
            .bind(&current.display_name)
            .bind(&current.webhook_url)
            .bind(&current.updated_at)
            .bind(&current.id)
            .execute(db)
            .await?;

            Ok(current)
        }
        None => {
            let profile = UserProfile {
                id: identity.user_id.clone(),
                email: identity.email.clone().unwrap_or_default(),
                display_name: req
                    .display_name
                    .unwrap_or_else(|| identity.default_display_name()),
                webhook_url: req.webhook_url,
                created_at: now.clone(),
                updated_at: now,
            };

            sqlx::query(
                "INSERT INTO profiles (id, email, display_name, webhook_url, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&profile.id)
            .bind(&profile.email)
            .bind(&profile.display_name)
            .bind(&profile.webhook_url)
            .bind(&profile.created_at)
            .bind(&profile.updated_at)
            .execute(db)
            .await?;

            Ok(profile)
        }
    }
}
