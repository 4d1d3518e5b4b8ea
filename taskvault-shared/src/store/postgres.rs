//! Postgres store implementations backed by sqlx
//!
//! Queries are built at runtime; rows map through `sqlx::FromRow` on the
//! record types. Update and delete are single-statement conditional writes
//! matching `id` AND `owner_id`, so a concurrent change between a caller's
//! read and its write surfaces as "no rows matched" instead of a lost
//! update.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{CredentialStore, StoreError, TaskStore};
use crate::models::task::{CreateTask, TaskFilter, TaskPatch, TaskRecord};
use crate::models::user::{CreateUser, UserRecord};

const USER_COLUMNS: &str = "id, email, password_hash, role, username, created_at";
const TASK_COLUMNS: &str = "id, title, description, priority, status, due_date, owner_id";

/// Credential store backed by the `users` table
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn insert(&self, user: CreateUser) -> Result<UserRecord, StoreError> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            INSERT INTO users (email, password_hash, role, username)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.role)
        .bind(user.username)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn list(&self) -> Result<Vec<UserRecord>, StoreError> {
        let records = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

/// Task store backed by the `tasks` table
#[derive(Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn insert(&self, task: CreateTask) -> Result<Uuid, StoreError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO tasks (title, description, priority, status, due_date, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(task.title)
        .bind(task.description)
        .bind(task.priority)
        .bind(task.status)
        .bind(task.due_date)
        .bind(task.owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TaskRecord>, StoreError> {
        let record = sqlx::query_as::<_, TaskRecord>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_page(
        &self,
        filter: &TaskFilter,
        skip: u64,
        limit: u32,
    ) -> Result<Vec<TaskRecord>, StoreError> {
        // Build the WHERE clause from whichever filters are present
        let mut conditions = Vec::new();
        let mut bind_count = 0;

        if filter.priority.is_some() {
            bind_count += 1;
            conditions.push(format!("priority = ${}", bind_count));
        }
        if filter.due_from.is_some() {
            bind_count += 1;
            conditions.push(format!("due_date >= ${}", bind_count));
        }
        if filter.owner.is_some() {
            bind_count += 1;
            conditions.push(format!("owner_id = ${}", bind_count));
        }

        let mut query = format!("SELECT {TASK_COLUMNS} FROM tasks");
        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }
        query.push_str(&format!(
            " ORDER BY created_at LIMIT ${} OFFSET ${}",
            bind_count + 1,
            bind_count + 2
        ));

        let mut q = sqlx::query_as::<_, TaskRecord>(&query);

        if let Some(ref priority) = filter.priority {
            q = q.bind(priority.clone());
        }
        if let Some(due_from) = filter.due_from {
            q = q.bind(due_from);
        }
        if let Some(owner) = filter.owner {
            q = q.bind(owner);
        }

        let records = q
            .bind(limit as i64)
            .bind(skip as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    async fn update_owned(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: &TaskPatch,
    ) -> Result<bool, StoreError> {
        if patch.is_empty() {
            // Nothing to write; report whether the conditional target exists
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM tasks WHERE id = $1 AND owner_id = $2)",
            )
            .bind(id)
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;
            return Ok(exists);
        }

        // Build the SET clause from whichever patch fields are present
        let mut sets = Vec::new();
        let mut bind_count = 2;

        if patch.title.is_some() {
            bind_count += 1;
            sets.push(format!("title = ${}", bind_count));
        }
        if patch.description.is_some() {
            bind_count += 1;
            sets.push(format!("description = ${}", bind_count));
        }
        if patch.priority.is_some() {
            bind_count += 1;
            sets.push(format!("priority = ${}", bind_count));
        }
        if patch.status.is_some() {
            bind_count += 1;
            sets.push(format!("status = ${}", bind_count));
        }
        if patch.due_date.is_some() {
            bind_count += 1;
            sets.push(format!("due_date = ${}", bind_count));
        }

        let query = format!(
            "UPDATE tasks SET {} WHERE id = $1 AND owner_id = $2",
            sets.join(", ")
        );

        let mut q = sqlx::query(&query).bind(id).bind(owner_id);

        if let Some(ref title) = patch.title {
            q = q.bind(title.clone());
        }
        if let Some(ref description) = patch.description {
            q = q.bind(description.clone());
        }
        if let Some(ref priority) = patch.priority {
            q = q.bind(priority.clone());
        }
        if let Some(ref status) = patch.status {
            q = q.bind(status.clone());
        }
        if let Some(due_date) = patch.due_date {
            q = q.bind(due_date);
        }

        let result = q.execute(&self.pool).await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_owned(&self, id: Uuid, owner_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
