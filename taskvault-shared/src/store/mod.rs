/// Storage interfaces for credentials and tasks
///
/// The rest of the system talks to persistence exclusively through these
/// traits. Two implementations exist:
///
/// - [`postgres`]: the production adapters backed by sqlx
/// - [`memory`]: in-process adapters for tests and development
///
/// Stores carry no business rules. Ownership decisions live in
/// [`crate::tasks`]; the only concession made here is the conditional
/// update/delete, which matches on `id` **and** `owner_id` in a single
/// store operation so a read-check-write sequence can detect a concurrent
/// change instead of clobbering it.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::task::{CreateTask, TaskFilter, TaskPatch, TaskRecord};
use crate::models::user::{CreateUser, UserRecord};

/// Error type for store operations
///
/// Persistence failures are opaque to callers; the cause is preserved for
/// logging but never surfaced to a client.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not complete the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Persistence for user records
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Inserts a new user and returns the stored record
    ///
    /// Does not enforce email uniqueness; callers check for an existing
    /// record first (a concurrent registration can slip through that
    /// window).
    async fn insert(&self, user: CreateUser) -> Result<UserRecord, StoreError>;

    /// Finds a user by exact email
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Lists all user records in creation order
    async fn list(&self) -> Result<Vec<UserRecord>, StoreError>;
}

/// Persistence for task records
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts a new task and returns its generated id
    async fn insert(&self, task: CreateTask) -> Result<Uuid, StoreError>;

    /// Fetches a task by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<TaskRecord>, StoreError>;

    /// Returns one page of tasks matching the filter, in creation order
    async fn find_page(
        &self,
        filter: &TaskFilter,
        skip: u64,
        limit: u32,
    ) -> Result<Vec<TaskRecord>, StoreError>;

    /// Applies a patch to the task matching `id` AND `owner_id`
    ///
    /// The owner condition makes the write optimistic: returns `false`
    /// when no record matched, i.e. the task vanished or changed hands
    /// between the caller's read and this write.
    async fn update_owned(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: &TaskPatch,
    ) -> Result<bool, StoreError>;

    /// Deletes the task matching `id` AND `owner_id`
    ///
    /// Returns `false` when no record matched.
    async fn delete_owned(&self, id: Uuid, owner_id: Uuid) -> Result<bool, StoreError>;
}
