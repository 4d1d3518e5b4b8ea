//! In-memory store implementations for development and testing
//!
//! These adapters keep all records in process memory behind tokio
//! `RwLock`s. They implement the same contracts as the Postgres adapters,
//! including the conditional update/delete semantics, so the access layer
//! can be exercised without a database.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CredentialStore, StoreError, TaskStore};
use crate::models::task::{CreateTask, TaskFilter, TaskPatch, TaskRecord};
use crate::models::user::{CreateUser, UserRecord};

/// In-memory credential store
#[derive(Clone, Default)]
pub struct MemoryCredentialStore {
    users: Arc<RwLock<Vec<UserRecord>>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn insert(&self, user: CreateUser) -> Result<UserRecord, StoreError> {
        let record = UserRecord {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            username: user.username,
            created_at: Utc::now(),
        };

        self.users.write().await.push(record.clone());

        Ok(record)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<UserRecord>, StoreError> {
        Ok(self.users.read().await.clone())
    }
}

/// In-memory task store
///
/// Keeps an insertion-order index next to the record map so listing pages
/// are deterministic, matching the creation-order contract of the Postgres
/// adapter.
#[derive(Clone, Default)]
pub struct MemoryTaskStore {
    tasks: Arc<RwLock<HashMap<Uuid, TaskRecord>>>,
    order: Arc<RwLock<Vec<Uuid>>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_filter(task: &TaskRecord, filter: &TaskFilter) -> bool {
    if let Some(ref priority) = filter.priority {
        if &task.priority != priority {
            return false;
        }
    }
    if let Some(due_from) = filter.due_from {
        if task.due_date < due_from {
            return false;
        }
    }
    if let Some(owner) = filter.owner {
        if task.owner_id != owner {
            return false;
        }
    }
    true
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn insert(&self, task: CreateTask) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        let record = TaskRecord {
            id,
            title: task.title,
            description: task.description,
            priority: task.priority,
            status: task.status,
            due_date: task.due_date,
            owner_id: task.owner_id,
        };

        self.tasks.write().await.insert(id, record);
        self.order.write().await.push(id);

        Ok(id)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TaskRecord>, StoreError> {
        Ok(self.tasks.read().await.get(&id).cloned())
    }

    async fn find_page(
        &self,
        filter: &TaskFilter,
        skip: u64,
        limit: u32,
    ) -> Result<Vec<TaskRecord>, StoreError> {
        let order = self.order.read().await;
        let tasks = self.tasks.read().await;

        Ok(order
            .iter()
            .filter_map(|id| tasks.get(id))
            .filter(|task| matches_filter(task, filter))
            .skip(skip as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn update_owned(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: &TaskPatch,
    ) -> Result<bool, StoreError> {
        let mut tasks = self.tasks.write().await;

        match tasks.get_mut(&id) {
            Some(task) if task.owner_id == owner_id => {
                patch.apply(task);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_owned(&self, id: Uuid, owner_id: Uuid) -> Result<bool, StoreError> {
        let mut tasks = self.tasks.write().await;

        let owned = matches!(tasks.get(&id), Some(task) if task.owner_id == owner_id);
        if !owned {
            return Ok(false);
        }

        tasks.remove(&id);
        self.order.write().await.retain(|existing| *existing != id);

        Ok(true)
    }
}
