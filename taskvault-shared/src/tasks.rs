/// Ownership-scoped task operations
///
/// [`TaskAccess`] sits between the HTTP handlers and the task store and is
/// the only place that decides which records an identity may touch. The
/// rules:
///
/// - every task is owned by the identity that created it; the owner id is
///   taken from the verified identity, never from the payload, and is
///   immutable afterwards
/// - admins bypass ownership on every operation
/// - non-admins may only read, update, and delete their own tasks, and
///   their listings are filtered to their own records
///
/// All read-modify-write operations follow the same shape: read the record
/// (`NotFound` if absent), authorize against THAT record, then write
/// conditionally on `id` AND `owner_id` being unchanged. A failed condition
/// is a [`AccessError::Conflict`], never a silent lost update.
///
/// Input validation (required fields, id format, date and page parsing)
/// happens before any store call.

use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::auth::middleware::Identity;
use crate::models::task::{
    parse_due_date, CreateTask, TaskDraft, TaskFilter, TaskPage, TaskPatch, TaskRecord,
};
use crate::models::user::Role;
use crate::store::{StoreError, TaskStore};

/// Error type for task access operations
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// Missing or malformed input, detected before any store call
    #[error("{0}")]
    Validation(String),

    /// The task id is not in the store's key format
    #[error("Invalid task ID")]
    InvalidId,

    /// No task with this id exists
    #[error("Task not found")]
    NotFound,

    /// The caller may not act on this task
    #[error("Access denied")]
    AccessDenied,

    /// The record changed between the caller's read and its write
    #[error("Task was modified concurrently")]
    Conflict,

    /// The store could not complete the operation
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Listing parameters as they arrive on the wire
///
/// Numeric and date parameters are carried as raw strings so this layer
/// owns the coercion policy: unparsable input is rejected with a
/// [`AccessError::Validation`], never silently coerced.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    /// Exact priority match
    pub priority: Option<String>,

    /// Only tasks due at or after this date
    pub due_date_from: Option<String>,

    /// 1-based page number (default 1)
    pub page: Option<String>,

    /// Page size (default 10)
    pub page_size: Option<String>,
}

/// Ownership-aware task operations over a task store
#[derive(Clone)]
pub struct TaskAccess {
    store: Arc<dyn TaskStore>,
}

impl TaskAccess {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Creates a task owned by the caller
    ///
    /// Every field must be present and non-empty. The owner is the
    /// caller's subject id, unconditionally.
    pub async fn create(&self, identity: &Identity, draft: TaskDraft) -> Result<Uuid, AccessError> {
        let title = required_field(draft.title)?;
        let description = required_field(draft.description)?;
        let priority = required_field(draft.priority)?;
        let status = required_field(draft.status)?;
        let due_date = parse_required_due_date(&required_field(draft.due_date)?)?;

        let id = self
            .store
            .insert(CreateTask {
                title,
                description,
                priority,
                status,
                due_date,
                owner_id: identity.subject_id,
            })
            .await?;

        Ok(id)
    }

    /// Lists tasks visible to the caller, filtered and paginated
    ///
    /// Admins see every owner's tasks; for anyone else the ownership
    /// restriction is part of the store query, so the returned page
    /// contains only the caller's records.
    pub async fn list(&self, identity: &Identity, params: ListParams) -> Result<TaskPage, AccessError> {
        let page = parse_page_param(params.page.as_deref(), 1, "page")?;
        let page_size = parse_page_param(params.page_size.as_deref(), 10, "page_size")?;

        let due_from = match params.due_date_from.as_deref() {
            Some(raw) => Some(parse_required_due_date(raw)?),
            None => None,
        };

        let filter = TaskFilter {
            priority: params.priority.filter(|p| !p.is_empty()),
            due_from,
            owner: (identity.role != Role::Admin).then_some(identity.subject_id),
        };

        let skip = (page as u64 - 1) * page_size as u64;
        let tasks = self.store.find_page(&filter, skip, page_size).await?;

        Ok(TaskPage {
            tasks,
            page,
            page_size,
        })
    }

    /// Fetches a single task the caller may see
    pub async fn get_by_id(
        &self,
        identity: &Identity,
        raw_id: &str,
    ) -> Result<TaskRecord, AccessError> {
        let id = parse_task_id(raw_id)?;

        let task = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(AccessError::NotFound)?;

        ensure_can_touch(identity, &task)?;

        Ok(task)
    }

    /// Applies a partial update to a task the caller may mutate
    ///
    /// Only present, non-empty fields are applied; the owner is never one
    /// of them. The ownership decision is made against the record as read,
    /// and the write re-checks `id` + `owner_id` in one store operation.
    pub async fn update(
        &self,
        identity: &Identity,
        raw_id: &str,
        draft: TaskDraft,
    ) -> Result<(), AccessError> {
        let id = parse_task_id(raw_id)?;
        let patch = build_patch(draft)?;

        let task = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(AccessError::NotFound)?;

        ensure_can_touch(identity, &task)?;

        if patch.is_empty() {
            return Ok(());
        }

        let matched = self.store.update_owned(id, task.owner_id, &patch).await?;
        if !matched {
            return Err(AccessError::Conflict);
        }

        Ok(())
    }

    /// Deletes a task the caller may mutate
    pub async fn delete(&self, identity: &Identity, raw_id: &str) -> Result<(), AccessError> {
        let id = parse_task_id(raw_id)?;

        let task = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(AccessError::NotFound)?;

        ensure_can_touch(identity, &task)?;

        let matched = self.store.delete_owned(id, task.owner_id).await?;
        if !matched {
            return Err(AccessError::Conflict);
        }

        Ok(())
    }
}

fn parse_task_id(raw: &str) -> Result<Uuid, AccessError> {
    Uuid::parse_str(raw).map_err(|_| AccessError::InvalidId)
}

fn ensure_can_touch(identity: &Identity, task: &TaskRecord) -> Result<(), AccessError> {
    if identity.role != Role::Admin && task.owner_id != identity.subject_id {
        return Err(AccessError::AccessDenied);
    }
    Ok(())
}

fn required_field(value: Option<String>) -> Result<String, AccessError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AccessError::Validation(
            "All task fields are required".to_string(),
        )),
    }
}

fn parse_required_due_date(raw: &str) -> Result<chrono::DateTime<chrono::Utc>, AccessError> {
    parse_due_date(raw).ok_or_else(|| {
        AccessError::Validation(
            "due_date must be an RFC 3339 instant or a YYYY-MM-DD date".to_string(),
        )
    })
}

fn parse_page_param(raw: Option<&str>, default: u32, name: &str) -> Result<u32, AccessError> {
    match raw {
        None => Ok(default),
        Some(s) => match s.parse::<u32>() {
            Ok(n) if n >= 1 => Ok(n),
            _ => Err(AccessError::Validation(format!(
                "{} must be a positive integer",
                name
            ))),
        },
    }
}

/// Builds the patch from a draft: present, non-empty fields only
///
/// Empty strings are treated as absent, matching the reference behavior of
/// skipping falsy fields; an unparsable due date is rejected rather than
/// silently dropped.
fn build_patch(draft: TaskDraft) -> Result<TaskPatch, AccessError> {
    let due_date = match draft.due_date.filter(|d| !d.is_empty()) {
        Some(raw) => Some(parse_required_due_date(&raw)?),
        None => None,
    };

    Ok(TaskPatch {
        title: draft.title.filter(|v| !v.is_empty()),
        description: draft.description.filter(|v| !v.is_empty()),
        priority: draft.priority.filter(|v| !v.is_empty()),
        status: draft.status.filter(|v| !v.is_empty()),
        due_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryTaskStore;

    fn identity(role: Role) -> Identity {
        Identity {
            subject_id: Uuid::new_v4(),
            email: "user@example.com".to_string(),
            role,
            issued_at: 0,
            expires_at: 0,
        }
    }

    fn access() -> TaskAccess {
        TaskAccess::new(Arc::new(MemoryTaskStore::new()))
    }

    fn full_draft() -> TaskDraft {
        TaskDraft {
            title: Some("t".to_string()),
            description: Some("d".to_string()),
            priority: Some("high".to_string()),
            status: Some("open".to_string()),
            due_date: Some("2025-01-01".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_sets_owner_from_identity() {
        let access = access();
        let user = identity(Role::User);

        let id = access.create(&user, full_draft()).await.unwrap();

        let task = access.get_by_id(&user, &id.to_string()).await.unwrap();
        assert_eq!(task.owner_id, user.subject_id);
        assert_eq!(task.title, "t");
        assert_eq!(task.status, "open");
    }

    #[tokio::test]
    async fn test_create_rejects_missing_or_empty_fields() {
        let access = access();
        let user = identity(Role::User);

        for field in ["title", "description", "priority", "status", "due_date"] {
            let mut draft = full_draft();
            match field {
                "title" => draft.title = None,
                "description" => draft.description = Some(String::new()),
                "priority" => draft.priority = None,
                "status" => draft.status = Some(String::new()),
                "due_date" => draft.due_date = None,
                _ => unreachable!(),
            }

            let result = access.create(&user, draft).await;
            assert!(
                matches!(result, Err(AccessError::Validation(_))),
                "missing {} should fail validation",
                field
            );
        }
    }

    #[tokio::test]
    async fn test_create_rejects_unparsable_due_date() {
        let access = access();
        let user = identity(Role::User);

        let mut draft = full_draft();
        draft.due_date = Some("next tuesday".to_string());

        let result = access.create(&user, draft).await;
        assert!(matches!(result, Err(AccessError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_by_id_invalid_id_before_store() {
        let access = access();
        let user = identity(Role::User);

        for bad in ["", "123", "not-a-uuid", "zzzzzzzz-zzzz-zzzz-zzzz-zzzzzzzzzzzz"] {
            let result = access.get_by_id(&user, bad).await;
            assert!(matches!(result, Err(AccessError::InvalidId)), "'{}'", bad);
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let access = access();
        let user = identity(Role::User);

        let result = access.get_by_id(&user, &Uuid::new_v4().to_string()).await;
        assert!(matches!(result, Err(AccessError::NotFound)));
    }

    #[tokio::test]
    async fn test_ownership_matrix_on_get() {
        let access = access();
        let owner = identity(Role::User);
        let stranger = identity(Role::User);
        let admin = identity(Role::Admin);

        let id = access.create(&owner, full_draft()).await.unwrap();
        let raw = id.to_string();

        assert!(access.get_by_id(&owner, &raw).await.is_ok());
        assert!(matches!(
            access.get_by_id(&stranger, &raw).await,
            Err(AccessError::AccessDenied)
        ));

        let seen_by_admin = access.get_by_id(&admin, &raw).await.unwrap();
        assert_eq!(seen_by_admin.owner_id, owner.subject_id);
        assert_eq!(seen_by_admin.title, "t");
    }

    #[tokio::test]
    async fn test_update_applies_only_present_fields() {
        let access = access();
        let owner = identity(Role::User);

        let id = access.create(&owner, full_draft()).await.unwrap();
        let raw = id.to_string();

        let patch_draft = TaskDraft {
            status: Some("done".to_string()),
            ..Default::default()
        };
        access.update(&owner, &raw, patch_draft).await.unwrap();

        let task = access.get_by_id(&owner, &raw).await.unwrap();
        assert_eq!(task.status, "done");
        assert_eq!(task.title, "t");
        assert_eq!(task.description, "d");
        assert_eq!(task.priority, "high");
        assert_eq!(task.due_date, parse_due_date("2025-01-01").unwrap());
        assert_eq!(task.owner_id, owner.subject_id);
    }

    #[tokio::test]
    async fn test_update_due_date_does_not_touch_owner() {
        // Updating the due date must never reassign the task to the caller.
        let access = access();
        let owner = identity(Role::User);
        let admin = identity(Role::Admin);

        let id = access.create(&owner, full_draft()).await.unwrap();
        let raw = id.to_string();

        let patch_draft = TaskDraft {
            due_date: Some("2025-06-01".to_string()),
            ..Default::default()
        };
        access.update(&admin, &raw, patch_draft).await.unwrap();

        let task = access.get_by_id(&admin, &raw).await.unwrap();
        assert_eq!(task.owner_id, owner.subject_id);
        assert_eq!(task.due_date, parse_due_date("2025-06-01").unwrap());
    }

    #[tokio::test]
    async fn test_update_denied_for_non_owner() {
        let access = access();
        let owner = identity(Role::User);
        let stranger = identity(Role::User);

        let id = access.create(&owner, full_draft()).await.unwrap();
        let raw = id.to_string();

        let patch_draft = TaskDraft {
            status: Some("done".to_string()),
            ..Default::default()
        };
        let result = access.update(&stranger, &raw, patch_draft).await;
        assert!(matches!(result, Err(AccessError::AccessDenied)));

        // Untouched
        let task = access.get_by_id(&owner, &raw).await.unwrap();
        assert_eq!(task.status, "open");
    }

    #[tokio::test]
    async fn test_update_empty_patch_is_a_checked_no_op() {
        let access = access();
        let owner = identity(Role::User);
        let stranger = identity(Role::User);

        let id = access.create(&owner, full_draft()).await.unwrap();
        let raw = id.to_string();

        // Empty fields are treated as absent
        let noop = TaskDraft {
            title: Some(String::new()),
            ..Default::default()
        };
        access.update(&owner, &raw, noop.clone()).await.unwrap();

        // Even a no-op is permission-checked
        let result = access.update(&stranger, &raw, noop).await;
        assert!(matches!(result, Err(AccessError::AccessDenied)));
    }

    #[tokio::test]
    async fn test_update_rejects_bad_due_date_before_store() {
        let access = access();
        let owner = identity(Role::User);

        let patch_draft = TaskDraft {
            due_date: Some("garbage".to_string()),
            ..Default::default()
        };

        // Validation fires even though the id does not exist: inputs are
        // checked before the store is consulted.
        let result = access
            .update(&owner, &Uuid::new_v4().to_string(), patch_draft)
            .await;
        assert!(matches!(result, Err(AccessError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_ownership_matrix() {
        let access = access();
        let owner = identity(Role::User);
        let stranger = identity(Role::User);
        let admin = identity(Role::Admin);

        let first = access.create(&owner, full_draft()).await.unwrap();
        let second = access.create(&owner, full_draft()).await.unwrap();

        let result = access.delete(&stranger, &first.to_string()).await;
        assert!(matches!(result, Err(AccessError::AccessDenied)));

        access.delete(&owner, &first.to_string()).await.unwrap();
        access.delete(&admin, &second.to_string()).await.unwrap();

        assert!(matches!(
            access.get_by_id(&owner, &first.to_string()).await,
            Err(AccessError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_delete_invalid_and_missing_ids() {
        let access = access();
        let user = identity(Role::User);

        assert!(matches!(
            access.delete(&user, "not-a-uuid").await,
            Err(AccessError::InvalidId)
        ));
        assert!(matches!(
            access.delete(&user, &Uuid::new_v4().to_string()).await,
            Err(AccessError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_scopes_non_admin_to_own_tasks() {
        let access = access();
        let alice = identity(Role::User);
        let bob = identity(Role::User);
        let admin = identity(Role::Admin);

        for _ in 0..3 {
            access.create(&alice, full_draft()).await.unwrap();
        }
        for _ in 0..2 {
            access.create(&bob, full_draft()).await.unwrap();
        }

        let page = access.list(&alice, ListParams::default()).await.unwrap();
        assert_eq!(page.tasks.len(), 3);
        assert!(page.tasks.iter().all(|t| t.owner_id == alice.subject_id));

        let page = access.list(&admin, ListParams::default()).await.unwrap();
        assert_eq!(page.tasks.len(), 5);
    }

    #[tokio::test]
    async fn test_list_filters_and_pagination() {
        let access = access();
        let user = identity(Role::User);

        for i in 1..=12 {
            let mut draft = full_draft();
            draft.due_date = Some(format!("2025-01-{:02}", i));
            draft.priority = Some(if i <= 6 { "high" } else { "low" }.to_string());
            access.create(&user, draft).await.unwrap();
        }

        // Defaults: page 1, size 10
        let page = access.list(&user, ListParams::default()).await.unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 10);
        assert_eq!(page.tasks.len(), 10);

        // Second page picks up the remainder
        let page = access
            .list(
                &user,
                ListParams {
                    page: Some("2".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(page.tasks.len(), 2);

        // Priority filter
        let page = access
            .list(
                &user,
                ListParams {
                    priority: Some("low".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(page.tasks.len(), 6);

        // Due-date lower bound
        let page = access
            .list(
                &user,
                ListParams {
                    due_date_from: Some("2025-01-10".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(page.tasks.len(), 3);
    }

    #[tokio::test]
    async fn test_list_rejects_unparsable_parameters() {
        let access = access();
        let user = identity(Role::User);

        for (page, page_size) in [
            (Some("abc"), None),
            (Some("0"), None),
            (Some("-1"), None),
            (None, Some("ten")),
            (None, Some("0")),
        ] {
            let params = ListParams {
                page: page.map(String::from),
                page_size: page_size.map(String::from),
                ..Default::default()
            };
            let result = access.list(&user, params).await;
            assert!(
                matches!(result, Err(AccessError::Validation(_))),
                "page={:?} page_size={:?}",
                page,
                page_size
            );
        }

        let params = ListParams {
            due_date_from: Some("whenever".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            access.list(&user, params).await,
            Err(AccessError::Validation(_))
        ));
    }
}
