/// Task records and their edge types
///
/// A task is owned by the identity that created it; `owner_id` is set once
/// at creation and is immutable for the record's lifetime, no matter what an
/// update payload carries.
///
/// # Edge types
///
/// - [`TaskDraft`]: raw request payload; every field optional, unknown
///   fields (including any attempt to smuggle in an owner) ignored
/// - [`CreateTask`]: a validated draft, ready for insertion
/// - [`TaskPatch`]: explicit partial update where a field is either present
///   with a value or absent, and absent fields are left untouched
/// - [`TaskFilter`]: the store-side listing filter, including the optional
///   ownership restriction

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted task record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskRecord {
    /// Unique task id (UUID v4, store-generated)
    pub id: Uuid,

    /// Task title
    pub title: String,

    /// Task description
    pub description: String,

    /// Priority, free-form (e.g. "high")
    pub priority: String,

    /// Status, free-form (e.g. "open")
    pub status: String,

    /// When the task is due
    pub due_date: DateTime<Utc>,

    /// Id of the identity that created the task; immutable
    pub owner_id: Uuid,
}

/// Validated input for creating a task
///
/// Built by the access controller from a [`TaskDraft`]; the owner comes
/// from the caller's verified identity, never from the payload.
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub title: String,
    pub description: String,
    pub priority: String,
    pub status: String,
    pub due_date: DateTime<Utc>,
    pub owner_id: Uuid,
}

/// Raw task payload as it arrives on the wire
///
/// Used for both creation (where every field must be present and non-empty)
/// and update (where absent or empty fields are simply not applied). There
/// is deliberately no owner field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<String>,
}

/// Explicit partial update
///
/// Each field is `Some(value)` (apply) or `None` (leave untouched). The
/// owner cannot be expressed here at all.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskPatch {
    /// True when no field would be applied
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.due_date.is_none()
    }

    /// Applies the present fields to a record, leaving the rest untouched
    pub fn apply(&self, record: &mut TaskRecord) {
        if let Some(ref title) = self.title {
            record.title = title.clone();
        }
        if let Some(ref description) = self.description {
            record.description = description.clone();
        }
        if let Some(ref priority) = self.priority {
            record.priority = priority.clone();
        }
        if let Some(ref status) = self.status {
            record.status = status.clone();
        }
        if let Some(due_date) = self.due_date {
            record.due_date = due_date;
        }
    }
}

/// Store-side listing filter
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Exact priority match
    pub priority: Option<String>,

    /// Tasks due at or after this instant
    pub due_from: Option<DateTime<Utc>>,

    /// Restrict to a single owner (set for non-admin callers)
    pub owner: Option<Uuid>,
}

/// One page of task listing results
#[derive(Debug, Serialize)]
pub struct TaskPage {
    pub tasks: Vec<TaskRecord>,
    pub page: u32,
    pub page_size: u32,
}

/// Parses a due date from its accepted wire forms
///
/// Accepts RFC 3339 (`2025-01-01T09:00:00Z`) or a bare date
/// (`2025-01-01`, midnight UTC). Returns `None` for anything else.
pub fn parse_due_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
