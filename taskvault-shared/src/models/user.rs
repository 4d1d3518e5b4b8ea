/// User records and roles
///
/// A user is an identity with an email, a one-way password hash, and one of
/// two roles. Records are created at registration and never mutated or
/// deleted afterwards.
///
/// # Roles
///
/// The role is a strict two-variant enum everywhere inside the system.
/// External representations vary: the wire historically carried both the
/// strings `"admin"`/`"user"` and the integers `0`/`1` (0 being the
/// privileged role). [`RoleWire`] accepts all of them and collapses to
/// [`Role`] at the boundary; nothing past the boundary ever sees the legacy
/// encoding.
///
/// # Example
///
/// ```
/// use taskvault_shared::models::user::{Role, RoleWire};
///
/// let role: Role = RoleWire::Legacy(0).try_into().unwrap();
/// assert_eq!(role, Role::Admin);
/// assert_eq!(role.as_str(), "admin");
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User role
///
/// `Admin` may act on every task and list user accounts; `User` is scoped
/// to tasks they own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Privileged role: sees and mutates all tasks
    Admin,

    /// Default role: scoped to owned tasks
    User,
}

impl Role {
    /// Display label for the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

/// External role representation as it appears in request payloads
///
/// Requests may carry the role as a string or as a legacy integer. This
/// type exists only at the deserialization edge; convert with `try_into()`
/// before handing anything to business logic.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RoleWire {
    /// Integer encoding: `0` = admin, `1` = user
    Legacy(i64),

    /// String encoding: `"admin"`/`"user"`, or the integer forms as strings
    Name(String),
}

impl TryFrom<RoleWire> for Role {
    type Error = String;

    fn try_from(wire: RoleWire) -> Result<Self, Self::Error> {
        match wire {
            RoleWire::Legacy(0) => Ok(Role::Admin),
            RoleWire::Legacy(1) => Ok(Role::User),
            RoleWire::Legacy(n) => Err(format!("Unknown role: {}", n)),
            RoleWire::Name(s) => match s.as_str() {
                "admin" | "0" => Ok(Role::Admin),
                "user" | "1" => Ok(Role::User),
                _ => Err(format!("Unknown role: {}", s)),
            },
        }
    }
}

/// Persisted user record
///
/// The password hash never leaves the store layer in responses; use
/// [`UserProfile`] for anything client-facing.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRecord {
    /// Unique user id (UUID v4, store-generated)
    pub id: Uuid,

    /// Email address, stored case-sensitive
    ///
    /// Uniqueness is enforced by an existence check before insert, not by a
    /// store-level constraint; concurrent registrations can race.
    pub email: String,

    /// Argon2id password hash (PHC string)
    pub password_hash: String,

    /// Role, fixed at registration
    pub role: Role,

    /// Optional display name
    pub username: Option<String>,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user record
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Email address
    pub email: String,

    /// Argon2id password hash (never the plaintext password)
    pub password_hash: String,

    /// Role collapsed from its wire representation
    pub role: Role,

    /// Optional display name
    pub username: Option<String>,
}

/// Client-facing view of a user record, without the password hash
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    /// User id
    pub id: Uuid,

    /// Email address
    pub email: String,

    /// Role label (`"admin"` or `"user"`)
    pub role: Role,

    /// Optional display name
    pub username: Option<String>,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for UserProfile {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
            username: user.username,
            created_at: user.created_at,
        }
    }
}
