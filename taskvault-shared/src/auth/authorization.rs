/// Role-based admit/deny checks
///
/// Authorization here is a pure function of the verified identity and the
/// role set an endpoint admits. It never consults a store and never looks
/// at business data; row-level ownership is enforced separately by the task
/// access layer, after this gate has passed.
///
/// # Example
///
/// ```
/// use taskvault_shared::auth::authorization::authorize;
/// use taskvault_shared::auth::middleware::Identity;
/// use taskvault_shared::models::user::Role;
/// use uuid::Uuid;
///
/// let identity = Identity {
///     subject_id: Uuid::new_v4(),
///     email: "user@example.com".to_string(),
///     role: Role::User,
///     issued_at: 0,
///     expires_at: 0,
/// };
///
/// assert!(authorize(&identity, &[Role::Admin, Role::User]).is_ok());
/// assert!(authorize(&identity, &[Role::Admin]).is_err());
/// ```

use super::middleware::Identity;
use crate::models::user::Role;

/// Outcome of a failed authorization check
#[derive(Debug, thiserror::Error)]
#[error("Access denied")]
pub struct Denied;

/// Admits the identity iff its role is in the allowed set
pub fn authorize(identity: &Identity, allowed_roles: &[Role]) -> Result<(), Denied> {
    if allowed_roles.contains(&identity.role) {
        Ok(())
    } else {
        Err(Denied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn identity(role: Role) -> Identity {
        Identity {
            subject_id: Uuid::new_v4(),
            email: "user@example.com".to_string(),
            role,
            issued_at: 0,
            expires_at: 0,
        }
    }

    #[test]
    fn test_admits_member_of_allowed_set() {
        assert!(authorize(&identity(Role::User), &[Role::Admin, Role::User]).is_ok());
        assert!(authorize(&identity(Role::Admin), &[Role::Admin, Role::User]).is_ok());
        assert!(authorize(&identity(Role::Admin), &[Role::Admin]).is_ok());
    }

    #[test]
    fn test_denies_role_outside_allowed_set() {
        assert!(authorize(&identity(Role::User), &[Role::Admin]).is_err());
        assert!(authorize(&identity(Role::Admin), &[Role::User]).is_err());
        assert!(authorize(&identity(Role::User), &[]).is_err());
    }
}
