/// User listing endpoint
///
/// # Endpoints
///
/// - `GET /users` - list all user accounts (admin only)
///
/// The role gate in the router admits admins exclusively; everyone else is
/// rejected before this handler runs. Records are returned without their
/// password hashes.

use axum::{extract::State, Json};
use serde::Serialize;

use taskvault_shared::models::user::UserProfile;

use crate::{app::AppState, error::ApiResult};

/// User listing response
#[derive(Debug, Serialize)]
pub struct UsersResponse {
    /// All user accounts, oldest first
    pub users: Vec<UserProfile>,
}

/// Lists all user accounts
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<UsersResponse>> {
    let users = state
        .credentials
        .list()
        .await?
        .into_iter()
        .map(UserProfile::from)
        .collect();

    Ok(Json(UsersResponse { users }))
}
