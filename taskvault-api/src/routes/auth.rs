/// Credential flow endpoints
///
/// # Endpoints
///
/// - `POST /register` - create a user account
/// - `POST /login` - verify credentials and issue a token
///
/// Both precede authentication: no identity is required to call them.
///
/// Login deliberately returns one generic error for "no such user" and
/// "wrong password", so responses cannot be used to enumerate accounts.
/// The role claimed in a login request is required but carries no
/// authority: the issued token always asserts the STORED role.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use taskvault_shared::auth::password;
use taskvault_shared::models::user::{CreateUser, Role, RoleWire};

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};

/// Register request
///
/// `role` accepts the string labels as well as the legacy integer
/// encoding (`0` = admin, `1` = user).
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    pub email: Option<String>,

    /// Password (any non-empty value; hashed before storage)
    pub password: Option<String>,

    /// Requested role
    pub role: Option<RoleWire>,

    /// Optional display name
    #[validate(length(max = 100, message = "Username must be at most 100 characters"))]
    pub username: Option<String>,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// New user id
    pub user_id: Uuid,

    /// Stored role label
    pub role: Role,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address
    pub email: Option<String>,

    /// Password
    pub password: Option<String>,

    /// Claimed role; required for compatibility, ignored as authority
    pub role: Option<RoleWire>,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// User id
    pub user_id: Uuid,

    /// Signed identity token (one-hour validity)
    pub token: String,
}

/// Register a new user
///
/// # Errors
///
/// - `400 Bad Request`: missing/empty fields, bad email shape, unknown role
/// - `409 Conflict`: email already registered
/// - `500 Internal Server Error`: store or hashing failure
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    // Validate request
    req.validate().map_err(|e| {
        let errors: Vec<ValidationErrorDetail> = e
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        ApiError::ValidationError(errors)
    })?;

    let (Some(email), Some(password), Some(role_wire)) = (req.email, req.password, req.role) else {
        return Err(ApiError::BadRequest(
            "Email, password and role are required".to_string(),
        ));
    };

    if email.is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email, password and role are required".to_string(),
        ));
    }

    if !valid_email(&email) {
        return Err(ApiError::BadRequest("Invalid email format".to_string()));
    }

    let role = Role::try_from(role_wire).map_err(ApiError::BadRequest)?;

    // Read-then-write uniqueness check; a concurrent registration of the
    // same email can slip through this window
    if state.credentials.find_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let password_hash = password::hash_password(&password)?;

    let user = state
        .credentials
        .insert(CreateUser {
            email,
            password_hash,
            role,
            username: req.username,
        })
        .await?;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: user.id,
            role: user.role,
        }),
    ))
}

/// Login and obtain a token
///
/// # Errors
///
/// - `400 Bad Request`: missing fields
/// - `401 Unauthorized`: unknown email or wrong password (one generic
///   message for both)
/// - `500 Internal Server Error`: store or signing failure
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let (Some(email), Some(password), Some(_claimed_role)) = (req.email, req.password, req.role)
    else {
        return Err(ApiError::BadRequest(
            "Email, password and role are required".to_string(),
        ));
    };

    let user = state
        .credentials
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = password::verify_password(&password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    // The token asserts the stored role; the claimed role was only checked
    // for presence
    let token = state.tokens.issue(user.id, &user.email, user.role)?;

    Ok(Json(LoginResponse {
        user_id: user.id,
        token,
    }))
}

/// Checks the accepted email shape: exactly one `@`, non-empty local and
/// domain parts, a dot somewhere in the domain, no whitespace.
fn valid_email(email: &str) -> bool {
    if email.contains(char::is_whitespace) {
        return false;
    }

    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty() && !domain.is_empty() && domain.contains('.')
        }
        _ => false,
    }
}
