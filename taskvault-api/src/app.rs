/// Application state and router builder
///
/// This module defines the shared application state and builds the Axum
/// router with all routes and middleware. Route groups encode the access
/// policy:
///
/// ```text
/// /
/// ├── GET  /health          # public
/// ├── POST /register        # public (precedes authentication)
/// ├── POST /login           # public (precedes authentication)
/// ├── GET  /users           # authenticated, admin only
/// ├── POST /task            # authenticated, admin or user
/// ├── GET  /tasks           # authenticated, admin or user
/// └── GET/PUT/DELETE /tasks/:id
/// ```
///
/// Ownership within the task routes is enforced further down, by the task
/// access layer; the router only gates on role.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use taskvault_shared::auth::jwt::TokenService;
use taskvault_shared::auth::middleware::{
    authenticate, authorization_header, require_roles, AuthError,
};
use taskvault_shared::models::user::Role;
use taskvault_shared::store::{CredentialStore, TaskStore};
use taskvault_shared::tasks::TaskAccess;

use crate::config::Config;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; the store
/// handles and token service are behind `Arc`s, so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// User credential store
    pub credentials: Arc<dyn CredentialStore>,

    /// Ownership-aware task operations
    pub tasks: TaskAccess,

    /// Token issuing and verification
    pub tokens: Arc<TokenService>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    ///
    /// The token service is built here from the configured signing secret;
    /// nothing else ever sees the secret.
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        task_store: Arc<dyn TaskStore>,
        config: Config,
    ) -> Self {
        Self {
            credentials,
            tasks: TaskAccess::new(task_store),
            tokens: Arc::new(TokenService::new(&config.jwt.secret)),
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Public routes: health and the credential flows that precede
    // authentication
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    // Admin-only user listing
    let user_routes = Router::new()
        .route("/users", get(routes::users::list_users))
        .layer(axum::middleware::from_fn(require_roles(&[Role::Admin])))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            bearer_auth_layer,
        ));

    // Task routes: both roles pass the gate; ownership is decided later
    let task_routes = Router::new()
        .route("/task", post(routes::tasks::create_task))
        .route("/tasks", get(routes::tasks::list_tasks))
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .layer(axum::middleware::from_fn(require_roles(&[
            Role::Admin,
            Role::User,
        ])))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            bearer_auth_layer,
        ));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
    };

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(task_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Bearer authentication middleware layer
///
/// Verifies the `Authorization` header and injects the resulting
/// [`taskvault_shared::auth::middleware::Identity`] into request
/// extensions for the role gate and the handlers.
async fn bearer_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let identity = authenticate(&state.tokens, authorization_header(&req))?;

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}
