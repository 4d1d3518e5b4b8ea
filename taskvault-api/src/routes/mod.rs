/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: liveness probe
/// - `auth`: credential flows (register, login)
/// - `users`: admin-only user listing
/// - `tasks`: ownership-scoped task CRUD

pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;
