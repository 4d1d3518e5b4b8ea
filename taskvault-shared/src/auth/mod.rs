/// Authentication and authorization utilities
///
/// This module provides the security primitives for taskvault:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: signed identity tokens (issue and verify)
/// - [`middleware`]: request authentication and role-gate layers for Axum
/// - [`authorization`]: pure role-based admit/deny checks
///
/// # Security Properties
///
/// - **Password Hashing**: Argon2id with per-password random salts
/// - **Tokens**: HS256-signed, fixed one-hour validity window
/// - **Trust model**: the role inside a verified token is authoritative for
///   the token's lifetime; a role change in the credential store takes
///   effect only once existing tokens expire

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
