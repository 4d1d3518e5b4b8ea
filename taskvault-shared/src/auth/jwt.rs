/// Signed identity tokens
///
/// This module implements the token service: it turns an authenticated user
/// into a signed, time-bounded identity assertion and verifies such
/// assertions on inbound requests.
///
/// # Properties
///
/// - **Algorithm**: HS256 (HMAC-SHA256)
/// - **Validity**: fixed one-hour window from the moment of issue
/// - **Secret**: process-wide, injected once at startup, never rotated
///   during a process lifetime
/// - **Trust**: any verification failure is a hard rejection; there is no
///   partial trust in an expired or tampered token
///
/// # Example
///
/// ```
/// use taskvault_shared::auth::jwt::TokenService;
/// use taskvault_shared::models::user::Role;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tokens = TokenService::new("secret-key-at-least-32-bytes-long!!");
///
/// let token = tokens.issue(Uuid::new_v4(), "user@example.com", Role::User)?;
/// let claims = tokens.verify(&token)?;
/// assert_eq!(claims.role, Role::User);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::Role;

/// Seconds a freshly issued token stays valid.
const TOKEN_TTL_SECS: i64 = 3600;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Token cannot be parsed or decoded
    #[error("Malformed token")]
    Malformed,

    /// Token signature does not match the signing secret
    #[error("Invalid token signature")]
    SignatureInvalid,

    /// Token is past its expiry instant
    #[error("Token has expired")]
    Expired,

    /// Failed to sign a new token
    #[error("Failed to sign token: {0}")]
    Signing(String),
}

/// Claims carried inside a signed token
///
/// - `sub`: subject id (the user's id)
/// - `email`: the subject's email at issue time
/// - `role`: the subject's role at issue time; trusted for the token's
///   lifetime without re-checking the credential store
/// - `iat` / `exp`: issue and expiry instants (Unix timestamps)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user id
    pub sub: Uuid,

    /// Email address at issue time
    pub email: String,

    /// Role at issue time
    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims with the standard one-hour validity window
    pub fn new(subject_id: Uuid, email: String, role: Role) -> Self {
        Self::with_validity(subject_id, email, role, Duration::seconds(TOKEN_TTL_SECS))
    }

    /// Creates claims with a custom validity window
    ///
    /// A negative duration produces an already-expired claim set, which is
    /// useful for exercising expiry handling in tests.
    pub fn with_validity(subject_id: Uuid, email: String, role: Role, validity: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: subject_id,
            email,
            role,
            iat: now.timestamp(),
            exp: (now + validity).timestamp(),
        }
    }

    /// Checks whether the claims are past their expiry instant
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Issues and verifies signed identity tokens
///
/// Holds the signing secret for the lifetime of the process. Constructed
/// once at startup from configuration and shared across requests; performs
/// no I/O.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    /// Creates a token service from the signing secret
    ///
    /// The caller is responsible for refusing to start with a missing or
    /// weak secret; see the API server's configuration loading.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact: a token one second past `exp` is already invalid.
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issues a token for the given subject with the standard validity window
    pub fn issue(&self, subject_id: Uuid, email: &str, role: Role) -> Result<String, TokenError> {
        self.sign(&Claims::new(subject_id, email.to_string(), role))
    }

    /// Signs an explicit claim set
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verifies a token and extracts its claims
    ///
    /// # Errors
    ///
    /// - `TokenError::Expired` when the token is past its expiry instant
    /// - `TokenError::SignatureInvalid` when the signature does not verify
    /// - `TokenError::Malformed` for anything that cannot be decoded
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let token_data =
            decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        TokenError::SignatureInvalid
                    }
                    _ => TokenError::Malformed,
                }
            })?;

        Ok(token_data.claims)
    }
}
