/// Session claims and the session guard
///
/// A session is an HS256-signed claim naming the authenticated username. The
/// signed token travels in an HttpOnly cookie; the guard trusts a valid claim
/// for its whole lifetime and never re-reads the `users` table.
///
/// # Claims
///
/// - `sub`: normalized username
/// - `iss`: always "agriscan"
/// - `iat` / `nbf`: issue time
/// - `exp`: issue time + session TTL
///
/// # Example
///
/// ```
/// use agriscan_shared::auth::session::{AuthDecision, SessionGuard};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let guard = SessionGuard::new("test-secret-key-at-least-32-bytes-long", 24);
/// let token = guard.issue("farmer1")?;
///
/// assert_eq!(
///     guard.require_auth(Some(&token)),
///     AuthDecision::Authorized("farmer1".to_string())
/// );
/// assert_eq!(guard.require_auth(None), AuthDecision::Unauthorized);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

const ISSUER: &str = "agriscan";

/// Error type for session token operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Failed to sign token
    #[error("Failed to create session token: {0}")]
    CreateError(String),

    /// Token signature, issuer or structure is invalid
    #[error("Invalid session token: {0}")]
    Invalid(String),

    /// Token has expired
    #[error("Session has expired")]
    Expired,
}

/// Session claim structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject - normalized username
    pub sub: String,

    /// Issuer - always "agriscan"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl SessionClaims {
    /// Creates claims for `username` expiring after `ttl`
    pub fn new(username: &str, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: username.to_string(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            nbf: now.timestamp(),
        }
    }
}

/// Signs session claims into a compact JWT
pub fn create_session_token(claims: &SessionClaims, secret: &str) -> Result<String, SessionError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| SessionError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates signature, issuer, `exp` and `nbf` and returns the claims
pub fn validate_session_token(token: &str, secret: &str) -> Result<SessionClaims, SessionError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.leeway = 0;

    let token_data = decode::<SessionClaims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
        _ => SessionError::Invalid(e.to_string()),
    })?;

    Ok(token_data.claims)
}

/// Outcome of the access check for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    /// The request carries a valid claim for this username
    Authorized(String),

    /// No claim, or the claim is forged or expired
    Unauthorized,
}

/// Decides whether a request is authenticated
///
/// Holds the signing secret and session lifetime. Cheap to clone.
#[derive(Clone)]
pub struct SessionGuard {
    secret: String,
    ttl: Duration,
}

impl SessionGuard {
    /// Creates a guard with the given signing secret and session lifetime
    pub fn new(secret: impl Into<String>, ttl_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Session lifetime, also used as the cookie `Max-Age`
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a signed session token for an already authenticated username
    pub fn issue(&self, username: &str) -> Result<String, SessionError> {
        create_session_token(&SessionClaims::new(username, self.ttl), &self.secret)
    }

    /// Checks the session token carried by a request
    ///
    /// Invalid tokens are logged at debug level and treated exactly like a
    /// missing token.
    pub fn require_auth(&self, token: Option<&str>) -> AuthDecision {
        let Some(token) = token else {
            return AuthDecision::Unauthorized;
        };

        match validate_session_token(token, &self.secret) {
            Ok(claims) => AuthDecision::Authorized(claims.sub),
            Err(e) => {
                tracing::debug!(error = %e, "Rejected session token");
                AuthDecision::Unauthorized
            }
        }
    }
}

impl std::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}
