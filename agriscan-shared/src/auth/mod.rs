/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing
/// - [`session`]: Signed session claims and the session guard
/// - [`credentials`]: User signup and login against the `users` table
///
/// # Example
///
/// ```no_run
/// use agriscan_shared::auth::credentials::CredentialStore;
/// use agriscan_shared::auth::session::{AuthDecision, SessionGuard};
/// use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
/// let store = CredentialStore::new(pool);
/// let user = store.create("Farmer1", "secret", None).await?;
///
/// let guard = SessionGuard::new("a-secret-that-is-at-least-32-bytes!!", 24);
/// let token = guard.issue(&user.username)?;
/// assert_eq!(
///     guard.require_auth(Some(&token)),
///     AuthDecision::Authorized("farmer1".to_string())
/// );
/// # Ok(())
/// # }
/// ```

pub mod credentials;
pub mod password;
pub mod session;
