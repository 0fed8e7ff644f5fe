/// Credential store: signup and login against the `users` table
///
/// Usernames are normalized (trimmed, lowercased) before every lookup and
/// insert, so `Farmer1`, ` farmer1 ` and `FARMER1` name the same account.
/// Duplicate signups and wrong passwords are ordinary outcomes reported as
/// [`CredentialError`] variants; only [`CredentialError::Storage`] and
/// [`CredentialError::Hashing`] indicate a fault.

use super::password::{hash_password, verify_password, PasswordError};
use crate::models::user::{CreateUser, User};
use sqlx::SqlitePool;

/// Error type for credential operations
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// A user with the same normalized username already exists
    #[error("Username already taken: {0}")]
    DuplicateUsername(String),

    /// No user with this normalized username
    #[error("User not found")]
    NotFound,

    /// Password does not match the stored hash
    #[error("Incorrect password")]
    BadPassword,

    /// Database unavailable or query failed
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// Hashing or verification itself failed
    #[error(transparent)]
    Hashing(#[from] PasswordError),
}

impl CredentialError {
    /// True for the expected outcomes of signup and login
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            CredentialError::DuplicateUsername(_)
                | CredentialError::NotFound
                | CredentialError::BadPassword
        )
    }
}

/// Normalizes a username for storage and lookup (trim + lowercase)
pub fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Creates and verifies user credentials
#[derive(Clone)]
pub struct CredentialStore {
    db: SqlitePool,
}

impl CredentialStore {
    /// Creates a store over the given pool
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Registers a new user
    ///
    /// The record is committed before this returns `Ok`. A duplicate
    /// normalized username fails without writing anything.
    pub async fn create(
        &self,
        username: &str,
        password: &str,
        phone: Option<String>,
    ) -> Result<User, CredentialError> {
        let username = normalize_username(username);

        if User::find_by_username(&self.db, &username).await?.is_some() {
            tracing::debug!(username = %username, "Signup rejected, username taken");
            return Err(CredentialError::DuplicateUsername(username));
        }

        let password_hash = hash_blocking(password.to_string()).await?;

        let result = User::create(
            &self.db,
            CreateUser {
                username: username.clone(),
                password_hash,
                phone,
            },
        )
        .await;

        match result {
            Ok(user) => {
                tracing::info!(user_id = user.id, username = %user.username, "User created");
                Ok(user)
            }
            // Lost a race with a concurrent signup for the same name
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(CredentialError::DuplicateUsername(username))
            }
            Err(e) => Err(CredentialError::Storage(e)),
        }
    }

    /// Checks a username/password pair and returns the matching user
    pub async fn verify(&self, username: &str, password: &str) -> Result<User, CredentialError> {
        let username = normalize_username(username);

        let user = User::find_by_username(&self.db, &username)
            .await?
            .ok_or(CredentialError::NotFound)?;

        let hash = user.password_hash.clone();
        let password = password.to_string();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| PasswordError::Verify(format!("Verifier task failed: {}", e)))??;

        if matches {
            Ok(user)
        } else {
            tracing::debug!(username = %username, "Login rejected, bad password");
            Err(CredentialError::BadPassword)
        }
    }
}

async fn hash_blocking(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| PasswordError::Hash(format!("Hasher task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[test]
    fn test_normalize_username() {
        assert_eq!(normalize_username("Farmer1"), "farmer1");
        assert_eq!(normalize_username("  FARMER1\t"), "farmer1");
        assert_eq!(normalize_username("   "), "");
    }

    #[tokio::test]
    async fn test_create_stores_normalized_username_and_hash() {
        let store = CredentialStore::new(test_pool().await);

        let user = store.create("Farmer1", "secret", None).await.unwrap();

        assert_eq!(user.username, "farmer1");
        assert!(user.password_hash.starts_with("$argon2id$"));
        assert_ne!(user.password_hash, "secret");
    }

    #[tokio::test]
    async fn test_create_then_verify() {
        let store = CredentialStore::new(test_pool().await);
        store.create("Farmer1", "secret", None).await.unwrap();

        let user = store.verify("FARMER1", "secret").await.unwrap();
        assert_eq!(user.username, "farmer1");

        assert!(matches!(
            store.verify("farmer1", "Secret").await,
            Err(CredentialError::BadPassword)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_differing_only_in_case() {
        let pool = test_pool().await;
        let store = CredentialStore::new(pool.clone());

        store.create("farmer1", "secret", None).await.unwrap();
        let err = store.create(" FARMER1 ", "other", Some("+1".into())).await.unwrap_err();

        assert!(matches!(err, CredentialError::DuplicateUsername(ref u) if u == "farmer1"));
        assert!(err.is_expected());
        assert_eq!(User::count(&pool).await.unwrap(), 1);

        // The first password still works
        assert!(store.verify("farmer1", "secret").await.is_ok());
    }

    #[tokio::test]
    async fn test_verify_unknown_user() {
        let store = CredentialStore::new(test_pool().await);

        let err = store.verify("ghost", "secret").await.unwrap_err();
        assert!(matches!(err, CredentialError::NotFound));
    }

    #[tokio::test]
    async fn test_phone_is_persisted() {
        let store = CredentialStore::new(test_pool().await);

        store
            .create("farmer2", "secret", Some("+254700000002".to_string()))
            .await
            .unwrap();

        let user = store.verify("farmer2", "secret").await.unwrap();
        assert_eq!(user.phone.as_deref(), Some("+254700000002"));
    }

    #[tokio::test]
    async fn test_storage_failure_is_surfaced() {
        let pool = test_pool().await;
        let store = CredentialStore::new(pool.clone());
        pool.close().await;

        let err = store.verify("farmer1", "secret").await.unwrap_err();
        assert!(matches!(err, CredentialError::Storage(_)));
        assert!(!err.is_expected());
    }
}
