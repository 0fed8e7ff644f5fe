/// User model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     username TEXT NOT NULL UNIQUE,
///     password_hash TEXT NOT NULL,
///     phone TEXT
/// );
/// ```
///
/// Usernames are stored already normalized (see
/// [`crate::auth::credentials::normalize_username`]); this module does not
/// normalize on its own.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Row ID
    pub id: i64,

    /// Normalized username, unique
    pub username: String,

    /// Argon2id PHC hash; never a plaintext password
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Phone number for weather alerts
    pub phone: Option<String>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Normalized username
    pub username: String,

    /// Argon2id hash (NOT a plaintext password!)
    pub password_hash: String,

    /// Optional phone number
    pub phone: Option<String>,
}

impl User {
    /// Inserts a new user and returns the stored row
    ///
    /// # Errors
    ///
    /// Returns a database error on unique constraint violation (duplicate
    /// username) or connection failure.
    pub async fn create(pool: &SqlitePool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, phone)
            VALUES (?, ?, ?)
            RETURNING id, username, password_hash, phone
            "#,
        )
        .bind(data.username)
        .bind(data.password_hash)
        .bind(data.phone)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by exact (already normalized) username
    pub async fn find_by_username(
        pool: &SqlitePool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, phone
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists users that registered a non-empty phone number, ordered by ID
    pub async fn list_with_phone(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, phone
            FROM users
            WHERE phone IS NOT NULL AND phone <> ''
            ORDER BY id
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Counts all users
    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn new_user(username: &str, phone: Option<&str>) -> CreateUser {
        CreateUser {
            username: username.to_string(),
            password_hash: "$argon2id$v=19$m=65536,t=3,p=4$c2FsdA$aGFzaA".to_string(),
            phone: phone.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let pool = test_pool().await;

        let created = User::create(&pool, new_user("farmer1", Some("+254700000001")))
            .await
            .unwrap();
        assert!(created.id > 0);

        let found = User::find_by_username(&pool, "farmer1").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.phone.as_deref(), Some("+254700000001"));
    }

    #[tokio::test]
    async fn test_find_missing_returns_none() {
        let pool = test_pool().await;
        assert!(User::find_by_username(&pool, "nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unique_username_enforced() {
        let pool = test_pool().await;

        User::create(&pool, new_user("farmer1", None)).await.unwrap();
        let err = User::create(&pool, new_user("farmer1", None)).await.unwrap_err();

        match err {
            sqlx::Error::Database(db_err) => assert!(db_err.is_unique_violation()),
            other => panic!("expected unique violation, got {:?}", other),
        }
        assert_eq!(User::count(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_with_phone_skips_missing_numbers() {
        let pool = test_pool().await;

        User::create(&pool, new_user("a", Some("+1555000001"))).await.unwrap();
        User::create(&pool, new_user("b", None)).await.unwrap();
        User::create(&pool, new_user("c", Some(""))).await.unwrap();
        User::create(&pool, new_user("d", Some("+1555000004"))).await.unwrap();

        let names: Vec<String> = User::list_with_phone(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, vec!["a", "d"]);
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: 1,
            username: "farmer1".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            phone: None,
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
    }
}
