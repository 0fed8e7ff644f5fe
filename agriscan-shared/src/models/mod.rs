/// Database models
///
/// - `user`: User accounts
///
/// # Example
///
/// ```no_run
/// use agriscan_shared::models::user::{CreateUser, User};
/// use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool) -> Result<(), sqlx::Error> {
/// let user = User::create(
///     &pool,
///     CreateUser {
///         username: "farmer1".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///         phone: None,
///     },
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```

pub mod user;
