/// User model and database operations
///
/// This module provides the User model, its CRUD operations, and the
/// identity-uniqueness guard that keeps usernames and emails globally
/// unique across the account population.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id            BIGSERIAL PRIMARY KEY,
///     username      VARCHAR(255) NOT NULL UNIQUE,
///     email         VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Uniqueness
///
/// Every write of the (username, email) pair goes through a two-layer
/// check: [`User::check_conflict`] probes for an existing holder before
/// the write, and the table's UNIQUE constraints catch whatever races
/// past the probe. Both layers are translated into the same
/// [`UserStoreError`] variants, so callers see a single conflict shape
/// no matter which layer rejected the write.
///
/// # Example
///
/// ```no_run
/// use tasknest_shared::models::user::{User, CreateUser};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let user = User::create(&pool, CreateUser {
///     username: "alice".to_string(),
///     email: "alice@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// }).await?;
/// println!("Created user: {}", user.id);
/// # Ok(())
/// # }
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// User model representing an account
///
/// Passwords are stored as Argon2id hashes, never in plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (store-assigned, immutable)
    pub id: i64,

    /// Username, unique across all users
    pub username: String,

    /// Email address, unique across all users
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// When the account was created (store-assigned)
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,

    /// Argon2id hash, not a plaintext password
    pub password_hash: String,
}

/// Input for replacing a user's identity fields
///
/// Updates are whole-record: username, email and password hash are all
/// written together. The id and creation timestamp are immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Which identity field an existing record already holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityConflict {
    UsernameTaken,
    EmailTaken,
}

impl IdentityConflict {
    /// Classifies a collision against an existing record.
    ///
    /// Username takes precedence: when the existing record collides on
    /// both fields, the conflict is reported as `UsernameTaken`.
    pub fn classify(existing_username: &str, candidate_username: &str) -> Self {
        if existing_username == candidate_username {
            IdentityConflict::UsernameTaken
        } else {
            IdentityConflict::EmailTaken
        }
    }
}

/// Error type for user store operations
///
/// The two conflict variants are produced both by the pre-write probe
/// and by translation of the store's unique-constraint rejection, so a
/// racing writer and a sequential one receive the identical error.
#[derive(Debug, thiserror::Error)]
pub enum UserStoreError {
    #[error("Username already exists")]
    UsernameTaken,

    #[error("Email already exists")]
    EmailTaken,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<IdentityConflict> for UserStoreError {
    fn from(conflict: IdentityConflict) -> Self {
        match conflict {
            IdentityConflict::UsernameTaken => UserStoreError::UsernameTaken,
            IdentityConflict::EmailTaken => UserStoreError::EmailTaken,
        }
    }
}

/// Maps a unique-constraint violation to the colliding identity field.
///
/// Returns `None` for every other error, including other constraint
/// violations.
pub fn classify_unique_violation(err: &sqlx::Error) -> Option<IdentityConflict> {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(constraint) = db_err.constraint() {
            if constraint.contains("username") {
                return Some(IdentityConflict::UsernameTaken);
            }
            if constraint.contains("email") {
                return Some(IdentityConflict::EmailTaken);
            }
        }
    }
    None
}

impl UserStoreError {
    fn from_write_error(err: sqlx::Error) -> Self {
        match classify_unique_violation(&err) {
            Some(conflict) => conflict.into(),
            None => UserStoreError::Database(err),
        }
    }
}

impl User {
    /// Probes for an existing record already holding either identity field.
    ///
    /// The record identified by `exclude_id` is ignored, so a user can
    /// re-submit their own current values (`None` for creation).
    /// Username matches are ordered first, which keeps the
    /// username-before-email precedence even when the username and the
    /// email are held by two different records.
    ///
    /// This is a pre-check, not the final authority: a concurrent
    /// writer can still slip between probe and commit, in which case
    /// the table's UNIQUE constraint rejects the write and the
    /// rejection is classified to the same conflict.
    pub async fn check_conflict<'e, E>(
        executor: E,
        username: &str,
        email: &str,
        exclude_id: Option<i64>,
    ) -> Result<Option<IdentityConflict>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let existing: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT username
            FROM users
            WHERE (username = $1 OR email = $2)
              AND ($3::BIGINT IS NULL OR id <> $3)
            ORDER BY (username = $1) DESC
            LIMIT 1
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(exclude_id)
        .fetch_optional(executor)
        .await?;

        Ok(existing.map(|(existing_username,)| {
            IdentityConflict::classify(&existing_username, username)
        }))
    }

    /// Creates a new user
    ///
    /// Runs the uniqueness probe and the insert inside one transaction.
    /// Nothing is committed when either identity field is taken.
    ///
    /// # Errors
    ///
    /// - `UserStoreError::UsernameTaken` / `EmailTaken` on collision,
    ///   whether caught by the probe or by the store's constraint
    /// - `UserStoreError::Database` for any other database failure
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, UserStoreError> {
        let mut tx = pool.begin().await?;

        if let Some(conflict) =
            Self::check_conflict(&mut *tx, &data.username, &data.email, None).await?
        {
            return Err(conflict.into());
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(UserStoreError::from_write_error)?;

        tx.commit().await?;
        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds a user by username (credential lookup for login)
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await
    }

    /// Replaces a user's identity fields
    ///
    /// The uniqueness probe excludes the record itself, so submitting
    /// unchanged values is not a conflict. Probe and update share one
    /// transaction; a conflict discards the whole update.
    ///
    /// Returns `None` if no record with this id exists.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateUser,
    ) -> Result<Option<Self>, UserStoreError> {
        let mut tx = pool.begin().await?;

        if let Some(conflict) =
            Self::check_conflict(&mut *tx, &data.username, &data.email, Some(id)).await?
        {
            return Err(conflict.into());
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = $2, email = $3, password_hash = $4
            WHERE id = $1
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(id)
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.password_hash)
        .fetch_optional(&mut *tx)
        .await
        .map_err(UserStoreError::from_write_error)?;

        tx.commit().await?;
        Ok(user)
    }

    /// Deletes a user and every todo they own, atomically
    ///
    /// The cascade is an explicit two-statement transaction: owned
    /// todos first, then the user record. Either both take effect or
    /// neither does; no orphaned todo rows can survive.
    ///
    /// Returns true if the user existed and was deleted.
    pub async fn delete_cascading(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM todos WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// Lists users with pagination, oldest first
    ///
    /// Ordered by primary key so the same query against an unchanged
    /// table always yields the same sequence.
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            ORDER BY id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_username_match() {
        let conflict = IdentityConflict::classify("alice", "alice");
        assert_eq!(conflict, IdentityConflict::UsernameTaken);
    }

    #[test]
    fn test_classify_email_match_only() {
        // Existing record matched the probe but not on username, so the
        // collision must be on email.
        let conflict = IdentityConflict::classify("alice", "bob");
        assert_eq!(conflict, IdentityConflict::EmailTaken);
    }

    #[test]
    fn test_conflict_error_messages() {
        assert_eq!(
            UserStoreError::from(IdentityConflict::UsernameTaken).to_string(),
            "Username already exists"
        );
        assert_eq!(
            UserStoreError::from(IdentityConflict::EmailTaken).to_string(),
            "Email already exists"
        );
    }

    #[test]
    fn test_classify_unique_violation_ignores_other_errors() {
        assert!(classify_unique_violation(&sqlx::Error::RowNotFound).is_none());
        assert!(classify_unique_violation(&sqlx::Error::PoolClosed).is_none());
    }

    // Database-backed behavior (probe ordering, transactional cascade,
    // racing writers) is covered by the API integration tests.
}
