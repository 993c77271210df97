use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use uuid::Uuid;

use crate::auth::{StoreError, UserDirectory};

#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub hashed_password: String,
    pub is_chirpy_red: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    hashed_password: String,
    is_chirpy_red: i32,
    created_at: String,
    updated_at: String,
}

impl TryFrom<UserRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&row.id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            email: row.email,
            hashed_password: row.hashed_password,
            is_chirpy_red: row.is_chirpy_red != 0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// True if the error is a UNIQUE constraint violation (e.g. duplicate email).
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(e) if e.is_unique_violation())
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user with a fresh id.
    pub async fn create(&self, email: &str, hashed_password: &str) -> Result<User, sqlx::Error> {
        let row: UserRow = sqlx::query_as(
            "INSERT INTO users (id, email, hashed_password) VALUES (?, ?, ?)
             RETURNING id, email, hashed_password, is_chirpy_red, created_at, updated_at",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, hashed_password, is_chirpy_red, created_at, updated_at
             FROM users WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.map(User::try_from).transpose()
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, hashed_password, is_chirpy_red, created_at, updated_at
             FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        row.map(User::try_from).transpose()
    }

    /// Replace a user's email and password hash. Returns `None` if the user
    /// does not exist.
    pub async fn update(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            "UPDATE users SET email = ?, hashed_password = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
             WHERE id = ?
             RETURNING id, email, hashed_password, is_chirpy_red, created_at, updated_at",
        )
        .bind(email)
        .bind(hashed_password)
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.map(User::try_from).transpose()
    }

    /// Mark a user as Chirpy Red. Returns false if the user does not exist.
    pub async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET is_chirpy_red = 1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?",
        )
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every user. Chirps and refresh tokens go with them.
    pub async fn delete_all(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl UserDirectory for UserStore {
    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.get_by_id(id).await?)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.get_by_email(email).await?)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::Database;

    #[tokio::test]
    async fn test_create_and_get_user() {
        let db = Database::open(":memory:").await.unwrap();

        let user = db.users().create("alice@example.com", "hash").await.unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.hashed_password, "hash");
        assert!(!user.is_chirpy_red);
        assert!(user.created_at.ends_with('Z'));

        let by_id = db.users().get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id, user);

        let by_email = db
            .users()
            .get_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, user.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_fails() {
        let db = Database::open(":memory:").await.unwrap();

        db.users().create("alice@example.com", "h1").await.unwrap();
        let err = db.users().create("alice@example.com", "h2").await.unwrap_err();

        assert!(super::is_unique_violation(&err));
    }

    #[tokio::test]
    async fn test_update_user() {
        let db = Database::open(":memory:").await.unwrap();
        let user = db.users().create("old@example.com", "h1").await.unwrap();

        let updated = db
            .users()
            .update(user.id, "new@example.com", "h2")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, user.id);
        assert_eq!(updated.email, "new@example.com");
        assert_eq!(updated.hashed_password, "h2");
        assert_eq!(updated.created_at, user.created_at);
        assert!(db.users().get_by_email("old@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let db = Database::open(":memory:").await.unwrap();
        let result = db
            .users()
            .update(uuid::Uuid::new_v4(), "x@example.com", "h")
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_upgrade_to_chirpy_red() {
        let db = Database::open(":memory:").await.unwrap();
        let user = db.users().create("a@b.c", "h").await.unwrap();

        assert!(db.users().upgrade_to_chirpy_red(user.id).await.unwrap());
        assert!(db.users().get_by_id(user.id).await.unwrap().unwrap().is_chirpy_red);

        assert!(
            !db.users()
                .upgrade_to_chirpy_red(uuid::Uuid::new_v4())
                .await
                .unwrap()
        );
    }
}
