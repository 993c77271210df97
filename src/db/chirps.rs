use sqlx::sqlite::SqlitePool;
use uuid::Uuid;

/// A chirp (short public post).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chirp {
    pub id: Uuid,
    pub user_id: Uuid,
    pub body: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(sqlx::FromRow)]
struct ChirpRow {
    id: String,
    user_id: String,
    body: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ChirpRow> for Chirp {
    type Error = sqlx::Error;

    fn try_from(row: ChirpRow) -> Result<Self, Self::Error> {
        let parse = |s: &str| Uuid::parse_str(s).map_err(|e| sqlx::Error::Decode(Box::new(e)));
        Ok(Self {
            id: parse(&row.id)?,
            user_id: parse(&row.user_id)?,
            body: row.body,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct ChirpStore {
    pool: SqlitePool,
}

impl ChirpStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: Uuid, body: &str) -> Result<Chirp, sqlx::Error> {
        let row: ChirpRow = sqlx::query_as(
            "INSERT INTO chirps (id, user_id, body) VALUES (?, ?, ?)
             RETURNING id, user_id, body, created_at, updated_at",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id.to_string())
        .bind(body)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    /// All chirps, optionally only one author's, oldest first.
    pub async fn list(&self, author: Option<Uuid>) -> Result<Vec<Chirp>, sqlx::Error> {
        let rows: Vec<ChirpRow> = match author {
            Some(author) => {
                sqlx::query_as(
                    "SELECT id, user_id, body, created_at, updated_at FROM chirps
                     WHERE user_id = ? ORDER BY created_at ASC, rowid ASC",
                )
                .bind(author.to_string())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    "SELECT id, user_id, body, created_at, updated_at FROM chirps
                     ORDER BY created_at ASC, rowid ASC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        rows.into_iter().map(Chirp::try_from).collect()
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Chirp>, sqlx::Error> {
        let row: Option<ChirpRow> = sqlx::query_as(
            "SELECT id, user_id, body, created_at, updated_at FROM chirps WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Chirp::try_from).transpose()
    }

    /// Delete a chirp. Returns true if a row was deleted.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM chirps WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
