//! Party (supplier) storage.

use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct PartyStore {
    pool: SqlitePool,
}

/// A supplier/party record as returned by the suppliers listing.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct Party {
    pub uuid: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl PartyStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new party. Returns the row ID.
    pub async fn create(
        &self,
        uuid: &str,
        name: &str,
        contact: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query("INSERT INTO parties (uuid, name, contact) VALUES (?, ?, ?)")
            .bind(uuid)
            .bind(name)
            .bind(contact)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// List all parties, alphabetically.
    pub async fn list(&self) -> Result<Vec<Party>, sqlx::Error> {
        sqlx::query_as("SELECT uuid, name, contact, created_at FROM parties ORDER BY name")
            .fetch_all(&self.pool)
            .await
    }
}
