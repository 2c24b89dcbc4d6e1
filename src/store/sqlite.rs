// src/store/sqlite.rs
// SQLite-backed conversation store (JSON columns, Unix timestamps)

use crate::error::{IntakeError, Result};
use crate::intake::Conversation;
use crate::store::ConversationStore;
use async_trait::async_trait;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS conversations (
    id TEXT PRIMARY KEY,
    state TEXT NOT NULL,
    questions_asked INTEGER NOT NULL,
    body TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
)
"#;

#[derive(Clone)]
pub struct SqliteConversationStore {
    pool: SqlitePool,
}

impl SqliteConversationStore {
    /// Open (creating if needed) the database at `database_url` and ensure the schema
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // An in-memory database lives and dies with its connection
        let in_memory = database_url.contains(":memory:");
        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 5 })
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(if in_memory { None } else { Some(Duration::from_secs(600)) })
            .max_lifetime(if in_memory { None } else { Some(Duration::from_secs(1800)) })
            .connect_with(options)
            .await?;

        sqlx::query(SCHEMA).execute(&pool).await?;
        info!(database_url = %database_url, "Conversation store ready");
        Ok(Self { pool })
    }

    /// Open a database file by path
    pub async fn open(path: &std::path::Path) -> Result<Self> {
        Self::connect(&format!("sqlite://{}", path.display())).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl ConversationStore for SqliteConversationStore {
    async fn load(&self, id: &str) -> Result<Option<Conversation>> {
        let row = sqlx::query("SELECT body FROM conversations WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let body: String = row.try_get("body")?;
        let conversation = serde_json::from_str(&body).map_err(|e| {
            IntakeError::InvalidInput(format!("stored conversation {} is corrupt: {}", id, e))
        })?;
        Ok(Some(conversation))
    }

    async fn save(&self, conversation: &Conversation) -> Result<()> {
        let body = serde_json::to_string(conversation)?;
        let state = serde_json::to_value(conversation.state)?
            .as_str()
            .unwrap_or_default()
            .to_string();

        sqlx::query(
            r#"
            INSERT INTO conversations (id, state, questions_asked, body, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                state = excluded.state,
                questions_asked = excluded.questions_asked,
                body = excluded.body,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(conversation.id.as_str())
        .bind(state)
        .bind(i64::from(conversation.questions_asked))
        .bind(body)
        .bind(conversation.created_at.timestamp())
        .bind(conversation.updated_at.timestamp())
        .execute(&self.pool)
        .await?;

        debug!(conversation_id = %conversation.id, "Conversation saved");
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM conversations WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_ids(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT id FROM conversations ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| row.try_get::<String, _>("id").map_err(IntakeError::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::Message;

    #[tokio::test]
    async fn test_sqlite_roundtrip() {
        let store = SqliteConversationStore::connect("sqlite::memory:").await.unwrap();

        let mut conv = Conversation::start("conv-1");
        conv.push(Message::user("I live alone"));
        conv.fields.household.size = Some(1);
        conv.questions_asked = 3;
        store.save(&conv).await.unwrap();

        let loaded = store.load("conv-1").await.unwrap().unwrap();
        assert_eq!(loaded, conv);
        assert!(store.load("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sqlite_upsert_and_remove() {
        let store = SqliteConversationStore::connect("sqlite::memory:").await.unwrap();

        let mut conv = Conversation::start("b");
        store.save(&conv).await.unwrap();
        conv.questions_asked = 9;
        store.save(&conv).await.unwrap();
        store.save(&Conversation::start("a")).await.unwrap();

        assert_eq!(store.list_ids().await.unwrap(), vec!["a", "b"]);
        assert_eq!(store.load("b").await.unwrap().unwrap().questions_asked, 9);

        let (state,): (String,) = sqlx::query_as("SELECT state FROM conversations WHERE id = 'b'")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(state, "COLLECTING");

        assert!(store.remove("b").await.unwrap());
        assert_eq!(store.list_ids().await.unwrap(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_sqlite_file_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("intake.db");

        {
            let store = SqliteConversationStore::open(&path).await.unwrap();
            store.save(&Conversation::start("persisted")).await.unwrap();
            store.pool().close().await;
        }

        let store = SqliteConversationStore::open(&path).await.unwrap();
        assert!(store.load("persisted").await.unwrap().is_some());
    }
}
