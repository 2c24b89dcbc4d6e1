// src/store/mod.rs
// Conversation storage: trait plus in-memory and SQLite backings

mod sqlite;

pub use sqlite::SqliteConversationStore;

use crate::error::Result;
use crate::intake::Conversation;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Keyed conversation storage. Callers serialize turns per id.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn load(&self, id: &str) -> Result<Option<Conversation>>;

    /// Insert or replace
    async fn save(&self, conversation: &Conversation) -> Result<()>;

    /// Returns whether a conversation was removed
    async fn remove(&self, id: &str) -> Result<bool>;

    async fn list_ids(&self) -> Result<Vec<String>>;
}

/// Process-local store
#[derive(Default)]
pub struct InMemoryConversationStore {
    conversations: RwLock<HashMap<String, Conversation>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn load(&self, id: &str) -> Result<Option<Conversation>> {
        Ok(self.conversations.read().await.get(id).cloned())
    }

    async fn save(&self, conversation: &Conversation) -> Result<()> {
        self.conversations
            .write()
            .await
            .insert(conversation.id.clone(), conversation.clone());
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        Ok(self.conversations.write().await.remove(id).is_some())
    }

    async fn list_ids(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self.conversations.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
