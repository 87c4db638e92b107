//! Chat history persistence over any memory store.

use std::sync::Arc;

use crate::domain::errors::StorageResult;
use crate::domain::models::Message;
use crate::domain::ports::MemoryStore;

/// Stores one message list per conversation under a `chat:` key.
///
/// A non-zero default TTL applies to every write, so idle conversations
/// age out on backends that honor it.
pub struct ChatStore {
    store: Arc<dyn MemoryStore>,
    default_ttl_secs: Option<u64>,
}

impl ChatStore {
    pub fn new(store: Arc<dyn MemoryStore>, default_ttl_secs: u64) -> Self {
        Self {
            store,
            default_ttl_secs: (default_ttl_secs > 0).then_some(default_ttl_secs),
        }
    }

    fn history_key(conversation_id: &str) -> String {
        format!("chat:{conversation_id}")
    }

    pub async fn history(&self, conversation_id: &str) -> StorageResult<Vec<Message>> {
        let raw = self.store.get(&Self::history_key(conversation_id)).await?;
        match raw {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Vec::new()),
        }
    }

    pub async fn append(&self, conversation_id: &str, message: Message) -> StorageResult<()> {
        let mut history = self.history(conversation_id).await?;
        history.push(message);
        let value = serde_json::to_value(&history)?;
        self.store
            .set(&Self::history_key(conversation_id), value, self.default_ttl_secs)
            .await
    }

    pub async fn clear(&self, conversation_id: &str) -> StorageResult<()> {
        self.store.delete(&Self::history_key(conversation_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::models::MessageRole;

    fn chat_store() -> ChatStore {
        ChatStore::new(Arc::new(InMemoryStore::new()), 0)
    }

    #[tokio::test]
    async fn test_append_preserves_order() {
        let chat = chat_store();
        chat.append("c1", Message::user("hello")).await.unwrap();
        chat.append("c1", Message::assistant("hi there")).await.unwrap();

        let history = chat.history("c1").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, MessageRole::User);
        assert_eq!(history[1].content, "hi there");
    }

    #[tokio::test]
    async fn test_conversations_isolated() {
        let chat = chat_store();
        chat.append("c1", Message::user("one")).await.unwrap();
        chat.append("c2", Message::user("two")).await.unwrap();

        assert_eq!(chat.history("c1").await.unwrap().len(), 1);
        assert_eq!(chat.history("c2").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_and_empty_history() {
        let chat = chat_store();
        assert!(chat.history("fresh").await.unwrap().is_empty());

        chat.append("c1", Message::user("hello")).await.unwrap();
        chat.clear("c1").await.unwrap();
        assert!(chat.history("c1").await.unwrap().is_empty());
        // Clearing again is a no-op
        chat.clear("c1").await.unwrap();
    }
}
