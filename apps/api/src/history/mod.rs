//! Per-session generation history.
//!
//! `AppState` holds an `Arc<dyn HistoryStore>`, chosen at startup: Redis when
//! `REDIS_URL` is configured, in-process memory otherwise. Entries are listed
//! newest first and only ever removed by an explicit clear.

pub mod handlers;
pub mod memory;
pub mod redis_store;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::history::DocumentRecord;

pub use memory::MemoryHistoryStore;
pub use redis_store::RedisHistoryStore;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Prepends `record` to the session's history.
    async fn append(&self, session_id: Uuid, record: DocumentRecord) -> Result<(), HistoryError>;

    /// Newest first. Unknown sessions yield an empty list.
    async fn list(&self, session_id: Uuid) -> Result<Vec<DocumentRecord>, HistoryError>;

    /// Removes every entry for the session and returns how many there were.
    async fn clear(&self, session_id: Uuid) -> Result<usize, HistoryError>;

    fn backend(&self) -> &'static str;
}
