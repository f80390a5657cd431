use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::history::{HistoryError, HistoryStore};
use crate::models::history::DocumentRecord;

/// Process-local history. Lost on restart.
#[derive(Default)]
pub struct MemoryHistoryStore {
    sessions: RwLock<HashMap<Uuid, Vec<DocumentRecord>>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn append(&self, session_id: Uuid, record: DocumentRecord) -> Result<(), HistoryError> {
        let mut sessions = self.sessions.write().await;
        // Stored oldest first; `list` reverses.
        sessions.entry(session_id).or_default().push(record);
        Ok(())
    }

    async fn list(&self, session_id: Uuid) -> Result<Vec<DocumentRecord>, HistoryError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(&session_id)
            .map(|records| records.iter().rev().cloned().collect())
            .unwrap_or_default())
    }

    async fn clear(&self, session_id: Uuid) -> Result<usize, HistoryError> {
        let mut sessions = self.sessions.write().await;
        Ok(sessions.remove(&session_id).map(|r| r.len()).unwrap_or(0))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
