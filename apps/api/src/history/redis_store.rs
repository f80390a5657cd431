use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::info;
use uuid::Uuid;

use crate::history::{HistoryError, HistoryStore};
use crate::models::history::DocumentRecord;

/// Redis-backed history: one list per session under `<namespace>:<session_id>`,
/// JSON-encoded records, LPUSH so that LRANGE 0 -1 reads newest first.
#[derive(Clone)]
pub struct RedisHistoryStore {
    conn: MultiplexedConnection,
    namespace: String,
}

impl RedisHistoryStore {
    pub async fn connect(url: &str, namespace: impl Into<String>) -> Result<Self, HistoryError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        let namespace = namespace.into();
        info!("Redis history store connected (namespace: {namespace})");
        Ok(Self { conn, namespace })
    }

    fn key(&self, session_id: Uuid) -> String {
        session_key(&self.namespace, session_id)
    }
}

fn session_key(namespace: &str, session_id: Uuid) -> String {
    format!("{namespace}:{session_id}")
}

#[async_trait]
impl HistoryStore for RedisHistoryStore {
    async fn append(&self, session_id: Uuid, record: DocumentRecord) -> Result<(), HistoryError> {
        let payload = serde_json::to_string(&record)?;
        let mut conn = self.conn.clone();
        conn.lpush::<_, _, ()>(self.key(session_id), payload).await?;
        Ok(())
    }

    async fn list(&self, session_id: Uuid) -> Result<Vec<DocumentRecord>, HistoryError> {
        let mut conn = self.conn.clone();
        let raw: Vec<String> = conn.lrange(self.key(session_id), 0, -1).await?;
        raw.iter()
            .map(|entry| serde_json::from_str(entry).map_err(HistoryError::from))
            .collect()
    }

    async fn clear(&self, session_id: Uuid) -> Result<usize, HistoryError> {
        let key = self.key(session_id);
        let mut conn = self.conn.clone();
        let (len, _deleted): (usize, usize) = redis::pipe()
            .atomic()
            .llen(&key)
            .del(&key)
            .query_async(&mut conn)
            .await?;
        Ok(len)
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_key_is_namespaced() {
        let id = Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        assert_eq!(
            session_key("paydocs:history", id),
            "paydocs:history:67e55044-10b1-426f-9247-bb680e5fe0c8"
        );
    }
}
