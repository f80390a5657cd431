use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::document::DocumentType;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Generated,
    /// Never written by this service, since failed generations skip history.
    /// Kept so entries stored by other writers still decode.
    #[allow(dead_code)]
    Failed,
}

/// One entry of a session's generation history.
///
/// `id` is a fresh UUID per generation call; `document_id` is the advisory
/// identifier printed in the document footer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub document_type: DocumentType,
    pub name: String,
    pub document_id: String,
    pub created_at: DateTime<Utc>,
    pub status: DocumentStatus,
}

impl DocumentRecord {
    pub fn generated(
        document_type: DocumentType,
        name: impl Into<String>,
        document_id: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_type,
            name: name.into(),
            document_id: document_id.into(),
            created_at,
            status: DocumentStatus::Generated,
        }
    }
}
