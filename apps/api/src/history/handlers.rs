use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::history::DocumentRecord;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SessionQuery {
    pub session_id: Uuid,
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub session_id: Uuid,
    pub backend: &'static str,
    pub documents: Vec<DocumentRecord>,
}

#[derive(Serialize)]
pub struct ClearHistoryResponse {
    pub session_id: Uuid,
    pub cleared: usize,
}

/// GET /api/v1/history
pub async fn handle_list_history(
    State(state): State<AppState>,
    Query(params): Query<SessionQuery>,
) -> Result<Json<HistoryResponse>, AppError> {
    let documents = state.history.list(params.session_id).await?;
    Ok(Json(HistoryResponse {
        session_id: params.session_id,
        backend: state.history.backend(),
        documents,
    }))
}

/// DELETE /api/v1/history
pub async fn handle_clear_history(
    State(state): State<AppState>,
    Query(params): Query<SessionQuery>,
) -> Result<Json<ClearHistoryResponse>, AppError> {
    let cleared = state.history.clear(params.session_id).await?;
    tracing::info!("Cleared {cleared} history entries for {}", params.session_id);
    Ok(Json(ClearHistoryResponse {
        session_id: params.session_id,
        cleared,
    }))
}
