//! Axum route handlers for templates, tax previews, and document generation.

use std::collections::BTreeMap;
use std::time::Duration;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::calculation::engine::{annualize, compute_net_pay, round_cents};
use crate::calculation::{PayPeriod, TaxBreakdown};
use crate::document::{RenderFormat, Template};
use crate::errors::AppError;
use crate::generation::pipeline::{GenerationMetadata, RenderedDocument};
use crate::generation::{GeneratedDocument, GenerationError};
use crate::models::history::DocumentRecord;
use crate::quality::ValidationReport;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    pub templates: Vec<Template>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxRequest {
    pub gross_pay: f64,
    #[serde(default)]
    pub pay_period: PayPeriod,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxResponse {
    pub pay_period: PayPeriod,
    pub annualized_pay: f64,
    pub federal_rate: f64,
    pub taxes: TaxBreakdown,
    pub total_taxes: f64,
    pub net_pay: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct PreviewQuery {
    pub format: Option<RenderFormat>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateQuery {
    pub session_id: Option<Uuid>,
    pub format: Option<RenderFormat>,
}

#[derive(Debug, Serialize)]
pub struct GenerationResponse {
    pub success: bool,
    pub document: RenderedDocument,
    pub metadata: GenerationMetadata,
}

impl From<GeneratedDocument> for GenerationResponse {
    fn from(generated: GeneratedDocument) -> Self {
        Self {
            success: true,
            document: generated.document,
            metadata: generated.metadata,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/templates
pub async fn handle_list_templates(State(state): State<AppState>) -> Json<TemplateListResponse> {
    Json(TemplateListResponse {
        templates: state.pipeline.templates().list().into_iter().cloned().collect(),
    })
}

/// POST /api/v1/taxes
///
/// Withholding preview for a single pay period, without building a document.
pub async fn handle_compute_taxes(
    State(state): State<AppState>,
    Json(request): Json<TaxRequest>,
) -> Result<Json<TaxResponse>, AppError> {
    if !request.gross_pay.is_finite() || request.gross_pay < 0.0 {
        return Err(AppError::Validation(
            "grossPay must be a non-negative number".to_string(),
        ));
    }

    let taxes = state.pipeline.taxes();
    let breakdown = taxes.compute_taxes(request.gross_pay, request.pay_period);
    let annual = annualize(request.gross_pay, request.pay_period);
    let deductions = BTreeMap::from([
        ("federal", breakdown.federal),
        ("state", breakdown.state),
        ("socialSecurity", breakdown.social_security),
        ("medicare", breakdown.medicare),
    ]);

    Ok(Json(TaxResponse {
        pay_period: request.pay_period,
        annualized_pay: round_cents(annual),
        federal_rate: taxes.federal_rate(annual),
        total_taxes: round_cents(breakdown.total()),
        net_pay: compute_net_pay(request.gross_pay, &deductions),
        taxes: breakdown,
    }))
}

/// POST /api/v1/documents/:doc_type/validate
pub async fn handle_validate(
    State(state): State<AppState>,
    Path(doc_type): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ValidationReport>, GenerationError> {
    let Json(payload) = payload?;
    Ok(Json(state.pipeline.validate(&doc_type, payload)?))
}

/// POST /api/v1/documents/:doc_type/preview
///
/// Full pipeline without latency or history.
pub async fn handle_preview(
    State(state): State<AppState>,
    Path(doc_type): Path<String>,
    query: Result<Query<PreviewQuery>, QueryRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<GenerationResponse>, GenerationError> {
    let Query(query) = query?;
    let Json(payload) = payload?;
    let format = query.format.unwrap_or_default();
    let generated = state.pipeline.generate(&doc_type, payload, format)?;
    Ok(Json(generated.into()))
}

/// POST /api/v1/documents/:doc_type/generate
///
/// Applies the configured delay, runs the pipeline, and on success appends a
/// history entry for `session_id` when one is given. Failures never touch history.
pub async fn handle_generate(
    State(state): State<AppState>,
    Path(doc_type): Path<String>,
    query: Result<Query<GenerateQuery>, QueryRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<GenerationResponse>, GenerationError> {
    let Query(query) = query?;
    let Json(payload) = payload?;

    if state.config.generation_delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(state.config.generation_delay_ms)).await;
    }

    let format = query.format.unwrap_or_default();
    let generated = state.pipeline.generate(&doc_type, payload, format)?;

    if let Some(session_id) = query.session_id {
        let record = DocumentRecord::generated(
            generated.metadata.document_type,
            generated.subject_name.clone(),
            generated.metadata.document_id.clone(),
            generated.metadata.generated_at,
        );
        // The document is already built; a history outage only costs the entry.
        if let Err(e) = state.history.append(session_id, record).await {
            warn!("Failed to record history for session {session_id}: {e}");
        }
    }

    Ok(Json(generated.into()))
}
