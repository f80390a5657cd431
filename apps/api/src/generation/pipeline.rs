//! Document pipeline: template lookup → validate → enrich → quality checks →
//! assemble → render.
//!
//! Everything here is synchronous and side-effect free. History writes and
//! simulated latency belong to the HTTP handlers.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::calculation::{enrich, TaxTable};
use crate::document::{download_filename, Assembler, RenderFormat, Template, TemplateRegistry};
use crate::models::document::{DocumentRequest, DocumentType};
use crate::quality::{run_checks, validate, QualityReport, ValidationReport};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    #[error("invalid request payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("render failed: {0}")]
    Render(#[from] anyhow::Error),

    /// The request never reached the pipeline: bad body, content type, or query.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
}

impl From<JsonRejection> for GenerationError {
    fn from(rejection: JsonRejection) -> Self {
        GenerationError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for GenerationError {
    fn from(rejection: QueryRejection) -> Self {
        GenerationError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for GenerationError {
    fn into_response(self) -> Response {
        let status = match &self {
            GenerationError::TemplateNotFound(_) => StatusCode::NOT_FOUND,
            GenerationError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            GenerationError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GenerationError::Rejected { status, .. } => *status,
            GenerationError::Render(e) => {
                tracing::error!("Render error: {e:?}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let mut body = json!({
            "success": false,
            "error": self.to_string(),
            "timestamp": Utc::now(),
        });
        if let GenerationError::Validation(errors) = &self {
            body["errors"] = json!(errors);
        }

        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedDocument {
    pub format: RenderFormat,
    pub content: String,
    pub filename: String,
    pub content_type: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    pub document_type: DocumentType,
    pub generated_at: DateTime<Utc>,
    pub document_id: String,
    pub quality_score: u32,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
    pub quality: QualityReport,
}

#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub document: RenderedDocument,
    pub metadata: GenerationMetadata,
    /// Employee or account holder, used for the history entry.
    pub subject_name: String,
}

/// Owns the configuration-time tables every generation consults.
#[derive(Debug, Clone)]
pub struct DocumentPipeline {
    templates: TemplateRegistry,
    taxes: TaxTable,
    assembler: Assembler,
}

impl DocumentPipeline {
    pub fn new(templates: TemplateRegistry, taxes: TaxTable, assembler: Assembler) -> Self {
        Self {
            templates,
            taxes,
            assembler,
        }
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    pub fn taxes(&self) -> &TaxTable {
        &self.taxes
    }

    /// Resolves a path segment such as `paystub` or `w2` to its template.
    pub fn template_for(&self, key: &str) -> Result<&Template, GenerationError> {
        let doc_type: DocumentType = key
            .parse()
            .map_err(|_| GenerationError::TemplateNotFound(key.to_string()))?;
        self.templates
            .get(doc_type)
            .ok_or_else(|| GenerationError::TemplateNotFound(key.to_string()))
    }

    /// Runs the validator only.
    pub fn validate(&self, key: &str, payload: Value) -> Result<ValidationReport, GenerationError> {
        let template = self.template_for(key)?;
        let request = DocumentRequest::from_json(template.document_type, payload)?;
        Ok(validate(template, &request))
    }

    pub fn generate(
        &self,
        key: &str,
        payload: Value,
        format: RenderFormat,
    ) -> Result<GeneratedDocument, GenerationError> {
        self.generate_at(key, payload, format, Utc::now())
    }

    pub fn generate_at(
        &self,
        key: &str,
        payload: Value,
        format: RenderFormat,
        now: DateTime<Utc>,
    ) -> Result<GeneratedDocument, GenerationError> {
        let template = self.template_for(key)?;
        let request = DocumentRequest::from_json(template.document_type, payload)?;

        let report = validate(template, &request);
        if !report.valid {
            debug!(
                "{} request rejected with {} errors",
                request.document_type(),
                report.errors.len()
            );
            return Err(GenerationError::Validation(report.errors));
        }

        let record = enrich(request, &self.taxes);
        let quality = run_checks(template, &record, &self.taxes);
        for warning in &quality.warnings {
            warn!("{} quality warning: {warning}", template.document_type);
        }

        let structure = self.assembler.assemble_at(template, &record, now);
        let content = format.renderer().render(&structure)?;
        let filename = download_filename(&record, format);
        let document_id = structure.footer.document_id.clone();

        info!(
            "Generated {} {document_id} (score {})",
            template.document_type, quality.score
        );

        Ok(GeneratedDocument {
            document: RenderedDocument {
                format,
                content,
                filename,
                content_type: format.content_type(),
            },
            metadata: GenerationMetadata {
                document_type: template.document_type,
                generated_at: now,
                document_id,
                quality_score: quality.score,
                warnings: quality.warnings.clone(),
                suggestions: quality.suggestions.clone(),
                quality,
            },
            subject_name: record
                .subject_name()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(template.document_type.display_name())
                .to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    fn pipeline() -> DocumentPipeline {
        DocumentPipeline::new(
            TemplateRegistry::standard(),
            TaxTable::default(),
            Assembler::new("PayDocs Test"),
        )
    }

    fn full_paystub() -> Value {
        json!({
            "employeeName": "Jane Doe",
            "employeeAddress": "1 Main St",
            "employeeCity": "Springfield",
            "employeeState": "IL",
            "employeeZip": "62701",
            "employeeSSN": "123-45-6789",
            "employerName": "Acme Corp",
            "employerAddress": "500 Industrial Way",
            "employerCity": "Springfield",
            "employerState": "IL",
            "employerZip": "62702",
            "employerEIN": "12-3456789",
            "payPeriodStart": "2024-03-01",
            "payPeriodEnd": "2024-03-14",
            "payDate": "2024-03-15",
            "payFrequency": "biweekly",
            "grossPay": 2000.0
        })
    }

    #[test]
    fn test_unknown_type_is_template_not_found() {
        let err = pipeline()
            .generate("invoice", json!({}), RenderFormat::Html)
            .unwrap_err();
        assert!(matches!(err, GenerationError::TemplateNotFound(ref k) if k == "invoice"));
        assert_eq!(err.to_string(), "template not found: invoice");
    }

    #[test]
    fn test_validation_failure_lists_every_missing_field() {
        let err = pipeline()
            .generate("paystub", json!({ "employeeName": "Jane" }), RenderFormat::Html)
            .unwrap_err();
        let GenerationError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.contains(&"missing field: employeeSSN".to_string()));
        assert!(errors.contains(&"missing field: grossPay".to_string()));
        assert!(!errors.contains(&"missing field: employeeName".to_string()));
    }

    #[test]
    fn test_wrongly_typed_payload_is_invalid() {
        let err = pipeline()
            .generate("paystub", json!({ "grossPay": [1, 2] }), RenderFormat::Html)
            .unwrap_err();
        assert!(matches!(err, GenerationError::InvalidPayload(_)));
    }

    #[test]
    fn test_generates_paystub_html() {
        let generated = pipeline()
            .generate("paystub", full_paystub(), RenderFormat::Html)
            .unwrap();
        let doc = &generated.document;
        assert_eq!(doc.filename, "paystub-jane-doe-2024-03-15.html");
        assert_eq!(doc.content_type, "text/html; charset=utf-8");
        assert!(doc.content.contains("PAYROLL STATEMENT"));
        assert!(doc.content.contains("Acme Corp"));
        assert!(doc.content.contains("Net Pay"));
        assert!(generated.metadata.document_id.starts_with("PAY-"));
        assert_eq!(generated.metadata.quality_score, 100);
        assert_eq!(generated.subject_name, "Jane Doe");
    }

    #[test]
    fn test_low_pay_warns_but_still_generates() {
        let mut payload = full_paystub();
        payload["grossPay"] = json!(100.0);
        let generated = pipeline()
            .generate("paystub", payload, RenderFormat::Html)
            .unwrap();
        assert!(generated.metadata.quality_score < 100);
        assert!(generated
            .metadata
            .warnings
            .iter()
            .any(|w| w.contains("unusually low")));
    }

    #[test]
    fn test_json_export() {
        let generated = pipeline()
            .generate("paystub", full_paystub(), RenderFormat::Json)
            .unwrap();
        assert_eq!(generated.document.filename, "paystub-jane-doe-2024-03-15.json");
        let value: Value = serde_json::from_str(&generated.document.content).unwrap();
        assert_eq!(value["footer"]["generatedBy"], "PayDocs Test");
    }

    #[test]
    fn test_validate_only() {
        let report = pipeline().validate("w2", json!({})).unwrap();
        assert!(!report.valid);
        assert!(report.errors.contains(&"missing field: wages".to_string()));
    }

    #[tokio::test]
    async fn test_error_response_envelope() {
        let response = GenerationError::Validation(vec!["missing field: payDate".into()])
            .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "validation failed: missing field: payDate");
        assert_eq!(body["errors"][0], "missing field: payDate");
        assert!(body["timestamp"].is_string());
    }
}
