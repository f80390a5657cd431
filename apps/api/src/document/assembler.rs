//! Document Assembler: turns an enriched record into a header/body/footer
//! structure that any renderer can serialize.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::document::format::mask_account_number;
use crate::document::style::{DocumentStyle, PageLayout};
use crate::document::templates::Template;
use crate::models::document::{DocumentType, FieldValue};
use crate::models::record::ProcessedRecord;

/// Shown in the footer of every document.
pub const NOVELTY_DISCLAIMER: &str =
    "This document is for novelty purposes only and is not an official record.";

/// Identifiers rendered with only their last four characters visible.
const MASKED_FIELDS: [&str; 2] = ["employeeSSN", "accountNumber"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub value: FieldValue,
}

impl Field {
    fn text(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: FieldValue::Text(value.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentHeader {
    pub document_title: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFooter {
    pub generated_by: String,
    pub timestamp: DateTime<Utc>,
    pub document_id: String,
    pub disclaimer: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStructure {
    pub document_type: DocumentType,
    pub header: DocumentHeader,
    pub body: Vec<Field>,
    pub footer: DocumentFooter,
    pub style: DocumentStyle,
    pub layout: PageLayout,
}

/// `<PREFIX>-<epoch millis>-<000..999>`.
///
/// The suffix comes from a v4 UUID. Two calls in the same millisecond can
/// collide, so the id is advisory and never used as a key.
pub fn generate_document_id(doc_type: DocumentType, now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().as_u128() % 1000;
    format!(
        "{}-{}-{:03}",
        doc_type.id_prefix(),
        now.timestamp_millis(),
        suffix
    )
}

/// Builds document structures. Holds the signature printed in every footer.
#[derive(Debug, Clone)]
pub struct Assembler {
    signature: String,
}

impl Assembler {
    pub fn new(signature: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
        }
    }

    pub fn assemble_at(
        &self,
        template: &Template,
        record: &ProcessedRecord,
        now: DateTime<Utc>,
    ) -> DocumentStructure {
        DocumentStructure {
            document_type: template.document_type,
            header: build_header(template, record, now),
            body: build_body(template, record),
            footer: DocumentFooter {
                generated_by: self.signature.clone(),
                timestamp: now,
                document_id: generate_document_id(template.document_type, now),
                disclaimer: NOVELTY_DISCLAIMER.to_string(),
            },
            style: DocumentStyle::for_type(template.document_type),
            layout: PageLayout::default(),
        }
    }
}

fn build_header(template: &Template, record: &ProcessedRecord, now: DateTime<Utc>) -> DocumentHeader {
    let today = now.format("%Y-%m-%d").to_string();
    let fields = match record {
        ProcessedRecord::Paystub { fields, .. } => {
            let period = match (fields.pay_period_start, fields.pay_period_end) {
                (Some(start), Some(end)) => format!("{start} - {end}"),
                _ => fields
                    .pay_frequency
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_else(|| "Pay Period".to_string()),
            };
            vec![
                Field::text(
                    "companyName",
                    non_blank(&fields.employer.employer_name).unwrap_or("Company Name"),
                ),
                Field::text("payPeriod", period),
                Field::text("date", today),
            ]
        }
        ProcessedRecord::BankStatement { fields, .. } => vec![
            Field::text(
                "bankName",
                non_blank(&fields.bank_name).unwrap_or("Bank Name"),
            ),
            Field::text(
                "accountNumber",
                non_blank(&fields.account_number)
                    .map(mask_account_number)
                    .unwrap_or_default(),
            ),
            Field::text(
                "statementPeriod",
                non_blank(&fields.statement_period).unwrap_or("Statement Period"),
            ),
        ],
        ProcessedRecord::W2Form { .. } => vec![Field::text("date", today)],
    };

    DocumentHeader {
        document_title: template.title.to_string(),
        fields,
    }
}

/// Projects the record onto the template's field list. Absent fields are omitted.
fn build_body(template: &Template, record: &ProcessedRecord) -> Vec<Field> {
    let present = record.field_set();
    template
        .fields
        .iter()
        .filter_map(|name| {
            present.get(name).map(|value| {
                let value = match value {
                    FieldValue::Text(s) if MASKED_FIELDS.contains(name) => {
                        FieldValue::Text(mask_account_number(s))
                    }
                    other => other.clone(),
                };
                Field {
                    name: name.to_string(),
                    value,
                }
            })
        })
        .collect()
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
