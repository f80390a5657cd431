//! Serializers for assembled documents.
//!
//! Presentation lives here only; the assembler never produces markup. Add a
//! new output format by implementing [`DocumentRenderer`].

use std::fmt::Write as _;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::document::assembler::{DocumentStructure, Field};
use crate::document::format::{
    escape_html, format_currency, format_field_name, format_field_value, slugify,
};
use crate::document::style::stylesheet;
use crate::models::document::{FieldValue, LedgerLine};
use crate::models::record::ProcessedRecord;

pub trait DocumentRenderer: Send + Sync {
    fn render(&self, structure: &DocumentStructure) -> Result<String>;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RenderFormat {
    #[default]
    Html,
    Json,
}

impl RenderFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            RenderFormat::Html => "html",
            RenderFormat::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            RenderFormat::Html => "text/html; charset=utf-8",
            RenderFormat::Json => "application/json",
        }
    }

    pub fn renderer(&self) -> &'static dyn DocumentRenderer {
        match self {
            RenderFormat::Html => &HtmlRenderer,
            RenderFormat::Json => &JsonRenderer,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HTML
// ────────────────────────────────────────────────────────────────────────────

pub struct HtmlRenderer;

impl DocumentRenderer for HtmlRenderer {
    fn render(&self, doc: &DocumentStructure) -> Result<String> {
        let title = escape_html(&doc.header.document_title);
        let mut html = String::with_capacity(4096);

        writeln!(html, "<!DOCTYPE html>")?;
        writeln!(html, "<html>\n<head>")?;
        writeln!(html, "<meta charset=\"utf-8\">")?;
        writeln!(html, "<title>{title}</title>")?;
        write!(html, "<style>\n{}</style>\n", stylesheet(&doc.style, &doc.layout))?;
        writeln!(html, "</head>\n<body>")?;
        writeln!(html, "<div class=\"document-container\">")?;

        writeln!(html, "<header class=\"document-header\">")?;
        writeln!(html, "<h1>{title}</h1>")?;
        writeln!(html, "<div class=\"header-info\">")?;
        for field in &doc.header.fields {
            writeln!(
                html,
                "<p><strong>{}:</strong> {}</p>",
                escape_html(&format_field_name(&field.name)),
                escape_html(&format_field_value(&field.name, &field.value))
            )?;
        }
        writeln!(html, "</div>\n</header>")?;

        writeln!(html, "<main class=\"document-body\">")?;
        for field in &doc.body {
            write_body_field(&mut html, field)?;
        }
        writeln!(html, "</main>")?;

        let footer = &doc.footer;
        writeln!(html, "<footer class=\"document-footer\">")?;
        writeln!(html, "<p>Generated by {}</p>", escape_html(&footer.generated_by))?;
        writeln!(html, "<p>Document ID: {}</p>", escape_html(&footer.document_id))?;
        writeln!(html, "<p>Generated: {}</p>", footer.timestamp.to_rfc3339())?;
        writeln!(html, "<p class=\"disclaimer\">{}</p>", escape_html(&footer.disclaimer))?;
        writeln!(html, "</footer>")?;

        writeln!(html, "</div>\n</body>\n</html>")?;
        Ok(html)
    }
}

fn write_body_field(html: &mut String, field: &Field) -> std::fmt::Result {
    let label = escape_html(&format_field_name(&field.name));
    match &field.value {
        FieldValue::Ledger(lines) => write_ledger(html, &label, lines),
        value => writeln!(
            html,
            "<div class=\"field-group\"><label>{label}:</label> <span>{}</span></div>",
            escape_html(&format_field_value(&field.name, value))
        ),
    }
}

fn write_ledger(html: &mut String, label: &str, lines: &[LedgerLine]) -> std::fmt::Result {
    writeln!(html, "<section class=\"ledger\">")?;
    writeln!(html, "<h2>{label}</h2>")?;
    writeln!(html, "<table>")?;
    writeln!(
        html,
        "<tr><th>Date</th><th>Description</th><th>Amount</th><th>Balance</th></tr>"
    )?;
    for line in lines {
        writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            line.date.format("%Y-%m-%d"),
            escape_html(&line.description),
            format_currency(line.amount),
            format_currency(line.balance)
        )?;
    }
    writeln!(html, "</table>\n</section>")
}

// ────────────────────────────────────────────────────────────────────────────
// JSON export
// ────────────────────────────────────────────────────────────────────────────

pub struct JsonRenderer;

impl DocumentRenderer for JsonRenderer {
    fn render(&self, doc: &DocumentStructure) -> Result<String> {
        Ok(serde_json::to_string_pretty(doc)?)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Filenames
// ────────────────────────────────────────────────────────────────────────────

/// `<type>-<slugified name>[-<pay date | tax year>].<ext>`
pub fn download_filename(record: &ProcessedRecord, format: RenderFormat) -> String {
    let doc_type = record.document_type();
    let name = record
        .subject_name()
        .map(slugify)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "document".to_string());

    let suffix = match record {
        ProcessedRecord::Paystub { fields, .. } => fields.pay_date.map(|d| d.to_string()),
        ProcessedRecord::W2Form { fields, .. } => fields.tax_year.map(|y| y.to_string()),
        ProcessedRecord::BankStatement { .. } => None,
    };

    match suffix {
        Some(s) => format!(
            "{}-{name}-{s}.{}",
            doc_type.file_prefix(),
            format.extension()
        ),
        None => format!("{}-{name}.{}", doc_type.file_prefix(), format.extension()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::engine::TaxTable;
    use crate::calculation::enrich::enrich;
    use crate::document::assembler::Assembler;
    use crate::document::templates::TemplateRegistry;
    use crate::models::document::{
        BankStatementFields, DocumentRequest, EmployeeInfo, PaystubFields, Transaction, W2Fields,
    };
    use chrono::{NaiveDate, Utc};

    fn build(request: DocumentRequest) -> (ProcessedRecord, DocumentStructure) {
        let registry = TemplateRegistry::standard();
        let template = registry.get(request.document_type()).unwrap().clone();
        let record = enrich(request, &TaxTable::default());
        let doc = Assembler::new("PayDocs").assemble_at(&template, &record, Utc::now());
        (record, doc)
    }

    /// Every scalar body field shows up as `<label>` and formatted value.
    fn assert_body_round_trips(doc: &DocumentStructure, html: &str) {
        for field in &doc.body {
            let label = escape_html(&format_field_name(&field.name));
            assert!(html.contains(&label), "missing label {label}");
            match &field.value {
                FieldValue::Ledger(lines) => {
                    for line in lines {
                        assert!(html.contains(&escape_html(&line.description)));
                        assert!(html.contains(&format_currency(line.balance)));
                    }
                }
                value => {
                    let value = escape_html(&format_field_value(&field.name, value));
                    assert!(html.contains(&value), "missing value {value} for {label}");
                }
            }
        }
    }

    fn sample_paystub() -> PaystubFields {
        PaystubFields {
            employee: EmployeeInfo {
                employee_name: Some("Jane <Q> Doe".into()),
                employee_ssn: Some("123-45-6789".into()),
                ..Default::default()
            },
            pay_date: NaiveDate::from_ymd_opt(2024, 3, 15),
            gross_pay: Some(2000.0),
            hours_worked: Some(80.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_html_contains_every_body_label_and_value() {
        let (_, doc) = build(DocumentRequest::Paystub(sample_paystub()));
        let html = HtmlRenderer.render(&doc).unwrap();
        assert_body_round_trips(&doc, &html);
        assert!(html.contains("Gross Pay"));
        assert!(html.contains("$2000.00"));
        assert!(html.contains("Hours Worked:</label> <span>80</span>"));
    }

    #[test]
    fn test_w2_html_contains_every_body_label_and_value() {
        let (_, doc) = build(DocumentRequest::W2Form(W2Fields {
            employee: EmployeeInfo {
                employee_name: Some("John Smith".into()),
                employee_ssn: Some("987-65-4321".into()),
                ..Default::default()
            },
            tax_year: Some(2023),
            wages: Some(52000.0),
            ..Default::default()
        }));
        assert!(doc.body.iter().any(|f| f.name == "federalTaxWithheld"));
        let html = HtmlRenderer.render(&doc).unwrap();
        assert_body_round_trips(&doc, &html);
        assert!(html.contains("Employee S S N:</label> <span>*******4321</span>"));
    }

    #[test]
    fn test_bank_statement_html_contains_every_body_label_and_value() {
        let d = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();
        let (_, doc) = build(DocumentRequest::BankStatement(BankStatementFields {
            account_holder: Some("Jane Doe".into()),
            bank_name: Some("First Bank".into()),
            account_number: Some("000123456789".into()),
            opening_balance: Some(100.0),
            closing_balance: Some(70.0),
            transactions: Some(vec![
                Transaction {
                    date: d,
                    description: "Groceries".into(),
                    amount: -45.5,
                },
                Transaction {
                    date: d,
                    description: "Refund".into(),
                    amount: 15.5,
                },
            ]),
            ..Default::default()
        }));
        let html = HtmlRenderer.render(&doc).unwrap();
        assert_body_round_trips(&doc, &html);
        assert!(html.contains("<td>$54.50</td>"));
        assert!(html.contains("<td>$70.00</td>"));
    }

    #[test]
    fn test_html_carries_type_style_and_page_layout() {
        let (_, doc) = build(DocumentRequest::BankStatement(BankStatementFields::default()));
        let html = HtmlRenderer.render(&doc).unwrap();
        assert!(html.contains("<style>"));
        assert!(html.contains("@page { size: letter portrait; margin: 72pt 72pt 72pt 72pt; }"));
        assert!(html.contains("font-family: Arial, sans-serif; font-size: 12px;"));
        assert!(html.contains(".document-header { background: #e6f3ff; }"));
        assert!(html.contains("border: 1px solid #0066cc;"));

        let (_, doc) = build(DocumentRequest::Paystub(sample_paystub()));
        let html = HtmlRenderer.render(&doc).unwrap();
        assert!(html.contains("background: #f0f0f0;"));
        assert!(html.contains("#cccccc"));
    }

    #[test]
    fn test_html_escapes_user_text_and_masks_ssn() {
        let (_, doc) = build(DocumentRequest::Paystub(sample_paystub()));
        let html = HtmlRenderer.render(&doc).unwrap();
        assert!(html.contains("Jane &lt;Q&gt; Doe"));
        assert!(!html.contains("<Q>"));
        assert!(!html.contains("123-45-6789"));
        assert!(html.contains("*******6789"));
    }

    #[test]
    fn test_html_footer() {
        let (_, doc) = build(DocumentRequest::Paystub(sample_paystub()));
        let html = HtmlRenderer.render(&doc).unwrap();
        assert!(html.contains("Generated by PayDocs"));
        assert!(html.contains(&format!("Document ID: {}", doc.footer.document_id)));
        assert!(html.contains(&doc.footer.timestamp.to_rfc3339()));
        assert!(html.contains("novelty purposes only"));
    }

    #[test]
    fn test_html_ledger_table() {
        let d = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();
        let (_, doc) = build(DocumentRequest::BankStatement(BankStatementFields {
            account_holder: Some("Jane Doe".into()),
            opening_balance: Some(100.0),
            closing_balance: Some(150.0),
            transactions: Some(vec![Transaction {
                date: d,
                description: "Refund & credit".into(),
                amount: 50.0,
            }]),
            ..Default::default()
        }));
        let html = HtmlRenderer.render(&doc).unwrap();
        assert!(html.contains("<h2>Transactions</h2>"));
        assert!(html.contains(
            "<tr><td>2024-05-03</td><td>Refund &amp; credit</td><td>$50.00</td><td>$150.00</td></tr>"
        ));
        assert!(html.contains("Opening Balance:</label> <span>$100.00</span>"));
    }

    #[test]
    fn test_json_export_round_trips_structure() {
        let (_, doc) = build(DocumentRequest::Paystub(sample_paystub()));
        let json = JsonRenderer.render(&doc).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["documentType"], "paystub");
        assert_eq!(value["header"]["documentTitle"], "PAYROLL STATEMENT");
        assert_eq!(value["footer"]["documentId"], doc.footer.document_id.as_str());
        assert_eq!(value["style"]["headerBackground"], "#f0f0f0");
        assert_eq!(value["style"]["borderColor"], "#cccccc");
        assert_eq!(value["style"]["lineHeight"], "1.4");
        assert_eq!(value["layout"]["pageSize"], "letter");
        assert_eq!(value["layout"]["orientation"], "portrait");
        assert_eq!(value["layout"]["margins"]["top"], 72);
    }

    #[test]
    fn test_json_export_omits_unset_colours() {
        let (_, doc) = build(DocumentRequest::W2Form(W2Fields::default()));
        let value: serde_json::Value =
            serde_json::from_str(&JsonRenderer.render(&doc).unwrap()).unwrap();
        assert_eq!(value["style"]["fontFamily"], "Arial, sans-serif");
        assert!(value["style"].get("headerBackground").is_none());
    }

    #[test]
    fn test_filenames() {
        let (record, _) = build(DocumentRequest::Paystub(sample_paystub()));
        assert_eq!(
            download_filename(&record, RenderFormat::Html),
            "paystub-jane-q-doe-2024-03-15.html"
        );

        let (record, _) = build(DocumentRequest::W2Form(W2Fields {
            employee: EmployeeInfo {
                employee_name: Some("John Smith".into()),
                ..Default::default()
            },
            tax_year: Some(2023),
            ..Default::default()
        }));
        assert_eq!(
            download_filename(&record, RenderFormat::Json),
            "w2-john-smith-2023.json"
        );

        let (record, _) = build(DocumentRequest::BankStatement(BankStatementFields::default()));
        assert_eq!(
            download_filename(&record, RenderFormat::Html),
            "bank-statement-document.html"
        );
    }
}
