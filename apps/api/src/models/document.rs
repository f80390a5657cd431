use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calculation::engine::PayPeriod;

// ────────────────────────────────────────────────────────────────────────────
// Document types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum DocumentType {
    Paystub,
    W2Form,
    BankStatement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDocumentType(pub String);

impl fmt::Display for UnknownDocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown document type '{}'", self.0)
    }
}

impl std::error::Error for UnknownDocumentType {}

impl DocumentType {
    pub const ALL: [DocumentType; 3] = [
        DocumentType::Paystub,
        DocumentType::W2Form,
        DocumentType::BankStatement,
    ];

    /// Wire key, also the source of the document id prefix.
    pub fn key(&self) -> &'static str {
        match self {
            DocumentType::Paystub => "paystub",
            DocumentType::W2Form => "w2Form",
            DocumentType::BankStatement => "bankStatement",
        }
    }

    /// Leading segment of download filenames.
    pub fn file_prefix(&self) -> &'static str {
        match self {
            DocumentType::Paystub => "paystub",
            DocumentType::W2Form => "w2",
            DocumentType::BankStatement => "bank-statement",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DocumentType::Paystub => "Paystub",
            DocumentType::W2Form => "W-2 Form",
            DocumentType::BankStatement => "Bank Statement",
        }
    }

    /// First three letters of the type key, uppercased. Digits are skipped so
    /// `w2Form` yields `WFO`.
    pub fn id_prefix(&self) -> String {
        let mut prefix: String = self
            .key()
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .take(3)
            .collect::<String>()
            .to_ascii_uppercase();
        while prefix.len() < 3 {
            prefix.push('X');
        }
        prefix
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DocumentType {
    type Err = UnknownDocumentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paystub" => Ok(DocumentType::Paystub),
            "w2Form" | "w2" => Ok(DocumentType::W2Form),
            "bankStatement" | "bank-statement" => Ok(DocumentType::BankStatement),
            other => Err(UnknownDocumentType(other.to_string())),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Field values
// ────────────────────────────────────────────────────────────────────────────

/// One row of a bank statement ledger as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
}

/// A transaction together with the balance after it posts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerLine {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Money(f64),
    Date(NaiveDate),
    Ledger(Vec<LedgerLine>),
}

/// Ordered collection of the fields that are actually present on a record.
///
/// Blank strings are treated as absent; explicit zeros are kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet {
    entries: Vec<(&'static str, FieldValue)>,
}

impl FieldSet {
    pub fn text(mut self, name: &'static str, value: &Option<String>) -> Self {
        if let Some(v) = value {
            if !v.trim().is_empty() {
                self.entries.push((name, FieldValue::Text(v.trim().to_string())));
            }
        }
        self
    }

    pub fn money(mut self, name: &'static str, value: Option<f64>) -> Self {
        if let Some(v) = value {
            self.entries.push((name, FieldValue::Money(v)));
        }
        self
    }

    pub fn number(mut self, name: &'static str, value: Option<f64>) -> Self {
        if let Some(v) = value {
            self.entries.push((name, FieldValue::Number(v)));
        }
        self
    }

    pub fn date(mut self, name: &'static str, value: Option<NaiveDate>) -> Self {
        if let Some(v) = value {
            self.entries.push((name, FieldValue::Date(v)));
        }
        self
    }

    pub fn ledger(mut self, name: &'static str, value: Option<Vec<LedgerLine>>) -> Self {
        if let Some(v) = value {
            self.entries.push((name, FieldValue::Ledger(v)));
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Request payloads (one struct per document type)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInfo {
    pub employee_name: Option<String>,
    pub employee_address: Option<String>,
    pub employee_city: Option<String>,
    pub employee_state: Option<String>,
    pub employee_zip: Option<String>,
    #[serde(rename = "employeeSSN")]
    pub employee_ssn: Option<String>,
}

impl EmployeeInfo {
    fn collect(&self, set: FieldSet) -> FieldSet {
        set.text("employeeName", &self.employee_name)
            .text("employeeAddress", &self.employee_address)
            .text("employeeCity", &self.employee_city)
            .text("employeeState", &self.employee_state)
            .text("employeeZip", &self.employee_zip)
            .text("employeeSSN", &self.employee_ssn)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerInfo {
    pub employer_name: Option<String>,
    pub employer_address: Option<String>,
    pub employer_city: Option<String>,
    pub employer_state: Option<String>,
    pub employer_zip: Option<String>,
    #[serde(rename = "employerEIN")]
    pub employer_ein: Option<String>,
}

impl EmployerInfo {
    fn collect(&self, set: FieldSet) -> FieldSet {
        set.text("employerName", &self.employer_name)
            .text("employerAddress", &self.employer_address)
            .text("employerCity", &self.employer_city)
            .text("employerState", &self.employer_state)
            .text("employerZip", &self.employer_zip)
            .text("employerEIN", &self.employer_ein)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaystubFields {
    #[serde(flatten)]
    pub employee: EmployeeInfo,
    #[serde(flatten)]
    pub employer: EmployerInfo,

    pub pay_period_start: Option<NaiveDate>,
    pub pay_period_end: Option<NaiveDate>,
    pub pay_date: Option<NaiveDate>,
    pub pay_frequency: Option<PayPeriod>,
    pub gross_pay: Option<f64>,
    pub hourly_rate: Option<f64>,
    pub hours_worked: Option<f64>,

    pub federal_tax: Option<f64>,
    pub state_tax: Option<f64>,
    pub social_security_tax: Option<f64>,
    pub medicare_tax: Option<f64>,
    pub state_disability_tax: Option<f64>,
    pub health_insurance: Option<f64>,
    pub retirement401k: Option<f64>,

    // Totals carried in from the previous period; the current period is added on top.
    pub prior_ytd_gross_pay: Option<f64>,
    pub prior_ytd_federal_tax: Option<f64>,
    pub prior_ytd_state_tax: Option<f64>,
    pub prior_ytd_social_security_tax: Option<f64>,
    pub prior_ytd_medicare_tax: Option<f64>,
}

impl PaystubFields {
    /// Gross pay as entered, or rate × hours when only those were given.
    pub fn effective_gross_pay(&self) -> Option<f64> {
        self.gross_pay.or(match (self.hourly_rate, self.hours_worked) {
            (Some(rate), Some(hours)) => Some(rate * hours),
            _ => None,
        })
    }

    pub fn field_set(&self) -> FieldSet {
        let set = self.employer.collect(self.employee.collect(FieldSet::default()));
        set.date("payPeriodStart", self.pay_period_start)
            .date("payPeriodEnd", self.pay_period_end)
            .date("payDate", self.pay_date)
            .text(
                "payFrequency",
                &self.pay_frequency.map(|p| p.as_str().to_string()),
            )
            .money("hourlyRate", self.hourly_rate)
            .number("hoursWorked", self.hours_worked)
            .money("grossPay", self.effective_gross_pay())
            .money("federalTax", self.federal_tax)
            .money("stateTax", self.state_tax)
            .money("socialSecurityTax", self.social_security_tax)
            .money("medicareTax", self.medicare_tax)
            .money("stateDisabilityTax", self.state_disability_tax)
            .money("healthInsurance", self.health_insurance)
            .money("retirement401k", self.retirement401k)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct W2Fields {
    #[serde(flatten)]
    pub employee: EmployeeInfo,
    #[serde(flatten)]
    pub employer: EmployerInfo,

    pub tax_year: Option<i32>,
    pub wages: Option<f64>,
    pub federal_tax_withheld: Option<f64>,
    pub social_security_wages: Option<f64>,
    pub social_security_tax_withheld: Option<f64>,
    pub medicare_wages: Option<f64>,
    pub medicare_tax_withheld: Option<f64>,
    pub state_wages: Option<f64>,
    pub state_tax_withheld: Option<f64>,
}

impl W2Fields {
    pub fn field_set(&self) -> FieldSet {
        let set = self.employer.collect(self.employee.collect(FieldSet::default()));
        set.number("taxYear", self.tax_year.map(f64::from))
            .money("wages", self.wages)
            .money("federalTaxWithheld", self.federal_tax_withheld)
            .money("socialSecurityWages", self.social_security_wages)
            .money("socialSecurityTaxWithheld", self.social_security_tax_withheld)
            .money("medicareWages", self.medicare_wages)
            .money("medicareTaxWithheld", self.medicare_tax_withheld)
            .money("stateWages", self.state_wages)
            .money("stateTaxWithheld", self.state_tax_withheld)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankStatementFields {
    pub bank_name: Option<String>,
    pub account_holder: Option<String>,
    pub account_number: Option<String>,
    pub routing_number: Option<String>,
    pub statement_period: Option<String>,
    pub opening_balance: Option<f64>,
    pub closing_balance: Option<f64>,
    pub transactions: Option<Vec<Transaction>>,
}

impl BankStatementFields {
    /// Transactions are projected separately as a ledger once balances are known.
    pub fn field_set(&self) -> FieldSet {
        FieldSet::default()
            .text("bankName", &self.bank_name)
            .text("accountHolder", &self.account_holder)
            .text("accountNumber", &self.account_number)
            .text("routingNumber", &self.routing_number)
            .text("statementPeriod", &self.statement_period)
            .money("openingBalance", self.opening_balance)
            .money("closingBalance", self.closing_balance)
    }
}

/// A caller-supplied form record, tagged by document type.
#[derive(Debug, Clone)]
pub enum DocumentRequest {
    Paystub(PaystubFields),
    W2Form(W2Fields),
    BankStatement(BankStatementFields),
}

impl DocumentRequest {
    /// Decodes a flat JSON object into the payload for `doc_type`.
    ///
    /// Keys holding `null` or a blank string are dropped first, so an empty form
    /// input reads as absent rather than as a type error.
    pub fn from_json(
        doc_type: DocumentType,
        mut value: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        if let serde_json::Value::Object(map) = &mut value {
            map.retain(|_, v| match v {
                serde_json::Value::Null => false,
                serde_json::Value::String(s) => !s.trim().is_empty(),
                _ => true,
            });
        }
        Ok(match doc_type {
            DocumentType::Paystub => DocumentRequest::Paystub(serde_json::from_value(value)?),
            DocumentType::W2Form => DocumentRequest::W2Form(serde_json::from_value(value)?),
            DocumentType::BankStatement => {
                DocumentRequest::BankStatement(serde_json::from_value(value)?)
            }
        })
    }

    pub fn document_type(&self) -> DocumentType {
        match self {
            DocumentRequest::Paystub(_) => DocumentType::Paystub,
            DocumentRequest::W2Form(_) => DocumentType::W2Form,
            DocumentRequest::BankStatement(_) => DocumentType::BankStatement,
        }
    }

    /// Fields present on the raw request, used for required-field checks.
    pub fn field_set(&self) -> FieldSet {
        match self {
            DocumentRequest::Paystub(f) => f.field_set(),
            DocumentRequest::W2Form(f) => f.field_set(),
            DocumentRequest::BankStatement(f) => {
                let set = f.field_set();
                match &f.transactions {
                    // Presence only; balances are filled in during enrichment.
                    Some(txs) => set.ledger(
                        "transactions",
                        Some(
                            txs.iter()
                                .map(|t| LedgerLine {
                                    date: t.date,
                                    description: t.description.clone(),
                                    amount: t.amount,
                                    balance: 0.0,
                                })
                                .collect(),
                        ),
                    ),
                    None => set,
                }
            }
        }
    }
}
