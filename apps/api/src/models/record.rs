//! Records after enrichment: the caller's fields plus computed values.

use serde::Serialize;

use crate::calculation::engine::{annualize, PayPeriod, TaxBreakdown};
use crate::models::document::{
    BankStatementFields, DocumentType, FieldSet, LedgerLine, PaystubFields, W2Fields,
};

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaystubComputed {
    /// Engine withholding for the gross pay, independent of what the caller entered.
    pub expected: Option<TaxBreakdown>,
    pub total_deductions: Option<f64>,
    pub net_pay: Option<f64>,
    pub ytd_gross_pay: Option<f64>,
    pub ytd_federal_tax: Option<f64>,
    pub ytd_state_tax: Option<f64>,
    pub ytd_social_security_tax: Option<f64>,
    pub ytd_medicare_tax: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct W2Computed {
    pub expected: Option<TaxBreakdown>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementComputed {
    pub ledger: Option<Vec<LedgerLine>>,
    pub total_credits: Option<f64>,
    pub total_debits: Option<f64>,
    /// Opening balance plus every transaction.
    pub computed_closing_balance: Option<f64>,
}

#[derive(Debug, Clone)]
pub enum ProcessedRecord {
    Paystub {
        fields: PaystubFields,
        computed: PaystubComputed,
    },
    W2Form {
        fields: W2Fields,
        computed: W2Computed,
    },
    BankStatement {
        fields: BankStatementFields,
        computed: StatementComputed,
    },
}

impl ProcessedRecord {
    pub fn document_type(&self) -> DocumentType {
        match self {
            ProcessedRecord::Paystub { .. } => DocumentType::Paystub,
            ProcessedRecord::W2Form { .. } => DocumentType::W2Form,
            ProcessedRecord::BankStatement { .. } => DocumentType::BankStatement,
        }
    }

    /// Every present field, inputs first, then derived values.
    pub fn field_set(&self) -> FieldSet {
        match self {
            ProcessedRecord::Paystub { fields, computed } => fields
                .field_set()
                .money("totalDeductions", computed.total_deductions)
                .money("netPay", computed.net_pay)
                .money("ytdGrossPay", computed.ytd_gross_pay)
                .money("ytdFederalTax", computed.ytd_federal_tax)
                .money("ytdStateTax", computed.ytd_state_tax)
                .money("ytdSocialSecurityTax", computed.ytd_social_security_tax)
                .money("ytdMedicareTax", computed.ytd_medicare_tax),
            ProcessedRecord::W2Form { fields, .. } => fields.field_set(),
            ProcessedRecord::BankStatement { fields, computed } => fields
                .field_set()
                .money("totalCredits", computed.total_credits)
                .money("totalDebits", computed.total_debits)
                .ledger("transactions", computed.ledger.clone()),
        }
    }

    /// Name shown in history entries and used for the download filename.
    pub fn subject_name(&self) -> Option<&str> {
        let name = match self {
            ProcessedRecord::Paystub { fields, .. } => fields.employee.employee_name.as_deref(),
            ProcessedRecord::W2Form { fields, .. } => fields.employee.employee_name.as_deref(),
            ProcessedRecord::BankStatement { fields, .. } => fields.account_holder.as_deref(),
        };
        name.map(str::trim).filter(|n| !n.is_empty())
    }

    /// Gross pay projected over a year, where the record carries pay at all.
    pub fn annualized_pay(&self) -> Option<f64> {
        match self {
            ProcessedRecord::Paystub { fields, .. } => fields.effective_gross_pay().map(|g| {
                annualize(g, fields.pay_frequency.unwrap_or_default())
            }),
            ProcessedRecord::W2Form { fields, .. } => {
                fields.wages.map(|w| annualize(w, PayPeriod::Annually))
            }
            ProcessedRecord::BankStatement { .. } => None,
        }
    }
}
