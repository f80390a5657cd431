//! Required-field and sanity validation for incoming requests.
//!
//! All problems are collected; nothing short-circuits. Pure, no I/O.

use serde::{Deserialize, Serialize};

use crate::document::templates::Template;
use crate::models::document::DocumentRequest;

pub const MIN_ACCOUNT_NUMBER_LEN: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Checks `request` against the required-field list of `template`, then runs the
/// numeric and format checks specific to its document type.
pub fn validate(template: &Template, request: &DocumentRequest) -> ValidationReport {
    let present = request.field_set();
    let mut errors: Vec<String> = template
        .required
        .iter()
        .filter(|field| !present.contains(field))
        .map(|field| format!("missing field: {field}"))
        .collect();

    match request {
        DocumentRequest::Paystub(f) => {
            if f.effective_gross_pay().is_some_and(|g| g < 0.0) {
                errors.push("gross pay cannot be negative".to_string());
            }
            if f.hourly_rate.is_some_and(|r| r < 0.0) {
                errors.push("hourly rate cannot be negative".to_string());
            }
            if f.hours_worked.is_some_and(|h| h < 0.0) {
                errors.push("hours worked cannot be negative".to_string());
            }
            if let (Some(start), Some(end)) = (f.pay_period_start, f.pay_period_end) {
                if start > end {
                    errors.push("pay period start is after pay period end".to_string());
                }
            }
        }
        DocumentRequest::W2Form(f) => {
            if f.wages.is_some_and(|w| w < 0.0) {
                errors.push("wages cannot be negative".to_string());
            }
            if let Some(year) = f.tax_year {
                if !(1900..=9999).contains(&year) {
                    errors.push(format!("tax year {year} is out of range"));
                }
            }
        }
        DocumentRequest::BankStatement(f) => {
            if let Some(account) = f.account_number.as_deref().map(str::trim) {
                if !account.is_empty() && account.chars().count() < MIN_ACCOUNT_NUMBER_LEN {
                    errors.push(format!(
                        "account number must be at least {MIN_ACCOUNT_NUMBER_LEN} characters"
                    ));
                }
            }
        }
    }

    ValidationReport::from_errors(errors)
}
