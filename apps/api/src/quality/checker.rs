//! Quality checks: plausibility heuristics run after enrichment.
//!
//! Checks never block generation. Failures become warnings on the response
//! and lower the score (percentage of checks passed, rounded).

use serde::{Deserialize, Serialize};

use crate::calculation::engine::{apply_rate, sum_money, TaxTable};
use crate::document::templates::Template;
use crate::models::record::ProcessedRecord;

/// Inclusive range of believable annualized pay.
pub const PLAUSIBLE_ANNUAL_PAY: (f64, f64) = (15_000.0, 500_000.0);
/// Relative deviation from the engine's expectation that triggers a warning.
pub const TAX_DEVIATION_LIMIT: f64 = 0.10;
pub const BALANCE_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum QualityCheck {
    PayPlausibility,
    TaxConsistency,
    NetPayNonNegative,
    BalanceConsistency,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub check: QualityCheck,
    pub passed: bool,
    pub message: String,
    pub suggestions: Vec<String>,
}

impl CheckResult {
    fn pass(check: QualityCheck, message: impl Into<String>) -> Self {
        Self {
            check,
            passed: true,
            message: message.into(),
            suggestions: vec![],
        }
    }

    fn fail(check: QualityCheck, message: impl Into<String>, suggestions: Vec<String>) -> Self {
        Self {
            check,
            passed: false,
            message: message.into(),
            suggestions,
        }
    }

    fn skipped(check: QualityCheck) -> Self {
        Self::pass(check, "Skipped: required inputs not present")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    /// 0 – 100
    pub score: u32,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
    pub results: Vec<CheckResult>,
}

/// Runs every check the template declares against the enriched record.
pub fn run_checks(template: &Template, record: &ProcessedRecord, taxes: &TaxTable) -> QualityReport {
    let results: Vec<CheckResult> = template
        .checks
        .iter()
        .map(|check| run_check(*check, record, taxes))
        .collect();

    let passed = results.iter().filter(|r| r.passed).count();
    let score = if results.is_empty() {
        100
    } else {
        ((passed as f64 / results.len() as f64) * 100.0).round() as u32
    };

    let warnings = results
        .iter()
        .filter(|r| !r.passed)
        .map(|r| r.message.clone())
        .collect();
    let suggestions = results
        .iter()
        .flat_map(|r| r.suggestions.iter().cloned())
        .collect();

    QualityReport {
        score,
        warnings,
        suggestions,
        results,
    }
}

fn run_check(check: QualityCheck, record: &ProcessedRecord, taxes: &TaxTable) -> CheckResult {
    match check {
        QualityCheck::PayPlausibility => pay_plausibility(record),
        QualityCheck::TaxConsistency => tax_consistency(record, taxes),
        QualityCheck::NetPayNonNegative => net_pay_non_negative(record),
        QualityCheck::BalanceConsistency => balance_consistency(record),
    }
}

fn pay_plausibility(record: &ProcessedRecord) -> CheckResult {
    let check = QualityCheck::PayPlausibility;
    let Some(annual) = record.annualized_pay() else {
        return CheckResult::skipped(check);
    };
    let (low, high) = PLAUSIBLE_ANNUAL_PAY;
    if annual < low {
        CheckResult::fail(
            check,
            format!("Pay seems unusually low (${annual:.2} annualized)"),
            vec!["Confirm the pay amount and pay frequency".to_string()],
        )
    } else if annual > high {
        CheckResult::fail(
            check,
            format!("Pay seems unusually high (${annual:.2} annualized)"),
            vec!["Confirm the pay amount and pay frequency".to_string()],
        )
    } else {
        CheckResult::pass(check, "Pay is within normal range")
    }
}

/// `|supplied - expected| / expected`; a zero expectation only matches zero.
fn relative_deviation(supplied: f64, expected: f64) -> f64 {
    if expected == 0.0 {
        if supplied == 0.0 {
            0.0
        } else {
            f64::INFINITY
        }
    } else {
        (supplied - expected).abs() / expected
    }
}

fn tax_consistency(record: &ProcessedRecord, taxes: &TaxTable) -> CheckResult {
    let check = QualityCheck::TaxConsistency;
    let (federal, state, expected) = match record {
        ProcessedRecord::Paystub { fields, computed } => {
            (fields.federal_tax, fields.state_tax, computed.expected)
        }
        ProcessedRecord::W2Form { fields, computed } => (
            fields.federal_tax_withheld,
            fields.state_tax_withheld,
            // State withholding follows state wages, which may differ from box 1.
            computed.expected.map(|mut e| {
                if let Some(sw) = fields.state_wages {
                    e.state = apply_rate(sw, taxes.state_rate);
                }
                e
            }),
        ),
        ProcessedRecord::BankStatement { .. } => return CheckResult::skipped(check),
    };
    let (Some(federal), Some(state), Some(expected)) = (federal, state, expected) else {
        return CheckResult::skipped(check);
    };

    let federal_dev = relative_deviation(federal, expected.federal);
    let state_dev = relative_deviation(state, expected.state);

    let mut problems = Vec::new();
    let mut suggestions = Vec::new();
    if federal_dev > TAX_DEVIATION_LIMIT {
        problems.push(format!(
            "federal tax ${federal:.2} differs from expected ${:.2}",
            expected.federal
        ));
        suggestions.push("Check federal tax calculation".to_string());
    }
    if state_dev > TAX_DEVIATION_LIMIT {
        problems.push(format!(
            "state tax ${state:.2} differs from expected ${:.2}",
            expected.state
        ));
        suggestions.push("Check state tax calculation".to_string());
    }

    if problems.is_empty() {
        CheckResult::pass(check, "Tax calculations appear accurate")
    } else {
        CheckResult::fail(
            check,
            format!("Tax withholding looks inconsistent: {}", problems.join("; ")),
            suggestions,
        )
    }
}

fn net_pay_non_negative(record: &ProcessedRecord) -> CheckResult {
    let check = QualityCheck::NetPayNonNegative;
    let ProcessedRecord::Paystub { computed, .. } = record else {
        return CheckResult::skipped(check);
    };
    match computed.net_pay {
        None => CheckResult::skipped(check),
        Some(net) if net < 0.0 => CheckResult::fail(
            check,
            format!("Net pay is negative (${net:.2}); deductions exceed gross pay"),
            vec!["Review deductions against gross pay".to_string()],
        ),
        Some(_) => CheckResult::pass(check, "Net pay is non-negative"),
    }
}

fn balance_consistency(record: &ProcessedRecord) -> CheckResult {
    let check = QualityCheck::BalanceConsistency;
    let ProcessedRecord::BankStatement { fields, computed } = record else {
        return CheckResult::skipped(check);
    };
    let (Some(calculated), Some(closing)) = (computed.computed_closing_balance, fields.closing_balance)
    else {
        return CheckResult::skipped(check);
    };

    let difference = sum_money(&[calculated, -closing]).abs();
    if difference < BALANCE_TOLERANCE {
        CheckResult::pass(check, "Balance calculations are accurate")
    } else {
        CheckResult::fail(
            check,
            format!("Balance discrepancy of ${difference:.2} detected"),
            vec![format!(
                "Closing balance should be ${calculated:.2} given the opening balance and transactions"
            )],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::engine::PayPeriod;
    use crate::calculation::enrich::enrich;
    use crate::document::templates::TemplateRegistry;
    use crate::models::document::{
        BankStatementFields, DocumentRequest, PaystubFields, Transaction,
    };
    use chrono::NaiveDate;

    fn report_for(request: DocumentRequest) -> QualityReport {
        let taxes = TaxTable::default();
        let registry = TemplateRegistry::standard();
        let template = registry.get(request.document_type()).unwrap();
        let record = enrich(request, &taxes);
        run_checks(template, &record, &taxes)
    }

    fn paystub(gross: f64, period: PayPeriod) -> PaystubFields {
        PaystubFields {
            gross_pay: Some(gross),
            pay_frequency: Some(period),
            ..Default::default()
        }
    }

    #[test]
    fn test_plausible_paystub_scores_100() {
        let report = report_for(DocumentRequest::Paystub(paystub(2000.0, PayPeriod::Biweekly)));
        assert_eq!(report.score, 100);
        assert!(report.warnings.is_empty());
        assert_eq!(report.results.len(), 3);
    }

    #[test]
    fn test_low_pay_warns_but_scores_partially() {
        // 100 * 26 = 2,600 annualized
        let report = report_for(DocumentRequest::Paystub(paystub(100.0, PayPeriod::Biweekly)));
        assert_eq!(report.score, 67);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("unusually low"));
    }

    #[test]
    fn test_high_pay_warns() {
        let report = report_for(DocumentRequest::Paystub(paystub(50_000.0, PayPeriod::Monthly)));
        assert!(report.warnings[0].contains("unusually high"));
    }

    #[test]
    fn test_plausibility_bounds_are_inclusive() {
        let report = report_for(DocumentRequest::Paystub(paystub(15_000.0, PayPeriod::Annually)));
        assert!(report.results[0].passed);
        let report = report_for(DocumentRequest::Paystub(paystub(500_000.0, PayPeriod::Annually)));
        assert!(report.results[0].passed);
    }

    #[test]
    fn test_federal_deviation_produces_suggestion() {
        let mut fields = paystub(2000.0, PayPeriod::Biweekly);
        // expected 22% = 440
        fields.federal_tax = Some(300.0);
        let report = report_for(DocumentRequest::Paystub(fields));
        let tax = &report.results[1];
        assert!(!tax.passed);
        assert_eq!(tax.suggestions, vec!["Check federal tax calculation"]);
        assert!(report.suggestions.contains(&"Check federal tax calculation".to_string()));
    }

    #[test]
    fn test_small_deviation_passes() {
        let mut fields = paystub(2000.0, PayPeriod::Biweekly);
        fields.federal_tax = Some(420.0);
        fields.state_tax = Some(95.0);
        let report = report_for(DocumentRequest::Paystub(fields));
        assert!(report.results[1].passed);
    }

    #[test]
    fn test_both_taxes_off_yields_two_suggestions() {
        let mut fields = paystub(2000.0, PayPeriod::Biweekly);
        fields.federal_tax = Some(10.0);
        fields.state_tax = Some(500.0);
        let report = report_for(DocumentRequest::Paystub(fields));
        assert_eq!(report.results[1].suggestions.len(), 2);
    }

    #[test]
    fn test_negative_net_pay_is_reported() {
        let mut fields = paystub(2000.0, PayPeriod::Biweekly);
        fields.health_insurance = Some(5000.0);
        let report = report_for(DocumentRequest::Paystub(fields));
        let net = &report.results[2];
        assert!(!net.passed);
        assert!(net.message.contains("negative"));
    }

    #[test]
    fn test_relative_deviation_zero_expected() {
        assert_eq!(relative_deviation(0.0, 0.0), 0.0);
        assert!(relative_deviation(1.0, 0.0).is_infinite());
    }

    fn statement(closing: f64) -> BankStatementFields {
        let d = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        BankStatementFields {
            opening_balance: Some(500.0),
            closing_balance: Some(closing),
            transactions: Some(vec![
                Transaction { date: d, description: "Deposit".into(), amount: 250.0 },
                Transaction { date: d, description: "Utilities".into(), amount: -80.25 },
            ]),
            ..Default::default()
        }
    }

    #[test]
    fn test_balanced_statement_passes() {
        let report = report_for(DocumentRequest::BankStatement(statement(669.75)));
        assert_eq!(report.score, 100);
    }

    #[test]
    fn test_unbalanced_statement_reports_discrepancy() {
        let report = report_for(DocumentRequest::BankStatement(statement(700.0)));
        assert_eq!(report.score, 0);
        assert_eq!(report.warnings, vec!["Balance discrepancy of $30.25 detected"]);
    }

    #[test]
    fn test_missing_inputs_skip_checks() {
        let report = report_for(DocumentRequest::Paystub(PaystubFields::default()));
        assert_eq!(report.score, 100);
        assert!(report.results.iter().all(|r| r.message.starts_with("Skipped")));
    }
}
