//! Fills in the values a document needs but the caller did not enter.
//!
//! Anything the caller supplied wins over the engine. When an input a
//! calculation depends on is missing, the dependent values stay `None`.

use std::collections::BTreeMap;

use tracing::debug;

use crate::calculation::engine::{
    accumulate_ytd, apply_rate, compute_net_pay, round_cents, running_balance, sum_money, PayPeriod,
    TaxTable,
};
use crate::models::document::{
    BankStatementFields, DocumentRequest, LedgerLine, PaystubFields, W2Fields,
};
use crate::models::record::{PaystubComputed, ProcessedRecord, StatementComputed, W2Computed};

pub fn enrich(request: DocumentRequest, taxes: &TaxTable) -> ProcessedRecord {
    match request {
        DocumentRequest::Paystub(fields) => enrich_paystub(fields, taxes),
        DocumentRequest::W2Form(fields) => enrich_w2(fields, taxes),
        DocumentRequest::BankStatement(fields) => enrich_statement(fields),
    }
}

fn enrich_paystub(mut fields: PaystubFields, taxes: &TaxTable) -> ProcessedRecord {
    let mut computed = PaystubComputed::default();

    let Some(gross) = fields.effective_gross_pay().map(round_cents) else {
        debug!("paystub has no gross pay; skipping withholding");
        return ProcessedRecord::Paystub { fields, computed };
    };

    fields.gross_pay = Some(gross);
    let period = *fields.pay_frequency.get_or_insert(PayPeriod::default());
    let expected = taxes.compute_taxes(gross, period);

    let federal = *fields.federal_tax.get_or_insert(expected.federal);
    let state = *fields.state_tax.get_or_insert(expected.state);
    let social_security = *fields
        .social_security_tax
        .get_or_insert(expected.social_security);
    let medicare = *fields.medicare_tax.get_or_insert(expected.medicare);
    let disability = *fields
        .state_disability_tax
        .get_or_insert(taxes.state_disability(gross));

    let mut deductions = BTreeMap::from([
        ("federalTax", federal),
        ("stateTax", state),
        ("socialSecurityTax", social_security),
        ("medicareTax", medicare),
        ("stateDisabilityTax", disability),
    ]);
    if let Some(v) = fields.health_insurance {
        deductions.insert("healthInsurance", v);
    }
    if let Some(v) = fields.retirement401k {
        deductions.insert("retirement401k", v);
    }

    let net_pay = compute_net_pay(gross, &deductions);
    let amounts: Vec<f64> = deductions.values().copied().collect();
    computed.total_deductions = Some(sum_money(&amounts));
    computed.net_pay = Some(net_pay);

    computed.ytd_gross_pay = Some(accumulate_ytd(
        gross,
        fields.prior_ytd_gross_pay.unwrap_or(0.0),
    ));
    computed.ytd_federal_tax = Some(accumulate_ytd(
        federal,
        fields.prior_ytd_federal_tax.unwrap_or(0.0),
    ));
    computed.ytd_state_tax = Some(accumulate_ytd(
        state,
        fields.prior_ytd_state_tax.unwrap_or(0.0),
    ));
    computed.ytd_social_security_tax = Some(accumulate_ytd(
        social_security,
        fields.prior_ytd_social_security_tax.unwrap_or(0.0),
    ));
    computed.ytd_medicare_tax = Some(accumulate_ytd(
        medicare,
        fields.prior_ytd_medicare_tax.unwrap_or(0.0),
    ));
    computed.expected = Some(expected);

    debug!(gross, net_pay, period = period.as_str(), "paystub enriched");
    ProcessedRecord::Paystub { fields, computed }
}

fn enrich_w2(mut fields: W2Fields, taxes: &TaxTable) -> ProcessedRecord {
    let mut computed = W2Computed::default();

    let Some(wages) = fields.wages else {
        debug!("w2 has no wages; skipping withholding");
        return ProcessedRecord::W2Form { fields, computed };
    };

    let expected = taxes.compute_taxes(wages, PayPeriod::Annually);
    let ss_wages = *fields.social_security_wages.get_or_insert(wages);
    let medicare_wages = *fields.medicare_wages.get_or_insert(wages);
    let state_wages = *fields.state_wages.get_or_insert(wages);

    fields.federal_tax_withheld.get_or_insert(expected.federal);
    fields
        .social_security_tax_withheld
        .get_or_insert(taxes.capped_social_security(ss_wages));
    fields
        .medicare_tax_withheld
        .get_or_insert(apply_rate(medicare_wages, taxes.medicare_rate));
    fields
        .state_tax_withheld
        .get_or_insert(apply_rate(state_wages, taxes.state_rate));

    computed.expected = Some(expected);
    debug!(wages, "w2 enriched");
    ProcessedRecord::W2Form { fields, computed }
}

fn enrich_statement(fields: BankStatementFields) -> ProcessedRecord {
    let mut computed = StatementComputed::default();

    if let Some(txs) = &fields.transactions {
        let credits: Vec<f64> = txs.iter().map(|t| t.amount).filter(|a| *a > 0.0).collect();
        let debits: Vec<f64> = txs.iter().map(|t| -t.amount).filter(|a| *a > 0.0).collect();
        computed.total_credits = Some(sum_money(&credits));
        computed.total_debits = Some(sum_money(&debits));

        if let Some(opening) = fields.opening_balance {
            let amounts: Vec<f64> = txs.iter().map(|t| t.amount).collect();
            let balances = running_balance(opening, &amounts);
            computed.computed_closing_balance = balances.last().copied();
            computed.ledger = Some(
                txs.iter()
                    .zip(balances.iter().skip(1))
                    .map(|(t, balance)| LedgerLine {
                        date: t.date,
                        description: t.description.clone(),
                        amount: t.amount,
                        balance: *balance,
                    })
                    .collect(),
            );
        }
    }

    ProcessedRecord::BankStatement { fields, computed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::Transaction;
    use chrono::NaiveDate;

    fn paystub(gross: f64) -> PaystubFields {
        PaystubFields {
            gross_pay: Some(gross),
            ..Default::default()
        }
    }

    #[test]
    fn test_paystub_fills_missing_withholding() {
        let record = enrich(
            DocumentRequest::Paystub(paystub(1000.0)),
            &TaxTable::default(),
        );
        let ProcessedRecord::Paystub { fields, computed } = record else {
            panic!("expected paystub");
        };
        assert_eq!(fields.federal_tax, Some(120.0));
        assert_eq!(fields.state_tax, Some(50.0));
        assert_eq!(fields.social_security_tax, Some(62.0));
        assert_eq!(fields.medicare_tax, Some(14.5));
        assert_eq!(fields.state_disability_tax, Some(10.0));
        assert_eq!(fields.pay_frequency, Some(PayPeriod::Biweekly));
        // 1000 - (120 + 50 + 62 + 14.5 + 10)
        assert_eq!(computed.net_pay, Some(743.5));
        assert_eq!(computed.total_deductions, Some(256.5));
    }

    #[test]
    fn test_paystub_keeps_caller_values() {
        let mut fields = paystub(1000.0);
        fields.federal_tax = Some(100.0);
        fields.health_insurance = Some(40.0);
        let ProcessedRecord::Paystub { fields, computed } =
            enrich(DocumentRequest::Paystub(fields), &TaxTable::default())
        else {
            panic!("expected paystub");
        };
        assert_eq!(fields.federal_tax, Some(100.0));
        assert_eq!(computed.expected.map(|e| e.federal), Some(120.0));
        // 1000 - (100 + 50 + 62 + 14.5 + 10 + 40)
        assert_eq!(computed.net_pay, Some(723.5));
    }

    #[test]
    fn test_paystub_ytd_accumulates_prior_totals() {
        let mut fields = paystub(2000.0);
        fields.pay_frequency = Some(PayPeriod::Monthly);
        fields.prior_ytd_gross_pay = Some(4000.0);
        fields.prior_ytd_state_tax = Some(200.0);
        let ProcessedRecord::Paystub { computed, .. } =
            enrich(DocumentRequest::Paystub(fields), &TaxTable::default())
        else {
            panic!("expected paystub");
        };
        assert_eq!(computed.ytd_gross_pay, Some(6000.0));
        assert_eq!(computed.ytd_state_tax, Some(300.0));
        assert_eq!(computed.ytd_medicare_tax, Some(29.0));
    }

    #[test]
    fn test_paystub_without_gross_leaves_dependents_empty() {
        let ProcessedRecord::Paystub { fields, computed } = enrich(
            DocumentRequest::Paystub(PaystubFields::default()),
            &TaxTable::default(),
        ) else {
            panic!("expected paystub");
        };
        assert!(fields.federal_tax.is_none());
        assert!(computed.net_pay.is_none());
        assert!(computed.expected.is_none());
    }

    #[test]
    fn test_w2_caps_social_security() {
        let fields = W2Fields {
            wages: Some(250_000.0),
            ..Default::default()
        };
        let ProcessedRecord::W2Form { fields, .. } =
            enrich(DocumentRequest::W2Form(fields), &TaxTable::default())
        else {
            panic!("expected w2");
        };
        assert_eq!(fields.social_security_wages, Some(250_000.0));
        assert_eq!(fields.social_security_tax_withheld, Some(9932.4));
        assert_eq!(fields.medicare_tax_withheld, Some(3625.0));
        assert_eq!(fields.state_tax_withheld, Some(12_500.0));
        // 250k annual → 32% bracket
        assert_eq!(fields.federal_tax_withheld, Some(80_000.0));
    }

    #[test]
    fn test_statement_running_balance_and_totals() {
        let d = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let fields = BankStatementFields {
            opening_balance: Some(1000.0),
            transactions: Some(vec![
                Transaction { date: d, description: "Payroll".into(), amount: 2500.0 },
                Transaction { date: d, description: "Rent".into(), amount: -1800.0 },
                Transaction { date: d, description: "Groceries".into(), amount: -120.45 },
            ]),
            ..Default::default()
        };
        let ProcessedRecord::BankStatement { computed, .. } =
            enrich(DocumentRequest::BankStatement(fields), &TaxTable::default())
        else {
            panic!("expected statement");
        };
        assert_eq!(computed.total_credits, Some(2500.0));
        assert_eq!(computed.total_debits, Some(1920.45));
        assert_eq!(computed.computed_closing_balance, Some(1579.55));
        let ledger = computed.ledger.unwrap();
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger[0].balance, 3500.0);
        assert_eq!(ledger[2].balance, 1579.55);
    }
}
