//! Withholding arithmetic: pure functions over gross pay.
//!
//! Federal withholding is a flat marginal lookup: the whole period's gross is
//! multiplied by the single bracket rate its annualized amount falls into. This
//! is a deliberate simplification of progressive taxation, not a bug.
//!
//! Social Security is uncapped here; callers that need the annual wage base
//! apply [`TaxTable::capped_social_security`] themselves.
//!
//! Amounts cross the API as `f64`, but every product, sum and rounding step is
//! done in `Decimal` so that half cents round up exactly.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Pay periods
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum PayPeriod {
    Weekly,
    #[default]
    Biweekly,
    Monthly,
    Quarterly,
    Annually,
}

impl PayPeriod {
    pub fn periods_per_year(&self) -> f64 {
        match self {
            PayPeriod::Weekly => 52.0,
            PayPeriod::Biweekly => 26.0,
            PayPeriod::Monthly => 12.0,
            PayPeriod::Quarterly => 4.0,
            PayPeriod::Annually => 1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PayPeriod::Weekly => "weekly",
            PayPeriod::Biweekly => "biweekly",
            PayPeriod::Monthly => "monthly",
            PayPeriod::Quarterly => "quarterly",
            PayPeriod::Annually => "annually",
        }
    }
}

/// Unrecognised frequencies fall back to biweekly.
impl From<String> for PayPeriod {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => PayPeriod::Weekly,
            "monthly" => PayPeriod::Monthly,
            "quarterly" => PayPeriod::Quarterly,
            "annually" | "annual" | "yearly" => PayPeriod::Annually,
            _ => PayPeriod::Biweekly,
        }
    }
}

pub fn annualize(gross_pay: f64, period: PayPeriod) -> f64 {
    gross_pay * period.periods_per_year()
}

// ────────────────────────────────────────────────────────────────────────────
// Rate table
// ────────────────────────────────────────────────────────────────────────────

/// Upper bound (inclusive) of annualized income for a rate. `None` = no ceiling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct FederalBracket {
    pub up_to: Option<f64>,
    pub rate: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaxBreakdown {
    pub federal: f64,
    pub state: f64,
    pub social_security: f64,
    pub medicare: f64,
}

impl TaxBreakdown {
    pub fn total(&self) -> f64 {
        sum_money(&[self.federal, self.state, self.social_security, self.medicare])
    }
}

pub const DEFAULT_SOCIAL_SECURITY_WAGE_BASE: f64 = 160_200.0;

/// Withholding rates, built once at startup and shared through `AppState`.
#[derive(Debug, Clone, Serialize)]
pub struct TaxTable {
    pub federal_brackets: Vec<FederalBracket>,
    pub state_rate: f64,
    pub social_security_rate: f64,
    pub medicare_rate: f64,
    pub state_disability_rate: f64,
    /// Annual Social Security wage base; the tax cap is `base * social_security_rate`.
    pub social_security_wage_base: f64,
}

impl Default for TaxTable {
    fn default() -> Self {
        Self {
            federal_brackets: vec![
                FederalBracket { up_to: Some(10_275.0), rate: 0.10 },
                FederalBracket { up_to: Some(41_775.0), rate: 0.12 },
                FederalBracket { up_to: Some(89_450.0), rate: 0.22 },
                FederalBracket { up_to: Some(190_750.0), rate: 0.24 },
                FederalBracket { up_to: Some(364_200.0), rate: 0.32 },
                FederalBracket { up_to: Some(462_500.0), rate: 0.35 },
                FederalBracket { up_to: None, rate: 0.37 },
            ],
            state_rate: 0.05,
            social_security_rate: 0.062,
            medicare_rate: 0.0145,
            state_disability_rate: 0.01,
            social_security_wage_base: DEFAULT_SOCIAL_SECURITY_WAGE_BASE,
        }
    }
}

impl TaxTable {
    pub fn with_wage_base(wage_base: f64) -> Self {
        Self {
            social_security_wage_base: wage_base,
            ..Self::default()
        }
    }

    /// Marginal rate for an annualized income. Brackets are scanned in order.
    pub fn federal_rate(&self, annual_pay: f64) -> f64 {
        self.federal_brackets
            .iter()
            .find(|b| b.up_to.map_or(true, |limit| annual_pay <= limit))
            .or_else(|| self.federal_brackets.last())
            .map(|b| b.rate)
            .unwrap_or(0.0)
    }

    pub fn compute_taxes(&self, gross_pay: f64, period: PayPeriod) -> TaxBreakdown {
        let rate = self.federal_rate(annualize(gross_pay, period));
        TaxBreakdown {
            federal: apply_rate(gross_pay, rate),
            state: apply_rate(gross_pay, self.state_rate),
            social_security: apply_rate(gross_pay, self.social_security_rate),
            medicare: apply_rate(gross_pay, self.medicare_rate),
        }
    }

    pub fn state_disability(&self, gross_pay: f64) -> f64 {
        apply_rate(gross_pay, self.state_disability_rate)
    }

    pub fn social_security_cap(&self) -> f64 {
        apply_rate(self.social_security_wage_base, self.social_security_rate)
    }

    /// Social Security on `wages` limited to the annual cap.
    pub fn capped_social_security(&self, wages: f64) -> f64 {
        apply_rate(wages, self.social_security_rate).min(self.social_security_cap())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Net pay, YTD, balances
// ────────────────────────────────────────────────────────────────────────────

/// Gross minus every deduction. Negative results are returned as-is so the
/// caller can flag them.
pub fn compute_net_pay<K: Ord>(gross_pay: f64, deductions: &BTreeMap<K, f64>) -> f64 {
    let mut terms = vec![gross_pay];
    terms.extend(deductions.values().map(|d| -d));
    sum_money(&terms)
}

pub fn accumulate_ytd(current: f64, previous_ytd: f64) -> f64 {
    sum_money(&[previous_ytd, current])
}

/// Balance after each transaction, starting with the opening balance.
pub fn running_balance(opening: f64, amounts: &[f64]) -> Vec<f64> {
    let mut balance = to_decimal(opening);
    let mut history = Vec::with_capacity(amounts.len() + 1);
    history.push(to_cents(balance));
    for amount in amounts {
        balance = balance
            .checked_add(to_decimal(*amount))
            .unwrap_or(Decimal::MAX);
        history.push(to_cents(balance));
    }
    history
}

/// Rounds half away from zero at the cent, i.e. half-up for non-negative amounts.
///
/// The input is read at its shortest decimal form, so `1.005` rounds to `1.01`.
pub fn round_cents(value: f64) -> f64 {
    to_cents(to_decimal(value))
}

/// `amount * rate`, rounded to the cent.
pub fn apply_rate(amount: f64, rate: f64) -> f64 {
    match to_decimal(amount).checked_mul(to_decimal(rate)) {
        Some(product) => to_cents(product),
        None => amount * rate,
    }
}

/// Exact sum of `values`, rounded to the cent.
pub fn sum_money(values: &[f64]) -> f64 {
    values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(to_decimal(*v)))
        .map(to_cents)
        .unwrap_or_else(|| values.iter().sum())
}

fn to_decimal(value: f64) -> Decimal {
    // `Display` for f64 prints the shortest string that round-trips.
    Decimal::from_str(&value.to_string())
        .ok()
        .or_else(|| Decimal::from_f64(value))
        .unwrap_or_default()
}

fn to_cents(value: Decimal) -> f64 {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    // Parsing the decimal text yields the nearest f64, which `to_f64` does not promise.
    rounded
        .to_string()
        .parse::<f64>()
        .ok()
        .or_else(|| rounded.to_f64())
        .unwrap_or_default()
}
