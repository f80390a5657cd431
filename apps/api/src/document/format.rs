//! Label, value, and filename formatting shared by the renderers.

use crate::models::document::FieldValue;

/// Field names containing any of these render numeric values as currency.
const CURRENCY_MARKERS: [&str; 3] = ["Pay", "Tax", "Balance"];

/// `grossPay` → `Gross Pay`, `employeeSSN` → `Employee S S N`.
///
/// A space goes before every uppercase letter after the first character, then
/// the first character is capitalized.
pub fn format_field_name(name: &str) -> String {
    let mut label = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if i == 0 {
            label.extend(c.to_uppercase());
            continue;
        }
        if c.is_uppercase() {
            label.push(' ');
        }
        label.push(c);
    }
    label.trim().to_string()
}

pub fn format_currency(amount: f64) -> String {
    format!("${amount:.2}")
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

fn is_currency_field(name: &str) -> bool {
    CURRENCY_MARKERS.iter().any(|m| name.contains(m))
}

/// Plain-text rendering of a scalar value. Ledgers are laid out by the renderer.
pub fn format_field_value(name: &str, value: &FieldValue) -> String {
    match value {
        FieldValue::Text(s) => s.clone(),
        FieldValue::Money(v) => format_currency(*v),
        FieldValue::Number(v) if is_currency_field(name) => format_currency(*v),
        FieldValue::Number(v) => format_number(*v),
        FieldValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        FieldValue::Ledger(lines) => format!("{} transactions", lines.len()),
    }
}

pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Lowercase ASCII alphanumerics joined by single hyphens.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Replaces all but the last four characters with `*`. Four or fewer are left as-is.
pub fn mask_account_number(account: &str) -> String {
    let count = account.chars().count();
    if count <= 4 {
        return account.to_string();
    }
    let tail: String = account.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), tail)
}
