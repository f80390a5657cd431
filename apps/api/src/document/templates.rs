use std::collections::HashMap;

use serde::Serialize;

use crate::models::document::DocumentType;
use crate::quality::QualityCheck;

/// Declares what a document type collects, requires, shows, and checks.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub document_type: DocumentType,
    pub name: &'static str,
    /// Heading printed at the top of the rendered document.
    pub title: &'static str,
    /// Body fields, in display order.
    pub fields: Vec<&'static str>,
    pub required: Vec<&'static str>,
    pub checks: Vec<QualityCheck>,
}

const EMPLOYEE_FIELDS: [&str; 6] = [
    "employeeName",
    "employeeAddress",
    "employeeCity",
    "employeeState",
    "employeeZip",
    "employeeSSN",
];

const EMPLOYER_FIELDS: [&str; 6] = [
    "employerName",
    "employerAddress",
    "employerCity",
    "employerState",
    "employerZip",
    "employerEIN",
];

fn party_fields() -> Vec<&'static str> {
    EMPLOYEE_FIELDS
        .iter()
        .chain(EMPLOYER_FIELDS.iter())
        .copied()
        .collect()
}

fn paystub_template() -> Template {
    let mut fields = party_fields();
    fields.extend([
        "payPeriodStart",
        "payPeriodEnd",
        "payDate",
        "payFrequency",
        "hourlyRate",
        "hoursWorked",
        "grossPay",
        "federalTax",
        "stateTax",
        "socialSecurityTax",
        "medicareTax",
        "stateDisabilityTax",
        "healthInsurance",
        "retirement401k",
        "totalDeductions",
        "netPay",
        "ytdGrossPay",
        "ytdFederalTax",
        "ytdStateTax",
        "ytdSocialSecurityTax",
        "ytdMedicareTax",
    ]);

    let mut required = party_fields();
    required.extend(["payPeriodStart", "payPeriodEnd", "payDate", "grossPay"]);

    Template {
        document_type: DocumentType::Paystub,
        name: "Standard Paystub",
        title: "PAYROLL STATEMENT",
        fields,
        required,
        checks: vec![
            QualityCheck::PayPlausibility,
            QualityCheck::TaxConsistency,
            QualityCheck::NetPayNonNegative,
        ],
    }
}

fn w2_template() -> Template {
    let mut fields = party_fields();
    fields.extend([
        "taxYear",
        "wages",
        "federalTaxWithheld",
        "socialSecurityWages",
        "socialSecurityTaxWithheld",
        "medicareWages",
        "medicareTaxWithheld",
        "stateWages",
        "stateTaxWithheld",
    ]);

    let mut required = party_fields();
    required.extend(["taxYear", "wages"]);

    Template {
        document_type: DocumentType::W2Form,
        name: "W-2 Tax Form",
        title: "W-2 WAGE AND TAX STATEMENT",
        fields,
        required,
        checks: vec![QualityCheck::PayPlausibility, QualityCheck::TaxConsistency],
    }
}

fn bank_statement_template() -> Template {
    Template {
        document_type: DocumentType::BankStatement,
        name: "Bank Statement",
        title: "ACCOUNT STATEMENT",
        fields: vec![
            "accountHolder",
            "accountNumber",
            "routingNumber",
            "statementPeriod",
            "openingBalance",
            "totalCredits",
            "totalDebits",
            "closingBalance",
            "transactions",
        ],
        required: vec![
            "bankName",
            "accountHolder",
            "accountNumber",
            "statementPeriod",
            "openingBalance",
            "closingBalance",
            "transactions",
        ],
        checks: vec![QualityCheck::BalanceConsistency],
    }
}

/// Lookup table of templates, built once at startup and shared by reference.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<DocumentType, Template>,
}

impl TemplateRegistry {
    pub fn standard() -> Self {
        let mut registry = Self::default();
        registry.register(paystub_template());
        registry.register(w2_template());
        registry.register(bank_statement_template());
        registry
    }

    pub fn register(&mut self, template: Template) {
        self.templates.insert(template.document_type, template);
    }

    pub fn get(&self, doc_type: DocumentType) -> Option<&Template> {
        self.templates.get(&doc_type)
    }

    /// Templates in declaration order of [`DocumentType::ALL`].
    pub fn list(&self) -> Vec<&Template> {
        DocumentType::ALL
            .iter()
            .filter_map(|t| self.templates.get(t))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_has_every_type() {
        let registry = TemplateRegistry::standard();
        for doc_type in DocumentType::ALL {
            assert!(registry.get(doc_type).is_some(), "missing {doc_type}");
        }
        assert_eq!(registry.list().len(), 3);
    }

    #[test]
    fn test_required_fields_are_subset_of_known_fields() {
        let registry = TemplateRegistry::standard();
        let paystub = registry.get(DocumentType::Paystub).unwrap();
        for field in &paystub.required {
            assert!(paystub.fields.contains(field), "{field} not displayed");
        }
    }

    #[test]
    fn test_empty_registry_returns_none() {
        assert!(TemplateRegistry::default().get(DocumentType::W2Form).is_none());
    }
}
