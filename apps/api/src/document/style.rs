//! Per-type presentation attached to every assembled document.

use serde::Serialize;

use crate::models::document::DocumentType;

/// Margins in points on each side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Margins {
    pub top: u16,
    pub right: u16,
    pub bottom: u16,
    pub left: u16,
}

/// Page geometry.
///
/// Every document type prints on US letter, portrait, with 1" (72pt) margins.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLayout {
    pub page_size: &'static str,
    pub orientation: &'static str,
    pub margins: Margins,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            page_size: "letter",
            orientation: "portrait",
            margins: Margins {
                top: 72,
                right: 72,
                bottom: 72,
                left: 72,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStyle {
    pub font_family: &'static str,
    pub font_size: &'static str,
    pub line_height: &'static str,
    pub color: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_background: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<&'static str>,
}

impl DocumentStyle {
    /// Base styles, plus header and border colours for paystubs and bank statements.
    pub fn for_type(doc_type: DocumentType) -> Self {
        let base = Self {
            font_family: "Arial, sans-serif",
            font_size: "12px",
            line_height: "1.4",
            color: "#000000",
            header_background: None,
            border_color: None,
        };
        match doc_type {
            DocumentType::Paystub => Self {
                header_background: Some("#f0f0f0"),
                border_color: Some("#cccccc"),
                ..base
            },
            DocumentType::BankStatement => Self {
                header_background: Some("#e6f3ff"),
                border_color: Some("#0066cc"),
                ..base
            },
            DocumentType::W2Form => base,
        }
    }
}

/// CSS for the HTML renderer: `@page` geometry, then body and section rules.
pub fn stylesheet(style: &DocumentStyle, layout: &PageLayout) -> String {
    let m = &layout.margins;
    let mut css = format!(
        "@page {{ size: {} {}; margin: {}pt {}pt {}pt {}pt; }}\n",
        layout.page_size, layout.orientation, m.top, m.right, m.bottom, m.left
    );
    css.push_str(&format!(
        "body {{ font-family: {}; font-size: {}; line-height: {}; color: {}; }}\n",
        style.font_family, style.font_size, style.line_height, style.color
    ));
    if let Some(bg) = style.header_background {
        css.push_str(&format!(".document-header {{ background: {bg}; }}\n"));
    }
    if let Some(border) = style.border_color {
        css.push_str(&format!(
            ".document-header, .document-footer, table, th, td {{ border: 1px solid {border}; }}\n"
        ));
    }
    css
}
