//! # Document Numbering
//!
//! Human-readable, per-year sequential numbers for business documents.
//!
//! ```text
//! S-2024-00001    sale
//! G-2024-00001    expense (gider)
//! TS-2024-00001   technical-service ticket
//! TH-2024-00001   supplier transaction (tedarikçi hareketi)
//! ```
//!
//! Counters live in the `document_sequences` table keyed by (kind, year) and
//! are bumped inside the transaction that creates the document, so numbers
//! are never reused even when the document is later cancelled.

use serde::{Deserialize, Serialize};

/// The kinds of numbered documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Sale,
    Expense,
    TechnicalService,
    SupplierTransaction,
}

impl DocumentKind {
    /// Prefix printed before the year.
    pub fn prefix(&self) -> &'static str {
        match self {
            DocumentKind::Sale => "S",
            DocumentKind::Expense => "G",
            DocumentKind::TechnicalService => "TS",
            DocumentKind::SupplierTransaction => "TH",
        }
    }

    /// Key used in the `document_sequences` table.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Sale => "sale",
            DocumentKind::Expense => "expense",
            DocumentKind::TechnicalService => "technical_service",
            DocumentKind::SupplierTransaction => "supplier_transaction",
        }
    }

    /// Formats a document number.
    ///
    /// ## Example
    /// ```rust
    /// use teknoroma_core::DocumentKind;
    ///
    /// assert_eq!(DocumentKind::Sale.format(2024, 1), "S-2024-00001");
    /// assert_eq!(DocumentKind::TechnicalService.format(2025, 42), "TS-2025-00042");
    /// ```
    pub fn format(&self, year: i32, sequence: i64) -> String {
        format!("{}-{:04}-{:05}", self.prefix(), year, sequence)
    }

    /// Parses a document number back into (kind, year, sequence).
    pub fn parse(number: &str) -> Option<(DocumentKind, i32, i64)> {
        let mut parts = number.splitn(3, '-');
        let prefix = parts.next()?;
        let year = parts.next()?;
        let seq = parts.next()?;

        let kind = [
            DocumentKind::Sale,
            DocumentKind::Expense,
            DocumentKind::TechnicalService,
            DocumentKind::SupplierTransaction,
        ]
        .into_iter()
        .find(|k| k.prefix() == prefix)?;

        if year.len() != 4 || seq.len() < 5 {
            return None;
        }
        if !year.bytes().all(|b| b.is_ascii_digit()) || !seq.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        Some((kind, year.parse().ok()?, seq.parse().ok()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pads_sequence() {
        assert_eq!(DocumentKind::Expense.format(2024, 7), "G-2024-00007");
        assert_eq!(DocumentKind::SupplierTransaction.format(2024, 123_456), "TH-2024-123456");
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            DocumentKind::parse("S-2024-00003"),
            Some((DocumentKind::Sale, 2024, 3))
        );
        assert_eq!(
            DocumentKind::parse("TS-2025-00010"),
            Some((DocumentKind::TechnicalService, 2025, 10))
        );
        assert_eq!(DocumentKind::parse("X-2024-00001"), None);
        assert_eq!(DocumentKind::parse("S-24-00001"), None);
        assert_eq!(DocumentKind::parse("S-2024-1"), None);
    }
}
