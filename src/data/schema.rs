//! Column Schema Module
//! Canonical column names of the transaction source and column-level presence flags.

use serde::Serialize;

pub const AMOUNT: &str = "Montant";
pub const STORE: &str = "Magasin";
pub const CATEGORY: &str = "Categorie_Produit";
pub const QUANTITY: &str = "Quantite";
pub const PAYMENT_METHOD: &str = "Mode_Paiement";
pub const SATISFACTION: &str = "Satisfaction_Client";
pub const TRANSACTION_DATE: &str = "Date_Transaction";

/// Columns whose absence from the header makes the source unusable.
pub const REQUIRED_COLUMNS: [&str; 3] = [AMOUNT, STORE, CATEGORY];

/// Columns that may be structurally absent from the whole dataset.
pub const OPTIONAL_COLUMNS: [&str; 4] = [QUANTITY, PAYMENT_METHOD, SATISFACTION, TRANSACTION_DATE];

/// Which optional columns exist in the source header.
///
/// This is distinct from a value being null in one row: an absent column
/// disables the views that depend on it for the whole table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Schema {
    pub has_quantity: bool,
    pub has_payment_method: bool,
    pub has_satisfaction: bool,
    pub has_transaction_date: bool,
}

impl Schema {
    /// Build presence flags from (already trimmed) header names.
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Self {
        let has = |name: &str| headers.iter().any(|h| h.as_ref() == name);
        Self {
            has_quantity: has(QUANTITY),
            has_payment_method: has(PAYMENT_METHOD),
            has_satisfaction: has(SATISFACTION),
            has_transaction_date: has(TRANSACTION_DATE),
        }
    }

    /// Every optional column present.
    pub fn full() -> Self {
        Self {
            has_quantity: true,
            has_payment_method: true,
            has_satisfaction: true,
            has_transaction_date: true,
        }
    }

    /// Optional columns missing from the source.
    pub fn missing_optional(&self) -> Vec<&'static str> {
        let flags = [
            self.has_quantity,
            self.has_payment_method,
            self.has_satisfaction,
            self.has_transaction_date,
        ];
        OPTIONAL_COLUMNS
            .iter()
            .zip(flags)
            .filter(|(_, present)| !present)
            .map(|(name, _)| *name)
            .collect()
    }

    /// Canonical names of the columns present, in source order of the canonical layout.
    pub fn column_names(&self) -> Vec<&'static str> {
        let mut names = REQUIRED_COLUMNS.to_vec();
        let flags = [
            self.has_quantity,
            self.has_payment_method,
            self.has_satisfaction,
            self.has_transaction_date,
        ];
        names.extend(
            OPTIONAL_COLUMNS
                .iter()
                .zip(flags)
                .filter(|(_, present)| *present)
                .map(|(name, _)| *name),
        );
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_headers_exact_match_only() {
        let schema = Schema::from_headers(&["Montant", "Magasin", "mode_paiement", "Quantite"]);
        assert!(schema.has_quantity);
        assert!(!schema.has_payment_method);
        assert!(!schema.has_satisfaction);
        assert!(!schema.has_transaction_date);
    }

    #[test]
    fn test_missing_optional() {
        let schema = Schema {
            has_quantity: true,
            has_payment_method: false,
            has_satisfaction: true,
            has_transaction_date: false,
        };
        assert_eq!(
            schema.missing_optional(),
            vec![PAYMENT_METHOD, TRANSACTION_DATE]
        );
        assert!(Schema::full().missing_optional().is_empty());
    }

    #[test]
    fn test_column_names_required_first() {
        let schema = Schema {
            has_satisfaction: true,
            ..Schema::default()
        };
        assert_eq!(
            schema.column_names(),
            vec![AMOUNT, STORE, CATEGORY, SATISFACTION]
        );
    }
}
