//! Entity kinds the generator can synthesize.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when parsing an unknown entity name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown entity kind: {0}")]
pub struct UnknownEntityKind(pub String);

/// The closed set of business entities known to the sandbox.
///
/// `Trade` and `Activity` are aliases of `Transaction`: they are generated
/// with the transaction layout but keep their own tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    #[serde(alias = "transactions")]
    Transaction,
    #[serde(alias = "positions")]
    Position,
    #[serde(alias = "invoices")]
    Invoice,
    #[serde(alias = "accounts")]
    Account,
    #[serde(alias = "contacts")]
    Contact,
    #[serde(alias = "documents")]
    Document,
    #[serde(alias = "prices")]
    Price,
    #[serde(alias = "tax_lots")]
    TaxLot,
    #[serde(alias = "trades")]
    Trade,
    #[serde(alias = "activities")]
    Activity,
}

impl EntityKind {
    /// Every kind, in declaration order.
    pub const ALL: [EntityKind; 10] = [
        EntityKind::Transaction,
        EntityKind::Position,
        EntityKind::Invoice,
        EntityKind::Account,
        EntityKind::Contact,
        EntityKind::Document,
        EntityKind::Price,
        EntityKind::TaxLot,
        EntityKind::Trade,
        EntityKind::Activity,
    ];

    /// Get the string representation of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Transaction => "transaction",
            EntityKind::Position => "position",
            EntityKind::Invoice => "invoice",
            EntityKind::Account => "account",
            EntityKind::Contact => "contact",
            EntityKind::Document => "document",
            EntityKind::Price => "price",
            EntityKind::TaxLot => "tax_lot",
            EntityKind::Trade => "trade",
            EntityKind::Activity => "activity",
        }
    }

    /// Whether records of this kind use the transaction layout.
    pub fn is_transaction_like(&self) -> bool {
        matches!(
            self,
            EntityKind::Transaction | EntityKind::Trade | EntityKind::Activity
        )
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = UnknownEntityKind;

    /// Accepts singular or plural names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        let kind = match normalized.as_str() {
            "transaction" | "transactions" => EntityKind::Transaction,
            "position" | "positions" => EntityKind::Position,
            "invoice" | "invoices" => EntityKind::Invoice,
            "account" | "accounts" => EntityKind::Account,
            "contact" | "contacts" => EntityKind::Contact,
            "document" | "documents" => EntityKind::Document,
            "price" | "prices" => EntityKind::Price,
            "tax_lot" | "tax_lots" | "taxlot" | "taxlots" => EntityKind::TaxLot,
            "trade" | "trades" => EntityKind::Trade,
            "activity" | "activities" => EntityKind::Activity,
            _ => return Err(UnknownEntityKind(s.to_string())),
        };
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_singular_and_plural() {
        assert_eq!("positions".parse::<EntityKind>(), Ok(EntityKind::Position));
        assert_eq!("Position".parse::<EntityKind>(), Ok(EntityKind::Position));
        assert_eq!("tax-lots".parse::<EntityKind>(), Ok(EntityKind::TaxLot));
        assert_eq!("activities".parse::<EntityKind>(), Ok(EntityKind::Activity));
    }

    #[test]
    fn test_parse_unknown() {
        let err = "widgets".parse::<EntityKind>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown entity kind: widgets");
    }

    #[test]
    fn test_display_roundtrips_through_from_str() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.to_string().parse::<EntityKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_transaction_aliases() {
        assert!(EntityKind::Trade.is_transaction_like());
        assert!(EntityKind::Activity.is_transaction_like());
        assert!(!EntityKind::Position.is_transaction_like());
    }

    #[test]
    fn test_serde_accepts_plural_alias() {
        let kind: EntityKind = serde_json::from_str("\"tax_lots\"").unwrap();
        assert_eq!(kind, EntityKind::TaxLot);
        assert_eq!(serde_json::to_string(&EntityKind::TaxLot).unwrap(), "\"tax_lot\"");
    }
}
