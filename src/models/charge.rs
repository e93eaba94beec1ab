use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// One line item on a PO, BOL or invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    pub description: String,
    pub amount: BigDecimal,
}

impl Charge {
    pub fn new(description: impl Into<String>, amount: BigDecimal) -> Self {
        Self {
            description: description.into(),
            amount,
        }
    }
}

/// Currency equality at two-decimal precision. Amounts that differ by less
/// than half a cent are the same dollar value after rounding.
pub fn amounts_match(a: &BigDecimal, b: &BigDecimal) -> bool {
    (a - b).abs() * BigDecimal::from(1000) < BigDecimal::from(5)
}

/// Key used to pair charges across documents: trimmed, case-folded description.
pub fn normalize_description(description: &str) -> String {
    description.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn amounts_match_tolerates_sub_cent_noise() {
        assert!(amounts_match(&dec("450.00"), &dec("450.004")));
        assert!(amounts_match(&dec("450"), &dec("450.00")));
        assert!(!amounts_match(&dec("450.00"), &dec("450.01")));
        assert!(!amounts_match(&dec("450.00"), &dec("451.00")));
    }

    #[test]
    fn descriptions_normalize_for_pairing() {
        assert_eq!(normalize_description("  Fuel Surcharge "), "fuel surcharge");
        assert_eq!(
            normalize_description("Linehaul"),
            normalize_description("LINEHAUL")
        );
    }
}
