pub mod bol;
pub mod charge;
pub mod comparable;
pub mod file;
pub mod invoice;
pub mod matching_result;
pub mod po;
#[cfg(test)]
pub mod test_fixtures;

pub use bol::{BillOfLading, BolStatus};
pub use charge::{amounts_match, normalize_description, Charge};
pub use comparable::ComparableDoc;
pub use file::{FileKind, StoredFile};
pub use invoice::{Invoice, InvoiceStatus, MatchType};
pub use matching_result::{
    ChargeComparison, ChargeStatus, ComparisonPayload, MatchStatus, MatchingResult,
};
pub use po::{PoStatus, PurchaseOrder};

use uuid::Uuid;

/// Opaque entity id: short prefix + simple uuid (`po_4f1c...`).
pub fn generate_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_carry_prefix_and_are_unique() {
        let a = generate_id("po");
        let b = generate_id("po");
        assert!(a.starts_with("po_"));
        assert_ne!(a, b);
    }
}
