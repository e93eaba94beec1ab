use bigdecimal::BigDecimal;
use chrono::Utc;
use indexmap::IndexMap;
use serde_json::Value;
use sqlx::types::Json;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

use crate::error::OracleError;
use crate::models::{
    amounts_match, generate_id, normalize_description, ChargeComparison, ChargeStatus,
    ComparisonPayload, MatchStatus, MatchingResult,
};
use crate::oracle::{ComparisonOracle, MatchAnalysis};
use crate::service::linker::MatchingDocuments;

/// Delegates the comparative judgment to the oracle and normalizes the
/// verdict into the persisted domain model. The oracle decides matched /
/// not-matched; everything after that is deterministic.
pub struct MatchAnalyzer {
    oracle: Arc<dyn ComparisonOracle>,
}

impl MatchAnalyzer {
    pub fn new(oracle: Arc<dyn ComparisonOracle>) -> Self {
        Self { oracle }
    }

    /// Analysis is mandatory: oracle failures propagate to the caller.
    pub async fn analyze(&self, docs: &MatchingDocuments) -> Result<MatchAnalysis, OracleError> {
        let analysis = self.oracle.analyze_match(docs).await?;
        info!(
            invoice_number = %docs.invoice.invoice_number,
            matched = analysis.matched,
            confidence = analysis.confidence,
            discrepancies = analysis.discrepancies.len(),
            "oracle analysis complete"
        );
        Ok(analysis)
    }
}

/// Normalize the oracle verdict into the comparison payload. Pure: the
/// same documents and verdict always produce the same payload.
///
/// Oracle-reported discrepancies come first; a direct equality pass then
/// records every perfectly-matching line item the oracle did not mention,
/// so clean charges always show up in the table.
pub fn build_comparison(docs: &MatchingDocuments, analysis: &MatchAnalysis) -> ComparisonPayload {
    let mut table: IndexMap<String, ChargeComparison> = IndexMap::new();

    for disc in &analysis.discrepancies {
        let key = normalize_description(&disc.field);
        let row = ChargeComparison {
            description: disc.field.clone(),
            po_amount: disc.po_value.as_ref().and_then(value_as_amount),
            bol_amount: disc.bol_value.as_ref().and_then(value_as_amount),
            invoice_amount: disc.invoice_value.as_ref().and_then(value_as_amount),
            status: classify_issue(&disc.issue),
        };
        table.entry(key).or_insert(row);
    }

    for po_charge in &docs.po.expected_charges.0 {
        let key = normalize_description(&po_charge.description);
        if table.contains_key(&key) {
            continue;
        }
        let Some(inv_charge) = docs
            .invoice
            .charges
            .0
            .iter()
            .find(|c| normalize_description(&c.description) == key)
        else {
            continue;
        };
        if !amounts_match(&po_charge.amount, &inv_charge.amount) {
            continue;
        }
        let bol_amount = docs
            .bol
            .as_ref()
            .and_then(|b| b.actual_charges.as_ref())
            .and_then(|charges| {
                charges
                    .0
                    .iter()
                    .find(|c| normalize_description(&c.description) == key)
            })
            .map(|c| c.amount.clone());

        table.insert(
            key,
            ChargeComparison {
                description: po_charge.description.clone(),
                po_amount: Some(po_charge.amount.clone()),
                bol_amount,
                invoice_amount: Some(inv_charge.amount.clone()),
                status: ChargeStatus::Match,
            },
        );
    }

    ComparisonPayload {
        po_total: docs.po.total_amount.clone(),
        bol_total: docs.bol.as_ref().and_then(|b| b.actual_total()),
        invoice_total: docs.invoice.total_amount.clone(),
        variance: analysis.variance_amount,
        variance_pct: analysis.variance_percentage,
        charge_comparison: table.into_values().collect(),
    }
}

/// Overall status from the oracle's boolean plus its discrepancy count.
pub fn derive_match_status(analysis: &MatchAnalysis) -> MatchStatus {
    if analysis.matched {
        if analysis.discrepancies.is_empty() {
            MatchStatus::PerfectMatch
        } else {
            MatchStatus::MinorVariance
        }
    } else {
        MatchStatus::MajorVariance
    }
}

/// Assemble the immutable result row for one reconciliation attempt.
pub fn build_matching_result(docs: &MatchingDocuments, analysis: &MatchAnalysis) -> MatchingResult {
    MatchingResult {
        id: generate_id("m"),
        po_id: docs.po.id.clone(),
        bol_id: docs.bol.as_ref().map(|b| b.id.clone()),
        invoice_id: docs.invoice.id.clone(),
        match_status: derive_match_status(analysis),
        confidence_score: analysis.confidence,
        comparison: Json(build_comparison(docs, analysis)),
        flags_count: analysis.discrepancies.len() as i32,
        high_severity_flags: analysis
            .discrepancies
            .iter()
            .filter(|d| d.issue.to_lowercase().contains("significant"))
            .count() as i32,
        created_at: Utc::now(),
    }
}

fn classify_issue(issue: &str) -> ChargeStatus {
    let issue = issue.to_lowercase();
    if issue.contains("unexpected") || issue.contains("extra") {
        ChargeStatus::Extra
    } else if issue.contains("missing") || issue.contains("absent") {
        ChargeStatus::Missing
    } else {
        ChargeStatus::Variance
    }
}

/// Coerce a loosely-typed oracle value into a currency amount.
/// Accepts numbers and strings like "$1,250.00"; anything else is None.
fn value_as_amount(value: &Value) -> Option<BigDecimal> {
    match value {
        Value::Number(n) => BigDecimal::from_str(&n.to_string()).ok(),
        Value::String(s) => {
            let cleaned = s.trim().trim_start_matches('$').replace(',', "");
            BigDecimal::from_str(&cleaned).ok()
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_fixtures::{bol, dec, invoice, po};
    use crate::models::Charge;
    use crate::oracle::mock::{clean_analysis, flagged_analysis};
    use crate::oracle::Discrepancy;
    use serde_json::json;

    fn two_way_docs() -> MatchingDocuments {
        MatchingDocuments {
            po: po("PO-1001"),
            bol: None,
            invoice: invoice("INV-1", "PO-1001"),
        }
    }

    #[test]
    fn clean_verdict_records_every_charge_as_match() {
        let docs = two_way_docs();
        let payload = build_comparison(&docs, &clean_analysis(0.98));

        assert_eq!(payload.po_total, dec("500.00"));
        assert_eq!(payload.invoice_total, dec("500.00"));
        assert!(payload.bol_total.is_none());
        assert_eq!(payload.charge_comparison.len(), 2);
        assert!(payload
            .charge_comparison
            .iter()
            .all(|row| row.status == ChargeStatus::Match));
    }

    #[test]
    fn unexpected_charge_is_classified_extra() {
        let mut docs = two_way_docs();
        docs.invoice
            .charges
            .0
            .push(Charge::new("Detention", dec("150.00")));
        docs.invoice.total_amount = dec("650.00");

        let analysis = flagged_analysis("Detention", "unexpected charge", json!(150.0));
        let payload = build_comparison(&docs, &analysis);

        let detention = payload
            .charge_comparison
            .iter()
            .find(|row| row.description == "Detention")
            .unwrap();
        assert_eq!(detention.status, ChargeStatus::Extra);
        assert_eq!(detention.invoice_amount, Some(dec("150")));
        assert!(detention.po_amount.is_none());

        // the clean line items are still recorded
        assert!(payload
            .charge_comparison
            .iter()
            .any(|row| row.description == "Linehaul" && row.status == ChargeStatus::Match));
    }

    #[test]
    fn issue_text_drives_row_classification() {
        assert_eq!(classify_issue("Unexpected charge on invoice"), ChargeStatus::Extra);
        assert_eq!(classify_issue("extra accessorial fee"), ChargeStatus::Extra);
        assert_eq!(classify_issue("missing from invoice"), ChargeStatus::Missing);
        assert_eq!(classify_issue("amount differs by $20"), ChargeStatus::Variance);
    }

    #[test]
    fn oracle_rows_win_over_the_equality_pass() {
        let docs = two_way_docs();
        let analysis = flagged_analysis("Linehaul", "significant variance", json!("$475.00"));
        let payload = build_comparison(&docs, &analysis);

        let rows: Vec<_> = payload
            .charge_comparison
            .iter()
            .filter(|row| normalize_description(&row.description) == "linehaul")
            .collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, ChargeStatus::Variance);
        assert_eq!(rows[0].invoice_amount, Some(dec("475.00")));
    }

    #[test]
    fn bol_amounts_flow_into_match_rows() {
        let docs = MatchingDocuments {
            po: po("PO-1001"),
            bol: Some(bol("BOL-77", "PO-1001")),
            invoice: invoice("INV-1", "PO-1001"),
        };
        let payload = build_comparison(&docs, &clean_analysis(1.0));

        assert_eq!(payload.bol_total, Some(dec("500.00")));
        let linehaul = payload
            .charge_comparison
            .iter()
            .find(|row| row.description == "Linehaul")
            .unwrap();
        assert_eq!(linehaul.bol_amount, Some(dec("450.00")));
    }

    #[test]
    fn normalization_is_deterministic() {
        let docs = two_way_docs();
        let analysis = flagged_analysis("Detention", "unexpected charge", json!(150.0));
        assert_eq!(
            build_comparison(&docs, &analysis),
            build_comparison(&docs, &analysis)
        );
    }

    #[test]
    fn match_status_derivation_covers_all_verdicts() {
        assert_eq!(
            derive_match_status(&clean_analysis(1.0)),
            MatchStatus::PerfectMatch
        );

        let mut tolerated = clean_analysis(0.9);
        tolerated.discrepancies.push(Discrepancy {
            field: "Fuel Surcharge".into(),
            po_value: Some(json!(50.0)),
            bol_value: None,
            invoice_value: Some(json!(55.0)),
            issue: "minor fuel variance".into(),
        });
        assert_eq!(
            derive_match_status(&tolerated),
            MatchStatus::MinorVariance
        );

        let failed = flagged_analysis("Detention", "unexpected charge", json!(150.0));
        assert_eq!(derive_match_status(&failed), MatchStatus::MajorVariance);
    }

    #[test]
    fn result_row_counts_flags_and_severity() {
        let docs = two_way_docs();
        let mut analysis = flagged_analysis("Detention", "unexpected charge", json!(150.0));
        analysis.discrepancies.push(Discrepancy {
            field: "total_amount".into(),
            po_value: Some(json!(500.0)),
            bol_value: None,
            invoice_value: Some(json!(650.0)),
            issue: "significant total variance".into(),
        });

        let result = build_matching_result(&docs, &analysis);
        assert!(result.id.starts_with("m_"));
        assert_eq!(result.flags_count, 2);
        assert_eq!(result.high_severity_flags, 1);
        assert_eq!(result.match_status, MatchStatus::MajorVariance);
        assert!(result.bol_id.is_none());
    }

    #[test]
    fn loose_values_coerce_to_amounts() {
        assert_eq!(value_as_amount(&json!(150)), Some(dec("150")));
        assert_eq!(value_as_amount(&json!("$1,250.00")), Some(dec("1250.00")));
        assert_eq!(value_as_amount(&json!("Swift Logistics")), None);
        assert_eq!(value_as_amount(&json!(null)), None);
    }
}
