use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// Overall quality of one reconciliation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum MatchStatus {
    PerfectMatch,
    MinorVariance,
    MajorVariance,
    NoMatch,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::PerfectMatch => "perfect_match",
            MatchStatus::MinorVariance => "minor_variance",
            MatchStatus::MajorVariance => "major_variance",
            MatchStatus::NoMatch => "no_match",
        }
    }
}

/// Per-charge outcome in the comparison table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeStatus {
    /// Same description, same amount across documents.
    Match,
    /// Same description, different amount.
    Variance,
    /// On the PO/BOL but absent from the invoice.
    Missing,
    /// Billed on the invoice but never ordered.
    Extra,
}

/// One row of the line-item comparison table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeComparison {
    pub description: String,
    pub po_amount: Option<BigDecimal>,
    pub bol_amount: Option<BigDecimal>,
    pub invoice_amount: Option<BigDecimal>,
    pub status: ChargeStatus,
}

/// Structured comparison persisted with every result: document totals,
/// variance, and the itemized charge table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonPayload {
    pub po_total: BigDecimal,
    pub bol_total: Option<BigDecimal>,
    pub invoice_total: BigDecimal,
    pub variance: f64,
    pub variance_pct: f64,
    pub charge_comparison: Vec<ChargeComparison>,
}

/// Immutable record of one reconciliation attempt. Re-runs insert a new
/// row; the most recently created row per invoice is authoritative.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MatchingResult {
    pub id: String,

    pub po_id: String,
    pub bol_id: Option<String>,
    pub invoice_id: String,

    pub match_status: MatchStatus,
    pub confidence_score: f64,

    pub comparison: Json<ComparisonPayload>,

    pub flags_count: i32,
    pub high_severity_flags: i32,

    pub created_at: DateTime<Utc>,
}
