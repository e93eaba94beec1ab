use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use super::Charge;

/// Invoice lifecycle.
/// pending → matched | flagged → approved | disputed | rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum InvoiceStatus {
    Pending,
    Matched,
    Flagged,
    Approved,
    Disputed,
    Rejected,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Matched => "matched",
            InvoiceStatus::Flagged => "flagged",
            InvoiceStatus::Approved => "approved",
            InvoiceStatus::Disputed => "disputed",
            InvoiceStatus::Rejected => "rejected",
        }
    }
}

/// How the invoice was associated with its PO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    Fuzzy,
    Manual,
}

/// The carrier's bill. Matching is invoice-driven: `po_number` is the
/// anchor that joins all three document types.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub invoice_number: String,
    pub carrier_name: String,
    pub invoice_date: NaiveDate,

    // references as stated on the invoice
    pub po_number: String,
    pub bol_number: Option<String>,
    pub po_id: Option<String>,
    pub bol_id: Option<String>,

    pub charges: Json<Vec<Charge>>,
    pub total_amount: BigDecimal,

    pub payment_terms: Option<String>,
    pub due_date: Option<NaiveDate>,

    pub invoice_file_id: Option<String>,

    // match metadata
    pub match_type: Option<MatchType>,
    pub match_confidence: f64,

    pub status: InvoiceStatus,

    // approval trail
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<String>,
    pub approval_notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
