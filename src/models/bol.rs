use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use super::Charge;

/// Bill of lading lifecycle.
/// pending → delivered → invoiced → matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum BolStatus {
    Pending,
    Delivered,
    Invoiced,
    Matched,
}

impl BolStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BolStatus::Pending => "pending",
            BolStatus::Delivered => "delivered",
            BolStatus::Invoiced => "invoiced",
            BolStatus::Matched => "matched",
        }
    }
}

/// The carrier's shipment record. `po_number` is a soft reference — the
/// string the carrier wrote down, not an enforced foreign key.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BillOfLading {
    pub id: String,
    pub bol_number: String,

    // link to PO
    pub po_number: String,
    pub po_id: Option<String>,

    // shipment details
    pub carrier_name: String,
    pub origin: String,
    pub destination: String,
    pub pickup_date: NaiveDate,
    pub delivery_date: NaiveDate,

    pub weight_lbs: Option<f64>,
    pub item_description: Option<String>,

    /// Actual charges, when the BOL lists them.
    pub actual_charges: Option<Json<Vec<Charge>>>,

    // proof of delivery
    pub pod_file_id: Option<String>,
    pub pod_signed_at: Option<DateTime<Utc>>,

    pub status: BolStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BillOfLading {
    /// Sum of actual charges, when present.
    pub fn actual_total(&self) -> Option<bigdecimal::BigDecimal> {
        use bigdecimal::BigDecimal;
        self.actual_charges.as_ref().map(|charges| {
            charges
                .0
                .iter()
                .fold(BigDecimal::from(0), |acc, c| acc + &c.amount)
        })
    }
}
