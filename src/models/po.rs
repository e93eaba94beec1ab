use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use super::Charge;

/// Purchase order lifecycle.
/// pending → bol_received → invoiced → matched | disputed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum PoStatus {
    Pending,
    BolReceived,
    Invoiced,
    Matched,
    Disputed,
}

impl PoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoStatus::Pending => "pending",
            PoStatus::BolReceived => "bol_received",
            PoStatus::Invoiced => "invoiced",
            PoStatus::Matched => "matched",
            PoStatus::Disputed => "disputed",
        }
    }
}

/// The buyer's expected-charges document, created before shipment.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: String,
    pub po_number: String,
    pub customer_name: String,
    pub carrier_name: String,

    // route
    pub origin: String,
    pub destination: String,
    pub pickup_date: NaiveDate,
    pub delivery_date: NaiveDate,

    pub expected_charges: Json<Vec<Charge>>,
    pub total_amount: BigDecimal,

    pub status: PoStatus,
    pub source_file_id: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
