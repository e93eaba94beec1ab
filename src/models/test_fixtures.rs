//! Canned documents shared by the unit tests.

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, Utc};
use sqlx::types::Json;
use std::str::FromStr;

use super::{
    generate_id, BillOfLading, BolStatus, Charge, Invoice, InvoiceStatus, PoStatus, PurchaseOrder,
};

pub fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

pub fn charge(description: &str, amount: &str) -> Charge {
    Charge::new(description, dec(amount))
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::from_str(s).unwrap()
}

/// $500 PO: Linehaul $450 + Fuel Surcharge $50, Chicago → Dallas.
pub fn po(po_number: &str) -> PurchaseOrder {
    let now = Utc::now();
    PurchaseOrder {
        id: generate_id("po"),
        po_number: po_number.to_string(),
        customer_name: "Acme Manufacturing".into(),
        carrier_name: "Swift Logistics".into(),
        origin: "Chicago, IL".into(),
        destination: "Dallas, TX".into(),
        pickup_date: date("2024-03-01"),
        delivery_date: date("2024-03-05"),
        expected_charges: Json(vec![
            charge("Linehaul", "450.00"),
            charge("Fuel Surcharge", "50.00"),
        ]),
        total_amount: dec("500.00"),
        status: PoStatus::Pending,
        source_file_id: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn bol(bol_number: &str, po_number: &str) -> BillOfLading {
    let now = Utc::now();
    BillOfLading {
        id: generate_id("bol"),
        bol_number: bol_number.to_string(),
        po_number: po_number.to_string(),
        po_id: None,
        carrier_name: "Swift Logistics".into(),
        origin: "Chicago, IL".into(),
        destination: "Dallas, TX".into(),
        pickup_date: date("2024-03-01"),
        delivery_date: date("2024-03-05"),
        weight_lbs: Some(12_500.0),
        item_description: Some("Palletized machine parts".into()),
        actual_charges: Some(Json(vec![
            charge("Linehaul", "450.00"),
            charge("Fuel Surcharge", "50.00"),
        ])),
        pod_file_id: None,
        pod_signed_at: None,
        status: BolStatus::Pending,
        created_at: now,
        updated_at: now,
    }
}

/// Invoice billing the same $500 the PO expects.
pub fn invoice(invoice_number: &str, po_number: &str) -> Invoice {
    let now = Utc::now();
    Invoice {
        id: generate_id("inv"),
        invoice_number: invoice_number.to_string(),
        carrier_name: "Swift Logistics".into(),
        invoice_date: date("2024-03-06"),
        po_number: po_number.to_string(),
        bol_number: None,
        po_id: None,
        bol_id: None,
        charges: Json(vec![
            charge("Linehaul", "450.00"),
            charge("Fuel Surcharge", "50.00"),
        ]),
        total_amount: dec("500.00"),
        payment_terms: Some("NET 30".into()),
        due_date: Some(date("2024-04-05")),
        invoice_file_id: None,
        match_type: None,
        match_confidence: 0.0,
        status: InvoiceStatus::Pending,
        approved_at: None,
        approved_by: None,
        approval_notes: None,
        created_at: now,
        updated_at: now,
    }
}
