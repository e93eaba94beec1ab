use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use super::{BillOfLading, Charge, Invoice, PurchaseOrder};

/// Shared "comparable fields" projection over the three document kinds.
/// The oracle prompts render this instead of touching the concrete entity
/// shapes, so the field layout is written once.
#[derive(Debug, Clone)]
pub struct ComparableDoc {
    pub id_label: &'static str,
    pub identifier: String,
    pub carrier: String,
    pub route: Option<(String, String)>,
    pub dates: Vec<(&'static str, NaiveDate)>,
    pub references: Vec<(&'static str, String)>,
    pub charges_label: &'static str,
    pub charges: Vec<Charge>,
    pub total: Option<BigDecimal>,
}

impl ComparableDoc {
    /// Render as an indented field block for a natural-language prompt.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("- {}: {}\n", self.id_label, self.identifier));
        for (label, value) in &self.references {
            out.push_str(&format!("- {}: {}\n", label, value));
        }
        out.push_str(&format!("- Carrier: {}\n", self.carrier));
        if let Some((origin, destination)) = &self.route {
            out.push_str(&format!("- Origin: {} → Destination: {}\n", origin, destination));
        }
        for (label, date) in &self.dates {
            out.push_str(&format!("- {}: {}\n", label, date));
        }
        if let Some(total) = &self.total {
            out.push_str(&format!("- Total Amount: ${}\n", total));
        }
        if !self.charges.is_empty() {
            out.push_str(&format!("- {}:\n", self.charges_label));
            for charge in &self.charges {
                out.push_str(&format!("  - {}: ${}\n", charge.description, charge.amount));
            }
        }
        out
    }
}

impl PurchaseOrder {
    pub fn comparable(&self) -> ComparableDoc {
        ComparableDoc {
            id_label: "PO Number",
            identifier: self.po_number.clone(),
            carrier: self.carrier_name.clone(),
            route: Some((self.origin.clone(), self.destination.clone())),
            dates: vec![
                ("Pickup Date", self.pickup_date),
                ("Delivery Date", self.delivery_date),
            ],
            references: vec![("Customer", self.customer_name.clone())],
            charges_label: "Expected Charges",
            charges: self.expected_charges.0.clone(),
            total: Some(self.total_amount.clone()),
        }
    }
}

impl BillOfLading {
    pub fn comparable(&self) -> ComparableDoc {
        ComparableDoc {
            id_label: "BOL Number",
            identifier: self.bol_number.clone(),
            carrier: self.carrier_name.clone(),
            route: Some((self.origin.clone(), self.destination.clone())),
            dates: vec![
                ("Pickup Date", self.pickup_date),
                ("Delivery Date", self.delivery_date),
            ],
            references: vec![("PO Number Referenced", self.po_number.clone())],
            charges_label: "Actual Charges",
            charges: self
                .actual_charges
                .as_ref()
                .map(|c| c.0.clone())
                .unwrap_or_default(),
            total: self.actual_total(),
        }
    }
}

impl Invoice {
    pub fn comparable(&self) -> ComparableDoc {
        let mut references = vec![("PO Number Referenced", self.po_number.clone())];
        if let Some(bol_number) = &self.bol_number {
            references.push(("BOL Number Referenced", bol_number.clone()));
        }
        ComparableDoc {
            id_label: "Invoice Number",
            identifier: self.invoice_number.clone(),
            carrier: self.carrier_name.clone(),
            route: None,
            dates: vec![("Invoice Date", self.invoice_date)],
            references,
            charges_label: "Charges",
            charges: self.charges.0.clone(),
            total: Some(self.total_amount.clone()),
        }
    }
}
