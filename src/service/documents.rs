use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::db::{DocumentStore, StoreResult};
use crate::models::{
    generate_id, BillOfLading, BolStatus, Charge, FileKind, Invoice, InvoiceStatus, PoStatus,
    PurchaseOrder, StoredFile,
};

/// Intake payloads. OCR-extracted and manually-entered documents arrive
/// through the same shapes; the service does not distinguish them.
#[derive(Debug, Deserialize)]
pub struct NewPurchaseOrder {
    pub po_number: String,
    pub customer_name: String,
    pub carrier_name: String,
    pub origin: String,
    pub destination: String,
    pub pickup_date: NaiveDate,
    pub delivery_date: NaiveDate,
    pub expected_charges: Vec<Charge>,
    pub total_amount: bigdecimal::BigDecimal,
    pub source_file_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewBillOfLading {
    pub bol_number: String,
    pub po_number: String,
    pub carrier_name: String,
    pub origin: String,
    pub destination: String,
    pub pickup_date: NaiveDate,
    pub delivery_date: NaiveDate,
    pub weight_lbs: Option<f64>,
    pub item_description: Option<String>,
    pub actual_charges: Option<Vec<Charge>>,
}

#[derive(Debug, Deserialize)]
pub struct NewInvoice {
    pub invoice_number: String,
    pub carrier_name: String,
    pub invoice_date: NaiveDate,
    /// Required: the anchor for all linkage.
    pub po_number: String,
    pub bol_number: Option<String>,
    pub charges: Vec<Charge>,
    pub total_amount: bigdecimal::BigDecimal,
    pub payment_terms: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub invoice_file_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewStoredFile {
    pub filename: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub storage_path: String,
    pub file_kind: Option<FileKind>,
}

/// Document intake and lifecycle operations outside the matching run.
pub struct DocumentService {
    store: Arc<dyn DocumentStore>,
}

impl DocumentService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn create_po(&self, new: NewPurchaseOrder) -> StoreResult<PurchaseOrder> {
        let now = Utc::now();
        let po = PurchaseOrder {
            id: generate_id("po"),
            po_number: new.po_number,
            customer_name: new.customer_name,
            carrier_name: new.carrier_name,
            origin: new.origin,
            destination: new.destination,
            pickup_date: new.pickup_date,
            delivery_date: new.delivery_date,
            expected_charges: sqlx::types::Json(new.expected_charges),
            total_amount: new.total_amount,
            status: PoStatus::Pending,
            source_file_id: new.source_file_id,
            created_at: now,
            updated_at: now,
        };
        let po = self.store.insert_po(po).await?;
        info!(po_number = %po.po_number, "purchase order created");
        Ok(po)
    }

    /// Creating a BOL for a known pending PO advances that PO to
    /// `bol_received`. The nudge is best-effort; the BOL itself is the
    /// authoritative record.
    pub async fn create_bol(&self, new: NewBillOfLading) -> StoreResult<BillOfLading> {
        let referenced_po = self.store.get_po_by_number(&new.po_number).await?;

        let now = Utc::now();
        let bol = BillOfLading {
            id: generate_id("bol"),
            bol_number: new.bol_number,
            po_number: new.po_number,
            po_id: referenced_po.as_ref().map(|po| po.id.clone()),
            carrier_name: new.carrier_name,
            origin: new.origin,
            destination: new.destination,
            pickup_date: new.pickup_date,
            delivery_date: new.delivery_date,
            weight_lbs: new.weight_lbs,
            item_description: new.item_description,
            actual_charges: new.actual_charges.map(sqlx::types::Json),
            pod_file_id: None,
            pod_signed_at: None,
            status: BolStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        let bol = self.store.insert_bol(bol).await?;
        info!(bol_number = %bol.bol_number, po_number = %bol.po_number, "bill of lading created");

        if let Some(po) = referenced_po {
            if po.status == PoStatus::Pending {
                if let Err(e) = self
                    .store
                    .update_po_status(&po.id, PoStatus::BolReceived)
                    .await
                {
                    warn!(error = %e, po_id = %po.id, "failed to advance PO to bol_received");
                }
            }
        }

        Ok(bol)
    }

    pub async fn create_invoice(&self, new: NewInvoice) -> StoreResult<Invoice> {
        let now = Utc::now();
        let invoice = Invoice {
            id: generate_id("inv"),
            invoice_number: new.invoice_number,
            carrier_name: new.carrier_name,
            invoice_date: new.invoice_date,
            po_number: new.po_number,
            bol_number: new.bol_number,
            po_id: None,
            bol_id: None,
            charges: sqlx::types::Json(new.charges),
            total_amount: new.total_amount,
            payment_terms: new.payment_terms,
            due_date: new.due_date,
            invoice_file_id: new.invoice_file_id,
            match_type: None,
            match_confidence: 0.0,
            status: InvoiceStatus::Pending,
            approved_at: None,
            approved_by: None,
            approval_notes: None,
            created_at: now,
            updated_at: now,
        };
        let invoice = self.store.insert_invoice(invoice).await?;
        info!(invoice_number = %invoice.invoice_number, po_number = %invoice.po_number, "invoice created");
        Ok(invoice)
    }

    /// Attach a proof-of-delivery scan and move the BOL to `delivered`.
    /// The file must already be registered.
    pub async fn attach_pod(
        &self,
        bol_id: &str,
        pod_file_id: &str,
        signed_at: Option<DateTime<Utc>>,
    ) -> StoreResult<BillOfLading> {
        if self.store.get_file(pod_file_id).await?.is_none() {
            return Err(crate::error::StoreError::NotFound {
                entity: "file",
                key: pod_file_id.to_string(),
            });
        }
        self.store
            .attach_pod(bol_id, pod_file_id, signed_at.unwrap_or_else(Utc::now))
            .await
    }

    pub async fn approve_invoice(
        &self,
        invoice_id: &str,
        approved_by: &str,
        notes: Option<&str>,
    ) -> StoreResult<Invoice> {
        let invoice = self.store.approve_invoice(invoice_id, approved_by, notes).await?;
        info!(invoice_number = %invoice.invoice_number, approved_by, "invoice approved");
        Ok(invoice)
    }

    pub async fn register_file(&self, new: NewStoredFile) -> StoreResult<StoredFile> {
        let file = StoredFile {
            id: generate_id("f"),
            filename: new.filename,
            mime_type: new.mime_type,
            size_bytes: new.size_bytes,
            storage_path: new.storage_path,
            file_kind: new.file_kind,
            created_at: Utc::now(),
        };
        self.store.insert_file(file).await
    }

    pub async fn list_pos_by_status(&self, statuses: &[PoStatus]) -> StoreResult<Vec<PurchaseOrder>> {
        self.store.list_pos_by_status(statuses).await
    }

    pub async fn list_invoices_by_status(
        &self,
        statuses: &[InvoiceStatus],
    ) -> StoreResult<Vec<Invoice>> {
        self.store.list_invoices_by_status(statuses).await
    }
}
