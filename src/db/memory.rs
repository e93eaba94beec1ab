//! Hash-map document store used by the unit tests in place of Postgres.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Mutex;

use crate::db::store::{DocumentStore, StoreResult};
use crate::error::StoreError;
use crate::models::{
    BillOfLading, BolStatus, Invoice, InvoiceStatus, MatchType, MatchingResult, PoStatus,
    PurchaseOrder, StoredFile,
};

/// In-memory store. Vectors keep insertion order, which doubles as
/// creation order for the latest-result query.
#[derive(Default)]
pub struct MemoryStore {
    pos: Mutex<Vec<PurchaseOrder>>,
    bols: Mutex<Vec<BillOfLading>>,
    invoices: Mutex<Vec<Invoice>>,
    results: Mutex<Vec<MatchingResult>>,
    files: Mutex<Vec<StoredFile>>,
    /// Ids whose writes are forced to fail, for partial-failure tests.
    poisoned: Mutex<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write touching `id` fail.
    pub fn poison_writes_for(&self, id: &str) {
        self.poisoned.lock().unwrap().insert(id.to_string());
    }

    fn check_poisoned(&self, id: &str) -> StoreResult<()> {
        if self.poisoned.lock().unwrap().contains(id) {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }
        Ok(())
    }

    fn not_found(entity: &'static str, key: &str) -> StoreError {
        StoreError::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_po(&self, po: PurchaseOrder) -> StoreResult<PurchaseOrder> {
        let mut pos = self.pos.lock().unwrap();
        if pos.iter().any(|p| p.po_number == po.po_number) {
            return Err(StoreError::Conflict {
                entity: "purchase order",
                field: "po_number",
                value: po.po_number.clone(),
            });
        }
        pos.push(po.clone());
        Ok(po)
    }

    async fn get_po(&self, id: &str) -> StoreResult<Option<PurchaseOrder>> {
        Ok(self.pos.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn get_po_by_number(&self, po_number: &str) -> StoreResult<Option<PurchaseOrder>> {
        Ok(self
            .pos
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.po_number == po_number)
            .cloned())
    }

    async fn list_pos_by_status(&self, statuses: &[PoStatus]) -> StoreResult<Vec<PurchaseOrder>> {
        Ok(self
            .pos
            .lock()
            .unwrap()
            .iter()
            .filter(|p| statuses.contains(&p.status))
            .cloned()
            .collect())
    }

    async fn update_po_status(&self, id: &str, status: PoStatus) -> StoreResult<PurchaseOrder> {
        self.check_poisoned(id)?;
        let mut pos = self.pos.lock().unwrap();
        let po = pos
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Self::not_found("purchase order", id))?;
        po.status = status;
        po.updated_at = Utc::now();
        Ok(po.clone())
    }

    async fn insert_bol(&self, bol: BillOfLading) -> StoreResult<BillOfLading> {
        let mut bols = self.bols.lock().unwrap();
        if bols.iter().any(|b| b.bol_number == bol.bol_number) {
            return Err(StoreError::Conflict {
                entity: "bill of lading",
                field: "bol_number",
                value: bol.bol_number.clone(),
            });
        }
        bols.push(bol.clone());
        Ok(bol)
    }

    async fn get_bol(&self, id: &str) -> StoreResult<Option<BillOfLading>> {
        Ok(self
            .bols
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.id == id)
            .cloned())
    }

    async fn get_bol_by_po_number(&self, po_number: &str) -> StoreResult<Option<BillOfLading>> {
        Ok(self
            .bols
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.po_number == po_number)
            .cloned())
    }

    async fn list_bols_by_status(&self, statuses: &[BolStatus]) -> StoreResult<Vec<BillOfLading>> {
        Ok(self
            .bols
            .lock()
            .unwrap()
            .iter()
            .filter(|b| statuses.contains(&b.status))
            .cloned()
            .collect())
    }

    async fn update_bol_status(&self, id: &str, status: BolStatus) -> StoreResult<BillOfLading> {
        self.check_poisoned(id)?;
        let mut bols = self.bols.lock().unwrap();
        let bol = bols
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| Self::not_found("bill of lading", id))?;
        bol.status = status;
        bol.updated_at = Utc::now();
        Ok(bol.clone())
    }

    async fn attach_pod(
        &self,
        id: &str,
        pod_file_id: &str,
        signed_at: DateTime<Utc>,
    ) -> StoreResult<BillOfLading> {
        self.check_poisoned(id)?;
        let mut bols = self.bols.lock().unwrap();
        let bol = bols
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| Self::not_found("bill of lading", id))?;
        bol.pod_file_id = Some(pod_file_id.to_string());
        bol.pod_signed_at = Some(signed_at);
        bol.status = BolStatus::Delivered;
        bol.updated_at = Utc::now();
        Ok(bol.clone())
    }

    async fn insert_invoice(&self, invoice: Invoice) -> StoreResult<Invoice> {
        let mut invoices = self.invoices.lock().unwrap();
        if invoices
            .iter()
            .any(|i| i.invoice_number == invoice.invoice_number)
        {
            return Err(StoreError::Conflict {
                entity: "invoice",
                field: "invoice_number",
                value: invoice.invoice_number.clone(),
            });
        }
        invoices.push(invoice.clone());
        Ok(invoice)
    }

    async fn get_invoice(&self, id: &str) -> StoreResult<Option<Invoice>> {
        Ok(self
            .invoices
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.id == id)
            .cloned())
    }

    async fn list_invoices_by_status(
        &self,
        statuses: &[InvoiceStatus],
    ) -> StoreResult<Vec<Invoice>> {
        Ok(self
            .invoices
            .lock()
            .unwrap()
            .iter()
            .filter(|i| statuses.contains(&i.status))
            .cloned()
            .collect())
    }

    async fn update_invoice_status(
        &self,
        id: &str,
        status: InvoiceStatus,
    ) -> StoreResult<Invoice> {
        self.check_poisoned(id)?;
        let mut invoices = self.invoices.lock().unwrap();
        let invoice = invoices
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| Self::not_found("invoice", id))?;
        invoice.status = status;
        invoice.updated_at = Utc::now();
        Ok(invoice.clone())
    }

    async fn update_invoice_link(
        &self,
        id: &str,
        po_id: &str,
        match_type: MatchType,
        confidence: f64,
    ) -> StoreResult<Invoice> {
        self.check_poisoned(id)?;
        let mut invoices = self.invoices.lock().unwrap();
        let invoice = invoices
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| Self::not_found("invoice", id))?;
        invoice.po_id = Some(po_id.to_string());
        invoice.match_type = Some(match_type);
        invoice.match_confidence = confidence;
        invoice.updated_at = Utc::now();
        Ok(invoice.clone())
    }

    async fn approve_invoice(
        &self,
        id: &str,
        approved_by: &str,
        notes: Option<&str>,
    ) -> StoreResult<Invoice> {
        self.check_poisoned(id)?;
        let mut invoices = self.invoices.lock().unwrap();
        let invoice = invoices
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| Self::not_found("invoice", id))?;
        invoice.status = InvoiceStatus::Approved;
        invoice.approved_at = Some(Utc::now());
        invoice.approved_by = Some(approved_by.to_string());
        invoice.approval_notes = notes.map(|n| n.to_string());
        invoice.updated_at = Utc::now();
        Ok(invoice.clone())
    }

    async fn insert_match_result(&self, result: MatchingResult) -> StoreResult<MatchingResult> {
        self.results.lock().unwrap().push(result.clone());
        Ok(result)
    }

    async fn latest_match_result_for_invoice(
        &self,
        invoice_id: &str,
    ) -> StoreResult<Option<MatchingResult>> {
        Ok(self
            .results
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.invoice_id == invoice_id)
            .last()
            .cloned())
    }

    async fn list_match_results(&self) -> StoreResult<Vec<MatchingResult>> {
        Ok(self.results.lock().unwrap().clone())
    }

    async fn insert_file(&self, file: StoredFile) -> StoreResult<StoredFile> {
        self.files.lock().unwrap().push(file.clone());
        Ok(file)
    }

    async fn get_file(&self, id: &str) -> StoreResult<Option<StoredFile>> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.id == id)
            .cloned())
    }
}
