use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::models::{
    BillOfLading, BolStatus, Invoice, InvoiceStatus, MatchType, MatchingResult, PoStatus,
    PurchaseOrder, StoredFile,
};

pub type StoreResult<T> = Result<T, StoreError>;

/// Typed persistence contract for the four entity kinds plus uploaded-file
/// metadata. All operations are exact-value lookups and single-row writes;
/// similarity search is application-level work, not the store's.
///
/// Every update stamps `updated_at`. Inserting a duplicate business
/// identifier fails with [`StoreError::Conflict`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    // purchase orders
    async fn insert_po(&self, po: PurchaseOrder) -> StoreResult<PurchaseOrder>;
    async fn get_po(&self, id: &str) -> StoreResult<Option<PurchaseOrder>>;
    async fn get_po_by_number(&self, po_number: &str) -> StoreResult<Option<PurchaseOrder>>;
    async fn list_pos_by_status(&self, statuses: &[PoStatus]) -> StoreResult<Vec<PurchaseOrder>>;
    async fn update_po_status(&self, id: &str, status: PoStatus) -> StoreResult<PurchaseOrder>;

    // bills of lading
    async fn insert_bol(&self, bol: BillOfLading) -> StoreResult<BillOfLading>;
    async fn get_bol(&self, id: &str) -> StoreResult<Option<BillOfLading>>;
    async fn get_bol_by_po_number(&self, po_number: &str) -> StoreResult<Option<BillOfLading>>;
    async fn list_bols_by_status(&self, statuses: &[BolStatus]) -> StoreResult<Vec<BillOfLading>>;
    async fn update_bol_status(&self, id: &str, status: BolStatus) -> StoreResult<BillOfLading>;
    async fn attach_pod(
        &self,
        id: &str,
        pod_file_id: &str,
        signed_at: DateTime<Utc>,
    ) -> StoreResult<BillOfLading>;

    // invoices
    async fn insert_invoice(&self, invoice: Invoice) -> StoreResult<Invoice>;
    async fn get_invoice(&self, id: &str) -> StoreResult<Option<Invoice>>;
    async fn list_invoices_by_status(
        &self,
        statuses: &[InvoiceStatus],
    ) -> StoreResult<Vec<Invoice>>;
    async fn update_invoice_status(&self, id: &str, status: InvoiceStatus)
        -> StoreResult<Invoice>;
    /// Commit a document association onto the invoice (fuzzy/manual linkage).
    async fn update_invoice_link(
        &self,
        id: &str,
        po_id: &str,
        match_type: MatchType,
        confidence: f64,
    ) -> StoreResult<Invoice>;
    async fn approve_invoice(
        &self,
        id: &str,
        approved_by: &str,
        notes: Option<&str>,
    ) -> StoreResult<Invoice>;

    // matching results (immutable; inserts only)
    async fn insert_match_result(&self, result: MatchingResult) -> StoreResult<MatchingResult>;
    async fn latest_match_result_for_invoice(
        &self,
        invoice_id: &str,
    ) -> StoreResult<Option<MatchingResult>>;
    async fn list_match_results(&self) -> StoreResult<Vec<MatchingResult>>;

    // files
    async fn insert_file(&self, file: StoredFile) -> StoreResult<StoredFile>;
    async fn get_file(&self, id: &str) -> StoreResult<Option<StoredFile>>;
}
