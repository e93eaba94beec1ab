use std::sync::Arc;

use crate::db::{DocumentStore, StoreResult};
use crate::models::{BillOfLading, Invoice, PurchaseOrder};

/// A resolved document triple. The BOL is optional: a PO with no BOL is
/// still reconcilable as a 2-way match.
#[derive(Debug, Clone)]
pub struct MatchingDocuments {
    pub po: PurchaseOrder,
    pub bol: Option<BillOfLading>,
    pub invoice: Invoice,
}

/// Resolves PO and BOL by exact equality on the invoice's declared PO
/// number. Read-only; never mutates anything.
pub struct ExactLinker {
    store: Arc<dyn DocumentStore>,
}

impl ExactLinker {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// `Ok(None)` means no PO exists for the declared number — a hard
    /// stop for exact resolution. A missing BOL is not an error.
    pub async fn resolve(&self, invoice: &Invoice) -> StoreResult<Option<MatchingDocuments>> {
        let Some(po) = self.store.get_po_by_number(&invoice.po_number).await? else {
            return Ok(None);
        };

        let bol = self.store.get_bol_by_po_number(&invoice.po_number).await?;

        Ok(Some(MatchingDocuments {
            po,
            bol,
            invoice: invoice.clone(),
        }))
    }
}
