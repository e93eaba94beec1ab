use std::sync::Arc;
use tracing::{info, warn};

use crate::db::DocumentStore;
use crate::models::{BolStatus, InvoiceStatus, PoStatus};
use crate::service::linker::MatchingDocuments;

/// Which documents failed to take the new status. The writes that did
/// land are never rolled back; the saved MatchingResult stays
/// authoritative and a failed write can be re-applied later — the
/// set-status writes are idempotent.
#[derive(Debug, Default)]
pub struct StatusUpdateReport {
    pub failed: Vec<String>,
}

impl StatusUpdateReport {
    pub fn all_applied(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Applies a match verdict to the lifecycle status of all documents in
/// the triple. Three independent single-row writes — the store offers no
/// cross-document transaction — each retried once on failure.
pub struct StatusCoordinator {
    store: Arc<dyn DocumentStore>,
}

impl StatusCoordinator {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// matched → everything `matched`; not matched → PO disputed, BOL
    /// demoted to invoiced, invoice flagged. No partial-update branch:
    /// all present documents move together per this rule.
    pub async fn apply_verdict(
        &self,
        docs: &MatchingDocuments,
        matched: bool,
    ) -> StatusUpdateReport {
        let (po_status, bol_status, invoice_status) = if matched {
            (PoStatus::Matched, BolStatus::Matched, InvoiceStatus::Matched)
        } else {
            (
                PoStatus::Disputed,
                BolStatus::Invoiced,
                InvoiceStatus::Flagged,
            )
        };

        let mut report = StatusUpdateReport::default();

        if !self.set_po_status(&docs.po.id, po_status).await {
            report.failed.push(docs.po.id.clone());
        }
        if let Some(bol) = &docs.bol {
            if !self.set_bol_status(&bol.id, bol_status).await {
                report.failed.push(bol.id.clone());
            }
        }
        if !self
            .set_invoice_status(&docs.invoice.id, invoice_status)
            .await
        {
            report.failed.push(docs.invoice.id.clone());
        }

        if report.all_applied() {
            info!(
                invoice_id = %docs.invoice.id,
                matched,
                "document statuses updated"
            );
        }
        report
    }

    async fn set_po_status(&self, id: &str, status: PoStatus) -> bool {
        match self.store.update_po_status(id, status).await {
            Ok(_) => true,
            Err(first) => {
                warn!(error = %first, id, "PO status write failed, retrying once");
                self.store.update_po_status(id, status).await.is_ok()
            }
        }
    }

    async fn set_bol_status(&self, id: &str, status: BolStatus) -> bool {
        match self.store.update_bol_status(id, status).await {
            Ok(_) => true,
            Err(first) => {
                warn!(error = %first, id, "BOL status write failed, retrying once");
                self.store.update_bol_status(id, status).await.is_ok()
            }
        }
    }

    async fn set_invoice_status(&self, id: &str, status: InvoiceStatus) -> bool {
        match self.store.update_invoice_status(id, status).await {
            Ok(_) => true,
            Err(first) => {
                warn!(error = %first, id, "invoice status write failed, retrying once");
                self.store
                    .update_invoice_status(id, status)
                    .await
                    .is_ok()
            }
        }
    }
}
