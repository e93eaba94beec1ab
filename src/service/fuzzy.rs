use std::sync::Arc;
use tracing::{info, warn};

use crate::config::MatchingConfig;
use crate::db::{DocumentStore, StoreResult};
use crate::models::{BillOfLading, BolStatus, Invoice, MatchType, PoStatus, PurchaseOrder};
use crate::oracle::{ComparisonOracle, RankOutcome, NO_CANDIDATE};

/// A candidate accepted by the ranking oracle.
#[derive(Debug, Clone)]
pub struct FuzzyMatch<T> {
    pub document: T,
    pub confidence: f64,
    pub reasoning: String,
}

/// Similarity-based document association for when exact identifier lookup
/// fails. Best-effort by contract: every failure mode here degrades to
/// "no match" instead of aborting the caller.
pub struct FuzzyLinker {
    store: Arc<dyn DocumentStore>,
    oracle: Arc<dyn ComparisonOracle>,
    config: MatchingConfig,
}

impl FuzzyLinker {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        oracle: Arc<dyn ComparisonOracle>,
        config: MatchingConfig,
    ) -> Self {
        Self {
            store,
            oracle,
            config,
        }
    }

    /// Rank not-yet-matched POs against an invoice whose declared PO
    /// number resolved to nothing.
    pub async fn find_matching_po(&self, invoice: &Invoice) -> Option<FuzzyMatch<PurchaseOrder>> {
        let candidates = match self
            .store
            .list_pos_by_status(&[PoStatus::Pending, PoStatus::BolReceived])
            .await
        {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(error = %e, "PO candidate query failed, skipping fuzzy match");
                return None;
            }
        };

        if candidates.is_empty() {
            info!("no unmatched POs available for fuzzy matching");
            return None;
        }

        info!(
            invoice_number = %invoice.invoice_number,
            candidates = candidates.len(),
            "fuzzy matching invoice against unmatched POs"
        );

        let outcome = match self.oracle.rank_po_candidates(invoice, &candidates).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "fuzzy PO ranking failed, treating as no match");
                return None;
            }
        };

        accept(outcome, candidates, self.config.po_confidence_floor)
    }

    /// Rank pending BOLs against a PO + invoice pair. Corroborating
    /// evidence only, hence the looser configured floor.
    pub async fn find_matching_bol(
        &self,
        po: &PurchaseOrder,
        invoice: &Invoice,
    ) -> Option<FuzzyMatch<BillOfLading>> {
        let candidates = match self.store.list_bols_by_status(&[BolStatus::Pending]).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(error = %e, "BOL candidate query failed, skipping fuzzy match");
                return None;
            }
        };

        if candidates.is_empty() {
            info!("no unmatched BOLs available for fuzzy matching");
            return None;
        }

        info!(
            po_number = %po.po_number,
            candidates = candidates.len(),
            "fuzzy matching BOL candidates"
        );

        let outcome = match self
            .oracle
            .rank_bol_candidates(po, invoice, &candidates)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "fuzzy BOL ranking failed, treating as no match");
                return None;
            }
        };

        accept(outcome, candidates, self.config.bol_confidence_floor)
    }

    /// Commit a tentative PO association onto the invoice.
    pub async fn commit_po_link(
        &self,
        invoice: &Invoice,
        matched: &FuzzyMatch<PurchaseOrder>,
    ) -> StoreResult<Invoice> {
        info!(
            invoice_number = %invoice.invoice_number,
            po_number = %matched.document.po_number,
            confidence = matched.confidence,
            "committing fuzzy PO link"
        );
        self.store
            .update_invoice_link(
                &invoice.id,
                &matched.document.id,
                MatchType::Fuzzy,
                matched.confidence,
            )
            .await
    }
}

/// Threshold + sentinel policy. A low-confidence bind is never forced.
fn accept<T>(outcome: RankOutcome, mut candidates: Vec<T>, floor: f64) -> Option<FuzzyMatch<T>> {
    if outcome.best_candidate_index == NO_CANDIDATE {
        info!("oracle reported no reasonable candidate");
        return None;
    }

    let idx = match usize::try_from(outcome.best_candidate_index) {
        Ok(idx) if idx < candidates.len() => idx,
        _ => {
            warn!(
                index = outcome.best_candidate_index,
                candidates = candidates.len(),
                "oracle candidate index out of range"
            );
            return None;
        }
    };

    if outcome.confidence < floor {
        info!(
            confidence = outcome.confidence,
            floor, "fuzzy match confidence too low"
        );
        return None;
    }

    Some(FuzzyMatch {
        document: candidates.swap_remove(idx),
        confidence: outcome.confidence,
        reasoning: outcome.reasoning,
    })
}
