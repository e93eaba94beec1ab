//! Scripted oracle for the unit tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::OracleError;
use crate::models::{BillOfLading, Invoice, PurchaseOrder};
use crate::oracle::{ComparisonOracle, Discrepancy, MatchAnalysis, RankOutcome};
use crate::service::linker::MatchingDocuments;

#[derive(Clone)]
enum Scripted<T> {
    Respond(T),
    Fail,
}

/// Returns pre-programmed verdicts and counts calls.
#[derive(Default)]
pub struct MockOracle {
    rank_po: Mutex<Option<Scripted<RankOutcome>>>,
    rank_bol: Mutex<Option<Scripted<RankOutcome>>>,
    analysis: Mutex<Option<Scripted<MatchAnalysis>>>,
    pub rank_po_calls: AtomicUsize,
    pub rank_bol_calls: AtomicUsize,
    pub analysis_calls: AtomicUsize,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_po_ranking(self, index: i64, confidence: f64) -> Self {
        *self.rank_po.lock().unwrap() = Some(Scripted::Respond(ranking(index, confidence)));
        self
    }

    pub fn with_po_ranking_failure(self) -> Self {
        *self.rank_po.lock().unwrap() = Some(Scripted::Fail);
        self
    }

    pub fn with_bol_ranking(self, index: i64, confidence: f64) -> Self {
        *self.rank_bol.lock().unwrap() = Some(Scripted::Respond(ranking(index, confidence)));
        self
    }

    pub fn with_bol_ranking_failure(self) -> Self {
        *self.rank_bol.lock().unwrap() = Some(Scripted::Fail);
        self
    }

    pub fn with_analysis(self, analysis: MatchAnalysis) -> Self {
        *self.analysis.lock().unwrap() = Some(Scripted::Respond(analysis));
        self
    }

    pub fn with_analysis_failure(self) -> Self {
        *self.analysis.lock().unwrap() = Some(Scripted::Fail);
        self
    }

    fn respond<T: Clone>(slot: &Mutex<Option<Scripted<T>>>) -> Result<T, OracleError> {
        match slot.lock().unwrap().clone() {
            Some(Scripted::Respond(value)) => Ok(value),
            Some(Scripted::Fail) => Err(OracleError::Malformed("scripted failure".into())),
            None => Err(OracleError::Malformed("no scripted response".into())),
        }
    }
}

pub fn ranking(index: i64, confidence: f64) -> RankOutcome {
    RankOutcome {
        best_candidate_index: index,
        confidence,
        reasoning: "scripted".into(),
    }
}

/// Verdict with no discrepancies.
pub fn clean_analysis(confidence: f64) -> MatchAnalysis {
    MatchAnalysis {
        matched: true,
        confidence,
        variance_amount: 0.0,
        variance_percentage: 0.0,
        reasoning: "all documents agree".into(),
        discrepancies: Vec::new(),
    }
}

/// Failed verdict with a single discrepancy entry.
pub fn flagged_analysis(field: &str, issue: &str, invoice_value: serde_json::Value) -> MatchAnalysis {
    MatchAnalysis {
        matched: false,
        confidence: 0.9,
        variance_amount: 150.0,
        variance_percentage: 30.0,
        reasoning: "invoice bills work that was never ordered".into(),
        discrepancies: vec![Discrepancy {
            field: field.to_string(),
            po_value: None,
            bol_value: None,
            invoice_value: Some(invoice_value),
            issue: issue.to_string(),
        }],
    }
}

#[async_trait]
impl ComparisonOracle for MockOracle {
    async fn rank_po_candidates(
        &self,
        _invoice: &Invoice,
        _candidates: &[PurchaseOrder],
    ) -> Result<RankOutcome, OracleError> {
        self.rank_po_calls.fetch_add(1, Ordering::SeqCst);
        Self::respond(&self.rank_po)
    }

    async fn rank_bol_candidates(
        &self,
        _po: &PurchaseOrder,
        _invoice: &Invoice,
        _candidates: &[BillOfLading],
    ) -> Result<RankOutcome, OracleError> {
        self.rank_bol_calls.fetch_add(1, Ordering::SeqCst);
        Self::respond(&self.rank_bol)
    }

    async fn analyze_match(
        &self,
        _docs: &MatchingDocuments,
    ) -> Result<MatchAnalysis, OracleError> {
        self.analysis_calls.fetch_add(1, Ordering::SeqCst);
        Self::respond(&self.analysis)
    }
}
