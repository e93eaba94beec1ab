use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::config::MatchingConfig;
use crate::db::{DocumentStore, StoreResult};
use crate::error::{MatchRunError, StoreError};
use crate::models::{Invoice, MatchingResult};
use crate::oracle::{ComparisonOracle, MatchAnalysis};
use crate::service::analyzer::{build_matching_result, MatchAnalyzer};
use crate::service::fuzzy::FuzzyLinker;
use crate::service::linker::{ExactLinker, MatchingDocuments};
use crate::service::status::StatusCoordinator;

/// Stages of one matching run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunStage {
    FetchDocuments,
    Analyze,
    SaveResult,
    UpdateStatuses,
}

impl RunStage {
    fn as_str(&self) -> &'static str {
        match self {
            RunStage::FetchDocuments => "fetch_documents",
            RunStage::Analyze => "analyze",
            RunStage::SaveResult => "save_result",
            RunStage::UpdateStatuses => "update_statuses",
        }
    }
}

/// Structured outcome of one run. Stage errors never escape the
/// orchestrator; they land here instead.
#[derive(Debug, Serialize)]
pub struct MatchRunOutcome {
    pub success: bool,
    pub matched: bool,
    pub result: Option<MatchingResult>,
    pub analysis: Option<MatchAnalysis>,
    pub error: Option<String>,
}

impl MatchRunOutcome {
    fn failed(error: String) -> Self {
        Self {
            success: false,
            matched: false,
            result: None,
            analysis: None,
            error: Some(error),
        }
    }
}

/// Sequences one reconciliation run:
/// fetch_documents → analyze → save_result → update_statuses.
///
/// Re-running for the same invoice inserts another MatchingResult row;
/// the most recently created row per invoice is the current one.
pub struct MatchingService {
    store: Arc<dyn DocumentStore>,
    linker: ExactLinker,
    fuzzy: FuzzyLinker,
    analyzer: MatchAnalyzer,
    status: StatusCoordinator,
    config: MatchingConfig,
}

impl MatchingService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        oracle: Arc<dyn ComparisonOracle>,
        config: MatchingConfig,
    ) -> Self {
        Self {
            linker: ExactLinker::new(store.clone()),
            fuzzy: FuzzyLinker::new(store.clone(), oracle.clone(), config.clone()),
            analyzer: MatchAnalyzer::new(oracle),
            status: StatusCoordinator::new(store.clone()),
            store,
            config,
        }
    }

    /// Run the full pipeline for one invoice. Never panics and never
    /// returns Err: failures become a structured outcome.
    pub async fn run_three_way_match(&self, invoice_id: &str) -> MatchRunOutcome {
        info!(invoice_id, "three-way match run started");
        match self.try_run(invoice_id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(invoice_id, error = %e, "three-way match run failed");
                MatchRunOutcome::failed(e.to_string())
            }
        }
    }

    async fn try_run(&self, invoice_id: &str) -> Result<MatchRunOutcome, MatchRunError> {
        let stage = RunStage::FetchDocuments;
        let invoice = self
            .store
            .get_invoice(invoice_id)
            .await?
            .ok_or_else(|| {
                MatchRunError::Store(StoreError::NotFound {
                    entity: "invoice",
                    key: invoice_id.to_string(),
                })
            })?;
        let docs = self.fetch_documents(invoice).await?;
        info!(
            stage = stage.as_str(),
            po_number = %docs.po.po_number,
            bol_number = docs.bol.as_ref().map(|b| b.bol_number.as_str()).unwrap_or("N/A"),
            "related documents resolved"
        );

        let analysis = self.analyzer.analyze(&docs).await.map_err(|e| {
            warn!(stage = RunStage::Analyze.as_str(), error = %e, "analysis aborted the run");
            MatchRunError::Analysis(e)
        })?;

        let result = self
            .store
            .insert_match_result(build_matching_result(&docs, &analysis))
            .await?;
        info!(
            stage = RunStage::SaveResult.as_str(),
            result_id = %result.id,
            match_status = result.match_status.as_str(),
            "matching result saved"
        );

        // Status propagation is best-effort: the saved result is already
        // authoritative, so a partial write only logs.
        let report = self.status.apply_verdict(&docs, analysis.matched).await;
        if !report.all_applied() {
            warn!(
                stage = RunStage::UpdateStatuses.as_str(),
                failed = ?report.failed,
                "some status writes did not land"
            );
        }

        Ok(MatchRunOutcome {
            success: true,
            matched: analysis.matched,
            result: Some(result),
            analysis: Some(analysis),
            error: None,
        })
    }

    /// Exact resolution, optionally falling through to the fuzzy linker
    /// when `fuzzy_fallback` is enabled.
    async fn fetch_documents(&self, invoice: Invoice) -> Result<MatchingDocuments, MatchRunError> {
        if let Some(docs) = self.linker.resolve(&invoice).await? {
            return Ok(docs);
        }

        if !self.config.fuzzy_fallback {
            return Err(MatchRunError::NoPoFound);
        }

        info!(
            invoice_number = %invoice.invoice_number,
            declared_po = %invoice.po_number,
            "exact resolution failed, falling back to fuzzy linking"
        );
        let Some(matched) = self.fuzzy.find_matching_po(&invoice).await else {
            return Err(MatchRunError::NoPoFound);
        };
        let invoice = self.fuzzy.commit_po_link(&invoice, &matched).await?;
        let bol = self
            .store
            .get_bol_by_po_number(&matched.document.po_number)
            .await?;

        Ok(MatchingDocuments {
            po: matched.document,
            bol,
            invoice,
        })
    }

    /// Dashboard read: latest result per invoice is authoritative.
    pub async fn latest_result_for_invoice(
        &self,
        invoice_id: &str,
    ) -> StoreResult<Option<MatchingResult>> {
        self.store.latest_match_result_for_invoice(invoice_id).await
    }

    pub async fn list_results(&self) -> StoreResult<Vec<MatchingResult>> {
        self.store.list_match_results().await
    }
}

/// One queued matching trigger.
#[derive(Debug)]
pub struct MatchingRunJob {
    pub invoice_id: String,
}

/// Handle for enqueueing matching runs. Fire-and-forget: callers do not
/// block on matching completion.
#[derive(Clone)]
pub struct MatchingJobQueue {
    tx: mpsc::UnboundedSender<MatchingRunJob>,
}

impl MatchingJobQueue {
    pub fn enqueue(&self, invoice_id: &str) {
        let job = MatchingRunJob {
            invoice_id: invoice_id.to_string(),
        };
        if self.tx.send(job).is_err() {
            error!(invoice_id, "matching worker is gone, dropping job");
        }
    }
}

/// Spawn the background worker that drains the matching queue. Runs for
/// different invoices are independent; within one run the stages are
/// strictly sequential.
pub fn spawn_matching_worker(service: Arc<MatchingService>) -> MatchingJobQueue {
    let (tx, mut rx) = mpsc::unbounded_channel::<MatchingRunJob>();
    tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            let outcome = service.run_three_way_match(&job.invoice_id).await;
            if outcome.success {
                info!(
                    invoice_id = %job.invoice_id,
                    matched = outcome.matched,
                    "matching run completed"
                );
            } else {
                warn!(
                    invoice_id = %job.invoice_id,
                    error = outcome.error.as_deref().unwrap_or("unknown"),
                    "matching run failed"
                );
            }
        }
        info!("matching queue closed, worker exiting");
    });
    MatchingJobQueue { tx }
}
