pub mod llm;
#[cfg(test)]
pub mod mock;
pub mod prompt;

pub use llm::LlmOracle;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::OracleError;
use crate::models::{BillOfLading, Invoice, PurchaseOrder};
use crate::service::linker::MatchingDocuments;

/// Sentinel index meaning "no candidate is a reasonable match".
pub const NO_CANDIDATE: i64 = -1;

/// Ranking verdict over an enumerated candidate list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankOutcome {
    /// Index into the candidate list, or [`NO_CANDIDATE`].
    pub best_candidate_index: i64,
    pub confidence: f64,
    pub reasoning: String,
}

/// One discrepancy reported by the analysis verdict. Values are loosely
/// typed: the oracle may return strings or numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discrepancy {
    pub field: String,
    #[serde(default)]
    pub po_value: Option<Value>,
    #[serde(default)]
    pub bol_value: Option<Value>,
    #[serde(default)]
    pub invoice_value: Option<Value>,
    pub issue: String,
}

/// Structured judgment over a resolved document triple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchAnalysis {
    pub matched: bool,
    pub confidence: f64,
    #[serde(default)]
    pub variance_amount: f64,
    #[serde(default)]
    pub variance_percentage: f64,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub discrepancies: Vec<Discrepancy>,
}

/// The external structured-judgment service, consumed as a black box.
/// Implementations are non-deterministic and network-dependent; tests
/// substitute a scripted oracle.
#[async_trait]
pub trait ComparisonOracle: Send + Sync {
    async fn rank_po_candidates(
        &self,
        invoice: &Invoice,
        candidates: &[PurchaseOrder],
    ) -> Result<RankOutcome, OracleError>;

    async fn rank_bol_candidates(
        &self,
        po: &PurchaseOrder,
        invoice: &Invoice,
        candidates: &[BillOfLading],
    ) -> Result<RankOutcome, OracleError>;

    async fn analyze_match(&self, docs: &MatchingDocuments) -> Result<MatchAnalysis, OracleError>;
}

/// Strip markdown fences and pull the outermost JSON object out of a
/// response that may carry surrounding prose.
fn extract_json_object(s: &str) -> Result<&str, OracleError> {
    let s = s
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    let start = s
        .find('{')
        .ok_or_else(|| OracleError::Malformed("no '{' in oracle response".into()))?;
    let end = s
        .rfind('}')
        .ok_or_else(|| OracleError::Malformed("no '}' in oracle response".into()))?;
    if end <= start {
        return Err(OracleError::Malformed("unbalanced JSON object".into()));
    }
    Ok(&s[start..=end])
}

fn validated_confidence(confidence: f64) -> Result<f64, OracleError> {
    if !confidence.is_finite() {
        return Err(OracleError::Malformed("non-finite confidence".into()));
    }
    Ok(confidence.clamp(0.0, 1.0))
}

/// Parse a raw ranking response defensively.
pub fn parse_rank_outcome(raw: &str) -> Result<RankOutcome, OracleError> {
    let json = extract_json_object(raw)?;
    let mut outcome: RankOutcome = serde_json::from_str(json)
        .map_err(|e| OracleError::Malformed(format!("ranking schema mismatch: {e}")))?;
    outcome.confidence = validated_confidence(outcome.confidence)?;
    Ok(outcome)
}

/// Parse a raw analysis response defensively.
pub fn parse_match_analysis(raw: &str) -> Result<MatchAnalysis, OracleError> {
    let json = extract_json_object(raw)?;
    let mut analysis: MatchAnalysis = serde_json::from_str(json)
        .map_err(|e| OracleError::Malformed(format!("analysis schema mismatch: {e}")))?;
    analysis.confidence = validated_confidence(analysis.confidence)?;
    Ok(analysis)
}
