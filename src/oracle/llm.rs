use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::OracleConfig;
use crate::error::OracleError;
use crate::models::{BillOfLading, Invoice, PurchaseOrder};
use crate::oracle::{
    parse_match_analysis, parse_rank_outcome, prompt, ComparisonOracle, MatchAnalysis, RankOutcome,
};
use crate::service::linker::MatchingDocuments;

const SYSTEM_PROMPT: &str = "You are a freight audit assistant. You compare purchase orders, \
bills of lading and carrier invoices, and you answer with a single JSON object matching the \
schema requested in the prompt. No markdown fences, no commentary.";

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// LLM-backed comparison oracle speaking an OpenAI-style chat API.
pub struct LlmOracle {
    client: Client,
    config: OracleConfig,
}

impl LlmOracle {
    pub fn new(config: OracleConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: 0.0,
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Api { status, body });
        }

        let chat_response: ChatResponse = response.json().await?;
        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(OracleError::EmptyResponse)
    }
}

#[async_trait]
impl ComparisonOracle for LlmOracle {
    async fn rank_po_candidates(
        &self,
        invoice: &Invoice,
        candidates: &[PurchaseOrder],
    ) -> Result<RankOutcome, OracleError> {
        let raw = self
            .complete(&prompt::po_ranking_prompt(invoice, candidates))
            .await?;
        parse_rank_outcome(&raw)
    }

    async fn rank_bol_candidates(
        &self,
        po: &PurchaseOrder,
        invoice: &Invoice,
        candidates: &[BillOfLading],
    ) -> Result<RankOutcome, OracleError> {
        let raw = self
            .complete(&prompt::bol_ranking_prompt(po, invoice, candidates))
            .await?;
        parse_rank_outcome(&raw)
    }

    async fn analyze_match(&self, docs: &MatchingDocuments) -> Result<MatchAnalysis, OracleError> {
        let raw = self.complete(&prompt::analysis_prompt(docs)).await?;
        parse_match_analysis(&raw)
    }
}
