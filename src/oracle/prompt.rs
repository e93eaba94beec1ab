//! Deterministic rendering of document payloads into oracle prompts.
//! Everything here is pure string assembly; given the same documents the
//! same bytes come out.

use crate::models::{BillOfLading, Invoice, PurchaseOrder};
use crate::service::linker::MatchingDocuments;

/// Prompt asking the oracle to pick the best PO for an orphaned invoice.
pub fn po_ranking_prompt(invoice: &Invoice, candidates: &[PurchaseOrder]) -> String {
    let mut prompt = String::from(
        "You are analyzing an invoice to find the best matching Purchase Order.\n\n**Invoice:**\n",
    );
    prompt.push_str(&invoice.comparable().render());

    prompt.push_str("\n**Candidate Purchase Orders:**\n");
    for (idx, po) in candidates.iter().enumerate() {
        prompt.push_str(&format!("\n[{idx}]\n"));
        prompt.push_str(&po.comparable().render());
    }

    prompt.push_str(
        r#"
**Your Task:**
Determine which Purchase Order (if any) best matches this invoice. Consider:
1. Carrier name similarity (very important)
2. Total amount proximity (important)
3. Charge descriptions and amounts (important)
4. Dates (pickup/delivery vs invoice date)
5. PO number similarity (typos, formatting differences like "PO-1234" vs "1234")
6. Origin/destination if mentioned in invoice

**Important Rules:**
- If no PO is a reasonable match, return -1
- Be conservative - only return high confidence if the match is clear
- Consider that PO numbers might have typos or format differences

"#,
    );
    prompt.push_str(RANKING_OUTPUT_FORMAT);
    prompt
}

/// Prompt asking the oracle to pick the best BOL for a PO + invoice pair.
pub fn bol_ranking_prompt(
    po: &PurchaseOrder,
    invoice: &Invoice,
    candidates: &[BillOfLading],
) -> String {
    let mut prompt = String::from(
        "You are analyzing a Purchase Order and Invoice to find the best matching Bill of Lading.\n\n**Purchase Order:**\n",
    );
    prompt.push_str(&po.comparable().render());
    prompt.push_str("\n**Invoice:**\n");
    prompt.push_str(&invoice.comparable().render());

    prompt.push_str("\n**Candidate Bills of Lading:**\n");
    for (idx, bol) in candidates.iter().enumerate() {
        prompt.push_str(&format!("\n[{idx}]\n"));
        prompt.push_str(&bol.comparable().render());
    }

    prompt.push_str(
        r#"
**Your Task:**
Determine which Bill of Lading (if any) best matches this PO and Invoice. Consider:
1. Carrier name consistency (very important)
2. Origin and destination match (very important)
3. Dates consistency (pickup/delivery dates)
4. BOL number similarity to invoice's referenced BOL
5. PO number similarity to BOL's referenced PO

**Important Rules:**
- If no BOL is a reasonable match, return -1
- Be conservative - only return high confidence if the match is clear

"#,
    );
    prompt.push_str(RANKING_OUTPUT_FORMAT);
    prompt
}

const RANKING_OUTPUT_FORMAT: &str = r#"Return your analysis as a JSON object with:
- best_candidate_index: index of the best matching document, or -1 if no good match
- confidence: number from 0-1
- reasoning: 2-3 sentences explaining the matching decision

Return ONLY valid JSON, no markdown formatting."#;

/// Prompt asking the oracle to judge a resolved PO / BOL / Invoice triple.
pub fn analysis_prompt(docs: &MatchingDocuments) -> String {
    let mut prompt = String::from(
        "You are analyzing a 3-way match between a Purchase Order (PO) and an Invoice for freight/logistics services.\n\n**Purchase Order:**\n",
    );
    prompt.push_str(&docs.po.comparable().render());
    prompt.push_str("\n**Invoice:**\n");
    prompt.push_str(&docs.invoice.comparable().render());

    match &docs.bol {
        Some(bol) => {
            prompt.push_str("\n**Bill of Lading (BOL):**\n");
            prompt.push_str(&bol.comparable().render());
        }
        None => prompt.push_str("\n**Bill of Lading:** Not available\n"),
    }

    prompt.push_str(
        r#"
**Your Task:**
Analyze if the Invoice matches the Purchase Order. Consider:
1. Do the total amounts match (or are within reasonable variance)?
2. Do the line items/charges match between PO and Invoice?
3. Are the carriers consistent?
4. Do the routes (origin/destination) and dates align?
5. Does the general information align (if BOL is available)?

For freight logistics, small variances (fuel surcharges, accessorial fees) are common.
Flag charges on the invoice but absent from the PO/BOL as "unexpected charge", charges
on the PO/BOL but absent from the invoice as "missing charge", and same-description
different-amount charges as a variance. Mark only significant discrepancies as
disqualifying.

Return your analysis as a JSON object with:
- matched: boolean (true if this is a good match, false if significant discrepancies)
- confidence: number from 0-1 (how confident you are in your assessment)
- variance_amount: number (absolute dollar difference between PO and Invoice totals)
- variance_percentage: number (percentage difference)
- reasoning: string (2-3 sentences explaining your decision)
- discrepancies: array of objects with {field, po_value, bol_value, invoice_value, issue} for each discrepancy found

Return ONLY valid JSON, no markdown formatting."#,
    );
    prompt
}
