use axum::{
    extract::{Json, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::StoreError;
use crate::models::{BillOfLading, Invoice, InvoiceStatus, MatchingResult, PoStatus, PurchaseOrder, StoredFile};
use crate::service::documents::{NewBillOfLading, NewInvoice, NewPurchaseOrder, NewStoredFile};
use crate::service::{DocumentService, MatchingJobQueue, MatchingService};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub documents: Arc<DocumentService>,
    pub matching: Arc<MatchingService>,
    pub queue: MatchingJobQueue,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct EntityResponse<T> {
    pub success: bool,
    #[serde(flatten)]
    pub entity: T,
}

fn created<T: Serialize>(entity: T) -> Response {
    (
        StatusCode::CREATED,
        Json(EntityResponse {
            success: true,
            entity,
        }),
    )
        .into_response()
}

fn error_response(e: StoreError) -> Response {
    let status = match &e {
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::Conflict { .. } => StatusCode::CONFLICT,
        StoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(MessageResponse {
            success: false,
            message: e.to_string(),
        }),
    )
        .into_response()
}

/// Health check.
pub async fn health_check() -> &'static str {
    "OK"
}

#[derive(Debug, Serialize)]
struct PoBody {
    purchase_order: PurchaseOrder,
}

pub async fn create_po(
    State(state): State<AppState>,
    Json(req): Json<NewPurchaseOrder>,
) -> Response {
    match state.documents.create_po(req).await {
        Ok(po) => created(PoBody { purchase_order: po }),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct PoListQuery {
    pub status: Option<PoStatus>,
}

#[derive(Debug, Serialize)]
struct PoListBody {
    purchase_orders: Vec<PurchaseOrder>,
    count: usize,
}

pub async fn list_pos(State(state): State<AppState>, Query(query): Query<PoListQuery>) -> Response {
    let statuses: Vec<PoStatus> = match query.status {
        Some(status) => vec![status],
        None => vec![
            PoStatus::Pending,
            PoStatus::BolReceived,
            PoStatus::Invoiced,
            PoStatus::Matched,
            PoStatus::Disputed,
        ],
    };
    match state.documents.list_pos_by_status(&statuses).await {
        Ok(pos) => Json(PoListBody {
            count: pos.len(),
            purchase_orders: pos,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Serialize)]
struct BolBody {
    bill_of_lading: BillOfLading,
}

pub async fn create_bol(
    State(state): State<AppState>,
    Json(req): Json<NewBillOfLading>,
) -> Response {
    match state.documents.create_bol(req).await {
        Ok(bol) => created(BolBody { bill_of_lading: bol }),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct AttachPodRequest {
    pub pod_file_id: String,
    pub signed_at: Option<DateTime<Utc>>,
}

pub async fn attach_pod(
    State(state): State<AppState>,
    Path(bol_id): Path<String>,
    Json(req): Json<AttachPodRequest>,
) -> Response {
    match state
        .documents
        .attach_pod(&bol_id, &req.pod_file_id, req.signed_at)
        .await
    {
        Ok(bol) => Json(EntityResponse {
            success: true,
            entity: BolBody { bill_of_lading: bol },
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Serialize)]
struct InvoiceBody {
    invoice: Invoice,
}

/// Invoice intake also enqueues a matching run; the caller never blocks
/// on matching completion.
pub async fn create_invoice(
    State(state): State<AppState>,
    Json(req): Json<NewInvoice>,
) -> Response {
    match state.documents.create_invoice(req).await {
        Ok(invoice) => {
            state.queue.enqueue(&invoice.id);
            created(InvoiceBody { invoice })
        }
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct InvoiceListQuery {
    pub status: Option<InvoiceStatus>,
}

#[derive(Debug, Serialize)]
struct InvoiceListBody {
    invoices: Vec<Invoice>,
    count: usize,
}

pub async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<InvoiceListQuery>,
) -> Response {
    let statuses: Vec<InvoiceStatus> = match query.status {
        Some(status) => vec![status],
        None => vec![
            InvoiceStatus::Pending,
            InvoiceStatus::Matched,
            InvoiceStatus::Flagged,
            InvoiceStatus::Approved,
            InvoiceStatus::Disputed,
            InvoiceStatus::Rejected,
        ],
    };
    match state.documents.list_invoices_by_status(&statuses).await {
        Ok(invoices) => Json(InvoiceListBody {
            count: invoices.len(),
            invoices,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct ApproveInvoiceRequest {
    pub approved_by: String,
    pub notes: Option<String>,
}

pub async fn approve_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<String>,
    Json(req): Json<ApproveInvoiceRequest>,
) -> Response {
    match state
        .documents
        .approve_invoice(&invoice_id, &req.approved_by, req.notes.as_deref())
        .await
    {
        Ok(invoice) => Json(EntityResponse {
            success: true,
            entity: InvoiceBody { invoice },
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Serialize)]
struct FileBody {
    file: StoredFile,
}

pub async fn register_file(
    State(state): State<AppState>,
    Json(req): Json<NewStoredFile>,
) -> Response {
    match state.documents.register_file(req).await {
        Ok(file) => created(FileBody { file }),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct RunMatchRequest {
    pub invoice_id: String,
}

/// Manual matching trigger.
pub async fn run_match(State(state): State<AppState>, Json(req): Json<RunMatchRequest>) -> Response {
    state.queue.enqueue(&req.invoice_id);
    (
        StatusCode::ACCEPTED,
        Json(MessageResponse {
            success: true,
            message: format!("matching run enqueued for invoice {}", req.invoice_id),
        }),
    )
        .into_response()
}

#[derive(Debug, Serialize)]
struct ResultListBody {
    matching_results: Vec<MatchingResult>,
    count: usize,
}

pub async fn list_matching_results(State(state): State<AppState>) -> Response {
    match state.matching.list_results().await {
        Ok(results) => Json(ResultListBody {
            count: results.len(),
            matching_results: results,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Serialize)]
struct ResultBody {
    matching_result: MatchingResult,
}

pub async fn latest_result_for_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<String>,
) -> Response {
    match state.matching.latest_result_for_invoice(&invoice_id).await {
        Ok(Some(result)) => Json(EntityResponse {
            success: true,
            entity: ResultBody {
                matching_result: result,
            },
        })
        .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(MessageResponse {
                success: false,
                message: format!("no matching result for invoice {invoice_id}"),
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// Flat CSV of the matching-results table for spreadsheet review.
pub async fn export_matching_results(State(state): State<AppState>) -> Response {
    match state.matching.list_results().await {
        Ok(results) => match results_to_csv(&results) {
            Ok(body) => ([(header::CONTENT_TYPE, "text/csv")], body).into_response(),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MessageResponse {
                    success: false,
                    message: format!("export failed: {e}"),
                }),
            )
                .into_response(),
        },
        Err(e) => error_response(e),
    }
}

fn option_to_csv(val: &Option<BigDecimal>) -> String {
    val.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

fn results_to_csv(
    results: &[MatchingResult],
) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "id",
        "invoice_id",
        "po_id",
        "bol_id",
        "match_status",
        "confidence_score",
        "po_total",
        "bol_total",
        "invoice_total",
        "variance",
        "variance_pct",
        "flags_count",
        "high_severity_flags",
        "created_at",
    ])?;

    for result in results {
        let comparison = &result.comparison.0;
        writer.write_record(&[
            result.id.clone(),
            result.invoice_id.clone(),
            result.po_id.clone(),
            result.bol_id.clone().unwrap_or_default(),
            result.match_status.as_str().to_string(),
            result.confidence_score.to_string(),
            comparison.po_total.to_string(),
            option_to_csv(&comparison.bol_total),
            comparison.invoice_total.to_string(),
            comparison.variance.to_string(),
            comparison.variance_pct.to_string(),
            result.flags_count.to_string(),
            result.high_severity_flags.to_string(),
            result.created_at.to_rfc3339(),
        ])?;
    }

    writer.flush()?;
    let bytes = writer.into_inner()?;
    Ok(String::from_utf8(bytes)?)
}
