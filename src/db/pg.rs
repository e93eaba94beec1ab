use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::db::store::{DocumentStore, StoreResult};
use crate::error::StoreError;
use crate::models::{
    BillOfLading, BolStatus, Invoice, InvoiceStatus, MatchType, MatchingResult, PoStatus,
    PurchaseOrder, StoredFile,
};

/// Postgres-backed document store.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a unique-constraint violation (23505) on insert to a conflict.
fn map_insert_err(
    e: sqlx::Error,
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            StoreError::Conflict {
                entity,
                field,
                value: value.to_string(),
            }
        }
        _ => StoreError::Database(e),
    }
}

fn not_found(entity: &'static str, key: &str) -> StoreError {
    StoreError::NotFound {
        entity,
        key: key.to_string(),
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn insert_po(&self, po: PurchaseOrder) -> StoreResult<PurchaseOrder> {
        sqlx::query(
            r#"
            INSERT INTO purchase_orders (
                id, po_number, customer_name, carrier_name,
                origin, destination, pickup_date, delivery_date,
                expected_charges, total_amount, status, source_file_id,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(&po.id)
        .bind(&po.po_number)
        .bind(&po.customer_name)
        .bind(&po.carrier_name)
        .bind(&po.origin)
        .bind(&po.destination)
        .bind(po.pickup_date)
        .bind(po.delivery_date)
        .bind(&po.expected_charges)
        .bind(&po.total_amount)
        .bind(po.status)
        .bind(&po.source_file_id)
        .bind(po.created_at)
        .bind(po.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_err(e, "purchase order", "po_number", &po.po_number))?;

        Ok(po)
    }

    async fn get_po(&self, id: &str) -> StoreResult<Option<PurchaseOrder>> {
        let po = sqlx::query_as::<_, PurchaseOrder>(
            "SELECT * FROM purchase_orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(po)
    }

    async fn get_po_by_number(&self, po_number: &str) -> StoreResult<Option<PurchaseOrder>> {
        let po = sqlx::query_as::<_, PurchaseOrder>(
            "SELECT * FROM purchase_orders WHERE po_number = $1",
        )
        .bind(po_number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(po)
    }

    async fn list_pos_by_status(&self, statuses: &[PoStatus]) -> StoreResult<Vec<PurchaseOrder>> {
        let names: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();
        let pos = sqlx::query_as::<_, PurchaseOrder>(
            "SELECT * FROM purchase_orders WHERE status = ANY($1) ORDER BY created_at",
        )
        .bind(&names)
        .fetch_all(&self.pool)
        .await?;
        Ok(pos)
    }

    async fn update_po_status(&self, id: &str, status: PoStatus) -> StoreResult<PurchaseOrder> {
        sqlx::query_as::<_, PurchaseOrder>(
            "UPDATE purchase_orders SET status = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found("purchase order", id))
    }

    async fn insert_bol(&self, bol: BillOfLading) -> StoreResult<BillOfLading> {
        sqlx::query(
            r#"
            INSERT INTO bills_of_lading (
                id, bol_number, po_number, po_id,
                carrier_name, origin, destination, pickup_date, delivery_date,
                weight_lbs, item_description, actual_charges,
                pod_file_id, pod_signed_at, status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(&bol.id)
        .bind(&bol.bol_number)
        .bind(&bol.po_number)
        .bind(&bol.po_id)
        .bind(&bol.carrier_name)
        .bind(&bol.origin)
        .bind(&bol.destination)
        .bind(bol.pickup_date)
        .bind(bol.delivery_date)
        .bind(bol.weight_lbs)
        .bind(&bol.item_description)
        .bind(&bol.actual_charges)
        .bind(&bol.pod_file_id)
        .bind(bol.pod_signed_at)
        .bind(bol.status)
        .bind(bol.created_at)
        .bind(bol.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_err(e, "bill of lading", "bol_number", &bol.bol_number))?;

        Ok(bol)
    }

    async fn get_bol(&self, id: &str) -> StoreResult<Option<BillOfLading>> {
        let bol = sqlx::query_as::<_, BillOfLading>(
            "SELECT * FROM bills_of_lading WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(bol)
    }

    async fn get_bol_by_po_number(&self, po_number: &str) -> StoreResult<Option<BillOfLading>> {
        let bol = sqlx::query_as::<_, BillOfLading>(
            "SELECT * FROM bills_of_lading WHERE po_number = $1 ORDER BY created_at LIMIT 1",
        )
        .bind(po_number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(bol)
    }

    async fn list_bols_by_status(&self, statuses: &[BolStatus]) -> StoreResult<Vec<BillOfLading>> {
        let names: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();
        let bols = sqlx::query_as::<_, BillOfLading>(
            "SELECT * FROM bills_of_lading WHERE status = ANY($1) ORDER BY created_at",
        )
        .bind(&names)
        .fetch_all(&self.pool)
        .await?;
        Ok(bols)
    }

    async fn update_bol_status(&self, id: &str, status: BolStatus) -> StoreResult<BillOfLading> {
        sqlx::query_as::<_, BillOfLading>(
            "UPDATE bills_of_lading SET status = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found("bill of lading", id))
    }

    async fn attach_pod(
        &self,
        id: &str,
        pod_file_id: &str,
        signed_at: DateTime<Utc>,
    ) -> StoreResult<BillOfLading> {
        sqlx::query_as::<_, BillOfLading>(
            r#"
            UPDATE bills_of_lading
            SET pod_file_id = $2, pod_signed_at = $3, status = $4, updated_at = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(pod_file_id)
        .bind(signed_at)
        .bind(BolStatus::Delivered)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found("bill of lading", id))
    }

    async fn insert_invoice(&self, invoice: Invoice) -> StoreResult<Invoice> {
        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, invoice_number, carrier_name, invoice_date,
                po_number, bol_number, po_id, bol_id,
                charges, total_amount, payment_terms, due_date,
                invoice_file_id, match_type, match_confidence, status,
                approved_at, approved_by, approval_notes,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                      $13, $14, $15, $16, $17, $18, $19, $20, $21)
            "#,
        )
        .bind(&invoice.id)
        .bind(&invoice.invoice_number)
        .bind(&invoice.carrier_name)
        .bind(invoice.invoice_date)
        .bind(&invoice.po_number)
        .bind(&invoice.bol_number)
        .bind(&invoice.po_id)
        .bind(&invoice.bol_id)
        .bind(&invoice.charges)
        .bind(&invoice.total_amount)
        .bind(&invoice.payment_terms)
        .bind(invoice.due_date)
        .bind(&invoice.invoice_file_id)
        .bind(invoice.match_type)
        .bind(invoice.match_confidence)
        .bind(invoice.status)
        .bind(invoice.approved_at)
        .bind(&invoice.approved_by)
        .bind(&invoice.approval_notes)
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_err(e, "invoice", "invoice_number", &invoice.invoice_number))?;

        Ok(invoice)
    }

    async fn get_invoice(&self, id: &str) -> StoreResult<Option<Invoice>> {
        let invoice = sqlx::query_as::<_, Invoice>("SELECT * FROM invoices WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(invoice)
    }

    async fn list_invoices_by_status(
        &self,
        statuses: &[InvoiceStatus],
    ) -> StoreResult<Vec<Invoice>> {
        let names: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();
        let invoices = sqlx::query_as::<_, Invoice>(
            "SELECT * FROM invoices WHERE status = ANY($1) ORDER BY created_at",
        )
        .bind(&names)
        .fetch_all(&self.pool)
        .await?;
        Ok(invoices)
    }

    async fn update_invoice_status(
        &self,
        id: &str,
        status: InvoiceStatus,
    ) -> StoreResult<Invoice> {
        sqlx::query_as::<_, Invoice>(
            "UPDATE invoices SET status = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found("invoice", id))
    }

    async fn update_invoice_link(
        &self,
        id: &str,
        po_id: &str,
        match_type: MatchType,
        confidence: f64,
    ) -> StoreResult<Invoice> {
        sqlx::query_as::<_, Invoice>(
            r#"
            UPDATE invoices
            SET po_id = $2, match_type = $3, match_confidence = $4, updated_at = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(po_id)
        .bind(match_type)
        .bind(confidence)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found("invoice", id))
    }

    async fn approve_invoice(
        &self,
        id: &str,
        approved_by: &str,
        notes: Option<&str>,
    ) -> StoreResult<Invoice> {
        sqlx::query_as::<_, Invoice>(
            r#"
            UPDATE invoices
            SET status = $2, approved_at = $3, approved_by = $4, approval_notes = $5,
                updated_at = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(InvoiceStatus::Approved)
        .bind(Utc::now())
        .bind(approved_by)
        .bind(notes)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found("invoice", id))
    }

    async fn insert_match_result(&self, result: MatchingResult) -> StoreResult<MatchingResult> {
        sqlx::query(
            r#"
            INSERT INTO matching_results (
                id, po_id, bol_id, invoice_id,
                match_status, confidence_score, comparison,
                flags_count, high_severity_flags, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&result.id)
        .bind(&result.po_id)
        .bind(&result.bol_id)
        .bind(&result.invoice_id)
        .bind(result.match_status)
        .bind(result.confidence_score)
        .bind(&result.comparison)
        .bind(result.flags_count)
        .bind(result.high_severity_flags)
        .bind(result.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_err(e, "matching result", "id", &result.id))?;

        Ok(result)
    }

    async fn latest_match_result_for_invoice(
        &self,
        invoice_id: &str,
    ) -> StoreResult<Option<MatchingResult>> {
        let result = sqlx::query_as::<_, MatchingResult>(
            r#"
            SELECT * FROM matching_results
            WHERE invoice_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(invoice_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(result)
    }

    async fn list_match_results(&self) -> StoreResult<Vec<MatchingResult>> {
        let results = sqlx::query_as::<_, MatchingResult>(
            "SELECT * FROM matching_results ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(results)
    }

    async fn insert_file(&self, file: StoredFile) -> StoreResult<StoredFile> {
        sqlx::query(
            r#"
            INSERT INTO files (
                id, filename, mime_type, size_bytes, storage_path, file_kind, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&file.id)
        .bind(&file.filename)
        .bind(&file.mime_type)
        .bind(file.size_bytes)
        .bind(&file.storage_path)
        .bind(file.file_kind)
        .bind(file.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_err(e, "file", "id", &file.id))?;

        Ok(file)
    }

    async fn get_file(&self, id: &str) -> StoreResult<Option<StoredFile>> {
        let file = sqlx::query_as::<_, StoredFile>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unique_violations_become_conflicts() {
        let mapped = map_insert_err(sqlx::Error::RowNotFound, "invoice", "invoice_number", "X");
        assert!(matches!(mapped, StoreError::Database(_)));
    }
}
