//! Per-organization, per-day sequential invoice numbers.

use crate::store::InvoicingStore;
use chrono::{Datelike, NaiveDate, Utc};
use service_core::error::AppError;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Format a document number as `FV/YYYY/MM/DD/NNN`. The sequence is
/// zero-padded to three digits but never truncated: 1000 renders as "1000".
pub fn format_invoice_number(date: NaiveDate, sequence: i64) -> String {
    format!(
        "FV/{}/{:02}/{:02}/{:03}",
        date.year(),
        date.month(),
        date.day(),
        sequence
    )
}

/// Allocates invoice numbers from the count of already-issued invoices.
///
/// Read-then-format, not a reserved counter: two concurrent allocations for
/// the same organization and day can observe the same count and produce the
/// same number. The store's (organization_id, number) uniqueness constraint
/// rejects the second write; the caller retries the creation.
pub struct InvoiceNumberGenerator<S> {
    store: Arc<S>,
}

impl<S: InvoicingStore> InvoiceNumberGenerator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Allocate the next number for an organization and issue date. The
    /// date defaults to today when the caller supplies none.
    #[instrument(skip(self), fields(organization_id = %organization_id))]
    pub async fn allocate(
        &self,
        organization_id: Uuid,
        issue_date: Option<NaiveDate>,
    ) -> Result<String, AppError> {
        let date = issue_date.unwrap_or_else(|| Utc::now().date_naive());
        let count = self
            .store
            .count_invoices_by_issue_date(organization_id, date, date)
            .await?;
        Ok(format_invoice_number(date, count + 1))
    }
}
