//! Data-access interface required by the invoicing core.

use crate::models::{Contractor, Invoice, InvoiceItem, SellerProfile};
use async_trait::async_trait;
use chrono::NaiveDate;
use service_core::error::AppError;
use uuid::Uuid;

/// Persistence operations the assembly flow depends on.
///
/// Backed by Postgres in production ([`crate::services::Database`]);
/// tests substitute an in-memory double. Implementations must enforce a
/// uniqueness constraint on (organization_id, number): the read-then-format
/// number allocation can race, and the constraint is the last line of
/// defense. A violated constraint surfaces as [`AppError::Conflict`] so the
/// caller may retry the whole creation.
#[async_trait]
pub trait InvoicingStore: Send + Sync {
    async fn find_seller_profile(&self, id: Uuid) -> Result<Option<SellerProfile>, AppError>;

    async fn find_contractor(&self, id: Uuid) -> Result<Option<Contractor>, AppError>;

    /// Count invoices for an organization whose issue date falls in the
    /// inclusive range `from..=to`.
    async fn count_invoices_by_issue_date(
        &self,
        organization_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<i64, AppError>;

    /// Persist an invoice together with its items as a single unit. Either
    /// everything is stored or nothing is; a partially written invoice is
    /// never visible.
    async fn save_invoice(&self, invoice: &Invoice, items: &[InvoiceItem])
        -> Result<(), AppError>;

    async fn find_invoice(&self, id: Uuid)
        -> Result<Option<(Invoice, Vec<InvoiceItem>)>, AppError>;

    /// Invoices for an organization, newest issue date first, optionally
    /// restricted to an inclusive issue-date range.
    async fn list_invoices(
        &self,
        organization_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        limit: i64,
    ) -> Result<Vec<Invoice>, AppError>;

    /// Delete an invoice and its items. Returns false when nothing matched.
    async fn delete_invoice(&self, id: Uuid) -> Result<bool, AppError>;
}
