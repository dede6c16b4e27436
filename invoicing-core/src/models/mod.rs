//! Domain models for invoicing-core.

pub mod address;
pub mod contractor;
pub mod invoice;
pub mod invoice_item;
pub mod seller_profile;

pub use address::Address;
pub use contractor::Contractor;
pub use invoice::{
    CreateInvoiceItem, CreateInvoiceRequest, Invoice, InvoiceResponse, InvoiceStatus,
    InvoiceSummary, PaymentMethod,
};
pub use invoice_item::{InvoiceItem, InvoiceItemResponse};
pub use seller_profile::SellerProfile;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The already-authenticated caller, as handed down by the request layer.
///
/// Authentication and role decisions happen upstream; this core only uses
/// the organization scope to enforce tenancy isolation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub organization_id: Uuid,
}
