//! Services for invoicing-core.

pub mod database;
pub mod invoice;
pub mod metrics;

pub use database::Database;
pub use invoice::InvoiceService;
