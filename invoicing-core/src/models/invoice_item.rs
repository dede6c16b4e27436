//! Invoice line item model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Line item on an invoice. Created once during assembly and never modified
/// afterwards; owned exclusively by its parent invoice.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InvoiceItem {
    pub item_id: Uuid,
    pub invoice_id: Uuid,
    pub description: String,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub net_unit_price: Decimal,
    pub vat_rate: Option<String>,
    pub net_total: Decimal,
    pub vat_amount: Decimal,
    pub gross_total: Decimal,
    pub sort_order: i32,
    pub created_utc: DateTime<Utc>,
}

/// Line item view returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceItemResponse {
    pub item_id: Uuid,
    pub description: String,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub net_unit_price: Decimal,
    pub vat_rate: Option<String>,
    pub net_total: Decimal,
    pub vat_amount: Decimal,
    pub gross_total: Decimal,
}

impl From<&InvoiceItem> for InvoiceItemResponse {
    fn from(item: &InvoiceItem) -> Self {
        Self {
            item_id: item.item_id,
            description: item.description.clone(),
            quantity: item.quantity,
            unit: item.unit.clone(),
            net_unit_price: item.net_unit_price,
            vat_rate: item.vat_rate.clone(),
            net_total: item.net_total,
            vat_amount: item.vat_amount,
            gross_total: item.gross_total,
        }
    }
}
