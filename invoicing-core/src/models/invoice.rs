//! Invoice model for invoicing-core.

use crate::models::{Address, InvoiceItemResponse};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Invoice status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Issued,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Issued => "issued",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "issued" => InvoiceStatus::Issued,
            "sent" => InvoiceStatus::Sent,
            "paid" => InvoiceStatus::Paid,
            "overdue" => InvoiceStatus::Overdue,
            "cancelled" => InvoiceStatus::Cancelled,
            _ => InvoiceStatus::Draft,
        }
    }
}

/// Payment method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    BankTransfer,
    Cash,
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "cash" => PaymentMethod::Cash,
            "card" => PaymentMethod::Card,
            _ => PaymentMethod::BankTransfer,
        }
    }
}

/// Invoice document.
///
/// Seller and buyer identity fields are snapshots taken at creation time.
/// The seller-profile and contractor references are kept for audit only and
/// go null when the referenced record is deleted; displayed values always
/// come from the snapshot columns.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub invoice_id: Uuid,
    pub organization_id: Uuid,
    pub seller_profile_id: Option<Uuid>,
    pub contractor_id: Option<Uuid>,
    pub number: String,
    pub status: String,
    pub issue_date: NaiveDate,
    pub sale_date: NaiveDate,
    pub due_date: NaiveDate,
    pub payment_method: String,
    pub currency: String,
    pub seller_name: String,
    pub seller_tax_id_encrypted: String,
    pub seller_street: Option<String>,
    pub seller_building_number: Option<String>,
    pub seller_apartment_number: Option<String>,
    pub seller_postal_code: Option<String>,
    pub seller_city: Option<String>,
    pub seller_country: Option<String>,
    pub seller_bank_account: Option<String>,
    pub buyer_name: String,
    pub buyer_tax_id_encrypted: Option<String>,
    pub buyer_pesel_encrypted: Option<String>,
    pub buyer_street: Option<String>,
    pub buyer_building_number: Option<String>,
    pub buyer_apartment_number: Option<String>,
    pub buyer_postal_code: Option<String>,
    pub buyer_city: Option<String>,
    pub buyer_country: Option<String>,
    pub total_net: Decimal,
    pub total_vat: Decimal,
    pub total_gross: Decimal,
    pub notes: Option<String>,
    pub reverse_charge: bool,
    pub split_payment: bool,
    pub created_utc: DateTime<Utc>,
}

impl Invoice {
    pub fn seller_address(&self) -> Address {
        Address {
            street: self.seller_street.clone(),
            building_number: self.seller_building_number.clone(),
            apartment_number: self.seller_apartment_number.clone(),
            postal_code: self.seller_postal_code.clone(),
            city: self.seller_city.clone(),
            country: self.seller_country.clone(),
        }
    }

    pub fn buyer_address(&self) -> Address {
        Address {
            street: self.buyer_street.clone(),
            building_number: self.buyer_building_number.clone(),
            apartment_number: self.buyer_apartment_number.clone(),
            postal_code: self.buyer_postal_code.clone(),
            city: self.buyer_city.clone(),
            country: self.buyer_country.clone(),
        }
    }
}

/// Input for creating an invoice.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvoiceRequest {
    pub seller_profile_id: Uuid,
    pub contractor_id: Uuid,
    pub buyer_name_override: Option<String>,
    pub buyer_tax_id_override: Option<String>,
    pub buyer_pesel_override: Option<String>,
    /// Defaults to today when absent.
    pub issue_date: Option<NaiveDate>,
    /// Defaults to the issue date when absent.
    pub sale_date: Option<NaiveDate>,
    /// Defaults to issue date + the seller profile's payment term when absent.
    pub due_date: Option<NaiveDate>,
    pub payment_method: PaymentMethod,
    /// Defaults to the seller profile's currency when absent.
    pub currency: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub reverse_charge: bool,
    #[serde(default)]
    pub split_payment: bool,
    pub items: Vec<CreateInvoiceItem>,
}

/// Input for a single requested line item.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvoiceItem {
    pub description: String,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub net_unit_price: Decimal,
    pub vat_rate: Option<String>,
}

/// Full invoice view returned to callers, with tax identifiers decrypted.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceResponse {
    pub invoice_id: Uuid,
    pub number: String,
    pub status: InvoiceStatus,
    pub issue_date: NaiveDate,
    pub sale_date: NaiveDate,
    pub due_date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub currency: String,
    pub seller_name: String,
    pub seller_tax_id: String,
    pub seller_address: Address,
    pub seller_bank_account: Option<String>,
    pub buyer_name: String,
    pub buyer_tax_id: Option<String>,
    pub buyer_pesel: Option<String>,
    pub buyer_address: Address,
    pub notes: Option<String>,
    pub reverse_charge: bool,
    pub split_payment: bool,
    pub total_net: Decimal,
    pub total_vat: Decimal,
    pub total_gross: Decimal,
    pub items: Vec<InvoiceItemResponse>,
}

/// Compact listing view without line items or decrypted identifiers.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceSummary {
    pub invoice_id: Uuid,
    pub number: String,
    pub status: InvoiceStatus,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub buyer_name: String,
    pub currency: String,
    pub total_net: Decimal,
    pub total_vat: Decimal,
    pub total_gross: Decimal,
}

impl From<&Invoice> for InvoiceSummary {
    fn from(invoice: &Invoice) -> Self {
        Self {
            invoice_id: invoice.invoice_id,
            number: invoice.number.clone(),
            status: InvoiceStatus::from_string(&invoice.status),
            issue_date: invoice.issue_date,
            due_date: invoice.due_date,
            buyer_name: invoice.buyer_name.clone(),
            currency: invoice.currency.clone(),
            total_net: invoice.total_net,
            total_vat: invoice.total_vat,
            total_gross: invoice.total_gross,
        }
    }
}
