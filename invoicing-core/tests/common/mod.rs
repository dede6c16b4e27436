//! Shared fixtures for invoicing-core integration tests: an in-memory
//! store double and entity builders.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use invoicing_core::crypto::FieldCipher;
use invoicing_core::models::{
    Contractor, CreateInvoiceItem, CreateInvoiceRequest, CurrentUser, Invoice, InvoiceItem,
    PaymentMethod, SellerProfile,
};
use invoicing_core::store::InvoicingStore;
use rust_decimal::Decimal;
use service_core::error::AppError;
use std::sync::Mutex;
use uuid::Uuid;

pub const TEST_ORG: Uuid = Uuid::from_u128(10);
pub const OTHER_ORG: Uuid = Uuid::from_u128(99);

pub fn test_cipher() -> FieldCipher {
    FieldCipher::from_secret("integration-test-secret")
}

pub fn actor(organization_id: Uuid) -> CurrentUser {
    CurrentUser {
        user_id: Uuid::from_u128(1),
        organization_id,
    }
}

/// In-memory stand-in for the Postgres store. Mirrors the production
/// uniqueness constraint on (organization_id, number).
#[derive(Default)]
pub struct InMemoryStore {
    pub seller_profiles: Mutex<Vec<SellerProfile>>,
    pub contractors: Mutex<Vec<Contractor>>,
    pub invoices: Mutex<Vec<(Invoice, Vec<InvoiceItem>)>>,
}

impl InMemoryStore {
    pub fn with(profiles: Vec<SellerProfile>, contractors: Vec<Contractor>) -> Self {
        Self {
            seller_profiles: Mutex::new(profiles),
            contractors: Mutex::new(contractors),
            invoices: Mutex::new(Vec::new()),
        }
    }

    pub fn invoice_count(&self) -> usize {
        self.invoices.lock().unwrap().len()
    }

    pub fn stored_invoice(&self, number: &str) -> Option<(Invoice, Vec<InvoiceItem>)> {
        self.invoices
            .lock()
            .unwrap()
            .iter()
            .find(|(inv, _)| inv.number == number)
            .cloned()
    }
}

#[async_trait]
impl InvoicingStore for InMemoryStore {
    async fn find_seller_profile(&self, id: Uuid) -> Result<Option<SellerProfile>, AppError> {
        Ok(self
            .seller_profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.seller_profile_id == id)
            .cloned())
    }

    async fn find_contractor(&self, id: Uuid) -> Result<Option<Contractor>, AppError> {
        Ok(self
            .contractors
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.contractor_id == id)
            .cloned())
    }

    async fn count_invoices_by_issue_date(
        &self,
        organization_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<i64, AppError> {
        Ok(self
            .invoices
            .lock()
            .unwrap()
            .iter()
            .filter(|(inv, _)| {
                inv.organization_id == organization_id
                    && inv.issue_date >= from
                    && inv.issue_date <= to
            })
            .count() as i64)
    }

    async fn save_invoice(
        &self,
        invoice: &Invoice,
        items: &[InvoiceItem],
    ) -> Result<(), AppError> {
        let mut invoices = self.invoices.lock().unwrap();
        if invoices.iter().any(|(existing, _)| {
            existing.organization_id == invoice.organization_id
                && existing.number == invoice.number
        }) {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Invoice number '{}' already exists for this organization",
                invoice.number
            )));
        }
        invoices.push((invoice.clone(), items.to_vec()));
        Ok(())
    }

    async fn find_invoice(
        &self,
        id: Uuid,
    ) -> Result<Option<(Invoice, Vec<InvoiceItem>)>, AppError> {
        Ok(self
            .invoices
            .lock()
            .unwrap()
            .iter()
            .find(|(inv, _)| inv.invoice_id == id)
            .cloned())
    }

    async fn list_invoices(
        &self,
        organization_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        limit: i64,
    ) -> Result<Vec<Invoice>, AppError> {
        let mut matching: Vec<Invoice> = self
            .invoices
            .lock()
            .unwrap()
            .iter()
            .map(|(inv, _)| inv.clone())
            .filter(|inv| {
                inv.organization_id == organization_id
                    && from.map_or(true, |f| inv.issue_date >= f)
                    && to.map_or(true, |t| inv.issue_date <= t)
            })
            .collect();
        matching.sort_by(|a, b| b.issue_date.cmp(&a.issue_date).then(b.number.cmp(&a.number)));
        matching.truncate(limit.clamp(1, 100) as usize);
        Ok(matching)
    }

    async fn delete_invoice(&self, id: Uuid) -> Result<bool, AppError> {
        let mut invoices = self.invoices.lock().unwrap();
        let before = invoices.len();
        invoices.retain(|(inv, _)| inv.invoice_id != id);
        Ok(invoices.len() < before)
    }
}

pub fn seller_profile(organization_id: Uuid, cipher: &FieldCipher) -> SellerProfile {
    SellerProfile {
        seller_profile_id: Uuid::new_v4(),
        organization_id,
        name: "Acme Consulting sp. z o.o.".to_string(),
        tax_id_encrypted: cipher.encrypt("5213017228").unwrap(),
        regon: None,
        krs: None,
        bank_name: Some("mBank".to_string()),
        bank_account: Some("PL61109010140000071219812874".to_string()),
        street: Some("Prosta".to_string()),
        building_number: Some("51".to_string()),
        apartment_number: None,
        postal_code: Some("00-838".to_string()),
        city: Some("Warszawa".to_string()),
        country: Some("Polska".to_string()),
        default_currency: "PLN".to_string(),
        default_payment_term_days: 14,
    }
}

pub fn contractor(
    organization_id: Uuid,
    cipher: &FieldCipher,
    tax_id: Option<&str>,
) -> Contractor {
    Contractor {
        contractor_id: Uuid::new_v4(),
        organization_id,
        contractor_type: "company".to_string(),
        name: "Beta Software S.A.".to_string(),
        tax_id_encrypted: tax_id.map(|t| cipher.encrypt(t).unwrap()),
        pesel_encrypted: None,
        street: Some("Długa".to_string()),
        building_number: Some("7".to_string()),
        apartment_number: Some("12".to_string()),
        postal_code: Some("31-147".to_string()),
        city: Some("Kraków".to_string()),
        country: Some("Polska".to_string()),
        email: Some("invoices@beta.example".to_string()),
        phone: None,
        favorite: false,
    }
}

pub fn line_item(description: &str, quantity: Decimal, price: Decimal, vat: &str) -> CreateInvoiceItem {
    CreateInvoiceItem {
        description: description.to_string(),
        quantity,
        unit: Some("szt.".to_string()),
        net_unit_price: price,
        vat_rate: Some(vat.to_string()),
    }
}

pub fn create_request(
    seller_profile_id: Uuid,
    contractor_id: Uuid,
    issue_date: Option<NaiveDate>,
    items: Vec<CreateInvoiceItem>,
) -> CreateInvoiceRequest {
    CreateInvoiceRequest {
        seller_profile_id,
        contractor_id,
        buyer_name_override: None,
        buyer_tax_id_override: None,
        buyer_pesel_override: None,
        issue_date,
        sale_date: issue_date,
        due_date: issue_date.map(|d| d + chrono::Duration::days(14)),
        payment_method: PaymentMethod::BankTransfer,
        currency: Some("PLN".to_string()),
        notes: None,
        reverse_charge: false,
        split_payment: false,
        items,
    }
}

/// Minimal stored invoice used to seed counts and uniqueness scenarios.
pub fn bare_invoice(organization_id: Uuid, issue_date: NaiveDate, number: &str) -> Invoice {
    Invoice {
        invoice_id: Uuid::new_v4(),
        organization_id,
        seller_profile_id: None,
        contractor_id: None,
        number: number.to_string(),
        status: "draft".to_string(),
        issue_date,
        sale_date: issue_date,
        due_date: issue_date,
        payment_method: "bank_transfer".to_string(),
        currency: "PLN".to_string(),
        seller_name: "Seeded Seller".to_string(),
        seller_tax_id_encrypted: test_cipher().encrypt("5213017228").unwrap(),
        seller_street: None,
        seller_building_number: None,
        seller_apartment_number: None,
        seller_postal_code: None,
        seller_city: None,
        seller_country: None,
        seller_bank_account: None,
        buyer_name: "Seeded Buyer".to_string(),
        buyer_tax_id_encrypted: None,
        buyer_pesel_encrypted: None,
        buyer_street: None,
        buyer_building_number: None,
        buyer_apartment_number: None,
        buyer_postal_code: None,
        buyer_city: None,
        buyer_country: None,
        total_net: Decimal::ZERO,
        total_vat: Decimal::ZERO,
        total_gross: Decimal::ZERO,
        notes: None,
        reverse_charge: false,
        split_payment: false,
        created_utc: Utc::now(),
    }
}
