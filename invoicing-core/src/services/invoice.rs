//! Invoice assembly: turns a validated creation request into a persisted,
//! totals-correct invoice.

use crate::crypto::FieldCipher;
use crate::models::{
    Contractor, CreateInvoiceRequest, CurrentUser, Invoice, InvoiceItem, InvoiceItemResponse,
    InvoiceResponse, InvoiceStatus, InvoiceSummary, PaymentMethod, SellerProfile,
};
use crate::money::{self, DocumentTotals};
use crate::numbering::InvoiceNumberGenerator;
use crate::services::metrics::{ERRORS_TOTAL, INVOICES_TOTAL, INVOICE_AMOUNT_TOTAL};
use crate::store::InvoicingStore;
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use service_core::error::AppError;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Orchestrates invoice creation and the read/delete paths around it.
pub struct InvoiceService<S> {
    store: Arc<S>,
    cipher: FieldCipher,
    numbering: InvoiceNumberGenerator<S>,
}

impl<S: InvoicingStore> InvoiceService<S> {
    pub fn new(store: Arc<S>, cipher: FieldCipher) -> Self {
        let numbering = InvoiceNumberGenerator::new(Arc::clone(&store));
        Self {
            store,
            cipher,
            numbering,
        }
    }

    /// Create an invoice for the caller's organization.
    ///
    /// Steps run strictly in order: authorize the seller profile, authorize
    /// the contractor, allocate the number, snapshot identities, compute
    /// line items, aggregate totals, persist invoice + items as one unit,
    /// return the decrypted view. A failure at any step leaves nothing
    /// persisted; retrying re-runs the whole flow including allocation.
    #[instrument(skip(self, req), fields(organization_id = %actor.organization_id))]
    pub async fn create_invoice(
        &self,
        actor: &CurrentUser,
        req: CreateInvoiceRequest,
    ) -> Result<InvoiceResponse, AppError> {
        self.create_invoice_inner(actor, req).await.map_err(|err| {
            ERRORS_TOTAL.with_label_values(&[err.kind()]).inc();
            err
        })
    }

    async fn create_invoice_inner(
        &self,
        actor: &CurrentUser,
        req: CreateInvoiceRequest,
    ) -> Result<InvoiceResponse, AppError> {
        let seller = self
            .store
            .find_seller_profile(req.seller_profile_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Seller profile not found")))?;

        if seller.organization_id != actor.organization_id {
            return Err(AppError::Forbidden(anyhow::anyhow!(
                "Seller profile does not belong to your organization"
            )));
        }

        let contractor = self
            .store
            .find_contractor(req.contractor_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Contractor not found")))?;

        if contractor.organization_id != actor.organization_id {
            return Err(AppError::Forbidden(anyhow::anyhow!(
                "Contractor does not belong to your organization"
            )));
        }

        let issue_date = req.issue_date.unwrap_or_else(|| Utc::now().date_naive());
        let number = self
            .numbering
            .allocate(seller.organization_id, Some(issue_date))
            .await?;

        let mut invoice = self.snapshot_invoice(&req, &seller, &contractor, number, issue_date)?;

        let mut items = Vec::with_capacity(req.items.len());
        let mut totals = DocumentTotals::default();

        for (index, item_req) in req.items.iter().enumerate() {
            let net_total = money::line_net_total(item_req.net_unit_price, item_req.quantity);
            let vat = money::vat_amount(net_total, item_req.vat_rate.as_deref());
            let gross = money::gross_total(net_total, vat);

            totals.add_line(net_total, vat, gross);

            items.push(InvoiceItem {
                item_id: Uuid::new_v4(),
                invoice_id: invoice.invoice_id,
                description: item_req.description.clone(),
                quantity: item_req.quantity,
                unit: item_req.unit.clone(),
                net_unit_price: item_req.net_unit_price,
                vat_rate: item_req.vat_rate.clone(),
                net_total,
                vat_amount: vat,
                gross_total: gross,
                sort_order: index as i32,
                created_utc: invoice.created_utc,
            });
        }

        invoice.total_net = totals.net;
        invoice.total_vat = totals.vat;
        invoice.total_gross = totals.gross;

        self.store.save_invoice(&invoice, &items).await?;

        INVOICES_TOTAL
            .with_label_values(&[invoice.status.as_str()])
            .inc();
        INVOICE_AMOUNT_TOTAL
            .with_label_values(&[invoice.currency.as_str()])
            .inc_by(invoice.total_gross.to_f64().unwrap_or(0.0));

        info!(
            invoice_id = %invoice.invoice_id,
            number = %invoice.number,
            total_gross = %invoice.total_gross,
            "Invoice created"
        );

        self.to_response(&invoice, &items)
    }

    /// Get an invoice in the caller's organization, with decrypted tax IDs.
    #[instrument(skip(self), fields(organization_id = %actor.organization_id, invoice_id = %id))]
    pub async fn get_invoice(
        &self,
        actor: &CurrentUser,
        id: Uuid,
    ) -> Result<InvoiceResponse, AppError> {
        let (invoice, items) = self
            .store
            .find_invoice(id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice not found")))?;

        if invoice.organization_id != actor.organization_id {
            return Err(AppError::Forbidden(anyhow::anyhow!(
                "No access to this invoice"
            )));
        }

        self.to_response(&invoice, &items)
    }

    /// List invoices in the caller's organization, newest issue date first,
    /// optionally restricted to an inclusive issue-date range.
    #[instrument(skip(self), fields(organization_id = %actor.organization_id))]
    pub async fn list_invoices(
        &self,
        actor: &CurrentUser,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        limit: i64,
    ) -> Result<Vec<InvoiceSummary>, AppError> {
        let invoices = self
            .store
            .list_invoices(actor.organization_id, from, to, limit)
            .await?;

        Ok(invoices.iter().map(InvoiceSummary::from).collect())
    }

    /// Delete an invoice in the caller's organization, items included.
    #[instrument(skip(self), fields(organization_id = %actor.organization_id, invoice_id = %id))]
    pub async fn delete_invoice(&self, actor: &CurrentUser, id: Uuid) -> Result<(), AppError> {
        let (invoice, _) = self
            .store
            .find_invoice(id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice not found")))?;

        if invoice.organization_id != actor.organization_id {
            return Err(AppError::Forbidden(anyhow::anyhow!(
                "No access to this invoice"
            )));
        }

        self.store.delete_invoice(id).await?;

        Ok(())
    }

    /// Build the invoice record with seller and buyer identity snapshots.
    ///
    /// Buyer name, tax ID and PESEL may be overridden by the request; absent
    /// an override they fall back to the contractor's stored values, with
    /// identifiers decrypted and re-encrypted onto the invoice. Absent both,
    /// the field stays empty.
    fn snapshot_invoice(
        &self,
        req: &CreateInvoiceRequest,
        seller: &SellerProfile,
        contractor: &Contractor,
        number: String,
        issue_date: NaiveDate,
    ) -> Result<Invoice, AppError> {
        let buyer_name = req
            .buyer_name_override
            .clone()
            .unwrap_or_else(|| contractor.name.clone());

        let buyer_tax_id = match &req.buyer_tax_id_override {
            Some(tax_id) => Some(tax_id.clone()),
            None => self
                .cipher
                .decrypt_opt(contractor.tax_id_encrypted.as_deref())?,
        };
        let buyer_tax_id_encrypted = self.cipher.encrypt_opt(buyer_tax_id.as_deref())?;

        let buyer_pesel = match &req.buyer_pesel_override {
            Some(pesel) => Some(pesel.clone()),
            None => self
                .cipher
                .decrypt_opt(contractor.pesel_encrypted.as_deref())?,
        };
        let buyer_pesel_encrypted = self.cipher.encrypt_opt(buyer_pesel.as_deref())?;

        let sale_date = req.sale_date.unwrap_or(issue_date);
        let due_date = req
            .due_date
            .unwrap_or(issue_date + Duration::days(seller.default_payment_term_days as i64));
        let currency = req
            .currency
            .clone()
            .unwrap_or_else(|| seller.default_currency.clone());

        Ok(Invoice {
            invoice_id: Uuid::new_v4(),
            organization_id: seller.organization_id,
            seller_profile_id: Some(seller.seller_profile_id),
            contractor_id: Some(contractor.contractor_id),
            number,
            status: InvoiceStatus::Draft.as_str().to_string(),
            issue_date,
            sale_date,
            due_date,
            payment_method: req.payment_method.as_str().to_string(),
            currency,
            seller_name: seller.name.clone(),
            seller_tax_id_encrypted: seller.tax_id_encrypted.clone(),
            seller_street: seller.street.clone(),
            seller_building_number: seller.building_number.clone(),
            seller_apartment_number: seller.apartment_number.clone(),
            seller_postal_code: seller.postal_code.clone(),
            seller_city: seller.city.clone(),
            seller_country: seller.country.clone(),
            seller_bank_account: seller.bank_account.clone(),
            buyer_name,
            buyer_tax_id_encrypted,
            buyer_pesel_encrypted,
            buyer_street: contractor.street.clone(),
            buyer_building_number: contractor.building_number.clone(),
            buyer_apartment_number: contractor.apartment_number.clone(),
            buyer_postal_code: contractor.postal_code.clone(),
            buyer_city: contractor.city.clone(),
            buyer_country: contractor.country.clone(),
            total_net: Decimal::ZERO,
            total_vat: Decimal::ZERO,
            total_gross: Decimal::ZERO,
            notes: req.notes.clone(),
            reverse_charge: req.reverse_charge,
            split_payment: req.split_payment,
            created_utc: Utc::now(),
        })
    }

    /// Response view with tax identifiers decrypted for display.
    fn to_response(
        &self,
        invoice: &Invoice,
        items: &[InvoiceItem],
    ) -> Result<InvoiceResponse, AppError> {
        Ok(InvoiceResponse {
            invoice_id: invoice.invoice_id,
            number: invoice.number.clone(),
            status: InvoiceStatus::from_string(&invoice.status),
            issue_date: invoice.issue_date,
            sale_date: invoice.sale_date,
            due_date: invoice.due_date,
            payment_method: PaymentMethod::from_string(&invoice.payment_method),
            currency: invoice.currency.clone(),
            seller_name: invoice.seller_name.clone(),
            seller_tax_id: self.cipher.decrypt(&invoice.seller_tax_id_encrypted)?,
            seller_address: invoice.seller_address(),
            seller_bank_account: invoice.seller_bank_account.clone(),
            buyer_name: invoice.buyer_name.clone(),
            buyer_tax_id: self
                .cipher
                .decrypt_opt(invoice.buyer_tax_id_encrypted.as_deref())?,
            buyer_pesel: self
                .cipher
                .decrypt_opt(invoice.buyer_pesel_encrypted.as_deref())?,
            buyer_address: invoice.buyer_address(),
            notes: invoice.notes.clone(),
            reverse_charge: invoice.reverse_charge,
            split_payment: invoice.split_payment,
            total_net: invoice.total_net,
            total_vat: invoice.total_vat,
            total_gross: invoice.total_gross,
            items: items.iter().map(InvoiceItemResponse::from).collect(),
        })
    }
}
