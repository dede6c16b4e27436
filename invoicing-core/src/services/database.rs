//! Postgres-backed store for invoicing-core.

use crate::models::{Contractor, Invoice, InvoiceItem, SellerProfile};
use crate::services::metrics::DB_QUERY_DURATION;
use crate::store::InvoicingStore;
use async_trait::async_trait;
use chrono::NaiveDate;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

const INVOICE_COLUMNS: &str = "invoice_id, organization_id, seller_profile_id, contractor_id, \
    number, status, issue_date, sale_date, due_date, payment_method, currency, \
    seller_name, seller_tax_id_encrypted, seller_street, seller_building_number, \
    seller_apartment_number, seller_postal_code, seller_city, seller_country, seller_bank_account, \
    buyer_name, buyer_tax_id_encrypted, buyer_pesel_encrypted, buyer_street, buyer_building_number, \
    buyer_apartment_number, buyer_postal_code, buyer_city, buyer_country, \
    total_net, total_vat, total_gross, notes, reverse_charge, split_payment, created_utc";

const ITEM_COLUMNS: &str = "item_id, invoice_id, description, quantity, unit, net_unit_price, \
    vat_rate, net_total, vat_amount, gross_total, sort_order, created_utc";

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "invoicing-core"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl InvoicingStore for Database {
    #[instrument(skip(self), fields(seller_profile_id = %id))]
    async fn find_seller_profile(&self, id: Uuid) -> Result<Option<SellerProfile>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["find_seller_profile"])
            .start_timer();

        let profile = sqlx::query_as::<_, SellerProfile>(
            r#"
            SELECT seller_profile_id, organization_id, name, tax_id_encrypted, regon, krs,
                bank_name, bank_account, street, building_number, apartment_number,
                postal_code, city, country, default_currency, default_payment_term_days
            FROM seller_profiles
            WHERE seller_profile_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to get seller profile: {}", e))
        })?;

        timer.observe_duration();

        Ok(profile)
    }

    #[instrument(skip(self), fields(contractor_id = %id))]
    async fn find_contractor(&self, id: Uuid) -> Result<Option<Contractor>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["find_contractor"])
            .start_timer();

        let contractor = sqlx::query_as::<_, Contractor>(
            r#"
            SELECT contractor_id, organization_id, contractor_type, name, tax_id_encrypted,
                pesel_encrypted, street, building_number, apartment_number, postal_code,
                city, country, email, phone, favorite
            FROM contractors
            WHERE contractor_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to get contractor: {}", e))
        })?;

        timer.observe_duration();

        Ok(contractor)
    }

    #[instrument(skip(self), fields(organization_id = %organization_id))]
    async fn count_invoices_by_issue_date(
        &self,
        organization_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<i64, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["count_invoices_by_issue_date"])
            .start_timer();

        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM invoices
            WHERE organization_id = $1
              AND issue_date >= $2
              AND issue_date <= $3
            "#,
        )
        .bind(organization_id)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to count invoices: {}", e))
        })?;

        timer.observe_duration();

        Ok(count)
    }

    #[instrument(
        skip(self, invoice, items),
        fields(organization_id = %invoice.organization_id, number = %invoice.number)
    )]
    async fn save_invoice(
        &self,
        invoice: &Invoice,
        items: &[InvoiceItem],
    ) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["save_invoice"])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let insert_invoice = format!(
            "INSERT INTO invoices ({INVOICE_COLUMNS}) VALUES \
             ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, \
              $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30, $31, $32, $33, $34, \
              $35, $36)"
        );

        sqlx::query(&insert_invoice)
            .bind(invoice.invoice_id)
            .bind(invoice.organization_id)
            .bind(invoice.seller_profile_id)
            .bind(invoice.contractor_id)
            .bind(&invoice.number)
            .bind(&invoice.status)
            .bind(invoice.issue_date)
            .bind(invoice.sale_date)
            .bind(invoice.due_date)
            .bind(&invoice.payment_method)
            .bind(&invoice.currency)
            .bind(&invoice.seller_name)
            .bind(&invoice.seller_tax_id_encrypted)
            .bind(&invoice.seller_street)
            .bind(&invoice.seller_building_number)
            .bind(&invoice.seller_apartment_number)
            .bind(&invoice.seller_postal_code)
            .bind(&invoice.seller_city)
            .bind(&invoice.seller_country)
            .bind(&invoice.seller_bank_account)
            .bind(&invoice.buyer_name)
            .bind(&invoice.buyer_tax_id_encrypted)
            .bind(&invoice.buyer_pesel_encrypted)
            .bind(&invoice.buyer_street)
            .bind(&invoice.buyer_building_number)
            .bind(&invoice.buyer_apartment_number)
            .bind(&invoice.buyer_postal_code)
            .bind(&invoice.buyer_city)
            .bind(&invoice.buyer_country)
            .bind(invoice.total_net)
            .bind(invoice.total_vat)
            .bind(invoice.total_gross)
            .bind(&invoice.notes)
            .bind(invoice.reverse_charge)
            .bind(invoice.split_payment)
            .bind(invoice.created_utc)
            .execute(&mut *tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                    AppError::Conflict(anyhow::anyhow!(
                        "Invoice number '{}' already exists for this organization",
                        invoice.number
                    ))
                }
                _ => AppError::DatabaseError(anyhow::anyhow!("Failed to save invoice: {}", e)),
            })?;

        let insert_item =
            format!("INSERT INTO invoice_items ({ITEM_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)");

        for item in items {
            sqlx::query(&insert_item)
                .bind(item.item_id)
                .bind(item.invoice_id)
                .bind(&item.description)
                .bind(item.quantity)
                .bind(&item.unit)
                .bind(item.net_unit_price)
                .bind(&item.vat_rate)
                .bind(item.net_total)
                .bind(item.vat_amount)
                .bind(item.gross_total)
                .bind(item.sort_order)
                .bind(item.created_utc)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(anyhow::anyhow!("Failed to save invoice item: {}", e))
                })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit invoice: {}", e))
        })?;

        timer.observe_duration();

        info!(invoice_id = %invoice.invoice_id, number = %invoice.number, "Invoice saved");

        Ok(())
    }

    #[instrument(skip(self), fields(invoice_id = %id))]
    async fn find_invoice(
        &self,
        id: Uuid,
    ) -> Result<Option<(Invoice, Vec<InvoiceItem>)>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["find_invoice"])
            .start_timer();

        let select_invoice =
            format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE invoice_id = $1");

        let invoice = sqlx::query_as::<_, Invoice>(&select_invoice)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get invoice: {}", e)))?;

        let Some(invoice) = invoice else {
            timer.observe_duration();
            return Ok(None);
        };

        let select_items = format!(
            "SELECT {ITEM_COLUMNS} FROM invoice_items WHERE invoice_id = $1 ORDER BY sort_order, created_utc"
        );

        let items = sqlx::query_as::<_, InvoiceItem>(&select_items)
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to get invoice items: {}", e))
            })?;

        timer.observe_duration();

        Ok(Some((invoice, items)))
    }

    #[instrument(skip(self), fields(organization_id = %organization_id))]
    async fn list_invoices(
        &self,
        organization_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        limit: i64,
    ) -> Result<Vec<Invoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_invoices"])
            .start_timer();

        let limit = limit.clamp(1, 100);

        let select = format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices \
             WHERE organization_id = $1 \
               AND ($2::date IS NULL OR issue_date >= $2) \
               AND ($3::date IS NULL OR issue_date <= $3) \
             ORDER BY issue_date DESC, number DESC \
             LIMIT $4"
        );

        let invoices = sqlx::query_as::<_, Invoice>(&select)
            .bind(organization_id)
            .bind(from)
            .bind(to)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to list invoices: {}", e))
            })?;

        timer.observe_duration();

        Ok(invoices)
    }

    #[instrument(skip(self), fields(invoice_id = %id))]
    async fn delete_invoice(&self, id: Uuid) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_invoice"])
            .start_timer();

        // invoice_items rows go with the invoice via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM invoices WHERE invoice_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete invoice: {}", e))
            })?;

        timer.observe_duration();

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(invoice_id = %id, "Invoice deleted");
        }

        Ok(deleted)
    }
}
