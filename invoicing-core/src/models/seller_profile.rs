//! Seller profile model: the issuing party's billing identity.

use crate::models::Address;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Seller profile record. The tax identifier is stored encrypted; plaintext
/// only exists transiently on read paths that display it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SellerProfile {
    pub seller_profile_id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub tax_id_encrypted: String,
    pub regon: Option<String>,
    pub krs: Option<String>,
    pub bank_name: Option<String>,
    pub bank_account: Option<String>,
    pub street: Option<String>,
    pub building_number: Option<String>,
    pub apartment_number: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub default_currency: String,
    pub default_payment_term_days: i32,
}

impl SellerProfile {
    pub fn address(&self) -> Address {
        Address {
            street: self.street.clone(),
            building_number: self.building_number.clone(),
            apartment_number: self.apartment_number.clone(),
            postal_code: self.postal_code.clone(),
            city: self.city.clone(),
            country: self.country.clone(),
        }
    }
}
