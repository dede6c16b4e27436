//! Contractor model: a buyer-side counterparty within an organization.

use crate::models::Address;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Contractor record. Tax ID and PESEL are stored encrypted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Contractor {
    pub contractor_id: Uuid,
    pub organization_id: Uuid,
    pub contractor_type: String,
    pub name: String,
    pub tax_id_encrypted: Option<String>,
    pub pesel_encrypted: Option<String>,
    pub street: Option<String>,
    pub building_number: Option<String>,
    pub apartment_number: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub favorite: bool,
}

impl Contractor {
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
