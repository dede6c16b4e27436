//! Postal address value type.

use serde::{Deserialize, Serialize};

/// Address snapshot used on seller profiles, contractors and invoices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub building_number: Option<String>,
    pub apartment_number: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}
