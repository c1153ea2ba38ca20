//! Delivery driver record.

use super::EntityId;
use serde::{Deserialize, Serialize};

/// Delivery driver ("repartidor") and the vehicle plate they drive under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    pub id: EntityId,
    pub name: String,
    pub phone: String,
    pub license_plate: String,
}

impl Driver {
    pub fn new(
        id: EntityId,
        name: impl Into<String>,
        phone: impl Into<String>,
        license_plate: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            phone: phone.into(),
            license_plate: license_plate.into(),
        }
    }
}
