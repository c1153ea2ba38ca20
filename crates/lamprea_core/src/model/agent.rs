//! Commercial agent record.

use super::EntityId;
use serde::{Deserialize, Serialize};

/// Sales agent ("comercial") working a set of client accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl Agent {
    pub fn new(
        id: EntityId,
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }
}
