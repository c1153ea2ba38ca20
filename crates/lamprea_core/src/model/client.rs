//! Client record and its one-to-one detail.
//!
//! # Invariants
//! - `ClientDetail::id` is the owning client's id, never an identity of its own.
//! - A client without a detail is valid; the merged views expose the absent
//!   detail as `None` fields.

use super::EntityId;
use serde::{Deserialize, Serialize};

/// Customer account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: EntityId,
    pub name: String,
    pub email: String,
}

impl Client {
    pub fn new(id: EntityId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Optional contact/delivery data attached to one client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientDetail {
    /// Owning client id (one-to-one join key).
    pub id: EntityId,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

impl ClientDetail {
    /// Creates an empty detail for the given client.
    pub fn for_client(client_id: EntityId) -> Self {
        Self {
            id: client_id,
            ..Self::default()
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// A client joined with its detail, as read in one consistent snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientWithDetail {
    pub client: Client,
    pub detail: Option<ClientDetail>,
}

/// Flat client + detail row used by the JSON export.
///
/// Field order is the serialized key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientExportRecord {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

impl From<ClientWithDetail> for ClientExportRecord {
    fn from(value: ClientWithDetail) -> Self {
        let ClientWithDetail { client, detail } = value;
        let detail = detail.unwrap_or_default();
        Self {
            id: client.id,
            name: client.name,
            email: client.email,
            address: detail.address,
            phone: detail.phone,
            notes: detail.notes,
        }
    }
}
