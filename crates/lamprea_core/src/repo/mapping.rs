//! Table bindings for the directory records.

use crate::model::agent::Agent;
use crate::model::client::{Client, ClientDetail};
use crate::model::driver::Driver;
use crate::model::EntityId;
use crate::repo::table::TableEntity;
use rusqlite::types::Value;
use rusqlite::Row;

impl TableEntity for Client {
    const TABLE: &'static str = "clients";
    const COLUMNS: &'static [&'static str] = &["name", "email"];
    const SEARCH_COLUMNS: &'static [&'static str] = &["name", "email"];

    fn id(&self) -> EntityId {
        self.id
    }

    fn column_values(&self) -> Vec<Value> {
        vec![text(&self.name), text(&self.email)]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            email: row.get("email")?,
        })
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str()]
    }
}

impl TableEntity for ClientDetail {
    const TABLE: &'static str = "client_details";
    const COLUMNS: &'static [&'static str] = &["address", "phone", "notes"];
    const SEARCH_COLUMNS: &'static [&'static str] = &["address", "phone", "notes"];

    fn id(&self) -> EntityId {
        self.id
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            optional_text(self.address.as_deref()),
            optional_text(self.phone.as_deref()),
            optional_text(self.notes.as_deref()),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            address: row.get("address")?,
            phone: row.get("phone")?,
            notes: row.get("notes")?,
        })
    }

    fn search_fields(&self) -> Vec<&str> {
        [&self.address, &self.phone, &self.notes]
            .into_iter()
            .filter_map(|value| value.as_deref())
            .collect()
    }
}

impl TableEntity for Agent {
    const TABLE: &'static str = "agents";
    const COLUMNS: &'static [&'static str] = &["name", "email", "phone"];
    const SEARCH_COLUMNS: &'static [&'static str] = &["name", "email", "phone"];

    fn id(&self) -> EntityId {
        self.id
    }

    fn column_values(&self) -> Vec<Value> {
        vec![text(&self.name), text(&self.email), text(&self.phone)]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            email: row.get("email")?,
            phone: row.get("phone")?,
        })
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str(), self.phone.as_str()]
    }
}

impl TableEntity for Driver {
    const TABLE: &'static str = "drivers";
    const COLUMNS: &'static [&'static str] = &["name", "phone", "license_plate"];
    const SEARCH_COLUMNS: &'static [&'static str] = &["name", "phone", "license_plate"];

    fn id(&self) -> EntityId {
        self.id
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            text(&self.name),
            text(&self.phone),
            text(&self.license_plate),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            phone: row.get("phone")?,
            license_plate: row.get("license_plate")?,
        })
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.phone.as_str(),
            self.license_plate.as_str(),
        ]
    }
}

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

fn optional_text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, text)
}
