//! Data core for the Lamprea distribution back office.
//! Clients, commercial agents and delivery drivers: storage, search,
//! transactional client saves and JSON export.

pub mod db;
pub mod export;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod settings;

pub use settings::{load_settings, parse_settings, ConfigError, DbConfig, Settings};
pub use db::{ConnectionProvider, DbError, SqliteConnectionProvider};
pub use export::{ExportError, ExportKind, Exporter};
pub use logging::{default_log_level, init_from_settings, init_logging, logging_status};
pub use model::agent::Agent;
pub use model::client::{Client, ClientDetail, ClientExportRecord, ClientWithDetail};
pub use model::driver::Driver;
pub use model::EntityId;
pub use repo::entity_repo::{
    AgentRepository, ClientDetailRepository, ClientRepository, DriverRepository,
    EntityRepository, ErrorKind, RepoError, RepoResult, SqliteRepository,
};
pub use repo::table::TableEntity;
pub use service::client_service::ClientService;
pub use service::entity_service::{filter_in_memory, EntityService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
