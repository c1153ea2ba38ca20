//! Front-end facade over one directory repository.
//!
//! # Invariants
//! - Blank search text lists everything instead of matching every row
//!   through the store.
//! - The in-memory filter matches exactly the fields the SQL search matches.

use crate::db::contains_folded;
use crate::model::EntityId;
use crate::repo::entity_repo::{EntityRepository, RepoResult};
use crate::repo::table::TableEntity;
use std::marker::PhantomData;

/// Use-case service wrapper for one record type.
pub struct EntityService<E, R> {
    repo: R,
    _entity: PhantomData<fn() -> E>,
}

impl<E: TableEntity, R: EntityRepository<E>> EntityService<E, R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            _entity: PhantomData,
        }
    }

    pub fn create(&self, entity: &E) -> RepoResult<()> {
        self.repo.insert(entity)
    }

    pub fn get(&self, id: EntityId) -> RepoResult<Option<E>> {
        self.repo.find_by_id(id)
    }

    pub fn list(&self) -> RepoResult<Vec<E>> {
        self.repo.find_all()
    }

    /// Returns `true` when a row with `entity.id` existed and was rewritten.
    pub fn update(&self, entity: &E) -> RepoResult<bool> {
        Ok(self.repo.update(entity)? > 0)
    }

    /// Returns `true` when a row was removed.
    pub fn delete(&self, id: EntityId) -> RepoResult<bool> {
        Ok(self.repo.delete_by_id(id)? > 0)
    }

    /// Searches with trimmed text; blank text returns the full list.
    pub fn search(&self, text: &str) -> RepoResult<Vec<E>> {
        let text = text.trim();
        if text.is_empty() {
            return self.repo.find_all();
        }
        self.repo.search(text)
    }

    pub fn count(&self) -> RepoResult<u64> {
        self.repo.count()
    }
}

/// Filters an already loaded list the way [`EntityService::search`] filters rows.
pub fn filter_in_memory<E: TableEntity + Clone>(items: &[E], text: &str) -> Vec<E> {
    let text = text.trim();
    if text.is_empty() {
        return items.to_vec();
    }

    items
        .iter()
        .filter(|item| {
            contains_folded(&item.id().to_string(), text)
                || item
                    .search_fields()
                    .into_iter()
                    .any(|field| contains_folded(field, text))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::filter_in_memory;
    use crate::model::agent::Agent;

    fn agents() -> Vec<Agent> {
        vec![
            Agent::new(1, "Ana Ruiz", "ana@lamprea.es", "600100100"),
            Agent::new(12, "Bruno Gil", "bruno@lamprea.es", "600200200"),
            Agent::new(30, "Carla Peña", "carla@ventas.es", "611300300"),
        ]
    }

    #[test]
    fn filter_matches_text_fields_ignoring_case() {
        let hits = filter_in_memory(&agents(), "PEÑA");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 30);
    }

    #[test]
    fn filter_matches_id_digits() {
        let hits = filter_in_memory(&agents(), "12");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 12);
    }

    #[test]
    fn filter_matches_any_field_of_several_rows() {
        let ids: Vec<_> = filter_in_memory(&agents(), "@lamprea")
            .into_iter()
            .map(|agent| agent.id)
            .collect();
        assert_eq!(ids, vec![1, 12]);
    }

    #[test]
    fn blank_filter_keeps_everything() {
        assert_eq!(filter_in_memory(&agents(), "   ").len(), 3);
    }
}
