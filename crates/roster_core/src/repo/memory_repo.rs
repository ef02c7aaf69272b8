//! In-memory record repository.
//!
//! # Responsibility
//! - Provide a dependency-free `RecordRepository` for tests and local runs.
//!
//! # Invariants
//! - Ordering and cursor semantics match `SqliteRecordRepository`.
//! - Stored records are cloned in and out; callers never alias store state.

use crate::model::collection::Collection;
use crate::model::record::{Record, RecordId};
use crate::repo::record_repo::{RecordRepository, RepoError, RepoResult, TitleQuery};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

/// `RwLock`-guarded map of collections to id-keyed records.
#[derive(Debug, Default)]
pub struct MemoryRecordRepository {
    collections: RwLock<HashMap<Collection, BTreeMap<RecordId, Record>>>,
}

impl MemoryRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently stored in `collection`.
    pub fn len(&self, collection: Collection) -> RepoResult<usize> {
        let collections = self.collections.read().map_err(|_| RepoError::LockPoisoned)?;
        Ok(collections.get(&collection).map_or(0, BTreeMap::len))
    }

    pub fn is_empty(&self, collection: Collection) -> RepoResult<bool> {
        Ok(self.len(collection)? == 0)
    }
}

impl RecordRepository for MemoryRecordRepository {
    fn put(&self, collection: Collection, record: &Record) -> RepoResult<()> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| RepoError::LockPoisoned)?;
        collections
            .entry(collection)
            .or_default()
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn get(&self, collection: Collection, id: &str) -> RepoResult<Option<Record>> {
        let collections = self.collections.read().map_err(|_| RepoError::LockPoisoned)?;
        Ok(collections
            .get(&collection)
            .and_then(|records| records.get(id))
            .cloned())
    }

    fn delete(&self, collection: Collection, id: &str) -> RepoResult<()> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| RepoError::LockPoisoned)?;
        if let Some(records) = collections.get_mut(&collection) {
            records.remove(id);
        }
        Ok(())
    }

    fn query_by_title(
        &self,
        collection: Collection,
        query: &TitleQuery,
    ) -> RepoResult<Vec<Record>> {
        let collections = self.collections.read().map_err(|_| RepoError::LockPoisoned)?;
        let Some(records) = collections.get(&collection) else {
            return Ok(Vec::new());
        };

        let mut matching = records
            .values()
            .filter(|record| match query.start_after.as_deref() {
                Some(cursor) => record.title.as_str() > cursor,
                None => true,
            })
            .collect::<Vec<_>>();
        // BTreeMap iteration already yields id order, so a stable sort on
        // title gives `title ASC, id ASC`.
        matching.sort_by(|left, right| left.title.cmp(&right.title));

        Ok(matching
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .cloned()
            .collect())
    }
}
