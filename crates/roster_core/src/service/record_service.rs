//! Record use-case service.
//!
//! # Responsibility
//! - Provide create/read/update/delete entry points for one collection.
//! - Own the cursor-based listing query shared by every resource.
//!
//! # Invariants
//! - Listing is ordered by `title` ascending and resumes strictly after the
//!   continuation token.
//! - `next_page_token` is only set when a record exists past the returned page.
//! - Update never changes the id a record is stored under.

use crate::model::collection::Collection;
use crate::model::record::{generate_record_id, Record, RecordId};
use crate::repo::record_repo::{RecordRepository, RepoError, RepoResult, TitleQuery};
use log::debug;
use serde::{Serialize, Serializer};

/// Page size used by both the API and the HTML listing.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// One page of a listing plus the cursor for the next one.
///
/// Serializes as `{"items": [...], "nextPageToken": "<title>" | false}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPage {
    /// Records sorted by `title ASC`.
    pub items: Vec<Record>,
    /// Title of the last item when more records follow.
    #[serde(serialize_with = "serialize_page_token")]
    pub next_page_token: Option<String>,
}

impl RecordPage {
    pub fn has_next_page(&self) -> bool {
        self.next_page_token.is_some()
    }
}

fn serialize_page_token<S: Serializer>(
    token: &Option<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match token {
        Some(value) => serializer.serialize_str(value),
        None => serializer.serialize_bool(false),
    }
}

/// Use-case service bound to a single collection.
pub struct RecordService<R: RecordRepository> {
    repo: R,
    collection: Collection,
}

impl<R: RecordRepository> RecordService<R> {
    /// Creates a service for `collection` over the provided repository.
    pub fn new(repo: R, collection: Collection) -> Self {
        Self { repo, collection }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    /// Lists up to `limit` records after `token`.
    ///
    /// # Contract
    /// - `limit == 0` falls back to `DEFAULT_PAGE_SIZE`.
    /// - `token = None` starts from the first record; `Some(title)` resumes
    ///   strictly after `title`.
    /// - A second probe query (offset `limit` from the same cursor) decides
    ///   whether `next_page_token` is set, so an exactly-full last page yields
    ///   `None`.
    pub fn list(&self, limit: u32, token: Option<&str>) -> RepoResult<RecordPage> {
        let limit = normalize_page_limit(limit);
        let start_after = token.map(str::to_string);

        let items = self.repo.query_by_title(
            self.collection,
            &TitleQuery {
                start_after: start_after.clone(),
                offset: 0,
                limit,
            },
        )?;

        if items.is_empty() {
            return Ok(RecordPage::default());
        }

        let probe = self.repo.query_by_title(
            self.collection,
            &TitleQuery {
                start_after,
                offset: limit,
                limit: 1,
            },
        )?;

        let next_page_token = if probe.is_empty() {
            None
        } else {
            items.last().map(|record| record.title.clone())
        };

        debug!(
            "event=record_list module=service status=ok collection={} count={} has_next={}",
            self.collection,
            items.len(),
            next_page_token.is_some()
        );

        Ok(RecordPage {
            items,
            next_page_token,
        })
    }

    /// Stores a new record, assigning an id when `record` carries none.
    pub fn create(&self, mut record: Record) -> RepoResult<Record> {
        if !record.has_id() {
            record.id = generate_record_id();
        }

        self.repo.put(self.collection, &record)?;
        debug!(
            "event=record_create module=service status=ok collection={}",
            self.collection
        );
        Ok(record)
    }

    /// Loads one record.
    ///
    /// # Errors
    /// - `RepoError::NotFound` when no record is stored under `id`.
    pub fn read(&self, id: &str) -> RepoResult<Record> {
        self.repo
            .get(self.collection, id)?
            .ok_or_else(|| RepoError::NotFound {
                collection: self.collection,
                id: id.to_string(),
            })
    }

    /// Replaces every field of the record stored under `id`.
    ///
    /// The stored id is always `id`; an id inside `record` is ignored. When
    /// nothing is stored under `id` yet the record is created there.
    pub fn update(&self, id: &str, mut record: Record) -> RepoResult<Record> {
        record.id = RecordId::from(id);
        self.repo.put(self.collection, &record)?;
        debug!(
            "event=record_update module=service status=ok collection={}",
            self.collection
        );
        Ok(record)
    }

    /// Removes the record stored under `id`; unknown ids are ignored.
    pub fn delete(&self, id: &str) -> RepoResult<()> {
        self.repo.delete(self.collection, id)
    }
}

/// Normalizes a listing limit; zero means "use the default".
pub fn normalize_page_limit(limit: u32) -> u32 {
    if limit == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        limit
    }
}
