//! Record repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide set/get/delete/ordered-query APIs over the `records` table.
//! - Keep SQL and JSON body encoding inside the persistence boundary.
//!
//! # Invariants
//! - `put` overwrites the whole document stored under `(collection, id)`.
//! - `delete` of a missing id is a no-op.
//! - Read paths reject corrupt persisted bodies instead of masking them.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::collection::Collection;
use crate::model::record::{Record, RecordId};
use log::debug;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex};

const REQUIRED_RECORD_COLUMNS: &[&str] = &["collection", "id", "title", "body"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for record persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound {
        collection: Collection,
        id: RecordId,
    },
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    LockPoisoned,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { collection, id } => {
                write!(f, "record not found: {collection}/{id}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it through db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
            Self::LockPoisoned => write!(f, "record store lock poisoned"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Cursor query over one collection ordered by `title ASC, id ASC`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleQuery {
    /// Only titles strictly greater than this value are returned.
    pub start_after: Option<String>,
    /// Number of matching rows to skip after the cursor.
    pub offset: u32,
    /// Maximum rows to return.
    pub limit: u32,
}

/// Document store contract for record collections.
///
/// Implementations must be shareable across request handlers.
pub trait RecordRepository: Send + Sync {
    /// Stores `record` under `(collection, record.id)`, replacing any previous
    /// document with that id.
    fn put(&self, collection: Collection, record: &Record) -> RepoResult<()>;
    /// Loads one record, `None` when the id is unknown.
    fn get(&self, collection: Collection, id: &str) -> RepoResult<Option<Record>>;
    /// Removes one record. Unknown ids are ignored.
    fn delete(&self, collection: Collection, id: &str) -> RepoResult<()>;
    /// Runs an ordered cursor query.
    fn query_by_title(&self, collection: Collection, query: &TitleQuery)
        -> RepoResult<Vec<Record>>;
}

impl<T: RecordRepository + ?Sized> RecordRepository for Arc<T> {
    fn put(&self, collection: Collection, record: &Record) -> RepoResult<()> {
        (**self).put(collection, record)
    }

    fn get(&self, collection: Collection, id: &str) -> RepoResult<Option<Record>> {
        (**self).get(collection, id)
    }

    fn delete(&self, collection: Collection, id: &str) -> RepoResult<()> {
        (**self).delete(collection, id)
    }

    fn query_by_title(
        &self,
        collection: Collection,
        query: &TitleQuery,
    ) -> RepoResult<Vec<Record>> {
        (**self).query_by_title(collection, query)
    }
}

/// SQLite-backed record repository.
///
/// Owns its connection so one instance can be shared between threads.
pub struct SqliteRecordRepository {
    conn: Mutex<Connection>,
}

impl SqliteRecordRepository {
    /// Wraps a connection returned by `db::open_db` / `db::open_db_in_memory`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` on schema drift.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        ensure_connection_ready(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> RepoResult<T>) -> RepoResult<T> {
        let conn = self.conn.lock().map_err(|_| RepoError::LockPoisoned)?;
        f(&conn)
    }
}

impl RecordRepository for SqliteRecordRepository {
    fn put(&self, collection: Collection, record: &Record) -> RepoResult<()> {
        let body = serde_json::to_string(record).map_err(|err| {
            RepoError::InvalidData(format!("failed to encode record `{}`: {err}", record.id))
        })?;

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO records (collection, id, title, body)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (collection, id) DO UPDATE SET
                    title = excluded.title,
                    body = excluded.body;",
                params![
                    collection.name(),
                    record.id.as_str(),
                    record.title.as_str(),
                    body
                ],
            )?;
            Ok(())
        })
    }

    fn get(&self, collection: Collection, id: &str) -> RepoResult<Option<Record>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, body
                 FROM records
                 WHERE collection = ?1 AND id = ?2;",
            )?;

            let mut rows = stmt.query(params![collection.name(), id])?;
            if let Some(row) = rows.next()? {
                return Ok(Some(parse_record_row(row)?));
            }

            Ok(None)
        })
    }

    fn delete(&self, collection: Collection, id: &str) -> RepoResult<()> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "DELETE FROM records WHERE collection = ?1 AND id = ?2;",
                params![collection.name(), id],
            )?;
            debug!(
                "event=record_delete module=repo status=ok collection={collection} removed={changed}"
            );
            Ok(())
        })
    }

    fn query_by_title(
        &self,
        collection: Collection,
        query: &TitleQuery,
    ) -> RepoResult<Vec<Record>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, body
                 FROM records
                 WHERE collection = ?1
                   AND (?2 IS NULL OR title > ?2)
                 ORDER BY title ASC, id ASC
                 LIMIT ?3 OFFSET ?4;",
            )?;

            let mut rows = stmt.query(params![
                collection.name(),
                query.start_after.as_deref(),
                i64::from(query.limit),
                i64::from(query.offset),
            ])?;

            let mut records = Vec::new();
            while let Some(row) = rows.next()? {
                records.push(parse_record_row(row)?);
            }

            Ok(records)
        })
    }
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<Record> {
    let id: String = row.get("id")?;
    let body: String = row.get("body")?;

    let record: Record = serde_json::from_str(&body).map_err(|err| {
        RepoError::InvalidData(format!("invalid body for record `{id}` in records.body: {err}"))
    })?;

    if record.id != id {
        return Err(RepoError::InvalidData(format!(
            "record body id `{}` does not match records.id `{id}`",
            record.id
        )));
    }

    Ok(record)
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "records")? {
        return Err(RepoError::MissingRequiredTable("records"));
    }

    for &column in REQUIRED_RECORD_COLUMNS {
        if !table_has_column(conn, "records", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "records",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
