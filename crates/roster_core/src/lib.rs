//! Core domain logic for the roster service.
//! This crate owns the record model, the document store and the listing rules.

pub mod db;
pub mod image;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use image::{
    store_optional_image, ImageError, ImageStore, ImageUpload, LocalImageStore, MAX_IMAGE_BYTES,
};
pub use logging::{default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget};
pub use model::collection::Collection;
pub use model::record::{generate_record_id, Fields, Record, RecordId};
pub use repo::memory_repo::MemoryRecordRepository;
pub use repo::record_repo::{
    RecordRepository, RepoError, RepoResult, SqliteRecordRepository, TitleQuery,
};
pub use service::record_service::{RecordPage, RecordService, DEFAULT_PAGE_SIZE};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
