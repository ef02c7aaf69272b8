//! Filesystem-backed image store.

use super::{ImageResult, ImageStore, ImageUpload};
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

static UNSAFE_FILE_NAME_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("valid file name regex"));

const FALLBACK_FILE_NAME: &str = "image";

/// Writes uploads into one directory and serves them under a URL prefix.
///
/// Object names are `<epoch millis>-<sanitized client file name>`.
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalImageStore {
    /// Creates a store writing into `root`; URLs are `<public_base_url>/<name>`.
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ImageStore for LocalImageStore {
    fn upload(&self, upload: &ImageUpload) -> ImageResult<String> {
        upload.validate()?;

        std::fs::create_dir_all(&self.root)?;
        let object_name = format!("{}-{}", epoch_millis(), sanitize_file_name(&upload.file_name));
        std::fs::write(self.root.join(&object_name), &upload.bytes)?;

        info!(
            "event=image_upload module=image status=ok bytes={} object={object_name}",
            upload.bytes.len()
        );
        Ok(format!("{}/{object_name}", self.public_base_url))
    }
}

fn sanitize_file_name(raw: &str) -> String {
    // Browsers may send a full client path; keep the last component only.
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned = UNSAFE_FILE_NAME_CHARS_RE.replace_all(base, "_");
    let cleaned = cleaned.trim_matches(|c: char| c == '.' || c == '_');
    if cleaned.is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

fn epoch_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{sanitize_file_name, LocalImageStore};
    use crate::image::{ImageError, ImageStore, ImageUpload};

    #[test]
    fn sanitize_file_name_strips_paths_and_unsafe_characters() {
        assert_eq!(sanitize_file_name("C:\\photos\\my cat.png"), "my_cat.png");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("..."), "image");
    }

    #[test]
    fn upload_writes_file_and_returns_public_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(dir.path().join("uploads"), "/uploads/");
        let upload = ImageUpload {
            file_name: "alpha.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        };

        let url = store.upload(&upload).unwrap();
        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with("-alpha.png"));

        let object_name = url.trim_start_matches("/uploads/");
        let stored = std::fs::read(store.root().join(object_name)).unwrap();
        assert_eq!(stored, vec![1, 2, 3]);
    }

    #[test]
    fn upload_rejects_non_images_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(dir.path(), "/uploads");
        let upload = ImageUpload {
            file_name: "notes.txt".to_string(),
            content_type: "text/plain".to_string(),
            bytes: vec![1],
        };

        let err = store.upload(&upload).unwrap_err();
        assert!(matches!(err, ImageError::UnsupportedContentType(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
