//! Local JSON catalog source.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::source::{parse_catalog, CatalogRecord, PhotoSource};
use crate::error::FetchError;

/// Reads the catalog from a JSON file on disk.
pub struct FilePhotoSource {
    path: PathBuf,
}

impl FilePhotoSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PhotoSource for FilePhotoSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch_catalog(&self) -> Result<Vec<CatalogRecord>, FetchError> {
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| FetchError::Io {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
        parse_catalog(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_reads_catalog_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": "x", "urls": {{"small": "s", "full": "f"}}, "category": "travel"}}]"#
        )
        .unwrap();

        let records = FilePhotoSource::new(file.path()).fetch_catalog().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category, "travel");
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FilePhotoSource::new(dir.path().join("missing.json"));
        let err = source.fetch_catalog().await.unwrap_err();
        assert_eq!(err.reason(), "io");
    }
}
