//! Local filesystem backend.

use std::io;

use async_trait::async_trait;
use seedcheck_core::{FileMetadata, RemoteFileStat, StatError, StatResult};

/// Stats paths on the machine running the reconciler.
///
/// Useful when the download directory is mounted locally.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileStat;

impl LocalFileStat {
    /// Construct the backend.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RemoteFileStat for LocalFileStat {
    async fn stat(&self, path: &str) -> StatResult<FileMetadata> {
        match tokio::fs::metadata(path).await {
            Ok(metadata) => Ok(FileMetadata {
                size: metadata.len(),
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(StatError::not_found(path)),
            Err(err) => Err(StatError::transport(path, err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};
    use std::fs;

    #[tokio::test]
    async fn reports_size_of_existing_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let file = dir.path().join("a.iso");
        fs::write(&file, vec![0_u8; 42])?;
        let path = file.to_str().context("temp path is not utf-8")?;

        let metadata = LocalFileStat::new().stat(path).await?;
        assert_eq!(metadata.size, 42);
        Ok(())
    }

    #[tokio::test]
    async fn absent_path_is_not_found() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let missing = dir.path().join("gone.bin");
        let path = missing.to_str().context("temp path is not utf-8")?;

        let err = LocalFileStat::new()
            .stat(path)
            .await
            .err()
            .context("expected stat to fail")?;
        assert!(err.is_not_found());
        assert_eq!(err.detail(), format!("{path}: not found"));
        Ok(())
    }

    #[tokio::test]
    async fn directories_count_as_present() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().to_str().context("temp path is not utf-8")?;
        assert!(LocalFileStat::new().stat(path).await.is_ok());
        Ok(())
    }
}
