//! Collaborator traits implemented by torrent sources and remote filesystem backends.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{SourceResult, StatResult};
use crate::model::{FileMetadata, TorrentRecord};

/// Download manager endpoint able to report every torrent it currently tracks.
#[async_trait]
pub trait TorrentSource: Send + Sync {
    /// Fetch the full snapshot in one call; there is no pagination.
    async fn fetch_all(&self) -> SourceResult<Vec<TorrentRecord>>;
}

/// Filesystem capable of reporting a file's size by path.
#[async_trait]
pub trait RemoteFileStat: Send + Sync {
    /// Stat `path` on the filesystem the downstream consumer reads from.
    async fn stat(&self, path: &str) -> StatResult<FileMetadata>;
}

#[async_trait]
impl<T> TorrentSource for Arc<T>
where
    T: TorrentSource + ?Sized,
{
    async fn fetch_all(&self) -> SourceResult<Vec<TorrentRecord>> {
        (**self).fetch_all().await
    }
}

#[async_trait]
impl<T> RemoteFileStat for Arc<T>
where
    T: RemoteFileStat + ?Sized,
{
    async fn stat(&self, path: &str) -> StatResult<FileMetadata> {
        (**self).stat(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StatError;

    struct FixedStat;

    #[async_trait]
    impl RemoteFileStat for FixedStat {
        async fn stat(&self, path: &str) -> StatResult<FileMetadata> {
            if path.ends_with("missing") {
                return Err(StatError::not_found(path));
            }
            Ok(FileMetadata { size: 42 })
        }
    }

    #[tokio::test]
    async fn arc_wrapped_stat_delegates() {
        let shared: Arc<dyn RemoteFileStat> = Arc::new(FixedStat);
        let found = shared.stat("/data/a").await.map(|meta| meta.size);
        assert_eq!(found.ok(), Some(42));
        assert!(
            shared
                .stat("/data/missing")
                .await
                .is_err_and(|err| err.is_not_found())
        );
    }
}
