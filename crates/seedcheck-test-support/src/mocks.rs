//! In-memory collaborators for exercising the reconciler without a network.

use std::collections::HashMap;
use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use seedcheck_core::{
    CancelToken, FileMetadata, RemoteFileStat, SourceError, SourceResult, StatError, StatResult,
    TorrentRecord, TorrentSource,
};

#[derive(Debug, Clone)]
enum Entry {
    File(u64),
    Broken(String),
}

/// Stat backend backed by a path -> size map. Unknown paths are not found.
#[derive(Debug, Default)]
pub struct MemoryFileStat {
    entries: HashMap<String, Entry>,
    delay: Option<Duration>,
    cancel_after: Option<(usize, CancelToken)>,
    queries: Mutex<Vec<String>>,
}

impl MemoryFileStat {
    /// Empty filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file of `size` bytes at `path`.
    #[must_use]
    pub fn with_file(mut self, path: &str, size: u64) -> Self {
        self.entries.insert(path.to_string(), Entry::File(size));
        self
    }

    /// Make stats of `path` fail with a transport error carrying `message`.
    #[must_use]
    pub fn with_failure(mut self, path: &str, message: &str) -> Self {
        self.entries
            .insert(path.to_string(), Entry::Broken(message.to_string()));
        self
    }

    /// Sleep before answering every stat.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Raise `token` once `count` stats have been answered.
    #[must_use]
    pub fn cancel_after(mut self, count: usize, token: CancelToken) -> Self {
        self.cancel_after = Some((count, token));
        self
    }

    /// Paths queried so far, in call order.
    #[must_use]
    pub fn queried(&self) -> Vec<String> {
        self.queries().clone()
    }

    fn queries(&self) -> MutexGuard<'_, Vec<String>> {
        self.queries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RemoteFileStat for MemoryFileStat {
    async fn stat(&self, path: &str) -> StatResult<FileMetadata> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let answered = {
            let mut queries = self.queries();
            queries.push(path.to_string());
            queries.len()
        };
        if let Some((count, token)) = &self.cancel_after
            && answered >= *count
        {
            token.cancel();
        }
        match self.entries.get(path) {
            Some(Entry::File(size)) => Ok(FileMetadata { size: *size }),
            Some(Entry::Broken(message)) => {
                Err(StatError::transport(path, io::Error::other(message.clone())))
            }
            None => Err(StatError::not_found(path)),
        }
    }
}

/// Source that always returns the same snapshot.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    torrents: Vec<TorrentRecord>,
}

impl StaticSource {
    /// Serve `torrents` on every fetch.
    #[must_use]
    pub const fn new(torrents: Vec<TorrentRecord>) -> Self {
        Self { torrents }
    }
}

#[async_trait]
impl TorrentSource for StaticSource {
    async fn fetch_all(&self) -> SourceResult<Vec<TorrentRecord>> {
        Ok(self.torrents.clone())
    }
}

/// Source whose every fetch fails with a transport error.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingSource;

#[async_trait]
impl TorrentSource for FailingSource {
    async fn fetch_all(&self) -> SourceResult<Vec<TorrentRecord>> {
        Err(SourceError::transport(
            "torrent_get",
            io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
        ))
    }
}
