//! Builders for torrent snapshots.

use seedcheck_core::{FileEntry, FileStatEntry, TorrentRecord};

/// Start a torrent rooted at `download_dir`.
#[must_use]
pub fn torrent(download_dir: &str) -> TorrentBuilder {
    TorrentBuilder {
        record: TorrentRecord {
            id: None,
            name: None,
            download_dir: download_dir.to_string(),
            files: Vec::new(),
            file_stats: Vec::new(),
            file_count: 0,
        },
    }
}

/// Incrementally assembles a well-formed [`TorrentRecord`].
#[derive(Debug, Clone)]
pub struct TorrentBuilder {
    record: TorrentRecord,
}

impl TorrentBuilder {
    /// Set the engine identifier.
    #[must_use]
    pub fn id(mut self, id: i64) -> Self {
        self.record.id = Some(id);
        self
    }

    /// Set the display name.
    #[must_use]
    pub fn named(mut self, name: &str) -> Self {
        self.record.name = Some(name.to_string());
        self
    }

    /// Add a file both counters report as fully written.
    #[must_use]
    pub fn complete(self, name: &str, length: u64) -> Self {
        self.file(name, length, length, length)
    }

    /// Add a file the engine is still downloading.
    #[must_use]
    pub fn partial(self, name: &str, length: u64, bytes_completed: u64) -> Self {
        self.file(name, length, bytes_completed, bytes_completed)
    }

    /// Add a file with explicit engine and stat counters.
    #[must_use]
    pub fn file(
        mut self,
        name: &str,
        length: u64,
        bytes_completed: u64,
        stat_bytes_completed: u64,
    ) -> Self {
        self.record.files.push(FileEntry {
            name: name.to_string(),
            length,
            bytes_completed,
        });
        self.record.file_stats.push(FileStatEntry {
            bytes_completed: stat_bytes_completed,
            wanted: true,
            priority: 0,
        });
        self.record.file_count += 1;
        self
    }

    /// Mark the most recently added file as not wanted.
    #[must_use]
    pub fn unwanted(mut self) -> Self {
        if let Some(stat) = self.record.file_stats.last_mut() {
            stat.wanted = false;
        }
        self
    }

    /// Override the declared file count without touching the sequences.
    #[must_use]
    pub fn declared_count(mut self, file_count: usize) -> Self {
        self.record.file_count = file_count;
        self
    }

    /// Finish the record.
    #[must_use]
    pub fn build(self) -> TorrentRecord {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_sequences_aligned() {
        let record = torrent("/data")
            .id(3)
            .named("distro")
            .complete("a.iso", 10)
            .partial("b.iso", 10, 4)
            .unwanted()
            .build();
        assert_eq!(record.file_count, 2);
        assert_eq!(record.files.len(), record.file_stats.len());
        assert!(record.file_stats[0].wanted);
        assert!(!record.file_stats[1].wanted);
        assert_eq!(record.files[1].bytes_completed, 4);
        assert!(record.shape_mismatch().is_none());
    }

    #[test]
    fn declared_count_produces_malformed_record() {
        let record = torrent("/data").complete("a", 1).declared_count(3).build();
        assert_eq!(record.shape_mismatch(), Some(("files", 1)));
    }
}
