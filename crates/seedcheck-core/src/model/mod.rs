//! Torrent snapshot DTOs consumed by the reconciler.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// One torrent as reported by the download manager.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TorrentRecord {
    /// Engine-assigned identifier, when the source exposes one.
    #[serde(default)]
    pub id: Option<i64>,
    /// Human-readable torrent name, when known.
    #[serde(default)]
    pub name: Option<String>,
    /// Absolute base directory under which every constituent file is rooted.
    pub download_dir: String,
    /// Static description of each constituent file.
    pub files: Vec<FileEntry>,
    /// Runtime counters for each file, index-aligned with `files`.
    pub file_stats: Vec<FileStatEntry>,
    /// Number of files the engine claims the torrent holds.
    pub file_count: usize,
}

impl TorrentRecord {
    /// Label used in logs and diagnostics: the name, else the id, else the download directory.
    #[must_use]
    pub fn label(&self) -> String {
        match (&self.name, self.id) {
            (Some(name), _) => name.clone(),
            (None, Some(id)) => format!("#{id}"),
            (None, None) => self.download_dir.clone(),
        }
    }

    /// Report the first length disagreement between `file_count`, `files` and `file_stats`.
    ///
    /// Returns `(field, actual_len)` naming the sequence whose length differs from `file_count`.
    #[must_use]
    pub fn shape_mismatch(&self) -> Option<(&'static str, usize)> {
        if self.files.len() != self.file_count {
            return Some(("files", self.files.len()));
        }
        if self.file_stats.len() != self.file_count {
            return Some(("file_stats", self.file_stats.len()));
        }
        None
    }
}

/// Expected description of a single file within a torrent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileEntry {
    /// Path relative to the torrent's download directory.
    pub name: String,
    /// Authoritative size of the file in bytes.
    pub length: u64,
    /// Bytes the engine has written for this file.
    pub bytes_completed: u64,
}

impl FileEntry {
    /// Whether the engine's own counter reports the file as fully written.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.bytes_completed == self.length
    }
}

/// Per-file runtime counters, index-aligned with [`FileEntry`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileStatEntry {
    /// Independently tracked completion counter.
    pub bytes_completed: u64,
    /// Whether the engine is configured to download this file.
    pub wanted: bool,
    /// Engine priority for the file (`-1` low, `0` normal, `1` high).
    #[serde(default)]
    pub priority: i8,
}

/// Metadata returned by a remote stat call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileMetadata {
    /// Size of the remote file in bytes.
    pub size: u64,
}

/// Remote path that passed every verification stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct VerifiedFile(String);

impl VerifiedFile {
    /// Wrap an already-joined remote path.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Borrow the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the path.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for VerifiedFile {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl AsRef<str> for VerifiedFile {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Join a remote base directory and a relative file name using POSIX separators.
///
/// The result is lexically cleaned: repeated separators and `.` segments are dropped and `..`
/// segments consume their parent (never climbing above the root of an absolute path).
#[must_use]
pub fn join_remote(base: &str, name: &str) -> String {
    let absolute = base.starts_with('/') || (base.is_empty() && name.starts_with('/'));
    let mut segments: Vec<&str> = Vec::new();
    for segment in base.split('/').chain(name.split('/')) {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(file_count: usize, files: usize, stats: usize) -> TorrentRecord {
        TorrentRecord {
            id: Some(7),
            name: None,
            download_dir: "/data".to_string(),
            files: (0..files)
                .map(|index| FileEntry {
                    name: format!("f{index}"),
                    length: 1,
                    bytes_completed: 1,
                })
                .collect(),
            file_stats: (0..stats)
                .map(|_| FileStatEntry {
                    bytes_completed: 1,
                    wanted: true,
                    priority: 0,
                })
                .collect(),
            file_count,
        }
    }

    #[test]
    fn join_remote_concatenates_and_cleans() {
        assert_eq!(join_remote("/data", "a.iso"), "/data/a.iso");
        assert_eq!(join_remote("/data/", "dir//b.mkv"), "/data/dir/b.mkv");
        assert_eq!(join_remote("/data", "./x/../y"), "/data/y");
        assert_eq!(join_remote("/data", "/abs"), "/data/abs");
        assert_eq!(join_remote("/", "../../etc"), "/etc");
        assert_eq!(join_remote("temp", "a"), "temp/a");
        assert_eq!(join_remote("temp", "../../a"), "../a");
        assert_eq!(join_remote("", ""), ".");
    }

    #[test]
    fn shape_mismatch_reports_first_disagreeing_sequence() {
        assert_eq!(record(2, 2, 2).shape_mismatch(), None);
        assert_eq!(record(2, 1, 2).shape_mismatch(), Some(("files", 1)));
        assert_eq!(record(2, 2, 3).shape_mismatch(), Some(("file_stats", 3)));
    }

    #[test]
    fn label_prefers_name_then_id() {
        let mut torrent = record(0, 0, 0);
        assert_eq!(torrent.label(), "#7");
        torrent.id = None;
        assert_eq!(torrent.label(), "/data");
        torrent.name = Some("debian".to_string());
        assert_eq!(torrent.label(), "debian");
    }

    #[test]
    fn verified_file_exposes_plain_path() {
        let file = VerifiedFile::new("/data/a.iso");
        assert_eq!(file.to_string(), "/data/a.iso");
        assert_eq!(file.as_str(), "/data/a.iso");
        assert_eq!(file.into_inner(), "/data/a.iso");
    }
}
