//! RPC envelopes and per-torrent payloads as the daemon serialises them.

use serde::{Deserialize, Serialize};

use seedcheck_core::{FileEntry, FileStatEntry, SourceError, SourceResult, TorrentRecord};

/// Fields requested from `torrent-get`.
pub(crate) const TORRENT_FIELDS: [&str; 6] =
    ["id", "name", "downloadDir", "files", "fileStats", "fileCount"];

#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a> {
    pub(crate) method: &'static str,
    pub(crate) arguments: TorrentGetArguments<'a>,
    pub(crate) tag: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct TorrentGetArguments<'a> {
    pub(crate) fields: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse {
    pub(crate) result: String,
    #[serde(default)]
    pub(crate) arguments: Option<TorrentGetResult>,
    #[serde(default)]
    pub(crate) tag: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TorrentGetResult {
    #[serde(default)]
    pub(crate) torrents: Vec<WireTorrent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireTorrent {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    download_dir: Option<String>,
    #[serde(default)]
    files: Vec<WireFile>,
    #[serde(default)]
    file_stats: Vec<WireFileStat>,
    #[serde(default)]
    file_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireFile {
    name: String,
    length: u64,
    bytes_completed: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireFileStat {
    bytes_completed: u64,
    #[serde(default = "wanted_by_default")]
    wanted: bool,
    #[serde(default)]
    priority: i8,
}

const fn wanted_by_default() -> bool {
    true
}

impl WireTorrent {
    /// Convert into a snapshot record.
    ///
    /// Daemons that predate `fileCount` get `files.len()` as the declared count.
    pub(crate) fn into_record(self) -> SourceResult<TorrentRecord> {
        let download_dir = self.download_dir.ok_or_else(|| SourceError::Protocol {
            field: "downloadDir",
            reason: "torrent is missing its download directory",
            value: self.id.map(|id| id.to_string()),
        })?;
        let file_count = self.file_count.unwrap_or(self.files.len());
        Ok(TorrentRecord {
            id: self.id,
            name: self.name,
            download_dir,
            files: self
                .files
                .into_iter()
                .map(|file| FileEntry {
                    name: file.name,
                    length: file.length,
                    bytes_completed: file.bytes_completed,
                })
                .collect(),
            file_stats: self
                .file_stats
                .into_iter()
                .map(|stat| FileStatEntry {
                    bytes_completed: stat.bytes_completed,
                    wanted: stat.wanted,
                    priority: stat.priority,
                })
                .collect(),
            file_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn request_serialises_like_the_daemon_expects() -> Result<()> {
        let request = RpcRequest {
            method: "torrent-get",
            arguments: TorrentGetArguments {
                fields: &TORRENT_FIELDS,
            },
            tag: 7,
        };
        let encoded = serde_json::to_value(&request)?;
        assert_eq!(
            encoded,
            serde_json::json!({
                "method": "torrent-get",
                "arguments": {
                    "fields": ["id", "name", "downloadDir", "files", "fileStats", "fileCount"]
                },
                "tag": 7
            })
        );
        Ok(())
    }

    #[test]
    fn torrent_without_file_count_uses_file_list_length() -> Result<()> {
        let wire: WireTorrent = serde_json::from_value(serde_json::json!({
            "id": 4,
            "downloadDir": "/downloads",
            "files": [{"name": "a", "length": 3, "bytesCompleted": 3}],
            "fileStats": [{"bytesCompleted": 3}]
        }))?;
        let record = wire.into_record()?;
        assert_eq!(record.file_count, 1);
        assert!(record.file_stats[0].wanted);
        assert!(record.shape_mismatch().is_none());
        Ok(())
    }

    #[test]
    fn torrent_without_download_dir_is_a_protocol_error() -> Result<()> {
        let wire: WireTorrent = serde_json::from_value(serde_json::json!({ "id": 9 }))?;
        match wire.into_record() {
            Err(SourceError::Protocol { field, value, .. }) => {
                assert_eq!(field, "downloadDir");
                assert_eq!(value.as_deref(), Some("9"));
            }
            other => panic!("expected protocol error, got {other:?}"),
        }
        Ok(())
    }
}
