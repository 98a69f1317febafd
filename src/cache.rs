//! History cache — persists the last head list and the history built from it.
//!
//! Rebuilding history means one `git log` walk per link over the whole chain,
//! which takes seconds on a kernel tree. The record is reused for as long as
//! the freshly resolved head list is exactly the cached one; any difference in
//! a link name, commit id or order triggers a full rebuild. No other expiry.
//!
//! The store is a single file at a fixed location, not keyed by repository.
//! Each writer encodes into its own temp file next to the target; concurrent
//! writers race on the final rename and the last one wins.

use std::fs;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::git::Repository;
use crate::history::build_history;
use crate::{HeadList, HistoryMap, SortError};

// ─── Constants ──────────────────────────────────────────────────────

/// Cache format version. Bump when the record layout changes incompatibly.
pub const FORMAT_VERSION: u32 = 1;

/// Magic bytes identifying an LZ4-compressed cache file.
pub const LZ4_MAGIC: &[u8; 4] = b"GSRT";

/// Environment variable overriding the cache file location.
pub const CACHE_ENV: &str = "GIT_SORT_CACHE";

// ─── Record ─────────────────────────────────────────────────────────

/// Persisted pair of head list and the history built from it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub format_version: u32,
    pub heads: HeadList,
    pub history: HistoryMap,
    /// Seconds since epoch when the history was built.
    pub built_at: u64,
}

impl CacheRecord {
    pub fn new(heads: HeadList, history: HistoryMap) -> Self {
        let built_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        CacheRecord {
            format_version: FORMAT_VERSION,
            heads,
            history,
            built_at,
        }
    }
}

// ─── Storage backends ───────────────────────────────────────────────

/// Where cache records live between runs.
pub trait CacheStore {
    /// The stored record, or `None` when there is nothing usable.
    fn load(&mut self) -> Result<Option<CacheRecord>, SortError>;

    /// Replace the stored record.
    fn store(&mut self, record: &CacheRecord) -> Result<(), SortError>;
}

/// Default cache file: `<user cache dir>/git-sort/history.cache`.
pub fn default_cache_path() -> PathBuf {
    let base = dirs::cache_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("git-sort").join("history.cache")
}

/// Cache record in a single bincode + LZ4 file.
pub struct FileCacheStore {
    path: PathBuf,
}

impl FileCacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileCacheStore { path: path.into() }
    }
}

impl CacheStore for FileCacheStore {
    /// Missing, corrupt or outdated files all read as "no record"; the caller rebuilds.
    fn load(&mut self) -> Result<Option<CacheRecord>, SortError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no history cache");
            return Ok(None);
        }
        let record: CacheRecord = match load_compressed(&self.path) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "ignoring unreadable history cache");
                return Ok(None);
            }
        };
        if record.format_version != FORMAT_VERSION {
            warn!(
                found = record.format_version,
                expected = FORMAT_VERSION,
                "history cache format version mismatch, ignoring"
            );
            return Ok(None);
        }
        Ok(Some(record))
    }

    /// Atomic write: uniquely named temp file next to the target, then rename.
    fn store(&mut self, record: &CacheRecord) -> Result<(), SortError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let start = Instant::now();
        let tmp = tempfile::NamedTempFile::new_in(dir)?;
        write_compressed(tmp.as_file(), record)?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        debug!(
            path = %self.path.display(),
            bytes = fs::metadata(&self.path)?.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "saved history cache"
        );
        Ok(())
    }
}

/// Cache held in memory; used by tests and one-shot callers.
#[derive(Default)]
pub struct MemoryCacheStore {
    record: Option<CacheRecord>,
    stores: usize,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self) -> Option<&CacheRecord> {
        self.record.as_ref()
    }

    /// Number of times a record was written.
    pub fn stores(&self) -> usize {
        self.stores
    }
}

impl CacheStore for MemoryCacheStore {
    fn load(&mut self) -> Result<Option<CacheRecord>, SortError> {
        Ok(self.record.clone())
    }

    fn store(&mut self, record: &CacheRecord) -> Result<(), SortError> {
        self.record = Some(record.clone());
        self.stores += 1;
        Ok(())
    }
}

// ─── Compressed encoding ────────────────────────────────────────────

fn write_compressed<W: Write, T: Serialize>(file: W, data: &T) -> Result<(), SortError> {
    let mut writer = BufWriter::new(file);
    writer.write_all(LZ4_MAGIC)?;
    let mut encoder = lz4_flex::frame::FrameEncoder::new(writer);
    bincode::serialize_into(&mut encoder, data)?;
    let mut writer = encoder.finish().map_err(std::io::Error::other)?;
    writer.flush()?;
    Ok(())
}

fn load_compressed<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, SortError> {
    let path_str = path.display().to_string();
    let file = fs::File::open(path).map_err(|e| SortError::CacheLoad {
        path: path_str.clone(),
        message: format!("cannot open file: {}", e),
    })?;
    let mut reader = BufReader::new(file);

    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic).map_err(|e| SortError::CacheLoad {
        path: path_str.clone(),
        message: format!("read error (magic bytes): {}", e),
    })?;
    if &magic != LZ4_MAGIC {
        return Err(SortError::CacheLoad {
            path: path_str,
            message: "not a git-sort cache file".to_string(),
        });
    }

    let decoder = lz4_flex::frame::FrameDecoder::new(reader);
    bincode::deserialize_from(decoder).map_err(|e| SortError::CacheLoad {
        path: path_str,
        message: format!("LZ4 deserialization failed: {}", e),
    })
}

// ─── Resolution ─────────────────────────────────────────────────────

/// Why a history rebuild is needed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RebuildReason {
    /// No usable record was stored
    Missing,
    /// The stored head list differs from the resolved one
    HeadsChanged,
}

/// Whether [`resolve_history`] served the cached record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Rebuilt(RebuildReason),
}

/// History for a head list together with how it was obtained.
#[derive(Debug)]
pub struct ResolvedHistory {
    pub history: HistoryMap,
    pub outcome: CacheOutcome,
}

/// `None` when `cached` can serve `heads` as is.
///
/// Equality is over the whole ordered list: every link name and commit id, in order.
pub fn rebuild_reason(cached: Option<&CacheRecord>, heads: &HeadList) -> Option<RebuildReason> {
    match cached {
        None => Some(RebuildReason::Missing),
        Some(record) if record.heads != *heads => Some(RebuildReason::HeadsChanged),
        Some(_) => None,
    }
}

/// Cached history for `heads`, rebuilding and storing it when the head list moved.
pub fn resolve_history<S, R>(
    store: &mut S,
    repo: &R,
    heads: &HeadList,
) -> Result<ResolvedHistory, SortError>
where
    S: CacheStore + ?Sized,
    R: Repository + ?Sized,
{
    let loaded = store.load()?;
    let reason = rebuild_reason(loaded.as_ref(), heads);
    if let (None, Some(record)) = (reason, loaded) {
        debug!(built_at = record.built_at, "history cache hit");
        return Ok(ResolvedHistory {
            history: record.history,
            outcome: CacheOutcome::Hit,
        });
    }
    let reason = reason.unwrap_or(RebuildReason::Missing);

    info!(?reason, links = heads.len(), "rebuilding upstream history");
    let history = build_history(repo, heads)?;
    let record = CacheRecord::new(heads.clone(), history);
    store.store(&record)?;
    Ok(ResolvedHistory {
        history: record.history,
        outcome: CacheOutcome::Rebuilt(reason),
    })
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
