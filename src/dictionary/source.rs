use crate::error::{GuardError, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use lru::LruCache;
use std::collections::HashMap;
use std::fs;
use std::io::{Read, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Decoded chunk: word -> reverse-rank token
pub type ChunkPayload = HashMap<String, u64>;

/// File extension of compressed chunk payloads
pub const CHUNK_EXTENSION: &str = "json.gz";

/// Fetches compressed chunk payloads by id.
///
/// Implementations return the raw gzip bytes; decompression and parsing happen in
/// [`decode_chunk`]. Sources are shared across the rayon pool while chunks load.
pub trait ChunkSource: Send + Sync {
    fn read_chunk(&self, chunk_id: &str) -> Result<Vec<u8>>;
}

/// Reads `<data_dir>/<chunk_id>.json.gz`
#[derive(Debug, Clone)]
pub struct FsChunkSource {
    data_dir: PathBuf,
}

impl FsChunkSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn chunk_path(&self, chunk_id: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}.{}", chunk_id, CHUNK_EXTENSION))
    }
}

impl ChunkSource for FsChunkSource {
    fn read_chunk(&self, chunk_id: &str) -> Result<Vec<u8>> {
        let path = self.chunk_path(chunk_id);
        debug!("Reading chunk {} from {:?}", chunk_id, path);

        fs::read(&path).map_err(|source| GuardError::ChunkIo {
            chunk_id: chunk_id.to_string(),
            source,
        })
    }
}

/// Chunks held in memory, already compressed
#[derive(Debug, Default)]
pub struct MemoryChunkSource {
    chunks: HashMap<String, Vec<u8>>,
}

impl MemoryChunkSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compress and store `payload` under `chunk_id`
    pub fn insert(&mut self, chunk_id: impl Into<String>, payload: &ChunkPayload) -> Result<()> {
        let chunk_id = chunk_id.into();
        let bytes = encode_chunk(payload).map_err(|source| GuardError::ChunkIo {
            chunk_id: chunk_id.clone(),
            source,
        })?;
        self.chunks.insert(chunk_id, bytes);
        Ok(())
    }

    /// Store raw bytes as-is, compressed or not
    pub fn insert_raw(&mut self, chunk_id: impl Into<String>, bytes: Vec<u8>) {
        self.chunks.insert(chunk_id.into(), bytes);
    }
}

impl ChunkSource for MemoryChunkSource {
    fn read_chunk(&self, chunk_id: &str) -> Result<Vec<u8>> {
        self.chunks
            .get(chunk_id)
            .cloned()
            .ok_or_else(|| GuardError::ChunkIo {
                chunk_id: chunk_id.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("chunk {chunk_id} not found"),
                ),
            })
    }
}

/// Gunzip and parse a chunk payload.
///
/// The payload is decompressed fully before parsing; chunks are bounded by the range
/// partitioning so there is no need to stream.
pub fn decode_chunk(chunk_id: &str, bytes: &[u8]) -> Result<ChunkPayload> {
    let mut json = Vec::with_capacity(bytes.len() * 4);
    GzDecoder::new(bytes)
        .read_to_end(&mut json)
        .map_err(|source| GuardError::ChunkIo {
            chunk_id: chunk_id.to_string(),
            source,
        })?;

    serde_json::from_slice(&json).map_err(|source| GuardError::ChunkDecode {
        chunk_id: chunk_id.to_string(),
        source,
    })
}

/// Serialize and gzip a chunk payload
pub fn encode_chunk(payload: &ChunkPayload) -> std::io::Result<Vec<u8>> {
    let json = serde_json::to_vec(payload)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    encoder.finish()
}

/// Bounded LRU of decoded chunks, shared by every call on one dictionary store.
///
/// Only the immutable chunk payloads are cached. Word costs depend on the special terms
/// overlay and are still computed per call.
#[derive(Debug)]
pub struct ChunkCache {
    entries: Mutex<LruCache<String, Arc<ChunkPayload>>>,
}

impl ChunkCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get(&self, chunk_id: &str) -> Option<Arc<ChunkPayload>> {
        let mut entries = self.entries.lock().ok()?;
        entries.get(chunk_id).cloned()
    }

    pub fn insert(&self, chunk_id: &str, payload: Arc<ChunkPayload>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.put(chunk_id.to_string(), payload);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}
