//! Common test utilities: a small ranked dictionary written out as real chunk files

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use wordguard::config::{DictionaryConfig, WordguardConfig};
use wordguard::dictionary::{encode_chunk, ChunkPayload, MemoryChunkSource, CHUNK_EXTENSION};
use wordguard::{
    Blacklist, ChunkManifest, DictionaryStore, Guard, MemoryBlacklistStore,
};

pub const DICTIONARY_LENGTH: u64 = 200_000;

/// Most frequent first
pub const RANKED_WORDS: &[&str] = &[
    "the", "of", "and", "to", "a", "in", "is", "it", "you", "that", "he", "was", "for", "on",
    "are", "with", "as", "i", "his", "they", "be", "at", "one", "have", "this", "from", "or",
    "had", "by", "word", "but", "what", "some", "we", "can", "out", "other", "were", "all",
    "there", "when", "up", "use", "your", "how", "said", "an", "each", "she", "which", "do",
    "their", "time", "if", "will", "way", "about", "many", "then", "them", "would", "like",
    "so", "these", "her", "long", "make", "thing", "see", "him", "two", "has", "look", "more",
    "day", "could", "go", "come", "did", "number", "no", "most", "people", "my", "over",
    "know", "water", "than", "call", "first", "who", "may", "down", "side", "been", "now",
    "find", "hello", "world", "test", "string", "quick", "brown", "fox", "jumps", "lazy",
    "dog", "good", "bad", "pen", "island",
];

/// Reverse-rank token for each ranked word
pub fn ranked_tokens() -> Vec<(String, u64)> {
    RANKED_WORDS
        .iter()
        .enumerate()
        .map(|(rank, word)| (word.to_string(), DICTIONARY_LENGTH - rank as u64))
        .collect()
}

/// Split words into per-chunk payloads, one entry for every range in the manifest
pub fn chunk_payloads(
    manifest: &ChunkManifest,
    words: &[(String, u64)],
) -> HashMap<String, ChunkPayload> {
    let mut payloads: HashMap<String, ChunkPayload> = manifest
        .ranges()
        .iter()
        .map(|range| (range.id(), ChunkPayload::new()))
        .collect();

    for (word, token) in words {
        for range in manifest.resolve(word) {
            if let Some(payload) = payloads.get_mut(&range.id()) {
                payload.insert(word.clone(), *token);
            }
        }
    }

    payloads
}

/// In-memory engine over the ranked word list
pub fn memory_guard(blacklist: Blacklist) -> Guard {
    let manifest = ChunkManifest::reference();
    let mut source = MemoryChunkSource::new();
    for (id, payload) in chunk_payloads(&manifest, &ranked_tokens()) {
        source.insert(id, &payload).unwrap();
    }

    Guard::new(
        Arc::new(MemoryBlacklistStore::new(blacklist)),
        DictionaryStore::new(manifest, Arc::new(source)),
    )
}

/// Data directory with gzip chunk files and a `blacklist.json`
pub struct TestData {
    pub temp_dir: TempDir,
}

impl TestData {
    pub fn new(blacklist: &Blacklist) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let manifest = ChunkManifest::reference();

        for (id, payload) in chunk_payloads(&manifest, &ranked_tokens()) {
            let path = temp_dir.path().join(format!("{id}.{CHUNK_EXTENSION}"));
            fs::write(path, encode_chunk(&payload).unwrap()).unwrap();
        }

        let data = Self { temp_dir };
        fs::write(
            data.blacklist_path(),
            serde_json::to_string_pretty(blacklist).unwrap(),
        )
        .unwrap();
        data
    }

    pub fn data_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn blacklist_path(&self) -> PathBuf {
        self.data_dir().join("blacklist.json")
    }

    pub fn chunk_path(&self, chunk_id: &str) -> PathBuf {
        self.data_dir().join(format!("{chunk_id}.{CHUNK_EXTENSION}"))
    }

    /// File-backed engine, wired the same way the binary does it
    pub fn guard(&self) -> Guard {
        let config = WordguardConfig {
            dictionary: Some(DictionaryConfig {
                data_dir: Some(self.data_dir().to_string_lossy().into_owned()),
                ..Default::default()
            }),
            ..Default::default()
        }
        .resolve_with_defaults();

        Guard::from_config(&config).unwrap()
    }

    pub fn read_blacklist(&self) -> Blacklist {
        serde_json::from_str(&fs::read_to_string(self.blacklist_path()).unwrap()).unwrap()
    }
}

pub fn strings(terms: &[&str]) -> Vec<String> {
    terms.iter().map(|t| t.to_string()).collect()
}
