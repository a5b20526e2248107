//! Range-partitioned frequency dictionary.
//!
//! The ranked word list is split into gzip-compressed JSON chunks covering contiguous
//! two-letter ranges. A query resolves which chunks its substrings fall into, loads only
//! those and turns their reverse-rank tokens into word costs.

pub mod manifest;
pub mod source;
pub mod store;

pub use manifest::{ChunkManifest, ChunkRange, REFERENCE_MANIFEST};
pub use source::{
    decode_chunk, encode_chunk, ChunkCache, ChunkPayload, ChunkSource, FsChunkSource,
    MemoryChunkSource, CHUNK_EXTENSION,
};
pub use store::{
    consecutive_substrings, word_cost, DictionaryStore, SpecialOverlay, WordCostTable,
    DEFAULT_DICTIONARY_LENGTH, MIN_DICTIONARY_LENGTH,
};
