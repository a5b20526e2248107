//! Wordguard detects blacklisted words hidden in arbitrary text, including text obfuscated
//! with leet-speak or with the separators between words removed.
//!
//! Input is normalized to `a`-`z`, split into its most likely words with a frequency-ranked
//! dictionary that is loaded chunk by chunk, and the words are compared to a curated
//! blacklist.

pub mod blacklist;
pub mod classifier;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod normalize;
pub mod segment;

// Re-export commonly used types for convenience
pub use blacklist::{
    Blacklist, BlacklistCategory, BlacklistStore, JsonBlacklistStore, MemoryBlacklistStore,
};
pub use classifier::{Evaluation, EvaluationCategory, Guard, ValidateOptions, Validation};
pub use dictionary::{ChunkManifest, ChunkSource, DictionaryStore, FsChunkSource};
pub use error::{GuardError, Result};
pub use normalize::sanitize;
pub use segment::{segment, CostLookup, Segmenter};
