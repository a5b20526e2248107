use crate::dictionary::manifest::ChunkManifest;
use crate::dictionary::source::{decode_chunk, ChunkCache, ChunkPayload, ChunkSource};
use crate::error::Result;
use crate::segment::{CostLookup, DEFAULT_MAX_WORD_LENGTH};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Number of words in the ranked corpus the chunks were generated from.
///
/// Chunks only hold part of the corpus, so this must stay fixed to recover true ranks
/// from reverse-rank tokens.
pub const DEFAULT_DICTIONARY_LENGTH: usize = 200_000;

/// Smallest ranking size with `ln(total) > 1`, so every cost is non-negative
pub const MIN_DICTIONARY_LENGTH: usize = 3;

/// Every contiguous substring of `input` up to `max_len` characters, ordered by start
/// position and then by length.
pub fn consecutive_substrings(input: &str, max_len: usize) -> Vec<&str> {
    let bounds: Vec<usize> = input
        .char_indices()
        .map(|(idx, _)| idx)
        .chain(std::iter::once(input.len()))
        .collect();
    let char_count = bounds.len() - 1;

    let mut substrings = Vec::new();
    for start in 0..char_count {
        let last = char_count.min(start.saturating_add(max_len));
        for end in start + 1..=last {
            substrings.push(&input[bounds[start]..bounds[end]]);
        }
    }
    substrings
}

/// Cost of the word at zero-based `rank` in a ranking of `total` words.
///
/// `ln((rank + 1) * ln(total))`, a Zipf-style negative log-likelihood. Clamped at zero,
/// since rankings smaller than [`MIN_DICTIONARY_LENGTH`] would go negative or to `-inf`.
pub fn word_cost(rank: u64, total: u64) -> f64 {
    ((rank as f64 + 1.0) * (total as f64).ln()).ln().max(0.0)
}

/// Special blacklist terms ranked ahead of every corpus word.
///
/// Term `i` gets the reverse-rank token `dictionary_length + i`, so the overlay sorts past
/// the end of the corpus and its terms always resolve as cheap, real words.
#[derive(Debug, Clone, Default)]
pub struct SpecialOverlay {
    tokens: HashMap<String, u64>,
}

impl SpecialOverlay {
    pub fn new<S: AsRef<str>>(terms: &[S], dictionary_length: usize) -> Self {
        let tokens = terms
            .iter()
            .enumerate()
            .map(|(idx, term)| (term.as_ref().to_string(), (dictionary_length + idx) as u64))
            .collect();

        Self { tokens }
    }

    pub fn get(&self, word: &str) -> Option<u64> {
        self.tokens.get(word).copied()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Costs of the substrings that one query could use, materialized from the chunks it
/// touched. Built per call and dropped with it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordCostTable {
    costs: HashMap<String, f64>,
}

impl WordCostTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, word: &str) -> Option<f64> {
        self.costs.get(word).copied()
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.costs.iter().map(|(word, cost)| (word.as_str(), *cost))
    }

    /// Keep the lower cost when two chunks disagree about a boundary word
    fn insert(&mut self, word: String, cost: f64) {
        self.costs
            .entry(word)
            .and_modify(|existing| *existing = existing.min(cost))
            .or_insert(cost);
    }
}

impl CostLookup for WordCostTable {
    fn cost(&self, word: &str) -> Option<f64> {
        self.get(word)
    }
}

impl FromIterator<(String, f64)> for WordCostTable {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        let mut table = Self::new();
        for (word, cost) in iter {
            table.insert(word, cost);
        }
        table
    }
}

/// Range-partitioned, compressed frequency dictionary.
///
/// Only the chunks a query's substrings fall into are fetched, in parallel, and only the
/// costs of those substrings are kept.
pub struct DictionaryStore {
    manifest: ChunkManifest,
    source: Arc<dyn ChunkSource>,
    dictionary_length: usize,
    max_word_length: usize,
    cache: Option<ChunkCache>,
}

impl DictionaryStore {
    pub fn new(manifest: ChunkManifest, source: Arc<dyn ChunkSource>) -> Self {
        Self {
            manifest,
            source,
            dictionary_length: DEFAULT_DICTIONARY_LENGTH,
            max_word_length: DEFAULT_MAX_WORD_LENGTH,
            cache: None,
        }
    }

    /// Raised to [`MIN_DICTIONARY_LENGTH`] if smaller
    pub fn with_dictionary_length(mut self, dictionary_length: usize) -> Self {
        if dictionary_length < MIN_DICTIONARY_LENGTH {
            warn!(
                "Dictionary length {} is too small, using {}",
                dictionary_length, MIN_DICTIONARY_LENGTH
            );
        }
        self.dictionary_length = dictionary_length.max(MIN_DICTIONARY_LENGTH);
        self
    }

    pub fn with_max_word_length(mut self, max_word_length: usize) -> Self {
        self.max_word_length = max_word_length;
        self
    }

    /// Keep up to `capacity` decoded chunks between calls
    pub fn with_chunk_cache(mut self, capacity: NonZeroUsize) -> Self {
        self.cache = Some(ChunkCache::new(capacity));
        self
    }

    pub fn manifest(&self) -> &ChunkManifest {
        &self.manifest
    }

    pub fn dictionary_length(&self) -> usize {
        self.dictionary_length
    }

    pub fn max_word_length(&self) -> usize {
        self.max_word_length
    }

    pub fn chunk_cache(&self) -> Option<&ChunkCache> {
        self.cache.as_ref()
    }

    /// Group the substrings of `normalized` by the chunk ids that may contain them
    pub fn required_chunks<'a>(&self, normalized: &'a str) -> BTreeMap<String, Vec<&'a str>> {
        let substrings: HashSet<&str> = consecutive_substrings(normalized, self.max_word_length)
            .into_iter()
            .collect();

        let mut queries: BTreeMap<String, Vec<&str>> = BTreeMap::new();
        for substring in substrings {
            for range in self.manifest.resolve(substring) {
                queries.entry(range.id()).or_default().push(substring);
            }
        }
        queries
    }

    /// Build the word cost table for one normalized string.
    ///
    /// `special_terms` are folded in as an overlay that takes precedence over chunk data.
    /// Any chunk that cannot be fetched or decoded fails the whole call.
    pub fn resolve_costs<S: AsRef<str>>(
        &self,
        normalized: &str,
        special_terms: &[S],
    ) -> Result<WordCostTable> {
        let start_time = Instant::now();

        let queries = self.required_chunks(normalized);
        let overlay = SpecialOverlay::new(special_terms, self.dictionary_length);
        let total = (self.dictionary_length + overlay.len()) as u64;

        debug!(
            "Resolving costs for {:?}: {} chunk(s) {:?}, {} special term(s)",
            normalized,
            queries.len(),
            queries.keys().collect::<Vec<_>>(),
            overlay.len()
        );

        let resolved = queries
            .par_iter()
            .map(|(chunk_id, words)| {
                let payload = self.load_chunk(chunk_id)?;
                Ok(words
                    .iter()
                    .filter_map(|word| {
                        let token = overlay.get(word).or_else(|| payload.get(*word).copied())?;
                        rank_cost(word, token, total).map(|cost| (word.to_string(), cost))
                    })
                    .collect::<Vec<_>>())
            })
            .collect::<Result<Vec<_>>>()?;

        let table: WordCostTable = resolved.into_iter().flatten().collect();

        debug!(
            "Resolved {} word cost(s) in {:?}",
            table.len(),
            start_time.elapsed()
        );

        Ok(table)
    }

    fn load_chunk(&self, chunk_id: &str) -> Result<Arc<ChunkPayload>> {
        if let Some(cache) = &self.cache {
            if let Some(payload) = cache.get(chunk_id) {
                debug!("Chunk cache hit for {}", chunk_id);
                return Ok(payload);
            }
        }

        let start_time = Instant::now();
        let bytes = self.source.read_chunk(chunk_id)?;
        let payload = Arc::new(decode_chunk(chunk_id, &bytes)?);

        debug!(
            "Loaded chunk {} ({} bytes, {} words) in {:?}",
            chunk_id,
            bytes.len(),
            payload.len(),
            start_time.elapsed()
        );

        if let Some(cache) = &self.cache {
            cache.insert(chunk_id, Arc::clone(&payload));
        }

        Ok(payload)
    }
}

fn rank_cost(word: &str, token: u64, total: u64) -> Option<f64> {
    match total.checked_sub(token) {
        Some(rank) => Some(word_cost(rank, total)),
        None => {
            warn!(
                "Ignoring {:?}: reverse-rank token {} exceeds ranking size {}",
                word, token, total
            );
            None
        }
    }
}
