//! Minimum-cost word segmentation.
//!
//! A forward pass fills `costs[i]`, the cheapest way to split the first `i` characters,
//! and a backward pass walks the same best matches from the end to recover the words.
//! Both passes share [`Segmenter::best_match`], so they must agree at every position.

use crate::error::{GuardError, Result};
use std::collections::HashMap;
use std::hash::BuildHasher;
use tracing::trace;

/// Longest word in the reference dictionary
pub const DEFAULT_MAX_WORD_LENGTH: usize = 29;

/// Cost of a substring the dictionary does not know
pub const UNRESOLVED_COST: f64 = f64::INFINITY;

/// Cost source for candidate words; `None` means the word is unknown
pub trait CostLookup {
    fn cost(&self, word: &str) -> Option<f64>;
}

impl<S: BuildHasher> CostLookup for HashMap<String, f64, S> {
    fn cost(&self, word: &str) -> Option<f64> {
        self.get(word).copied()
    }
}

impl<S: BuildHasher> CostLookup for HashMap<&str, f64, S> {
    fn cost(&self, word: &str) -> Option<f64> {
        self.get(word).copied()
    }
}

/// Cheapest word ending at some position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    /// Total cost of the prefix up to and including this word
    pub cost: f64,
    /// Word length in characters
    pub length: usize,
}

pub struct Segmenter<'a, L: CostLookup + ?Sized> {
    lookup: &'a L,
    max_word_length: usize,
}

impl<'a, L: CostLookup + ?Sized> Segmenter<'a, L> {
    pub fn new(lookup: &'a L, max_word_length: usize) -> Self {
        Self {
            lookup,
            max_word_length,
        }
    }

    /// Best match for the word ending at character `index`.
    ///
    /// Candidate lengths are scanned from 1 upward and only a strictly lower cost replaces
    /// the current best, so ties go to the shortest word. The single character is always
    /// a candidate, even at [`UNRESOLVED_COST`].
    pub fn best_match(&self, text: &str, index: usize, costs: &[f64]) -> Match {
        let bounds = char_bounds(text);
        self.best_match_at(text, &bounds, index, costs)
    }

    fn best_match_at(&self, text: &str, bounds: &[usize], index: usize, costs: &[f64]) -> Match {
        let window = self.max_word_length.max(1).min(index);
        let mut best = Match {
            cost: UNRESOLVED_COST,
            length: 0,
        };

        for length in 1..=window {
            let word = &text[bounds[index - length]..bounds[index]];
            let cost = costs[index - length] + self.lookup.cost(word).unwrap_or(UNRESOLVED_COST);

            if length == 1 || cost < best.cost {
                best = Match { cost, length };
            }
        }

        best
    }

    /// Forward pass: `costs[0] = 0`, `costs[i]` = cheapest split of the first `i` characters
    pub fn compute_costs(&self, text: &str) -> Vec<f64> {
        let bounds = char_bounds(text);
        let char_count = bounds.len() - 1;

        let mut costs = Vec::with_capacity(char_count + 1);
        costs.push(0.0);
        for index in 1..=char_count {
            let best = self.best_match_at(text, &bounds, index, &costs);
            costs.push(best.cost);
        }
        costs
    }

    /// Backward pass: rebuild the words from `costs`, checking every step against it.
    ///
    /// Fails with [`GuardError::CostMismatch`] if a recomputed match disagrees with the
    /// forward pass.
    pub fn backtrack(&self, text: &str, costs: &[f64]) -> Result<Vec<String>> {
        let bounds = char_bounds(text);
        let char_count = bounds.len() - 1;

        if costs.len() != char_count + 1 {
            return Err(GuardError::InvalidCostArray {
                expected: char_count + 1,
                actual: costs.len(),
            });
        }

        let mut words = Vec::new();
        let mut position = char_count;

        while position > 0 {
            let best = self.best_match_at(text, &bounds, position, costs);

            if best.cost != costs[position] {
                return Err(GuardError::CostMismatch {
                    position,
                    expected: costs[position],
                    actual: best.cost,
                });
            }

            let start = position - best.length;
            words.push(text[bounds[start]..bounds[position]].to_string());
            position = start;
        }

        words.reverse();
        Ok(words)
    }

    /// Split `text` into its cheapest sequence of words
    pub fn segment(&self, text: &str) -> Result<Vec<String>> {
        let costs = self.compute_costs(text);
        let words = self.backtrack(text, &costs)?;

        trace!("Segmented {:?} into {:?}", text, words);
        Ok(words)
    }
}

/// Split `text` with the given costs; see [`Segmenter::segment`]
pub fn segment<L: CostLookup + ?Sized>(
    text: &str,
    lookup: &L,
    max_word_length: usize,
) -> Result<Vec<String>> {
    Segmenter::new(lookup, max_word_length).segment(text)
}

/// Byte offset of every character boundary, including the end of the string
fn char_bounds(text: &str) -> Vec<usize> {
    text.char_indices()
        .map(|(idx, _)| idx)
        .chain(std::iter::once(text.len()))
        .collect()
}
