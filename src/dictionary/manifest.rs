use crate::error::{GuardError, Result};
use std::cmp::Ordering;
use std::fmt;

/// Reference partitioning of the frequency dictionary by two-letter prefix
pub const REFERENCE_MANIFEST: &[&str] = &[
    "a-ba", "ba-ca", "ca-cr", "cr-el", "el-ga", "ga-ho", "ho-kg", "kg-ma", "ma-my", "my-pa",
    "pa-re", "re-se", "se-sw", "sw-ur", "ur-zz",
];

/// One alphabetical range of the dictionary, stored in its own chunk file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRange {
    start: String,
    end: String,
}

impl ChunkRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Parse a chunk id of the form `start-end`
    pub fn parse(id: &str) -> Result<Self> {
        match id.split_once('-') {
            Some((start, end)) if !start.is_empty() && !end.is_empty() && start <= end => {
                Ok(Self::new(start, end))
            }
            _ => Err(GuardError::InvalidManifest {
                entry: id.to_string(),
            }),
        }
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    /// Chunk id, also the chunk file stem
    pub fn id(&self) -> String {
        format!("{}-{}", self.start, self.end)
    }
}

impl fmt::Display for ChunkRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Ordered, contiguous ranges covering the whole dictionary.
///
/// Adjacent ranges share their boundary prefix (`ca-cr`, `cr-el`), so a word starting
/// with a boundary prefix may live in either neighbour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkManifest {
    ranges: Vec<ChunkRange>,
}

impl Default for ChunkManifest {
    fn default() -> Self {
        Self::reference()
    }
}

impl ChunkManifest {
    pub fn reference() -> Self {
        Self {
            ranges: REFERENCE_MANIFEST
                .iter()
                .filter_map(|id| id.split_once('-'))
                .map(|(start, end)| ChunkRange::new(start, end))
                .collect(),
        }
    }

    /// Build a manifest from chunk ids, which must be sorted and contiguous
    pub fn parse<I, S>(ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ranges = ids
            .into_iter()
            .map(|id| ChunkRange::parse(id.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        if ranges.is_empty() {
            return Err(GuardError::InvalidManifest {
                entry: String::new(),
            });
        }

        for pair in ranges.windows(2) {
            if pair[0].end != pair[1].start {
                return Err(GuardError::InvalidManifest {
                    entry: pair[1].id(),
                });
            }
        }

        Ok(Self { ranges })
    }

    pub fn ranges(&self) -> &[ChunkRange] {
        &self.ranges
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Binary search for the chunk(s) that may hold `word`.
    ///
    /// Only the first two characters are compared. A prefix strictly inside a range maps to
    /// that range alone; a prefix equal to a shared boundary maps to both neighbours. Returns
    /// an empty slice when no range applies (e.g. digits).
    pub fn resolve(&self, word: &str) -> &[ChunkRange] {
        let prefix = two_char_prefix(word);
        let last = self.ranges.len().saturating_sub(1);

        let mut left = 0usize;
        let mut right = self.ranges.len();

        while left < right {
            let mid = left + (right - left) / 2;
            let range = &self.ranges[mid];

            if prefix > range.start.as_str() && prefix < range.end.as_str() {
                return &self.ranges[mid..=mid];
            }

            if prefix == range.start {
                return if mid == 0 {
                    &self.ranges[mid..=mid]
                } else {
                    &self.ranges[mid - 1..=mid]
                };
            }

            if prefix == range.end {
                return if mid == last {
                    &self.ranges[mid..=mid]
                } else {
                    &self.ranges[mid..=mid + 1]
                };
            }

            match prefix.cmp(range.start.as_str()) {
                Ordering::Less => right = mid,
                _ => left = mid + 1,
            }
        }

        &[]
    }
}

fn two_char_prefix(word: &str) -> &str {
    match word.char_indices().nth(2) {
        Some((idx, _)) => &word[..idx],
        None => word,
    }
}
