//! The categorized blacklist and its persistence.

pub mod variant_matcher;

use crate::error::{GuardError, Result};
use crate::normalize::sanitize;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

pub use variant_matcher::{VariantMatch, VariantMatcher};

/// Blacklisted terms by category.
///
/// All three lists are always present; missing keys in a JSON document read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blacklist {
    /// Complete bad words that the dictionary cannot split
    #[serde(default)]
    pub common: Vec<String>,
    /// Bad phrases made of ordinary words, matched literally
    #[serde(default)]
    pub common_variant: Vec<String>,
    /// Bad words that segmentation would otherwise break into harmless pieces
    #[serde(default)]
    pub special: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlacklistCategory {
    Common,
    CommonVariant,
    Special,
}

impl BlacklistCategory {
    pub const ALL: [BlacklistCategory; 3] = [
        BlacklistCategory::Common,
        BlacklistCategory::CommonVariant,
        BlacklistCategory::Special,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlacklistCategory::Common => "common",
            BlacklistCategory::CommonVariant => "commonVariant",
            BlacklistCategory::Special => "special",
        }
    }
}

impl fmt::Display for BlacklistCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Blacklist {
    pub fn terms(&self, category: BlacklistCategory) -> &[String] {
        match category {
            BlacklistCategory::Common => &self.common,
            BlacklistCategory::CommonVariant => &self.common_variant,
            BlacklistCategory::Special => &self.special,
        }
    }

    fn terms_mut(&mut self, category: BlacklistCategory) -> &mut Vec<String> {
        match category {
            BlacklistCategory::Common => &mut self.common,
            BlacklistCategory::CommonVariant => &mut self.common_variant,
            BlacklistCategory::Special => &mut self.special,
        }
    }

    pub fn len(&self) -> usize {
        self.common.len() + self.common_variant.len() + self.special.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Words a segmented token is checked against: `common` and `special`
    pub fn word_set(&self) -> HashSet<&str> {
        self.common
            .iter()
            .chain(self.special.iter())
            .map(String::as_str)
            .collect()
    }

    /// Sanitize every term of `update` and union it into the matching category.
    ///
    /// Existing terms keep their order and new ones are appended. Returns the sanitized
    /// terms of `update`, deduplicated per category, including ones already present.
    pub fn merge_sanitized(&mut self, update: &Blacklist) -> Vec<String> {
        let mut additions = Vec::new();

        for category in BlacklistCategory::ALL {
            let sanitized = sanitize_terms(update.terms(category));
            let terms = self.terms_mut(category);

            for term in &sanitized {
                if !terms.contains(term) {
                    terms.push(term.clone());
                }
            }

            additions.extend(sanitized);
        }

        additions
    }

    /// Remove each exact term from every category; returns what was removed
    pub fn remove_terms<S: AsRef<str>>(&mut self, terms: &[S]) -> Vec<String> {
        let targets: HashSet<&str> = terms.iter().map(AsRef::as_ref).collect();
        let mut removed = Vec::new();

        for category in BlacklistCategory::ALL {
            self.terms_mut(category).retain(|term| {
                if targets.contains(term.as_str()) {
                    removed.push(term.clone());
                    false
                } else {
                    true
                }
            });
        }

        removed
    }
}

/// Sanitize with character mapping, dropping empties and duplicates
fn sanitize_terms(terms: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut sanitized = Vec::new();

    for term in terms {
        let clean = sanitize(term, true);
        if clean.is_empty() {
            warn!("Skipping blacklist term {:?}: nothing left after sanitizing", term);
            continue;
        }
        if seen.insert(clean.clone()) {
            sanitized.push(clean);
        }
    }

    sanitized
}

/// Reads and replaces the persisted blacklist
pub trait BlacklistStore: Send + Sync {
    fn load(&self) -> Result<Blacklist>;

    /// Persist a full replacement
    fn save(&self, blacklist: &Blacklist) -> Result<()>;
}

/// Blacklist kept in a pretty-printed JSON file
#[derive(Debug, Clone)]
pub struct JsonBlacklistStore {
    path: PathBuf,
}

impl JsonBlacklistStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> GuardError {
        GuardError::BlacklistIo {
            path: self.path.clone(),
            source,
        }
    }
}

impl BlacklistStore for JsonBlacklistStore {
    fn load(&self) -> Result<Blacklist> {
        let bytes = fs::read(&self.path).map_err(|e| self.io_error(e))?;

        // Strip UTF-8 BOM if present
        let content = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(&bytes);

        let blacklist: Blacklist =
            serde_json::from_slice(content).map_err(|source| GuardError::BlacklistParse {
                path: self.path.clone(),
                source,
            })?;

        debug!(
            "Loaded blacklist from {:?}: {} common, {} commonVariant, {} special",
            self.path,
            blacklist.common.len(),
            blacklist.common_variant.len(),
            blacklist.special.len()
        );

        Ok(blacklist)
    }

    /// Written to a temp file in the same directory, then renamed over the old one
    fn save(&self, blacklist: &Blacklist) -> Result<()> {
        let parent_dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent_dir).map_err(|e| self.io_error(e))?;

        let temp_file = NamedTempFile::new_in(parent_dir).map_err(|e| self.io_error(e))?;
        {
            let mut writer = BufWriter::new(temp_file.as_file());
            serde_json::to_writer_pretty(&mut writer, blacklist)
                .map_err(|e| self.io_error(e.into()))?;
            writer.flush().map_err(|e| self.io_error(e))?;
        }

        temp_file
            .persist(&self.path)
            .map_err(|e| self.io_error(e.error))?;

        info!("Saved blacklist ({} terms) to {:?}", blacklist.len(), self.path);
        Ok(())
    }
}

/// Blacklist held in memory, for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryBlacklistStore {
    blacklist: RwLock<Blacklist>,
}

impl MemoryBlacklistStore {
    pub fn new(blacklist: Blacklist) -> Self {
        Self {
            blacklist: RwLock::new(blacklist),
        }
    }
}

impl BlacklistStore for MemoryBlacklistStore {
    fn load(&self) -> Result<Blacklist> {
        Ok(self
            .blacklist
            .read()
            .map(|blacklist| blacklist.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone()))
    }

    fn save(&self, blacklist: &Blacklist) -> Result<()> {
        let mut guard = self
            .blacklist
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = blacklist.clone();
        Ok(())
    }
}

/// Sanitize and add `update` to the stored blacklist; returns the sanitized additions
pub fn add_terms(store: &dyn BlacklistStore, update: &Blacklist) -> Result<Vec<String>> {
    let mut blacklist = store.load()?;
    let additions = blacklist.merge_sanitized(update);
    store.save(&blacklist)?;

    info!("Added {} term(s) to the blacklist", additions.len());
    Ok(additions)
}

/// Remove `terms` from every category of the stored blacklist; returns the removed terms
pub fn remove_terms<S: AsRef<str>>(store: &dyn BlacklistStore, terms: &[S]) -> Result<Vec<String>> {
    let mut blacklist = store.load()?;
    let removed = blacklist.remove_terms(terms);
    store.save(&blacklist)?;

    info!("Removed {} term(s) from the blacklist", removed.len());
    Ok(removed)
}
