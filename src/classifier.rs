//! Validation of free text against the blacklist, and categorization of candidate terms.

use crate::blacklist::{
    self, Blacklist, BlacklistStore, JsonBlacklistStore, VariantMatch, VariantMatcher,
};
use crate::config::ResolvedConfig;
use crate::dictionary::{ChunkManifest, DictionaryStore, FsChunkSource};
use crate::error::Result;
use crate::normalize::sanitize;
use crate::segment::Segmenter;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Include the match and the segmented string in the result
    pub verbose: bool,
    /// Apply the leet table before segmenting
    pub character_mapping: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            character_mapping: true,
        }
    }
}

/// Verdict for one input. Only `is_blacklisted` is set unless the call was verbose.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    pub is_blacklisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blacklist_match: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_string: Option<String>,
    /// Segmented words joined by spaces; empty when a phrase matched before segmenting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substituted_string: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EvaluationCategory {
    /// Not blacklisted and not split: a new standalone word
    Common,
    /// Blacklisted and split: known bad words run together
    CommonVariant,
    /// Not blacklisted but split: must be kept whole to survive segmentation
    Special,
    /// Blacklisted and not split: already covered
    Duplicate,
}

impl EvaluationCategory {
    pub const ALL: [EvaluationCategory; 4] = [
        EvaluationCategory::Common,
        EvaluationCategory::CommonVariant,
        EvaluationCategory::Special,
        EvaluationCategory::Duplicate,
    ];

    pub fn classify(is_blacklisted: bool, is_split: bool) -> Self {
        match (is_blacklisted, is_split) {
            (false, false) => EvaluationCategory::Common,
            (true, true) => EvaluationCategory::CommonVariant,
            (false, true) => EvaluationCategory::Special,
            (true, false) => EvaluationCategory::Duplicate,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationCategory::Common => "common",
            EvaluationCategory::CommonVariant => "commonVariant",
            EvaluationCategory::Special => "special",
            EvaluationCategory::Duplicate => "duplicate",
        }
    }
}

impl fmt::Display for EvaluationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sanitized candidate terms grouped by category; empty groups are left out of the JSON
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub common: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub common_variant: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub special: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub duplicate: Vec<String>,
}

impl Evaluation {
    pub fn terms(&self, category: EvaluationCategory) -> &[String] {
        match category {
            EvaluationCategory::Common => &self.common,
            EvaluationCategory::CommonVariant => &self.common_variant,
            EvaluationCategory::Special => &self.special,
            EvaluationCategory::Duplicate => &self.duplicate,
        }
    }

    fn terms_mut(&mut self, category: EvaluationCategory) -> &mut Vec<String> {
        match category {
            EvaluationCategory::Common => &mut self.common,
            EvaluationCategory::CommonVariant => &mut self.common_variant,
            EvaluationCategory::Special => &mut self.special,
            EvaluationCategory::Duplicate => &mut self.duplicate,
        }
    }

    /// Non-empty categories in reporting order
    pub fn categories(&self) -> impl Iterator<Item = (EvaluationCategory, &[String])> {
        EvaluationCategory::ALL
            .into_iter()
            .map(|category| (category, self.terms(category)))
            .filter(|(_, terms)| !terms.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.categories().next().is_none()
    }
}

/// Blacklist snapshot prepared for one call
struct BlacklistView {
    variants: VariantMatcher,
    words: HashSet<String>,
    special: Vec<String>,
}

impl BlacklistView {
    fn new(blacklist: &Blacklist) -> Self {
        Self {
            variants: VariantMatcher::new(&blacklist.common_variant),
            words: blacklist.word_set().into_iter().map(str::to_string).collect(),
            special: blacklist.special.clone(),
        }
    }
}

/// The segmentation and lookup engine behind one blacklist and one dictionary
pub struct Guard {
    blacklist: Arc<dyn BlacklistStore>,
    dictionary: DictionaryStore,
}

impl Guard {
    pub fn new(blacklist: Arc<dyn BlacklistStore>, dictionary: DictionaryStore) -> Self {
        Self {
            blacklist,
            dictionary,
        }
    }

    /// File-backed chunks and blacklist as described by `config`
    pub fn from_config(config: &ResolvedConfig) -> Result<Self> {
        let manifest = ChunkManifest::parse(&config.dictionary.chunk_manifest)?;
        let source = Arc::new(FsChunkSource::new(&config.dictionary.data_dir));

        let mut dictionary = DictionaryStore::new(manifest, source)
            .with_dictionary_length(config.dictionary.dictionary_length)
            .with_max_word_length(config.dictionary.max_word_length);
        if let Some(capacity) = NonZeroUsize::new(config.dictionary.chunk_cache_size) {
            dictionary = dictionary.with_chunk_cache(capacity);
        }

        let blacklist = Arc::new(JsonBlacklistStore::new(&config.blacklist.path));

        Ok(Self::new(blacklist, dictionary))
    }

    pub fn dictionary(&self) -> &DictionaryStore {
        &self.dictionary
    }

    pub fn blacklist(&self) -> Result<Blacklist> {
        self.blacklist.load()
    }

    /// Normalize `input` and split it into its cheapest word sequence
    pub fn split_string(&self, input: &str, character_mapping: bool) -> Result<Vec<String>> {
        let blacklist = self.blacklist.load()?;
        let normalized = sanitize(input, character_mapping);
        self.segment_normalized(&normalized, &blacklist.special)
    }

    pub fn validate(&self, input: &str, options: ValidateOptions) -> Result<Validation> {
        let view = BlacklistView::new(&self.blacklist.load()?);
        self.validate_with(&view, input, options)
    }

    /// Categorize candidate terms for blacklist curation.
    ///
    /// Each term is validated verbosely with character mapping and counts as split when its
    /// lowercase form differs from the segmented string. Terms are stored sanitized, first
    /// occurrence wins within a category.
    pub fn evaluate_blacklist<S: AsRef<str> + Sync>(&self, terms: &[S]) -> Result<Evaluation> {
        let start_time = Instant::now();
        let view = BlacklistView::new(&self.blacklist.load()?);
        let options = ValidateOptions {
            verbose: true,
            character_mapping: true,
        };

        let classified = terms
            .par_iter()
            .map(|term| {
                let term = term.as_ref();
                let validation = self.validate_with(&view, term, options)?;
                let lowercase = term.to_lowercase();
                let is_split = validation.substituted_string.as_deref() != Some(lowercase.as_str());
                let category = EvaluationCategory::classify(validation.is_blacklisted, is_split);

                debug!("Evaluated {:?} as {}", term, category);
                Ok((category, sanitize(term, true)))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut evaluation = Evaluation::default();
        for (category, sanitized) in classified {
            let group = evaluation.terms_mut(category);
            if !group.contains(&sanitized) {
                group.push(sanitized);
            }
        }

        info!(
            "Evaluated {} term(s) in {:?}",
            terms.len(),
            start_time.elapsed()
        );

        Ok(evaluation)
    }

    /// See [`blacklist::add_terms`]
    pub fn add_blacklist(&self, update: &Blacklist) -> Result<Vec<String>> {
        blacklist::add_terms(self.blacklist.as_ref(), update)
    }

    /// See [`blacklist::remove_terms`]
    pub fn remove_blacklist<S: AsRef<str>>(&self, terms: &[S]) -> Result<Vec<String>> {
        blacklist::remove_terms(self.blacklist.as_ref(), terms)
    }

    fn validate_with(
        &self,
        view: &BlacklistView,
        input: &str,
        options: ValidateOptions,
    ) -> Result<Validation> {
        // Phrases only match the raw input; normalized text is judged word by word
        if let Some(phrase) = view.variants.find_first(input) {
            return Ok(phrase_match(input, phrase, options.verbose));
        }

        let normalized = sanitize(input, options.character_mapping);

        let words = self.segment_normalized(&normalized, &view.special)?;
        let hit = words.iter().find(|word| view.words.contains(word.as_str()));

        debug!(
            "Validated {:?}: segmented {:?}, match {:?}",
            input, words, hit
        );

        let mut validation = Validation {
            is_blacklisted: hit.is_some(),
            ..Default::default()
        };
        if options.verbose {
            validation.blacklist_match = hit.cloned();
            validation.original_string = Some(input.to_string());
            validation.substituted_string = Some(words.join(" "));
        }

        Ok(validation)
    }

    fn segment_normalized(&self, normalized: &str, special: &[String]) -> Result<Vec<String>> {
        if normalized.is_empty() {
            return Ok(Vec::new());
        }

        let costs = self.dictionary.resolve_costs(normalized, special)?;
        Segmenter::new(&costs, self.dictionary.max_word_length()).segment(normalized)
    }
}

fn phrase_match(input: &str, phrase: VariantMatch, verbose: bool) -> Validation {
    debug!("Phrase {:?} found in {:?}", phrase.pattern, input);

    if !verbose {
        return Validation {
            is_blacklisted: true,
            ..Default::default()
        };
    }

    Validation {
        is_blacklisted: true,
        blacklist_match: Some(phrase.pattern),
        original_string: Some(input.to_string()),
        substituted_string: Some(String::new()),
    }
}
