use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};

/// Literal matcher for blacklisted multi-word phrases.
///
/// All phrases are searched in one pass with aho-corasick; if the automaton cannot be
/// built the matcher falls back to a plain substring scan.
pub struct VariantMatcher {
    patterns: Vec<String>,
    searcher: Option<AhoCorasick>,
}

/// A phrase found in the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantMatch {
    pub pattern: String,
    pub start: usize,
    pub end: usize,
}

impl VariantMatcher {
    /// Empty phrases are dropped, they would match every input
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        let patterns: Vec<String> = patterns
            .iter()
            .map(|p| p.as_ref().to_string())
            .filter(|p| !p.is_empty())
            .collect();

        let searcher = if patterns.is_empty() {
            None
        } else {
            AhoCorasickBuilder::new()
                .match_kind(MatchKind::LeftmostFirst)
                .build(&patterns)
                .ok()
        };

        Self { patterns, searcher }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Leftmost phrase occurrence in `text`; on a tie, the phrase listed first wins
    pub fn find_first(&self, text: &str) -> Option<VariantMatch> {
        if self.patterns.is_empty() {
            return None;
        }

        match &self.searcher {
            Some(searcher) => searcher.find(text).map(|mat| VariantMatch {
                pattern: self.patterns[mat.pattern().as_usize()].clone(),
                start: mat.start(),
                end: mat.end(),
            }),
            None => self.fallback_find_first(text),
        }
    }

    pub fn has_match(&self, text: &str) -> bool {
        self.find_first(text).is_some()
    }

    fn fallback_find_first(&self, text: &str) -> Option<VariantMatch> {
        self.patterns
            .iter()
            .filter_map(|pattern| {
                text.find(pattern.as_str()).map(|start| VariantMatch {
                    pattern: pattern.clone(),
                    start,
                    end: start + pattern.len(),
                })
            })
            .min_by_key(|mat| mat.start)
    }
}
