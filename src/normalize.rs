//! Leet-speak and character normalization.
//!
//! Every string that reaches the dictionary or the segmenter goes through [`sanitize`] first,
//! so both sides of a comparison agree on a lowercase `a`-`z` alphabet.

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

/// Alternate glyphs for each letter, applied in table order.
///
/// Order matters: multi-character patterns such as `13` (b) must be rewritten before the
/// single-character ones that share a glyph (`1` for i).
const LEET_PATTERNS: &[(char, &str)] = &[
    ('a', r"4|/\\|@|/-\\"),
    ('b', r"8|13|!3|\(3|/3|\)3"),
    ('c', r"\[|¢|\("),
    ('d', r"\)|\|\)|\[\)|\|\}|\|\]"),
    ('e', r"3|£|€|\[-|\|=-"),
    ('f', r"\|=|\|#|/="),
    ('g', r"6|\(_\+|9"),
    (
        'h',
        r"#|/-/|\\-\\|\[-\]|\]-\[|\)-\(|\(-\)|\|~\||\|-\||\]~\[|1-1",
    ),
    ('i', r"1|\||!"),
    ('j', r",_\||_\||\._\||\._\]|_\]|,_\]|\]"),
    ('k', r"\|\(|\|<"),
    ('l', r"\|_"),
    ('n', r"\^/|\|\\\||/\\/|\[\\\]|\{\\\}|\^"),
    ('o', r"0|\(\)|\[\]"),
    ('p', r"\|\*"),
    ('q', r"\(_,\)|\(\)_|0_"),
    ('r', r"\|`|\|~|\|\?|/2|\|\^"),
    ('s', r"5|\$"),
    ('t', r"7|\+|-\|-"),
    ('u', r"\(_\)|\|_\|"),
    ('v', r"\\/|\|/|\\\|"),
    (
        'w',
        r"\\/\\/|'//|\\\\'|\\\^/|\\\|/|\\_\|_/|\\_:_/|\\\\//\\\\//",
    ),
    ('x', r"\}\{|\)\(|\]\["),
    ('z', r"2|7_"),
];

static LEET_TABLE: Lazy<Vec<(String, Regex)>> = Lazy::new(|| {
    LEET_PATTERNS
        .iter()
        .map(|(letter, pattern)| {
            let regex = Regex::new(pattern).expect("leet pattern must be a valid regex");
            (letter.to_string(), regex)
        })
        .collect()
});

/// Letters that have at least one leet substitution
pub fn mapped_letters() -> impl Iterator<Item = char> {
    LEET_PATTERNS.iter().map(|(letter, _)| *letter)
}

/// Remove everything that is not an ASCII letter
pub fn remove_special_characters(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_alphabetic()).collect()
}

/// Rewrite leet glyphs to their canonical letters, then strip what is left over
pub fn replace_leet(input: &str) -> String {
    let replaced = LEET_TABLE
        .iter()
        .fold(input.to_string(), |acc, (letter, regex)| {
            regex.replace_all(&acc, NoExpand(letter)).into_owned()
        });

    remove_special_characters(&replaced)
}

/// Lowercase `input` and reduce it to `a`-`z`.
///
/// With `character_mapping` the leet table is applied before stripping, so `7h3` becomes
/// `the`; without it digits and punctuation are simply dropped (`7h3` becomes `h`).
pub fn sanitize(input: &str, character_mapping: bool) -> String {
    let lowercase = input.to_lowercase();

    if character_mapping {
        replace_leet(&lowercase)
    } else {
        remove_special_characters(&lowercase)
    }
}
