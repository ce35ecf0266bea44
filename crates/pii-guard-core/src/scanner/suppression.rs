use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// Exclusion patterns targeting common placeholder and test values.
const DEFAULT_EXCLUSIONS: &[&str] = &[
    r"example\.com",
    r"test@",
    r"user@",
    r"localhost",
    r"127\.0\.0\.1",
    r"0\.0\.0\.0",
    r"255\.255\.255",
    r"192\.168\.",
    r"10\.0\.",
];

/// Comment-opening markers across the scanned languages. Markers alone never
/// suppress; they only count combined with a test/example signal in the
/// matched text itself.
const COMMENT_MARKERS: &[&str] = &["//", "#", "/*", "*/", "<!--", "-->"];

static COMMENT_AUTOMATON: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::new(COMMENT_MARKERS).expect("comment marker set is a valid literal automaton")
});

/// Decides whether a raw match is a likely false positive.
///
/// Heuristic, not a guarantee: both false negatives and false positives are
/// expected and accepted.
#[derive(Debug)]
pub struct SuppressionFilter {
    exclusions: Vec<Regex>,
}

impl Default for SuppressionFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUSIONS.iter().copied())
            .expect("default exclusion table must be valid")
    }
}

impl SuppressionFilter {
    /// Build a filter from exclusion patterns, compiled case-insensitively.
    pub fn new<'a>(patterns: impl IntoIterator<Item = &'a str>) -> Result<Self, regex::Error> {
        let exclusions = patterns
            .into_iter()
            .map(|pattern| RegexBuilder::new(pattern).case_insensitive(true).build())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { exclusions })
    }

    /// Rule 1: the matched text satisfies an exclusion pattern.
    /// Rule 2: the source line carries a comment marker AND the matched text
    /// carries an explicit example/test signal. Either rule suppresses.
    pub fn is_false_positive(&self, matched: &str, source_line: &str) -> bool {
        if self.exclusions.iter().any(|rule| rule.is_match(matched)) {
            return true;
        }

        if COMMENT_AUTOMATON.is_match(source_line)
            && (matched.contains("@example") || matched.to_ascii_lowercase().contains("test"))
        {
            return true;
        }

        false
    }
}
