use super::error::FilterError;
use regex::{Regex, RegexBuilder};

/// String comparison rule applied uniformly across all active fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Case-insensitive containment.
    #[default]
    Substring,
    /// Case-insensitive full equality.
    Exact,
    /// Case-insensitive, unanchored regular expression.
    Regex,
}

/// One search term compiled for a scalar or list-valued string field.
#[derive(Debug, Clone)]
pub enum StringMatcher {
    Substring(String),
    Exact(String),
    Regex(Regex),
}

impl StringMatcher {
    /// Compile a raw term under the given mode. Regex compilation
    /// happens here so that a bad pattern fails the whole run up front.
    pub fn compile(mode: MatchMode, term: &str) -> Result<Self, FilterError> {
        match mode {
            MatchMode::Substring => Ok(StringMatcher::Substring(term.to_lowercase())),
            MatchMode::Exact => Ok(StringMatcher::Exact(term.to_lowercase())),
            MatchMode::Regex => compile_regex(term).map(StringMatcher::Regex),
        }
    }

    pub fn matches(&self, haystack: &str) -> bool {
        match self {
            StringMatcher::Substring(needle) => haystack.to_lowercase().contains(needle),
            StringMatcher::Exact(needle) => haystack.to_lowercase() == *needle,
            StringMatcher::Regex(re) => re.is_match(haystack),
        }
    }

    /// Absent field values never match.
    pub fn matches_opt(&self, haystack: Option<&str>) -> bool {
        haystack.is_some_and(|s| self.matches(s))
    }
}

/// One search term compiled for file-ownership matching.
///
/// The configured filesystem root is stripped from the term before
/// compilation in every mode, so `/usr/bin/foo` with root `/` compares
/// as `usr/bin/foo` against the root-relative file lists. Unlike
/// [`StringMatcher`], exact matching is a case-sensitive membership
/// test.
#[derive(Debug, Clone)]
pub enum FileMatcher {
    Substring(String),
    Exact(String),
    Regex(Regex),
}

impl FileMatcher {
    pub fn compile(mode: MatchMode, term: &str, root: &str) -> Result<Self, FilterError> {
        let term = term.strip_prefix(root).unwrap_or(term);
        match mode {
            MatchMode::Substring => Ok(FileMatcher::Substring(term.to_lowercase())),
            MatchMode::Exact => Ok(FileMatcher::Exact(term.to_string())),
            MatchMode::Regex => compile_regex(term).map(FileMatcher::Regex),
        }
    }

    pub fn matches(&self, file: &str) -> bool {
        match self {
            FileMatcher::Substring(needle) => file.to_lowercase().contains(needle),
            FileMatcher::Exact(needle) => file == needle,
            FileMatcher::Regex(re) => re.is_match(file),
        }
    }
}

fn compile_regex(pattern: &str) -> Result<Regex, FilterError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| FilterError::InvalidRegex {
            pattern: pattern.to_string(),
            source,
        })
}
