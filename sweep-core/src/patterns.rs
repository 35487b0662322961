//! Compiled ignore-pattern set.
//!
//! Patterns are globs unless prefixed with `re:`, in which case the rest is an
//! unanchored regular expression. Both kinds match against the full
//! repository-relative path. Globs are compiled with `*` allowed to cross `/`,
//! so `*test*` excludes `pkg/a_test.py`.

use std::fmt;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use regex::RegexSet;

use crate::error::ConfigError;

const REGEX_PREFIX: &str = "re:";

/// One ignore pattern as written by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnorePattern {
    Glob(String),
    Regex(String),
}

impl IgnorePattern {
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix(REGEX_PREFIX) {
            Some(re) => IgnorePattern::Regex(re.to_string()),
            None => IgnorePattern::Glob(raw.to_string()),
        }
    }
}

impl fmt::Display for IgnorePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnorePattern::Glob(g) => write!(f, "{g}"),
            IgnorePattern::Regex(r) => write!(f, "{REGEX_PREFIX}{r}"),
        }
    }
}

/// Split a flat comma-separated pattern string into individual patterns.
///
/// Whitespace around each entry is trimmed and empty entries are dropped.
pub fn split_pattern_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Ordered, compiled set of ignore patterns.
#[derive(Debug, Clone)]
pub struct IgnoreSet {
    patterns: Vec<IgnorePattern>,
    globs: GlobSet,
    regexes: RegexSet,
}

impl Default for IgnoreSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl IgnoreSet {
    /// A set that ignores nothing.
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
            globs: GlobSet::empty(),
            regexes: RegexSet::empty(),
        }
    }

    /// Compile `patterns` in order. The first pattern that fails to compile
    /// is reported as [`ConfigError::InvalidPattern`].
    pub fn compile<I, S>(patterns: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = Vec::new();
        let mut globs = GlobSetBuilder::new();
        let mut regex_sources = Vec::new();

        for raw in patterns {
            let raw = raw.as_ref().trim();
            if raw.is_empty() {
                continue;
            }
            let pattern = IgnorePattern::parse(raw);
            match &pattern {
                IgnorePattern::Glob(g) => {
                    let glob = GlobBuilder::new(g)
                        .literal_separator(false)
                        .build()
                        .map_err(|e| invalid(raw, e))?;
                    globs.add(glob);
                }
                IgnorePattern::Regex(r) => {
                    // Compile individually so the error names the bad pattern.
                    regex::Regex::new(r).map_err(|e| invalid(raw, e))?;
                    regex_sources.push(r.clone());
                }
            }
            parsed.push(pattern);
        }

        let globs = globs.build().map_err(|e| invalid("<glob set>", e))?;
        let regexes = RegexSet::new(&regex_sources).map_err(|e| invalid("<regex set>", e))?;

        Ok(Self {
            patterns: parsed,
            globs,
            regexes,
        })
    }

    /// Compile a flat comma-separated pattern string.
    pub fn from_flat(raw: &str) -> Result<Self, ConfigError> {
        Self::compile(split_pattern_list(raw))
    }

    /// True when `path` matches at least one pattern.
    pub fn is_ignored(&self, path: &str) -> bool {
        self.globs.is_match(path) || self.regexes.is_match(path)
    }

    pub fn patterns(&self) -> &[IgnorePattern] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

fn invalid(pattern: &str, err: impl fmt::Display) -> ConfigError {
    ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        message: err.to_string(),
    }
}
