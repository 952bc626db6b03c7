//! Glob patterns for page URLs.

use glob::{MatchOptions, Pattern, PatternError};

const URL_MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A compiled URL glob.
///
/// `**` matches any run of characters, `*` any run without `/`, `?` a single
/// character other than `/`, and `[...]` a character class. The pattern must
/// cover the whole URL.
#[derive(Debug, Clone)]
pub struct UrlPattern {
    pattern: Pattern,
}

impl UrlPattern {
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        Ok(Self {
            pattern: Pattern::new(pattern)?,
        })
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }

    /// True for the catch-all pattern `**`.
    pub fn matches_everything(&self) -> bool {
        self.as_str() == "**"
    }

    pub fn is_match(&self, url: &str) -> bool {
        self.matches_everything() || self.pattern.matches_with(url, URL_MATCH_OPTIONS)
    }
}
