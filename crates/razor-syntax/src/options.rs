//! Parser options.

use crate::keywords::KeywordTable;

/// Nesting limit used when none is configured.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 256;

/// Options honoured by [`parse_with`](crate::parse_with).
///
/// ```
/// use razor_syntax::{KeywordTable, ParseOptions};
///
/// let options = ParseOptions::default()
///     .with_max_nesting_depth(64)
///     .with_strict_unterminated(false);
/// assert_eq!(options.max_nesting_depth, 64);
/// assert_eq!(options.reserved_keywords, KeywordTable::default());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Deepest allowed nesting of elements, blocks and type arguments.
    pub max_nesting_depth: usize,
    /// Words that make `@word` a directive or control construct.
    pub reserved_keywords: KeywordTable,
    /// When false, constructs still open at end of input are closed there
    /// and reported through [`Parse::truncated`](crate::Parse::truncated)
    /// instead of failing the parse.
    pub strict_unterminated: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            reserved_keywords: KeywordTable::default(),
            strict_unterminated: true,
        }
    }
}

impl ParseOptions {
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    pub fn with_reserved_keywords(mut self, keywords: KeywordTable) -> Self {
        self.reserved_keywords = keywords;
        self
    }

    pub fn with_strict_unterminated(mut self, strict: bool) -> Self {
        self.strict_unterminated = strict;
        self
    }
}
