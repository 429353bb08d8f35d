//! # Raw Scanner - Context-Sensitive Tokens
//!
//! Razor cannot be tokenized by a regular lexer alone: whether `@` starts a
//! directive or an expression depends on a keyword table, whether `}` is
//! markup text or the end of a block depends on what encloses it, and where a
//! code region ends depends on C# string and comment syntax. This module
//! handles every one of those decisions.
//!
//! The parser drives the scanner one token at a time. Each call passes:
//!
//! - the [`ScannerState`] returned by the previous call (a `Copy` value, so
//!   there is no shared mutable lexer state),
//! - the byte offset to scan from,
//! - a [`Context`] naming which token kinds the grammar can accept here.
//!
//! and receives at most one [`Token`] plus the updated state.
//!
//! ## Special Kinds
//!
//! - [`SyntaxKind::IMPLICIT_EXPR_START`]: `@` followed by an identifier that
//!   is not reserved.
//! - [`SyntaxKind::CODE_BLOCK_START`]: `{` opening an opaque code region.
//! - [`SyntaxKind::RAW_TEXT`]: the opaque text of a code region, up to (not
//!   including) the matching `}`.
//!
//! ## Opaque Regions
//!
//! Region ends are found by [`CodeWalker`], which steps over C# one lexical
//! unit at a time so that delimiters inside string literals (regular,
//! verbatim, interpolated), character literals and comments are never
//! counted. The region's content is trimmed: leading and trailing whitespace
//! come back as separate [`SyntaxKind::WHITESPACE`] tokens so the opaque
//! token is exactly the code text.
//!
//! ```
//! use razor_syntax::scanner::{Context, Region, Scanner, ScannerState};
//! use razor_syntax::{KeywordTable, SyntaxKind};
//!
//! let source = r#"var x = "}"; }"#;
//! let keywords = KeywordTable::default();
//! let scanner = Scanner::new(source, &keywords);
//! let context = Context::Opaque { region: Region::Brace, content: SyntaxKind::RAW_TEXT };
//!
//! let scanned = scanner.scan(ScannerState::default(), 0, context).unwrap().unwrap();
//! assert_eq!(scanned.token.kind, SyntaxKind::RAW_TEXT);
//! assert_eq!(scanned.token.text, r#"var x = "}";"#);
//! ```

use log::trace;
use thiserror::Error;

use crate::conflicts::{Position, Production, resolve, starts_with_word};
use crate::keywords::KeywordTable;
use crate::lexer::{Token, lex_code, lex_tag};
use crate::syntax_kind::SyntaxKind;

/// State threaded between scanner calls.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScannerState {
    /// Markup is the body of a `{ ... }` block, so `}` closes it.
    pub in_block: bool,
    /// Brace depth of the opaque code region being scanned (0 outside one).
    pub code_depth: u32,
}

/// A delimited opaque region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// `{ ... }`
    Brace,
    /// `( ... )`
    Paren,
    /// `[ ... ]`
    Bracket,
    /// `case ... :`, ended by a colon outside any brackets
    CaseLabel,
    /// The rest of the line, outside any brackets
    Line,
}

impl Region {
    /// Opening delimiter, for regions that have one.
    pub fn opener(self) -> Option<(char, SyntaxKind)> {
        match self {
            Region::Brace => Some(('{', SyntaxKind::CODE_BLOCK_START)),
            Region::Paren => Some(('(', SyntaxKind::L_PAREN)),
            Region::Bracket => Some(('[', SyntaxKind::L_BRACKET)),
            Region::CaseLabel | Region::Line => None,
        }
    }

    /// Closing delimiter, for regions that have one.
    pub fn closer(self) -> Option<(char, SyntaxKind)> {
        match self {
            Region::Brace => Some(('}', SyntaxKind::R_BRACE)),
            Region::Paren => Some((')', SyntaxKind::R_PAREN)),
            Region::Bracket => Some((']', SyntaxKind::R_BRACKET)),
            Region::CaseLabel => Some((':', SyntaxKind::COLON)),
            Region::Line => None,
        }
    }

    fn pair(self) -> Option<(u8, u8)> {
        match self {
            Region::Brace => Some((b'{', b'}')),
            Region::Paren => Some((b'(', b')')),
            Region::Bracket => Some((b'[', b']')),
            Region::CaseLabel | Region::Line => None,
        }
    }
}

/// The kinds of token the grammar can accept at the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    /// Markup text, tags and `@` transitions. With `case_labels`, text also
    /// stops before `case` and `default` so a switch arm can end.
    Markup { case_labels: bool },
    /// Inside a start or end tag
    Tag,
    /// A tag name after `<` or `</`
    TagName,
    /// After `=` in an attribute. With `code` an unquoted value is C# and
    /// must balance its brackets.
    AttributeValue { code: bool },
    /// Inside a quoted attribute value. Without `transitions` the whole
    /// value is one opaque expression whose brackets must balance.
    QuotedValue { quote: char, transitions: bool },
    /// Identifiers, literals and punctuation
    Code,
    /// A dotted name
    QualifiedName,
    /// Expecting the opener of a region
    OpenRegion(Region),
    /// Inside a region: whitespace, one `content` token, whitespace, closer
    Opaque { region: Region, content: SyntaxKind },
    /// The member path after an implicit `@`
    MemberAccess,
    /// Inside `@* ... *@`
    RazorComment,
    /// Inside `<!-- ... -->`
    HtmlComment,
    /// Inside `<! ... >`
    Doctype,
}

/// One scanned token and the state to pass to the next call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scanned<'a> {
    pub token: Token<'a>,
    pub state: ScannerState,
}

/// A position the scanner cannot tokenize.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("cannot classify `{text}` at offset {offset}")]
    Unclassified { offset: usize, text: String },

    /// A closing bracket that matches nothing, or a value that ends while
    /// a bracket is still open.
    #[error("unbalanced {found} at offset {offset}")]
    Unbalanced {
        offset: usize,
        found: String,
        expected: Vec<SyntaxKind>,
    },
}

/// The context-sensitive scanner over one source buffer.
#[derive(Debug, Clone, Copy)]
pub struct Scanner<'a, 'k> {
    source: &'a str,
    keywords: &'k KeywordTable,
}

impl<'a, 'k> Scanner<'a, 'k> {
    pub fn new(source: &'a str, keywords: &'k KeywordTable) -> Self {
        Self { source, keywords }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Scan one token at `offset`. Returns `Ok(None)` at end of input (or,
    /// for [`Region::Line`], at the end of the line).
    pub fn scan(
        &self,
        state: ScannerState,
        offset: usize,
        context: Context,
    ) -> Result<Option<Scanned<'a>>, ScanError> {
        let rest = &self.source[offset..];
        if rest.is_empty() {
            return Ok(None);
        }
        let scanned = match context {
            Context::Markup { case_labels } => self.markup(state, offset, case_labels)?,
            Context::Tag => self.lexeme(state, offset, lex_tag),
            Context::TagName => self.tag_name(state, offset),
            Context::AttributeValue { code } => self.attribute_value(state, offset, code)?,
            Context::QuotedValue { quote, transitions } => {
                self.quoted_value(state, offset, quote, transitions)?
            }
            Context::Code => self.lexeme(state, offset, lex_code),
            Context::QualifiedName => match qualified_name_len(rest) {
                0 => self.lexeme(state, offset, lex_code),
                len => self.token(SyntaxKind::QUALIFIED_NAME, offset, len, state),
            },
            Context::OpenRegion(region) => self.open_region(state, offset, region),
            Context::Opaque { region, content } => {
                return Ok(self.opaque(state, offset, region, content));
            }
            Context::MemberAccess => match member_access_len(rest) {
                0 => self.lexeme(state, offset, lex_code),
                len => self.token(SyntaxKind::MEMBER_ACCESS, offset, len, state),
            },
            Context::RazorComment => {
                self.delimited(state, offset, "*@", SyntaxKind::RAZOR_COMMENT_CLOSE, SyntaxKind::COMMENT_CONTENT)
            }
            Context::HtmlComment => self.delimited(
                state,
                offset,
                "-->",
                SyntaxKind::HTML_COMMENT_CLOSE,
                SyntaxKind::HTML_COMMENT_CONTENT,
            ),
            Context::Doctype => {
                self.delimited(state, offset, ">", SyntaxKind::R_ANGLE, SyntaxKind::DOCTYPE_CONTENT)
            }
        };
        Ok(Some(scanned))
    }

    fn token(&self, kind: SyntaxKind, offset: usize, len: usize, state: ScannerState) -> Scanned<'a> {
        Scanned {
            token: Token {
                kind,
                text: &self.source[offset..offset + len],
                offset,
            },
            state,
        }
    }

    fn lexeme(
        &self,
        state: ScannerState,
        offset: usize,
        lex: fn(&str) -> Option<(SyntaxKind, usize)>,
    ) -> Scanned<'a> {
        let rest = &self.source[offset..];
        // `rest` is non-empty, so a lexeme (possibly UNKNOWN) always exists
        let (kind, len) = lex(rest).unwrap_or((SyntaxKind::UNKNOWN, first_char_len(rest)));
        self.token(kind, offset, len, state)
    }

    /// An `@` directly after an ASCII letter or digit is part of the text
    /// (e-mail addresses).
    fn at_is_literal(&self, offset: usize) -> bool {
        offset > 0 && self.source.as_bytes()[offset - 1].is_ascii_alphanumeric()
    }

    fn markup(
        &self,
        state: ScannerState,
        offset: usize,
        case_labels: bool,
    ) -> Result<Scanned<'a>, ScanError> {
        let rest = &self.source[offset..];
        if rest.starts_with('@') && !self.at_is_literal(offset) {
            return self.transition(state, offset);
        }
        if rest.starts_with('<') {
            let tag = match resolve(Position::TagOpen, rest, self.keywords) {
                Production::HtmlComment => Some((SyntaxKind::HTML_COMMENT_OPEN, 4)),
                Production::Doctype => Some((SyntaxKind::DOCTYPE_OPEN, 2)),
                Production::EndTag => Some((SyntaxKind::LT_SLASH, 2)),
                Production::StartTag => Some((SyntaxKind::L_ANGLE, 1)),
                _ => None,
            };
            if let Some((kind, len)) = tag {
                return Ok(self.token(kind, offset, len, state));
            }
        }
        if rest.starts_with('}') && state.in_block {
            return Ok(self.token(SyntaxKind::R_BRACE, offset, 1, state));
        }
        let len = self.text_len(offset, state, case_labels);
        Ok(self.token(SyntaxKind::TEXT, offset, len, state))
    }

    /// Length of the markup text run starting at `offset`. The first
    /// character always belongs to the run.
    fn text_len(&self, offset: usize, state: ScannerState, case_labels: bool) -> usize {
        let rest = &self.source[offset..];
        let mut prev: Option<char> = None;
        for (i, c) in rest.char_indices() {
            if i > 0 {
                let stop = match c {
                    '@' => !self.at_is_literal(offset + i),
                    '<' => resolve(Position::TagOpen, &rest[i..], self.keywords) != Production::Text,
                    '}' => state.in_block,
                    'c' | 'd' if case_labels => {
                        !prev.is_some_and(is_ident_continue)
                            && (starts_with_word(&rest[i..], "case")
                                || starts_with_word(&rest[i..], "default"))
                    }
                    _ => false,
                };
                if stop {
                    return i;
                }
            }
            prev = Some(c);
        }
        rest.len()
    }

    /// Classify the `@` at `offset`.
    fn transition(&self, state: ScannerState, offset: usize) -> Result<Scanned<'a>, ScanError> {
        let rest = &self.source[offset..];
        let word = 1 + ident_len(&rest[1..]);
        let production = resolve(Position::Transition, rest, self.keywords);
        trace!("transition at {offset}: {production:?}");
        let (kind, len) = match production {
            Production::RazorComment => (SyntaxKind::RAZOR_COMMENT_OPEN, 2),
            Production::EscapedAt => (SyntaxKind::ESCAPED_AT, 2),
            Production::CodeBlock | Production::ExplicitExpression | Production::Delegate => {
                (SyntaxKind::AT, 1)
            }
            Production::Directive => (SyntaxKind::DIRECTIVE_KEYWORD, word),
            Production::Control | Production::Continuation => (SyntaxKind::CONTROL_KEYWORD, word),
            Production::DirectiveOrStatement => {
                match resolve(Position::UsingKeyword, &rest[word..], self.keywords) {
                    Production::UsingStatement => (SyntaxKind::CONTROL_KEYWORD, word),
                    _ => (SyntaxKind::DIRECTIVE_KEYWORD, word),
                }
            }
            Production::ImplicitExpression => (SyntaxKind::IMPLICIT_EXPR_START, 1),
            _ => {
                let text: String = rest.chars().take(2).collect();
                return Err(ScanError::Unclassified { offset, text });
            }
        };
        Ok(self.token(kind, offset, len, state))
    }

    fn tag_name(&self, state: ScannerState, offset: usize) -> Scanned<'a> {
        let mut scanned = self.lexeme(state, offset, lex_tag);
        if scanned.token.kind == SyntaxKind::ATTRIBUTE_NAME {
            scanned.token.kind = SyntaxKind::TAG_NAME;
        }
        scanned
    }

    fn attribute_value(
        &self,
        state: ScannerState,
        offset: usize,
        code: bool,
    ) -> Result<Scanned<'a>, ScanError> {
        let rest = &self.source[offset..];
        let Some(c) = rest.chars().next() else {
            return Ok(self.lexeme(state, offset, lex_tag));
        };
        if c == '"' || c == '\'' {
            return Ok(self.token(SyntaxKind::QUOTE, offset, 1, state));
        }
        if c == '@' {
            return self.transition(state, offset);
        }
        if c.is_whitespace() || c == '>' || rest.starts_with("/>") {
            return Ok(self.lexeme(state, offset, lex_tag));
        }
        let len = rest
            .char_indices()
            .find(|&(i, c)| c.is_whitespace() || c == '>' || rest[i..].starts_with("/>"))
            .map_or(rest.len(), |(i, _)| i);
        if code && len < rest.len() {
            self.check_balanced(
                offset,
                len,
                &[SyntaxKind::WHITESPACE, SyntaxKind::R_ANGLE, SyntaxKind::SLASH_R_ANGLE],
            )?;
        }
        Ok(self.token(SyntaxKind::UNQUOTED_ATTRIBUTE_VALUE, offset, len, state))
    }

    fn quoted_value(
        &self,
        state: ScannerState,
        offset: usize,
        quote: char,
        transitions: bool,
    ) -> Result<Scanned<'a>, ScanError> {
        let rest = &self.source[offset..];
        if rest.starts_with(quote) {
            return Ok(self.token(SyntaxKind::QUOTE, offset, 1, state));
        }
        if !transitions {
            let len = match rest.find(quote) {
                Some(len) => {
                    self.check_balanced(offset, len, &[SyntaxKind::QUOTE])?;
                    len
                }
                None => rest.len(),
            };
            return Ok(self.token(SyntaxKind::CODE_EXPRESSION, offset, len, state));
        }
        if rest.starts_with('@') && !self.at_is_literal(offset) {
            return self.transition(state, offset);
        }
        let len = rest
            .char_indices()
            .skip(1)
            .find(|&(i, c)| c == quote || (c == '@' && !self.at_is_literal(offset + i)))
            .map_or(rest.len(), |(i, _)| i);
        Ok(self.token(SyntaxKind::ATTRIBUTE_CONTENT, offset, len, state))
    }

    /// Check that the code in `offset..offset + len` closes every bracket it
    /// opens, with the matching kind. `boundary` is what may follow the
    /// code once it is balanced.
    fn check_balanced(
        &self,
        offset: usize,
        len: usize,
        boundary: &[SyntaxKind],
    ) -> Result<(), ScanError> {
        let text = &self.source[offset..offset + len];
        let mut open = Vec::new();
        let mut stray = None;
        for (i, b) in CodeWalker::new(text) {
            match b {
                b'(' | b'[' | b'{' => open.push(b),
                b')' | b']' | b'}' => {
                    let opener = open.pop();
                    if opener.and_then(closer_of) != Some(b) {
                        stray = Some((i, opener));
                        break;
                    }
                }
                _ => {}
            }
        }
        let (at, opener) = match (stray, open.last()) {
            (Some(stray), _) => stray,
            (None, Some(&opener)) => (len, Some(opener)),
            (None, None) => return Ok(()),
        };
        let expected = match opener {
            Some(b'(') => vec![SyntaxKind::R_PAREN],
            Some(b'[') => vec![SyntaxKind::R_BRACKET],
            Some(_) => vec![SyntaxKind::R_BRACE],
            None => boundary.to_vec(),
        };
        let found = self.source[offset + at..].chars().next().map_or_else(
            || "end of input".to_string(),
            |c| format!("`{c}`"),
        );
        Err(ScanError::Unbalanced {
            offset: offset + at,
            found,
            expected,
        })
    }

    fn open_region(&self, state: ScannerState, offset: usize, region: Region) -> Scanned<'a> {
        match region.opener() {
            Some((opener, kind)) if self.source[offset..].starts_with(opener) => {
                let state = ScannerState {
                    code_depth: 1,
                    ..state
                };
                self.token(kind, offset, 1, state)
            }
            _ => self.lexeme(state, offset, lex_code),
        }
    }

    fn opaque(
        &self,
        state: ScannerState,
        offset: usize,
        region: Region,
        content: SyntaxKind,
    ) -> Option<Scanned<'a>> {
        let rest = &self.source[offset..];
        let end = match region {
            Region::Line => line_end(rest),
            _ => region_end(rest, region).unwrap_or(rest.len()),
        };
        let inside = &rest[..end];
        let inner = ScannerState {
            code_depth: state.code_depth.max(1),
            ..state
        };

        let leading = inside.len() - inside.trim_start().len();
        if leading > 0 {
            return Some(self.token(SyntaxKind::WHITESPACE, offset, leading, inner));
        }
        if end == 0 {
            let (closer, kind) = region.closer()?;
            if !rest.starts_with(closer) {
                return None;
            }
            trace!("region {region:?} closed at {offset}");
            let outer = ScannerState {
                code_depth: 0,
                ..state
            };
            return Some(self.token(kind, offset, 1, outer));
        }
        let len = inside.trim_end().len();
        Some(self.token(content, offset, len, inner))
    }

    fn delimited(
        &self,
        state: ScannerState,
        offset: usize,
        close: &str,
        close_kind: SyntaxKind,
        content_kind: SyntaxKind,
    ) -> Scanned<'a> {
        let rest = &self.source[offset..];
        if rest.starts_with(close) {
            return self.token(close_kind, offset, close.len(), state);
        }
        let len = rest.find(close).unwrap_or(rest.len());
        self.token(content_kind, offset, len, state)
    }
}

fn first_char_len(text: &str) -> usize {
    text.chars().next().map_or(0, char::len_utf8)
}

pub(crate) fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

pub(crate) fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Byte length of the identifier at the start of `text` (0 if none).
pub(crate) fn ident_len(text: &str) -> usize {
    let mut chars = text.char_indices();
    match chars.next() {
        Some((_, c)) if is_ident_start(c) => {}
        _ => return 0,
    }
    chars
        .find(|&(_, c)| !is_ident_continue(c))
        .map_or(text.len(), |(i, _)| i)
}

/// `Ident(.Ident)*`
fn qualified_name_len(text: &str) -> usize {
    let mut len = ident_len(text);
    if len == 0 {
        return 0;
    }
    while let Some(after) = text[len..].strip_prefix('.') {
        match ident_len(after) {
            0 => break,
            n => len += 1 + n,
        }
    }
    len
}

/// `Ident` followed by `.Ident`, `?.Ident`, `( ... )` and `[ ... ]` suffixes.
/// A trailing `.` or an unclosed group is left for the markup that follows.
fn member_access_len(text: &str) -> usize {
    let mut len = ident_len(text);
    if len == 0 {
        return 0;
    }
    loop {
        let tail = &text[len..];
        let step = if let Some(after) = tail.strip_prefix("?.") {
            Some(ident_len(after)).filter(|&n| n > 0).map(|n| n + 2)
        } else if let Some(after) = tail.strip_prefix('.') {
            Some(ident_len(after)).filter(|&n| n > 0).map(|n| n + 1)
        } else if tail.starts_with('(') || tail.starts_with('[') {
            group_len(tail)
        } else {
            None
        };
        match step {
            Some(n) => len += n,
            None => return len,
        }
    }
}

/// Length of the bracket group at the start of `text`, including both
/// delimiters, when it closes with the matching delimiter.
fn group_len(text: &str) -> Option<usize> {
    let opener = *text.as_bytes().first()?;
    let expected = match opener {
        b'(' => b')',
        b'[' => b']',
        _ => return None,
    };
    let mut depth = 0i64;
    for (i, b) in CodeWalker::new(text) {
        depth += nesting(b);
        if depth == 0 {
            return (b == expected).then_some(i + 1);
        }
    }
    None
}

fn closer_of(opener: u8) -> Option<u8> {
    match opener {
        b'(' => Some(b')'),
        b'[' => Some(b']'),
        b'{' => Some(b'}'),
        _ => None,
    }
}

fn nesting(b: u8) -> i64 {
    match b {
        b'(' | b'[' | b'{' => 1,
        b')' | b']' | b'}' => -1,
        _ => 0,
    }
}

/// Byte index of the delimiter that ends `region` in `text`, where `text`
/// starts just inside the region. `None` if input ends first. Case labels
/// and lines also end at a closing bracket that was never opened, which
/// the grammar then reports.
pub(crate) fn region_end(text: &str, region: Region) -> Option<usize> {
    match region.pair() {
        Some((open, close)) => {
            let mut depth = 1u32;
            for (i, b) in CodeWalker::new(text) {
                if b == open {
                    depth += 1;
                } else if b == close {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
            }
            None
        }
        None => {
            let mut depth = 0i64;
            for (i, b) in CodeWalker::new(text) {
                match region {
                    Region::CaseLabel if b == b':' && depth == 0 => return Some(i),
                    Region::Line if (b == b'\n' || b == b'\r') && depth == 0 => return Some(i),
                    _ => {}
                }
                depth += nesting(b);
                if depth < 0 {
                    return Some(i);
                }
            }
            None
        }
    }
}

/// End of a single-line expression: the first line break outside brackets.
/// At end of input inside an open bracket, the expression stops where the
/// brackets were last balanced.
fn line_end(text: &str) -> usize {
    if let Some(end) = region_end(text, Region::Line) {
        return end;
    }
    let mut depth = 0i64;
    let mut balanced = 0;
    for (i, b) in CodeWalker::new(text) {
        depth += nesting(b);
        if depth == 0 {
            balanced = i + 1;
        }
    }
    if depth == 0 { text.len() } else { balanced }
}

/// Re-run the balancing walk over opaque `text` taken from `region`.
///
/// For delimited regions only that region's delimiter pair is counted; for
/// case labels and single-line expressions all three bracket kinds are.
/// The text is balanced when the depth never drops below zero and ends at
/// zero.
pub fn is_balanced(text: &str, region: Region) -> bool {
    let mut depth = 0i64;
    for (_, b) in CodeWalker::new(text) {
        depth += match region.pair() {
            Some((open, _)) if b == open => 1,
            Some((_, close)) if b == close => -1,
            Some(_) => 0,
            None => nesting(b),
        };
        if depth < 0 {
            return false;
        }
    }
    depth == 0
}

/// Steps over C# text one lexical unit at a time, yielding only bytes that
/// are code: string literals, character literals and comments are skipped
/// whole.
///
/// All delimiters are ASCII, so walking bytes never splits a character that
/// matters.
pub(crate) struct CodeWalker<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> CodeWalker<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn bytes(&self) -> &'a [u8] {
        self.text.as_bytes()
    }

    fn find_from(&self, from: usize, needle: &str) -> Option<usize> {
        self.text.get(from..)?.find(needle).map(|i| from + i)
    }

    /// End of a regular string whose content starts at `from`. Regular
    /// strings cannot span lines; an unclosed one ends before the newline.
    fn string_end(&self, from: usize) -> usize {
        let bytes = self.bytes();
        let mut j = from;
        while j < bytes.len() {
            match bytes[j] {
                b'\\' => j += 2,
                b'"' => return j + 1,
                b'\n' => return j,
                _ => j += 1,
            }
        }
        bytes.len()
    }

    /// End of a verbatim string whose content starts at `from` (`""` escapes
    /// a quote).
    fn verbatim_end(&self, from: usize) -> usize {
        let bytes = self.bytes();
        let mut j = from;
        while j < bytes.len() {
            if bytes[j] == b'"' {
                if bytes.get(j + 1) == Some(&b'"') {
                    j += 2;
                    continue;
                }
                return j + 1;
            }
            j += 1;
        }
        bytes.len()
    }

    /// End of an interpolated string whose content starts at `from`.
    /// `{{` is a literal brace; a single `{` opens a hole of code, which may
    /// hold strings of its own, up to its matching `}`.
    fn interpolated_end(&self, from: usize, verbatim: bool) -> usize {
        let bytes = self.bytes();
        let mut j = from;
        while j < bytes.len() {
            match bytes[j] {
                b'{' if bytes.get(j + 1) == Some(&b'{') => j += 2,
                b'{' => j = self.hole_end(j + 1),
                b'"' if verbatim && bytes.get(j + 1) == Some(&b'"') => j += 2,
                b'"' => return j + 1,
                b'\\' if !verbatim => j += 2,
                b'\n' if !verbatim => return j,
                _ => j += 1,
            }
        }
        bytes.len()
    }

    /// Just past the `}` that closes the interpolation hole starting at
    /// `from`.
    fn hole_end(&self, from: usize) -> usize {
        let mut depth = 1u32;
        let hole = CodeWalker {
            text: self.text,
            pos: from,
        };
        for (i, b) in hole {
            match b {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return i + 1;
                    }
                }
                _ => {}
            }
        }
        self.text.len()
    }

    /// End of the character literal at `at`, if it is well formed.
    /// Otherwise the quote is an ordinary character.
    fn char_literal_end(&self, at: usize) -> Option<usize> {
        let bytes = self.bytes();
        if bytes.get(at + 1) == Some(&b'\\') {
            let limit = (at + 12).min(bytes.len());
            return (at + 3..limit)
                .take_while(|&j| bytes[j - 1] != b'\n')
                .find(|&j| bytes[j] == b'\'')
                .map(|j| j + 1);
        }
        let c = self.text.get(at + 1..)?.chars().next()?;
        if c == '\'' || c == '\n' {
            return None;
        }
        let close = at + 1 + c.len_utf8();
        (bytes.get(close) == Some(&b'\'')).then_some(close + 1)
    }
}

impl Iterator for CodeWalker<'_> {
    type Item = (usize, u8);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let i = self.pos;
            let b = *self.bytes().get(i)?;
            let rest = &self.bytes()[i..];
            self.pos = if rest.starts_with(b"//") {
                self.find_from(i, "\n").unwrap_or(self.text.len())
            } else if rest.starts_with(b"/*") {
                self.find_from(i + 2, "*/").map_or(self.text.len(), |j| j + 2)
            } else if rest.starts_with(b"@\"") {
                self.verbatim_end(i + 2)
            } else if rest.starts_with(b"$@\"") || rest.starts_with(b"@$\"") {
                self.interpolated_end(i + 3, true)
            } else if rest.starts_with(b"$\"") {
                self.interpolated_end(i + 2, false)
            } else if b == b'"' {
                self.string_end(i + 1)
            } else if let Some(end) = (b == b'\'').then(|| self.char_literal_end(i)).flatten() {
                end
            } else {
                self.pos = i + 1;
                return Some((i, b));
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const BRACE: Context = Context::Opaque {
        region: Region::Brace,
        content: SyntaxKind::RAW_TEXT,
    };

    fn scan_one(source: &str, state: ScannerState, context: Context) -> Option<(SyntaxKind, &str)> {
        let keywords = KeywordTable::default();
        Scanner::new(source, &keywords)
            .scan(state, 0, context)
            .expect("scan")
            .map(|scanned| (scanned.token.kind, scanned.token.text))
    }

    /// Scan the whole input in one context.
    fn scan_all(source: &str, context: Context) -> Vec<(SyntaxKind, &str)> {
        let keywords = KeywordTable::default();
        let scanner = Scanner::new(source, &keywords);
        let mut state = ScannerState::default();
        let mut offset = 0;
        let mut out = Vec::new();
        while let Some(scanned) = scanner.scan(state, offset, context).expect("scan") {
            out.push((scanned.token.kind, scanned.token.text));
            offset = scanned.token.end();
            state = scanned.state;
        }
        out
    }

    fn markup() -> Context {
        Context::Markup { case_labels: false }
    }

    #[rstest]
    #[case("@Model.Name", SyntaxKind::IMPLICIT_EXPR_START, "@")]
    #[case("@if (x)", SyntaxKind::CONTROL_KEYWORD, "@if")]
    #[case("@model Foo", SyntaxKind::DIRECTIVE_KEYWORD, "@model")]
    #[case("@using System", SyntaxKind::DIRECTIVE_KEYWORD, "@using")]
    #[case("@using (var s = x)", SyntaxKind::CONTROL_KEYWORD, "@using")]
    #[case("@{ }", SyntaxKind::AT, "@")]
    #[case("@(x)", SyntaxKind::AT, "@")]
    #[case("@@", SyntaxKind::ESCAPED_AT, "@@")]
    #[case("@* c *@", SyntaxKind::RAZOR_COMMENT_OPEN, "@*")]
    #[case("<div>", SyntaxKind::L_ANGLE, "<")]
    #[case("</div>", SyntaxKind::LT_SLASH, "</")]
    #[case("<!-- x -->", SyntaxKind::HTML_COMMENT_OPEN, "<!--")]
    #[case("<!DOCTYPE html>", SyntaxKind::DOCTYPE_OPEN, "<!")]
    #[case("a < b", SyntaxKind::TEXT, "a < b")]
    fn markup_classification(#[case] source: &str, #[case] kind: SyntaxKind, #[case] text: &str) {
        assert_eq!(
            scan_one(source, ScannerState::default(), markup()),
            Some((kind, text))
        );
    }

    #[test]
    fn unclassifiable_at_is_an_error() {
        let keywords = KeywordTable::default();
        let scanner = Scanner::new("x @ y", &keywords);
        let err = scanner
            .scan(ScannerState::default(), 2, markup())
            .unwrap_err();
        assert_eq!(
            err,
            ScanError::Unclassified {
                offset: 2,
                text: "@ ".to_string()
            }
        );
    }

    #[test]
    fn email_addresses_stay_text() {
        assert_eq!(
            scan_all("mail me@example.com now", markup()),
            vec![(SyntaxKind::TEXT, "mail me@example.com now")]
        );
    }

    #[test]
    fn text_stops_at_transitions_and_tags() {
        assert_eq!(
            scan_all("a @b", markup())[0],
            (SyntaxKind::TEXT, "a ")
        );
        assert_eq!(
            scan_all("one <b>", markup())[0],
            (SyntaxKind::TEXT, "one ")
        );
    }

    #[test]
    fn closing_brace_depends_on_block_state() {
        let outside = ScannerState::default();
        let inside = ScannerState {
            in_block: true,
            ..outside
        };
        assert_eq!(scan_one("x } y", outside, markup()), Some((SyntaxKind::TEXT, "x } y")));
        assert_eq!(scan_one("x } y", inside, markup()), Some((SyntaxKind::TEXT, "x ")));
        assert_eq!(scan_one("} y", inside, markup()), Some((SyntaxKind::R_BRACE, "}")));
    }

    #[test]
    fn case_labels_end_text() {
        let context = Context::Markup { case_labels: true };
        assert_eq!(
            scan_one(" one\n case 2:", ScannerState::default(), context),
            Some((SyntaxKind::TEXT, " one\n "))
        );
        assert_eq!(
            scan_one(" showcase", ScannerState::default(), context),
            Some((SyntaxKind::TEXT, " showcase"))
        );
    }

    #[test]
    fn raw_text_ignores_brace_in_string() {
        assert_eq!(
            scan_all(r#" var x = "}"; }"#, BRACE),
            vec![
                (SyntaxKind::WHITESPACE, " "),
                (SyntaxKind::RAW_TEXT, r#"var x = "}";"#),
                (SyntaxKind::WHITESPACE, " "),
                (SyntaxKind::R_BRACE, "}"),
            ]
        );
    }

    #[rstest]
    #[case("if (a) { b(); } }", "if (a) { b(); }")]
    #[case("var s = @\"a\"\"}\"; }", "var s = @\"a\"\"}\";")]
    #[case("var s = $\"{x}}\"; }", "var s = $\"{x}}\";")]
    #[case("var s = $\"{(ok ? \"}\" : \"\")}\"; }", "var s = $\"{(ok ? \"}\" : \"\")}\";")]
    #[case("var s = $\"{{ {x} }}\"; }", "var s = $\"{{ {x} }}\";")]
    #[case("var s = $@\"{\"}\"}\n\"\"\"; }", "var s = $@\"{\"}\"}\n\"\"\";")]
    #[case("var c = '}'; }", "var c = '}';")]
    #[case("var c = '\\''; }", "var c = '\\'';")]
    #[case("// }\n x(); }", "// }\n x();")]
    #[case("/* } */ }", "/* } */")]
    fn raw_text_skips_literals_and_comments(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(
            scan_one(source, ScannerState::default(), BRACE),
            Some((SyntaxKind::RAW_TEXT, expected))
        );
    }

    #[test]
    fn lone_apostrophe_is_ordinary() {
        // `'` that does not form a char literal must not hide the closer
        assert_eq!(
            scan_one("x = it's } tail", ScannerState::default(), BRACE),
            Some((SyntaxKind::RAW_TEXT, "x = it's"))
        );
    }

    #[test]
    fn unterminated_region_runs_to_end() {
        assert_eq!(
            scan_all("var x = 1;\n", BRACE),
            vec![
                (SyntaxKind::RAW_TEXT, "var x = 1;"),
                (SyntaxKind::WHITESPACE, "\n"),
            ]
        );
    }

    #[test]
    fn open_region_sets_depth_and_closer_clears_it() {
        let keywords = KeywordTable::default();
        let scanner = Scanner::new("{}", &keywords);
        let open = scanner
            .scan(ScannerState::default(), 0, Context::OpenRegion(Region::Brace))
            .unwrap()
            .unwrap();
        assert_eq!(open.token.kind, SyntaxKind::CODE_BLOCK_START);
        assert_eq!(open.state.code_depth, 1);
        let close = scanner.scan(open.state, 1, BRACE).unwrap().unwrap();
        assert_eq!(close.token.kind, SyntaxKind::R_BRACE);
        assert_eq!(close.state.code_depth, 0);
    }

    #[test]
    fn case_label_stops_at_stray_closer() {
        let context = Context::Opaque {
            region: Region::CaseLabel,
            content: SyntaxKind::CODE_EXPRESSION,
        };
        // Nothing closes the label at `)`; the grammar reports it
        assert_eq!(
            scan_all(" a): <p>x</p>", context),
            vec![
                (SyntaxKind::WHITESPACE, " "),
                (SyntaxKind::CODE_EXPRESSION, "a"),
            ]
        );
    }

    #[test]
    fn case_label_region() {
        let context = Context::Opaque {
            region: Region::CaseLabel,
            content: SyntaxKind::CODE_EXPRESSION,
        };
        assert_eq!(
            scan_all(" Kind.A when (x ? 1 : 2) > 0:", context),
            vec![
                (SyntaxKind::WHITESPACE, " "),
                (SyntaxKind::CODE_EXPRESSION, "Kind.A when (x ? 1 : 2) > 0"),
                (SyntaxKind::COLON, ":"),
            ]
        );
    }

    #[test]
    fn line_region_stops_at_newline() {
        let context = Context::Opaque {
            region: Region::Line,
            content: SyntaxKind::CODE_EXPRESSION,
        };
        assert_eq!(
            scan_all(" Format(a,\n b) \n<p>", context),
            vec![
                (SyntaxKind::WHITESPACE, " "),
                (SyntaxKind::CODE_EXPRESSION, "Format(a,\n b)"),
                (SyntaxKind::WHITESPACE, " "),
            ]
        );
    }

    #[rstest]
    #[case("Model.Name</p>", "Model.Name")]
    #[case("Model.Name. End", "Model.Name")]
    #[case("Items[0].Title!", "Items[0].Title")]
    #[case("Format(\")\", x).Length", "Format(\")\", x).Length")]
    #[case("user?.Name", "user?.Name")]
    #[case("Call(a, b", "Call")]
    #[case("Call(a]", "Call")]
    #[case("Größe", "Größe")]
    fn member_access(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(
            scan_one(source, ScannerState::default(), Context::MemberAccess),
            Some((SyntaxKind::MEMBER_ACCESS, expected))
        );
    }

    #[test]
    fn quoted_value_with_transitions() {
        let context = Context::QuotedValue {
            quote: '"',
            transitions: true,
        };
        assert_eq!(
            scan_all("btn @cls a@b.c\"", context),
            vec![
                (SyntaxKind::ATTRIBUTE_CONTENT, "btn "),
                (SyntaxKind::IMPLICIT_EXPR_START, "@"),
                (SyntaxKind::ATTRIBUTE_CONTENT, "cls a@b.c"),
                (SyntaxKind::QUOTE, "\""),
            ]
        );
    }

    #[test]
    fn directive_attribute_value_is_opaque() {
        let context = Context::QuotedValue {
            quote: '"',
            transitions: false,
        };
        assert_eq!(
            scan_all("() => Go(1)\"", context),
            vec![
                (SyntaxKind::CODE_EXPRESSION, "() => Go(1)"),
                (SyntaxKind::QUOTE, "\""),
            ]
        );
    }

    #[rstest]
    #[case("Go(\">x", 3, "`\"`", vec![SyntaxKind::R_PAREN])]
    #[case("a}\">x", 1, "`}`", vec![SyntaxKind::QUOTE])]
    #[case("f(x]\">x", 3, "`]`", vec![SyntaxKind::R_PAREN])]
    fn directive_attribute_value_must_balance(
        #[case] source: &str,
        #[case] offset: usize,
        #[case] found: &str,
        #[case] expected: Vec<SyntaxKind>,
    ) {
        let keywords = KeywordTable::default();
        let context = Context::QuotedValue {
            quote: '"',
            transitions: false,
        };
        let err = Scanner::new(source, &keywords)
            .scan(ScannerState::default(), 0, context)
            .unwrap_err();
        assert_eq!(
            err,
            ScanError::Unbalanced {
                offset,
                found: found.to_string(),
                expected,
            }
        );
    }

    #[test]
    fn unquoted_directive_value_must_balance() {
        let keywords = KeywordTable::default();
        let scanner = Scanner::new("Go( />", &keywords);
        let code = Context::AttributeValue { code: true };
        assert!(matches!(
            scanner.scan(ScannerState::default(), 0, code),
            Err(ScanError::Unbalanced { offset: 3, .. })
        ));
        // Plain HTML values are not code
        assert_eq!(
            scan_one("a}>", ScannerState::default(), Context::AttributeValue { code: false }),
            Some((SyntaxKind::UNQUOTED_ATTRIBUTE_VALUE, "a}"))
        );
        assert_eq!(
            scan_one("Go(1)>", ScannerState::default(), code),
            Some((SyntaxKind::UNQUOTED_ATTRIBUTE_VALUE, "Go(1)"))
        );
    }

    #[test]
    fn unquoted_attribute_value() {
        assert_eq!(
            scan_one("main/>", ScannerState::default(), Context::AttributeValue { code: false }),
            Some((SyntaxKind::UNQUOTED_ATTRIBUTE_VALUE, "main"))
        );
    }

    #[test]
    fn qualified_names() {
        assert_eq!(
            scan_all("System.Collections.Generic.List<", Context::QualifiedName)[0],
            (SyntaxKind::QUALIFIED_NAME, "System.Collections.Generic.List")
        );
    }

    #[test]
    fn comment_bodies() {
        assert_eq!(
            scan_all(" a * b *@", Context::RazorComment),
            vec![
                (SyntaxKind::COMMENT_CONTENT, " a * b "),
                (SyntaxKind::RAZOR_COMMENT_CLOSE, "*@"),
            ]
        );
        assert_eq!(
            scan_all(" -- -->", Context::HtmlComment),
            vec![
                (SyntaxKind::HTML_COMMENT_CONTENT, " -- "),
                (SyntaxKind::HTML_COMMENT_CLOSE, "-->"),
            ]
        );
    }

    #[rstest]
    #[case("a { b } c", Region::Brace, true)]
    #[case("a } {", Region::Brace, false)]
    #[case("\"{\" x", Region::Brace, true)]
    #[case("f(x[0])", Region::Paren, true)]
    #[case("f(", Region::Paren, false)]
    #[case("a[(]", Region::Line, false)]
    #[case("$\"{ \"}\" }\"", Region::Brace, true)]
    fn balance_check(#[case] text: &str, #[case] region: Region, #[case] expected: bool) {
        assert_eq!(is_balanced(text, region), expected);
    }

    #[test]
    fn walker_yields_only_code_bytes() {
        let code: String = CodeWalker::new(r#"a"{"b/*{*/c'{'d"#)
            .map(|(_, b)| b as char)
            .collect();
        assert_eq!(code, "abcd");
    }
}
