//! # Parser - Event-Based Tree Construction
//!
//! This module implements the core parsing logic, pulling tokens from the
//! [`Scanner`] and emitting **events** in the rust-analyzer style.
//!
//! ## Pulling Tokens
//!
//! Razor cannot be tokenized up front: what `@`, `}` or a quote means depends
//! on where the parser is. So there is no token vector to walk. Grammar
//! functions name a [`Context`] whenever they look at input, and the parser
//! asks the scanner for one token in that context:
//!
//! ```ignore
//! if p.at(CODE, SyntaxKind::L_BRACE) {   // scan one token in CODE context
//!     p.bump(CODE);                       // consume it
//! }
//! ```
//!
//! The last scan is cached by `(offset, context, state)`, so peeking and then
//! bumping scans once. Every bumped token is kept so the [`Sink`] can attach
//! its text.
//!
//! ## The Event Model
//!
//! Parsing produces events like:
//! ```text
//! Start(RAZOR_IF)
//! Token(CONTROL_KEYWORD)
//! Token(WHITESPACE)
//! Token(L_PAREN)
//! Token(CODE_EXPRESSION)
//! Token(R_PAREN)
//! ...
//! Finish
//! ```
//!
//! ## The Marker System
//!
//! When you call `parser.start()`, you get a [`Marker`]. This marker **must**
//! be either:
//!
//! - Completed with `marker.complete(parser, KIND)` → emits Start+Finish
//! - Abandoned with `marker.abandon(parser)` → removes the placeholder
//!
//! If you drop a marker without doing either, **the program panics**.
//!
//! ## Errors Halt, Markers Still Complete
//!
//! The first fatal error is recorded and the parser halts: from then on every
//! lookahead reports end of input. Grammar loops therefore finish on their
//! own, every open marker is completed on the way out, and [`Parser::parse`]
//! returns the recorded error instead of a tree.
//!
//! ## Module Structure
//!
//! - [`event`] - The Event enum
//! - [`sink`] - Converts events to a Rowan green tree
//! - `grammar` - Grammar rules (document, markup, razor, control)

pub mod event;
pub mod sink;

mod grammar;

use log::{debug, warn};
use rowan::GreenNode;

use crate::ast::Document;
use crate::conflicts::{self, Position, Production};
use crate::error::{Construct, ParseError};
use crate::keywords::KeywordTable;
use crate::lexer::Token;
use crate::options::ParseOptions;
use crate::scanner::{Context, Scanned, Scanner, ScannerState};
use crate::syntax_kind::{SyntaxKind, SyntaxNode};
use event::Event;
use sink::Sink;

/// The parser state machine.
///
/// Grammar functions receive `&mut Parser` and use its methods to:
///
/// - Inspect tokens: `peek()`, `at()`, `kind_after_trivia()`, `resolve()`
/// - Consume tokens: `bump()`, `bump_as()`, `eat()`, `expect()`
/// - Build structure: `start()` → `Marker` → `complete()`/`abandon()`
pub struct Parser<'a, 'o> {
    scanner: Scanner<'a, 'o>,
    options: &'o ParseOptions,
    pos: usize,
    state: ScannerState,
    peeked: Option<Peeked<'a>>,
    tokens: Vec<Token<'a>>,
    events: Vec<Event>,
    depth: usize,
    error: Option<ParseError>,
    truncated: Vec<Truncation>,
}

#[derive(Debug, Clone, Copy)]
struct Peeked<'a> {
    offset: usize,
    context: Context,
    state: ScannerState,
    scanned: Option<Scanned<'a>>,
}

impl<'a, 'o> Parser<'a, 'o> {
    pub fn new(source: &'a str, options: &'o ParseOptions) -> Self {
        Self {
            scanner: Scanner::new(source, &options.reserved_keywords),
            options,
            pos: 0,
            state: ScannerState::default(),
            peeked: None,
            tokens: Vec::new(),
            events: Vec::new(),
            depth: 0,
            error: None,
            truncated: Vec::new(),
        }
    }

    /// Parse the whole source.
    pub fn parse(mut self) -> Result<Parse, ParseError> {
        grammar::document(&mut self);
        if let Some(err) = self.error {
            debug!("parse failed: {err}");
            return Err(err);
        }
        let green = Sink::new(&self.tokens, self.events).finish();
        debug!(
            "parsed {} bytes into {} tokens",
            self.pos,
            self.tokens.len()
        );
        Ok(Parse {
            green,
            truncated: self.truncated,
        })
    }

    /// Start a new node and return a marker.
    pub fn start(&mut self) -> Marker {
        let pos = self.events.len();
        self.events.push(Event::Placeholder);
        Marker {
            pos,
            completed: false,
        }
    }

    /// Byte offset of the next unconsumed character.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// The unconsumed input.
    pub fn rest(&self) -> &'a str {
        &self.scanner.source()[self.pos..]
    }

    pub fn at_end(&self) -> bool {
        self.rest().is_empty()
    }

    pub fn keywords(&self) -> &'o KeywordTable {
        &self.options.reserved_keywords
    }

    /// Whether a fatal error has been recorded.
    pub fn is_halted(&self) -> bool {
        self.error.is_some()
    }

    /// Set whether markup is inside a `{ ... }` body, returning the old value.
    pub fn set_in_block(&mut self, in_block: bool) -> bool {
        std::mem::replace(&mut self.state.in_block, in_block)
    }

    /// Resolve a conflict against the unconsumed input. A halted parser
    /// resolves nothing.
    pub fn resolve(&self, position: Position) -> Production {
        if self.is_halted() {
            return Production::Unclassified;
        }
        conflicts::resolve(position, self.rest(), self.keywords())
    }

    fn scan(&mut self, context: Context) -> Option<Scanned<'a>> {
        if self.error.is_some() {
            return None;
        }
        if let Some(peeked) = self.peeked {
            if peeked.offset == self.pos && peeked.context == context && peeked.state == self.state
            {
                return peeked.scanned;
            }
        }
        match self.scanner.scan(self.state, self.pos, context) {
            Ok(scanned) => {
                self.peeked = Some(Peeked {
                    offset: self.pos,
                    context,
                    state: self.state,
                    scanned,
                });
                scanned
            }
            Err(err) => {
                self.error(err.into());
                None
            }
        }
    }

    /// The next token in `context`, or `None` at end of input.
    pub fn peek(&mut self, context: Context) -> Option<Token<'a>> {
        self.scan(context).map(|scanned| scanned.token)
    }

    /// Kind of the next token, or EOF.
    pub fn current(&mut self, context: Context) -> SyntaxKind {
        self.peek(context).map_or(SyntaxKind::EOF, |token| token.kind)
    }

    pub fn at(&mut self, context: Context, kind: SyntaxKind) -> bool {
        self.current(context) == kind
    }

    /// Kind of the first token after any whitespace, without consuming.
    pub fn kind_after_trivia(&mut self, context: Context) -> SyntaxKind {
        let Some(first) = self.scan(context) else {
            return SyntaxKind::EOF;
        };
        if first.token.kind != SyntaxKind::WHITESPACE {
            return first.token.kind;
        }
        match self.scanner.scan(first.state, first.token.end(), context) {
            Ok(Some(next)) => next.token.kind,
            Ok(None) => SyntaxKind::EOF,
            Err(_) => SyntaxKind::UNKNOWN,
        }
    }

    /// Consume the next token.
    pub fn bump(&mut self, context: Context) {
        if let Some(scanned) = self.scan(context) {
            self.push(scanned, scanned.token.kind);
        }
    }

    /// Consume the next token, recording it with a different kind.
    pub fn bump_as(&mut self, context: Context, kind: SyntaxKind) {
        if let Some(scanned) = self.scan(context) {
            self.push(scanned, kind);
        }
    }

    fn push(&mut self, scanned: Scanned<'a>, kind: SyntaxKind) {
        self.events.push(Event::token(kind));
        self.tokens.push(scanned.token);
        self.pos = scanned.token.end();
        self.state = scanned.state;
    }

    /// Consume the next token if it matches.
    pub fn eat(&mut self, context: Context, kind: SyntaxKind) -> bool {
        if self.at(context, kind) {
            self.bump(context);
            true
        } else {
            false
        }
    }

    /// Consume any whitespace.
    pub fn eat_trivia(&mut self, context: Context) {
        while self.eat(context, SyntaxKind::WHITESPACE) {}
    }

    /// Consume a required token, failing with `UnexpectedToken`.
    pub fn expect(&mut self, context: Context, kind: SyntaxKind) -> bool {
        if self.eat(context, kind) {
            return true;
        }
        self.unexpected(context, &[kind]);
        false
    }

    /// Consume the token that closes `construct` (opened at `start`).
    ///
    /// At end of input this is `UnterminatedConstruct`, or a recorded
    /// truncation when unterminated constructs are not fatal.
    pub fn expect_closer(
        &mut self,
        context: Context,
        kind: SyntaxKind,
        construct: Construct,
        start: usize,
    ) -> bool {
        if self.eat(context, kind) {
            return true;
        }
        if self.is_halted() {
            return false;
        }
        if !self.at_end() {
            self.unexpected(context, &[kind]);
            return false;
        }
        if self.options.strict_unterminated {
            self.error(ParseError::UnterminatedConstruct {
                construct,
                start,
                offset: self.pos,
            });
        } else {
            warn!("{construct} opened at offset {start} is closed by end of input");
            self.truncated.push(Truncation { construct, start });
        }
        false
    }

    /// Record `UnexpectedToken` at the current position.
    pub fn unexpected(&mut self, context: Context, expected: &[SyntaxKind]) {
        if self.is_halted() {
            return;
        }
        let token = self.peek(context).or_else(|| self.peek(Context::Code));
        let found = match token {
            Some(token) => format!("`{}`", token.text),
            None if self.is_halted() => return,
            None => "end of input".to_string(),
        };
        self.error(ParseError::UnexpectedToken {
            offset: self.pos,
            found,
            expected: expected.to_vec(),
        });
    }

    /// Record a fatal error. Only the first one is kept.
    pub fn error(&mut self, err: ParseError) {
        if self.error.is_none() {
            debug!("halting: {err}");
            self.error = Some(err);
        }
    }

    /// Enter one nesting level.
    pub fn enter(&mut self) {
        self.depth += 1;
        if self.depth > self.options.max_nesting_depth {
            self.error(ParseError::NestingDepthExceeded {
                offset: self.pos,
                limit: self.options.max_nesting_depth,
            });
        }
    }

    pub fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

/// A marker for a node being constructed.
///
/// This is the heart of the type-safe tree building system. When you call
/// `parser.start()`, a `Placeholder` event is pushed and you get a `Marker`
/// pointing to it.
///
/// The `#[must_use]` attribute and the `Drop` impl together enforce that
/// every marker is either:
///
/// - **Completed** via `marker.complete(parser, KIND)` - converts the
///   placeholder to a `Start` event and pushes a `Finish` event
/// - **Abandoned** via `marker.abandon(parser)` - removes the placeholder
///   (only works if nothing was pushed after it)
///
/// ```ignore
/// fn implicit_expression(p: &mut Parser, context: Context) {
///     let m = p.start();
///     p.bump(context);                                  // `@`
///     p.expect(Context::MemberAccess, MEMBER_ACCESS);
///     m.complete(p, SyntaxKind::IMPLICIT_EXPRESSION);
/// }
/// ```
#[must_use = "Markers must be completed or abandoned, dropping them is a bug"]
pub struct Marker {
    /// Position in the events vector where our Placeholder lives
    pos: usize,
    /// Tracks whether complete() or abandon() was called
    completed: bool,
}

impl Marker {
    /// Complete this marker, creating a node of the given kind.
    pub fn complete(mut self, p: &mut Parser<'_, '_>, kind: SyntaxKind) -> CompletedMarker {
        self.completed = true;
        let event_at_pos = &mut p.events[self.pos];
        assert!(matches!(event_at_pos, Event::Placeholder));
        *event_at_pos = Event::start(kind);
        p.events.push(Event::Finish);
        CompletedMarker {
            pos: self.pos,
            kind,
        }
    }

    /// Abandon this marker without creating a node.
    ///
    /// Self-closing elements use this: the start tag node is dropped once
    /// `/>` shows there is no element body. If other events were pushed after
    /// `start()`, the placeholder becomes inert and is ignored by the Sink.
    pub fn abandon(mut self, p: &mut Parser<'_, '_>) {
        self.completed = true;
        if self.pos == p.events.len() - 1 {
            match p.events.pop() {
                Some(Event::Placeholder) => {}
                _ => unreachable!(),
            }
        }
    }
}

impl Drop for Marker {
    fn drop(&mut self) {
        if !self.completed && !std::thread::panicking() {
            panic!("Marker must be either completed or abandoned");
        }
    }
}

/// A marker for a node that has been completed.
#[derive(Debug, Clone, Copy)]
pub struct CompletedMarker {
    /// Position of the Start event for this completed node
    pos: usize,
    kind: SyntaxKind,
}

impl CompletedMarker {
    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    /// Index of the node's Start event.
    pub fn event_index(&self) -> usize {
        self.pos
    }
}

/// A construct that reached end of input while unterminated parsing was
/// allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Truncation {
    pub construct: Construct,
    /// Offset where the construct was opened.
    pub start: usize,
}

/// The result of a successful parse.
///
/// Holds the immutable green tree, which is `Send + Sync`; [`Parse::syntax`]
/// creates a cursor over it for navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parse {
    green: GreenNode,
    truncated: Vec<Truncation>,
}

impl Parse {
    /// The root `DOCUMENT` node.
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    /// Constructs closed by end of input (always empty in strict mode).
    pub fn truncated(&self) -> &[Truncation] {
        &self.truncated
    }

    /// Typed view of the root.
    pub fn document(&self) -> Document {
        Document::from_root(self.syntax())
    }
}

/// Parse Razor source with the given options.
pub fn parse_with(source: &str, options: &ParseOptions) -> Result<Parse, ParseError> {
    debug!(
        "parsing {} bytes, strict_unterminated={}",
        source.len(),
        options.strict_unterminated
    );
    Parser::new(source, options).parse()
}

/// Parse Razor source with default options into the root `DOCUMENT` node.
pub fn parse(source: &str) -> Result<SyntaxNode, ParseError> {
    parse_with(source, &ParseOptions::default()).map(|parse| parse.syntax())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MARKUP: Context = Context::Markup { case_labels: false };

    #[test]
    fn parse_empty_input() {
        let tree = parse("").expect("empty input parses");
        assert_eq!(tree.kind(), SyntaxKind::DOCUMENT);
        assert_eq!(tree.children().count(), 0);
    }

    #[test]
    fn parse_preserves_all_text() {
        let input = "Hello, <b>world</b>!";
        let tree = parse(input).expect("parses");
        assert_eq!(tree.text(), input);
    }

    #[test]
    fn marker_must_be_completed() {
        let result = std::panic::catch_unwind(|| {
            let options = ParseOptions::default();
            let mut parser = Parser::new("test", &options);
            let _marker = parser.start();
            // Marker dropped without completion - should panic
        });
        assert!(result.is_err());
    }

    #[test]
    fn marker_can_be_abandoned() {
        let options = ParseOptions::default();
        let mut parser = Parser::new("test", &options);
        let marker = parser.start();
        marker.abandon(&mut parser);
        assert!(parser.events.is_empty());
    }

    #[test]
    fn completed_marker_reports_kind() {
        let options = ParseOptions::default();
        let mut parser = Parser::new("x", &options);
        let m = parser.start();
        parser.bump(MARKUP);
        let done = m.complete(&mut parser, SyntaxKind::DOCUMENT);
        assert_eq!(done.kind(), SyntaxKind::DOCUMENT);
        assert_eq!(done.event_index(), 0);
    }

    #[test]
    fn bump_as_reclassifies() {
        let options = ParseOptions::default();
        let mut parser = Parser::new("else {", &options);
        parser.bump_as(Context::Code, SyntaxKind::KEYWORD);
        assert_eq!(parser.offset(), 4);
        assert_eq!(parser.events, vec![Event::token(SyntaxKind::KEYWORD)]);
        assert_eq!(parser.kind_after_trivia(Context::Code), SyntaxKind::L_BRACE);
    }

    #[test]
    fn halted_parser_reads_end_of_input() {
        let options = ParseOptions::default();
        let mut parser = Parser::new("<p>", &options);
        parser.unexpected(MARKUP, &[SyntaxKind::TEXT]);
        assert!(parser.is_halted());
        assert_eq!(parser.peek(MARKUP), None);
        assert_eq!(parser.resolve(Position::TagOpen), Production::Unclassified);
        // Only the first error is kept
        parser.error(ParseError::NestingDepthExceeded {
            offset: 0,
            limit: 1,
        });
        assert!(matches!(
            parser.error,
            Some(ParseError::UnexpectedToken { offset: 0, .. })
        ));
    }

    #[test]
    fn depth_limit_is_enforced() {
        let options = ParseOptions::default().with_max_nesting_depth(1);
        let mut parser = Parser::new("", &options);
        parser.enter();
        assert!(!parser.is_halted());
        parser.enter();
        assert_eq!(
            parser.error,
            Some(ParseError::NestingDepthExceeded {
                offset: 0,
                limit: 1
            })
        );
    }

    #[test]
    fn lenient_mode_records_truncation() {
        let options = ParseOptions::default().with_strict_unterminated(false);
        let parse = parse_with("@code { x", &options).expect("lenient parse");
        assert_eq!(
            parse.truncated(),
            &[Truncation {
                construct: Construct::CodeBlock,
                start: 0
            }]
        );
        assert_eq!(parse.syntax().text().to_string(), "@code { x");
    }

    #[test]
    fn strict_mode_fails_on_unterminated() {
        let err = parse("@code { x").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnterminatedConstruct {
                construct: Construct::CodeBlock,
                start: 0,
                offset: 9
            }
        );
    }
}
