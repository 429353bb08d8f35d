//! # razor-syntax
//!
//! A lossless syntax tree for Razor and Blazor templates using [Rowan] +
//! [Logos], following the [rust-analyzer] architecture model.
//!
//! [Rowan]: https://docs.rs/rowan
//! [Logos]: https://docs.rs/logos
//! [rust-analyzer]: https://rust-analyzer.github.io/book/contributing/syntax.html
//!
//! ## Three Languages, One Character Set
//!
//! A Razor file interleaves HTML markup, C# code, and Razor's own control
//! layer (`@model`, `@if`, `@{ }`). The three share `@`, `{`, `}` and quotes,
//! so no single regular lexer can split them. This crate parses the markup
//! and the control layer, and delimits C# without interpreting it: every
//! piece of code ends up as one opaque token whose text is handed on through
//! the [`delegation`] module.
//!
//! ## Architecture Overview
//!
//! ```text
//! Source Text → Scanner ⇄ Parser → Events → Sink → Rowan Tree
//!               (context-  (Grammar,        (GreenNodeBuilder)
//!                sensitive) conflict table)
//! ```
//!
//! ### 1. Scanner ([`scanner`] module)
//!
//! The parser pulls one token at a time, naming the [`scanner::Context`] it
//! is in. The scanner decides what `@` introduces, where markup text ends,
//! and where a code region closes (skipping C# strings and comments). The
//! small context-free parts are [Logos] lexers in [`lexer`].
//!
//! ### 2. Parser ([`parser`] module)
//!
//! Recursive descent emitting **events** (Start, Token, Finish) with the
//! rust-analyzer **marker system**. Wherever two productions compete, the
//! grammar consults the static table in [`conflicts`] instead of
//! backtracking. Which words are directives or control keywords is data in a
//! [`KeywordTable`].
//!
//! ### 3. Sink ([`parser::sink`] module)
//!
//! Builds a Rowan green tree from the events. The tree is immutable, cheap
//! to clone, and `Send + Sync`.
//!
//! ## Module Structure
//!
//! ```text
//! razor-syntax/
//! ├── lib.rs           # This file - public API and integration tests
//! ├── syntax_kind.rs   # SyntaxKind enum (tokens + nodes) and Rowan integration
//! ├── lexer.rs         # Logos lexemes for code punctuation and tag interiors
//! ├── scanner.rs       # Context-sensitive scanner and opaque region balancing
//! ├── keywords.rs      # Reserved-word table
//! ├── conflicts.rs     # Conflict resolution table
//! ├── options.rs       # ParseOptions
//! ├── error.rs         # ParseError
//! ├── ast.rs           # Typed views and the Visitor
//! ├── delegation.rs    # Opaque spans and their roles
//! └── parser/
//!     ├── mod.rs       # Parser struct, Marker system, parse() functions
//!     ├── event.rs     # Event enum (Start, Token, Finish, Placeholder)
//!     ├── sink.rs      # Converts events to Rowan GreenNode
//!     └── grammar/
//!         ├── mod.rs     # Document, blocks, opaque regions
//!         ├── markup.rs  # Elements, attributes, HTML comments, doctype
//!         ├── razor.rs   # Directives, code blocks, expressions, delegates
//!         └── control.rs # if/else, loops, switch, try, using, lock
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use razor_syntax::{parse, SyntaxKind};
//!
//! let tree = parse("<p>@Model.Name</p>").unwrap();
//!
//! // The tree preserves all text
//! assert_eq!(tree.text().to_string(), "<p>@Model.Name</p>");
//!
//! let element = tree.children().next().unwrap();
//! assert_eq!(element.kind(), SyntaxKind::HTML_ELEMENT);
//! ```
//!
//! ## Errors
//!
//! Parsing does not recover. The first problem is returned as a
//! [`ParseError`] carrying its byte offset; with
//! [`ParseOptions::with_strict_unterminated(false)`](ParseOptions::with_strict_unterminated)
//! constructs left open at end of input are closed there instead and listed
//! in [`Parse::truncated`].

pub mod ast;
pub mod conflicts;
pub mod delegation;
pub mod error;
pub mod keywords;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod scanner;
pub mod syntax_kind;

pub use error::{Construct, ParseError};
pub use keywords::{ControlKind, DirectiveKind, Keyword, KeywordTable};
pub use options::ParseOptions;
pub use parser::{Parse, Truncation, parse, parse_with};
pub use syntax_kind::{RazorLang, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};
