//! # Grammar Rules
//!
//! Each function takes a `&mut Parser` and uses its methods to:
//!
//! 1. Inspect the next token in a context (`p.peek()`, `p.at()`)
//! 2. Consume tokens (`p.bump()`, `p.eat()`, `p.expect()`)
//! 3. Build tree structure (`p.start()` → marker → `complete()`/`abandon()`)
//!
//! Where productions compete, rules ask [`Parser::resolve`] with a
//! [`Position`](crate::conflicts::Position) instead of branching on text
//! themselves, so every ambiguity is visible in the conflict table.
//!
//! ## Module Structure
//!
//! - [`markup`] - elements, attributes, HTML comments, doctype
//! - [`razor`] - directives, code blocks, expressions, delegates, comments
//! - [`control`] - `if`/`else`, loops, `switch`, `try`, `using`, `lock`
//!
//! ## Errors
//!
//! Rules do not recover. A rule that meets something it cannot accept calls
//! `p.unexpected()` (or `p.expect()` fails) and simply returns after
//! completing its markers; the halted parser makes every enclosing loop stop.
//!
//! ```text
//! document  := html_node*
//! html_node := TEXT | ESCAPED_AT | razor_comment | directive | code_block
//!            | explicit_expression | implicit_expression | razor_delegate
//!            | control | element | html_comment | doctype
//! ```

mod control;
mod markup;
mod razor;

use crate::error::Construct;
use crate::parser::Parser;
use crate::scanner::{Context, Region};
use crate::syntax_kind::SyntaxKind;

pub(super) const MARKUP: Context = Context::Markup { case_labels: false };
pub(super) const CODE: Context = Context::Code;

/// Parse the root document.
pub(super) fn document(p: &mut Parser<'_, '_>) {
    let m = p.start();
    while let Some(token) = p.peek(MARKUP) {
        if token.kind == SyntaxKind::LT_SLASH {
            // An end tag with no open element
            p.unexpected(MARKUP, &NODE_STARTS);
            break;
        }
        html_node(p, MARKUP);
    }
    m.complete(p, SyntaxKind::DOCUMENT);
}

/// Token kinds that can start a markup-level node.
const NODE_STARTS: [SyntaxKind; 10] = [
    SyntaxKind::TEXT,
    SyntaxKind::ESCAPED_AT,
    SyntaxKind::RAZOR_COMMENT_OPEN,
    SyntaxKind::DIRECTIVE_KEYWORD,
    SyntaxKind::CONTROL_KEYWORD,
    SyntaxKind::AT,
    SyntaxKind::IMPLICIT_EXPR_START,
    SyntaxKind::L_ANGLE,
    SyntaxKind::HTML_COMMENT_OPEN,
    SyntaxKind::DOCTYPE_OPEN,
];

/// Parse one markup-level node.
fn html_node(p: &mut Parser<'_, '_>, context: Context) {
    let Some(token) = p.peek(context) else {
        return;
    };
    match token.kind {
        SyntaxKind::TEXT | SyntaxKind::ESCAPED_AT => p.bump(context),
        SyntaxKind::RAZOR_COMMENT_OPEN => razor::razor_comment(p, context),
        SyntaxKind::DIRECTIVE_KEYWORD => razor::directive(p, context),
        SyntaxKind::CONTROL_KEYWORD => control::control(p, context),
        SyntaxKind::AT => razor::at_construct(p, context),
        SyntaxKind::IMPLICIT_EXPR_START => razor::implicit_expression(p, context),
        SyntaxKind::L_ANGLE => markup::element(p, context),
        SyntaxKind::HTML_COMMENT_OPEN => markup::html_comment(p, context),
        SyntaxKind::DOCTYPE_OPEN => markup::doctype(p, context),
        _ => p.unexpected(context, &NODE_STARTS),
    }
}

/// Parse markup nodes until one of `closers` (not consumed) or end of input.
fn markup_body(p: &mut Parser<'_, '_>, context: Context, closers: &[SyntaxKind]) {
    while let Some(token) = p.peek(context) {
        if closers.contains(&token.kind) {
            break;
        }
        html_node(p, context);
    }
}

/// `{ html_node* }`
fn block(p: &mut Parser<'_, '_>) {
    let m = p.start();
    let start = p.offset();
    if !p.expect(CODE, SyntaxKind::L_BRACE) {
        m.abandon(p);
        return;
    }
    let outer = p.set_in_block(true);
    p.enter();
    markup_body(p, MARKUP, &[SyntaxKind::R_BRACE]);
    p.expect_closer(MARKUP, SyntaxKind::R_BRACE, Construct::Block, start);
    p.exit();
    p.set_in_block(outer);
    m.complete(p, SyntaxKind::BLOCK);
}

/// The inside and closer of a region whose opener was just consumed:
/// optional whitespace, the opaque `content` token, optional whitespace, and
/// the closing delimiter.
fn opaque(
    p: &mut Parser<'_, '_>,
    region: Region,
    content: SyntaxKind,
    construct: Construct,
    start: usize,
) {
    let context = Context::Opaque { region, content };
    while p.at(context, SyntaxKind::WHITESPACE) || p.at(context, content) {
        p.bump(context);
    }
    if let Some((_, closer)) = region.closer() {
        p.expect_closer(context, closer, construct, start);
    }
}

/// `( content )`
fn paren_region(p: &mut Parser<'_, '_>, content: SyntaxKind, construct: Construct, start: usize) {
    if p.expect(Context::OpenRegion(Region::Paren), SyntaxKind::L_PAREN) {
        opaque(p, Region::Paren, content, construct, start);
    }
}
