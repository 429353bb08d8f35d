//! Control-flow constructs.
//!
//! ```text
//! control     := CONTROL_KEYWORD header? body continuation*
//! header      := L_PAREN CODE_EXPRESSION? R_PAREN
//! body        := block
//! razor_else  := KEYWORD (KEYWORD header)? body
//! razor_case  := KEYWORD CODE_EXPRESSION COLON html_node*
//!              | KEYWORD COLON html_node*
//! ```
//!
//! Continuation keywords (`else`, `catch`, `finally`, `while` after `do`,
//! `case`, `default`) are scanned as identifiers and recorded as `KEYWORD`.

use super::{CODE, block, html_node, opaque, paren_region};
use crate::conflicts::{Position, Production};
use crate::error::Construct;
use crate::keywords::{ControlKind, Keyword};
use crate::parser::Parser;
use crate::scanner::{Context, Region};
use crate::syntax_kind::SyntaxKind;

const ARM: Context = Context::Markup { case_labels: true };

pub(super) fn control(p: &mut Parser<'_, '_>, context: Context) {
    let Some(token) = p.peek(context) else {
        return;
    };
    let word = token.text.strip_prefix('@').unwrap_or(token.text);
    let kind = match p.keywords().get(word) {
        Some(Keyword::Control(kind)) | Some(Keyword::DirectiveOrStatement(_, kind)) => kind,
        // `@else`, `@case`, ... outside the construct they continue
        _ => {
            p.unexpected(
                context,
                &[
                    SyntaxKind::CONTROL_KEYWORD,
                    SyntaxKind::DIRECTIVE_KEYWORD,
                    SyntaxKind::IMPLICIT_EXPR_START,
                ],
            );
            return;
        }
    };

    let m = p.start();
    p.bump(context);
    match kind {
        ControlKind::If => {
            header(p);
            body(p);
            else_clauses(p);
        }
        ControlKind::Foreach
        | ControlKind::For
        | ControlKind::While
        | ControlKind::Using
        | ControlKind::Lock => {
            header(p);
            body(p);
        }
        ControlKind::Do => do_while(p),
        ControlKind::Switch => {
            header(p);
            switch_body(p);
        }
        ControlKind::Try => {
            body(p);
            try_clauses(p);
        }
    }
    m.complete(p, kind.syntax_kind());
}

/// The parenthesised header, reported from its `(` when unterminated.
fn header(p: &mut Parser<'_, '_>) {
    p.eat_trivia(CODE);
    let start = p.offset();
    paren_region(p, SyntaxKind::CODE_EXPRESSION, Construct::ControlHeader, start);
}

fn body(p: &mut Parser<'_, '_>) {
    p.eat_trivia(CODE);
    block(p);
}

/// Consume the identifier `word` as a `KEYWORD` token.
fn keyword(p: &mut Parser<'_, '_>, word: &str) {
    let found = p
        .peek(CODE)
        .is_some_and(|t| t.kind == SyntaxKind::IDENT && t.text == word);
    if found {
        p.bump_as(CODE, SyntaxKind::KEYWORD);
    } else {
        p.unexpected(CODE, &[SyntaxKind::KEYWORD]);
    }
}

fn else_clauses(p: &mut Parser<'_, '_>) {
    while p.resolve(Position::IfContinuation) == Production::Else {
        p.eat_trivia(CODE);
        let m = p.start();
        keyword(p, "else");
        let chained = p.resolve(Position::ElseShape) == Production::ElseIf;
        if chained {
            p.eat_trivia(CODE);
            keyword(p, "if");
            header(p);
        }
        body(p);
        m.complete(p, SyntaxKind::RAZOR_ELSE);
        if !chained {
            break;
        }
    }
}

/// `do { ... } while (cond);`
fn do_while(p: &mut Parser<'_, '_>) {
    body(p);
    p.eat_trivia(CODE);
    keyword(p, "while");
    header(p);
    p.eat(CODE, SyntaxKind::SEMICOLON);
}

fn try_clauses(p: &mut Parser<'_, '_>) {
    loop {
        match p.resolve(Position::TryContinuation) {
            Production::Catch => {
                p.eat_trivia(CODE);
                let m = p.start();
                keyword(p, "catch");
                if p.resolve(Position::CatchShape) == Production::CatchDeclaration {
                    header(p);
                }
                body(p);
                m.complete(p, SyntaxKind::RAZOR_CATCH);
            }
            Production::Finally => {
                p.eat_trivia(CODE);
                let m = p.start();
                keyword(p, "finally");
                body(p);
                m.complete(p, SyntaxKind::RAZOR_FINALLY);
                break;
            }
            _ => break,
        }
    }
}

/// `{ arm* }`. The braces belong to the switch node itself; each arm is a
/// `RAZOR_CASE` whose body is markup.
fn switch_body(p: &mut Parser<'_, '_>) {
    p.eat_trivia(CODE);
    let start = p.offset();
    if !p.expect(CODE, SyntaxKind::L_BRACE) {
        return;
    }
    let outer = p.set_in_block(true);
    p.enter();
    loop {
        p.eat_trivia(CODE);
        match p.resolve(Position::SwitchArm) {
            Production::Case => case_arm(p),
            Production::Default => default_arm(p),
            Production::EndOfConstruct => break,
            _ if p.is_halted() || p.at_end() => break,
            _ => {
                p.unexpected(CODE, &[SyntaxKind::KEYWORD, SyntaxKind::R_BRACE]);
                break;
            }
        }
    }
    p.expect_closer(CODE, SyntaxKind::R_BRACE, Construct::SwitchBody, start);
    p.exit();
    p.set_in_block(outer);
}

/// `case LABEL: markup`
fn case_arm(p: &mut Parser<'_, '_>) {
    let m = p.start();
    let start = p.offset();
    keyword(p, "case");
    opaque(
        p,
        Region::CaseLabel,
        SyntaxKind::CODE_EXPRESSION,
        Construct::CaseLabel,
        start,
    );
    arm_body(p);
    m.complete(p, SyntaxKind::RAZOR_CASE);
}

/// `default: markup`
fn default_arm(p: &mut Parser<'_, '_>) {
    let m = p.start();
    keyword(p, "default");
    p.eat_trivia(CODE);
    p.expect(CODE, SyntaxKind::COLON);
    arm_body(p);
    m.complete(p, SyntaxKind::RAZOR_CASE);
}

/// Markup up to the next arm or the closing brace.
fn arm_body(p: &mut Parser<'_, '_>) {
    while let Some(token) = p.peek(ARM) {
        if token.kind == SyntaxKind::R_BRACE
            || matches!(
                p.resolve(Position::SwitchArm),
                Production::Case | Production::Default
            )
        {
            break;
        }
        html_node(p, ARM);
    }
}
