//! Razor constructs: directives, code blocks, expressions, delegates and
//! comments.
//!
//! ```text
//! code_block          := AT CODE_BLOCK_START RAW_TEXT? R_BRACE
//! explicit_expression := AT L_PAREN CODE_EXPRESSION? R_PAREN
//! implicit_expression := IMPLICIT_EXPR_START MEMBER_ACCESS
//! razor_delegate      := AT (L_PAREN PARAMETER_LIST? R_PAREN)? FAT_ARROW
//!                        (block | CODE_EXPRESSION)
//! directive           := DIRECTIVE_KEYWORD operand SEMICOLON?
//! ```

use super::{CODE, block, opaque, paren_region};
use crate::conflicts::{Position, Production};
use crate::error::Construct;
use crate::keywords::{DirectiveShape, Keyword};
use crate::parser::Parser;
use crate::scanner::{Context, Region};
use crate::syntax_kind::SyntaxKind;

/// `@* ... *@`
pub(super) fn razor_comment(p: &mut Parser<'_, '_>, context: Context) {
    let m = p.start();
    let start = p.offset();
    p.bump(context);
    p.eat(Context::RazorComment, SyntaxKind::COMMENT_CONTENT);
    p.expect_closer(
        Context::RazorComment,
        SyntaxKind::RAZOR_COMMENT_CLOSE,
        Construct::RazorComment,
        start,
    );
    m.complete(p, SyntaxKind::RAZOR_COMMENT);
}

/// A bare `@`: code block, explicit expression or delegate.
pub(super) fn at_construct(p: &mut Parser<'_, '_>, context: Context) {
    match p.resolve(Position::Transition) {
        Production::CodeBlock => code_block(p, context),
        Production::ExplicitExpression => explicit_expression(p, context),
        Production::Delegate => delegate(p, context),
        _ => p.unexpected(
            context,
            &[SyntaxKind::CODE_BLOCK_START, SyntaxKind::L_PAREN, SyntaxKind::FAT_ARROW],
        ),
    }
}

fn code_block(p: &mut Parser<'_, '_>, context: Context) {
    let m = p.start();
    let start = p.offset();
    p.bump(context);
    code_region(p, start);
    m.complete(p, SyntaxKind::CODE_BLOCK);
}

/// `{ RAW_TEXT }`. An unterminated region is reported from `start`, the
/// offset of the construct that owns it.
fn code_region(p: &mut Parser<'_, '_>, start: usize) {
    if p.expect(Context::OpenRegion(Region::Brace), SyntaxKind::CODE_BLOCK_START) {
        opaque(p, Region::Brace, SyntaxKind::RAW_TEXT, Construct::CodeBlock, start);
    }
}

pub(super) fn explicit_expression(p: &mut Parser<'_, '_>, context: Context) {
    let m = p.start();
    let start = p.offset();
    p.bump(context);
    paren_region(p, SyntaxKind::CODE_EXPRESSION, Construct::ExplicitExpression, start);
    m.complete(p, SyntaxKind::EXPLICIT_EXPRESSION);
}

/// `@(params) => body` or `@=> body`. The body is a markup block, or the
/// rest of the line as one expression.
fn delegate(p: &mut Parser<'_, '_>, context: Context) {
    let m = p.start();
    let start = p.offset();
    p.bump(context);
    if p.at(Context::OpenRegion(Region::Paren), SyntaxKind::L_PAREN) {
        paren_region(p, SyntaxKind::PARAMETER_LIST, Construct::DelegateParameters, start);
    }
    p.eat_trivia(CODE);
    if p.expect(CODE, SyntaxKind::FAT_ARROW) {
        if p.kind_after_trivia(CODE) == SyntaxKind::L_BRACE {
            p.eat_trivia(CODE);
            block(p);
        } else {
            let line = Context::Opaque {
                region: Region::Line,
                content: SyntaxKind::CODE_EXPRESSION,
            };
            p.eat_trivia(line);
            p.expect(line, SyntaxKind::CODE_EXPRESSION);
            p.eat_trivia(line);
        }
    }
    m.complete(p, SyntaxKind::RAZOR_DELEGATE);
}

/// `@Member.Path(args)[index]`
pub(super) fn implicit_expression(p: &mut Parser<'_, '_>, context: Context) {
    let m = p.start();
    p.bump(context);
    p.expect(Context::MemberAccess, SyntaxKind::MEMBER_ACCESS);
    m.complete(p, SyntaxKind::IMPLICIT_EXPRESSION);
}

/// A directive keyword and its operand, shaped by the directive's kind.
pub(super) fn directive(p: &mut Parser<'_, '_>, context: Context) {
    let Some(token) = p.peek(context) else {
        return;
    };
    let word = token.text.strip_prefix('@').unwrap_or(token.text);
    let kind = match p.keywords().get(word) {
        Some(Keyword::Directive(kind)) | Some(Keyword::DirectiveOrStatement(kind, _)) => kind,
        _ => {
            p.unexpected(context, &[SyntaxKind::DIRECTIVE_KEYWORD]);
            return;
        }
    };

    let m = p.start();
    let start = p.offset();
    p.bump(context);

    match kind.shape() {
        DirectiveShape::CodeBlock => {
            p.eat_trivia(CODE);
            code_region(p, start);
        }
        DirectiveShape::Section => {
            p.eat_trivia(CODE);
            p.expect(CODE, SyntaxKind::IDENT);
            p.eat_trivia(CODE);
            block(p);
        }
        shape => {
            operand(p, shape);
            p.eat(CODE, SyntaxKind::SEMICOLON);
        }
    }
    m.complete(p, kind.syntax_kind());
}

fn operand(p: &mut Parser<'_, '_>, shape: DirectiveShape) {
    if shape == DirectiveShape::OptionalString {
        // `@page` alone is complete; the newline after it stays markup
        if p.kind_after_trivia(CODE) == SyntaxKind::STRING_LITERAL {
            p.eat_trivia(CODE);
            p.bump(CODE);
        }
        return;
    }

    p.eat_trivia(CODE);
    match shape {
        DirectiveShape::String => {
            p.expect(CODE, SyntaxKind::STRING_LITERAL);
        }
        DirectiveShape::TypeReference => type_reference(p),
        DirectiveShape::TypeAndMember => {
            type_reference(p);
            p.eat_trivia(CODE);
            p.expect(CODE, SyntaxKind::IDENT);
        }
        DirectiveShape::Namespace => namespace_reference(p),
        DirectiveShape::AttributeList => {
            let open = p.offset();
            if p.expect(Context::OpenRegion(Region::Bracket), SyntaxKind::L_BRACKET) {
                opaque(
                    p,
                    Region::Bracket,
                    SyntaxKind::CODE_EXPRESSION,
                    Construct::AttributeList,
                    open,
                );
            }
        }
        DirectiveShape::Identifier => {
            p.expect(Context::QualifiedName, SyntaxKind::QUALIFIED_NAME);
        }
        DirectiveShape::Boolean => {
            let is_bool = p
                .peek(CODE)
                .is_some_and(|t| t.kind == SyntaxKind::IDENT && matches!(t.text, "true" | "false"));
            if is_bool {
                p.bump_as(CODE, SyntaxKind::BOOLEAN_LITERAL);
            } else {
                p.unexpected(CODE, &[SyntaxKind::BOOLEAN_LITERAL]);
            }
        }
        DirectiveShape::OptionalString | DirectiveShape::Section | DirectiveShape::CodeBlock => {}
    }
}

/// `Name(.Name)*` followed by any of `<args>`, `[]`, `?`, `*`.
///
/// A `<` directly after the name always opens type arguments.
fn type_reference(p: &mut Parser<'_, '_>) {
    let m = p.start();
    if p.expect(Context::QualifiedName, SyntaxKind::QUALIFIED_NAME) {
        loop {
            match p.resolve(Position::TypeSuffix) {
                Production::TypeArguments => type_arguments(p),
                Production::ArraySuffix => {
                    p.bump(CODE);
                    p.bump(CODE);
                }
                Production::NullableSuffix | Production::PointerSuffix => p.bump(CODE),
                _ => break,
            }
        }
    }
    m.complete(p, SyntaxKind::TYPE_REFERENCE);
}

/// `< type (, type)* >`
fn type_arguments(p: &mut Parser<'_, '_>) {
    let m = p.start();
    let start = p.offset();
    p.bump(CODE);
    p.enter();
    loop {
        p.eat_trivia(CODE);
        type_reference(p);
        p.eat_trivia(CODE);
        if !p.eat(CODE, SyntaxKind::COMMA) {
            break;
        }
    }
    p.expect_closer(CODE, SyntaxKind::R_ANGLE, Construct::TypeArguments, start);
    p.exit();
    m.complete(p, SyntaxKind::TYPE_ARGUMENTS);
}

/// `Namespace` or `Alias = Namespace`
fn namespace_reference(p: &mut Parser<'_, '_>) {
    let m = p.start();
    if p.expect(Context::QualifiedName, SyntaxKind::QUALIFIED_NAME)
        && p.kind_after_trivia(CODE) == SyntaxKind::EQ
    {
        p.eat_trivia(CODE);
        p.bump(CODE);
        p.eat_trivia(CODE);
        p.expect(Context::QualifiedName, SyntaxKind::QUALIFIED_NAME);
    }
    m.complete(p, SyntaxKind::NAMESPACE_REFERENCE);
}
