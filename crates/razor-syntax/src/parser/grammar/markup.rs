//! HTML elements, attributes, comments and the doctype.

use super::{MARKUP, markup_body, razor};
use crate::conflicts::{Position, Production};
use crate::error::{Construct, ParseError};
use crate::parser::Parser;
use crate::scanner::Context;
use crate::syntax_kind::SyntaxKind;

const TAG: Context = Context::Tag;

/// Elements that never have an end tag.
const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS
        .iter()
        .any(|void| void.eq_ignore_ascii_case(name))
}

enum TagEnd {
    Open,
    SelfClosing,
    Missing,
}

/// `<name attrs> children </name>`, `<name attrs />` or a void element.
pub(super) fn element(p: &mut Parser<'_, '_>, context: Context) {
    let m = p.start();
    let start = p.offset();
    let tag = p.start();
    p.bump(context);
    let name = tag_name(p);

    match attributes(p, start) {
        TagEnd::SelfClosing => {
            tag.abandon(p);
            m.complete(p, SyntaxKind::HTML_SELF_CLOSING_ELEMENT);
        }
        TagEnd::Open => {
            tag.complete(p, SyntaxKind::HTML_START_TAG);
            if let Some(name) = name.filter(|name| !is_void(name)) {
                let outer = p.set_in_block(false);
                p.enter();
                markup_body(p, MARKUP, &[SyntaxKind::LT_SLASH]);
                end_tag(p, name, start);
                p.exit();
                p.set_in_block(outer);
            }
            m.complete(p, SyntaxKind::HTML_ELEMENT);
        }
        TagEnd::Missing => {
            tag.complete(p, SyntaxKind::HTML_START_TAG);
            m.complete(p, SyntaxKind::HTML_ELEMENT);
        }
    }
}

fn tag_name<'a>(p: &mut Parser<'a, '_>) -> Option<&'a str> {
    let token = p.peek(Context::TagName)?;
    if token.kind != SyntaxKind::TAG_NAME {
        p.unexpected(Context::TagName, &[SyntaxKind::TAG_NAME]);
        return None;
    }
    p.bump(Context::TagName);
    Some(token.text)
}

fn attributes(p: &mut Parser<'_, '_>, start: usize) -> TagEnd {
    loop {
        let Some(token) = p.peek(TAG) else {
            p.expect_closer(TAG, SyntaxKind::R_ANGLE, Construct::StartTag, start);
            return TagEnd::Missing;
        };
        match token.kind {
            SyntaxKind::WHITESPACE => p.bump(TAG),
            SyntaxKind::R_ANGLE => {
                p.bump(TAG);
                return TagEnd::Open;
            }
            SyntaxKind::SLASH_R_ANGLE => {
                p.bump(TAG);
                return TagEnd::SelfClosing;
            }
            kind => match p.resolve(Position::AttributeStart) {
                Production::DirectiveAttribute => directive_attribute(p),
                Production::HtmlAttribute if kind == SyntaxKind::ATTRIBUTE_NAME => {
                    html_attribute(p)
                }
                _ => {
                    p.unexpected(
                        TAG,
                        &[
                            SyntaxKind::ATTRIBUTE_NAME,
                            SyntaxKind::AT,
                            SyntaxKind::R_ANGLE,
                            SyntaxKind::SLASH_R_ANGLE,
                        ],
                    );
                    return TagEnd::Missing;
                }
            },
        }
    }
}

/// `name` or `name=value`
fn html_attribute(p: &mut Parser<'_, '_>) {
    let m = p.start();
    p.bump(TAG);
    attribute_value(p, true);
    m.complete(p, SyntaxKind::HTML_ATTRIBUTE);
}

/// `@name` or `@name=value`. A quoted value is one opaque expression.
fn directive_attribute(p: &mut Parser<'_, '_>) {
    let m = p.start();
    p.bump(TAG);
    p.expect(TAG, SyntaxKind::ATTRIBUTE_NAME);
    attribute_value(p, false);
    m.complete(p, SyntaxKind::RAZOR_DIRECTIVE_ATTRIBUTE);
}

/// `= value`, with optional whitespace around `=`. Whitespace not followed
/// by `=` separates attributes and stays in the tag.
fn attribute_value(p: &mut Parser<'_, '_>, transitions: bool) {
    if p.kind_after_trivia(TAG) != SyntaxKind::EQ {
        return;
    }
    let value = Context::AttributeValue { code: !transitions };
    p.eat_trivia(TAG);
    p.bump(TAG);
    p.eat_trivia(value);

    let Some(token) = p.peek(value) else {
        p.unexpected(value, &[SyntaxKind::QUOTE, SyntaxKind::UNQUOTED_ATTRIBUTE_VALUE]);
        return;
    };
    match token.kind {
        SyntaxKind::QUOTE => {
            let quote = if token.text == "'" { '\'' } else { '"' };
            quoted_value(p, value, quote, transitions);
        }
        SyntaxKind::UNQUOTED_ATTRIBUTE_VALUE => p.bump(value),
        SyntaxKind::IMPLICIT_EXPR_START => razor::implicit_expression(p, value),
        SyntaxKind::AT if p.resolve(Position::Transition) == Production::ExplicitExpression => {
            razor::explicit_expression(p, value)
        }
        _ => p.unexpected(value, &[SyntaxKind::QUOTE, SyntaxKind::UNQUOTED_ATTRIBUTE_VALUE]),
    }
}

fn quoted_value(p: &mut Parser<'_, '_>, value: Context, quote: char, transitions: bool) {
    let m = p.start();
    let start = p.offset();
    p.bump(value);
    let context = Context::QuotedValue { quote, transitions };

    while let Some(token) = p.peek(context) {
        match token.kind {
            SyntaxKind::QUOTE => break,
            SyntaxKind::ATTRIBUTE_CONTENT | SyntaxKind::CODE_EXPRESSION | SyntaxKind::ESCAPED_AT => {
                p.bump(context)
            }
            SyntaxKind::IMPLICIT_EXPR_START => razor::implicit_expression(p, context),
            SyntaxKind::RAZOR_COMMENT_OPEN => razor::razor_comment(p, context),
            SyntaxKind::AT if p.resolve(Position::Transition) == Production::ExplicitExpression => {
                razor::explicit_expression(p, context)
            }
            _ => {
                p.unexpected(
                    context,
                    &[
                        SyntaxKind::QUOTE,
                        SyntaxKind::ATTRIBUTE_CONTENT,
                        SyntaxKind::IMPLICIT_EXPR_START,
                        SyntaxKind::AT,
                    ],
                );
                break;
            }
        }
    }
    p.expect_closer(context, SyntaxKind::QUOTE, Construct::AttributeValue, start);
    m.complete(p, SyntaxKind::QUOTED_ATTRIBUTE_VALUE);
}

/// `</name>`, where `name` must match the start tag (ASCII case-insensitive).
fn end_tag(p: &mut Parser<'_, '_>, name: &str, element_start: usize) {
    if !p.at(MARKUP, SyntaxKind::LT_SLASH) {
        p.expect_closer(MARKUP, SyntaxKind::LT_SLASH, Construct::Element, element_start);
        return;
    }
    let m = p.start();
    let start = p.offset();
    p.bump(MARKUP);
    match p.peek(Context::TagName) {
        Some(token) if token.kind == SyntaxKind::TAG_NAME => {
            if token.text.eq_ignore_ascii_case(name) {
                p.bump(Context::TagName);
            } else {
                p.error(ParseError::UnexpectedToken {
                    offset: token.offset,
                    found: format!("`</{}>`", token.text),
                    expected: vec![SyntaxKind::HTML_END_TAG],
                });
            }
        }
        _ => p.unexpected(Context::TagName, &[SyntaxKind::TAG_NAME]),
    }
    p.eat_trivia(TAG);
    p.expect_closer(TAG, SyntaxKind::R_ANGLE, Construct::EndTag, start);
    m.complete(p, SyntaxKind::HTML_END_TAG);
}

/// `<!-- ... -->`
pub(super) fn html_comment(p: &mut Parser<'_, '_>, context: Context) {
    let m = p.start();
    let start = p.offset();
    p.bump(context);
    p.eat(Context::HtmlComment, SyntaxKind::HTML_COMMENT_CONTENT);
    p.expect_closer(
        Context::HtmlComment,
        SyntaxKind::HTML_COMMENT_CLOSE,
        Construct::HtmlComment,
        start,
    );
    m.complete(p, SyntaxKind::HTML_COMMENT);
}

/// `<!DOCTYPE ...>`
pub(super) fn doctype(p: &mut Parser<'_, '_>, context: Context) {
    let m = p.start();
    let start = p.offset();
    p.bump(context);
    p.eat(Context::Doctype, SyntaxKind::DOCTYPE_CONTENT);
    p.expect_closer(Context::Doctype, SyntaxKind::R_ANGLE, Construct::Doctype, start);
    m.complete(p, SyntaxKind::HTML_DOCTYPE);
}
