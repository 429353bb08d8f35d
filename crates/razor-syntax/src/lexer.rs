//! # Lexer - Context-Free Lexemes
//!
//! This module provides the context-free half of tokenization using the
//! [Logos] lexer generator. Two small lexeme sets cover the places where a
//! regular lexer is enough:
//!
//! - [`CodeLexeme`]: identifiers, string literals and punctuation around
//!   directives and control-flow headers (`@model List<Item>`, `@if (...) {`)
//! - [`TagLexeme`]: the inside of an HTML start tag (`class="x" @bind=...>`)
//!
//! [Logos]: https://docs.rs/logos
//!
//! Everything else (markup text, `@` transitions, opaque code regions,
//! comments) depends on where the parser is, so it lives in the
//! [`scanner`](crate::scanner), which calls into this module when the
//! current context is one of the two above.
//!
//! ## Why Two Token Enums?
//!
//! Logos requires its own enum for the `#[derive(Logos)]` macro, while
//! Rowan uses our [`SyntaxKind`] for the final tree. The `to_syntax_kind`
//! methods convert between them.
//!
//! ## The Lossless Guarantee
//!
//! Nothing is skipped: whitespace is a lexeme, and input no pattern accepts
//! becomes a one-character [`SyntaxKind::UNKNOWN`] token, so every byte lands
//! in exactly one token.
//!
//! ```
//! use razor_syntax::lexer::lex_code;
//! use razor_syntax::SyntaxKind;
//!
//! assert_eq!(lex_code("List<int>"), Some((SyntaxKind::IDENT, 4)));
//! ```

use logos::Logos;

use crate::syntax_kind::SyntaxKind;

/// Lexemes of the code-punctuation context.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeLexeme {
    /// Spaces, tabs and line endings
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    /// ASCII identifier
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    /// Single-line string literal with backslash escapes
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r"'([^'\\\n]|\\.)*'")]
    StringLiteral,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("<")]
    LAngle,

    #[token(">")]
    RAngle,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token("?")]
    Question,

    #[token("*")]
    Star,

    #[token("=")]
    Eq,

    #[token("=>")]
    FatArrow,

    #[token(";")]
    Semicolon,

    #[token(":")]
    Colon,
}

impl CodeLexeme {
    /// Convert to SyntaxKind.
    pub fn to_syntax_kind(self) -> SyntaxKind {
        match self {
            CodeLexeme::Whitespace => SyntaxKind::WHITESPACE,
            CodeLexeme::Ident => SyntaxKind::IDENT,
            CodeLexeme::StringLiteral => SyntaxKind::STRING_LITERAL,
            CodeLexeme::LParen => SyntaxKind::L_PAREN,
            CodeLexeme::RParen => SyntaxKind::R_PAREN,
            CodeLexeme::LBrace => SyntaxKind::L_BRACE,
            CodeLexeme::RBrace => SyntaxKind::R_BRACE,
            CodeLexeme::LBracket => SyntaxKind::L_BRACKET,
            CodeLexeme::RBracket => SyntaxKind::R_BRACKET,
            CodeLexeme::LAngle => SyntaxKind::L_ANGLE,
            CodeLexeme::RAngle => SyntaxKind::R_ANGLE,
            CodeLexeme::Comma => SyntaxKind::COMMA,
            CodeLexeme::Dot => SyntaxKind::DOT,
            CodeLexeme::Question => SyntaxKind::QUESTION,
            CodeLexeme::Star => SyntaxKind::STAR,
            CodeLexeme::Eq => SyntaxKind::EQ,
            CodeLexeme::FatArrow => SyntaxKind::FAT_ARROW,
            CodeLexeme::Semicolon => SyntaxKind::SEMICOLON,
            CodeLexeme::Colon => SyntaxKind::COLON,
        }
    }
}

/// Lexemes of the start-tag context.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagLexeme {
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[token(">")]
    RAngle,

    #[token("/>")]
    SlashRAngle,

    #[token("=")]
    Eq,

    /// Prefix of a directive attribute (`@bind`, `@onclick`)
    #[token("@")]
    At,

    /// Attribute name
    #[regex(r"[a-zA-Z_:][a-zA-Z0-9_:.\-]*")]
    Name,
}

impl TagLexeme {
    /// Convert to SyntaxKind.
    pub fn to_syntax_kind(self) -> SyntaxKind {
        match self {
            TagLexeme::Whitespace => SyntaxKind::WHITESPACE,
            TagLexeme::RAngle => SyntaxKind::R_ANGLE,
            TagLexeme::SlashRAngle => SyntaxKind::SLASH_R_ANGLE,
            TagLexeme::Eq => SyntaxKind::EQ,
            TagLexeme::At => SyntaxKind::AT,
            TagLexeme::Name => SyntaxKind::ATTRIBUTE_NAME,
        }
    }
}

/// A scanned token: its kind and a view of the source text it covers.
///
/// The text is borrowed from the source buffer; tokens never copy input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    /// Byte offset of the first character in the source.
    pub offset: usize,
}

impl Token<'_> {
    /// Byte offset one past the last character.
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }

    /// Byte range `[offset, end)` in the source.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.end()
    }
}

/// Lex the first code-context lexeme of `input`.
///
/// Returns the kind and byte length, or `None` for empty input.
pub fn lex_code(input: &str) -> Option<(SyntaxKind, usize)> {
    first_lexeme(CodeLexeme::lexer(input), input, CodeLexeme::to_syntax_kind)
}

/// Lex the first start-tag lexeme of `input`.
pub fn lex_tag(input: &str) -> Option<(SyntaxKind, usize)> {
    first_lexeme(TagLexeme::lexer(input), input, TagLexeme::to_syntax_kind)
}

fn first_lexeme<'a, T>(
    mut lexer: logos::Lexer<'a, T>,
    input: &'a str,
    to_kind: fn(T) -> SyntaxKind,
) -> Option<(SyntaxKind, usize)>
where
    T: Logos<'a, Source = str>,
{
    let result = lexer.next()?;
    match result {
        Ok(lexeme) => Some((to_kind(lexeme), lexer.span().end)),
        Err(_) => {
            // Logos error means unrecognized character - one UNKNOWN char
            let len = input.chars().next().map_or(1, char::len_utf8);
            Some((SyntaxKind::UNKNOWN, len))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Lex a whole fragment by repeatedly taking the first lexeme.
    fn lex_all(
        input: &str,
        first: fn(&str) -> Option<(SyntaxKind, usize)>,
    ) -> Vec<(SyntaxKind, &str)> {
        let mut out = Vec::new();
        let mut rest = input;
        while let Some((kind, len)) = first(rest) {
            out.push((kind, &rest[..len]));
            rest = &rest[len..];
        }
        out
    }

    #[test]
    fn lex_empty_input() {
        assert_eq!(lex_code(""), None);
        assert_eq!(lex_tag(""), None);
    }

    #[test]
    fn lex_generic_type() {
        assert_eq!(
            lex_all("List<Item>", lex_code),
            vec![
                (SyntaxKind::IDENT, "List"),
                (SyntaxKind::L_ANGLE, "<"),
                (SyntaxKind::IDENT, "Item"),
                (SyntaxKind::R_ANGLE, ">"),
            ]
        );
    }

    #[test]
    fn nested_generic_closes_with_two_angles() {
        let kinds: Vec<_> = lex_all("A<B<C>>", lex_code)
            .into_iter()
            .map(|(kind, _)| kind)
            .collect();
        assert_eq!(
            kinds[kinds.len() - 2..].to_vec(),
            vec![SyntaxKind::R_ANGLE, SyntaxKind::R_ANGLE]
        );
    }

    #[test]
    fn lex_string_literal_with_escape() {
        assert_eq!(
            lex_code(r#""a \" b" rest"#),
            Some((SyntaxKind::STRING_LITERAL, 8))
        );
    }

    #[test]
    fn fat_arrow_beats_eq() {
        assert_eq!(lex_code("=> x"), Some((SyntaxKind::FAT_ARROW, 2)));
        assert_eq!(lex_code("= x"), Some((SyntaxKind::EQ, 1)));
    }

    #[test]
    fn unknown_character_is_one_char() {
        assert_eq!(lex_code("€x"), Some((SyntaxKind::UNKNOWN, '€'.len_utf8())));
    }

    #[test]
    fn lex_tag_attributes() {
        assert_eq!(
            lex_all(" class=\n@bind-Value/>", lex_tag),
            vec![
                (SyntaxKind::WHITESPACE, " "),
                (SyntaxKind::ATTRIBUTE_NAME, "class"),
                (SyntaxKind::EQ, "="),
                (SyntaxKind::WHITESPACE, "\n"),
                (SyntaxKind::AT, "@"),
                (SyntaxKind::ATTRIBUTE_NAME, "bind-Value"),
                (SyntaxKind::SLASH_R_ANGLE, "/>"),
            ]
        );
    }

    #[test]
    fn all_bytes_preserved() {
        let input = "IDictionary<string, List<int>>[]? name = \"x\";";
        let reconstructed: String = lex_all(input, lex_code)
            .into_iter()
            .map(|(_, text)| text)
            .collect();
        assert_eq!(input, reconstructed);
    }

    #[test]
    fn token_range_matches_text() {
        let token = Token {
            kind: SyntaxKind::TEXT,
            text: "hello",
            offset: 3,
        };
        assert_eq!(token.range(), 3..8);
        assert_eq!(token.end(), 8);
    }
}
