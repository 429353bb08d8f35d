//! # Conflict Table
//!
//! Every place where the grammar could take more than one production is
//! listed here as data: a [`Position`], the [`ConflictClass`] it belongs to,
//! and an ordered list of `(Lookahead, Production)` rules. The first rule
//! whose lookahead matches wins. Nothing here backtracks: each lookahead
//! inspects a bounded prefix of the remaining source (one character, a
//! keyword, or one balanced group).
//!
//! The scanner consults [`Position::Transition`] at every `@` and
//! [`Position::TagOpen`] at every `<` in markup; the grammar consults the
//! rest at the positions they name.
//!
//! ```
//! use razor_syntax::conflicts::{resolve, Position, Production};
//! use razor_syntax::KeywordTable;
//!
//! let table = KeywordTable::default();
//! assert_eq!(resolve(Position::Transition, "@if (x) {}", &table), Production::Control);
//! assert_eq!(resolve(Position::Transition, "@Model.Name", &table), Production::ImplicitExpression);
//! assert_eq!(resolve(Position::AttributeStart, "@onclick=\"Go\"", &table), Production::DirectiveAttribute);
//! ```

use crate::keywords::{KeywordClass, KeywordTable};
use crate::scanner::{Region, ident_len, is_ident_continue, region_end};

/// A grammar position where productions compete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    /// At `@` in markup or an attribute value
    Transition,
    /// After `@using`
    UsingKeyword,
    /// At the start of an attribute inside a start tag
    AttributeStart,
    /// At `<` in markup
    TagOpen,
    /// After a type name inside a type-expecting directive
    TypeSuffix,
    /// After the body of an `if` or `else if`
    IfContinuation,
    /// After `else`
    ElseShape,
    /// After the body of a `try` or `catch`
    TryContinuation,
    /// After `catch`
    CatchShape,
    /// Inside a `switch` body, between arms
    SwitchArm,
}

/// The kinds of ambiguity the table resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictClass {
    /// `@word`: directive or control construct vs implicit expression
    DirectiveVsImplicitExpression,
    /// `@name` in a tag: directive attribute vs HTML attribute
    HtmlAttributeVsDirectiveAttribute,
    /// `<` after a type name: type arguments vs comparison
    TypeReference,
    /// `@using`: namespace directive vs using statement
    DirectiveVsStatement,
    /// `@( ... )`: explicit expression vs delegate parameter list
    ExpressionVsDelegate,
    /// Whether a construct continues (`else`, `catch`, `case`, ...)
    Continuation,
    /// `<` in markup: tag, comment or doctype vs literal text
    TagVsText,
}

/// A bounded lookahead predicate over the remaining source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookahead {
    Always,
    /// The input starts with this literal
    StartsWith(&'static str),
    /// This literal followed by an ASCII letter
    TagStart(&'static str),
    /// `@( balanced )` followed by optional whitespace and `=>`
    ArrowAfterGroup,
    /// `@word` where `word` is reserved with this class
    Reserved(KeywordClass),
    /// `@` followed by an identifier start character
    IdentifierStart,
    /// The first non-whitespace character is this one
    NextNonSpace(char),
    /// After optional whitespace, this word at a word boundary
    Keyword(&'static str),
}

/// The production a conflict resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Production {
    RazorComment,
    EscapedAt,
    CodeBlock,
    ExplicitExpression,
    Delegate,
    Directive,
    Control,
    DirectiveOrStatement,
    Continuation,
    ImplicitExpression,
    UsingDirective,
    UsingStatement,
    HtmlAttribute,
    DirectiveAttribute,
    HtmlComment,
    Doctype,
    EndTag,
    StartTag,
    Text,
    TypeArguments,
    ArraySuffix,
    NullableSuffix,
    PointerSuffix,
    EndOfType,
    Else,
    ElseIf,
    ElseBlock,
    Catch,
    Finally,
    CatchDeclaration,
    CatchBlock,
    Case,
    Default,
    EndOfConstruct,
    /// No rule matched
    Unclassified,
}

/// One row of the conflict table.
#[derive(Debug, Clone, Copy)]
pub struct ConflictResolution {
    pub position: Position,
    pub class: ConflictClass,
    /// Rules in precedence order.
    pub rules: &'static [(Lookahead, Production)],
}

use Lookahead as L;
use Production as P;

pub static CONFLICTS: &[ConflictResolution] = &[
    ConflictResolution {
        position: Position::Transition,
        class: ConflictClass::DirectiveVsImplicitExpression,
        rules: &[
            (L::StartsWith("@*"), P::RazorComment),
            (L::StartsWith("@@"), P::EscapedAt),
            (L::StartsWith("@{"), P::CodeBlock),
            (L::StartsWith("@=>"), P::Delegate),
            (L::ArrowAfterGroup, P::Delegate),
            (L::StartsWith("@("), P::ExplicitExpression),
            (L::Reserved(KeywordClass::Directive), P::Directive),
            (L::Reserved(KeywordClass::Control), P::Control),
            (
                L::Reserved(KeywordClass::DirectiveOrStatement),
                P::DirectiveOrStatement,
            ),
            (L::Reserved(KeywordClass::Continuation), P::Continuation),
            (L::IdentifierStart, P::ImplicitExpression),
        ],
    },
    ConflictResolution {
        position: Position::UsingKeyword,
        class: ConflictClass::DirectiveVsStatement,
        rules: &[
            (L::NextNonSpace('('), P::UsingStatement),
            (L::Always, P::UsingDirective),
        ],
    },
    ConflictResolution {
        position: Position::AttributeStart,
        class: ConflictClass::HtmlAttributeVsDirectiveAttribute,
        rules: &[
            (L::StartsWith("@"), P::DirectiveAttribute),
            (L::Always, P::HtmlAttribute),
        ],
    },
    ConflictResolution {
        position: Position::TagOpen,
        class: ConflictClass::TagVsText,
        rules: &[
            (L::StartsWith("<!--"), P::HtmlComment),
            (L::TagStart("<!"), P::Doctype),
            (L::TagStart("</"), P::EndTag),
            (L::TagStart("<"), P::StartTag),
            (L::Always, P::Text),
        ],
    },
    ConflictResolution {
        position: Position::TypeSuffix,
        class: ConflictClass::TypeReference,
        rules: &[
            (L::StartsWith("<"), P::TypeArguments),
            (L::StartsWith("[]"), P::ArraySuffix),
            (L::StartsWith("?"), P::NullableSuffix),
            (L::StartsWith("*"), P::PointerSuffix),
            (L::Always, P::EndOfType),
        ],
    },
    ConflictResolution {
        position: Position::IfContinuation,
        class: ConflictClass::Continuation,
        rules: &[(L::Keyword("else"), P::Else), (L::Always, P::EndOfConstruct)],
    },
    ConflictResolution {
        position: Position::ElseShape,
        class: ConflictClass::Continuation,
        rules: &[(L::Keyword("if"), P::ElseIf), (L::Always, P::ElseBlock)],
    },
    ConflictResolution {
        position: Position::TryContinuation,
        class: ConflictClass::Continuation,
        rules: &[
            (L::Keyword("catch"), P::Catch),
            (L::Keyword("finally"), P::Finally),
            (L::Always, P::EndOfConstruct),
        ],
    },
    ConflictResolution {
        position: Position::CatchShape,
        class: ConflictClass::Continuation,
        rules: &[
            (L::NextNonSpace('('), P::CatchDeclaration),
            (L::Always, P::CatchBlock),
        ],
    },
    ConflictResolution {
        position: Position::SwitchArm,
        class: ConflictClass::Continuation,
        rules: &[
            (L::Keyword("case"), P::Case),
            (L::Keyword("default"), P::Default),
            (L::NextNonSpace('}'), P::EndOfConstruct),
        ],
    },
];

/// The table row for `position`.
pub fn conflict(position: Position) -> Option<&'static ConflictResolution> {
    CONFLICTS.iter().find(|row| row.position == position)
}

/// Resolve the conflict at `position` against the remaining input.
///
/// Returns [`Production::Unclassified`] when no rule matches.
pub fn resolve(position: Position, rest: &str, keywords: &KeywordTable) -> Production {
    let Some(row) = conflict(position) else {
        return Production::Unclassified;
    };
    row.rules
        .iter()
        .find(|(lookahead, _)| lookahead.matches(rest, keywords))
        .map_or(Production::Unclassified, |&(_, production)| production)
}

impl Lookahead {
    /// Whether this predicate holds at the start of `rest`.
    pub fn matches(self, rest: &str, keywords: &KeywordTable) -> bool {
        match self {
            Lookahead::Always => true,
            Lookahead::StartsWith(prefix) => rest.starts_with(prefix),
            Lookahead::TagStart(prefix) => rest
                .strip_prefix(prefix)
                .and_then(|after| after.chars().next())
                .is_some_and(|c| c.is_ascii_alphabetic()),
            Lookahead::ArrowAfterGroup => arrow_after_group(rest),
            Lookahead::Reserved(class) => transition_word(rest)
                .and_then(|word| keywords.get(word))
                .is_some_and(|keyword| keyword.class() == class),
            Lookahead::IdentifierStart => transition_word(rest).is_some(),
            Lookahead::NextNonSpace(c) => rest.trim_start().starts_with(c),
            Lookahead::Keyword(word) => starts_with_word(rest.trim_start(), word),
        }
    }
}

/// The identifier directly after a leading `@`, if any.
fn transition_word(rest: &str) -> Option<&str> {
    let after = rest.strip_prefix('@')?;
    let len = ident_len(after);
    (len > 0).then(|| &after[..len])
}

fn arrow_after_group(rest: &str) -> bool {
    let Some(inner) = rest.strip_prefix("@(") else {
        return false;
    };
    let Some(close) = region_end(inner, Region::Paren) else {
        return false;
    };
    inner[close + 1..].trim_start().starts_with("=>")
}

/// `text` starts with `word` and the word is not a prefix of a longer identifier.
pub(crate) fn starts_with_word(text: &str, word: &str) -> bool {
    text.strip_prefix(word)
        .is_some_and(|after| !after.chars().next().is_some_and(is_ident_continue))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn table() -> KeywordTable {
        KeywordTable::default()
    }

    #[test]
    fn every_position_has_one_row() {
        let positions = [
            Position::Transition,
            Position::UsingKeyword,
            Position::AttributeStart,
            Position::TagOpen,
            Position::TypeSuffix,
            Position::IfContinuation,
            Position::ElseShape,
            Position::TryContinuation,
            Position::CatchShape,
            Position::SwitchArm,
        ];
        for position in positions {
            let rows = CONFLICTS.iter().filter(|r| r.position == position).count();
            assert_eq!(rows, 1, "{position:?}");
        }
    }

    #[rstest]
    #[case("@* note *@", Production::RazorComment)]
    #[case("@@", Production::EscapedAt)]
    #[case("@{ var x = 1; }", Production::CodeBlock)]
    #[case("@(1 + 2)", Production::ExplicitExpression)]
    #[case("@(x) => x", Production::Delegate)]
    #[case("@(\")\") => x", Production::Delegate)]
    #[case("@=> <p></p>", Production::Delegate)]
    #[case("@model Foo", Production::Directive)]
    #[case("@foreach (var x in xs)", Production::Control)]
    #[case("@using System", Production::DirectiveOrStatement)]
    #[case("@else", Production::Continuation)]
    #[case("@Model.Name", Production::ImplicitExpression)]
    #[case("@foo", Production::ImplicitExpression)]
    #[case("@iffy", Production::ImplicitExpression)]
    #[case("@if.Something", Production::Control)]
    #[case("@ ", Production::Unclassified)]
    #[case("@1", Production::Unclassified)]
    #[case("@", Production::Unclassified)]
    fn transition(#[case] rest: &str, #[case] expected: Production) {
        assert_eq!(resolve(Position::Transition, rest, &table()), expected);
    }

    #[test]
    fn transition_follows_the_table() {
        let mut keywords = table();
        keywords.remove("model");
        assert_eq!(
            resolve(Position::Transition, "@model", &keywords),
            Production::ImplicitExpression
        );
    }

    #[rstest]
    #[case(" (var r = Open()) {", Production::UsingStatement)]
    #[case("(x)", Production::UsingStatement)]
    #[case(" System.Linq", Production::UsingDirective)]
    fn using_keyword(#[case] rest: &str, #[case] expected: Production) {
        assert_eq!(resolve(Position::UsingKeyword, rest, &table()), expected);
    }

    #[rstest]
    #[case("<!-- c -->", Production::HtmlComment)]
    #[case("<!DOCTYPE html>", Production::Doctype)]
    #[case("</div>", Production::EndTag)]
    #[case("<div>", Production::StartTag)]
    #[case("< 3", Production::Text)]
    #[case("<3", Production::Text)]
    #[case("</ ", Production::Text)]
    fn tag_open(#[case] rest: &str, #[case] expected: Production) {
        assert_eq!(resolve(Position::TagOpen, rest, &table()), expected);
    }

    #[rstest]
    #[case("<int>", Production::TypeArguments)]
    #[case("[] x", Production::ArraySuffix)]
    #[case("? x", Production::NullableSuffix)]
    #[case("*", Production::PointerSuffix)]
    #[case(" Name", Production::EndOfType)]
    fn type_suffix(#[case] rest: &str, #[case] expected: Production) {
        assert_eq!(resolve(Position::TypeSuffix, rest, &table()), expected);
    }

    #[rstest]
    #[case(Position::IfContinuation, "\n else {", Production::Else)]
    #[case(Position::IfContinuation, " elsewhere", Production::EndOfConstruct)]
    #[case(Position::ElseShape, " if (y)", Production::ElseIf)]
    #[case(Position::ElseShape, " {", Production::ElseBlock)]
    #[case(Position::TryContinuation, " catch {", Production::Catch)]
    #[case(Position::TryContinuation, "finally {", Production::Finally)]
    #[case(Position::TryContinuation, "<p>", Production::EndOfConstruct)]
    #[case(Position::CatchShape, " (Exception e)", Production::CatchDeclaration)]
    #[case(Position::CatchShape, " {", Production::CatchBlock)]
    #[case(Position::SwitchArm, "  case 1:", Production::Case)]
    #[case(Position::SwitchArm, "default:", Production::Default)]
    #[case(Position::SwitchArm, " }", Production::EndOfConstruct)]
    #[case(Position::SwitchArm, "<p>", Production::Unclassified)]
    fn continuations(#[case] position: Position, #[case] rest: &str, #[case] expected: Production) {
        assert_eq!(resolve(position, rest, &table()), expected);
    }

    #[test]
    fn attribute_prefix_rule_needs_one_character() {
        assert_eq!(
            resolve(Position::AttributeStart, "@bind-Value", &table()),
            Production::DirectiveAttribute
        );
        assert_eq!(
            resolve(Position::AttributeStart, "class", &table()),
            Production::HtmlAttribute
        );
    }
}
