//! # Code Delegation
//!
//! The parser never interprets C#. Every region it treats as code becomes one
//! opaque token in the tree (`RAW_TEXT`, `CODE_EXPRESSION`, `MEMBER_ACCESS`
//! or `PARAMETER_LIST`), and this module hands those tokens to whatever does
//! understand C#.
//!
//! Each span carries a [`Role`] telling the consumer what shape of code to
//! expect: a statement list, a boolean condition, a `foreach` declaration,
//! and so on. The role follows from the token's kind and the node it sits
//! in, so it is recomputed from the tree rather than stored.
//!
//! ```
//! use razor_syntax::delegation::{opaque_spans, Role};
//!
//! let tree = razor_syntax::parse("@foreach (var item in Items) { <li>@item.Name</li> }").unwrap();
//! let roles: Vec<_> = opaque_spans(&tree).into_iter().map(|span| span.role).collect();
//! assert_eq!(roles, [Role::ForeachDeclaration, Role::MemberAccessPath]);
//! ```

use std::fmt;
use std::ops::Range;

use rowan::{NodeOrToken, TextRange};

use crate::scanner::{self, Region};
use crate::syntax_kind::{SyntaxKind, SyntaxNode, SyntaxToken};

/// What an opaque span holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Statements of `@{ }`, `@code { }` or `@functions { }`
    StatementBlock,
    /// Condition of `if`, `else if`, `while` or `do ... while`
    BooleanExpression,
    /// A value: `@( )`, a `switch` or `lock` header, a one-line delegate body
    Expression,
    /// `var item in Items`
    ForeachDeclaration,
    /// `var i = 0; i < n; i++`
    ForLoopHeader,
    /// `Exception ex`
    CatchDeclaration,
    /// `var scope = Begin()`
    UsingDeclaration,
    /// The label of a `case`
    CaseLabel,
    /// The path of an implicit expression
    MemberAccessPath,
    /// Delegate parameters
    ParameterList,
    /// Contents of `@attribute [ ]`
    AttributeList,
    /// Value of a directive attribute such as `@onclick`
    DirectiveAttributeValue,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::StatementBlock => "statement-block",
            Role::BooleanExpression => "boolean-expression",
            Role::Expression => "expression",
            Role::ForeachDeclaration => "foreach-declaration",
            Role::ForLoopHeader => "for-loop-header",
            Role::CatchDeclaration => "catch-declaration",
            Role::UsingDeclaration => "using-declaration",
            Role::CaseLabel => "case-label",
            Role::MemberAccessPath => "member-access-path",
            Role::ParameterList => "parameter-list",
            Role::AttributeList => "attribute-list",
            Role::DirectiveAttributeValue => "directive-attribute-value",
        }
    }

    /// The region whose delimiters the span's text must balance.
    fn region(self) -> Region {
        match self {
            Role::StatementBlock => Region::Brace,
            Role::AttributeList => Region::Bracket,
            Role::CaseLabel => Region::CaseLabel,
            Role::MemberAccessPath | Role::DirectiveAttributeValue => Region::Line,
            Role::BooleanExpression
            | Role::Expression
            | Role::ForeachDeclaration
            | Role::ForLoopHeader
            | Role::CatchDeclaration
            | Role::UsingDeclaration
            | Role::ParameterList => Region::Paren,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A delimited region of code and its role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpaqueSpan {
    pub range: TextRange,
    pub role: Role,
}

impl OpaqueSpan {
    pub fn start(&self) -> usize {
        self.range.start().into()
    }

    pub fn end(&self) -> usize {
        self.range.end().into()
    }

    pub fn to_range(&self) -> Range<usize> {
        self.start()..self.end()
    }

    /// The span's text in the source it was parsed from.
    pub fn slice<'s>(&self, source: &'s str) -> Option<&'s str> {
        source.get(self.to_range())
    }
}

/// The role of an opaque token, or `None` for tokens the core interprets.
pub fn role_of(token: &SyntaxToken) -> Option<Role> {
    let parent = token.parent()?.kind();
    match token.kind() {
        SyntaxKind::RAW_TEXT => Some(Role::StatementBlock),
        SyntaxKind::MEMBER_ACCESS => Some(Role::MemberAccessPath),
        SyntaxKind::PARAMETER_LIST => Some(Role::ParameterList),
        SyntaxKind::CODE_EXPRESSION => match parent {
            SyntaxKind::RAZOR_IF
            | SyntaxKind::RAZOR_ELSE
            | SyntaxKind::RAZOR_WHILE
            | SyntaxKind::RAZOR_DO => Some(Role::BooleanExpression),
            SyntaxKind::RAZOR_FOREACH => Some(Role::ForeachDeclaration),
            SyntaxKind::RAZOR_FOR => Some(Role::ForLoopHeader),
            SyntaxKind::RAZOR_CATCH => Some(Role::CatchDeclaration),
            SyntaxKind::RAZOR_USING => Some(Role::UsingDeclaration),
            SyntaxKind::RAZOR_CASE => Some(Role::CaseLabel),
            SyntaxKind::RAZOR_SWITCH
            | SyntaxKind::RAZOR_LOCK
            | SyntaxKind::EXPLICIT_EXPRESSION
            | SyntaxKind::RAZOR_DELEGATE => Some(Role::Expression),
            SyntaxKind::DIRECTIVE_ATTRIBUTE => Some(Role::AttributeList),
            SyntaxKind::QUOTED_ATTRIBUTE_VALUE => Some(Role::DirectiveAttributeValue),
            _ => None,
        },
        SyntaxKind::UNQUOTED_ATTRIBUTE_VALUE if parent == SyntaxKind::RAZOR_DIRECTIVE_ATTRIBUTE => {
            Some(Role::DirectiveAttributeValue)
        }
        _ => None,
    }
}

fn opaque_tokens(root: &SyntaxNode) -> impl Iterator<Item = (SyntaxToken, Role)> + use<> {
    root.descendants_with_tokens()
        .filter_map(NodeOrToken::into_token)
        .filter_map(|token| role_of(&token).map(|role| (token, role)))
}

/// Every opaque span under `root`, in source order.
pub fn opaque_spans(root: &SyntaxNode) -> Vec<OpaqueSpan> {
    opaque_tokens(root)
        .map(|(token, role)| OpaqueSpan {
            range: token.text_range(),
            role,
        })
        .collect()
}

/// Re-run the scanner's balancing walk over a span's text.
///
/// Holds for every span the parser produced; a consumer can use it to check
/// text it was handed, or text it rewrote, before splicing it back.
pub fn is_balanced(role: Role, text: &str) -> bool {
    scanner::is_balanced(text, role.region())
}

/// A consumer of opaque code, such as a C# parser or highlighter.
pub trait CodeLanguage {
    type Error;

    /// Receive one span and its text.
    fn accept(&mut self, span: &OpaqueSpan, text: &str) -> Result<(), Self::Error>;
}

/// Hand every opaque span under `root` to `language`, in source order,
/// stopping at the first error.
pub fn delegate<L: CodeLanguage + ?Sized>(
    root: &SyntaxNode,
    language: &mut L,
) -> Result<(), L::Error> {
    for (token, role) in opaque_tokens(root) {
        let span = OpaqueSpan {
            range: token.text_range(),
            role,
        };
        language.accept(&span, token.text())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn spans(source: &str) -> Vec<(Role, String)> {
        let tree = parse(source).expect("parses");
        opaque_spans(&tree)
            .into_iter()
            .map(|span| {
                let text = span.slice(source).expect("in bounds").to_string();
                (span.role, text)
            })
            .collect()
    }

    #[rstest]
    #[case("@{ var x = 1; }", Role::StatementBlock, "var x = 1;")]
    #[case("@code { int n; }", Role::StatementBlock, "int n;")]
    #[case("@if (a && b) { }", Role::BooleanExpression, "a && b")]
    #[case("@while (more) { }", Role::BooleanExpression, "more")]
    #[case("@do { } while (more);", Role::BooleanExpression, "more")]
    #[case("@foreach (var i in items) { }", Role::ForeachDeclaration, "var i in items")]
    #[case("@for (var i = 0; i < 3; i++) { }", Role::ForLoopHeader, "var i = 0; i < 3; i++")]
    #[case("@using (var s = Open()) { }", Role::UsingDeclaration, "var s = Open()")]
    #[case("@lock (sync) { }", Role::Expression, "sync")]
    #[case("@(a + b)", Role::Expression, "a + b")]
    #[case("@Model.Name", Role::MemberAccessPath, "Model.Name")]
    #[case("@attribute [Authorize]", Role::AttributeList, "Authorize")]
    #[case(r#"<b @onclick="() => Go()">x</b>"#, Role::DirectiveAttributeValue, "() => Go()")]
    fn single_span_roles(#[case] source: &str, #[case] role: Role, #[case] text: &str) {
        assert_eq!(spans(source), vec![(role, text.to_string())]);
    }

    #[test]
    fn catch_declaration_and_bare_catch() {
        assert_eq!(
            spans("@try { } catch (IOException e) { } catch { } finally { }"),
            vec![(Role::CatchDeclaration, "IOException e".to_string())]
        );
    }

    #[test]
    fn switch_header_and_case_labels() {
        assert_eq!(
            spans("@switch (x) { case 1: <p>one</p> case Kind.Two: two default: none }"),
            vec![
                (Role::Expression, "x".to_string()),
                (Role::CaseLabel, "1".to_string()),
                (Role::CaseLabel, "Kind.Two".to_string()),
            ]
        );
    }

    #[test]
    fn delegate_parameters_and_body() {
        assert_eq!(
            spans("@(item) => item.Name\n"),
            vec![
                (Role::ParameterList, "item".to_string()),
                (Role::Expression, "item.Name".to_string()),
            ]
        );
    }

    #[test]
    fn markup_tokens_have_no_role() {
        let tree = parse("<p class=\"x\">hi</p>").expect("parses");
        assert!(opaque_spans(&tree).is_empty());
    }

    #[test]
    fn every_span_is_balanced() {
        let source = r#"@{ var s = "}"; if (x) { y(); } } @(f("(")) @attribute [A(B = "]")]"#;
        let tree = parse(source).expect("parses");
        let spans = opaque_spans(&tree);
        assert_eq!(spans.len(), 3);
        for span in spans {
            let text = span.slice(source).expect("in bounds");
            assert!(is_balanced(span.role, text), "{} {text:?}", span.role);
        }
    }

    #[test]
    fn unbalanced_text_is_rejected() {
        assert!(!is_balanced(Role::StatementBlock, "if (x) {"));
        assert!(!is_balanced(Role::Expression, "f(a"));
        assert!(is_balanced(Role::Expression, "f(\")\")"));
    }

    #[test]
    fn delegate_visits_in_order_and_stops_on_error() {
        struct Collect(Vec<String>);

        impl CodeLanguage for Collect {
            type Error = String;

            fn accept(&mut self, span: &OpaqueSpan, text: &str) -> Result<(), String> {
                if text == "stop" {
                    return Err(format!("rejected at {}", span.start()));
                }
                self.0.push(format!("{}:{text}", span.role));
                Ok(())
            }
        }

        let tree = parse("@if (ok) { @Name } @(stop) @(after)").expect("parses");
        let mut language = Collect(Vec::new());
        let result = delegate(&tree, &mut language);
        assert_eq!(result, Err("rejected at 21".to_string()));
        assert_eq!(
            language.0,
            vec!["boolean-expression:ok", "member-access-path:Name"]
        );
    }
}
