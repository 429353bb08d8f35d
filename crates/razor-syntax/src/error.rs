//! Parse errors.

use std::fmt;

use thiserror::Error;

use crate::scanner::ScanError;
use crate::syntax_kind::SyntaxKind;

/// A construct that can be left open at end of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Construct {
    CodeBlock,
    ExplicitExpression,
    DelegateParameters,
    ControlHeader,
    AttributeList,
    Block,
    SwitchBody,
    CaseLabel,
    Element,
    StartTag,
    EndTag,
    AttributeValue,
    RazorComment,
    HtmlComment,
    Doctype,
    TypeArguments,
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Construct::CodeBlock => "code block",
            Construct::ExplicitExpression => "explicit expression",
            Construct::DelegateParameters => "delegate parameter list",
            Construct::ControlHeader => "control header",
            Construct::AttributeList => "attribute list",
            Construct::Block => "block",
            Construct::SwitchBody => "switch body",
            Construct::CaseLabel => "case label",
            Construct::Element => "element",
            Construct::StartTag => "start tag",
            Construct::EndTag => "end tag",
            Construct::AttributeValue => "attribute value",
            Construct::RazorComment => "Razor comment",
            Construct::HtmlComment => "HTML comment",
            Construct::Doctype => "doctype",
            Construct::TypeArguments => "type argument list",
        };
        f.write_str(name)
    }
}

/// Fatal parse error. Every variant carries the offending byte offset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unterminated {construct} opened at offset {start}: input ends at offset {offset}")]
    UnterminatedConstruct {
        construct: Construct,
        start: usize,
        offset: usize,
    },

    #[error("unexpected {found} at offset {offset}, expected {}", describe(.expected))]
    UnexpectedToken {
        offset: usize,
        found: String,
        expected: Vec<SyntaxKind>,
    },

    #[error("cannot classify `{text}` at offset {offset}")]
    AmbiguousDirective { offset: usize, text: String },

    #[error("nesting depth exceeds {limit} at offset {offset}")]
    NestingDepthExceeded { offset: usize, limit: usize },
}

impl ParseError {
    /// Byte offset where parsing stopped.
    pub fn offset(&self) -> usize {
        match self {
            ParseError::UnterminatedConstruct { offset, .. }
            | ParseError::UnexpectedToken { offset, .. }
            | ParseError::AmbiguousDirective { offset, .. }
            | ParseError::NestingDepthExceeded { offset, .. } => *offset,
        }
    }

    /// Token kinds that would have been accepted at [`ParseError::offset`].
    pub fn expected_kinds(&self) -> &[SyntaxKind] {
        match self {
            ParseError::UnexpectedToken { expected, .. } => expected,
            _ => &[],
        }
    }
}

impl From<ScanError> for ParseError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::Unclassified { offset, text } => {
                ParseError::AmbiguousDirective { offset, text }
            }
            ScanError::Unbalanced {
                offset,
                found,
                expected,
            } => ParseError::UnexpectedToken {
                offset,
                found,
                expected,
            },
        }
    }
}

fn describe(expected: &[SyntaxKind]) -> String {
    match expected {
        [] => "nothing".to_string(),
        [only] => format!("{only:?}"),
        _ => {
            let names: Vec<String> = expected.iter().map(|kind| format!("{kind:?}")).collect();
            format!("one of {}", names.join(", "))
        }
    }
}
