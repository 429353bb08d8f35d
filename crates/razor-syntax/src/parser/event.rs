//! # Parser Events
//!
//! Events are the intermediate representation between parsing and tree building.
//! Instead of building the tree directly, the parser emits a **flat sequence**
//! of events that describe the tree structure.
//!
//! ```text
//! Start(IMPLICIT_EXPRESSION)   ← Begin a node
//!   Token(IMPLICIT_EXPR_START) ← Add the next scanned token
//!   Token(MEMBER_ACCESS)
//! Finish                       ← End the node
//! ```
//!
//! The [`Sink`](super::sink::Sink) processes these in order, maintaining a
//! stack of open nodes. Start pushes, Finish pops. Each `Token` event consumes
//! exactly one scanned token; its `kind` may differ from the scanned kind when
//! the grammar reclassifies a token (an identifier used as `else`, say).

use crate::syntax_kind::SyntaxKind;

/// An event emitted by the parser during tree construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Begin a new composite node.
    Start { kind: SyntaxKind },

    /// Add the next scanned token to the current node, with this kind.
    Token { kind: SyntaxKind },

    /// Finish the current node.
    Finish,

    /// Pushed by `parser.start()` and replaced when the marker completes.
    /// An abandoned marker leaves it behind; the Sink ignores it.
    Placeholder,
}

impl Event {
    pub fn start(kind: SyntaxKind) -> Self {
        Event::Start { kind }
    }

    pub fn token(kind: SyntaxKind) -> Self {
        Event::Token { kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_constructors() {
        assert_eq!(
            Event::start(SyntaxKind::RAZOR_IF),
            Event::Start {
                kind: SyntaxKind::RAZOR_IF
            }
        );
        assert_eq!(
            Event::token(SyntaxKind::TEXT),
            Event::Token {
                kind: SyntaxKind::TEXT
            }
        );
    }
}
