//! Sink for converting parser events into a Rowan green tree.

use rowan::{GreenNode, GreenNodeBuilder};

use crate::lexer::Token;
use crate::parser::event::Event;

/// Converts parser events and the tokens they consumed into a green tree.
pub struct Sink<'t, 'input> {
    builder: GreenNodeBuilder<'static>,
    tokens: &'t [Token<'input>],
    cursor: usize,
    events: Vec<Event>,
}

impl<'t, 'input> Sink<'t, 'input> {
    pub fn new(tokens: &'t [Token<'input>], events: Vec<Event>) -> Self {
        Self {
            builder: GreenNodeBuilder::new(),
            tokens,
            cursor: 0,
            events,
        }
    }

    /// Consume the sink and build the green tree.
    pub fn finish(mut self) -> GreenNode {
        for event in std::mem::take(&mut self.events) {
            match event {
                Event::Start { kind } => self.builder.start_node(kind.into()),
                Event::Token { kind } => {
                    // The parser pushes one token per Token event
                    if let Some(token) = self.tokens.get(self.cursor) {
                        self.builder.token(kind.into(), token.text);
                        self.cursor += 1;
                    }
                }
                Event::Finish => self.builder.finish_node(),
                Event::Placeholder => {}
            }
        }
        self.builder.finish()
    }
}
