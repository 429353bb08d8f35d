//! # Typed Tree Views
//!
//! Thin wrappers over [`SyntaxNode`] that give each node category a typed
//! API. A wrapper owns nothing beyond the node: casting is a kind check, and
//! every accessor reads the underlying CST.
//!
//! [`walk`] visits the tree in preorder, calling the [`Visitor`] method for
//! each node category and [`Visitor::visit_text`] for every markup text
//! token. Visitor methods default to doing nothing, so a visitor only
//! overrides what it cares about.
//!
//! ```
//! use razor_syntax::ast::{walk, Directive, Visitor};
//!
//! struct Directives(Vec<String>);
//!
//! impl Visitor for Directives {
//!     fn visit_directive(&mut self, directive: &Directive) {
//!         self.0.push(directive.kind().name().to_string());
//!     }
//! }
//!
//! let tree = razor_syntax::parse("@page \"/\"\n@model Index\n<h1>Hi</h1>").unwrap();
//! let mut visitor = Directives(Vec::new());
//! walk(&tree, &mut visitor);
//! assert_eq!(visitor.0, ["page", "model"]);
//! ```

use rowan::{NodeOrToken, TextRange, WalkEvent};

use crate::keywords::{ControlKind, DirectiveKind};
use crate::syntax_kind::{SyntaxKind, SyntaxNode, SyntaxToken};

/// A typed view of one node kind (or a family of kinds).
pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;

    fn cast(node: SyntaxNode) -> Option<Self>;

    fn syntax(&self) -> &SyntaxNode;

    fn text_range(&self) -> TextRange {
        self.syntax().text_range()
    }
}

macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident, $($kind:ident)|+) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                matches!(kind, $(SyntaxKind::$kind)|+)
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                Self::can_cast(node.kind()).then(|| Self(node))
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

fn child_token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(NodeOrToken::into_token)
        .find(|token| token.kind() == kind)
}

fn child<N: AstNode>(node: &SyntaxNode) -> Option<N> {
    node.children().find_map(N::cast)
}

/// Markup-level child nodes of `node`.
fn razor_children(node: &SyntaxNode) -> impl Iterator<Item = RazorNode> + use<> {
    node.children().filter_map(RazorNode::cast)
}

ast_node!(
    /// The root.
    Document,
    DOCUMENT
);

impl Document {
    /// Wrap the root of a finished parse. The parser always produces a
    /// `DOCUMENT` root.
    pub(crate) fn from_root(root: SyntaxNode) -> Self {
        Self(root)
    }

    /// Top-level nodes in source order.
    pub fn nodes(&self) -> impl Iterator<Item = RazorNode> + use<> {
        razor_children(&self.0)
    }

    /// Top-level directives in source order.
    pub fn directives(&self) -> impl Iterator<Item = Directive> + use<> {
        self.0.children().filter_map(Directive::cast)
    }
}

/// `@model T`, `@code { ... }`, ...
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Directive {
    syntax: SyntaxNode,
    kind: DirectiveKind,
}

impl AstNode for Directive {
    fn can_cast(kind: SyntaxKind) -> bool {
        kind.is_directive()
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        let kind = DirectiveKind::from_syntax_kind(node.kind())?;
        Some(Self { syntax: node, kind })
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.syntax
    }
}

impl Directive {
    pub fn kind(&self) -> DirectiveKind {
        self.kind
    }

    /// The keyword token, `@` included.
    pub fn keyword(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::DIRECTIVE_KEYWORD)
    }

    /// The type operand of `@model`, `@inherits`, `@implements`, `@inject`.
    pub fn type_reference(&self) -> Option<TypeReference> {
        child(&self.syntax)
    }

    /// The unquoted contents of a string operand (`@page "/x"` → `/x`).
    pub fn string_value(&self) -> Option<String> {
        let token = child_token(&self.syntax, SyntaxKind::STRING_LITERAL)?;
        let text = token.text();
        text.get(1..text.len().saturating_sub(1))
            .map(str::to_string)
    }

    /// A name operand: the member of `@inject`, the name of `@section`, or
    /// the identifier of `@layout`/`@rendermode`/`@typeparam`.
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::IDENT)
            .or_else(|| child_token(&self.syntax, SyntaxKind::QUALIFIED_NAME))
    }

    /// The namespace of `@using`/`@namespace`, and its alias if any.
    pub fn namespace(&self) -> Option<(String, Option<String>)> {
        let reference = self
            .syntax
            .children()
            .find(|node| node.kind() == SyntaxKind::NAMESPACE_REFERENCE)?;
        let names: Vec<_> = reference
            .children_with_tokens()
            .filter_map(NodeOrToken::into_token)
            .filter(|token| token.kind() == SyntaxKind::QUALIFIED_NAME)
            .map(|token| token.text().to_string())
            .collect();
        match names.as_slice() {
            [namespace] => Some((namespace.clone(), None)),
            [alias, namespace] => Some((namespace.clone(), Some(alias.clone()))),
            _ => None,
        }
    }

    /// Opaque code: the body of `@code`/`@functions` or the list of
    /// `@attribute`.
    pub fn code(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::RAW_TEXT)
            .or_else(|| child_token(&self.syntax, SyntaxKind::CODE_EXPRESSION))
    }

    /// `true`/`false` of `@preservewhitespace`.
    pub fn boolean(&self) -> Option<bool> {
        child_token(&self.syntax, SyntaxKind::BOOLEAN_LITERAL).map(|token| token.text() == "true")
    }

    /// The markup body of `@section`.
    pub fn block(&self) -> Option<Block> {
        child(&self.syntax)
    }
}

/// `@if`, `@foreach`, `@switch`, ...
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Control {
    syntax: SyntaxNode,
    kind: ControlKind,
}

impl AstNode for Control {
    fn can_cast(kind: SyntaxKind) -> bool {
        kind.is_control()
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        let kind = ControlKind::from_syntax_kind(node.kind())?;
        Some(Self { syntax: node, kind })
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.syntax
    }
}

impl Control {
    pub fn kind(&self) -> ControlKind {
        self.kind
    }

    pub fn keyword(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::CONTROL_KEYWORD)
    }

    /// The opaque header between the parentheses.
    pub fn header(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::CODE_EXPRESSION)
    }

    /// The main body. `switch` has none; its arms are [`Control::clauses`].
    pub fn body(&self) -> Option<Block> {
        child(&self.syntax)
    }

    /// `else`, `catch`, `finally` and `case` clauses in source order.
    pub fn clauses(&self) -> impl Iterator<Item = Clause> + use<> {
        self.syntax.children().filter_map(Clause::cast)
    }
}

ast_node!(
    /// A clause continuing a control construct.
    Clause,
    RAZOR_ELSE | RAZOR_CATCH | RAZOR_FINALLY | RAZOR_CASE
);

impl Clause {
    /// `else`, `catch`, `finally`, `case` or `default`.
    pub fn keyword(&self) -> Option<SyntaxToken> {
        child_token(&self.0, SyntaxKind::KEYWORD)
    }

    /// `else if`
    pub fn is_else_if(&self) -> bool {
        self.0.kind() == SyntaxKind::RAZOR_ELSE
            && self
                .0
                .children_with_tokens()
                .filter(|element| element.kind() == SyntaxKind::KEYWORD)
                .count()
                == 2
    }

    /// The opaque header: an `else if` condition, a catch declaration or a
    /// case label.
    pub fn header(&self) -> Option<SyntaxToken> {
        child_token(&self.0, SyntaxKind::CODE_EXPRESSION)
    }

    pub fn body(&self) -> Option<Block> {
        child(&self.0)
    }

    /// Markup of a `case` or `default` arm.
    pub fn nodes(&self) -> impl Iterator<Item = RazorNode> + use<> {
        razor_children(&self.0)
    }
}

ast_node!(
    /// A brace-delimited markup body.
    Block,
    BLOCK
);

impl Block {
    pub fn nodes(&self) -> impl Iterator<Item = RazorNode> + use<> {
        razor_children(&self.0)
    }
}

ast_node!(
    /// `@{ ... }`
    CodeBlock,
    CODE_BLOCK
);

impl CodeBlock {
    pub fn code(&self) -> Option<SyntaxToken> {
        child_token(&self.0, SyntaxKind::RAW_TEXT)
    }
}

ast_node!(
    /// `@( ... )`
    ExplicitExpression,
    EXPLICIT_EXPRESSION
);

impl ExplicitExpression {
    pub fn code(&self) -> Option<SyntaxToken> {
        child_token(&self.0, SyntaxKind::CODE_EXPRESSION)
    }
}

ast_node!(
    /// `@Member.Path`
    ImplicitExpression,
    IMPLICIT_EXPRESSION
);

impl ImplicitExpression {
    pub fn path(&self) -> Option<SyntaxToken> {
        child_token(&self.0, SyntaxKind::MEMBER_ACCESS)
    }
}

ast_node!(
    /// `@(args) => body`
    Delegate,
    RAZOR_DELEGATE
);

impl Delegate {
    pub fn parameters(&self) -> Option<SyntaxToken> {
        child_token(&self.0, SyntaxKind::PARAMETER_LIST)
    }

    /// Markup body, when the delegate has one.
    pub fn body(&self) -> Option<Block> {
        child(&self.0)
    }

    /// Single-line expression body, when the delegate has one.
    pub fn expression(&self) -> Option<SyntaxToken> {
        child_token(&self.0, SyntaxKind::CODE_EXPRESSION)
    }
}

ast_node!(
    /// An HTML element, with or without an end tag.
    Element,
    HTML_ELEMENT | HTML_SELF_CLOSING_ELEMENT
);

impl Element {
    pub fn is_self_closing(&self) -> bool {
        self.0.kind() == SyntaxKind::HTML_SELF_CLOSING_ELEMENT
    }

    pub fn start_tag(&self) -> Option<StartTag> {
        child(&self.0)
    }

    pub fn end_tag(&self) -> Option<EndTag> {
        child(&self.0)
    }

    /// The node holding the tag name and attributes.
    fn tag(&self) -> SyntaxNode {
        match self.start_tag() {
            Some(tag) => tag.0,
            None => self.0.clone(),
        }
    }

    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.tag(), SyntaxKind::TAG_NAME)
    }

    pub fn attributes(&self) -> impl Iterator<Item = Attribute> + use<> {
        self.tag().children().filter_map(Attribute::cast)
    }

    pub fn directive_attributes(&self) -> impl Iterator<Item = DirectiveAttribute> + use<> {
        self.tag().children().filter_map(DirectiveAttribute::cast)
    }

    /// Child nodes between the start and end tags.
    pub fn children(&self) -> impl Iterator<Item = RazorNode> + use<> {
        self.0
            .children()
            .filter(|node| {
                !matches!(
                    node.kind(),
                    SyntaxKind::HTML_START_TAG
                        | SyntaxKind::HTML_END_TAG
                        | SyntaxKind::HTML_ATTRIBUTE
                        | SyntaxKind::RAZOR_DIRECTIVE_ATTRIBUTE
                )
            })
            .filter_map(RazorNode::cast)
    }
}

ast_node!(
    /// `<name ...>`
    StartTag,
    HTML_START_TAG
);

impl StartTag {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.0, SyntaxKind::TAG_NAME)
    }
}

ast_node!(
    /// `</name>`
    EndTag,
    HTML_END_TAG
);

impl EndTag {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.0, SyntaxKind::TAG_NAME)
    }
}

ast_node!(
    /// `name` or `name=value`
    Attribute,
    HTML_ATTRIBUTE
);

impl Attribute {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.0, SyntaxKind::ATTRIBUTE_NAME)
    }

    /// The value's source text without quotes. Transitions inside it are
    /// included verbatim.
    pub fn value_text(&self) -> Option<String> {
        if let Some(token) = child_token(&self.0, SyntaxKind::UNQUOTED_ATTRIBUTE_VALUE) {
            return Some(token.text().to_string());
        }
        if let Some(quoted) = self
            .0
            .children()
            .find(|node| node.kind() == SyntaxKind::QUOTED_ATTRIBUTE_VALUE)
        {
            let text = quoted.text().to_string();
            return Some(text.get(1..text.len().saturating_sub(1)).unwrap_or("").to_string());
        }
        // A bare `@expr` value
        self.0
            .children()
            .find(|node| {
                matches!(
                    node.kind(),
                    SyntaxKind::IMPLICIT_EXPRESSION | SyntaxKind::EXPLICIT_EXPRESSION
                )
            })
            .map(|node| node.text().to_string())
    }

    /// Expressions embedded in the value.
    pub fn expressions(&self) -> impl Iterator<Item = RazorNode> + use<> {
        self.0
            .descendants()
            .filter(|node| {
                matches!(
                    node.kind(),
                    SyntaxKind::IMPLICIT_EXPRESSION | SyntaxKind::EXPLICIT_EXPRESSION
                )
            })
            .filter_map(RazorNode::cast)
    }
}

ast_node!(
    /// `@name` or `@name=value` in a start tag
    DirectiveAttribute,
    RAZOR_DIRECTIVE_ATTRIBUTE
);

impl DirectiveAttribute {
    /// The name without its `@`.
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.0, SyntaxKind::ATTRIBUTE_NAME)
    }

    /// The opaque value expression.
    pub fn value(&self) -> Option<SyntaxToken> {
        self.0
            .descendants_with_tokens()
            .filter_map(NodeOrToken::into_token)
            .find(|token| {
                matches!(
                    token.kind(),
                    SyntaxKind::CODE_EXPRESSION
                        | SyntaxKind::UNQUOTED_ATTRIBUTE_VALUE
                        | SyntaxKind::MEMBER_ACCESS
                )
            })
    }
}

ast_node!(
    /// `@* ... *@` or `<!-- ... -->`
    Comment,
    RAZOR_COMMENT | HTML_COMMENT
);

impl Comment {
    pub fn is_razor(&self) -> bool {
        self.0.kind() == SyntaxKind::RAZOR_COMMENT
    }

    pub fn content(&self) -> Option<SyntaxToken> {
        child_token(&self.0, SyntaxKind::COMMENT_CONTENT)
            .or_else(|| child_token(&self.0, SyntaxKind::HTML_COMMENT_CONTENT))
    }
}

ast_node!(
    /// `<!DOCTYPE ...>`
    Doctype,
    HTML_DOCTYPE
);

impl Doctype {
    pub fn content(&self) -> Option<SyntaxToken> {
        child_token(&self.0, SyntaxKind::DOCTYPE_CONTENT)
    }
}

ast_node!(
    /// A type in a directive, `List<Item>[]?`
    TypeReference,
    TYPE_REFERENCE
);

impl TypeReference {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.0, SyntaxKind::QUALIFIED_NAME)
    }

    /// Type arguments in order.
    pub fn arguments(&self) -> impl Iterator<Item = TypeReference> + use<> {
        self.0
            .children()
            .filter(|node| node.kind() == SyntaxKind::TYPE_ARGUMENTS)
            .flat_map(|args| args.children().filter_map(TypeReference::cast).collect::<Vec<_>>())
    }

    pub fn is_array(&self) -> bool {
        child_token(&self.0, SyntaxKind::L_BRACKET).is_some()
    }

    pub fn is_nullable(&self) -> bool {
        child_token(&self.0, SyntaxKind::QUESTION).is_some()
    }
}

/// Any node a [`Visitor`] is told about.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RazorNode {
    Document(Document),
    Directive(Directive),
    Control(Control),
    Clause(Clause),
    Block(Block),
    CodeBlock(CodeBlock),
    ExplicitExpression(ExplicitExpression),
    ImplicitExpression(ImplicitExpression),
    Delegate(Delegate),
    Element(Element),
    StartTag(StartTag),
    EndTag(EndTag),
    Attribute(Attribute),
    DirectiveAttribute(DirectiveAttribute),
    Comment(Comment),
    Doctype(Doctype),
    TypeReference(TypeReference),
}

impl RazorNode {
    /// `None` for the structural nodes with no category of their own
    /// (`QUOTED_ATTRIBUTE_VALUE`, `TYPE_ARGUMENTS`, `NAMESPACE_REFERENCE`).
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        let kind = node.kind();
        let typed = if Directive::can_cast(kind) {
            Self::Directive(Directive::cast(node)?)
        } else if Control::can_cast(kind) {
            Self::Control(Control::cast(node)?)
        } else {
            match kind {
                SyntaxKind::DOCUMENT => Self::Document(Document(node)),
                SyntaxKind::RAZOR_ELSE
                | SyntaxKind::RAZOR_CATCH
                | SyntaxKind::RAZOR_FINALLY
                | SyntaxKind::RAZOR_CASE => Self::Clause(Clause(node)),
                SyntaxKind::BLOCK => Self::Block(Block(node)),
                SyntaxKind::CODE_BLOCK => Self::CodeBlock(CodeBlock(node)),
                SyntaxKind::EXPLICIT_EXPRESSION => {
                    Self::ExplicitExpression(ExplicitExpression(node))
                }
                SyntaxKind::IMPLICIT_EXPRESSION => {
                    Self::ImplicitExpression(ImplicitExpression(node))
                }
                SyntaxKind::RAZOR_DELEGATE => Self::Delegate(Delegate(node)),
                SyntaxKind::HTML_ELEMENT | SyntaxKind::HTML_SELF_CLOSING_ELEMENT => {
                    Self::Element(Element(node))
                }
                SyntaxKind::HTML_START_TAG => Self::StartTag(StartTag(node)),
                SyntaxKind::HTML_END_TAG => Self::EndTag(EndTag(node)),
                SyntaxKind::HTML_ATTRIBUTE => Self::Attribute(Attribute(node)),
                SyntaxKind::RAZOR_DIRECTIVE_ATTRIBUTE => {
                    Self::DirectiveAttribute(DirectiveAttribute(node))
                }
                SyntaxKind::RAZOR_COMMENT | SyntaxKind::HTML_COMMENT => {
                    Self::Comment(Comment(node))
                }
                SyntaxKind::HTML_DOCTYPE => Self::Doctype(Doctype(node)),
                SyntaxKind::TYPE_REFERENCE => Self::TypeReference(TypeReference(node)),
                _ => return None,
            }
        };
        Some(typed)
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Self::Document(n) => n.syntax(),
            Self::Directive(n) => n.syntax(),
            Self::Control(n) => n.syntax(),
            Self::Clause(n) => n.syntax(),
            Self::Block(n) => n.syntax(),
            Self::CodeBlock(n) => n.syntax(),
            Self::ExplicitExpression(n) => n.syntax(),
            Self::ImplicitExpression(n) => n.syntax(),
            Self::Delegate(n) => n.syntax(),
            Self::Element(n) => n.syntax(),
            Self::StartTag(n) => n.syntax(),
            Self::EndTag(n) => n.syntax(),
            Self::Attribute(n) => n.syntax(),
            Self::DirectiveAttribute(n) => n.syntax(),
            Self::Comment(n) => n.syntax(),
            Self::Doctype(n) => n.syntax(),
            Self::TypeReference(n) => n.syntax(),
        }
    }

    /// Call the visitor method for this node's category.
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            Self::Document(n) => visitor.visit_document(n),
            Self::Directive(n) => visitor.visit_directive(n),
            Self::Control(n) => visitor.visit_control(n),
            Self::Clause(n) => visitor.visit_clause(n),
            Self::Block(n) => visitor.visit_block(n),
            Self::CodeBlock(n) => visitor.visit_code_block(n),
            Self::ExplicitExpression(n) => visitor.visit_explicit_expression(n),
            Self::ImplicitExpression(n) => visitor.visit_implicit_expression(n),
            Self::Delegate(n) => visitor.visit_delegate(n),
            Self::Element(n) => visitor.visit_element(n),
            Self::StartTag(n) => visitor.visit_start_tag(n),
            Self::EndTag(n) => visitor.visit_end_tag(n),
            Self::Attribute(n) => visitor.visit_attribute(n),
            Self::DirectiveAttribute(n) => visitor.visit_directive_attribute(n),
            Self::Comment(n) => visitor.visit_comment(n),
            Self::Doctype(n) => visitor.visit_doctype(n),
            Self::TypeReference(n) => visitor.visit_type_reference(n),
        }
    }
}

/// Callbacks for [`walk`]. Every method defaults to doing nothing.
pub trait Visitor {
    fn visit_document(&mut self, _document: &Document) {}
    fn visit_directive(&mut self, _directive: &Directive) {}
    fn visit_control(&mut self, _control: &Control) {}
    fn visit_clause(&mut self, _clause: &Clause) {}
    fn visit_block(&mut self, _block: &Block) {}
    fn visit_code_block(&mut self, _code_block: &CodeBlock) {}
    fn visit_explicit_expression(&mut self, _expression: &ExplicitExpression) {}
    fn visit_implicit_expression(&mut self, _expression: &ImplicitExpression) {}
    fn visit_delegate(&mut self, _delegate: &Delegate) {}
    fn visit_element(&mut self, _element: &Element) {}
    fn visit_start_tag(&mut self, _tag: &StartTag) {}
    fn visit_end_tag(&mut self, _tag: &EndTag) {}
    fn visit_attribute(&mut self, _attribute: &Attribute) {}
    fn visit_directive_attribute(&mut self, _attribute: &DirectiveAttribute) {}
    fn visit_comment(&mut self, _comment: &Comment) {}
    fn visit_doctype(&mut self, _doctype: &Doctype) {}
    fn visit_type_reference(&mut self, _type_reference: &TypeReference) {}
    /// A markup `TEXT` token.
    fn visit_text(&mut self, _text: &SyntaxToken) {}
}

/// Visit `root` and everything under it in preorder.
pub fn walk<V: Visitor + ?Sized>(root: &SyntaxNode, visitor: &mut V) {
    for event in root.preorder_with_tokens() {
        match event {
            WalkEvent::Enter(NodeOrToken::Node(node)) => {
                if let Some(typed) = RazorNode::cast(node) {
                    typed.accept(visitor);
                }
            }
            WalkEvent::Enter(NodeOrToken::Token(token)) if token.kind() == SyntaxKind::TEXT => {
                visitor.visit_text(&token);
            }
            _ => {}
        }
    }
}
