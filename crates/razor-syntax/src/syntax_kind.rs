//! SyntaxKind enum for all tokens and nodes in the Razor CST.
//!
//! Following the rust-analyzer model, all tokens and nodes share a single enum.
//! Every byte in the source must appear as a token in the tree.

/// All syntax kinds for the Razor CST.
///
/// This enum represents both tokens (scanner output) and composite nodes
/// (parser output). The `repr(u16)` ensures efficient storage in rowan's
/// green tree.
///
/// We use SCREAMING_CASE following the rust-analyzer convention for SyntaxKind.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // === Tokens (scanner output) ===
    /// Whitespace between code-layer tokens (spaces, tabs, line endings)
    WHITESPACE,
    /// Markup text
    TEXT,
    /// `@@`, a literal `@`
    ESCAPED_AT,
    /// `@` opening a code block, explicit expression or delegate
    AT,
    /// `@` opening an implicit expression
    IMPLICIT_EXPR_START,
    /// `{` opening an opaque code region
    CODE_BLOCK_START,
    /// Opaque code text inside a brace-delimited region
    RAW_TEXT,
    /// `@model`, `@page`, ... (includes the `@`)
    DIRECTIVE_KEYWORD,
    /// `@if`, `@foreach`, ... (includes the `@`)
    CONTROL_KEYWORD,
    /// Continuation keyword without `@`: `else`, `catch`, `case`, ...
    KEYWORD,
    /// Identifier
    IDENT,
    /// Dotted name such as `System.Collections.Generic`
    QUALIFIED_NAME,
    /// `"..."` or `'...'`
    STRING_LITERAL,
    /// `true` / `false`
    BOOLEAN_LITERAL,
    /// Member access path of an implicit expression
    MEMBER_ACCESS,
    /// Opaque code text inside parentheses, brackets or a case label
    CODE_EXPRESSION,
    /// Opaque delegate parameter list
    PARAMETER_LIST,
    /// `(`
    L_PAREN,
    /// `)`
    R_PAREN,
    /// `{`
    L_BRACE,
    /// `}`
    R_BRACE,
    /// `[`
    L_BRACKET,
    /// `]`
    R_BRACKET,
    /// `<`
    L_ANGLE,
    /// `>`
    R_ANGLE,
    /// `</`
    LT_SLASH,
    /// `/>`
    SLASH_R_ANGLE,
    /// `,`
    COMMA,
    /// `.`
    DOT,
    /// `?`
    QUESTION,
    /// `*`
    STAR,
    /// `=`
    EQ,
    /// `;`
    SEMICOLON,
    /// `:`
    COLON,
    /// `=>`
    FAT_ARROW,
    /// Element name in a start or end tag
    TAG_NAME,
    /// Attribute name
    ATTRIBUTE_NAME,
    /// `"` or `'` around an attribute value
    QUOTE,
    /// Literal text inside a quoted attribute value
    ATTRIBUTE_CONTENT,
    /// Unquoted attribute value
    UNQUOTED_ATTRIBUTE_VALUE,
    /// `<!--`
    HTML_COMMENT_OPEN,
    /// Text inside an HTML comment
    HTML_COMMENT_CONTENT,
    /// `-->`
    HTML_COMMENT_CLOSE,
    /// `@*`
    RAZOR_COMMENT_OPEN,
    /// Text inside a Razor comment
    COMMENT_CONTENT,
    /// `*@`
    RAZOR_COMMENT_CLOSE,
    /// `<!`
    DOCTYPE_OPEN,
    /// Text between `<!` and `>`
    DOCTYPE_CONTENT,
    /// A character no lexeme accepts in the current context
    UNKNOWN,
    /// End of file marker
    EOF,

    // === Composite Nodes (parser output) ===
    /// Root document node
    DOCUMENT,
    /// `@page "/route"`
    DIRECTIVE_PAGE,
    /// `@model Type`
    DIRECTIVE_MODEL,
    /// `@inject Type Name`
    DIRECTIVE_INJECT,
    /// `@using Namespace`
    DIRECTIVE_USING,
    /// `@namespace Namespace`
    DIRECTIVE_NAMESPACE,
    /// `@inherits Type`
    DIRECTIVE_INHERITS,
    /// `@implements Type`
    DIRECTIVE_IMPLEMENTS,
    /// `@attribute [...]`
    DIRECTIVE_ATTRIBUTE,
    /// `@layout Name`
    DIRECTIVE_LAYOUT,
    /// `@section Name { ... }`
    DIRECTIVE_SECTION,
    /// `@functions { ... }`
    DIRECTIVE_FUNCTIONS,
    /// `@code { ... }`
    DIRECTIVE_CODE,
    /// `@addTagHelper "..."`
    DIRECTIVE_ADD_TAG_HELPER,
    /// `@removeTagHelper "..."`
    DIRECTIVE_REMOVE_TAG_HELPER,
    /// `@tagHelperPrefix "..."`
    DIRECTIVE_TAG_HELPER_PREFIX,
    /// `@rendermode Name`
    DIRECTIVE_RENDERMODE,
    /// `@preservewhitespace true|false`
    DIRECTIVE_PRESERVEWHITESPACE,
    /// `@typeparam Name`
    DIRECTIVE_TYPEPARAM,
    /// Type reference in a directive (`List<Item>[]?`)
    TYPE_REFERENCE,
    /// `<A, B>` inside a type reference
    TYPE_ARGUMENTS,
    /// Namespace name, optionally aliased
    NAMESPACE_REFERENCE,
    /// `@{ ... }`
    CODE_BLOCK,
    /// `@( ... )`
    EXPLICIT_EXPRESSION,
    /// `@Member.Path`
    IMPLICIT_EXPRESSION,
    /// `@(args) => ...`
    RAZOR_DELEGATE,
    /// Brace-delimited markup body
    BLOCK,
    /// `@if (...) { ... }`
    RAZOR_IF,
    /// `else { ... }` / `else if ...`
    RAZOR_ELSE,
    /// `@foreach (...) { ... }`
    RAZOR_FOREACH,
    /// `@for (...) { ... }`
    RAZOR_FOR,
    /// `@while (...) { ... }`
    RAZOR_WHILE,
    /// `@do { ... } while (...)`
    RAZOR_DO,
    /// `@switch (...) { ... }`
    RAZOR_SWITCH,
    /// `case label:` / `default:` arm
    RAZOR_CASE,
    /// `@try { ... }`
    RAZOR_TRY,
    /// `catch (...) { ... }`
    RAZOR_CATCH,
    /// `finally { ... }`
    RAZOR_FINALLY,
    /// `@using (...) { ... }`
    RAZOR_USING,
    /// `@lock (...) { ... }`
    RAZOR_LOCK,
    /// Element with start tag, children and end tag
    HTML_ELEMENT,
    /// `<name ... />`
    HTML_SELF_CLOSING_ELEMENT,
    /// `<name ...>`
    HTML_START_TAG,
    /// `</name>`
    HTML_END_TAG,
    /// `name` or `name=value`
    HTML_ATTRIBUTE,
    /// `@name` or `@name=value` inside a start tag
    RAZOR_DIRECTIVE_ATTRIBUTE,
    /// Quoted attribute value
    QUOTED_ATTRIBUTE_VALUE,
    /// `<!-- ... -->`
    HTML_COMMENT,
    /// `@* ... *@`
    RAZOR_COMMENT,
    /// `<!DOCTYPE ...>`
    HTML_DOCTYPE,
}

impl SyntaxKind {
    /// Returns true if this kind represents a token (scanner output).
    pub fn is_token(self) -> bool {
        (self as u16) <= (Self::EOF as u16)
    }

    /// Returns true if this kind represents a composite node.
    pub fn is_node(self) -> bool {
        !self.is_token()
    }

    /// Returns true if this kind is trivia.
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE)
    }

    /// Returns true for the `DIRECTIVE_*` node kinds.
    pub fn is_directive(self) -> bool {
        (Self::DIRECTIVE_PAGE as u16..=Self::DIRECTIVE_TYPEPARAM as u16).contains(&(self as u16))
    }

    /// Returns true for control constructs that open with an `@` keyword.
    pub fn is_control(self) -> bool {
        matches!(
            self,
            Self::RAZOR_IF
                | Self::RAZOR_FOREACH
                | Self::RAZOR_FOR
                | Self::RAZOR_WHILE
                | Self::RAZOR_DO
                | Self::RAZOR_SWITCH
                | Self::RAZOR_TRY
                | Self::RAZOR_USING
                | Self::RAZOR_LOCK
        )
    }

    /// Returns true for tokens whose text is delegated to the code language.
    pub fn is_opaque(self) -> bool {
        matches!(
            self,
            Self::RAW_TEXT | Self::CODE_EXPRESSION | Self::MEMBER_ACCESS | Self::PARAMETER_LIST
        )
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language definition for rowan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RazorLang {}

impl rowan::Language for RazorLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 <= SyntaxKind::HTML_DOCTYPE as u16);
        // SAFETY: We check bounds above and SyntaxKind is repr(u16)
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type alias for our syntax nodes.
pub type SyntaxNode = rowan::SyntaxNode<RazorLang>;
/// Type alias for our syntax tokens.
pub type SyntaxToken = rowan::SyntaxToken<RazorLang>;
/// Type alias for syntax elements (node or token).
pub type SyntaxElement = rowan::SyntaxElement<RazorLang>;
