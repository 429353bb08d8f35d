//! The reserved-word table.
//!
//! After an `@`, the scanner reads one identifier and looks it up here. A
//! reserved word opens a directive or a control construct; any other
//! identifier opens an implicit expression. The table is plain data so that
//! dialects (Razor pages, Blazor components, custom directive sets) are a
//! configuration change rather than a code change.
//!
//! ```
//! use razor_syntax::keywords::{ControlKind, Keyword, KeywordTable};
//!
//! let mut table = KeywordTable::default();
//! assert!(table.is_reserved("foreach"));
//! assert!(!table.is_reserved("Model"));
//!
//! table.insert("unless", Keyword::Control(ControlKind::If));
//! assert!(table.is_reserved("unless"));
//! ```

use std::collections::BTreeMap;

use crate::syntax_kind::SyntaxKind;

/// Directives known to the grammar.
///
/// Each directive has a fixed operand shape; the table decides which word
/// spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DirectiveKind {
    Page,
    Model,
    Inject,
    Using,
    Namespace,
    Inherits,
    Implements,
    Attribute,
    Layout,
    Section,
    Functions,
    Code,
    AddTagHelper,
    RemoveTagHelper,
    TagHelperPrefix,
    Rendermode,
    PreserveWhitespace,
    Typeparam,
}

/// What follows a directive keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveShape {
    /// An optional string literal (`@page "/route"`)
    OptionalString,
    /// A required string literal
    String,
    /// A type reference (`@model List<Item>`)
    TypeReference,
    /// A type reference then a member name (`@inject ILogger<T> Logger`)
    TypeAndMember,
    /// A namespace, optionally aliased (`@using Json = System.Text.Json`)
    Namespace,
    /// A bracketed attribute list (`@attribute [Authorize]`)
    AttributeList,
    /// A single identifier
    Identifier,
    /// An identifier then a markup block
    Section,
    /// An opaque code block
    CodeBlock,
    /// `true` or `false`
    Boolean,
}

impl DirectiveKind {
    pub const ALL: [DirectiveKind; 18] = [
        DirectiveKind::Page,
        DirectiveKind::Model,
        DirectiveKind::Inject,
        DirectiveKind::Using,
        DirectiveKind::Namespace,
        DirectiveKind::Inherits,
        DirectiveKind::Implements,
        DirectiveKind::Attribute,
        DirectiveKind::Layout,
        DirectiveKind::Section,
        DirectiveKind::Functions,
        DirectiveKind::Code,
        DirectiveKind::AddTagHelper,
        DirectiveKind::RemoveTagHelper,
        DirectiveKind::TagHelperPrefix,
        DirectiveKind::Rendermode,
        DirectiveKind::PreserveWhitespace,
        DirectiveKind::Typeparam,
    ];

    /// The standard Razor spelling.
    pub fn name(self) -> &'static str {
        match self {
            DirectiveKind::Page => "page",
            DirectiveKind::Model => "model",
            DirectiveKind::Inject => "inject",
            DirectiveKind::Using => "using",
            DirectiveKind::Namespace => "namespace",
            DirectiveKind::Inherits => "inherits",
            DirectiveKind::Implements => "implements",
            DirectiveKind::Attribute => "attribute",
            DirectiveKind::Layout => "layout",
            DirectiveKind::Section => "section",
            DirectiveKind::Functions => "functions",
            DirectiveKind::Code => "code",
            DirectiveKind::AddTagHelper => "addTagHelper",
            DirectiveKind::RemoveTagHelper => "removeTagHelper",
            DirectiveKind::TagHelperPrefix => "tagHelperPrefix",
            DirectiveKind::Rendermode => "rendermode",
            DirectiveKind::PreserveWhitespace => "preservewhitespace",
            DirectiveKind::Typeparam => "typeparam",
        }
    }

    /// Look up a directive by its standard spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// The node kind the parser builds for this directive.
    pub fn syntax_kind(self) -> SyntaxKind {
        match self {
            DirectiveKind::Page => SyntaxKind::DIRECTIVE_PAGE,
            DirectiveKind::Model => SyntaxKind::DIRECTIVE_MODEL,
            DirectiveKind::Inject => SyntaxKind::DIRECTIVE_INJECT,
            DirectiveKind::Using => SyntaxKind::DIRECTIVE_USING,
            DirectiveKind::Namespace => SyntaxKind::DIRECTIVE_NAMESPACE,
            DirectiveKind::Inherits => SyntaxKind::DIRECTIVE_INHERITS,
            DirectiveKind::Implements => SyntaxKind::DIRECTIVE_IMPLEMENTS,
            DirectiveKind::Attribute => SyntaxKind::DIRECTIVE_ATTRIBUTE,
            DirectiveKind::Layout => SyntaxKind::DIRECTIVE_LAYOUT,
            DirectiveKind::Section => SyntaxKind::DIRECTIVE_SECTION,
            DirectiveKind::Functions => SyntaxKind::DIRECTIVE_FUNCTIONS,
            DirectiveKind::Code => SyntaxKind::DIRECTIVE_CODE,
            DirectiveKind::AddTagHelper => SyntaxKind::DIRECTIVE_ADD_TAG_HELPER,
            DirectiveKind::RemoveTagHelper => SyntaxKind::DIRECTIVE_REMOVE_TAG_HELPER,
            DirectiveKind::TagHelperPrefix => SyntaxKind::DIRECTIVE_TAG_HELPER_PREFIX,
            DirectiveKind::Rendermode => SyntaxKind::DIRECTIVE_RENDERMODE,
            DirectiveKind::PreserveWhitespace => SyntaxKind::DIRECTIVE_PRESERVEWHITESPACE,
            DirectiveKind::Typeparam => SyntaxKind::DIRECTIVE_TYPEPARAM,
        }
    }

    /// Inverse of [`DirectiveKind::syntax_kind`].
    pub fn from_syntax_kind(kind: SyntaxKind) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.syntax_kind() == kind)
    }

    /// The operand shape.
    pub fn shape(self) -> DirectiveShape {
        match self {
            DirectiveKind::Page => DirectiveShape::OptionalString,
            DirectiveKind::Model | DirectiveKind::Inherits | DirectiveKind::Implements => {
                DirectiveShape::TypeReference
            }
            DirectiveKind::Inject => DirectiveShape::TypeAndMember,
            DirectiveKind::Using | DirectiveKind::Namespace => DirectiveShape::Namespace,
            DirectiveKind::Attribute => DirectiveShape::AttributeList,
            DirectiveKind::Layout | DirectiveKind::Rendermode | DirectiveKind::Typeparam => {
                DirectiveShape::Identifier
            }
            DirectiveKind::Section => DirectiveShape::Section,
            DirectiveKind::Functions | DirectiveKind::Code => DirectiveShape::CodeBlock,
            DirectiveKind::AddTagHelper
            | DirectiveKind::RemoveTagHelper
            | DirectiveKind::TagHelperPrefix => DirectiveShape::String,
            DirectiveKind::PreserveWhitespace => DirectiveShape::Boolean,
        }
    }
}

/// Control-flow constructs known to the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ControlKind {
    If,
    Foreach,
    For,
    While,
    Do,
    Switch,
    Try,
    Using,
    Lock,
}

impl ControlKind {
    pub const ALL: [ControlKind; 9] = [
        ControlKind::If,
        ControlKind::Foreach,
        ControlKind::For,
        ControlKind::While,
        ControlKind::Do,
        ControlKind::Switch,
        ControlKind::Try,
        ControlKind::Using,
        ControlKind::Lock,
    ];

    /// The standard C# spelling.
    pub fn name(self) -> &'static str {
        match self {
            ControlKind::If => "if",
            ControlKind::Foreach => "foreach",
            ControlKind::For => "for",
            ControlKind::While => "while",
            ControlKind::Do => "do",
            ControlKind::Switch => "switch",
            ControlKind::Try => "try",
            ControlKind::Using => "using",
            ControlKind::Lock => "lock",
        }
    }

    /// Look up a construct by its standard spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// The node kind the parser builds for this construct.
    pub fn syntax_kind(self) -> SyntaxKind {
        match self {
            ControlKind::If => SyntaxKind::RAZOR_IF,
            ControlKind::Foreach => SyntaxKind::RAZOR_FOREACH,
            ControlKind::For => SyntaxKind::RAZOR_FOR,
            ControlKind::While => SyntaxKind::RAZOR_WHILE,
            ControlKind::Do => SyntaxKind::RAZOR_DO,
            ControlKind::Switch => SyntaxKind::RAZOR_SWITCH,
            ControlKind::Try => SyntaxKind::RAZOR_TRY,
            ControlKind::Using => SyntaxKind::RAZOR_USING,
            ControlKind::Lock => SyntaxKind::RAZOR_LOCK,
        }
    }

    /// Inverse of [`ControlKind::syntax_kind`].
    pub fn from_syntax_kind(kind: SyntaxKind) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.syntax_kind() == kind)
    }
}

/// What a reserved word introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Directive(DirectiveKind),
    Control(ControlKind),
    /// Directive or statement depending on whether `(` follows (`using`).
    DirectiveOrStatement(DirectiveKind, ControlKind),
    /// Only valid inside another construct (`else`, `case`, `catch`, `finally`).
    Continuation,
}

/// The coarse class of a [`Keyword`], used by lookahead predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordClass {
    Directive,
    Control,
    DirectiveOrStatement,
    Continuation,
}

impl Keyword {
    pub fn class(self) -> KeywordClass {
        match self {
            Keyword::Directive(_) => KeywordClass::Directive,
            Keyword::Control(_) => KeywordClass::Control,
            Keyword::DirectiveOrStatement(..) => KeywordClass::DirectiveOrStatement,
            Keyword::Continuation => KeywordClass::Continuation,
        }
    }
}

/// Words reserved only because they continue another construct.
pub const CONTINUATION_KEYWORDS: [&str; 4] = ["else", "case", "catch", "finally"];

/// Word → keyword mapping consulted after every `@`.
///
/// Lookups are exact and case-sensitive. Iteration is in word order so that
/// anything derived from the table is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTable {
    entries: BTreeMap<String, Keyword>,
}

impl KeywordTable {
    /// A table with no reserved words: every `@identifier` is an expression.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn get(&self, word: &str) -> Option<Keyword> {
        self.entries.get(word).copied()
    }

    pub fn is_reserved(&self, word: &str) -> bool {
        self.entries.contains_key(word)
    }

    /// Reserve `word`, returning the previous entry.
    pub fn insert(&mut self, word: impl Into<String>, keyword: Keyword) -> Option<Keyword> {
        self.entries.insert(word.into(), keyword)
    }

    /// Release `word`, returning the previous entry.
    pub fn remove(&mut self, word: &str) -> Option<Keyword> {
        self.entries.remove(word)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Keyword)> {
        self.entries.iter().map(|(word, keyword)| (word.as_str(), *keyword))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for KeywordTable {
    /// The standard Razor table: every directive, every control keyword and
    /// the continuation words.
    fn default() -> Self {
        let mut table = Self::empty();
        for directive in DirectiveKind::ALL {
            table.insert(directive.name(), Keyword::Directive(directive));
        }
        for control in ControlKind::ALL {
            table.insert(control.name(), Keyword::Control(control));
        }
        table.insert(
            "using",
            Keyword::DirectiveOrStatement(DirectiveKind::Using, ControlKind::Using),
        );
        for word in CONTINUATION_KEYWORDS {
            table.insert(word, Keyword::Continuation);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn default_table_size() {
        // 18 directives + 9 controls - shared `using` + 4 continuations
        assert_eq!(KeywordTable::default().len(), 30);
    }

    #[rstest]
    #[case("page", Keyword::Directive(DirectiveKind::Page))]
    #[case("addTagHelper", Keyword::Directive(DirectiveKind::AddTagHelper))]
    #[case("foreach", Keyword::Control(ControlKind::Foreach))]
    #[case(
        "using",
        Keyword::DirectiveOrStatement(DirectiveKind::Using, ControlKind::Using)
    )]
    #[case("else", Keyword::Continuation)]
    fn default_entries(#[case] word: &str, #[case] expected: Keyword) {
        assert_eq!(KeywordTable::default().get(word), Some(expected));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let table = KeywordTable::default();
        assert!(table.is_reserved("if"));
        assert!(!table.is_reserved("If"));
        assert!(!table.is_reserved("addtaghelper"));
    }

    #[test]
    fn names_roundtrip() {
        for directive in DirectiveKind::ALL {
            assert_eq!(DirectiveKind::from_name(directive.name()), Some(directive));
            assert_eq!(
                DirectiveKind::from_syntax_kind(directive.syntax_kind()),
                Some(directive)
            );
        }
        for control in ControlKind::ALL {
            assert_eq!(ControlKind::from_name(control.name()), Some(control));
            assert_eq!(
                ControlKind::from_syntax_kind(control.syntax_kind()),
                Some(control)
            );
        }
    }

    #[test]
    fn dialect_edits() {
        let mut table = KeywordTable::default();
        assert_eq!(
            table.remove("layout"),
            Some(Keyword::Directive(DirectiveKind::Layout))
        );
        assert!(!table.is_reserved("layout"));
        table.insert("helper", Keyword::Directive(DirectiveKind::Functions));
        assert_eq!(
            table.get("helper"),
            Some(Keyword::Directive(DirectiveKind::Functions))
        );
    }

    #[test]
    fn iteration_is_sorted() {
        let table = KeywordTable::default();
        let words: Vec<_> = table.iter().map(|(word, _)| word).collect();
        let mut sorted = words.clone();
        sorted.sort_unstable();
        assert_eq!(words, sorted);
    }

    #[test]
    fn classes() {
        assert_eq!(Keyword::Continuation.class(), KeywordClass::Continuation);
        assert_eq!(
            Keyword::Control(ControlKind::Do).class(),
            KeywordClass::Control
        );
    }
}
