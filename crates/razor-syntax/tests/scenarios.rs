//! End-to-end scenarios over realistic templates: parse, inspect through the
//! typed layer, walk with a visitor and hand code to a delegate.

use pretty_assertions::assert_eq;
use razor_syntax::ast::{
    AstNode, Control, Directive, Element, ImplicitExpression, RazorNode, Visitor, walk,
};
use razor_syntax::delegation::{self, CodeLanguage, OpaqueSpan, Role};
use razor_syntax::{
    Construct, ControlKind, DirectiveKind, Keyword, KeywordTable, ParseError, ParseOptions,
    SyntaxKind, parse, parse_with,
};

const COMPONENT: &str = r#"@page "/orders"
@using Shop.Models
@inject IOrderService Orders

<h3 class="title">Orders for @User.Name</h3>

@if (orders is null)
{
    <p><em>Loading...</em></p>
}
else
{
    <table>
        @foreach (var order in orders)
        {
            <tr @key="order.Id">
                <td>@order.Number</td>
                <td>@(order.Total.ToString("C"))</td>
            </tr>
        }
    </table>
}

@code {
    private Order[]? orders;

    protected override async Task OnInitializedAsync()
    {
        orders = await Orders.LoadAsync("}");
    }
}
"#;

/// Collects what a simple highlighter would need.
#[derive(Default)]
struct Outline {
    directives: Vec<DirectiveKind>,
    controls: Vec<ControlKind>,
    elements: Vec<String>,
    expressions: Vec<String>,
}

impl Visitor for Outline {
    fn visit_directive(&mut self, directive: &Directive) {
        self.directives.push(directive.kind());
    }

    fn visit_control(&mut self, control: &Control) {
        self.controls.push(control.kind());
    }

    fn visit_element(&mut self, element: &Element) {
        if let Some(name) = element.name() {
            self.elements.push(name.text().to_string());
        }
    }

    fn visit_implicit_expression(&mut self, expression: &ImplicitExpression) {
        if let Some(path) = expression.path() {
            self.expressions.push(path.text().to_string());
        }
    }
}

#[test]
fn component_parses_losslessly() {
    let tree = parse(COMPONENT).unwrap();
    assert_eq!(tree.kind(), SyntaxKind::DOCUMENT);
    assert_eq!(tree.text().to_string(), COMPONENT);
}

#[test]
fn component_directives() {
    let parse = parse_with(COMPONENT, &ParseOptions::default()).unwrap();
    let directives: Vec<_> = parse.document().directives().collect();
    let kinds: Vec<_> = directives.iter().map(Directive::kind).collect();
    assert_eq!(
        kinds,
        vec![
            DirectiveKind::Page,
            DirectiveKind::Using,
            DirectiveKind::Inject,
            DirectiveKind::Code,
        ]
    );
    assert_eq!(directives[0].string_value().as_deref(), Some("/orders"));
    assert_eq!(
        directives[1].namespace(),
        Some(("Shop.Models".to_string(), None))
    );
    assert_eq!(directives[2].name().unwrap().text(), "Orders");
    assert!(directives[3].code().unwrap().text().ends_with("LoadAsync(\"}\");\n    }"));
}

#[test]
fn visitor_outline() {
    let tree = parse(COMPONENT).unwrap();
    let mut outline = Outline::default();
    walk(&tree, &mut outline);

    assert_eq!(outline.controls, vec![ControlKind::If, ControlKind::Foreach]);
    assert_eq!(
        outline.elements,
        vec!["h3", "p", "em", "table", "tr", "td", "td"]
    );
    assert_eq!(outline.expressions, vec!["User.Name", "order.Number"]);
    assert_eq!(outline.directives.len(), 4);
}

#[test]
fn if_else_structure() {
    let parse = parse_with(COMPONENT, &ParseOptions::default()).unwrap();
    let control = parse
        .document()
        .nodes()
        .find_map(|node| match node {
            RazorNode::Control(control) => Some(control),
            _ => None,
        })
        .unwrap();
    assert_eq!(control.header().unwrap().text(), "orders is null");
    let clauses: Vec<_> = control.clauses().collect();
    assert_eq!(clauses.len(), 1);
    assert!(!clauses[0].is_else_if());
    assert_eq!(clauses[0].keyword().unwrap().text(), "else");
}

/// Records each span it receives, as a C# front end would.
#[derive(Default)]
struct Recorder(Vec<(Role, String)>);

impl CodeLanguage for Recorder {
    type Error = std::convert::Infallible;

    fn accept(&mut self, span: &OpaqueSpan, text: &str) -> Result<(), Self::Error> {
        self.0.push((span.role, text.to_string()));
        Ok(())
    }
}

#[test]
fn component_code_is_delegated_with_roles() {
    let tree = parse(COMPONENT).unwrap();
    let mut recorder = Recorder::default();
    delegation::delegate(&tree, &mut recorder).unwrap();

    let roles: Vec<_> = recorder.0.iter().map(|(role, _)| *role).collect();
    assert_eq!(
        roles,
        vec![
            Role::MemberAccessPath,
            Role::BooleanExpression,
            Role::ForeachDeclaration,
            Role::DirectiveAttributeValue,
            Role::MemberAccessPath,
            Role::Expression,
            Role::StatementBlock,
        ]
    );
    assert_eq!(recorder.0[2].1, "var order in orders");
    assert_eq!(recorder.0[3].1, "order.Id");
    assert_eq!(recorder.0[5].1, "order.Total.ToString(\"C\")");

    for (role, text) in &recorder.0 {
        assert!(delegation::is_balanced(*role, text), "{role} {text:?}");
    }
}

#[test]
fn spans_slice_back_to_source() {
    let tree = parse(COMPONENT).unwrap();
    let mut recorder = Recorder::default();
    delegation::delegate(&tree, &mut recorder).unwrap();

    let spans = delegation::opaque_spans(&tree);
    assert_eq!(spans.len(), recorder.0.len());
    for (span, (_, text)) in spans.iter().zip(&recorder.0) {
        assert_eq!(span.slice(COMPONENT), Some(text.as_str()));
    }
}

#[test]
fn custom_dialect() {
    let mut keywords = KeywordTable::default();
    keywords.insert("helper", Keyword::Directive(DirectiveKind::Functions));
    keywords.remove("section");
    let options = ParseOptions::default().with_reserved_keywords(keywords);

    let source = "@helper { void Greet() { } }\n<p>@section</p>";
    let parse = parse_with(source, &options).unwrap();
    let nodes: Vec<_> = parse
        .syntax()
        .descendants()
        .map(|node| node.kind())
        .filter(|kind| *kind != SyntaxKind::HTML_START_TAG && *kind != SyntaxKind::HTML_END_TAG)
        .collect();
    assert_eq!(
        nodes,
        vec![
            SyntaxKind::DOCUMENT,
            SyntaxKind::DIRECTIVE_FUNCTIONS,
            SyntaxKind::HTML_ELEMENT,
            SyntaxKind::IMPLICIT_EXPRESSION,
        ]
    );
}

#[test]
fn half_written_component_in_lenient_mode() {
    let source = "<ul>\n@foreach (var x in xs) {\n  <li>@x";
    assert!(matches!(
        parse(source),
        Err(ParseError::UnterminatedConstruct {
            construct: Construct::Element,
            start: 32,
            ..
        })
    ));

    let options = ParseOptions::default().with_strict_unterminated(false);
    let parse = parse_with(source, &options).unwrap();
    assert_eq!(parse.syntax().text().to_string(), source);
    assert_eq!(parse.truncated().len(), 3);

    let foreach = parse
        .syntax()
        .descendants()
        .find(|node| node.kind() == SyntaxKind::RAZOR_FOREACH)
        .and_then(Control::cast)
        .unwrap();
    assert_eq!(foreach.header().unwrap().text(), "var x in xs");
}
