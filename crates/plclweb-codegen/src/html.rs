//! HTML code generator.
//!
//! Walks the document tree and generates HTML output. Items of an element
//! list are classified once into text nodes, binding loops, template calls
//! and plain elements; template calls and loops carry a variable scope down
//! to the bindings inside them.

use std::borrow::Cow;

use plclweb_tree::{eq_ignore_case, Attribute, Document, Element, List, Value};

use crate::catalog::{self, TemplateCatalog};
use crate::scope::{Scope, VariableValue};
use crate::{newline, template, to_output_name, value_to_string, Diagnostics, RenderOptions};

pub(crate) const TEXT_ELEMENT: &str = "_Text";
pub(crate) const BINDING_LOOP: &str = "_BindingLoop";
pub(crate) const BINDINGS_LIST: &str = "_Bindings";
pub(crate) const ELEMENTS_LIST: &str = "Elements";

/// Emitted where an element variable would be interpolated.
pub const ELEMENT_PLACEHOLDER: &str = "[element variables are not supported]";

/// HTML elements that never get a closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link",
    "meta", "param", "source", "track", "wbr",
];

/// Check if an element type is a void element, ignoring case.
pub fn is_void_element(kind: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| eq_ignore_case(v, kind))
}

/// State shared by one HTML render.
pub(crate) struct HtmlContext<'t, 'd> {
    pub name: &'t str,
    pub catalog: TemplateCatalog<'t>,
    pub options: RenderOptions,
    pub diagnostics: &'d mut Diagnostics,
    /// Lowercased names of the templates currently being expanded.
    pub expanding: Vec<String>,
}

impl HtmlContext<'_, '_> {
    pub fn report(&mut self, message: impl Into<String>) {
        self.diagnostics.report(self.name, message);
    }
}

/// What a list item renders as.
enum ItemKind<'t> {
    Text,
    BindingLoop,
    TemplateCall(&'t Element),
    Plain,
}

fn classify<'t>(element: &Element, catalog: &TemplateCatalog<'t>) -> ItemKind<'t> {
    if element.is(TEXT_ELEMENT) {
        ItemKind::Text
    } else if element.is(BINDING_LOOP) {
        ItemKind::BindingLoop
    } else if let Some(template) = catalog.get(&element.kind) {
        ItemKind::TemplateCall(template)
    } else {
        ItemKind::Plain
    }
}

/// Generate HTML from a document tree.
pub fn render(doc: &Document, options: &RenderOptions, diagnostics: &mut Diagnostics) -> String {
    let catalog = catalog::build(&doc.lists, &doc.name, diagnostics);

    if doc.elements.is_empty() {
        diagnostics.report(
            &doc.name,
            "No elements found in the root of a PLCL HTML document",
        );
        return String::new();
    }
    if doc.elements.len() > 2 {
        diagnostics.report(
            &doc.name,
            "A PLCL HTML document should contain only 1 or 2 elements in its root",
        );
    }

    let mut ctx = HtmlContext {
        name: &doc.name,
        catalog,
        options: *options,
        diagnostics,
        expanding: Vec::new(),
    };

    let mut html = String::new();
    for element in &doc.elements {
        if element.is("Doctype") {
            generate_doctype(element, &mut ctx, &mut html);
        } else if element.is("Html") {
            generate_root(element, &mut ctx, &mut html);
        } else {
            ctx.report(format!("Unexpected element: {}", element.kind));
        }
    }
    html
}

fn generate_doctype(element: &Element, ctx: &mut HtmlContext<'_, '_>, out: &mut String) {
    if element.attributes.len() > 1 {
        ctx.report("Doctype elements shouldn't have more than 1 attribute");
    }
    match element.attribute_value("Content") {
        Some(Value::String(content)) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(content);
            out.push('>');
            if !ctx.options.minify {
                out.push('\n');
            }
        }
        Some(_) => ctx.report("Doctype elements should have a string value"),
        None => ctx.report("Doctype elements should have the \"Content\" attribute"),
    }
}

fn generate_root<'t>(element: &'t Element, ctx: &mut HtmlContext<'t, '_>, out: &mut String) {
    out.push_str("<html");
    out.push_str(&render_attributes(&element.attributes));
    out.push('>');

    if element.lists.is_empty() {
        ctx.report("The HTML element should contain the \"Elements\" list");
    }
    if element.lists.len() > 1 {
        ctx.report("The HTML element should contain only 1 list");
    }

    for list in &element.lists {
        if list.is(ELEMENTS_LIST) {
            let depth = ctx.options.indent;
            generate_list(list, None, ctx, out, depth);
            if !ctx.options.minify {
                out.push('\n');
            }
        } else {
            ctx.report(format!("Unexpected list: {}", list.kind));
        }
    }

    out.push_str("</html>");
}

/// Render every item of `list` at `depth` spaces of indentation.
///
/// `scope` is `None` outside of template bodies.
pub(crate) fn generate_list<'t>(
    list: &'t List,
    scope: Option<&Scope<'t>>,
    ctx: &mut HtmlContext<'t, '_>,
    out: &mut String,
    depth: usize,
) {
    for item in &list.items {
        let Some(element) = &item.element else {
            ctx.report(format!("List item {} has no element", item.id));
            continue;
        };
        match classify(element, &ctx.catalog) {
            ItemKind::Text => generate_text(element, scope, ctx, out, depth),
            ItemKind::BindingLoop => generate_loop(element, scope, ctx, out, depth),
            ItemKind::TemplateCall(definition) => {
                template::expand(element, definition, ctx, out, depth)
            }
            ItemKind::Plain => generate_element(element, scope, ctx, out, depth),
        }
    }
}

fn generate_text<'t>(
    element: &'t Element,
    scope: Option<&Scope<'t>>,
    ctx: &mut HtmlContext<'t, '_>,
    out: &mut String,
    depth: usize,
) {
    newline(out, depth, &ctx.options);

    let has_bindings = element.lists_named(BINDINGS_LIST).next().is_some();
    if element.attributes.is_empty() && !has_bindings {
        ctx.report("_Text elements should have the \"Content\" attribute");
    }
    if element.attributes.len() > 1 {
        ctx.report("_Text elements shouldn't have more than 1 attribute");
    }
    if let Some(content) = element.attribute_value("Content") {
        out.push_str(&value_to_string(content));
    }

    for list in &element.lists {
        if !list.is(BINDINGS_LIST) {
            ctx.report(format!("Unexpected list in _Text: {}", list.kind));
            continue;
        }
        for binding in read_bindings(list, ctx) {
            if !eq_ignore_case(&binding.target, "Content") {
                ctx.report(format!(
                    "_Text elements can only bind \"Content\", got {}",
                    binding.target
                ));
                continue;
            }
            match resolve(&binding, scope, ctx) {
                Some(VariableValue::Literal(text)) => out.push_str(text),
                Some(VariableValue::ElementRef(_)) => {
                    ctx.report(format!(
                        "_Text can only show literal variables, {} is an element",
                        binding.source
                    ));
                    out.push_str(ELEMENT_PLACEHOLDER);
                }
                Some(other) => ctx.report(format!(
                    "_Text can only show literal variables, {} is {}",
                    binding.source,
                    other.kind_name()
                )),
                None => {}
            }
        }
    }
}

fn generate_loop<'t>(
    element: &'t Element,
    scope: Option<&Scope<'t>>,
    ctx: &mut HtmlContext<'t, '_>,
    out: &mut String,
    depth: usize,
) {
    let Some(scope) = scope else {
        ctx.report("_BindingLoop can only be used inside a template");
        return;
    };
    let Some(source) = element.attribute_value("Source").map(value_to_string) else {
        ctx.report("_BindingLoop elements should have the \"Source\" attribute");
        return;
    };
    let items = match scope.get(&source) {
        Some(VariableValue::LiteralArray(items)) => items,
        Some(other) => {
            ctx.report(format!(
                "_BindingLoop source {source} is {}, expected a literal array",
                other.kind_name()
            ));
            return;
        }
        None => {
            ctx.report(format!("Unknown variable: {source}"));
            return;
        }
    };

    for list in &element.lists {
        if !list.is(ELEMENTS_LIST) {
            ctx.report(format!("Unexpected list in _BindingLoop: {}", list.kind));
        }
    }

    for (index, item) in items.iter().enumerate() {
        log::trace!("{source}[{index}] = {item}");
        let iteration = scope.rebound(&source, VariableValue::Literal(item.clone()));
        for list in element.lists_named(ELEMENTS_LIST) {
            generate_list(list, Some(&iteration), ctx, out, depth);
        }
    }
}

fn generate_element<'t>(
    element: &'t Element,
    scope: Option<&Scope<'t>>,
    ctx: &mut HtmlContext<'t, '_>,
    out: &mut String,
    depth: usize,
) {
    let tag = element.kind.to_ascii_lowercase();
    let attributes = apply_bindings(element, scope, ctx);

    newline(out, depth, &ctx.options);
    out.push('<');
    out.push_str(&tag);
    out.push_str(&render_attributes(&attributes));
    out.push('>');

    let child_depth = depth + ctx.options.indent;
    for list in &element.lists {
        if !list.is(BINDINGS_LIST) {
            generate_list(list, scope, ctx, out, child_depth);
        }
    }

    if !is_void_element(&tag) {
        newline(out, depth, &ctx.options);
        out.push_str("</");
        out.push_str(&tag);
        out.push('>');
    }
}

// =========================================================================
// Bindings
// =========================================================================

/// A `Binding(Source, Target)` entry of a `_Bindings` list.
struct Binding {
    source: String,
    target: String,
}

fn read_bindings(list: &List, ctx: &mut HtmlContext<'_, '_>) -> Vec<Binding> {
    let mut bindings = Vec::with_capacity(list.items.len());
    for item in &list.items {
        let Some(element) = &item.element else {
            ctx.report(format!("List item {} has no element", item.id));
            continue;
        };
        if !element.is("Binding") {
            ctx.report(format!("Expected Binding, got {}", element.kind));
            continue;
        }
        let source = element.attribute_value("Source").map(value_to_string);
        let target = element.attribute_value("Target").map(value_to_string);
        match (source, target) {
            (Some(source), Some(target)) => bindings.push(Binding { source, target }),
            _ => ctx.report("Binding elements should have the \"Source\" and \"Target\" attributes"),
        }
    }
    bindings
}

/// Look a binding's source up in the current scope.
fn resolve<'s, 't>(
    binding: &Binding,
    scope: Option<&'s Scope<'t>>,
    ctx: &mut HtmlContext<'_, '_>,
) -> Option<&'s VariableValue<'t>> {
    let Some(scope) = scope else {
        ctx.report(format!(
            "Binding of {} can only be used inside a template",
            binding.source
        ));
        return None;
    };
    let value = scope.get(&binding.source);
    if value.is_none() {
        ctx.report(format!("Unknown variable: {}", binding.source));
    }
    value
}

/// The element's attributes with its `_Bindings` applied. The input tree is
/// left untouched so a template body can be instantiated many times.
fn apply_bindings<'e>(
    element: &'e Element,
    scope: Option<&Scope<'_>>,
    ctx: &mut HtmlContext<'_, '_>,
) -> Cow<'e, [Attribute]> {
    if element.lists_named(BINDINGS_LIST).next().is_none() {
        return Cow::Borrowed(&element.attributes);
    }

    let mut attributes = element.attributes.clone();
    for list in element.lists_named(BINDINGS_LIST) {
        for binding in read_bindings(list, ctx) {
            let value = match resolve(&binding, scope, ctx) {
                Some(VariableValue::Literal(text)) => text.clone(),
                Some(VariableValue::LiteralArray(items)) => {
                    ctx.report(format!(
                        "Loop not used for array variable {}, using its first item",
                        binding.source
                    ));
                    match items.first() {
                        Some(first) => first.clone(),
                        None => continue,
                    }
                }
                Some(VariableValue::ElementRef(_)) => {
                    ctx.report(format!(
                        "Binding element variable {} to attribute {} is not supported yet",
                        binding.source, binding.target
                    ));
                    ELEMENT_PLACEHOLDER.to_string()
                }
                None => continue,
            };
            match attributes.iter_mut().find(|a| a.is(&binding.target)) {
                Some(existing) => existing.value = Value::String(value),
                None => attributes.push(Attribute::new(binding.target, value)),
            }
        }
    }
    Cow::Owned(attributes)
}

/// Render attributes as ` name="value"`. `true` booleans render bare,
/// `false` ones are dropped. Values are copied verbatim, without escaping.
pub fn render_attributes(attributes: &[Attribute]) -> String {
    let mut result = String::new();
    for attr in attributes {
        match &attr.value {
            Value::Bool(false) => {}
            Value::Bool(true) => {
                result.push(' ');
                result.push_str(&to_output_name(&attr.name));
            }
            other => {
                result.push(' ');
                result.push_str(&to_output_name(&attr.name));
                result.push_str("=\"");
                result.push_str(&value_to_string(other));
                result.push('"');
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn gen(doc: &Document, options: RenderOptions) -> (String, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let html = render(doc, &options, &mut diagnostics);
        (html, diagnostics)
    }

    fn page(elements: List) -> Document {
        Document::new("index").with_element(Element::new("Html").with_list(elements))
    }

    fn text(content: &str) -> Element {
        Element::new("_Text").with_attribute("Content", content)
    }

    // =========================================================================
    // Document structure
    // =========================================================================

    #[test]
    fn test_empty_document() {
        let (html, diagnostics) = gen(&Document::new("index"), RenderOptions::pretty(2));
        assert_eq!(html, "");
        assert!(diagnostics.mentions("No elements found"));
    }

    #[test]
    fn test_div_with_text_pretty() {
        let doc = page(
            List::new("Elements").with_element(
                Element::new("Div")
                    .with_attribute("Disabled", true)
                    .with_list(List::new("Elements").with_element(text("Hi"))),
            ),
        );
        let (html, diagnostics) = gen(&doc, RenderOptions::pretty(2));
        assert_eq!(html, "<html>\n  <div disabled>\n    Hi\n  </div>\n</html>");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_minified() {
        let doc = page(
            List::new("Elements").with_element(
                Element::new("Div")
                    .with_attribute("Disabled", true)
                    .with_list(List::new("Elements").with_element(text("Hi"))),
            ),
        );
        let (html, _) = gen(&doc, RenderOptions::minified());
        assert_eq!(html, "<html><div disabled>Hi</div></html>");
    }

    #[test]
    fn test_doctype() {
        let doc = Document::new("index")
            .with_element(Element::new("Doctype").with_attribute("Content", "html"))
            .with_element(Element::new("HTML").with_list(List::new("Elements")));
        let (html, diagnostics) = gen(&doc, RenderOptions::pretty(4));
        assert_eq!(html, "<!DOCTYPE html>\n<html>\n</html>");
        assert!(diagnostics.is_empty());
        let (minified, _) = gen(&doc, RenderOptions::minified());
        assert_eq!(minified, "<!DOCTYPE html><html></html>");
    }

    #[test]
    fn test_doctype_problems_are_reported() {
        let doc = Document::new("index")
            .with_element(Element::new("Doctype").with_attribute("Content", 5))
            .with_element(Element::new("Html").with_list(List::new("Elements")));
        let (html, diagnostics) = gen(&doc, RenderOptions::minified());
        assert_eq!(html, "<html></html>");
        assert!(diagnostics.mentions("should have a string value"));

        let doc = Document::new("index")
            .with_element(Element::new("Doctype"))
            .with_element(Element::new("Html").with_list(List::new("Elements")));
        let (_, diagnostics) = gen(&doc, RenderOptions::minified());
        assert!(diagnostics.mentions("Doctype elements should have the \"Content\" attribute"));
    }

    #[test]
    fn test_too_many_root_elements_still_render() {
        let doc = Document::new("index")
            .with_element(Element::new("Html").with_list(List::new("Elements")))
            .with_element(Element::new("Body"))
            .with_element(Element::new("Html").with_list(List::new("Elements")));
        let (html, diagnostics) = gen(&doc, RenderOptions::minified());
        assert_eq!(html, "<html></html><html></html>");
        assert!(diagnostics.mentions("only 1 or 2 elements"));
        assert!(diagnostics.mentions("Unexpected element: Body"));
    }

    #[test]
    fn test_html_list_problems() {
        let doc = Document::new("index").with_element(
            Element::new("Html")
                .with_attribute("Lang", "en")
                .with_list(List::new("Elements").with_element(Element::new("Br")))
                .with_list(List::new("Head")),
        );
        let (html, diagnostics) = gen(&doc, RenderOptions::minified());
        assert_eq!(html, "<html lang=\"en\"><br></html>");
        assert!(diagnostics.mentions("only 1 list"));
        assert!(diagnostics.mentions("Unexpected list: Head"));

        let doc = Document::new("index").with_element(Element::new("Html"));
        let (html, diagnostics) = gen(&doc, RenderOptions::minified());
        assert_eq!(html, "<html></html>");
        assert!(diagnostics.mentions("should contain the \"Elements\" list"));
    }

    // =========================================================================
    // Elements and attributes
    // =========================================================================

    #[test]
    fn test_attribute_forms() {
        let attributes = vec![
            Attribute::new("DataUserId", 42),
            Attribute::new("Class", "a b"),
            Attribute::new("Hidden", false),
            Attribute::new("Required", true),
            Attribute::new("Step", 0.25),
        ];
        assert_eq!(
            render_attributes(&attributes),
            " data-user-id=\"42\" class=\"a b\" required step=\"0.250000\""
        );
    }

    #[test]
    fn test_attribute_values_are_not_escaped() {
        let attributes = vec![Attribute::new("Title", "a \"quoted\" <b>")];
        assert_eq!(
            render_attributes(&attributes),
            " title=\"a \"quoted\" <b>\""
        );
    }

    #[test]
    fn test_void_elements_never_close() {
        for void in VOID_ELEMENTS {
            let doc = page(
                List::new("Elements").with_element(
                    Element::new(void.to_uppercase())
                        .with_list(List::new("Elements").with_element(text("x"))),
                ),
            );
            let (html, _) = gen(&doc, RenderOptions::pretty(2));
            assert!(!html.contains(&format!("</{void}>")), "{void} was closed");
            let (minified, _) = gen(&doc, RenderOptions::minified());
            assert_eq!(minified, format!("<html><{void}>x</html>"));
        }
    }

    #[test]
    fn test_nested_indentation() {
        let doc = page(
            List::new("Elements").with_element(
                Element::new("Ul").with_list(
                    List::new("Elements")
                        .with_element(
                            Element::new("Li").with_list(List::new("Elements").with_element(text("A"))),
                        )
                        .with_element(Element::new("Li")),
                ),
            ),
        );
        let (html, _) = gen(&doc, RenderOptions::pretty(2));
        assert_eq!(
            html,
            "<html>\n  <ul>\n    <li>\n      A\n    </li>\n    <li>\n    </li>\n  </ul>\n</html>"
        );
    }

    #[test]
    fn test_text_attribute_count_checks() {
        let doc = page(
            List::new("Elements")
                .with_element(Element::new("_Text"))
                .with_element(text("a").with_attribute("Extra", 1)),
        );
        let (html, diagnostics) = gen(&doc, RenderOptions::minified());
        assert_eq!(html, "<html>a</html>");
        assert!(diagnostics.mentions("should have the \"Content\" attribute"));
        assert!(diagnostics.mentions("more than 1 attribute"));
    }

    #[test]
    fn test_text_content_is_stringified() {
        let doc = page(
            List::new("Elements")
                .with_element(Element::new("_text").with_attribute("Content", 7))
                .with_element(Element::new("_TEXT").with_attribute("Content", true)),
        );
        let (html, _) = gen(&doc, RenderOptions::minified());
        assert_eq!(html, "<html>71</html>");
    }

    #[test]
    fn test_bindings_outside_template_are_skipped() {
        let doc = page(
            List::new("Elements").with_element(
                Element::new("A")
                    .with_attribute("Href", "/")
                    .with_list(List::new("_Bindings").with_element(
                        Element::new("Binding")
                            .with_attribute("Source", "Url")
                            .with_attribute("Target", "Href"),
                    )),
            ),
        );
        let (html, diagnostics) = gen(&doc, RenderOptions::minified());
        assert_eq!(html, "<html><a href=\"/\"></a></html>");
        assert!(diagnostics.mentions("can only be used inside a template"));
    }

    #[test]
    fn test_binding_loop_outside_template_is_skipped() {
        let doc = page(
            List::new("Elements").with_element(
                Element::new("_BindingLoop")
                    .with_attribute("Source", "Items")
                    .with_list(List::new("Elements").with_element(text("x"))),
            ),
        );
        let (html, diagnostics) = gen(&doc, RenderOptions::minified());
        assert_eq!(html, "<html></html>");
        assert!(diagnostics.mentions("_BindingLoop can only be used inside a template"));
    }

    #[test]
    fn test_missing_list_item_is_reported() {
        let doc = page(List::new("Elements").with_item(plclweb_tree::ListItem {
            id: "item-3".into(),
            element: None,
        }));
        let (html, diagnostics) = gen(&doc, RenderOptions::minified());
        assert_eq!(html, "<html></html>");
        assert!(diagnostics.mentions("List item item-3 has no element"));
    }

    #[test]
    fn test_render_is_repeatable() {
        let doc = page(List::new("Elements").with_element(text("same")));
        let first = gen(&doc, RenderOptions::pretty(2)).0;
        let second = gen(&doc, RenderOptions::pretty(2)).0;
        assert_eq!(first, second);
    }
}
