//! CSS code generator.
//!
//! Every top-level element of a CSS document is a style rule. Its type is
//! the selector, `_Type` picks the selector prefix, and the attributes not
//! starting with `_` become declarations. Pseudo-classes and pseudo-elements
//! expand into separate rules emitted right after their parent rule.

use indexmap::IndexMap;
use plclweb_tree::{eq_ignore_case, fold_name, Attribute, Document, Element, List};

use crate::catalog::{self, element_name, TEMPLATE_ELEMENT, TEMPLATE_LIST};
use crate::{to_output_name, value_to_string, Diagnostics, RenderOptions};

const TYPE_ATTRIBUTE: &str = "_Type";
const ALL_ELEMENT: &str = "_all";
const PSEUDO_ELEMENTS: &str = "_PseudoElements";
const PSEUDO_CLASSES: &str = "_PseudoClasses";

/// How a rule's type is turned into a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectorKind {
    Tag,
    Class,
    Id,
}

impl SelectorKind {
    fn prefix(self) -> &'static str {
        match self {
            SelectorKind::Tag => "",
            SelectorKind::Class => ".",
            SelectorKind::Id => "#",
        }
    }

    fn name(self) -> &'static str {
        match self {
            SelectorKind::Tag => "tag",
            SelectorKind::Class => "class",
            SelectorKind::Id => "id",
        }
    }
}

struct CssContext<'a> {
    name: &'a str,
    options: RenderOptions,
    /// Pre-rendered declaration blocks keyed by lowercased template name.
    snippets: IndexMap<String, String>,
    diagnostics: &'a mut Diagnostics,
}

/// Generate CSS from a document tree.
pub fn render(doc: &Document, options: &RenderOptions, diagnostics: &mut Diagnostics) -> String {
    let catalog = catalog::build(&doc.lists, &doc.name, diagnostics);
    let snippets = catalog
        .iter()
        .map(|(key, template)| {
            let body = template.attributes.iter().filter(|a| !a.is("Name"));
            (key.to_string(), declarations(body, options))
        })
        .collect();

    let mut ctx = CssContext {
        name: &doc.name,
        options: *options,
        snippets,
        diagnostics,
    };

    let mut css = String::new();
    for element in &doc.elements {
        generate_rule(element, &mut ctx, &mut css);
    }
    css
}

fn generate_rule(element: &Element, ctx: &mut CssContext<'_>, out: &mut String) {
    let is_all = element.is(ALL_ELEMENT);
    let kind = if is_all {
        SelectorKind::Tag
    } else {
        selector_kind(element, ctx)
    };
    let selector = if is_all { "*" } else { element.kind.as_str() };

    out.push_str(kind.prefix());
    out.push_str(selector);
    if !ctx.options.minify {
        out.push(' ');
    }
    out.push('{');
    if !ctx.options.minify {
        out.push('\n');
    }

    // Pseudo rules follow the closing brace of this rule.
    let mut after = String::new();
    for list in &element.lists {
        if list.is(PSEUDO_ELEMENTS) {
            for child in list_elements(list, ctx) {
                let mut child = child.clone();
                child.kind = format!("{selector}::{}", child.kind);
                generate_rule(&child, ctx, &mut after);
            }
        } else if list.is(PSEUDO_CLASSES) {
            for child in list_elements(list, ctx) {
                let mut child = child.clone();
                child.kind = format!("{selector}:{}", child.kind);
                child
                    .attributes
                    .push(Attribute::new(TYPE_ATTRIBUTE, kind.name()));
                generate_rule(&child, ctx, &mut after);
            }
        } else if list.is(TEMPLATE_LIST) {
            inline_templates(list, ctx, out);
        } else {
            ctx.diagnostics.report(
                ctx.name,
                format!("Unexpected list in {}: {}", element.kind, list.kind),
            );
        }
    }

    out.push_str(&declarations(element.attributes.iter(), &ctx.options));
    out.push('}');
    if !ctx.options.minify {
        out.push('\n');
    }
    out.push_str(&after);
}

/// Resolve the first `_Type` attribute of a rule, falling back to a tag selector.
fn selector_kind(element: &Element, ctx: &mut CssContext<'_>) -> SelectorKind {
    let Some(value) = element.attribute_value(TYPE_ATTRIBUTE) else {
        ctx.diagnostics.report(
            ctx.name,
            format!(
                "Element {} doesn't have a _Type, assuming \"Tag\"",
                element.kind
            ),
        );
        return SelectorKind::Tag;
    };

    let kind = value_to_string(value);
    if eq_ignore_case(&kind, "class") {
        SelectorKind::Class
    } else if eq_ignore_case(&kind, "id") {
        SelectorKind::Id
    } else if eq_ignore_case(&kind, "tag") {
        SelectorKind::Tag
    } else {
        ctx.diagnostics.report(
            ctx.name,
            format!("Unknown _Type: {kind}, assuming \"Tag\""),
        );
        SelectorKind::Tag
    }
}

/// Append the declaration blocks of the templates referenced by `list`.
fn inline_templates(list: &List, ctx: &mut CssContext<'_>, out: &mut String) {
    for element in list_elements(list, ctx) {
        if !element.is(TEMPLATE_ELEMENT) {
            ctx.diagnostics.report(
                ctx.name,
                format!("Expected Template, got {}", element.kind),
            );
            continue;
        }
        for attr in element.attributes.iter().filter(|a| !a.is("Name")) {
            ctx.diagnostics
                .report(ctx.name, format!("Expected Name, got {}", attr.name));
        }
        let Some(name) = element_name(element) else {
            ctx.diagnostics.report(
                ctx.name,
                "Template references should have the \"Name\" attribute",
            );
            continue;
        };
        match ctx.snippets.get(&fold_name(&name)) {
            Some(snippet) => out.push_str(snippet),
            None => ctx
                .diagnostics
                .report(ctx.name, format!("Template {name} not found")),
        }
    }
}

/// The present elements of a list; missing ones are reported.
fn list_elements<'l>(list: &'l List, ctx: &mut CssContext<'_>) -> Vec<&'l Element> {
    let mut elements = Vec::with_capacity(list.items.len());
    for item in &list.items {
        match &item.element {
            Some(element) => elements.push(element),
            None => ctx
                .diagnostics
                .report(ctx.name, format!("List item {} has no element", item.id)),
        }
    }
    elements
}

/// Render `name: value;` declarations, skipping `_`-prefixed directives.
fn declarations<'a>(
    attributes: impl Iterator<Item = &'a Attribute>,
    options: &RenderOptions,
) -> String {
    let mut block = String::new();
    for attr in attributes {
        if attr.name.starts_with('_') {
            continue;
        }
        if !options.minify {
            block.extend(std::iter::repeat(' ').take(options.indent));
        }
        block.push_str(&to_output_name(&attr.name));
        block.push(':');
        if !options.minify {
            block.push(' ');
        }
        block.push_str(&value_to_string(&attr.value));
        block.push(';');
        if !options.minify {
            block.push('\n');
        }
    }
    block
}
