//! PLCL to web code generator
//!
//! Renders an already-parsed PLCL document tree into HTML or CSS text.
//! HTML rendering expands templates, resolves variable bindings and binding
//! loops; CSS rendering expands pseudo-classes and pseudo-elements and
//! inlines template snippets.
//!
//! ```text
//! Document tree → render_html() / render_css() → RenderOutput { output, diagnostics }
//! ```
//!
//! Rendering never fails. Problems in the tree are collected as diagnostics
//! and the offending construct is skipped.

pub mod catalog;
pub mod css;
pub mod diagnostics;
pub mod html;
pub mod scope;
mod template;

pub use catalog::TemplateCatalog;
pub use diagnostics::{Diagnostic, Diagnostics};
pub use scope::{Scope, VariableValue};

use plclweb_tree::{Document, Value};

/// Output formatting shared by both generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Omit all optional whitespace.
    pub minify: bool,
    /// Spaces per nesting level when not minifying.
    pub indent: usize,
}

impl RenderOptions {
    pub fn minified() -> Self {
        Self {
            minify: true,
            indent: 0,
        }
    }

    pub fn pretty(indent: usize) -> Self {
        Self {
            minify: false,
            indent,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            minify: true,
            indent: 4,
        }
    }
}

/// Which generator a document is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Html,
    Css,
}

/// The rendered text of one document plus everything reported on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutput {
    pub output: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Render an HTML document with a fresh diagnostic sink.
pub fn render_html(doc: &Document, options: &RenderOptions) -> RenderOutput {
    render(DocumentKind::Html, doc, options)
}

/// Render a CSS document with a fresh diagnostic sink.
pub fn render_css(doc: &Document, options: &RenderOptions) -> RenderOutput {
    render(DocumentKind::Css, doc, options)
}

pub fn render(kind: DocumentKind, doc: &Document, options: &RenderOptions) -> RenderOutput {
    let mut diagnostics = Diagnostics::new();
    let output = match kind {
        DocumentKind::Html => html::render(doc, options, &mut diagnostics),
        DocumentKind::Css => css::render(doc, options, &mut diagnostics),
    };
    log::debug!(
        "rendered {} ({} bytes, {} diagnostics)",
        doc.name,
        output.len(),
        diagnostics.len()
    );
    RenderOutput {
        output,
        diagnostics: diagnostics.into_vec(),
    }
}

// =========================================================================
// Shared helpers
// =========================================================================

/// Convert an identifier into its output form. Only ASCII capitals start a
/// new segment.
/// `BackgroundColor` → `background-color`
pub fn to_output_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if i != 0 && ch.is_ascii_uppercase() {
            result.push('-');
        }
        result.push(ch.to_ascii_lowercase());
    }
    result
}

/// Stringify an attribute value. Booleans become `0` / `1`, floats always
/// carry six decimals (`0.5` → `0.500000`).
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Integer(n) => n.to_string(),
        Value::Float(n) => format!("{n:.6}"),
        Value::Bool(b) => u8::from(*b).to_string(),
    }
}

/// Start a new output line at `depth` spaces, unless minifying.
pub(crate) fn newline(out: &mut String, depth: usize, options: &RenderOptions) {
    if !options.minify {
        out.push('\n');
        out.extend(std::iter::repeat(' ').take(depth));
    }
}
