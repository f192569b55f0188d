//! WASM bindings for the PLCL to web renderer.
//!
//! Exposes `renderHtml()` / `renderCss()` to JavaScript via wasm-bindgen.
//! The document is either a plain JS object shaped like the tree or its JSON
//! text. Returns `{ output: string, diagnostics: string[] }` or throws when
//! the document cannot be read.

use plclweb_codegen::{render, DocumentKind, RenderOptions, RenderOutput};
use plclweb_tree::Document;
use wasm_bindgen::prelude::*;

/// Render a document object to HTML.
#[wasm_bindgen(js_name = renderHtml)]
pub fn render_html(document: JsValue, minify: bool, indent: usize) -> Result<JsValue, JsError> {
    render_value(DocumentKind::Html, document, minify, indent)
}

/// Render a document object to CSS.
#[wasm_bindgen(js_name = renderCss)]
pub fn render_css(document: JsValue, minify: bool, indent: usize) -> Result<JsValue, JsError> {
    render_value(DocumentKind::Css, document, minify, indent)
}

/// Render a JSON-serialized document to HTML.
#[wasm_bindgen(js_name = renderHtmlJson)]
pub fn render_html_json(source: &str, minify: bool, indent: usize) -> Result<JsValue, JsError> {
    let out = render_json(DocumentKind::Html, source, &options(minify, indent))?;
    to_js(&out)
}

/// Render a JSON-serialized document to CSS.
#[wasm_bindgen(js_name = renderCssJson)]
pub fn render_css_json(source: &str, minify: bool, indent: usize) -> Result<JsValue, JsError> {
    let out = render_json(DocumentKind::Css, source, &options(minify, indent))?;
    to_js(&out)
}

/// Get the renderer version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn options(minify: bool, indent: usize) -> RenderOptions {
    if minify {
        RenderOptions::minified()
    } else {
        RenderOptions::pretty(indent)
    }
}

fn render_value(
    kind: DocumentKind,
    document: JsValue,
    minify: bool,
    indent: usize,
) -> Result<JsValue, JsError> {
    let doc: Document =
        serde_wasm_bindgen::from_value(document).map_err(|e| JsError::new(&e.to_string()))?;
    to_js(&render(kind, &doc, &options(minify, indent)))
}

fn render_json(
    kind: DocumentKind,
    source: &str,
    options: &RenderOptions,
) -> Result<RenderOutput, JsError> {
    let doc = Document::from_json(source).map_err(|e| JsError::new(&e.to_string()))?;
    Ok(render(kind, &doc, options))
}

/// Build the plain JS object `{ output, diagnostics }`.
fn to_js(out: &RenderOutput) -> Result<JsValue, JsError> {
    let diagnostics = js_sys::Array::new();
    for diagnostic in &out.diagnostics {
        diagnostics.push(&JsValue::from_str(&diagnostic.to_string()));
    }

    let js_obj = js_sys::Object::new();
    js_sys::Reflect::set(&js_obj, &"output".into(), &out.output.as_str().into())
        .map_err(|_| JsError::new("Failed to set output property"))?;
    js_sys::Reflect::set(&js_obj, &"diagnostics".into(), &diagnostics.into())
        .map_err(|_| JsError::new("Failed to set diagnostics property"))?;

    Ok(js_obj.into())
}
