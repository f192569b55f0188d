//! Tree types for PLCL documents.
//!
//! Names are compared case-insensitively everywhere in the renderer, but the
//! original casing is kept so it can be echoed back in output and diagnostics.

use serde::{Deserialize, Serialize};

use crate::TreeError;

/// Case-insensitive name comparison used for element, list and attribute names.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Fold a name into the lowercase key used by catalogs and scopes.
pub fn fold_name(name: &str) -> String {
    name.to_ascii_lowercase()
}

// ---------------------------------------------------------------------------
// Values and attributes
// ---------------------------------------------------------------------------

/// A scalar attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// A named value on an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: Value,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Whether this attribute is called `name`, ignoring case.
    pub fn is(&self, name: &str) -> bool {
        eq_ignore_case(&self.name, name)
    }
}

// ---------------------------------------------------------------------------
// Elements and lists
// ---------------------------------------------------------------------------

/// A typed node with attributes and named child lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub lists: Vec<List>,
}

impl Element {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attributes: Vec::new(),
            lists: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    pub fn with_list(mut self, list: List) -> Self {
        self.lists.push(list);
        self
    }

    /// Whether this element has type `kind`, ignoring case.
    pub fn is(&self, kind: &str) -> bool {
        eq_ignore_case(&self.kind, kind)
    }

    /// The first attribute called `name`. Later duplicates are shadowed.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.is(name))
    }

    pub fn attribute_value(&self, name: &str) -> Option<&Value> {
        self.attribute(name).map(|a| &a.value)
    }

    /// All child lists of type `kind`, in declaration order.
    pub fn lists_named<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a List> + 'a {
        self.lists.iter().filter(move |l| l.is(kind))
    }
}

/// One entry of a list. The element may be missing when the parser recovered
/// from a malformed entry; `id` identifies the entry in diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub element: Option<Element>,
}

/// A group of elements under a semantic role such as `Elements` or `_Templates`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub items: Vec<ListItem>,
}

impl List {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            items: Vec::new(),
        }
    }

    pub fn with_element(mut self, element: Element) -> Self {
        let id = format!("{}[{}]", self.kind, self.items.len());
        self.items.push(ListItem {
            id,
            element: Some(element),
        });
        self
    }

    pub fn with_item(mut self, item: ListItem) -> Self {
        self.items.push(item);
        self
    }

    /// Whether this list has type `kind`, ignoring case.
    pub fn is(&self, kind: &str) -> bool {
        eq_ignore_case(&self.kind, kind)
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A parsed PLCL file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub lists: Vec<List>,
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Document {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_list(mut self, list: List) -> Self {
        self.lists.push(list);
        self
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.elements.push(element);
        self
    }

    /// Load a tree serialized as JSON.
    pub fn from_json(source: &str) -> Result<Self, TreeError> {
        Ok(serde_json::from_str(source)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // =========================================================================
    // Lookup
    // =========================================================================

    #[test]
    fn test_attribute_lookup_ignores_case() {
        let el = Element::new("Div").with_attribute("Content", "Hi");
        assert_eq!(el.attribute_value("content"), Some(&Value::from("Hi")));
        assert_eq!(el.attribute_value("CONTENT"), Some(&Value::from("Hi")));
        assert!(el.attribute("Missing").is_none());
    }

    #[test]
    fn test_first_attribute_wins() {
        let el = Element::new("Rule")
            .with_attribute("_Type", "class")
            .with_attribute("_type", "id");
        assert_eq!(el.attribute_value("_TYPE"), Some(&Value::from("class")));
    }

    #[test]
    fn test_lists_named() {
        let el = Element::new("Div")
            .with_list(List::new("Elements"))
            .with_list(List::new("_Bindings"))
            .with_list(List::new("elements"));
        assert_eq!(el.lists_named("ELEMENTS").count(), 2);
        assert_eq!(el.lists_named("_bindings").count(), 1);
    }

    #[test]
    fn test_builder_assigns_item_ids() {
        let list = List::new("Elements")
            .with_element(Element::new("A"))
            .with_element(Element::new("B"));
        assert_eq!(list.items[0].id, "Elements[0]");
        assert_eq!(list.items[1].id, "Elements[1]");
    }

    #[test]
    fn test_fold_name() {
        assert_eq!(fold_name("BackgroundColor"), "backgroundcolor");
        assert!(eq_ignore_case("_BindingLoop", "_bindingloop"));
    }

    // =========================================================================
    // JSON loading
    // =========================================================================

    #[test]
    fn test_from_json_value_kinds() {
        let doc = Document::from_json(
            r#"{
                "name": "page",
                "elements": [{
                    "type": "Html",
                    "attributes": [
                        {"name": "Lang", "value": "en"},
                        {"name": "Width", "value": 10},
                        {"name": "Ratio", "value": 1.5},
                        {"name": "Hidden", "value": true}
                    ]
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(doc.name, "page");
        let attrs = &doc.elements[0].attributes;
        assert_eq!(attrs[0].value, Value::String("en".into()));
        assert_eq!(attrs[1].value, Value::Integer(10));
        assert_eq!(attrs[2].value, Value::Float(1.5));
        assert_eq!(attrs[3].value, Value::Bool(true));
    }

    #[test]
    fn test_from_json_missing_element() {
        let doc = Document::from_json(
            r#"{"lists": [{"type": "_Templates", "items": [{"id": "t0", "element": null}]}]}"#,
        )
        .unwrap();
        assert_eq!(doc.lists[0].items[0].id, "t0");
        assert!(doc.lists[0].items[0].element.is_none());
    }

    #[test]
    fn test_from_json_error_position() {
        let err = Document::from_json("{\n  \"name\": }").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.column > 0);
    }
}
