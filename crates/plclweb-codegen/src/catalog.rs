//! Template catalog.
//!
//! Indexes the `Template` definitions found in a document's top-level
//! `_Templates` lists. Built once per render and read-only afterwards.

use indexmap::IndexMap;
use plclweb_tree::{fold_name, Element, List};

use crate::{value_to_string, Diagnostics};

/// Top-level list type holding template definitions.
pub const TEMPLATE_LIST: &str = "_Templates";

/// Element type of a template definition (and of a CSS template reference).
pub const TEMPLATE_ELEMENT: &str = "Template";

/// Templates keyed by their lowercased name.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog<'t> {
    templates: IndexMap<String, &'t Element>,
}

impl<'t> TemplateCatalog<'t> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look a template up by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&'t Element> {
        self.templates.get(&fold_name(name)).copied()
    }

    /// Lowercased keys and definitions, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &'t Element)> + '_ {
        self.templates.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// The non-empty `Name` attribute of an element, stringified.
pub fn element_name(element: &Element) -> Option<String> {
    element
        .attribute_value("Name")
        .map(value_to_string)
        .filter(|name| !name.is_empty())
}

/// Build the catalog from a document's top-level lists.
///
/// The first definition of a name wins; later duplicates are reported and
/// dropped. Lists other than `_Templates` are reported and ignored.
pub fn build<'t>(
    lists: &'t [List],
    context: &str,
    diagnostics: &mut Diagnostics,
) -> TemplateCatalog<'t> {
    let mut catalog = TemplateCatalog::new();

    for list in lists {
        if !list.is(TEMPLATE_LIST) {
            diagnostics.report(context, format!("Unexpected list: {}", list.kind));
            continue;
        }

        for item in &list.items {
            let Some(element) = &item.element else {
                diagnostics.report(context, format!("List item {} has no element", item.id));
                continue;
            };
            if !element.is(TEMPLATE_ELEMENT) {
                diagnostics.report(
                    context,
                    format!("Expected Template, got {}", element.kind),
                );
                continue;
            }
            let Some(name) = element_name(element) else {
                diagnostics.report(
                    context,
                    format!("Template {} doesn't have a \"Name\" attribute", item.id),
                );
                continue;
            };
            let key = fold_name(&name);
            if catalog.templates.contains_key(&key) {
                diagnostics.report(context, format!("Duplicate template: {name}"));
                continue;
            }
            log::trace!("registered template {name}");
            catalog.templates.insert(key, element);
        }
    }

    catalog
}

#[cfg(test)]
mod tests {
    use super::*;
    use plclweb_tree::{ListItem, Value};

    fn template(name: &str) -> Element {
        Element::new("Template").with_attribute("Name", name)
    }

    #[test]
    fn test_registers_templates_case_insensitively() {
        let lists = vec![List::new("_templates").with_element(template("Card"))];
        let mut diagnostics = Diagnostics::new();
        let catalog = build(&lists, "index", &mut diagnostics);
        assert_eq!(catalog.iter().count(), 1);
        assert!(catalog.get("CARD").is_some());
        assert!(catalog.get("card").is_some());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_first_registration_wins() {
        let lists = vec![List::new("_Templates")
            .with_element(template("Card").with_attribute("Marker", 1))
            .with_element(template("card").with_attribute("Marker", 2))];
        let mut diagnostics = Diagnostics::new();
        let catalog = build(&lists, "index", &mut diagnostics);
        assert_eq!(catalog.iter().count(), 1);
        let card = catalog.get("Card").unwrap();
        assert_eq!(card.attribute_value("Marker"), Some(&Value::Integer(1)));
        assert!(diagnostics.mentions("Duplicate template: card"));
    }

    #[test]
    fn test_skips_malformed_entries() {
        let lists = vec![List::new("_Templates")
            .with_element(Element::new("Widget").with_attribute("Name", "W"))
            .with_element(Element::new("Template"))
            .with_element(template(""))
            .with_item(ListItem {
                id: "broken".into(),
                element: None,
            })];
        let mut diagnostics = Diagnostics::new();
        let catalog = build(&lists, "index", &mut diagnostics);
        assert_eq!(catalog.iter().count(), 0);
        assert_eq!(diagnostics.len(), 4);
        assert!(diagnostics.mentions("Expected Template, got Widget"));
        assert!(diagnostics.mentions("List item broken has no element"));
    }

    #[test]
    fn test_non_template_lists_are_reported() {
        let lists = vec![List::new("Variables").with_element(template("Ignored"))];
        let mut diagnostics = Diagnostics::new();
        let catalog = build(&lists, "index", &mut diagnostics);
        assert_eq!(catalog.iter().count(), 0);
        assert!(diagnostics.mentions("Unexpected list: Variables"));
    }

    #[test]
    fn test_numeric_names_are_stringified() {
        let lists = vec![List::new("_Templates")
            .with_element(Element::new("Template").with_attribute("Name", 404))];
        let mut diagnostics = Diagnostics::new();
        let catalog = build(&lists, "index", &mut diagnostics);
        assert!(catalog.get("404").is_some());
    }
}
