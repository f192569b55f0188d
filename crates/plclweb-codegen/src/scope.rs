//! Variable scopes for template instantiation and binding loops.
//!
//! A scope maps lowercased variable names to values. Child scopes are full
//! copies of their parent, so rebinding a name in a loop iteration never
//! leaks into sibling iterations or back into the caller.

use indexmap::IndexMap;
use plclweb_tree::{fold_name, Element};

/// The value a template variable is bound to.
#[derive(Debug, Clone, PartialEq)]
pub enum VariableValue<'t> {
    Literal(String),
    LiteralArray(Vec<String>),
    /// A subtree of the input document, held by reference.
    ElementRef(&'t Element),
}

impl VariableValue<'_> {
    /// Short description used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            VariableValue::Literal(_) => "a literal",
            VariableValue::LiteralArray(_) => "a literal array",
            VariableValue::ElementRef(_) => "an element",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope<'t> {
    variables: IndexMap<String, VariableValue<'t>>,
}

impl<'t> Scope<'t> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` unless it is already bound. Returns whether the binding took.
    pub fn bind(&mut self, name: &str, value: VariableValue<'t>) -> bool {
        let key = fold_name(name);
        if self.variables.contains_key(&key) {
            return false;
        }
        self.variables.insert(key, value);
        true
    }

    pub fn get(&self, name: &str) -> Option<&VariableValue<'t>> {
        self.variables.get(&fold_name(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(&fold_name(name))
    }

    /// A copy of this scope with `name` bound to `value`, replacing any
    /// previous binding in the copy only.
    pub fn rebound(&self, name: &str, value: VariableValue<'t>) -> Scope<'t> {
        let mut child = self.clone();
        child.variables.insert(fold_name(name), value);
        child
    }

    pub(crate) fn len(&self) -> usize {
        self.variables.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(s: &str) -> VariableValue<'static> {
        VariableValue::Literal(s.into())
    }

    #[test]
    fn test_lookup_ignores_case() {
        let mut scope = Scope::new();
        assert!(scope.bind("Title", literal("Hello")));
        assert_eq!(scope.get("TITLE"), Some(&literal("Hello")));
        assert!(scope.contains("title"));
    }

    #[test]
    fn test_duplicate_bind_is_rejected() {
        let mut scope = Scope::new();
        assert!(scope.bind("Size", literal("10")));
        assert!(!scope.bind("size", literal("20")));
        assert_eq!(scope.get("Size"), Some(&literal("10")));
        assert_eq!(scope.len(), 1);
    }

    #[test]
    fn test_rebound_does_not_touch_parent() {
        let mut parent = Scope::new();
        parent.bind(
            "Items",
            VariableValue::LiteralArray(vec!["a".into(), "b".into()]),
        );
        parent.bind("Other", literal("x"));

        let child = parent.rebound("items", literal("a"));
        assert_eq!(child.get("Items"), Some(&literal("a")));
        assert_eq!(child.get("Other"), Some(&literal("x")));
        assert_eq!(
            parent.get("Items"),
            Some(&VariableValue::LiteralArray(vec!["a".into(), "b".into()]))
        );
    }

    #[test]
    fn test_rebound_can_add_a_name() {
        let parent = Scope::new();
        let child = parent.rebound("Item", literal("a"));
        assert_eq!(child.len(), 1);
        assert!(!parent.contains("item"));
    }
}
