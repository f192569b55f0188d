//! Template expansion.
//!
//! An element whose type names a catalog template is a call. The call's own
//! attributes and its `VariableValues` list form a fresh scope, the
//! template's `Variables` fill in defaults for anything left unbound, and
//! the template's `Elements` are rendered with that scope in place of the
//! call.

use plclweb_tree::{eq_ignore_case, fold_name, Element};

use crate::catalog::element_name;
use crate::html::{generate_list, HtmlContext, ELEMENTS_LIST};
use crate::scope::{Scope, VariableValue};
use crate::value_to_string;

const VARIABLE_VALUES_LIST: &str = "VariableValues";
const VARIABLES_LIST: &str = "Variables";
const VALUE_LIST: &str = "Value";
const LITERAL_LIST: &str = "_LiteralList";

/// Attributes of a `_LiteralList` named `_0`, `_1`, ... hold the array items.
const LITERAL_INDEX_PREFIX: &str = "_";

pub(crate) fn expand<'t>(
    call: &'t Element,
    definition: &'t Element,
    ctx: &mut HtmlContext<'t, '_>,
    out: &mut String,
    depth: usize,
) {
    let key = fold_name(&call.kind);
    if ctx.expanding.contains(&key) {
        ctx.report(format!("Recursive template: {}", call.kind));
        return;
    }

    let mut scope = call_scope(call, ctx);
    fill_defaults(definition, &call.kind, &mut scope, ctx);
    log::debug!("expanding template {} with {} variables", call.kind, scope.len());

    ctx.expanding.push(key);
    let mut has_body = false;
    for list in &definition.lists {
        if list.is(ELEMENTS_LIST) {
            has_body = true;
            generate_list(list, Some(&scope), ctx, out, depth);
        } else if !list.is(VARIABLES_LIST) {
            ctx.report(format!(
                "Unexpected list in template {}: {}",
                call.kind, list.kind
            ));
        }
    }
    ctx.expanding.pop();

    if !has_body {
        ctx.report(format!(
            "Template {} doesn't have an \"Elements\" list",
            call.kind
        ));
    }
}

/// Scope built from the call's attributes and `VariableValues`.
fn call_scope<'t>(call: &'t Element, ctx: &mut HtmlContext<'t, '_>) -> Scope<'t> {
    let mut scope = Scope::new();

    for attr in &call.attributes {
        let value = VariableValue::Literal(value_to_string(&attr.value));
        if !scope.bind(&attr.name, value) {
            ctx.report(format!(
                "Duplicate variable {} in call to {}",
                attr.name, call.kind
            ));
        }
    }

    for list in &call.lists {
        if !list.is(VARIABLE_VALUES_LIST) {
            ctx.report(format!(
                "Unexpected list in call to {}: {}",
                call.kind, list.kind
            ));
            continue;
        }
        for item in &list.items {
            match &item.element {
                Some(element) => bind_variable_value(element, &mut scope, ctx),
                None => ctx.report(format!("List item {} has no element", item.id)),
            }
        }
    }

    scope
}

fn bind_variable_value<'t>(
    element: &'t Element,
    scope: &mut Scope<'t>,
    ctx: &mut HtmlContext<'t, '_>,
) {
    if !element.is("VariableValue") {
        ctx.report(format!("Expected VariableValue, got {}", element.kind));
        return;
    }
    let Some(name) = element_name(element) else {
        ctx.report("VariableValue elements should have the \"Name\" attribute");
        return;
    };
    if scope.contains(&name) {
        ctx.report(format!("Variable {name} is already bound"));
        return;
    }
    let Some(kind) = element.attribute_value("Type").map(value_to_string) else {
        ctx.report(format!("Variable value {name} should have the \"Type\" attribute"));
        return;
    };

    let value = if eq_ignore_case(&kind, "Literal") {
        match element.attribute_value("Value") {
            Some(value) => VariableValue::Literal(value_to_string(value)),
            None => {
                ctx.report(format!(
                    "Literal variable value {name} should have the \"Value\" attribute"
                ));
                return;
            }
        }
    } else if eq_ignore_case(&kind, "LiteralArray") {
        match literal_array(element, &name, ctx) {
            Some(items) => VariableValue::LiteralArray(items),
            None => return,
        }
    } else if eq_ignore_case(&kind, "Element") {
        match value_element(element, &name, ctx) {
            Some(value) => VariableValue::ElementRef(value),
            None => return,
        }
    } else {
        ctx.report(format!("Unknown variable value type {kind} for {name}"));
        return;
    };

    scope.bind(&name, value);
}

/// The single element inside a variable value's `Value` list.
fn value_element<'e>(
    element: &'e Element,
    name: &str,
    ctx: &mut HtmlContext<'_, '_>,
) -> Option<&'e Element> {
    let mut lists = element.lists_named(VALUE_LIST);
    let (Some(list), None) = (lists.next(), lists.next()) else {
        ctx.report(format!(
            "Variable value {name} should contain exactly 1 \"Value\" list"
        ));
        return None;
    };
    let [item] = list.items.as_slice() else {
        ctx.report(format!(
            "The \"Value\" list of {name} should contain exactly 1 element"
        ));
        return None;
    };
    if item.element.is_none() {
        ctx.report(format!("List item {} has no element", item.id));
    }
    item.element.as_ref()
}

/// Items of a `_LiteralList`, ordered by their numeric attribute suffix.
fn literal_array(
    element: &Element,
    name: &str,
    ctx: &mut HtmlContext<'_, '_>,
) -> Option<Vec<String>> {
    let list = value_element(element, name, ctx)?;
    if !list.is(LITERAL_LIST) {
        ctx.report(format!("Expected _LiteralList, got {}", list.kind));
        return None;
    }

    let mut indexed = Vec::with_capacity(list.attributes.len());
    for attr in &list.attributes {
        let Some(suffix) = attr.name.strip_prefix(LITERAL_INDEX_PREFIX) else {
            continue;
        };
        match suffix.parse::<usize>() {
            Ok(index) => indexed.push((index, value_to_string(&attr.value))),
            Err(_) => ctx.report(format!("Invalid literal index: {}", attr.name)),
        }
    }
    indexed.sort_by_key(|(index, _)| *index);

    if indexed.is_empty() {
        ctx.report(format!("Literal array {name} is empty"));
        return None;
    }
    Some(indexed.into_iter().map(|(_, value)| value).collect())
}

/// Bind each declared `Variable` default whose name is still unbound.
fn fill_defaults<'t>(
    definition: &'t Element,
    template: &str,
    scope: &mut Scope<'t>,
    ctx: &mut HtmlContext<'t, '_>,
) {
    for list in definition.lists_named(VARIABLES_LIST) {
        for item in &list.items {
            let Some(variable) = &item.element else {
                ctx.report(format!("List item {} has no element", item.id));
                continue;
            };
            if !variable.is("Variable") {
                ctx.report(format!("Expected Variable, got {}", variable.kind));
                continue;
            }
            let Some(name) = element_name(variable) else {
                ctx.report(format!(
                    "Variables of template {template} should have the \"Name\" attribute"
                ));
                continue;
            };
            let Some(default) = variable.attribute_value("Default") else {
                ctx.report(format!("Variable {name} should have the \"Default\" attribute"));
                continue;
            };
            if !scope.contains(&name) {
                scope.bind(&name, VariableValue::Literal(value_to_string(default)));
            }
        }
    }
}
