//! PLCL document tree
//!
//! The already-parsed tree handed over by the PLCL configuration parser:
//! typed elements carrying attributes and named child lists. The renderer
//! only reads this tree; it never tokenizes source text itself.
//!
//! Hosts that cannot link the parser may pass the tree as JSON.
//!
//! # Example
//!
//! ```
//! use plclweb_tree::{Document, Element, List};
//!
//! let doc = Document::new("index").with_element(
//!     Element::new("Html").with_list(List::new("Elements").with_element(Element::new("Div"))),
//! );
//! assert_eq!(doc.elements.len(), 1);
//! ```

pub mod tree;

pub use tree::{eq_ignore_case, fold_name, Attribute, Document, Element, List, ListItem, Value};

/// Error raised when a serialized tree cannot be loaded.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Tree error at line {line}, column {column}: {message}")]
pub struct TreeError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl From<serde_json::Error> for TreeError {
    fn from(e: serde_json::Error) -> Self {
        Self {
            message: e.to_string(),
            line: e.line(),
            column: e.column(),
        }
    }
}
