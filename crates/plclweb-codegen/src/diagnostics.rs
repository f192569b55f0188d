//! Diagnostic collector.
//!
//! Rendering never fails on malformed input. Every problem is recorded here
//! and the offending construct is skipped; the caller decides whether the
//! collected diagnostics should affect the outcome.

use std::fmt;

/// One reported problem, tagged with the document it was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub context: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) {}", self.context, self.message)
    }
}

/// Append-only sink threaded through a single render call.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, context: &str, message: impl Into<String>) {
        let diagnostic = Diagnostic {
            context: context.to_string(),
            message: message.into(),
        };
        log::debug!("diagnostic: {diagnostic}");
        self.entries.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Whether any recorded message contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.entries.iter().any(|d| d.message.contains(needle))
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_keeps_order() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.report("index", "first");
        diagnostics.report("index", "second");
        let messages: Vec<&str> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
        assert!(diagnostics.mentions("sec"));
    }

    #[test]
    fn test_display_format() {
        let diagnostic = Diagnostic {
            context: "style".into(),
            message: "Unknown _Type: foo, assuming \"Tag\"".into(),
        };
        assert_eq!(
            diagnostic.to_string(),
            "(style) Unknown _Type: foo, assuming \"Tag\""
        );
    }
}
