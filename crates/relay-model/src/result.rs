use serde::{Deserialize, Serialize};

use crate::{Diagnostic, Severity};

/// The processed value of one element in one row, with its diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementResult {
    pub value: Option<String>,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl ElementResult {
    pub fn new(value: Option<String>) -> Self {
        Self {
            value,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn value(value: impl Into<String>) -> Self {
        Self::new(Some(value.into()))
    }

    pub fn empty() -> Self {
        Self::new(None)
    }

    /// Adds an error and returns the result, for chaining.
    #[must_use]
    pub fn error(mut self, diagnostic: Diagnostic) -> Self {
        self.push_error(diagnostic);
        self
    }

    /// Adds a warning and returns the result, for chaining.
    #[must_use]
    pub fn warning(mut self, diagnostic: Diagnostic) -> Self {
        self.push_warning(diagnostic);
        self
    }

    pub fn push_error(&mut self, diagnostic: Diagnostic) {
        self.errors.push(diagnostic.with_severity(Severity::Error));
    }

    pub fn push_warning(&mut self, diagnostic: Diagnostic) {
        self.warnings.push(diagnostic.with_severity(Severity::Warning));
    }

    pub fn value_str(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    pub fn is_blank(&self) -> bool {
        self.value_str().trim().is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pushes_normalize_severity() {
        let result = ElementResult::value("x")
            .warning(Diagnostic::missing_field("(a)"))
            .error(Diagnostic::missing_field("(b)").with_severity(Severity::Warning));
        assert_eq!(result.warnings[0].severity, Severity::Warning);
        assert_eq!(result.errors[0].severity, Severity::Error);
        assert!(result.has_errors());
        assert!(!result.is_blank());
    }

    #[test]
    fn blank_values() {
        assert!(ElementResult::empty().is_blank());
        assert!(ElementResult::value("  ").is_blank());
    }
}
