//! Distillation options
//!
//! One independent boolean per knob. Every field is `#[serde(default)]` so a
//! partial JSON document (`{"include_private": true}`) is a valid option set.

use serde::{Deserialize, Serialize};

/// Option set consumed by the stripper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct StripOptions {
    /// Keep function bodies and field initializers
    pub include_implementation: bool,
    pub include_private: bool,
    pub include_protected: bool,
    /// Gates both `internal` and `package-private`
    pub include_internal: bool,
    /// Line and block comments
    pub include_comments: bool,
    /// Doc comments and docstrings
    pub include_docstrings: bool,
    pub include_imports: bool,
    pub include_fields: bool,
    pub include_methods: bool,
    /// Keep decorators / annotations / attributes on kept nodes
    pub include_annotations: bool,
}

impl Default for StripOptions {
    fn default() -> Self {
        Self {
            include_implementation: false,
            include_private: false,
            include_protected: false,
            include_internal: false,
            include_comments: false,
            include_docstrings: true,
            include_imports: true,
            include_fields: true,
            include_methods: true,
            include_annotations: true,
        }
    }
}

impl StripOptions {
    /// Keep everything; stripping with this is the identity
    pub fn full() -> Self {
        Self {
            include_implementation: true,
            include_private: true,
            include_protected: true,
            include_internal: true,
            include_comments: true,
            include_docstrings: true,
            include_imports: true,
            include_fields: true,
            include_methods: true,
            include_annotations: true,
        }
    }

    /// Public signatures with docs (the default set)
    pub fn signatures() -> Self {
        Self::default()
    }

    /// Whether `self` includes everything `other` includes
    pub fn includes(&self, other: &StripOptions) -> bool {
        self.as_flags()
            .iter()
            .zip(other.as_flags().iter())
            .all(|(mine, theirs)| *mine || !*theirs)
    }

    fn as_flags(&self) -> [bool; 10] {
        [
            self.include_implementation,
            self.include_private,
            self.include_protected,
            self.include_internal,
            self.include_comments,
            self.include_docstrings,
            self.include_imports,
            self.include_fields,
            self.include_methods,
            self.include_annotations,
        ]
    }

    pub fn with_implementation(mut self, include: bool) -> Self {
        self.include_implementation = include;
        self
    }

    pub fn with_private(mut self, include: bool) -> Self {
        self.include_private = include;
        self
    }

    pub fn with_protected(mut self, include: bool) -> Self {
        self.include_protected = include;
        self
    }

    pub fn with_internal(mut self, include: bool) -> Self {
        self.include_internal = include;
        self
    }

    pub fn with_comments(mut self, include: bool) -> Self {
        self.include_comments = include;
        self
    }

    pub fn with_docstrings(mut self, include: bool) -> Self {
        self.include_docstrings = include;
        self
    }

    pub fn with_imports(mut self, include: bool) -> Self {
        self.include_imports = include;
        self
    }

    pub fn with_fields(mut self, include: bool) -> Self {
        self.include_fields = include;
        self
    }

    pub fn with_methods(mut self, include: bool) -> Self {
        self.include_methods = include;
        self
    }

    pub fn with_annotations(mut self, include: bool) -> Self {
        self.include_annotations = include;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_public_api() {
        let options = StripOptions::default();
        assert!(!options.include_private);
        assert!(!options.include_protected);
        assert!(!options.include_internal);
        assert!(!options.include_implementation);
        assert!(!options.include_comments);
        assert!(options.include_docstrings);
        assert!(options.include_imports);
        assert!(options.include_fields);
        assert!(options.include_methods);
        assert!(options.include_annotations);
        assert_eq!(StripOptions::signatures(), options);
    }

    #[test]
    fn test_builder() {
        let options = StripOptions::default()
            .with_private(true)
            .with_implementation(true)
            .with_imports(false);
        assert!(options.include_private);
        assert!(options.include_implementation);
        assert!(!options.include_imports);
    }

    #[test]
    fn test_includes() {
        let full = StripOptions::full();
        let default = StripOptions::default();
        assert!(full.includes(&default));
        assert!(!default.includes(&full));
        assert!(default.includes(&default));

        let no_imports = default.with_imports(false);
        assert!(default.includes(&no_imports));
        assert!(!no_imports.includes(&default));
    }

    #[test]
    fn test_partial_json() {
        let options: StripOptions = serde_json::from_str(r#"{"include_private": true}"#).unwrap();
        assert!(options.include_private);
        assert!(options.include_docstrings);
        assert!(!options.include_comments);

        let empty: StripOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, StripOptions::default());
    }
}
