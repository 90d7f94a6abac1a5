//! Adapter Registry
//!
//! The registry owns the lowering adapters and dispatches a file to the one
//! matching its extension.

use crate::adapters::{
    JavaTreeSitterAdapter, LanguageAdapter, PythonTreeSitterAdapter, RustTreeSitterAdapter,
};
use crate::error::{IrError, Result};
use crate::ir::{File, LanguageId};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Registry of language adapters
pub struct AdapterRegistry {
    adapters: BTreeMap<LanguageId, Box<dyn LanguageAdapter>>,
}

impl AdapterRegistry {
    /// Create a new registry with all built-in adapters
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(RustTreeSitterAdapter::new()));
        registry.register(Box::new(PythonTreeSitterAdapter::new()));
        registry.register(Box::new(JavaTreeSitterAdapter::new()));
        registry
    }

    /// Create a registry with no adapters
    pub fn empty() -> Self {
        Self {
            adapters: BTreeMap::new(),
        }
    }

    /// Register a language adapter, replacing any previous one for its language
    pub fn register(&mut self, adapter: Box<dyn LanguageAdapter>) {
        let language = adapter.language();
        if self.adapters.insert(language, adapter).is_some() {
            debug!(language = language.name(), "replaced lowering adapter");
        }
    }

    /// Get an adapter for a language
    pub fn get(&self, language: LanguageId) -> Option<&dyn LanguageAdapter> {
        self.adapters.get(&language).map(|a| a.as_ref())
    }

    /// Get supported languages
    pub fn supported_languages(&self) -> Vec<LanguageId> {
        self.adapters.keys().copied().collect()
    }

    /// Check if a language is supported
    pub fn supports(&self, language: LanguageId) -> bool {
        self.adapters.contains_key(&language)
    }

    /// Adapter for a file name, by extension
    pub fn adapter_for_path(&self, filename: &str) -> Option<&dyn LanguageAdapter> {
        self.get(LanguageId::from_path(filename))
    }

    /// Detect the language of `filename` and lower `source` with its adapter
    pub fn lower(&self, source: &[u8], filename: &str) -> Result<File> {
        let language = LanguageId::from_path(filename);
        let adapter = self.get(language).ok_or_else(|| IrError::UnsupportedLanguage {
            path: filename.to_string(),
            language,
        })?;

        trace!(path = filename, language = language.name(), bytes = source.len(), "lowering");
        adapter.lower(source, filename)
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Node;

    /// Adapter stub producing an empty file
    struct EmptyAdapter(LanguageId);

    impl LanguageAdapter for EmptyAdapter {
        fn language(&self) -> LanguageId {
            self.0
        }

        fn lower(&self, _source: &[u8], filename: &str) -> Result<File> {
            Ok(File::new(filename, self.0))
        }
    }

    #[test]
    fn test_builtin_languages() {
        let registry = AdapterRegistry::new();
        assert!(registry.supports(LanguageId::Rust));
        assert!(registry.supports(LanguageId::Python));
        assert!(registry.supports(LanguageId::Java));
        assert!(!registry.supports(LanguageId::Go));
        assert_eq!(registry.supported_languages().len(), 3);
    }

    #[test]
    fn test_adapter_for_path() {
        let registry = AdapterRegistry::new();
        assert_eq!(
            registry.adapter_for_path("src/lib.rs").map(|a| a.language()),
            Some(LanguageId::Rust)
        );
        assert!(registry.adapter_for_path("main.go").is_none());
        assert!(registry.adapter_for_path("README").is_none());
    }

    #[test]
    fn test_lower_dispatches_by_extension() {
        let registry = AdapterRegistry::new();
        let file = registry.lower(b"class A:\n    pass\n", "pkg/a.py").unwrap();
        assert_eq!(file.language, LanguageId::Python);
        assert!(matches!(file.children()[0], Node::Class(_)));
    }

    #[test]
    fn test_lower_unsupported() {
        let registry = AdapterRegistry::new();
        let err = registry.lower(b"package main", "main.go").unwrap_err();
        match err {
            IrError::UnsupportedLanguage { path, language } => {
                assert_eq!(path, "main.go");
                assert_eq!(language, LanguageId::Go);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_register_custom_adapter() {
        let mut registry = AdapterRegistry::empty();
        assert!(registry.supported_languages().is_empty());

        registry.register(Box::new(EmptyAdapter(LanguageId::Go)));
        let file = registry.lower(b"package main", "main.go").unwrap();
        assert_eq!(file.language, LanguageId::Go);
        assert!(file.children().is_empty());
    }
}
