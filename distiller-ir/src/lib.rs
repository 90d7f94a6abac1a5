//! distiller-ir: Unified IR and Distillation Engine
//!
//! This crate lowers source files from several languages into one
//! language-agnostic tree and strips that tree down to the parts a reader
//! (human or LLM) needs.
//!
//! # Layers
//!
//! 1. **IR** (`ir`): closed node kinds, resolved visibility, modifier sets
//! 2. **Lowering** (`adapters`, `registry`): per-language adapters built on Tree-sitter
//! 3. **Distillation** (`options`, `stripper`): a pure, option-driven filter
//!
//! Adapters own every language-specific rule (default visibility, naming
//! conventions, implicit modifiers). The stripper only ever sees resolved
//! values and never consults the source language.
//!
//! # Example
//!
//! ```rust,ignore
//! use distiller_ir::{AdapterRegistry, StripOptions, Stripper};
//!
//! let registry = AdapterRegistry::new();
//! let file = registry.lower(b"def f(x):\n    return x\n", "m.py")?;
//!
//! let signatures = Stripper::new(StripOptions::signatures()).strip(&file);
//! let full = Stripper::new(StripOptions::full()).strip(&file);
//! ```

pub mod adapters;
pub mod error;
pub mod invariants;
pub mod ir;
pub mod options;
mod registry;
pub mod stripper;

// Re-export core types for convenience
pub use ir::{
    // Leaf payloads
    Comment,
    CommentFormat,
    ErrorNode,
    // Members
    Field,
    // Root
    File,
    Function,
    Import,
    ImportKind,
    ImportedSymbol,
    // Language
    LanguageId,
    Location,
    Modifier,
    Modifiers,
    // Tree
    Node,
    NodeKind,
    Package,
    Parameter,
    Severity,
    TypeAlias,
    // Declarations
    TypeDecl,
    TypeParam,
    TypeRef,
    Visibility,
};

pub use adapters::LanguageAdapter;
pub use error::{IrError, Result};
pub use invariants::Violation;
pub use options::StripOptions;
pub use registry::AdapterRegistry;
pub use stripper::{strip, Stripper};
