//! code_distiller - source distillation for LLM context
//!
//! Lowers source files into the language-agnostic IR of `distiller_ir` and
//! strips them down to what a reader needs: public signatures by default,
//! more or less under configuration.
//!
//! # Architecture
//!
//! This crate follows the "Library-First" pattern:
//! - **lib.rs** (this file): configuration, logging setup and the pipeline
//! - **bin/distill.rs**: thin wrapper that parses flags and prints JSON
//! - **distiller-ir**: the IR, lowering adapters and the stripper
//!
//! # Example
//!
//! ```rust,ignore
//! use code_distiller::{DistillConfig, Distiller};
//!
//! let distiller = Distiller::new(DistillConfig::default());
//! let file = distiller.distill_source(b"pub fn f() -> u8 { 1 }", "lib.rs")?;
//! println!("{}", serde_json::to_string_pretty(&file)?);
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;

pub use config::{DistillConfig, DEFAULT_CONFIG_FILE};
pub use error::{DistillError, Result, ResultExt};
pub use pipeline::{BatchReport, Distiller, FileFailure};

// The IR crate is part of the public surface
pub use distiller_ir as ir;
pub use distiller_ir::{File, Node, StripOptions, Stripper};

/// Version of the code_distiller library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
