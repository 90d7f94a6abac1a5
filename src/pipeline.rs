//! Distillation pipeline
//!
//! Lower a file through the adapter registry, then strip it. Batch runs read
//! and distill files in parallel; each file is processed independently and
//! results come back in input order.

use crate::config::DistillConfig;
use crate::error::{DistillError, Result};
use distiller_ir::{AdapterRegistry, File, StripOptions, Stripper};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A file that could not be distilled
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: DistillError,
}

/// Outcome of a batch run, in input order
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Distilled trees of the files that succeeded
    pub files: Vec<File>,
    /// Files that failed (only populated with `continue_on_error`)
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Total number of files attempted
    pub fn total(&self) -> usize {
        self.files.len() + self.failures.len()
    }
}

/// Lowers and strips files under one configuration
pub struct Distiller {
    registry: AdapterRegistry,
    config: DistillConfig,
}

impl Distiller {
    /// Create a distiller with the built-in adapters
    pub fn new(config: DistillConfig) -> Self {
        Self::with_registry(AdapterRegistry::new(), config)
    }

    pub fn with_registry(registry: AdapterRegistry, config: DistillConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    pub fn options(&self) -> &StripOptions {
        &self.config.strip
    }

    pub fn config(&self) -> &DistillConfig {
        &self.config
    }

    /// Lower without stripping
    pub fn lower(&self, source: &[u8], filename: &str) -> Result<File> {
        let file = self.registry.lower(source, filename)?;
        for error in file.errors() {
            warn!(
                path = filename,
                line = error.location.start_line,
                code = error.code.as_deref().unwrap_or(""),
                "{}",
                error.message
            );
        }
        Ok(file)
    }

    /// Lower then strip under the configured options
    pub fn distill_source(&self, source: &[u8], filename: &str) -> Result<File> {
        let lowered = self.lower(source, filename)?;
        let distilled = Stripper::new(self.config.strip).strip(&lowered);
        debug!(
            path = filename,
            language = lowered.language.name(),
            nodes_in = lowered.count_nodes(),
            nodes_out = distilled.count_nodes(),
            "distilled"
        );
        Ok(distilled)
    }

    /// Several distillations of one parse
    pub fn distill_variants(&self, file: &File, variants: &[StripOptions]) -> Vec<File> {
        variants
            .iter()
            .map(|options| Stripper::new(*options).strip(file))
            .collect()
    }

    /// Read and distill one file from disk
    pub fn distill_path(&self, path: &Path) -> Result<File> {
        if !path.is_file() {
            return Err(DistillError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let source = std::fs::read(path)?;
        self.distill_source(&source, &path.to_string_lossy())
    }

    /// Distill many files in parallel
    ///
    /// Without `continue_on_error` the first failure (in input order) is
    /// returned and no trees are reported.
    pub fn distill_paths(&self, paths: &[PathBuf]) -> Result<BatchReport> {
        info!(
            files = paths.len(),
            workers = self.config.workers,
            "distilling batch"
        );

        let results = if self.config.workers > 0 {
            let pool = ThreadPoolBuilder::new()
                .num_threads(self.config.workers)
                .build()
                .map_err(|e| DistillError::invalid_config(format!("worker pool: {}", e)))?;
            pool.install(|| self.distill_all(paths))
        } else {
            self.distill_all(paths)
        };

        let mut report = BatchReport::default();
        for (path, result) in paths.iter().zip(results) {
            match result {
                Ok(file) => report.files.push(file),
                Err(error) if self.config.continue_on_error => {
                    warn!(path = %path.display(), "{}", error);
                    report.failures.push(FileFailure {
                        path: path.clone(),
                        error,
                    });
                }
                Err(error) => return Err(error.with_context(path.display().to_string())),
            }
        }

        info!(
            distilled = report.files.len(),
            failed = report.failures.len(),
            "batch complete"
        );
        Ok(report)
    }

    fn distill_all(&self, paths: &[PathBuf]) -> Vec<Result<File>> {
        paths
            .par_iter()
            .map(|path| self.distill_path(path))
            .collect()
    }
}

impl Default for Distiller {
    fn default() -> Self {
        Self::new(DistillConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use distiller_ir::{LanguageId, Node};
    use tempfile::TempDir;

    const PYTHON: &str = "\
import os

class Account:
    \"\"\"A bank account.\"\"\"

    def deposit(self, amount: int) -> None:
        self._balance += amount

    def _audit(self):
        pass
";

    fn names(file: &File) -> Vec<String> {
        file.walk()
            .filter_map(|node| node.name().map(str::to_string))
            .collect()
    }

    // ============================================================
    // Single file
    // ============================================================

    #[test]
    fn test_distill_source_defaults() {
        let distiller = Distiller::default();
        let file = distiller.distill_source(PYTHON.as_bytes(), "bank.py").unwrap();

        assert_eq!(file.language, LanguageId::Python);
        assert!(matches!(file.children()[0], Node::Import(_)));
        let names = names(&file);
        assert!(names.contains(&"deposit".to_string()));
        assert!(!names.contains(&"_audit".to_string()));

        let deposit = file
            .walk()
            .find_map(|node| match node {
                Node::Function(f) if f.name == "deposit" => Some(f),
                _ => None,
            })
            .unwrap();
        assert!(deposit.implementation.is_none());
    }

    #[test]
    fn test_distill_source_unsupported() {
        let distiller = Distiller::default();
        let err = distiller.distill_source(b"x", "notes.txt").unwrap_err();
        assert!(matches!(err, DistillError::Ir(_)));
    }

    #[test]
    fn test_distill_variants_share_one_parse() {
        let distiller = Distiller::default();
        let lowered = distiller.lower(PYTHON.as_bytes(), "bank.py").unwrap();
        let variants = distiller.distill_variants(
            &lowered,
            &[StripOptions::full(), StripOptions::signatures()],
        );

        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0], lowered);
        assert!(variants[1].count_nodes() < variants[0].count_nodes());
    }

    // ============================================================
    // Batch
    // ============================================================

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_distill_paths_preserves_order() {
        let dir = TempDir::new().unwrap();
        let paths: Vec<PathBuf> = (0..8)
            .map(|i| write(&dir, &format!("m{}.py", i), &format!("def f{}():\n    pass\n", i)))
            .collect();

        let distiller = Distiller::new(DistillConfig::default().with_workers(3));
        let report = distiller.distill_paths(&paths).unwrap();

        assert!(report.is_success());
        assert_eq!(report.total(), 8);
        for (i, file) in report.files.iter().enumerate() {
            assert!(file.path.ends_with(&format!("m{}.py", i)));
            assert_eq!(file.children()[0].name(), Some(format!("f{}", i).as_str()));
        }
    }

    #[test]
    fn test_distill_paths_stops_on_failure() {
        let dir = TempDir::new().unwrap();
        let good = write(&dir, "ok.rs", "pub fn ok() {}\n");
        let missing = dir.path().join("missing.rs");

        let distiller = Distiller::default();
        let err = distiller.distill_paths(&[good, missing]).unwrap_err();
        assert!(err.to_string().contains("missing.rs"));
    }

    #[test]
    fn test_distill_paths_collects_failures() {
        let dir = TempDir::new().unwrap();
        let good = write(&dir, "ok.rs", "pub fn ok() {}\n");
        let unsupported = write(&dir, "main.go", "package main\n");

        let distiller =
            Distiller::new(DistillConfig::default().with_continue_on_error(true));
        let report = distiller.distill_paths(&[unsupported.clone(), good]).unwrap();

        assert!(!report.is_success());
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, unsupported);
        assert!(matches!(report.failures[0].error, DistillError::Ir(_)));
    }

    #[test]
    fn test_syntax_errors_are_not_failures() {
        let dir = TempDir::new().unwrap();
        let broken = write(&dir, "broken.py", "def broken(:\n    pass\n");

        let report = Distiller::default().distill_paths(&[broken]).unwrap();
        assert!(report.is_success());
        assert!(report.files[0].has_errors());
    }
}
