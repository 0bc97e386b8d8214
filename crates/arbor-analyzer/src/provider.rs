//! Symbol provider seam for language-protocol clients

use std::path::Path;

use arbor_core::Result;

use crate::input::{CodeSymbolData, Reference};

/// Supplies symbol outlines and reference lists for code files.
///
/// Mirrors the surface of a language-protocol server: one connect call,
/// then per-file symbol requests and per-symbol reference requests. The
/// pipeline serializes access and treats failures as non-fatal — after
/// repeated failures it stops asking and continues with partial data.
#[async_trait::async_trait]
pub trait SymbolProvider: Send + Sync {
    /// Establish the session. Called once before any retrieval.
    async fn connect(&self) -> Result<()>;

    /// Top-level symbols (with nested children) for one file.
    async fn symbols(&self, path: &Path, lines: &[String]) -> Result<Vec<CodeSymbolData>>;

    /// References declared by one symbol.
    async fn references(&self, path: &Path, symbol: &CodeSymbolData) -> Result<Vec<Reference>>;
}
