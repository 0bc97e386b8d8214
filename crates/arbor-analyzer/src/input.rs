//! Input contracts consumed from external collaborators
//!
//! The reader produces the `CodeFolder` tree; a `SymbolProvider` fills in
//! symbols and references. The analyzer itself never touches the
//! filesystem or a language server beyond these types.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use arbor_core::{SourceRange, SymbolKind};

/// Where a project lives and which files count as code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectLocation {
    pub folder_path: PathBuf,
    /// File extensions (without the dot) treated as code.
    pub code_file_endings: BTreeSet<String>,
    pub language_id: String,
}

impl ProjectLocation {
    pub fn new(
        folder_path: impl Into<PathBuf>,
        code_file_endings: impl IntoIterator<Item = impl Into<String>>,
        language_id: impl Into<String>,
    ) -> Self {
        ProjectLocation {
            folder_path: folder_path.into(),
            code_file_endings: code_file_endings.into_iter().map(Into::into).collect(),
            language_id: language_id.into(),
        }
    }
}

/// A parsed folder: subfolders and code files, both in reader order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeFolder {
    pub name: String,
    pub subfolders: Vec<CodeFolder>,
    pub files: Vec<CodeFile>,
}

impl CodeFolder {
    /// Total number of code files in this folder and below.
    pub fn file_count(&self) -> usize {
        self.files.len()
            + self
                .subfolders
                .iter()
                .map(CodeFolder::file_count)
                .sum::<usize>()
    }
}

/// One code file: its text plus whatever symbol data retrieval produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeFile {
    pub name: String,
    /// Path relative to the project root; reference targets use the same
    /// representation.
    pub path: PathBuf,
    pub lines: Vec<String>,
    /// Top-level symbols, filled during the retrieval stage.
    pub symbols: Vec<CodeSymbolData>,
}

/// A symbol as reported by the provider, with nested children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeSymbolData {
    pub name: String,
    pub kind: SymbolKind,
    pub range: SourceRange,
    pub selection_range: SourceRange,
    pub children: Vec<CodeSymbolData>,
    /// References declared by this symbol, filled during retrieval.
    pub references: Option<Vec<Reference>>,
}

impl CodeSymbolData {
    pub fn new(name: impl Into<String>, kind: SymbolKind, range: SourceRange) -> Self {
        CodeSymbolData {
            name: name.into(),
            kind,
            range,
            selection_range: range,
            children: Vec::new(),
            references: None,
        }
    }
}

/// A reference from one symbol to another, identified by target location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub source_range: SourceRange,
    pub target_file_path: PathBuf,
    pub target_range: SourceRange,
}
