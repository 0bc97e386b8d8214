//! Core data structures for the artifact tree

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::graph::ScopeGraph;

/// Unique, stable identifier for an artifact. Index into the tree's arena.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct ArtifactId(pub u32);

/// Unique edge identifier, stable across subgraph extraction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct EdgeId(pub u64);

/// Discriminates what kind of code entity a symbol represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    Function,
    Method,
    Class,
    Struct,
    Enum,
    Interface,
    Module,
    Namespace,
    Variable,
    Constant,
    Property,
    TypeAlias,
    Unknown,
}

/// A line/column position in a source file. Zero-based.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct SourcePosition {
    pub line: u32,
    pub column: u32,
}

impl SourcePosition {
    pub fn new(line: u32, column: u32) -> Self {
        SourcePosition { line, column }
    }
}

/// An inclusive start/end span in a source file.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct SourceRange {
    pub start: SourcePosition,
    pub end: SourcePosition,
}

impl SourceRange {
    pub fn new(start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        SourceRange {
            start: SourcePosition::new(start_line, start_column),
            end: SourcePosition::new(end_line, end_column),
        }
    }

    /// Number of source lines the range spans.
    pub fn line_span(&self) -> u32 {
        self.end.line.saturating_sub(self.start.line) + 1
    }
}

/// Per-artifact analysis metrics plus the layout results written by the
/// treemap layouter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Metrics {
    pub lines_of_code: u32,
    /// Index of the artifact's weakly-connected component, 0 = largest.
    pub component_rank: Option<u32>,
    /// Topological rank of the artifact's SCC within its component.
    pub scc_index_topologically_sorted: Option<u32>,
    pub is_in_a_cycle: bool,
    /// Rectangle in the coordinates of the enclosing scope's content frame.
    pub frame_in_scope_content: Rect,
    /// Inner rectangle, in the artifact's own coordinates, where parts live.
    pub content_frame: Rect,
    /// Whether the artifact's parts fit and were laid out.
    pub shows_parts: bool,
}

/// Variant data distinguishing folders, files, and symbols.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactPayload {
    Folder,
    File {
        lines: Vec<String>,
    },
    Symbol {
        kind: SymbolKind,
        range: SourceRange,
        selection_range: SourceRange,
        /// Source slice extracted for the symbol, when available.
        code: Option<String>,
    },
}

/// A node in the artifact tree: a folder, file, or symbol.
///
/// The enclosing scope is recorded as a parent id, never an owning
/// reference; ownership runs root-downward through the arena.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub id: ArtifactId,
    pub parent: Option<ArtifactId>,
    pub name: String,
    pub payload: ArtifactPayload,
    /// Child artifacts in insertion order. The sorter reorders this list.
    pub children: Vec<ArtifactId>,
    /// Dependency graph over the children of this artifact.
    pub graph: ScopeGraph,
    pub metrics: Metrics,
}

impl Artifact {
    pub fn is_folder(&self) -> bool {
        matches!(self.payload, ArtifactPayload::Folder)
    }

    pub fn is_file(&self) -> bool {
        matches!(self.payload, ArtifactPayload::File { .. })
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self.payload, ArtifactPayload::Symbol { .. })
    }

    /// Short tag for logs and exports.
    pub fn kind_label(&self) -> &'static str {
        match &self.payload {
            ArtifactPayload::Folder => "folder",
            ArtifactPayload::File { .. } => "file",
            ArtifactPayload::Symbol { .. } => "symbol",
        }
    }
}
