//! Arbor Core — artifact model, scope graphs, and the graph kernel

pub mod algo;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod model;
pub mod tree;

#[cfg(test)]
pub mod tests;

pub use algo::CondensationGraph;
pub use error::{AnalysisError, Result};
pub use geometry::{Point, Rect, Size};
pub use graph::ScopeGraph;
pub use model::{
    Artifact, ArtifactId, ArtifactPayload, EdgeId, Metrics, SourcePosition, SourceRange,
    SymbolKind,
};
pub use tree::ArtifactTree;
