//! Arbor Analyzer — pipeline from a project folder to a laid-out
//! architecture model

pub mod builder;
pub mod export;
pub mod index;
pub mod input;
pub mod layout;
pub mod lifter;
pub mod metrics;
pub mod outline;
pub mod pipeline;
pub mod provider;
pub mod reader;
pub mod sorter;


#[cfg(test)]
pub mod test_utils;

pub use export::{export_tree, ArchitectureExport, ArtifactRecord, DependencyRecord};
pub use index::SymbolIndex;
pub use input::{CodeFile, CodeFolder, CodeSymbolData, ProjectLocation, Reference};
pub use layout::LayoutStyle;
pub use outline::OutlineProvider;
pub use pipeline::{
    AnalysisConfig, AnalysisController, AnalysisState, AnalysisStep, ArchitectureSnapshot,
    ArtifactFilter, Canceller,
};
pub use provider::SymbolProvider;
