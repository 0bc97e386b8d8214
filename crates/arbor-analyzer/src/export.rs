//! JSON export of the laid-out architecture

use serde::{Deserialize, Serialize};

use arbor_core::{ArtifactId, ArtifactTree, Rect};

/// Root export document handed to frontends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchitectureExport {
    pub project: String,
    pub root: ArtifactRecord,
}

/// One artifact in the export, parts nested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub id: u32,
    pub name: String,
    pub kind: String,
    pub lines_of_code: u32,
    pub component_rank: Option<u32>,
    pub scc_index: Option<u32>,
    pub is_in_a_cycle: bool,
    pub frame: Rect,
    pub content_frame: Rect,
    pub shows_parts: bool,
    /// Dependency edges between this artifact's parts.
    pub dependencies: Vec<DependencyRecord>,
    pub parts: Vec<ArtifactRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRecord {
    pub from: u32,
    pub to: u32,
}

/// Serialize the tree into nested records, children in sorted order.
pub fn export_tree(tree: &ArtifactTree) -> ArchitectureExport {
    ArchitectureExport {
        project: tree.artifact(tree.root()).name.clone(),
        root: record_for(tree, tree.root()),
    }
}

fn record_for(tree: &ArtifactTree, id: ArtifactId) -> ArtifactRecord {
    let artifact = tree.artifact(id);
    ArtifactRecord {
        id: id.0,
        name: artifact.name.clone(),
        kind: artifact.kind_label().to_string(),
        lines_of_code: artifact.metrics.lines_of_code,
        component_rank: artifact.metrics.component_rank,
        scc_index: artifact.metrics.scc_index_topologically_sorted,
        is_in_a_cycle: artifact.metrics.is_in_a_cycle,
        frame: artifact.metrics.frame_in_scope_content,
        content_frame: artifact.metrics.content_frame,
        shows_parts: artifact.metrics.shows_parts,
        dependencies: artifact
            .graph
            .edges()
            .into_iter()
            .map(|(from, to, _)| DependencyRecord {
                from: from.0,
                to: to.0,
            })
            .collect(),
        parts: artifact
            .children
            .iter()
            .map(|child| record_for(tree, *child))
            .collect(),
    }
}
