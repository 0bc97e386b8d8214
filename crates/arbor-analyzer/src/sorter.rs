//! Deterministic child ordering from metrics

use std::cmp::Reverse;

use arbor_core::{Artifact, ArtifactId, ArtifactTree};

type SortKey = (u32, u32, Reverse<u32>, String, ArtifactId);

/// Reorder every scope's children: ascending component rank, ascending
/// SCC topological index, descending lines of code, then name and id.
/// A total order, so applying it twice changes nothing.
pub fn sort_children(tree: &mut ArtifactTree) {
    for scope in tree.pre_order() {
        let mut keyed: Vec<(SortKey, ArtifactId)> = tree
            .artifact(scope)
            .children
            .iter()
            .map(|child| (sort_key(tree.artifact(*child)), *child))
            .collect();
        keyed.sort();
        tree.artifact_mut(scope).children = keyed.into_iter().map(|(_, id)| id).collect();
    }
}

fn sort_key(artifact: &Artifact) -> SortKey {
    (
        artifact.metrics.component_rank.unwrap_or(u32::MAX),
        artifact
            .metrics
            .scc_index_topologically_sorted
            .unwrap_or(u32::MAX),
        Reverse(artifact.metrics.lines_of_code),
        artifact.name.clone(),
        artifact.id,
    )
}
