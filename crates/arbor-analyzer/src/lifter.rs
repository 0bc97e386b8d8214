//! Cross-scope dependency lifting
//!
//! A reference between two symbols implies a dependency between the pair
//! of their ancestors that are siblings in the lowest common scope. Only
//! that direct sibling edge is added; transitivity is never pre-closed.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use arbor_core::{AnalysisError, ArtifactId, ArtifactTree, Result};

use crate::index::SymbolIndex;
use crate::input::Reference;

/// Lift every deferred cross-file reference into a sibling-level edge.
/// Targets that do not resolve inside the project are external and are
/// dropped. Returns the number of edges inserted.
pub fn lift_cross_scope(
    tree: &mut ArtifactTree,
    index: &SymbolIndex,
    references: &BTreeMap<ArtifactId, Vec<Reference>>,
) -> Result<usize> {
    let mut added = 0;
    for (source, refs) in references {
        for reference in refs {
            let Some(target) = index.resolve(&reference.target_file_path, &reference.target_range)
            else {
                continue;
            };
            if connect_reference(tree, *source, target)? {
                added += 1;
            }
        }
    }
    debug!(edges = added, "cross-scope dependencies lifted");
    Ok(added)
}

/// Insert the sibling-level edge implied by `source` depending on
/// `target` into their lowest common scope. Idempotent; returns whether a
/// new edge appeared.
pub(crate) fn connect_reference(
    tree: &mut ArtifactTree,
    source: ArtifactId,
    target: ArtifactId,
) -> Result<bool> {
    if source == target {
        return Ok(false);
    }

    let source_chain = tree.ancestors(source);
    let target_chain = tree.ancestors(target);
    let target_set: HashSet<ArtifactId> = target_chain.iter().copied().collect();

    let Some(source_pos) = source_chain.iter().position(|id| target_set.contains(id)) else {
        return Ok(false);
    };
    let scope = source_chain[source_pos];

    // One endpoint encloses the other: no sibling pair exists.
    if scope == source || scope == target {
        return Ok(false);
    }

    let target_pos = target_chain
        .iter()
        .position(|id| *id == scope)
        .ok_or_else(|| {
            AnalysisError::InternalInvariantViolation(
                "common scope absent from target ancestor chain".to_string(),
            )
        })?;

    let from = source_chain[source_pos - 1];
    let to = target_chain[target_pos - 1];
    Ok(tree.insert_edge_if_absent(scope, from, to)?.is_some())
}
