//! Metric computation and redundant-edge pruning

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use arbor_core::{AnalysisError, ArtifactId, ArtifactPayload, ArtifactTree, Result};

/// Fill `lines_of_code` bottom-up: leaf symbols take their line span,
/// symbol-free files their raw line count, and every non-leaf the sum of
/// its children.
pub fn compute_lines_of_code(tree: &mut ArtifactTree) {
    for id in tree.post_order() {
        let artifact = tree.artifact(id);
        let loc = if artifact.children.is_empty() {
            match &artifact.payload {
                ArtifactPayload::File { lines } => lines.len() as u32,
                ArtifactPayload::Symbol { range, .. } => range.line_span(),
                ArtifactPayload::Folder => 0,
            }
        } else {
            artifact
                .children
                .iter()
                .map(|child| tree.artifact(*child).metrics.lines_of_code)
                .sum()
        };
        tree.artifact_mut(id).metrics.lines_of_code = loc;
    }
}

/// Write component ranks, SCC topological indices, and cycle flags, and
/// remove edges redundant under transitive reduction. Post-order over
/// every scope; idempotent.
pub fn prune_and_rank(tree: &mut ArtifactTree) -> Result<()> {
    let mut removed = 0;
    for scope in tree.post_order() {
        if tree.artifact(scope).children.is_empty() {
            continue;
        }
        removed += prune_scope(tree, scope)?;
    }
    debug!(edges = removed, "pruned redundant dependencies");
    Ok(())
}

fn prune_scope(tree: &mut ArtifactTree, scope: ArtifactId) -> Result<usize> {
    // Work against a snapshot of the graph; mutations apply at the end.
    let graph = tree.artifact(scope).graph.clone();
    let loc: BTreeMap<ArtifactId, u64> = graph
        .node_ids()
        .into_iter()
        .map(|id| (id, tree.artifact(id).metrics.lines_of_code as u64))
        .collect();
    let components = graph.find_components(&|id| loc.get(&id).copied().unwrap_or(0));

    let mut removals: Vec<(ArtifactId, ArtifactId)> = Vec::new();
    for (rank, members) in components.iter().enumerate() {
        for id in members {
            tree.artifact_mut(*id).metrics.component_rank = Some(rank as u32);
        }

        let member_set: BTreeSet<ArtifactId> = members.iter().copied().collect();
        let sub = graph.subgraph(&member_set);
        let cond = sub.condensation();
        let counts = cond.ancestor_counts();

        // Topological numbering: ascending ancestor count, ties broken by
        // the smallest member id of the SCC.
        let mut scc_order: Vec<usize> = (0..cond.len()).collect();
        scc_order.sort_by_key(|&scc| (counts[scc], cond.members(scc)[0]));
        let mut topo_of = vec![0u32; cond.len()];
        for (position, &scc) in scc_order.iter().enumerate() {
            topo_of[scc] = position as u32;
        }

        for scc in 0..cond.len() {
            let cyclic = cond.members(scc).len() > 1;
            for id in cond.members(scc) {
                let metrics = &mut tree.artifact_mut(*id).metrics;
                metrics.scc_index_topologically_sorted = Some(topo_of[scc]);
                metrics.is_in_a_cycle = cyclic;
            }
        }

        let reduction = cond.transitive_reduction();
        for (from, to, _) in sub.edges() {
            let (Some(a), Some(b)) = (cond.scc_of(from), cond.scc_of(to)) else {
                return Err(AnalysisError::InternalInvariantViolation(format!(
                    "edge endpoint without SCC assignment in scope {:?}",
                    tree.artifact(scope).name
                )));
            };
            if a != b && !reduction.contains(&(a, b)) {
                removals.push((from, to));
            }
        }
    }

    for id in graph.node_ids() {
        if tree
            .artifact(id)
            .metrics
            .scc_index_topologically_sorted
            .is_none()
        {
            return Err(AnalysisError::InternalInvariantViolation(format!(
                "artifact {:?} missing SCC index after ranking",
                tree.artifact(id).name
            )));
        }
    }

    let removed = removals.len();
    for (from, to) in removals {
        tree.artifact_mut(scope).graph.remove_edge(from, to);
    }
    Ok(removed)
}
