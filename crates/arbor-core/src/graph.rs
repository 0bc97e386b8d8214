//! Per-scope dependency graph backed by petgraph::StableDiGraph

use std::collections::HashMap;

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Direction;

use crate::error::{AnalysisError, Result};
use crate::model::{ArtifactId, EdgeId};

/// A scope's dependency graph — directed, at most one edge per ordered
/// pair, self-loops rejected. Node identities are artifact ids.
#[derive(Clone, Default)]
pub struct ScopeGraph {
    inner: StableDiGraph<ArtifactId, EdgeId>,
    indices: HashMap<ArtifactId, NodeIndex>,
}

impl std::fmt::Debug for ScopeGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeGraph")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl ScopeGraph {
    pub fn new() -> Self {
        ScopeGraph::default()
    }

    /// Register an artifact as a node. A duplicate registration is a
    /// programmer error.
    pub fn add_node(&mut self, id: ArtifactId) -> Result<()> {
        if self.indices.contains_key(&id) {
            return Err(AnalysisError::InvalidGraphMutation(format!(
                "node {id:?} already present in scope graph"
            )));
        }
        let idx = self.inner.add_node(id);
        self.indices.insert(id, idx);
        Ok(())
    }

    pub fn contains_node(&self, id: ArtifactId) -> bool {
        self.indices.contains_key(&id)
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// All node ids, ascending.
    pub fn node_ids(&self) -> Vec<ArtifactId> {
        let mut ids: Vec<ArtifactId> = self.indices.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Insert a dependency edge. Self-loops, unknown endpoints, and
    /// duplicate pairs are rejected with `InvalidGraphMutation`.
    pub fn add_edge(&mut self, from: ArtifactId, to: ArtifactId, edge: EdgeId) -> Result<()> {
        if from == to {
            return Err(AnalysisError::InvalidGraphMutation(format!(
                "self-dependency on {from:?}"
            )));
        }
        let (a, b) = match (self.indices.get(&from), self.indices.get(&to)) {
            (Some(a), Some(b)) => (*a, *b),
            _ => {
                return Err(AnalysisError::InvalidGraphMutation(format!(
                    "edge endpoints {from:?} -> {to:?} not both in scope graph"
                )))
            }
        };
        if self.inner.find_edge(a, b).is_some() {
            return Err(AnalysisError::InvalidGraphMutation(format!(
                "duplicate edge {from:?} -> {to:?}"
            )));
        }
        self.inner.add_edge(a, b, edge);
        Ok(())
    }

    pub fn has_edge(&self, from: ArtifactId, to: ArtifactId) -> bool {
        self.edge_between(from, to).is_some()
    }

    /// The edge id for `from -> to`, if such an edge exists.
    pub fn edge_between(&self, from: ArtifactId, to: ArtifactId) -> Option<EdgeId> {
        let a = self.indices.get(&from)?;
        let b = self.indices.get(&to)?;
        let idx = self.inner.find_edge(*a, *b)?;
        self.inner.edge_weight(idx).copied()
    }

    /// All edges as `(from, to, id)`, sorted by the endpoint pair.
    pub fn edges(&self) -> Vec<(ArtifactId, ArtifactId, EdgeId)> {
        let mut out: Vec<(ArtifactId, ArtifactId, EdgeId)> = self
            .inner
            .edge_references()
            .map(|e| (self.inner[e.source()], self.inner[e.target()], *e.weight()))
            .collect();
        out.sort();
        out
    }

    /// Remove the edge `from -> to`, returning its id if it existed.
    pub fn remove_edge(&mut self, from: ArtifactId, to: ArtifactId) -> Option<EdgeId> {
        let a = self.indices.get(&from)?;
        let b = self.indices.get(&to)?;
        let idx = self.inner.find_edge(*a, *b)?;
        self.inner.remove_edge(idx)
    }

    /// Direct successors of a node, ascending.
    pub fn successors(&self, id: ArtifactId) -> Vec<ArtifactId> {
        self.neighbors_directed(id, Direction::Outgoing)
    }

    /// Direct predecessors of a node, ascending.
    pub fn predecessors(&self, id: ArtifactId) -> Vec<ArtifactId> {
        self.neighbors_directed(id, Direction::Incoming)
    }

    fn neighbors_directed(&self, id: ArtifactId, dir: Direction) -> Vec<ArtifactId> {
        let Some(idx) = self.indices.get(&id) else {
            return Vec::new();
        };
        let mut out: Vec<ArtifactId> = self
            .inner
            .neighbors_directed(*idx, dir)
            .map(|n| self.inner[n])
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Neighbors ignoring edge direction, ascending. Used by the
    /// weakly-connected component search.
    pub(crate) fn neighbors_undirected(&self, id: ArtifactId) -> Vec<ArtifactId> {
        let Some(idx) = self.indices.get(&id) else {
            return Vec::new();
        };
        let mut out: Vec<ArtifactId> = self
            .inner
            .neighbors_undirected(*idx)
            .map(|n| self.inner[n])
            .collect();
        out.sort();
        out.dedup();
        out
    }

    pub(crate) fn petgraph(&self) -> &StableDiGraph<ArtifactId, EdgeId> {
        &self.inner
    }
}
