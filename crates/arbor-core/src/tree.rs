//! Arena-backed artifact tree
//!
//! All artifacts live in one contiguous arena and reference each other by
//! `ArtifactId` (index). Traversals use explicit work stacks so deeply
//! nested symbol trees cannot exhaust the call stack.

use crate::error::{AnalysisError, Result};
use crate::graph::ScopeGraph;
use crate::model::{
    Artifact, ArtifactId, ArtifactPayload, EdgeId, Metrics, SourceRange, SymbolKind,
};

/// The artifact hierarchy of one analyzed project, rooted at a folder.
#[derive(Debug, Clone)]
pub struct ArtifactTree {
    arena: Vec<Artifact>,
    root: ArtifactId,
    next_edge: u64,
}

impl ArtifactTree {
    /// Create a tree containing only the root folder.
    pub fn new(root_name: impl Into<String>) -> Self {
        let root = ArtifactId(0);
        let artifact = Artifact {
            id: root,
            parent: None,
            name: root_name.into(),
            payload: ArtifactPayload::Folder,
            children: Vec::new(),
            graph: ScopeGraph::new(),
            metrics: Metrics::default(),
        };
        ArtifactTree {
            arena: vec![artifact],
            root,
            next_edge: 0,
        }
    }

    pub fn root(&self) -> ArtifactId {
        self.root
    }

    /// Number of artifacts in the tree.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// O(1) lookup. Ids are minted by this tree and always valid.
    pub fn artifact(&self, id: ArtifactId) -> &Artifact {
        &self.arena[id.0 as usize]
    }

    pub fn artifact_mut(&mut self, id: ArtifactId) -> &mut Artifact {
        &mut self.arena[id.0 as usize]
    }

    /// Add a subfolder under a folder scope.
    pub fn add_folder(&mut self, parent: ArtifactId, name: impl Into<String>) -> Result<ArtifactId> {
        let name = name.into();
        if !self.artifact(parent).is_folder() {
            return Err(AnalysisError::InvalidGraphMutation(format!(
                "folder {name:?} must be created under a folder scope"
            )));
        }
        self.reject_duplicate_entry(parent, &name)?;
        self.attach(parent, name, ArtifactPayload::Folder)
    }

    /// Add a file under a folder scope.
    pub fn add_file(
        &mut self,
        parent: ArtifactId,
        name: impl Into<String>,
        lines: Vec<String>,
    ) -> Result<ArtifactId> {
        let name = name.into();
        if !self.artifact(parent).is_folder() {
            return Err(AnalysisError::InvalidGraphMutation(format!(
                "file {name:?} must be created under a folder scope"
            )));
        }
        self.reject_duplicate_entry(parent, &name)?;
        self.attach(parent, name, ArtifactPayload::File { lines })
    }

    /// Add a symbol under a file or symbol scope. Symbols may share names
    /// (overloads); they are keyed by id.
    pub fn add_symbol(
        &mut self,
        parent: ArtifactId,
        name: impl Into<String>,
        kind: SymbolKind,
        range: SourceRange,
        selection_range: SourceRange,
        code: Option<String>,
    ) -> Result<ArtifactId> {
        let name = name.into();
        if self.artifact(parent).is_folder() {
            return Err(AnalysisError::InvalidGraphMutation(format!(
                "symbol {name:?} must be created under a file or symbol scope"
            )));
        }
        self.attach(
            parent,
            name,
            ArtifactPayload::Symbol {
                kind,
                range,
                selection_range,
                code,
            },
        )
    }

    /// Folder entries are keyed by name; a second child with the same name
    /// would silently shadow the first, so it is rejected instead.
    fn reject_duplicate_entry(&self, parent: ArtifactId, name: &str) -> Result<()> {
        let scope = self.artifact(parent);
        if scope
            .children
            .iter()
            .any(|child| self.artifact(*child).name == name)
        {
            return Err(AnalysisError::InvalidGraphMutation(format!(
                "duplicate child {name:?} in scope {:?}",
                scope.name
            )));
        }
        Ok(())
    }

    fn attach(
        &mut self,
        parent: ArtifactId,
        name: String,
        payload: ArtifactPayload,
    ) -> Result<ArtifactId> {
        let id = ArtifactId(self.arena.len() as u32);
        self.arena.push(Artifact {
            id,
            parent: Some(parent),
            name,
            payload,
            children: Vec::new(),
            graph: ScopeGraph::new(),
            metrics: Metrics::default(),
        });
        let scope = self.artifact_mut(parent);
        scope.children.push(id);
        scope.graph.add_node(id)?;
        Ok(id)
    }

    /// Insert a dependency edge into a scope's graph. Both endpoints must
    /// be direct children of the scope; self-edges and duplicates fail.
    pub fn insert_edge(
        &mut self,
        scope: ArtifactId,
        from: ArtifactId,
        to: ArtifactId,
    ) -> Result<EdgeId> {
        let edge = EdgeId(self.next_edge);
        self.artifact_mut(scope).graph.add_edge(from, to, edge)?;
        self.next_edge += 1;
        Ok(edge)
    }

    /// Idempotent edge insertion for the lifter: an existing edge is a
    /// no-op, reported as `None`.
    pub fn insert_edge_if_absent(
        &mut self,
        scope: ArtifactId,
        from: ArtifactId,
        to: ArtifactId,
    ) -> Result<Option<EdgeId>> {
        if self.artifact(scope).graph.has_edge(from, to) {
            return Ok(None);
        }
        self.insert_edge(scope, from, to).map(Some)
    }

    /// The chain from `id` up to the root, inclusive on both ends.
    pub fn ancestors(&self, id: ArtifactId) -> Vec<ArtifactId> {
        let mut chain = vec![id];
        let mut current = id;
        while let Some(parent) = self.artifact(current).parent {
            chain.push(parent);
            current = parent;
        }
        chain
    }

    /// Pre-order traversal (scope before its parts), explicit stack.
    pub fn pre_order(&self) -> Vec<ArtifactId> {
        let mut order = Vec::with_capacity(self.arena.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            for child in self.artifact(id).children.iter().rev() {
                stack.push(*child);
            }
        }
        order
    }

    /// Post-order traversal (parts before their scope), explicit stack.
    pub fn post_order(&self) -> Vec<ArtifactId> {
        let mut order = Vec::with_capacity(self.arena.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            for child in &self.artifact(id).children {
                stack.push(*child);
            }
        }
        order.reverse();
        order
    }
}
