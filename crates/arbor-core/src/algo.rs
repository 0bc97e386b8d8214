//! Graph kernel: components, SCCs, condensation, transitive reduction
//!
//! All primitives are pure — they read a `ScopeGraph` and return fresh
//! structures. Everything that enumerates nodes does so in ascending id
//! order so results are a deterministic function of the graph.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use petgraph::algo::tarjan_scc;

use crate::graph::ScopeGraph;
use crate::model::ArtifactId;

impl ScopeGraph {
    /// Weakly-connected components.
    ///
    /// Each component is discovered by undirected BFS from the smallest
    /// unvisited id and its members are returned ascending. Components are
    /// ordered by descending total lines of code (via `loc_of`), ties
    /// broken by smallest member id.
    pub fn find_components(&self, loc_of: &dyn Fn(ArtifactId) -> u64) -> Vec<Vec<ArtifactId>> {
        let mut visited: HashSet<ArtifactId> = HashSet::new();
        let mut components: Vec<Vec<ArtifactId>> = Vec::new();

        for start in self.node_ids() {
            if visited.contains(&start) {
                continue;
            }
            let mut members = Vec::new();
            let mut queue = VecDeque::new();
            visited.insert(start);
            queue.push_back(start);
            while let Some(id) = queue.pop_front() {
                members.push(id);
                for neighbor in self.neighbors_undirected(id) {
                    if visited.insert(neighbor) {
                        queue.push_back(neighbor);
                    }
                }
            }
            members.sort();
            components.push(members);
        }

        components.sort_by_key(|members| {
            let total: u64 = members.iter().map(|id| loc_of(*id)).sum();
            // members is non-empty and sorted, so [0] is the smallest id.
            (std::cmp::Reverse(total), members[0])
        });
        components
    }

    /// Induced subgraph over `node_ids`, preserving edge ids.
    pub fn subgraph(&self, node_ids: &BTreeSet<ArtifactId>) -> ScopeGraph {
        let mut sub = ScopeGraph::new();
        for id in node_ids {
            if self.contains_node(*id) {
                // Fresh graph, ids unique: registration cannot fail.
                let _ = sub.add_node(*id);
            }
        }
        for (from, to, edge) in self.edges() {
            if node_ids.contains(&from) && node_ids.contains(&to) {
                let _ = sub.add_edge(from, to, edge);
            }
        }
        sub
    }

    /// Strongly-connected components via Tarjan. Members of each SCC are
    /// ascending; the list is ordered by smallest member id.
    pub fn strongly_connected_components(&self) -> Vec<Vec<ArtifactId>> {
        let inner = self.petgraph();
        let mut sccs: Vec<Vec<ArtifactId>> = tarjan_scc(inner)
            .into_iter()
            .map(|group| {
                let mut members: Vec<ArtifactId> = group.into_iter().map(|n| inner[n]).collect();
                members.sort();
                members
            })
            .collect();
        sccs.sort_by_key(|members| members[0]);
        sccs
    }

    /// The condensation DAG over this graph's SCCs. Each condensation node
    /// carries the sorted ids of its members; duplicate boundary edges are
    /// merged.
    pub fn condensation(&self) -> CondensationGraph {
        let groups = self.strongly_connected_components();
        let mut scc_of: HashMap<ArtifactId, usize> = HashMap::new();
        for (index, members) in groups.iter().enumerate() {
            for id in members {
                scc_of.insert(*id, index);
            }
        }

        let mut edges: BTreeSet<(usize, usize)> = BTreeSet::new();
        for (from, to, _) in self.edges() {
            let a = scc_of[&from];
            let b = scc_of[&to];
            if a != b {
                edges.insert((a, b));
            }
        }

        CondensationGraph {
            groups,
            edges,
            scc_of,
        }
    }
}

/// DAG whose nodes are the SCCs of a scope graph.
#[derive(Debug, Clone)]
pub struct CondensationGraph {
    groups: Vec<Vec<ArtifactId>>,
    edges: BTreeSet<(usize, usize)>,
    scc_of: HashMap<ArtifactId, usize>,
}

impl CondensationGraph {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Member artifact ids of an SCC, ascending.
    pub fn members(&self, scc: usize) -> &[ArtifactId] {
        &self.groups[scc]
    }

    /// The SCC a given artifact belongs to.
    pub fn scc_of(&self, id: ArtifactId) -> Option<usize> {
        self.scc_of.get(&id).copied()
    }

    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.edges.iter().copied()
    }

    pub fn contains_edge(&self, from: usize, to: usize) -> bool {
        self.edges.contains(&(from, to))
    }

    /// For every SCC, the number of distinct SCCs that can reach it
    /// (transitive predecessors, exclusive). Ascending ancestor count is a
    /// linear extension of the DAG.
    pub fn ancestor_counts(&self) -> Vec<usize> {
        let order = self.topological_order();
        let mut ancestors: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); self.groups.len()];
        let incoming = self.incoming_adjacency();
        for &node in &order {
            let mut set = BTreeSet::new();
            for &pred in &incoming[node] {
                set.insert(pred);
                set.extend(ancestors[pred].iter().copied());
            }
            ancestors[node] = set;
        }
        ancestors.into_iter().map(|set| set.len()).collect()
    }

    /// The unique edge-minimal DAG with the same reachability relation.
    /// An edge `u -> v` survives iff no alternate path `u -> … -> v` of
    /// length ≥ 2 exists.
    pub fn transitive_reduction(&self) -> BTreeSet<(usize, usize)> {
        let order = self.topological_order();
        let outgoing = self.outgoing_adjacency();

        // Reachability sets, accumulated in reverse topological order:
        // reach[u] = successors of u plus everything they reach.
        let mut reach: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); self.groups.len()];
        for &node in order.iter().rev() {
            let mut set = BTreeSet::new();
            for &succ in &outgoing[node] {
                set.insert(succ);
                set.extend(reach[succ].iter().copied());
            }
            reach[node] = set;
        }

        let mut kept = BTreeSet::new();
        for &(u, v) in &self.edges {
            let redundant = outgoing[u]
                .iter()
                .any(|&w| w != v && reach[w].contains(&v));
            if !redundant {
                kept.insert((u, v));
            }
        }
        kept
    }

    /// Kahn's algorithm with a smallest-index-first ready set.
    fn topological_order(&self) -> Vec<usize> {
        let outgoing = self.outgoing_adjacency();
        let mut in_degree = vec![0usize; self.groups.len()];
        for &(_, to) in &self.edges {
            in_degree[to] += 1;
        }

        let mut ready: BTreeSet<usize> = (0..self.groups.len())
            .filter(|&n| in_degree[n] == 0)
            .collect();
        let mut order = Vec::with_capacity(self.groups.len());
        while let Some(&node) = ready.iter().next() {
            ready.remove(&node);
            order.push(node);
            for &succ in &outgoing[node] {
                in_degree[succ] -= 1;
                if in_degree[succ] == 0 {
                    ready.insert(succ);
                }
            }
        }
        order
    }

    fn outgoing_adjacency(&self) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); self.groups.len()];
        for &(from, to) in &self.edges {
            adjacency[from].push(to);
        }
        adjacency
    }

    fn incoming_adjacency(&self) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); self.groups.len()];
        for &(from, to) in &self.edges {
            adjacency[to].push(from);
        }
        adjacency
    }
}
