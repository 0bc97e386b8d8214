//! Unit tests for the arbor-core module

use std::collections::BTreeSet;

use crate::*;

fn line_range(start: u32, end: u32) -> SourceRange {
    SourceRange::new(start, 0, end, 0)
}

/// Build a tree with one folder, one file, and `n` sibling symbols in the
/// file, returning the tree plus the symbol ids.
fn file_with_symbols(n: u32) -> (ArtifactTree, ArtifactId, Vec<ArtifactId>) {
    let mut tree = ArtifactTree::new("root");
    let file = tree
        .add_file(tree.root(), "lib.rs", vec!["line".to_string(); 10])
        .unwrap();
    let symbols = (0..n)
        .map(|i| {
            tree.add_symbol(
                file,
                format!("sym{i}"),
                SymbolKind::Function,
                line_range(i, i),
                line_range(i, i),
                None,
            )
            .unwrap()
        })
        .collect();
    (tree, file, symbols)
}

#[test]
fn test_tree_construction() {
    let mut tree = ArtifactTree::new("project");
    let src = tree.add_folder(tree.root(), "src").unwrap();
    let file = tree.add_file(src, "main.rs", vec!["fn main() {}".into()]).unwrap();
    let symbol = tree
        .add_symbol(
            file,
            "main",
            SymbolKind::Function,
            line_range(0, 0),
            line_range(0, 0),
            None,
        )
        .unwrap();

    assert_eq!(tree.len(), 4);
    assert_eq!(tree.artifact(symbol).parent, Some(file));
    assert_eq!(tree.artifact(file).parent, Some(src));
    assert_eq!(tree.ancestors(symbol), vec![symbol, file, src, tree.root()]);

    // Each scope's graph holds exactly its children.
    assert_eq!(tree.artifact(src).graph.node_ids(), vec![file]);
    assert_eq!(tree.artifact(file).graph.node_ids(), vec![symbol]);
}

#[test]
fn test_invalid_parent_scopes_rejected() {
    let mut tree = ArtifactTree::new("project");
    let file = tree.add_file(tree.root(), "a.rs", Vec::new()).unwrap();

    assert!(tree.add_folder(file, "nested").is_err());
    assert!(tree.add_file(file, "b.rs", Vec::new()).is_err());
    assert!(tree
        .add_symbol(
            tree.root(),
            "loose",
            SymbolKind::Function,
            line_range(0, 0),
            line_range(0, 0),
            None,
        )
        .is_err());
}

#[test]
fn test_duplicate_folder_entry_rejected() {
    let mut tree = ArtifactTree::new("project");
    tree.add_file(tree.root(), "a.rs", Vec::new()).unwrap();
    let err = tree.add_file(tree.root(), "a.rs", Vec::new());
    assert!(matches!(err, Err(AnalysisError::InvalidGraphMutation(_))));
}

#[test]
fn test_self_edge_and_duplicate_edge_rejected() {
    let (mut tree, file, symbols) = file_with_symbols(2);

    assert!(matches!(
        tree.insert_edge(file, symbols[0], symbols[0]),
        Err(AnalysisError::InvalidGraphMutation(_))
    ));

    tree.insert_edge(file, symbols[0], symbols[1]).unwrap();
    assert!(matches!(
        tree.insert_edge(file, symbols[0], symbols[1]),
        Err(AnalysisError::InvalidGraphMutation(_))
    ));

    // The idempotent variant reports a duplicate as None.
    let inserted = tree.insert_edge_if_absent(file, symbols[0], symbols[1]).unwrap();
    assert!(inserted.is_none());
}

#[test]
fn test_traversal_orders() {
    let mut tree = ArtifactTree::new("project");
    let a = tree.add_folder(tree.root(), "a").unwrap();
    let b = tree.add_folder(tree.root(), "b").unwrap();
    let a1 = tree.add_file(a, "a1.rs", Vec::new()).unwrap();
    let a2 = tree.add_file(a, "a2.rs", Vec::new()).unwrap();

    assert_eq!(tree.pre_order(), vec![tree.root(), a, a1, a2, b]);
    assert_eq!(tree.post_order(), vec![a1, a2, a, b, tree.root()]);
}

#[test]
fn test_find_components_ordering() {
    // Two components: {0,1} connected, {2} isolated, ranked by total LoC.
    let (mut tree, file, symbols) = file_with_symbols(3);
    tree.insert_edge(file, symbols[0], symbols[1]).unwrap();

    tree.artifact_mut(symbols[0]).metrics.lines_of_code = 10;
    tree.artifact_mut(symbols[1]).metrics.lines_of_code = 10;
    tree.artifact_mut(symbols[2]).metrics.lines_of_code = 100;

    let graph = tree.artifact(file).graph.clone();
    let loc = |id: ArtifactId| tree.artifact(id).metrics.lines_of_code as u64;
    let components = graph.find_components(&loc);

    assert_eq!(components.len(), 2);
    assert_eq!(components[0], vec![symbols[2]]);
    assert_eq!(components[1], vec![symbols[0], symbols[1]]);
}

#[test]
fn test_component_tie_broken_by_smallest_id() {
    let (mut tree, file, symbols) = file_with_symbols(2);
    tree.artifact_mut(symbols[0]).metrics.lines_of_code = 5;
    tree.artifact_mut(symbols[1]).metrics.lines_of_code = 5;

    let graph = tree.artifact(file).graph.clone();
    let loc = |id: ArtifactId| tree.artifact(id).metrics.lines_of_code as u64;
    let components = graph.find_components(&loc);

    assert_eq!(components[0], vec![symbols[0]]);
    assert_eq!(components[1], vec![symbols[1]]);
}

#[test]
fn test_subgraph_preserves_edge_ids() {
    let (mut tree, file, symbols) = file_with_symbols(3);
    let kept = tree.insert_edge(file, symbols[0], symbols[1]).unwrap();
    tree.insert_edge(file, symbols[1], symbols[2]).unwrap();

    let wanted: BTreeSet<ArtifactId> = [symbols[0], symbols[1]].into_iter().collect();
    let sub = tree.artifact(file).graph.subgraph(&wanted);

    assert_eq!(sub.node_count(), 2);
    assert_eq!(sub.edges(), vec![(symbols[0], symbols[1], kept)]);
}

#[test]
fn test_scc_detects_mutual_recursion() {
    let (mut tree, file, symbols) = file_with_symbols(3);
    tree.insert_edge(file, symbols[0], symbols[1]).unwrap();
    tree.insert_edge(file, symbols[1], symbols[0]).unwrap();
    tree.insert_edge(file, symbols[1], symbols[2]).unwrap();

    let sccs = tree.artifact(file).graph.strongly_connected_components();
    assert_eq!(sccs.len(), 2);
    assert_eq!(sccs[0], vec![symbols[0], symbols[1]]);
    assert_eq!(sccs[1], vec![symbols[2]]);
}

#[test]
fn test_condensation_merges_boundary_edges() {
    let (mut tree, file, symbols) = file_with_symbols(4);
    // {0,1} form a cycle; both members point at 2; 2 points at 3.
    tree.insert_edge(file, symbols[0], symbols[1]).unwrap();
    tree.insert_edge(file, symbols[1], symbols[0]).unwrap();
    tree.insert_edge(file, symbols[0], symbols[2]).unwrap();
    tree.insert_edge(file, symbols[1], symbols[2]).unwrap();
    tree.insert_edge(file, symbols[2], symbols[3]).unwrap();

    let cond = tree.artifact(file).graph.condensation();
    assert_eq!(cond.len(), 3);
    let cycle_scc = cond.scc_of(symbols[0]).unwrap();
    assert_eq!(cond.scc_of(symbols[1]), Some(cycle_scc));
    assert_eq!(cond.members(cycle_scc), &[symbols[0], symbols[1]]);
    // The two boundary edges into symbol 2 merged into one.
    assert_eq!(cond.edges().count(), 2);
}

#[test]
fn test_ancestor_counts_on_diamond() {
    let (mut tree, file, symbols) = file_with_symbols(4);
    tree.insert_edge(file, symbols[0], symbols[1]).unwrap();
    tree.insert_edge(file, symbols[0], symbols[2]).unwrap();
    tree.insert_edge(file, symbols[1], symbols[3]).unwrap();
    tree.insert_edge(file, symbols[2], symbols[3]).unwrap();

    let cond = tree.artifact(file).graph.condensation();
    let counts = cond.ancestor_counts();

    let count_of = |id: ArtifactId| counts[cond.scc_of(id).unwrap()];
    assert_eq!(count_of(symbols[0]), 0);
    assert_eq!(count_of(symbols[1]), 1);
    assert_eq!(count_of(symbols[2]), 1);
    assert_eq!(count_of(symbols[3]), 3);
}

#[test]
fn test_transitive_reduction_drops_shortcut() {
    let (mut tree, file, symbols) = file_with_symbols(3);
    tree.insert_edge(file, symbols[0], symbols[1]).unwrap();
    tree.insert_edge(file, symbols[1], symbols[2]).unwrap();
    tree.insert_edge(file, symbols[0], symbols[2]).unwrap();

    let cond = tree.artifact(file).graph.condensation();
    let reduced = cond.transitive_reduction();

    let scc = |id: ArtifactId| cond.scc_of(id).unwrap();
    assert_eq!(reduced.len(), 2);
    assert!(reduced.contains(&(scc(symbols[0]), scc(symbols[1]))));
    assert!(reduced.contains(&(scc(symbols[1]), scc(symbols[2]))));
    assert!(!reduced.contains(&(scc(symbols[0]), scc(symbols[2]))));
}

#[test]
fn test_transitive_reduction_keeps_diamond() {
    let (mut tree, file, symbols) = file_with_symbols(4);
    tree.insert_edge(file, symbols[0], symbols[1]).unwrap();
    tree.insert_edge(file, symbols[0], symbols[2]).unwrap();
    tree.insert_edge(file, symbols[1], symbols[3]).unwrap();
    tree.insert_edge(file, symbols[2], symbols[3]).unwrap();

    let cond = tree.artifact(file).graph.condensation();
    let reduced = cond.transitive_reduction();
    // A diamond is already edge-minimal.
    assert_eq!(reduced.len(), 4);
}

#[test]
fn test_geometry_serialization() {
    let rect = Rect::new(1.0, 2.0, 30.0, 40.0);
    let json = serde_json::to_string(&rect).unwrap();
    let parsed: Rect = serde_json::from_str(&json).unwrap();
    assert_eq!(rect, parsed);
}

#[test]
fn test_rect_containment_and_overlap() {
    let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
    let inner = Rect::new(10.0, 10.0, 20.0, 20.0);
    let disjoint = Rect::new(50.0, 50.0, 20.0, 20.0);

    assert!(outer.contains_rect(&inner, 0.0));
    assert!(!inner.contains_rect(&outer, 0.0));
    assert!(!inner.intersects(&disjoint));
    assert!(outer.intersects(&inner));
}
