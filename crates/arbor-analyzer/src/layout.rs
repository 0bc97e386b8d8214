//! Treemap layout: recursive area-proportional rectangle partitioning
//!
//! Rectangles are assigned in parent-content coordinates. Splitting walks
//! the sorted sibling list, cutting the available rectangle along its
//! longer axis at the LoC-balanced fraction, and refuses once a side
//! would fall below the minimum part size; the caller then collapses the
//! descendants instead.

use arbor_core::{Artifact, ArtifactId, ArtifactTree, Point, Rect, Size};

/// Layout constants, fixed for the duration of one run.
#[derive(Debug, Clone)]
pub struct LayoutStyle {
    /// Inner padding between a frame and its content.
    pub padding: f64,
    /// Height reserved for the header label, together with padding.
    pub font_size: f64,
    /// Minimum part size; smaller rectangles refuse to subdivide.
    pub min_width: f64,
    pub min_height: f64,
    /// Coefficient of the surface-derived gap between sibling groups.
    pub gap_factor: f64,
}

impl Default for LayoutStyle {
    fn default() -> Self {
        LayoutStyle {
            padding: 8.0,
            font_size: 12.0,
            min_width: 60.0,
            min_height: 40.0,
            gap_factor: 2.0,
        }
    }
}

impl LayoutStyle {
    /// No padding, header, gaps, or minimums. Every part subdivides.
    pub fn unconstrained() -> Self {
        LayoutStyle {
            padding: 0.0,
            font_size: 0.0,
            min_width: 0.0,
            min_height: 0.0,
            gap_factor: 0.0,
        }
    }
}

/// Assign rectangles to every artifact in the tree, rooted in a rectangle
/// of `root_size`. `filter` selects which artifacts are shown; hidden
/// ones collapse to a degenerate rectangle at their scope's center.
pub fn layout_tree(
    tree: &mut ArtifactTree,
    root_size: Size,
    filter: &dyn Fn(&Artifact) -> bool,
    style: &LayoutStyle,
) {
    let root = tree.root();
    let frame = Rect {
        origin: Point::default(),
        size: root_size,
    };
    layout_artifact(tree, root, frame, filter, style);
}

/// Lay out one artifact inside `frame` and descend into its parts.
fn layout_artifact(
    tree: &mut ArtifactTree,
    id: ArtifactId,
    frame: Rect,
    filter: &dyn Fn(&Artifact) -> bool,
    style: &LayoutStyle,
) {
    let header = style.font_size + 2.0 * style.padding;
    let content = Rect::new(
        style.padding,
        header,
        (frame.size.width - 2.0 * style.padding).max(0.0),
        (frame.size.height - header - style.padding).max(0.0),
    );
    {
        let metrics = &mut tree.artifact_mut(id).metrics;
        metrics.frame_in_scope_content = frame;
        metrics.content_frame = content;
    }

    let mut shown = Vec::new();
    let mut hidden = Vec::new();
    for child in tree.artifact(id).children.clone() {
        if filter(tree.artifact(child)) {
            shown.push(child);
        } else {
            hidden.push(child);
        }
    }

    let center = Point::new(content.size.width / 2.0, content.size.height / 2.0);
    for child in &hidden {
        collapse_subtree(tree, *child, center);
    }

    if shown.is_empty() {
        tree.artifact_mut(id).metrics.shows_parts = false;
        return;
    }

    if !content.size.meets(style.min_width, style.min_height) {
        tree.artifact_mut(id).metrics.shows_parts = false;
        for child in &shown {
            collapse_subtree(tree, *child, center);
        }
        return;
    }

    let area = Rect {
        origin: Point::default(),
        size: content.size,
    };
    let fits = layout_parts(tree, &shown, area, filter, style);
    tree.artifact_mut(id).metrics.shows_parts = fits;
    if !fits {
        for child in &shown {
            collapse_subtree(tree, *child, center);
        }
    }
}

/// Partition `rect` among a sorted, contiguous run of shown siblings.
/// Returns whether every branch fit.
fn layout_parts(
    tree: &mut ArtifactTree,
    parts: &[ArtifactId],
    rect: Rect,
    filter: &dyn Fn(&Artifact) -> bool,
    style: &LayoutStyle,
) -> bool {
    if parts.len() == 1 {
        layout_artifact(tree, parts[0], rect, filter, style);
        return true;
    }

    let split = balanced_split_index(tree, parts);
    let (group_a, group_b) = parts.split_at(split);

    let loc_a: f64 = total_loc(tree, group_a);
    let total: f64 = loc_a + total_loc(tree, group_b);
    let fraction = if total > 0.0 {
        loc_a / total
    } else {
        group_a.len() as f64 / parts.len() as f64
    };

    // Boundary elements in different components separate more widely.
    let gap_unit = style.gap_factor * rect.size.surface().powf(1.0 / 6.0);
    let rank_a = tree.artifact(group_a[group_a.len() - 1]).metrics.component_rank;
    let rank_b = tree.artifact(group_b[0]).metrics.component_rank;
    let gap = if rank_a == rank_b { gap_unit } else { 3.0 * gap_unit };

    let Some((rect_a, rect_b)) = split_rect(rect, fraction, gap) else {
        return false;
    };
    if !rect_a.size.meets(style.min_width, style.min_height)
        || !rect_b.size.meets(style.min_width, style.min_height)
    {
        return false;
    }

    let fits_a = layout_parts(tree, group_a, rect_a, filter, style);
    let fits_b = layout_parts(tree, group_b, rect_b, filter, style);
    fits_a && fits_b
}

/// The split index minimizing the cumulative-LoC imbalance between the
/// two groups; the smaller index wins ties.
fn balanced_split_index(tree: &ArtifactTree, parts: &[ArtifactId]) -> usize {
    let total: f64 = total_loc(tree, parts);
    let mut best_index = 1;
    let mut best_difference = f64::INFINITY;
    let mut prefix = 0.0;
    for index in 1..parts.len() {
        prefix += tree.artifact(parts[index - 1]).metrics.lines_of_code as f64;
        let difference = (total - 2.0 * prefix).abs();
        if difference < best_difference {
            best_difference = difference;
            best_index = index;
        }
    }
    best_index
}

fn total_loc(tree: &ArtifactTree, parts: &[ArtifactId]) -> f64 {
    parts
        .iter()
        .map(|id| tree.artifact(*id).metrics.lines_of_code as f64)
        .sum()
}

/// Cut `rect` along its longer axis at `fraction` of the length that
/// remains after the gap. `None` when the gap alone exceeds the rectangle.
fn split_rect(rect: Rect, fraction: f64, gap: f64) -> Option<(Rect, Rect)> {
    if rect.size.width >= rect.size.height {
        let available = rect.size.width - gap;
        if available <= 0.0 {
            return None;
        }
        let len_a = available * fraction;
        Some((
            Rect::new(rect.origin.x, rect.origin.y, len_a, rect.size.height),
            Rect::new(
                rect.origin.x + len_a + gap,
                rect.origin.y,
                available - len_a,
                rect.size.height,
            ),
        ))
    } else {
        let available = rect.size.height - gap;
        if available <= 0.0 {
            return None;
        }
        let len_a = available * fraction;
        Some((
            Rect::new(rect.origin.x, rect.origin.y, rect.size.width, len_a),
            Rect::new(
                rect.origin.x,
                rect.origin.y + len_a + gap,
                rect.size.width,
                available - len_a,
            ),
        ))
    }
}

/// Collapse an artifact and everything below it to degenerate rectangles.
fn collapse_subtree(tree: &mut ArtifactTree, id: ArtifactId, at: Point) {
    let mut stack = vec![(id, at)];
    while let Some((current, point)) = stack.pop() {
        let children = tree.artifact(current).children.clone();
        let metrics = &mut tree.artifact_mut(current).metrics;
        metrics.frame_in_scope_content = Rect::degenerate(point);
        metrics.content_frame = Rect::degenerate(Point::default());
        metrics.shows_parts = false;
        for child in children {
            stack.push((child, Point::default()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_core::{SourceRange, SymbolKind};

    /// Root folder with three files of LoC 60, 30, 10.
    fn three_sibling_tree() -> (ArtifactTree, Vec<ArtifactId>) {
        let mut tree = ArtifactTree::new("root");
        let mut ids = Vec::new();
        for (name, loc) in [("a.rs", 60u32), ("b.rs", 30), ("c.rs", 10)] {
            let id = tree
                .add_file(tree.root(), name, vec!["x".to_string(); loc as usize])
                .unwrap();
            tree.artifact_mut(id).metrics.lines_of_code = loc;
            ids.push(id);
        }
        (tree, ids)
    }

    #[test]
    fn test_balanced_split_scenario() {
        let (mut tree, ids) = three_sibling_tree();
        let style = LayoutStyle::unconstrained();
        layout_tree(&mut tree, Size::new(100.0, 100.0), &|_| true, &style);

        assert!(tree.artifact(tree.root()).metrics.shows_parts);
        assert_eq!(
            tree.artifact(ids[0]).metrics.frame_in_scope_content,
            Rect::new(0.0, 0.0, 60.0, 100.0)
        );
        assert_eq!(
            tree.artifact(ids[1]).metrics.frame_in_scope_content,
            Rect::new(60.0, 0.0, 40.0, 75.0)
        );
        assert_eq!(
            tree.artifact(ids[2]).metrics.frame_in_scope_content,
            Rect::new(60.0, 75.0, 40.0, 25.0)
        );
    }

    #[test]
    fn test_layout_is_deterministic() {
        let (mut first, _) = three_sibling_tree();
        let (mut second, ids) = three_sibling_tree();
        let style = LayoutStyle::default();
        layout_tree(&mut first, Size::new(640.0, 480.0), &|_| true, &style);
        layout_tree(&mut second, Size::new(640.0, 480.0), &|_| true, &style);

        for id in ids {
            assert_eq!(
                first.artifact(id).metrics.frame_in_scope_content,
                second.artifact(id).metrics.frame_in_scope_content
            );
            assert_eq!(
                first.artifact(id).metrics.content_frame,
                second.artifact(id).metrics.content_frame
            );
        }
    }

    #[test]
    fn test_siblings_do_not_overlap() {
        let (mut tree, ids) = three_sibling_tree();
        let style = LayoutStyle::default();
        layout_tree(&mut tree, Size::new(800.0, 600.0), &|_| true, &style);

        for (i, a) in ids.iter().enumerate() {
            for b in ids.iter().skip(i + 1) {
                let fa = tree.artifact(*a).metrics.frame_in_scope_content;
                let fb = tree.artifact(*b).metrics.frame_in_scope_content;
                assert!(!fa.intersects(&fb), "{fa:?} overlaps {fb:?}");
            }
        }
    }

    #[test]
    fn test_tiny_root_collapses_children() {
        let (mut tree, ids) = three_sibling_tree();
        let style = LayoutStyle::default();
        layout_tree(&mut tree, Size::new(20.0, 20.0), &|_| true, &style);

        assert!(!tree.artifact(tree.root()).metrics.shows_parts);
        for id in ids {
            let frame = tree.artifact(id).metrics.frame_in_scope_content;
            assert_eq!(frame.size, Size::default());
        }
    }

    #[test]
    fn test_hidden_parts_collapse_to_center() {
        let (mut tree, ids) = three_sibling_tree();
        let style = LayoutStyle::unconstrained();
        let hidden_name = tree.artifact(ids[2]).name.clone();
        layout_tree(
            &mut tree,
            Size::new(100.0, 100.0),
            &|artifact| artifact.name != hidden_name,
            &style,
        );

        let frame = tree.artifact(ids[2]).metrics.frame_in_scope_content;
        assert_eq!(frame.size, Size::default());
        assert_eq!(frame.origin, Point::new(50.0, 50.0));
        // The two shown parts still fill the rectangle.
        assert!(tree.artifact(tree.root()).metrics.shows_parts);
    }

    #[test]
    fn test_symbol_scopes_nest_within_content() {
        let mut tree = ArtifactTree::new("root");
        let file = tree
            .add_file(tree.root(), "lib.rs", vec!["x".to_string(); 100])
            .unwrap();
        let sym = tree
            .add_symbol(
                file,
                "run",
                SymbolKind::Function,
                SourceRange::new(0, 0, 99, 0),
                SourceRange::new(0, 0, 0, 3),
                None,
            )
            .unwrap();
        tree.artifact_mut(file).metrics.lines_of_code = 100;
        tree.artifact_mut(sym).metrics.lines_of_code = 100;

        let style = LayoutStyle::default();
        layout_tree(&mut tree, Size::new(1000.0, 800.0), &|_| true, &style);

        let file_content = tree.artifact(file).metrics.content_frame;
        let sym_frame = tree.artifact(sym).metrics.frame_in_scope_content;
        let content_area = Rect {
            origin: Point::default(),
            size: file_content.size,
        };
        assert!(tree.artifact(file).metrics.shows_parts);
        assert!(content_area.contains_rect(&sym_frame, style.padding));
    }
}
