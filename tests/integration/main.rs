//! Integration tests for Arbor
//!
//! These tests verify that multiple systems work together correctly.

use std::fs;
use std::sync::Arc;

use tempfile::TempDir;

use arbor_analyzer::{
    export_tree, AnalysisController, AnalysisState, OutlineProvider, ProjectLocation,
};

/// A project with a folder-level dependency: code in `app/` calls into
/// `lib/`, and two functions in `lib/` are mutually recursive.
fn sample_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    fs::create_dir_all(root.join("app")).unwrap();
    fs::create_dir_all(root.join("lib")).unwrap();

    fs::write(
        root.join("app/main.rs"),
        "fn main() {\n    render();\n    tick();\n}\n",
    )
    .unwrap();
    fs::write(
        root.join("lib/render.rs"),
        "fn render() {\n    tick();\n}\n",
    )
    .unwrap();
    fs::write(
        root.join("lib/clock.rs"),
        "fn tick() {\n    tock();\n}\n\nfn tock() {\n    tick();\n}\n",
    )
    .unwrap();

    temp
}

fn location(root: &std::path::Path) -> ProjectLocation {
    ProjectLocation::new(root, ["rs"], "rust")
}

/// Full run: read, retrieve, build, lift, rank, sort, and lay out.
#[tokio::test]
async fn test_full_analysis_of_sample_project() {
    let project = sample_project();
    let controller = AnalysisController::new(
        location(project.path()),
        Arc::new(OutlineProvider::new()),
    );
    let mut observer = controller.subscribe();

    let snapshot = controller.run().await.unwrap();
    observer.changed().await.unwrap();
    assert!(matches!(&*observer.borrow(), AnalysisState::Ready(_)));

    let tree = &snapshot.tree;
    let root = tree.root();

    let find = |scope, name: &str| {
        *tree
            .artifact(scope)
            .children
            .iter()
            .find(|id| tree.artifact(**id).name == name)
            .unwrap()
    };

    // Folder-level lifting: app depends on lib.
    let app = find(root, "app");
    let lib = find(root, "lib");
    assert!(tree.artifact(root).graph.has_edge(app, lib));
    assert!(!tree.artifact(root).graph.has_edge(lib, app));

    // File-level lifting inside lib: render.rs depends on clock.rs.
    let render = find(lib, "render.rs");
    let clock = find(lib, "clock.rs");
    assert!(tree.artifact(lib).graph.has_edge(render, clock));

    // Symbol-level cycle inside clock.rs.
    let tick = find(clock, "tick");
    let tock = find(clock, "tock");
    assert!(tree.artifact(tick).metrics.is_in_a_cycle);
    assert!(tree.artifact(tock).metrics.is_in_a_cycle);
    assert_eq!(
        tree.artifact(tick).metrics.scc_index_topologically_sorted,
        tree.artifact(tock).metrics.scc_index_topologically_sorted
    );

    // LoC aggregates all the way up.
    let total: u32 = tree
        .artifact(root)
        .children
        .iter()
        .map(|id| tree.artifact(*id).metrics.lines_of_code)
        .sum();
    assert_eq!(tree.artifact(root).metrics.lines_of_code, total);

    // The root received the configured rectangle and laid out its parts.
    assert!(tree.artifact(root).metrics.shows_parts);
    assert!(tree.artifact(root).metrics.frame_in_scope_content.size.width > 0.0);
}

/// The export serializes and parses back with the same shape.
#[tokio::test]
async fn test_export_json_shape() {
    let project = sample_project();
    let controller = AnalysisController::new(
        location(project.path()),
        Arc::new(OutlineProvider::new()),
    );
    let snapshot = controller.run().await.unwrap();

    let export = export_tree(&snapshot.tree);
    let json = serde_json::to_string_pretty(&export).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed["root"]["kind"], "folder");
    let parts = parsed["root"]["parts"].as_array().unwrap();
    assert_eq!(parts.len(), 2);
    for part in parts {
        assert_eq!(part["kind"], "folder");
        assert!(part["lines_of_code"].as_u64().unwrap() > 0);
    }
}

/// A missing project folder fails the pipeline without panicking.
#[tokio::test]
async fn test_missing_folder_reports_failure() {
    let controller = AnalysisController::new(
        location(std::path::Path::new("/nonexistent/arbor-integration")),
        Arc::new(OutlineProvider::new()),
    );

    assert!(controller.run().await.is_err());
    match controller.state() {
        AnalysisState::Failed(message) => {
            assert!(message.contains("Project folder missing"))
        }
        other => panic!("expected Failed, got {other:?}"),
    }
}
