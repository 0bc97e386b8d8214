//! CLI command implementations

use std::path::PathBuf;
use std::sync::Arc;

use arbor_analyzer::{
    export_tree, AnalysisConfig, AnalysisController, LayoutStyle, OutlineProvider,
    ProjectLocation,
};
use arbor_core::Size;

pub async fn analyze(
    root: PathBuf,
    endings: Vec<String>,
    language: String,
    output: Option<PathBuf>,
    width: f64,
    height: f64,
) -> anyhow::Result<()> {
    let location = ProjectLocation::new(root, endings, language);
    let config = AnalysisConfig {
        root_size: Size::new(width, height),
        style: LayoutStyle::default(),
        filter: None,
    };
    let controller =
        AnalysisController::new(location, Arc::new(OutlineProvider::new())).with_config(config);

    let snapshot = controller.run().await?;
    let tree = &snapshot.tree;

    let mut files = 0usize;
    let mut symbols = 0usize;
    let mut cycles = 0usize;
    for id in tree.pre_order() {
        let artifact = tree.artifact(id);
        if artifact.is_file() {
            files += 1;
        }
        if artifact.is_symbol() {
            symbols += 1;
        }
        if artifact.metrics.is_in_a_cycle {
            cycles += 1;
        }
    }

    tracing::info!(
        "Analyzed {} artifacts: {} files, {} symbols, {} lines",
        tree.len(),
        files,
        symbols,
        tree.artifact(tree.root()).metrics.lines_of_code
    );
    if cycles > 0 {
        tracing::warn!("{} artifacts participate in dependency cycles", cycles);
    }

    if let Some(path) = output {
        let export = export_tree(tree);
        let json = serde_json::to_string_pretty(&export)?;
        std::fs::write(&path, json)?;
        tracing::info!("Layout written to {}", path.display());
    }

    Ok(())
}
