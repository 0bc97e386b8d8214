//! Architecture builder: folder and symbol data into the artifact tree
//!
//! Construction is depth-first. Symbols are registered with an explicit
//! work stack so arbitrarily nested symbol trees cannot exhaust the call
//! stack. Dependencies resolvable without cross-file information (both
//! endpoints in the same file) are inserted here; everything else is left
//! to the cross-scope lifter.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use arbor_core::{ArtifactId, ArtifactTree, Result};

use crate::index::SymbolIndex;
use crate::input::{CodeFile, CodeFolder, CodeSymbolData, Reference};
use crate::lifter;

/// The built tree plus the side tables the lifter consumes. Both tables
/// are dropped once lifting finishes.
pub struct BuildOutput {
    pub tree: ArtifactTree,
    pub index: SymbolIndex,
    /// Cross-file references keyed by the declaring symbol.
    pub references: BTreeMap<ArtifactId, Vec<Reference>>,
}

/// Materialize the artifact tree for a parsed project folder.
pub fn build_architecture(folder: &CodeFolder) -> Result<BuildOutput> {
    let mut tree = ArtifactTree::new(&folder.name);
    let index = SymbolIndex::new();
    let mut references = BTreeMap::new();

    let root = tree.root();
    build_folder_contents(&mut tree, root, folder, &index, &mut references)?;

    debug!(
        artifacts = tree.len(),
        symbols = index.len(),
        "architecture built"
    );
    Ok(BuildOutput {
        tree,
        index,
        references,
    })
}

fn build_folder_contents(
    tree: &mut ArtifactTree,
    scope: ArtifactId,
    folder: &CodeFolder,
    index: &SymbolIndex,
    references: &mut BTreeMap<ArtifactId, Vec<Reference>>,
) -> Result<()> {
    for sub in &folder.subfolders {
        let id = tree.add_folder(scope, &sub.name)?;
        build_folder_contents(tree, id, sub, index, references)?;
    }
    for file in &folder.files {
        build_file(tree, scope, file, index, references)?;
    }
    Ok(())
}

fn build_file(
    tree: &mut ArtifactTree,
    scope: ArtifactId,
    file: &CodeFile,
    index: &SymbolIndex,
    references: &mut BTreeMap<ArtifactId, Vec<Reference>>,
) -> Result<()> {
    let file_id = tree.add_file(scope, &file.name, file.lines.clone())?;

    // Register the whole symbol tree first; intra-file references can
    // point forward, so edges wait until the file's index is complete.
    let mut declared: Vec<(ArtifactId, Vec<Reference>)> = Vec::new();
    let mut stack: Vec<(ArtifactId, &CodeSymbolData)> = Vec::new();
    for symbol in file.symbols.iter().rev() {
        stack.push((file_id, symbol));
    }
    while let Some((parent, data)) = stack.pop() {
        let code = extract_code(&file.lines, data);
        let id = tree.add_symbol(
            parent,
            &data.name,
            data.kind,
            data.range,
            data.selection_range,
            code,
        )?;
        index.insert(&file.path, data.range, data.selection_range, id);
        if let Some(refs) = &data.references {
            declared.push((id, refs.clone()));
        }
        for child in data.children.iter().rev() {
            stack.push((id, child));
        }
    }

    // Split each symbol's references: same-file targets resolve now,
    // cross-file targets wait for the lifter.
    for (symbol, refs) in declared {
        let mut deferred = Vec::new();
        for reference in refs {
            if reference.target_file_path == file.path {
                connect_within_file(tree, index, symbol, &file.path, &reference)?;
            } else {
                deferred.push(reference);
            }
        }
        if !deferred.is_empty() {
            references.entry(symbol).or_default().extend(deferred);
        }
    }

    Ok(())
}

fn connect_within_file(
    tree: &mut ArtifactTree,
    index: &SymbolIndex,
    symbol: ArtifactId,
    path: &Path,
    reference: &Reference,
) -> Result<()> {
    if let Some(target) = index.resolve(path, &reference.target_range) {
        lifter::connect_reference(tree, symbol, target)?;
    }
    Ok(())
}

/// The source slice a symbol's range covers.
fn extract_code(lines: &[String], data: &CodeSymbolData) -> Option<String> {
    let start = data.range.start.line as usize;
    let end = data.range.end.line as usize;
    lines.get(start..=end).map(|slice| slice.join("\n"))
}
