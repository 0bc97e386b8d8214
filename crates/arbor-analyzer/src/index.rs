//! Symbol location index for reference resolution

use std::path::{Path, PathBuf};

use dashmap::DashMap;

use arbor_core::{ArtifactId, SourceRange};

/// Maps symbol locations to artifact ids. Thread-safe for concurrent
/// access; retained only until the lifter finishes.
pub struct SymbolIndex {
    locations: DashMap<(PathBuf, SourceRange), ArtifactId>,
    file_symbols: DashMap<PathBuf, Vec<ArtifactId>>,
}

impl SymbolIndex {
    pub fn new() -> Self {
        SymbolIndex {
            locations: DashMap::new(),
            file_symbols: DashMap::new(),
        }
    }

    /// Register a symbol under both its full range and its selection
    /// range, so references resolving by either land on the artifact.
    pub fn insert(
        &self,
        path: &Path,
        range: SourceRange,
        selection_range: SourceRange,
        id: ArtifactId,
    ) {
        self.locations.insert((path.to_path_buf(), range), id);
        self.locations
            .insert((path.to_path_buf(), selection_range), id);
        self.file_symbols
            .entry(path.to_path_buf())
            .or_default()
            .push(id);
    }

    /// Resolve a reference target. `None` means the target is outside the
    /// analyzed project and the reference is dropped.
    pub fn resolve(&self, path: &Path, range: &SourceRange) -> Option<ArtifactId> {
        self.locations
            .get(&(path.to_path_buf(), *range))
            .map(|entry| *entry.value())
    }

    /// All symbols registered for a file, in registration order.
    pub fn symbols_in_file(&self, path: &Path) -> Vec<ArtifactId> {
        self.file_symbols
            .get(path)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

impl Default for SymbolIndex {
    fn default() -> Self {
        Self::new()
    }
}
