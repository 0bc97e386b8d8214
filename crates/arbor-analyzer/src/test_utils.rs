//! Test utilities for Arbor

use std::fs;

use tempfile::TempDir;

/// Create a temporary project with a specific file structure.
pub fn create_repo_with_structure(structure: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    for (path, content) in structure {
        let full_path = root.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content).unwrap();
    }

    temp_dir
}

/// A small Rust project with a cross-file dependency: `main.rs` calls
/// `helper` defined in `util.rs`.
pub fn create_linked_repo() -> TempDir {
    create_repo_with_structure(&[
        (
            "src/main.rs",
            "fn main() {\n    helper();\n}\n",
        ),
        (
            "src/util.rs",
            "fn helper() {\n    let _ = 1;\n}\n",
        ),
    ])
}
