//! Project reader: filesystem walk into a `CodeFolder` tree

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use arbor_core::{AnalysisError, Result};

use crate::input::{CodeFile, CodeFolder, ProjectLocation};

/// Directories never descended into.
const IGNORED_DIRS: &[&str] = &["target", "node_modules", "build", "dist"];

/// Walk the located project into a `CodeFolder` tree.
///
/// Hidden entries and well-known build directories are skipped; only files
/// whose extension matches the location's endings are read. Entries are
/// visited in name order so the result is deterministic. Subfolders that
/// contain no code files anywhere below them are omitted.
pub fn read_project(location: &ProjectLocation) -> Result<CodeFolder> {
    let root = &location.folder_path;
    if !root.is_dir() {
        return Err(AnalysisError::ProjectFolderMissing(root.clone()));
    }
    let name = root
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("project")
        .to_string();

    let folder = read_folder(root, Path::new(""), name, location)?;
    if folder.file_count() == 0 {
        return Err(AnalysisError::NoCodeFilesFound(root.clone()));
    }
    debug!(files = folder.file_count(), "project folder read");
    Ok(folder)
}

fn read_folder(
    absolute: &Path,
    relative: &Path,
    name: String,
    location: &ProjectLocation,
) -> Result<CodeFolder> {
    let mut entries: Vec<(String, PathBuf)> = Vec::new();
    for entry in fs::read_dir(absolute)? {
        let entry = entry?;
        let entry_name = entry.file_name().to_string_lossy().to_string();
        entries.push((entry_name, entry.path()));
    }
    entries.sort();

    let mut folder = CodeFolder {
        name,
        subfolders: Vec::new(),
        files: Vec::new(),
    };

    for (entry_name, path) in entries {
        if should_skip(&entry_name) {
            continue;
        }
        if path.is_dir() {
            let sub = read_folder(
                &path,
                &relative.join(&entry_name),
                entry_name,
                location,
            )?;
            if sub.file_count() > 0 {
                folder.subfolders.push(sub);
            }
        } else if is_code_file(&path, location) {
            let lines = match fs::read_to_string(&path) {
                Ok(content) => content.lines().map(String::from).collect(),
                Err(e) => {
                    warn!("Cannot read file {}: {}", path.display(), e);
                    continue;
                }
            };
            folder.files.push(CodeFile {
                name: entry_name.clone(),
                path: relative.join(&entry_name),
                lines,
                symbols: Vec::new(),
            });
        }
    }

    Ok(folder)
}

fn should_skip(name: &str) -> bool {
    name.starts_with('.') || IGNORED_DIRS.contains(&name)
}

fn is_code_file(path: &Path, location: &ProjectLocation) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| location.code_file_endings.contains(e))
        .unwrap_or(false)
}
