//! Heuristic fallback provider
//!
//! Recognizes top-level declaration keywords for common languages and
//! resolves references by name within the project. No parser and no
//! language server — just enough signal to drive the pipeline end-to-end.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use dashmap::DashMap;

use arbor_core::{Result, SourcePosition, SourceRange, SymbolKind};

use crate::input::{CodeSymbolData, Reference};
use crate::provider::SymbolProvider;

/// Line-scanning symbol provider. Symbol passes populate a project-wide
/// declaration table that the reference pass consults, so the pipeline
/// must request all symbols before any references — which it does.
pub struct OutlineProvider {
    declarations: DashMap<String, (PathBuf, SourceRange)>,
    file_lines: DashMap<PathBuf, Vec<String>>,
}

impl OutlineProvider {
    pub fn new() -> Self {
        OutlineProvider {
            declarations: DashMap::new(),
            file_lines: DashMap::new(),
        }
    }
}

impl Default for OutlineProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SymbolProvider for OutlineProvider {
    async fn connect(&self) -> Result<()> {
        Ok(())
    }

    async fn symbols(&self, path: &Path, lines: &[String]) -> Result<Vec<CodeSymbolData>> {
        let kinds = declaration_kinds(extension_of(path));
        let mut declarations: Vec<(usize, String, u32, SymbolKind)> = Vec::new();
        for (number, line) in lines.iter().enumerate() {
            // Indented lines are nested declarations; only top level counts.
            if line.starts_with(' ') || line.starts_with('\t') {
                continue;
            }
            let stripped = strip_modifiers(line);
            for (keyword, kind) in kinds {
                if let Some(rest) = stripped.strip_prefix(keyword) {
                    if let Some(name) = leading_identifier(rest) {
                        let column = line.len() - rest.len();
                        declarations.push((number, name, column as u32, *kind));
                    }
                    break;
                }
            }
        }

        let mut symbols = Vec::new();
        for (position, (line, name, column, kind)) in declarations.iter().enumerate() {
            let end_line = declarations
                .get(position + 1)
                .map(|next| next.0.saturating_sub(1))
                .unwrap_or(lines.len().saturating_sub(1));
            let selection = SourceRange {
                start: SourcePosition::new(*line as u32, *column),
                end: SourcePosition::new(*line as u32, *column + name.len() as u32),
            };
            let range = SourceRange::new(*line as u32, 0, end_line as u32, 0);

            self.declarations
                .entry(name.clone())
                .or_insert_with(|| (path.to_path_buf(), selection));

            symbols.push(CodeSymbolData {
                name: name.clone(),
                kind: *kind,
                range,
                selection_range: selection,
                children: Vec::new(),
                references: None,
            });
        }

        self.file_lines.insert(path.to_path_buf(), lines.to_vec());
        Ok(symbols)
    }

    async fn references(&self, path: &Path, symbol: &CodeSymbolData) -> Result<Vec<Reference>> {
        let Some(lines) = self
            .file_lines
            .get(path)
            .map(|entry| entry.value().clone())
        else {
            return Ok(Vec::new());
        };

        let start = symbol.range.start.line as usize;
        if start >= lines.len() {
            return Ok(Vec::new());
        }
        let end = (symbol.range.end.line as usize).min(lines.len() - 1);
        let span = &lines[start..=end];

        // DashMap iteration order is not stable; sort by name first.
        let known: BTreeMap<String, (PathBuf, SourceRange)> = self
            .declarations
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        let mut references = Vec::new();
        for (name, (target_path, target_range)) in known {
            if name == symbol.name {
                continue;
            }
            if span.iter().any(|line| contains_word(line, &name)) {
                references.push(Reference {
                    source_range: symbol.range,
                    target_file_path: target_path,
                    target_range,
                });
            }
        }
        Ok(references)
    }
}

fn extension_of(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("")
}

fn declaration_kinds(extension: &str) -> &'static [(&'static str, SymbolKind)] {
    match extension {
        "rs" => &[
            ("fn ", SymbolKind::Function),
            ("struct ", SymbolKind::Struct),
            ("enum ", SymbolKind::Enum),
            ("trait ", SymbolKind::Interface),
            ("mod ", SymbolKind::Module),
            ("const ", SymbolKind::Constant),
            ("type ", SymbolKind::TypeAlias),
        ],
        "py" => &[
            ("def ", SymbolKind::Function),
            ("class ", SymbolKind::Class),
        ],
        "js" | "jsx" | "ts" | "tsx" => &[
            ("function ", SymbolKind::Function),
            ("class ", SymbolKind::Class),
            ("interface ", SymbolKind::Interface),
            ("const ", SymbolKind::Constant),
        ],
        "go" => &[
            ("func ", SymbolKind::Function),
            ("type ", SymbolKind::TypeAlias),
        ],
        "java" => &[
            ("class ", SymbolKind::Class),
            ("interface ", SymbolKind::Interface),
            ("enum ", SymbolKind::Enum),
        ],
        _ => &[],
    }
}

/// Drop leading visibility/effect modifiers so the keyword match sees the
/// declaration itself.
fn strip_modifiers(line: &str) -> &str {
    let mut rest = line;
    loop {
        let mut stripped = rest;
        for modifier in ["pub(crate) ", "pub ", "export ", "default ", "async ", "unsafe "] {
            if let Some(after) = stripped.strip_prefix(modifier) {
                stripped = after;
            }
        }
        if stripped.len() == rest.len() {
            return rest;
        }
        rest = stripped;
    }
}

fn leading_identifier(text: &str) -> Option<String> {
    let name: String = text
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Word-boundary containment check without a regex engine.
fn contains_word(line: &str, word: &str) -> bool {
    let bytes = line.as_bytes();
    let mut from = 0;
    while let Some(found) = line[from..].find(word) {
        let start = from + found;
        let end = start + word.len();
        let left_ok = start == 0 || !is_word_byte(bytes[start - 1]);
        let right_ok = end == bytes.len() || !is_word_byte(bytes[end]);
        if left_ok && right_ok {
            return true;
        }
        from = start + 1;
    }
    false
}

fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(String::from).collect()
    }

    #[tokio::test]
    async fn test_rust_outline() {
        let provider = OutlineProvider::new();
        let source = lines("pub fn alpha() {\n    beta();\n}\n\nfn beta() {\n}\n");
        let symbols = provider
            .symbols(Path::new("lib.rs"), &source)
            .await
            .unwrap();

        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols[0].name, "alpha");
        assert_eq!(symbols[0].kind, SymbolKind::Function);
        assert_eq!(symbols[0].range.start.line, 0);
        assert_eq!(symbols[1].name, "beta");
        assert_eq!(symbols[1].range.start.line, 4);
    }

    #[tokio::test]
    async fn test_references_resolved_by_name() {
        let provider = OutlineProvider::new();
        let source = lines("fn alpha() {\n    beta();\n}\nfn beta() {\n}\n");
        let symbols = provider
            .symbols(Path::new("lib.rs"), &source)
            .await
            .unwrap();

        let refs = provider
            .references(Path::new("lib.rs"), &symbols[0])
            .await
            .unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].target_file_path, PathBuf::from("lib.rs"));
        assert_eq!(refs[0].target_range, symbols[1].selection_range);

        // beta's own body never mentions alpha.
        let refs = provider
            .references(Path::new("lib.rs"), &symbols[1])
            .await
            .unwrap();
        assert!(refs.is_empty());
    }

    #[test]
    fn test_contains_word_boundaries() {
        assert!(contains_word("calls beta()", "beta"));
        assert!(!contains_word("calls betamax()", "beta"));
        assert!(!contains_word("alphabeta", "beta"));
        assert!(contains_word("beta", "beta"));
    }
}
