//! Source parsers that turn files into per-file extraction results
//!
//! A parser never sees the rest of the project. It reports the functions a
//! file declares, the raw call sites inside them and the file's import
//! bindings. Everything cross-file happens later in the graph builder.

pub mod javascript;
pub mod resolver;
pub mod syntax;
mod walker;

use crate::graph::FunctionDef;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Error types for parsing operations
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse file: {0}")]
    ParseFailed(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Tree-sitter error: {0}")]
    TreeSitter(String),
}

/// A call site found inside a function body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCall {
    /// Index of the calling function in [`FileExtraction::functions`]
    pub caller: usize,
    pub callee_name: String,
    pub callee_object: Option<String>,
    pub line: usize,
}

/// What a local name is bound to by an import or `require`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportBinding {
    /// Module specifier exactly as written (`./db/users`, `lodash`)
    pub specifier: String,
    /// Name exported by the target module (`default` for default imports)
    pub exported_name: String,
    pub is_namespace: bool,
    /// Project-relative file the specifier points at, filled in by the builder
    pub resolved_file: Option<String>,
}

impl ImportBinding {
    pub fn named(specifier: impl Into<String>, exported_name: impl Into<String>) -> Self {
        Self {
            specifier: specifier.into(),
            exported_name: exported_name.into(),
            is_namespace: false,
            resolved_file: None,
        }
    }

    pub fn namespace(specifier: impl Into<String>) -> Self {
        Self {
            specifier: specifier.into(),
            exported_name: "*".to_string(),
            is_namespace: true,
            resolved_file: None,
        }
    }
}

/// Local name -> binding
pub type ImportMap = BTreeMap<String, ImportBinding>;

/// Everything a parser reports for one file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileExtraction {
    /// Path relative to the analysis root, `/`-separated
    pub rel_path: String,
    pub functions: Vec<FunctionDef>,
    pub calls: Vec<RawCall>,
    pub imports: ImportMap,
    /// Qualified name of the explicitly declared default export
    pub default_export: Option<String>,
}

impl FileExtraction {
    /// The result for a file that could not be parsed
    pub fn empty(rel_path: impl Into<String>) -> Self {
        Self {
            rel_path: rel_path.into(),
            ..Default::default()
        }
    }
}

/// Trait for language-specific parsers
pub trait LanguageParser: Send + Sync {
    /// Get the name of the language this parser handles
    fn language_name(&self) -> &str;

    /// Get file extensions this parser handles (e.g., [".js", ".mjs"])
    fn file_extensions(&self) -> &[&str];

    /// Parse source text. `rel_path` is recorded on the result and also
    /// selects the grammar variant where a parser has more than one.
    fn parse_source(&self, source: &str, rel_path: &str) -> Result<FileExtraction, ParseError>;
}

/// Dispatcher that routes files to the appropriate language parser
pub struct ParserDispatcher {
    parsers: Vec<Box<dyn LanguageParser>>,
}

impl ParserDispatcher {
    /// Create a new parser dispatcher with default parsers
    pub fn new() -> Self {
        Self {
            parsers: vec![
                Box::new(javascript::JavaScriptParser::new()),
                Box::new(javascript::TypeScriptParser::new()),
            ],
        }
    }

    /// Find a parser for the given file path based on extension
    pub fn find_parser(&self, file_path: &Path) -> Option<&dyn LanguageParser> {
        let extension = file_path.extension()?.to_str()?;
        let extension_with_dot = format!(".{}", extension);

        self.parsers
            .iter()
            .find(|parser| {
                parser
                    .file_extensions()
                    .contains(&extension_with_dot.as_str())
            })
            .map(|boxed| &**boxed)
    }

    /// Parse source text using the parser matching `rel_path`
    pub fn parse_source(&self, source: &str, rel_path: &str) -> Result<FileExtraction, ParseError> {
        let path = Path::new(rel_path);
        let parser = self.find_parser(path).ok_or_else(|| {
            ParseError::UnsupportedLanguage(
                path.extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("unknown")
                    .to_string(),
            )
        })?;

        parser.parse_source(source, rel_path)
    }

    /// Read and parse a file below `root`
    pub fn parse_file(&self, root: &Path, file_path: &Path) -> Result<FileExtraction, ParseError> {
        let source = std::fs::read_to_string(file_path)?;
        self.parse_source(&source, &relative_path(root, file_path))
    }

    /// Parse files in parallel.
    ///
    /// A file that fails to read or parse contributes an empty extraction and
    /// an entry in the returned error list. Results are sorted by relative
    /// path so callers never observe scheduling order.
    pub fn parse_files_parallel(
        &self,
        root: &Path,
        files: &[PathBuf],
    ) -> (Vec<FileExtraction>, Vec<String>) {
        let per_file: Vec<(FileExtraction, Option<String>)> = files
            .par_iter()
            .map(|file| {
                let rel = relative_path(root, file);
                match self.parse_file(root, file) {
                    Ok(extraction) => (extraction, None),
                    Err(e) => {
                        debug!("skipping {}: {}", rel, e);
                        let msg = format!("{}: {}", rel, e);
                        (FileExtraction::empty(rel), Some(msg))
                    }
                }
            })
            .collect();

        Self::collect_sorted(per_file)
    }

    /// Parse in-memory `(relative path, source)` pairs in parallel
    pub fn parse_sources_parallel(
        &self,
        sources: &[(String, String)],
    ) -> (Vec<FileExtraction>, Vec<String>) {
        let per_file: Vec<(FileExtraction, Option<String>)> = sources
            .par_iter()
            .map(|(rel, source)| match self.parse_source(source, rel) {
                Ok(extraction) => (extraction, None),
                Err(e) => {
                    debug!("skipping {}: {}", rel, e);
                    let msg = format!("{}: {}", rel, e);
                    (FileExtraction::empty(rel.clone()), Some(msg))
                }
            })
            .collect();

        Self::collect_sorted(per_file)
    }

    fn collect_sorted(
        per_file: Vec<(FileExtraction, Option<String>)>,
    ) -> (Vec<FileExtraction>, Vec<String>) {
        let mut extractions = Vec::with_capacity(per_file.len());
        let mut errors = Vec::new();

        for (extraction, err) in per_file {
            extractions.push(extraction);
            if let Some(e) = err {
                errors.push(e);
            }
        }

        extractions.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
        errors.sort();
        (extractions, errors)
    }

    /// Get all supported file extensions
    pub fn supported_extensions(&self) -> Vec<&str> {
        self.parsers
            .iter()
            .flat_map(|parser| parser.file_extensions().iter().copied())
            .collect()
    }
}

impl Default for ParserDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// `/`-separated path of `file` relative to `root`
pub fn relative_path(root: &Path, file: &Path) -> String {
    let rel = file.strip_prefix(root).unwrap_or(file);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
