//! JavaScript and TypeScript parsers using Tree-sitter
//!
//! Both grammars produce the same node kinds for everything the extractor
//! consumes, so the two parsers share one walker.

use super::{walker, FileExtraction, LanguageParser, ParseError};
use tree_sitter::{Language, Parser, Tree};

// Tests live in crates/core/tests/test_parser.rs

fn parse_tree(language: &Language, source: &str, what: &str) -> Result<Tree, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(language)
        .map_err(|e| ParseError::TreeSitter(e.to_string()))?;
    parser
        .parse(source, None)
        .ok_or_else(|| ParseError::ParseFailed(format!("Failed to parse {} source", what)))
}

/// JavaScript parser (`.js`, `.jsx`, `.mjs`, `.cjs`)
pub struct JavaScriptParser {
    language: Language,
}

impl Default for JavaScriptParser {
    fn default() -> Self {
        Self {
            language: tree_sitter_javascript::LANGUAGE.into(),
        }
    }
}

impl JavaScriptParser {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LanguageParser for JavaScriptParser {
    fn language_name(&self) -> &str {
        "javascript"
    }

    fn file_extensions(&self) -> &[&str] {
        &[".js", ".jsx", ".mjs", ".cjs"]
    }

    fn parse_source(&self, source: &str, rel_path: &str) -> Result<FileExtraction, ParseError> {
        let tree = parse_tree(&self.language, source, "JavaScript")?;
        Ok(walker::extract(&tree, source, rel_path))
    }
}

/// TypeScript parser (`.ts`, `.tsx`); TSX gets its own grammar
pub struct TypeScriptParser {
    typescript: Language,
    tsx: Language,
}

impl Default for TypeScriptParser {
    fn default() -> Self {
        Self {
            typescript: tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            tsx: tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

impl TypeScriptParser {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LanguageParser for TypeScriptParser {
    fn language_name(&self) -> &str {
        "typescript"
    }

    fn file_extensions(&self) -> &[&str] {
        &[".ts", ".tsx", ".mts", ".cts"]
    }

    fn parse_source(&self, source: &str, rel_path: &str) -> Result<FileExtraction, ParseError> {
        let language = if rel_path.ends_with(".tsx") {
            &self.tsx
        } else {
            &self.typescript
        };
        let tree = parse_tree(language, source, "TypeScript")?;
        Ok(walker::extract(&tree, source, rel_path))
    }
}
