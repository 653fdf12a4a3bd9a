//! Function nodes for the call graph

use serde::{Deserialize, Serialize};

/// Directory names that group code without naming a module of their own.
const GENERIC_SEGMENTS: &[&str] = &["src", "lib", "app", "source", "packages"];

/// The syntactic form a callable was declared with
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FunctionKind {
    /// `function foo() {}` (including generators)
    Function,
    /// A class method or an object-literal method
    Method,
    /// An arrow function bound to a name
    Arrow,
    /// An unnamed callable (default export, module-level callback)
    Anonymous,
}

impl std::fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FunctionKind::Function => write!(f, "function"),
            FunctionKind::Method => write!(f, "method"),
            FunctionKind::Arrow => write!(f, "arrow"),
            FunctionKind::Anonymous => write!(f, "anonymous"),
        }
    }
}

/// A function definition as reported by a parser, before it has a graph id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    /// Local callable name (`save` for `UserService.save`)
    pub name: String,
    /// Enclosing class name for methods
    pub owner: Option<String>,
    pub kind: FunctionKind,
    pub line: usize,
    pub end_line: usize,
    pub params: usize,
    pub complexity: usize,
}

impl FunctionDef {
    pub fn new(name: impl Into<String>, kind: FunctionKind, line: usize, end_line: usize) -> Self {
        Self {
            name: name.into(),
            owner: None,
            kind,
            line,
            end_line: end_line.max(line),
            params: 0,
            complexity: 1,
        }
    }

    /// `Owner.name` for methods, plain `name` otherwise
    pub fn qualified_name(&self) -> String {
        match &self.owner {
            Some(owner) => format!("{}.{}", owner, self.name),
            None => self.name.clone(),
        }
    }
}

/// A uniquely identified callable in one snapshot of the code base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionNode {
    /// Stable key: `relPath::qualifiedName`
    id: String,

    /// Local callable name
    name: String,

    /// Enclosing class, if any
    owner: Option<String>,

    /// Path relative to the analysis root, `/`-separated
    rel_path: String,

    /// Module grouping derived from the path
    module: String,

    line: usize,
    end_line: usize,
    params: usize,
    complexity: usize,
    kind: FunctionKind,
}

impl FunctionNode {
    pub fn new(id: impl Into<String>, rel_path: impl Into<String>, def: FunctionDef) -> Self {
        let rel_path = rel_path.into();
        Self {
            id: id.into(),
            module: module_of(&rel_path),
            rel_path,
            name: def.name,
            owner: def.owner,
            line: def.line,
            end_line: def.end_line.max(def.line),
            params: def.params,
            complexity: def.complexity.max(1),
            kind: def.kind,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn qualified_name(&self) -> String {
        match &self.owner {
            Some(owner) => format!("{}.{}", owner, self.name),
            None => self.name.clone(),
        }
    }

    pub fn rel_path(&self) -> &str {
        &self.rel_path
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn end_line(&self) -> usize {
        self.end_line
    }

    pub fn params(&self) -> usize {
        self.params
    }

    pub fn complexity(&self) -> usize {
        self.complexity
    }

    pub fn lines_of_code(&self) -> usize {
        self.end_line - self.line + 1
    }

    pub fn kind(&self) -> FunctionKind {
        self.kind
    }

    /// Whether `[start, end]` overlaps this function's line span
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        start <= self.end_line && end >= self.line
    }
}

/// Derive the module of a relative path.
///
/// The module is the first directory segment that is not a generic container
/// (`src/`, `lib/`, ...). Files with no such directory use their file stem.
pub fn module_of(rel_path: &str) -> String {
    let segments: Vec<&str> = rel_path.split('/').filter(|s| !s.is_empty()).collect();
    let Some((file, dirs)) = segments.split_last() else {
        return String::new();
    };

    if let Some(dir) = dirs.iter().find(|d| !GENERIC_SEGMENTS.contains(d)) {
        return (*dir).to_string();
    }

    match file.split_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => (*file).to_string(),
    }
}
