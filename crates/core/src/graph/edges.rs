//! Call edges for the call graph

use serde::{Deserialize, Serialize};

/// Which name-resolution strategy produced a resolved edge
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    /// The callee name is a named/default import binding
    ImportBinding,
    /// `ns.member()` where `ns` is a namespace import
    NamespaceMember,
    /// A unique function of that name in the caller's own file
    SameFile,
    /// A unique function of that name anywhere in the project
    GlobalUnique,
}

/// One call site. Unresolved edges keep the raw callee name for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CallEdge {
    /// Caller function id
    from: String,

    /// Callee function id, `None` when unresolved
    to: Option<String>,

    /// Callee name as written at the call site
    callee_name: String,

    /// Receiver expression for member calls (`api` in `api.fetch()`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    callee_object: Option<String>,

    resolved: bool,

    /// Caller and callee live in different modules (resolved edges only)
    cross_module: bool,

    /// Relative path of the file containing the call
    file: String,

    line: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    strategy: Option<ResolutionStrategy>,
}

impl CallEdge {
    #[allow(clippy::too_many_arguments)]
    pub fn resolved(
        from: impl Into<String>,
        to: impl Into<String>,
        callee_name: impl Into<String>,
        callee_object: Option<String>,
        file: impl Into<String>,
        line: usize,
        cross_module: bool,
        strategy: ResolutionStrategy,
    ) -> Self {
        Self {
            from: from.into(),
            to: Some(to.into()),
            callee_name: callee_name.into(),
            callee_object,
            resolved: true,
            cross_module,
            file: file.into(),
            line,
            strategy: Some(strategy),
        }
    }

    pub fn unresolved(
        from: impl Into<String>,
        callee_name: impl Into<String>,
        callee_object: Option<String>,
        file: impl Into<String>,
        line: usize,
    ) -> Self {
        Self {
            from: from.into(),
            to: None,
            callee_name: callee_name.into(),
            callee_object,
            resolved: false,
            cross_module: false,
            file: file.into(),
            line,
            strategy: None,
        }
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> Option<&str> {
        self.to.as_deref()
    }

    pub fn callee_name(&self) -> &str {
        &self.callee_name
    }

    pub fn callee_object(&self) -> Option<&str> {
        self.callee_object.as_deref()
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn is_cross_module(&self) -> bool {
        self.resolved && self.cross_module
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn strategy(&self) -> Option<ResolutionStrategy> {
        self.strategy
    }

    /// `object.name` for member calls, `name` otherwise
    pub fn display_name(&self) -> String {
        match &self.callee_object {
            Some(obj) => format!("{}.{}", obj, self.callee_name),
            None => self.callee_name.clone(),
        }
    }
}
