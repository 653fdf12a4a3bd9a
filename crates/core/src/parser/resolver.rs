//! Cross-file resolution: module specifiers to files, call sites to functions.
//!
//! [`ModuleResolver`] maps an import specifier to a project file.
//! [`NameResolver`] maps a raw call site to a function id using four ordered
//! strategies, first match wins:
//!
//! 1. the callee name is a named or default import binding
//! 2. the call is `ns.member()` and `ns` is a namespace import
//! 3. exactly one function of that name lives in the caller's file
//! 4. exactly one function of that name exists in the project, and the name
//!    is not a common built-in method name

use std::collections::{HashMap, HashSet};

use crate::graph::{FunctionNode, ResolutionStrategy};

use super::{ImportBinding, ImportMap};

/// Extensions probed when a specifier omits one, in order
const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs"];

/// Names that collide with built-in methods of arrays, strings, objects,
/// promises, `Math`, `console`, emitters and streams. A project function that
/// happens to share one of these names is never picked by the global fallback.
const BUILTIN_NAMES: &[&str] = &[
    // Array
    "map", "filter", "reduce", "reduceRight", "forEach", "find", "findIndex", "findLast",
    "some", "every", "includes", "indexOf", "lastIndexOf", "push", "pop", "shift", "unshift",
    "slice", "splice", "concat", "join", "sort", "reverse", "flat", "flatMap", "fill", "at",
    "keys", "values", "entries", "from", "of", "isArray",
    // String
    "toString", "split", "replace", "replaceAll", "trim", "trimStart", "trimEnd", "toLowerCase",
    "toUpperCase", "startsWith", "endsWith", "padStart", "padEnd", "charAt", "charCodeAt",
    "substring", "substr", "match", "matchAll", "search", "repeat", "localeCompare",
    "normalize",
    // Object
    "assign", "create", "freeze", "hasOwnProperty", "defineProperty", "getPrototypeOf",
    "valueOf", "toJSON",
    // Promise
    "then", "catch", "finally", "resolve", "reject", "all", "allSettled", "race", "any",
    // JSON / Math / Date / Number
    "parse", "stringify", "max", "min", "floor", "ceil", "round", "abs", "random", "pow",
    "sqrt", "now", "getTime", "toISOString", "toFixed", "isNaN", "parseInt", "parseFloat",
    // console
    "log", "error", "warn", "info", "debug", "trace", "table",
    // EventEmitter / streams / Map / Set
    "emit", "on", "once", "off", "addListener", "removeListener", "pipe", "write", "end",
    "close", "destroy", "read", "send", "next", "get", "set", "has", "delete", "clear", "add",
    "size",
    // Function
    "call", "apply", "bind",
    // timers and module loading
    "setTimeout", "setInterval", "clearTimeout", "clearInterval", "require",
];

/// Whether a call name is excluded from the global unique-name fallback
pub fn is_builtin_name(name: &str) -> bool {
    BUILTIN_NAMES.contains(&name)
}

// ── Module path resolution ───────────────────────────────────────────────

/// Resolves import specifiers against the set of project files
pub struct ModuleResolver<'a> {
    files: &'a HashSet<String>,
}

impl<'a> ModuleResolver<'a> {
    pub fn new(files: &'a HashSet<String>) -> Self {
        Self { files }
    }

    /// Project-relative file for `specifier` as imported from `importing_file`.
    /// Bare package names that match no project file resolve to `None`.
    pub fn resolve(&self, specifier: &str, importing_file: &str) -> Option<String> {
        if specifier.starts_with("./") || specifier.starts_with("../") {
            let base = match importing_file.rsplit_once('/') {
                Some((dir, _)) => format!("{}/{}", dir, specifier),
                None => specifier.to_string(),
            };
            self.try_with_extensions(&normalize(&base)?)
        } else {
            // root-relative specifiers (`src/db/users`, `/lib/x`)
            self.try_with_extensions(&normalize(specifier.trim_start_matches('/'))?)
        }
    }

    /// Try a base path with various source-file extensions; return the first match.
    fn try_with_extensions(&self, base: &str) -> Option<String> {
        // Exact path (already has extension)
        if self.files.contains(base) {
            return Some(base.to_string());
        }

        for ext in SOURCE_EXTENSIONS {
            let p = format!("{}.{}", base, ext);
            if self.files.contains(&p) {
                return Some(p);
            }
        }

        // Index-file fallback: dir/index.ts, dir/index.js, ...
        for ext in SOURCE_EXTENSIONS {
            let p = if base.is_empty() {
                format!("index.{}", ext)
            } else {
                format!("{}/index.{}", base, ext)
            };
            if self.files.contains(&p) {
                return Some(p);
            }
        }

        None
    }
}

/// Collapse `.` and `..` segments. `None` when the path escapes the root.
fn normalize(path: &str) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            s => parts.push(s),
        }
    }
    Some(parts.join("/"))
}

// ── Name resolution ──────────────────────────────────────────────────────

/// Project-wide lookup tables, built once every function is known
#[derive(Debug, Default)]
pub struct SymbolIndex {
    /// local name -> (file, id) for every function with that name
    by_name: HashMap<String, Vec<(String, String)>>,
    /// `relPath::exportedName` -> id
    exports: HashMap<String, String>,
}

impl SymbolIndex {
    /// Build the name and export indices.
    ///
    /// Every function is exported under its own name and its qualified name;
    /// the first one in source order wins a name clash. `defaults` maps a
    /// file to the id bound to its `relPath::default` key.
    pub fn build<'n>(
        functions: impl IntoIterator<Item = &'n FunctionNode>,
        defaults: &HashMap<String, String>,
    ) -> Self {
        let mut index = SymbolIndex::default();

        for node in functions {
            index
                .by_name
                .entry(node.name().to_string())
                .or_default()
                .push((node.rel_path().to_string(), node.id().to_string()));

            index
                .exports
                .entry(export_key(node.rel_path(), node.name()))
                .or_insert_with(|| node.id().to_string());
            if node.owner().is_some() {
                index
                    .exports
                    .entry(export_key(node.rel_path(), &node.qualified_name()))
                    .or_insert_with(|| node.id().to_string());
            }
        }

        for (rel_path, id) in defaults {
            index
                .exports
                .insert(export_key(rel_path, "default"), id.clone());
        }

        index
    }

    pub fn export(&self, rel_path: &str, name: &str) -> Option<&str> {
        self.exports
            .get(&export_key(rel_path, name))
            .map(String::as_str)
    }

    /// Id of the only function called `name`, optionally restricted to one file
    fn unique(&self, name: &str, in_file: Option<&str>) -> Option<&str> {
        let candidates = self.by_name.get(name)?;
        let mut matching = candidates
            .iter()
            .filter(|(file, _)| in_file.map_or(true, |f| f == file.as_str()));
        let (_, id) = matching.next()?;
        if matching.next().is_some() {
            return None;
        }
        Some(id)
    }
}

fn export_key(rel_path: &str, name: &str) -> String {
    format!("{}::{}", rel_path, name)
}

/// A call site to resolve
#[derive(Debug, Clone, Copy)]
pub struct CallSite<'a> {
    /// File containing the call
    pub rel_path: &'a str,
    pub callee_name: &'a str,
    pub callee_object: Option<&'a str>,
    /// Import bindings of the calling file, specifiers already resolved
    pub imports: &'a ImportMap,
}

/// A successful resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub target: String,
    pub strategy: ResolutionStrategy,
}

/// Resolves call sites against a [`SymbolIndex`]
pub struct NameResolver<'a> {
    index: &'a SymbolIndex,
}

impl<'a> NameResolver<'a> {
    pub fn new(index: &'a SymbolIndex) -> Self {
        Self { index }
    }

    pub fn resolve(&self, call: &CallSite<'_>) -> Option<Resolution> {
        self.via_import(call)
            .map(|t| (t, ResolutionStrategy::ImportBinding))
            .or_else(|| {
                self.via_namespace(call)
                    .map(|t| (t, ResolutionStrategy::NamespaceMember))
            })
            .or_else(|| {
                self.index
                    .unique(call.callee_name, Some(call.rel_path))
                    .map(|t| (t, ResolutionStrategy::SameFile))
            })
            .or_else(|| {
                if is_builtin_name(call.callee_name) {
                    return None;
                }
                self.index
                    .unique(call.callee_name, None)
                    .map(|t| (t, ResolutionStrategy::GlobalUnique))
            })
            .map(|(target, strategy)| Resolution {
                target: target.to_string(),
                strategy,
            })
    }

    fn via_import(&self, call: &CallSite<'_>) -> Option<&'a str> {
        if call.callee_object.is_some() {
            return None;
        }
        let binding = call.imports.get(call.callee_name)?;
        if binding.is_namespace {
            return None;
        }
        self.lookup(binding, &binding.exported_name)
    }

    fn via_namespace(&self, call: &CallSite<'_>) -> Option<&'a str> {
        let object = call.callee_object?;
        let binding = call.imports.get(object)?;
        if !binding.is_namespace {
            return None;
        }
        self.lookup(binding, call.callee_name)
    }

    fn lookup(&self, binding: &ImportBinding, name: &str) -> Option<&'a str> {
        let file = binding.resolved_file.as_deref()?;
        self.index.export(file, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_dots() {
        assert_eq!(normalize("api/../db/./users").as_deref(), Some("db/users"));
        assert_eq!(normalize("../outside"), None);
    }

    #[test]
    fn module_resolution_probes_extensions_and_index() {
        let files: HashSet<String> = ["db/users.js", "lib/index.ts", "api/handlers.ts"]
            .into_iter()
            .map(String::from)
            .collect();
        let resolver = ModuleResolver::new(&files);

        assert_eq!(
            resolver.resolve("../db/users", "api/handlers.ts").as_deref(),
            Some("db/users.js")
        );
        assert_eq!(
            resolver.resolve("./lib", "main.js").as_deref(),
            Some("lib/index.ts")
        );
        assert_eq!(resolver.resolve("lodash", "main.js"), None);
    }

    #[test]
    fn builtin_names() {
        assert!(is_builtin_name("map"));
        assert!(is_builtin_name("get"));
        assert!(!is_builtin_name("transformUser"));
    }
}
