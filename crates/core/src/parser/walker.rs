//! Single-pass extraction over a JavaScript/TypeScript syntax tree

use super::syntax::{is_logical_operator, SyntaxKind};
use super::{FileExtraction, ImportBinding, RawCall};
use crate::graph::{FunctionDef, FunctionKind};
use tree_sitter::{Node, Tree};

/// Extract functions, calls and imports from a parsed tree
pub(crate) fn extract(tree: &Tree, source: &str, rel_path: &str) -> FileExtraction {
    let mut walker = Walker {
        source: source.as_bytes(),
        out: FileExtraction::empty(rel_path),
        classes: Vec::new(),
    };
    walker.visit_children(tree.root_node(), None);
    walker.out
}

struct Walker<'s> {
    source: &'s [u8],
    out: FileExtraction,
    /// Names of the classes currently being walked, innermost last
    classes: Vec<String>,
}

impl<'s> Walker<'s> {
    fn text(&self, node: Node<'_>) -> &'s str {
        node.utf8_text(self.source).unwrap_or("")
    }

    fn visit_children(&mut self, node: Node<'_>, current: Option<usize>) {
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
        for child in children {
            self.visit(child, current);
        }
    }

    /// `current` is the index of the function that owns whatever is found
    /// below `node`, or `None` at module scope.
    fn visit(&mut self, node: Node<'_>, current: Option<usize>) {
        match SyntaxKind::of(&node) {
            SyntaxKind::FunctionDeclaration => {
                self.visit_function_declaration(node);
            }
            SyntaxKind::FunctionExpression | SyntaxKind::ArrowFunction => {
                self.visit_function_value(node, current)
            }
            SyntaxKind::MethodDefinition => self.visit_method(node),
            SyntaxKind::Class => self.visit_class(node, None, current),
            SyntaxKind::VariableDeclarator => self.visit_declarator(node, current),
            SyntaxKind::Assignment => self.visit_assignment(node, current),
            SyntaxKind::Pair => self.visit_pair(node, current),
            SyntaxKind::FieldDefinition => self.visit_field(node, current),
            SyntaxKind::Export => self.visit_export(node, current),
            SyntaxKind::Import => self.visit_import(node),
            SyntaxKind::Call => self.visit_call(node, current),
            SyntaxKind::If
            | SyntaxKind::For
            | SyntaxKind::ForIn
            | SyntaxKind::While
            | SyntaxKind::Do
            | SyntaxKind::SwitchCase
            | SyntaxKind::Catch
            | SyntaxKind::Ternary => {
                self.bump_complexity(current);
                self.visit_children(node, current);
            }
            SyntaxKind::Binary => {
                let logical = node
                    .child_by_field_name("operator")
                    .is_some_and(|op| is_logical_operator(self.text(op)));
                if logical {
                    self.bump_complexity(current);
                }
                self.visit_children(node, current);
            }
            SyntaxKind::Other => self.visit_children(node, current),
        }
    }

    fn bump_complexity(&mut self, current: Option<usize>) {
        if let Some(idx) = current {
            self.out.functions[idx].complexity += 1;
        }
    }

    fn push_function(&mut self, mut def: FunctionDef, callable: Node<'_>) -> usize {
        def.params = self.count_params(callable);
        self.out.functions.push(def);
        self.out.functions.len() - 1
    }

    /// Register `callable` under `name` and walk its body as that function.
    /// `anchor` supplies the start line (the declarator or assignment).
    fn bind_callable(
        &mut self,
        name: &str,
        owner: Option<String>,
        kind: FunctionKind,
        callable: Node<'_>,
        anchor: Node<'_>,
    ) -> usize {
        let mut def = FunctionDef::new(
            name,
            kind,
            anchor.start_position().row + 1,
            callable.end_position().row + 1,
        );
        def.owner = owner;
        let idx = self.push_function(def, callable);
        self.visit_callable_body(callable, idx);
        idx
    }

    fn visit_callable_body(&mut self, callable: Node<'_>, idx: usize) {
        if let Some(params) = callable.child_by_field_name("parameters") {
            // default values can call things
            self.visit_children(params, Some(idx));
        }
        if let Some(body) = callable.child_by_field_name("body") {
            self.visit(body, Some(idx));
        }
    }

    fn count_params(&self, callable: Node<'_>) -> usize {
        if let Some(params) = callable.child_by_field_name("parameters") {
            let mut cursor = params.walk();
            let count = params
                .named_children(&mut cursor)
                .filter(|p| p.kind() != "comment")
                .count();
            return count;
        }
        // `x => x + 1`
        usize::from(callable.child_by_field_name("parameter").is_some())
    }

    fn value_kind(node: Node<'_>) -> FunctionKind {
        match SyntaxKind::of(&node) {
            SyntaxKind::ArrowFunction => FunctionKind::Arrow,
            _ => FunctionKind::Function,
        }
    }

    // ── Function forms ──────────────────────────────────────────

    fn visit_function_declaration(&mut self, node: Node<'_>) -> Option<usize> {
        let Some(name_node) = node.child_by_field_name("name") else {
            self.visit_function_value(node, None);
            return None;
        };
        let name = self.text(name_node);
        Some(self.bind_callable(name, None, FunctionKind::Function, node, node))
    }

    /// A function used as a value with no name to bind it to. Inside another
    /// function it is folded into that function; at module scope it becomes
    /// an anonymous callable of its own.
    fn visit_function_value(&mut self, node: Node<'_>, current: Option<usize>) {
        if current.is_some() {
            self.visit_children(node, current);
            return;
        }

        let line = node.start_position().row + 1;
        match node.child_by_field_name("name") {
            Some(name_node) => {
                let name = self.text(name_node);
                self.bind_callable(name, None, FunctionKind::Function, node, node);
            }
            None => {
                let name = format!("<anonymous>@L{}", line);
                self.bind_callable(&name, None, FunctionKind::Anonymous, node, node);
            }
        }
    }

    fn visit_method(&mut self, node: Node<'_>) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = self.text(name_node);
        let in_class = node.parent().is_some_and(|p| p.kind() == "class_body");
        let owner = if in_class {
            self.classes.last().cloned()
        } else {
            None
        };
        self.bind_callable(name, owner, FunctionKind::Method, node, node);
    }

    fn visit_class(&mut self, node: Node<'_>, name_hint: Option<&str>, current: Option<usize>) {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n))
            .or(name_hint)
            .unwrap_or("<class>")
            .to_string();

        self.classes.push(name);
        if let Some(body) = node.child_by_field_name("body") {
            self.visit_children(body, current);
        }
        self.classes.pop();
    }

    fn visit_field(&mut self, node: Node<'_>, current: Option<usize>) {
        let name_node = node
            .child_by_field_name("property")
            .or_else(|| node.child_by_field_name("name"));
        let value = node.child_by_field_name("value");

        match (name_node, value) {
            (Some(name_node), Some(value)) if SyntaxKind::of(&value).is_function_value() => {
                let name = self.text(name_node);
                let owner = self.classes.last().cloned();
                self.bind_callable(name, owner, FunctionKind::Method, value, node);
            }
            _ => self.visit_children(node, current),
        }
    }

    fn visit_declarator(&mut self, node: Node<'_>, current: Option<usize>) {
        let (Some(name_node), Some(value)) = (
            node.child_by_field_name("name"),
            node.child_by_field_name("value"),
        ) else {
            return;
        };

        if let Some(specifier) = self.require_specifier(value) {
            self.record_require(name_node, specifier);
            return;
        }

        let value_kind = SyntaxKind::of(&value);
        if name_node.kind() == "identifier" {
            let name = self.text(name_node);
            if value_kind.is_function_value() {
                self.bind_callable(name, None, Self::value_kind(value), value, node);
                return;
            }
            if value_kind == SyntaxKind::Class {
                self.visit_class(value, Some(name), current);
                return;
            }
        }

        self.visit(value, current);
    }

    fn visit_assignment(&mut self, node: Node<'_>, current: Option<usize>) {
        let (Some(left), Some(right)) = (
            node.child_by_field_name("left"),
            node.child_by_field_name("right"),
        ) else {
            return;
        };
        let right_kind = SyntaxKind::of(&right);

        if self.text(left) == "module.exports" {
            if right.kind() == "identifier" {
                self.out.default_export = Some(self.text(right).to_string());
                return;
            }
            if right_kind.is_function_value() {
                let (name, kind) = match right.child_by_field_name("name") {
                    Some(n) => (self.text(n).to_string(), FunctionKind::Function),
                    None => ("default".to_string(), FunctionKind::Anonymous),
                };
                self.bind_callable(&name, None, kind, right, node);
                self.out.default_export = Some(name);
                return;
            }
        }

        if right_kind.is_function_value() {
            match left.kind() {
                "identifier" => {
                    let name = self.text(left);
                    self.bind_callable(name, None, Self::value_kind(right), right, node);
                    return;
                }
                "member_expression" => {
                    if let Some(property) = left.child_by_field_name("property") {
                        let name = self.text(property);
                        let owner = self.prototype_owner(left);
                        self.bind_callable(name, owner, Self::value_kind(right), right, node);
                        return;
                    }
                }
                _ => {}
            }
        }

        self.visit_children(node, current);
    }

    /// `Foo` for a `Foo.prototype.bar` assignment target
    fn prototype_owner(&self, member: Node<'_>) -> Option<String> {
        let object = member.child_by_field_name("object")?;
        if object.kind() != "member_expression" {
            return None;
        }
        let property = object.child_by_field_name("property")?;
        if self.text(property) != "prototype" {
            return None;
        }
        let owner = object.child_by_field_name("object")?;
        Some(self.text(owner).to_string())
    }

    fn visit_pair(&mut self, node: Node<'_>, current: Option<usize>) {
        let (Some(key), Some(value)) = (
            node.child_by_field_name("key"),
            node.child_by_field_name("value"),
        ) else {
            return;
        };

        if SyntaxKind::of(&value).is_function_value() {
            let name = strip_quotes(self.text(key));
            self.bind_callable(name, None, FunctionKind::Method, value, node);
            return;
        }
        self.visit(value, current);
    }

    // ── Modules ─────────────────────────────────────────────────

    fn visit_export(&mut self, node: Node<'_>, current: Option<usize>) {
        let mut cursor = node.walk();
        let is_default = node.children(&mut cursor).any(|c| c.kind() == "default");

        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
        for child in children {
            let kind = SyntaxKind::of(&child);
            match kind {
                SyntaxKind::FunctionDeclaration => {
                    let idx = self.visit_function_declaration(child);
                    if is_default {
                        if let Some(idx) = idx {
                            let name = self.out.functions[idx].qualified_name();
                            self.out.default_export = Some(name);
                        }
                    }
                }
                SyntaxKind::FunctionExpression | SyntaxKind::ArrowFunction if is_default => {
                    let (name, fn_kind) = match child.child_by_field_name("name") {
                        Some(n) => (self.text(n).to_string(), FunctionKind::Function),
                        None => ("default".to_string(), FunctionKind::Anonymous),
                    };
                    self.bind_callable(&name, None, fn_kind, child, child);
                    self.out.default_export = Some(name);
                }
                _ if is_default && child.kind() == "identifier" => {
                    self.out.default_export = Some(self.text(child).to_string());
                }
                _ => self.visit(child, current),
            }
        }
    }

    fn visit_import(&mut self, node: Node<'_>) {
        let Some(source) = node.child_by_field_name("source") else {
            return;
        };
        let specifier = strip_quotes(self.text(source)).to_string();

        let mut cursor = node.walk();
        let Some(clause) = node
            .named_children(&mut cursor)
            .find(|c| c.kind() == "import_clause")
        else {
            return;
        };

        let mut cursor = clause.walk();
        let parts: Vec<Node<'_>> = clause.named_children(&mut cursor).collect();
        for part in parts {
            match part.kind() {
                "identifier" => {
                    let local = self.text(part).to_string();
                    self.out
                        .imports
                        .insert(local, ImportBinding::named(&specifier, "default"));
                }
                "namespace_import" => {
                    let mut cursor = part.walk();
                    let local = part
                        .named_children(&mut cursor)
                        .find(|c| c.kind() == "identifier")
                        .map(|c| self.text(c).to_string());
                    if let Some(local) = local {
                        self.out
                            .imports
                            .insert(local, ImportBinding::namespace(&specifier));
                    }
                }
                "named_imports" => {
                    let mut cursor = part.walk();
                    let specs: Vec<Node<'_>> = part
                        .named_children(&mut cursor)
                        .filter(|c| c.kind() == "import_specifier")
                        .collect();
                    for spec in specs {
                        let Some(name) = spec.child_by_field_name("name") else {
                            continue;
                        };
                        let exported = self.text(name).to_string();
                        let local = spec
                            .child_by_field_name("alias")
                            .map(|a| self.text(a).to_string())
                            .unwrap_or_else(|| exported.clone());
                        self.out
                            .imports
                            .insert(local, ImportBinding::named(&specifier, exported));
                    }
                }
                _ => {}
            }
        }
    }

    /// Module specifier of a `require('...')` call
    fn require_specifier(&self, node: Node<'_>) -> Option<String> {
        if SyntaxKind::of(&node) != SyntaxKind::Call {
            return None;
        }
        let function = node.child_by_field_name("function")?;
        if self.text(function) != "require" {
            return None;
        }
        let args = node.child_by_field_name("arguments")?;
        let mut cursor = args.walk();
        let first = args.named_children(&mut cursor).next()?;
        if first.kind() != "string" {
            return None;
        }
        Some(strip_quotes(self.text(first)).to_string())
    }

    fn record_require(&mut self, pattern: Node<'_>, specifier: String) {
        match pattern.kind() {
            "identifier" => {
                let local = self.text(pattern).to_string();
                self.out
                    .imports
                    .insert(local, ImportBinding::namespace(specifier));
            }
            "object_pattern" => {
                let mut cursor = pattern.walk();
                let props: Vec<Node<'_>> = pattern.named_children(&mut cursor).collect();
                for prop in props {
                    match prop.kind() {
                        "shorthand_property_identifier_pattern" => {
                            let name = self.text(prop).to_string();
                            self.out
                                .imports
                                .insert(name.clone(), ImportBinding::named(&specifier, name));
                        }
                        "pair_pattern" => {
                            let (Some(key), Some(value)) = (
                                prop.child_by_field_name("key"),
                                prop.child_by_field_name("value"),
                            ) else {
                                continue;
                            };
                            if value.kind() != "identifier" {
                                continue;
                            }
                            let exported = strip_quotes(self.text(key)).to_string();
                            let local = self.text(value).to_string();
                            self.out
                                .imports
                                .insert(local, ImportBinding::named(&specifier, exported));
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    // ── Calls ───────────────────────────────────────────────────

    fn visit_call(&mut self, node: Node<'_>, current: Option<usize>) {
        if let (Some(caller), Some(function)) = (current, node.child_by_field_name("function")) {
            let target = match function.kind() {
                "identifier" => Some((self.text(function).to_string(), None)),
                "member_expression" => function.child_by_field_name("property").map(|p| {
                    let object = function
                        .child_by_field_name("object")
                        .map(|o| compact(self.text(o)));
                    (self.text(p).to_string(), object)
                }),
                _ => None,
            };

            if let Some((callee_name, callee_object)) = target {
                self.out.calls.push(RawCall {
                    caller,
                    callee_name,
                    callee_object,
                    line: node.start_position().row + 1,
                });
            }
        }

        self.visit_children(node, current);
    }
}

fn strip_quotes(s: &str) -> &str {
    s.trim_matches(|c| c == '"' || c == '\'' || c == '`')
}

/// Receiver text with whitespace removed, for multi-line chains
fn compact(s: &str) -> String {
    s.split_whitespace().collect()
}
