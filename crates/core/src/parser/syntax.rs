//! Closed set of syntax constructs the extractor understands
//!
//! Tree-sitter reports node kinds as strings. They are mapped into
//! [`SyntaxKind`] once, and the walker matches on the enum, so every construct
//! it consumes is spelled out in one place.

use tree_sitter::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    /// `function f() {}`, `function* f() {}`
    FunctionDeclaration,
    /// `function () {}` used as a value
    FunctionExpression,
    /// `() => {}`
    ArrowFunction,
    /// Class or object-literal method
    MethodDefinition,
    /// Class declaration or class expression
    Class,
    /// `x = value` inside `const` / `let` / `var`
    VariableDeclarator,
    /// `target = value` as an expression
    Assignment,
    /// `key: value` in an object literal
    Pair,
    /// Class field, `handler = () => {}` inside a class body
    FieldDefinition,
    Export,
    Import,
    Call,
    If,
    For,
    ForIn,
    While,
    Do,
    SwitchCase,
    Catch,
    Ternary,
    /// Binary operator; only the short-circuit ones count as branches
    Binary,
    Other,
}

impl SyntaxKind {
    pub fn of(node: &Node<'_>) -> Self {
        Self::from_kind(node.kind())
    }

    pub fn from_kind(kind: &str) -> Self {
        match kind {
            "function_declaration" | "generator_function_declaration" => Self::FunctionDeclaration,
            "function_expression" | "function" | "generator_function" => Self::FunctionExpression,
            "arrow_function" => Self::ArrowFunction,
            "method_definition" => Self::MethodDefinition,
            "class_declaration" | "abstract_class_declaration" | "class" => Self::Class,
            "variable_declarator" => Self::VariableDeclarator,
            "assignment_expression" => Self::Assignment,
            "pair" => Self::Pair,
            "field_definition" | "public_field_definition" => Self::FieldDefinition,
            "export_statement" => Self::Export,
            "import_statement" => Self::Import,
            "call_expression" => Self::Call,
            "if_statement" => Self::If,
            "for_statement" => Self::For,
            "for_in_statement" => Self::ForIn,
            "while_statement" => Self::While,
            "do_statement" => Self::Do,
            "switch_case" => Self::SwitchCase,
            "catch_clause" => Self::Catch,
            "ternary_expression" => Self::Ternary,
            "binary_expression" => Self::Binary,
            _ => Self::Other,
        }
    }

    /// Callable value that is not itself a declaration
    pub fn is_function_value(self) -> bool {
        matches!(self, Self::FunctionExpression | Self::ArrowFunction)
    }

    /// Constructs that always add one to cyclomatic complexity
    pub fn is_branch(self) -> bool {
        matches!(
            self,
            Self::If
                | Self::For
                | Self::ForIn
                | Self::While
                | Self::Do
                | Self::SwitchCase
                | Self::Catch
                | Self::Ternary
        )
    }
}

/// Short-circuit operators counted as decision points
pub fn is_logical_operator(op: &str) -> bool {
    matches!(op, "&&" | "||" | "??")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_both_function_expression_spellings() {
        assert_eq!(
            SyntaxKind::from_kind("function_expression"),
            SyntaxKind::FunctionExpression
        );
        assert_eq!(SyntaxKind::from_kind("function"), SyntaxKind::FunctionExpression);
    }

    #[test]
    fn branch_kinds() {
        assert!(SyntaxKind::from_kind("catch_clause").is_branch());
        assert!(!SyntaxKind::from_kind("binary_expression").is_branch());
        assert!(!SyntaxKind::from_kind("statement_block").is_branch());
        assert!(is_logical_operator("??"));
        assert!(!is_logical_operator("+"));
    }
}
