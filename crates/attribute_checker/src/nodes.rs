//! Small syntax-tree queries shared by class collection and inference.

use tree_sitter::Node;
use vetting_common::node_text;

/// Node kinds that open a new name scope.
pub const SCOPE_KINDS: [&str; 3] = ["function_definition", "class_definition", "lambda"];

/// Returns `true` for `__name__`-style attributes.
#[must_use]
pub fn is_dunder(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}

/// Returns `true` when `node` is written to or deleted rather than read.
///
/// Walks up through tuple and list targets so `a.x, b.y = ...` counts as
/// two stores.
#[must_use]
pub fn is_store(node: Node<'_>) -> bool {
    let mut current = node;
    while let Some(parent) = current.parent() {
        match parent.kind() {
            "assignment" | "augmented_assignment" | "for_statement" | "for_in_clause" => {
                return parent
                    .child_by_field_name("left")
                    .is_some_and(|left| left.id() == current.id());
            }
            "delete_statement" => return true,
            "pattern_list" | "tuple_pattern" | "list_pattern" | "expression_list" | "tuple"
            | "list" | "parenthesized_expression" | "list_splat_pattern" => current = parent,
            _ => return false,
        }
    }
    false
}

/// Collects the names a target expression binds.
///
/// Attribute and subscript targets bind nothing, so their operands are not
/// visited.
pub fn binding_targets<'s>(node: Node<'_>, source: &'s str, names: &mut Vec<&'s str>) {
    match node.kind() {
        "identifier" => names.push(node_text(node, source)),
        "attribute" | "subscript" => {}
        _ => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                binding_targets(child, source, names);
            }
        }
    }
}

/// Returns the body of a string literal node without prefix or quotes.
#[must_use]
pub fn string_body(node: Node<'_>, source: &str) -> Option<String> {
    if node.kind() != "string" {
        return None;
    }
    let mut cursor = node.walk();
    let body = node
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "string_content")
        .map(|child| node_text(child, source))
        .collect();
    Some(body)
}

/// Returns `true` when a string literal carries a `b` prefix.
#[must_use]
pub fn is_bytes_literal(node: Node<'_>, source: &str) -> bool {
    node_text(node, source)
        .chars()
        .take_while(|c| *c != '"' && *c != '\'')
        .any(|c| c.eq_ignore_ascii_case(&'b'))
}

/// Returns the decorator expression text of `definition`, without `@`.
#[must_use]
pub fn decorators<'s>(definition: Node<'_>, source: &'s str) -> Vec<&'s str> {
    let Some(parent) = definition.parent().filter(|p| p.kind() == "decorated_definition") else {
        return Vec::new();
    };
    let mut cursor = parent.walk();
    parent
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "decorator")
        .map(|decorator| node_text(decorator, source).trim_start_matches('@').trim())
        .collect()
}

/// Returns the `class_definition` whose body directly holds `definition`.
#[must_use]
pub fn enclosing_class(definition: Node<'_>) -> Option<Node<'_>> {
    let mut container = definition.parent()?;
    if container.kind() == "decorated_definition" {
        container = container.parent()?;
    }
    if container.kind() != "block" {
        return None;
    }
    container.parent().filter(|class| class.kind() == "class_definition")
}
