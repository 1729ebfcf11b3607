//! Extraction of import references from a Python syntax tree.

use vetting_common::{SourceLocation, node_text};
use tree_sitter::Node;

/// One module reference made by an import statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportReference {
    /// Dotted module path without leading dots; empty for `from . import x`.
    pub module: String,
    /// Number of leading dots; zero for absolute imports.
    pub level: usize,
    /// The submodule named by `from . import name`; each name imported
    /// that way is its own reference.
    pub imported: Option<String>,
    /// Position of the module name in the source.
    pub location: SourceLocation,
    /// Whether the import sits in a `try` body that handles `ImportError`.
    pub guarded: bool,
}

impl ImportReference {
    /// Returns the first segment of the dotted path.
    #[must_use]
    pub fn top_level(&self) -> &str {
        self.module.split('.').next().unwrap_or_default()
    }

    /// Renders the module with its leading dots, as `from` would name it.
    #[must_use]
    pub fn display_name(&self) -> String {
        let dots = ".".repeat(self.level);
        match &self.imported {
            Some(name) if self.module.is_empty() => format!("{dots}{name}"),
            Some(name) => format!("{dots}{}.{name}", self.module),
            None => format!("{dots}{}", self.module),
        }
    }
}

/// Collects every import reference in `root`, in source order.
#[must_use]
pub fn collect_imports(root: Node<'_>, source: &str) -> Vec<ImportReference> {
    let mut references = Vec::new();
    visit(root, source, &mut references);
    references
}

fn visit(node: Node<'_>, source: &str, references: &mut Vec<ImportReference>) {
    match node.kind() {
        "import_statement" => {
            let mut cursor = node.walk();
            for name in node.children_by_field_name("name", &mut cursor) {
                let dotted = imported_module(name);
                references.push(ImportReference {
                    module: node_text(dotted, source).to_owned(),
                    level: 0,
                    imported: None,
                    location: SourceLocation::of_node(dotted),
                    guarded: is_guarded(node, source),
                });
            }
        }
        "import_from_statement" => references.extend(from_import(node, source)),
        // `from __future__ import ...` always resolves.
        "future_import_statement" => {}
        _ => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                visit(child, source, references);
            }
        }
    }
}

fn imported_module(name: Node<'_>) -> Node<'_> {
    if name.kind() == "aliased_import" {
        name.child_by_field_name("name").unwrap_or(name)
    } else {
        name
    }
}

fn from_import(node: Node<'_>, source: &str) -> Vec<ImportReference> {
    let Some(module_node) = node.child_by_field_name("module_name") else {
        return Vec::new();
    };
    let (level, module) = if module_node.kind() == "relative_import" {
        relative_parts(module_node, source)
    } else {
        (0, node_text(module_node, source).to_owned())
    };
    let guarded = is_guarded(node, source);

    if level == 0 || !module.is_empty() {
        return vec![ImportReference {
            module,
            level,
            imported: None,
            location: SourceLocation::of_node(module_node),
            guarded,
        }];
    }

    let mut cursor = node.walk();
    node.children_by_field_name("name", &mut cursor)
        .map(|name| {
            let submodule = imported_module(name);
            ImportReference {
                module: String::new(),
                level,
                imported: Some(node_text(submodule, source).to_owned()),
                location: SourceLocation::of_node(submodule),
                guarded,
            }
        })
        .collect()
}

fn relative_parts(relative: Node<'_>, source: &str) -> (usize, String) {
    let mut level = 0;
    let mut module = String::new();
    let mut cursor = relative.walk();
    for child in relative.children(&mut cursor) {
        match child.kind() {
            "import_prefix" => level += node_text(child, source).matches('.').count(),
            "dotted_name" => node_text(child, source).clone_into(&mut module),
            _ => {}
        }
    }
    (level, module)
}

/// Returns `true` when `statement` lies inside the body of a `try` whose
/// handlers catch import failures (or everything).
fn is_guarded(statement: Node<'_>, source: &str) -> bool {
    let mut current = statement;
    while let Some(parent) = current.parent() {
        if parent.kind() == "try_statement"
            && parent
                .child_by_field_name("body")
                .is_some_and(|body| body.id() == current.id())
            && handles_import_errors(parent, source)
        {
            return true;
        }
        current = parent;
    }
    false
}

/// Exception names whose handlers make an import optional.
const IMPORT_FAILURES: [&str; 2] = ["ImportError", "ModuleNotFoundError"];

fn handles_import_errors(try_statement: Node<'_>, source: &str) -> bool {
    let mut cursor = try_statement.walk();
    try_statement
        .children(&mut cursor)
        .filter(|child| child.kind() == "except_clause")
        .any(|clause| {
            let header = node_text(clause, source)
                .split(':')
                .next()
                .unwrap_or_default();
            let trimmed = header.trim();
            let caught = trimmed
                .strip_prefix("except")
                .unwrap_or(trimmed)
                .split(" as ")
                .next()
                .unwrap_or_default();
            caught.trim().is_empty() || catches_import_failure(caught)
        })
}

/// Whether any exception named in `caught` is an import failure, matching
/// whole identifiers and ignoring module qualifiers.
fn catches_import_failure(caught: &str) -> bool {
    caught
        .split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.'))
        .filter_map(|name| name.rsplit('.').next())
        .any(|name| IMPORT_FAILURES.contains(&name))
}
