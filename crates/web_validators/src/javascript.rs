//! Classic script validation.
//!
//! The grammar also accepts module syntax and JSX; both are rejected here
//! because a browser loading the asset as a plain script would not run
//! them. The grammar does not enforce the language's static rules either,
//! so a handful of them are checked over the tree.

use crate::{Rejection, WebAssetKind, find_node, parse_strict};
use tree_sitter::Node;
use vetting_common::{SourceLocation, node_text};

const JSX_KINDS: [&str; 3] = ["jsx_element", "jsx_self_closing_element", "jsx_fragment"];

pub(crate) fn validate(content: &str) -> Result<(), Rejection> {
    let tree = parse_strict(WebAssetKind::JavaScript, content)?;
    let offending = find_node(tree.root_node(), &|node| {
        is_module_syntax(node, content) || JSX_KINDS.contains(&node.kind())
    });
    let Some(node) = offending else {
        return first_early_error(tree.root_node(), content);
    };
    let line = SourceLocation::of_node(node).line();
    if is_module_syntax(node, content) {
        Err(Rejection::ModuleSyntax { line })
    } else {
        Err(Rejection::Jsx { line })
    }
}

fn is_module_syntax(node: Node<'_>, source: &str) -> bool {
    match node.kind() {
        "import_statement" | "export_statement" => true,
        "meta_property" => node_text(node, source).starts_with("import"),
        _ => false,
    }
}

/// What encloses a node, as far as the static rules care.
#[derive(Clone, Copy, Debug, Default)]
struct Scope {
    function: bool,
    generator: bool,
    strict: bool,
}

impl Scope {
    fn enter(self, node: Node<'_>, source: &str) -> Self {
        match node.kind() {
            "function_declaration" | "function_expression" | "function" | "arrow_function"
            | "generator_function" | "generator_function_declaration" | "method_definition" => {
                Self {
                    function: true,
                    generator: node.kind().starts_with("generator") || is_generator_method(node),
                    strict: self.strict
                        || node
                            .child_by_field_name("body")
                            .is_some_and(|body| has_use_strict(body, source)),
                }
            }
            "class_body" => Self {
                strict: true,
                ..self
            },
            "class_static_block" => Self {
                function: false,
                generator: false,
                strict: true,
            },
            _ => self,
        }
    }
}

fn first_early_error(root: Node<'_>, source: &str) -> Result<(), Rejection> {
    let scope = Scope {
        strict: has_use_strict(root, source),
        ..Scope::default()
    };
    match early_error(root, source, scope) {
        Some((node, reason)) => {
            let location = SourceLocation::of_node(node);
            Err(Rejection::EarlyError {
                line: location.line(),
                column: location.column(),
                reason,
            })
        }
        None => Ok(()),
    }
}

fn early_error<'t>(
    node: Node<'t>,
    source: &str,
    scope: Scope,
) -> Option<(Node<'t>, &'static str)> {
    let reason = match node.kind() {
        "return_statement" if !scope.function => Some("'return' outside of a function"),
        "with_statement" if scope.strict => Some("'with' in strict mode code"),
        "yield_expression" if !scope.generator => Some("'yield' outside of a generator"),
        "variable_declarator" if binds_let(node, source) => {
            Some("'let' cannot name a lexical binding")
        }
        _ => None,
    };
    if let Some(reason) = reason {
        return Some((node, reason));
    }

    let inner = scope.enter(node, source);
    let mut cursor = node.walk();
    let children: Vec<_> = node.named_children(&mut cursor).collect();
    children
        .into_iter()
        .find_map(|child| early_error(child, source, inner))
}

fn is_generator_method(node: Node<'_>) -> bool {
    let mut cursor = node.walk();
    node.kind() == "method_definition" && node.children(&mut cursor).any(|child| child.kind() == "*")
}

/// Whether the directive prologue of `body` contains `"use strict"`.
fn has_use_strict(body: Node<'_>, source: &str) -> bool {
    let mut cursor = body.walk();
    body.named_children(&mut cursor)
        .filter(|statement| statement.kind() != "comment")
        .map_while(|statement| directive(statement, source))
        .any(|prologue| prologue == "use strict")
}

fn directive<'s>(statement: Node<'_>, source: &'s str) -> Option<&'s str> {
    if statement.kind() != "expression_statement" || statement.named_child_count() != 1 {
        return None;
    }
    let literal = statement.named_child(0).filter(|child| child.kind() == "string")?;
    Some(node_text(literal, source).trim_matches(|c| c == '\'' || c == '"'))
}

fn binds_let(declarator: Node<'_>, source: &str) -> bool {
    declarator
        .parent()
        .is_some_and(|parent| parent.kind() == "lexical_declaration")
        && declarator
            .child_by_field_name("name")
            .is_some_and(|name| node_text(name, source) == "let")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("let x = 1;")]
    #[case("function add(a, b) { return a + b; }\nconsole.log(add(1, 2));")]
    #[case("import('./lazy.js').then((m) => m.run());")]
    #[case("class A { constructor() { this.t = new.target; } }")]
    #[case("function* ids() { let n = 0; while (true) { yield n++; } }")]
    #[case("const o = { *entries() { yield 1; } };")]
    #[case("with (Math) { max(1, 2); }")]
    #[case("function f() { 'use strict'; return 1; }\nwith (o) {}")]
    fn accepts_scripts(#[case] content: &str) {
        assert_eq!(validate(content), Ok(()));
    }

    #[rstest]
    #[case("let x = ;")]
    #[case("function (")]
    fn rejects_syntax_errors(#[case] content: &str) {
        assert!(matches!(validate(content), Err(Rejection::Syntax { .. })));
    }

    #[rstest]
    #[case("import x from './x.js';", 1)]
    #[case("const a = 1;\nexport default a;", 2)]
    fn rejects_module_syntax(#[case] content: &str, #[case] line: usize) {
        assert_eq!(validate(content), Err(Rejection::ModuleSyntax { line }));
    }

    #[rstest]
    fn rejects_jsx() {
        assert_eq!(
            validate("const view = <App />;"),
            Err(Rejection::Jsx { line: 1 })
        );
    }

    #[rstest]
    #[case("return 1;", "'return' outside of a function")]
    #[case("'use strict'; with (o) {}", "'with' in strict mode code")]
    #[case("function f() { \"use strict\"; with (o) {} }", "'with' in strict mode code")]
    #[case("class A { m() { with (o) {} } }", "'with' in strict mode code")]
    #[case("let let = 1;", "'let' cannot name a lexical binding")]
    #[case("a => { yield 1 }", "'yield' outside of a generator")]
    #[case("function* g() { const f = () => { yield 1; }; }", "'yield' outside of a generator")]
    fn rejects_static_rule_violations(#[case] content: &str, #[case] expected: &str) {
        assert!(
            matches!(validate(content), Err(Rejection::EarlyError { reason, .. }) if reason == expected),
            "unexpected outcome for {content:?}: {:?}",
            validate(content)
        );
    }
}
