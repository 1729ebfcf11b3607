//! Attribute tables for classes defined in the artefact.
//!
//! A table is *open* when the checker cannot see every attribute an
//! instance may carry: an unknown base class, a `metaclass`, a custom
//! `__getattr__`, a non-`dataclass` decorator, or conditional class-body
//! code. Findings against open tables are reported at low confidence.

use crate::nodes::{decorators, is_store, string_body};
use std::collections::{BTreeSet, HashMap, HashSet};
use tree_sitter::Node;
use vetting_common::node_text;

/// What a class table says about one attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookup {
    /// The class or one of its local bases defines it.
    Found,
    /// No table defines it; `open` is set when some table in the hierarchy
    /// is incomplete.
    Missing {
        /// Whether the hierarchy has an incomplete table.
        open: bool,
    },
    /// The class is not known, or is defined more than once.
    Unknown,
}

#[derive(Clone, Debug, Default)]
struct ClassInfo {
    attributes: BTreeSet<String>,
    bases: Vec<String>,
    open: bool,
}

/// Every class defined in one artefact.
#[derive(Clone, Debug, Default)]
pub struct ClassTable {
    classes: HashMap<String, ClassInfo>,
    ambiguous: HashSet<String>,
    /// Attribute names stored on any object anywhere in the module.
    stored: HashSet<String>,
    /// Set when the module calls `setattr`.
    dynamic: bool,
}

impl ClassTable {
    /// Builds the table for the module rooted at `root`.
    #[must_use]
    pub fn collect(root: Node<'_>, source: &str) -> Self {
        let mut table = Self::default();
        table.visit(root, source);
        table
    }

    /// Returns `true` when `name` is a single, unambiguous local class.
    #[must_use]
    pub fn is_local_class(&self, name: &str) -> bool {
        self.classes.contains_key(name) && !self.ambiguous.contains(name)
    }

    /// Looks `attribute` up on `class` and its local bases.
    #[must_use]
    pub fn lookup(&self, class: &str, attribute: &str) -> Lookup {
        if !self.is_local_class(class) {
            return Lookup::Unknown;
        }
        if self.stored.contains(attribute) {
            return Lookup::Found;
        }
        let mut visited = HashSet::new();
        self.lookup_in(class, attribute, &mut visited)
    }

    /// Returns every attribute name visible on `class`, for suggestions.
    #[must_use]
    pub fn attributes_of(&self, class: &str) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        let mut pending = vec![class];
        let mut visited = HashSet::new();
        while let Some(current) = pending.pop() {
            if !visited.insert(current) {
                continue;
            }
            if let Some(info) = self.classes.get(current) {
                names.extend(info.attributes.iter().map(String::as_str));
                pending.extend(info.bases.iter().map(String::as_str));
            }
        }
        names
    }

    fn lookup_in<'a>(
        &'a self,
        class: &'a str,
        attribute: &str,
        visited: &mut HashSet<&'a str>,
    ) -> Lookup {
        if !visited.insert(class) {
            // Cyclic hierarchies cannot exist at runtime; give up quietly.
            return Lookup::Missing { open: true };
        }
        let Some(info) = self.classes.get(class) else {
            return Lookup::Missing { open: true };
        };
        if self.ambiguous.contains(class) {
            return Lookup::Missing { open: true };
        }
        if info.attributes.contains(attribute) {
            return Lookup::Found;
        }

        let mut open = info.open || self.dynamic;
        for base in &info.bases {
            match self.lookup_in(base, attribute, visited) {
                Lookup::Found => return Lookup::Found,
                Lookup::Missing { open: base_open } => open |= base_open,
                Lookup::Unknown => open = true,
            }
        }
        Lookup::Missing { open }
    }

    fn visit(&mut self, node: Node<'_>, source: &str) {
        match node.kind() {
            "class_definition" => self.record_class(node, source),
            "attribute" if is_store(node) => {
                if let Some(name) = node.child_by_field_name("attribute") {
                    self.stored.insert(node_text(name, source).to_owned());
                }
            }
            "call" => {
                if node
                    .child_by_field_name("function")
                    .is_some_and(|function| node_text(function, source) == "setattr")
                {
                    self.dynamic = true;
                }
            }
            _ => {}
        }
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.visit(child, source);
        }
    }

    fn record_class(&mut self, class: Node<'_>, source: &str) {
        let Some(name) = class.child_by_field_name("name") else {
            return;
        };
        let name = node_text(name, source).to_owned();
        let mut info = ClassInfo::default();

        if let Some(superclasses) = class.child_by_field_name("superclasses") {
            let mut cursor = superclasses.walk();
            for base in superclasses.named_children(&mut cursor) {
                match base.kind() {
                    "identifier" if node_text(base, source) == "object" => {}
                    "identifier" => info.bases.push(node_text(base, source).to_owned()),
                    _ => info.open = true,
                }
            }
        }
        if decorators(class, source).iter().any(|decorator| !is_dataclass(decorator)) {
            info.open = true;
        }
        if let Some(body) = class.child_by_field_name("body") {
            collect_body(body, source, &mut info);
        }

        if self.classes.contains_key(&name) {
            self.ambiguous.insert(name);
        } else {
            self.classes.insert(name, info);
        }
    }
}

fn is_dataclass(decorator: &str) -> bool {
    let callee = decorator.split('(').next().unwrap_or_default().trim();
    matches!(callee, "dataclass" | "dataclasses.dataclass")
}

fn collect_body(body: Node<'_>, source: &str, info: &mut ClassInfo) {
    let mut cursor = body.walk();
    for statement in body.named_children(&mut cursor) {
        match statement.kind() {
            "function_definition" | "class_definition" => {
                collect_member(statement, source, info);
            }
            "decorated_definition" => {
                if let Some(definition) = statement.child_by_field_name("definition") {
                    collect_member(definition, source, info);
                }
            }
            "expression_statement" => {
                let mut inner = statement.walk();
                for expression in statement.named_children(&mut inner) {
                    if expression.kind() == "assignment" {
                        collect_class_assignment(expression, source, info);
                    }
                }
            }
            "pass_statement" | "comment" => {}
            // Conditional or looping class bodies can define anything.
            _ => info.open = true,
        }
    }
}

fn collect_member(definition: Node<'_>, source: &str, info: &mut ClassInfo) {
    let Some(name) = definition.child_by_field_name("name") else {
        return;
    };
    let name = node_text(name, source);
    info.attributes.insert(name.to_owned());
    if matches!(name, "__getattr__" | "__getattribute__") {
        info.open = true;
    }
    if definition.kind() == "function_definition" {
        collect_self_stores(definition, source, info);
    }
}

fn collect_class_assignment(assignment: Node<'_>, source: &str, info: &mut ClassInfo) {
    let Some(left) = assignment.child_by_field_name("left") else {
        return;
    };
    let mut names = Vec::new();
    crate::nodes::binding_targets(left, source, &mut names);
    if names == ["__slots__"] {
        if let Some(right) = assignment.child_by_field_name("right") {
            collect_slot_names(right, source, info);
        }
    }
    info.attributes.extend(names.into_iter().map(str::to_owned));
}

fn collect_slot_names(node: Node<'_>, source: &str, info: &mut ClassInfo) {
    if let Some(body) = string_body(node, source) {
        info.attributes.insert(body);
        return;
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_slot_names(child, source, info);
    }
}

/// Records `self.<name> = ...` assignments in a method body.
fn collect_self_stores(method: Node<'_>, source: &str, info: &mut ClassInfo) {
    if decorators(method, source)
        .iter()
        .any(|decorator| *decorator == "staticmethod")
    {
        return;
    }
    let Some(receiver) = first_parameter(method, source) else {
        return;
    };
    if let Some(body) = method.child_by_field_name("body") {
        collect_stores_on(body, receiver, source, info);
    }
}

fn collect_stores_on(node: Node<'_>, receiver: &str, source: &str, info: &mut ClassInfo) {
    if node.kind() == "attribute" && is_store(node) {
        let object = node.child_by_field_name("object");
        let attribute = node.child_by_field_name("attribute");
        if let (Some(object), Some(attribute)) = (object, attribute) {
            if node_text(object, source) == receiver {
                info.attributes.insert(node_text(attribute, source).to_owned());
            }
        }
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_stores_on(child, receiver, source, info);
    }
}

/// Returns the name of a function's first positional parameter.
#[must_use]
pub fn first_parameter<'s>(function: Node<'_>, source: &'s str) -> Option<&'s str> {
    let parameters = function.child_by_field_name("parameters")?;
    let mut cursor = parameters.walk();
    let first = parameters.named_children(&mut cursor).next()?;
    match first.kind() {
        "identifier" => Some(node_text(first, source)),
        "typed_parameter" => first
            .named_child(0)
            .filter(|name| name.kind() == "identifier")
            .map(|name| node_text(name, source)),
        "default_parameter" | "typed_default_parameter" => first
            .child_by_field_name("name")
            .map(|name| node_text(name, source)),
        _ => None,
    }
}
