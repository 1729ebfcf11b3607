//! Flow-insensitive type inference and attribute checking per scope.
//!
//! Each scope records one [`Binding`] per name. Assignments that agree on a
//! type keep it; anything else, including every binding construct not
//! modelled here, leaves the name untyped and therefore unchecked.

use crate::Confidence;
use crate::builtins::BuiltinType;
use crate::classes::{ClassTable, Lookup, first_parameter};
use crate::nodes::{
    SCOPE_KINDS, binding_targets, decorators, enclosing_class, is_bytes_literal, is_dunder,
    is_store, string_body,
};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use tree_sitter::Node;
use vetting_common::{SourceLocation, node_text};

/// A type the checker can attribute to a name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InferredType {
    /// One of the builtin types with a fixed attribute table.
    Builtin(BuiltinType),
    /// An instance of a class defined in the artefact.
    Instance(String),
}

impl fmt::Display for InferredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(builtin) => builtin.fmt(f),
            Self::Instance(class) => f.write_str(class),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Binding {
    Typed {
        ty: InferredType,
        confidence: Confidence,
    },
    Untyped,
}

impl Binding {
    fn typed(inferred: Option<(InferredType, Confidence)>) -> Self {
        inferred.map_or(Self::Untyped, |(ty, confidence)| Self::Typed { ty, confidence })
    }

    fn merge(self, other: Self) -> Self {
        match (self, other) {
            (
                Self::Typed { ty, confidence },
                Self::Typed {
                    ty: other_ty,
                    confidence: other_confidence,
                },
            ) if ty == other_ty => Self::Typed {
                ty,
                confidence: confidence.min(other_confidence),
            },
            _ => Self::Untyped,
        }
    }
}

#[derive(Debug, Default)]
struct Scope {
    bindings: HashMap<String, Binding>,
    is_class: bool,
}

impl Scope {
    fn class_body() -> Self {
        Self {
            is_class: true,
            ..Self::default()
        }
    }

    fn bind(&mut self, name: &str, binding: Binding) {
        match self.bindings.entry(name.to_owned()) {
            Entry::Vacant(entry) => {
                entry.insert(binding);
            }
            Entry::Occupied(mut entry) => {
                let merged = entry.get().clone().merge(binding);
                entry.insert(merged);
            }
        }
    }

    fn untype(&mut self, name: &str) {
        self.bindings.insert(name.to_owned(), Binding::Untyped);
    }
}

/// An attribute read that no table accounts for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Finding {
    /// Position of the attribute name.
    pub location: SourceLocation,
    /// The name the attribute was read from.
    pub receiver: String,
    /// The type inferred for the receiver.
    pub receiver_type: InferredType,
    /// The missing attribute.
    pub attribute: String,
    /// How sure the inference is.
    pub confidence: Confidence,
    /// The closest known attribute, if any is near.
    pub suggestion: Option<String>,
}

const SUGGESTION_DISTANCE: usize = 2;

/// Walks a module scope by scope and collects findings.
pub struct Analyzer<'a> {
    source: &'a str,
    classes: &'a ClassTable,
    findings: Vec<Finding>,
}

impl<'a> Analyzer<'a> {
    /// Creates an analyzer over `source` with its collected classes.
    #[must_use]
    pub const fn new(source: &'a str, classes: &'a ClassTable) -> Self {
        Self {
            source,
            classes,
            findings: Vec::new(),
        }
    }

    /// Analyses the module rooted at `root` and returns findings in source
    /// order.
    #[must_use]
    pub fn run(mut self, root: Node<'_>) -> Vec<Finding> {
        self.analyse(root, Scope::default(), &[]);
        self.findings.sort_by_key(|finding| finding.location);
        self.findings
    }

    fn analyse(&mut self, region: Node<'_>, mut scope: Scope, chain: &[&Scope]) {
        // A lambda body is a bare expression that may itself be checked.
        let mut nodes = vec![region];
        let mut nested = Vec::new();
        gather(region, &mut nodes, &mut nested);

        for node in &nodes {
            self.bind(*node, &mut scope);
        }
        for definition in &nested {
            if let Some(name) = definition.child_by_field_name("name") {
                scope.untype(node_text(name, self.source));
            }
        }
        for node in nodes.iter().filter(|node| node.kind() == "attribute") {
            self.check_attribute(*node, &scope, chain);
        }

        let mut inner: Vec<&Scope> = chain.to_vec();
        if !scope.is_class {
            inner.push(&scope);
        }
        for definition in nested {
            match definition.kind() {
                "class_definition" => {
                    if let Some(body) = definition.child_by_field_name("body") {
                        self.analyse(body, Scope::class_body(), &inner);
                    }
                }
                _ => {
                    let parameters = self.parameter_scope(definition);
                    if let Some(body) = definition.child_by_field_name("body") {
                        self.analyse(body, parameters, &inner);
                    }
                }
            }
        }
    }

    fn bind(&self, node: Node<'_>, scope: &mut Scope) {
        let source = self.source;
        let mut targets = Vec::new();
        match node.kind() {
            "assignment" => {
                self.bind_assignment(node, scope);
                return;
            }
            "augmented_assignment" | "for_statement" | "for_in_clause" => {
                if let Some(left) = node.child_by_field_name("left") {
                    binding_targets(left, source, &mut targets);
                }
            }
            "named_expression" => {
                if let Some(name) = node.child_by_field_name("name") {
                    binding_targets(name, source, &mut targets);
                }
            }
            "as_pattern" | "except_clause" => {
                if let Some(alias) = alias_of(node) {
                    binding_targets(alias, source, &mut targets);
                }
            }
            "global_statement" | "nonlocal_statement" | "delete_statement" | "import_statement"
            | "import_from_statement" | "case_pattern" => {
                binding_targets(node, source, &mut targets);
            }
            _ => return,
        }
        for name in targets {
            scope.untype(name);
        }
    }

    fn bind_assignment(&self, assignment: Node<'_>, scope: &mut Scope) {
        let Some(left) = assignment.child_by_field_name("left") else {
            return;
        };
        if left.kind() != "identifier" {
            let mut targets = Vec::new();
            binding_targets(left, self.source, &mut targets);
            for name in targets {
                scope.untype(name);
            }
            return;
        }

        let binding = if let Some(annotation) = assignment.child_by_field_name("type") {
            Binding::typed(
                self.annotation_type(annotation)
                    .map(|ty| (ty, Confidence::Medium)),
            )
        } else if let Some(value) = assignment.child_by_field_name("right") {
            Binding::typed(self.infer_expression(value))
        } else {
            Binding::Untyped
        };
        scope.bind(node_text(left, self.source), binding);
    }

    /// Builds the initial scope of a function or lambda from its parameters.
    fn parameter_scope(&self, function: Node<'_>) -> Scope {
        let mut scope = Scope::default();
        let Some(parameters) = function.child_by_field_name("parameters") else {
            return scope;
        };
        let mut cursor = parameters.walk();
        for parameter in parameters.named_children(&mut cursor) {
            self.bind_parameter(parameter, &mut scope);
        }
        if let Some((receiver, class)) = self.method_receiver(function) {
            scope.bindings.insert(
                receiver.to_owned(),
                Binding::Typed {
                    ty: InferredType::Instance(class.to_owned()),
                    confidence: Confidence::Medium,
                },
            );
        }
        scope
    }

    fn bind_parameter(&self, parameter: Node<'_>, scope: &mut Scope) {
        let source = self.source;
        match parameter.kind() {
            "list_splat_pattern" | "dictionary_splat_pattern" => {
                let container = if parameter.kind() == "list_splat_pattern" {
                    BuiltinType::Tuple
                } else {
                    BuiltinType::Dict
                };
                if let Some(name) = parameter.named_child(0) {
                    scope.bind(
                        node_text(name, source),
                        Binding::Typed {
                            ty: InferredType::Builtin(container),
                            confidence: Confidence::High,
                        },
                    );
                }
            }
            "typed_parameter" => {
                let Some(target) = parameter.named_child(0) else {
                    return;
                };
                if target.kind() == "identifier" {
                    let binding = Binding::typed(
                        parameter
                            .child_by_field_name("type")
                            .and_then(|annotation| self.annotation_type(annotation))
                            .map(|ty| (ty, Confidence::Medium)),
                    );
                    scope.bind(node_text(target, source), binding);
                } else {
                    // `*args: T` and `**kwargs: T` annotate the elements.
                    self.bind_parameter(target, scope);
                }
            }
            "typed_default_parameter" => {
                if let Some(name) = parameter.child_by_field_name("name") {
                    let binding = Binding::typed(
                        parameter
                            .child_by_field_name("type")
                            .and_then(|annotation| self.annotation_type(annotation))
                            .map(|ty| (ty, Confidence::Medium)),
                    );
                    scope.bind(node_text(name, source), binding);
                }
            }
            _ => {
                let mut names = Vec::new();
                match parameter.child_by_field_name("name") {
                    Some(name) => binding_targets(name, source, &mut names),
                    None => binding_targets(parameter, source, &mut names),
                }
                for name in names {
                    scope.untype(name);
                }
            }
        }
    }

    /// Returns the receiver parameter and class of an instance method.
    fn method_receiver(&self, function: Node<'_>) -> Option<(&'a str, &'a str)> {
        if function.kind() != "function_definition" {
            return None;
        }
        let class = enclosing_class(function)?;
        if decorators(function, self.source)
            .iter()
            .any(|decorator| matches!(*decorator, "staticmethod" | "classmethod"))
        {
            return None;
        }
        let class_name = node_text(class.child_by_field_name("name")?, self.source);
        if !self.classes.is_local_class(class_name) {
            return None;
        }
        let receiver = first_parameter(function, self.source)?;
        Some((receiver, class_name))
    }

    fn annotation_type(&self, annotation: Node<'_>) -> Option<InferredType> {
        let expression = if annotation.kind() == "type" {
            annotation.named_child(0)?
        } else {
            annotation
        };
        match expression.kind() {
            "identifier" => self.named_type(node_text(expression, self.source)),
            "string" => {
                let body = string_body(expression, self.source)?;
                self.named_type(body.trim())
            }
            // `list[int]` and friends keep the container's attributes.
            "generic_type" | "subscript" => {
                let head = expression.named_child(0)?;
                (head.kind() == "identifier")
                    .then(|| BuiltinType::from_name(node_text(head, self.source)))
                    .flatten()
                    .map(InferredType::Builtin)
            }
            _ => None,
        }
    }

    fn named_type(&self, name: &str) -> Option<InferredType> {
        if self.classes.is_local_class(name) {
            return Some(InferredType::Instance(name.to_owned()));
        }
        BuiltinType::from_name(name).map(InferredType::Builtin)
    }

    fn infer_expression(&self, expression: Node<'_>) -> Option<(InferredType, Confidence)> {
        let literal = |builtin| Some((InferredType::Builtin(builtin), Confidence::High));
        match expression.kind() {
            "string" if is_bytes_literal(expression, self.source) => literal(BuiltinType::Bytes),
            "string" => literal(BuiltinType::Str),
            "concatenated_string" => {
                let first = expression.named_child(0)?;
                self.infer_expression(first)
            }
            "integer" => literal(BuiltinType::Int),
            "float" => literal(BuiltinType::Float),
            "true" | "false" => literal(BuiltinType::Bool),
            "list" | "list_comprehension" => literal(BuiltinType::List),
            "dictionary" | "dictionary_comprehension" => literal(BuiltinType::Dict),
            "set" | "set_comprehension" => literal(BuiltinType::Set),
            "tuple" => literal(BuiltinType::Tuple),
            "parenthesized_expression" => self.infer_expression(expression.named_child(0)?),
            "call" => {
                let function = expression.child_by_field_name("function")?;
                if function.kind() != "identifier" {
                    return None;
                }
                let name = node_text(function, self.source);
                if self.classes.is_local_class(name) {
                    Some((InferredType::Instance(name.to_owned()), Confidence::High))
                } else {
                    BuiltinType::from_name(name)
                        .filter(|builtin| builtin.name() == name)
                        .map(|builtin| (InferredType::Builtin(builtin), Confidence::Medium))
                }
            }
            _ => None,
        }
    }

    fn check_attribute(&mut self, node: Node<'_>, scope: &Scope, chain: &[&Scope]) {
        let source = self.source;
        let (Some(object), Some(attribute)) = (
            node.child_by_field_name("object"),
            node.child_by_field_name("attribute"),
        ) else {
            return;
        };
        if object.kind() != "identifier" || is_store(node) {
            return;
        }
        let name = node_text(attribute, source);
        if is_dunder(name) {
            return;
        }
        let receiver = node_text(object, source);
        let Some(Binding::Typed { ty, confidence }) = lookup(receiver, scope, chain) else {
            return;
        };

        let (confidence, suggestion) = match ty {
            InferredType::Builtin(builtin) => {
                if builtin.has_attribute(name) {
                    return;
                }
                let suggestion = vetting_common::suggest::closest_match(
                    name,
                    builtin.attributes().iter().copied(),
                    SUGGESTION_DISTANCE,
                );
                (*confidence, suggestion.map(str::to_owned))
            }
            InferredType::Instance(class) => {
                let open = match self.classes.lookup(class, name) {
                    Lookup::Found | Lookup::Unknown => return,
                    Lookup::Missing { open } => open,
                };
                let suggestion = vetting_common::suggest::closest_match(
                    name,
                    self.classes.attributes_of(class),
                    SUGGESTION_DISTANCE,
                );
                let confidence = if open { Confidence::Low } else { *confidence };
                (confidence, suggestion.map(str::to_owned))
            }
        };

        self.findings.push(Finding {
            location: SourceLocation::of_node(attribute),
            receiver: receiver.to_owned(),
            receiver_type: ty.clone(),
            attribute: name.to_owned(),
            confidence,
            suggestion,
        });
    }
}

fn lookup<'s>(name: &str, scope: &'s Scope, chain: &[&'s Scope]) -> Option<&'s Binding> {
    scope
        .bindings
        .get(name)
        .or_else(|| chain.iter().rev().find_map(|outer| outer.bindings.get(name)))
}

/// Splits `node`'s descendants into those in its own scope and the roots of
/// nested scopes.
fn gather<'t>(node: Node<'t>, nodes: &mut Vec<Node<'t>>, nested: &mut Vec<Node<'t>>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if SCOPE_KINDS.contains(&child.kind()) {
            nested.push(child);
        } else {
            nodes.push(child);
            gather(child, nodes, nested);
        }
    }
}

/// Returns the target bound by `... as name`.
fn alias_of(node: Node<'_>) -> Option<Node<'_>> {
    if let Some(alias) = node.child_by_field_name("alias") {
        return Some(alias);
    }
    let mut cursor = node.walk();
    let mut after_as = false;
    for child in node.children(&mut cursor) {
        if after_as && child.is_named() {
            return Some(child);
        }
        after_as |= child.kind() == "as";
    }
    None
}
