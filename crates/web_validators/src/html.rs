//! Document validation.
//!
//! Browsers recover from stray `<` and `&` in text, so any parse is accepted
//! as long as the document spells out its skeleton. Start tags are also
//! read out of regions the grammar could not structure.

use crate::{Rejection, WebAssetKind, find_node, parse_lenient};
use tree_sitter::Node;
use vetting_common::node_text;

const REQUIRED_ELEMENTS: [&str; 3] = ["html", "head", "body"];

pub(crate) fn validate(content: &str) -> Result<(), Rejection> {
    if content.trim().is_empty() {
        return Err(Rejection::Empty);
    }
    let tree = parse_lenient(WebAssetKind::Html, content)?;
    let root = tree.root_node();
    match REQUIRED_ELEMENTS
        .into_iter()
        .find(|name| !has_element(root, content, name))
    {
        Some(missing) => Err(Rejection::MissingElement(missing)),
        None => Ok(()),
    }
}

fn has_element(root: Node<'_>, source: &str, name: &str) -> bool {
    find_node(root, &|node| match node.kind() {
        "start_tag" | "self_closing_tag" => {
            tag_name(node, source).is_some_and(|tag| tag.eq_ignore_ascii_case(name))
        }
        "ERROR" => start_tags_in(node_text(node, source)).any(|tag| tag.eq_ignore_ascii_case(name)),
        _ => false,
    })
    .is_some()
}

fn tag_name<'s>(tag: Node<'_>, source: &'s str) -> Option<&'s str> {
    let mut cursor = tag.walk();
    let name = tag
        .named_children(&mut cursor)
        .find(|child| child.kind() == "tag_name")?;
    Some(node_text(name, source))
}

/// Yields the names of `<name` openings in raw markup.
fn start_tags_in(markup: &str) -> impl Iterator<Item = &str> {
    markup.split('<').skip(1).filter_map(|rest| {
        let end = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
            .unwrap_or(rest.len());
        rest.get(..end)
            .filter(|name| name.starts_with(|c: char| c.is_ascii_alphabetic()))
    })
}
