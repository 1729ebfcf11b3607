//! Style sheet validation.

use crate::{Rejection, WebAssetKind, parse_strict};
use std::borrow::Cow;

/// Any grammar-level error rejects the sheet. An empty sheet is valid, and
/// so is an empty declaration inside a block.
pub(crate) fn validate(content: &str) -> Result<(), Rejection> {
    parse_strict(WebAssetKind::Css, &blank_empty_declarations(content)).map(drop)
}

/// Replaces each `;` that closes an empty declaration with a space.
///
/// Byte offsets are preserved so rejections still point into `content`.
/// Strings and comments are skipped, and top-level semicolons are kept.
fn blank_empty_declarations(content: &str) -> Cow<'_, str> {
    let mut blanked: Vec<usize> = Vec::new();
    let mut depth = 0_usize;
    let mut previous = None;
    let mut chars = content.char_indices().peekable();

    while let Some((index, c)) = chars.next() {
        match c {
            '/' if chars.peek().is_some_and(|&(_, next)| next == '*') => {
                chars.next();
                let mut last = '\0';
                for (_, inner) in chars.by_ref() {
                    if last == '*' && inner == '/' {
                        break;
                    }
                    last = inner;
                }
            }
            '"' | '\'' => {
                while let Some((_, inner)) = chars.next() {
                    match inner {
                        '\\' => {
                            chars.next();
                        }
                        '\n' => break,
                        _ if inner == c => break,
                        _ => {}
                    }
                }
                previous = Some(c);
            }
            ';' if depth > 0 && matches!(previous, Some(';' | '{')) => blanked.push(index),
            _ if c.is_whitespace() => {}
            _ => {
                match c {
                    '{' => depth += 1,
                    '}' => depth = depth.saturating_sub(1),
                    _ => {}
                }
                previous = Some(c);
            }
        }
    }

    if blanked.is_empty() {
        return Cow::Borrowed(content);
    }
    let mut bytes = content.as_bytes().to_vec();
    for index in blanked {
        if let Some(byte) = bytes.get_mut(index) {
            *byte = b' ';
        }
    }
    String::from_utf8(bytes).map_or(Cow::Borrowed(content), Cow::Owned)
}
