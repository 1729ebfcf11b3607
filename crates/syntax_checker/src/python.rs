//! Python 3 conformance through the `rustpython-parser` grammar.
//!
//! Tree-sitter's Python grammar recovers from indentation faults and still
//! accepts Python 2 statements, so Python artefacts are first judged by a
//! parser that follows CPython's grammar and tokenizer.

use rustpython_parser::{Mode, parse};
use vetting_common::SourceLocation;

/// A grammar violation reported by the Python 3 parser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PythonSyntaxError {
    pub(crate) location: SourceLocation,
    pub(crate) message: String,
}

/// Parses `source` as a Python 3 module, returning the first violation.
pub(crate) fn first_error(source: &str, source_path: &str) -> Option<PythonSyntaxError> {
    let error = parse(source, Mode::Module, source_path).err()?;
    let offset = usize::from(error.offset);
    Some(PythonSyntaxError {
        location: SourceLocation::at_offset(source, offset),
        message: error.error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("x = 1\n")]
    #[case("if (n := 3) > 2:\n    pass\n")]
    #[case("match x:\n    case 1:\n        pass\n")]
    fn accepts_python_three(#[case] source: &str) {
        assert_eq!(first_error(source, "<artefact>"), None);
    }

    #[rstest]
    fn locates_unexpected_indentation_on_its_line() {
        let error = first_error("x = 1\n  y = 2\n", "<artefact>").expect("indent is rejected");

        assert_eq!(error.location.line(), 2);
        assert!(!error.message.is_empty());
    }
}
