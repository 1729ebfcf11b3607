//! Public attribute tables for the builtin types the checker can infer.

use std::fmt;

/// A builtin type whose attribute table is fixed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    /// `str`
    Str,
    /// `bytes`
    Bytes,
    /// `int`
    Int,
    /// `float`
    Float,
    /// `bool`
    Bool,
    /// `list`
    List,
    /// `dict`
    Dict,
    /// `set`
    Set,
    /// `tuple`
    Tuple,
}

const STR: &[&str] = &[
    "capitalize", "casefold", "center", "count", "encode", "endswith", "expandtabs", "find",
    "format", "format_map", "index", "isalnum", "isalpha", "isascii", "isdecimal", "isdigit",
    "isidentifier", "islower", "isnumeric", "isprintable", "isspace", "istitle", "isupper",
    "join", "ljust", "lower", "lstrip", "maketrans", "partition", "removeprefix",
    "removesuffix", "replace", "rfind", "rindex", "rjust", "rpartition", "rsplit", "rstrip",
    "split", "splitlines", "startswith", "strip", "swapcase", "title", "translate", "upper",
    "zfill",
];

const BYTES: &[&str] = &[
    "capitalize", "center", "count", "decode", "endswith", "expandtabs", "find", "fromhex",
    "hex", "index", "isalnum", "isalpha", "isascii", "isdigit", "islower", "isspace",
    "istitle", "isupper", "join", "ljust", "lower", "lstrip", "maketrans", "partition",
    "removeprefix", "removesuffix", "replace", "rfind", "rindex", "rjust", "rpartition",
    "rsplit", "rstrip", "split", "splitlines", "startswith", "strip", "swapcase", "title",
    "translate", "upper", "zfill",
];

// `bool` subclasses `int` and adds nothing public.
const INT: &[&str] = &[
    "as_integer_ratio", "bit_count", "bit_length", "conjugate", "denominator", "from_bytes",
    "imag", "is_integer", "numerator", "real", "to_bytes",
];

const FLOAT: &[&str] = &[
    "as_integer_ratio", "conjugate", "fromhex", "hex", "imag", "is_integer", "real",
];

const LIST: &[&str] = &[
    "append", "clear", "copy", "count", "extend", "index", "insert", "pop", "remove",
    "reverse", "sort",
];

const DICT: &[&str] = &[
    "clear", "copy", "fromkeys", "get", "items", "keys", "pop", "popitem", "setdefault",
    "update", "values",
];

const SET: &[&str] = &[
    "add", "clear", "copy", "difference", "difference_update", "discard", "intersection",
    "intersection_update", "isdisjoint", "issubset", "issuperset", "pop", "remove",
    "symmetric_difference", "symmetric_difference_update", "union", "update",
];

const TUPLE: &[&str] = &["count", "index"];

impl BuiltinType {
    /// Maps a constructor or annotation name to its type.
    ///
    /// The capitalised `typing` aliases (`List`, `Dict`, ...) map to the
    /// same runtime types.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let builtin = match name {
            "str" => Self::Str,
            "bytes" => Self::Bytes,
            "int" => Self::Int,
            "float" => Self::Float,
            "bool" => Self::Bool,
            "list" | "List" => Self::List,
            "dict" | "Dict" => Self::Dict,
            "set" | "Set" => Self::Set,
            "tuple" | "Tuple" => Self::Tuple,
            _ => return None,
        };
        Some(builtin)
    }

    /// Returns the Python spelling of the type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Bytes => "bytes",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::List => "list",
            Self::Dict => "dict",
            Self::Set => "set",
            Self::Tuple => "tuple",
        }
    }

    /// Returns the public (non-dunder) attributes, sorted.
    #[must_use]
    pub const fn attributes(self) -> &'static [&'static str] {
        match self {
            Self::Str => STR,
            Self::Bytes => BYTES,
            Self::Int | Self::Bool => INT,
            Self::Float => FLOAT,
            Self::List => LIST,
            Self::Dict => DICT,
            Self::Set => SET,
            Self::Tuple => TUPLE,
        }
    }

    /// Returns `true` when the type defines `attribute`.
    #[must_use]
    pub fn has_attribute(self, attribute: &str) -> bool {
        self.attributes().binary_search(&attribute).is_ok()
    }
}

impl fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const ALL: [BuiltinType; 9] = [
        BuiltinType::Str,
        BuiltinType::Bytes,
        BuiltinType::Int,
        BuiltinType::Float,
        BuiltinType::Bool,
        BuiltinType::List,
        BuiltinType::Dict,
        BuiltinType::Set,
        BuiltinType::Tuple,
    ];

    #[rstest]
    fn tables_are_sorted_for_binary_search() {
        for builtin in ALL {
            assert!(
                builtin.attributes().is_sorted(),
                "{builtin} table is not sorted"
            );
        }
    }

    #[rstest]
    fn names_round_trip() {
        for builtin in ALL {
            assert_eq!(BuiltinType::from_name(builtin.name()), Some(builtin));
        }
    }

    #[rstest]
    #[case(BuiltinType::Str, "upper", true)]
    #[case(BuiltinType::Str, "decode", false)]
    #[case(BuiltinType::Bytes, "decode", true)]
    #[case(BuiltinType::Bool, "bit_length", true)]
    #[case(BuiltinType::List, "push", false)]
    #[case(BuiltinType::Dict, "items", true)]
    fn answers_attribute_queries(
        #[case] builtin: BuiltinType,
        #[case] attribute: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(builtin.has_attribute(attribute), expected);
    }
}
