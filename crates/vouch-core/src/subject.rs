//! Assertable value representation
//!
//! A closed set of value kinds that assertions can be made against:
//! - Null, Bool, Int: immediate values
//! - Text: owned strings
//! - Seq, Map: element containers (both render as `Array` in messages)
//! - Object: an opaque named type; only its type name participates
//!
//! Failure-message rendering is deliberately lossy: a message needs to
//! discriminate values by kind, not reproduce their contents.

use std::collections::BTreeMap;
use std::fmt;

/// A captured value under test.
#[derive(Debug, Clone, PartialEq)]
pub enum Subject {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Seq(Vec<Subject>),
    Map(BTreeMap<String, Subject>),
    /// An opaque object, identified only by its type name.
    Object(String),
}

/// The kind tag of a [`Subject`], used for per-kind predicate dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectKind {
    Null,
    Bool,
    Int,
    Text,
    Seq,
    Map,
    Object,
}

impl Subject {
    /// Capture an opaque object of type `T`. Only the short type name is
    /// retained, for `an_instance_of` checks and message rendering.
    pub fn object<T: ?Sized>() -> Self {
        let full = std::any::type_name::<T>();
        let short = full.rsplit("::").next().unwrap_or(full);
        Subject::Object(short.to_string())
    }

    pub fn kind(&self) -> SubjectKind {
        match self {
            Subject::Null => SubjectKind::Null,
            Subject::Bool(_) => SubjectKind::Bool,
            Subject::Int(_) => SubjectKind::Int,
            Subject::Text(_) => SubjectKind::Text,
            Subject::Seq(_) => SubjectKind::Seq,
            Subject::Map(_) => SubjectKind::Map,
            Subject::Object(_) => SubjectKind::Object,
        }
    }

    /// Element or character count, for the kinds that have one.
    /// Text counts characters, not bytes. Kinds without a notion of size
    /// return `None`.
    pub fn len(&self) -> Option<usize> {
        match self {
            Subject::Text(s) => Some(s.chars().count()),
            Subject::Seq(items) => Some(items.len()),
            Subject::Map(entries) => Some(entries.len()),
            _ => None,
        }
    }

    /// Emptiness in the loose sense: false, zero, the empty string, `"0"`,
    /// empty containers and null are all blank. Objects never are.
    pub fn is_blank(&self) -> bool {
        match self {
            Subject::Null => true,
            Subject::Bool(b) => !b,
            Subject::Int(i) => *i == 0,
            Subject::Text(s) => s.is_empty() || s == "0",
            Subject::Seq(items) => items.is_empty(),
            Subject::Map(entries) => entries.is_empty(),
            Subject::Object(_) => false,
        }
    }

    /// Loose cross-kind equivalence: numeric text compares against integers,
    /// booleans compare against integer zero/non-zero and text blankness,
    /// and null is equivalent to any blank scalar. Same-kind values compare
    /// strictly.
    pub fn loosely_equals(&self, other: &Subject) -> bool {
        use Subject::*;

        if self.kind() == other.kind() {
            return self == other;
        }

        match (self, other) {
            (Int(i), Bool(b)) | (Bool(b), Int(i)) => (*i != 0) == *b,
            (Int(i), Text(s)) | (Text(s), Int(i)) => s.parse::<i64>().map_or(false, |v| v == *i),
            (Bool(b), Text(s)) | (Text(s), Bool(b)) => {
                Subject::Text(s.clone()).is_blank() == !*b
            }
            (Null, v) | (v, Null) => v.is_blank(),
            _ => false,
        }
    }
}

impl fmt::Display for Subject {
    /// Renders the value as it appears in failure messages: `TRUE`, `FALSE`
    /// and `NULL` literals, quoted text, `Array` for containers, and
    /// `Object of type "<TypeName>"` for objects.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Null => write!(f, "NULL"),
            Subject::Bool(true) => write!(f, "TRUE"),
            Subject::Bool(false) => write!(f, "FALSE"),
            Subject::Int(i) => write!(f, "{}", i),
            Subject::Text(s) => write!(f, "\"{}\"", s),
            Subject::Seq(_) | Subject::Map(_) => write!(f, "Array"),
            Subject::Object(name) => write!(f, "Object of type \"{}\"", name),
        }
    }
}

impl From<bool> for Subject {
    fn from(value: bool) -> Self {
        Subject::Bool(value)
    }
}

impl From<i32> for Subject {
    fn from(value: i32) -> Self {
        Subject::Int(i64::from(value))
    }
}

impl From<i64> for Subject {
    fn from(value: i64) -> Self {
        Subject::Int(value)
    }
}

impl From<&str> for Subject {
    fn from(value: &str) -> Self {
        Subject::Text(value.to_string())
    }
}

impl From<String> for Subject {
    fn from(value: String) -> Self {
        Subject::Text(value)
    }
}

impl<T: Into<Subject>> From<Vec<T>> for Subject {
    fn from(value: Vec<T>) -> Self {
        Subject::Seq(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Subject>> From<BTreeMap<String, T>> for Subject {
    fn from(value: BTreeMap<String, T>) -> Self {
        Subject::Map(value.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}
