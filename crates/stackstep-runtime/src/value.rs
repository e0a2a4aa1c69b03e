//! Dynamically-typed frame variables
//!
//! A closed set of value kinds is enough for the simulated program:
//! - Int: machine integers (counters, return values)
//! - Text: labels, most importantly the per-frame resume address
//! - StringList: the program argument vector
//!
//! Values are reassignable only through the owning frame's slot; there is no
//! interior sharing between frames.

use serde::Serialize;
use std::fmt;

/// A variable value stored in a [`Frame`](crate::Frame) slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Signed integer value
    Int(i64),
    /// Immutable-length text value (labels, addresses)
    Text(String),
    /// Ordered sequence of strings (the argument vector)
    StringList(Vec<String>),
}

impl Value {
    /// The discriminant of this value, for type-mismatch reporting.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int(_) => ValueKind::Int,
            Value::Text(_) => ValueKind::Text,
            Value::StringList(_) => ValueKind::StringList,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::StringList(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Value discriminant without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Int,
    Text,
    StringList,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Int => write!(f, "Int"),
            ValueKind::Text => write!(f, "Text"),
            ValueKind::StringList => write!(f, "StringList"),
        }
    }
}
