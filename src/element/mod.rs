//! Decoded configuration values and the diagnostic model that travels with them.
//!
//! Values arrive as a flattened pre-order tree (see [`decode_elements`]) and are
//! turned into an immutable [`Element`]. Equality is structural; map key order
//! is irrelevant.

mod decoder;
mod diagnostics;

pub use decoder::*;
pub use diagnostics::*;


use std::collections::BTreeMap;
use std::fmt;

/// Immutable configuration value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Element {
    /// Absent value. Distinct from [`Element::Null`].
    #[default]
    Undefined,
    Null,
    Str(String),
    Bin(Vec<u8>),
    Int(i64),
    Double(f64),
    Bool(bool),
    Sequence(Vec<Element>),
    Map(BTreeMap<String, Element>),
}

impl Element {
    /// Looks up `key` when this value is a map
    pub fn get(
        &self,
        key: &str,
    ) -> Option<&Element> {
        match self {
            Element::Map(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Element::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Element::Bin(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Element::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Element::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Element::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Element]> {
        match self {
            Element::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Element>> {
        match self {
            Element::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Element::Null)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Element::Undefined)
    }
}

/// JSON-like rendering. Binary blobs print as lowercase hex, undefined as `undefined`.
impl fmt::Display for Element {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Element::Undefined => write!(f, "undefined"),
            Element::Null => write!(f, "null"),
            Element::Str(s) => write!(f, "{s:?}"),
            Element::Bin(bytes) => {
                write!(f, "0x")?;
                for b in bytes {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
            Element::Int(v) => write!(f, "{v}"),
            Element::Double(v) => write!(f, "{v}"),
            Element::Bool(v) => write!(f, "{v}"),
            Element::Sequence(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Element::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key:?}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}
