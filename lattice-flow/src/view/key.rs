//! Keys used to match keyed components across renders.

use std::fmt;

use serde::Serialize;

/// The identity of a keyed component.
///
/// `Index` is the positional fallback used when an element has no identity
/// of its own. It never equals an `Int` key, even for the same number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum Key {
    /// A numeric identity.
    Int(i64),
    /// A string identity.
    Str(String),
    /// A position in the parent's output.
    Index(usize),
}

impl Key {
    /// Truthiness of the key value: zero and the empty string are falsy.
    ///
    /// Identity-field probing only selects a field whose value is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Key::Int(value) => *value != 0,
            Key::Str(value) => !value.is_empty(),
            Key::Index(_) => true,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(value) => write!(f, "{}", value),
            Key::Str(value) => f.write_str(value),
            Key::Index(value) => write!(f, "{}", value),
        }
    }
}

macro_rules! key_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Key {
                fn from(value: $ty) -> Self {
                    Key::Int(i64::from(value))
                }
            }
        )*
    };
}

key_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Str(value.to_owned())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Str(value)
    }
}
