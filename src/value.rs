use itoa::Buffer as itoaBuffer;
use ryu::Buffer as ryuBuffer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A value produced by a generator.
///
/// Serializes to and from JSON directly, which is how `literal` arguments and
/// custom options are read.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Numeric value of `Int` or `Float`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// `false` for null, `false`, zero, NaN and the empty string.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0 && !f.is_nan(),
            Self::Str(s) => !s.is_empty(),
            Self::Array(_) | Self::Map(_) => true,
        }
    }
}

// Largest magnitude below which every integral float converts to i64 exactly.
const EXACT_INT: f64 = 9_007_199_254_740_992.0;

fn fmt_float(x: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if x.fract() == 0.0 && x.abs() < EXACT_INT {
        f.write_str(itoaBuffer::new().format(x as i64))
    } else {
        f.write_str(ryuBuffer::new().format(x))
    }
}

/// The textual form of a value, as used when `string` and `repeat`
/// concatenate draws.
///
/// Integral floats drop their fractional part, arrays join their elements
/// with `,` and maps are written as compact JSON.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => f.write_str(if *b { "true" } else { "false" }),
            Self::Int(i) => f.write_str(itoaBuffer::new().format(*i)),
            Self::Float(x) => fmt_float(*x, f),
            Self::Str(s) => f.write_str(s),
            Self::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    fmt::Display::fmt(item, f)?;
                }
                Ok(())
            }
            Self::Map(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

macro_rules! impl_from_for_value {
    ($($type:ty => $variant:ident),* $(,)*) => (
        $(
            impl From<$type> for Value {
                fn from(x: $type) -> Self {
                    Self::$variant(x.into())
                }
            }
        )*
    )
}

impl_from_for_value!(
    bool => Bool,
    i32 => Int,
    i64 => Int,
    u32 => Int,
    f64 => Float,
    String => Str,
    &str => Str,
    char => Str,
);

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Map(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
