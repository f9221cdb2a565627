use num_bigint::{BigInt, BigUint};
use std::fmt;

/// A recursive ABI value as it flows through the transcoding pipeline.
///
/// Scalars are numeric-like, string or boolean; composites are ordered lists
/// or name-keyed mappings. Decoded tuples come back as [`SolValue::Struct`],
/// which keeps declaration order so fields can be addressed positionally or
/// by name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SolValue {
    /// Integers, addresses and fixed-size byte words
    Number(BigInt),
    Bool(bool),
    Str(String),
    Bytes(Vec<u8>),
    /// Array elements in order
    Array(Vec<SolValue>),
    /// Positional tuple value (accepted on encode)
    Tuple(Vec<SolValue>),
    /// Name-keyed tuple value in declaration order (produced on decode)
    Struct(Vec<(String, SolValue)>),
}

impl SolValue {
    pub fn as_number(&self) -> Option<&BigInt> {
        match self {
            SolValue::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SolValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SolValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            SolValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Positional access into any composite value.
    pub fn get(&self, index: usize) -> Option<&SolValue> {
        match self {
            SolValue::Array(items) | SolValue::Tuple(items) => items.get(index),
            SolValue::Struct(fields) => fields.get(index).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Name-keyed access into a struct value.
    pub fn field(&self, name: &str) -> Option<&SolValue> {
        match self {
            SolValue::Struct(fields) => fields
                .iter()
                .find(|(field_name, _)| field_name == name)
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Element count of a composite value.
    pub fn len(&self) -> Option<usize> {
        match self {
            SolValue::Array(items) | SolValue::Tuple(items) => Some(items.len()),
            SolValue::Struct(fields) => Some(fields.len()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Short kind name for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            SolValue::Number(_) => "number",
            SolValue::Bool(_) => "bool",
            SolValue::Str(_) => "string",
            SolValue::Bytes(_) => "bytes",
            SolValue::Array(_) => "array",
            SolValue::Tuple(_) => "tuple",
            SolValue::Struct(_) => "struct",
        }
    }
}

impl From<u64> for SolValue {
    fn from(value: u64) -> Self {
        SolValue::Number(BigInt::from(value))
    }
}

impl From<i64> for SolValue {
    fn from(value: i64) -> Self {
        SolValue::Number(BigInt::from(value))
    }
}

impl From<BigInt> for SolValue {
    fn from(value: BigInt) -> Self {
        SolValue::Number(value)
    }
}

impl From<BigUint> for SolValue {
    fn from(value: BigUint) -> Self {
        SolValue::Number(BigInt::from(value))
    }
}

impl From<bool> for SolValue {
    fn from(value: bool) -> Self {
        SolValue::Bool(value)
    }
}

impl From<&str> for SolValue {
    fn from(value: &str) -> Self {
        SolValue::Str(value.to_string())
    }
}

impl From<String> for SolValue {
    fn from(value: String) -> Self {
        SolValue::Str(value)
    }
}

impl fmt::Display for SolValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolValue::Number(n) => write!(f, "{}", n),
            SolValue::Bool(b) => write!(f, "{}", b),
            SolValue::Str(s) => write!(f, "{:?}", s),
            SolValue::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            SolValue::Array(items) | SolValue::Tuple(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            SolValue::Struct(fields) => {
                write!(f, "{{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_and_named_access() {
        let value = SolValue::Struct(vec![
            ("amount".to_string(), SolValue::from(7u64)),
            ("ok".to_string(), SolValue::from(true)),
        ]);

        assert_eq!(value.get(0), value.field("amount"));
        assert_eq!(value.field("ok"), Some(&SolValue::Bool(true)));
        assert_eq!(value.field("missing"), None);
        assert_eq!(value.len(), Some(2));
    }

    #[test]
    fn test_scalar_accessors() {
        assert_eq!(SolValue::from(5u64).as_number(), Some(&BigInt::from(5)));
        assert_eq!(SolValue::from(true).as_bool(), Some(true));
        assert_eq!(SolValue::from("hi").as_str(), Some("hi"));
        assert_eq!(SolValue::from("hi").as_bool(), None);
    }

    #[test]
    fn test_display() {
        let value = SolValue::Array(vec![SolValue::from(1u64), SolValue::from(2u64)]);
        assert_eq!(value.to_string(), "[1, 2]");
        assert_eq!(SolValue::Bytes(vec![0xaa, 0xbb]).to_string(), "0xaabb");
    }
}
