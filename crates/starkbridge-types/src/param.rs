use crate::error::TypesError;
use std::fmt;

/// Immutable type descriptor for one ABI parameter.
///
/// Produced once from a parsed interface description and read-only
/// thereafter. Arrays carry their element type, tuples their ordered
/// component list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamType {
    /// Unsigned integer of the given bit width
    Uint(usize),
    /// Signed (two's complement) integer of the given bit width
    Int(usize),
    /// Ethereum address (160 bits on the source side, one felt on the wire)
    Address,
    Bool,
    /// Fixed-size byte string of 1..=32 bytes
    FixedBytes(usize),
    /// Dynamically sized byte string
    Bytes,
    /// UTF-8 string
    String,
    /// Fixed (`len = Some`) or dynamic (`len = None`) array
    Array {
        elem: Box<ParamType>,
        len: Option<usize>,
    },
    /// Ordered, named components
    Tuple(Vec<Param>),
}

/// A named parameter: declared name plus type descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub kind: ParamType,
}

impl Param {
    pub fn new(name: impl Into<String>, kind: ParamType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Unnamed parameter (common for outputs).
    pub fn unnamed(kind: ParamType) -> Self {
        Self {
            name: String::new(),
            kind,
        }
    }
}

impl ParamType {
    /// A type is primitive iff it has no element type and no component list.
    /// Primitives route to the scalar codecs, composites recurse.
    pub fn is_primitive(&self) -> bool {
        !matches!(self, ParamType::Array { .. } | ParamType::Tuple(_))
    }

    /// Whether the Ethereum ABI encoding of this type is dynamically sized.
    pub fn is_dynamic(&self) -> bool {
        match self {
            ParamType::Bytes | ParamType::String => true,
            ParamType::Array { len: None, .. } => true,
            ParamType::Array {
                elem,
                len: Some(_),
            } => elem.is_dynamic(),
            ParamType::Tuple(components) => components.iter().any(|c| c.kind.is_dynamic()),
            _ => false,
        }
    }

    /// Canonical type string as used in Ethereum signatures.
    /// Tuples render as a parenthesized component list.
    pub fn canonical(&self) -> String {
        match self {
            ParamType::Uint(bits) => format!("uint{}", bits),
            ParamType::Int(bits) => format!("int{}", bits),
            ParamType::Address => "address".to_string(),
            ParamType::Bool => "bool".to_string(),
            ParamType::FixedBytes(size) => format!("bytes{}", size),
            ParamType::Bytes => "bytes".to_string(),
            ParamType::String => "string".to_string(),
            ParamType::Array { elem, len } => match len {
                Some(n) => format!("{}[{}]", elem.canonical(), n),
                None => format!("{}[]", elem.canonical()),
            },
            ParamType::Tuple(components) => {
                let inner: Vec<String> = components.iter().map(|c| c.kind.canonical()).collect();
                format!("({})", inner.join(","))
            }
        }
    }

    /// Parse an ABI type string (e.g. `uint256`, `bytes32`, `uint8[4][]`).
    /// Tuples are declared as `tuple` with the component list supplied
    /// separately, as in Solidity ABI JSON.
    pub fn parse(type_str: &str, components: Vec<Param>) -> Result<Self, TypesError> {
        if let Some(open) = type_str.rfind('[') {
            if type_str.ends_with(']') {
                let elem = Self::parse(&type_str[..open], components)?;
                let len_str = &type_str[open + 1..type_str.len() - 1];
                let len = if len_str.is_empty() {
                    None
                } else {
                    Some(len_str.parse::<usize>().map_err(|_| {
                        TypesError::InvalidTypeString(type_str.to_string())
                    })?)
                };
                return Ok(ParamType::Array {
                    elem: Box::new(elem),
                    len,
                });
            }
            return Err(TypesError::InvalidTypeString(type_str.to_string()));
        }

        match type_str {
            "address" => Ok(ParamType::Address),
            "bool" => Ok(ParamType::Bool),
            "string" => Ok(ParamType::String),
            "bytes" => Ok(ParamType::Bytes),
            "tuple" => Ok(ParamType::Tuple(components)),
            "uint" => Ok(ParamType::Uint(256)),
            "int" => Ok(ParamType::Int(256)),
            _ => {
                if let Some(width) = type_str.strip_prefix("uint") {
                    let bits = parse_int_width(width, type_str)?;
                    Ok(ParamType::Uint(bits))
                } else if let Some(width) = type_str.strip_prefix("int") {
                    let bits = parse_int_width(width, type_str)?;
                    Ok(ParamType::Int(bits))
                } else if let Some(size) = type_str.strip_prefix("bytes") {
                    let size: usize = size
                        .parse()
                        .map_err(|_| TypesError::InvalidTypeString(type_str.to_string()))?;
                    if size == 0 || size > 32 {
                        return Err(TypesError::InvalidBitWidth {
                            base: "bytesN",
                            bits: size * 8,
                        });
                    }
                    Ok(ParamType::FixedBytes(size))
                } else {
                    Err(TypesError::InvalidTypeString(type_str.to_string()))
                }
            }
        }
    }
}

fn parse_int_width(width: &str, type_str: &str) -> Result<usize, TypesError> {
    let bits: usize = width
        .parse()
        .map_err(|_| TypesError::InvalidTypeString(type_str.to_string()))?;
    if bits == 0 || bits > 256 || bits % 8 != 0 {
        return Err(TypesError::InvalidBitWidth {
            base: "integer",
            bits,
        });
    }
    Ok(bits)
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical())
    }
}
