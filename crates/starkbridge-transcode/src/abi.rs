//! Ethereum ABI coder.
//!
//! The felt codec is the wire format; this coder exists for the Ethereum
//! side of the bridge: canonical signature hashing, shaping decoded event
//! arguments into byte payloads for log consumers, and building
//! `Error(string)` revert payloads. Standard head/tail encoding with
//! 32-byte words.

use crate::encode::match_tuple_fields;
use crate::error::{Result, TranscodeError};
use crate::numeric;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::One;
use starkbridge_types::{Function, Param, ParamType, SolValue};

/// Selector of the canonical `Error(string)` revert payload.
pub const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

const WORD: usize = 32;

/// ABI-encode values against the declared parameters.
pub fn abi_encode(params: &[Param], values: &[SolValue]) -> Result<Vec<u8>> {
    if params.len() != values.len() {
        return Err(TranscodeError::LengthMismatch {
            declared: params.len(),
            actual: values.len(),
        });
    }
    let pairs: Vec<(&ParamType, &SolValue)> = params
        .iter()
        .map(|p| &p.kind)
        .zip(values.iter())
        .collect();
    encode_sequence(&pairs)
}

/// Ethereum calldata for a function call: 4-byte selector followed by the
/// ABI-encoded arguments.
pub fn encode_function_data(function: &Function, values: &[SolValue]) -> Result<Vec<u8>> {
    let mut out = function.selector().to_vec();
    out.extend(abi_encode(&function.inputs, values)?);
    Ok(out)
}

/// `Error(string)` payload carrying a human-readable revert reason, as
/// produced by Solidity `revert`/`require`.
pub fn encode_revert_reason(reason: &str) -> Vec<u8> {
    let bytes = reason.as_bytes();
    let mut out = ERROR_STRING_SELECTOR.to_vec();
    out.extend(usize_word(WORD)); // offset of the string
    out.extend(usize_word(bytes.len()));
    out.extend(bytes);
    out.extend(std::iter::repeat(0u8).take(padding(bytes.len())));
    out
}

fn encode_sequence(pairs: &[(&ParamType, &SolValue)]) -> Result<Vec<u8>> {
    let head_len: usize = pairs
        .iter()
        .map(|(kind, _)| if kind.is_dynamic() { WORD } else { static_size(kind) })
        .sum();
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();
    for (kind, value) in pairs {
        if kind.is_dynamic() {
            head.extend(usize_word(head_len + tail.len()));
            tail.extend(encode_dynamic(kind, value)?);
        } else {
            encode_static(kind, value, &mut head)?;
        }
    }
    head.extend(tail);
    Ok(head)
}

/// Size in bytes of a statically encoded type.
fn static_size(kind: &ParamType) -> usize {
    match kind {
        ParamType::Array { elem, len: Some(n) } => n * static_size(elem),
        ParamType::Tuple(components) => components.iter().map(|c| static_size(&c.kind)).sum(),
        _ => WORD,
    }
}

fn encode_static(kind: &ParamType, value: &SolValue, out: &mut Vec<u8>) -> Result<()> {
    match kind {
        ParamType::Uint(width) => {
            let number = expect_number(kind, value)?;
            if number.sign() == Sign::Minus || number.magnitude().bits() as usize > *width {
                return Err(out_of_range(value, kind));
            }
            out.extend(biguint_word(number.magnitude()));
        }
        ParamType::Int(width) => {
            // sign-extended to the full word
            let number = expect_number(kind, value)?;
            check_signed_range(number, *width, kind)?;
            let pattern = numeric::to_twos_complement(number, 256)?;
            out.extend(biguint_word(&pattern));
        }
        ParamType::Address => {
            let number = expect_number(kind, value)?;
            if number.sign() == Sign::Minus || number.magnitude().bits() > 160 {
                return Err(TranscodeError::AddressOutOfRange(number.to_string()));
            }
            out.extend(biguint_word(number.magnitude()));
        }
        ParamType::Bool => match value {
            SolValue::Bool(b) => out.extend(usize_word(*b as usize)),
            other => return Err(mismatch(kind, other)),
        },
        ParamType::FixedBytes(size) => {
            // left-aligned, right-padded to a word
            let bytes = fixed_bytes_value(kind, value, *size)?;
            out.extend(&bytes);
            out.extend(std::iter::repeat(0u8).take(WORD - bytes.len()));
        }
        ParamType::Array { elem, len: Some(declared) } => match value {
            SolValue::Array(items) => {
                if items.len() != *declared {
                    return Err(TranscodeError::LengthMismatch {
                        declared: *declared,
                        actual: items.len(),
                    });
                }
                for item in items {
                    encode_static(elem, item, out)?;
                }
            }
            other => return Err(mismatch(kind, other)),
        },
        ParamType::Tuple(components) => {
            for (component, item) in match_tuple_fields(components, value)? {
                encode_static(&component.kind, item, out)?;
            }
        }
        _ => {
            return Err(TranscodeError::TypeMismatch {
                expected: "static type".to_string(),
                got: kind.canonical(),
            })
        }
    }
    Ok(())
}

fn encode_dynamic(kind: &ParamType, value: &SolValue) -> Result<Vec<u8>> {
    match kind {
        ParamType::Bytes => match value {
            SolValue::Bytes(bytes) => Ok(length_prefixed(bytes)),
            other => Err(mismatch(kind, other)),
        },
        ParamType::String => match value {
            SolValue::Str(s) => Ok(length_prefixed(s.as_bytes())),
            other => Err(mismatch(kind, other)),
        },
        ParamType::Array { elem, len } => match value {
            SolValue::Array(items) => {
                let mut out = Vec::new();
                match len {
                    None => out.extend(usize_word(items.len())),
                    Some(declared) => {
                        if items.len() != *declared {
                            return Err(TranscodeError::LengthMismatch {
                                declared: *declared,
                                actual: items.len(),
                            });
                        }
                    }
                }
                let pairs: Vec<(&ParamType, &SolValue)> =
                    items.iter().map(|item| (elem.as_ref(), item)).collect();
                out.extend(encode_sequence(&pairs)?);
                Ok(out)
            }
            other => Err(mismatch(kind, other)),
        },
        ParamType::Tuple(components) => {
            let matched = match_tuple_fields(components, value)?;
            let pairs: Vec<(&ParamType, &SolValue)> = matched
                .into_iter()
                .map(|(component, item)| (&component.kind, item))
                .collect();
            encode_sequence(&pairs)
        }
        _ => Err(TranscodeError::TypeMismatch {
            expected: "dynamic type".to_string(),
            got: kind.canonical(),
        }),
    }
}

fn fixed_bytes_value(kind: &ParamType, value: &SolValue, size: usize) -> Result<Vec<u8>> {
    match value {
        SolValue::Bytes(bytes) => {
            if bytes.len() != size {
                return Err(TranscodeError::LengthMismatch {
                    declared: size,
                    actual: bytes.len(),
                });
            }
            Ok(bytes.clone())
        }
        SolValue::Number(number) => {
            if number.sign() == Sign::Minus || number.magnitude().bits() as usize > size * 8 {
                return Err(out_of_range(value, kind));
            }
            let raw = number.magnitude().to_bytes_be();
            // zero serializes as a single byte, which still pads correctly
            let mut bytes = vec![0u8; size - raw.len()];
            bytes.extend(raw);
            Ok(bytes)
        }
        other => Err(mismatch(kind, other)),
    }
}

fn check_signed_range(number: &BigInt, width: usize, kind: &ParamType) -> Result<()> {
    let max_positive = (BigUint::one() << (width - 1)) - BigUint::one();
    let fits = if number.sign() == Sign::Minus {
        number.magnitude() <= &(BigUint::one() << (width - 1))
    } else {
        number.magnitude() <= &max_positive
    };
    if fits {
        Ok(())
    } else {
        Err(out_of_range(&SolValue::Number(number.clone()), kind))
    }
}

fn length_prefixed(bytes: &[u8]) -> Vec<u8> {
    let mut out = usize_word(bytes.len());
    out.extend(bytes);
    out.extend(std::iter::repeat(0u8).take(padding(bytes.len())));
    out
}

fn padding(len: usize) -> usize {
    (WORD - len % WORD) % WORD
}

fn usize_word(value: usize) -> Vec<u8> {
    let mut word = vec![0u8; WORD];
    word[WORD - 8..].copy_from_slice(&(value as u64).to_be_bytes());
    word
}

fn biguint_word(value: &BigUint) -> Vec<u8> {
    let raw = value.to_bytes_be();
    let mut word = vec![0u8; WORD - raw.len()];
    word.extend(raw);
    word
}

fn expect_number<'a>(kind: &ParamType, value: &'a SolValue) -> Result<&'a BigInt> {
    value.as_number().ok_or_else(|| mismatch(kind, value))
}

fn mismatch(kind: &ParamType, value: &SolValue) -> TranscodeError {
    TranscodeError::TypeMismatch {
        expected: kind.canonical(),
        got: value.kind_name().to_string(),
    }
}

fn out_of_range(value: &SolValue, kind: &ParamType) -> TranscodeError {
    TranscodeError::ValueOutOfRange {
        value: value.to_string(),
        ty: kind.canonical(),
    }
}
