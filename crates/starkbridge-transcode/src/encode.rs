//! SolValue tree -> flat felt sequence, driven by a ParamType tree.
//!
//! The encoder consumes input values through a single-pass ordered cursor:
//! each sub-encode advances the cursor by exactly what it consumes, so
//! composite encoders recurse into scalar encoders without pre-flattening.
//! Too few inputs is an immediate failure, never silent padding.

use crate::error::{Result, TranscodeError};
use crate::numeric;
use starkbridge_types::{Felt, Param, ParamType, SolValue};
use tracing::trace;

/// Felt budget of an address on the destination side.
pub(crate) const ADDRESS_FELT_BITS: usize = 251;

/// Encode a value per declared parameter. Every input value must be
/// consumed; leftovers are an error.
pub fn encode(params: &[Param], values: &[SolValue]) -> Result<Vec<Felt>> {
    let mut cursor = values.iter();
    let mut out = Vec::new();
    for param in params {
        let value = cursor.next().ok_or(TranscodeError::UnexpectedEndOfValues)?;
        encode_value(&param.kind, value, &mut out)?;
    }
    let leftover = cursor.count();
    if leftover > 0 {
        return Err(TranscodeError::TrailingValues(leftover));
    }
    Ok(out)
}

/// Encode a single value against its type descriptor, appending felts.
pub fn encode_value(kind: &ParamType, value: &SolValue, out: &mut Vec<Felt>) -> Result<()> {
    trace!(ty = %kind, value = %value, "encode");
    match kind {
        ParamType::Uint(width) => {
            out.extend(numeric::encode_int(expect_number(kind, value)?, *width, false)?);
        }
        ParamType::Int(width) => {
            out.extend(numeric::encode_int(expect_number(kind, value)?, *width, true)?);
        }
        ParamType::Address => {
            // the 160-bit Ethereum check belongs to the ABI coder; on the
            // wire an address is a single felt
            out.extend(numeric::encode_int(
                expect_number(kind, value)?,
                ADDRESS_FELT_BITS,
                false,
            )?);
        }
        ParamType::Bool => match value {
            SolValue::Bool(b) => out.push(if *b { Felt::one() } else { Felt::zero() }),
            other => return Err(mismatch(kind, other)),
        },
        ParamType::FixedBytes(size) => {
            // an N-byte string is an N*8-bit unsigned word
            let width = size * 8;
            match value {
                SolValue::Number(_) => {
                    out.extend(numeric::encode_int(expect_number(kind, value)?, width, false)?);
                }
                SolValue::Bytes(bytes) => {
                    if bytes.len() != *size {
                        return Err(TranscodeError::LengthMismatch {
                            declared: *size,
                            actual: bytes.len(),
                        });
                    }
                    let word = num_bigint::BigInt::from_bytes_be(num_bigint::Sign::Plus, bytes);
                    out.extend(numeric::encode_int(&word, width, false)?);
                }
                other => return Err(mismatch(kind, other)),
            }
        }
        ParamType::Bytes => match value {
            SolValue::Bytes(bytes) => encode_byte_run(bytes, out),
            other => return Err(mismatch(kind, other)),
        },
        ParamType::String => match value {
            SolValue::Str(s) => encode_byte_run(s.as_bytes(), out),
            other => return Err(mismatch(kind, other)),
        },
        ParamType::Array { elem, len } => match value {
            SolValue::Array(items) => {
                match len {
                    // dynamic arrays carry an element count, fixed ones don't
                    None => out.push(Felt::from(items.len() as u64)),
                    Some(declared) => {
                        if items.len() != *declared {
                            return Err(TranscodeError::LengthMismatch {
                                declared: *declared,
                                actual: items.len(),
                            });
                        }
                    }
                }
                for item in items {
                    encode_value(elem, item, out)?;
                }
            }
            other => return Err(mismatch(kind, other)),
        },
        ParamType::Tuple(components) => {
            for (component, item) in match_tuple_fields(components, value)? {
                encode_value(&component.kind, item, out)?;
            }
        }
    }
    Ok(())
}

/// Match a tuple value against its declared components.
///
/// Name-keyed struct inputs are matched exhaustively: every declared field
/// must be supplied and nothing extra may be. Positional inputs are matched
/// in order with a strict arity check.
pub(crate) fn match_tuple_fields<'a>(
    components: &'a [Param],
    value: &'a SolValue,
) -> Result<Vec<(&'a Param, &'a SolValue)>> {
    match value {
        SolValue::Struct(fields) => {
            let mut matched = Vec::with_capacity(components.len());
            for component in components {
                let field = fields
                    .iter()
                    .find(|(name, _)| name == &component.name)
                    .ok_or_else(|| TranscodeError::MissingField(component.name.clone()))?;
                matched.push((component, &field.1));
            }
            if fields.len() != components.len() {
                for (name, _) in fields {
                    if components.iter().all(|c| &c.name != name) {
                        return Err(TranscodeError::UnexpectedField(name.clone()));
                    }
                }
                // only duplicates remain
                return Err(TranscodeError::LengthMismatch {
                    declared: components.len(),
                    actual: fields.len(),
                });
            }
            Ok(matched)
        }
        SolValue::Tuple(items) | SolValue::Array(items) => {
            if items.len() != components.len() {
                return Err(TranscodeError::LengthMismatch {
                    declared: components.len(),
                    actual: items.len(),
                });
            }
            Ok(components.iter().zip(items.iter()).collect())
        }
        other => Err(TranscodeError::TypeMismatch {
            expected: "tuple".to_string(),
            got: other.kind_name().to_string(),
        }),
    }
}

fn encode_byte_run(bytes: &[u8], out: &mut Vec<Felt>) {
    out.push(Felt::from(bytes.len() as u64));
    for byte in bytes {
        out.push(Felt::from(*byte as u64));
    }
}

fn expect_number<'a>(kind: &ParamType, value: &'a SolValue) -> Result<&'a num_bigint::BigInt> {
    value.as_number().ok_or_else(|| mismatch(kind, value))
}

fn mismatch(kind: &ParamType, value: &SolValue) -> TranscodeError {
    TranscodeError::TypeMismatch {
        expected: kind.canonical(),
        got: value.kind_name().to_string(),
    }
}
