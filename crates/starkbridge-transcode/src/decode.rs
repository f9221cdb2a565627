//! Felt sequence -> SolValue tree, the exact mirror of the encoder.
//!
//! Decoding walks a cursor over the felt sequence step-for-step with the
//! type descriptors. Any checkable disagreement between a length prefix and
//! the remaining data is a deterministic failure, never a silent truncation
//! or overrun.

use crate::error::{Result, TranscodeError};
use crate::numeric;
use num_bigint::BigInt;
use num_bigint::BigUint;
use starkbridge_types::{Felt, Param, ParamType, SolValue};
use tracing::trace;

/// Single-pass cursor over a felt sequence.
pub struct FeltCursor<'a> {
    data: &'a [Felt],
    pos: usize,
}

impl<'a> FeltCursor<'a> {
    pub fn new(data: &'a [Felt]) -> Self {
        Self { data, pos: 0 }
    }

    /// Take the next felt; running out of data is a hard failure.
    pub fn next(&mut self) -> Result<&'a Felt> {
        let felt = self
            .data
            .get(self.pos)
            .ok_or(TranscodeError::UnexpectedEndOfData)?;
        self.pos += 1;
        Ok(felt)
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

/// Decode return data against the declared output parameters.
///
/// A method with exactly one declared return field yields that bare value;
/// anything else yields a struct addressable by position or by name. The
/// whole sequence must be consumed.
pub fn decode(params: &[Param], data: &[Felt]) -> Result<SolValue> {
    let mut cursor = FeltCursor::new(data);
    let mut values = decode_params(params, &mut cursor)?;
    if cursor.remaining() > 0 {
        return Err(TranscodeError::TrailingData(cursor.remaining()));
    }
    if params.len() == 1 {
        if let Some(single) = values.pop() {
            return Ok(single);
        }
    }
    Ok(SolValue::Struct(
        params
            .iter()
            .zip(values)
            .map(|(param, value)| (param.name.clone(), value))
            .collect(),
    ))
}

/// Decode one value per declared parameter, leaving the cursor wherever the
/// last parameter ended.
pub fn decode_params(params: &[Param], cursor: &mut FeltCursor<'_>) -> Result<Vec<SolValue>> {
    params
        .iter()
        .map(|param| decode_value(&param.kind, cursor))
        .collect()
}

/// Decode a single value against its type descriptor.
pub fn decode_value(kind: &ParamType, cursor: &mut FeltCursor<'_>) -> Result<SolValue> {
    trace!(ty = %kind, "decode");
    match kind {
        ParamType::Uint(width) => {
            let bits = read_wide(cursor, *width)?;
            Ok(SolValue::Number(numeric::decode_int(bits, *width, false)))
        }
        ParamType::Int(width) => {
            let bits = read_wide(cursor, *width)?;
            Ok(SolValue::Number(numeric::decode_int(bits, *width, true)))
        }
        ParamType::Address => {
            let felt = cursor.next()?;
            Ok(SolValue::Number(BigInt::from(felt.as_biguint().clone())))
        }
        ParamType::Bool => {
            let felt = cursor.next()?;
            if felt.is_zero() {
                Ok(SolValue::Bool(false))
            } else if felt == &Felt::one() {
                Ok(SolValue::Bool(true))
            } else {
                Err(TranscodeError::ValueOutOfRange {
                    value: felt.to_string(),
                    ty: "bool".to_string(),
                })
            }
        }
        ParamType::FixedBytes(size) => {
            let bits = read_wide(cursor, size * 8)?;
            Ok(SolValue::Number(BigInt::from(bits)))
        }
        ParamType::Bytes => Ok(SolValue::Bytes(read_byte_run(cursor)?)),
        ParamType::String => {
            let bytes = read_byte_run(cursor)?;
            let s = String::from_utf8(bytes).map_err(|_| TranscodeError::InvalidUtf8)?;
            Ok(SolValue::Str(s))
        }
        ParamType::Array { elem, len } => {
            let count = match len {
                Some(declared) => *declared,
                None => read_length(cursor)?,
            };
            // every element consumes at least one felt
            if count > cursor.remaining() {
                return Err(TranscodeError::UnexpectedEndOfData);
            }
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(decode_value(elem, cursor)?);
            }
            Ok(SolValue::Array(items))
        }
        ParamType::Tuple(components) => {
            // a decoded tuple is positional and name-keyed at once
            let mut fields = Vec::with_capacity(components.len());
            for component in components {
                let value = decode_value(&component.kind, cursor)?;
                fields.push((component.name.clone(), value));
            }
            Ok(SolValue::Struct(fields))
        }
    }
}

fn read_wide(cursor: &mut FeltCursor<'_>, width: usize) -> Result<BigUint> {
    if numeric::felts_for_width(width) == 1 {
        Ok(cursor.next()?.as_biguint().clone())
    } else {
        let low = cursor.next()?;
        let high = cursor.next()?;
        Ok(numeric::merge_wide(low, high))
    }
}

fn read_length(cursor: &mut FeltCursor<'_>) -> Result<usize> {
    let felt = cursor.next()?;
    let len = felt.to_u64().ok_or_else(|| TranscodeError::ValueOutOfRange {
        value: felt.to_string(),
        ty: "length prefix".to_string(),
    })?;
    Ok(len as usize)
}

fn read_byte_run(cursor: &mut FeltCursor<'_>) -> Result<Vec<u8>> {
    let len = read_length(cursor)?;
    // a prefix larger than what is left can never be satisfied
    if len > cursor.remaining() {
        return Err(TranscodeError::UnexpectedEndOfData);
    }
    let mut bytes = Vec::with_capacity(len);
    for _ in 0..len {
        let felt = cursor.next()?;
        bytes.push(felt.to_u8().ok_or_else(|| TranscodeError::ValueOutOfRange {
            value: felt.to_string(),
            ty: "byte".to_string(),
        })?);
    }
    Ok(bytes)
}
