//! Pure arithmetic underneath the value codec: two's-complement conversion
//! and limb-splitting of wide integers.

use crate::error::{Result, TranscodeError};
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::One;
use starkbridge_types::Felt;

/// Widest integer that still fits a single felt. Anything wider is split
/// into two limbs at the 2^128 boundary, low limb first.
pub const FELT_WIDTH_LIMIT: usize = 251;

/// Bit position of the low/high limb split.
pub const LIMB_SPLIT_BITS: usize = 128;

/// Number of felts an integer of the given bit width occupies.
pub fn felts_for_width(width: usize) -> usize {
    if width <= FELT_WIDTH_LIMIT {
        1
    } else {
        2
    }
}

/// Two's-complement bit pattern of `value` at the given width.
///
/// Non-negative values must fit in `width` bits. Negative values are
/// converted by inverting the zero-padded magnitude, adding one and
/// truncating to `width` bits; they must not be below `-2^(width-1)`.
pub fn to_twos_complement(value: &BigInt, width: usize) -> Result<BigUint> {
    let out_of_range = || TranscodeError::ValueOutOfRange {
        value: value.to_string(),
        ty: format!("{}-bit integer", width),
    };

    if value.sign() != Sign::Minus {
        let magnitude = value.magnitude();
        if magnitude.bits() as usize > width {
            return Err(out_of_range());
        }
        return Ok(magnitude.clone());
    }

    let magnitude = value.magnitude();
    if magnitude > &(BigUint::one() << (width - 1)) {
        return Err(out_of_range());
    }
    let mask = (BigUint::one() << width) - BigUint::one();
    let inverted = magnitude ^ &mask;
    Ok((inverted + BigUint::one()) & mask)
}

/// Exact inverse of [`to_twos_complement`] for correctly-ranged inputs:
/// patterns up to `2^(width-1) - 1` are returned as-is, anything above is
/// `bits - 2^width`.
pub fn from_twos_complement(bits: &BigUint, width: usize) -> BigInt {
    let max_positive = (BigUint::one() << (width - 1)) - BigUint::one();
    if bits <= &max_positive {
        BigInt::from(bits.clone())
    } else {
        BigInt::from(bits.clone()) - (BigInt::one() << width)
    }
}

/// Split an unsigned bit pattern into its felt limbs: one felt up to the
/// felt width limit, otherwise `[low, high]` with `low < 2^128`.
pub fn split_wide(value: BigUint, width: usize) -> Result<Vec<Felt>> {
    if width <= FELT_WIDTH_LIMIT {
        return Ok(vec![Felt::new(value)?]);
    }
    let mask = (BigUint::one() << LIMB_SPLIT_BITS) - BigUint::one();
    let low = &value & &mask;
    let high = value >> LIMB_SPLIT_BITS;
    Ok(vec![Felt::new(low)?, Felt::new(high)?])
}

/// Exact inverse of [`split_wide`] for the two-limb case.
pub fn merge_wide(low: &Felt, high: &Felt) -> BigUint {
    (high.as_biguint() << LIMB_SPLIT_BITS) + low.as_biguint()
}

/// Encode an integer of declared width and signedness: two's complement
/// (identity for non-negative values), then limb split.
pub fn encode_int(value: &BigInt, width: usize, signed: bool) -> Result<Vec<Felt>> {
    if !signed && value.sign() == Sign::Minus {
        return Err(TranscodeError::ValueOutOfRange {
            value: value.to_string(),
            ty: format!("uint{}", width),
        });
    }
    if signed {
        // positive side of the signed range is one bit narrower
        let max_positive = (BigUint::one() << (width - 1)) - BigUint::one();
        if value.sign() != Sign::Minus && value.magnitude() > &max_positive {
            return Err(TranscodeError::ValueOutOfRange {
                value: value.to_string(),
                ty: format!("int{}", width),
            });
        }
    }
    split_wide(to_twos_complement(value, width)?, width)
}

/// Decode the unsigned bit pattern produced by [`encode_int`] back into a
/// signed or unsigned integer.
pub fn decode_int(bits: BigUint, width: usize, signed: bool) -> BigInt {
    if signed {
        from_twos_complement(&bits, width)
    } else {
        BigInt::from(bits)
    }
}
