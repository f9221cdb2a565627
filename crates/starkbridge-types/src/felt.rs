use crate::error::TypesError;
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use once_cell::sync::Lazy;
use std::fmt;
use std::str::FromStr;

/// Field modulus of the destination chain: `2^251 + 17 * 2^192 + 1`.
pub static FIELD_PRIME: Lazy<BigUint> = Lazy::new(|| {
    (BigUint::from(1u8) << 251u32) + (BigUint::from(17u8) << 192u32) + BigUint::from(1u8)
});

/// A field element: a non-negative integer strictly below the field prime.
///
/// An ordered, length-significant sequence of felts is the wire form for
/// calldata, return data and event payloads.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Felt(BigUint);

impl Felt {
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    pub fn one() -> Self {
        Self(BigUint::from(1u8))
    }

    /// Create a felt, checking the field bound.
    pub fn new(value: BigUint) -> Result<Self, TypesError> {
        if &value >= &*FIELD_PRIME {
            return Err(TypesError::FeltOutOfRange(value.to_string()));
        }
        Ok(Self(value))
    }

    /// Create from big-endian bytes, checking the field bound.
    pub fn from_bytes_be(bytes: &[u8]) -> Result<Self, TypesError> {
        Self::new(BigUint::from_bytes_be(bytes))
    }

    pub fn from_u64(value: u64) -> Self {
        Self(BigUint::from(value))
    }

    pub fn from_u128(value: u128) -> Self {
        Self(BigUint::from(value))
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    pub fn into_biguint(self) -> BigUint {
        self.0
    }

    pub fn to_u64(&self) -> Option<u64> {
        self.0.to_u64()
    }

    pub fn to_u8(&self) -> Option<u8> {
        self.0.to_u8()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Convert to hex string with 0x prefix.
    pub fn to_hex(&self) -> String {
        format!("0x{}", self.0.to_str_radix(16))
    }
}

impl From<u64> for Felt {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl From<u128> for Felt {
    fn from(value: u128) -> Self {
        Self::from_u128(value)
    }
}

impl fmt::Display for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Felt({})", self.0)
    }
}

impl fmt::LowerHex for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.0.to_str_radix(16))
    }
}

impl FromStr for Felt {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            BigUint::parse_bytes(hex.as_bytes(), 16)
        } else {
            BigUint::parse_bytes(s.as_bytes(), 10)
        };
        let value = value.ok_or_else(|| TypesError::InvalidFelt(s.to_string()))?;
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prime_value() {
        // 2^251 + 17 * 2^192 + 1
        let expected = BigUint::parse_bytes(
            b"800000000000011000000000000000000000000000000000000000000000001",
            16,
        )
        .unwrap();
        assert_eq!(*FIELD_PRIME, expected);
    }

    #[test]
    fn test_felt_bound() {
        assert!(Felt::new(FIELD_PRIME.clone()).is_err());
        let max = &*FIELD_PRIME - BigUint::from(1u8);
        assert!(Felt::new(max).is_ok());
    }

    #[test]
    fn test_felt_parse_roundtrip() {
        let felt = Felt::from_u64(1234567);
        let parsed: Felt = felt.to_string().parse().unwrap();
        assert_eq!(felt, parsed);

        let parsed_hex: Felt = felt.to_hex().parse().unwrap();
        assert_eq!(felt, parsed_hex);
    }

    #[test]
    fn test_felt_parse_invalid() {
        assert!("not a number".parse::<Felt>().is_err());
        assert!("-3".parse::<Felt>().is_err());
    }

    #[test]
    fn test_felt_zero_one() {
        assert!(Felt::zero().is_zero());
        assert_eq!(Felt::one().to_u64(), Some(1));
    }
}
