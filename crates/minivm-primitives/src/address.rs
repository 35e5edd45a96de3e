//! Account address (20 bytes)

use crate::error::PrimitiveError;
use std::fmt;

/// 20-byte account address as exchanged with the host
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; 20]);

impl Address {
    /// Size of an address in bytes
    pub const LEN: usize = 20;

    /// The all-zero address
    pub const ZERO: Address = Address([0u8; 20]);

    /// Wrap raw bytes
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }

    /// Copy from a slice of exactly 20 bytes
    pub fn from_slice(slice: &[u8]) -> Result<Self, PrimitiveError> {
        let bytes: [u8; 20] = slice.try_into().map_err(|_| PrimitiveError::InvalidLength {
            expected: Self::LEN,
            got: slice.len(),
        })?;
        Ok(Address(bytes))
    }

    /// Parse from hex, with or without the `0x` prefix
    pub fn from_hex(s: &str) -> Result<Self, PrimitiveError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| PrimitiveError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Address whose last eight bytes hold `value` big-endian
    pub fn from_low_u64_be(value: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&value.to_be_bytes());
        Address(bytes)
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// True for the zero address
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Lowercase hex with `0x` prefix
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_from_hex() {
        let addr = Address::from_hex("0xd00000000000000000000000000000000000000d").unwrap();
        assert_eq!(addr.as_bytes()[0], 0xd0);
        assert_eq!(addr.as_bytes()[19], 0x0d);

        let unprefixed = Address::from_hex("d00000000000000000000000000000000000000d").unwrap();
        assert_eq!(addr, unprefixed);
    }

    #[test]
    fn test_address_from_hex_mixed_case() {
        let lower = Address::from_hex("0xabcdef0000000000000000000000000000000001").unwrap();
        let upper = Address::from_hex("0xABCDEF0000000000000000000000000000000001").unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn test_address_from_hex_invalid() {
        match Address::from_hex("0xzz00000000000000000000000000000000000000") {
            Err(PrimitiveError::InvalidHex(_)) => {}
            other => panic!("expected InvalidHex, got {:?}", other),
        }
    }

    #[test]
    fn test_address_wrong_length() {
        assert_eq!(
            Address::from_hex("0x0102"),
            Err(PrimitiveError::InvalidLength { expected: 20, got: 2 })
        );
        assert_eq!(
            Address::from_slice(&[0u8; 21]),
            Err(PrimitiveError::InvalidLength { expected: 20, got: 21 })
        );
        assert!(Address::from_hex("0x").is_err());
    }

    #[test]
    fn test_from_low_u64_be() {
        let addr = Address::from_low_u64_be(3);
        assert_eq!(addr.to_hex(), "0x0000000000000000000000000000000000000003");
    }

    #[test]
    fn test_zero_and_display() {
        assert!(Address::ZERO.is_zero());
        assert!(Address::default().is_zero());
        let addr = Address::from_bytes([0x11; 20]);
        assert!(!addr.is_zero());
        assert_eq!(format!("{}", addr), format!("0x{}", "11".repeat(20)));
        assert!(format!("{:?}", addr).starts_with("Address(0x1111"));
    }
}
