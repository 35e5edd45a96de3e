//! 256-bit stack/memory/storage word
//!
//! Stored as big-endian bytes so that it can be handed to the host and copied
//! into memory without conversion. Arithmetic goes through [`U256`] and wraps
//! modulo 2^256.

use crate::address::Address;
use crate::error::PrimitiveError;
use primitive_types::U256;
use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

/// 32-byte big-endian unsigned integer
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Word([u8; 32]);

impl Word {
    /// Size in bytes
    pub const LEN: usize = 32;

    /// Zero
    pub const ZERO: Word = Word([0u8; 32]);

    /// One
    pub const ONE: Word = {
        let mut v = [0u8; 32];
        v[31] = 1;
        Word(v)
    };

    /// 2^256 - 1
    pub const MAX: Word = Word([0xFF; 32]);

    /// Wrap raw big-endian bytes
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Word(bytes)
    }

    /// Copy from a slice of exactly 32 bytes
    pub fn from_slice(slice: &[u8]) -> Result<Self, PrimitiveError> {
        let bytes: [u8; 32] = slice.try_into().map_err(|_| PrimitiveError::InvalidLength {
            expected: Self::LEN,
            got: slice.len(),
        })?;
        Ok(Word(bytes))
    }

    /// Right-align up to 32 bytes, zero-filling the high end
    pub fn from_be_slice(slice: &[u8]) -> Result<Self, PrimitiveError> {
        if slice.len() > Self::LEN {
            return Err(PrimitiveError::InvalidLength {
                expected: Self::LEN,
                got: slice.len(),
            });
        }
        let mut bytes = [0u8; 32];
        bytes[Self::LEN - slice.len()..].copy_from_slice(slice);
        Ok(Word(bytes))
    }

    /// Parse from hex, with or without `0x`; shorter inputs are left-padded
    pub fn from_hex(s: &str) -> Result<Self, PrimitiveError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| PrimitiveError::InvalidHex(e.to_string()))?;
        Self::from_be_slice(&bytes)
    }

    /// Zero-extended u64
    pub fn from_u64(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        Word(bytes)
    }

    /// Raw big-endian bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Consume into raw bytes
    pub fn into_bytes(self) -> [u8; 32] {
        self.0
    }

    /// True if every byte is zero
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Value as u64, or `None` if the high 24 bytes are not zero
    pub fn to_u64(&self) -> Option<u64> {
        if self.0[..24].iter().any(|&b| b != 0) {
            return None;
        }
        let mut low = [0u8; 8];
        low.copy_from_slice(&self.0[24..]);
        Some(u64::from_be_bytes(low))
    }

    /// Value as usize, or `None` if it does not fit
    pub fn to_usize(&self) -> Option<usize> {
        self.to_u64().and_then(|v| usize::try_from(v).ok())
    }

    /// Value clamped to `i64::MAX`
    pub fn saturating_to_i64(&self) -> i64 {
        self.to_u64()
            .and_then(|v| i64::try_from(v).ok())
            .unwrap_or(i64::MAX)
    }

    /// Low 20 bytes as an address
    pub fn to_address(&self) -> Address {
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&self.0[12..]);
        Address::from_bytes(bytes)
    }

    /// Byte `index` counted from the most significant end (0..32)
    pub fn byte(&self, index: usize) -> u8 {
        self.0.get(index).copied().unwrap_or(0)
    }

    /// Arithmetic view
    pub fn to_u256(&self) -> U256 {
        U256::from_big_endian(&self.0)
    }

    /// Build from the arithmetic view
    pub fn from_u256(value: U256) -> Self {
        let mut bytes = [0u8; 32];
        value.to_big_endian(&mut bytes);
        Word(bytes)
    }

    /// (self + rhs) mod 2^256
    pub fn wrapping_add(&self, rhs: &Word) -> Word {
        Word::from_u256(self.to_u256().overflowing_add(rhs.to_u256()).0)
    }

    /// (self - rhs) mod 2^256
    pub fn wrapping_sub(&self, rhs: &Word) -> Word {
        Word::from_u256(self.to_u256().overflowing_sub(rhs.to_u256()).0)
    }

    /// (self * rhs) mod 2^256
    pub fn wrapping_mul(&self, rhs: &Word) -> Word {
        Word::from_u256(self.to_u256().overflowing_mul(rhs.to_u256()).0)
    }

    /// Integer division, zero when dividing by zero
    pub fn div_or_zero(&self, rhs: &Word) -> Word {
        let divisor = rhs.to_u256();
        if divisor.is_zero() {
            return Word::ZERO;
        }
        Word::from_u256(self.to_u256() / divisor)
    }

    /// Remainder, zero when dividing by zero
    pub fn rem_or_zero(&self, rhs: &Word) -> Word {
        let divisor = rhs.to_u256();
        if divisor.is_zero() {
            return Word::ZERO;
        }
        Word::from_u256(self.to_u256() % divisor)
    }

    /// Lowercase hex with `0x` prefix, all 64 digits
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word({})", self.to_hex())
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<[u8; 32]> for Word {
    fn from(bytes: [u8; 32]) -> Self {
        Word(bytes)
    }
}

impl From<u64> for Word {
    fn from(value: u64) -> Self {
        Word::from_u64(value)
    }
}

impl From<bool> for Word {
    fn from(flag: bool) -> Self {
        if flag {
            Word::ONE
        } else {
            Word::ZERO
        }
    }
}

/// Zero-extends into the low 20 bytes
impl From<Address> for Word {
    fn from(address: Address) -> Self {
        let mut bytes = [0u8; 32];
        bytes[12..].copy_from_slice(address.as_bytes());
        Word(bytes)
    }
}

impl From<U256> for Word {
    fn from(value: U256) -> Self {
        Word::from_u256(value)
    }
}

impl From<Word> for U256 {
    fn from(word: Word) -> Self {
        word.to_u256()
    }
}

impl AsRef<[u8]> for Word {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl BitAnd for Word {
    type Output = Word;

    fn bitand(self, rhs: Word) -> Word {
        let mut out = [0u8; 32];
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = self.0[i] & rhs.0[i];
        }
        Word(out)
    }
}

impl BitOr for Word {
    type Output = Word;

    fn bitor(self, rhs: Word) -> Word {
        let mut out = [0u8; 32];
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = self.0[i] | rhs.0[i];
        }
        Word(out)
    }
}

impl BitXor for Word {
    type Output = Word;

    fn bitxor(self, rhs: Word) -> Word {
        let mut out = [0u8; 32];
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = self.0[i] ^ rhs.0[i];
        }
        Word(out)
    }
}

impl Not for Word {
    type Output = Word;

    fn not(self) -> Word {
        let mut out = self.0;
        for byte in out.iter_mut() {
            *byte = !*byte;
        }
        Word(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_constants() {
        assert!(Word::ZERO.is_zero());
        assert_eq!(Word::ONE.as_bytes()[31], 1);
        assert_eq!(Word::ONE.to_u64(), Some(1));
        assert_eq!(Word::MAX.to_u64(), None);
    }

    #[test]
    fn test_add_wraps_past_single_byte() {
        let a = Word::from_u64(0xff);
        let b = Word::from_u64(0x01);
        assert_eq!(a.wrapping_add(&b), Word::from_u64(0x100));
    }

    #[test]
    fn test_add_wraps_at_256_bits() {
        assert_eq!(Word::MAX.wrapping_add(&Word::ONE), Word::ZERO);
        assert_eq!(Word::ZERO.wrapping_sub(&Word::ONE), Word::MAX);
    }

    #[test]
    fn test_mul_div_rem() {
        let six = Word::from_u64(6);
        let four = Word::from_u64(4);
        assert_eq!(six.wrapping_mul(&four), Word::from_u64(24));
        assert_eq!(six.div_or_zero(&four), Word::ONE);
        assert_eq!(six.rem_or_zero(&four), Word::from_u64(2));
        assert_eq!(six.div_or_zero(&Word::ZERO), Word::ZERO);
        assert_eq!(six.rem_or_zero(&Word::ZERO), Word::ZERO);
    }

    #[test]
    fn test_ordering_is_numeric() {
        assert!(Word::from_u64(1) < Word::from_u64(2));
        assert!(Word::from_u64(0x100) > Word::from_u64(0xff));
        assert!(Word::MAX > Word::from_u64(u64::MAX));
    }

    #[test]
    fn test_bitwise() {
        let a = Word::from_u64(0b1100);
        let b = Word::from_u64(0b1010);
        assert_eq!(a & b, Word::from_u64(0b1000));
        assert_eq!(a | b, Word::from_u64(0b1110));
        assert_eq!(a ^ b, Word::from_u64(0b0110));
        assert_eq!(!Word::ZERO, Word::MAX);
    }

    #[test]
    fn test_address_round_trip_layout() {
        let addr = Address::from_hex("0xd00000000000000000000000000000000000000d").unwrap();
        let word = Word::from(addr);
        assert!(word.as_bytes()[..12].iter().all(|&b| b == 0));
        assert_eq!(&word.as_bytes()[12..], addr.as_bytes());
        assert_eq!(word.to_address(), addr);
    }

    #[test]
    fn test_to_usize_and_i64() {
        assert_eq!(Word::from_u64(42).to_usize(), Some(42));
        assert_eq!(Word::MAX.to_usize(), None);
        assert_eq!(Word::from_u64(3).saturating_to_i64(), 3);
        assert_eq!(Word::from_u64(u64::MAX).saturating_to_i64(), i64::MAX);
        assert_eq!(Word::MAX.saturating_to_i64(), i64::MAX);
    }

    #[test]
    fn test_from_hex_left_pads() {
        let w = Word::from_hex("0xbb").unwrap();
        assert_eq!(w, Word::from_u64(0xbb));
        assert!(Word::from_hex(&"00".repeat(33)).is_err());
        assert!(matches!(Word::from_hex("0xgg"), Err(PrimitiveError::InvalidHex(_))));
    }

    #[test]
    fn test_from_slice_exact() {
        assert!(Word::from_slice(&[0u8; 31]).is_err());
        assert_eq!(Word::from_slice(&[0u8; 32]).unwrap(), Word::ZERO);
    }

    #[test]
    fn test_byte_and_bool() {
        let w = Word::from_u64(0xabcd);
        assert_eq!(w.byte(31), 0xcd);
        assert_eq!(w.byte(30), 0xab);
        assert_eq!(w.byte(40), 0);
        assert_eq!(Word::from(true), Word::ONE);
        assert_eq!(Word::from(false), Word::ZERO);
    }

    proptest! {
        #[test]
        fn prop_add_matches_u128(a in any::<u64>(), b in any::<u64>()) {
            let sum = Word::from_u64(a).wrapping_add(&Word::from_u64(b));
            let expected = a as u128 + b as u128;
            prop_assert_eq!(sum.to_u256(), U256::from(expected));
        }

        #[test]
        fn prop_sub_inverts_add(a in any::<[u8; 32]>(), b in any::<[u8; 32]>()) {
            let (a, b) = (Word::from_bytes(a), Word::from_bytes(b));
            prop_assert_eq!(a.wrapping_add(&b).wrapping_sub(&b), a);
        }
    }
}
