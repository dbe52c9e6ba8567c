//! # Field Elements and Tree Hashes
//!
//! `FieldElement` is an integer modulo the BN254 scalar field prime
//! `r = 21888242871839275222246405745257275088548364400416034343698204186575808495617`.
//! `Hash256` is its canonical 32-byte little-endian encoding, the form used
//! for sparse Merkle tree nodes and proof siblings.
//!
//! ## Security Invariant
//!
//! Every external representation (decimal string, byte array) is range
//! checked on the way in. A value `>= r` is rejected with
//! [`FieldError::OutOfField`] instead of being reduced, so two different
//! encodings can never collapse onto the same tree key. The only explicit
//! reducing constructor is [`FieldElement::from_le_bytes_mod_order`].

use std::fmt;
use std::str::FromStr;

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField, Zero};
use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::FieldError;
use crate::hex;

/// An element of the BN254 scalar field.
///
/// Serializes as a base-10 string.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldElement(Fr);

impl FieldElement {
    /// The additive identity.
    pub fn zero() -> Self {
        Self(Fr::zero())
    }

    /// The multiplicative identity.
    pub fn one() -> Self {
        Self::from_u64(1)
    }

    /// Lift a `u64` into the field.
    pub fn from_u64(v: u64) -> Self {
        Self(Fr::from(v))
    }

    /// Returns `true` for the zero element.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Access the underlying arkworks element.
    pub fn inner(&self) -> Fr {
        self.0
    }

    /// The field modulus as an unsigned big integer.
    pub fn modulus() -> BigUint {
        BigUint::from_bytes_le(&Fr::MODULUS.to_bytes_le())
    }

    /// Build from a big integer, rejecting values `>= r`.
    pub fn from_biguint(v: &BigUint) -> Result<Self, FieldError> {
        if v >= &Self::modulus() {
            return Err(FieldError::OutOfField(v.to_string()));
        }
        Ok(Self(Fr::from_le_bytes_mod_order(&v.to_bytes_le())))
    }

    /// Render as an unsigned big integer.
    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_le(&self.0.into_bigint().to_bytes_le())
    }

    /// Parse a base-10 string, rejecting values `>= r`.
    pub fn from_decimal(s: &str) -> Result<Self, FieldError> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FieldError::InvalidDecimal(s.to_string()));
        }
        let v = BigUint::parse_bytes(trimmed.as_bytes(), 10)
            .ok_or_else(|| FieldError::InvalidDecimal(s.to_string()))?;
        Self::from_biguint(&v)
    }

    /// Render as a base-10 string (the circuit wire format).
    pub fn to_decimal(&self) -> String {
        self.to_biguint().to_string()
    }

    /// Decode 32 little-endian bytes, rejecting values `>= r`.
    pub fn from_le_bytes(bytes: &[u8; 32]) -> Result<Self, FieldError> {
        Self::from_biguint(&BigUint::from_bytes_le(bytes))
    }

    /// Decode little-endian bytes of any length, reducing modulo `r`.
    pub fn from_le_bytes_mod_order(bytes: &[u8]) -> Self {
        Self(Fr::from_le_bytes_mod_order(bytes))
    }

    /// Encode as 32 little-endian bytes.
    pub fn to_le_bytes(&self) -> [u8; 32] {
        let bytes = self.0.into_bigint().to_bytes_le();
        let mut out = [0u8; 32];
        out[..bytes.len()].copy_from_slice(&bytes);
        out
    }

    /// Bit `i` of the canonical integer, least significant first.
    ///
    /// Sparse Merkle trees descend left on `0` and right on `1`, starting
    /// from bit 0 at the root.
    pub fn bit(&self, i: usize) -> bool {
        let bytes = self.to_le_bytes();
        match bytes.get(i / 8) {
            Some(b) => (b >> (i % 8)) & 1 == 1,
            None => false,
        }
    }
}

impl Default for FieldElement {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<Fr> for FieldElement {
    fn from(v: Fr) -> Self {
        Self(v)
    }
}

impl From<FieldElement> for Fr {
    fn from(v: FieldElement) -> Self {
        v.0
    }
}

impl From<u64> for FieldElement {
    fn from(v: u64) -> Self {
        Self::from_u64(v)
    }
}

impl FromStr for FieldElement {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_decimal(s)
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal())
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement({})", self.to_decimal())
    }
}

impl Serialize for FieldElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_decimal())
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_decimal(&s).map_err(serde::de::Error::custom)
    }
}

/// The all-zero hash: marks an empty subtree.
pub const HASH_ZERO: Hash256 = Hash256([0u8; 32]);

/// A tree node hash: 32 bytes, little-endian field element encoding.
///
/// Conversion to and from [`FieldElement`] is a bijection on the valid
/// range. Serializes as a base-10 string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// Returns `true` for the empty-subtree sentinel.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Return the raw little-endian bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the bytes as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Parse a 64-character hex string of little-endian bytes.
    pub fn from_hex(s: &str) -> Result<Self, FieldError> {
        let hash = Self(hex::decode_array(s)?);
        FieldElement::try_from(hash)?;
        Ok(hash)
    }

    /// Render as a base-10 string.
    pub fn to_decimal(&self) -> String {
        BigUint::from_bytes_le(&self.0).to_string()
    }
}

impl From<FieldElement> for Hash256 {
    fn from(v: FieldElement) -> Self {
        Self(v.to_le_bytes())
    }
}

impl TryFrom<Hash256> for FieldElement {
    type Error = FieldError;

    fn try_from(h: Hash256) -> Result<Self, Self::Error> {
        FieldElement::from_le_bytes(&h.0)
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal())
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash256({}...)", &self.to_hex()[..16])
    }
}

impl Serialize for Hash256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_decimal())
    }
}

impl<'de> Deserialize<'de> for Hash256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        FieldElement::deserialize(deserializer).map(Hash256::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const MODULUS_DEC: &str =
        "21888242871839275222246405745257275088548364400416034343698204186575808495617";

    #[test]
    fn modulus_matches_bn254_scalar_field() {
        assert_eq!(FieldElement::modulus().to_string(), MODULUS_DEC);
    }

    #[test]
    fn modulus_is_rejected() {
        assert!(matches!(
            FieldElement::from_decimal(MODULUS_DEC),
            Err(FieldError::OutOfField(_))
        ));
    }

    #[test]
    fn modulus_minus_one_is_accepted() {
        let max = "21888242871839275222246405745257275088548364400416034343698204186575808495616";
        let fe = FieldElement::from_decimal(max).unwrap();
        assert_eq!(fe.to_decimal(), max);
    }

    #[test]
    fn invalid_decimal_rejected() {
        assert!(FieldElement::from_decimal("").is_err());
        assert!(FieldElement::from_decimal("-1").is_err());
        assert!(FieldElement::from_decimal("12a").is_err());
        assert!(FieldElement::from_decimal("0x10").is_err());
    }

    #[test]
    fn zero_renders_as_zero() {
        assert_eq!(FieldElement::zero().to_decimal(), "0");
        assert_eq!(HASH_ZERO.to_decimal(), "0");
        assert!(Hash256::from(FieldElement::zero()).is_zero());
    }

    #[test]
    fn le_bytes_layout() {
        let fe = FieldElement::from_u64(0x0102);
        let bytes = fe.to_le_bytes();
        assert_eq!(bytes[0], 0x02);
        assert_eq!(bytes[1], 0x01);
        assert!(bytes[2..].iter().all(|b| *b == 0));
    }

    #[test]
    fn out_of_field_bytes_rejected() {
        let bytes = [0xffu8; 32];
        assert!(FieldElement::from_le_bytes(&bytes).is_err());
        assert!(FieldElement::try_from(Hash256(bytes)).is_err());
    }

    #[test]
    fn mod_order_reduces() {
        let reduced = FieldElement::from_le_bytes_mod_order(&FieldElement::modulus().to_bytes_le());
        assert!(reduced.is_zero());
    }

    #[test]
    fn bit_extraction() {
        let fe = FieldElement::from_u64(0b1010);
        assert!(!fe.bit(0));
        assert!(fe.bit(1));
        assert!(!fe.bit(2));
        assert!(fe.bit(3));
        assert!(!fe.bit(300));
    }

    #[test]
    fn serde_uses_decimal_strings() {
        let fe = FieldElement::from_u64(42);
        assert_eq!(serde_json::to_string(&fe).unwrap(), "\"42\"");
        let back: FieldElement = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(back, fe);
        assert_eq!(serde_json::to_string(&Hash256::from(fe)).unwrap(), "\"42\"");
    }

    #[test]
    fn serde_rejects_out_of_field() {
        let json = format!("\"{MODULUS_DEC}\"");
        assert!(serde_json::from_str::<FieldElement>(&json).is_err());
    }

    #[test]
    fn hash_hex_roundtrip() {
        let h = Hash256::from(FieldElement::from_u64(7));
        assert_eq!(
            h.to_hex(),
            "0700000000000000000000000000000000000000000000000000000000000000"
        );
        assert_eq!(Hash256::from_hex(&h.to_hex()).unwrap(), h);
        assert!(Hash256::from_hex("07").is_err());
    }

    proptest! {
        #[test]
        fn hash256_conversion_is_bijective(bytes in proptest::array::uniform32(any::<u8>())) {
            let fe = FieldElement::from_le_bytes_mod_order(&bytes);
            let h = Hash256::from(fe);
            prop_assert_eq!(FieldElement::try_from(h).unwrap(), fe);
        }

        #[test]
        fn decimal_roundtrip(v in any::<u64>()) {
            let fe = FieldElement::from_u64(v);
            prop_assert_eq!(fe.to_decimal(), v.to_string());
            prop_assert_eq!(FieldElement::from_decimal(&v.to_string()).unwrap(), fe);
        }
    }
}
