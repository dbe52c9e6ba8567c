//! # Identifiers
//!
//! A genesis identifier is 31 bytes:
//!
//! ```text
//! [ type (2) | genesis (27) | checksum (2) ]
//! ```
//!
//! - `type` is the DID method byte followed by the blockchain/network flag.
//! - `genesis` is the 27 most significant bytes of the little-endian
//!   encoding of the identity state the identifier was derived from.
//! - `checksum` is the wrapping `u16` sum of the preceding 29 bytes,
//!   high byte first.
//!
//! As a field element the identifier is the little-endian integer of its
//! 31 bytes, which always fits below the BN254 modulus.

use std::fmt;

use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::IdentifierError;
use crate::field::FieldElement;
use crate::hex;

/// Length of a serialized identifier.
pub const ID_LENGTH: usize = 31;

/// Length of the genesis section.
pub const GENESIS_LENGTH: usize = 27;

/// DID method recorded in the first type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DidMethod {
    Iden3,
    PolygonId,
    Other,
}

impl DidMethod {
    pub fn byte(self) -> u8 {
        match self {
            Self::Iden3 => 0b0000_0001,
            Self::PolygonId => 0b0000_0010,
            Self::Other => 0b1111_1111,
        }
    }
}

/// Blockchain half of the network flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Blockchain {
    ReadOnly,
    Ethereum,
    Polygon,
    Zkevm,
}

impl fmt::Display for Blockchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ReadOnly => "readonly",
            Self::Ethereum => "eth",
            Self::Polygon => "polygon",
            Self::Zkevm => "zkevm",
        };
        f.write_str(s)
    }
}

/// Network half of the network flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    None,
    Main,
    Mumbai,
    Amoy,
    Goerli,
    Sepolia,
    Test,
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::Main => "main",
            Self::Mumbai => "mumbai",
            Self::Amoy => "amoy",
            Self::Goerli => "goerli",
            Self::Sepolia => "sepolia",
            Self::Test => "test",
        };
        f.write_str(s)
    }
}

/// The two type bytes that prefix every identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct IdType(pub [u8; 2]);

impl IdType {
    /// Build the type prefix for a method on a blockchain/network pair.
    ///
    /// Only registered combinations are accepted. `ReadOnly` pairs with
    /// `Network::None` alone.
    pub fn new(
        method: DidMethod,
        blockchain: Blockchain,
        network: Network,
    ) -> Result<Self, IdentifierError> {
        let flag = match (blockchain, network) {
            (Blockchain::ReadOnly, Network::None) => 0x00,
            (Blockchain::Polygon, Network::Main) => 0x11,
            (Blockchain::Polygon, Network::Mumbai) => 0x12,
            (Blockchain::Polygon, Network::Amoy) => 0x13,
            (Blockchain::Ethereum, Network::Main) => 0x21,
            (Blockchain::Ethereum, Network::Goerli) => 0x22,
            (Blockchain::Ethereum, Network::Sepolia) => 0x23,
            (Blockchain::Zkevm, Network::Main) => 0x31,
            (Blockchain::Zkevm, Network::Test) => 0x32,
            _ => {
                return Err(IdentifierError::UnsupportedNetwork {
                    blockchain: blockchain.to_string(),
                    network: network.to_string(),
                })
            }
        };
        Ok(Self([method.byte(), flag]))
    }

    pub fn as_bytes(&self) -> [u8; 2] {
        self.0
    }
}

/// A 31-byte genesis identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identifier([u8; ID_LENGTH]);

impl Identifier {
    /// Derive the identifier for `state` under the given type prefix.
    pub fn from_state(id_type: IdType, state: FieldElement) -> Self {
        let state_bytes = state.to_le_bytes();
        let mut genesis = [0u8; GENESIS_LENGTH];
        genesis.copy_from_slice(&state_bytes[32 - GENESIS_LENGTH..]);
        Self::from_parts(id_type, genesis)
    }

    /// Assemble an identifier from its type and genesis sections.
    pub fn from_parts(id_type: IdType, genesis: [u8; GENESIS_LENGTH]) -> Self {
        let mut bytes = [0u8; ID_LENGTH];
        bytes[..2].copy_from_slice(&id_type.0);
        bytes[2..29].copy_from_slice(&genesis);
        let checksum = checksum(&bytes[..29]);
        bytes[29..].copy_from_slice(&checksum);
        Self(bytes)
    }

    /// Parse raw bytes, validating the checksum.
    pub fn from_bytes(bytes: [u8; ID_LENGTH]) -> Result<Self, IdentifierError> {
        let expected = checksum(&bytes[..29]);
        let actual = [bytes[29], bytes[30]];
        if expected != actual {
            return Err(IdentifierError::ChecksumMismatch { expected, actual });
        }
        Ok(Self(bytes))
    }

    /// Decode the little-endian integer form.
    pub fn from_field(value: FieldElement) -> Result<Self, IdentifierError> {
        let le = value.to_le_bytes();
        if le[ID_LENGTH..].iter().any(|b| *b != 0) {
            return Err(IdentifierError::TooLarge);
        }
        let mut bytes = [0u8; ID_LENGTH];
        bytes.copy_from_slice(&le[..ID_LENGTH]);
        Self::from_bytes(bytes)
    }

    /// The identifier as a field element (little-endian integer).
    pub fn to_field(&self) -> FieldElement {
        FieldElement::from_le_bytes_mod_order(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8; ID_LENGTH] {
        &self.0
    }

    pub fn id_type(&self) -> IdType {
        IdType([self.0[0], self.0[1]])
    }

    pub fn genesis(&self) -> [u8; GENESIS_LENGTH] {
        let mut out = [0u8; GENESIS_LENGTH];
        out.copy_from_slice(&self.0[2..29]);
        out
    }

    pub fn checksum(&self) -> [u8; 2] {
        [self.0[29], self.0[30]]
    }

    /// Returns `true` if this identifier was derived from `state`.
    pub fn is_from_state(&self, state: FieldElement) -> bool {
        Self::from_state(self.id_type(), state) == *self
    }
}

fn checksum(bytes: &[u8]) -> [u8; 2] {
    let sum = bytes
        .iter()
        .fold(0u16, |acc, b| acc.wrapping_add(u16::from(*b)));
    sum.to_be_bytes()
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_field().to_decimal())
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", hex::encode(&self.0))
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_field().to_decimal())
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let v = BigUint::parse_bytes(s.as_bytes(), 10)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid identifier: {s:?}")))?;
        let fe = FieldElement::from_biguint(&v).map_err(serde::de::Error::custom)?;
        Self::from_field(fe).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> FieldElement {
        FieldElement::from_decimal(
            "7853200120776062878684798364095072458815029376092732009249414926327459813530",
        )
        .unwrap()
    }

    #[test]
    fn id_type_flags() {
        let t = IdType::new(DidMethod::PolygonId, Blockchain::Polygon, Network::Amoy).unwrap();
        assert_eq!(t.as_bytes(), [0x02, 0x13]);
        let t = IdType::new(DidMethod::Iden3, Blockchain::ReadOnly, Network::None).unwrap();
        assert_eq!(t.as_bytes(), [0x01, 0x00]);
    }

    #[test]
    fn unsupported_network_rejected() {
        let err = IdType::new(DidMethod::Iden3, Blockchain::Polygon, Network::Sepolia);
        assert!(matches!(err, Err(IdentifierError::UnsupportedNetwork { .. })));
    }

    #[test]
    fn layout_of_derived_identifier() {
        let t = IdType([0x01, 0x21]);
        let st = state();
        let id = Identifier::from_state(t, st);
        assert_eq!(id.id_type(), t);
        assert_eq!(&id.genesis()[..], &st.to_le_bytes()[5..]);
        let sum: u16 = id.as_bytes()[..29]
            .iter()
            .fold(0u16, |a, b| a.wrapping_add(*b as u16));
        assert_eq!(id.checksum(), sum.to_be_bytes());
    }

    #[test]
    fn field_roundtrip() {
        let id = Identifier::from_state(IdType([0x01, 0x21]), state());
        let back = Identifier::from_field(id.to_field()).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn corrupted_checksum_rejected() {
        let id = Identifier::from_state(IdType::default(), state());
        let mut bytes = *id.as_bytes();
        bytes[30] ^= 0x01;
        assert!(matches!(
            Identifier::from_bytes(bytes),
            Err(IdentifierError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn wide_field_rejected() {
        assert_eq!(
            Identifier::from_field(state()),
            Err(IdentifierError::TooLarge)
        );
    }

    #[test]
    fn is_from_state() {
        let id = Identifier::from_state(IdType([0x02, 0x12]), state());
        assert!(id.is_from_state(state()));
        assert!(!id.is_from_state(FieldElement::from_u64(1)));
    }

    #[test]
    fn serde_decimal() {
        let id = Identifier::from_state(IdType([0x01, 0x00]), state());
        let json = serde_json::to_string(&id).unwrap();
        let back: Identifier = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
