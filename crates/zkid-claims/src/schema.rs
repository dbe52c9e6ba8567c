//! # Schema Hashes
//!
//! A schema hash is the 16-byte identifier of a claim's semantic type. It
//! occupies bytes `0..16` of the first index slot. As a field element it is
//! the little-endian integer of those 16 bytes.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zkid_core::{hex, FieldElement};

use crate::error::ClaimError;

/// Length of a schema hash in bytes.
pub const SCHEMA_HASH_LENGTH: usize = 16;

/// Schema of the Baby Jubjub authentication claim.
pub const AUTH_BJJ_SCHEMA_HASH: SchemaHash = SchemaHash([
    0xca, 0x93, 0x88, 0x57, 0x24, 0x1d, 0xb9, 0x45, 0x1e, 0xa3, 0x29, 0x25, 0x6b, 0x9c, 0x06, 0xe5,
]);

/// A 16-byte claim schema identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SchemaHash(pub [u8; SCHEMA_HASH_LENGTH]);

impl SchemaHash {
    pub fn from_bytes(bytes: [u8; SCHEMA_HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SCHEMA_HASH_LENGTH] {
        &self.0
    }

    /// Parse 32 hex characters, in byte order.
    pub fn from_hex(s: &str) -> Result<Self, ClaimError> {
        hex::decode_array(s)
            .map(Self)
            .map_err(|e| ClaimError::InvalidSchemaHash(e.to_string()))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// The schema hash as a field element (little-endian integer).
    pub fn to_field(&self) -> FieldElement {
        FieldElement::from_le_bytes_mod_order(&self.0)
    }
}

impl fmt::Debug for SchemaHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SchemaHash({})", self.to_hex())
    }
}

impl fmt::Display for SchemaHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for SchemaHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SchemaHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}
