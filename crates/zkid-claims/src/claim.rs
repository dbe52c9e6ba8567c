//! # Claim Layout
//!
//! A claim is eight field-element slots, four in the index part and four in
//! the value part. Each slot is the little-endian encoding of a field
//! element.
//!
//! ```text
//! index[0]  schema hash (bytes 0..16) | flags (byte 16) | version (bytes 20..24)
//! index[1]  subject identifier when the subject sits in the index
//! index[2]  index data A, or the merklized root
//! index[3]  index data B
//! value[0]  revocation nonce (bytes 0..8) | expiration (bytes 8..16)
//! value[1]  subject identifier when the subject sits in the value
//! value[2]  value data A, or the merklized root
//! value[3]  value data B
//! ```
//!
//! Flag byte bits: `0..3` subject position (`000` none, `010` index,
//! `011` value), `3` has expiration, `4` updatable, `5..8` merklized root
//! position (`001` index, `010` value).
//!
//! `hi = Poseidon(index)` is the claims-tree key and `hv = Poseidon(value)`
//! its value. Both are pure functions of the slots, so any change to the
//! layout yields a different key/value pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zkid_core::{FieldElement, Identifier};
use zkid_crypto::poseidon;

use crate::error::ClaimError;
use crate::schema::{SchemaHash, SCHEMA_HASH_LENGTH};

const FLAGS_BYTE: usize = 16;
const VERSION_BYTES: std::ops::Range<usize> = 20..24;
const NONCE_BYTES: std::ops::Range<usize> = 0..8;
const EXPIRATION_BYTES: std::ops::Range<usize> = 8..16;

const SUBJECT_MASK: u8 = 0b0000_0111;
const EXPIRATION_BIT: u8 = 1 << 3;
const UPDATABLE_BIT: u8 = 1 << 4;
const MERKLIZED_SHIFT: u8 = 5;

/// Where the subject identifier is embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectPosition {
    /// The claim is about its issuer; no subject slot is used.
    None,
    Index,
    Value,
}

impl SubjectPosition {
    fn bits(self) -> u8 {
        match self {
            Self::None => 0b000,
            Self::Index => 0b010,
            Self::Value => 0b011,
        }
    }

    fn from_bits(bits: u8) -> Result<Self, ClaimError> {
        match bits {
            0b000 => Ok(Self::None),
            0b010 => Ok(Self::Index),
            0b011 => Ok(Self::Value),
            other => Err(ClaimError::InvalidHeader(format!(
                "unknown subject position {other:03b}"
            ))),
        }
    }
}

/// Where the merklized document root is embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MerklizedPosition {
    None,
    Index,
    Value,
}

impl MerklizedPosition {
    fn bits(self) -> u8 {
        match self {
            Self::None => 0b000,
            Self::Index => 0b001,
            Self::Value => 0b010,
        }
    }

    fn from_bits(bits: u8) -> Result<Self, ClaimError> {
        match bits {
            0b000 => Ok(Self::None),
            0b001 => Ok(Self::Index),
            0b010 => Ok(Self::Value),
            other => Err(ClaimError::InvalidHeader(format!(
                "unknown merklized position {other:03b}"
            ))),
        }
    }
}

/// A claim. Immutable once built.
///
/// Serializes as the eight slots in decimal, index part first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Claim {
    index: [FieldElement; 4],
    value: [FieldElement; 4],
}

impl Claim {
    /// Start building a claim of the given schema.
    pub fn builder(schema: SchemaHash) -> ClaimBuilder {
        ClaimBuilder::new(schema)
    }

    /// Decode a claim from its eight slots, validating the header flags and
    /// any embedded subject identifier.
    pub fn from_slots(slots: [FieldElement; 8]) -> Result<Self, ClaimError> {
        let mut index = [FieldElement::zero(); 4];
        let mut value = [FieldElement::zero(); 4];
        index.copy_from_slice(&slots[..4]);
        value.copy_from_slice(&slots[4..]);
        let claim = Self { index, value };
        claim.merklized_position()?;
        claim.subject_id()?;
        Ok(claim)
    }

    /// All eight slots, index part first (the circuit `claim` array).
    pub fn slots(&self) -> [FieldElement; 8] {
        let mut out = [FieldElement::zero(); 8];
        out[..4].copy_from_slice(&self.index);
        out[4..].copy_from_slice(&self.value);
        out
    }

    /// Index slots 0..4, the part hashed into `hi`.
    pub fn index_slots(&self) -> &[FieldElement; 4] {
        &self.index
    }

    /// Value slots 4..8, the part hashed into `hv`.
    pub fn value_slots(&self) -> &[FieldElement; 4] {
        &self.value
    }

    /// `(Poseidon(index), Poseidon(value))`.
    pub fn hi_hv(&self) -> Result<(FieldElement, FieldElement), ClaimError> {
        Ok((poseidon::hash(&self.index)?, poseidon::hash(&self.value)?))
    }

    /// `Poseidon(hi, hv)`, the claim hash bound into link tags.
    pub fn hash(&self) -> Result<FieldElement, ClaimError> {
        let (hi, hv) = self.hi_hv()?;
        Ok(poseidon::hash2(hi, hv)?)
    }

    fn header(&self) -> [u8; 32] {
        self.index[0].to_le_bytes()
    }

    fn flags(&self) -> u8 {
        self.header()[FLAGS_BYTE]
    }

    /// Schema hash from the header slot.
    pub fn schema_hash(&self) -> SchemaHash {
        let mut out = [0u8; SCHEMA_HASH_LENGTH];
        out.copy_from_slice(&self.header()[..SCHEMA_HASH_LENGTH]);
        SchemaHash(out)
    }

    /// Claim version from the header slot.
    pub fn version(&self) -> u32 {
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.header()[VERSION_BYTES]);
        u32::from_le_bytes(out)
    }

    /// Whether the updatable flag is set.
    pub fn is_updatable(&self) -> bool {
        self.flags() & UPDATABLE_BIT != 0
    }

    /// Where the subject identifier is stored, read from the header flags.
    pub fn subject_position(&self) -> Result<SubjectPosition, ClaimError> {
        SubjectPosition::from_bits(self.flags() & SUBJECT_MASK)
    }

    /// The embedded subject, if any.
    pub fn subject_id(&self) -> Result<Option<Identifier>, ClaimError> {
        let slot = match self.subject_position()? {
            SubjectPosition::None => return Ok(None),
            SubjectPosition::Index => self.index[1],
            SubjectPosition::Value => self.value[1],
        };
        Ok(Some(Identifier::from_field(slot)?))
    }

    /// Where the merklized root is stored, read from the header flags.
    pub fn merklized_position(&self) -> Result<MerklizedPosition, ClaimError> {
        MerklizedPosition::from_bits(self.flags() >> MERKLIZED_SHIFT)
    }

    /// The merklized document root, if the claim carries one.
    pub fn merklized_root(&self) -> Result<Option<FieldElement>, ClaimError> {
        Ok(match self.merklized_position()? {
            MerklizedPosition::None => None,
            MerklizedPosition::Index => Some(self.index[2]),
            MerklizedPosition::Value => Some(self.value[2]),
        })
    }

    /// Revocation nonce from value slot 0.
    pub fn revocation_nonce(&self) -> u64 {
        let mut out = [0u8; 8];
        out.copy_from_slice(&self.value[0].to_le_bytes()[NONCE_BYTES]);
        u64::from_le_bytes(out)
    }

    /// The expiration date, if the expiration flag is set.
    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        if self.flags() & EXPIRATION_BIT == 0 {
            return None;
        }
        let mut out = [0u8; 8];
        out.copy_from_slice(&self.value[0].to_le_bytes()[EXPIRATION_BYTES]);
        let secs = i64::try_from(u64::from_le_bytes(out)).ok()?;
        DateTime::<Utc>::from_timestamp(secs, 0)
    }

    /// Index data slots A and B.
    pub fn index_data(&self) -> (FieldElement, FieldElement) {
        (self.index[2], self.index[3])
    }

    /// Value data slots A and B.
    pub fn value_data(&self) -> (FieldElement, FieldElement) {
        (self.value[2], self.value[3])
    }
}

impl Serialize for Claim {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.slots().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Claim {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let slots = <[FieldElement; 8]>::deserialize(deserializer)?;
        Self::from_slots(slots).map_err(serde::de::Error::custom)
    }
}

/// Builder for [`Claim`].
///
/// Every option is recorded first and checked for consistency in
/// [`ClaimBuilder::build`].
#[derive(Debug, Clone)]
pub struct ClaimBuilder {
    schema: SchemaHash,
    index_id: Option<Identifier>,
    value_id: Option<Identifier>,
    index_data: Option<(FieldElement, FieldElement)>,
    value_data: Option<(FieldElement, FieldElement)>,
    index_merklized_root: Option<FieldElement>,
    value_merklized_root: Option<FieldElement>,
    expiration: Option<DateTime<Utc>>,
    revocation_nonce: u64,
    version: u32,
    updatable: bool,
}

impl ClaimBuilder {
    /// Start a claim of `schema` with every option unset.
    pub fn new(schema: SchemaHash) -> Self {
        Self {
            schema,
            index_id: None,
            value_id: None,
            index_data: None,
            value_data: None,
            index_merklized_root: None,
            value_merklized_root: None,
            expiration: None,
            revocation_nonce: 0,
            version: 0,
            updatable: false,
        }
    }

    /// Embed the subject in the index part.
    pub fn with_index_id(mut self, id: Identifier) -> Self {
        self.index_id = Some(id);
        self
    }

    /// Embed the subject in the value part.
    pub fn with_value_id(mut self, id: Identifier) -> Self {
        self.value_id = Some(id);
        self
    }

    /// Set index data slots A and B.
    pub fn with_index_data(mut self, a: FieldElement, b: FieldElement) -> Self {
        self.index_data = Some((a, b));
        self
    }

    /// Set value data slots A and B.
    pub fn with_value_data(mut self, a: FieldElement, b: FieldElement) -> Self {
        self.value_data = Some((a, b));
        self
    }

    /// Place a merklized document root in index slot A.
    pub fn with_index_merklized_root(mut self, root: FieldElement) -> Self {
        self.index_merklized_root = Some(root);
        self
    }

    /// Place a merklized document root in value slot A.
    pub fn with_value_merklized_root(mut self, root: FieldElement) -> Self {
        self.value_merklized_root = Some(root);
        self
    }

    /// Set an expiration; the flag and value slot 0 follow.
    pub fn with_expiration_date(mut self, expiration: DateTime<Utc>) -> Self {
        self.expiration = Some(expiration);
        self
    }

    /// Nonce recorded in the revocation tree when the claim is revoked.
    pub fn with_revocation_nonce(mut self, nonce: u64) -> Self {
        self.revocation_nonce = nonce;
        self
    }

    /// Schema-defined version number.
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Mark the claim as replaceable by a later version.
    pub fn with_updatable(mut self, updatable: bool) -> Self {
        self.updatable = updatable;
        self
    }

    /// Validate the options and lay out the slots.
    pub fn build(self) -> Result<Claim, ClaimError> {
        let (subject, subject_id) = match (self.index_id, self.value_id) {
            (Some(_), Some(_)) => return Err(ClaimError::ConflictingSubjectPosition),
            (Some(id), None) => (SubjectPosition::Index, Some(id)),
            (None, Some(id)) => (SubjectPosition::Value, Some(id)),
            (None, None) => (SubjectPosition::None, None),
        };
        let merklized = match (self.index_merklized_root, self.value_merklized_root) {
            (Some(_), Some(_)) => return Err(ClaimError::ConflictingMerklizedPosition),
            (Some(_), None) => MerklizedPosition::Index,
            (None, Some(_)) => MerklizedPosition::Value,
            (None, None) => MerklizedPosition::None,
        };
        if self.index_merklized_root.is_some() && self.index_data.is_some() {
            return Err(ClaimError::ConflictingDataSlot { part: "index" });
        }
        if self.value_merklized_root.is_some() && self.value_data.is_some() {
            return Err(ClaimError::ConflictingDataSlot { part: "value" });
        }
        let expiration = match self.expiration {
            Some(dt) => {
                let secs = dt.timestamp();
                Some(u64::try_from(secs).map_err(|_| ClaimError::InvalidExpiration(secs))?)
            }
            None => None,
        };

        let mut header = [0u8; 32];
        header[..SCHEMA_HASH_LENGTH].copy_from_slice(self.schema.as_bytes());
        let mut flags = subject.bits() | (merklized.bits() << MERKLIZED_SHIFT);
        if expiration.is_some() {
            flags |= EXPIRATION_BIT;
        }
        if self.updatable {
            flags |= UPDATABLE_BIT;
        }
        header[FLAGS_BYTE] = flags;
        header[VERSION_BYTES].copy_from_slice(&self.version.to_le_bytes());

        let mut meta = [0u8; 32];
        meta[NONCE_BYTES].copy_from_slice(&self.revocation_nonce.to_le_bytes());
        if let Some(secs) = expiration {
            meta[EXPIRATION_BYTES].copy_from_slice(&secs.to_le_bytes());
        }

        let mut index = [
            FieldElement::from_le_bytes(&header)?,
            FieldElement::zero(),
            FieldElement::zero(),
            FieldElement::zero(),
        ];
        let mut value = [
            FieldElement::from_le_bytes(&meta)?,
            FieldElement::zero(),
            FieldElement::zero(),
            FieldElement::zero(),
        ];
        match (subject, subject_id) {
            (SubjectPosition::Index, Some(id)) => index[1] = id.to_field(),
            (SubjectPosition::Value, Some(id)) => value[1] = id.to_field(),
            _ => {}
        }
        if let Some((a, b)) = self.index_data {
            index[2] = a;
            index[3] = b;
        }
        if let Some((a, b)) = self.value_data {
            value[2] = a;
            value[3] = b;
        }
        if let Some(root) = self.index_merklized_root {
            index[2] = root;
        }
        if let Some(root) = self.value_merklized_root {
            value[2] = root;
        }
        Ok(Claim { index, value })
    }
}
