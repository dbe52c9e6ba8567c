//! # Atomic Query Commitment
//!
//! A query binds a predicate over one claim to a single field element:
//!
//! ```text
//! padded     = values ‖ 0 … 0                       (capacity entries)
//! valuesHash = SpongeHash(padded, frame 6)
//! header     = H6(schemaHash, slotIndex, operator, claimPathKey, merklized, valuesHash)
//! queryHash  = H6(header, valueArraySize, 0, 0, 0, 0)
//! ```
//!
//! `valueArraySize` is the declared number of values before padding.
//! Because padding is explicit, appending zeros beyond the declared size
//! leaves the commitment unchanged.
//!
//! The operator is an opaque tag here. It is hashed, never evaluated.
//!
//! ## Preconditions not checked
//!
//! `merklized` must be set exactly when the claim data is a merklized
//! document root and a path proof is supplied. A mismatch produces a
//! commitment that fails circuit verification.

use std::fmt;

use serde::{Deserialize, Serialize};
use zkid_claims::SchemaHash;
use zkid_core::FieldElement;
use zkid_crypto::poseidon;

use crate::error::ZkpError;

/// Sponge frame size used for the value array.
pub const VALUES_FRAME_SIZE: usize = 6;

/// Number of claim slots a query can address.
pub const CLAIM_SLOTS: u8 = 8;

/// Query operators and their circuit tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    Noop,
    Eq,
    Lt,
    Gt,
    In,
    Nin,
    Ne,
    Lte,
    Gte,
    Between,
    NotBetween,
    Exists,
    /// Selective disclosure: the circuit reveals the value.
    Sd,
}

impl Operator {
    pub fn tag(self) -> u64 {
        match self {
            Self::Noop => 0,
            Self::Eq => 1,
            Self::Lt => 2,
            Self::Gt => 3,
            Self::In => 4,
            Self::Nin => 5,
            Self::Ne => 6,
            Self::Lte => 7,
            Self::Gte => 8,
            Self::Between => 9,
            Self::NotBetween => 10,
            Self::Exists => 11,
            Self::Sd => 16,
        }
    }

    pub fn from_tag(tag: u64) -> Option<Self> {
        Some(match tag {
            0 => Self::Noop,
            1 => Self::Eq,
            2 => Self::Lt,
            3 => Self::Gt,
            4 => Self::In,
            5 => Self::Nin,
            6 => Self::Ne,
            7 => Self::Lte,
            8 => Self::Gte,
            9 => Self::Between,
            10 => Self::NotBetween,
            11 => Self::Exists,
            16 => Self::Sd,
            _ => return None,
        })
    }

    pub fn to_field(self) -> FieldElement {
        FieldElement::from_u64(self.tag())
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// A predicate over one claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtomicQuery {
    pub schema: SchemaHash,
    pub slot_index: u8,
    pub operator: Operator,
    pub claim_path_key: FieldElement,
    pub merklized: bool,
    pub values: Vec<FieldElement>,
    pub value_array_size: usize,
}

impl AtomicQuery {
    /// A non-merklized query over claim slot `slot_index`.
    pub fn new(schema: SchemaHash, slot_index: u8, operator: Operator, values: Vec<FieldElement>) -> Self {
        Self {
            schema,
            slot_index,
            operator,
            claim_path_key: FieldElement::zero(),
            merklized: false,
            value_array_size: values.len(),
            values,
        }
    }

    /// A query over the merklized document entry at `claim_path_key`.
    pub fn merklized(
        schema: SchemaHash,
        claim_path_key: FieldElement,
        operator: Operator,
        values: Vec<FieldElement>,
    ) -> Self {
        Self {
            claim_path_key,
            merklized: true,
            ..Self::new(schema, 0, operator, values)
        }
    }

    /// The value array padded to `capacity`.
    pub fn circuit_values(&self, capacity: usize) -> Result<Vec<FieldElement>, ZkpError> {
        prepare_circuit_values(&self.values, capacity)
    }

    /// The query commitment for a circuit with `capacity` value slots.
    pub fn query_hash(&self, capacity: usize) -> Result<FieldElement, ZkpError> {
        if self.slot_index >= CLAIM_SLOTS {
            return Err(ZkpError::InvalidSlotIndex(self.slot_index));
        }
        if self.value_array_size > capacity {
            return Err(ZkpError::TooManyValues {
                len: self.value_array_size,
                capacity,
            });
        }
        let padded = self.circuit_values(capacity)?;
        query_commitment(&QueryFields {
            schema: self.schema.to_field(),
            slot_index: FieldElement::from_u64(u64::from(self.slot_index)),
            operator: self.operator.to_field(),
            claim_path_key: self.claim_path_key,
            merklized: FieldElement::from_u64(u64::from(self.merklized)),
            values: &padded,
            value_array_size: FieldElement::from_u64(self.value_array_size as u64),
        })
    }
}

/// Query parameters in circuit form, as they appear in an input record.
#[derive(Debug, Clone, Copy)]
pub struct QueryFields<'a> {
    pub schema: FieldElement,
    pub slot_index: FieldElement,
    pub operator: FieldElement,
    pub claim_path_key: FieldElement,
    pub merklized: FieldElement,
    /// The padded value array.
    pub values: &'a [FieldElement],
    pub value_array_size: FieldElement,
}

/// The commitment over circuit-form query parameters.
pub fn query_commitment(fields: &QueryFields<'_>) -> Result<FieldElement, ZkpError> {
    let values_hash = poseidon::sponge_hash(fields.values, VALUES_FRAME_SIZE)?;
    let header = poseidon::hash(&[
        fields.schema,
        fields.slot_index,
        fields.operator,
        fields.claim_path_key,
        fields.merklized,
        values_hash,
    ])?;
    let zero = FieldElement::zero();
    Ok(poseidon::hash(&[header, fields.value_array_size, zero, zero, zero, zero])?)
}

/// Right-pad `values` with zeros to exactly `capacity` entries.
pub fn prepare_circuit_values(values: &[FieldElement], capacity: usize) -> Result<Vec<FieldElement>, ZkpError> {
    if values.len() > capacity {
        tracing::warn!(len = values.len(), capacity, "query values exceed capacity");
        return Err(ZkpError::TooManyValues {
            len: values.len(),
            capacity,
        });
    }
    let mut out = values.to_vec();
    out.resize(capacity, FieldElement::zero());
    Ok(out)
}
