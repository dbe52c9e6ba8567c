//! # Sparse Merkle Proof Encoding
//!
//! Circuits take a proof as a fixed-length sibling array plus an auxiliary
//! node triple `(auxKey, auxValue, noAux)`.
//!
//! ## Encoding
//!
//! Siblings are right-padded with zero up to the circuit depth and never
//! truncated. The auxiliary node follows a three-way split:
//!
//! | existence | node aux | aux key | aux value | noAux |
//! |-----------|----------|---------|-----------|-------|
//! | true      | any      | 0       | 0         | 0     |
//! | false     | present  | aux.key | aux.value | 0     |
//! | false     | absent   | 0       | 0         | 1     |
//!
//! `noAux = 1` tells the circuit the queried position is empty; `noAux = 0`
//! with a non-zero key tells it a different leaf occupies the position.
//! Swapping the two yields a proof that verifies but means the opposite.

use serde::{Deserialize, Serialize};
use zkid_core::{FieldElement, Hash256, HASH_ZERO};
use zkid_crypto::ProofResult;

use crate::error::ZkpError;

/// The auxiliary node triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuxNode {
    pub key: Hash256,
    pub value: Hash256,
    #[serde(with = "bit")]
    pub no_aux: bool,
}

impl AuxNode {
    /// `noAux` as the field element the circuit expects.
    pub fn no_aux_field(&self) -> FieldElement {
        FieldElement::from_u64(u64::from(self.no_aux))
    }
}

/// A proof in circuit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedProof {
    pub siblings: Vec<Hash256>,
    pub aux: AuxNode,
}

impl EncodedProof {
    /// The encoding of an absent proof: `depth` zero siblings, all-zero aux.
    pub fn empty(depth: usize) -> Self {
        Self {
            siblings: vec![HASH_ZERO; depth],
            aux: AuxNode {
                key: HASH_ZERO,
                value: HASH_ZERO,
                no_aux: false,
            },
        }
    }
}

/// Encode `proof` for a circuit of the given depth.
pub fn encode(proof: &ProofResult, depth: usize) -> Result<EncodedProof, ZkpError> {
    if proof.siblings.len() > depth {
        tracing::warn!(
            siblings = proof.siblings.len(),
            depth,
            "proof deeper than circuit"
        );
        return Err(ZkpError::DepthExceeded {
            siblings: proof.siblings.len(),
            depth,
        });
    }
    let mut siblings = proof.siblings.clone();
    siblings.resize(depth, HASH_ZERO);

    let aux = match (proof.existence, &proof.node_aux) {
        (true, _) => AuxNode {
            key: HASH_ZERO,
            value: HASH_ZERO,
            no_aux: false,
        },
        (false, Some(node)) => AuxNode {
            key: node.key,
            value: node.value,
            no_aux: false,
        },
        (false, None) => AuxNode {
            key: HASH_ZERO,
            value: HASH_ZERO,
            no_aux: true,
        },
    };
    Ok(EncodedProof { siblings, aux })
}

mod bit {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *v { "1" } else { "0" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match String::deserialize(deserializer)?.as_str() {
            "0" => Ok(false),
            "1" => Ok(true),
            other => Err(serde::de::Error::custom(format!("expected \"0\" or \"1\", got {other:?}"))),
        }
    }
}
