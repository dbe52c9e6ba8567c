//! # Merklized Document Paths
//!
//! A merklized credential stores the root of a tree built over its JSON-LD
//! document in claim slot A. Queries then address one document entry by
//! path key and prove it against that root. Building the document tree is
//! left to a [`Merklizer`] implementation; this module turns its output
//! into the `claimPath*` circuit inputs.

use serde::{Deserialize, Serialize};
use zkid_core::FieldElement;
use zkid_crypto::ProofResult;

use crate::encoding::{encode, EncodedProof};
use crate::error::ZkpError;

/// A document entry lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathProof {
    /// Tree key of the path.
    pub key: FieldElement,
    /// Entry value, absent when the path does not exist in the document.
    pub value: Option<FieldElement>,
    pub proof: ProofResult,
}

/// Source of merklized document proofs.
pub trait Merklizer {
    /// Root of the document tree.
    fn root(&self) -> FieldElement;

    /// Look up the entry at `path`.
    fn path_proof(&self, path: &str) -> Result<PathProof, ZkpError>;
}

/// The `claimPath*` inputs shared by every query circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimPathInputs {
    pub key: FieldElement,
    pub value: FieldElement,
    pub not_exists: bool,
    pub mtp: EncodedProof,
}

impl ClaimPathInputs {
    /// Inputs for a non-merklized claim: zero key and value, zero-filled
    /// proof, `notExists = 0`.
    pub fn not_merklized(depth: usize) -> Self {
        Self {
            key: FieldElement::zero(),
            value: FieldElement::zero(),
            not_exists: false,
            mtp: EncodedProof::empty(depth),
        }
    }

    /// Inputs for the entry at `path` of a merklized document.
    pub fn merklized<M: Merklizer>(merklizer: &M, path: &str, depth: usize) -> Result<Self, ZkpError> {
        let lookup = merklizer.path_proof(path)?;
        let not_exists = !lookup.proof.existence;
        Ok(Self {
            key: lookup.key,
            value: lookup.value.unwrap_or_default(),
            not_exists,
            mtp: encode(&lookup.proof, depth)?,
        })
    }

    pub fn not_exists_field(&self) -> FieldElement {
        FieldElement::from_u64(u64::from(self.not_exists))
    }
}
