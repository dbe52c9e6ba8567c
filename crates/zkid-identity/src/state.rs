//! # Identity State
//!
//! `state = Poseidon(ClT.root, ReT.root, RoT.root)`. The argument order is
//! part of the commitment.
//!
//! The genesis identifier is derived from the state an identity would have
//! with only its claims tree populated: `Poseidon(ClT.root, 0, 0)`. It never
//! changes afterwards, however the state evolves.

use serde::{Deserialize, Serialize};
use zkid_core::{CryptoError, FieldElement, IdType, Identifier};
use zkid_crypto::{poseidon, SparseMerkleTree};

/// Default depth of each per-identity tree.
pub const DEFAULT_TREE_LEVELS: usize = 40;

/// Depths of the three per-identity trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeLevels {
    pub claims: usize,
    pub revocation: usize,
    pub roots: usize,
}

impl TreeLevels {
    /// The same depth for all three trees.
    pub fn uniform(levels: usize) -> Self {
        Self {
            claims: levels,
            revocation: levels,
            roots: levels,
        }
    }
}

impl Default for TreeLevels {
    fn default() -> Self {
        Self::uniform(DEFAULT_TREE_LEVELS)
    }
}

/// The state commitment together with the roots it commits to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeState {
    pub state: FieldElement,
    pub claims_root: FieldElement,
    pub revocation_root: FieldElement,
    pub roots_root: FieldElement,
}

impl TreeState {
    /// Compute the state for the given roots.
    pub fn new(
        claims_root: FieldElement,
        revocation_root: FieldElement,
        roots_root: FieldElement,
    ) -> Result<Self, CryptoError> {
        Ok(Self {
            state: identity_state(claims_root, revocation_root, roots_root)?,
            claims_root,
            revocation_root,
            roots_root,
        })
    }

    /// Recompute the state from the roots and compare.
    pub fn is_consistent(&self) -> Result<bool, CryptoError> {
        Ok(identity_state(self.claims_root, self.revocation_root, self.roots_root)? == self.state)
    }
}

/// `Poseidon(claims_root, revocation_root, roots_root)`.
pub fn identity_state(
    claims_root: FieldElement,
    revocation_root: FieldElement,
    roots_root: FieldElement,
) -> Result<FieldElement, CryptoError> {
    poseidon::hash3(claims_root, revocation_root, roots_root)
}

/// Derive the genesis identifier from a claims tree alone.
pub fn genesis_id<T: SparseMerkleTree>(id_type: IdType, claims_tree: &T) -> Result<Identifier, CryptoError> {
    let state = identity_state(claims_tree.root(), FieldElement::zero(), FieldElement::zero())?;
    Ok(id_from_state(id_type, state))
}

/// Rebuild the identifier an identity with genesis `state` would have.
pub fn id_from_state(id_type: IdType, state: FieldElement) -> Identifier {
    Identifier::from_state(id_type, state)
}
