//! # Global Identity State Tree
//!
//! The registry of every identity's latest published state. Entries are
//! keyed by `Poseidon(id)` rather than the identifier itself, so registry
//! keys never collide with per-identity claim keys.

use zkid_core::{FieldElement, Identifier, TreeError};
use zkid_crypto::{poseidon, MemoryTree, ProofResult, SparseMerkleTree};

use crate::error::IdentityError;

/// Default registry depth.
pub const DEFAULT_GIST_LEVELS: usize = 64;

/// The registry key of an identifier: `Poseidon(id)`.
pub fn gist_key(id: &Identifier) -> Result<FieldElement, IdentityError> {
    Ok(poseidon::hash1(id.to_field())?)
}

/// An in-memory global identity state registry.
#[derive(Debug, Clone)]
pub struct GistRegistry {
    tree: MemoryTree,
}

impl GistRegistry {
    pub fn new(levels: usize) -> Result<Self, IdentityError> {
        Ok(Self {
            tree: MemoryTree::new(levels)?,
        })
    }

    pub fn levels(&self) -> usize {
        self.tree.max_levels()
    }

    pub fn root(&self) -> FieldElement {
        self.tree.root()
    }

    /// Record `state` as the latest state of `id`, replacing any earlier one.
    pub fn publish(&mut self, id: &Identifier, state: FieldElement) -> Result<(), IdentityError> {
        let key = gist_key(id)?;
        match self.tree.add(key, state) {
            Err(TreeError::EntryIndexAlreadyExists) => self.tree.update(key, state)?,
            other => other?,
        }
        tracing::debug!(id = %id, state = %state, "state published to registry");
        Ok(())
    }

    /// The latest published state of `id`.
    pub fn state_of(&self, id: &Identifier) -> Result<Option<FieldElement>, IdentityError> {
        Ok(self.tree.get(gist_key(id)?))
    }

    /// Raw registry proof for `id`.
    pub fn proof(&self, id: &Identifier) -> Result<ProofResult, IdentityError> {
        Ok(self.tree.generate_proof(gist_key(id)?)?)
    }
}
