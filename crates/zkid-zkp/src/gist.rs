//! # GIST Proof Adapter
//!
//! Turns a [`GistRegistry`] lookup into the `gistRoot` / `gistMtp*` inputs.
//! The tree key is `Hash1(id)`, never the raw identifier; that is the key
//! the circuits recompute before checking the proof.

use serde::{Deserialize, Serialize};
use zkid_core::{FieldElement, Identifier};
use zkid_identity::GistRegistry;

use crate::encoding::{encode, EncodedProof};
use crate::error::ZkpError;

/// A GIST membership (or non-membership) proof in circuit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GistProof {
    pub root: FieldElement,
    pub proof: EncodedProof,
}

/// Prove the GIST entry for `id`, padded to `depth` siblings.
pub fn gist_proof(registry: &GistRegistry, id: &Identifier, depth: usize) -> Result<GistProof, ZkpError> {
    let raw = registry.proof(id)?;
    tracing::debug!(id = %id, existence = raw.existence, depth, "gist proof");
    Ok(GistProof {
        root: registry.root(),
        proof: encode(&raw, depth)?,
    })
}

/// Prove the GIST entry for `id` at the registry's own depth.
pub fn gist_proof_at_registry_depth(registry: &GistRegistry, id: &Identifier) -> Result<GistProof, ZkpError> {
    gist_proof(registry, id, registry.levels())
}
