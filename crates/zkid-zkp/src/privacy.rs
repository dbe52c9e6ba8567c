//! # Link IDs and Nullifiers
//!
//! - **Link ID**: `H2(H2(hi, hv), nonce)`. Proofs over the same claim with the
//!   same nonce share a link ID; nonce `0` disables linking. Binding `hv`
//!   means a changed or re-issued claim yields a new tag.
//! - **Nullifier**: `H5(userID, profileNonce, schemaHash, verifierID,
//!   sessionID)`. Identical inputs always give the same nullifier, which
//!   is what lets a verifier reject a second proof for the same session.

use zkid_claims::Claim;
use zkid_core::FieldElement;
use zkid_crypto::poseidon;

use crate::error::ZkpError;

/// The link tag of `claim` under `nonce`, or `None` when linking is disabled.
pub fn link_id(nonce: FieldElement, claim: &Claim) -> Result<Option<FieldElement>, ZkpError> {
    if nonce.is_zero() {
        return Ok(None);
    }
    let claim_hash = claim.hash()?;
    Ok(Some(poseidon::hash2(claim_hash, nonce)?))
}

/// Inputs of a nullifier, in hashing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NullifierInputs {
    pub user_id: FieldElement,
    pub profile_nonce: FieldElement,
    pub schema_hash: FieldElement,
    pub verifier_id: FieldElement,
    pub session_id: FieldElement,
}

/// `Poseidon(userID, profileNonce, schemaHash, verifierID, sessionID)`.
pub fn nullifier(inputs: &NullifierInputs) -> Result<FieldElement, ZkpError> {
    Ok(poseidon::hash(&[
        inputs.user_id,
        inputs.profile_nonce,
        inputs.schema_hash,
        inputs.verifier_id,
        inputs.session_id,
    ])?)
}
