//! # AuthV2
//!
//! The holder proves that the key signing `challenge` is the key in an
//! unrevoked authentication claim of their identity, and that the
//! identity's current state is the one published in the GIST.
//!
//! Public outputs are `userID` (the profile for `profileNonce`), the
//! challenge and the GIST root; [`AuthV2Inputs::user_id`] recomputes the
//! first.

use serde::{Deserialize, Serialize};
use zkid_claims::Claim;
use zkid_core::{FieldElement, Hash256, Identifier};
use zkid_identity::{profile_id, GistRegistry, IdentityContext};

use crate::config::CircuitConfig;
use crate::encoding::encode;
use crate::error::ZkpError;
use crate::gist::gist_proof;

/// Inputs of the AuthV2 circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthV2Inputs {
    #[serde(rename = "genesisID")]
    pub genesis_id: Identifier,
    pub profile_nonce: FieldElement,

    // -- Authentication claim --
    pub auth_claim: Claim,
    pub auth_claim_mtp: Vec<Hash256>,
    pub auth_claim_non_rev_mtp: Vec<Hash256>,
    pub auth_claim_non_rev_mtp_aux_hi: Hash256,
    pub auth_claim_non_rev_mtp_aux_hv: Hash256,
    pub auth_claim_non_rev_mtp_no_aux: FieldElement,

    // -- Challenge --
    pub challenge: FieldElement,
    pub challenge_signature_r8x: FieldElement,
    pub challenge_signature_r8y: FieldElement,
    pub challenge_signature_s: FieldElement,

    // -- Identity state --
    pub claims_tree_root: FieldElement,
    pub rev_tree_root: FieldElement,
    pub roots_tree_root: FieldElement,
    pub state: FieldElement,

    // -- Global identity state tree --
    pub gist_root: FieldElement,
    pub gist_mtp: Vec<Hash256>,
    pub gist_mtp_aux_hi: Hash256,
    pub gist_mtp_aux_hv: Hash256,
    pub gist_mtp_no_aux: FieldElement,
}

impl AuthV2Inputs {
    /// Assemble the inputs for `ctx` signing `challenge`.
    ///
    /// The identity's current state should already be published in
    /// `gist`; otherwise the GIST proof is a non-membership proof and the
    /// circuit rejects it.
    pub fn build(
        ctx: &IdentityContext,
        gist: &GistRegistry,
        challenge: FieldElement,
        profile_nonce: FieldElement,
        config: &CircuitConfig,
    ) -> Result<Self, ZkpError> {
        config.validate()?;
        let identity = ctx.identity();
        let auth_claim = identity.auth_claim();
        let depth = config.id_ownership_levels;

        let inclusion = identity.claim_inclusion_proof(auth_claim)?;
        if !inclusion.existence {
            return Err(ZkpError::ClaimNotIssued);
        }
        let nonce = auth_claim.revocation_nonce();
        let non_rev = identity.non_revocation_proof(nonce)?;
        if non_rev.existence {
            return Err(ZkpError::ClaimRevoked(nonce));
        }
        let non_rev = encode(&non_rev, depth)?;
        let signature = ctx.sign(challenge)?;
        let tree_state = identity.tree_state()?;
        let gist = gist_proof(gist, identity.id(), config.gist_levels)?;

        tracing::debug!(id = %identity.id(), challenge = %challenge, "auth inputs assembled");
        Ok(Self {
            genesis_id: *identity.id(),
            profile_nonce,
            auth_claim: *auth_claim,
            auth_claim_mtp: encode(&inclusion, depth)?.siblings,
            auth_claim_non_rev_mtp: non_rev.siblings,
            auth_claim_non_rev_mtp_aux_hi: non_rev.aux.key,
            auth_claim_non_rev_mtp_aux_hv: non_rev.aux.value,
            auth_claim_non_rev_mtp_no_aux: non_rev.aux.no_aux_field(),
            challenge,
            challenge_signature_r8x: signature.r8.x,
            challenge_signature_r8y: signature.r8.y,
            challenge_signature_s: signature.s,
            claims_tree_root: tree_state.claims_root,
            rev_tree_root: tree_state.revocation_root,
            roots_tree_root: tree_state.roots_root,
            state: tree_state.state,
            gist_root: gist.root,
            gist_mtp: gist.proof.siblings,
            gist_mtp_aux_hi: gist.proof.aux.key,
            gist_mtp_aux_hv: gist.proof.aux.value,
            gist_mtp_no_aux: gist.proof.aux.no_aux_field(),
        })
    }

    /// The `userID` output: the holder's profile for `profileNonce`.
    pub fn user_id(&self) -> Result<Identifier, ZkpError> {
        Ok(profile_id(&self.genesis_id, self.profile_nonce)?)
    }
}
