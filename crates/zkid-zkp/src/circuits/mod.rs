//! # Circuit Input Records
//!
//! One record per circuit, serialized with the exact field names the
//! compiled circuits read. Every numeric value is a decimal string; every
//! array has the length fixed by [`CircuitConfig`].
//!
//! ## Circuits
//!
//! - [`AuthV2Inputs`]: the holder proves control of an identity and signs
//!   a challenge.
//! - [`AtomicQueryMtpV2Inputs`]: a query over a claim proven by inclusion
//!   in the issuer's claims tree.
//! - [`AtomicQuerySigV2Inputs`]: a query over a claim proven by the
//!   issuer's signature.
//! - [`AtomicQueryV3Inputs`]: either proof type, plus link ID and
//!   nullifier support.
//!
//! The records are assembled from live identities. Builders check what the
//! circuit would otherwise reject late: unknown or revoked claims, expired
//! claims, a subject that is not the holder, proofs of the wrong depth.

pub mod auth_v2;
pub mod mtp_v2;
pub mod sig_v2;
pub mod v3;

pub use auth_v2::AuthV2Inputs;
pub use mtp_v2::AtomicQueryMtpV2Inputs;
pub use sig_v2::AtomicQuerySigV2Inputs;
pub use v3::{AtomicQueryV3Inputs, AtomicQueryV3Outputs, IssuerProof, V3Params};

use serde::{Deserialize, Serialize};
use zkid_claims::{auth_public_key, Claim};
use zkid_core::{FieldElement, Hash256, Identifier};
use zkid_crypto::{PublicKey, Signature};
use zkid_identity::{profile_id, Identity};

use crate::config::CircuitConfig;
use crate::encoding::{encode, EncodedProof};
use crate::error::ZkpError;
use crate::merklize::ClaimPathInputs;
use crate::query::{AtomicQuery, CLAIM_SLOTS};

/// How the issuer vouches for the claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProofType {
    /// Issuer signature over the claim hash.
    Sig,
    /// Inclusion in the issuer's claims tree.
    Mtp,
}

impl ProofType {
    pub fn tag(self) -> u64 {
        match self {
            Self::Sig => 1,
            Self::Mtp => 2,
        }
    }

    pub fn to_field(self) -> FieldElement {
        FieldElement::from_u64(self.tag())
    }
}

/// What the holder asks to prove, shared by every query circuit.
#[derive(Debug, Clone)]
pub struct QueryRequest<'a> {
    pub request_id: FieldElement,
    pub user_genesis_id: Identifier,
    /// Nonce of the profile the proof is presented under.
    pub profile_nonce: FieldElement,
    /// Nonce of the profile the claim was issued to.
    pub claim_subject_profile_nonce: FieldElement,
    pub claim: &'a Claim,
    pub query: &'a AtomicQuery,
    pub claim_path: ClaimPathInputs,
    /// Unix seconds.
    pub timestamp: u64,
    pub is_revocation_checked: bool,
}

impl QueryRequest<'_> {
    /// Reject requests the circuit could never satisfy.
    pub(crate) fn check(&self, config: &CircuitConfig) -> Result<(), ZkpError> {
        config.validate()?;
        if self.query.slot_index >= CLAIM_SLOTS {
            return Err(ZkpError::InvalidSlotIndex(self.query.slot_index));
        }
        if self.query.value_array_size > config.value_array_size {
            return Err(ZkpError::TooManyValues {
                len: self.query.value_array_size,
                capacity: config.value_array_size,
            });
        }
        if self.claim_path.mtp.siblings.len() != config.claim_path_levels {
            return Err(ZkpError::ClaimPathDepth {
                expected: config.claim_path_levels,
                actual: self.claim_path.mtp.siblings.len(),
            });
        }
        if let Some(expiration) = self.claim.expiration() {
            // past i64::MAX every expiration is in the past
            let now = i64::try_from(self.timestamp).unwrap_or(i64::MAX);
            if expiration.timestamp() < now {
                return Err(ZkpError::ClaimExpired {
                    expiration: expiration.timestamp(),
                    timestamp: self.timestamp,
                });
            }
        }
        if let Some(subject) = self.claim.subject_id()? {
            let profile = profile_id(&self.user_genesis_id, self.claim_subject_profile_nonce)?;
            if subject != profile {
                return Err(ZkpError::SubjectMismatch {
                    subject: subject.to_string(),
                    profile: profile.to_string(),
                });
            }
        }
        if self.query.schema != self.claim.schema_hash() {
            return Err(ZkpError::SchemaMismatch {
                query: self.query.schema.to_hex(),
                claim: self.claim.schema_hash().to_hex(),
            });
        }
        Ok(())
    }

    /// The claim's revocation status in `issuer`, as circuit inputs.
    pub(crate) fn non_revocation(&self, issuer: &Identity, depth: usize) -> Result<IssuerClaimNonRev, ZkpError> {
        let nonce = self.claim.revocation_nonce();
        let raw = issuer.non_revocation_proof(nonce)?;
        if raw.existence && self.is_revocation_checked {
            return Err(ZkpError::ClaimRevoked(nonce));
        }
        let state = issuer.tree_state()?;
        let proof = encode(&raw, depth)?;
        Ok(IssuerClaimNonRev {
            issuer_claim_non_rev_claims_tree_root: state.claims_root,
            issuer_claim_non_rev_rev_tree_root: state.revocation_root,
            issuer_claim_non_rev_roots_tree_root: state.roots_root,
            issuer_claim_non_rev_state: state.state,
            issuer_claim_non_rev_mtp: proof.siblings,
            issuer_claim_non_rev_mtp_aux_hi: proof.aux.key,
            issuer_claim_non_rev_mtp_aux_hv: proof.aux.value,
            issuer_claim_non_rev_mtp_no_aux: proof.aux.no_aux_field(),
        })
    }
}

/// The Baby Jubjub key an authentication claim carries.
pub(crate) fn signing_key(auth: &Claim) -> Result<PublicKey, ZkpError> {
    auth_public_key(auth)?.ok_or_else(|| ZkpError::NotAuthClaim(auth.schema_hash().to_hex()))
}

pub(crate) fn bool_field(b: bool) -> FieldElement {
    FieldElement::from_u64(u64::from(b))
}

// ---------------------------------------------------------------------------
// Shared input groups
// ---------------------------------------------------------------------------

/// Inclusion of the claim in the issuer's claims tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuerClaimMtp {
    pub issuer_claim_mtp: Vec<Hash256>,
    pub issuer_claim_claims_tree_root: FieldElement,
    pub issuer_claim_rev_tree_root: FieldElement,
    pub issuer_claim_roots_tree_root: FieldElement,
    pub issuer_claim_iden_state: FieldElement,
}

impl IssuerClaimMtp {
    pub(crate) fn build(issuer: &Identity, claim: &Claim, depth: usize) -> Result<Self, ZkpError> {
        let raw = issuer.claim_inclusion_proof(claim)?;
        if !raw.existence {
            return Err(ZkpError::ClaimNotIssued);
        }
        let state = issuer.tree_state()?;
        Ok(Self {
            issuer_claim_mtp: encode(&raw, depth)?.siblings,
            issuer_claim_claims_tree_root: state.claims_root,
            issuer_claim_rev_tree_root: state.revocation_root,
            issuer_claim_roots_tree_root: state.roots_root,
            issuer_claim_iden_state: state.state,
        })
    }

    /// Placeholder when the claim is proven by signature.
    pub(crate) fn zero(depth: usize) -> Self {
        let zero = FieldElement::zero();
        Self {
            issuer_claim_mtp: EncodedProof::empty(depth).siblings,
            issuer_claim_claims_tree_root: zero,
            issuer_claim_rev_tree_root: zero,
            issuer_claim_roots_tree_root: zero,
            issuer_claim_iden_state: zero,
        }
    }
}

/// The claim's revocation nonce against the issuer's latest state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuerClaimNonRev {
    pub issuer_claim_non_rev_claims_tree_root: FieldElement,
    pub issuer_claim_non_rev_rev_tree_root: FieldElement,
    pub issuer_claim_non_rev_roots_tree_root: FieldElement,
    pub issuer_claim_non_rev_state: FieldElement,
    pub issuer_claim_non_rev_mtp: Vec<Hash256>,
    pub issuer_claim_non_rev_mtp_aux_hi: Hash256,
    pub issuer_claim_non_rev_mtp_aux_hv: Hash256,
    pub issuer_claim_non_rev_mtp_no_aux: FieldElement,
}

/// The issuer's signature over the claim and the proofs binding the
/// signing key to the issuer's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuerSignature {
    pub issuer_auth_claim: [FieldElement; 8],
    pub issuer_auth_claim_mtp: Vec<Hash256>,
    pub issuer_auth_claims_tree_root: FieldElement,
    pub issuer_auth_rev_tree_root: FieldElement,
    pub issuer_auth_roots_tree_root: FieldElement,
    pub issuer_auth_claim_non_rev_mtp: Vec<Hash256>,
    pub issuer_auth_claim_non_rev_mtp_aux_hi: Hash256,
    pub issuer_auth_claim_non_rev_mtp_aux_hv: Hash256,
    pub issuer_auth_claim_non_rev_mtp_no_aux: FieldElement,
    pub issuer_claim_signature_r8x: FieldElement,
    pub issuer_claim_signature_r8y: FieldElement,
    pub issuer_claim_signature_s: FieldElement,
}

impl IssuerSignature {
    /// Check `signature` against the issuer's authentication key and
    /// collect the key's proofs.
    pub(crate) fn build(
        issuer: &Identity,
        signature: &Signature,
        claim: &Claim,
        depth: usize,
    ) -> Result<Self, ZkpError> {
        let auth = issuer.auth_claim();
        signing_key(auth)?.verify_poseidon(claim.hash()?, signature)?;
        let inclusion = issuer.claim_inclusion_proof(auth)?;
        if !inclusion.existence {
            return Err(ZkpError::ClaimNotIssued);
        }
        let nonce = auth.revocation_nonce();
        let non_rev = issuer.non_revocation_proof(nonce)?;
        if non_rev.existence {
            return Err(ZkpError::ClaimRevoked(nonce));
        }
        let state = issuer.tree_state()?;
        let non_rev = encode(&non_rev, depth)?;
        Ok(Self {
            issuer_auth_claim: auth.slots(),
            issuer_auth_claim_mtp: encode(&inclusion, depth)?.siblings,
            issuer_auth_claims_tree_root: state.claims_root,
            issuer_auth_rev_tree_root: state.revocation_root,
            issuer_auth_roots_tree_root: state.roots_root,
            issuer_auth_claim_non_rev_mtp: non_rev.siblings,
            issuer_auth_claim_non_rev_mtp_aux_hi: non_rev.aux.key,
            issuer_auth_claim_non_rev_mtp_aux_hv: non_rev.aux.value,
            issuer_auth_claim_non_rev_mtp_no_aux: non_rev.aux.no_aux_field(),
            issuer_claim_signature_r8x: signature.r8.x,
            issuer_claim_signature_r8y: signature.r8.y,
            issuer_claim_signature_s: signature.s,
        })
    }

    /// Placeholder when the claim is proven by inclusion.
    pub(crate) fn zero(depth: usize) -> Self {
        let zero = FieldElement::zero();
        let empty = EncodedProof::empty(depth);
        Self {
            issuer_auth_claim: [zero; 8],
            issuer_auth_claim_mtp: empty.siblings.clone(),
            issuer_auth_claims_tree_root: zero,
            issuer_auth_rev_tree_root: zero,
            issuer_auth_roots_tree_root: zero,
            issuer_auth_claim_non_rev_mtp: empty.siblings,
            issuer_auth_claim_non_rev_mtp_aux_hi: empty.aux.key,
            issuer_auth_claim_non_rev_mtp_aux_hv: empty.aux.value,
            issuer_auth_claim_non_rev_mtp_no_aux: zero,
            issuer_claim_signature_r8x: zero,
            issuer_claim_signature_r8y: zero,
            issuer_claim_signature_s: zero,
        }
    }
}

/// The `claimPath*` inputs in record form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimPathFields {
    pub claim_path_mtp: Vec<Hash256>,
    pub claim_path_mtp_no_aux: FieldElement,
    pub claim_path_mtp_aux_hi: Hash256,
    pub claim_path_mtp_aux_hv: Hash256,
    pub claim_path_key: FieldElement,
    pub claim_path_value: FieldElement,
}

impl From<&ClaimPathInputs> for ClaimPathFields {
    fn from(inputs: &ClaimPathInputs) -> Self {
        Self {
            claim_path_mtp: inputs.mtp.siblings.clone(),
            claim_path_mtp_no_aux: inputs.mtp.aux.no_aux_field(),
            claim_path_mtp_aux_hi: inputs.mtp.aux.key,
            claim_path_mtp_aux_hv: inputs.mtp.aux.value,
            claim_path_key: inputs.key,
            claim_path_value: inputs.value,
        }
    }
}
