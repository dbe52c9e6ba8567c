//! # Atomic Query V3
//!
//! One circuit for both proof types. The unused proof type's inputs are
//! zero-filled and `proofType` selects which set the circuit checks.
//!
//! V3 adds three public outputs:
//!
//! - `linkID`: `H2(H2(hi, hv), linkNonce)`, or 0 when `linkNonce` is 0.
//! - `nullifier`: `H5(userGenesisID, claimSubjectProfileNonce, claimSchema,
//!   verifierID, nullifierSessionID)`, or 0 when `nullifierSessionID` is 0.
//! - `circuitQueryHash`: the query commitment, with `merklized` taken from
//!   the claim's flags.
//!
//! [`AtomicQueryV3Inputs::outputs`] recomputes them from the record alone.

use serde::{Deserialize, Serialize};
use zkid_claims::{Claim, MerklizedPosition};
use zkid_core::{FieldElement, Identifier};
use zkid_crypto::Signature;
use zkid_identity::{profile_id, Identity};

use super::{
    bool_field, ClaimPathFields, IssuerClaimMtp, IssuerClaimNonRev, IssuerSignature, ProofType, QueryRequest,
};
use crate::config::CircuitConfig;
use crate::error::ZkpError;
use crate::privacy::{link_id, nullifier, NullifierInputs};
use crate::query::{query_commitment, QueryFields};

/// How the issuer backs the claim in a V3 proof.
#[derive(Debug, Clone, Copy)]
pub enum IssuerProof<'a> {
    /// The claim is in the issuer's claims tree.
    Mtp(&'a Identity),
    /// The issuer signed the claim with its authentication key.
    Sig {
        issuer: &'a Identity,
        signature: &'a Signature,
    },
}

impl IssuerProof<'_> {
    pub fn issuer(&self) -> &Identity {
        match self {
            Self::Mtp(issuer) | Self::Sig { issuer, .. } => issuer,
        }
    }

    pub fn proof_type(&self) -> ProofType {
        match self {
            Self::Mtp(_) => ProofType::Mtp,
            Self::Sig { .. } => ProofType::Sig,
        }
    }
}

/// Linking and nullifier parameters. All zero disables both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct V3Params {
    pub link_nonce: FieldElement,
    pub verifier_id: FieldElement,
    pub nullifier_session_id: FieldElement,
}

/// Inputs of the `credentialAtomicQueryV3` circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtomicQueryV3Inputs {
    #[serde(rename = "requestID")]
    pub request_id: FieldElement,

    // -- Holder --
    #[serde(rename = "userGenesisID")]
    pub user_genesis_id: Identifier,
    pub profile_nonce: FieldElement,
    pub claim_subject_profile_nonce: FieldElement,

    // -- Issuer and claim --
    #[serde(rename = "issuerID")]
    pub issuer_id: Identifier,
    pub issuer_claim: Claim,
    pub proof_type: FieldElement,
    #[serde(flatten)]
    pub mtp: IssuerClaimMtp,
    #[serde(flatten)]
    pub signature: IssuerSignature,
    #[serde(flatten)]
    pub non_rev: IssuerClaimNonRev,
    pub is_revocation_checked: FieldElement,

    // -- Query --
    pub claim_schema: FieldElement,
    #[serde(flatten)]
    pub claim_path: ClaimPathFields,
    pub operator: FieldElement,
    pub slot_index: FieldElement,
    pub timestamp: FieldElement,
    pub value: Vec<FieldElement>,
    pub value_array_size: FieldElement,

    // -- Linking and nullifiers --
    pub link_nonce: FieldElement,
    #[serde(rename = "verifierID")]
    pub verifier_id: FieldElement,
    #[serde(rename = "nullifierSessionID")]
    pub nullifier_session_id: FieldElement,
}

/// Public outputs of a V3 proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtomicQueryV3Outputs {
    #[serde(rename = "userID")]
    pub user_id: Identifier,
    #[serde(rename = "linkID")]
    pub link_id: FieldElement,
    pub nullifier: FieldElement,
    pub circuit_query_hash: FieldElement,
}

impl AtomicQueryV3Inputs {
    /// Assemble the inputs for `request`, backed by `issuer`.
    pub fn build(
        request: &QueryRequest<'_>,
        issuer: IssuerProof<'_>,
        params: &V3Params,
        config: &CircuitConfig,
    ) -> Result<Self, ZkpError> {
        request.check(config)?;
        let claim = request.claim;
        let depth = config.claim_levels;
        let (mtp, signature) = match issuer {
            IssuerProof::Mtp(identity) => (IssuerClaimMtp::build(identity, claim, depth)?, IssuerSignature::zero(depth)),
            IssuerProof::Sig { issuer, signature } => (
                IssuerClaimMtp::zero(depth),
                IssuerSignature::build(issuer, signature, claim, depth)?,
            ),
        };
        let identity = issuer.issuer();
        let non_rev = request.non_revocation(identity, depth)?;
        let query = request.query;

        tracing::debug!(
            issuer = %identity.id(),
            holder = %request.user_genesis_id,
            proof_type = ?issuer.proof_type(),
            linked = !params.link_nonce.is_zero(),
            "v3 query inputs assembled"
        );
        Ok(Self {
            request_id: request.request_id,
            user_genesis_id: request.user_genesis_id,
            profile_nonce: request.profile_nonce,
            claim_subject_profile_nonce: request.claim_subject_profile_nonce,
            issuer_id: *identity.id(),
            issuer_claim: *claim,
            proof_type: issuer.proof_type().to_field(),
            mtp,
            signature,
            non_rev,
            is_revocation_checked: bool_field(request.is_revocation_checked),
            claim_schema: query.schema.to_field(),
            claim_path: ClaimPathFields::from(&request.claim_path),
            operator: query.operator.to_field(),
            slot_index: FieldElement::from_u64(u64::from(query.slot_index)),
            timestamp: FieldElement::from_u64(request.timestamp),
            value: query.circuit_values(config.value_array_size)?,
            value_array_size: FieldElement::from_u64(query.value_array_size as u64),
            link_nonce: params.link_nonce,
            verifier_id: params.verifier_id,
            nullifier_session_id: params.nullifier_session_id,
        })
    }

    /// The public outputs the circuit produces for this record.
    pub fn outputs(&self) -> Result<AtomicQueryV3Outputs, ZkpError> {
        let claim = &self.issuer_claim;
        let link = link_id(self.link_nonce, claim)?.unwrap_or_default();
        let nullifier = if self.nullifier_session_id.is_zero() {
            FieldElement::zero()
        } else {
            nullifier(&NullifierInputs {
                user_id: self.user_genesis_id.to_field(),
                profile_nonce: self.claim_subject_profile_nonce,
                schema_hash: self.claim_schema,
                verifier_id: self.verifier_id,
                session_id: self.nullifier_session_id,
            })?
        };
        let merklized = claim.merklized_position()? != MerklizedPosition::None;
        let circuit_query_hash = query_commitment(&QueryFields {
            schema: self.claim_schema,
            slot_index: self.slot_index,
            operator: self.operator,
            claim_path_key: self.claim_path.claim_path_key,
            merklized: bool_field(merklized),
            values: &self.value,
            value_array_size: self.value_array_size,
        })?;
        Ok(AtomicQueryV3Outputs {
            user_id: profile_id(&self.user_genesis_id, self.profile_nonce)?,
            link_id: link,
            nullifier,
            circuit_query_hash,
        })
    }
}
