//! # Atomic Query, Inclusion Proof (V2)
//!
//! Query over a claim the issuer has added to its claims tree. The issuer
//! state the claim is proven against must be published by the verifier's
//! side; the builder uses the issuer's current state.

use serde::{Deserialize, Serialize};
use zkid_claims::Claim;
use zkid_core::{FieldElement, Identifier};
use zkid_identity::Identity;

use super::{bool_field, ClaimPathFields, IssuerClaimMtp, IssuerClaimNonRev, QueryRequest};
use crate::config::CircuitConfig;
use crate::error::ZkpError;

/// Inputs of the `credentialAtomicQueryMTPV2` circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtomicQueryMtpV2Inputs {
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
    #[serde(flatten)]
    pub mtp: IssuerClaimMtp,
    #[serde(flatten)]
    pub non_rev: IssuerClaimNonRev,
    pub is_revocation_checked: FieldElement,

    // -- Query --
    pub claim_schema: FieldElement,
    pub claim_path_not_exists: FieldElement,
    #[serde(flatten)]
    pub claim_path: ClaimPathFields,
    pub operator: FieldElement,
    pub slot_index: FieldElement,
    pub timestamp: FieldElement,
    pub value: Vec<FieldElement>,
}

impl AtomicQueryMtpV2Inputs {
    /// Assemble the inputs for `request` against a claim in `issuer`'s
    /// claims tree.
    pub fn build(request: &QueryRequest<'_>, issuer: &Identity, config: &CircuitConfig) -> Result<Self, ZkpError> {
        request.check(config)?;
        let claim = request.claim;
        let mtp = IssuerClaimMtp::build(issuer, claim, config.claim_levels)?;
        let non_rev = request.non_revocation(issuer, config.claim_levels)?;
        let query = request.query;

        tracing::debug!(
            issuer = %issuer.id(),
            holder = %request.user_genesis_id,
            operator = %query.operator,
            "mtp query inputs assembled"
        );
        Ok(Self {
            request_id: request.request_id,
            user_genesis_id: request.user_genesis_id,
            profile_nonce: request.profile_nonce,
            claim_subject_profile_nonce: request.claim_subject_profile_nonce,
            issuer_id: *issuer.id(),
            issuer_claim: *claim,
            mtp,
            non_rev,
            is_revocation_checked: bool_field(request.is_revocation_checked),
            claim_schema: query.schema.to_field(),
            claim_path_not_exists: request.claim_path.not_exists_field(),
            claim_path: ClaimPathFields::from(&request.claim_path),
            operator: query.operator.to_field(),
            slot_index: FieldElement::from_u64(u64::from(query.slot_index)),
            timestamp: FieldElement::from_u64(request.timestamp),
            value: query.circuit_values(config.value_array_size)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuits::fixtures::{config, world, LEVELS};

    #[test]
    fn inclusion_proof_matches_issuer_state() {
        let w = world();
        let issuer = w.issuer.identity();
        let inputs = AtomicQueryMtpV2Inputs::build(&w.request(), issuer, &config()).unwrap();

        assert_eq!(inputs.issuer_id, *issuer.id());
        assert_eq!(inputs.mtp.issuer_claim_iden_state, issuer.state().unwrap());
        assert_eq!(inputs.mtp.issuer_claim_mtp.len(), LEVELS);

        let raw = issuer.claim_inclusion_proof(&w.claim).unwrap();
        assert_eq!(&inputs.mtp.issuer_claim_mtp[..raw.siblings.len()], &raw.siblings[..]);
        let (hi, hv) = w.claim.hi_hv().unwrap();
        assert!(raw
            .verify(inputs.mtp.issuer_claim_claims_tree_root, hi, hv)
            .unwrap());
    }

    #[test]
    fn query_fields() {
        let w = world();
        let inputs = AtomicQueryMtpV2Inputs::build(&w.request(), w.issuer.identity(), &config()).unwrap();
        assert_eq!(inputs.claim_schema, w.claim.schema_hash().to_field());
        assert_eq!(inputs.slot_index, FieldElement::from_u64(2));
        assert_eq!(inputs.operator, FieldElement::from_u64(2));
        assert_eq!(inputs.value.len(), 8);
        assert_eq!(inputs.value[0], FieldElement::from_u64(20000101));
        assert!(inputs.value[1..].iter().all(|v| v.is_zero()));
        assert!(inputs.claim_path_not_exists.is_zero());
        assert_eq!(inputs.is_revocation_checked, FieldElement::one());
    }

    #[test]
    fn unissued_claim_rejected() {
        let w = world();
        let other = crate::circuits::fixtures::context(5);
        assert_eq!(
            AtomicQueryMtpV2Inputs::build(&w.request(), other.identity(), &config()).unwrap_err(),
            ZkpError::ClaimNotIssued
        );
    }

    #[test]
    fn record_is_flat() {
        let w = world();
        let inputs = AtomicQueryMtpV2Inputs::build(&w.request(), w.issuer.identity(), &config()).unwrap();
        let json = serde_json::to_value(&inputs).unwrap();
        for name in [
            "requestID",
            "userGenesisID",
            "claimSubjectProfileNonce",
            "issuerID",
            "issuerClaim",
            "issuerClaimMtp",
            "issuerClaimIdenState",
            "issuerClaimNonRevMtpNoAux",
            "issuerClaimNonRevState",
            "isRevocationChecked",
            "claimPathNotExists",
            "claimPathMtpNoAux",
            "slotIndex",
            "value",
        ] {
            assert!(json.get(name).is_some(), "missing {name}");
        }
        assert!(json.get("mtp").is_none());
        let back: AtomicQueryMtpV2Inputs = serde_json::from_value(json).unwrap();
        assert_eq!(back, inputs);
    }
}
