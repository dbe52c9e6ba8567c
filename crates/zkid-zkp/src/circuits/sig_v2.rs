//! # Atomic Query, Signature Proof (V2)
//!
//! Query over a claim the issuer signed instead of adding to its claims
//! tree. The circuit checks the signature against the public key in the
//! issuer's authentication claim, and that claim against the issuer's
//! state.

use serde::{Deserialize, Serialize};
use zkid_claims::Claim;
use zkid_core::{FieldElement, Identifier};
use zkid_crypto::Signature;
use zkid_identity::Identity;

use super::{bool_field, ClaimPathFields, IssuerClaimNonRev, IssuerSignature, QueryRequest};
use crate::config::CircuitConfig;
use crate::error::ZkpError;

/// Inputs of the `credentialAtomicQuerySigV2` circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtomicQuerySigV2Inputs {
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
    pub signature: IssuerSignature,
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

impl AtomicQuerySigV2Inputs {
    /// Assemble the inputs for `request` against a claim `issuer` signed
    /// with its authentication key.
    pub fn build(
        request: &QueryRequest<'_>,
        issuer: &Identity,
        signature: &Signature,
        config: &CircuitConfig,
    ) -> Result<Self, ZkpError> {
        request.check(config)?;
        let claim = request.claim;
        let signature = IssuerSignature::build(issuer, signature, claim, config.claim_levels)?;
        let non_rev = request.non_revocation(issuer, config.claim_levels)?;
        let query = request.query;

        tracing::debug!(
            issuer = %issuer.id(),
            holder = %request.user_genesis_id,
            operator = %query.operator,
            "sig query inputs assembled"
        );
        Ok(Self {
            request_id: request.request_id,
            user_genesis_id: request.user_genesis_id,
            profile_nonce: request.profile_nonce,
            claim_subject_profile_nonce: request.claim_subject_profile_nonce,
            issuer_id: *issuer.id(),
            issuer_claim: *claim,
            signature,
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
    use crate::circuits::fixtures::{config, context, world, LEVELS};
    use crate::query::{AtomicQuery, Operator};
    use zkid_claims::SchemaHash;

    #[test]
    fn signed_claim_need_not_be_in_tree() {
        let w = world();
        let issuer = context(1);
        let claim = Claim::builder(SchemaHash::from_bytes([4u8; 16]))
            .with_index_id(*w.holder.identity().id())
            .with_index_data(FieldElement::from_u64(5), FieldElement::zero())
            .with_revocation_nonce(9)
            .build()
            .unwrap();
        let sig = issuer.sign_claim(&claim).unwrap();
        let query = AtomicQuery::new(claim.schema_hash(), 2, Operator::Eq, vec![FieldElement::from_u64(5)]);
        let mut req = w.request();
        req.claim = &claim;
        req.query = &query;

        let inputs = AtomicQuerySigV2Inputs::build(&req, issuer.identity(), &sig, &config()).unwrap();
        assert_eq!(inputs.signature.issuer_claim_signature_s, sig.s);
        assert_eq!(inputs.signature.issuer_auth_claim, issuer.identity().auth_claim().slots());
        assert_eq!(inputs.signature.issuer_auth_claim_mtp.len(), LEVELS);
        assert_eq!(inputs.signature.issuer_auth_claim_non_rev_mtp_no_aux, FieldElement::one());
        assert_eq!(inputs.non_rev.issuer_claim_non_rev_state, issuer.identity().state().unwrap());
    }

    #[test]
    fn signature_over_other_claim_rejected() {
        let w = world();
        let sig = w.issuer.sign(FieldElement::from_u64(1)).unwrap();
        assert!(matches!(
            AtomicQuerySigV2Inputs::build(&w.request(), w.issuer.identity(), &sig, &config()),
            Err(ZkpError::Crypto(_))
        ));
    }

    #[test]
    fn revoked_issuer_key_rejected() {
        let mut w = world();
        let sig = w.issuer.sign_claim(&w.claim).unwrap();
        w.issuer.identity_mut().revoke(0).unwrap();
        assert_eq!(
            AtomicQuerySigV2Inputs::build(&w.request(), w.issuer.identity(), &sig, &config()).unwrap_err(),
            ZkpError::ClaimRevoked(0)
        );
    }

    #[test]
    fn record_field_names() {
        let w = world();
        let sig = w.issuer.sign_claim(&w.claim).unwrap();
        let inputs = AtomicQuerySigV2Inputs::build(&w.request(), w.issuer.identity(), &sig, &config()).unwrap();
        let json = serde_json::to_value(&inputs).unwrap();
        for name in [
            "issuerAuthClaim",
            "issuerAuthClaimMtp",
            "issuerAuthClaimsTreeRoot",
            "issuerAuthRevTreeRoot",
            "issuerAuthRootsTreeRoot",
            "issuerAuthClaimNonRevMtp",
            "issuerAuthClaimNonRevMtpAuxHi",
            "issuerClaimSignatureR8x",
            "issuerClaimSignatureR8y",
            "issuerClaimSignatureS",
            "issuerClaimNonRevMtp",
        ] {
            assert!(json.get(name).is_some(), "missing {name}");
        }
        assert!(json.get("issuerClaimMtp").is_none());
        let back: AtomicQuerySigV2Inputs = serde_json::from_value(json).unwrap();
        assert_eq!(back, inputs);
    }
}
