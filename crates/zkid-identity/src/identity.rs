//! # Identity
//!
//! An identity owns three sparse Merkle trees:
//!
//! - **Claims tree (ClT)**: `hi -> hv` for every issued claim.
//! - **Revocation tree (ReT)**: `revocation_nonce -> 0` for every revoked claim.
//! - **Roots tree (RoT)**: `ClT.root -> 0` for every published claims root.
//!
//! The identity is created with its authentication claim already in ClT.
//! The genesis identifier is fixed at that point.
//!
//! ## Ordering
//!
//! Mutations take `&mut self`, so within one identity the state can only
//! be read after every pending issuance or revocation has completed.

use zkid_claims::{Claim, AUTH_BJJ_SCHEMA_HASH};
use zkid_core::{FieldElement, IdType, Identifier};
use zkid_crypto::{MemoryTree, ProofResult, SparseMerkleTree};

use crate::error::IdentityError;
use crate::profile::profile_id;
use crate::state::{genesis_id, TreeLevels, TreeState};

/// An identity and its three trees.
#[derive(Debug, Clone)]
pub struct Identity {
    id: Identifier,
    auth_claim: Claim,
    claims: MemoryTree,
    revocations: MemoryTree,
    roots: MemoryTree,
}

impl Identity {
    /// Create an identity whose claims tree holds `auth_claim`.
    pub fn new(auth_claim: Claim, id_type: IdType, levels: TreeLevels) -> Result<Self, IdentityError> {
        if auth_claim.schema_hash() != AUTH_BJJ_SCHEMA_HASH {
            return Err(IdentityError::NotAuthClaim(auth_claim.schema_hash().to_hex()));
        }
        let mut claims = MemoryTree::new(levels.claims)?;
        let (hi, hv) = auth_claim.hi_hv()?;
        claims.add(hi, hv)?;
        let id = genesis_id(id_type, &claims)?;
        tracing::debug!(id = %id, "identity created");
        Ok(Self {
            id,
            auth_claim,
            claims,
            revocations: MemoryTree::new(levels.revocation)?,
            roots: MemoryTree::new(levels.roots)?,
        })
    }

    /// The genesis identifier.
    pub fn id(&self) -> &Identifier {
        &self.id
    }

    /// The authentication claim created at genesis.
    pub fn auth_claim(&self) -> &Claim {
        &self.auth_claim
    }

    /// Claims tree (ClT).
    pub fn claims_tree(&self) -> &MemoryTree {
        &self.claims
    }

    /// Revocation tree (ReT).
    pub fn revocation_tree(&self) -> &MemoryTree {
        &self.revocations
    }

    /// Roots tree (RoT).
    pub fn roots_tree(&self) -> &MemoryTree {
        &self.roots
    }

    /// Current state and roots.
    pub fn tree_state(&self) -> Result<TreeState, IdentityError> {
        Ok(TreeState::new(
            self.claims.root(),
            self.revocations.root(),
            self.roots.root(),
        )?)
    }

    /// Current state commitment.
    pub fn state(&self) -> Result<FieldElement, IdentityError> {
        Ok(self.tree_state()?.state)
    }

    /// Insert `(hi, hv)` of `claim` into the claims tree.
    pub fn issue_claim(&mut self, claim: &Claim) -> Result<(), IdentityError> {
        let (hi, hv) = claim.hi_hv()?;
        self.claims.add(hi, hv)?;
        tracing::debug!(
            id = %self.id,
            nonce = claim.revocation_nonce(),
            "claim issued"
        );
        Ok(())
    }

    /// Insert `(nonce, 0)` into the revocation tree.
    pub fn revoke(&mut self, nonce: u64) -> Result<(), IdentityError> {
        self.revocations
            .add(FieldElement::from_u64(nonce), FieldElement::zero())?;
        tracing::debug!(id = %self.id, nonce, "claim revoked");
        Ok(())
    }

    /// Whether `nonce` is in the revocation tree.
    pub fn is_revoked(&self, nonce: u64) -> Result<bool, IdentityError> {
        Ok(self
            .revocations
            .generate_proof(FieldElement::from_u64(nonce))?
            .existence)
    }

    /// Record the current claims root in the roots tree.
    pub fn snapshot_claims_root(&mut self) -> Result<FieldElement, IdentityError> {
        let root = self.claims.root();
        self.roots.add(root, FieldElement::zero())?;
        tracing::debug!(id = %self.id, root = %root, "claims root snapshot");
        Ok(root)
    }

    /// Proof that `claim` is (or is not) in the claims tree.
    pub fn claim_inclusion_proof(&self, claim: &Claim) -> Result<ProofResult, IdentityError> {
        let (hi, _) = claim.hi_hv()?;
        Ok(self.claims.generate_proof(hi)?)
    }

    /// Proof that `nonce` is (or is not) in the revocation tree.
    pub fn non_revocation_proof(&self, nonce: u64) -> Result<ProofResult, IdentityError> {
        Ok(self.revocations.generate_proof(FieldElement::from_u64(nonce))?)
    }

    /// Proof that `claims_root` is (or is not) in the roots tree.
    pub fn root_inclusion_proof(&self, claims_root: FieldElement) -> Result<ProofResult, IdentityError> {
        Ok(self.roots.generate_proof(claims_root)?)
    }

    /// The profile identifier for `nonce`.
    pub fn profile_id(&self, nonce: FieldElement) -> Result<Identifier, IdentityError> {
        Ok(profile_id(&self.id, nonce)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{id_from_state, identity_state};
    use zkid_claims::{auth_claim, SchemaHash};
    use zkid_crypto::PrivateKey;

    fn identity() -> Identity {
        let pk = PrivateKey::from_bytes([1u8; 32]).public().unwrap();
        let claim = auth_claim(&pk, 0).unwrap();
        Identity::new(claim, IdType([0x01, 0x00]), TreeLevels::uniform(16)).unwrap()
    }

    fn claim(nonce: u64) -> Claim {
        Claim::builder(SchemaHash::from_bytes([9u8; 16]))
            .with_index_data(FieldElement::from_u64(nonce), FieldElement::zero())
            .with_revocation_nonce(nonce)
            .build()
            .unwrap()
    }

    #[test]
    fn genesis_id_is_derived_from_initial_state() {
        let identity = identity();
        let state = identity.state().unwrap();
        assert_eq!(*identity.id(), id_from_state(IdType([0x01, 0x00]), state));
        assert!(identity.id().is_from_state(state));
    }

    #[test]
    fn non_auth_genesis_claim_rejected() {
        let err = Identity::new(claim(1), IdType::default(), TreeLevels::uniform(16)).unwrap_err();
        assert!(matches!(err, IdentityError::NotAuthClaim(_)));
    }

    #[test]
    fn issuing_changes_state_but_not_id() {
        let mut identity = identity();
        let before = identity.state().unwrap();
        let id = *identity.id();
        identity.issue_claim(&claim(5)).unwrap();
        assert_ne!(identity.state().unwrap(), before);
        assert_eq!(*identity.id(), id);
        assert!(!identity.id().is_from_state(identity.state().unwrap()));
    }

    #[test]
    fn issuing_twice_rejected() {
        let mut identity = identity();
        identity.issue_claim(&claim(5)).unwrap();
        assert!(matches!(
            identity.issue_claim(&claim(5)),
            Err(IdentityError::Tree(_))
        ));
    }

    #[test]
    fn revocation_flow() {
        let mut identity = identity();
        assert!(!identity.is_revoked(5).unwrap());
        identity.revoke(5).unwrap();
        assert!(identity.is_revoked(5).unwrap());
        let ts = identity.tree_state().unwrap();
        assert!(!ts.revocation_root.is_zero());
        assert_eq!(
            ts.state,
            identity_state(ts.claims_root, ts.revocation_root, ts.roots_root).unwrap()
        );
    }

    #[test]
    fn claim_inclusion() {
        let mut identity = identity();
        let c = claim(7);
        assert!(!identity.claim_inclusion_proof(&c).unwrap().existence);
        identity.issue_claim(&c).unwrap();
        let proof = identity.claim_inclusion_proof(&c).unwrap();
        assert!(proof.existence);
        let (hi, hv) = c.hi_hv().unwrap();
        assert!(proof.verify(identity.claims_tree().root(), hi, hv).unwrap());
    }

    #[test]
    fn roots_snapshot() {
        let mut identity = identity();
        let root = identity.snapshot_claims_root().unwrap();
        assert!(identity.root_inclusion_proof(root).unwrap().existence);
        assert!(!identity.roots_tree().root().is_zero());
    }
}
