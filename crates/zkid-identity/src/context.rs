//! # Identity Context
//!
//! Bundles a private key with the identity it controls. Tests and callers
//! build one context per scenario and pass it explicitly; nothing is shared
//! between scenarios.

use zkid_claims::{auth_claim, Claim};
use zkid_core::{FieldElement, IdType};
use zkid_crypto::{PrivateKey, PublicKey, Signature};

use crate::error::IdentityError;
use crate::identity::Identity;
use crate::state::TreeLevels;

/// A private key and the identity whose authentication claim holds its
/// public key.
#[derive(Debug, Clone)]
pub struct IdentityContext {
    private_key: PrivateKey,
    public_key: PublicKey,
    identity: Identity,
}

impl IdentityContext {
    /// Create an identity for `private_key` with an authentication claim at
    /// revocation nonce `auth_nonce`.
    pub fn new(
        private_key: PrivateKey,
        id_type: IdType,
        levels: TreeLevels,
        auth_nonce: u64,
    ) -> Result<Self, IdentityError> {
        let public_key = private_key.public()?;
        let claim = auth_claim(&public_key, auth_nonce)?;
        let identity = Identity::new(claim, id_type, levels)?;
        Ok(Self {
            private_key,
            public_key,
            identity,
        })
    }

    /// Shorthand for a hex private key with nonce-0 authentication claim.
    pub fn from_hex(hex: &str, id_type: IdType, levels: TreeLevels) -> Result<Self, IdentityError> {
        Self::new(PrivateKey::from_hex(hex)?, id_type, levels, 0)
    }

    /// Public key held by the authentication claim.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Mutable access for issuing and revoking.
    pub fn identity_mut(&mut self) -> &mut Identity {
        &mut self.identity
    }

    /// Sign `message` with the authentication key.
    pub fn sign(&self, message: FieldElement) -> Result<Signature, IdentityError> {
        Ok(self.private_key.sign_poseidon(message)?)
    }

    /// Sign `Poseidon(hi, hv)` of a claim, as an issuer does for
    /// signature-based credentials.
    pub fn sign_claim(&self, claim: &Claim) -> Result<Signature, IdentityError> {
        self.sign(claim.hash()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkid_claims::auth_public_key;

    #[test]
    fn context_signature_verifies_against_auth_claim() {
        let ctx = IdentityContext::new(
            PrivateKey::from_bytes([5u8; 32]),
            IdType([0x01, 0x00]),
            TreeLevels::uniform(8),
            0,
        )
        .unwrap();
        let msg = FieldElement::from_u64(1234);
        let sig = ctx.sign(msg).unwrap();
        let pk = auth_public_key(ctx.identity().auth_claim()).unwrap().unwrap();
        assert_eq!(&pk, ctx.public_key());
        assert!(pk.verify_poseidon(msg, &sig).is_ok());
    }

    #[test]
    fn claim_signature_covers_claim_hash() {
        let ctx = IdentityContext::new(
            PrivateKey::from_bytes([6u8; 32]),
            IdType::default(),
            TreeLevels::uniform(8),
            0,
        )
        .unwrap();
        let claim = ctx.identity().auth_claim();
        let sig = ctx.sign_claim(claim).unwrap();
        assert!(ctx
            .public_key()
            .verify_poseidon(claim.hash().unwrap(), &sig)
            .is_ok());
    }

    #[test]
    fn contexts_are_independent() {
        let levels = TreeLevels::uniform(8);
        let mut a = IdentityContext::new(PrivateKey::from_bytes([5u8; 32]), IdType::default(), levels, 0).unwrap();
        let b = IdentityContext::new(PrivateKey::from_bytes([5u8; 32]), IdType::default(), levels, 0).unwrap();
        a.identity_mut().revoke(1).unwrap();
        assert_ne!(a.identity().state().unwrap(), b.identity().state().unwrap());
        assert_eq!(a.identity().id(), b.identity().id());
    }
}
