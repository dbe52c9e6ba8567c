//! # Authentication Claims
//!
//! An identity proves control by signing with the Baby Jubjub key held in
//! its authentication claim: schema [`AUTH_BJJ_SCHEMA_HASH`], public key
//! coordinates in index data slots A and B, no subject.

use zkid_crypto::PublicKey;

use crate::claim::Claim;
use crate::error::ClaimError;
use crate::schema::AUTH_BJJ_SCHEMA_HASH;

/// Build the authentication claim for `public_key`.
pub fn auth_claim(public_key: &PublicKey, revocation_nonce: u64) -> Result<Claim, ClaimError> {
    Claim::builder(AUTH_BJJ_SCHEMA_HASH)
        .with_index_data(public_key.x, public_key.y)
        .with_revocation_nonce(revocation_nonce)
        .build()
}

/// The public key held by an authentication claim.
///
/// Returns `None` for claims of any other schema.
pub fn auth_public_key(claim: &Claim) -> Result<Option<PublicKey>, ClaimError> {
    if claim.schema_hash() != AUTH_BJJ_SCHEMA_HASH {
        return Ok(None);
    }
    let (x, y) = claim.index_data();
    Ok(Some(PublicKey::new(x, y)?))
}
