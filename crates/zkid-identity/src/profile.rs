//! Profile identifiers.
//!
//! A profile is an unlinkable alias of an identity:
//! `profile = Identifier::from_state(type, Poseidon(id, nonce))`, keeping the
//! identity's type prefix. Nonce `0` denotes the identity itself.

use zkid_core::{CryptoError, FieldElement, Identifier};
use zkid_crypto::poseidon;

/// Derive the profile of `id` for `nonce`.
pub fn profile_id(id: &Identifier, nonce: FieldElement) -> Result<Identifier, CryptoError> {
    if nonce.is_zero() {
        return Ok(*id);
    }
    let state = poseidon::hash2(id.to_field(), nonce)?;
    Ok(Identifier::from_state(id.id_type(), state))
}
