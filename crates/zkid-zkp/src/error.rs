//! Errors raised while assembling circuit inputs.

use thiserror::Error;
use zkid_claims::ClaimError;
use zkid_core::{CryptoError, TreeError};
use zkid_identity::IdentityError;

use crate::config::ConfigError;

/// Error building circuit inputs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ZkpError {
    /// A raw proof has more siblings than the circuit depth allows.
    #[error("proof has {siblings} siblings but the circuit depth is {depth}")]
    DepthExceeded {
        /// Siblings in the raw proof.
        siblings: usize,
        /// Circuit depth.
        depth: usize,
    },

    /// More query values than the circuit value array holds.
    #[error("{len} query values exceed the value array capacity of {capacity}")]
    TooManyValues {
        /// Supplied (or declared) value count.
        len: usize,
        /// Circuit capacity.
        capacity: usize,
    },

    /// The query slot index does not address one of the eight claim slots.
    #[error("slot index {0} is outside the claim (0..8)")]
    InvalidSlotIndex(u8),

    /// The claim is not in the issuer's claims tree.
    #[error("claim is not in the issuer's claims tree")]
    ClaimNotIssued,

    /// The revocation nonce is in the issuer's revocation tree.
    #[error("claim with revocation nonce {0} is revoked")]
    ClaimRevoked(u64),

    /// The claim expired before the proof timestamp.
    #[error("claim expired at {expiration}, proof timestamp is {timestamp}")]
    ClaimExpired {
        /// Claim expiration, Unix seconds.
        expiration: i64,
        /// Proof timestamp, Unix seconds.
        timestamp: u64,
    },

    /// The claim subject is not the holder's profile for the given nonce.
    #[error("claim subject {subject} does not match holder profile {profile}")]
    SubjectMismatch {
        /// Subject recorded in the claim.
        subject: String,
        /// Profile derived from the holder's genesis ID.
        profile: String,
    },

    /// The query targets a different schema than the claim carries.
    #[error("query schema {query} does not match claim schema {claim}")]
    SchemaMismatch {
        /// Schema hash named by the query.
        query: String,
        /// Schema hash in the claim header.
        claim: String,
    },

    /// The issuer's signing claim holds no Baby Jubjub key.
    #[error("issuer claim with schema {0} is not an authentication claim")]
    NotAuthClaim(String),

    /// The claim path proof was encoded for a different depth.
    #[error("claim path proof has {actual} siblings, circuit expects {expected}")]
    ClaimPathDepth {
        /// Configured claim path depth.
        expected: usize,
        /// Siblings in the supplied proof.
        actual: usize,
    },

    /// The merklizer could not produce a path proof.
    #[error("merklized path error: {0}")]
    Merklize(String),

    /// Circuit configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Hashing or signing failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// A tree lookup failed.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// Claim decoding or hashing failed.
    #[error(transparent)]
    Claim(#[from] ClaimError),

    /// An identity operation failed.
    #[error(transparent)]
    Identity(#[from] IdentityError),
}
