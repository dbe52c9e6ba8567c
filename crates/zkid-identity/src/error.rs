//! Identity and registry errors.

use thiserror::Error;
use zkid_claims::ClaimError;
use zkid_core::{CryptoError, IdentifierError, TreeError};

/// Error mutating or proving against an identity's trees.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The initial claim of an identity must be an authentication claim.
    #[error("genesis claim is not an authentication claim (schema {0})")]
    NotAuthClaim(String),

    /// A tree rejected the mutation or the lookup.
    #[error("tree error: {0}")]
    Tree(#[from] TreeError),

    /// Building or hashing a claim failed.
    #[error("claim error: {0}")]
    Claim(#[from] ClaimError),

    /// Hashing or signing failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// An identifier could not be derived or decoded.
    #[error(transparent)]
    Identifier(#[from] IdentifierError),
}
