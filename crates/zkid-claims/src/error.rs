//! Claim construction and decoding errors.

use thiserror::Error;
use zkid_core::{CryptoError, FieldError, IdentifierError};

/// Error building, decoding or hashing a claim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClaimError {
    /// The subject was placed in both the index and the value part.
    #[error("subject identifier cannot be placed in both the index and the value part")]
    ConflictingSubjectPosition,

    /// A merklized root was placed in both the index and the value part.
    #[error("merklized root cannot be placed in both the index and the value part")]
    ConflictingMerklizedPosition,

    /// Data was supplied for a slot already holding the merklized root.
    #[error("{part} data slot A is occupied by the merklized root")]
    ConflictingDataSlot {
        /// `"index"` or `"value"`.
        part: &'static str,
    },

    /// The expiration date is before the Unix epoch.
    #[error("expiration date must not precede the unix epoch: {0}")]
    InvalidExpiration(i64),

    /// A schema hash string is malformed.
    #[error("invalid schema hash: {0}")]
    InvalidSchemaHash(String),

    /// The header of a decoded claim carries an unknown flag combination.
    #[error("invalid claim header: {0}")]
    InvalidHeader(String),

    /// An embedded subject identifier is malformed.
    #[error("invalid subject identifier: {0}")]
    Identifier(#[from] IdentifierError),

    /// A slot does not hold a valid field element.
    #[error("claim slot out of field: {0}")]
    DataOutOfField(#[from] FieldError),

    /// Hashing the index or value part failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
