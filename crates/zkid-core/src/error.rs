//! # Error Types — Structured Error Hierarchy
//!
//! Errors shared by every zkid crate. All errors use `thiserror` for
//! derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Precondition violations carry the offending value and the bound
//!   it violated.
//! - Failures of the external primitives (Poseidon, EdDSA, tree) are
//!   surfaced as-is to the immediate caller. Nothing here is retried.

use thiserror::Error;

/// Error converting between integers, bytes and field elements.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The value is not smaller than the BN254 scalar field modulus.
    #[error("value is outside the BN254 scalar field: {0}")]
    OutOfField(String),

    /// The string is not a base-10 unsigned integer.
    #[error("invalid decimal field element: {0:?}")]
    InvalidDecimal(String),

    /// The string is not valid hex of the expected length.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// A byte slice has the wrong length.
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required byte length.
        expected: usize,
        /// Supplied byte length.
        actual: usize,
    },
}

/// Error decoding or deriving an identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// The checksum bytes do not match the type and genesis bytes.
    #[error("identifier checksum mismatch: expected {expected:02x?}, got {actual:02x?}")]
    ChecksumMismatch {
        /// Checksum recomputed from the type and genesis bytes.
        expected: [u8; 2],
        /// Checksum carried by the identifier.
        actual: [u8; 2],
    },

    /// The identifier integer does not fit in 31 bytes.
    #[error("identifier integer exceeds 31 bytes")]
    TooLarge,

    /// The blockchain/network combination has no registered type byte.
    #[error("unsupported network {network} for blockchain {blockchain}")]
    UnsupportedNetwork {
        /// Blockchain name.
        blockchain: String,
        /// Network name.
        network: String,
    },

    /// Field conversion failed.
    #[error(transparent)]
    Field(#[from] FieldError),
}

/// Error in the cryptographic primitives (Poseidon, Baby Jubjub EdDSA).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The hash primitive rejected its input.
    #[error("poseidon error: {0}")]
    Poseidon(String),

    /// The sponge frame size is outside the supported range.
    #[error("invalid sponge frame size {frame_size}: must be within {min}..={max}")]
    InvalidFrameSize {
        /// Requested frame size.
        frame_size: usize,
        /// Smallest supported frame.
        min: usize,
        /// Largest supported frame.
        max: usize,
    },

    /// An empty input was given to a hash that requires at least one element.
    #[error("hash input is empty")]
    EmptyInput,

    /// Key generation or parsing failed.
    #[error("key error: {0}")]
    KeyError(String),

    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Field conversion failed.
    #[error(transparent)]
    Field(#[from] FieldError),
}

/// Error in sparse Merkle tree operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// `add` was called for a key that already holds a leaf.
    #[error("entry index already exists in the tree")]
    EntryIndexAlreadyExists,

    /// Two keys share more path bits than the tree has levels.
    #[error("reached the maximum tree level ({max_levels})")]
    ReachedMaxLevel {
        /// Configured depth of the tree.
        max_levels: usize,
    },

    /// `update` was called for a key that holds no leaf.
    #[error("key not found in the tree")]
    KeyNotFound,

    /// Tree depth must be at least one level.
    #[error("invalid tree depth: {0}")]
    InvalidDepth(usize),

    /// Hashing a node failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
