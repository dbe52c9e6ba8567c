//! # zkid-core — Foundational Types
//!
//! The leaf of the zkid crate graph. Defines the value types that every
//! circuit-input computation flows through:
//!
//! 1. **`FieldElement`.** An element of the BN254 scalar field. All hashes,
//!    tree keys, tree values and claim slots are field elements. Parsing
//!    never reduces silently: out-of-range input is an error.
//!
//! 2. **`Hash256`.** The canonical 32-byte little-endian node encoding used
//!    inside sparse Merkle proofs. `HASH_ZERO` is the empty-subtree sentinel.
//!
//! 3. **`Identifier`.** The 31-byte genesis identifier
//!    (`type ‖ genesis ‖ checksum`) derived from an identity state.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `zkid-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Wire types serialize field elements as decimal strings, the format
//!   circuit witness calculators consume.

pub mod error;
pub mod field;
pub mod hex;
pub mod identifier;

pub use error::{CryptoError, FieldError, IdentifierError, TreeError};
pub use field::{FieldElement, Hash256, HASH_ZERO};
pub use identifier::{Blockchain, DidMethod, IdType, Identifier, Network, GENESIS_LENGTH, ID_LENGTH};
