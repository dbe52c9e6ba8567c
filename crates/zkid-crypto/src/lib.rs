//! # zkid-crypto — Cryptographic Primitives
//!
//! The primitives every circuit input is built from:
//!
//! - **Poseidon** fixed-arity hashing and the frame-chained sponge for
//!   long arrays.
//! - **Baby Jubjub EdDSA-Poseidon** key derivation, signing and
//!   verification.
//! - **Sparse Merkle trees**: the [`SparseMerkleTree`] trait and the
//!   in-memory [`MemoryTree`] backend, with membership and non-membership
//!   proofs.
//!
//! ## Crate Policy
//!
//! - Depends only on `zkid-core` internally.
//! - Tests use the real hash and curve, never mocks.
//! - Private key bytes are zeroized on drop and never serialized or logged.

pub mod babyjub;
pub mod poseidon;
pub mod smt;

pub use babyjub::{Point, PrivateKey, PublicKey, Signature};
pub use smt::{MemoryTree, NodeAux, ProofResult, SparseMerkleTree};
