//! # zkid-zkp — Circuit Inputs
//!
//! Everything between an identity's trees and a prover: the sparse Merkle
//! proof encoding, atomic query commitments, link IDs and nullifiers, the
//! GIST proof adapter, merklized document paths, and one input record per
//! supported circuit.
//!
//! ## Crate Policy
//!
//! - Every array handed to a circuit has the length fixed by
//!   [`CircuitConfig`]. Oversized inputs are errors, never truncated.
//! - All circuit values serialize as decimal strings.
//! - Nothing here keeps state. Records are rebuilt from live identities.

pub mod circuits;
pub mod config;
pub mod encoding;
pub mod error;
pub mod gist;
pub mod merklize;
pub mod privacy;
pub mod query;

pub use circuits::{
    AtomicQueryMtpV2Inputs, AtomicQuerySigV2Inputs, AtomicQueryV3Inputs, AtomicQueryV3Outputs, AuthV2Inputs,
    IssuerProof, ProofType, QueryRequest, V3Params,
};
pub use config::{CircuitConfig, ConfigError};
pub use encoding::{encode, AuxNode, EncodedProof};
pub use error::ZkpError;
pub use gist::{gist_proof, gist_proof_at_registry_depth, GistProof};
pub use merklize::{ClaimPathInputs, Merklizer, PathProof};
pub use privacy::{link_id, nullifier, NullifierInputs};
pub use query::{prepare_circuit_values, AtomicQuery, Operator};
