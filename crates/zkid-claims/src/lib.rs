//! # zkid-claims — Claim Model
//!
//! Fixed-layout claims: eight field-element slots split into an index part
//! (hashed into the claims-tree key `hi`) and a value part (hashed into the
//! stored value `hv`). Claims are built through [`ClaimBuilder`], which
//! validates conflicting options up front, and are immutable afterwards.
//! Issuance and revocation are operations on an identity's trees, not on
//! the claim.

pub mod auth;
pub mod claim;
pub mod error;
pub mod schema;

pub use auth::{auth_claim, auth_public_key};
pub use claim::{Claim, ClaimBuilder, MerklizedPosition, SubjectPosition};
pub use error::ClaimError;
pub use schema::{SchemaHash, AUTH_BJJ_SCHEMA_HASH};
