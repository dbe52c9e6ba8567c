//! # zkid-identity — Identity State
//!
//! Identities built from three sparse Merkle trees, the state commitment
//! over their roots, genesis and profile identifiers, and the global
//! identity state registry (GIST).
//!
//! ## Crate Policy
//!
//! - Mutations go through `&mut` access, so an identity's state is always
//!   read after its pending tree updates.
//! - Independent identities share nothing and may be used from different
//!   threads.

pub mod context;
pub mod error;
pub mod gist;
pub mod identity;
pub mod profile;
pub mod state;

pub use context::IdentityContext;
pub use error::IdentityError;
pub use gist::{gist_key, GistRegistry, DEFAULT_GIST_LEVELS};
pub use identity::Identity;
pub use profile::profile_id;
pub use state::{genesis_id, id_from_state, identity_state, TreeLevels, TreeState, DEFAULT_TREE_LEVELS};
