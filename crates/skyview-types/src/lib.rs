//! Shared types and error definitions for the Skyview appview.
//!
//! This crate provides the foundational types used across the workspace:
//! syntactic DID (decentralized identifier) validation and the trusted-labeler
//! preference types produced by accept-labelers header negotiation.
//!
//! No crate in the workspace depends on anything *except* `skyview-types` for
//! cross-cutting type definitions. This keeps the dependency graph clean and
//! prevents circular dependencies.

mod did;
mod labelers;

pub use did::{Did, DidError};
pub use labelers::{LabelerPreference, TrustedLabelers};
