//! Skyview appview service library.
//!
//! The appview serves the read APIs of a federated social network by
//! composing independently-owned subsystems: the data-plane client, the
//! hydration pipeline, the view renderer, the identity resolver, and the
//! sync and moderation-delivery clients. This crate owns the glue between
//! them — the process-wide [`AppContext`] every request borrows, the
//! service-to-service JWT issuer this service authenticates outbound calls
//! with, and the accept-labelers header negotiation that decides which
//! moderation-label issuers a request trusts.

pub mod clients;
pub mod config;
pub mod context;
pub mod labeler_header;
pub mod service_jwt;

pub use context::{AppContext, ContextError, ContextOptions};
