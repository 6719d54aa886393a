//! Remote API surface for regulations.gov
//!
//! Typed client, endpoint builders, and response shapes.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::RegulationsClient;
