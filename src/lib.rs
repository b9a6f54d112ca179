//! QuantumPortal provisioner.
//!
//! A single Lambda-style handler that provisions, lists, and (nominally)
//! deletes reverse-proxy API Gateway endpoints through the provider's
//! management API.

pub mod config;
pub mod gateway;
pub mod handler;
pub mod template;
