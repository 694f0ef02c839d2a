//! Domain types shared across the soclink workspace.
//!
//! This crate is I/O-free: error taxonomy, credential variants, role names,
//! and the provisioning step model. Everything that talks to a database or
//! the network lives in the sibling crates.

pub mod credentials;
pub mod error;
pub mod roles;
pub mod step;
pub mod types;
