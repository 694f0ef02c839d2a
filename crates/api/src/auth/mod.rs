//! Token validation.
//!
//! Token issuance and session management live in the identity service; this
//! API only validates incoming Bearer tokens.

pub mod jwt;
