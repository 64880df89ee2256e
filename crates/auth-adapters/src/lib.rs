//! # auth-adapters
//!
//! `IdentityProvider` implementations. Issuing and verifying credentials is
//! handled upstream; these adapters only answer who holds the current session
//! and what role they have.

pub mod session;

pub use session::SessionDirectory;
