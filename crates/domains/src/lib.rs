//! complaint-desk/crates/domains/src/lib.rs
//!
//! The central domain logic and interface definitions for the complaint desk:
//! models, the authorization gate, the status lifecycle, the search filter,
//! the statistics engine, and the ports adapters implement.

pub mod authz;
pub mod errors;
pub mod lifecycle;
pub mod models;
pub mod ports;
pub mod search;
pub mod stats;

// Re-exporting for easier access in other crates
pub use authz::{authorize, can_read_detail, Access, DenyReason, Principal};
pub use errors::*;
pub use models::*;
pub use ports::*;
pub use search::StatusFilter;
pub use stats::DashboardSummary;
