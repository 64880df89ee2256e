//! # services
//!
//! Orchestration between the domain rules and the ports: the triage service
//! and the two surface controllers built on it.

pub mod admin;
pub mod student;
pub mod triage;

pub use admin::{AdminConsole, AdminViewState};
pub use student::StudentDesk;
pub use triage::TriageService;
