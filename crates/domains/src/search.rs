//! Search and status filtering over a complaint snapshot.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, Result};
use crate::models::{Complaint, ComplaintStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Only(ComplaintStatus),
}

impl StatusFilter {
    pub fn admits(&self, status: ComplaintStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        s.parse::<ComplaintStatus>().map(StatusFilter::Only)
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("all"),
            StatusFilter::Only(status) => f.write_str(status.as_str()),
        }
    }
}

fn matches_query(complaint: &Complaint, needle: &str) -> bool {
    complaint.title().to_lowercase().contains(needle)
        || complaint.author_name().to_lowercase().contains(needle)
}

/// Complaints whose title or owner name contains `query` (case-insensitive)
/// and whose status passes `status`, in input order.
///
/// A blank query matches everything.
pub fn filter<'a>(
    complaints: &'a [Complaint],
    query: &str,
    status: &StatusFilter,
) -> Vec<&'a Complaint> {
    let needle = query.trim().to_lowercase();
    complaints
        .iter()
        .filter(|c| status.admits(c.status()))
        .filter(|c| needle.is_empty() || matches_query(c, &needle))
        .collect()
}
