//! # Domain Models
//!
//! These structs represent the core entities of the complaint desk.
//! We use UUID v7 for time-ordered, globally unique identification.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{DomainError, Result};

pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MIN_CHARS: usize = 10;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

/// Identifies an actor as issued by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub Uuid);

impl ActorId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ActorId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComplaintId(pub Uuid);

impl ComplaintId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ComplaintId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ComplaintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ComplaintId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// The sole authorization dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "admin" => Ok(Role::Admin),
            _ => Err(DomainError::validation("role", "must be one of: student, admin")),
        }
    }
}

/// A user of the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub display_name: String,
    pub role: Role,
}

impl Actor {
    pub fn new(display_name: impl Into<String>, role: Role) -> Self {
        Self {
            id: ActorId::new(),
            display_name: display_name.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// The fixed set of complaint categories offered on the submission form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Hostel,
    Mentor,
    Technical,
    Placement,
    Infrastructure,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Hostel,
        Category::Mentor,
        Category::Technical,
        Category::Placement,
        Category::Infrastructure,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Hostel => "hostel",
            Category::Mentor => "mentor",
            Category::Technical => "technical",
            Category::Placement => "placement",
            Category::Infrastructure => "infrastructure",
            Category::Other => "other",
        }
    }

    /// Human-facing label, also used as the chart key.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Hostel => "Hostel",
            Category::Mentor => "Mentor",
            Category::Technical => "Technical",
            Category::Placement => "Placement",
            Category::Infrastructure => "Infrastructure",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                DomainError::validation(
                    "category",
                    "must be one of: Hostel, Mentor, Technical, Placement, Infrastructure, Other",
                )
            })
    }
}

/// Complaint status. Moves strictly forward: Pending → InProgress → Solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    #[default]
    Pending,
    InProgress,
    Solved,
}

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 3] = [
        ComplaintStatus::Pending,
        ComplaintStatus::InProgress,
        ComplaintStatus::Solved,
    ];

    /// The only status reachable from `self`, if any.
    pub fn successor(&self) -> Option<ComplaintStatus> {
        match self {
            ComplaintStatus::Pending => Some(ComplaintStatus::InProgress),
            ComplaintStatus::InProgress => Some(ComplaintStatus::Solved),
            ComplaintStatus::Solved => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.successor().is_none()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "pending",
            ComplaintStatus::InProgress => "in_progress",
            ComplaintStatus::Solved => "solved",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "Pending",
            ComplaintStatus::InProgress => "In Progress",
            ComplaintStatus::Solved => "Solved",
        }
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ComplaintStatus {
    type Err = DomainError;

    /// Accepts `in_progress`, `In Progress`, `InProgress`, `in-progress`, etc.
    fn from_str(s: &str) -> Result<Self> {
        let folded: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_ascii_lowercase();
        match folded.as_str() {
            "pending" => Ok(ComplaintStatus::Pending),
            "inprogress" => Ok(ComplaintStatus::InProgress),
            "solved" => Ok(ComplaintStatus::Solved),
            _ => Err(DomainError::validation(
                "status",
                "must be one of: pending, in_progress, solved",
            )),
        }
    }
}

/// Raw submission input, exactly as it arrives from the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub title: String,
    pub description: String,
    pub category: String,
}

impl Submission {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            category: category.into(),
        }
    }

    /// Checks field limits and parses the category.
    ///
    /// Text is trimmed first; lengths are counted in characters, not bytes.
    pub fn validate(&self) -> Result<ValidSubmission> {
        let title = self.title.trim();
        check_length("title", title, TITLE_MIN_CHARS, TITLE_MAX_CHARS)?;

        let description = self.description.trim();
        check_length(
            "description",
            description,
            DESCRIPTION_MIN_CHARS,
            DESCRIPTION_MAX_CHARS,
        )?;

        let category = self.category.parse::<Category>()?;

        Ok(ValidSubmission {
            title: title.to_owned(),
            description: description.to_owned(),
            category,
        })
    }
}

fn check_length(field: &'static str, value: &str, min: usize, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(DomainError::validation(
            field,
            format!("must be between {min} and {max} characters (got {len})"),
        ));
    }
    Ok(())
}

/// A submission that passed [`Submission::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSubmission {
    title: String,
    description: String,
    category: Category,
}

impl ValidSubmission {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> Category {
        self.category
    }
}

/// A complaint raised by a student.
///
/// `id`, `author_id`, `author_name` and `created_at` are fixed at creation.
/// `status` and `admin_notes` only change through [`crate::lifecycle`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complaint {
    id: ComplaintId,
    author_id: ActorId,
    /// Owner's display name as of submission
    author_name: String,
    pub(crate) title: String,
    description: String,
    category: Category,
    status: ComplaintStatus,
    created_at: DateTime<Utc>,
    admin_notes: Option<String>,
}

impl Complaint {
    /// A freshly submitted complaint: always `Pending`, never annotated.
    pub fn submitted(author: &Actor, input: ValidSubmission, now: DateTime<Utc>) -> Self {
        Self {
            id: ComplaintId::new(),
            author_id: author.id,
            author_name: author.display_name.clone(),
            title: input.title,
            description: input.description,
            category: input.category,
            status: ComplaintStatus::Pending,
            created_at: now,
            admin_notes: None,
        }
    }

    pub fn id(&self) -> ComplaintId {
        self.id
    }

    pub fn author_id(&self) -> ActorId {
        self.author_id
    }

    pub fn author_name(&self) -> &str {
        &self.author_name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn status(&self) -> ComplaintStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn admin_notes(&self) -> Option<&str> {
        self.admin_notes.as_deref()
    }

    pub fn is_owned_by(&self, actor: ActorId) -> bool {
        self.author_id == actor
    }

    pub(crate) fn set_status(&mut self, status: ComplaintStatus) {
        self.status = status;
    }

    pub(crate) fn set_admin_notes(&mut self, notes: Option<String>) {
        self.admin_notes = notes;
    }
}

/// Flat persistence shape of a [`Complaint`], used by storage adapters to
/// write and rehydrate rows. Domain code works with [`Complaint`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintRecord {
    pub id: ComplaintId,
    pub author_id: ActorId,
    pub author_name: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
    pub admin_notes: Option<String>,
}

impl From<ComplaintRecord> for Complaint {
    fn from(r: ComplaintRecord) -> Self {
        Self {
            id: r.id,
            author_id: r.author_id,
            author_name: r.author_name,
            title: r.title,
            description: r.description,
            category: r.category,
            status: r.status,
            created_at: r.created_at,
            admin_notes: r.admin_notes,
        }
    }
}

impl From<Complaint> for ComplaintRecord {
    fn from(c: Complaint) -> Self {
        Self {
            id: c.id,
            author_id: c.author_id,
            author_name: c.author_name,
            title: c.title,
            description: c.description,
            category: c.category,
            status: c.status,
            created_at: c.created_at,
            admin_notes: c.admin_notes,
        }
    }
}
