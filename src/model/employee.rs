//! Employee model.
//!
//! Employees carry a role, an experience level, specialist tags, and three
//! relation sets over other employee identifiers:
//!
//! - `cannot_work_with` — hard exclusion, treated as symmetric
//! - `should_work_with` — soft positive preference
//! - `can_work_with` — explicitly neutral/allowed
//!
//! An identifier may appear in at most one of the three sets for a given
//! employee; the [`Problem`](super::Problem) builder rejects overlaps.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Professional role classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Shift manager.
    Manager,
    /// Intensive care paramedic.
    IntensiveCare,
    /// Qualified paramedic.
    Paramedic,
    /// Paramedic intern.
    Intern,
}

impl Role {
    /// All roles, in declaration order. Used to index synergy tables.
    pub const ALL: [Role; 4] = [
        Role::Manager,
        Role::IntensiveCare,
        Role::Paramedic,
        Role::Intern,
    ];

    /// Stable index of this role within [`Role::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Role::Manager => 0,
            Role::IntensiveCare => 1,
            Role::Paramedic => 2,
            Role::Intern => 3,
        }
    }
}

/// An employee available for roster assignment.
///
/// Immutable after loading: the engine never mutates employees, only the
/// roster that maps them to lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique, stable identifier.
    pub id: String,
    /// Role classification.
    pub role: Role,
    /// Experience level in years.
    #[serde(default)]
    pub experience: u32,
    /// Specialist capability tags (e.g. "ECP").
    #[serde(default)]
    pub specialist_tags: BTreeSet<String>,
    /// Coworkers this employee must never share a line with (symmetric).
    #[serde(default)]
    pub cannot_work_with: BTreeSet<String>,
    /// Coworkers this employee prefers to share a line with.
    #[serde(default)]
    pub should_work_with: BTreeSet<String>,
    /// Coworkers explicitly marked as neutral/allowed.
    #[serde(default)]
    pub can_work_with: BTreeSet<String>,
    /// Pin to a specific line. A locked employee is only ever rostered there.
    #[serde(default)]
    pub assigned_line: Option<String>,
    /// Lines this employee would rather be on (soft bonus).
    #[serde(default)]
    pub preferred_lines: BTreeSet<String>,
    /// Lines this employee would rather avoid (soft penalty).
    #[serde(default)]
    pub avoid_lines: BTreeSet<String>,
}

impl Employee {
    /// Creates an employee with no relations and zero experience.
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
            experience: 0,
            specialist_tags: BTreeSet::new(),
            cannot_work_with: BTreeSet::new(),
            should_work_with: BTreeSet::new(),
            can_work_with: BTreeSet::new(),
            assigned_line: None,
            preferred_lines: BTreeSet::new(),
            avoid_lines: BTreeSet::new(),
        }
    }

    /// Sets the experience level in years.
    pub fn with_experience(mut self, years: u32) -> Self {
        self.experience = years;
        self
    }

    /// Adds a specialist tag.
    pub fn with_specialist_tag(mut self, tag: impl Into<String>) -> Self {
        self.specialist_tags.insert(tag.into());
        self
    }

    /// Adds a hard exclusion against another employee.
    pub fn cannot_work_with(mut self, other: impl Into<String>) -> Self {
        self.cannot_work_with.insert(other.into());
        self
    }

    /// Adds a soft positive preference for another employee.
    pub fn should_work_with(mut self, other: impl Into<String>) -> Self {
        self.should_work_with.insert(other.into());
        self
    }

    /// Marks another employee as explicitly neutral.
    pub fn can_work_with(mut self, other: impl Into<String>) -> Self {
        self.can_work_with.insert(other.into());
        self
    }

    /// Pins this employee to a line.
    pub fn locked_to(mut self, line: impl Into<String>) -> Self {
        self.assigned_line = Some(line.into());
        self
    }

    /// Adds a preferred line.
    pub fn prefers_line(mut self, line: impl Into<String>) -> Self {
        self.preferred_lines.insert(line.into());
        self
    }

    /// Adds a line to avoid.
    pub fn avoids_line(mut self, line: impl Into<String>) -> Self {
        self.avoid_lines.insert(line.into());
        self
    }
}
