//! Line model.
//!
//! A line is an operational unit receiving a crew of employees. Capacity
//! bounds are hard constraints; role coverage requirements are hard only
//! when enabled in the rule configuration.

use serde::{Deserialize, Serialize};

use super::Role;

/// Minimum headcount of a given role required on a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRequirement {
    /// Required role.
    pub role: Role,
    /// Minimum number of crew members with that role.
    pub count: u32,
}

/// An operational line with capacity bounds and optional role coverage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Unique, stable identifier.
    pub id: String,
    /// Minimum crew size for a valid roster.
    #[serde(default)]
    pub min_headcount: u32,
    /// Maximum crew size.
    pub max_headcount: u32,
    /// Role coverage requirements, e.g. "at least one Manager".
    #[serde(default)]
    pub required_roles: Vec<RoleRequirement>,
}

impl Line {
    /// Creates a line with the given maximum headcount and no minimum.
    pub fn new(id: impl Into<String>, max_headcount: u32) -> Self {
        Self {
            id: id.into(),
            min_headcount: 0,
            max_headcount,
            required_roles: Vec::new(),
        }
    }

    /// Sets the minimum headcount.
    pub fn with_min_headcount(mut self, min: u32) -> Self {
        self.min_headcount = min;
        self
    }

    /// Requires at least `count` crew members with the given role.
    pub fn require_role(mut self, role: Role, count: u32) -> Self {
        self.required_roles.push(RoleRequirement { role, count });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let line = Line::new("L1", 6)
            .with_min_headcount(2)
            .require_role(Role::Manager, 1);

        assert_eq!(line.id, "L1");
        assert_eq!(line.min_headcount, 2);
        assert_eq!(line.max_headcount, 6);
        assert_eq!(
            line.required_roles,
            vec![RoleRequirement {
                role: Role::Manager,
                count: 1
            }]
        );
    }

    #[test]
    fn test_serde_round_trip() {
        let line = Line::new("L2", 4).require_role(Role::IntensiveCare, 2);
        let json = serde_json::to_string(&line).unwrap();
        let back: Line = serde_json::from_str(&json).unwrap();
        assert_eq!(line, back);
    }
}
