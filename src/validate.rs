//! Hard-rule validation.
//!
//! [`validate`] is a pure function of (problem, roster): it mutates
//! nothing and always reports violations in the same order for identical
//! input, so violation lists are comparable across runs. Checks run in a
//! fixed sequence:
//!
//! 1. capacity bounds per line (exceeded, then underfilled)
//! 2. mutual-exclusion pairs co-located on a line
//! 3. line locks and unassigned employees
//! 4. role coverage requirements (only when enabled)
//!
//! A roster with any violation is invalid and is never scored or promoted
//! into a result set.

use serde::{Deserialize, Serialize};

use crate::error::RosterError;
use crate::model::{Problem, Roster};

/// Categories of hard-rule violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationKind {
    /// A line holds more employees than its maximum headcount.
    CapacityExceeded,
    /// A line holds fewer employees than its minimum headcount.
    CapacityUnderfilled,
    /// A `cannot_work_with` pair shares a line.
    MutualExclusion,
    /// A locked employee is rostered away from their line.
    AssignmentLock,
    /// An employee is unassigned while the configuration forbids it.
    UnassignedEmployee,
    /// A line misses a required role.
    RoleCoverageMissing,
}

/// A single hard-rule violation, with enough context for traceability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Violation category.
    pub kind: ViolationKind,
    /// The line involved, if any.
    pub line: Option<String>,
    /// The employees involved, if any.
    pub employees: Vec<String>,
    /// Human-readable description.
    pub message: String,
}

/// Result of validating one roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// All violations found, in deterministic check order.
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Whether the roster satisfies every hard rule.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Validates a roster against the problem's hard rules.
///
/// Returns [`RosterError::DataIntegrity`] if the roster does not
/// structurally belong to the problem (wrong employee count or an
/// out-of-range line index); such a roster cannot be meaningfully checked.
pub fn validate(problem: &Problem, roster: &Roster) -> Result<ValidationReport, RosterError> {
    if !problem.owns_roster(roster) {
        return Err(RosterError::integrity(
            "roster does not belong to this problem (employee count or line index mismatch)",
        ));
    }

    let mut violations = Vec::new();
    let crews = roster.crews(problem.line_count());

    // 1. Capacity bounds
    for (line, crew) in crews.iter().enumerate() {
        let line_def = &problem.lines()[line];
        if crew.len() > line_def.max_headcount as usize {
            violations.push(Violation {
                kind: ViolationKind::CapacityExceeded,
                line: Some(line_def.id.clone()),
                employees: ids(problem, crew),
                message: format!(
                    "line '{}' holds {} employees, maximum is {}",
                    line_def.id,
                    crew.len(),
                    line_def.max_headcount
                ),
            });
        }
        if crew.len() < line_def.min_headcount as usize {
            violations.push(Violation {
                kind: ViolationKind::CapacityUnderfilled,
                line: Some(line_def.id.clone()),
                employees: ids(problem, crew),
                message: format!(
                    "line '{}' holds {} employees, minimum is {}",
                    line_def.id,
                    crew.len(),
                    line_def.min_headcount
                ),
            });
        }
    }

    // 2. Mutual exclusions. Crews are in ascending employee order, so each
    // offending pair is reported exactly once.
    for (line, crew) in crews.iter().enumerate() {
        let line_def = &problem.lines()[line];
        for (i, &a) in crew.iter().enumerate() {
            for &b in &crew[i + 1..] {
                if problem.is_excluded(a, b) {
                    violations.push(Violation {
                        kind: ViolationKind::MutualExclusion,
                        line: Some(line_def.id.clone()),
                        employees: vec![
                            problem.employees()[a].id.clone(),
                            problem.employees()[b].id.clone(),
                        ],
                        message: format!(
                            "employees '{}' and '{}' cannot work together on line '{}'",
                            problem.employees()[a].id,
                            problem.employees()[b].id,
                            line_def.id
                        ),
                    });
                }
            }
        }
    }

    // 3. Line locks and unassigned employees
    for e in 0..problem.employee_count() {
        let assigned = roster.line_of(e);
        if let Some(lock) = problem.lock(e) {
            if assigned != Some(lock) {
                violations.push(Violation {
                    kind: ViolationKind::AssignmentLock,
                    line: Some(problem.lines()[lock].id.clone()),
                    employees: vec![problem.employees()[e].id.clone()],
                    message: format!(
                        "employee '{}' is locked to line '{}' but rostered elsewhere",
                        problem.employees()[e].id,
                        problem.lines()[lock].id
                    ),
                });
            }
        }
        if assigned.is_none() && !problem.rules().allow_unassigned {
            violations.push(Violation {
                kind: ViolationKind::UnassignedEmployee,
                line: None,
                employees: vec![problem.employees()[e].id.clone()],
                message: format!(
                    "employee '{}' is unassigned but the configuration requires a full assignment",
                    problem.employees()[e].id
                ),
            });
        }
    }

    // 4. Role coverage
    if problem.rules().enforce_role_coverage {
        for (line, crew) in crews.iter().enumerate() {
            let line_def = &problem.lines()[line];
            for req in &line_def.required_roles {
                let have = crew
                    .iter()
                    .filter(|&&e| problem.employees()[e].role == req.role)
                    .count();
                if have < req.count as usize {
                    violations.push(Violation {
                        kind: ViolationKind::RoleCoverageMissing,
                        line: Some(line_def.id.clone()),
                        employees: Vec::new(),
                        message: format!(
                            "line '{}' has {} of {} required {:?}",
                            line_def.id, have, req.count, req.role
                        ),
                    });
                }
            }
        }
    }

    Ok(ValidationReport { violations })
}

fn ids(problem: &Problem, crew: &[usize]) -> Vec<String> {
    crew.iter()
        .map(|&e| problem.employees()[e].id.clone())
        .collect()
}
