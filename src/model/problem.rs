//! Problem arena: validated employees, lines, and rule configuration.
//!
//! Employees and lines are held in arenas and addressed by index; relation
//! sets are resolved to sorted index vectors at load time, so validation
//! and scoring never chase identifier strings or object references.
//!
//! Construction performs the referential-integrity pass: every identifier
//! in a relation set, line lock, or line preference must resolve, relation
//! sets must be pairwise disjoint per employee, and `cannot_work_with` is
//! closed under symmetry.

use std::collections::BTreeMap;
use std::collections::HashMap;

use crate::error::RosterError;
use crate::validate;

use super::{Employee, Line, Roster, RuleConfig};

/// The immutable input to a roster run: arena of employees and lines plus
/// the rule configuration, with relations resolved to indices.
#[derive(Debug, Clone)]
pub struct Problem {
    employees: Vec<Employee>,
    lines: Vec<Line>,
    rules: RuleConfig,
    employee_index: HashMap<String, usize>,
    line_index: HashMap<String, usize>,
    /// Symmetric closure of hard exclusions, per employee, sorted.
    cannot: Vec<Vec<usize>>,
    /// Soft positive preferences, per employee, sorted.
    should: Vec<Vec<usize>>,
    /// Resolved line locks.
    locks: Vec<Option<usize>>,
    /// Resolved preferred lines, per employee, sorted.
    preferred: Vec<Vec<usize>>,
    /// Resolved avoided lines, per employee, sorted.
    avoid: Vec<Vec<usize>>,
}

impl Problem {
    /// Builds a problem, validating referential integrity.
    ///
    /// All issues are collected before failing, so the error message names
    /// every unresolvable identifier, duplicate, inverted capacity, and
    /// conflicting relation in one pass.
    pub fn new(
        employees: Vec<Employee>,
        lines: Vec<Line>,
        rules: RuleConfig,
    ) -> Result<Self, RosterError> {
        let mut issues: Vec<String> = Vec::new();

        let mut employee_index: HashMap<String, usize> = HashMap::new();
        for (i, emp) in employees.iter().enumerate() {
            if employee_index.insert(emp.id.clone(), i).is_some() {
                issues.push(format!("duplicate employee id '{}'", emp.id));
            }
        }

        let mut line_index: HashMap<String, usize> = HashMap::new();
        for (i, line) in lines.iter().enumerate() {
            if line_index.insert(line.id.clone(), i).is_some() {
                issues.push(format!("duplicate line id '{}'", line.id));
            }
            if line.min_headcount > line.max_headcount {
                issues.push(format!(
                    "line '{}' has min_headcount {} above max_headcount {}",
                    line.id, line.min_headcount, line.max_headcount
                ));
            }
        }

        for emp in &employees {
            check_relation_disjointness(emp, &mut issues);
        }

        let n = employees.len();
        let mut cannot: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut should: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut can: Vec<Vec<usize>> = vec![Vec::new(); n];

        for (i, emp) in employees.iter().enumerate() {
            cannot[i] = resolve_employees(
                &emp.cannot_work_with,
                &emp.id,
                "cannot_work_with",
                &employee_index,
                &mut issues,
            );
            should[i] = resolve_employees(
                &emp.should_work_with,
                &emp.id,
                "should_work_with",
                &employee_index,
                &mut issues,
            );
            can[i] = resolve_employees(
                &emp.can_work_with,
                &emp.id,
                "can_work_with",
                &employee_index,
                &mut issues,
            );
        }

        // Symmetric closure: a one-directional exclusion binds both sides.
        for a in 0..n {
            for b in cannot[a].clone() {
                if !cannot[b].contains(&a) {
                    cannot[b].push(a);
                }
            }
        }
        for set in &mut cannot {
            set.sort_unstable();
            set.dedup();
        }

        // A closed exclusion must not coexist with the other relations in
        // either direction.
        for (a, emp) in employees.iter().enumerate() {
            for &b in &should[a] {
                if cannot[a].binary_search(&b).is_ok() {
                    issues.push(format!(
                        "employee '{}' lists '{}' as should_work_with but the pair is mutually excluded",
                        emp.id, employees[b].id
                    ));
                }
            }
            for &b in &can[a] {
                if cannot[a].binary_search(&b).is_ok() {
                    issues.push(format!(
                        "employee '{}' lists '{}' as can_work_with but the pair is mutually excluded",
                        emp.id, employees[b].id
                    ));
                }
            }
        }

        let mut locks: Vec<Option<usize>> = vec![None; n];
        let mut preferred: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut avoid: Vec<Vec<usize>> = vec![Vec::new(); n];

        for (i, emp) in employees.iter().enumerate() {
            if let Some(ref line_id) = emp.assigned_line {
                match line_index.get(line_id) {
                    Some(&l) => locks[i] = Some(l),
                    None => issues.push(format!(
                        "employee '{}' is locked to unknown line '{}'",
                        emp.id, line_id
                    )),
                }
            }
            preferred[i] = resolve_lines(
                &emp.preferred_lines,
                &emp.id,
                "preferred_lines",
                &line_index,
                &mut issues,
            );
            avoid[i] = resolve_lines(
                &emp.avoid_lines,
                &emp.id,
                "avoid_lines",
                &line_index,
                &mut issues,
            );
        }

        if !issues.is_empty() {
            return Err(RosterError::integrity(issues.join("; ")));
        }

        Ok(Self {
            employees,
            lines,
            rules,
            employee_index,
            line_index,
            cannot,
            should,
            locks,
            preferred,
            avoid,
        })
    }

    /// All employees, in arena order.
    #[inline]
    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    /// All lines, in arena order.
    #[inline]
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// The rule configuration for this run.
    #[inline]
    pub fn rules(&self) -> &RuleConfig {
        &self.rules
    }

    #[inline]
    pub fn employee_count(&self) -> usize {
        self.employees.len()
    }

    #[inline]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Arena index of an employee id.
    pub fn employee_idx(&self, id: &str) -> Option<usize> {
        self.employee_index.get(id).copied()
    }

    /// Arena index of a line id.
    pub fn line_idx(&self, id: &str) -> Option<usize> {
        self.line_index.get(id).copied()
    }

    /// Hard-exclusion partners of an employee (symmetric closure, sorted).
    #[inline]
    pub fn cannot(&self, employee: usize) -> &[usize] {
        &self.cannot[employee]
    }

    /// Preferred coworkers of an employee (sorted).
    #[inline]
    pub fn should(&self, employee: usize) -> &[usize] {
        &self.should[employee]
    }

    /// The line an employee is locked to, if any.
    #[inline]
    pub fn lock(&self, employee: usize) -> Option<usize> {
        self.locks[employee]
    }

    /// Preferred lines of an employee (sorted).
    #[inline]
    pub fn preferred_lines(&self, employee: usize) -> &[usize] {
        &self.preferred[employee]
    }

    /// Avoided lines of an employee (sorted).
    #[inline]
    pub fn avoided_lines(&self, employee: usize) -> &[usize] {
        &self.avoid[employee]
    }

    /// Whether two employees are mutually excluded.
    #[inline]
    pub fn is_excluded(&self, a: usize, b: usize) -> bool {
        self.cannot[a].binary_search(&b).is_ok()
    }

    /// Whether a roster structurally belongs to this problem.
    pub fn owns_roster(&self, roster: &Roster) -> bool {
        roster.employee_count() == self.employees.len()
            && (0..roster.employee_count())
                .all(|e| roster.line_of(e).is_none_or(|l| l < self.lines.len()))
    }

    /// Produces a feasible initial roster, or reports infeasibility.
    ///
    /// Greedy and deterministic, no randomness:
    ///
    /// 1. Locked employees go to their line.
    /// 2. When role coverage is enforced, each requirement is seeded with
    ///    a matching employee before general placement.
    /// 3. Remaining employees, most-constrained first, go to the
    ///    least-filled eligible line — lines still below their minimum
    ///    headcount take priority, ties break on the lowest line index.
    ///
    /// The result is validated before being returned; a greedy dead end or
    /// residual violation is reported as [`RosterError::Infeasible`] with
    /// the blocking employees or violations named.
    pub fn initial_roster(&self) -> Result<Roster, RosterError> {
        let n = self.employees.len();
        let m = self.lines.len();
        let mut roster = Roster::unassigned(n);
        let mut crews: Vec<Vec<usize>> = vec![Vec::new(); m];

        for e in 0..n {
            if let Some(line) = self.locks[e] {
                if crews[line].len() >= self.lines[line].max_headcount as usize {
                    return Err(RosterError::Infeasible {
                        reason: format!(
                            "line '{}' cannot hold every employee locked to it",
                            self.lines[line].id
                        ),
                        conflicts: vec![self.employees[e].id.clone()],
                    });
                }
                if let Some(&other) = crews[line].iter().find(|&&o| self.is_excluded(e, o)) {
                    return Err(RosterError::Infeasible {
                        reason: format!(
                            "mutually excluded employees are both locked to line '{}'",
                            self.lines[line].id
                        ),
                        conflicts: vec![
                            self.employees[e].id.clone(),
                            self.employees[other].id.clone(),
                        ],
                    });
                }
                crews[line].push(e);
                roster.assign(e, Some(line));
            }
        }

        let order = self.constrained_order();

        if self.rules.enforce_role_coverage {
            self.seed_role_coverage(&order, &mut roster, &mut crews)?;
        }

        for &e in &order {
            if roster.line_of(e).is_some() {
                continue;
            }
            let mut best: Option<(bool, usize, usize)> = None;
            for (line, crew) in crews.iter().enumerate() {
                if !self.line_can_host(crew, line, e) {
                    continue;
                }
                let needs_min = crew.len() < self.lines[line].min_headcount as usize;
                let headroom = self.lines[line].max_headcount as usize - crew.len();
                // Ascending line order plus strict comparison keeps the
                // lowest line index on ties.
                if best.is_none_or(|(bm, bh, _)| (needs_min, headroom) > (bm, bh)) {
                    best = Some((needs_min, headroom, line));
                }
            }
            match best {
                Some((_, _, line)) => {
                    crews[line].push(e);
                    roster.assign(e, Some(line));
                }
                None if self.rules.allow_unassigned => {}
                None => {
                    let emp = &self.employees[e];
                    let conflicts = self.cannot[e]
                        .iter()
                        .map(|&o| self.employees[o].id.clone())
                        .collect();
                    return Err(RosterError::Infeasible {
                        reason: format!(
                            "no line can host employee '{}' under capacity and exclusion constraints",
                            emp.id
                        ),
                        conflicts,
                    });
                }
            }
        }

        let report = validate::validate(self, &roster)?;
        if !report.is_valid() {
            return Err(RosterError::Infeasible {
                reason: "greedy construction cannot satisfy all hard constraints".into(),
                conflicts: report
                    .violations
                    .iter()
                    .map(|v| v.message.clone())
                    .collect(),
            });
        }
        Ok(roster)
    }

    /// Identifier-keyed export form of a roster: line id → crew ids, plus
    /// the unassigned employee ids.
    pub fn export_roster(&self, roster: &Roster) -> (BTreeMap<String, Vec<String>>, Vec<String>) {
        let crews = roster.crews(self.lines.len());
        let mut by_line = BTreeMap::new();
        for (line, crew) in crews.iter().enumerate() {
            by_line.insert(
                self.lines[line].id.clone(),
                crew.iter().map(|&e| self.employees[e].id.clone()).collect(),
            );
        }
        let unassigned = roster
            .unassigned_employees()
            .into_iter()
            .map(|e| self.employees[e].id.clone())
            .collect();
        (by_line, unassigned)
    }

    /// Employees ordered most-constrained first (exclusion degree, then
    /// arena order), so the hardest placements happen while lines are empty.
    fn constrained_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.employees.len()).collect();
        order.sort_by_key(|&e| (std::cmp::Reverse(self.cannot[e].len()), e));
        order
    }

    fn seed_role_coverage(
        &self,
        order: &[usize],
        roster: &mut Roster,
        crews: &mut [Vec<usize>],
    ) -> Result<(), RosterError> {
        for line in 0..self.lines.len() {
            for req in &self.lines[line].required_roles {
                let mut have = crews[line]
                    .iter()
                    .filter(|&&e| self.employees[e].role == req.role)
                    .count();
                while have < req.count as usize {
                    let pick = order.iter().copied().find(|&e| {
                        roster.line_of(e).is_none()
                            && self.locks[e].is_none()
                            && self.employees[e].role == req.role
                            && self.line_can_host(&crews[line], line, e)
                    });
                    match pick {
                        Some(e) => {
                            crews[line].push(e);
                            roster.assign(e, Some(line));
                            have += 1;
                        }
                        None => {
                            return Err(RosterError::Infeasible {
                                reason: format!(
                                    "line '{}' cannot cover its required role {:?}",
                                    self.lines[line].id, req.role
                                ),
                                conflicts: Vec::new(),
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn line_can_host(&self, crew: &[usize], line: usize, employee: usize) -> bool {
        crew.len() < self.lines[line].max_headcount as usize
            && crew.iter().all(|&o| !self.is_excluded(employee, o))
    }
}

fn check_relation_disjointness(emp: &Employee, issues: &mut Vec<String>) {
    for other in emp.cannot_work_with.intersection(&emp.should_work_with) {
        issues.push(format!(
            "employee '{}' lists '{}' in both cannot_work_with and should_work_with",
            emp.id, other
        ));
    }
    for other in emp.cannot_work_with.intersection(&emp.can_work_with) {
        issues.push(format!(
            "employee '{}' lists '{}' in both cannot_work_with and can_work_with",
            emp.id, other
        ));
    }
    for other in emp.should_work_with.intersection(&emp.can_work_with) {
        issues.push(format!(
            "employee '{}' lists '{}' in both should_work_with and can_work_with",
            emp.id, other
        ));
    }
}

fn resolve_employees(
    ids: &std::collections::BTreeSet<String>,
    owner: &str,
    relation: &str,
    index: &HashMap<String, usize>,
    issues: &mut Vec<String>,
) -> Vec<usize> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        if id == owner {
            issues.push(format!(
                "employee '{owner}' references itself in {relation}"
            ));
            continue;
        }
        match index.get(id) {
            Some(&i) => out.push(i),
            None => issues.push(format!(
                "employee '{owner}' references unknown employee '{id}' in {relation}"
            )),
        }
    }
    out.sort_unstable();
    out
}

fn resolve_lines(
    ids: &std::collections::BTreeSet<String>,
    owner: &str,
    relation: &str,
    index: &HashMap<String, usize>,
    issues: &mut Vec<String>,
) -> Vec<usize> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        match index.get(id) {
            Some(&i) => out.push(i),
            None => issues.push(format!(
                "employee '{owner}' references unknown line '{id}' in {relation}"
            )),
        }
    }
    out.sort_unstable();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;

    fn paramedics(n: usize) -> Vec<Employee> {
        (0..n)
            .map(|i| Employee::new(format!("E{i}"), Role::Paramedic))
            .collect()
    }

    #[test]
    fn test_unknown_relation_id_rejected() {
        let employees = vec![Employee::new("E0", Role::Paramedic).cannot_work_with("GHOST")];
        let lines = vec![Line::new("L0", 4)];
        let err = Problem::new(employees, lines, RuleConfig::default()).unwrap_err();
        assert!(matches!(err, RosterError::DataIntegrity { .. }));
        assert!(err.to_string().contains("GHOST"));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let employees = vec![
            Employee::new("E0", Role::Paramedic),
            Employee::new("E0", Role::Manager),
        ];
        let err = Problem::new(employees, vec![Line::new("L0", 4)], RuleConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("duplicate employee id 'E0'"));
    }

    #[test]
    fn test_inverted_capacity_rejected() {
        let lines = vec![Line::new("L0", 2).with_min_headcount(5)];
        let err = Problem::new(paramedics(2), lines, RuleConfig::default()).unwrap_err();
        assert!(err.to_string().contains("min_headcount"));
    }

    #[test]
    fn test_relation_overlap_rejected() {
        let employees = vec![
            Employee::new("E0", Role::Paramedic)
                .cannot_work_with("E1")
                .should_work_with("E1"),
            Employee::new("E1", Role::Paramedic),
        ];
        let err = Problem::new(employees, vec![Line::new("L0", 4)], RuleConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("both cannot_work_with and should_work_with"));
    }

    #[test]
    fn test_cross_direction_conflict_rejected() {
        // A excludes B, B prefers A: the symmetric exclusion wins and the
        // preference is a load-time inconsistency.
        let employees = vec![
            Employee::new("A", Role::Paramedic).cannot_work_with("B"),
            Employee::new("B", Role::Paramedic).should_work_with("A"),
        ];
        let err = Problem::new(employees, vec![Line::new("L0", 4)], RuleConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("mutually excluded"));
    }

    #[test]
    fn test_exclusion_symmetric_closure() {
        let employees = vec![
            Employee::new("A", Role::Paramedic).cannot_work_with("B"),
            Employee::new("B", Role::Paramedic),
        ];
        let problem =
            Problem::new(employees, vec![Line::new("L0", 4)], RuleConfig::default()).unwrap();
        assert!(problem.is_excluded(0, 1));
        assert!(problem.is_excluded(1, 0));
    }

    #[test]
    fn test_unknown_lock_rejected() {
        let employees = vec![Employee::new("E0", Role::Paramedic).locked_to("NOPE")];
        let err = Problem::new(employees, vec![Line::new("L0", 4)], RuleConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("unknown line 'NOPE'"));
    }

    #[test]
    fn test_initial_roster_respects_capacity() {
        let lines = vec![Line::new("L0", 2), Line::new("L1", 2)];
        let problem = Problem::new(paramedics(4), lines, RuleConfig::default()).unwrap();
        let roster = problem.initial_roster().unwrap();

        assert_eq!(roster.headcount(0), 2);
        assert_eq!(roster.headcount(1), 2);
        assert!(roster.unassigned_employees().is_empty());
    }

    #[test]
    fn test_initial_roster_separates_exclusions() {
        let employees = vec![
            Employee::new("A", Role::Paramedic).cannot_work_with("B"),
            Employee::new("B", Role::Paramedic),
            Employee::new("C", Role::Paramedic),
        ];
        let lines = vec![Line::new("L0", 2), Line::new("L1", 2)];
        let problem = Problem::new(employees, lines, RuleConfig::default()).unwrap();
        let roster = problem.initial_roster().unwrap();

        let a = problem.employee_idx("A").unwrap();
        let b = problem.employee_idx("B").unwrap();
        assert_ne!(roster.line_of(a), roster.line_of(b));
    }

    #[test]
    fn test_initial_roster_respects_locks() {
        let employees = vec![
            Employee::new("A", Role::Paramedic).locked_to("L1"),
            Employee::new("B", Role::Paramedic),
        ];
        let lines = vec![Line::new("L0", 2), Line::new("L1", 2)];
        let problem = Problem::new(employees, lines, RuleConfig::default()).unwrap();
        let roster = problem.initial_roster().unwrap();

        assert_eq!(roster.line_of(0), problem.line_idx("L1"));
    }

    #[test]
    fn test_initial_roster_seeds_role_coverage() {
        let employees = vec![
            Employee::new("M", Role::Manager),
            Employee::new("P0", Role::Paramedic),
            Employee::new("P1", Role::Paramedic),
        ];
        let lines = vec![
            Line::new("L0", 2).require_role(Role::Manager, 1),
            Line::new("L1", 2),
        ];
        let rules = RuleConfig::default().with_role_coverage(true);
        let problem = Problem::new(employees, lines, rules).unwrap();
        let roster = problem.initial_roster().unwrap();

        let m = problem.employee_idx("M").unwrap();
        assert_eq!(roster.line_of(m), Some(0));
    }

    #[test]
    fn test_infeasible_triple_exclusion_single_line() {
        // Three mutually exclusive employees and one line: nowhere to
        // separate them.
        let employees = vec![
            Employee::new("A", Role::Paramedic)
                .cannot_work_with("B")
                .cannot_work_with("C"),
            Employee::new("B", Role::Paramedic).cannot_work_with("C"),
            Employee::new("C", Role::Paramedic),
        ];
        let lines = vec![Line::new("L0", 3)];
        let problem = Problem::new(employees, lines, RuleConfig::default()).unwrap();

        let err = problem.initial_roster().unwrap_err();
        match err {
            RosterError::Infeasible { conflicts, .. } => {
                assert!(!conflicts.is_empty());
            }
            other => panic!("expected Infeasible, got {other:?}"),
        }
    }

    #[test]
    fn test_initial_roster_deterministic() {
        let lines = vec![Line::new("L0", 3), Line::new("L1", 3), Line::new("L2", 3)];
        let problem = Problem::new(paramedics(8), lines, RuleConfig::default()).unwrap();

        let a = problem.initial_roster().unwrap();
        let b = problem.initial_roster().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_initial_roster_fills_minimums_first() {
        // L0 has plenty of headroom; L1 demands two members. The greedy
        // pass must still fill L1 to its minimum.
        let lines = vec![
            Line::new("L0", 10),
            Line::new("L1", 2).with_min_headcount(2),
        ];
        let problem = Problem::new(paramedics(4), lines, RuleConfig::default()).unwrap();
        let roster = problem.initial_roster().unwrap();
        assert_eq!(roster.headcount(1), 2);
    }

    #[test]
    fn test_export_roster() {
        let lines = vec![Line::new("L0", 2), Line::new("L1", 2)];
        let problem = Problem::new(paramedics(3), lines, RuleConfig::default()).unwrap();
        let roster = problem.initial_roster().unwrap();

        let (by_line, unassigned) = problem.export_roster(&roster);
        assert_eq!(by_line.len(), 2);
        assert!(unassigned.is_empty());
        let total: usize = by_line.values().map(|crew| crew.len()).sum();
        assert_eq!(total, 3);
    }
}
