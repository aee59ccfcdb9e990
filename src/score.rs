//! Soft-rule scoring.
//!
//! [`Scorer`] evaluates a validated roster into a [`ScoreBreakdown`]: one
//! decomposed score per line plus the configured aggregate. Scoring is a
//! pure function of (roster, rule configuration) — every weight comes from
//! [`RuleConfig`](crate::model::RuleConfig), iteration follows arena index
//! order, and no hash-map iteration touches any scoring path, so identical
//! inputs yield bit-identical breakdowns.
//!
//! Scoring is defined only for rosters that pass hard-rule validation;
//! scoring an invalid roster is a programming error and reported as
//! [`RosterError::Precondition`].

use serde::{Deserialize, Serialize};

use crate::error::RosterError;
use crate::model::{Aggregation, Problem, Role, Roster};
use crate::validate;

/// Decomposed soft score of a single line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineScore {
    /// Line identifier.
    pub line: String,
    /// Negative experience variance, weighted. Zero for crews of size ≤ 1.
    pub experience_balance: f64,
    /// Role-pair compatibility over co-located pairs, weighted.
    pub synergy: f64,
    /// Bonus per configured specialist tag present on the crew.
    pub specialist: f64,
    /// Satisfied `should_work_with` relations minus missed-preference
    /// penalties, per crew member.
    pub preference: f64,
    /// Preferred/avoided line membership bonus and penalty.
    pub line_preference: f64,
    /// Sum of the term columns.
    pub total: f64,
}

/// Per-line and aggregate scores for one roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// One entry per line, in arena order.
    pub line_scores: Vec<LineScore>,
    /// Weighted combination of per-line totals (sum or average).
    pub aggregate: f64,
}

impl ScoreBreakdown {
    /// Total of the worst-scoring line. Zero when there are no lines.
    pub fn worst_line(&self) -> f64 {
        if self.line_scores.is_empty() {
            return 0.0;
        }
        self.line_scores
            .iter()
            .map(|l| l.total)
            .fold(f64::INFINITY, f64::min)
    }

    /// Population variance of per-line totals. Used as a tie-breaker when
    /// ranking equally-scored rosters.
    pub fn line_variance(&self) -> f64 {
        variance_of(self.line_scores.iter().map(|l| l.total))
    }
}

/// Evaluates rosters against a problem's rule configuration.
///
/// Construction precomputes a role×role synergy matrix from the configured
/// pair table; later entries overwrite earlier ones for the same pair.
pub struct Scorer<'a> {
    problem: &'a Problem,
    synergy: [[f64; Role::ALL.len()]; Role::ALL.len()],
}

impl<'a> Scorer<'a> {
    /// Builds a scorer for the given problem.
    pub fn new(problem: &'a Problem) -> Self {
        let mut synergy = [[0.0; Role::ALL.len()]; Role::ALL.len()];
        for rule in &problem.rules().synergy {
            synergy[rule.a.index()][rule.b.index()] = rule.score;
            synergy[rule.b.index()][rule.a.index()] = rule.score;
        }
        Self { problem, synergy }
    }

    /// Scores a roster, first confirming it is valid.
    ///
    /// Returns [`RosterError::Precondition`] for a roster that fails
    /// hard-rule validation and [`RosterError::DataIntegrity`] for one
    /// that does not belong to this problem.
    pub fn score(&self, roster: &Roster) -> Result<ScoreBreakdown, RosterError> {
        let report = validate::validate(self.problem, roster)?;
        if !report.is_valid() {
            return Err(RosterError::precondition(format!(
                "cannot score an invalid roster ({} violations)",
                report.violations.len()
            )));
        }
        Ok(self.score_valid(roster))
    }

    /// Scores a roster already confirmed valid by the caller.
    ///
    /// The search controller validates every candidate before scoring, so
    /// it uses this path to avoid re-validating.
    pub(crate) fn score_valid(&self, roster: &Roster) -> ScoreBreakdown {
        let crews = roster.crews(self.problem.line_count());
        let line_scores: Vec<LineScore> = crews
            .iter()
            .enumerate()
            .map(|(line, crew)| self.line_score(roster, line, crew))
            .collect();

        let aggregate = match self.problem.rules().aggregation {
            Aggregation::Sum => line_scores.iter().map(|l| l.total).sum(),
            Aggregation::Average => {
                if line_scores.is_empty() {
                    0.0
                } else {
                    line_scores.iter().map(|l| l.total).sum::<f64>() / line_scores.len() as f64
                }
            }
        };

        ScoreBreakdown {
            line_scores,
            aggregate,
        }
    }

    fn line_score(&self, roster: &Roster, line: usize, crew: &[usize]) -> LineScore {
        let problem = self.problem;
        let rules = problem.rules();

        let experience_balance = if crew.len() > 1 {
            -rules.experience_weight
                * variance_of(crew.iter().map(|&e| problem.employees()[e].experience as f64))
        } else {
            0.0
        };

        let mut synergy = 0.0;
        for (i, &a) in crew.iter().enumerate() {
            for &b in &crew[i + 1..] {
                synergy += self.synergy[problem.employees()[a].role.index()]
                    [problem.employees()[b].role.index()];
            }
        }
        synergy *= rules.synergy_weight;

        let mut specialist = 0.0;
        for tag in &rules.specialist_tags {
            if crew
                .iter()
                .any(|&e| problem.employees()[e].specialist_tags.contains(tag))
            {
                specialist += rules.specialist_weight;
            }
        }

        // One bonus per satisfied should_work_with relation; a relation
        // whose partner is elsewhere is charged to the preferring member's
        // own line, keeping the breakdown decomposable per line.
        let mut preference = 0.0;
        for &e in crew {
            for &p in problem.should(e) {
                if roster.line_of(p) == Some(line) {
                    preference += rules.preference_weight;
                } else {
                    preference -= rules.missed_preference_penalty;
                }
            }
        }

        let mut line_preference = 0.0;
        for &e in crew {
            if problem.preferred_lines(e).binary_search(&line).is_ok() {
                line_preference += rules.preferred_line_weight;
            }
            if problem.avoided_lines(e).binary_search(&line).is_ok() {
                line_preference -= rules.avoid_line_weight;
            }
        }

        LineScore {
            line: problem.lines()[line].id.clone(),
            experience_balance,
            synergy,
            specialist,
            preference,
            line_preference,
            total: experience_balance + synergy + specialist + preference + line_preference,
        }
    }
}

/// Soft-rule annotations for a finalized roster: missed preferences and
/// absent specialist tags, for the reporting collaborator.
pub(crate) fn soft_notes(problem: &Problem, roster: &Roster) -> Vec<String> {
    let mut notes = Vec::new();

    for e in 0..problem.employee_count() {
        for &p in problem.should(e) {
            if roster.line_of(e).is_none() || roster.line_of(e) != roster.line_of(p) {
                notes.push(format!(
                    "preference missed: '{}' is not rostered with '{}'",
                    problem.employees()[e].id,
                    problem.employees()[p].id
                ));
            }
        }
    }

    let crews = roster.crews(problem.line_count());
    for tag in &problem.rules().specialist_tags {
        for (line, crew) in crews.iter().enumerate() {
            if !crew
                .iter()
                .any(|&e| problem.employees()[e].specialist_tags.contains(tag))
            {
                notes.push(format!(
                    "specialist gap: line '{}' has no '{}'",
                    problem.lines()[line].id,
                    tag
                ));
            }
        }
    }

    notes
}

fn variance_of(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let n = values.clone().count();
    if n == 0 {
        return 0.0;
    }
    let mean = values.clone().sum::<f64>() / n as f64;
    values.map(|v| (v - mean) * (v - mean)).sum::<f64>() / n as f64
}
