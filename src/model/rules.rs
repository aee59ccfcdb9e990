//! Rule configuration: soft-scoring weights and hard-rule toggles.
//!
//! Loaded once per run and read-only afterwards. Every tuning constant the
//! scoring engine and search guard use lives here — neither contains
//! hardcoded weights.

use serde::{Deserialize, Serialize};

use super::Role;

/// Configured compatibility score for a pair of roles sharing a line.
///
/// Pairs are unordered: `(Manager, Intern)` and `(Intern, Manager)` name
/// the same entry. When duplicates occur, the last entry wins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SynergyRule {
    /// One role of the pair.
    pub a: Role,
    /// The other role of the pair.
    pub b: Role,
    /// Compatibility score contributed per co-located pair.
    pub score: f64,
}

/// How per-line scores combine into the aggregate roster score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Aggregate is the sum of per-line totals.
    #[default]
    Sum,
    /// Aggregate is the mean of per-line totals.
    Average,
}

/// Tunable weights, penalties, and hard-rule toggles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Weight of the experience-variance penalty per line.
    pub experience_weight: f64,
    /// Multiplier applied to every synergy pair score.
    pub synergy_weight: f64,
    /// Role-pair compatibility table.
    pub synergy: Vec<SynergyRule>,
    /// Bonus per configured specialist tag present on a line.
    pub specialist_weight: f64,
    /// Specialist tags every line should cover (e.g. "ECP").
    pub specialist_tags: Vec<String>,
    /// Bonus per satisfied `should_work_with` relation on a line.
    pub preference_weight: f64,
    /// Penalty per `should_work_with` relation whose partner is elsewhere.
    /// Zero disables missed-preference penalties.
    pub missed_preference_penalty: f64,
    /// Bonus when a crew member has the line in `preferred_lines`.
    pub preferred_line_weight: f64,
    /// Penalty when a crew member has the line in `avoid_lines`.
    pub avoid_line_weight: f64,
    /// Whether role coverage requirements are hard constraints.
    pub enforce_role_coverage: bool,
    /// Whether a roster may leave employees unassigned.
    pub allow_unassigned: bool,
    /// Per-line score aggregation mode.
    pub aggregation: Aggregation,
    /// Search guard: how far a candidate's worst line may fall below its
    /// parent's worst line while still being retained for its aggregate.
    pub worst_line_tolerance: f64,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            experience_weight: 1.0,
            synergy_weight: 1.0,
            synergy: Vec::new(),
            specialist_weight: 1.0,
            specialist_tags: Vec::new(),
            preference_weight: 1.0,
            missed_preference_penalty: 0.0,
            preferred_line_weight: 1.0,
            avoid_line_weight: 1.0,
            enforce_role_coverage: false,
            allow_unassigned: false,
            aggregation: Aggregation::Sum,
            worst_line_tolerance: 0.5,
        }
    }
}

impl RuleConfig {
    /// Sets the experience-variance weight.
    pub fn with_experience_weight(mut self, weight: f64) -> Self {
        self.experience_weight = weight;
        self
    }

    /// Sets the synergy multiplier.
    pub fn with_synergy_weight(mut self, weight: f64) -> Self {
        self.synergy_weight = weight;
        self
    }

    /// Adds a role-pair synergy entry.
    pub fn with_synergy(mut self, a: Role, b: Role, score: f64) -> Self {
        self.synergy.push(SynergyRule { a, b, score });
        self
    }

    /// Sets the specialist coverage weight.
    pub fn with_specialist_weight(mut self, weight: f64) -> Self {
        self.specialist_weight = weight;
        self
    }

    /// Adds a specialist tag every line should cover.
    pub fn with_specialist_tag(mut self, tag: impl Into<String>) -> Self {
        self.specialist_tags.push(tag.into());
        self
    }

    /// Sets the satisfied-preference weight.
    pub fn with_preference_weight(mut self, weight: f64) -> Self {
        self.preference_weight = weight;
        self
    }

    /// Sets the missed-preference penalty (0 disables).
    pub fn with_missed_preference_penalty(mut self, penalty: f64) -> Self {
        self.missed_preference_penalty = penalty;
        self
    }

    /// Sets the preferred/avoided line weights.
    pub fn with_line_preference_weights(mut self, preferred: f64, avoid: f64) -> Self {
        self.preferred_line_weight = preferred;
        self.avoid_line_weight = avoid;
        self
    }

    /// Enables or disables hard role coverage.
    pub fn with_role_coverage(mut self, enforce: bool) -> Self {
        self.enforce_role_coverage = enforce;
        self
    }

    /// Permits or forbids unassigned employees.
    pub fn with_allow_unassigned(mut self, allow: bool) -> Self {
        self.allow_unassigned = allow;
        self
    }

    /// Sets the aggregation mode.
    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    /// Sets the worst-line tolerance used by the search guard.
    pub fn with_worst_line_tolerance(mut self, tolerance: f64) -> Self {
        self.worst_line_tolerance = tolerance.max(0.0);
        self
    }
}
