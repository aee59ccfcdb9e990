//! Candidate and result-set types for the search loop.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::Roster;
use crate::score::ScoreBreakdown;

/// One trial roster with its score, private working state of the search.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub roster: Roster,
    pub breakdown: ScoreBreakdown,
}

/// Best-first ordering over candidates with a deterministic tie-break:
/// higher aggregate first, then lower per-line variance, then the
/// lexicographically smaller assignment.
pub(crate) fn rank_cmp(a: &Candidate, b: &Candidate) -> Ordering {
    b.breakdown
        .aggregate
        .total_cmp(&a.breakdown.aggregate)
        .then_with(|| {
            a.breakdown
                .line_variance()
                .total_cmp(&b.breakdown.line_variance())
        })
        .then_with(|| a.roster.assignment().cmp(b.roster.assignment()))
}

/// A finalized roster in the result set, in identifier-keyed export form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRoster {
    /// Line id → crew employee ids.
    pub lines: BTreeMap<String, Vec<String>>,
    /// Employees left unassigned (empty unless the rules permit it).
    pub unassigned: Vec<String>,
    /// Decomposed per-line and aggregate scores.
    pub breakdown: ScoreBreakdown,
    /// Soft-rule annotations (missed preferences, specialist gaps).
    pub notes: Vec<String>,
}

/// The ordered top-K valid rosters found by a search, best first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Ranked entries, best first.
    pub entries: Vec<RankedRoster>,
}

impl ResultSet {
    /// The best-scoring roster, if any.
    pub fn best(&self) -> Option<&RankedRoster> {
        self.entries.first()
    }

    /// Number of retained rosters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries best-first.
    pub fn iter(&self) -> impl Iterator<Item = &RankedRoster> {
        self.entries.iter()
    }
}
