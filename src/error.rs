//! Error types for the roster engine.
//!
//! Fatal conditions are surfaced through [`RosterError`] before any search
//! work begins. Per-iteration anomalies (an invalid candidate, a move with
//! no eligible target) are not errors — they are recorded as counters on
//! the search result and the run continues.

use thiserror::Error;

/// The error type for all fallible engine operations.
#[derive(Debug, Clone, Error)]
pub enum RosterError {
    /// Input data is malformed or references an unknown identifier.
    ///
    /// Raised while building a [`Problem`](crate::model::Problem), before
    /// any roster exists. The message lists every issue found, not just
    /// the first.
    #[error("data integrity error: {message}")]
    DataIntegrity {
        /// Description of all integrity issues detected.
        message: String,
    },

    /// No valid initial roster exists under the given capacities and
    /// exclusions.
    #[error("no feasible initial roster: {reason}")]
    Infeasible {
        /// What blocked the construction.
        reason: String,
        /// The over-constrained employees or violations, where identifiable.
        conflicts: Vec<String>,
    },

    /// Internal misuse of the engine, e.g. scoring a roster that failed
    /// validation. A programming defect, not a user-facing condition.
    #[error("precondition violated: {message}")]
    Precondition {
        /// What was misused.
        message: String,
    },
}

impl RosterError {
    pub(crate) fn integrity(message: impl Into<String>) -> Self {
        Self::DataIntegrity {
            message: message.into(),
        }
    }

    pub(crate) fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_data_integrity() {
        let err = RosterError::integrity("unknown employee 'E9'");
        assert_eq!(
            err.to_string(),
            "data integrity error: unknown employee 'E9'"
        );
    }

    #[test]
    fn test_display_infeasible() {
        let err = RosterError::Infeasible {
            reason: "no line can host 'E1'".into(),
            conflicts: vec!["E1".into()],
        };
        assert!(err.to_string().contains("no feasible initial roster"));
    }

    #[test]
    fn test_display_precondition() {
        let err = RosterError::precondition("scored an invalid roster");
        assert!(err.to_string().starts_with("precondition violated"));
    }
}
