//! Search execution loop.
//!
//! # Algorithm
//!
//! 1. Build and score the initial roster (fatal if infeasible)
//! 2. Each iteration, propose a wave of mutated candidates from the
//!    retained pool, each slot on its own deterministic sub-seed
//! 3. Validate candidates; discard invalid ones unscored
//! 4. Score survivors (in parallel when configured)
//! 5. Merge into the elite pool: reject lopsided candidates whose worst
//!    line degrades past the configured tolerance, drop duplicates, keep
//!    the top-K
//! 6. Stop on iteration budget, wall-clock budget, plateau, or cancellation
//!
//! The pool is only modified by the single-threaded merge step after a
//! wave completes, so a cancelled run always returns a consistent result
//! set. Best-known score never regresses (elitist retention).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, info};

use super::config::SearchConfig;
use super::mutate;
use super::types::{rank_cmp, Candidate, RankedRoster, ResultSet};
use crate::error::RosterError;
use crate::model::{Problem, Roster};
use crate::score::{soft_notes, ScoreBreakdown, Scorer};
use crate::validate;

/// Result of a search run.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The retained top-K valid rosters, best first.
    pub results: ResultSet,

    /// Iterations actually executed.
    pub iterations: usize,

    /// Iteration at which the best roster was found (0 = initial).
    pub best_iteration: usize,

    /// Candidates generated across all waves.
    pub generated: usize,

    /// Candidates discarded by hard-rule validation, never scored.
    pub invalid_candidates: usize,

    /// Wave slots where no eligible mutation target existed.
    pub skipped_moves: usize,

    /// Candidates rejected by the worst-line degradation guard.
    pub guard_rejections: usize,

    /// Whether the run stopped on plateau detection.
    pub plateaued: bool,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,

    /// Best aggregate score at the end of each iteration, starting with
    /// the initial roster's score. Non-decreasing.
    pub score_history: Vec<f64>,
}

/// Executes the local-search optimization.
pub struct SearchRunner;

/// One proposed candidate awaiting evaluation, with its parent's metrics
/// snapshotted for the degradation guard.
struct WaveEntry {
    roster: Roster,
    parent_aggregate: f64,
    parent_worst: f64,
}

impl SearchRunner {
    /// Runs the search.
    pub fn run(problem: &Problem, config: &SearchConfig) -> Result<SearchResult, RosterError> {
        Self::run_with_cancel(problem, config, None)
    }

    /// Runs the search with an optional cancellation token.
    ///
    /// The flag is checked between waves; a cancelled run returns the
    /// best-known result set at that point.
    pub fn run_with_cancel(
        problem: &Problem,
        config: &SearchConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<SearchResult, RosterError> {
        config.validate().map_err(RosterError::precondition)?;

        let seed = config.seed.unwrap_or_else(rand::random);
        info!(
            seed,
            max_iterations = config.max_iterations,
            wave_size = config.wave_size,
            "starting roster search"
        );

        // Init
        let initial = problem.initial_roster()?;
        let scorer = Scorer::new(problem);
        let breakdown = scorer.score_valid(&initial);
        let mut best = breakdown.aggregate;
        let mut best_iteration = 0usize;
        let mut pool: Vec<Candidate> = vec![Candidate {
            roster: initial,
            breakdown,
        }];

        let tolerance = problem.rules().worst_line_tolerance;
        let start = Instant::now();
        let mut score_history = Vec::with_capacity(config.max_iterations + 1);
        score_history.push(best);

        let mut iterations = 0usize;
        let mut generated = 0usize;
        let mut invalid_candidates = 0usize;
        let mut skipped_moves = 0usize;
        let mut guard_rejections = 0usize;
        let mut no_improve = 0usize;
        let mut plateaued = false;
        let mut cancelled = false;

        // Iterate
        for iteration in 1..=config.max_iterations {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }
            if let Some(ms) = config.time_limit_ms {
                if start.elapsed() >= Duration::from_millis(ms) {
                    break;
                }
            }

            // Propose the wave. Slot sub-seeds make the trajectory a pure
            // function of the run seed.
            let mut wave: Vec<WaveEntry> = Vec::with_capacity(config.wave_size);
            for slot in 0..config.wave_size {
                let mut rng = mutate::slot_rng(seed, iteration as u64, slot as u64);
                let parent = &pool[rng.random_range(0..pool.len())];
                match mutate::propose(problem, &parent.roster, config.mutation_strategy, &mut rng)
                {
                    Some(op) => {
                        let mut roster = parent.roster.clone();
                        mutate::apply(&mut roster, op);
                        generated += 1;
                        wave.push(WaveEntry {
                            roster,
                            parent_aggregate: parent.breakdown.aggregate,
                            parent_worst: parent.breakdown.worst_line(),
                        });
                    }
                    None => skipped_moves += 1,
                }
            }

            // Validate and score; invalid candidates are discarded unscored.
            let evaluate = |entry: &WaveEntry| -> Option<ScoreBreakdown> {
                // Candidates derive from pool rosters, so the structural
                // check cannot fail here.
                let report = validate::validate(problem, &entry.roster).ok()?;
                if !report.is_valid() {
                    return None;
                }
                Some(scorer.score_valid(&entry.roster))
            };
            let evaluated: Vec<Option<ScoreBreakdown>> = if config.parallel {
                wave.par_iter().map(evaluate).collect()
            } else {
                wave.iter().map(evaluate).collect()
            };

            // Merge — the single writer to the pool.
            for (entry, outcome) in wave.into_iter().zip(evaluated) {
                let Some(breakdown) = outcome else {
                    invalid_candidates += 1;
                    continue;
                };
                if rejects_lopsided(
                    entry.parent_aggregate,
                    entry.parent_worst,
                    &breakdown,
                    tolerance,
                ) {
                    guard_rejections += 1;
                    continue;
                }
                if pool.iter().any(|c| c.roster == entry.roster) {
                    continue;
                }
                pool.push(Candidate {
                    roster: entry.roster,
                    breakdown,
                });
            }
            pool.sort_by(rank_cmp);
            pool.truncate(config.top_k);

            iterations = iteration;
            if pool[0].breakdown.aggregate > best {
                best = pool[0].breakdown.aggregate;
                best_iteration = iteration;
                no_improve = 0;
                debug!(iteration, best, "new best roster");
            } else {
                no_improve += 1;
            }
            score_history.push(best);

            if config.plateau_patience > 0 && no_improve >= config.plateau_patience {
                plateaued = true;
                break;
            }
        }

        // Terminate
        let results = finalize(problem, &pool);
        info!(
            iterations,
            best,
            retained = results.len(),
            plateaued,
            cancelled,
            "roster search complete"
        );

        Ok(SearchResult {
            results,
            iterations,
            best_iteration,
            generated,
            invalid_candidates,
            skipped_moves,
            guard_rejections,
            plateaued,
            cancelled,
            score_history,
        })
    }
}

/// The minimax-style degradation guard: a candidate that improves its
/// parent's aggregate only by letting its worst line fall more than
/// `tolerance` below the parent's worst line is rejected.
fn rejects_lopsided(
    parent_aggregate: f64,
    parent_worst: f64,
    candidate: &ScoreBreakdown,
    tolerance: f64,
) -> bool {
    candidate.aggregate > parent_aggregate && candidate.worst_line() < parent_worst - tolerance
}

fn finalize(problem: &Problem, pool: &[Candidate]) -> ResultSet {
    ResultSet {
        entries: pool
            .iter()
            .map(|c| {
                let (lines, unassigned) = problem.export_roster(&c.roster);
                RankedRoster {
                    lines,
                    unassigned,
                    breakdown: c.breakdown.clone(),
                    notes: soft_notes(problem, &c.roster),
                }
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Employee, Line, Role, RuleConfig};
    use crate::search::MutationStrategy;

    /// Four paramedics with two separated preference pairs; the greedy
    /// initial roster splits both pairs, so the search has room to improve.
    fn preference_problem() -> Problem {
        let employees = vec![
            Employee::new("A", Role::Paramedic).should_work_with("B"),
            Employee::new("B", Role::Paramedic),
            Employee::new("C", Role::Paramedic).should_work_with("D"),
            Employee::new("D", Role::Paramedic),
        ];
        let lines = vec![Line::new("L0", 2), Line::new("L1", 2)];
        Problem::new(employees, lines, RuleConfig::default()).unwrap()
    }

    fn config(seed: u64) -> SearchConfig {
        SearchConfig::default()
            .with_max_iterations(200)
            .with_plateau_patience(0)
            .with_seed(seed)
            .with_wave_size(4)
            .with_parallel(false)
    }

    #[test]
    fn test_zero_iterations_returns_initial_only() {
        let problem = preference_problem();
        let result =
            SearchRunner::run(&problem, &config(42).with_max_iterations(0)).unwrap();

        assert_eq!(result.iterations, 0);
        assert_eq!(result.results.len(), 1);
        assert_eq!(result.score_history.len(), 1);
        assert_eq!(result.best_iteration, 0);
        assert_eq!(
            result.results.best().unwrap().breakdown.aggregate,
            result.score_history[0]
        );
    }

    #[test]
    fn test_best_score_never_regresses() {
        let problem = preference_problem();
        let result = SearchRunner::run(&problem, &config(42)).unwrap();

        for window in result.score_history.windows(2) {
            assert!(
                window[1] >= window[0],
                "best score regressed: {} -> {}",
                window[0],
                window[1]
            );
        }
    }

    #[test]
    fn test_search_finds_preference_improvement() {
        let problem = preference_problem();
        let result = SearchRunner::run(&problem, &config(42)).unwrap();

        let initial = result.score_history[0];
        let best = result.results.best().unwrap().breakdown.aggregate;
        assert!(
            best > initial,
            "expected improvement over initial score {initial}, got {best}"
        );
    }

    #[test]
    fn test_same_seed_idempotent() {
        let problem = preference_problem();
        let a = SearchRunner::run(&problem, &config(7)).unwrap();
        let b = SearchRunner::run(&problem, &config(7)).unwrap();

        assert_eq!(a.results, b.results);
        assert_eq!(a.score_history, b.score_history);
        assert_eq!(a.best_iteration, b.best_iteration);
    }

    #[test]
    fn test_parallel_matches_serial() {
        let problem = preference_problem();
        let serial = SearchRunner::run(&problem, &config(11)).unwrap();
        let parallel =
            SearchRunner::run(&problem, &config(11).with_parallel(true)).unwrap();

        assert_eq!(serial.results, parallel.results);
        assert_eq!(serial.score_history, parallel.score_history);
    }

    #[test]
    fn test_top_k_bound_respected() {
        let problem = preference_problem();
        let result = SearchRunner::run(&problem, &config(42).with_top_k(2)).unwrap();
        assert!(result.results.len() <= 2);
        assert!(!result.results.is_empty());
    }

    #[test]
    fn test_result_set_ordered_best_first() {
        let problem = preference_problem();
        let result = SearchRunner::run(&problem, &config(42)).unwrap();

        let aggregates: Vec<f64> = result
            .results
            .iter()
            .map(|r| r.breakdown.aggregate)
            .collect();
        for window in aggregates.windows(2) {
            assert!(window[0] >= window[1]);
        }
    }

    #[test]
    fn test_plateau_termination() {
        // Two employees on two single-slot lines: every swap yields the
        // mirror roster with the same score, so the search plateaus.
        let employees = vec![
            Employee::new("A", Role::Paramedic),
            Employee::new("B", Role::Paramedic),
        ];
        let lines = vec![Line::new("L0", 1), Line::new("L1", 1)];
        let problem = Problem::new(employees, lines, RuleConfig::default()).unwrap();

        let config = SearchConfig::default()
            .with_max_iterations(10_000)
            .with_plateau_patience(5)
            .with_seed(42)
            .with_parallel(false);
        let result = SearchRunner::run(&problem, &config).unwrap();

        assert!(result.plateaued);
        assert!(result.iterations < 10_000);
    }

    #[test]
    fn test_cancellation_returns_consistent_result() {
        let problem = preference_problem();
        // Flag set before the run: cancellation is deterministic no matter
        // how fast the search would otherwise finish.
        let cancel = Arc::new(AtomicBool::new(true));

        let result =
            SearchRunner::run_with_cancel(&problem, &config(42), Some(cancel)).unwrap();
        assert!(result.cancelled);
        assert_eq!(result.results.len(), 1);
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn test_infeasible_problem_is_fatal() {
        let employees = vec![
            Employee::new("A", Role::Paramedic)
                .cannot_work_with("B")
                .cannot_work_with("C"),
            Employee::new("B", Role::Paramedic).cannot_work_with("C"),
            Employee::new("C", Role::Paramedic),
        ];
        let lines = vec![Line::new("L0", 3)];
        let problem = Problem::new(employees, lines, RuleConfig::default()).unwrap();

        let err = SearchRunner::run(&problem, &config(42)).unwrap_err();
        assert!(matches!(err, RosterError::Infeasible { .. }));
    }

    #[test]
    fn test_invalid_config_is_precondition_error() {
        let problem = preference_problem();
        let err = SearchRunner::run(&problem, &config(42).with_top_k(0)).unwrap_err();
        assert!(matches!(err, RosterError::Precondition { .. }));
    }

    #[test]
    fn test_move_strategy_with_locks_counts_skips() {
        // Every employee locked: no mutation has an eligible target, and
        // every slot is skipped without aborting the run.
        let employees = vec![
            Employee::new("A", Role::Paramedic).locked_to("L0"),
            Employee::new("B", Role::Paramedic).locked_to("L1"),
        ];
        let lines = vec![Line::new("L0", 1), Line::new("L1", 1)];
        let problem = Problem::new(employees, lines, RuleConfig::default()).unwrap();

        let config = SearchConfig::default()
            .with_max_iterations(10)
            .with_plateau_patience(0)
            .with_mutation_strategy(MutationStrategy::Move)
            .with_seed(42)
            .with_wave_size(2)
            .with_parallel(false);
        let result = SearchRunner::run(&problem, &config).unwrap();

        assert_eq!(result.generated, 0);
        assert_eq!(result.skipped_moves, 20);
        assert_eq!(result.results.len(), 1);
    }

    #[test]
    fn test_guard_rejects_lopsided_improvement() {
        // Aggregate improves but the worst line collapses past tolerance.
        let lopsided = ScoreBreakdown {
            line_scores: vec![
                crate::score::LineScore {
                    line: "L0".into(),
                    experience_balance: 0.0,
                    synergy: 0.0,
                    specialist: 0.0,
                    preference: 0.0,
                    line_preference: 0.0,
                    total: -5.0,
                },
                crate::score::LineScore {
                    line: "L1".into(),
                    experience_balance: 0.0,
                    synergy: 0.0,
                    specialist: 0.0,
                    preference: 0.0,
                    line_preference: 0.0,
                    total: 17.0,
                },
            ],
            aggregate: 12.0,
        };
        assert!(rejects_lopsided(10.0, -1.0, &lopsided, 0.5));
        // Within tolerance: retained.
        assert!(!rejects_lopsided(10.0, -5.0, &lopsided, 0.5));
        // No aggregate improvement: the elite pool handles it, not the guard.
        assert!(!rejects_lopsided(15.0, -1.0, &lopsided, 0.5));
    }
}

