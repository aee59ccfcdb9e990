//! Mutation operators and seeded RNG derivation.
//!
//! A mutation proposes a small change to a parent roster: swapping two
//! employees between lines, or relocating one employee to another line.
//! Proposals respect line locks and capacity headroom; exclusion conflicts
//! are left to the validator, which discards the candidate unscored.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::model::{Problem, Roster};

/// How candidate mutations are chosen each wave slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationStrategy {
    /// Swap two employees between two lines.
    Swap,
    /// Move one employee to a different line.
    Move,
    /// An even coin flip between swap and move, per slot.
    #[default]
    Mixed,
}

/// Deterministic per-slot RNG.
///
/// Each (run seed, iteration, slot) triple is mixed through a SplitMix64
/// finalizer into its own stream, so wave evaluation order — serial or
/// parallel, any worker count — cannot affect the search trajectory.
pub(crate) fn slot_rng(seed: u64, iteration: u64, slot: u64) -> ChaCha8Rng {
    let mut z = seed
        ^ iteration.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ slot.wrapping_mul(0xD1B5_4A32_D192_ED03);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    ChaCha8Rng::seed_from_u64(z)
}

/// A proposed change to a parent roster. Applying it to a clone of the
/// parent produces the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MoveOp {
    /// Exchange the line assignments of two employees.
    Swap { a: usize, b: usize },
    /// Reassign one employee to another line.
    Relocate { employee: usize, to: usize },
}

/// Proposes a mutation of the given strategy, or `None` when no eligible
/// target exists (skipped for this slot, never fatal).
pub(crate) fn propose<R: Rng>(
    problem: &Problem,
    roster: &Roster,
    strategy: MutationStrategy,
    rng: &mut R,
) -> Option<MoveOp> {
    match strategy {
        MutationStrategy::Swap => propose_swap(problem, roster, rng),
        MutationStrategy::Move => propose_move(problem, roster, rng),
        MutationStrategy::Mixed => {
            if rng.random_bool(0.5) {
                propose_swap(problem, roster, rng)
            } else {
                propose_move(problem, roster, rng)
            }
        }
    }
}

/// Applies a proposal in place. Swapping twice, or relocating back,
/// restores the parent assignment.
pub(crate) fn apply(roster: &mut Roster, op: MoveOp) {
    match op {
        MoveOp::Swap { a, b } => roster.swap(a, b),
        MoveOp::Relocate { employee, to } => roster.assign(employee, Some(to)),
    }
}

fn propose_swap<R: Rng>(problem: &Problem, roster: &Roster, rng: &mut R) -> Option<MoveOp> {
    let movable: Vec<usize> = (0..problem.employee_count())
        .filter(|&e| problem.lock(e).is_none() && roster.line_of(e).is_some())
        .collect();
    if movable.len() < 2 {
        return None;
    }

    let a = movable[rng.random_range(0..movable.len())];
    let partners: Vec<usize> = movable
        .iter()
        .copied()
        .filter(|&b| roster.line_of(b) != roster.line_of(a))
        .collect();
    if partners.is_empty() {
        return None;
    }
    let b = partners[rng.random_range(0..partners.len())];
    Some(MoveOp::Swap { a, b })
}

fn propose_move<R: Rng>(problem: &Problem, roster: &Roster, rng: &mut R) -> Option<MoveOp> {
    let movable: Vec<usize> = (0..problem.employee_count())
        .filter(|&e| problem.lock(e).is_none())
        .collect();
    if movable.is_empty() {
        return None;
    }

    let employee = movable[rng.random_range(0..movable.len())];
    let current = roster.line_of(employee);
    let targets: Vec<usize> = (0..problem.line_count())
        .filter(|&line| {
            Some(line) != current
                && roster.headcount(line) < problem.lines()[line].max_headcount as usize
        })
        .collect();
    if targets.is_empty() {
        return None;
    }
    let to = targets[rng.random_range(0..targets.len())];
    Some(MoveOp::Relocate { employee, to })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Employee, Line, Role, RuleConfig};

    fn small_problem() -> Problem {
        let employees = vec![
            Employee::new("A", Role::Paramedic),
            Employee::new("B", Role::Paramedic),
            Employee::new("C", Role::Paramedic).locked_to("L0"),
        ];
        let lines = vec![Line::new("L0", 3), Line::new("L1", 3)];
        Problem::new(employees, lines, RuleConfig::default()).unwrap()
    }

    #[test]
    fn test_slot_rng_reproducible() {
        let mut a = slot_rng(42, 3, 1);
        let mut b = slot_rng(42, 3, 1);
        assert_eq!(a.random::<u64>(), b.random::<u64>());
    }

    #[test]
    fn test_slot_rng_streams_differ() {
        let mut a = slot_rng(42, 3, 1);
        let mut b = slot_rng(42, 3, 2);
        let mut c = slot_rng(42, 4, 1);
        let first = a.random::<u64>();
        assert_ne!(first, b.random::<u64>());
        assert_ne!(first, c.random::<u64>());
    }

    #[test]
    fn test_swap_never_touches_locked_employee() {
        let problem = small_problem();
        let roster = problem.initial_roster().unwrap();
        let locked = problem.employee_idx("C").unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..50 {
            if let Some(MoveOp::Swap { a, b }) =
                propose(&problem, &roster, MutationStrategy::Swap, &mut rng)
            {
                assert_ne!(a, locked);
                assert_ne!(b, locked);
                assert_ne!(roster.line_of(a), roster.line_of(b));
            }
        }
    }

    #[test]
    fn test_move_respects_capacity() {
        let problem = small_problem();
        let roster = problem.initial_roster().unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..50 {
            if let Some(MoveOp::Relocate { employee, to }) =
                propose(&problem, &roster, MutationStrategy::Move, &mut rng)
            {
                assert_ne!(roster.line_of(employee), Some(to));
                assert!(
                    roster.headcount(to) < problem.lines()[to].max_headcount as usize
                );
            }
        }
    }

    #[test]
    fn test_move_skipped_when_all_lines_full() {
        let employees = vec![
            Employee::new("A", Role::Paramedic),
            Employee::new("B", Role::Paramedic),
        ];
        let lines = vec![Line::new("L0", 1), Line::new("L1", 1)];
        let problem = Problem::new(employees, lines, RuleConfig::default()).unwrap();
        let roster = problem.initial_roster().unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(
            propose(&problem, &roster, MutationStrategy::Move, &mut rng),
            None
        );
    }

    #[test]
    fn test_swap_applies_and_reverts() {
        let problem = small_problem();
        let original = problem.initial_roster().unwrap();
        let mut roster = original.clone();

        let op = MoveOp::Swap {
            a: problem.employee_idx("A").unwrap(),
            b: problem.employee_idx("B").unwrap(),
        };
        apply(&mut roster, op);
        apply(&mut roster, op);
        assert_eq!(roster, original);
    }
}
