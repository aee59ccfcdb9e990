//! Constraint-aware roster optimization.
//!
//! Assigns employees to a fixed set of operational lines subject to hard
//! constraints (capacity bounds, mutual exclusions, line locks, role
//! coverage) while maximizing a weighted soft objective (experience
//! balance, role synergy, specialist coverage, coworker and line
//! preferences). A seeded local-search loop refines an initial greedy
//! assignment and returns the top-K valid rosters with transparent,
//! auditable score breakdowns.
//!
//! # Modules
//!
//! - **`model`**: Domain types — `Employee`, `Line`, `Roster`,
//!   `RuleConfig` — and the validated `Problem` arena
//! - **`validate`**: Pure hard-rule validator with structured violations
//! - **`score`**: Deterministic per-line and aggregate scoring
//! - **`search`**: The elitist local-search loop and its result set
//! - **`error`**: The `RosterError` taxonomy
//!
//! # Example
//!
//! ```
//! use roster_engine::model::{Employee, Line, Problem, Role, RuleConfig};
//! use roster_engine::search::{SearchConfig, SearchRunner};
//!
//! let employees = vec![
//!     Employee::new("ada", Role::Manager).with_experience(12),
//!     Employee::new("ben", Role::Paramedic).should_work_with("ada"),
//!     Employee::new("cas", Role::Paramedic).cannot_work_with("ben"),
//!     Employee::new("dev", Role::Intern),
//! ];
//! let lines = vec![Line::new("north", 2), Line::new("south", 2)];
//!
//! let problem = Problem::new(employees, lines, RuleConfig::default())?;
//! let config = SearchConfig::fast().with_seed(42);
//! let outcome = SearchRunner::run(&problem, &config)?;
//!
//! let best = outcome.results.best().expect("at least the initial roster");
//! assert!(best.breakdown.aggregate >= outcome.score_history[0]);
//! # Ok::<(), roster_engine::error::RosterError>(())
//! ```
//!
//! # Guarantees
//!
//! - Invalid rosters are never scored or returned.
//! - Scoring is a pure function of (roster, rules): identical inputs give
//!   bit-identical breakdowns.
//! - The best-known score is non-decreasing across iterations.
//! - A seeded run is reproducible, independent of parallelism.

pub mod error;
pub mod model;
pub mod score;
pub mod search;
pub mod validate;
