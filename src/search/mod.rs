//! Local-search optimization over rosters.
//!
//! An elitist generate → mutate → validate → score → retain loop, driven
//! as an explicit Init → Iterate → Terminate state machine. The retained
//! top-K pool never lets the best-known score regress, and a worst-line
//! degradation guard keeps improvements from producing lopsided rosters.
//!
//! # Key Types
//!
//! - [`SearchConfig`]: budgets, plateau patience, mutation strategy, seed
//! - [`SearchRunner`]: executes the loop
//! - [`SearchResult`]: result set plus run statistics
//! - [`ResultSet`] / [`RankedRoster`]: the ordered top-K output
//!
//! # Reproducibility
//!
//! All randomness derives from a single run seed; each wave slot gets a
//! deterministically derived sub-seed, so a seeded run returns identical
//! results whether waves are evaluated serially or in parallel.

mod config;
mod mutate;
mod runner;
mod types;

pub use config::SearchConfig;
pub use mutate::MutationStrategy;
pub use runner::{SearchResult, SearchRunner};
pub use types::{RankedRoster, ResultSet};
