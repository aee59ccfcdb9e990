//! Domain models for roster optimization.
//!
//! Boundary types are plain serde-derived structs the caller loads from
//! already-parsed input: [`Employee`], [`Line`], and [`RuleConfig`]. They
//! are assembled into a validated [`Problem`] arena, and a [`Roster`] is
//! a total index-based assignment over that arena.

mod employee;
mod line;
mod problem;
mod roster;
mod rules;

pub use employee::{Employee, Role};
pub use line::{Line, RoleRequirement};
pub use problem::Problem;
pub use roster::Roster;
pub use rules::{Aggregation, RuleConfig, SynergyRule};
