#![warn(missing_docs)]

//! # `knightsat`
//!
//! Solves the [Knight's Tour](https://en.wikipedia.org/wiki/Knight%27s_tour) on rectangular boards by expressing it
//! as a Boolean satisfiability problem (a "SAT"), and computes small sets of extra facts that make the tour unique.
//! Begin by describing a problem with a [`TourBuilder`], then [`build()`](TourBuilder::build) it into a
//! [`TourProblem`] and call [`solve()`](TourProblem::solve) or [`all_solutions()`](TourProblem::all_solutions).
//!
//! # Internals
//! Given an M×N board, let T = M×N. For every cell `(i, j)` and timestep `t < T` there is a variable meaning "the
//! knight is on `(i, j)` at `t`"; see [`VarIndex`] for the numbering.
//!
//! We make the following assertions in SAT form:
//! 1. The knight is on its start cell at timestep 0.
//! 2. Exactly one cell is occupied at every timestep, and every cell is occupied at exactly one timestep.
//!    "Exactly one" is expressed with either of the [`Encoding`]s: pairwise exclusion, quadratic in the group size, or
//!    a sequential counter, linear in the group size at the cost of auxiliary variables.
//! 3. Occupying a cell at any timestep but the last implies occupying one of its knight-move neighbors next.
//!
//! Satisfying assignments are read back as board matrices ([`Solution`]) or as sequences of cells ([`Tour`]).
//!
//! When several tours start from the same cell, [`separating_constraints`] picks one of them as reference and derives
//! `(timestep, cell)` facts that rule out every other tour, dropping any fact the others make redundant.

pub use board::Board;
pub use builder::TourBuilder;
pub use error::{BuilderInvalidReason, Result, TourError};
pub use index::{AuxGroup, AuxTag, Timestep, VarIndex, Variable};
pub use location::{Coord, Dimension, Location};
pub use logic::Encoding;
pub use problem::{count_tours, SeparationCheck, TourProblem};
pub use solver::{Engine, Formula, Model, Models, VarisatEngine};
pub use step::KnightStep;
pub use tour::{dedup_solutions, Solution, Tour};
pub use uniqueness::{leave_one_out, separate_from, separating_constraints, Constraint, ReferencePolicy};

pub(crate) mod board;
pub mod builder;
pub(crate) mod error;
pub(crate) mod index;
pub(crate) mod location;
pub(crate) mod logic;
pub(crate) mod problem;
pub(crate) mod solver;
pub(crate) mod step;
pub mod symmetry;
mod tests;
pub(crate) mod tour;
pub mod uniqueness;
#[cfg(feature = "wasm")]
mod wasm;
