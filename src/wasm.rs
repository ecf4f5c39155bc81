//! JavaScript bindings.

use js_sys::{Array, Int32Array};
use wasm_bindgen::prelude::*;

use crate::builder::TourBuilder;
use crate::location::{Dimension, Location};
use crate::logic::Encoding;
use crate::uniqueness::ReferencePolicy;

/// Solve the tour from `(row, col)` with the encoding named by `encoding` (`"naive"`, `"n"`, `"sequential-counter"`
/// or `"sc"`).
///
/// Returns the board matrix flattened in row-major order, or an empty array if there is no tour.
#[wasm_bindgen(js_name = solveTour)]
pub fn solve_tour(rows: Dimension, cols: Dimension, row: usize, col: usize, encoding: &str) -> Result<Vec<i32>, JsError> {
    let problem = TourBuilder::with_dims((rows, cols))
        .start_at(Location(row, col))
        .encoding(encoding.parse::<Encoding>()?)
        .build()?;

    Ok(match problem.solve()? {
        Some(solution) => solution.cells().iter().map(|visit| visit.map_or(-1, |t| t as i32)).collect(),
        None => Vec::new(),
    })
}

/// Constraints forcing a unique tour from `(row, col)`, as an array of `[timestep, row, col]` triples.
///
/// Without a `seed` the reference tour is drawn at random on every call.
#[wasm_bindgen(js_name = uniquenessConstraints)]
pub fn uniqueness_constraints(rows: Dimension, cols: Dimension, row: usize, col: usize, seed: Option<u32>) -> Result<Array, JsError> {
    let problem = TourBuilder::with_dims((rows, cols))
        .start_at(Location(row, col))
        .encoding(Encoding::SequentialCounter)
        .build()?;

    let policy = seed.map_or(ReferencePolicy::Entropy, |seed| ReferencePolicy::Seeded(seed.into()));
    let constraints = Array::new();
    for constraint in problem.uniqueness_constraints(policy)? {
        let (t, row, col) = constraint.as_triple();
        constraints.push(&Int32Array::from(&[t as i32, row as i32, col as i32][..]).into());
    }

    Ok(constraints)
}
