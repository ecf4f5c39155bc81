use std::fmt::{Display, Formatter};

use itertools::Itertools;
use ndarray::Array2;

use crate::board::Board;
use crate::error::{Result, TourError};
use crate::index::{Timestep, VarIndex};
use crate::location::{Dimension, Location};
use crate::solver::Model;

/// A board matrix: each cell holds the timestep at which the knight visits it.
///
/// [`None`] marks an unvisited cell (the `-1` of [`to_rows`](Solution::to_rows)), which only occurs for partial
/// assignments, never in a full tour.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Solution(pub(crate) Array2<Option<Timestep>>);

impl Solution {
    /// Read the visited cells off `model`.
    ///
    /// Fails with [`TourError::AmbiguousModel`] if some cell is visited at several timesteps, which the cardinality
    /// clauses rule out for any model of a full encoding.
    pub fn from_model(model: &Model, index: &VarIndex) -> Result<Self> {
        let mut cells = Array2::from_elem(index.dims(), None);

        for (ind, slot) in cells.indexed_iter_mut() {
            let location = Location::from(ind);
            let mut visits = (0..index.steps()).filter(|t| model.value(index.var(location, *t)));

            *slot = visits.next();
            if let (Some(first), Some(second)) = (*slot, visits.next()) {
                return Err(TourError::AmbiguousModel { location, first, second });
            }
        }

        Ok(Self(cells))
    }

    /// `(rows, cols)` of the board this solution covers.
    pub fn dims(&self) -> (Dimension, Dimension) {
        self.0.dim()
    }

    /// The timestep at which `location` is visited, if any.
    pub fn get(&self, location: Location) -> Option<Timestep> {
        self.0.get(location.as_index()).copied().flatten()
    }

    /// The underlying matrix.
    pub fn cells(&self) -> &Array2<Option<Timestep>> {
        &self.0
    }

    /// Nested rows with `-1` for unvisited cells.
    pub fn to_rows(&self) -> Vec<Vec<i64>> {
        self.0.rows()
            .into_iter()
            .map(|row| row.iter()
                .map(|visit| visit.map_or(-1, |t| t as i64))
                .collect_vec())
            .collect_vec()
    }

    /// Whether every cell is visited.
    pub fn is_complete(&self) -> bool {
        self.0.iter().all(Option::is_some)
    }

    /// Invert this matrix into the sequence of visited cells.
    pub fn to_tour(&self) -> Result<Tour> {
        let mut tour: Vec<Option<Location>> = vec![None; self.0.len()];

        for (ind, visit) in self.0.indexed_iter() {
            let location = Location::from(ind);
            let t = (*visit).ok_or_else(|| TourError::IncompleteSolution(format!("cell {location} is never visited")))?;
            let slot = tour.get_mut(t)
                .ok_or_else(|| TourError::IncompleteSolution(format!("timestep {t} at {location} is past the end")))?;

            if let Some(other) = slot.replace(location) {
                return Err(TourError::IncompleteSolution(format!("cells {other} and {location} share timestep {t}")));
            }
        }

        // every cell holds a distinct in-range timestep, so every slot is filled
        tour.into_iter()
            .collect::<Option<Vec<_>>>()
            .map(Tour)
            .ok_or_else(|| TourError::IncompleteSolution("some timestep is never reached".to_string()))
    }
}

impl Display for Solution {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let width = self.0.iter().flatten().max().map_or(1, |t| t.to_string().len());

        for row in self.0.rows() {
            let line = row.iter()
                .map(|visit| match visit {
                    Some(t) => format!("{t:>width$}"),
                    None => format!("{:>width$}", "."),
                })
                .join(" ");
            writeln!(f, "{line}")?;
        }

        Ok(())
    }
}

/// The cells of a tour in visiting order; entry `t` is the cell visited at timestep `t`.
///
/// Tours order lexicographically by their cells, which gives a reproducible choice of reference tour.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Tour(pub(crate) Vec<Location>);

impl Tour {
    /// Number of cells visited.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no cell is visited.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The cell visited at timestep `t`.
    pub fn at(&self, t: Timestep) -> Option<Location> {
        self.0.get(t).copied()
    }

    /// The cell visited at timestep 0.
    pub fn start(&self) -> Option<Location> {
        self.at(0)
    }

    /// Cells in visiting order.
    pub fn locations(&self) -> &[Location] {
        &self.0
    }

    /// Lay this tour out as a board matrix of `dims`. Cells off the board are ignored.
    pub fn to_solution(&self, dims: (Dimension, Dimension)) -> Solution {
        let mut cells = Array2::from_elem(dims, None);
        for (t, location) in self.0.iter().enumerate() {
            if let Some(slot) = cells.get_mut(location.as_index()) {
                *slot = Some(t);
            }
        }

        Solution(cells)
    }

    /// Check that this is a full knight's tour of `board` starting at `start`:
    /// one entry per cell, all distinct, consecutive entries a knight move apart.
    pub fn is_valid(&self, board: &Board, start: Location) -> bool {
        self.len() == board.cell_count()
            && self.start() == Some(start)
            && self.0.iter().all(|location| board.contains(*location))
            && self.0.iter().all_unique()
            && self.0.iter().tuple_windows().all(|(a, b)| board.is_knight_move(*a, *b))
    }
}

impl From<Vec<Location>> for Tour {
    fn from(locations: Vec<Location>) -> Self {
        Self(locations)
    }
}

/// Drop structurally identical solutions, keeping the first occurrence of each.
pub fn dedup_solutions(solutions: impl IntoIterator<Item = Solution>) -> Vec<Solution> {
    solutions.into_iter().unique().collect_vec()
}
