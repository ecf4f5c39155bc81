//! Error types for encoding, solving and tour extraction.

use thiserror::Error;

use crate::location::Location;
use crate::index::Timestep;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TourError>;

/// Reasons a [`TourBuilder`](crate::builder::TourBuilder) may become invalid while building.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BuilderInvalidReason {
    /// The start cell lies outside the board (always the case on an empty board).
    StartOutOfBounds,
    /// The number of variables, `rows * cols * rows * cols`, does not fit in memory addressing.
    TooLarge,
    /// An extra constraint names a cell outside the board or a timestep past the end of the tour.
    ConstraintOutOfBounds,
    /// Two extra constraints force different cells at the same timestep.
    ConflictingConstraints,
}

/// Errors that abort an operation. Unsatisfiable formulas are not errors.
#[derive(Debug, Error)]
pub enum TourError {
    /// Malformed board parameters, detected before any clause is built
    #[error("invalid tour parameters: {0:?}")]
    Invalid(Vec<BuilderInvalidReason>),

    /// A model sets more than one timestep for one cell
    #[error("model visits cell {location} at timesteps {first} and {second}")]
    AmbiguousModel {
        /// The cell read twice.
        location: Location,
        /// The earlier timestep found.
        first: Timestep,
        /// The later timestep found.
        second: Timestep,
    },

    /// A board matrix cannot be read as a full tour
    #[error("solution is not a full tour: {0}")]
    IncompleteSolution(String),

    /// The solving engine failed
    #[error("SAT engine error: {0}")]
    Engine(String),
}
