//! Validated construction of [`TourProblem`]s.

use crate::board::Board;
use crate::error::{BuilderInvalidReason, Result, TourError};
use crate::index::VarIndex;
use crate::location::{Dimension, Location};
use crate::logic::Encoding;
use crate::problem::TourProblem;
use crate::uniqueness::Constraint;

/// A builder for Knight's Tour problems on rectangular boards.
///
/// Builders mutate themselves while building but can be [`Clone`]d to save their state at some point.
/// Parameters are checked as they are set, so malformed input is reported by [`build`](Self::build) before any clause
/// is produced.
#[derive(Clone, Debug)]
pub struct TourBuilder {
    // rows, cols
    dims: (Dimension, Dimension),
    start: Location,
    encoding: Encoding,
    constraints: Vec<Constraint>,
    invalid_reasons: Vec<BuilderInvalidReason>,
}

impl Default for TourBuilder {
    fn default() -> Self {
        Self::with_dims((5, 5))
    }
}

impl TourBuilder {
    /// Construct a new [`Self`] with the specified dimensions, specified in `(rows, cols)` order.
    ///
    /// The knight starts at `Location(0, 0)` unless [`start_at`](Self::start_at) says otherwise, so a board with no
    /// cells is invalid from the outset.
    pub fn with_dims(dims: (Dimension, Dimension)) -> Self {
        let mut builder = Self {
            dims,
            start: Location(0, 0),
            encoding: Default::default(),
            constraints: Default::default(),
            invalid_reasons: Default::default(),
        };

        if !builder.contains(builder.start) {
            builder.invalid_reasons.push(BuilderInvalidReason::StartOutOfBounds);
        }

        builder
    }

    /// Set the cell visited at timestep 0.
    ///
    /// May cause the builder to enter a [`StartOutOfBounds`](BuilderInvalidReason::StartOutOfBounds) invalid state.
    /// If the builder is already in an invalid state, this function does nothing.
    pub fn start_at(&mut self, location: Location) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        if !self.contains(location) {
            self.invalid_reasons.push(BuilderInvalidReason::StartOutOfBounds);
            return self;
        }

        self.start = location;
        self
    }

    /// Select the cardinality encoding. Any choice yields the same tours.
    pub fn encoding(&mut self, encoding: Encoding) -> &mut Self {
        self.encoding = encoding;
        self
    }

    /// Force the knight onto `constraint.location` at `constraint.timestep`. Repeating a constraint has no effect.
    ///
    /// May cause the builder to enter a [`ConstraintOutOfBounds`](BuilderInvalidReason::ConstraintOutOfBounds) or
    /// [`ConflictingConstraints`](BuilderInvalidReason::ConflictingConstraints) invalid state.
    /// If the builder is already in an invalid state, this function does nothing.
    pub fn constrain(&mut self, constraint: Constraint) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        match check_constraint(self.dims, &self.constraints, constraint) {
            Some(reason) => self.invalid_reasons.push(reason),
            None => {
                if !self.constraints.contains(&constraint) {
                    self.constraints.push(constraint);
                }
            }
        }

        self
    }

    /// Shorthand for multiple calls to [`Self::constrain`], with the same conditions.
    pub fn constrain_all(&mut self, constraints: impl IntoIterator<Item = Constraint>) -> &mut Self {
        for constraint in constraints {
            self.constrain(constraint);
        }

        self
    }

    /// Check the validity of this builder.
    ///
    /// Returns `None` if the builder is valid, `Some(&Vec<BuilderInvalidReason>)` otherwise.
    pub fn is_valid(&self) -> Option<&Vec<BuilderInvalidReason>> {
        if self.invalid_reasons.is_empty() {
            None
        } else {
            Some(&self.invalid_reasons)
        }
    }

    /// Encode the problem described by this builder.
    /// If the builder is invalid for any reason, [`TourError::Invalid`] lists why.
    pub fn build(&self) -> Result<TourProblem> {
        if !self.invalid_reasons.is_empty() {
            return Err(TourError::Invalid(self.invalid_reasons.clone()));
        }

        // one timestep per cell
        let index = self.dims.0.checked_mul(self.dims.1)
            .and_then(|cells| VarIndex::allocate(self.dims, cells))
            .ok_or_else(|| TourError::Invalid(vec![BuilderInvalidReason::TooLarge]))?;

        Ok(TourProblem::encode(
            Board::with_dims(self.dims),
            self.start,
            self.encoding,
            index,
            self.constraints.clone(),
        ))
    }

    #[inline]
    fn contains(&self, location: Location) -> bool {
        location.0 < self.dims.0 && location.1 < self.dims.1
    }
}

/// Check `constraint` against a board of `dims` and the constraints already in force.
pub(crate) fn check_constraint(
    dims: (Dimension, Dimension),
    existing: &[Constraint],
    constraint: Constraint,
) -> Option<BuilderInvalidReason> {
    let in_time = dims.0.checked_mul(dims.1).is_some_and(|steps| constraint.timestep < steps);
    if !in_time || constraint.location.0 >= dims.0 || constraint.location.1 >= dims.1 {
        return Some(BuilderInvalidReason::ConstraintOutOfBounds);
    }

    // at most one cell per timestep
    if existing.iter().any(|other| other.timestep == constraint.timestep && other.location != constraint.location) {
        return Some(BuilderInvalidReason::ConflictingConstraints);
    }

    None
}
