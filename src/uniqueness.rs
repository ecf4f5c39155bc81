//! Separating constraint sets: forced `(timestep, cell)` facts that leave exactly one tour of a known set.

use std::fmt::{Display, Formatter};

use itertools::Itertools;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{thread_rng, SeedableRng};
use tracing::{debug, instrument, warn};

use crate::index::Timestep;
use crate::location::{Coord, Location};
use crate::tour::Tour;

/// "The knight is on `location` at `timestep`."
///
/// Ordered by timestep first.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Constraint {
    /// When the knight must be on `location`.
    pub timestep: Timestep,
    /// Where the knight must be at `timestep`.
    pub location: Location,
}

impl Constraint {
    /// Force `location` at `timestep`.
    pub fn new(timestep: Timestep, location: Location) -> Self {
        Self { timestep, location }
    }

    /// `(timestep, row, col)`
    pub fn as_triple(&self) -> (Timestep, Coord, Coord) {
        (self.timestep, self.location.0, self.location.1)
    }

    /// Whether `tour` satisfies this constraint.
    pub fn admits(&self, tour: &Tour) -> bool {
        tour.at(self.timestep) == Some(self.location)
    }
}

impl From<(Timestep, Coord, Coord)> for Constraint {
    fn from((timestep, row, col): (Timestep, Coord, Coord)) -> Self {
        Self::new(timestep, Location(row, col))
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at t={}", self.location, self.timestep)
    }
}

/// How the tour kept alive by a separating constraint set is chosen.
///
/// The resulting set depends on this choice. Only [`Smallest`](Self::Smallest) and [`Seeded`](Self::Seeded) make
/// [`separating_constraints`] reproducible; with [`Entropy`](Self::Entropy), repeated calls on the same tours may
/// return different sets, each valid and irredundant for its own reference.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ReferencePolicy {
    /// The lexicographically smallest tour.
    Smallest,
    /// A uniform choice driven by a [`StdRng`] seeded with this value.
    Seeded(u64),
    /// A uniform choice driven by the thread-local OS-seeded generator.
    Entropy,
}

impl ReferencePolicy {
    /// Pick the reference among `tours`, or [`None`] if there is none.
    pub fn choose<'t>(&self, tours: &'t [Tour]) -> Option<&'t Tour> {
        match self {
            Self::Smallest => tours.iter().min(),
            Self::Seeded(seed) => tours.choose(&mut StdRng::seed_from_u64(*seed)),
            Self::Entropy => tours.choose(&mut thread_rng()),
        }
    }
}

/// Whether `tour` satisfies every constraint.
pub fn consistent(tour: &Tour, constraints: &[Constraint]) -> bool {
    constraints.iter().all(|constraint| constraint.admits(tour))
}

/// Whether `constraints` admit `reference` and no other tour of `tours`.
pub fn separates(tours: &[Tour], reference: &Tour, constraints: &[Constraint]) -> bool {
    consistent(reference, constraints)
        && tours.iter()
        .filter(|tour| *tour != reference)
        .all(|tour| !consistent(tour, constraints))
}

/// Compute a set of constraints admitting exactly one of `tours`, chosen by `policy`.
///
/// Duplicate tours are ignored; fewer than two distinct tours need no constraint.
/// The set is sorted by timestep, and dropping any single constraint re-admits at least one other tour.
/// Tours are expected to share their start; the start cell is only constrained if two tours differ nowhere else.
#[instrument(skip_all, fields(tours = tours.len(), policy = ?policy))]
pub fn separating_constraints(tours: &[Tour], policy: ReferencePolicy) -> Vec<Constraint> {
    let tours = tours.iter().unique().cloned().collect_vec();
    if tours.len() <= 1 {
        return Vec::new();
    }

    match policy.choose(&tours) {
        Some(reference) => separate_from(&tours, reference),
        None => Vec::new(),
    }
}

/// Compute an irredundant set of constraints admitting `reference` and no other tour of `tours`.
///
/// Alternatives are processed in the order given. An alternative already contradicting the constraints gathered so
/// far costs nothing; any other one is cut off at the first timestep where it leaves `reference`.
/// A final pass drops constraints made redundant by ones added after them.
pub fn separate_from(tours: &[Tour], reference: &Tour) -> Vec<Constraint> {
    let mut constraints: Vec<Constraint> = Vec::new();

    for alternative in tours.iter().filter(|tour| *tour != reference) {
        if !consistent(alternative, &constraints) {
            debug!("alternative already excluded");
            continue;
        }

        match first_divergence(reference, alternative) {
            Some(constraint) => {
                debug!(%constraint, "alternative still admitted, adding constraint");
                constraints.push(constraint);
            }
            None => warn!("alternative tour does not differ from the reference"),
        }
    }

    let mut position = 0;
    while position < constraints.len() {
        let removed = constraints.remove(position);
        if separates(tours, reference, &constraints) {
            debug!(constraint = %removed, "dropping redundant constraint");
        } else {
            constraints.insert(position, removed);
            position += 1;
        }
    }

    constraints.sort();
    constraints
}

fn first_divergence(reference: &Tour, alternative: &Tour) -> Option<Constraint> {
    // t = 0 is the shared start, so it is only considered last
    (1..reference.len()).chain(0..reference.len().min(1))
        .find(|t| alternative.at(*t) != reference.at(*t))
        .and_then(|t| reference.at(t).map(|location| Constraint::new(t, location)))
}

/// Every subset of `constraints` that omits exactly one of them, in order of the omitted constraint.
pub fn leave_one_out(constraints: &[Constraint]) -> impl Iterator<Item = Vec<Constraint>> + '_ {
    (0..constraints.len()).map(move |skipped| constraints.iter()
        .enumerate()
        .filter(|(position, _)| *position != skipped)
        .map(|(_, constraint)| *constraint)
        .collect_vec())
}
