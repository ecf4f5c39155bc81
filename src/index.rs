use varisat::Var;

use crate::location::{Dimension, Location};

/// A point in time along a tour; timestep `t` is the `t`-th cell visited, starting at 0.
pub type Timestep = usize;

// comfortably below the literal width of the SAT engine
const MAX_VARIABLES: usize = 1 << 28;

/// The group of literals an auxiliary counter variable belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AuxGroup {
    /// "Exactly one cell is visited at this timestep."
    Timestep(Timestep),
    /// "This cell is visited at exactly one timestep."
    Cell(Location),
}

/// Tag of an auxiliary variable: its group and its position inside the group's counter.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct AuxTag {
    /// The cardinality group this counter serves.
    pub group: AuxGroup,
    /// Position of the counter cell inside its group.
    pub position: usize,
}

/// What a variable of a [`VarIndex`] stands for.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Variable {
    /// The knight is on `location` at `timestep`.
    Visit {
        /// The occupied cell.
        location: Location,
        /// When it is occupied.
        timestep: Timestep,
    },
    /// A counter cell of the sequential-counter encoding.
    Auxiliary(AuxTag),
}

/// Dense mapping between propositions and SAT variables.
///
/// Primary variables come first: the proposition "cell `(i, j)` is visited at `t`" is the variable with index
/// `t * rows * cols + i * cols + j`, i.e. DIMACS id one higher, enumerated timestep-major, then by row, then by column.
/// Auxiliary variables are appended after all primary ones, in allocation order, each remembering its [`AuxTag`].
#[derive(Clone, Debug)]
pub struct VarIndex {
    // rows, cols
    dims: (Dimension, Dimension),
    steps: Timestep,
    primary: usize,
    auxiliary: Vec<AuxTag>,
}

impl VarIndex {
    /// Allocate primary variables for every cell of a `dims` board at every timestep in `0..steps`.
    ///
    /// Returns [`None`] if the variables would not fit the engine.
    pub fn allocate(dims: (Dimension, Dimension), steps: Timestep) -> Option<Self> {
        let primary = dims.0.checked_mul(dims.1)?.checked_mul(steps)?;
        if primary > MAX_VARIABLES {
            return None;
        }

        Some(Self {
            dims,
            steps,
            primary,
            auxiliary: Vec::new(),
        })
    }

    /// `(rows, cols)` of the indexed board.
    pub fn dims(&self) -> (Dimension, Dimension) {
        self.dims
    }

    /// Number of timesteps covered by primary variables.
    pub fn steps(&self) -> Timestep {
        self.steps
    }

    /// Number of visit variables, which precede every auxiliary one.
    pub fn primary_count(&self) -> usize {
        self.primary
    }

    /// Number of variables allocated so far, primary and auxiliary.
    pub fn len(&self) -> usize {
        self.primary + self.auxiliary.len()
    }

    /// Whether no variable is allocated.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// DIMACS id the next allocated variable will receive.
    pub fn next_free(&self) -> usize {
        self.len() + 1
    }

    /// The variable for "`location` is visited at `timestep`".
    #[inline]
    pub fn var(&self, location: Location, timestep: Timestep) -> Var {
        debug_assert!(location.0 < self.dims.0 && location.1 < self.dims.1 && timestep < self.steps);
        Var::from_index(timestep * self.dims.0 * self.dims.1 + location.flat(self.dims.1))
    }

    /// Append a fresh auxiliary variable tagged with `group` and `position`.
    pub fn allocate_auxiliary(&mut self, group: AuxGroup, position: usize) -> Var {
        let var = Var::from_index(self.len());
        self.auxiliary.push(AuxTag { group, position });
        var
    }

    /// The auxiliary variables allocated so far, in allocation order.
    pub fn auxiliary(&self) -> &[AuxTag] {
        &self.auxiliary
    }

    /// Trace `var` back to the proposition it was allocated for.
    pub fn describe(&self, var: Var) -> Option<Variable> {
        let index = var.index();
        if index < self.primary {
            let cells = self.dims.0 * self.dims.1;
            let offset = index % cells;
            Some(Variable::Visit {
                location: Location(offset / self.dims.1, offset % self.dims.1),
                timestep: index / cells,
            })
        } else {
            self.auxiliary.get(index - self.primary).copied().map(Variable::Auxiliary)
        }
    }
}
