use itertools::Itertools;
use tracing::{debug, info, instrument};

use crate::board::Board;
use crate::builder::{check_constraint, TourBuilder};
use crate::error::{Result, TourError};
use crate::index::{AuxGroup, VarIndex};
use crate::location::{Dimension, Location};
use crate::logic::Encoding;
use crate::solver::{Engine, Formula, VarisatEngine};
use crate::tour::{dedup_solutions, Solution, Tour};
use crate::uniqueness::{leave_one_out, separating_constraints, Constraint, ReferencePolicy};

/// A Knight's Tour instance encoded as CNF, ready to be handed to an [`Engine`].
///
/// Build one with a [`TourBuilder`]. Every query loads the formula into a fresh engine, so a problem can be queried
/// any number of times.
///
/// # Logical setup
/// Let `x(c, t)` be the proposition "the knight is on cell `c` at timestep `t`", for every cell and every `t < T`,
/// where `T` is the number of cells.
///
/// 1. The knight is on the start cell at timestep 0.
/// 2. At every timestep the knight is on exactly one cell.
/// 3. Every cell is visited at exactly one timestep.
/// 4. For `t < T - 1`, `x(c, t)` implies `x(d, t + 1)` for some cell `d` one knight move from `c`.
///    If no such `d` exists on the board, `c` is a dead end and `x(c, t)` is forbidden outright.
///
/// Constraints added through the builder become unit clauses `x(c, t)`.
#[derive(Clone, Debug)]
pub struct TourProblem {
    board: Board,
    start: Location,
    encoding: Encoding,
    index: VarIndex,
    formula: Formula,
    constraints: Vec<Constraint>,
}

impl TourProblem {
    pub(crate) fn encode(
        board: Board,
        start: Location,
        encoding: Encoding,
        index: VarIndex,
        constraints: Vec<Constraint>,
    ) -> Self {
        let mut problem = Self {
            board,
            start,
            encoding,
            index,
            formula: Formula::new(),
            constraints: Vec::new(),
        };

        problem.formula.add_clause(vec![problem.index.var(start, 0).positive()]);
        problem.encode_cardinality();
        problem.encode_moves();
        for constraint in constraints {
            problem.assert_constraint(constraint);
        }

        debug!(
            rows = problem.board.rows(),
            cols = problem.board.cols(),
            %start,
            %encoding,
            variables = problem.index.len(),
            auxiliary = problem.index.auxiliary().len(),
            clauses = problem.formula.len(),
            "encoded knight's tour",
        );

        problem
    }

    fn encode_cardinality(&mut self) {
        let steps = self.index.steps();

        for t in 0..steps {
            // exactly one cell is visited at t
            let vars = self.board.cells().map(|location| self.index.var(location, t)).collect_vec();
            let index = &mut self.index;
            self.formula.extend(self.encoding.exactly_one(&vars, |position| {
                index.allocate_auxiliary(AuxGroup::Timestep(t), position)
            }));
        }

        for location in self.board.cells() {
            // this cell is visited at exactly one t
            let vars = (0..steps).map(|t| self.index.var(location, t)).collect_vec();
            let index = &mut self.index;
            self.formula.extend(self.encoding.exactly_one(&vars, |position| {
                index.allocate_auxiliary(AuxGroup::Cell(location), position)
            }));
        }
    }

    fn encode_moves(&mut self) {
        for t in 0..self.index.steps().saturating_sub(1) {
            for location in self.board.cells() {
                // x(c, t) => x(d_1, t + 1) + x(d_2, t + 1) + ...
                // = !x(c, t) + x(d_1, t + 1) + ...
                // with no destination d this is the unit clause !x(c, t)
                let mut clause = vec![self.index.var(location, t).negative()];
                clause.extend(self.board.moves_from(location).map(|destination| self.index.var(destination, t + 1).positive()));
                self.formula.add_clause(clause);
            }
        }
    }

    fn assert_constraint(&mut self, constraint: Constraint) {
        self.formula.add_clause(vec![self.index.var(constraint.location, constraint.timestep).positive()]);
        self.constraints.push(constraint);
    }

    /// The board geometry.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The cell visited at timestep 0.
    pub fn start(&self) -> Location {
        self.start
    }

    /// The cardinality encoding in use.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// The variable numbering of this problem.
    pub fn index(&self) -> &VarIndex {
        &self.index
    }

    /// Every clause of this problem.
    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    /// Constraints asserted on top of the tour rules.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Derive the problem with `constraints` asserted in addition to those already present.
    ///
    /// The formula of `self` is kept and the new constraints are appended as unit clauses.
    pub fn constrained(&self, constraints: &[Constraint]) -> Result<Self> {
        let mut problem = self.clone();
        for constraint in constraints {
            if problem.constraints.contains(constraint) {
                continue;
            }

            if let Some(reason) = check_constraint(problem.board.dims(), &problem.constraints, *constraint) {
                return Err(TourError::Invalid(vec![reason]));
            }

            problem.assert_constraint(*constraint);
        }

        Ok(problem)
    }

    /// Load every clause of this problem into `engine`.
    pub fn load<E: Engine>(&self, engine: &mut E) {
        engine.add_formula(&self.formula);
    }

    /// Find one tour, or `Ok(None)` if there is none.
    pub fn solve(&self) -> Result<Option<Solution>> {
        self.solve_with(VarisatEngine::new())
    }

    /// [`Self::solve`] on a caller-provided engine.
    #[instrument(skip_all, fields(start = %self.start, encoding = %self.encoding))]
    pub fn solve_with<E: Engine>(&self, mut engine: E) -> Result<Option<Solution>> {
        self.load(&mut engine);
        if !engine.solve()? {
            info!("no tour");
            return Ok(None);
        }

        let model = engine.model()
            .ok_or_else(|| TourError::Engine("satisfiable formula reported no model".to_string()))?;
        Solution::from_model(&model, &self.index).map(Some)
    }

    /// Every distinct tour, as board matrices. Empty if there is none.
    pub fn all_solutions(&self) -> Result<Vec<Solution>> {
        self.all_solutions_with(VarisatEngine::new())
    }

    /// [`Self::all_solutions`] on a caller-provided engine.
    ///
    /// Models that differ only in auxiliary variables map to the same board and are reported once.
    #[instrument(skip_all, fields(start = %self.start, encoding = %self.encoding))]
    pub fn all_solutions_with<E: Engine>(&self, mut engine: E) -> Result<Vec<Solution>> {
        self.load(&mut engine);
        let solutions = engine.enumerate_models()
            .map(|model| model.and_then(|model| Solution::from_model(&model, &self.index)))
            .process_results(|solutions| dedup_solutions(solutions))?;

        info!(solutions = solutions.len(), "enumerated tours");
        Ok(solutions)
    }

    /// Every distinct tour, as sequences of cells.
    pub fn all_tours(&self) -> Result<Vec<Tour>> {
        self.all_solutions()?.iter().map(Solution::to_tour).collect()
    }

    /// A set of constraints under which exactly one tour of this problem remains.
    ///
    /// Empty when there are fewer than two tours. See [`separating_constraints`] for how `policy` affects the result.
    pub fn uniqueness_constraints(&self, policy: ReferencePolicy) -> Result<Vec<Constraint>> {
        let tours = self.all_tours()?;
        Ok(separating_constraints(&tours, policy))
    }

    /// Re-solve with `constraints` and with every subset missing one of them, counting the tours left each time.
    pub fn check_separation(&self, constraints: &[Constraint]) -> Result<SeparationCheck> {
        let remaining = self.constrained(constraints)?.all_solutions()?.len();
        let leave_one_out = leave_one_out(constraints)
            .map(|subset| -> Result<usize> { Ok(self.constrained(&subset)?.all_solutions()?.len()) })
            .collect::<Result<Vec<_>>>()?;

        Ok(SeparationCheck { remaining, leave_one_out })
    }
}

/// Outcome of [`TourProblem::check_separation`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SeparationCheck {
    /// Tours left with every constraint asserted.
    pub remaining: usize,
    /// Tours left with the `i`-th constraint dropped, for every `i`.
    pub leave_one_out: Vec<usize>,
}

impl SeparationCheck {
    /// Whether exactly one tour survives the full set.
    pub fn is_unique(&self) -> bool {
        self.remaining == 1
    }

    /// Whether dropping any single constraint lets a second tour through.
    pub fn is_irredundant(&self) -> bool {
        self.leave_one_out.iter().all(|count| *count >= 2)
    }
}

/// Number of distinct tours of a `dims` board from every start cell, in row-major order of the start.
pub fn count_tours(dims: (Dimension, Dimension), encoding: Encoding) -> Result<Vec<(Location, usize)>> {
    let (rows, cols) = dims;
    (0..rows)
        .flat_map(|row| (0..cols).map(move |col| Location(row, col)))
        .map(|start| -> Result<(Location, usize)> {
            let problem = TourBuilder::with_dims(dims).start_at(start).encoding(encoding).build()?;
            Ok((start, problem.all_solutions()?.len()))
        })
        .collect()
}
