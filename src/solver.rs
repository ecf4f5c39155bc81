use std::iter::FusedIterator;

use itertools::Itertools;
use tracing::trace;
use varisat::{CnfFormula, ExtendFormula, Lit, Solver, Var};

use crate::error::{Result, TourError};

/// An append-only conjunction of clauses.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Formula {
    clauses: Vec<Vec<Lit>>,
}

impl Formula {
    /// An empty formula.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one disjunction.
    pub fn add_clause(&mut self, clause: Vec<Lit>) {
        self.clauses.push(clause);
    }

    /// The clauses in insertion order.
    pub fn clauses(&self) -> &[Vec<Lit>] {
        &self.clauses
    }

    /// Number of clauses.
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Whether no clause was added.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Copy the clauses into a [`CnfFormula`] for `varisat`.
    pub fn to_cnf(&self) -> CnfFormula {
        CnfFormula::from(self.clauses.clone())
    }
}

impl Extend<Vec<Lit>> for Formula {
    fn extend<T: IntoIterator<Item = Vec<Lit>>>(&mut self, iter: T) {
        self.clauses.extend(iter)
    }
}

/// A complete truth assignment; entry `v - 1` holds the value of the variable with DIMACS id `v`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Model(Vec<bool>);

impl Model {
    /// Read a model as reported by `varisat`, one literal per variable.
    pub fn from_lits(lits: &[Lit]) -> Self {
        let mut values = vec![false; lits.len()];
        for lit in lits {
            let index = lit.var().index();
            if index >= values.len() {
                values.resize(index + 1, false);
            }
            values[index] = lit.is_positive();
        }

        Self(values)
    }

    /// Value of `var`; variables the engine never saw read as false.
    #[inline]
    pub fn value(&self, var: Var) -> bool {
        self.0.get(var.index()).copied().unwrap_or(false)
    }

    /// Number of variables assigned.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no variable is assigned.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Variables set to true, in index order.
    pub fn true_vars(&self) -> impl Iterator<Item = Var> + '_ {
        self.0.iter().positions(|value| *value).map(Var::from_index)
    }

    /// The clause ruling out exactly this assignment.
    pub(crate) fn blocking_clause(&self) -> Vec<Lit> {
        self.0.iter()
            .enumerate()
            .map(|(index, value)| Var::from_index(index).lit(!value))
            .collect_vec()
    }
}

impl From<Vec<bool>> for Model {
    fn from(values: Vec<bool>) -> Self {
        Self(values)
    }
}

/// The boundary to a SAT solving engine.
///
/// Clauses only ever accumulate. [`solve`](Engine::solve) may be called again after more clauses are added.
pub trait Engine {
    /// Append one disjunctive clause.
    fn add_clause(&mut self, clause: &[Lit]);

    /// Append every clause of `formula`.
    fn add_formula(&mut self, formula: &Formula) {
        for clause in formula.clauses() {
            self.add_clause(clause);
        }
    }

    /// Whether the clauses added so far are satisfiable.
    fn solve(&mut self) -> Result<bool>;

    /// The satisfying assignment found by the last [`solve`](Engine::solve), if it returned `true`.
    fn model(&self) -> Option<Model>;

    /// Every distinct satisfying assignment over all variables, auxiliary ones included.
    ///
    /// Enumeration blocks each model as it is produced, so it can neither be restarted nor shared with another query on
    /// this engine; drain or drop the iterator first.
    fn enumerate_models(&mut self) -> Models<'_, Self>
    where
        Self: Sized,
    {
        Models {
            engine: self,
            exhausted: false,
        }
    }
}

/// One-shot producer of models, see [`Engine::enumerate_models`].
pub struct Models<'e, E: Engine> {
    engine: &'e mut E,
    exhausted: bool,
}

impl<E: Engine> Iterator for Models<'_, E> {
    type Item = Result<Model>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        match self.engine.solve() {
            Ok(true) => {}
            Ok(false) => {
                self.exhausted = true;
                return None;
            }
            Err(err) => {
                self.exhausted = true;
                return Some(Err(err));
            }
        }

        let Some(model) = self.engine.model() else {
            self.exhausted = true;
            return Some(Err(TourError::Engine("satisfiable formula reported no model".to_string())));
        };

        trace!(true_vars = model.true_vars().count(), "enumerated model");
        self.engine.add_clause(&model.blocking_clause());
        Some(Ok(model))
    }
}

impl<E: Engine> FusedIterator for Models<'_, E> {}

/// [`Engine`] backed by the CDCL solver of [`varisat`].
pub struct VarisatEngine<'a> {
    solver: Solver<'a>,
}

impl VarisatEngine<'_> {
    /// A fresh solver with no clauses.
    pub fn new() -> Self {
        Self { solver: Solver::new() }
    }
}

impl Default for VarisatEngine<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for VarisatEngine<'_> {
    fn add_clause(&mut self, clause: &[Lit]) {
        self.solver.add_clause(clause);
    }

    fn add_formula(&mut self, formula: &Formula) {
        self.solver.add_formula(&formula.to_cnf());
    }

    fn solve(&mut self) -> Result<bool> {
        self.solver.solve().map_err(|err| TourError::Engine(format!("{err:?}")))
    }

    fn model(&self) -> Option<Model> {
        self.solver.model().map(|lits| Model::from_lits(&lits))
    }
}
