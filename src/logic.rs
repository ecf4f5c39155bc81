use itertools::Itertools;
use strum::{Display, EnumString, VariantArray};
use varisat::{Lit, Var};

/// How "exactly one of these literals is true" is expressed in CNF.
///
/// Both encodings admit exactly the same assignments of the input literals; they differ only in size.
/// Parses from `"naive"`/`"n"` and `"sequential-counter"`/`"sc"`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Display, EnumString, VariantArray)]
pub enum Encoding {
    /// One at-least-one clause and a binary exclusion clause for every pair, `O(k²)` clauses.
    #[default]
    #[strum(to_string = "naive", serialize = "n")]
    Naive,
    /// One at-least-one clause and a running "seen one" counter over `k - 1` auxiliary variables, `O(k)` clauses.
    #[strum(to_string = "sequential-counter", serialize = "sc")]
    SequentialCounter,
}

impl Encoding {
    /// Clauses forcing exactly one of `vars` true.
    ///
    /// `fresh` is called with positions `0..k - 1` whenever the encoding needs auxiliary variables.
    pub(crate) fn exactly_one(&self, vars: &[Var], fresh: impl FnMut(usize) -> Var) -> Vec<Vec<Lit>> {
        match self {
            Self::Naive => exactly_one(vars),
            Self::SequentialCounter => exactly_one_sequential(vars, fresh),
        }
    }
}

pub(crate) fn exactly_one(vars: &[Var]) -> Vec<Vec<Lit>> {
    let mut clauses = Vec::with_capacity(vars.len() * vars.len().saturating_sub(1) / 2 + 1);

    // at least one var is true; A + B + C + ...
    clauses.push(vars.iter().map(|v| v.positive()).collect_vec());
    // no two are true; (!A + !B) * (!A + !C) * ...
    clauses.extend(vars.iter()
        .tuple_combinations()
        .map(|(a, b)| vec![a.negative(), b.negative()])
    );

    clauses
}

pub(crate) fn exactly_one_sequential(vars: &[Var], mut fresh: impl FnMut(usize) -> Var) -> Vec<Vec<Lit>> {
    let k = vars.len();
    let mut clauses = Vec::with_capacity(3 * k);

    // at least one var is true; for a single var this is the unit clause A
    clauses.push(vars.iter().map(|v| v.positive()).collect_vec());
    if k <= 1 {
        return clauses;
    }

    if k == 2 {
        clauses.push(vec![vars[0].negative(), vars[1].negative()]);
        return clauses;
    }

    // S_l is true once any of X_0..=X_l is
    let seen = (0..k - 1).map(&mut fresh).collect_vec();

    // X_0 => S_0
    clauses.push(vec![vars[0].negative(), seen[0].positive()]);
    for l in 1..k - 1 {
        // X_l => S_l
        clauses.push(vec![vars[l].negative(), seen[l].positive()]);
        // S_{l-1} => S_l
        clauses.push(vec![seen[l - 1].negative(), seen[l].positive()]);
        // X_l => !S_{l-1}, nothing earlier may be true alongside X_l
        clauses.push(vec![vars[l].negative(), seen[l - 1].negative()]);
    }
    // X_{k-1} => !S_{k-2}
    clauses.push(vec![vars[k - 1].negative(), seen[k - 2].negative()]);

    clauses
}
