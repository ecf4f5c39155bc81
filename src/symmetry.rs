//! Equivalence of solutions under the reflections of the board.

use ndarray::Array2;
use strum::VariantArray;

use crate::tour::Solution;

/// The reflections mapping a rectangular board onto itself.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, VariantArray)]
pub enum Reflection {
    /// Leave every cell in place.
    Identity,
    /// Mirror across the vertical axis, `(i, j) -> (i, cols - 1 - j)`.
    Vertical,
    /// Mirror across the horizontal axis, `(i, j) -> (rows - 1 - i, j)`.
    Horizontal,
    /// Point reflection through the center, both of the above.
    Central,
}

impl Solution {
    /// The solution obtained by moving every cell's timestep to its image under `reflection`.
    pub fn reflect(&self, reflection: Reflection) -> Self {
        let (rows, cols) = self.dims();
        Self(Array2::from_shape_fn((rows, cols), |(i, j)| match reflection {
            Reflection::Identity => self.0[(i, j)],
            Reflection::Vertical => self.0[(i, cols - 1 - j)],
            Reflection::Horizontal => self.0[(rows - 1 - i, j)],
            Reflection::Central => self.0[(rows - 1 - i, cols - 1 - j)],
        }))
    }
}

/// Whether some reflection of `b` is `a`.
pub fn are_equivalent(a: &Solution, b: &Solution) -> bool {
    Reflection::VARIANTS.iter().any(|reflection| b.reflect(*reflection) == *a)
}

/// Partition `solutions` into classes of equivalent solutions, each led by its first member in input order.
pub fn group_by_symmetry(solutions: &[Solution]) -> Vec<Vec<&Solution>> {
    let mut groups: Vec<Vec<&Solution>> = Vec::new();

    for solution in solutions {
        match groups.iter_mut().find(|group| are_equivalent(solution, group[0])) {
            Some(group) => group.push(solution),
            None => groups.push(vec![solution]),
        }
    }

    groups
}

/// Number of distinct solutions up to reflection.
pub fn count_up_to_symmetry(solutions: &[Solution]) -> usize {
    group_by_symmetry(solutions).len()
}
