use strum::VariantArray;

use crate::location::Location;

/// The eight moves of a knight, named by the two unit steps of the long leg followed by the short one.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum KnightStep {
    /// Two rows up, one column left.
    UpUpLeft,
    /// Two rows up, one column right.
    UpUpRight,
    /// One row up, two columns left.
    UpLeftLeft,
    /// One row up, two columns right.
    UpRightRight,
    /// One row down, two columns left.
    DownLeftLeft,
    /// One row down, two columns right.
    DownRightRight,
    /// Two rows down, one column left.
    DownDownLeft,
    /// Two rows down, one column right.
    DownDownRight,
}

impl KnightStep {
    /// `(row, col)` displacement of this move.
    pub fn offset(&self) -> (isize, isize) {
        match self {
            Self::UpUpLeft => (-2, -1),
            Self::UpUpRight => (-2, 1),
            Self::UpLeftLeft => (-1, -2),
            Self::UpRightRight => (-1, 2),
            Self::DownLeftLeft => (1, -2),
            Self::DownRightRight => (1, 2),
            Self::DownDownLeft => (2, -1),
            Self::DownDownRight => (2, 1),
        }
    }

    /// Attempt the move from `location`. The result may lie off the board; see [`Board::contains`](crate::Board::contains).
    pub fn attempt_from(&self, location: Location) -> Location {
        location.offset_by(self.offset())
    }

    /// Forward moves are those whose destination is indexed higher than the origin in row-major order.
    /// Every undirected move on a board is exactly one forward move from its lower endpoint.
    pub const FORWARD_VARIANTS: &'static [Self] = &[
        Self::DownLeftLeft,
        Self::DownRightRight,
        Self::DownDownLeft,
        Self::DownDownRight,
    ];
}
