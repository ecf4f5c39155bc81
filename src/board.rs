use itertools::iproduct;
use petgraph::graphmap::UnGraphMap;

use crate::location::{Dimension, Location};
use crate::step::KnightStep;

/// The geometry of a rectangular board, held as the undirected graph of knight moves between its cells.
///
/// Every cell is a vertex, including cells from which no move stays on the board.
#[derive(Clone, Debug)]
pub struct Board {
    pub(crate) graph: UnGraphMap<Location, ()>,
    // rows, cols
    pub(crate) dims: (Dimension, Dimension),
}

impl Board {
    /// Construct the move graph of a board with `dims` given in `(rows, cols)` order.
    pub fn with_dims(dims: (Dimension, Dimension)) -> Self {
        let mut graph = UnGraphMap::with_capacity(
            dims.0 * dims.1,
            // each cell has at most four forward moves
            dims.0 * dims.1 * KnightStep::FORWARD_VARIANTS.len(),
        );

        for location in iproduct!(0..dims.0, 0..dims.1).map(Location::from) {
            graph.add_node(location);
        }

        // add only forward moves; the reverse direction is the same undirected edge
        for location in iproduct!(0..dims.0, 0..dims.1).map(Location::from) {
            for step in KnightStep::FORWARD_VARIANTS {
                let destination = step.attempt_from(location);
                if destination.0 < dims.0 && destination.1 < dims.1 {
                    graph.add_edge(location, destination, ());
                }
            }
        }

        Self { graph, dims }
    }

    /// `(rows, cols)` of this board.
    pub fn dims(&self) -> (Dimension, Dimension) {
        self.dims
    }

    /// Number of rows.
    pub fn rows(&self) -> Dimension {
        self.dims.0
    }

    /// Number of columns.
    pub fn cols(&self) -> Dimension {
        self.dims.1
    }

    /// Number of cells, which is also the number of timesteps in a full tour.
    pub fn cell_count(&self) -> usize {
        self.dims.0 * self.dims.1
    }

    /// Whether `location` lies on this board.
    pub fn contains(&self, location: Location) -> bool {
        location.0 < self.dims.0 && location.1 < self.dims.1
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Location> {
        iproduct!(0..self.dims.0, 0..self.dims.1).map(Location::from)
    }

    /// Every cell reachable from `location` in a single knight move without leaving the board.
    pub fn moves_from(&self, location: Location) -> impl Iterator<Item = Location> + '_ {
        self.graph.neighbors(location)
    }

    /// Whether `a` and `b` are one knight move apart on this board.
    pub fn is_knight_move(&self, a: Location, b: Location) -> bool {
        self.graph.contains_edge(a, b)
    }
}
