//! Pure coordinate math: cells, bounds, topology, line tracing, edges.
//!
//! Nothing in here knows about tokens, walls, or light. Out-of-bounds inputs
//! are the caller's responsibility to filter; these functions have no failure
//! states.

mod edge;
mod line;

pub use edge::{Edge, Side};
pub use line::supercover_line;

use std::fmt;

/// Discrete grid position expressed in cell coordinates.
///
/// `y` grows downward (row index), matching the board's row-major storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Bounded grid extent in columns and rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridDimensions {
    pub cols: u32,
    pub rows: u32,
}

impl GridDimensions {
    pub const fn new(cols: u32, rows: u32) -> Self {
        Self { cols, rows }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.cols as i32 && cell.y < self.rows as i32
    }

    /// Row-major index into per-cell arrays (light levels, height map, mask).
    ///
    /// Callers guarantee `contains(cell)`.
    pub fn index(&self, cell: Cell) -> usize {
        cell.y as usize * self.cols as usize + cell.x as usize
    }

    pub fn cell_count(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    /// Iterates every in-bounds cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let cols = self.cols as i32;
        let rows = self.rows as i32;
        (0..rows).flat_map(move |y| (0..cols).map(move |x| Cell::new(x, y)))
    }
}

/// Grid topology, chosen once per board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Topology {
    #[default]
    Square,
    /// Pointy-top hexes in odd-r offset coordinates.
    Hex,
}

impl Topology {
    /// Topology-correct cell distance: Chebyshev on squares, ring distance
    /// on hexes.
    pub fn distance(self, a: Cell, b: Cell) -> u32 {
        match self {
            Topology::Square => chebyshev(a, b),
            Topology::Hex => {
                let (aq, ar) = offset_to_axial(a);
                let (bq, br) = offset_to_axial(b);
                let dq = aq - bq;
                let dr = ar - br;
                ((dq.abs() + dr.abs() + (dq + dr).abs()) / 2) as u32
            }
        }
    }

    /// Ordered sequence of cells a straight ray crosses from `a` to `b`,
    /// inclusive of both endpoints. Deterministic and recomputed per call.
    pub fn line(self, a: Cell, b: Cell) -> Vec<Cell> {
        match self {
            Topology::Square => supercover_line(a, b),
            Topology::Hex => line::hex_line(a, b),
        }
    }

    /// In-bounds adjacent cells: 4 or 8 on squares, always 6 on hexes.
    pub fn neighbors(self, cell: Cell, bounds: GridDimensions, diagonals: bool) -> Vec<Cell> {
        let deltas: &[(i32, i32)] = match self {
            Topology::Square if diagonals => &[
                (1, 0),
                (-1, 0),
                (0, 1),
                (0, -1),
                (1, 1),
                (1, -1),
                (-1, 1),
                (-1, -1),
            ],
            Topology::Square => &[(1, 0), (-1, 0), (0, 1), (0, -1)],
            Topology::Hex => {
                if cell.y.rem_euclid(2) == 0 {
                    &[(1, 0), (-1, 0), (0, -1), (-1, -1), (0, 1), (-1, 1)]
                } else {
                    &[(1, 0), (-1, 0), (1, -1), (0, -1), (1, 1), (0, 1)]
                }
            }
        };

        deltas
            .iter()
            .map(|&(dx, dy)| cell.offset(dx, dy))
            .filter(|c| bounds.contains(*c))
            .collect()
    }
}

/// Chebyshev distance: diagonal steps cost the same as cardinal ones.
pub fn chebyshev(a: Cell, b: Cell) -> u32 {
    (a.x - b.x).abs().max((a.y - b.y).abs()) as u32
}

/// Odd-r offset to axial coordinates.
fn offset_to_axial(c: Cell) -> (i32, i32) {
    let q = c.x - (c.y - c.y.rem_euclid(2)) / 2;
    (q, c.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chebyshev_counts_diagonals_as_one() {
        assert_eq!(chebyshev(Cell::new(0, 0), Cell::new(3, 3)), 3);
        assert_eq!(chebyshev(Cell::new(5, 5), Cell::new(8, 5)), 3);
    }

    #[test]
    fn square_neighbors_respect_bounds() {
        let bounds = GridDimensions::new(3, 3);
        let corner = Topology::Square.neighbors(Cell::ORIGIN, bounds, true);
        assert_eq!(corner.len(), 3);
        let center = Topology::Square.neighbors(Cell::new(1, 1), bounds, true);
        assert_eq!(center.len(), 8);
        let cardinal = Topology::Square.neighbors(Cell::new(1, 1), bounds, false);
        assert_eq!(cardinal.len(), 4);
    }

    #[test]
    fn hex_always_has_six_neighbors_inside() {
        let bounds = GridDimensions::new(10, 10);
        for cell in [Cell::new(4, 4), Cell::new(4, 5)] {
            assert_eq!(Topology::Hex.neighbors(cell, bounds, true).len(), 6);
        }
    }

    #[test]
    fn hex_distance_matches_ring_walk() {
        // Every direct neighbor sits at distance 1.
        let bounds = GridDimensions::new(10, 10);
        let origin = Cell::new(5, 5);
        for n in Topology::Hex.neighbors(origin, bounds, true) {
            assert_eq!(Topology::Hex.distance(origin, n), 1);
        }
        assert_eq!(Topology::Hex.distance(origin, origin), 0);
    }

    #[test]
    fn dimensions_index_is_row_major() {
        let dims = GridDimensions::new(4, 3);
        assert_eq!(dims.index(Cell::new(0, 0)), 0);
        assert_eq!(dims.index(Cell::new(3, 0)), 3);
        assert_eq!(dims.index(Cell::new(0, 1)), 4);
        assert_eq!(dims.cell_count(), 12);
    }
}
