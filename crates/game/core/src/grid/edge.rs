//! Wall edge keys.
//!
//! A wall segment sits *between* two cells, so either neighbor could declare
//! it. [`Edge::normalized`] collapses both spellings onto one canonical key
//! (the North or West side of the cell below/right of the edge), which is
//! what the blocking sets are keyed by.

use super::Cell;

/// One of the four sides of a square cell. `North` is `y - 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    North,
    South,
    East,
    West,
}

impl Side {
    /// Offset to the cell on the other side of this edge.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Side::North => (0, -1),
            Side::South => (0, 1),
            Side::East => (1, 0),
            Side::West => (-1, 0),
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Side::North => Side::South,
            Side::South => Side::North,
            Side::East => Side::West,
            Side::West => Side::East,
        }
    }
}

/// A cell edge addressed from one of its two adjacent cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    pub cell: Cell,
    pub side: Side,
}

impl Edge {
    pub const fn new(cell: Cell, side: Side) -> Self {
        Self { cell, side }
    }

    /// Canonical key: every physical edge is expressed as the `North` or
    /// `West` side of exactly one cell.
    pub fn normalized(self) -> Self {
        match self.side {
            Side::North | Side::West => self,
            Side::South => Edge::new(self.cell.offset(0, 1), Side::North),
            Side::East => Edge::new(self.cell.offset(1, 0), Side::West),
        }
    }

    /// The edge separating two orthogonally adjacent cells, already
    /// normalized. Returns `None` for identical, diagonal, or distant pairs.
    pub fn between(a: Cell, b: Cell) -> Option<Self> {
        let side = match (b.x - a.x, b.y - a.y) {
            (0, -1) => Side::North,
            (0, 1) => Side::South,
            (1, 0) => Side::East,
            (-1, 0) => Side::West,
            _ => return None,
        };
        Some(Edge::new(a, side).normalized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_spellings_normalize_to_one_key() {
        let east = Edge::new(Cell::new(2, 2), Side::East).normalized();
        let west = Edge::new(Cell::new(3, 2), Side::West).normalized();
        assert_eq!(east, west);

        let south = Edge::new(Cell::new(4, 4), Side::South).normalized();
        let north = Edge::new(Cell::new(4, 5), Side::North).normalized();
        assert_eq!(south, north);
    }

    #[test]
    fn between_requires_orthogonal_adjacency() {
        assert!(Edge::between(Cell::new(0, 0), Cell::new(1, 1)).is_none());
        assert!(Edge::between(Cell::new(0, 0), Cell::new(0, 0)).is_none());
        assert!(Edge::between(Cell::new(0, 0), Cell::new(2, 0)).is_none());

        let e = Edge::between(Cell::new(2, 2), Cell::new(3, 2)).unwrap();
        assert_eq!(e, Edge::new(Cell::new(3, 2), Side::West));
    }

    #[test]
    fn between_is_symmetric() {
        let ab = Edge::between(Cell::new(5, 1), Cell::new(5, 2));
        let ba = Edge::between(Cell::new(5, 2), Cell::new(5, 1));
        assert_eq!(ab, ba);
    }
}
