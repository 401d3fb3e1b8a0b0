//! Recursive octant shadowcasting.
//!
//! Operates purely on cell opacity: a cell the scan reaches is `Full` when
//! transparent and `Partial` when it is itself opaque (the boundary of a
//! shadow). Wall edges sit between cells and cannot be expressed here; the
//! caller refines the result with a line/edge pass afterwards.

use crate::grid::{Cell, GridDimensions};

/// Octant transforms mapping scan-space (col, row) into grid deltas.
const OCTANTS: [(i32, i32, i32, i32); 8] = [
    (1, 0, 0, 1),
    (0, 1, 1, 0),
    (0, -1, 1, 0),
    (-1, 0, 0, 1),
    (-1, 0, 0, -1),
    (0, -1, -1, 0),
    (0, 1, -1, 0),
    (1, 0, 0, -1),
];

/// Runs the scan from `origin` out to `range` (Chebyshev), invoking
/// `mark(cell, is_opaque)` for every reached cell. The origin itself is not
/// marked; callers always force it visible.
pub(super) fn scan(
    origin: Cell,
    range: u32,
    dims: GridDimensions,
    opaque: &dyn Fn(Cell) -> bool,
    mark: &mut dyn FnMut(Cell, bool),
) {
    if range == 0 {
        return;
    }
    for octant in OCTANTS {
        cast(origin, range as i32, 1, 1.0, 0.0, octant, dims, opaque, mark);
    }
}

#[allow(clippy::too_many_arguments)]
fn cast(
    origin: Cell,
    range: i32,
    row: i32,
    mut start: f64,
    end: f64,
    (xx, xy, yx, yy): (i32, i32, i32, i32),
    dims: GridDimensions,
    opaque: &dyn Fn(Cell) -> bool,
    mark: &mut dyn FnMut(Cell, bool),
) {
    if start < end {
        return;
    }

    let mut new_start = start;
    let mut blocked = false;

    for dist in row..=range {
        if blocked {
            break;
        }
        let dy = -dist;
        for dx in -dist..=0 {
            let cur = Cell::new(
                origin.x + dx * xx + dy * xy,
                origin.y + dx * yx + dy * yy,
            );
            let left_slope = (dx as f64 - 0.5) / (dy as f64 + 0.5);
            let right_slope = (dx as f64 + 0.5) / (dy as f64 - 0.5);

            if start < right_slope {
                continue;
            }
            if end > left_slope {
                break;
            }

            let inside = dims.contains(cur);
            let cur_opaque = !inside || opaque(cur);
            if inside {
                mark(cur, cur_opaque);
            }

            if blocked {
                if cur_opaque {
                    new_start = right_slope;
                } else {
                    blocked = false;
                    start = new_start;
                }
            } else if cur_opaque && dist < range {
                // Shadow begins: recurse for the still-lit strip above it.
                blocked = true;
                cast(
                    origin,
                    range,
                    dist + 1,
                    start,
                    left_slope,
                    (xx, xy, yx, yy),
                    dims,
                    opaque,
                    mark,
                );
                new_start = right_slope;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn run(origin: Cell, range: u32, opaque_cells: &[Cell]) -> BTreeSet<Cell> {
        let dims = GridDimensions::new(20, 20);
        let opaque_set: BTreeSet<Cell> = opaque_cells.iter().copied().collect();
        let mut seen = BTreeSet::new();
        scan(
            origin,
            range,
            dims,
            &|c| opaque_set.contains(&c),
            &mut |c, _| {
                seen.insert(c);
            },
        );
        seen
    }

    #[test]
    fn open_field_reaches_the_full_square() {
        let seen = run(Cell::new(10, 10), 3, &[]);
        // Everything within Chebyshev 3 except the origin itself.
        assert_eq!(seen.len(), 7 * 7 - 1);
        assert!(seen.contains(&Cell::new(13, 10)));
        assert!(!seen.contains(&Cell::new(14, 10)));
    }

    #[test]
    fn pillar_casts_a_shadow() {
        let seen = run(Cell::new(10, 10), 5, &[Cell::new(12, 10)]);
        // The pillar itself is reached (boundary), the cell behind is not.
        assert!(seen.contains(&Cell::new(12, 10)));
        assert!(!seen.contains(&Cell::new(14, 10)));
    }

    #[test]
    fn shadow_widens_with_distance() {
        let seen = run(Cell::new(10, 10), 6, &[Cell::new(12, 10)]);
        assert!(!seen.contains(&Cell::new(15, 10)));
        // Off-axis cells past the pillar remain visible.
        assert!(seen.contains(&Cell::new(13, 12)));
    }
}
