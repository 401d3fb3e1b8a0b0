//! Supercover line tracing.
//!
//! Unlike plain Bresenham, the supercover walk visits every cell the ideal
//! segment touches, stepping one axis at a time except where the segment
//! passes exactly through a corner. Both line-of-sight and line-of-effect
//! checks run on this trace, so the two stay geometrically consistent.

use super::Cell;

/// Cells crossed by the segment from `a` to `b`, inclusive of both ends.
pub fn supercover_line(a: Cell, b: Cell) -> Vec<Cell> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let nx = dx.abs();
    let ny = dy.abs();
    let sx = dx.signum();
    let sy = dy.signum();

    let mut cells = Vec::with_capacity((nx + ny + 1) as usize);
    let mut p = a;
    cells.push(p);

    let (mut ix, mut iy) = (0i32, 0i32);
    while ix < nx || iy < ny {
        // Compare fractional progress along each axis without division:
        // (ix + 0.5) / nx  vs  (iy + 0.5) / ny.
        let decision = (1 + 2 * ix) * ny - (1 + 2 * iy) * nx;
        if decision == 0 {
            // Exact corner crossing: take the diagonal.
            p.x += sx;
            p.y += sy;
            ix += 1;
            iy += 1;
        } else if decision < 0 {
            p.x += sx;
            ix += 1;
        } else {
            p.y += sy;
            iy += 1;
        }
        cells.push(p);
    }

    cells
}

/// Hex line via cube-space interpolation and rounding.
///
/// The epsilon nudge keeps midpoint ties deterministic across directions.
pub(super) fn hex_line(a: Cell, b: Cell) -> Vec<Cell> {
    let steps = super::Topology::Hex.distance(a, b);
    if steps == 0 {
        return vec![a];
    }

    let (aq, ar) = super::offset_to_axial(a);
    let (bq, br) = super::offset_to_axial(b);
    let (ax, ay, az) = cube(aq, ar);
    let (bx, by, bz) = cube(bq, br);

    let mut cells = Vec::with_capacity(steps as usize + 1);
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let x = lerp(ax, bx, t) + 1e-6;
        let y = lerp(ay, by, t) + 2e-6;
        let z = lerp(az, bz, t) - 3e-6;
        let (q, r) = cube_round(x, y, z);
        cells.push(axial_to_offset(q, r));
    }
    cells
}

fn cube(q: i32, r: i32) -> (f64, f64, f64) {
    (q as f64, (-q - r) as f64, r as f64)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn cube_round(x: f64, y: f64, z: f64) -> (i32, i32) {
    let mut rx = x.round();
    let ry = y.round();
    let mut rz = z.round();

    let dx = (rx - x).abs();
    let dy = (ry - y).abs();
    let dz = (rz - z).abs();

    // Only the x and z axes are returned; when y carries the largest
    // rounding error, neither needs correcting.
    if dx > dy && dx > dz {
        rx = -ry - rz;
    } else if dy <= dz {
        rz = -rx - ry;
    }

    (rx as i32, rz as i32)
}

fn axial_to_offset(q: i32, r: i32) -> Cell {
    Cell::new(q + (r - r.rem_euclid(2)) / 2, r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Topology;

    #[test]
    fn line_includes_both_endpoints() {
        let cells = supercover_line(Cell::new(2, 2), Cell::new(5, 4));
        assert_eq!(cells.first(), Some(&Cell::new(2, 2)));
        assert_eq!(cells.last(), Some(&Cell::new(5, 4)));
    }

    #[test]
    fn straight_line_is_exact() {
        let cells = supercover_line(Cell::new(0, 3), Cell::new(4, 3));
        assert_eq!(
            cells,
            vec![
                Cell::new(0, 3),
                Cell::new(1, 3),
                Cell::new(2, 3),
                Cell::new(3, 3),
                Cell::new(4, 3),
            ]
        );
    }

    #[test]
    fn perfect_diagonal_steps_through_corners() {
        let cells = supercover_line(Cell::new(0, 0), Cell::new(3, 3));
        assert_eq!(
            cells,
            vec![
                Cell::new(0, 0),
                Cell::new(1, 1),
                Cell::new(2, 2),
                Cell::new(3, 3),
            ]
        );
    }

    #[test]
    fn degenerate_line_is_single_cell() {
        assert_eq!(
            supercover_line(Cell::new(7, 7), Cell::new(7, 7)),
            vec![Cell::new(7, 7)]
        );
    }

    #[test]
    fn consecutive_cells_stay_adjacent() {
        let cells = supercover_line(Cell::new(1, 9), Cell::new(8, 2));
        for pair in cells.windows(2) {
            assert!(crate::grid::chebyshev(pair[0], pair[1]) == 1);
        }
    }

    #[test]
    fn hex_line_endpoints_and_length() {
        let a = Cell::new(1, 1);
        let b = Cell::new(6, 4);
        let cells = Topology::Hex.line(a, b);
        assert_eq!(cells.first(), Some(&a));
        assert_eq!(cells.last(), Some(&b));
        assert_eq!(cells.len() as u32, Topology::Hex.distance(a, b) + 1);
    }

    #[test]
    fn hex_lines_round_to_adjacent_cells_at_every_angle() {
        let origin = Cell::new(5, 5);
        for y in 0..11 {
            for x in 0..11 {
                let target = Cell::new(x, y);
                let cells = Topology::Hex.line(origin, target);
                assert_eq!(cells.first(), Some(&origin));
                assert_eq!(cells.last(), Some(&target));
                for pair in cells.windows(2) {
                    assert_eq!(Topology::Hex.distance(pair[0], pair[1]), 1);
                }
            }
        }
    }
}
