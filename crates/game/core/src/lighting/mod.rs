//! Per-cell light levels and render tints.
//!
//! The numeric level (0..1) feeds visibility and action validation; the
//! blended tint field is consumed only by rendering and never by gameplay
//! decisions. Point sources do not attenuate the gameplay level by distance:
//! within radius and with a clear line, a cell is simply lit.

use crate::blocking::BoardBlocking;
use crate::board::{BoardState, Tint};
use crate::config::GameConfig;
use crate::grid::Cell;

/// Computes the light level for every cell, row-major.
///
/// Ambient light fills the board first (uniform daylight absent a map), then
/// enclosed cells go dark unless the roof is open, then each source raises
/// every reachable cell within its radius to at least full.
pub fn light_levels(board: &BoardState, blocking: &BoardBlocking) -> Vec<f32> {
    let dims = board.dims;
    let mut levels = vec![0.0f32; dims.cell_count()];

    for cell in dims.cells() {
        let mut ambient = board.ambient_at(cell);
        if ambient >= GameConfig::BRIGHT_MIN
            && !board.roof_open
            && blocking.enclosed.contains(&cell)
        {
            // Daylight does not reach indoors.
            ambient = 0.0;
        }
        levels[dims.index(cell)] = ambient.clamp(0.0, 1.0);
    }

    for source in &board.lights {
        for cell in dims.cells() {
            if board.topology.distance(source.position, cell) > source.radius {
                continue;
            }
            if !clear_line(source.position, cell, board, blocking) {
                continue;
            }
            let idx = dims.index(cell);
            levels[idx] = levels[idx].max(1.0);
        }
    }

    levels
}

/// Blended tint per cell, `None` where no colored source reaches.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TintCell {
    pub tint: Tint,
    /// Blend strength 0..1; rendering decides how hard to apply it.
    pub strength: f32,
}

/// Computes the render tint field: per cell, source colors blended with
/// weight `1 - distance/radius` over every colored source with a clear line.
pub fn tint_field(board: &BoardState, blocking: &BoardBlocking) -> Vec<Option<TintCell>> {
    let dims = board.dims;
    let mut field: Vec<Option<TintCell>> = vec![None; dims.cell_count()];

    for cell in dims.cells() {
        let mut r = 0.0f32;
        let mut g = 0.0f32;
        let mut b = 0.0f32;
        let mut weight_sum = 0.0f32;

        for source in &board.lights {
            let Some(tint) = source.tint else { continue };
            if source.radius == 0 {
                continue;
            }
            let dist = board.topology.distance(source.position, cell);
            if dist > source.radius {
                continue;
            }
            if !clear_line(source.position, cell, board, blocking) {
                continue;
            }
            let weight = 1.0 - dist as f32 / source.radius as f32;
            r += tint.r as f32 * weight;
            g += tint.g as f32 * weight;
            b += tint.b as f32 * weight;
            weight_sum += weight;
        }

        if weight_sum > 0.0 {
            field[dims.index(cell)] = Some(TintCell {
                tint: Tint {
                    r: (r / weight_sum).round() as u8,
                    g: (g / weight_sum).round() as u8,
                    b: (b / weight_sum).round() as u8,
                },
                strength: weight_sum.min(1.0),
            });
        }
    }

    field
}

/// Light travels the same supercover trace vision uses, stopped by
/// vision-blocking cells and sealing wall edges.
fn clear_line(from: Cell, to: Cell, board: &BoardState, blocking: &BoardBlocking) -> bool {
    if from == to {
        return true;
    }
    let trace = board.topology.line(from, to);
    for pair in trace.windows(2) {
        if blocking
            .edges
            .blocks_vision_between(pair[0], pair[1], from)
        {
            return false;
        }
        if pair[1] != to && blocking.cells.vision.contains(&pair[1]) {
            return false;
        }
    }
    true
}
