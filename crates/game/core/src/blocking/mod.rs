//! Derived blocking sets.
//!
//! Obstacles and walls are configuration; pathfinding, vision, and attack
//! validation want fast predicates. This module converts the former into the
//! latter. The sets are rebuilt wholesale whenever obstacle hp, door state,
//! or the wall list changes — they are a cheap pure function of the board,
//! not an incrementally maintained index.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::board::{BoardState, WallSegment};
use crate::grid::{Cell, Edge, GridDimensions, Side};

// ============================================================================
// Cell-based blocking (obstacles)
// ============================================================================

/// Cells blocked per interaction type, derived from live obstacles.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockingSets {
    pub movement: BTreeSet<Cell>,
    pub vision: BTreeSet<Cell>,
    pub attack: BTreeSet<Cell>,
    /// Every cell covered by a live obstacle footprint, regardless of flags.
    pub occupied: BTreeSet<Cell>,
}

impl BlockingSets {
    /// An obstacle contributes to a set only if its type flags that behavior
    /// and it still has hit points.
    pub fn build(board: &BoardState) -> Self {
        let mut sets = Self::default();
        for obstacle in &board.obstacles {
            if !obstacle.is_alive() {
                continue;
            }
            let Some(ty) = board.obstacle_type(obstacle.type_id) else {
                continue;
            };
            for cell in obstacle.cells(ty) {
                sets.occupied.insert(cell);
                if ty.blocks_movement {
                    sets.movement.insert(cell);
                }
                if ty.blocks_vision {
                    sets.vision.insert(cell);
                }
                if ty.blocks_attack {
                    sets.attack.insert(cell);
                }
            }
        }
        sets
    }
}

// ============================================================================
// Edge-based blocking (walls & doors)
// ============================================================================

/// Wall blocking keyed by normalized edge.
///
/// Movement and attack only need membership; vision keeps the full segment
/// because the low-wall and door rules branch on segment metadata at query
/// time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WallEdgeSets {
    pub movement: BTreeSet<Edge>,
    pub attack: BTreeSet<Edge>,
    pub vision: BTreeMap<Edge, WallSegment>,
}

impl WallEdgeSets {
    pub fn build(walls: &[WallSegment]) -> Self {
        let mut sets = Self::default();
        for wall in walls {
            let key = wall.edge.normalized();
            if wall.blocks_movement() {
                sets.movement.insert(key);
            }
            if wall.blocks_attack() {
                sets.attack.insert(key);
            }
            // Open doors drop out entirely; everything else is kept so the
            // observer-dependent check can run later.
            if wall.kind != crate::board::WallKind::Door
                || wall.door_state == crate::board::DoorState::Closed
            {
                sets.vision.insert(key, *wall);
            }
        }
        sets
    }

    pub fn blocks_movement_between(&self, a: Cell, b: Cell) -> bool {
        crossing_blocked(a, b, &|edge| self.movement.contains(&edge))
    }

    pub fn blocks_attack_between(&self, a: Cell, b: Cell) -> bool {
        crossing_blocked(a, b, &|edge| self.attack.contains(&edge))
    }

    /// Vision blocking is observer-dependent: low walls pass for observers
    /// standing against them.
    pub fn blocks_vision_between(&self, a: Cell, b: Cell, observer: Cell) -> bool {
        crossing_blocked(a, b, &|edge| {
            self.vision
                .get(&edge)
                .is_some_and(|wall| wall.blocks_vision_from(observer))
        })
    }
}

/// Whether stepping from `a` to `b` crosses a blocked edge.
///
/// Diagonal steps pass exactly through a cell corner; the step is blocked
/// only when *both* orthogonal routes around that corner are blocked.
fn crossing_blocked(a: Cell, b: Cell, blocked: &dyn Fn(Edge) -> bool) -> bool {
    if let Some(edge) = Edge::between(a, b) {
        return blocked(edge);
    }
    if (b.x - a.x).abs() == 1 && (b.y - a.y).abs() == 1 {
        let c1 = Cell::new(b.x, a.y);
        let c2 = Cell::new(a.x, b.y);
        let via = |corner: Cell| {
            Edge::between(a, corner).is_some_and(&blocked)
                || Edge::between(corner, b).is_some_and(&blocked)
        };
        return via(c1) && via(c2);
    }
    // Non-adjacent pairs never reach here from line walks.
    false
}

// ============================================================================
// Aggregate + enclosed regions
// ============================================================================

/// Everything derived from the current board: cell sets, edge sets, and the
/// enclosed-region mask used by lighting.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoardBlocking {
    pub cells: BlockingSets,
    pub edges: WallEdgeSets,
    pub enclosed: BTreeSet<Cell>,
}

impl BoardBlocking {
    pub fn build(board: &BoardState) -> Self {
        let cells = BlockingSets::build(board);
        let edges = WallEdgeSets::build(&board.walls);
        let enclosed = closed_cells(board.dims, board, &edges);
        Self {
            cells,
            edges,
            enclosed,
        }
    }
}

/// Flood fill from the board border inward across non-sealing edges.
///
/// Any playable cell the fill never reaches sits inside a sealed region;
/// lighting zeroes its ambient light unless the board's roof is open.
pub fn closed_cells(
    dims: GridDimensions,
    board: &BoardState,
    edges: &WallEdgeSets,
) -> BTreeSet<Cell> {
    // Low walls live in the vision map but do not seal.
    let seals = |edge: Edge| edges.vision.get(&edge).is_some_and(|w| w.seals());

    let mut reached: BTreeSet<Cell> = BTreeSet::new();
    let mut queue: VecDeque<Cell> = VecDeque::new();

    // Seed with every border cell whose outer edge is not sealed.
    for cell in dims.cells() {
        let on_border = cell.x == 0
            || cell.y == 0
            || cell.x == dims.cols as i32 - 1
            || cell.y == dims.rows as i32 - 1;
        if !on_border {
            continue;
        }
        let outer_sealed = [Side::North, Side::South, Side::East, Side::West]
            .into_iter()
            .filter(|side| {
                let (dx, dy) = side.delta();
                !dims.contains(cell.offset(dx, dy))
            })
            .all(|side| seals(Edge::new(cell, side).normalized()));
        if !outer_sealed && reached.insert(cell) {
            queue.push_back(cell);
        }
    }

    while let Some(cell) = queue.pop_front() {
        for side in [Side::North, Side::South, Side::East, Side::West] {
            let (dx, dy) = side.delta();
            let next = cell.offset(dx, dy);
            if !dims.contains(next) || reached.contains(&next) {
                continue;
            }
            if seals(Edge::new(cell, side).normalized()) {
                continue;
            }
            reached.insert(next);
            queue.push_back(next);
        }
    }

    dims.cells()
        .filter(|cell| board.is_playable(*cell) && !reached.contains(cell))
        .collect()
}
