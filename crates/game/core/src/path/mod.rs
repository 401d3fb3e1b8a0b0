//! Budgeted breadth-first pathfinding with per-actor movement capability.
//!
//! The search answers "where can this actor actually walk this turn", not
//! "what is the cheapest route on an abstract graph": entry rules depend on
//! the actor's movement profile, diagonal steps refuse to cut wall corners,
//! and an unreachable target degrades to the closest reachable cell instead
//! of failing (a policy the caller can switch off).

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::blocking::BoardBlocking;
use crate::board::BoardState;
use crate::grid::{Cell, Edge, Topology, chebyshev};

// ============================================================================
// Profiles & Options
// ============================================================================

/// Per-actor movement capability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovementProfile {
    /// Steps per turn. Zero means the actor cannot move at all.
    pub speed: u32,
    pub pass_through_walls: bool,
    pub pass_through_entities: bool,
    pub stop_on_occupied: bool,
}

impl MovementProfile {
    /// Ordinary ground movement; also the fallback derived from a legacy
    /// move-range value when a token carries no profile.
    pub fn ground(speed: u32) -> Self {
        Self {
            speed,
            pass_through_walls: false,
            pass_through_entities: false,
            stop_on_occupied: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathOptions {
    /// Extra cap below the profile speed (e.g. a half-move effect).
    pub max_distance: Option<u32>,
    /// Permit stopping on the occupied *destination* cell specifically
    /// (swap-style effects), independent of the profile flag.
    pub allow_target_occupied: bool,
    /// When the literal target is unreachable, move to the reachable cell
    /// closest to it instead of staying put.
    pub fallback_to_closest: bool,
    /// Skip height-level filtering even when the board has a height map.
    pub ignore_height: bool,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            max_distance: None,
            allow_target_occupied: false,
            fallback_to_closest: true,
            ignore_height: false,
        }
    }
}

/// Board-shaped inputs to a path query. `occupied` holds the cells of other
/// live tokens; obstacle cells come in through `blocking`.
pub struct PathContext<'a> {
    pub board: &'a BoardState,
    pub blocking: &'a BoardBlocking,
    pub occupied: &'a BTreeSet<Cell>,
}

// ============================================================================
// Search
// ============================================================================

/// Finds the step-by-step path from `start` toward `target`.
///
/// The result always includes `start` and never exceeds
/// `min(options.max_distance, profile.speed)` steps. An empty-movement
/// outcome is `vec![start]`, never an empty vector.
pub fn find_path(
    start: Cell,
    target: Cell,
    profile: &MovementProfile,
    options: &PathOptions,
    ctx: &PathContext<'_>,
) -> Vec<Cell> {
    let budget = options
        .max_distance
        .unwrap_or(u32::MAX)
        .min(profile.speed);
    if budget == 0 || start == target {
        return vec![start];
    }

    let start_height = ctx.board.height_at(start);
    let traversable = |cell: Cell| -> bool {
        if !ctx.board.is_playable(cell) {
            return false;
        }
        if !options.ignore_height
            && ctx.board.heights.is_some()
            && ctx.board.height_at(cell) != start_height
        {
            return false;
        }
        if ctx.blocking.cells.movement.contains(&cell) && !profile.pass_through_walls {
            return false;
        }
        if ctx.occupied.contains(&cell) && !profile.pass_through_entities {
            // Entities block passage, with one exception: the destination
            // itself when the caller allows landing there.
            return cell == target && (options.allow_target_occupied || profile.stop_on_occupied);
        }
        true
    };

    let stoppable = |cell: Cell| -> bool {
        if ctx.blocking.cells.movement.contains(&cell) {
            return false;
        }
        if ctx.occupied.contains(&cell) {
            return profile.stop_on_occupied
                || (cell == target && options.allow_target_occupied);
        }
        true
    };

    let mut parents: BTreeMap<Cell, Cell> = BTreeMap::new();
    let mut depth: BTreeMap<Cell, u32> = BTreeMap::new();
    let mut queue: VecDeque<Cell> = VecDeque::new();
    depth.insert(start, 0);
    queue.push_back(start);

    while let Some(cell) = queue.pop_front() {
        let d = depth[&cell];
        if d == budget {
            continue;
        }
        for next in ctx.board.topology.neighbors(cell, ctx.board.dims, true) {
            if depth.contains_key(&next) || !traversable(next) {
                continue;
            }
            if step_crosses_wall(cell, next, profile, ctx) {
                continue;
            }
            if is_diagonal(cell, next) && !corner_clear(cell, next, &traversable) {
                continue;
            }
            depth.insert(next, d + 1);
            parents.insert(next, cell);
            queue.push_back(next);
        }
    }

    let destination = if depth.contains_key(&target) && stoppable(target) {
        target
    } else if options.fallback_to_closest {
        // Closest reachable stoppable cell, ties broken by fewer steps then
        // scan order, so results are deterministic.
        depth
            .iter()
            .filter(|(cell, _)| stoppable(**cell))
            .min_by_key(|(cell, d)| (chebyshev(**cell, target), **d, cell.y, cell.x))
            .map(|(cell, _)| *cell)
            .unwrap_or(start)
    } else {
        return vec![start];
    };

    reconstruct(destination, start, &parents)
}

fn reconstruct(destination: Cell, start: Cell, parents: &BTreeMap<Cell, Cell>) -> Vec<Cell> {
    let mut path = vec![destination];
    let mut cur = destination;
    while cur != start {
        cur = parents[&cur];
        path.push(cur);
    }
    path.reverse();
    path
}

fn is_diagonal(a: Cell, b: Cell) -> bool {
    a.x != b.x && a.y != b.y
}

/// Wall-edge gate for one step. Diagonal steps refuse to pass any blocked
/// edge around their corner; orthogonal steps check the single shared edge.
fn step_crosses_wall(
    a: Cell,
    b: Cell,
    profile: &MovementProfile,
    ctx: &PathContext<'_>,
) -> bool {
    if profile.pass_through_walls || ctx.board.topology != Topology::Square {
        return false;
    }
    let blocked = |x: Cell, y: Cell| {
        Edge::between(x, y).is_some_and(|e| ctx.blocking.edges.movement.contains(&e))
    };
    if !is_diagonal(a, b) {
        return blocked(a, b);
    }
    let c1 = Cell::new(b.x, a.y);
    let c2 = Cell::new(a.x, b.y);
    blocked(a, c1) || blocked(a, c2) || blocked(c1, b) || blocked(c2, b)
}

/// Both orthogonal corner cells must be enterable for a diagonal step.
fn corner_clear(a: Cell, b: Cell, traversable: &dyn Fn(Cell) -> bool) -> bool {
    traversable(Cell::new(b.x, a.y)) && traversable(Cell::new(a.x, b.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{ObstacleInstance, ObstacleType, ObstacleTypeId, WallKind, WallSegment};
    use crate::grid::{GridDimensions, Side};

    fn open_board(cols: u32, rows: u32) -> BoardState {
        BoardState::open(GridDimensions::new(cols, rows))
    }

    fn ctx<'a>(
        board: &'a BoardState,
        blocking: &'a BoardBlocking,
        occupied: &'a BTreeSet<Cell>,
    ) -> PathContext<'a> {
        PathContext {
            board,
            blocking,
            occupied,
        }
    }

    #[test]
    fn straight_run_on_open_ground() {
        let board = open_board(12, 12);
        let blocking = BoardBlocking::build(&board);
        let occupied = BTreeSet::new();
        let path = find_path(
            Cell::new(1, 1),
            Cell::new(5, 1),
            &MovementProfile::ground(6),
            &PathOptions::default(),
            &ctx(&board, &blocking, &occupied),
        );
        assert_eq!(path.first(), Some(&Cell::new(1, 1)));
        assert_eq!(path.last(), Some(&Cell::new(5, 1)));
        assert_eq!(path.len(), 5);
    }

    #[test]
    fn budget_caps_the_walk_and_falls_toward_target() {
        let board = open_board(16, 16);
        let blocking = BoardBlocking::build(&board);
        let occupied = BTreeSet::new();
        // Speed 3, target 10 away: start + 3 steps toward it.
        let path = find_path(
            Cell::new(0, 0),
            Cell::new(10, 0),
            &MovementProfile::ground(3),
            &PathOptions::default(),
            &ctx(&board, &blocking, &occupied),
        );
        assert_eq!(path.len(), 4);
        assert_eq!(path.last(), Some(&Cell::new(3, 0)));
    }

    #[test]
    fn no_fallback_means_staying_put() {
        let board = open_board(16, 16);
        let blocking = BoardBlocking::build(&board);
        let occupied = BTreeSet::new();
        let path = find_path(
            Cell::new(0, 0),
            Cell::new(10, 0),
            &MovementProfile::ground(3),
            &PathOptions {
                fallback_to_closest: false,
                ..PathOptions::default()
            },
            &ctx(&board, &blocking, &occupied),
        );
        assert_eq!(path, vec![Cell::new(0, 0)]);
    }

    #[test]
    fn ghosts_walk_through_obstacles_but_stop_outside_them() {
        let mut board = open_board(8, 8);
        board
            .obstacle_types
            .insert(ObstacleTypeId(0), ObstacleType::solid((1, 3), 10));
        board
            .obstacles
            .push(ObstacleInstance::new(Cell::new(3, 0), ObstacleTypeId(0), 10));
        let blocking = BoardBlocking::build(&board);
        let occupied = BTreeSet::new();

        let walker = find_path(
            Cell::new(1, 1),
            Cell::new(5, 1),
            &MovementProfile::ground(10),
            &PathOptions::default(),
            &ctx(&board, &blocking, &occupied),
        );
        // Ground profile has to route around the pillar column.
        assert!(walker.iter().all(|c| *c != Cell::new(3, 1)));
        assert_eq!(walker.last(), Some(&Cell::new(5, 1)));

        let ghost_profile = MovementProfile {
            pass_through_walls: true,
            ..MovementProfile::ground(10)
        };
        let ghost = find_path(
            Cell::new(1, 1),
            Cell::new(5, 1),
            &ghost_profile,
            &PathOptions::default(),
            &ctx(&board, &blocking, &occupied),
        );
        assert!(ghost.len() < walker.len());
    }

    #[test]
    fn occupied_destination_needs_permission() {
        let board = open_board(8, 8);
        let blocking = BoardBlocking::build(&board);
        let mut occupied = BTreeSet::new();
        occupied.insert(Cell::new(4, 4));

        let refused = find_path(
            Cell::new(2, 4),
            Cell::new(4, 4),
            &MovementProfile::ground(5),
            &PathOptions {
                fallback_to_closest: false,
                ..PathOptions::default()
            },
            &ctx(&board, &blocking, &occupied),
        );
        assert_eq!(refused, vec![Cell::new(2, 4)]);

        let allowed = find_path(
            Cell::new(2, 4),
            Cell::new(4, 4),
            &MovementProfile::ground(5),
            &PathOptions {
                allow_target_occupied: true,
                ..PathOptions::default()
            },
            &ctx(&board, &blocking, &occupied),
        );
        assert_eq!(allowed.last(), Some(&Cell::new(4, 4)));
    }

    #[test]
    fn diagonals_refuse_to_cut_wall_corners() {
        let mut board = open_board(6, 6);
        let a = Cell::new(2, 2);
        board.walls.push(WallSegment::new(
            Edge::new(a, Side::East),
            WallKind::Solid,
        ));
        board.walls.push(WallSegment::new(
            Edge::new(a, Side::South),
            WallKind::Solid,
        ));
        let blocking = BoardBlocking::build(&board);
        let occupied = BTreeSet::new();

        let path = find_path(
            a,
            Cell::new(3, 3),
            &MovementProfile::ground(4),
            &PathOptions::default(),
            &ctx(&board, &blocking, &occupied),
        );
        // The direct diagonal crosses both walls' corner; the route must go
        // around and so takes more than one step.
        assert!(path.len() > 2);
        assert_eq!(path.last(), Some(&Cell::new(3, 3)));
    }

    #[test]
    fn height_levels_partition_the_board() {
        let mut board = open_board(6, 1);
        // Cells 0..3 at ground level, 3..6 raised.
        board.heights = Some(vec![0, 0, 0, 1, 1, 1]);
        let blocking = BoardBlocking::build(&board);
        let occupied = BTreeSet::new();

        let path = find_path(
            Cell::new(0, 0),
            Cell::new(5, 0),
            &MovementProfile::ground(10),
            &PathOptions::default(),
            &ctx(&board, &blocking, &occupied),
        );
        assert_eq!(path.last(), Some(&Cell::new(2, 0)));

        let ignoring = find_path(
            Cell::new(0, 0),
            Cell::new(5, 0),
            &MovementProfile::ground(10),
            &PathOptions {
                ignore_height: true,
                ..PathOptions::default()
            },
            &ctx(&board, &blocking, &occupied),
        );
        assert_eq!(ignoring.last(), Some(&Cell::new(5, 0)));
    }
}
