//! Per-observer field-of-view computation.
//!
//! Two-pass design, kept deliberately separate: recursive shadowcasting
//! classifies cells by area opacity (coarse), then a supercover line check
//! refines the result for wall edges, which sit between cells and cannot be
//! represented by cell opacity alone. Merging the passes would lose the
//! one-sided-wall cases.

mod shadowcast;

use crate::blocking::BoardBlocking;
use crate::config::GameConfig;
use crate::grid::{Cell, GridDimensions, Topology};

// ============================================================================
// Profiles
// ============================================================================

/// How an observer's eyesight interacts with computed light levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LightVisionMode {
    #[default]
    Normal,
    /// Sees in dim light a normal observer would miss.
    LowLight,
    /// Ignores light levels entirely.
    Darkvision,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VisionShape {
    Circle,
    Cone { aperture_deg: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisionProfile {
    pub shape: VisionShape,
    pub range: u32,
    pub light_mode: LightVisionMode,
}

impl VisionProfile {
    pub fn circle(range: u32) -> Self {
        Self {
            shape: VisionShape::Circle,
            range,
            light_mode: LightVisionMode::Normal,
        }
    }

    pub fn cone(range: u32, aperture_deg: f32) -> Self {
        Self {
            shape: VisionShape::Cone { aperture_deg },
            range,
            light_mode: LightVisionMode::Normal,
        }
    }

    pub fn with_light_mode(mut self, mode: LightVisionMode) -> Self {
        self.light_mode = mode;
        self
    }
}

/// Whether a cell at `level` light is perceivable in the given mode.
pub fn is_light_visible(level: f32, mode: LightVisionMode) -> bool {
    match mode {
        LightVisionMode::Normal => level >= GameConfig::SHADOW_MIN,
        LightVisionMode::LowLight => level >= GameConfig::SHADOW_MIN * 0.5,
        LightVisionMode::Darkvision => true,
    }
}

// ============================================================================
// Visibility levels
// ============================================================================

/// Per-cell visibility classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Visibility {
    /// Not visible at all.
    #[default]
    Hidden,
    /// Seen, but through a blocking cell at the shadow boundary — enough to
    /// know something is there, not enough for full detail.
    Partial,
    /// Fully visible.
    Full,
}

impl Visibility {
    pub fn is_visible(self) -> bool {
        self != Visibility::Hidden
    }
}

/// Dense per-cell visibility result for one observer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisibilityMap {
    dims: GridDimensions,
    levels: Vec<Visibility>,
}

impl VisibilityMap {
    fn hidden(dims: GridDimensions) -> Self {
        Self {
            dims,
            levels: vec![Visibility::Hidden; dims.cell_count()],
        }
    }

    pub fn level_at(&self, cell: Cell) -> Visibility {
        if self.dims.contains(cell) {
            self.levels[self.dims.index(cell)]
        } else {
            Visibility::Hidden
        }
    }

    fn set(&mut self, cell: Cell, level: Visibility) {
        if self.dims.contains(cell) {
            let idx = self.dims.index(cell);
            self.levels[idx] = level;
        }
    }

    pub fn visible_cells(&self) -> impl Iterator<Item = (Cell, Visibility)> + '_ {
        self.dims
            .cells()
            .map(|c| (c, self.level_at(c)))
            .filter(|(_, v)| v.is_visible())
    }
}

// ============================================================================
// Computation
// ============================================================================

/// Board-shaped inputs to a visibility query.
pub struct VisionContext<'a> {
    pub dims: GridDimensions,
    pub topology: Topology,
    pub blocking: &'a BoardBlocking,
    /// Precomputed light levels; `None` skips the light filter.
    pub light: Option<&'a [f32]>,
}

/// Computes the visibility map for one observer.
///
/// `facing_deg` matters only for cone profiles: 0° looks toward +x, 90°
/// toward +y. An observer standing on a blocked cell still sees itself, and
/// a zero range degenerates to exactly that.
pub fn visibility_map(
    observer: Cell,
    profile: &VisionProfile,
    facing_deg: f32,
    ctx: &VisionContext<'_>,
) -> VisibilityMap {
    let mut map = VisibilityMap::hidden(ctx.dims);
    map.set(observer, Visibility::Full);
    if profile.range == 0 {
        return map;
    }

    let opaque = |c: Cell| ctx.blocking.cells.vision.contains(&c);

    match ctx.topology {
        Topology::Square => {
            shadowcast::scan(observer, profile.range, ctx.dims, &opaque, &mut |cell,
                                                                               is_opaque| {
                let level = if is_opaque {
                    Visibility::Partial
                } else {
                    Visibility::Full
                };
                if map.level_at(cell) < level {
                    map.set(cell, level);
                }
            });
        }
        // Hex boards have no octants; trace a line per candidate cell.
        Topology::Hex => {
            for cell in ctx.dims.cells() {
                let dist = ctx.topology.distance(observer, cell);
                if cell == observer || dist > profile.range {
                    continue;
                }
                let trace = ctx.topology.line(observer, cell);
                let interior_clear = trace[1..trace.len() - 1].iter().all(|c| !opaque(*c));
                if interior_clear {
                    let level = if opaque(cell) {
                        Visibility::Partial
                    } else {
                        Visibility::Full
                    };
                    map.set(cell, level);
                }
            }
        }
    }

    if let VisionShape::Cone { aperture_deg } = profile.shape {
        apply_cone(&mut map, observer, facing_deg, aperture_deg);
    }

    if !ctx.blocking.edges.vision.is_empty() {
        apply_edge_filter(&mut map, observer, ctx);
    }

    if let Some(light) = ctx.light {
        apply_light_filter(&mut map, observer, profile.light_mode, light);
    }

    map
}

/// Convenience predicate over [`visibility_map`].
pub fn is_cell_visible(
    observer: Cell,
    target: Cell,
    profile: &VisionProfile,
    facing_deg: f32,
    ctx: &VisionContext<'_>,
) -> bool {
    visibility_map(observer, profile, facing_deg, ctx)
        .level_at(target)
        .is_visible()
}

/// Intersect with the cone's angular sweep. The observer's own cell always
/// survives.
fn apply_cone(map: &mut VisibilityMap, observer: Cell, facing_deg: f32, aperture_deg: f32) {
    let half = aperture_deg / 2.0;
    let dims = map.dims;
    for cell in dims.cells() {
        if cell == observer || !map.level_at(cell).is_visible() {
            continue;
        }
        let angle = ((cell.y - observer.y) as f32)
            .atan2((cell.x - observer.x) as f32)
            .to_degrees();
        let mut diff = (angle - facing_deg) % 360.0;
        if diff > 180.0 {
            diff -= 360.0;
        } else if diff < -180.0 {
            diff += 360.0;
        }
        if diff.abs() > half {
            map.set(cell, Visibility::Hidden);
        }
    }
}

/// Second pass: drop cells whose supercover line from the observer crosses a
/// vision-blocking wall edge or an opaque interior cell.
fn apply_edge_filter(map: &mut VisibilityMap, observer: Cell, ctx: &VisionContext<'_>) {
    let cells: Vec<Cell> = map.visible_cells().map(|(c, _)| c).collect();
    for cell in cells {
        if cell == observer {
            continue;
        }
        let trace = ctx.topology.line(observer, cell);
        let mut clear = true;
        for pair in trace.windows(2) {
            if ctx
                .blocking
                .edges
                .blocks_vision_between(pair[0], pair[1], observer)
            {
                clear = false;
                break;
            }
            // Interior opacity re-check keeps the two passes consistent.
            if pair[1] != cell && ctx.blocking.cells.vision.contains(&pair[1]) {
                clear = false;
                break;
            }
        }
        if !clear {
            map.set(cell, Visibility::Hidden);
        }
    }
}

/// Light gate: cells too dark for the observer's vision mode drop out.
fn apply_light_filter(
    map: &mut VisibilityMap,
    observer: Cell,
    mode: LightVisionMode,
    light: &[f32],
) {
    if mode == LightVisionMode::Darkvision {
        return;
    }
    let dims = map.dims;
    for cell in dims.cells() {
        if cell == observer || !map.level_at(cell).is_visible() {
            continue;
        }
        let level = light.get(dims.index(cell)).copied().unwrap_or(0.0);
        if !is_light_visible(level, mode) {
            map.set(cell, Visibility::Hidden);
        }
    }
}
