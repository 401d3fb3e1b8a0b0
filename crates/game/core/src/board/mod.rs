//! Static board configuration: walls, obstacles, light sources, height map.
//!
//! These records are declarative configuration loaded by the surrounding
//! application and handed in as data; the core defines their shape but not
//! their storage. Only `door_state` and obstacle `hp` mutate during play,
//! and any such change invalidates derived blocking sets.

use std::collections::BTreeMap;

use crate::grid::{Cell, Edge, GridDimensions, Topology};

// ============================================================================
// Walls & Doors
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WallKind {
    /// Full-height wall: blocks movement, vision, and attacks.
    Solid,
    /// Waist-high cover: blocks movement, but vision only for observers not
    /// standing directly against it, and never attacks.
    Low,
    /// Door: behaves like a solid wall while closed, like nothing while open.
    Door,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DoorState {
    Open,
    #[default]
    Closed,
}

/// A wall segment on one cell edge.
///
/// The edge is normalized at construction so each physical edge has one
/// canonical key regardless of which adjacent cell declared it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WallSegment {
    pub edge: Edge,
    pub kind: WallKind,
    pub door_state: DoorState,
}

impl WallSegment {
    pub fn new(edge: Edge, kind: WallKind) -> Self {
        Self {
            edge: edge.normalized(),
            kind,
            door_state: DoorState::Closed,
        }
    }

    pub fn door(edge: Edge, state: DoorState) -> Self {
        Self {
            edge: edge.normalized(),
            kind: WallKind::Door,
            door_state: state,
        }
    }

    fn is_open_door(&self) -> bool {
        self.kind == WallKind::Door && self.door_state == DoorState::Open
    }

    pub fn blocks_movement(&self) -> bool {
        !self.is_open_door()
    }

    pub fn blocks_attack(&self) -> bool {
        match self.kind {
            WallKind::Solid => true,
            WallKind::Low => false,
            WallKind::Door => self.door_state == DoorState::Closed,
        }
    }

    /// Vision blocking depends on the observer: a low wall hides nothing from
    /// someone leaning right over it (stealth-over-cover rule).
    pub fn blocks_vision_from(&self, observer: Cell) -> bool {
        match self.kind {
            WallKind::Solid => true,
            WallKind::Door => self.door_state == DoorState::Closed,
            WallKind::Low => {
                let near = self.edge.cell;
                let far = {
                    let (dx, dy) = self.edge.side.delta();
                    near.offset(dx, dy)
                };
                observer != near && observer != far
            }
        }
    }

    /// Whether this segment seals a region for the enclosed-cell flood fill.
    pub fn seals(&self) -> bool {
        match self.kind {
            WallKind::Solid => true,
            WallKind::Door => self.door_state == DoorState::Closed,
            WallKind::Low => false,
        }
    }
}

// ============================================================================
// Obstacles
// ============================================================================

/// Reference to an obstacle type definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObstacleTypeId(pub u16);

/// Immutable per-type obstacle behavior flags and footprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObstacleType {
    pub blocks_movement: bool,
    pub blocks_vision: bool,
    pub blocks_attack: bool,
    /// Footprint extent in cells at rotation 0 (anchored at the instance
    /// position, growing in +x / +y).
    pub footprint: (u8, u8),
    pub max_hp: u32,
}

impl ObstacleType {
    pub fn solid(footprint: (u8, u8), max_hp: u32) -> Self {
        Self {
            blocks_movement: true,
            blocks_vision: true,
            blocks_attack: true,
            footprint,
            max_hp,
        }
    }
}

/// Quarter-turn rotation applied to an obstacle footprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

/// A placed obstacle with hit points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObstacleInstance {
    pub position: Cell,
    pub type_id: ObstacleTypeId,
    pub hp: u32,
    pub rotation: Rotation,
}

impl ObstacleInstance {
    pub fn new(position: Cell, type_id: ObstacleTypeId, hp: u32) -> Self {
        Self {
            position,
            type_id,
            hp,
            rotation: Rotation::R0,
        }
    }

    /// Destroyed obstacles stop contributing to every blocking set.
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Cells covered by the footprint under this instance's rotation.
    pub fn cells(&self, ty: &ObstacleType) -> Vec<Cell> {
        let (w, h) = ty.footprint;
        let (w, h) = match self.rotation {
            Rotation::R0 | Rotation::R180 => (w as i32, h as i32),
            Rotation::R90 | Rotation::R270 => (h as i32, w as i32),
        };
        let mut cells = Vec::with_capacity((w * h).max(1) as usize);
        for dy in 0..h.max(1) {
            for dx in 0..w.max(1) {
                cells.push(self.position.offset(dx, dy));
            }
        }
        cells
    }
}

// ============================================================================
// Light Sources
// ============================================================================

/// RGB tint carried by a light source; rendering-only data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tint {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LightSource {
    pub position: Cell,
    pub radius: u32,
    pub tint: Option<Tint>,
}

impl LightSource {
    pub fn new(position: Cell, radius: u32) -> Self {
        Self {
            position,
            radius,
            tint: None,
        }
    }

    pub fn with_tint(mut self, tint: Tint) -> Self {
        self.tint = Some(tint);
        self
    }
}

// ============================================================================
// Board State
// ============================================================================

/// Complete static board description plus the few mutable bits (door state,
/// obstacle hp) that change during an encounter.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoardState {
    pub dims: GridDimensions,
    pub topology: Topology,
    /// Per-cell height level, row-major; `None` means a flat board.
    pub heights: Option<Vec<i8>>,
    /// Per-cell playable mask, row-major; `None` means fully playable.
    pub playable: Option<Vec<bool>>,
    pub walls: Vec<WallSegment>,
    pub obstacle_types: BTreeMap<ObstacleTypeId, ObstacleType>,
    pub obstacles: Vec<ObstacleInstance>,
    pub lights: Vec<LightSource>,
    /// Per-cell ambient light, row-major; `None` means uniform daylight.
    pub ambient: Option<Vec<f32>>,
    /// Enclosed regions still receive ambient light when the roof is open.
    pub roof_open: bool,
}

impl BoardState {
    pub fn open(dims: GridDimensions) -> Self {
        Self {
            dims,
            topology: Topology::Square,
            heights: None,
            playable: None,
            walls: Vec::new(),
            obstacle_types: BTreeMap::new(),
            obstacles: Vec::new(),
            lights: Vec::new(),
            ambient: None,
            roof_open: false,
        }
    }

    pub fn height_at(&self, cell: Cell) -> i8 {
        match &self.heights {
            Some(map) if self.dims.contains(cell) => map[self.dims.index(cell)],
            _ => 0,
        }
    }

    pub fn is_playable(&self, cell: Cell) -> bool {
        if !self.dims.contains(cell) {
            return false;
        }
        match &self.playable {
            Some(mask) => mask[self.dims.index(cell)],
            None => true,
        }
    }

    pub fn ambient_at(&self, cell: Cell) -> f32 {
        match &self.ambient {
            Some(map) if self.dims.contains(cell) => map[self.dims.index(cell)],
            _ => crate::config::GameConfig::DEFAULT_AMBIENT,
        }
    }

    /// Flips the door on `edge`, if one exists there. Returns whether a door
    /// was found; callers must rebuild blocking sets afterwards.
    pub fn set_door_state(&mut self, edge: Edge, state: DoorState) -> bool {
        let key = edge.normalized();
        for wall in &mut self.walls {
            if wall.edge == key && wall.kind == WallKind::Door {
                wall.door_state = state;
                return true;
            }
        }
        false
    }

    pub fn obstacle_type(&self, id: ObstacleTypeId) -> Option<&ObstacleType> {
        self.obstacle_types.get(&id)
    }
}
