//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Simulation tick counter (one step of the host simulation)
pub type Tick = u64;

/// Size of one tile in fine world units
pub const TILE_SIZE: i32 = 32;

/// Identifier assigned to a ride, stall or facility by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StructureId(pub u32);

/// Identifier assigned to a staff member by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u32);

/// Integer tile coordinate in world grid space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Four-directional neighbours in fixed order: west, east, north, south
    pub fn neighbors4(&self) -> [TileCoord; 4] {
        [
            Self::new(self.x - 1, self.y),
            Self::new(self.x + 1, self.y),
            Self::new(self.x, self.y - 1),
            Self::new(self.x, self.y + 1),
        ]
    }

    pub fn to_fine(self) -> FinePos {
        FinePos::new(self.x * TILE_SIZE, self.y * TILE_SIZE)
    }
}

/// Position in fine world units (tile * TILE_SIZE + sub-tile offset)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FinePos {
    pub x: i32,
    pub y: i32,
}

impl FinePos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn tile(&self) -> TileCoord {
        TileCoord::new(self.x.div_euclid(TILE_SIZE), self.y.div_euclid(TILE_SIZE))
    }
}

/// World dimensions in tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorldSize {
    pub width: i32,
    pub height: i32,
}

impl WorldSize {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn cell_count(&self) -> u64 {
        (self.width.max(0) as u64) * (self.height.max(0) as u64)
    }

    pub fn contains(&self, coord: TileCoord) -> bool {
        coord.x >= 0 && coord.y >= 0 && coord.x < self.width && coord.y < self.height
    }

    pub fn center(&self) -> TileCoord {
        TileCoord::new(self.width / 2, self.height / 2)
    }
}

/// The four fixed staff roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Role {
    /// Sweeping and grounds maintenance
    Handyman = 0,
    /// Ride inspection and repair
    Mechanic = 1,
    /// Patrols against vandalism
    Security = 2,
    /// Costumed guest entertainment
    Entertainer = 3,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Handyman,
        Role::Mechanic,
        Role::Security,
        Role::Entertainer,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Staff type code expected by the effect gateway
    pub fn staff_type(self) -> u8 {
        self as u8
    }

    pub fn from_staff_type(code: u8) -> Option<Role> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Handyman => "handyman",
            Self::Mechanic => "mechanic",
            Self::Security => "security",
            Self::Entertainer => "entertainer",
        }
    }
}

/// Per-role counters indexed by `Role::index`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoleCounts(pub [u64; 4]);

impl RoleCounts {
    pub fn get(&self, role: Role) -> u64 {
        self.0[role.index()]
    }

    pub fn add(&mut self, role: Role, amount: u64) {
        self.0[role.index()] += amount;
    }

    pub fn set(&mut self, role: Role, value: u64) {
        self.0[role.index()] = value;
    }

    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }
}

/// Axis-aligned patrol rectangle in tile coordinates (inclusive bounds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatrolRect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl PatrolRect {
    /// Sentinel for "no coverage"; inverted so it is absorbed by `union`
    pub const EMPTY: PatrolRect = PatrolRect {
        x1: i32::MAX,
        y1: i32::MAX,
        x2: i32::MIN,
        y2: i32::MIN,
    };

    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Square of half-width `radius` centred on `center`
    pub fn around(center: TileCoord, radius: i32) -> Self {
        Self::new(
            center.x - radius,
            center.y - radius,
            center.x + radius,
            center.y + radius,
        )
    }

    /// Whole world
    pub fn world(size: WorldSize) -> Self {
        Self::new(0, 0, size.width - 1, size.height - 1)
    }

    pub fn is_empty(&self) -> bool {
        self.x1 > self.x2 || self.y1 > self.y2
    }

    pub fn include(&mut self, coord: TileCoord) {
        self.x1 = self.x1.min(coord.x);
        self.y1 = self.y1.min(coord.y);
        self.x2 = self.x2.max(coord.x);
        self.y2 = self.y2.max(coord.y);
    }

    pub fn union(&self, other: &PatrolRect) -> PatrolRect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        PatrolRect::new(
            self.x1.min(other.x1),
            self.y1.min(other.y1),
            self.x2.max(other.x2),
            self.y2.max(other.y2),
        )
    }

    pub fn padded(&self, margin: i32) -> PatrolRect {
        if self.is_empty() {
            return *self;
        }
        PatrolRect::new(
            self.x1 - margin,
            self.y1 - margin,
            self.x2 + margin,
            self.y2 + margin,
        )
    }

    /// Clamp to `[0, width-1] x [0, height-1]`, keeping `x1 <= x2` and `y1 <= y2`
    pub fn clamped(&self, size: WorldSize) -> PatrolRect {
        let max_x = (size.width - 1).max(0);
        let max_y = (size.height - 1).max(0);
        let x1 = self.x1.clamp(0, max_x);
        let y1 = self.y1.clamp(0, max_y);
        let x2 = self.x2.clamp(0, max_x);
        let y2 = self.y2.clamp(0, max_y);
        PatrolRect::new(x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2))
    }

    pub fn contains(&self, coord: TileCoord) -> bool {
        coord.x >= self.x1 && coord.x <= self.x2 && coord.y >= self.y1 && coord.y <= self.y2
    }
}
