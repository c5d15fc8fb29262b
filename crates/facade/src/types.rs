//! Position and observation types shared across the facade boundary.

use blockhand_core::Item;
use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

/// An integer block coordinate. Ordered (y, x, z) so sorted collections
/// iterate bottom-up, which is the order placement wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Centre of the block, for navigation and look-at targets.
    pub fn center(self) -> Vec3 {
        Vec3::new(
            self.x as f32 + 0.5,
            self.y as f32 + 0.5,
            self.z as f32 + 0.5,
        )
    }

    /// Block containing a world-space point.
    pub fn containing(point: Vec3) -> Self {
        Self {
            x: point.x.floor() as i32,
            y: point.y.floor() as i32,
            z: point.z.floor() as i32,
        }
    }

    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }

    pub const fn below(self) -> Self {
        Self::new(self.x, self.y - 1, self.z)
    }

    pub const fn above(self) -> Self {
        Self::new(self.x, self.y + 1, self.z)
    }

    /// The six face-adjacent neighbours, below first, above last.
    pub fn neighbors(self) -> [BlockPos; 6] {
        [
            self.below(),
            self.offset(0, 0, -1),
            self.offset(0, 0, 1),
            self.offset(-1, 0, 0),
            self.offset(1, 0, 0),
            self.above(),
        ]
    }

    pub fn distance_to(self, point: Vec3) -> f64 {
        (self.center() - point).length() as f64
    }
}

impl PartialOrd for BlockPos {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BlockPos {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.y, self.x, self.z).cmp(&(other.y, other.x, other.z))
    }
}

impl From<IVec3> for BlockPos {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<BlockPos> for IVec3 {
    fn from(p: BlockPos) -> Self {
        IVec3::new(p.x, p.y, p.z)
    }
}

impl std::fmt::Display for BlockPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Face normal from a reference block toward the cell being placed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Face {
    pub dx: i32,
    pub dy: i32,
    pub dz: i32,
}

impl Face {
    pub const UP: Face = Face { dx: 0, dy: 1, dz: 0 };

    /// Normal pointing from `reference` to `target`. Panics if they are not
    /// face-adjacent.
    pub fn between(reference: BlockPos, target: BlockPos) -> Face {
        let (dx, dy, dz) = (
            target.x - reference.x,
            target.y - reference.y,
            target.z - reference.z,
        );
        assert!(
            dx.abs() + dy.abs() + dz.abs() == 1,
            "face requires adjacent blocks, got {reference} -> {target}"
        );
        Face { dx, dy, dz }
    }

    pub fn apply(self, pos: BlockPos) -> BlockPos {
        pos.offset(self.dx, self.dy, self.dz)
    }
}

/// An observed world block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub pos: BlockPos,
    pub name: Item,
}

/// An observed entity (mob or dropped item holder).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u64,
    pub kind: String,
    pub pos: Vec3,
}
