//! Voxel blueprints.
//!
//! Origin-relative voxel lists with optional orientation properties. Air
//! voxels are elided; the file format is whatever parses into this shape.

use blockhand_core::{Inventory, Item};
use blockhand_facade::BlockPos;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Orientation state for directional blocks. The facade can only set what
/// the placement click implies, so these are best-effort hints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub half: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis: Option<String>,
}

impl BlockProperties {
    pub fn is_empty(&self) -> bool {
        self.facing.is_none() && self.half.is_none() && self.axis.is_none()
    }
}

/// One non-air cell of a blueprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlueprintVoxel {
    pub offset: BlockPos,
    pub block: Item,
    #[serde(default, skip_serializing_if = "BlockProperties::is_empty")]
    pub properties: BlockProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlueprintError {
    #[error("voxel at {offset} lies outside dims {dims:?}")]
    OutOfBounds { offset: BlockPos, dims: [u32; 3] },
    #[error("duplicate voxel at {offset}")]
    Duplicate { offset: BlockPos },
    #[error("explicit air voxel at {offset}; air is elided")]
    ExplicitAir { offset: BlockPos },
}

/// An origin-relative structure description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blueprint {
    /// Bounding-box extents along x, y, z.
    pub dims: [u32; 3],
    pub voxels: Vec<BlueprintVoxel>,
}

impl Blueprint {
    pub fn from_json_str(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// Check offsets are in bounds, unique, and not air.
    pub fn validate(&self) -> Result<(), BlueprintError> {
        let mut seen = std::collections::BTreeSet::new();
        for voxel in &self.voxels {
            let o = voxel.offset;
            let inside = o.x >= 0
                && o.y >= 0
                && o.z >= 0
                && (o.x as u32) < self.dims[0]
                && (o.y as u32) < self.dims[1]
                && (o.z as u32) < self.dims[2];
            if !inside {
                return Err(BlueprintError::OutOfBounds {
                    offset: o,
                    dims: self.dims,
                });
            }
            if voxel.block.name() == "air" {
                return Err(BlueprintError::ExplicitAir { offset: o });
            }
            if !seen.insert(o) {
                return Err(BlueprintError::Duplicate { offset: o });
            }
        }
        Ok(())
    }

    /// Multiset of blocks the build will consume.
    pub fn required_materials(&self) -> Inventory {
        let mut materials = Inventory::new();
        for voxel in &self.voxels {
            materials.add(&voxel.block, 1);
        }
        materials
    }

    /// Blueprint block at a relative offset, if any.
    pub fn voxel_at(&self, offset: BlockPos) -> Option<&BlueprintVoxel> {
        self.voxels.iter().find(|v| v.offset == offset)
    }
}
