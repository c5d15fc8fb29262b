//! Placement ordering and the support invariant.

use crate::blueprint::{BlockProperties, Blueprint};
use blockhand_core::Item;
use blockhand_facade::BlockPos;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One block to place at an absolute world position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementTask {
    pub pos: BlockPos,
    pub block: Item,
    pub properties: BlockProperties,
}

/// Translate a blueprint to world space and order it bottom-up:
/// (y, x, z) ascending, so the layer below is complete before the layer
/// above starts.
pub fn placement_order(blueprint: &Blueprint, origin: BlockPos) -> Vec<PlacementTask> {
    let mut tasks: Vec<PlacementTask> = blueprint
        .voxels
        .iter()
        .map(|voxel| PlacementTask {
            pos: origin.offset(voxel.offset.x, voxel.offset.y, voxel.offset.z),
            block: voxel.block.clone(),
            properties: voxel.properties.clone(),
        })
        .collect();
    // BlockPos orders by (y, x, z) already.
    tasks.sort_by(|a, b| a.pos.cmp(&b.pos));
    tasks
}

/// First voxel in the order that has no support face when it comes up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsupportedVoxel {
    pub pos: BlockPos,
}

/// Check the support invariant: every task must have at least one
/// face-adjacent neighbour that is either pre-existing world support or an
/// earlier placement in the order (prior placements count as solid).
pub fn verify_support(
    tasks: &[PlacementTask],
    world_is_support: impl Fn(BlockPos) -> bool,
) -> Result<(), UnsupportedVoxel> {
    let mut placed: BTreeSet<BlockPos> = BTreeSet::new();
    for task in tasks {
        let supported = task
            .pos
            .neighbors()
            .iter()
            .any(|n| placed.contains(n) || world_is_support(*n));
        if !supported {
            return Err(UnsupportedVoxel { pos: task.pos });
        }
        placed.insert(task.pos);
    }
    Ok(())
}
