//! Station placement.
//!
//! Locating and pathing to stations lives on the executor; this module
//! owns the physical placement: pick a spot near the avatar with a solid
//! block under it, place, verify.

use crate::error::{PlacementReason, TaskError};
use crate::executor::ExecutorConfig;
use blockhand_core::Item;
use blockhand_facade::{BlockPos, Face, WorldFacade};
use blockhand_knowledge::{is_replaceable, is_solid_support};

/// Candidate cells around the avatar's feet, nearest ring first.
const PLACE_OFFSETS: [(i32, i32); 10] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
    (2, 0),
    (-2, 0),
];

/// Place a held station item on solid ground near the avatar. Returns the
/// cell it ended up in.
pub(crate) fn place_station(
    facade: &mut dyn WorldFacade,
    item: &Item,
    cfg: &ExecutorConfig,
) -> Result<BlockPos, TaskError> {
    let feet = BlockPos::containing(facade.position());

    facade.equip(item).map_err(|_| TaskError::Placement {
        pos: feet,
        reason: PlacementReason::EquipFailed,
    })?;

    let mut last_candidate = feet;
    for (dx, dz) in PLACE_OFFSETS {
        let target = feet.offset(dx, 0, dz);
        last_candidate = target;

        let Some(current) = facade.block_at(target) else {
            continue;
        };
        if !is_replaceable(current.name.name()) {
            continue;
        }
        let Some(below) = facade.block_at(target.below()) else {
            continue;
        };
        if !is_solid_support(below.name.name()) {
            continue;
        }

        if facade.place_block(target.below(), Face::UP, item).is_err() {
            continue;
        }
        facade.wait(cfg.place_delay);

        let placed = facade
            .block_at(target)
            .map(|b| b.name == *item)
            .unwrap_or(false);
        if placed {
            return Ok(target);
        }
    }

    Err(TaskError::Placement {
        pos: last_candidate,
        reason: PlacementReason::NoReference,
    })
}
