//! Structure build executor.
//!
//! Phases: resource check (deficits go to the goal resolver), optional
//! ground prep and area clearing, then ordered place-with-verify over the
//! placement list. Per-voxel failures are retried, optionally scaffolded,
//! and finally counted rather than aborting the whole build.

use crate::blueprint::Blueprint;
use crate::plan::{placement_order, PlacementTask};
use blockhand_agent::{
    AbortFlag, Executor, ExecutorConfig, InventoryAccountant, PlacementReason, PlanOutcome,
    Resolver, StationAvailability, TaskError,
};
use blockhand_core::Item;
use blockhand_facade::{BlockPos, Face, WorldFacade};
use blockhand_knowledge::{is_replaceable, is_solid_support, KnowledgeBase};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Fill/scaffold materials in preference order.
const FILL_BLOCKS: &[&str] = &["dirt", "cobblestone", "stone", "netherrack"];

/// Build phases and fallbacks to run.
#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    /// Make every cell under the base rectangle solid before placing.
    pub prepare_ground: bool,
    /// Dig world blocks inside the bounding box that differ from the
    /// blueprint.
    pub clear_area: bool,
    /// Place a throwaway support cube under a voxel that keeps failing.
    pub scaffolding: bool,
    /// Sort placements bottom-up (y, x, z); otherwise keep authored order.
    pub layer_by_layer: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            prepare_ground: false,
            clear_area: false,
            scaffolding: true,
            layer_by_layer: true,
        }
    }
}

/// Outcome counts for a finished build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub placed: u32,
    pub skipped: u32,
    pub failed: u32,
}

enum VoxelOutcome {
    Placed,
    Skipped,
}

/// Drives one blueprint into the world. Single-owner and serial, like the
/// task executor it delegates resource production to.
pub struct StructureBuilder<'a> {
    facade: &'a mut dyn WorldFacade,
    kb: &'a KnowledgeBase,
    cfg: ExecutorConfig,
    abort: AbortFlag,
}

impl<'a> StructureBuilder<'a> {
    pub fn new(
        facade: &'a mut dyn WorldFacade,
        kb: &'a KnowledgeBase,
        cfg: ExecutorConfig,
        abort: AbortFlag,
    ) -> Self {
        Self {
            facade,
            kb,
            cfg,
            abort,
        }
    }

    /// Build `blueprint` at `origin`. Fails early on unsatisfiable
    /// materials or abort; placement failures are counted per voxel.
    pub fn build(
        &mut self,
        blueprint: &Blueprint,
        origin: BlockPos,
        options: &BuildOptions,
    ) -> Result<BuildReport, TaskError> {
        self.ensure_materials(blueprint, origin)?;

        if options.prepare_ground {
            self.prepare_ground(blueprint, origin)?;
        }
        if options.clear_area {
            self.clear_area(blueprint, origin)?;
        }

        let tasks = if options.layer_by_layer {
            placement_order(blueprint, origin)
        } else {
            blueprint
                .voxels
                .iter()
                .map(|voxel| PlacementTask {
                    pos: origin.offset(voxel.offset.x, voxel.offset.y, voxel.offset.z),
                    block: voxel.block.clone(),
                    properties: voxel.properties.clone(),
                })
                .collect()
        };

        let mut report = BuildReport::default();
        for task in &tasks {
            if self.abort.is_set() {
                info!(?report, "build aborted");
                return Err(TaskError::Aborted);
            }
            debug_assert!(task.block.name() != "air", "air voxels are elided");
            match self.place_voxel(task, options) {
                Ok(VoxelOutcome::Placed) => report.placed += 1,
                Ok(VoxelOutcome::Skipped) => report.skipped += 1,
                Err(error) => {
                    warn!(pos = %task.pos, block = %task.block, %error, "voxel failed");
                    report.failed += 1;
                }
            }
        }

        info!(?report, "build finished");
        Ok(report)
    }

    /// Compare required materials to the inventory; resolve and execute a
    /// production plan for anything missing. Voxels the world already
    /// satisfies cost nothing.
    fn ensure_materials(&mut self, blueprint: &Blueprint, origin: BlockPos) -> Result<(), TaskError> {
        let mut required = blockhand_core::Inventory::new();
        for voxel in &blueprint.voxels {
            let world_pos = origin.offset(voxel.offset.x, voxel.offset.y, voxel.offset.z);
            if self.block_name(world_pos) != voxel.block.name() {
                required.add(&voxel.block, 1);
            }
        }
        for (item, count) in required.iter() {
            let held = InventoryAccountant::held(&*self.facade, item);
            if held >= count {
                continue;
            }
            info!(item = %item, need = count, held, "producing missing build material");
            let snapshot = InventoryAccountant::snapshot(&*self.facade);
            let stations = StationAvailability::probe(&*self.facade, self.cfg.station_radius);
            let plan = Resolver::new(self.kb).resolve(item, count, &snapshot, stations)?;

            let mut executor = Executor::new(
                &mut *self.facade,
                self.kb,
                self.cfg.clone(),
                self.abort.clone(),
            );
            let outcome = executor.run(&plan).outcome;
            match outcome {
                PlanOutcome::Completed => {}
                PlanOutcome::Aborted => return Err(TaskError::Aborted),
                PlanOutcome::Failed { error, .. } => return Err(error),
            }
        }
        Ok(())
    }

    /// Make every cell one below the base rectangle solid, filling holes
    /// with whatever fill material is held.
    fn prepare_ground(&mut self, blueprint: &Blueprint, origin: BlockPos) -> Result<(), TaskError> {
        for x in 0..blueprint.dims[0] as i32 {
            for z in 0..blueprint.dims[2] as i32 {
                if self.abort.is_set() {
                    return Err(TaskError::Aborted);
                }
                let pos = origin.offset(x, -1, z);
                let name = self.block_name(pos);
                if is_solid_support(&name) {
                    continue;
                }

                if name != "air" && !is_replaceable(&name) {
                    self.approach(pos)?;
                    self.facade.dig(pos)?;
                }

                let held = InventoryAccountant::snapshot(&*self.facade);
                let Some(fill) = FILL_BLOCKS
                    .iter()
                    .map(|n| Item::new(n))
                    .find(|item| held.has(item, 1))
                else {
                    warn!(pos = %pos, "no fill material held for ground prep");
                    continue;
                };

                self.approach(pos)?;
                let filled = self
                    .facade
                    .equip(&fill)
                    .and_then(|_| {
                        let below = pos.below();
                        self.facade.place_block(below, Face::UP, &fill)
                    })
                    .is_ok();
                if !filled {
                    warn!(pos = %pos, "ground fill failed");
                }
            }
        }
        Ok(())
    }

    /// Dig everything in the bounding box that disagrees with the
    /// blueprint, top layer first.
    fn clear_area(&mut self, blueprint: &Blueprint, origin: BlockPos) -> Result<(), TaskError> {
        for y in (0..blueprint.dims[1] as i32).rev() {
            for x in 0..blueprint.dims[0] as i32 {
                for z in 0..blueprint.dims[2] as i32 {
                    if self.abort.is_set() {
                        return Err(TaskError::Aborted);
                    }
                    let offset = BlockPos::new(x, y, z);
                    let world_pos = origin.offset(x, y, z);
                    let current = self.block_name(world_pos);
                    if current == "air" {
                        continue;
                    }
                    let target = blueprint
                        .voxel_at(offset)
                        .map(|voxel| voxel.block.name())
                        .unwrap_or("air");
                    if current != target {
                        debug!(pos = %world_pos, block = %current, "clearing obstruction");
                        self.approach(world_pos)?;
                        self.facade.dig(world_pos)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Place one voxel with retries, scaffolding as a last resort.
    fn place_voxel(
        &mut self,
        task: &PlacementTask,
        options: &BuildOptions,
    ) -> Result<VoxelOutcome, TaskError> {
        let mut attempts = 0u32;
        loop {
            match self.place_voxel_once(task) {
                Ok(outcome) => return Ok(outcome),
                Err(err) if err.is_transient() && attempts + 1 < self.cfg.max_retries => {
                    attempts += 1;
                    self.facade.wait(self.cfg.retry_backoff);
                }
                Err(err) if err.is_transient()
                    && attempts + 1 == self.cfg.max_retries
                    && options.scaffolding =>
                {
                    attempts += 1;
                    debug!(pos = %task.pos, "scaffolding under a stubborn voxel");
                    self.place_scaffold(task.pos.below());
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn place_voxel_once(&mut self, task: &PlacementTask) -> Result<VoxelOutcome, TaskError> {
        let current = self.block_name(task.pos);
        if current == task.block.name() {
            return Ok(VoxelOutcome::Skipped);
        }

        // Step aside if the avatar is inside the target cell.
        let feet = BlockPos::containing(self.facade.position());
        if task.pos == feet || task.pos == feet.above() {
            self.micro_step(task.pos)?;
        }

        if current != "air" && !is_replaceable(&current) {
            self.approach(task.pos)?;
            self.facade.dig(task.pos)?;
        }

        self.approach(task.pos)?;

        self.facade
            .equip(&task.block)
            .map_err(|_| TaskError::Placement {
                pos: task.pos,
                reason: PlacementReason::EquipFailed,
            })?;

        let Some(reference) = self.find_reference(task) else {
            return Err(TaskError::Placement {
                pos: task.pos,
                reason: PlacementReason::NoReference,
            });
        };

        let face = Face::between(reference, task.pos);
        self.facade
            .place_block(reference, face, &task.block)
            .map_err(|_| TaskError::Placement {
                pos: task.pos,
                reason: PlacementReason::VerifyMismatch,
            })?;
        self.facade.wait(self.cfg.place_delay);

        if self.block_name(task.pos) == task.block.name() {
            Ok(VoxelOutcome::Placed)
        } else {
            Err(TaskError::Placement {
                pos: task.pos,
                reason: PlacementReason::VerifyMismatch,
            })
        }
    }

    /// Scan the six neighbours for a full solid cube to click. The scan
    /// order biases toward the attachment face the block's properties
    /// imply: below-first normally, above-first for top-half blocks, the
    /// cell behind a wall-mounted block first of all.
    fn find_reference(&self, task: &PlacementTask) -> Option<BlockPos> {
        let mut order: Vec<BlockPos> = task.pos.neighbors().to_vec();

        if task.properties.half.as_deref() == Some("top") {
            let above = order.pop().expect("neighbors is non-empty");
            order.insert(0, above);
        }
        if let Some(facing) = task.properties.facing.as_deref() {
            // A block facing north hangs off the block south of it.
            let behind = match facing {
                "north" => Some(task.pos.offset(0, 0, 1)),
                "south" => Some(task.pos.offset(0, 0, -1)),
                "east" => Some(task.pos.offset(-1, 0, 0)),
                "west" => Some(task.pos.offset(1, 0, 0)),
                _ => None,
            };
            if let Some(behind) = behind {
                order.retain(|p| *p != behind);
                order.insert(0, behind);
            }
        }

        order.into_iter().find(|neighbor| {
            self.facade
                .block_at(*neighbor)
                .map(|b| is_solid_support(b.name.name()))
                .unwrap_or(false)
        })
    }

    /// Best-effort throwaway support cube.
    fn place_scaffold(&mut self, pos: BlockPos) {
        if self.block_name(pos) != "air" {
            return;
        }
        let held = InventoryAccountant::snapshot(&*self.facade);
        let Some(material) = FILL_BLOCKS
            .iter()
            .map(|n| Item::new(n))
            .find(|item| held.has(item, 1))
        else {
            return;
        };
        let Some(reference) = pos.neighbors().into_iter().find(|n| {
            self.facade
                .block_at(*n)
                .map(|b| is_solid_support(b.name.name()))
                .unwrap_or(false)
        }) else {
            return;
        };
        let face = Face::between(reference, pos);
        let result = self
            .facade
            .equip(&material)
            .and_then(|_| self.facade.place_block(reference, face, &material));
        if let Err(error) = result {
            debug!(pos = %pos, %error, "scaffold placement failed");
        }
    }

    /// Walk within interaction reach of a cell.
    fn approach(&mut self, pos: BlockPos) -> Result<(), TaskError> {
        if pos.distance_to(self.facade.position()) <= self.cfg.reach {
            return Ok(());
        }
        // Aim for a lateral neighbour so the avatar does not stand in the
        // cell it is about to fill.
        let stand = pos
            .neighbors()
            .into_iter()
            .filter(|n| n.y == pos.y)
            .find(|n| {
                let name = self.block_name(*n);
                name == "air" || is_replaceable(&name)
            })
            .unwrap_or(pos);
        self.facade.path_to(stand.center(), self.cfg.reach)?;
        Ok(())
    }

    /// Shift one cell sideways, out of the placement target.
    fn micro_step(&mut self, avoid: BlockPos) -> Result<(), TaskError> {
        let feet = BlockPos::containing(self.facade.position());
        for (dx, dz) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let candidate = feet.offset(dx, 0, dz);
            if candidate == avoid {
                continue;
            }
            let name = self.block_name(candidate);
            if name == "air" || is_replaceable(&name) {
                self.facade.path_to(candidate.center(), 0.5)?;
                return Ok(());
            }
        }
        warn!(pos = %avoid, "nowhere to micro-step to");
        Ok(())
    }

    fn block_name(&self, pos: BlockPos) -> String {
        self.facade
            .block_at(pos)
            .map(|b| b.name.name().to_string())
            .unwrap_or_else(|| "air".to_string())
    }
}
