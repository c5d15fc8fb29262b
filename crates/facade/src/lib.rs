//! The world facade: the seam between the agent core and the external
//! world-interaction library.
//!
//! The core depends on this contract, not on any implementation. All calls
//! are blocking; in the single-threaded cooperative model every facade call
//! is a suspension point, and a call returns only once the world has
//! settled (navigation finished, block broken, container updated).

mod types;

pub use types::{Block, BlockPos, Entity, Face};

use blockhand_core::Item;
use blockhand_knowledge::Recipe;
use glam::Vec3;
use std::time::Duration;
use thiserror::Error;

/// Navigation failures, as reported by the pathfinder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NavError {
    #[error("goal is unreachable")]
    Unreachable,
    #[error("pathfinding timed out")]
    Timeout,
}

/// Failures surfaced by the world facade.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FacadeError {
    #[error(transparent)]
    Nav(#[from] NavError),
    #[error("world rejected the request: {0}")]
    Rejected(String),
    #[error("disconnected from the world")]
    Disconnected,
}

/// Everything the agent can observe or do in the world.
///
/// Implementations: the production adapter over the external bot library,
/// and `blockhand-testkit`'s deterministic simulator.
pub trait WorldFacade {
    // --- observation ---

    /// Avatar feet position.
    fn position(&self) -> Vec3;

    fn health(&self) -> f32;

    fn food(&self) -> f32;

    /// Block at `pos`, `None` if the chunk is not loaded. Air is a real
    /// block named `air`, not `None`.
    fn block_at(&self, pos: BlockPos) -> Option<Block>;

    /// Nearest block whose name satisfies `matcher`, within `max_distance`
    /// of the avatar. Ties break deterministically.
    fn find_block(&self, matcher: &dyn Fn(&str) -> bool, max_distance: f64) -> Option<Block>;

    /// Nearest entity of the given kind within `max_distance`.
    fn find_entity(&self, kind: &str, max_distance: f64) -> Option<Entity>;

    /// Current health of a previously found entity, `None` once despawned.
    fn entity_health(&self, entity_id: u64) -> Option<f32>;

    /// Feet position of a named player, if visible.
    fn player_position(&self, name: &str) -> Option<Vec3>;

    /// Physical inventory contents.
    fn inventory_items(&self) -> Vec<(Item, u32)>;

    // --- action ---

    /// Walk until within `reach` of `goal`.
    fn path_to(&mut self, goal: Vec3, reach: f64) -> Result<(), NavError>;

    /// Break the block at `pos` with whatever is equipped. Drops within
    /// pickup range land in the inventory.
    fn dig(&mut self, pos: BlockPos) -> Result<(), FacadeError>;

    /// Place `item` against the block at `reference`, on its `face`.
    fn place_block(&mut self, reference: BlockPos, face: Face, item: &Item)
        -> Result<(), FacadeError>;

    /// Move `item` to the hand slot.
    fn equip(&mut self, item: &Item) -> Result<(), FacadeError>;

    /// Run `recipe` once. The facade checks station reachability and
    /// ingredient presence and moves items itself.
    fn craft(&mut self, recipe: &Recipe) -> Result<(), FacadeError>;

    /// Drop `count` of `item` on the ground in front of the avatar.
    fn toss(&mut self, item: &Item, count: u32) -> Result<(), FacadeError>;

    /// Swing at an entity (one hit; cooldown is the caller's problem).
    fn attack(&mut self, entity_id: u64) -> Result<(), FacadeError>;

    // --- furnace container ---

    fn furnace_put_input(&mut self, pos: BlockPos, item: &Item, count: u32)
        -> Result<(), FacadeError>;

    fn furnace_put_fuel(&mut self, pos: BlockPos, item: &Item, count: u32)
        -> Result<(), FacadeError>;

    /// Items currently in the output slot.
    fn furnace_output_count(&self, pos: BlockPos) -> u32;

    /// Move the output slot contents into the inventory.
    fn furnace_take_output(&mut self, pos: BlockPos) -> Result<Option<(Item, u32)>, FacadeError>;

    // --- time ---

    /// Let the world run for `duration`. The cooperative yield.
    fn wait(&mut self, duration: Duration);
}
