//! Static knowledge base for the blockhand agent.
//!
//! Five read-only tables (recipes, smelting, fuel, tool requirements,
//! drops) plus crop data and the placement-support classifier. Pure data,
//! no I/O, immutable after construction. [`KnowledgeBase`] is the explicit
//! handle threaded through the resolver and executors.

mod crops;
mod drops;
mod fuel;
mod recipes;
mod smelting;
mod support;
mod tools;

pub use crops::Crop;
pub use drops::BlockDrop;
pub use recipes::{Recipe, Station, WOOD_VARIANTS};
pub use smelting::{SmeltRecipe, TICKS_PER_ITEM};
pub use support::{is_replaceable, is_solid_support};

use blockhand_core::{Inventory, Item, ToolRequirement};

/// Bundle of the static tables.
///
/// Carries no state of its own; it exists so the knowledge the agent plans
/// against is an explicit value in every signature rather than a pile of
/// free functions reached from anywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct KnowledgeBase;

impl KnowledgeBase {
    pub fn new() -> Self {
        Self
    }

    /// Canonical crafting recipe producing `item`, with wood placeholders
    /// resolved against `held`.
    pub fn recipe_for(&self, item: &Item, held: &Inventory) -> Option<Recipe> {
        recipes::recipe_for(item, held)
    }

    /// Resolve an ingredient placeholder (`planks`, `log`) against `held`.
    pub fn resolve_ingredient(&self, name: &str, held: &Inventory) -> Item {
        recipes::resolve_ingredient(name, held)
    }

    /// Smelting recipe producing `item`, if any.
    pub fn smelt_for(&self, item: &Item) -> Option<SmeltRecipe> {
        smelting::smelt_for(item)
    }

    /// Input variant for a smelting recipe the caller is best placed to use.
    pub fn smelt_input_for(&self, recipe: &SmeltRecipe, held: &Inventory) -> Item {
        smelting::smelt_input_for(recipe, held)
    }

    /// What smelting `input` produces, if anything.
    pub fn smelt_output_of(&self, input: &Item) -> Option<Item> {
        smelting::smelt_output_of(input)
    }

    /// Burn ticks for `item` (0 if it is not fuel).
    pub fn fuel_ticks(&self, item: &Item) -> u32 {
        fuel::fuel_ticks(item)
    }

    pub fn is_fuel(&self, item: &Item) -> bool {
        fuel::is_fuel(item)
    }

    /// Items of `fuel` needed to smelt `count` items.
    pub fn fuel_needed(&self, fuel: &Item, count: u32) -> u32 {
        fuel::fuel_needed(fuel, count)
    }

    /// Concrete fuel candidates in preference order.
    pub fn fuel_candidates(&self, held: &Inventory) -> Vec<Item> {
        fuel::fuel_candidates(held)
    }

    /// Minimum tool needed to mine `block`; `None` means unbreakable.
    pub fn tool_requirement_for(&self, block: &Item) -> Option<ToolRequirement> {
        tools::tool_requirement_for(block)
    }

    /// Drop yielded by mining `block` with an adequate tool.
    pub fn drop_for(&self, block: &Item) -> Option<BlockDrop> {
        drops::drop_for(block)
    }

    /// Canonical block to mine to obtain `item`.
    pub fn source_block_for(&self, item: &Item) -> Option<Item> {
        drops::source_block_for(item)
    }

    /// Crop that yields `item` when harvested.
    pub fn crop_for(&self, item: &Item) -> Option<Crop> {
        crops::crop_for(item)
    }

    /// Crop data for a planted block name.
    pub fn crop_for_block(&self, block: &Item) -> Option<Crop> {
        crops::crop_for_block(block)
    }

    /// Crop planted by `seed`.
    pub fn crop_for_seed(&self, seed: &Item) -> Option<Crop> {
        crops::crop_for_seed(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_bundle_reaches_every_table() {
        let kb = KnowledgeBase::new();
        let held = Inventory::new();

        assert!(kb.recipe_for(&Item::new("stick"), &held).is_some());
        assert!(kb.smelt_for(&Item::new("iron_ingot")).is_some());
        assert_eq!(kb.fuel_ticks(&Item::new("coal")), 1600);
        assert!(kb.tool_requirement_for(&Item::new("stone")).is_some());
        assert!(kb.drop_for(&Item::new("stone")).is_some());
        assert!(kb.source_block_for(&Item::new("cobblestone")).is_some());
        assert!(kb.crop_for(&Item::new("wheat")).is_some());
        assert!(is_solid_support("stone"));
    }
}
