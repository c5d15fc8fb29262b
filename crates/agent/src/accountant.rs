//! Inventory accounting over the world facade.
//!
//! The world is authoritative: there is no local ledger to drift. Snapshots
//! are re-read at every task boundary and after side-effecting calls.

use blockhand_core::{Inventory, Item, ToolKind, ToolTier};
use blockhand_facade::WorldFacade;

/// Read-only queries against the avatar's physical inventory.
pub struct InventoryAccountant;

impl InventoryAccountant {
    /// Fresh multiset view of the inventory.
    pub fn snapshot(facade: &dyn WorldFacade) -> Inventory {
        facade.inventory_items().into_iter().collect()
    }

    pub fn held(facade: &dyn WorldFacade, item: &Item) -> u32 {
        Self::snapshot(facade).count(item)
    }

    /// Best held tool of a kind, by tier. Kind and tier come from the item
    /// name (`stone_pickaxe`).
    pub fn best_tool_of_kind(held: &Inventory, kind: ToolKind) -> Option<(Item, ToolTier)> {
        held.items_matching(|name| ToolKind::of_item_name(name) == Some(kind))
            .filter_map(|(item, _)| {
                ToolTier::of_item_name(item.name()).map(|tier| (item.clone(), tier))
            })
            .max_by_key(|(_, tier)| *tier)
    }

    /// Best held weapon: swords outrank axes, higher tiers win within a
    /// kind.
    pub fn best_weapon(held: &Inventory) -> Option<Item> {
        Self::best_tool_of_kind(held, ToolKind::Sword)
            .or_else(|| Self::best_tool_of_kind(held, ToolKind::Axe))
            .map(|(item, _)| item)
    }
}
