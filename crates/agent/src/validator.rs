//! Tool adequacy checks for target blocks.

use crate::accountant::InventoryAccountant;
use blockhand_core::{Inventory, Item, ToolKind, ToolRequirement, ToolTier};
use blockhand_knowledge::KnowledgeBase;

/// Result of checking whether a block can be mined with what is held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCheck {
    /// Mineable now. `tool` is the item to equip (`None` means bare hands,
    /// no matching tool held).
    Ready { tool: Option<Item> },
    /// Mineable in principle, but no adequate tool is held.
    Missing { requirement: ToolRequirement },
    /// No tool tier can break this block.
    Unbreakable,
}

impl ToolCheck {
    pub fn is_ready(&self) -> bool {
        matches!(self, ToolCheck::Ready { .. })
    }
}

/// Best held tool satisfying `requirement`: matching kind, highest tier.
pub fn best_adequate_tool(held: &Inventory, requirement: &ToolRequirement) -> Option<Item> {
    held.items_matching(|name| requirement.satisfied_by(name))
        .filter_map(|(item, _)| ToolTier::of_item_name(item.name()).map(|tier| (item.clone(), tier)))
        .max_by_key(|(_, tier)| *tier)
        .map(|(item, _)| item)
}

/// Can `block` be mined with the tools in `held`?
///
/// Monotone in the inventory: adding a tool never turns `Ready` into
/// `Missing`.
pub fn check_tool(kb: &KnowledgeBase, held: &Inventory, block: &Item) -> ToolCheck {
    let Some(requirement) = kb.tool_requirement_for(block) else {
        return ToolCheck::Unbreakable;
    };

    if requirement.hand_suffices() {
        // Any preferred-kind tool speeds things up but nothing is required.
        let tool = match requirement.kind {
            ToolKind::Any => None,
            kind => InventoryAccountant::best_tool_of_kind(held, kind).map(|(item, _)| item),
        };
        return ToolCheck::Ready { tool };
    }

    match best_adequate_tool(held, &requirement) {
        Some(tool) => ToolCheck::Ready { tool: Some(tool) },
        None => ToolCheck::Missing { requirement },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inv(entries: &[(&str, u32)]) -> Inventory {
        entries
            .iter()
            .map(|&(name, count)| (Item::new(name), count))
            .collect()
    }

    fn kb() -> KnowledgeBase {
        KnowledgeBase::new()
    }

    #[test]
    fn stone_requires_a_pickaxe() {
        let check = check_tool(&kb(), &Inventory::new(), &Item::new("stone"));
        assert!(matches!(check, ToolCheck::Missing { .. }));

        let check = check_tool(&kb(), &inv(&[("wooden_pickaxe", 1)]), &Item::new("stone"));
        assert_eq!(
            check,
            ToolCheck::Ready {
                tool: Some(Item::new("wooden_pickaxe"))
            }
        );
    }

    #[test]
    fn highest_adequate_tier_is_chosen() {
        let held = inv(&[("wooden_pickaxe", 1), ("diamond_pickaxe", 1)]);
        let check = check_tool(&kb(), &held, &Item::new("iron_ore"));
        assert_eq!(
            check,
            ToolCheck::Ready {
                tool: Some(Item::new("diamond_pickaxe"))
            }
        );
    }

    #[test]
    fn wrong_kind_does_not_qualify() {
        let held = inv(&[("diamond_axe", 1)]);
        let check = check_tool(&kb(), &held, &Item::new("stone"));
        assert!(matches!(check, ToolCheck::Missing { .. }));
    }

    #[test]
    fn hand_mineable_blocks_are_always_ready() {
        let check = check_tool(&kb(), &Inventory::new(), &Item::new("oak_log"));
        assert_eq!(check, ToolCheck::Ready { tool: None });

        // With an axe held, it is offered for speed.
        let check = check_tool(&kb(), &inv(&[("stone_axe", 1)]), &Item::new("oak_log"));
        assert_eq!(
            check,
            ToolCheck::Ready {
                tool: Some(Item::new("stone_axe"))
            }
        );
    }

    #[test]
    fn bedrock_is_unbreakable() {
        let held = inv(&[("netherite_pickaxe", 1)]);
        assert_eq!(check_tool(&kb(), &held, &Item::new("bedrock")), ToolCheck::Unbreakable);
    }

    #[test]
    fn adequacy_is_monotone_in_the_inventory() {
        let kb = kb();
        let block = Item::new("iron_ore");
        let mut held = inv(&[("stone_pickaxe", 1)]);
        assert!(check_tool(&kb, &held, &block).is_ready());

        // Adding anything (even a lesser tool) never breaks readiness.
        held.add(&Item::new("wooden_pickaxe"), 1);
        held.add(&Item::new("stick"), 10);
        assert!(check_tool(&kb, &held, &block).is_ready());
    }
}
