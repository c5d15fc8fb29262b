//! Fuel burn values and the ordered fuel preference list.

use crate::recipes::WOOD_VARIANTS;
use crate::smelting::TICKS_PER_ITEM;
use blockhand_core::{Inventory, Item};

/// Burn ticks per fuel item. Anything absent burns for 0 ticks.
const FUEL_TICKS: &[(&str, u32)] = &[
    ("coal_block", 16_000),
    ("coal", 1_600),
    ("charcoal", 1_600),
    ("crafting_table", 300),
    ("stick", 100),
    ("bamboo", 50),
];

const LOG_TICKS: u32 = 300;
const PLANKS_TICKS: u32 = 300;

/// Burn ticks for `item` (0 if it is not fuel).
pub fn fuel_ticks(item: &Item) -> u32 {
    let name = item.name();
    if let Some(&(_, ticks)) = FUEL_TICKS.iter().find(|&&(n, _)| n == name) {
        return ticks;
    }
    if name.ends_with("_log") {
        return LOG_TICKS;
    }
    if name.ends_with("_planks") {
        return PLANKS_TICKS;
    }
    0
}

pub fn is_fuel(item: &Item) -> bool {
    fuel_ticks(item) > 0
}

/// Items of `fuel` needed to smelt `count` items.
pub fn fuel_needed(fuel: &Item, count: u32) -> u32 {
    let ticks = fuel_ticks(fuel);
    if ticks == 0 {
        return u32::MAX;
    }
    let total = u64::from(count) * u64::from(TICKS_PER_ITEM);
    total.div_ceil(u64::from(ticks)) as u32
}

fn best_held_variant(held: &Inventory, suffix: &str, default: &str) -> Item {
    let mut best: Option<(Item, u32)> = None;
    for variant in WOOD_VARIANTS {
        let item = Item::new(&format!("{variant}{suffix}"));
        let count = held.count(&item);
        if count == 0 {
            continue;
        }
        match &best {
            Some((_, best_count)) if *best_count >= count => {}
            _ => best = Some((item, count)),
        }
    }
    best.map(|(item, _)| item).unwrap_or_else(|| Item::new(default))
}

/// Concrete fuel candidates in preference order:
/// coal > charcoal > log > planks > stick. Wood classes resolve to the
/// variant held in the largest quantity (oak by default).
pub fn fuel_candidates(held: &Inventory) -> Vec<Item> {
    vec![
        Item::new("coal"),
        Item::new("charcoal"),
        best_held_variant(held, "_log", "oak_log"),
        best_held_variant(held, "_planks", "oak_planks"),
        Item::new("stick"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burn_values() {
        assert_eq!(fuel_ticks(&Item::new("coal")), 1600);
        assert_eq!(fuel_ticks(&Item::new("charcoal")), 1600);
        assert_eq!(fuel_ticks(&Item::new("spruce_log")), 300);
        assert_eq!(fuel_ticks(&Item::new("birch_planks")), 300);
        assert_eq!(fuel_ticks(&Item::new("stick")), 100);
        assert_eq!(fuel_ticks(&Item::new("stone")), 0);

        assert!(is_fuel(&Item::new("coal")));
        assert!(!is_fuel(&Item::new("cobblestone")));
    }

    #[test]
    fn fuel_needed_rounds_up() {
        // One coal burns 1600 ticks = 8 items.
        assert_eq!(fuel_needed(&Item::new("coal"), 8), 1);
        assert_eq!(fuel_needed(&Item::new("coal"), 9), 2);
        // ceil(4 * 200 / 300) = 3 logs for 4 items.
        assert_eq!(fuel_needed(&Item::new("oak_log"), 4), 3);
        // ceil(2 * 200 / 300) = 2 logs for 2 items.
        assert_eq!(fuel_needed(&Item::new("oak_log"), 2), 2);
    }

    #[test]
    fn non_fuel_is_never_enough() {
        assert_eq!(fuel_needed(&Item::new("stone"), 1), u32::MAX);
    }

    #[test]
    fn candidate_order_is_stable() {
        let names: Vec<_> = fuel_candidates(&Inventory::new())
            .iter()
            .map(|i| i.name().to_string())
            .collect();
        assert_eq!(names, vec!["coal", "charcoal", "oak_log", "oak_planks", "stick"]);
    }

    #[test]
    fn candidates_track_held_wood_variant() {
        let held: Inventory = [(Item::new("spruce_log"), 4)].into_iter().collect();
        let candidates = fuel_candidates(&held);
        assert_eq!(candidates[2], Item::new("spruce_log"));
    }
}
