//! Smelting table.
//!
//! Fuel is deliberately decoupled (see [`crate::fuel`]); a smelting recipe
//! only names what goes in the top slot.

use blockhand_core::{Inventory, Item};
use serde::{Deserialize, Serialize};

/// Furnace ticks to smelt one item (20 ticks = 1 second).
pub const TICKS_PER_ITEM: u32 = 200;

/// A smelting recipe: canonical input plus interchangeable alternates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmeltRecipe {
    pub output: Item,
    pub input: Item,
    pub alternate_inputs: Vec<Item>,
    pub ticks_per_item: u32,
}

struct SmeltSpec {
    output: &'static str,
    input: &'static str,
    alternates: &'static [&'static str],
}

const SMELTS: &[SmeltSpec] = &[
    SmeltSpec {
        output: "iron_ingot",
        input: "raw_iron",
        alternates: &[],
    },
    SmeltSpec {
        output: "gold_ingot",
        input: "raw_gold",
        alternates: &[],
    },
    SmeltSpec {
        output: "copper_ingot",
        input: "raw_copper",
        alternates: &[],
    },
    SmeltSpec {
        output: "glass",
        input: "sand",
        alternates: &[],
    },
    SmeltSpec {
        output: "stone",
        input: "cobblestone",
        alternates: &[],
    },
    SmeltSpec {
        output: "charcoal",
        input: "oak_log",
        alternates: &[
            "acacia_log",
            "birch_log",
            "dark_oak_log",
            "jungle_log",
            "spruce_log",
        ],
    },
    SmeltSpec {
        output: "cooked_beef",
        input: "beef",
        alternates: &[],
    },
    SmeltSpec {
        output: "cooked_porkchop",
        input: "porkchop",
        alternates: &[],
    },
    SmeltSpec {
        output: "baked_potato",
        input: "potato",
        alternates: &[],
    },
    SmeltSpec {
        output: "dried_kelp",
        input: "kelp",
        alternates: &[],
    },
];

/// Smelting recipe producing `item`, if any.
pub fn smelt_for(item: &Item) -> Option<SmeltRecipe> {
    SMELTS
        .iter()
        .find(|spec| spec.output == item.name())
        .map(|spec| SmeltRecipe {
            output: Item::new(spec.output),
            input: Item::new(spec.input),
            alternate_inputs: spec.alternates.iter().map(|n| Item::new(n)).collect(),
            ticks_per_item: TICKS_PER_ITEM,
        })
}

/// What smelting `input` produces, if anything. Alternate inputs smelt into
/// the same output as their canonical form.
pub fn smelt_output_of(input: &Item) -> Option<Item> {
    let name = input.name();
    SMELTS
        .iter()
        .find(|spec| spec.input == name || spec.alternates.contains(&name))
        .map(|spec| Item::new(spec.output))
}

/// Choose the input variant the caller is best placed to feed: the variant
/// held in the largest quantity, canonical input on ties or empty hands.
pub fn smelt_input_for(recipe: &SmeltRecipe, held: &Inventory) -> Item {
    let mut best = recipe.input.clone();
    let mut best_count = held.count(&recipe.input);
    for alt in &recipe.alternate_inputs {
        let count = held.count(alt);
        if count > best_count {
            best = alt.clone();
            best_count = count;
        }
    }
    best
}
