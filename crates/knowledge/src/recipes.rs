//! Crafting recipe table.
//!
//! Shaped vs shapeless is erased: only the aggregate input multiset matters.
//! Ingredient placeholders (`planks`, `log`) are resolved against the
//! caller's inventory so a bot holding only spruce wood never plans around
//! oak.

use blockhand_core::{Inventory, Item};
use serde::{Deserialize, Serialize};

/// World blocks that activate recipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Station {
    CraftingTable,
    Furnace,
}

impl Station {
    pub fn block_name(self) -> &'static str {
        match self {
            Station::CraftingTable => "crafting_table",
            Station::Furnace => "furnace",
        }
    }
}

impl std::fmt::Display for Station {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.block_name())
    }
}

/// A crafting recipe with concrete (placeholder-resolved) ingredients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub output: Item,
    pub output_count: u32,
    /// Aggregate input multiset, name-ordered for determinism.
    pub inputs: Vec<(Item, u32)>,
    /// `None` means the 2x2 hand grid suffices.
    pub station: Option<Station>,
}

/// Raw recipe entry; inputs may use the `planks`/`log` placeholders.
struct RecipeSpec {
    output: &'static str,
    output_count: u32,
    inputs: &'static [(&'static str, u32)],
    needs_table: bool,
}

/// Wood variants recognised by the placeholder resolver, lexicographic.
pub const WOOD_VARIANTS: &[&str] = &["acacia", "birch", "dark_oak", "jungle", "oak", "spruce"];

const RECIPES: &[RecipeSpec] = &[
    RecipeSpec {
        output: "stick",
        output_count: 4,
        inputs: &[("planks", 2)],
        needs_table: false,
    },
    RecipeSpec {
        output: "crafting_table",
        output_count: 1,
        inputs: &[("planks", 4)],
        needs_table: false,
    },
    RecipeSpec {
        output: "furnace",
        output_count: 1,
        inputs: &[("cobblestone", 8)],
        needs_table: true,
    },
    RecipeSpec {
        output: "chest",
        output_count: 1,
        inputs: &[("planks", 8)],
        needs_table: true,
    },
    RecipeSpec {
        output: "torch",
        output_count: 4,
        inputs: &[("coal", 1), ("stick", 1)],
        needs_table: false,
    },
    RecipeSpec {
        output: "ladder",
        output_count: 3,
        inputs: &[("stick", 7)],
        needs_table: true,
    },
    RecipeSpec {
        output: "iron_block",
        output_count: 1,
        inputs: &[("iron_ingot", 9)],
        needs_table: true,
    },
    // Tool matrix. Head counts follow the vanilla shapes.
    RecipeSpec {
        output: "wooden_pickaxe",
        output_count: 1,
        inputs: &[("planks", 3), ("stick", 2)],
        needs_table: true,
    },
    RecipeSpec {
        output: "wooden_axe",
        output_count: 1,
        inputs: &[("planks", 3), ("stick", 2)],
        needs_table: true,
    },
    RecipeSpec {
        output: "wooden_shovel",
        output_count: 1,
        inputs: &[("planks", 1), ("stick", 2)],
        needs_table: true,
    },
    RecipeSpec {
        output: "wooden_hoe",
        output_count: 1,
        inputs: &[("planks", 2), ("stick", 2)],
        needs_table: true,
    },
    RecipeSpec {
        output: "wooden_sword",
        output_count: 1,
        inputs: &[("planks", 2), ("stick", 1)],
        needs_table: true,
    },
    RecipeSpec {
        output: "stone_pickaxe",
        output_count: 1,
        inputs: &[("cobblestone", 3), ("stick", 2)],
        needs_table: true,
    },
    RecipeSpec {
        output: "stone_axe",
        output_count: 1,
        inputs: &[("cobblestone", 3), ("stick", 2)],
        needs_table: true,
    },
    RecipeSpec {
        output: "stone_shovel",
        output_count: 1,
        inputs: &[("cobblestone", 1), ("stick", 2)],
        needs_table: true,
    },
    RecipeSpec {
        output: "stone_hoe",
        output_count: 1,
        inputs: &[("cobblestone", 2), ("stick", 2)],
        needs_table: true,
    },
    RecipeSpec {
        output: "stone_sword",
        output_count: 1,
        inputs: &[("cobblestone", 2), ("stick", 1)],
        needs_table: true,
    },
    RecipeSpec {
        output: "iron_pickaxe",
        output_count: 1,
        inputs: &[("iron_ingot", 3), ("stick", 2)],
        needs_table: true,
    },
    RecipeSpec {
        output: "iron_axe",
        output_count: 1,
        inputs: &[("iron_ingot", 3), ("stick", 2)],
        needs_table: true,
    },
    RecipeSpec {
        output: "iron_shovel",
        output_count: 1,
        inputs: &[("iron_ingot", 1), ("stick", 2)],
        needs_table: true,
    },
    RecipeSpec {
        output: "iron_hoe",
        output_count: 1,
        inputs: &[("iron_ingot", 2), ("stick", 2)],
        needs_table: true,
    },
    RecipeSpec {
        output: "iron_sword",
        output_count: 1,
        inputs: &[("iron_ingot", 2), ("stick", 1)],
        needs_table: true,
    },
    RecipeSpec {
        output: "diamond_pickaxe",
        output_count: 1,
        inputs: &[("diamond", 3), ("stick", 2)],
        needs_table: true,
    },
    RecipeSpec {
        output: "diamond_axe",
        output_count: 1,
        inputs: &[("diamond", 3), ("stick", 2)],
        needs_table: true,
    },
    RecipeSpec {
        output: "diamond_shovel",
        output_count: 1,
        inputs: &[("diamond", 1), ("stick", 2)],
        needs_table: true,
    },
    RecipeSpec {
        output: "diamond_hoe",
        output_count: 1,
        inputs: &[("diamond", 2), ("stick", 2)],
        needs_table: true,
    },
    RecipeSpec {
        output: "diamond_sword",
        output_count: 1,
        inputs: &[("diamond", 2), ("stick", 1)],
        needs_table: true,
    },
];

fn variant_of(name: &str, suffix: &str) -> Option<&'static str> {
    let stem = name.strip_suffix(suffix)?;
    WOOD_VARIANTS.iter().copied().find(|v| *v == stem)
}

/// Pick the wood variant the caller is best placed to use: the variant held
/// in the largest quantity wins, ties break lexicographically, and `oak` is
/// the canonical default when nothing relevant is held.
fn best_wood_variant(held: &Inventory, suffix: &str) -> &'static str {
    let mut best: Option<(&'static str, u32)> = None;
    for variant in WOOD_VARIANTS {
        let count = held.count(&Item::new(&format!("{variant}{suffix}")));
        if count == 0 {
            continue;
        }
        match best {
            Some((_, best_count)) if best_count >= count => {}
            _ => best = Some((variant, count)),
        }
    }
    best.map(|(v, _)| v).unwrap_or("oak")
}

/// Resolve an ingredient placeholder against the caller's inventory.
///
/// `planks` prefers the plank variant held in quantity, falling back to the
/// variant craftable from a held log; `log` works the same way one level
/// down. Concrete names pass through untouched.
pub fn resolve_ingredient(name: &str, held: &Inventory) -> Item {
    match name {
        "planks" => {
            let variant = {
                let direct = best_wood_variant(held, "_planks");
                if direct != "oak" || held.has(&Item::new("oak_planks"), 1) {
                    direct
                } else {
                    best_wood_variant(held, "_log")
                }
            };
            Item::new(&format!("{variant}_planks"))
        }
        "log" => Item::new(&format!("{}_log", best_wood_variant(held, "_log"))),
        other => Item::new(other),
    }
}

fn resolve_spec(spec: &RecipeSpec, held: &Inventory) -> Recipe {
    let mut inputs: Vec<(Item, u32)> = spec
        .inputs
        .iter()
        .map(|&(name, count)| (resolve_ingredient(name, held), count))
        .collect();
    inputs.sort_by(|a, b| a.0.cmp(&b.0));
    Recipe {
        output: Item::new(spec.output),
        output_count: spec.output_count,
        inputs,
        station: spec.needs_table.then_some(Station::CraftingTable),
    }
}

/// Canonical recipe for `item`, with placeholders resolved against `held`.
pub fn recipe_for(item: &Item, held: &Inventory) -> Option<Recipe> {
    // Planks come from the matching log, one recipe per variant.
    if let Some(variant) = variant_of(item.name(), "_planks") {
        return Some(Recipe {
            output: item.clone(),
            output_count: 4,
            inputs: vec![(Item::new(&format!("{variant}_log")), 1)],
            station: None,
        });
    }

    RECIPES
        .iter()
        .find(|spec| spec.output == item.name())
        .map(|spec| resolve_spec(spec, held))
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

    #[test]
    fn planks_recipe_tracks_the_wood_variant() {
        let recipe = recipe_for(&Item::new("spruce_planks"), &Inventory::new()).unwrap();
        assert_eq!(recipe.output_count, 4);
        assert_eq!(recipe.inputs, vec![(Item::new("spruce_log"), 1)]);
        assert_eq!(recipe.station, None);
    }

    #[test]
    fn stick_uses_held_plank_variant() {
        let held = inv(&[("birch_planks", 6)]);
        let recipe = recipe_for(&Item::new("stick"), &held).unwrap();
        assert_eq!(recipe.inputs, vec![(Item::new("birch_planks"), 2)]);
        assert_eq!(recipe.output_count, 4);
    }

    #[test]
    fn stick_falls_back_to_held_log_variant() {
        let held = inv(&[("spruce_log", 3)]);
        let recipe = recipe_for(&Item::new("stick"), &held).unwrap();
        assert_eq!(recipe.inputs, vec![(Item::new("spruce_planks"), 2)]);
    }

    #[test]
    fn placeholder_defaults_to_oak() {
        assert_eq!(
            resolve_ingredient("planks", &Inventory::new()),
            Item::new("oak_planks")
        );
        assert_eq!(resolve_ingredient("log", &Inventory::new()), Item::new("oak_log"));
    }

    #[test]
    fn largest_held_stack_wins_with_lexicographic_ties() {
        let held = inv(&[("spruce_planks", 4), ("birch_planks", 4)]);
        assert_eq!(
            resolve_ingredient("planks", &held),
            Item::new("birch_planks")
        );
    }

    #[test]
    fn crafting_table_needs_no_station() {
        let recipe = recipe_for(&Item::new("crafting_table"), &Inventory::new()).unwrap();
        assert_eq!(recipe.station, None);
        assert_eq!(recipe.inputs, vec![(Item::new("oak_planks"), 4)]);
    }

    #[test]
    fn tools_need_the_table() {
        for name in ["wooden_pickaxe", "stone_axe", "iron_sword", "diamond_hoe"] {
            let recipe = recipe_for(&Item::new(name), &Inventory::new()).unwrap();
            assert_eq!(recipe.station, Some(Station::CraftingTable), "{name}");
        }
    }

    #[test]
    fn unknown_items_have_no_recipe() {
        assert!(recipe_for(&Item::new("bedrock"), &Inventory::new()).is_none());
        assert!(recipe_for(&Item::new("oak_log"), &Inventory::new()).is_none());
    }

    #[test]
    fn recipe_inputs_are_name_ordered() {
        let recipe = recipe_for(&Item::new("torch"), &Inventory::new()).unwrap();
        let names: Vec<_> = recipe.inputs.iter().map(|(i, _)| i.name()).collect();
        assert_eq!(names, vec!["coal", "stick"]);
    }
}
