//! Placement-support classification.
//!
//! "Can I click this neighbour to place a block against it?" is not the same
//! question as "is it non-air": stairs, slabs, torches and friends are solid
//! enough to collide with but are not valid placement references. The
//! classifier is a whitelist of full cubes plus name-pattern rules, with a
//! blacklist checked first so `oak_planks` passes while `oak_planks_stairs`
//! does not.

/// Exact names that are always valid full-cube supports. Checked before the
/// blacklist so `bedrock` survives the `bed` substring rule and `snow_block`
/// survives the snow-layer exclusion.
const SUPPORT_WHITELIST: &[&str] = &[
    "stone",
    "cobblestone",
    "mossy_cobblestone",
    "stone_bricks",
    "dirt",
    "coarse_dirt",
    "rooted_dirt",
    "grass_block",
    "podzol",
    "mycelium",
    "sand",
    "red_sand",
    "gravel",
    "clay",
    "sandstone",
    "red_sandstone",
    "obsidian",
    "bedrock",
    "netherrack",
    "deepslate",
    "cobbled_deepslate",
    "glowstone",
    "snow_block",
    "ice",
    "packed_ice",
    "blue_ice",
    "glass",
    "bookshelf",
    "hay_block",
    "melon",
    "pumpkin",
    "dried_kelp_block",
];

/// Name fragments that disqualify a block as a reference face.
const SUPPORT_BLACKLIST: &[&str] = &[
    "stairs",
    "slab",
    "door",
    "trapdoor",
    "fence",
    "gate",
    "ladder",
    "torch",
    "button",
    "lever",
    "rail",
    "carpet",
    "pane",
    "bars",
    "chest",
    "barrel",
    "furnace",
    "crafting_table",
    "pressure_plate",
    "sign",
    "bed",
    "anvil",
    "cauldron",
    "hopper",
    "lantern",
    "campfire",
    "flower",
    "sapling",
    "leaves",
    "vine",
    "lily",
    "candle",
    "banner",
    "head",
    "skull",
    "pot",
];

/// Name suffixes that are always full cubes.
const SUPPORT_SUFFIXES: &[&str] = &[
    "_planks",
    "_log",
    "_wood",
    "_ore",
    "_wool",
    "_terracotta",
    "_concrete",
    "_block",
];

/// Whether a block named `name` is a full solid cube the avatar can place
/// against.
pub fn is_solid_support(name: &str) -> bool {
    if SUPPORT_WHITELIST.contains(&name) {
        return true;
    }
    if SUPPORT_BLACKLIST.iter().any(|frag| name.contains(frag)) {
        return false;
    }
    SUPPORT_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Blocks that can be overwritten by placement without digging first.
const REPLACEABLE: &[&str] = &[
    "air",
    "cave_air",
    "void_air",
    "grass",
    "short_grass",
    "tall_grass",
    "fern",
    "large_fern",
    "dead_bush",
    "snow",
    "water",
    "seagrass",
    "tall_seagrass",
];

/// Whether a block named `name` can be overwritten without an explicit dig.
pub fn is_replaceable(name: &str) -> bool {
    REPLACEABLE.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_cubes_are_supports() {
        for name in ["stone", "dirt", "grass_block", "oak_planks", "spruce_log", "iron_ore"] {
            assert!(is_solid_support(name), "{name} should support placement");
        }
    }

    #[test]
    fn partial_blocks_are_not_supports() {
        for name in [
            "oak_stairs",
            "stone_slab",
            "oak_door",
            "oak_fence",
            "ladder",
            "torch",
            "crafting_table",
            "furnace",
            "chest",
            "glass_pane",
            "stone_pressure_plate",
            "white_carpet",
            "red_bed",
        ] {
            assert!(!is_solid_support(name), "{name} should not support placement");
        }
    }

    #[test]
    fn bedrock_survives_the_bed_substring() {
        assert!(is_solid_support("bedrock"));
        assert!(!is_solid_support("red_bed"));
    }

    #[test]
    fn snow_block_differs_from_snow_layer() {
        assert!(is_solid_support("snow_block"));
        assert!(!is_solid_support("snow"));
        assert!(is_replaceable("snow"));
    }

    #[test]
    fn wool_and_concrete_match_by_suffix() {
        assert!(is_solid_support("red_wool"));
        assert!(is_solid_support("lime_concrete"));
        assert!(is_solid_support("orange_terracotta"));
    }

    #[test]
    fn plants_are_replaceable() {
        assert!(is_replaceable("air"));
        assert!(is_replaceable("tall_grass"));
        assert!(is_replaceable("fern"));
        assert!(!is_replaceable("stone"));
        assert!(!is_replaceable("oak_sapling"));
    }
}
