//! Block drop table and the reverse item -> source-block lookup.

use blockhand_core::Item;
use serde::{Deserialize, Serialize};

/// What mining a block yields (with an adequate tool).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDrop {
    pub item: Item,
    pub min: u32,
    pub max: u32,
}

struct DropSpec {
    block: &'static str,
    item: &'static str,
    min: u32,
    max: u32,
}

const DROPS: &[DropSpec] = &[
    DropSpec {
        block: "stone",
        item: "cobblestone",
        min: 1,
        max: 1,
    },
    DropSpec {
        block: "grass_block",
        item: "dirt",
        min: 1,
        max: 1,
    },
    DropSpec {
        block: "coal_ore",
        item: "coal",
        min: 1,
        max: 1,
    },
    DropSpec {
        block: "iron_ore",
        item: "raw_iron",
        min: 1,
        max: 1,
    },
    DropSpec {
        block: "copper_ore",
        item: "raw_copper",
        min: 2,
        max: 5,
    },
    DropSpec {
        block: "gold_ore",
        item: "raw_gold",
        min: 1,
        max: 1,
    },
    DropSpec {
        block: "diamond_ore",
        item: "diamond",
        min: 1,
        max: 1,
    },
    DropSpec {
        block: "redstone_ore",
        item: "redstone",
        min: 4,
        max: 5,
    },
    DropSpec {
        block: "lapis_ore",
        item: "lapis_lazuli",
        min: 4,
        max: 9,
    },
];

/// Blocks that drop nothing reliable without special tools.
const NO_DROP: &[&str] = &["glass", "ice", "air"];

/// Drop yielded by mining `block`. Unlisted blocks drop themselves.
pub fn drop_for(block: &Item) -> Option<BlockDrop> {
    let name = block.name();
    if NO_DROP.contains(&name) || name.ends_with("_leaves") {
        return None;
    }
    if let Some(spec) = DROPS.iter().find(|d| d.block == name) {
        return Some(BlockDrop {
            item: Item::new(spec.item),
            min: spec.min,
            max: spec.max,
        });
    }
    Some(BlockDrop {
        item: block.clone(),
        min: 1,
        max: 1,
    })
}

struct SourceSpec {
    item: &'static str,
    block: &'static str,
}

/// Canonical block to mine when you want an item. Listed explicitly so the
/// choice stays deterministic when several blocks could drop the same item.
const SOURCES: &[SourceSpec] = &[
    SourceSpec {
        item: "cobblestone",
        block: "stone",
    },
    SourceSpec {
        item: "dirt",
        block: "dirt",
    },
    SourceSpec {
        item: "sand",
        block: "sand",
    },
    SourceSpec {
        item: "gravel",
        block: "gravel",
    },
    SourceSpec {
        item: "coal",
        block: "coal_ore",
    },
    SourceSpec {
        item: "raw_iron",
        block: "iron_ore",
    },
    SourceSpec {
        item: "raw_copper",
        block: "copper_ore",
    },
    SourceSpec {
        item: "raw_gold",
        block: "gold_ore",
    },
    SourceSpec {
        item: "diamond",
        block: "diamond_ore",
    },
    SourceSpec {
        item: "redstone",
        block: "redstone_ore",
    },
    SourceSpec {
        item: "lapis_lazuli",
        block: "lapis_ore",
    },
    SourceSpec {
        item: "obsidian",
        block: "obsidian",
    },
];

/// The block to mine to obtain `item`, if gathering is a production mode.
pub fn source_block_for(item: &Item) -> Option<Item> {
    let name = item.name();
    if let Some(spec) = SOURCES.iter().find(|s| s.item == name) {
        return Some(Item::new(spec.block));
    }
    // Logs (and other self-dropping world blocks) are mined as themselves.
    if name.ends_with("_log") {
        return Some(item.clone());
    }
    None
}
