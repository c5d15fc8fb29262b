//! Per-block mining requirements.

use blockhand_core::{Item, ToolKind, ToolRequirement, ToolTier};

struct BlockRequirement {
    block: &'static str,
    kind: ToolKind,
    min_tier: Option<ToolTier>,
}

const REQUIREMENTS: &[BlockRequirement] = &[
    BlockRequirement {
        block: "stone",
        kind: ToolKind::Pickaxe,
        min_tier: Some(ToolTier::Wooden),
    },
    BlockRequirement {
        block: "cobblestone",
        kind: ToolKind::Pickaxe,
        min_tier: Some(ToolTier::Wooden),
    },
    BlockRequirement {
        block: "deepslate",
        kind: ToolKind::Pickaxe,
        min_tier: Some(ToolTier::Wooden),
    },
    BlockRequirement {
        block: "coal_ore",
        kind: ToolKind::Pickaxe,
        min_tier: Some(ToolTier::Wooden),
    },
    BlockRequirement {
        block: "furnace",
        kind: ToolKind::Pickaxe,
        min_tier: Some(ToolTier::Wooden),
    },
    BlockRequirement {
        block: "iron_ore",
        kind: ToolKind::Pickaxe,
        min_tier: Some(ToolTier::Stone),
    },
    BlockRequirement {
        block: "copper_ore",
        kind: ToolKind::Pickaxe,
        min_tier: Some(ToolTier::Stone),
    },
    BlockRequirement {
        block: "lapis_ore",
        kind: ToolKind::Pickaxe,
        min_tier: Some(ToolTier::Stone),
    },
    BlockRequirement {
        block: "gold_ore",
        kind: ToolKind::Pickaxe,
        min_tier: Some(ToolTier::Iron),
    },
    BlockRequirement {
        block: "diamond_ore",
        kind: ToolKind::Pickaxe,
        min_tier: Some(ToolTier::Iron),
    },
    BlockRequirement {
        block: "redstone_ore",
        kind: ToolKind::Pickaxe,
        min_tier: Some(ToolTier::Iron),
    },
    BlockRequirement {
        block: "emerald_ore",
        kind: ToolKind::Pickaxe,
        min_tier: Some(ToolTier::Iron),
    },
    BlockRequirement {
        block: "obsidian",
        kind: ToolKind::Pickaxe,
        min_tier: Some(ToolTier::Diamond),
    },
    BlockRequirement {
        block: "dirt",
        kind: ToolKind::Shovel,
        min_tier: None,
    },
    BlockRequirement {
        block: "grass_block",
        kind: ToolKind::Shovel,
        min_tier: None,
    },
    BlockRequirement {
        block: "sand",
        kind: ToolKind::Shovel,
        min_tier: None,
    },
    BlockRequirement {
        block: "gravel",
        kind: ToolKind::Shovel,
        min_tier: None,
    },
];

/// Blocks no tool tier can break.
const UNBREAKABLE: &[&str] = &["bedrock", "barrier", "end_portal_frame"];

/// Minimum tool needed to mine `block`.
///
/// `None` means the block cannot be mined at all; unknown blocks default to
/// bare hands.
pub fn tool_requirement_for(block: &Item) -> Option<ToolRequirement> {
    let name = block.name();
    if UNBREAKABLE.contains(&name) {
        return None;
    }
    if let Some(req) = REQUIREMENTS.iter().find(|r| r.block == name) {
        return Some(ToolRequirement {
            kind: req.kind,
            min_tier: req.min_tier,
        });
    }
    if name.ends_with("_log") || name.ends_with("_planks") {
        return Some(ToolRequirement::preferring(ToolKind::Axe));
    }
    if name.ends_with("_ore") {
        // Unlisted ores err on the safe side.
        return Some(ToolRequirement::new(ToolKind::Pickaxe, ToolTier::Iron));
    }
    Some(ToolRequirement::HAND)
}
