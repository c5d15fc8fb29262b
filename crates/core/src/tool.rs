//! Tool kinds and the tier ladder.

use serde::{Deserialize, Serialize};

/// What a tool is for. `Any` means bare hands are acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    Any,
    Pickaxe,
    Axe,
    Shovel,
    Hoe,
    Sword,
}

impl ToolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolKind::Any => "any",
            ToolKind::Pickaxe => "pickaxe",
            ToolKind::Axe => "axe",
            ToolKind::Shovel => "shovel",
            ToolKind::Hoe => "hoe",
            ToolKind::Sword => "sword",
        }
    }

    /// Classify an item by its name suffix (`stone_pickaxe` -> `Pickaxe`).
    pub fn of_item_name(name: &str) -> Option<ToolKind> {
        for kind in [
            ToolKind::Pickaxe,
            ToolKind::Axe,
            ToolKind::Shovel,
            ToolKind::Hoe,
            ToolKind::Sword,
        ] {
            if name.ends_with(kind.as_str()) {
                return Some(kind);
            }
        }
        None
    }
}

/// Mining-capability ladder. `Ord` follows declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ToolTier {
    Wooden,
    Stone,
    Iron,
    Diamond,
    Netherite,
}

impl ToolTier {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolTier::Wooden => "wooden",
            ToolTier::Stone => "stone",
            ToolTier::Iron => "iron",
            ToolTier::Diamond => "diamond",
            ToolTier::Netherite => "netherite",
        }
    }

    /// Tier of a tool item, by name prefix. Golden tools mine at wooden tier.
    pub fn of_item_name(name: &str) -> Option<ToolTier> {
        if ToolKind::of_item_name(name).is_none() {
            return None;
        }
        let tier = if name.starts_with("wooden_") || name.starts_with("golden_") {
            ToolTier::Wooden
        } else if name.starts_with("stone_") {
            ToolTier::Stone
        } else if name.starts_with("iron_") {
            ToolTier::Iron
        } else if name.starts_with("diamond_") {
            ToolTier::Diamond
        } else if name.starts_with("netherite_") {
            ToolTier::Netherite
        } else {
            return None;
        };
        Some(tier)
    }

    /// Canonical tool item name for this tier and kind (`wooden` + `pickaxe`
    /// -> `wooden_pickaxe`).
    pub fn tool_name(self, kind: ToolKind) -> String {
        format!("{}_{}", self.as_str(), kind.as_str())
    }
}

/// Minimum tool needed to break a block. `min_tier: None` means bare hands
/// (or any tool) break it; `kind` is then only a speed preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRequirement {
    pub kind: ToolKind,
    pub min_tier: Option<ToolTier>,
}

impl ToolRequirement {
    pub const HAND: ToolRequirement = ToolRequirement {
        kind: ToolKind::Any,
        min_tier: None,
    };

    pub fn new(kind: ToolKind, min_tier: ToolTier) -> Self {
        Self {
            kind,
            min_tier: Some(min_tier),
        }
    }

    pub fn preferring(kind: ToolKind) -> Self {
        Self {
            kind,
            min_tier: None,
        }
    }

    /// Whether a held item satisfies this requirement. With no minimum tier
    /// anything (including bare hands) qualifies.
    pub fn satisfied_by(&self, item_name: &str) -> bool {
        let Some(min_tier) = self.min_tier else {
            return true;
        };
        let kind_ok = match self.kind {
            ToolKind::Any => ToolKind::of_item_name(item_name).is_some(),
            kind => ToolKind::of_item_name(item_name) == Some(kind),
        };
        kind_ok && ToolTier::of_item_name(item_name).is_some_and(|t| t >= min_tier)
    }

    /// Whether this block can be broken without any tool at all.
    pub fn hand_suffices(&self) -> bool {
        self.min_tier.is_none()
    }
}
