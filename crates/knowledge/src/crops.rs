//! Harvestable crops and their replant seeds.

use blockhand_core::Item;
use serde::{Deserialize, Serialize};

/// A crop the agent can harvest and replant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crop {
    /// Item the mature crop yields.
    pub product: Item,
    /// World block name of the planted crop.
    pub block: Item,
    /// Item planted back after harvesting.
    pub seed: Item,
}

struct CropSpec {
    product: &'static str,
    block: &'static str,
    seed: &'static str,
}

const CROPS: &[CropSpec] = &[
    CropSpec {
        product: "wheat",
        block: "wheat",
        seed: "wheat_seeds",
    },
    CropSpec {
        product: "carrot",
        block: "carrots",
        seed: "carrot",
    },
    CropSpec {
        product: "potato",
        block: "potatoes",
        seed: "potato",
    },
    CropSpec {
        product: "beetroot",
        block: "beetroots",
        seed: "beetroot_seeds",
    },
];

fn crop_from(spec: &CropSpec) -> Crop {
    Crop {
        product: Item::new(spec.product),
        block: Item::new(spec.block),
        seed: Item::new(spec.seed),
    }
}

/// Crop that yields `item` when harvested, if any.
pub fn crop_for(item: &Item) -> Option<Crop> {
    CROPS
        .iter()
        .find(|spec| spec.product == item.name())
        .map(crop_from)
}

/// Crop data for a planted block name, if any.
pub fn crop_for_block(block: &Item) -> Option<Crop> {
    CROPS
        .iter()
        .find(|spec| spec.block == block.name())
        .map(crop_from)
}

/// Crop planted by `seed`, if any.
pub fn crop_for_seed(seed: &Item) -> Option<Crop> {
    CROPS
        .iter()
        .find(|spec| spec.seed == seed.name())
        .map(crop_from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheat_replants_seeds() {
        let crop = crop_for(&Item::new("wheat")).unwrap();
        assert_eq!(crop.block, Item::new("wheat"));
        assert_eq!(crop.seed, Item::new("wheat_seeds"));
    }

    #[test]
    fn carrots_replant_themselves() {
        let crop = crop_for(&Item::new("carrot")).unwrap();
        assert_eq!(crop.block, Item::new("carrots"));
        assert_eq!(crop.seed, Item::new("carrot"));
    }

    #[test]
    fn block_lookup_matches_product_lookup() {
        let by_block = crop_for_block(&Item::new("potatoes")).unwrap();
        let by_product = crop_for(&Item::new("potato")).unwrap();
        assert_eq!(by_block, by_product);
    }

    #[test]
    fn stone_is_not_a_crop() {
        assert!(crop_for(&Item::new("stone")).is_none());
    }
}
