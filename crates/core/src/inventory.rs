//! Multiset inventory.
//!
//! The agent's planning view of the avatar's inventory: item -> count.
//! Physical slots belong to the world facade; this layer only does
//! arithmetic. Counts never go negative; removing more than is held is a
//! programming error and panics.

use crate::item::Item;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A non-negative multiset of items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    counts: BTreeMap<Item, u32>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many of `item` are held.
    pub fn count(&self, item: &Item) -> u32 {
        self.counts.get(item).copied().unwrap_or(0)
    }

    pub fn has(&self, item: &Item, n: u32) -> bool {
        self.count(item) >= n
    }

    pub fn add(&mut self, item: &Item, n: u32) {
        if n == 0 {
            return;
        }
        *self.counts.entry(item.clone()).or_insert(0) += n;
    }

    /// Remove `n` of `item`. Underflow is a contract violation.
    pub fn remove(&mut self, item: &Item, n: u32) {
        if n == 0 {
            return;
        }
        let held = self.count(item);
        assert!(
            held >= n,
            "inventory underflow: removing {n} {item} but only {held} held"
        );
        if held == n {
            self.counts.remove(item);
        } else {
            self.counts.insert(item.clone(), held - n);
        }
    }

    /// Checked removal: take `n` of `item` iff that many are held.
    pub fn reserve(&mut self, item: &Item, n: u32) -> bool {
        if !self.has(item, n) {
            return false;
        }
        self.remove(item, n);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Distinct item kinds held (zero-count entries never exist).
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Iterate held items in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&Item, u32)> {
        self.counts.iter().map(|(item, &count)| (item, count))
    }

    /// Items whose name satisfies `predicate`, in name order.
    pub fn items_matching<'a>(
        &'a self,
        predicate: impl Fn(&str) -> bool + 'a,
    ) -> impl Iterator<Item = (&'a Item, u32)> {
        self.iter().filter(move |(item, _)| predicate(item.name()))
    }

    /// Merge another inventory into this one.
    pub fn absorb(&mut self, other: &Inventory) {
        for (item, count) in other.iter() {
            self.add(item, count);
        }
    }
}

impl FromIterator<(Item, u32)> for Inventory {
    fn from_iter<I: IntoIterator<Item = (Item, u32)>>(iter: I) -> Self {
        let mut inv = Inventory::new();
        for (item, count) in iter {
            inv.add(&item, count);
        }
        inv
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str) -> Item {
        Item::new(name)
    }

    #[test]
    fn add_and_count() {
        let mut inv = Inventory::new();
        assert_eq!(inv.count(&item("stone")), 0);

        inv.add(&item("stone"), 5);
        inv.add(&item("stone"), 3);
        assert_eq!(inv.count(&item("stone")), 8);
        assert!(inv.has(&item("stone"), 8));
        assert!(!inv.has(&item("stone"), 9));
    }

    #[test]
    fn remove_drops_empty_entries() {
        let mut inv = Inventory::new();
        inv.add(&item("dirt"), 4);
        inv.remove(&item("dirt"), 4);
        assert!(inv.is_empty());
    }

    #[test]
    #[should_panic(expected = "inventory underflow")]
    fn remove_underflow_panics() {
        let mut inv = Inventory::new();
        inv.add(&item("dirt"), 2);
        inv.remove(&item("dirt"), 3);
    }

    #[test]
    fn reserve_is_checked() {
        let mut inv = Inventory::new();
        inv.add(&item("oak_log"), 2);

        assert!(!inv.reserve(&item("oak_log"), 3));
        assert_eq!(inv.count(&item("oak_log")), 2);

        assert!(inv.reserve(&item("oak_log"), 2));
        assert_eq!(inv.count(&item("oak_log")), 0);
    }

    #[test]
    fn adding_zero_creates_no_entry() {
        let mut inv = Inventory::new();
        inv.add(&item("stone"), 0);
        assert!(inv.is_empty());
    }

    #[test]
    fn iteration_is_name_ordered() {
        let mut inv = Inventory::new();
        inv.add(&item("stone"), 1);
        inv.add(&item("cobblestone"), 1);
        inv.add(&item("dirt"), 1);

        let names: Vec<_> = inv.iter().map(|(i, _)| i.name().to_string()).collect();
        assert_eq!(names, vec!["cobblestone", "dirt", "stone"]);
    }

    #[test]
    fn items_matching_filters_by_name() {
        let mut inv = Inventory::new();
        inv.add(&item("wooden_pickaxe"), 1);
        inv.add(&item("stone_pickaxe"), 1);
        inv.add(&item("stick"), 4);

        let picks: Vec<_> = inv
            .items_matching(|n| n.ends_with("pickaxe"))
            .map(|(i, _)| i.name().to_string())
            .collect();
        assert_eq!(picks, vec!["stone_pickaxe", "wooden_pickaxe"]);
    }

    #[test]
    fn absorb_merges_counts() {
        let mut a: Inventory = [(item("stone"), 2)].into_iter().collect();
        let b: Inventory = [(item("stone"), 3), (item("stick"), 1)].into_iter().collect();
        a.absorb(&b);
        assert_eq!(a.count(&item("stone")), 5);
        assert_eq!(a.count(&item("stick")), 1);
    }
}
