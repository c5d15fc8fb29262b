//! Core types shared by every blockhand crate: interned item names, the
//! tool kind/tier ladder and the multiset inventory.

mod inventory;
mod item;
mod tool;

pub use inventory::Inventory;
pub use item::Item;
pub use tool::{ToolKind, ToolRequirement, ToolTier};
