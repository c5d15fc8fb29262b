//! Structure builder: from a voxel blueprint to an ordered, support-aware
//! sequence of verified block placements.

mod blueprint;
mod build;
mod plan;

pub use blueprint::{BlockProperties, Blueprint, BlueprintError, BlueprintVoxel};
pub use build::{BuildOptions, BuildReport, StructureBuilder};
pub use plan::{placement_order, verify_support, PlacementTask, UnsupportedVoxel};
