//! End-to-end build scenarios against the simulated world.

use blockhand_agent::{AbortFlag, ExecutorConfig, TaskError};
use blockhand_builder::{
    BlockProperties, Blueprint, BlueprintVoxel, BuildOptions, BuildReport, StructureBuilder,
};
use blockhand_core::Item;
use blockhand_facade::BlockPos;
use blockhand_knowledge::KnowledgeBase;
use blockhand_testkit::SimWorld;

fn slab_3x1x3() -> Blueprint {
    let mut voxels = Vec::new();
    for x in 0..3 {
        for z in 0..3 {
            voxels.push(BlueprintVoxel {
                offset: BlockPos::new(x, 0, z),
                block: Item::new("cobblestone"),
                properties: BlockProperties::default(),
            });
        }
    }
    Blueprint {
        dims: [3, 1, 3],
        voxels,
    }
}

fn build(
    world: &mut SimWorld,
    blueprint: &Blueprint,
    origin: BlockPos,
    options: &BuildOptions,
) -> Result<BuildReport, TaskError> {
    let kb = KnowledgeBase::new();
    let mut builder =
        StructureBuilder::new(world, &kb, ExecutorConfig::default(), AbortFlag::new());
    builder.build(blueprint, origin, options)
}

/// S5: a 3x1x3 cobblestone slab placed with the ground as reference.
#[test]
fn cobblestone_slab_places_every_voxel() {
    let mut world = SimWorld::new(21).with_ground(63, 8, "dirt");
    world.give("cobblestone", 9);

    let origin = BlockPos::new(2, 64, 2);
    let report = build(&mut world, &slab_3x1x3(), origin, &BuildOptions::default()).unwrap();

    assert_eq!(
        report,
        BuildReport {
            placed: 9,
            skipped: 0,
            failed: 0
        }
    );
    for x in 0..3 {
        for z in 0..3 {
            assert_eq!(
                world.block_name_at(BlockPos::new(2 + x, 64, 2 + z)),
                "cobblestone"
            );
        }
    }
    assert_eq!(world.held("cobblestone"), 0);
}

#[test]
fn matching_world_blocks_are_skipped() {
    let mut world = SimWorld::new(22).with_ground(63, 8, "dirt");
    world.give("cobblestone", 8);
    // One cell is already correct.
    world.set_block(BlockPos::new(2, 64, 2), "cobblestone");

    let report = build(
        &mut world,
        &slab_3x1x3(),
        BlockPos::new(2, 64, 2),
        &BuildOptions::default(),
    )
    .unwrap();

    assert_eq!(report.placed, 8);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.failed, 0);
}

#[test]
fn missing_materials_are_produced_first() {
    let mut world = SimWorld::new(23).with_ground(63, 8, "stone");
    world.give("wooden_pickaxe", 1);

    let blueprint = Blueprint {
        dims: [2, 1, 1],
        voxels: vec![
            BlueprintVoxel {
                offset: BlockPos::new(0, 0, 0),
                block: Item::new("cobblestone"),
                properties: BlockProperties::default(),
            },
            BlueprintVoxel {
                offset: BlockPos::new(1, 0, 0),
                block: Item::new("cobblestone"),
                properties: BlockProperties::default(),
            },
        ],
    };

    let report = build(
        &mut world,
        &blueprint,
        BlockPos::new(3, 64, 0),
        &BuildOptions::default(),
    )
    .unwrap();

    assert_eq!(report.placed, 2);
    assert_eq!(world.block_name_at(BlockPos::new(3, 64, 0)), "cobblestone");
    assert_eq!(world.block_name_at(BlockPos::new(4, 64, 0)), "cobblestone");
}

#[test]
fn clear_area_digs_obstructions() {
    let mut world = SimWorld::new(24).with_ground(63, 8, "dirt");
    world.give("cobblestone", 1);
    let origin = BlockPos::new(2, 64, 2);
    world.set_block(origin, "oak_log");

    let blueprint = Blueprint {
        dims: [1, 1, 1],
        voxels: vec![BlueprintVoxel {
            offset: BlockPos::new(0, 0, 0),
            block: Item::new("cobblestone"),
            properties: BlockProperties::default(),
        }],
    };
    let options = BuildOptions {
        clear_area: true,
        ..BuildOptions::default()
    };

    let report = build(&mut world, &blueprint, origin, &options).unwrap();
    assert_eq!(report.placed, 1);
    assert_eq!(world.block_name_at(origin), "cobblestone");
    // The obstruction was hand-dug and its drop collected.
    assert_eq!(world.held("oak_log"), 1);
}

#[test]
fn ground_prep_fills_holes_under_the_base() {
    let mut world = SimWorld::new(25);
    world.fill(
        BlockPos::new(-8, 62, -8),
        BlockPos::new(8, 62, 8),
        "stone",
    );
    world.fill(BlockPos::new(-8, 63, -8), BlockPos::new(8, 63, 8), "dirt");
    world.set_block(BlockPos::new(3, 63, 3), "air");
    world.set_bot_position(glam::Vec3::new(0.5, 64.0, 0.5));

    world.give("cobblestone", 9);
    world.give("dirt", 4);

    let options = BuildOptions {
        prepare_ground: true,
        ..BuildOptions::default()
    };
    let report = build(&mut world, &slab_3x1x3(), BlockPos::new(2, 64, 2), &options).unwrap();

    assert_eq!(report.failed, 0);
    assert_eq!(world.block_name_at(BlockPos::new(3, 63, 3)), "dirt");
    assert_eq!(world.block_name_at(BlockPos::new(3, 64, 3)), "cobblestone");
}

#[test]
fn abort_stops_the_placement_loop() {
    let mut world = SimWorld::new(26).with_ground(63, 8, "dirt");
    world.give("cobblestone", 9);

    let kb = KnowledgeBase::new();
    let abort = AbortFlag::new();
    abort.set();
    let mut builder = StructureBuilder::new(&mut world, &kb, ExecutorConfig::default(), abort);
    let err = builder
        .build(&slab_3x1x3(), BlockPos::new(2, 64, 2), &BuildOptions::default())
        .unwrap_err();
    assert_eq!(err, TaskError::Aborted);
}

#[test]
fn second_storey_rests_on_the_first() {
    let mut world = SimWorld::new(27).with_ground(63, 8, "dirt");
    world.give("oak_planks", 2);

    let blueprint = Blueprint {
        dims: [1, 2, 1],
        voxels: vec![
            BlueprintVoxel {
                offset: BlockPos::new(0, 0, 0),
                block: Item::new("oak_planks"),
                properties: BlockProperties::default(),
            },
            BlueprintVoxel {
                offset: BlockPos::new(0, 1, 0),
                block: Item::new("oak_planks"),
                properties: BlockProperties::default(),
            },
        ],
    };

    let origin = BlockPos::new(3, 64, 0);
    let report = build(&mut world, &blueprint, origin, &BuildOptions::default()).unwrap();
    assert_eq!(report.placed, 2);
    assert_eq!(report.failed, 0);
    assert_eq!(world.block_name_at(BlockPos::new(3, 65, 0)), "oak_planks");
}
