//! Deterministic in-memory world.
//!
//! `SimWorld` implements [`WorldFacade`] over a sparse block map and a
//! scripted inventory. Digging yields knowledge-base drops, crafting and
//! smelting follow the knowledge-base tables, and navigation teleports
//! unless a cell has been scripted unreachable. Everything is seeded, so a
//! scenario run is reproducible byte for byte.

use blockhand_core::{Inventory, Item, ToolKind, ToolTier};
use blockhand_facade::{Block, BlockPos, Entity, Face, FacadeError, NavError, WorldFacade};
use blockhand_knowledge::{is_replaceable, KnowledgeBase, Recipe, Station, TICKS_PER_ITEM};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

/// How close the avatar must be for dig/place/container interactions.
const INTERACT_REACH: f64 = 5.0;

/// One simulation tick is 50 ms of waited time.
const MS_PER_TICK: u64 = 50;

#[derive(Debug, Clone, Default)]
struct SimFurnace {
    input: Option<(Item, u32)>,
    fuel: Option<(Item, u32)>,
    output: Option<(Item, u32)>,
    fuel_ticks_remaining: u32,
    progress_ticks: u32,
}

#[derive(Debug, Clone)]
struct SimEntity {
    kind: String,
    pos: Vec3,
    health: f32,
}

/// Drops granted when a mob dies.
const MOB_DROPS: &[(&str, &[(&str, u32)])] = &[
    ("cow", &[("beef", 2), ("leather", 1)]),
    ("pig", &[("porkchop", 2)]),
    ("sheep", &[("mutton", 1), ("white_wool", 1)]),
    ("chicken", &[("chicken", 1), ("feather", 1)]),
    ("zombie", &[("rotten_flesh", 1)]),
    ("skeleton", &[("bone", 1), ("arrow", 2)]),
    ("spider", &[("string", 1)]),
];

/// Deterministic world simulator.
pub struct SimWorld {
    kb: KnowledgeBase,
    rng: StdRng,
    bot_pos: Vec3,
    health: f32,
    food: f32,
    blocks: BTreeMap<BlockPos, Item>,
    inventory: Inventory,
    equipped: Option<Item>,
    furnaces: BTreeMap<BlockPos, SimFurnace>,
    entities: BTreeMap<u64, SimEntity>,
    next_entity_id: u64,
    players: BTreeMap<String, Vec3>,
    unreachable: BTreeSet<BlockPos>,
    tossed: Vec<(Item, u32)>,
    elapsed: Duration,
    digs: u32,
}

impl SimWorld {
    pub fn new(seed: u64) -> Self {
        Self {
            kb: KnowledgeBase::new(),
            rng: StdRng::seed_from_u64(seed),
            bot_pos: Vec3::new(0.5, 64.0, 0.5),
            health: 20.0,
            food: 20.0,
            blocks: BTreeMap::new(),
            inventory: Inventory::new(),
            equipped: None,
            furnaces: BTreeMap::new(),
            entities: BTreeMap::new(),
            next_entity_id: 1,
            players: BTreeMap::new(),
            unreachable: BTreeSet::new(),
            tossed: Vec::new(),
            elapsed: Duration::ZERO,
            digs: 0,
        }
    }

    // --- scripting ---

    pub fn set_block(&mut self, pos: BlockPos, name: &str) {
        if name == "air" {
            self.blocks.remove(&pos);
            self.furnaces.remove(&pos);
            return;
        }
        self.blocks.insert(pos, Item::new(name));
        if name == "furnace" {
            self.furnaces.entry(pos).or_default();
        }
    }

    /// Fill the axis-aligned box between two corners (inclusive).
    pub fn fill(&mut self, a: BlockPos, b: BlockPos, name: &str) {
        for y in a.y.min(b.y)..=a.y.max(b.y) {
            for x in a.x.min(b.x)..=a.x.max(b.x) {
                for z in a.z.min(b.z)..=a.z.max(b.z) {
                    self.set_block(BlockPos::new(x, y, z), name);
                }
            }
        }
    }

    /// Flat ground: a square slab of `name` at height `y`, centred on the
    /// origin with the given half-extent.
    pub fn with_ground(mut self, y: i32, half_extent: i32, name: &str) -> Self {
        self.fill(
            BlockPos::new(-half_extent, y, -half_extent),
            BlockPos::new(half_extent, y, half_extent),
            name,
        );
        self.bot_pos.y = (y + 1) as f32;
        self
    }

    pub fn give(&mut self, name: &str, count: u32) {
        self.inventory.add(&Item::new(name), count);
    }

    pub fn set_bot_position(&mut self, pos: Vec3) {
        self.bot_pos = pos;
    }

    pub fn set_player(&mut self, name: &str, pos: Vec3) {
        self.players.insert(name.to_string(), pos);
    }

    pub fn spawn_entity(&mut self, kind: &str, pos: Vec3, health: f32) -> u64 {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        self.entities.insert(
            id,
            SimEntity {
                kind: kind.to_string(),
                pos,
                health,
            },
        );
        id
    }

    /// Script navigation to this cell (and interactions from it) to fail.
    pub fn make_unreachable(&mut self, pos: BlockPos) {
        self.unreachable.insert(pos);
    }

    // --- inspection ---

    pub fn block_name_at(&self, pos: BlockPos) -> String {
        self.blocks
            .get(&pos)
            .map(|i| i.name().to_string())
            .unwrap_or_else(|| "air".to_string())
    }

    pub fn held(&self, name: &str) -> u32 {
        self.inventory.count(&Item::new(name))
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn tossed(&self) -> &[(Item, u32)] {
        &self.tossed
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn dig_count(&self) -> u32 {
        self.digs
    }

    // --- internals ---

    fn in_reach(&self, pos: BlockPos) -> bool {
        pos.distance_to(self.bot_pos) <= INTERACT_REACH
    }

    fn equipped_weapon_damage(&self) -> f32 {
        let Some(equipped) = &self.equipped else {
            return 1.0;
        };
        let base = match ToolKind::of_item_name(equipped.name()) {
            Some(ToolKind::Sword) => 4.0,
            Some(ToolKind::Axe) => 3.0,
            _ => 1.0,
        };
        let bonus = match ToolTier::of_item_name(equipped.name()) {
            Some(ToolTier::Wooden) | None => 0.0,
            Some(ToolTier::Stone) => 1.0,
            Some(ToolTier::Iron) => 2.0,
            Some(ToolTier::Diamond) => 3.0,
            Some(ToolTier::Netherite) => 4.0,
        };
        base + bonus
    }

    fn grant_dig_drops(&mut self, block: &Item) {
        if let Some(crop) = self.kb.crop_for_block(block) {
            self.inventory.add(&crop.product, 1);
            if crop.seed != crop.product {
                let seeds = self.rng.gen_range(1..=2);
                self.inventory.add(&crop.seed, seeds);
            } else {
                self.inventory.add(&crop.product, 1);
            }
            return;
        }

        let requirement = self.kb.tool_requirement_for(block);
        let adequate = match &requirement {
            None => false,
            Some(req) => {
                req.hand_suffices()
                    || self
                        .equipped
                        .as_ref()
                        .is_some_and(|tool| req.satisfied_by(tool.name()))
            }
        };
        if !adequate {
            return;
        }

        if let Some(drop) = self.kb.drop_for(block) {
            let count = if drop.min == drop.max {
                drop.min
            } else {
                self.rng.gen_range(drop.min..=drop.max)
            };
            self.inventory.add(&drop.item, count);
        }
    }

    fn tick_furnaces(&mut self, ticks: u32) {
        let kb = self.kb;
        for furnace in self.furnaces.values_mut() {
            for _ in 0..ticks {
                let smeltable = furnace
                    .input
                    .as_ref()
                    .and_then(|(item, _)| kb.smelt_output_of(item))
                    .is_some();
                if !smeltable {
                    furnace.progress_ticks = 0;
                    continue;
                }

                if furnace.fuel_ticks_remaining == 0 {
                    let Some((fuel_item, fuel_count)) = &mut furnace.fuel else {
                        furnace.progress_ticks = 0;
                        continue;
                    };
                    let burn = kb.fuel_ticks(fuel_item);
                    if burn == 0 || *fuel_count == 0 {
                        furnace.progress_ticks = 0;
                        continue;
                    }
                    furnace.fuel_ticks_remaining = burn;
                    *fuel_count -= 1;
                    if *fuel_count == 0 {
                        furnace.fuel = None;
                    }
                }

                furnace.fuel_ticks_remaining -= 1;
                furnace.progress_ticks += 1;

                if furnace.progress_ticks >= TICKS_PER_ITEM {
                    furnace.progress_ticks = 0;
                    let Some((input_item, input_count)) = &mut furnace.input else {
                        continue;
                    };
                    let output_item = kb
                        .smelt_output_of(input_item)
                        .expect("smeltable input checked above");
                    *input_count -= 1;
                    if *input_count == 0 {
                        furnace.input = None;
                    }
                    match &mut furnace.output {
                        Some((existing, count)) if *existing == output_item => *count += 1,
                        Some(_) => {}
                        None => furnace.output = Some((output_item, 1)),
                    }
                }
            }
        }
    }

    fn furnace_at(&mut self, pos: BlockPos) -> Result<&mut SimFurnace, FacadeError> {
        if self.blocks.get(&pos).map(Item::name) != Some("furnace") {
            return Err(FacadeError::Rejected(format!("no furnace at {pos}")));
        }
        Ok(self.furnaces.entry(pos).or_default())
    }
}

impl WorldFacade for SimWorld {
    fn position(&self) -> Vec3 {
        self.bot_pos
    }

    fn health(&self) -> f32 {
        self.health
    }

    fn food(&self) -> f32 {
        self.food
    }

    fn block_at(&self, pos: BlockPos) -> Option<Block> {
        Some(Block {
            pos,
            name: self
                .blocks
                .get(&pos)
                .cloned()
                .unwrap_or_else(|| Item::new("air")),
        })
    }

    fn find_block(&self, matcher: &dyn Fn(&str) -> bool, max_distance: f64) -> Option<Block> {
        self.blocks
            .iter()
            .filter(|(pos, name)| {
                matcher(name.name()) && pos.distance_to(self.bot_pos) <= max_distance
            })
            .min_by(|(a_pos, _), (b_pos, _)| {
                let da = a_pos.distance_to(self.bot_pos);
                let db = b_pos.distance_to(self.bot_pos);
                da.partial_cmp(&db)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a_pos.cmp(b_pos))
            })
            .map(|(pos, name)| Block {
                pos: *pos,
                name: name.clone(),
            })
    }

    fn find_entity(&self, kind: &str, max_distance: f64) -> Option<Entity> {
        self.entities
            .iter()
            .filter(|(_, e)| e.kind == kind && (e.pos - self.bot_pos).length() as f64 <= max_distance)
            .min_by(|(a_id, a), (b_id, b)| {
                let da = (a.pos - self.bot_pos).length();
                let db = (b.pos - self.bot_pos).length();
                da.partial_cmp(&db)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a_id.cmp(b_id))
            })
            .map(|(id, e)| Entity {
                id: *id,
                kind: e.kind.clone(),
                pos: e.pos,
            })
    }

    fn entity_health(&self, entity_id: u64) -> Option<f32> {
        self.entities.get(&entity_id).map(|e| e.health)
    }

    fn player_position(&self, name: &str) -> Option<Vec3> {
        self.players.get(name).copied()
    }

    fn inventory_items(&self) -> Vec<(Item, u32)> {
        self.inventory
            .iter()
            .map(|(item, count)| (item.clone(), count))
            .collect()
    }

    fn path_to(&mut self, goal: Vec3, _reach: f64) -> Result<(), NavError> {
        if self.unreachable.contains(&BlockPos::containing(goal)) {
            return Err(NavError::Unreachable);
        }
        self.bot_pos = goal;
        Ok(())
    }

    fn dig(&mut self, pos: BlockPos) -> Result<(), FacadeError> {
        if !self.in_reach(pos) {
            return Err(FacadeError::Rejected(format!("{pos} is out of reach")));
        }
        let Some(block) = self.blocks.get(&pos).cloned() else {
            return Err(FacadeError::Rejected(format!("nothing to dig at {pos}")));
        };
        if self.kb.tool_requirement_for(&block).is_none() {
            return Err(FacadeError::Rejected(format!("{block} is unbreakable")));
        }
        self.grant_dig_drops(&block);
        self.blocks.remove(&pos);
        self.furnaces.remove(&pos);
        self.digs += 1;
        Ok(())
    }

    fn place_block(
        &mut self,
        reference: BlockPos,
        face: Face,
        item: &Item,
    ) -> Result<(), FacadeError> {
        let target = face.apply(reference);
        if !self.in_reach(target) {
            return Err(FacadeError::Rejected(format!("{target} is out of reach")));
        }
        if !self.blocks.contains_key(&reference) {
            return Err(FacadeError::Rejected(format!(
                "no reference block at {reference}"
            )));
        }
        if let Some(existing) = self.blocks.get(&target) {
            if !is_replaceable(existing.name()) {
                return Err(FacadeError::Rejected(format!("{target} is occupied")));
            }
        }
        if !self.inventory.reserve(item, 1) {
            return Err(FacadeError::Rejected(format!("not holding {item}")));
        }
        // Seeds become their crop block; everything else places as itself.
        let placed = self
            .kb
            .crop_for_seed(item)
            .map(|crop| crop.block)
            .unwrap_or_else(|| item.clone());
        self.blocks.insert(target, placed.clone());
        if placed.name() == "furnace" {
            self.furnaces.entry(target).or_default();
        }
        Ok(())
    }

    fn equip(&mut self, item: &Item) -> Result<(), FacadeError> {
        if !self.inventory.has(item, 1) {
            return Err(FacadeError::Rejected(format!("not holding {item}")));
        }
        self.equipped = Some(item.clone());
        Ok(())
    }

    fn craft(&mut self, recipe: &Recipe) -> Result<(), FacadeError> {
        if recipe.station == Some(Station::CraftingTable) {
            let table_near = self
                .find_block(&|name| name == "crafting_table", INTERACT_REACH)
                .is_some();
            if !table_near {
                return Err(FacadeError::Rejected(
                    "no crafting table within reach".to_string(),
                ));
            }
        }
        for (input, count) in &recipe.inputs {
            if !self.inventory.has(input, *count) {
                return Err(FacadeError::Rejected(format!(
                    "missing {count} {input} to craft {}",
                    recipe.output
                )));
            }
        }
        for (input, count) in &recipe.inputs {
            self.inventory.remove(input, *count);
        }
        self.inventory.add(&recipe.output, recipe.output_count);
        Ok(())
    }

    fn toss(&mut self, item: &Item, count: u32) -> Result<(), FacadeError> {
        if !self.inventory.reserve(item, count) {
            return Err(FacadeError::Rejected(format!(
                "not holding {count} {item}"
            )));
        }
        self.tossed.push((item.clone(), count));
        Ok(())
    }

    fn attack(&mut self, entity_id: u64) -> Result<(), FacadeError> {
        let damage = self.equipped_weapon_damage();
        let Some(entity) = self.entities.get_mut(&entity_id) else {
            return Err(FacadeError::Rejected(format!(
                "no entity with id {entity_id}"
            )));
        };
        if (entity.pos - self.bot_pos).length() > 4.0 {
            return Err(FacadeError::Rejected("target is out of reach".to_string()));
        }
        entity.health -= damage;
        if entity.health <= 0.0 {
            let kind = entity.kind.clone();
            self.entities.remove(&entity_id);
            if let Some((_, drops)) = MOB_DROPS.iter().find(|(mob, _)| *mob == kind) {
                for (item, count) in *drops {
                    self.inventory.add(&Item::new(item), *count);
                }
            }
        }
        Ok(())
    }

    fn furnace_put_input(
        &mut self,
        pos: BlockPos,
        item: &Item,
        count: u32,
    ) -> Result<(), FacadeError> {
        if !self.inventory.has(item, count) {
            return Err(FacadeError::Rejected(format!("not holding {count} {item}")));
        }
        if self.kb.smelt_output_of(item).is_none() {
            return Err(FacadeError::Rejected(format!("{item} cannot be smelted")));
        }
        let furnace = self.furnace_at(pos)?;
        match &mut furnace.input {
            Some((existing, existing_count)) if existing == item => *existing_count += count,
            Some(_) => {
                return Err(FacadeError::Rejected(
                    "furnace input slot holds a different item".to_string(),
                ))
            }
            None => furnace.input = Some((item.clone(), count)),
        }
        self.inventory.remove(item, count);
        Ok(())
    }

    fn furnace_put_fuel(
        &mut self,
        pos: BlockPos,
        item: &Item,
        count: u32,
    ) -> Result<(), FacadeError> {
        if !self.inventory.has(item, count) {
            return Err(FacadeError::Rejected(format!("not holding {count} {item}")));
        }
        if self.kb.fuel_ticks(item) == 0 {
            return Err(FacadeError::Rejected(format!("{item} is not fuel")));
        }
        let furnace = self.furnace_at(pos)?;
        match &mut furnace.fuel {
            Some((existing, existing_count)) if existing == item => *existing_count += count,
            Some(_) => {
                return Err(FacadeError::Rejected(
                    "furnace fuel slot holds a different item".to_string(),
                ))
            }
            None => furnace.fuel = Some((item.clone(), count)),
        }
        self.inventory.remove(item, count);
        Ok(())
    }

    fn furnace_output_count(&self, pos: BlockPos) -> u32 {
        self.furnaces
            .get(&pos)
            .and_then(|f| f.output.as_ref())
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    fn furnace_take_output(&mut self, pos: BlockPos) -> Result<Option<(Item, u32)>, FacadeError> {
        let furnace = self.furnace_at(pos)?;
        let taken = furnace.output.take();
        if let Some((item, count)) = &taken {
            self.inventory.add(item, *count);
        }
        Ok(taken)
    }

    fn wait(&mut self, duration: Duration) {
        self.elapsed += duration;
        let ticks = (duration.as_millis() as u64 / MS_PER_TICK) as u32;
        self.tick_furnaces(ticks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digging_stone_with_a_pickaxe_yields_cobblestone() {
        let mut world = SimWorld::new(7).with_ground(63, 4, "stone");
        world.give("wooden_pickaxe", 1);
        let target = BlockPos::new(1, 63, 0);

        world.equip(&Item::new("wooden_pickaxe")).unwrap();
        world.dig(target).unwrap();

        assert_eq!(world.held("cobblestone"), 1);
        assert_eq!(world.block_name_at(target), "air");
    }

    #[test]
    fn digging_stone_bare_handed_drops_nothing() {
        let mut world = SimWorld::new(7).with_ground(63, 4, "stone");
        world.dig(BlockPos::new(1, 63, 0)).unwrap();
        assert_eq!(world.held("cobblestone"), 0);
    }

    #[test]
    fn bedrock_cannot_be_dug() {
        let mut world = SimWorld::new(7);
        world.set_block(BlockPos::new(0, 63, 0), "bedrock");
        assert!(world.dig(BlockPos::new(0, 63, 0)).is_err());
    }

    #[test]
    fn out_of_reach_digs_are_rejected() {
        let mut world = SimWorld::new(7);
        world.set_block(BlockPos::new(40, 63, 0), "dirt");
        assert!(world.dig(BlockPos::new(40, 63, 0)).is_err());
    }

    #[test]
    fn placement_needs_reference_and_vacancy() {
        let mut world = SimWorld::new(7).with_ground(63, 4, "dirt");
        world.give("cobblestone", 2);

        let ground = BlockPos::new(1, 63, 1);
        world.place_block(ground, Face::UP, &Item::new("cobblestone")).unwrap();
        assert_eq!(world.block_name_at(BlockPos::new(1, 64, 1)), "cobblestone");

        // Same cell again: occupied.
        assert!(world
            .place_block(ground, Face::UP, &Item::new("cobblestone"))
            .is_err());

        // Reference must exist.
        assert!(world
            .place_block(BlockPos::new(0, 70, 0), Face::UP, &Item::new("cobblestone"))
            .is_err());
    }

    #[test]
    fn crafting_consumes_inputs_and_respects_stations() {
        let mut world = SimWorld::new(7).with_ground(63, 4, "dirt");
        world.give("oak_log", 1);
        let kb = KnowledgeBase::new();
        let planks = kb
            .recipe_for(&Item::new("oak_planks"), world.inventory())
            .unwrap();

        world.craft(&planks).unwrap();
        assert_eq!(world.held("oak_planks"), 4);
        assert_eq!(world.held("oak_log"), 0);

        // A pickaxe needs the table.
        world.give("stick", 2);
        let pick = kb
            .recipe_for(&Item::new("wooden_pickaxe"), world.inventory())
            .unwrap();
        assert!(world.craft(&pick).is_err());

        world.set_block(BlockPos::new(1, 64, 1), "crafting_table");
        world.craft(&pick).unwrap();
        assert_eq!(world.held("wooden_pickaxe"), 1);
    }

    #[test]
    fn furnace_smelts_while_waiting() {
        let mut world = SimWorld::new(7).with_ground(63, 4, "stone");
        let furnace_pos = BlockPos::new(1, 64, 1);
        world.set_block(furnace_pos, "furnace");
        world.give("raw_iron", 2);
        world.give("coal", 1);

        world
            .furnace_put_input(furnace_pos, &Item::new("raw_iron"), 2)
            .unwrap();
        world
            .furnace_put_fuel(furnace_pos, &Item::new("coal"), 1)
            .unwrap();

        // 2 items x 200 ticks x 50 ms = 20 s of world time.
        world.wait(Duration::from_secs(25));
        assert_eq!(world.furnace_output_count(furnace_pos), 2);

        let taken = world.furnace_take_output(furnace_pos).unwrap();
        assert_eq!(taken, Some((Item::new("iron_ingot"), 2)));
        assert_eq!(world.held("iron_ingot"), 2);
    }

    #[test]
    fn navigation_teleports_unless_scripted_unreachable() {
        let mut world = SimWorld::new(7);
        let goal = Vec3::new(10.5, 64.0, 10.5);
        world.path_to(goal, 1.0).unwrap();
        assert_eq!(world.position(), goal);

        world.make_unreachable(BlockPos::new(20, 64, 20));
        assert_eq!(
            world.path_to(Vec3::new(20.5, 64.0, 20.5), 1.0),
            Err(NavError::Unreachable)
        );
    }

    #[test]
    fn killing_a_cow_grants_drops() {
        let mut world = SimWorld::new(7);
        world.give("iron_sword", 1);
        world.equip(&Item::new("iron_sword")).unwrap();
        let id = world.spawn_entity("cow", Vec3::new(2.0, 64.0, 0.5), 10.0);

        while world.entity_health(id).is_some() {
            world.attack(id).unwrap();
        }
        assert_eq!(world.held("beef"), 2);
        assert_eq!(world.held("leather"), 1);
    }

    #[test]
    fn seeds_plant_as_crop_blocks() {
        let mut world = SimWorld::new(7).with_ground(63, 4, "farmland");
        world.give("wheat_seeds", 1);
        world
            .place_block(BlockPos::new(1, 63, 0), Face::UP, &Item::new("wheat_seeds"))
            .unwrap();
        assert_eq!(world.block_name_at(BlockPos::new(1, 64, 0)), "wheat");
    }
}
