//! Recursive goal resolver.
//!
//! Decomposes "obtain N of item X" into a linear plan over smelting,
//! crafting, gathering and harvesting, with tool and station prerequisites
//! scheduled before their consumers. Production modes are tried in a fixed
//! priority order and fall back on failure; a visiting set breaks recipe
//! cycles (charcoal fuelled by charcoal) by forcing the next mode or the
//! next fuel candidate.

use crate::error::ResolveError;
use crate::plan::{FuelPlan, Plan, SmeltTask, Task};
use crate::validator;
use blockhand_core::{Inventory, Item, ToolKind};
use blockhand_facade::WorldFacade;
use blockhand_knowledge::{KnowledgeBase, SmeltRecipe, Station};
use std::collections::BTreeSet;

/// Decomposition deeper than this is assumed cyclic.
const MAX_DEPTH: u32 = 32;

/// Which stations are already reachable in the world. The resolver plans
/// station construction only for the missing ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct StationAvailability {
    pub crafting_table: bool,
    pub furnace: bool,
}

impl StationAvailability {
    pub fn none() -> Self {
        Self::default()
    }

    /// Scan the world for reachable stations.
    pub fn probe(facade: &dyn WorldFacade, radius: f64) -> Self {
        Self {
            crafting_table: facade
                .find_block(&|name| name == "crafting_table", radius)
                .is_some(),
            furnace: facade.find_block(&|name| name == "furnace", radius).is_some(),
        }
    }
}

#[derive(Debug, Clone)]
struct ResolveState {
    /// Working snapshot; reservations decrement it so the same held stack
    /// is never counted twice.
    snapshot: Inventory,
    tasks: Vec<Task>,
    /// Items currently on the decomposition stack.
    visiting: BTreeSet<Item>,
    stations: StationAvailability,
    ensured_table: bool,
    ensured_furnace: bool,
    depth: u32,
}

struct Checkpoint {
    snapshot: Inventory,
    task_len: usize,
    stations: StationAvailability,
    ensured_table: bool,
    ensured_furnace: bool,
}

impl ResolveState {
    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            snapshot: self.snapshot.clone(),
            task_len: self.tasks.len(),
            stations: self.stations,
            ensured_table: self.ensured_table,
            ensured_furnace: self.ensured_furnace,
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.snapshot = checkpoint.snapshot;
        self.tasks.truncate(checkpoint.task_len);
        self.stations = checkpoint.stations;
        self.ensured_table = checkpoint.ensured_table;
        self.ensured_furnace = checkpoint.ensured_furnace;
    }
}

/// The goal resolver. Borrows the knowledge base; holds no state between
/// resolutions.
pub struct Resolver<'a> {
    kb: &'a KnowledgeBase,
}

impl<'a> Resolver<'a> {
    pub fn new(kb: &'a KnowledgeBase) -> Self {
        Self { kb }
    }

    /// Resolve a goal against an inventory snapshot into a linear plan.
    /// An already-satisfied goal yields the empty plan.
    pub fn resolve(
        &self,
        goal: &Item,
        count: u32,
        held: &Inventory,
        stations: StationAvailability,
    ) -> Result<Plan, ResolveError> {
        let mut state = ResolveState {
            snapshot: held.clone(),
            tasks: Vec::new(),
            visiting: BTreeSet::new(),
            stations,
            ensured_table: false,
            ensured_furnace: false,
            depth: 0,
        };
        self.produce(&mut state, goal, count, 0)?;
        Ok(Plan {
            goal: goal.clone(),
            goal_count: count,
            tasks: coalesce(goal, state.tasks, held, self.kb),
        })
    }

    /// Make `needed` units of `item` available to the caller: reserve what
    /// is held, plan production for the rest. Over-production flows back
    /// into the snapshot for later branches.
    fn produce(
        &self,
        state: &mut ResolveState,
        item: &Item,
        needed: u32,
        fuel_depth: u8,
    ) -> Result<(), ResolveError> {
        let take = state.snapshot.count(item).min(needed);
        state.snapshot.remove(item, take);
        let deficit = needed - take;
        if deficit == 0 {
            return Ok(());
        }

        if state.depth >= MAX_DEPTH || !state.visiting.insert(item.clone()) {
            return Err(ResolveError::Cycle { item: item.clone() });
        }
        state.depth += 1;
        let result = self.produce_deficit(state, item, deficit, fuel_depth);
        state.depth -= 1;
        state.visiting.remove(item);
        result
    }

    fn produce_deficit(
        &self,
        state: &mut ResolveState,
        item: &Item,
        deficit: u32,
        fuel_depth: u8,
    ) -> Result<(), ResolveError> {
        let mut last_err: Option<ResolveError> = None;

        let recipe = self.kb.recipe_for(item, &state.snapshot);
        let source = self.kb.source_block_for(item);

        // Gather jumps ahead of craft when the recipe would drag in a tool
        // bootstrap the gather does not need.
        let gather_before_craft = match (&recipe, &source) {
            (Some(recipe), Some(block)) => {
                validator::check_tool(self.kb, &state.snapshot, block).is_ready()
                    && !self.craft_inputs_held(state, recipe, deficit)
            }
            _ => false,
        };

        if let Some(smelt) = self.kb.smelt_for(item) {
            match self.attempt(state, |s| {
                self.plan_smelt(s, item, &smelt, deficit, fuel_depth)
            }) {
                Ok(()) => return Ok(()),
                Err(err) => last_err = Some(err),
            }
        }

        if gather_before_craft {
            if let Some(block) = &source {
                match self.attempt(state, |s| {
                    self.plan_gather(s, item, block, deficit, fuel_depth)
                }) {
                    Ok(()) => return Ok(()),
                    Err(err) => last_err = Some(err),
                }
            }
        }

        if let Some(recipe) = &recipe {
            match self.attempt(state, |s| {
                self.plan_craft(s, item, recipe, deficit, fuel_depth)
            }) {
                Ok(()) => return Ok(()),
                Err(err) => last_err = Some(err),
            }
        }

        if !gather_before_craft {
            if let Some(block) = &source {
                match self.attempt(state, |s| {
                    self.plan_gather(s, item, block, deficit, fuel_depth)
                }) {
                    Ok(()) => return Ok(()),
                    Err(err) => last_err = Some(err),
                }
            }
        }

        if self.kb.crop_for(item).is_some() {
            match self.attempt(state, |s| self.plan_harvest(s, item, deficit)) {
                Ok(()) => return Ok(()),
                Err(err) => last_err = Some(err),
            }
        }

        Err(last_err.unwrap_or(ResolveError::Unsatisfiable { item: item.clone() }))
    }

    /// Run a production mode against the state, rolling back on failure so
    /// the next mode starts clean.
    fn attempt(
        &self,
        state: &mut ResolveState,
        mode: impl FnOnce(&mut ResolveState) -> Result<(), ResolveError>,
    ) -> Result<(), ResolveError> {
        let checkpoint = state.checkpoint();
        match mode(state) {
            Ok(()) => Ok(()),
            Err(err) => {
                state.restore(checkpoint);
                Err(err)
            }
        }
    }

    fn craft_inputs_held(
        &self,
        state: &ResolveState,
        recipe: &blockhand_knowledge::Recipe,
        deficit: u32,
    ) -> bool {
        let reps = deficit.div_ceil(recipe.output_count);
        recipe
            .inputs
            .iter()
            .all(|(input, per_craft)| state.snapshot.has(input, per_craft * reps))
    }

    fn plan_craft(
        &self,
        state: &mut ResolveState,
        item: &Item,
        recipe: &blockhand_knowledge::Recipe,
        deficit: u32,
        fuel_depth: u8,
    ) -> Result<(), ResolveError> {
        let reps = deficit.div_ceil(recipe.output_count);
        for (input, per_craft) in &recipe.inputs {
            self.produce(state, input, per_craft * reps, fuel_depth)?;
        }
        if recipe.station == Some(Station::CraftingTable) {
            self.ensure_station(state, Station::CraftingTable, fuel_depth)?;
        }
        state.tasks.push(Task::Craft {
            recipe: recipe.clone(),
            repetitions: reps,
        });
        state.snapshot.add(item, reps * recipe.output_count - deficit);
        Ok(())
    }

    fn plan_gather(
        &self,
        state: &mut ResolveState,
        item: &Item,
        block: &Item,
        deficit: u32,
        fuel_depth: u8,
    ) -> Result<(), ResolveError> {
        let Some(requirement) = self.kb.tool_requirement_for(block) else {
            return Err(ResolveError::Unsatisfiable { item: item.clone() });
        };
        let Some(drop) = self.kb.drop_for(block) else {
            return Err(ResolveError::Unsatisfiable { item: item.clone() });
        };
        debug_assert_eq!(drop.item, *item, "drop table and source table disagree");

        if !requirement.hand_suffices()
            && validator::best_adequate_tool(&state.snapshot, &requirement).is_none()
        {
            let tier = requirement
                .min_tier
                .expect("requirement with insufficient hand names a tier");
            let kind = match requirement.kind {
                ToolKind::Any => ToolKind::Pickaxe,
                kind => kind,
            };
            // Cheapest adequate tool; tools survive use, so the produced
            // unit flows back into the snapshot.
            let tool = Item::new(&tier.tool_name(kind));
            self.produce(state, &tool, 1, fuel_depth)?;
            state.snapshot.add(&tool, 1);
            state.tasks.push(Task::EnsureTool { tool });
        }

        let digs = deficit.div_ceil(drop.min);
        state.tasks.push(Task::Gather {
            block: block.clone(),
            count: digs,
        });
        state.snapshot.add(item, digs * drop.min - deficit);
        Ok(())
    }

    fn plan_harvest(
        &self,
        state: &mut ResolveState,
        item: &Item,
        deficit: u32,
    ) -> Result<(), ResolveError> {
        state.tasks.push(Task::Harvest {
            crop: item.clone(),
            count: deficit,
        });
        Ok(())
    }

    fn plan_smelt(
        &self,
        state: &mut ResolveState,
        item: &Item,
        recipe: &SmeltRecipe,
        deficit: u32,
        fuel_depth: u8,
    ) -> Result<(), ResolveError> {
        let input = self.kb.smelt_input_for(recipe, &state.snapshot);
        self.produce(state, &input, deficit, fuel_depth)?;
        let fuel = self.plan_fuel(state, item, deficit, fuel_depth)?;
        self.ensure_station(state, Station::Furnace, fuel_depth)?;
        state.tasks.push(Task::Smelt(SmeltTask {
            output: item.clone(),
            input,
            count: deficit,
            fuel,
        }));
        Ok(())
    }

    /// Pick fuel for smelting `count` items. Three passes over the ordered
    /// candidates: already held in quantity, then cheap to produce, then
    /// anything producible. Smeltable fuels are excluded one level into a
    /// fuel branch, which is what bounds the charcoal-for-charcoal cycle.
    fn plan_fuel(
        &self,
        state: &mut ResolveState,
        smelting: &Item,
        count: u32,
        fuel_depth: u8,
    ) -> Result<FuelPlan, ResolveError> {
        let candidates = self.kb.fuel_candidates(&state.snapshot);
        let mut failed: BTreeSet<Item> = BTreeSet::new();
        let mut last_err: Option<ResolveError> = None;

        for pass in 0..3 {
            for fuel in &candidates {
                if fuel == smelting || failed.contains(fuel) {
                    continue;
                }
                if fuel_depth >= 1 && self.kb.smelt_for(fuel).is_some() {
                    continue;
                }
                let needed = self.kb.fuel_needed(fuel, count);
                if needed == u32::MAX {
                    continue;
                }
                let held = state.snapshot.count(fuel);
                let applicable = match pass {
                    0 => held >= needed,
                    1 => held >= needed || !self.production_needs_new_tool(state, fuel),
                    _ => true,
                };
                if !applicable {
                    continue;
                }
                match self.attempt(state, |s| self.produce(s, fuel, needed, fuel_depth + 1)) {
                    Ok(()) => {
                        return Ok(FuelPlan {
                            fuel: fuel.clone(),
                            count: needed,
                        })
                    }
                    Err(err) => {
                        failed.insert(fuel.clone());
                        last_err = Some(err);
                    }
                }
            }
        }

        Err(last_err.unwrap_or(ResolveError::Unsatisfiable {
            item: smelting.clone(),
        }))
    }

    /// Shallow cost probe: would producing `item` from the current snapshot
    /// force a tool bootstrap (or something equally deep)?
    fn production_needs_new_tool(&self, state: &ResolveState, item: &Item) -> bool {
        if let Some(block) = self.kb.source_block_for(item) {
            return !validator::check_tool(self.kb, &state.snapshot, &block).is_ready();
        }
        if let Some(recipe) = self.kb.recipe_for(item, &state.snapshot) {
            return recipe.inputs.iter().any(|(input, count)| {
                !state.snapshot.has(input, *count)
                    && self.kb.source_block_for(input).map_or(true, |block| {
                        !validator::check_tool(self.kb, &state.snapshot, &block).is_ready()
                    })
            });
        }
        true
    }

    fn ensure_station(
        &self,
        state: &mut ResolveState,
        station: Station,
        fuel_depth: u8,
    ) -> Result<(), ResolveError> {
        let (available, ensured) = match station {
            Station::CraftingTable => (state.stations.crafting_table, state.ensured_table),
            Station::Furnace => (state.stations.furnace, state.ensured_furnace),
        };
        if ensured {
            return Ok(());
        }
        if !available {
            // The station item is consumed by placement, so the produced
            // unit stays reserved.
            self.produce(state, &Item::new(station.block_name()), 1, fuel_depth)?;
        }
        state.tasks.push(Task::EnsureStation { station });
        match station {
            Station::CraftingTable => state.ensured_table = true,
            Station::Furnace => state.ensured_furnace = true,
        }
        Ok(())
    }
}

/// The merged form of `into` absorbing `task`, if the two are duplicates
/// of the same subgoal.
fn merge_tasks(into: &Task, task: &Task) -> Option<Task> {
    match (into, task) {
        (
            Task::Gather { block: have, count },
            Task::Gather {
                block,
                count: extra,
            },
        ) if have == block => Some(Task::Gather {
            block: block.clone(),
            count: count + extra,
        }),
        (
            Task::Harvest { crop: have, count },
            Task::Harvest { crop, count: extra },
        ) if have == crop => Some(Task::Harvest {
            crop: crop.clone(),
            count: count + extra,
        }),
        (
            Task::Craft {
                recipe: have,
                repetitions,
            },
            Task::Craft {
                recipe,
                repetitions: extra,
            },
        ) if have == recipe => Some(Task::Craft {
            recipe: recipe.clone(),
            repetitions: repetitions + extra,
        }),
        (Task::Smelt(have), Task::Smelt(smelt))
            if have.output == smelt.output
                && have.input == smelt.input
                && have.fuel.fuel == smelt.fuel.fuel =>
        {
            Some(Task::Smelt(SmeltTask {
                output: have.output.clone(),
                input: have.input.clone(),
                count: have.count + smelt.count,
                fuel: FuelPlan {
                    fuel: have.fuel.fuel.clone(),
                    count: have.fuel.count + smelt.fuel.count,
                },
            }))
        }
        (Task::EnsureTool { tool: have }, Task::EnsureTool { tool }) if have == tool => {
            Some(into.clone())
        }
        (
            Task::EnsureStation { station: have },
            Task::EnsureStation { station },
        ) if have == station => Some(into.clone()),
        _ => None,
    }
}

/// Merge duplicate subgoals into their earliest occurrence, accumulating
/// counts. Pulling consumption earlier can outrun a producer, so every
/// candidate merge is validated against the idealised inventory simulation
/// and dropped if it would drive a count negative.
fn coalesce(goal: &Item, tasks: Vec<Task>, held: &Inventory, kb: &KnowledgeBase) -> Vec<Task> {
    let mut merged: Vec<Task> = Vec::with_capacity(tasks.len());
    'next: for task in tasks {
        for idx in 0..merged.len() {
            let Some(candidate) = merge_tasks(&merged[idx], &task) else {
                continue;
            };
            let mut trial = merged.clone();
            trial[idx] = candidate;
            let feasible = Plan {
                goal: goal.clone(),
                goal_count: 0,
                tasks: trial.clone(),
            }
            .simulate(held, kb)
            .is_ok();
            if feasible {
                merged = trial;
                continue 'next;
            }
        }
        merged.push(task);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kb() -> KnowledgeBase {
        KnowledgeBase::new()
    }

    fn inv(entries: &[(&str, u32)]) -> Inventory {
        entries
            .iter()
            .map(|&(name, count)| (Item::new(name), count))
            .collect()
    }

    fn resolve(
        goal: &str,
        count: u32,
        held: &Inventory,
        stations: StationAvailability,
    ) -> Result<Plan, ResolveError> {
        let kb = kb();
        Resolver::new(&kb).resolve(&Item::new(goal), count, held, stations)
    }

    #[test]
    fn satisfied_goal_yields_the_empty_plan() {
        let held = inv(&[("cobblestone", 5)]);
        let plan = resolve("cobblestone", 3, &held, StationAvailability::none()).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn simple_gather_with_tool_held() {
        let held = inv(&[("wooden_pickaxe", 1)]);
        let plan = resolve("cobblestone", 3, &held, StationAvailability::none()).unwrap();
        assert_eq!(
            plan.tasks,
            vec![Task::Gather {
                block: Item::new("stone"),
                count: 3
            }]
        );
    }

    #[test]
    fn bootstrap_to_stone_pickaxe_from_nothing() {
        let plan = resolve(
            "stone_pickaxe",
            1,
            &Inventory::new(),
            StationAvailability::none(),
        )
        .unwrap();

        let descriptions: Vec<String> = plan.tasks.iter().map(Task::describe).collect();
        assert_eq!(
            descriptions,
            vec![
                "gather 3 oak_log",
                "craft 12 oak_planks",
                "craft 4 stick",
                "craft 1 crafting_table",
                "ensure crafting_table",
                "craft 1 wooden_pickaxe",
                "ensure tool wooden_pickaxe",
                "gather 3 stone",
                "craft 1 stone_pickaxe",
            ]
        );

        // The whole chain is feasible from an empty inventory.
        let sim = plan.simulate(&Inventory::new(), &kb()).unwrap();
        assert_eq!(sim.final_inventory.count(&Item::new("stone_pickaxe")), 1);
    }

    #[test]
    fn smelt_plans_fuel_from_held_logs() {
        let held = inv(&[("raw_iron", 4), ("oak_log", 2)]);
        let stations = StationAvailability {
            furnace: true,
            crafting_table: false,
        };
        let plan = resolve("iron_ingot", 4, &held, stations).unwrap();

        assert_eq!(
            plan.tasks,
            vec![
                Task::Gather {
                    block: Item::new("oak_log"),
                    count: 1
                },
                Task::EnsureStation {
                    station: Station::Furnace
                },
                Task::Smelt(SmeltTask {
                    output: Item::new("iron_ingot"),
                    input: Item::new("raw_iron"),
                    count: 4,
                    fuel: FuelPlan {
                        fuel: Item::new("oak_log"),
                        count: 3
                    },
                }),
            ]
        );
    }

    #[test]
    fn charcoal_fuel_cycle_falls_back_to_logs() {
        let stations = StationAvailability {
            furnace: true,
            crafting_table: false,
        };
        let plan = resolve("charcoal", 2, &Inventory::new(), stations).unwrap();

        assert_eq!(
            plan.tasks,
            vec![
                Task::Gather {
                    block: Item::new("oak_log"),
                    count: 4
                },
                Task::EnsureStation {
                    station: Station::Furnace
                },
                Task::Smelt(SmeltTask {
                    output: Item::new("charcoal"),
                    input: Item::new("oak_log"),
                    count: 2,
                    fuel: FuelPlan {
                        fuel: Item::new("oak_log"),
                        count: 2
                    },
                }),
            ]
        );

        // No nested charcoal smelt anywhere in the plan.
        let charcoal_smelts = plan
            .tasks
            .iter()
            .filter(|t| matches!(t, Task::Smelt(s) if s.output == Item::new("charcoal")))
            .count();
        assert_eq!(charcoal_smelts, 1);
    }

    #[test]
    fn bedrock_is_unsatisfiable() {
        let err = resolve("bedrock", 1, &Inventory::new(), StationAvailability::none())
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::Unsatisfiable {
                item: Item::new("bedrock")
            }
        );
    }

    #[test]
    fn held_stock_is_not_double_counted() {
        let held = inv(&[("stick", 2), ("oak_planks", 10)]);
        let stations = StationAvailability {
            crafting_table: true,
            furnace: false,
        };
        let kb = kb();
        let resolver = Resolver::new(&kb);

        let plan = resolver
            .resolve(&Item::new("wooden_pickaxe"), 1, &held, stations)
            .unwrap();
        let sim = plan.simulate(&held, &kb).unwrap();
        assert_eq!(sim.final_inventory.count(&Item::new("wooden_pickaxe")), 1);
    }

    #[test]
    fn spruce_inventory_never_plans_oak() {
        let held = inv(&[("spruce_log", 8)]);
        let stations = StationAvailability::none();
        let plan = resolve("stick", 4, &held, stations).unwrap();

        for task in &plan.tasks {
            if let Task::Craft { recipe, .. } = task {
                for (input, _) in &recipe.inputs {
                    assert!(
                        !input.name().starts_with("oak_"),
                        "planned {} despite a spruce inventory",
                        input
                    );
                }
            }
        }
    }

    #[test]
    fn world_stations_are_reused_not_rebuilt() {
        let held = inv(&[("oak_planks", 3), ("stick", 2)]);
        let stations = StationAvailability {
            crafting_table: true,
            furnace: false,
        };
        let plan = resolve("wooden_pickaxe", 1, &held, stations).unwrap();

        assert_eq!(
            plan.tasks,
            vec![
                Task::EnsureStation {
                    station: Station::CraftingTable
                },
                Task::Craft {
                    recipe: kb()
                        .recipe_for(&Item::new("wooden_pickaxe"), &held)
                        .unwrap(),
                    repetitions: 1
                },
            ]
        );
    }

    #[test]
    fn coalesce_merges_duplicate_gathers_into_the_first() {
        let tasks = vec![
            Task::Gather {
                block: Item::new("oak_log"),
                count: 1,
            },
            Task::EnsureStation {
                station: Station::Furnace,
            },
            Task::Gather {
                block: Item::new("oak_log"),
                count: 2,
            },
        ];
        let merged = coalesce(&Item::new("oak_log"), tasks, &Inventory::new(), &kb());
        assert_eq!(
            merged,
            vec![
                Task::Gather {
                    block: Item::new("oak_log"),
                    count: 3
                },
                Task::EnsureStation {
                    station: Station::Furnace
                },
            ]
        );
    }

    #[test]
    fn charcoal_resolves_even_without_a_world_furnace() {
        // The plan must build the furnace too: cobblestone, which needs a
        // pickaxe, which needs logs. The whole chain stays feasible.
        let plan =
            resolve("charcoal", 1, &Inventory::new(), StationAvailability::none()).unwrap();
        let sim = plan.simulate(&Inventory::new(), &kb()).unwrap();
        assert_eq!(sim.final_inventory.count(&Item::new("charcoal")), 1);
        assert!(plan
            .tasks
            .iter()
            .any(|t| matches!(t, Task::EnsureStation { station: Station::Furnace })));
    }
}
