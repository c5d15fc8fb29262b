//! Command dispatch.
//!
//! Turns decoded intent steps into resolver goals, executor runs, builder
//! runs, or direct facade calls. Multi-step intents run serially and halt
//! at the first failing step; completed side effects stay.

use crate::config::BotConfig;
use crate::intent::{Intent, Step};
use crate::status::SharedState;
use blockhand_agent::{
    Executor, ExecutorConfig, InventoryAccountant, PlanOutcome, ResolveError, Resolver,
    StationAvailability, Task, TaskError,
};
use blockhand_builder::{Blueprint, BuildOptions, StructureBuilder};
use blockhand_core::Item;
use blockhand_facade::{BlockPos, FacadeError, WorldFacade};
use blockhand_knowledge::KnowledgeBase;
use glam::Vec3;
use serde_json::{json, Value};
use std::sync::mpsc::{Receiver, SyncSender};
use std::time::Duration;
use tracing::{info, warn};

/// A follow command gives up after this much world time without a stop.
const FOLLOW_SESSION_CAP: Duration = Duration::from_secs(600);

/// Result of one command, in the shape the intent source expects.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutcome {
    pub success: bool,
    pub message: String,
}

impl CommandOutcome {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> Value {
        if self.success {
            json!({ "success": true, "message": self.message })
        } else {
            json!({ "success": false, "error": self.message })
        }
    }
}

/// A request handed from the control server to the worker.
pub struct CommandRequest {
    pub intent: Intent,
    pub respond_to: SyncSender<Value>,
}

/// The single worker that owns the facade. Commands execute strictly one
/// at a time; the server's busy guard rejects anything that arrives while
/// one is running.
pub struct CommandWorker<'a> {
    facade: &'a mut dyn WorldFacade,
    kb: &'a KnowledgeBase,
    exec_cfg: ExecutorConfig,
    pub state: SharedState,
    blueprint: Option<Blueprint>,
}

impl<'a> CommandWorker<'a> {
    pub fn new(
        facade: &'a mut dyn WorldFacade,
        kb: &'a KnowledgeBase,
        config: &BotConfig,
        state: SharedState,
    ) -> Self {
        Self {
            facade,
            kb,
            exec_cfg: config.executor_config(),
            state,
            blueprint: None,
        }
    }

    pub fn handle(&mut self, intent: &Intent) -> CommandOutcome {
        match intent {
            Intent::ParserError(message) => {
                CommandOutcome::fail(format!("intent parser failed: {message}"))
            }
            Intent::Single(step) => self.run_step(step),
            Intent::Multi(steps) => {
                let mut messages = Vec::with_capacity(steps.len());
                for (index, step) in steps.iter().enumerate() {
                    let outcome = self.run_step(step);
                    if !outcome.success {
                        return CommandOutcome::fail(format!(
                            "step {}/{} ({}) failed: {}",
                            index + 1,
                            steps.len(),
                            step.verb(),
                            outcome.message
                        ));
                    }
                    messages.push(outcome.message);
                }
                CommandOutcome::ok(messages.join("; "))
            }
        }
    }

    fn run_step(&mut self, step: &Step) -> CommandOutcome {
        self.state.observe(&*self.facade, true);
        info!(verb = step.verb(), "starting step");
        let result = self.dispatch(step);
        self.state.observe(&*self.facade, true);
        match result {
            Ok(message) => {
                info!(verb = step.verb(), %message, "step done");
                CommandOutcome::ok(message)
            }
            Err(error) => {
                warn!(verb = step.verb(), %error, "step failed");
                CommandOutcome::fail(error.to_string())
            }
        }
    }

    fn dispatch(&mut self, step: &Step) -> Result<String, TaskError> {
        match step {
            Step::Mine { block, count } => {
                let block_item = Item::new(block);
                let goal = self
                    .kb
                    .drop_for(&block_item)
                    .map(|drop| drop.item)
                    .ok_or(ResolveError::Unsatisfiable {
                        item: block_item.clone(),
                    })?;
                self.run_goal(&goal, *count)?;
                Ok(format!("mined {count} {goal}"))
            }
            Step::Craft { item, count } | Step::Smelt { item, count } => {
                let held = InventoryAccountant::snapshot(&*self.facade);
                let goal = self.kb.resolve_ingredient(item, &held);
                self.run_goal(&goal, *count)?;
                Ok(format!("obtained {count} {goal}"))
            }
            Step::Fight { mob, radius } => {
                let mut executor = self.executor();
                let kills = executor.hunt(mob, *radius)?;
                Ok(format!("fought {mob}: {kills} down"))
            }
            Step::Harvest { crop, radius } => self.harvest_all(crop, *radius),
            Step::Follow { player, distance } => self.follow(player, *distance),
            Step::Give {
                player,
                item,
                count,
            } => {
                let held = InventoryAccountant::snapshot(&*self.facade);
                let goal = self.kb.resolve_ingredient(item, &held);
                self.run_goal(&goal, *count)?;
                let plan = blockhand_agent::Plan {
                    goal: goal.clone(),
                    goal_count: *count,
                    tasks: vec![Task::Deliver {
                        player: player.clone(),
                        item: goal.clone(),
                        count: *count,
                    }],
                };
                self.run_plan(&plan)?;
                Ok(format!("delivered {count} {goal} to {player}"))
            }
            Step::Goto { x, y, z } => {
                self.facade
                    .path_to(Vec3::new(*x as f32, *y as f32, *z as f32), 1.0)?;
                Ok(format!("arrived at ({x:.0}, {y:.0}, {z:.0})"))
            }
            Step::Respond { message } => Ok(message.clone()),
            Step::LoadBlueprint { file_path } => {
                let content = std::fs::read_to_string(file_path).map_err(|err| {
                    TaskError::Facade(FacadeError::Rejected(format!(
                        "cannot read {file_path}: {err}"
                    )))
                })?;
                let blueprint = Blueprint::from_json_str(&content).map_err(|err| {
                    TaskError::Facade(FacadeError::Rejected(format!(
                        "cannot parse {file_path}: {err}"
                    )))
                })?;
                blueprint
                    .validate()
                    .map_err(|err| TaskError::Facade(FacadeError::Rejected(err.to_string())))?;
                let blocks = blueprint.len();
                self.blueprint = Some(blueprint);
                Ok(format!("loaded blueprint with {blocks} blocks"))
            }
            Step::BuildStructure {
                blueprint,
                position,
            } => self.build_structure(blueprint.as_deref(), *position),
            Step::Stop => {
                self.state.abort.set();
                Ok("stopping".to_string())
            }
            Step::Status => {
                let status = self.state.snapshot();
                Ok(serde_json::to_string(&status).unwrap_or_else(|_| "{}".to_string()))
            }
        }
    }

    fn executor(&mut self) -> Executor<'_> {
        Executor::new(
            &mut *self.facade,
            self.kb,
            self.exec_cfg.clone(),
            self.state.abort.clone(),
        )
    }

    /// Resolve a goal against the live inventory and execute the plan.
    fn run_goal(&mut self, goal: &Item, count: u32) -> Result<(), TaskError> {
        let held = InventoryAccountant::snapshot(&*self.facade);
        let stations = StationAvailability::probe(&*self.facade, self.exec_cfg.station_radius);
        let plan = Resolver::new(self.kb).resolve(goal, count, &held, stations)?;
        info!(goal = %goal, count, tasks = plan.len(), "plan resolved");
        self.run_plan(&plan)
    }

    fn run_plan(&mut self, plan: &blockhand_agent::Plan) -> Result<(), TaskError> {
        let report = self.executor().run(plan);
        match report.outcome {
            PlanOutcome::Completed => Ok(()),
            PlanOutcome::Aborted => Err(TaskError::Aborted),
            PlanOutcome::Failed { error, .. } => Err(error),
        }
    }

    /// Harvest mature crops one at a time until the search radius is dry.
    fn harvest_all(&mut self, crop: &str, radius: f64) -> Result<String, TaskError> {
        let item = Item::new(crop);
        if self.kb.crop_for(&item).is_none() {
            return Err(ResolveError::Unsatisfiable { item }.into());
        }

        let mut cfg = self.exec_cfg.clone();
        cfg.gather_radius = radius;
        let mut total = 0u32;
        loop {
            if self.state.abort.is_set() {
                break;
            }
            let plan = blockhand_agent::Plan {
                goal: item.clone(),
                goal_count: 1,
                tasks: vec![Task::Harvest {
                    crop: item.clone(),
                    count: 1,
                }],
            };
            let mut executor = Executor::new(
                &mut *self.facade,
                self.kb,
                cfg.clone(),
                self.state.abort.clone(),
            );
            match executor.run(&plan).outcome {
                PlanOutcome::Completed => total += 1,
                PlanOutcome::Aborted => break,
                PlanOutcome::Failed {
                    error: TaskError::ResourceExhausted { .. },
                    ..
                } => break,
                PlanOutcome::Failed { error, .. } => return Err(error),
            }
        }
        Ok(format!("harvested {total} {crop}"))
    }

    /// Trail a player until stop is requested, the player vanishes, or the
    /// session cap elapses.
    fn follow(&mut self, player: &str, distance: f64) -> Result<String, TaskError> {
        let mut followed = Duration::ZERO;
        while !self.state.abort.is_set() && followed < FOLLOW_SESSION_CAP {
            let Some(pos) = self.facade.player_position(player) else {
                return Ok(format!("lost sight of {player}"));
            };
            if (pos - self.facade.position()).length() as f64 > distance {
                self.facade.path_to(pos, distance)?;
            }
            self.facade.wait(Duration::from_millis(500));
            followed += Duration::from_millis(500);
        }
        Ok(format!("stopped following {player}"))
    }

    fn build_structure(
        &mut self,
        blueprint_path: Option<&str>,
        position: Option<[i32; 3]>,
    ) -> Result<String, TaskError> {
        let blueprint = match blueprint_path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|err| {
                    TaskError::Facade(FacadeError::Rejected(format!("cannot read {path}: {err}")))
                })?;
                Blueprint::from_json_str(&content).map_err(|err| {
                    TaskError::Facade(FacadeError::Rejected(format!("cannot parse {path}: {err}")))
                })?
            }
            None => self.blueprint.clone().ok_or_else(|| {
                TaskError::Facade(FacadeError::Rejected("no blueprint loaded".to_string()))
            })?,
        };
        blueprint
            .validate()
            .map_err(|err| TaskError::Facade(FacadeError::Rejected(err.to_string())))?;

        let origin = position
            .map(|[x, y, z]| BlockPos::new(x, y, z))
            .unwrap_or_else(|| BlockPos::containing(self.facade.position()).offset(2, 0, 2));

        let mut builder = StructureBuilder::new(
            &mut *self.facade,
            self.kb,
            self.exec_cfg.clone(),
            self.state.abort.clone(),
        );
        let report = builder.build(&blueprint, origin, &BuildOptions::default())?;
        Ok(format!(
            "build finished: {} placed, {} skipped, {} failed",
            report.placed, report.skipped, report.failed
        ))
    }
}

/// Drain command requests forever. The worker owns the facade; one command
/// at a time, responses go back over the rendezvous channel.
pub fn run_worker(rx: Receiver<CommandRequest>, worker: &mut CommandWorker<'_>) {
    while let Ok(request) = rx.recv() {
        let outcome = worker.handle(&request.intent);
        worker.state.finish();
        let _ = request.respond_to.send(outcome.to_json());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockhand_testkit::SimWorld;

    fn worker_fixture() -> (KnowledgeBase, BotConfig, SharedState) {
        (KnowledgeBase::new(), BotConfig::default(), SharedState::new())
    }

    #[test]
    fn mine_step_translates_block_to_drop_goal() {
        let mut world = SimWorld::new(31).with_ground(63, 8, "stone");
        world.give("wooden_pickaxe", 1);
        let (kb, config, state) = worker_fixture();
        let mut worker = CommandWorker::new(&mut world, &kb, &config, state);

        let outcome = worker.run_step(&Step::Mine {
            block: "stone".to_string(),
            count: 3,
        });
        assert!(outcome.success, "{}", outcome.message);
        assert_eq!(world.held("cobblestone"), 3);
    }

    #[test]
    fn multistep_halts_on_first_failure() {
        let mut world = SimWorld::new(32).with_ground(63, 8, "dirt");
        let (kb, config, state) = worker_fixture();
        let mut worker = CommandWorker::new(&mut world, &kb, &config, state);

        let intent = Intent::Multi(vec![
            Step::Respond {
                message: "on it".to_string(),
            },
            Step::Mine {
                block: "bedrock".to_string(),
                count: 1,
            },
            Step::Respond {
                message: "never reached".to_string(),
            },
        ]);
        let outcome = worker.handle(&intent);
        assert!(!outcome.success);
        assert!(outcome.message.contains("step 2/3"), "{}", outcome.message);
    }

    #[test]
    fn craft_step_respects_held_wood_variant() {
        let mut world = SimWorld::new(33).with_ground(63, 8, "dirt");
        world.give("spruce_log", 2);
        let (kb, config, state) = worker_fixture();
        let mut worker = CommandWorker::new(&mut world, &kb, &config, state);

        let outcome = worker.run_step(&Step::Craft {
            item: "planks".to_string(),
            count: 4,
        });
        assert!(outcome.success, "{}", outcome.message);
        assert_eq!(world.held("spruce_planks"), 4);
        assert_eq!(world.held("oak_planks"), 0);
    }

    #[test]
    fn parser_errors_come_back_as_failures() {
        let mut world = SimWorld::new(34);
        let (kb, config, state) = worker_fixture();
        let mut worker = CommandWorker::new(&mut world, &kb, &config, state);

        let outcome = worker.handle(&Intent::ParserError("no verb found".to_string()));
        assert!(!outcome.success);
        assert!(outcome.message.contains("no verb found"));
    }

    #[test]
    fn outcome_json_shape_matches_the_controller() {
        let ok = CommandOutcome::ok("done").to_json();
        assert_eq!(ok["success"], true);
        assert_eq!(ok["message"], "done");

        let fail = CommandOutcome::fail("nope").to_json();
        assert_eq!(fail["success"], false);
        assert_eq!(fail["error"], "nope");
    }
}
