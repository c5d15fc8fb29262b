//! Serial plan executor.
//!
//! Walks a linear plan task by task. Between tasks the inventory is
//! re-read from the world (the plan was built against a snapshot that may
//! have drifted), already-satisfied tasks are skipped, transient failures
//! are retried, and an abort flag is honoured at every task boundary.

use crate::accountant::InventoryAccountant;
use crate::error::{ResolveError, TaskError};
use crate::plan::{Plan, Task};
use crate::resolver::{Resolver, StationAvailability};
use crate::stations;
use blockhand_core::{Item, ToolKind, ToolRequirement, ToolTier};
use blockhand_facade::{BlockPos, FacadeError, WorldFacade};
use blockhand_knowledge::{KnowledgeBase, Station};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Cooperative cancellation flag, checked at task boundaries and inside
/// long driver loops.
#[derive(Debug, Clone, Default)]
pub struct AbortFlag(Arc<AtomicBool>);

impl AbortFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Tunable limits for execution. Defaults follow the operational values
/// the drivers were written against.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Interaction reach for dig/place/container work.
    pub reach: f64,
    /// Search radius for gather/harvest targets.
    pub gather_radius: f64,
    /// Search radius for existing stations.
    pub station_radius: f64,
    /// Retries for transient task failures.
    pub max_retries: u32,
    pub retry_backoff: Duration,
    /// Pause after a dig so drops get picked up.
    pub pickup_delay: Duration,
    /// Pause between craft invocations.
    pub craft_delay: Duration,
    /// Pause after a block placement before verifying it.
    pub place_delay: Duration,
    pub smelt_poll: Duration,
    /// Give up smelting after this long without an output-slot change.
    pub smelt_no_progress: Duration,
    pub smelt_hard_cap: Duration,
    pub attack_iter_delay: Duration,
    /// Consecutive no-damage iterations before a hunt aborts.
    pub attack_no_progress_iters: u32,
    pub attack_hard_cap: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            reach: 4.5,
            gather_radius: 64.0,
            station_radius: 32.0,
            max_retries: 3,
            retry_backoff: Duration::from_millis(500),
            pickup_delay: Duration::from_millis(500),
            craft_delay: Duration::from_millis(100),
            place_delay: Duration::from_millis(300),
            smelt_poll: Duration::from_secs(1),
            smelt_no_progress: Duration::from_secs(30),
            smelt_hard_cap: Duration::from_secs(300),
            attack_iter_delay: Duration::from_millis(500),
            attack_no_progress_iters: 20,
            attack_hard_cap: Duration::from_secs(30),
        }
    }
}

/// How a plan run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanOutcome {
    Completed,
    Aborted,
    Failed { task: String, error: TaskError },
}

/// Structured result surfaced to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanReport {
    pub outcome: PlanOutcome,
    pub tasks_completed: usize,
    pub tasks_remaining: usize,
}

impl PlanReport {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, PlanOutcome::Completed)
    }
}

/// Serial, single-owner plan walker. One task is active at a time; every
/// facade call is a suspension point.
pub struct Executor<'a> {
    pub(crate) facade: &'a mut dyn WorldFacade,
    pub(crate) kb: &'a KnowledgeBase,
    pub(crate) cfg: ExecutorConfig,
    pub(crate) abort: AbortFlag,
    /// Guards EnsureTool/EnsureStation sub-plan recursion.
    depth: u32,
}

impl<'a> Executor<'a> {
    pub fn new(
        facade: &'a mut dyn WorldFacade,
        kb: &'a KnowledgeBase,
        cfg: ExecutorConfig,
        abort: AbortFlag,
    ) -> Self {
        Self {
            facade,
            kb,
            cfg,
            abort,
            depth: 0,
        }
    }

    /// Execute every task in order. Stops at the first failure or abort;
    /// completed side effects are not rolled back.
    pub fn run(&mut self, plan: &Plan) -> PlanReport {
        let total = plan.tasks.len();
        let initial = InventoryAccountant::snapshot(&*self.facade);
        let levels = plan
            .simulate(&initial, self.kb)
            .map(|sim| sim.levels)
            .unwrap_or_else(|_| vec![None; total]);

        let mut completed = 0usize;
        for (task, level) in plan.tasks.iter().zip(levels) {
            if self.abort.is_set() {
                info!(completed, remaining = total - completed, "plan aborted");
                return PlanReport {
                    outcome: PlanOutcome::Aborted,
                    tasks_completed: completed,
                    tasks_remaining: total - completed,
                };
            }

            // The world may have drifted (or an earlier task over-produced):
            // skip anything already satisfied.
            if let Some((item, target)) = &level {
                if InventoryAccountant::held(&*self.facade, item) >= *target {
                    debug!(task = %task.describe(), "output already satisfied, skipping");
                    completed += 1;
                    continue;
                }
            }

            info!(task = %task.describe(), "running task");
            if let Err(error) = self.run_task(task) {
                warn!(task = %task.describe(), %error, "task failed, plan terminated");
                return PlanReport {
                    outcome: PlanOutcome::Failed {
                        task: task.describe(),
                        error,
                    },
                    tasks_completed: completed,
                    tasks_remaining: total - completed,
                };
            }
            completed += 1;
        }

        PlanReport {
            outcome: PlanOutcome::Completed,
            tasks_completed: completed,
            tasks_remaining: 0,
        }
    }

    fn run_task(&mut self, task: &Task) -> Result<(), TaskError> {
        let mut attempts = 0;
        loop {
            match self.dispatch(task) {
                Ok(()) => return Ok(()),
                Err(err) if err.is_transient() && attempts < self.cfg.max_retries => {
                    attempts += 1;
                    warn!(task = %task.describe(), error = %err, attempt = attempts, "transient failure, retrying");
                    self.facade.wait(self.cfg.retry_backoff);
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// The single dispatch point over the task sum type.
    fn dispatch(&mut self, task: &Task) -> Result<(), TaskError> {
        match task {
            Task::Gather { block, count } => self.gather(block, *count),
            Task::Harvest { crop, count } => self.harvest(crop, *count),
            Task::Craft {
                recipe,
                repetitions,
            } => self.craft_task(recipe, *repetitions),
            Task::Smelt(smelt) => self.smelt(smelt),
            Task::EnsureTool { tool } => self.ensure_tool(tool),
            Task::EnsureStation { station } => self.ensure_station(*station).map(|_| ()),
            Task::Deliver {
                player,
                item,
                count,
            } => self.deliver(player, item, *count),
        }
    }

    /// No-op when the tool is held; otherwise resolve and run a sub-plan
    /// that produces it.
    fn ensure_tool(&mut self, tool: &Item) -> Result<(), TaskError> {
        if InventoryAccountant::held(&*self.facade, tool) > 0 {
            return Ok(());
        }
        self.run_subplan(tool, 1)?;
        if InventoryAccountant::held(&*self.facade, tool) == 0 {
            return Err(TaskError::ToolMissing {
                requirement: ToolRequirement {
                    kind: ToolKind::of_item_name(tool.name()).unwrap_or(ToolKind::Any),
                    min_tier: ToolTier::of_item_name(tool.name()),
                },
            });
        }
        Ok(())
    }

    /// Locate, reach, or build the requested station. Returns its position.
    pub(crate) fn ensure_station(&mut self, station: Station) -> Result<BlockPos, TaskError> {
        let name = station.block_name();
        if let Some(block) = self.facade.find_block(&|n| n == name, self.cfg.station_radius) {
            if block.pos.distance_to(self.facade.position()) > self.cfg.reach {
                self.facade.path_to(block.pos.center(), self.cfg.reach)?;
            }
            return Ok(block.pos);
        }

        let item = Item::new(name);
        if InventoryAccountant::held(&*self.facade, &item) == 0 {
            self.run_subplan(&item, 1)?;
        }
        stations::place_station(self.facade, &item, &self.cfg)
    }

    /// Resolve and execute a nested plan for a prerequisite the outer plan
    /// could not see (station or tool missing at execution time).
    pub(crate) fn run_subplan(&mut self, item: &Item, count: u32) -> Result<(), TaskError> {
        if self.depth >= 2 {
            return Err(ResolveError::Cycle { item: item.clone() }.into());
        }
        let held = InventoryAccountant::snapshot(&*self.facade);
        let stations = StationAvailability::probe(&*self.facade, self.cfg.station_radius);
        let plan = Resolver::new(self.kb).resolve(item, count, &held, stations)?;

        let mut sub = Executor {
            facade: &mut *self.facade,
            kb: self.kb,
            cfg: self.cfg.clone(),
            abort: self.abort.clone(),
            depth: self.depth + 1,
        };
        let report = sub.run(&plan);
        match report.outcome {
            PlanOutcome::Completed => Ok(()),
            PlanOutcome::Aborted => Err(TaskError::Aborted),
            PlanOutcome::Failed { error, .. } => Err(error),
        }
    }

    fn deliver(&mut self, player: &str, item: &Item, count: u32) -> Result<(), TaskError> {
        let Some(pos) = self.facade.player_position(player) else {
            return Err(TaskError::Facade(FacadeError::Rejected(format!(
                "player {player} is not visible"
            ))));
        };
        self.facade.path_to(pos, 3.0)?;
        self.facade.toss(item, count)?;
        Ok(())
    }
}
