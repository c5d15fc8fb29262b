//! Smelt driver: feed the furnace, watch the output slot.

use crate::error::TaskError;
use crate::executor::Executor;
use crate::plan::SmeltTask;
use blockhand_facade::WorldFacade;
use blockhand_knowledge::Station;
use std::time::Duration;
use tracing::debug;

impl Executor<'_> {
    /// Smelt a batch. Progress is judged purely by output-slot count
    /// transitions; a stall longer than the no-progress window (or the
    /// overall hard cap) times the task out, keeping whatever was smelted.
    pub(crate) fn smelt(&mut self, task: &SmeltTask) -> Result<(), TaskError> {
        let furnace = self.ensure_station(Station::Furnace)?;

        self.facade
            .furnace_put_input(furnace, &task.input, task.count)?;
        self.facade
            .furnace_put_fuel(furnace, &task.fuel.fuel, task.fuel.count)?;

        let mut waited = Duration::ZERO;
        let mut last_progress_at = Duration::ZERO;
        let mut last_count = 0u32;

        loop {
            if self.abort.is_set() {
                let _ = self.facade.furnace_take_output(furnace);
                return Err(TaskError::Aborted);
            }

            self.facade.wait(self.cfg.smelt_poll);
            waited += self.cfg.smelt_poll;

            let out = self.facade.furnace_output_count(furnace);
            if out > last_count {
                debug!(output = out, target = task.count, "smelting progress");
                last_count = out;
                last_progress_at = waited;
            }
            if out >= task.count {
                break;
            }
            if waited - last_progress_at >= self.cfg.smelt_no_progress
                || waited >= self.cfg.smelt_hard_cap
            {
                let _ = self.facade.furnace_take_output(furnace);
                return Err(TaskError::Timeout { operation: "smelt" });
            }
        }

        self.facade.furnace_take_output(furnace)?;
        Ok(())
    }
}
