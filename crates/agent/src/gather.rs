//! Gather driver: locate, reach, dig, repeat.

use crate::error::{ResolveError, TaskError};
use crate::executor::Executor;
use crate::validator::{self, ToolCheck};
use blockhand_core::Item;
use blockhand_facade::WorldFacade;

impl Executor<'_> {
    /// Break `count` blocks of a type, collecting drops. Tool adequacy is
    /// re-verified here even though the resolver schedules `EnsureTool`
    /// first; the world may have changed since planning.
    pub(crate) fn gather(&mut self, block: &Item, count: u32) -> Result<(), TaskError> {
        let held = crate::accountant::InventoryAccountant::snapshot(&*self.facade);
        let tool = match validator::check_tool(self.kb, &held, block) {
            ToolCheck::Ready { tool } => tool,
            ToolCheck::Missing { requirement } => {
                return Err(TaskError::ToolMissing { requirement })
            }
            ToolCheck::Unbreakable => {
                return Err(ResolveError::Unsatisfiable {
                    item: block.clone(),
                }
                .into())
            }
        };
        if let Some(tool) = &tool {
            self.facade.equip(tool)?;
        }

        let mut dug = 0u32;
        let mut nav_failures = 0u32;
        while dug < count {
            if self.abort.is_set() {
                return Err(TaskError::Aborted);
            }

            let Some(found) = self
                .facade
                .find_block(&|name| name == block.name(), self.cfg.gather_radius)
            else {
                return Err(TaskError::ResourceExhausted {
                    block: block.clone(),
                });
            };

            match self.facade.path_to(found.pos.center(), self.cfg.reach) {
                Ok(()) => nav_failures = 0,
                Err(err) => {
                    nav_failures += 1;
                    if nav_failures >= self.cfg.max_retries {
                        return Err(err.into());
                    }
                    continue;
                }
            }

            self.facade.dig(found.pos)?;
            self.facade.wait(self.cfg.pickup_delay);
            dug += 1;
        }
        Ok(())
    }
}
