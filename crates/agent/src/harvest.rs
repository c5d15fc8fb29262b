//! Harvest driver: break mature crops, replant best-effort.

use crate::error::{ResolveError, TaskError};
use crate::executor::Executor;
use blockhand_core::Item;
use blockhand_facade::{Face, WorldFacade};
use tracing::warn;

impl Executor<'_> {
    /// Harvest `count` crops. Replanting is best-effort: a failed replant
    /// logs and moves on, it never fails the task.
    pub(crate) fn harvest(&mut self, product: &Item, count: u32) -> Result<(), TaskError> {
        let Some(crop) = self.kb.crop_for(product) else {
            return Err(ResolveError::Unsatisfiable {
                item: product.clone(),
            }
            .into());
        };

        let mut harvested = 0u32;
        while harvested < count {
            if self.abort.is_set() {
                return Err(TaskError::Aborted);
            }

            let Some(found) = self
                .facade
                .find_block(&|name| name == crop.block.name(), self.cfg.gather_radius)
            else {
                return Err(TaskError::ResourceExhausted {
                    block: crop.block.clone(),
                });
            };

            self.facade.path_to(found.pos.center(), self.cfg.reach)?;
            self.facade.dig(found.pos)?;
            self.facade.wait(self.cfg.pickup_delay);
            harvested += 1;

            let held = crate::accountant::InventoryAccountant::snapshot(&*self.facade);
            if held.has(&crop.seed, 1) {
                let replant = self
                    .facade
                    .equip(&crop.seed)
                    .and_then(|_| self.facade.place_block(found.pos.below(), Face::UP, &crop.seed));
                if let Err(error) = replant {
                    warn!(crop = %crop.block, %error, "replant failed");
                }
            }
        }
        Ok(())
    }
}
