//! Craft driver.

use crate::accountant::InventoryAccountant;
use crate::error::TaskError;
use crate::executor::Executor;
use blockhand_facade::{FacadeError, WorldFacade};
use blockhand_knowledge::{Recipe, Station};

impl Executor<'_> {
    /// Run a recipe `repetitions` times, ensuring the crafting table first
    /// when the recipe needs one.
    pub(crate) fn craft_task(&mut self, recipe: &Recipe, repetitions: u32) -> Result<(), TaskError> {
        if recipe.station == Some(Station::CraftingTable) {
            self.ensure_station(Station::CraftingTable)?;
        }

        let held = InventoryAccountant::snapshot(&*self.facade);
        for (input, per_craft) in &recipe.inputs {
            let required = per_craft * repetitions;
            if !held.has(input, required) {
                return Err(TaskError::Facade(FacadeError::Rejected(format!(
                    "need {required} {input} to craft {}, holding {}",
                    recipe.output,
                    held.count(input)
                ))));
            }
        }

        for _ in 0..repetitions {
            self.facade.craft(recipe)?;
            self.facade.wait(self.cfg.craft_delay);
        }
        Ok(())
    }
}
