//! Single-target combat loop.
//!
//! Not a plan task: the dispatcher calls this directly for the fight verb.
//! Engage the nearest matching mob, swing until it dies, repeat until none
//! remain in radius. Aborts on low health or when no damage lands for the
//! stuck window.

use crate::accountant::InventoryAccountant;
use crate::error::TaskError;
use crate::executor::Executor;
use blockhand_facade::WorldFacade;
use std::time::Duration;
use tracing::warn;

/// Close enough to swing instead of walking.
const MELEE_RANGE: f32 = 3.5;
/// Health floor below which the hunt disengages.
const RETREAT_HEALTH: f32 = 10.0;

impl Executor<'_> {
    /// Hunt mobs of a kind within `radius`. Returns the number of kills.
    pub fn hunt(&mut self, mob: &str, radius: f64) -> Result<u32, TaskError> {
        let held = InventoryAccountant::snapshot(&*self.facade);
        if let Some(weapon) = InventoryAccountant::best_weapon(&held) {
            self.facade.equip(&weapon)?;
        }

        let mut kills = 0u32;
        let mut engaged = Duration::ZERO;
        let mut stuck_iters = 0u32;
        let mut last_seen: Option<(u64, f32)> = None;

        loop {
            if self.abort.is_set() {
                return Err(TaskError::Aborted);
            }
            if self.facade.health() < RETREAT_HEALTH {
                warn!(health = self.facade.health(), "health too low, breaking off the hunt");
                return Err(TaskError::Timeout {
                    operation: "attack",
                });
            }

            let Some(target) = self.facade.find_entity(mob, radius) else {
                return Ok(kills);
            };

            let distance = (target.pos - self.facade.position()).length();
            if distance > MELEE_RANGE {
                self.facade.path_to(target.pos, MELEE_RANGE as f64 - 0.5)?;
            } else {
                self.facade.attack(target.id)?;
            }
            self.facade.wait(self.cfg.attack_iter_delay);
            engaged += self.cfg.attack_iter_delay;

            match self.facade.entity_health(target.id) {
                None => {
                    // Target despawned or died; either way the engagement is
                    // over and the timers reset.
                    kills += 1;
                    engaged = Duration::ZERO;
                    stuck_iters = 0;
                    last_seen = None;
                }
                Some(hp) => {
                    let progressed = match last_seen {
                        Some((id, prev_hp)) if id == target.id => hp < prev_hp,
                        _ => true,
                    };
                    if progressed {
                        stuck_iters = 0;
                    } else {
                        stuck_iters += 1;
                    }
                    last_seen = Some((target.id, hp));

                    if stuck_iters >= self.cfg.attack_no_progress_iters {
                        return Err(TaskError::Timeout {
                            operation: "attack",
                        });
                    }
                }
            }

            if engaged >= self.cfg.attack_hard_cap {
                return Err(TaskError::Timeout {
                    operation: "attack",
                });
            }
        }
    }
}
