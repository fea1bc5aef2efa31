//! Stat model: bounded mutation of a character's numeric attributes.
//!
//! Health is always kept within `[0, max_health]`. Strength and magic are
//! plain integers so that any equipped bonus can be reversed exactly.

use super::types::{Character, Stat};
use crate::game::error::Result;

impl Character {
    /// Adds `delta` to the stat named `stat_name`.
    pub fn apply_stat_delta(&mut self, stat_name: &str, delta: i32) -> Result<()> {
        let stat: Stat = stat_name.parse()?;
        self.apply_stat(stat, delta);
        Ok(())
    }

    /// Adds `delta` to `stat`, re-clamping health afterwards.
    ///
    /// Returns the change actually made to `stat`, which differs from `delta`
    /// when health or max health hits a bound.
    pub fn apply_stat(&mut self, stat: Stat, delta: i32) -> i32 {
        let before = self.stat(stat);
        match stat {
            Stat::Health => {
                self.health = self.health.saturating_add(delta).min(self.max_health).max(0);
            }
            Stat::MaxHealth => {
                self.max_health = self.max_health.saturating_add(delta).max(0);
                if self.health > self.max_health {
                    self.health = self.max_health;
                }
            }
            Stat::Strength => self.strength = self.strength.saturating_add(delta),
            Stat::Magic => self.magic = self.magic.saturating_add(delta),
        }
        self.stat(stat) - before
    }

    pub fn stat(&self, stat: Stat) -> i32 {
        match stat {
            Stat::Health => self.health,
            Stat::MaxHealth => self.max_health,
            Stat::Strength => self.strength,
            Stat::Magic => self.magic,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Heals up to `amount`, capped at max health. Returns the health actually gained.
    pub fn heal(&mut self, amount: i32) -> i32 {
        if amount < 0 {
            return 0;
        }
        let before = self.health;
        self.health = self.health.saturating_add(amount).min(self.max_health);
        self.health - before
    }

    /// Brings a dead character back at half max health. Returns false if alive.
    pub fn revive(&mut self) -> bool {
        if !self.is_dead() {
            return false;
        }
        self.health = self.max_health / 2;
        tracing::info!(name = %self.name, health = self.health, "character revived");
        true
    }
}
