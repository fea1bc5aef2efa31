//! Damage math shared by the player's and the enemy's attacks.
//!
//! These functions have no randomness; chance rolls live in the battle and
//! ability code where the generator is supplied.

use super::types::Enemy;
use crate::character::Character;
use crate::game::constants::{DEFENSE_DIVISOR, MIN_DAMAGE};

/// Anything that can attack or be attacked in a battle.
pub trait Combatant {
    fn strength(&self) -> i32;

    fn health(&self) -> i32;

    /// Removes health, flooring at 0.
    fn take_damage(&mut self, amount: i32);

    fn is_defeated(&self) -> bool {
        self.health() <= 0
    }
}

impl Combatant for Character {
    fn strength(&self) -> i32 {
        self.strength
    }

    fn health(&self) -> i32 {
        self.health
    }

    fn take_damage(&mut self, amount: i32) {
        self.health = (self.health - amount).max(0);
    }
}

impl Combatant for Enemy {
    fn strength(&self) -> i32 {
        self.strength
    }

    fn health(&self) -> i32 {
        self.health
    }

    fn take_damage(&mut self, amount: i32) {
        self.health = (self.health - amount).max(0);
    }
}

/// `max(1, attacker strength - floor(defender strength / 4))`
pub fn calculate_damage(attacker: &impl Combatant, defender: &impl Combatant) -> i32 {
    let reduction = defender.strength().div_euclid(DEFENSE_DIVISOR);
    (attacker.strength() - reduction).max(MIN_DAMAGE)
}

/// Applies `damage` to `target`. Returns the health actually removed.
pub fn apply_damage(target: &mut impl Combatant, damage: i32) -> i32 {
    let before = target.health();
    target.take_damage(damage);
    before - target.health()
}
