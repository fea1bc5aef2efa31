//! Experience, leveling, gold and revival.

use serde::{Deserialize, Serialize};

use super::types::Character;
use crate::game::constants::*;
use crate::game::error::{GameError, Result};

/// Experience and gold earned from a quest or a won battle.
///
/// The engine only ever returns payouts; applying them is the caller's job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub xp: u32,
    pub gold: u32,
}

impl Payout {
    pub fn new(xp: u32, gold: u32) -> Self {
        Self { xp, gold }
    }

    pub fn none() -> Self {
        Self::default()
    }
}

impl std::ops::Add for Payout {
    type Output = Payout;

    fn add(self, other: Payout) -> Payout {
        Payout {
            xp: self.xp.saturating_add(other.xp),
            gold: self.gold.saturating_add(other.gold),
        }
    }
}

/// XP required to advance from `level` to the next one.
pub fn xp_for_next_level(level: u32) -> u32 {
    level.saturating_mul(XP_PER_LEVEL)
}

/// Adds experience and processes every level-up it pays for.
/// Returns true if at least one level-up happened. Experience saturates at
/// `u32::MAX` before leveling.
pub fn gain_experience(character: &mut Character, amount: u32) -> Result<bool> {
    if character.is_dead() {
        return Err(GameError::CharacterDead(character.name.clone()));
    }

    character.experience = character.experience.saturating_add(amount);
    let mut leveled_up = false;

    // Threshold is re-read every iteration since it grows with level
    while character.experience >= xp_for_next_level(character.level) {
        character.experience -= xp_for_next_level(character.level);
        character.level += 1;
        character.max_health += LEVEL_UP_MAX_HEALTH;
        character.strength += LEVEL_UP_STRENGTH;
        character.magic += LEVEL_UP_MAGIC;
        character.health = character.max_health;
        leveled_up = true;

        tracing::info!(name = %character.name, level = character.level, "level up");
    }

    Ok(leveled_up)
}

/// Adds (or with a negative amount, spends) gold. Returns the new total,
/// which saturates at `u32::MAX`.
pub fn add_gold(character: &mut Character, amount: i64) -> Result<u32> {
    let new_total = i64::from(character.gold) + amount;
    if new_total < 0 {
        return Err(GameError::InsufficientResources {
            needed: amount.unsigned_abs().min(u64::from(u32::MAX)) as u32,
            available: character.gold,
        });
    }
    character.gold = u32::try_from(new_total).unwrap_or(u32::MAX);
    Ok(character.gold)
}

/// Grants a payout: experience first, then gold. Returns true on level-up.
pub fn apply_payout(character: &mut Character, payout: Payout) -> Result<bool> {
    let leveled_up = gain_experience(character, payout.xp)?;
    add_gold(character, i64::from(payout.gold))?;
    Ok(leveled_up)
}

pub fn revive_cost(character: &Character) -> u32 {
    character.level.saturating_mul(REVIVE_COST_PER_LEVEL)
}

/// Pays the revival fee and revives. Returns false, charging nothing, if alive.
pub fn revive_for_gold(character: &mut Character) -> Result<bool> {
    if !character.is_dead() {
        return Ok(false);
    }
    let cost = revive_cost(character);
    if character.gold < cost {
        return Err(GameError::InsufficientResources {
            needed: cost,
            available: character.gold,
        });
    }
    character.gold -= cost;
    Ok(character.revive())
}
