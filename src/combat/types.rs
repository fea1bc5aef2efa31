use serde::{Deserialize, Serialize};

use crate::character::Payout;
use crate::game::constants::ENEMY_HEALTH_PER_LEVEL;
use crate::game::error::{GameError, Result};

/// Base stats for one entry of the species table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Species {
    pub key: &'static str,
    pub health: i32,
    pub strength: i32,
    pub magic: i32,
    pub xp_reward: u32,
    pub gold_reward: u32,
}

pub static SPECIES: [Species; 3] = [
    Species {
        key: "goblin",
        health: 50,
        strength: 8,
        magic: 2,
        xp_reward: 25,
        gold_reward: 10,
    },
    Species {
        key: "orc",
        health: 80,
        strength: 12,
        magic: 5,
        xp_reward: 50,
        gold_reward: 25,
    },
    Species {
        key: "dragon",
        health: 200,
        strength: 25,
        magic: 15,
        xp_reward: 200,
        gold_reward: 100,
    },
];

/// Looks up a species by name, ignoring case.
pub fn find_species(name: &str) -> Option<&'static Species> {
    SPECIES.iter().find(|s| s.key.eq_ignore_ascii_case(name.trim()))
}

/// An opponent for a single encounter. Only `health` changes during a battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enemy {
    pub name: String,
    pub health: i32,
    pub max_health: i32,
    pub strength: i32,
    pub magic: i32,
    pub xp_reward: u32,
    pub gold_reward: u32,
}

impl Enemy {
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn rewards(&self) -> Payout {
        Payout::new(self.xp_reward, self.gold_reward)
    }
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn spawn(species: &Species, level: u32) -> Enemy {
    let bonus = level.saturating_sub(1) as i32 * ENEMY_HEALTH_PER_LEVEL;
    let health = species.health + bonus;

    Enemy {
        name: capitalize(species.key),
        health,
        max_health: health,
        strength: species.strength,
        magic: species.magic,
        xp_reward: species.xp_reward,
        gold_reward: species.gold_reward,
    }
}

/// Builds an enemy of `enemy_type` scaled to `level`.
///
/// Health gains 10 per level above 1; other stats come straight from the table.
pub fn create_enemy(enemy_type: &str, level: u32) -> Result<Enemy> {
    let species =
        find_species(enemy_type).ok_or_else(|| GameError::InvalidTarget(enemy_type.to_string()))?;
    Ok(spawn(species, level))
}

/// Goblins up to level 2, orcs up to level 5, dragons beyond.
pub fn random_enemy_for_level(character_level: u32) -> Enemy {
    let species = match character_level {
        0..=2 => &SPECIES[0],
        3..=5 => &SPECIES[1],
        _ => &SPECIES[2],
    };
    spawn(species, character_level)
}

/// What the player chooses to do on their half-turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    Attack,
    SpecialAbility,
    Flee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleOutcome {
    Victory(Payout),
    Defeat,
    Escaped,
}

impl BattleOutcome {
    /// Rewards to apply; zero for anything but a victory.
    pub fn payout(&self) -> Payout {
        match self {
            BattleOutcome::Victory(payout) => *payout,
            BattleOutcome::Defeat | BattleOutcome::Escaped => Payout::none(),
        }
    }

    pub fn player_won(&self) -> bool {
        matches!(self, BattleOutcome::Victory(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleState {
    Pending,
    Active,
    Finished(BattleOutcome),
}

/// Result of a special ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbilityOutcome {
    PowerStrike { damage: i32 },
    Fireball { damage: i32 },
    CriticalStrike { damage: i32 },
    CriticalStrikeMissed,
    Heal { healed: i32 },
}

impl AbilityOutcome {
    pub fn describe(&self) -> String {
        match self {
            AbilityOutcome::PowerStrike { damage } => {
                format!("Power Strike hits for {} damage!", damage)
            }
            AbilityOutcome::Fireball { damage } => format!("Fireball burns for {} damage!", damage),
            AbilityOutcome::CriticalStrike { damage } => {
                format!("Critical strike! You deal {} damage!", damage)
            }
            AbilityOutcome::CriticalStrikeMissed => {
                "Critical strike failed! No extra damage.".to_string()
            }
            AbilityOutcome::Heal { healed } => format!("You cast Heal and restore {} health!", healed),
        }
    }
}

/// What happened on the player's half-turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerTurnResult {
    Attacked { damage: i32 },
    Ability(AbilityOutcome),
    Escaped,
    EscapeFailed,
}

/// One full round: the player's action, the enemy's reply if it got one,
/// and the outcome if the battle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnReport {
    pub player: PlayerTurnResult,
    pub enemy_damage: Option<i32>,
    pub outcome: Option<BattleOutcome>,
}
