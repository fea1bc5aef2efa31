use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::game::constants::{STARTING_GOLD, STARTING_LEVEL};
use crate::game::error::{GameError, Result};
use crate::items::equipment::Equipment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterClass {
    Warrior,
    Mage,
    Rogue,
    Cleric,
}

/// Starting stats for a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseStats {
    pub health: i32,
    pub strength: i32,
    pub magic: i32,
}

impl CharacterClass {
    pub fn all() -> [CharacterClass; 4] {
        [
            CharacterClass::Warrior,
            CharacterClass::Mage,
            CharacterClass::Rogue,
            CharacterClass::Cleric,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            CharacterClass::Warrior => "Warrior",
            CharacterClass::Mage => "Mage",
            CharacterClass::Rogue => "Rogue",
            CharacterClass::Cleric => "Cleric",
        }
    }

    pub fn base_stats(&self) -> BaseStats {
        let (health, strength, magic) = match self {
            CharacterClass::Warrior => (120, 15, 5),
            CharacterClass::Mage => (80, 8, 20),
            CharacterClass::Rogue => (90, 12, 10),
            CharacterClass::Cleric => (100, 10, 15),
        };
        BaseStats {
            health,
            strength,
            magic,
        }
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CharacterClass {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        CharacterClass::all()
            .into_iter()
            .find(|class| class.name() == s)
            .ok_or_else(|| GameError::InvalidCharacterClass(s.to_string()))
    }
}

/// A numeric attribute that items and the stat model can modify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Health,
    MaxHealth,
    Strength,
    Magic,
}

impl Stat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stat::Health => "health",
            Stat::MaxHealth => "max_health",
            Stat::Strength => "strength",
            Stat::Magic => "magic",
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stat {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "health" => Ok(Stat::Health),
            "max_health" => Ok(Stat::MaxHealth),
            "strength" => Ok(Stat::Strength),
            "magic" => Ok(Stat::Magic),
            other => Err(GameError::unknown_stat(other)),
        }
    }
}

/// The player character and everything the engine tracks about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub(crate) name: String,
    pub(crate) class: CharacterClass,
    pub level: u32,
    pub health: i32,
    pub max_health: i32,
    pub strength: i32,
    pub magic: i32,
    pub experience: u32,
    pub gold: u32,
    /// Carried items in pickup order.
    pub inventory: Vec<String>,
    pub equipment: Equipment,
    pub active_quests: BTreeSet<String>,
    pub completed_quests: BTreeSet<String>,
}

impl Character {
    /// Creates a fresh level 1 character with the class's base stats.
    pub fn new(name: impl Into<String>, class: CharacterClass) -> Self {
        let base = class.base_stats();
        Self {
            name: name.into(),
            class,
            level: STARTING_LEVEL,
            health: base.health,
            max_health: base.health,
            strength: base.strength,
            magic: base.magic,
            experience: 0,
            gold: STARTING_GOLD,
            inventory: Vec::new(),
            equipment: Equipment::new(),
            active_quests: BTreeSet::new(),
            completed_quests: BTreeSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> CharacterClass {
        self.class
    }
}

/// Creates a character from a class name as typed by the player.
pub fn create_character(name: &str, class_name: &str) -> Result<Character> {
    let class: CharacterClass = class_name.parse()?;
    tracing::info!(name, class = class.name(), "character created");
    Ok(Character::new(name, class))
}
