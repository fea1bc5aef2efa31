use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::character::Stat;
use crate::game::error::GameError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Weapon,
    Armor,
    Consumable,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Weapon => "weapon",
            ItemType::Armor => "armor",
            ItemType::Consumable => "consumable",
        }
    }

    /// The equip slot this type goes into, if any.
    pub fn slot(&self) -> Option<EquipmentSlot> {
        match self {
            ItemType::Weapon => Some(EquipmentSlot::Weapon),
            ItemType::Armor => Some(EquipmentSlot::Armor),
            ItemType::Consumable => None,
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weapon" => Ok(ItemType::Weapon),
            "armor" => Ok(ItemType::Armor),
            "consumable" => Ok(ItemType::Consumable),
            other => Err(GameError::InvalidDataFormat(format!(
                "invalid item type '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentSlot {
    Weapon,
    Armor,
}

impl EquipmentSlot {
    pub fn name(&self) -> &'static str {
        match self {
            EquipmentSlot::Weapon => "weapon",
            EquipmentSlot::Armor => "armor",
        }
    }

    /// Item type accepted by this slot.
    pub fn item_type(&self) -> ItemType {
        match self {
            EquipmentSlot::Weapon => ItemType::Weapon,
            EquipmentSlot::Armor => ItemType::Armor,
        }
    }
}

/// The single stat change an item carries, e.g. `strength:5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatEffect {
    pub stat: Stat,
    pub delta: i32,
}

impl StatEffect {
    pub fn new(stat: Stat, delta: i32) -> Self {
        Self { stat, delta }
    }

    /// The effect that exactly cancels this one.
    pub fn reversed(&self) -> Self {
        Self {
            stat: self.stat,
            delta: -self.delta,
        }
    }
}

impl fmt::Display for StatEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.stat, self.delta)
    }
}

impl FromStr for StatEffect {
    type Err = GameError;

    /// Parses `stat:value`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (stat, value) = s.split_once(':').ok_or_else(|| {
            GameError::InvalidDataFormat(format!("effect '{}' must use 'stat:value'", s))
        })?;
        let stat = stat.trim().parse::<Stat>().map_err(|_| {
            GameError::InvalidDataFormat(format!("effect '{}' names an unknown stat", s))
        })?;
        let delta = value.trim().parse::<i32>().map_err(|_| {
            GameError::InvalidDataFormat(format!("effect '{}' value must be an integer", s))
        })?;
        Ok(Self { stat, delta })
    }
}

/// Read-only item record produced by the data loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub id: String,
    pub name: String,
    pub item_type: ItemType,
    pub effect: StatEffect,
    pub cost: u32,
    pub description: String,
}

/// Item definitions keyed by id.
pub type ItemTable = HashMap<String, ItemDefinition>;

impl ItemDefinition {
    pub fn sell_price(&self) -> u32 {
        self.cost / crate::game::constants::SELL_PRICE_DIVISOR
    }
}
