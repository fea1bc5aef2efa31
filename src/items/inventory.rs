//! Carried-item list management and consumable use.

use super::types::{ItemDefinition, ItemType, StatEffect};
use crate::character::Character;
use crate::game::constants::MAX_INVENTORY_SIZE;
use crate::game::error::{GameError, Result};

pub fn space_remaining(character: &Character) -> usize {
    MAX_INVENTORY_SIZE.saturating_sub(character.inventory.len())
}

pub fn has_item(character: &Character, item_id: &str) -> bool {
    character.inventory.iter().any(|id| id == item_id)
}

pub fn count_item(character: &Character, item_id: &str) -> usize {
    character.inventory.iter().filter(|id| *id == item_id).count()
}

/// Appends an item. Fails without changing anything when full.
pub fn add_item(character: &mut Character, item_id: &str) -> Result<()> {
    if character.inventory.len() >= MAX_INVENTORY_SIZE {
        return Err(GameError::InventoryFull);
    }
    character.inventory.push(item_id.to_string());
    Ok(())
}

/// Removes the first occurrence of an item.
pub fn remove_item(character: &mut Character, item_id: &str) -> Result<()> {
    let index = character
        .inventory
        .iter()
        .position(|id| id == item_id)
        .ok_or_else(|| GameError::ItemNotFound(item_id.to_string()))?;
    character.inventory.remove(index);
    Ok(())
}

/// Empties the inventory, returning what was carried in order.
pub fn clear_inventory(character: &mut Character) -> Vec<String> {
    std::mem::take(&mut character.inventory)
}

/// Uses one carried consumable and applies its effect. Returns the effect applied.
pub fn use_consumable(
    character: &mut Character,
    item_id: &str,
    item: &ItemDefinition,
) -> Result<StatEffect> {
    if !has_item(character, item_id) {
        return Err(GameError::ItemNotFound(item_id.to_string()));
    }
    if item.item_type != ItemType::Consumable {
        return Err(GameError::InvalidItemType {
            item_id: item_id.to_string(),
            expected: ItemType::Consumable,
            actual: item.item_type,
        });
    }

    character.apply_stat(item.effect.stat, item.effect.delta);
    remove_item(character, item_id)?;

    tracing::debug!(item_id, effect = %item.effect, "consumable used");
    Ok(item.effect)
}
