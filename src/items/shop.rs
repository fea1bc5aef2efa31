//! Buying and selling against item definitions.

use super::inventory::{add_item, has_item, remove_item, space_remaining};
use super::types::ItemDefinition;
use crate::character::Character;
use crate::game::error::{GameError, Result};

/// Buys one item at its listed cost.
pub fn purchase_item(character: &mut Character, item_id: &str, item: &ItemDefinition) -> Result<()> {
    if character.gold < item.cost {
        return Err(GameError::InsufficientResources {
            needed: item.cost,
            available: character.gold,
        });
    }
    if space_remaining(character) == 0 {
        return Err(GameError::InventoryFull);
    }

    character.gold -= item.cost;
    add_item(character, item_id)?;
    tracing::debug!(item_id, cost = item.cost, gold = character.gold, "item purchased");
    Ok(())
}

/// Sells one carried item for half its cost. Returns the gold received;
/// the purse saturates at `u32::MAX`.
pub fn sell_item(character: &mut Character, item_id: &str, item: &ItemDefinition) -> Result<u32> {
    if !has_item(character, item_id) {
        return Err(GameError::ItemNotFound(item_id.to_string()));
    }

    let gold_received = item.sell_price();
    remove_item(character, item_id)?;
    character.gold = character.gold.saturating_add(gold_received);
    tracing::debug!(item_id, gold_received, "item sold");
    Ok(gold_received)
}
