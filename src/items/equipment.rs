//! Equip slots and the bonus bookkeeping that keeps them reversible.
//!
//! Each occupied slot records the exact effect that was applied when the
//! item went in. Unequipping applies the negation of that record, never a
//! fresh lookup of the item definition, so a changed data file cannot leave
//! stale bonuses behind.

use serde::{Deserialize, Serialize};

use super::inventory::{add_item, has_item, remove_item, space_remaining};
use super::types::{EquipmentSlot, ItemDefinition, StatEffect};
use crate::character::Character;
use crate::game::error::{GameError, Result};

/// An item sitting in a slot together with the bonus it applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquippedItem {
    pub item_id: String,
    pub applied: StatEffect,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub weapon: Option<EquippedItem>,
    pub armor: Option<EquippedItem>,
}

impl Equipment {
    pub fn new() -> Self {
        Self {
            weapon: None,
            armor: None,
        }
    }

    pub fn get(&self, slot: EquipmentSlot) -> &Option<EquippedItem> {
        match slot {
            EquipmentSlot::Weapon => &self.weapon,
            EquipmentSlot::Armor => &self.armor,
        }
    }

    fn slot_mut(&mut self, slot: EquipmentSlot) -> &mut Option<EquippedItem> {
        match slot {
            EquipmentSlot::Weapon => &mut self.weapon,
            EquipmentSlot::Armor => &mut self.armor,
        }
    }

    pub fn iter_equipped(&self) -> impl Iterator<Item = &EquippedItem> {
        [&self.weapon, &self.armor]
            .into_iter()
            .filter_map(|item| item.as_ref())
    }
}

/// Moves a carried item into `slot`, swapping out any current occupant.
///
/// The outgoing item needs a free inventory space; with a full inventory
/// the call fails before anything changes.
pub fn equip(
    character: &mut Character,
    item_id: &str,
    item: &ItemDefinition,
    slot: EquipmentSlot,
) -> Result<()> {
    if !has_item(character, item_id) {
        return Err(GameError::ItemNotFound(item_id.to_string()));
    }
    if item.item_type != slot.item_type() {
        return Err(GameError::InvalidItemType {
            item_id: item_id.to_string(),
            expected: slot.item_type(),
            actual: item.item_type,
        });
    }

    if character.equipment.get(slot).is_some() {
        if space_remaining(character) == 0 {
            return Err(GameError::InventoryFull);
        }
        if let Some(outgoing) = character.equipment.slot_mut(slot).take() {
            add_item(character, &outgoing.item_id)?;
            let reversal = outgoing.applied.reversed();
            character.apply_stat(reversal.stat, reversal.delta);
            tracing::debug!(item_id = %outgoing.item_id, slot = slot.name(), "swapped out");
        }
    }

    // Record what actually landed so removal restores the stat exactly
    let landed = character.apply_stat(item.effect.stat, item.effect.delta);
    *character.equipment.slot_mut(slot) = Some(EquippedItem {
        item_id: item_id.to_string(),
        applied: StatEffect::new(item.effect.stat, landed),
    });
    remove_item(character, item_id)?;

    tracing::debug!(item_id, slot = slot.name(), effect = %item.effect, "equipped");
    Ok(())
}

/// Empties `slot` back into the inventory. Returns `None` if it was empty.
pub fn unequip(character: &mut Character, slot: EquipmentSlot) -> Result<Option<String>> {
    if character.equipment.get(slot).is_none() {
        return Ok(None);
    }
    if space_remaining(character) == 0 {
        return Err(GameError::InventoryFull);
    }

    let Some(equipped) = character.equipment.slot_mut(slot).take() else {
        return Ok(None);
    };
    let reversal = equipped.applied.reversed();
    character.apply_stat(reversal.stat, reversal.delta);
    add_item(character, &equipped.item_id)?;

    tracing::debug!(item_id = %equipped.item_id, slot = slot.name(), "unequipped");
    Ok(Some(equipped.item_id))
}
