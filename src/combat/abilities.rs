//! Class special abilities.

use rand::Rng;

use super::math::{apply_damage, Combatant};
use super::types::{AbilityOutcome, Enemy};
use crate::character::{Character, CharacterClass};
use crate::game::constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialAbility {
    /// Warrior: 2x strength damage
    PowerStrike,
    /// Mage: 2x magic damage
    Fireball,
    /// Rogue: 3x strength damage on a successful roll
    CriticalStrike,
    /// Cleric: restore health
    Heal,
}

impl SpecialAbility {
    /// Every class has exactly one ability.
    pub fn for_class(class: CharacterClass) -> SpecialAbility {
        match class {
            CharacterClass::Warrior => SpecialAbility::PowerStrike,
            CharacterClass::Mage => SpecialAbility::Fireball,
            CharacterClass::Rogue => SpecialAbility::CriticalStrike,
            CharacterClass::Cleric => SpecialAbility::Heal,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SpecialAbility::PowerStrike => "Power Strike",
            SpecialAbility::Fireball => "Fireball",
            SpecialAbility::CriticalStrike => "Critical Strike",
            SpecialAbility::Heal => "Heal",
        }
    }
}

/// Uses the character's class ability against `enemy`.
///
/// Only the Rogue's critical strike draws from `rng`.
pub fn use_special_ability(
    character: &mut Character,
    enemy: &mut Enemy,
    rng: &mut impl Rng,
) -> AbilityOutcome {
    match SpecialAbility::for_class(character.class()) {
        SpecialAbility::PowerStrike => {
            let damage = character.strength * POWER_STRIKE_MULTIPLIER;
            apply_damage(enemy, damage);
            AbilityOutcome::PowerStrike { damage }
        }
        SpecialAbility::Fireball => {
            let damage = character.magic * FIREBALL_MULTIPLIER;
            apply_damage(enemy, damage);
            AbilityOutcome::Fireball { damage }
        }
        SpecialAbility::CriticalStrike => {
            if rng.gen_bool(CRITICAL_STRIKE_CHANCE) {
                let damage = character.strength * CRITICAL_STRIKE_MULTIPLIER;
                apply_damage(enemy, damage);
                AbilityOutcome::CriticalStrike { damage }
            } else {
                AbilityOutcome::CriticalStrikeMissed
            }
        }
        SpecialAbility::Heal => {
            let healed = character.heal(CLERIC_HEAL_AMOUNT);
            AbilityOutcome::Heal { healed }
        }
    }
}

/// A character can only start a fight with health left.
pub fn can_character_fight(character: &Character) -> bool {
    !character.is_defeated()
}
