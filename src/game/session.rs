//! The live game: one character plus the definition tables it plays against.

use rand::Rng;

use super::constants::{EXPLORE_LEVEL_OFFSET_MAX, EXPLORE_LEVEL_OFFSET_MIN};
use super::error::{GameError, Result};
use crate::character::{apply_payout, revive_for_gold, Character, Payout};
use crate::combat::{random_enemy_for_level, Battle, BattleOutcome, Enemy};
use crate::items::{
    equip, purchase_item, sell_item, unequip, use_consumable, EquipmentSlot, ItemDefinition,
    ItemTable, ItemType, StatEffect,
};
use crate::quests::{abandon_quest, accept_quest, complete_quest, QuestTable};

/// Rewards that were applied to the character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reward {
    pub payout: Payout,
    pub leveled_up: bool,
}

pub struct GameSession {
    character: Character,
    quests: QuestTable,
    items: ItemTable,
}

impl GameSession {
    pub fn new(character: Character, quests: QuestTable, items: ItemTable) -> Self {
        Self {
            character,
            quests,
            items,
        }
    }

    pub fn character(&self) -> &Character {
        &self.character
    }

    pub fn character_mut(&mut self) -> &mut Character {
        &mut self.character
    }

    pub fn into_character(self) -> Character {
        self.character
    }

    pub fn quests(&self) -> &QuestTable {
        &self.quests
    }

    pub fn items(&self) -> &ItemTable {
        &self.items
    }

    pub fn item(&self, item_id: &str) -> Result<&ItemDefinition> {
        lookup_item(&self.items, item_id)
    }

    /// Shop stock, cheapest first.
    pub fn shop_items(&self) -> Vec<&ItemDefinition> {
        let mut stock: Vec<_> = self.items.values().collect();
        stock.sort_by(|a, b| (a.cost, &a.id).cmp(&(b.cost, &b.id)));
        stock
    }

    pub fn use_item(&mut self, item_id: &str) -> Result<StatEffect> {
        let item = lookup_item(&self.items, item_id)?;
        use_consumable(&mut self.character, item_id, item)
    }

    /// Equips a carried weapon or armor into the slot its type belongs to.
    pub fn equip_item(&mut self, item_id: &str) -> Result<EquipmentSlot> {
        let item = lookup_item(&self.items, item_id)?;
        let slot = item.item_type.slot().ok_or_else(|| GameError::InvalidItemType {
            item_id: item_id.to_string(),
            expected: ItemType::Weapon,
            actual: item.item_type,
        })?;
        equip(&mut self.character, item_id, item, slot)?;
        Ok(slot)
    }

    pub fn unequip(&mut self, slot: EquipmentSlot) -> Result<Option<String>> {
        unequip(&mut self.character, slot)
    }

    pub fn buy(&mut self, item_id: &str) -> Result<()> {
        let item = lookup_item(&self.items, item_id)?;
        purchase_item(&mut self.character, item_id, item)
    }

    pub fn sell(&mut self, item_id: &str) -> Result<u32> {
        let item = lookup_item(&self.items, item_id)?;
        sell_item(&mut self.character, item_id, item)
    }

    pub fn accept_quest(&mut self, quest_id: &str) -> Result<()> {
        accept_quest(&mut self.character, quest_id, &self.quests)
    }

    pub fn abandon_quest(&mut self, quest_id: &str) -> Result<()> {
        abandon_quest(&mut self.character, quest_id)
    }

    /// Completes an active quest and grants its rewards.
    ///
    /// Both happen or neither does: a dead character keeps the quest active
    /// and can finish it once revived.
    pub fn complete_quest(&mut self, quest_id: &str) -> Result<Reward> {
        let mut updated = self.character.clone();
        let payout = complete_quest(&mut updated, quest_id, &self.quests)?;
        let leveled_up = apply_payout(&mut updated, payout)?;
        self.character = updated;
        Ok(Reward { payout, leveled_up })
    }

    pub fn claim(&mut self, payout: Payout) -> Result<Reward> {
        let leveled_up = apply_payout(&mut self.character, payout)?;
        Ok(Reward { payout, leveled_up })
    }

    /// Picks an opponent near the character's level.
    pub fn encounter(&self, rng: &mut impl Rng) -> Enemy {
        let offset = rng.gen_range(EXPLORE_LEVEL_OFFSET_MIN..=EXPLORE_LEVEL_OFFSET_MAX);
        let level = (self.character.level as i64 + offset as i64).max(1);
        random_enemy_for_level(level as u32)
    }

    /// Opens a battle against `enemy`; the session is borrowed until it ends.
    pub fn battle(&mut self, enemy: Enemy) -> Battle<'_> {
        Battle::new(&mut self.character, enemy)
    }

    /// Grants a victory's payout. Other outcomes grant nothing.
    pub fn settle_battle(&mut self, outcome: BattleOutcome) -> Result<Option<Reward>> {
        match outcome {
            BattleOutcome::Victory(payout) => self.claim(payout).map(Some),
            BattleOutcome::Defeat | BattleOutcome::Escaped => Ok(None),
        }
    }

    pub fn revive_with_gold(&mut self) -> Result<bool> {
        revive_for_gold(&mut self.character)
    }
}

fn lookup_item<'a>(items: &'a ItemTable, item_id: &str) -> Result<&'a ItemDefinition> {
    items
        .get(item_id)
        .ok_or_else(|| GameError::ItemNotFound(item_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::CharacterClass;
    use crate::combat::{create_enemy, PlayerAction};
    use crate::data::default_game_data;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn session(class: CharacterClass) -> GameSession {
        let (quests, items) = default_game_data().unwrap();
        GameSession::new(Character::new("Hero", class), quests, items)
    }

    #[test]
    fn test_shop_items_sorted_by_cost() {
        let s = session(CharacterClass::Warrior);
        let ids: Vec<_> = s.shop_items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["health_potion", "leather_armor", "iron_sword"]);
    }

    #[test]
    fn test_buy_and_equip_by_type() {
        let mut s = session(CharacterClass::Warrior);
        s.buy("iron_sword").unwrap();
        assert_eq!(s.character().gold, 0);

        assert_eq!(s.equip_item("iron_sword").unwrap(), EquipmentSlot::Weapon);
        assert_eq!(s.character().strength, 20);
        assert!(s.character().inventory.is_empty());

        assert_eq!(s.unequip(EquipmentSlot::Weapon).unwrap(), Some("iron_sword".into()));
        assert_eq!(s.character().strength, 15);
    }

    #[test]
    fn test_equip_consumable_rejected() {
        let mut s = session(CharacterClass::Mage);
        s.buy("health_potion").unwrap();
        assert!(matches!(
            s.equip_item("health_potion"),
            Err(GameError::InvalidItemType { actual: ItemType::Consumable, .. })
        ));
        assert_eq!(s.character().inventory, vec!["health_potion"]);
    }

    #[test]
    fn test_unknown_item_ids() {
        let mut s = session(CharacterClass::Rogue);
        assert_eq!(s.buy("excalibur"), Err(GameError::ItemNotFound("excalibur".into())));
        assert!(matches!(s.sell("excalibur"), Err(GameError::ItemNotFound(_))));
        assert!(matches!(s.use_item("excalibur"), Err(GameError::ItemNotFound(_))));
    }

    #[test]
    fn test_use_and_sell_potions() {
        let mut s = session(CharacterClass::Cleric);
        s.buy("health_potion").unwrap();
        s.buy("health_potion").unwrap();
        assert_eq!(s.character().gold, 50);

        s.character_mut().health = 40;
        s.use_item("health_potion").unwrap();
        assert_eq!(s.character().health, 70);

        assert_eq!(s.sell("health_potion").unwrap(), 12);
        assert_eq!(s.character().gold, 62);
        assert!(s.character().inventory.is_empty());
    }

    #[test]
    fn test_quest_chain_through_session() {
        let mut s = session(CharacterClass::Warrior);
        assert_eq!(
            s.accept_quest("goblin_menace"),
            Err(GameError::InsufficientLevel { required: 2, current: 1 })
        );

        s.accept_quest("first_quest").unwrap();
        let reward = s.complete_quest("first_quest").unwrap();
        assert_eq!(reward.payout, Payout::new(50, 25));
        assert!(!reward.leveled_up);
        assert_eq!(s.character().gold, 125);

        s.claim(Payout::new(50, 0)).unwrap();
        assert_eq!(s.character().level, 2);

        s.accept_quest("goblin_menace").unwrap();
        s.abandon_quest("goblin_menace").unwrap();
        s.accept_quest("goblin_menace").unwrap();
        let reward = s.complete_quest("goblin_menace").unwrap();
        assert_eq!(reward.payout, Payout::new(100, 50));
    }

    #[test]
    fn test_dead_character_keeps_quest_until_revived() {
        let mut s = session(CharacterClass::Warrior);
        s.accept_quest("first_quest").unwrap();
        s.character_mut().health = 0;
        let before = s.character().clone();

        assert_eq!(
            s.complete_quest("first_quest"),
            Err(GameError::CharacterDead("Hero".to_string()))
        );
        assert_eq!(s.character(), &before);
        assert!(s.character().active_quests.contains("first_quest"));
        assert!(s.character().completed_quests.is_empty());

        s.revive_with_gold().unwrap();
        let reward = s.complete_quest("first_quest").unwrap();
        assert_eq!(reward.payout, Payout::new(50, 25));
        assert_eq!(s.character().experience, 50);
        assert_eq!(s.character().gold, 75);
        assert!(s.character().completed_quests.contains("first_quest"));
    }

    #[test]
    fn test_encounter_stays_near_level() {
        let mut s = session(CharacterClass::Warrior);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..50 {
            let enemy = s.encounter(&mut rng);
            // level 1 character meets level 1..=3 enemies
            match enemy.name.as_str() {
                "Goblin" => assert!(enemy.max_health <= 60),
                "Orc" => assert_eq!(enemy.max_health, 100),
                other => panic!("unexpected enemy {other}"),
            }
        }

        s.character_mut().level = 10;
        for _ in 0..20 {
            assert_eq!(s.encounter(&mut rng).name, "Dragon");
        }
    }

    #[test]
    fn test_battle_victory_pays_out() {
        let mut s = session(CharacterClass::Warrior);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let outcome = {
            let mut battle = s.battle(create_enemy("goblin", 1).unwrap());
            battle.fight(|_| PlayerAction::Attack, &mut rng).unwrap()
        };
        assert_eq!(outcome, BattleOutcome::Victory(Payout::new(25, 10)));

        let reward = s.settle_battle(outcome).unwrap().unwrap();
        assert_eq!(reward.payout, Payout::new(25, 10));
        assert_eq!(s.character().experience, 25);
        assert_eq!(s.character().gold, 110);
        assert_eq!(s.settle_battle(BattleOutcome::Escaped).unwrap(), None);
    }

    #[test]
    fn test_revive_with_gold() {
        let mut s = session(CharacterClass::Mage);
        assert!(!s.revive_with_gold().unwrap());

        s.character_mut().health = 0;
        assert!(s.revive_with_gold().unwrap());
        assert_eq!(s.character().health, 40);
        assert_eq!(s.character().gold, 50);
    }
}
