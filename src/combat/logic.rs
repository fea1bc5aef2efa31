//! Turn-based battle state machine.
//!
//! A [`Battle`] borrows the character mutably for the whole encounter, so
//! nothing else can touch the character until the battle is dropped.
//! Turns strictly alternate: every call to [`Battle::take_turn`] plays the
//! player's half-turn, checks for an ending, then lets the enemy reply and
//! checks again.

use rand::Rng;

use super::abilities::use_special_ability;
use super::math::{apply_damage, calculate_damage, Combatant};
use super::types::{BattleOutcome, BattleState, Enemy, PlayerAction, PlayerTurnResult, TurnReport};
use crate::character::Character;
use crate::game::constants::ESCAPE_CHANCE;
use crate::game::error::{GameError, Result};

pub struct Battle<'a> {
    character: &'a mut Character,
    enemy: Enemy,
    state: BattleState,
    rounds: u32,
}

/// 50/50 roll to get away.
pub fn attempt_escape(rng: &mut impl Rng) -> bool {
    rng.gen_bool(ESCAPE_CHANCE)
}

impl<'a> Battle<'a> {
    pub fn new(character: &'a mut Character, enemy: Enemy) -> Self {
        Self {
            character,
            enemy,
            state: BattleState::Pending,
            rounds: 0,
        }
    }

    pub fn state(&self) -> BattleState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == BattleState::Active
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        match self.state {
            BattleState::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn character(&self) -> &Character {
        self.character
    }

    pub fn enemy(&self) -> &Enemy {
        &self.enemy
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// pending -> active. A dead character cannot enter a fight.
    pub fn start(&mut self) -> Result<()> {
        if self.character.is_dead() {
            return Err(GameError::CharacterDead(self.character.name().to_string()));
        }
        if self.state != BattleState::Pending {
            return Err(GameError::CombatNotActive);
        }
        self.state = BattleState::Active;
        tracing::debug!(
            character = self.character.name(),
            enemy = %self.enemy.name,
            "battle started"
        );
        Ok(())
    }

    /// Plays one round: the player's action, then the enemy's reply if the
    /// battle is still going.
    pub fn take_turn(&mut self, action: PlayerAction, rng: &mut impl Rng) -> Result<TurnReport> {
        if !self.is_active() {
            return Err(GameError::CombatNotActive);
        }
        self.rounds += 1;

        let player = self.player_turn(action, rng);
        if player == PlayerTurnResult::Escaped {
            let outcome = self.finish(BattleOutcome::Escaped);
            return Ok(TurnReport {
                player,
                enemy_damage: None,
                outcome: Some(outcome),
            });
        }
        if let Some(outcome) = self.check_battle_end() {
            return Ok(TurnReport {
                player,
                enemy_damage: None,
                outcome: Some(outcome),
            });
        }

        let enemy_damage = self.enemy_turn();
        Ok(TurnReport {
            player,
            enemy_damage: Some(enemy_damage),
            outcome: self.check_battle_end(),
        })
    }

    /// Runs the battle to completion, asking `choose` for each player action.
    pub fn fight<F>(&mut self, mut choose: F, rng: &mut impl Rng) -> Result<BattleOutcome>
    where
        F: FnMut(&Battle<'a>) -> PlayerAction,
    {
        if self.state == BattleState::Pending {
            self.start()?;
        }
        loop {
            if let Some(outcome) = self.outcome() {
                return Ok(outcome);
            }
            let action = choose(self);
            self.take_turn(action, rng)?;
        }
    }

    fn player_turn(&mut self, action: PlayerAction, rng: &mut impl Rng) -> PlayerTurnResult {
        match action {
            PlayerAction::Attack => {
                let damage = calculate_damage(&*self.character, &self.enemy);
                apply_damage(&mut self.enemy, damage);
                PlayerTurnResult::Attacked { damage }
            }
            PlayerAction::SpecialAbility => {
                PlayerTurnResult::Ability(use_special_ability(self.character, &mut self.enemy, rng))
            }
            PlayerAction::Flee => {
                if attempt_escape(rng) {
                    PlayerTurnResult::Escaped
                } else {
                    PlayerTurnResult::EscapeFailed
                }
            }
        }
    }

    /// The enemy always attacks.
    fn enemy_turn(&mut self) -> i32 {
        let damage = calculate_damage(&self.enemy, &*self.character);
        apply_damage(&mut *self.character, damage);
        damage
    }

    /// Enemy death is checked first, so a double knockout is a victory.
    fn check_battle_end(&mut self) -> Option<BattleOutcome> {
        if self.enemy.is_defeated() {
            Some(self.finish(BattleOutcome::Victory(self.enemy.rewards())))
        } else if self.character.is_defeated() {
            Some(self.finish(BattleOutcome::Defeat))
        } else {
            None
        }
    }

    fn finish(&mut self, outcome: BattleOutcome) -> BattleOutcome {
        self.state = BattleState::Finished(outcome);
        tracing::info!(
            character = self.character.name(),
            enemy = %self.enemy.name,
            rounds = self.rounds,
            ?outcome,
            "battle finished"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{gain_experience, CharacterClass, Payout};
    use crate::combat::types::{create_enemy, AbilityOutcome};
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn lucky() -> StepRng {
        StepRng::new(0, 0)
    }

    fn unlucky() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    #[test]
    fn test_new_battle_is_pending() {
        let mut c = Character::new("Hero", CharacterClass::Warrior);
        let battle = Battle::new(&mut c, create_enemy("goblin", 1).unwrap());
        assert_eq!(battle.state(), BattleState::Pending);
        assert_eq!(battle.outcome(), None);
    }

    #[test]
    fn test_turn_before_start_fails() {
        let mut c = Character::new("Hero", CharacterClass::Warrior);
        let mut battle = Battle::new(&mut c, create_enemy("goblin", 1).unwrap());
        assert_eq!(
            battle.take_turn(PlayerAction::Attack, &mut lucky()),
            Err(GameError::CombatNotActive)
        );
    }

    #[test]
    fn test_dead_character_cannot_start() {
        let mut c = Character::new("Hero", CharacterClass::Warrior);
        c.health = 0;
        let mut battle = Battle::new(&mut c, create_enemy("goblin", 1).unwrap());
        assert_eq!(
            battle.start(),
            Err(GameError::CharacterDead("Hero".to_string()))
        );
        assert_eq!(battle.state(), BattleState::Pending);
    }

    #[test]
    fn test_start_twice_fails() {
        let mut c = Character::new("Hero", CharacterClass::Warrior);
        let mut battle = Battle::new(&mut c, create_enemy("goblin", 1).unwrap());
        battle.start().unwrap();
        assert_eq!(battle.start(), Err(GameError::CombatNotActive));
    }

    #[test]
    fn test_round_alternates_player_then_enemy() {
        let mut c = Character::new("Hero", CharacterClass::Warrior);
        let mut battle = Battle::new(&mut c, create_enemy("goblin", 1).unwrap());
        battle.start().unwrap();

        let report = battle.take_turn(PlayerAction::Attack, &mut lucky()).unwrap();
        assert_eq!(report.player, PlayerTurnResult::Attacked { damage: 13 });
        assert_eq!(report.enemy_damage, Some(5));
        assert_eq!(report.outcome, None);
        assert_eq!(battle.enemy().health, 37);
        assert_eq!(battle.character().health, 115);
    }

    #[test]
    fn test_victory_skips_enemy_turn_and_pays_out() {
        let mut c = Character::new("Hero", CharacterClass::Warrior);
        let mut goblin = create_enemy("goblin", 1).unwrap();
        goblin.health = 5;
        let mut battle = Battle::new(&mut c, goblin);
        battle.start().unwrap();

        let report = battle.take_turn(PlayerAction::Attack, &mut lucky()).unwrap();
        assert_eq!(report.enemy_damage, None);
        assert_eq!(report.outcome, Some(BattleOutcome::Victory(Payout::new(25, 10))));
        assert_eq!(battle.enemy().health, 0);
        assert_eq!(battle.character().health, 120);
        assert_eq!(
            battle.take_turn(PlayerAction::Attack, &mut lucky()),
            Err(GameError::CombatNotActive)
        );
    }

    #[test]
    fn test_defeat_leaves_character_at_zero() {
        let mut c = Character::new("Hero", CharacterClass::Mage);
        c.health = 3;
        let mut battle = Battle::new(&mut c, create_enemy("dragon", 1).unwrap());
        battle.start().unwrap();

        let report = battle.take_turn(PlayerAction::Attack, &mut lucky()).unwrap();
        assert_eq!(report.outcome, Some(BattleOutcome::Defeat));
        assert_eq!(report.outcome.map(|o| o.payout()), Some(Payout::none()));
        drop(battle);

        assert_eq!(c.health, 0);
        assert!(gain_experience(&mut c, 10).is_err());
    }

    #[test]
    fn test_successful_escape_ends_battle_without_enemy_turn() {
        let mut c = Character::new("Hero", CharacterClass::Rogue);
        let mut battle = Battle::new(&mut c, create_enemy("orc", 1).unwrap());
        battle.start().unwrap();

        let report = battle.take_turn(PlayerAction::Flee, &mut lucky()).unwrap();
        assert_eq!(report.player, PlayerTurnResult::Escaped);
        assert_eq!(report.enemy_damage, None);
        assert_eq!(report.outcome, Some(BattleOutcome::Escaped));
        assert_eq!(battle.character().health, 90);
        assert_eq!(battle.enemy().health, 80);
    }

    #[test]
    fn test_failed_escape_still_gives_enemy_a_turn() {
        let mut c = Character::new("Hero", CharacterClass::Rogue);
        let mut battle = Battle::new(&mut c, create_enemy("orc", 1).unwrap());
        battle.start().unwrap();

        let report = battle.take_turn(PlayerAction::Flee, &mut unlucky()).unwrap();
        assert_eq!(report.player, PlayerTurnResult::EscapeFailed);
        // 12 - 12/4 = 9
        assert_eq!(report.enemy_damage, Some(9));
        assert_eq!(report.outcome, None);
        assert!(battle.is_active());
    }

    #[test]
    fn test_special_ability_in_battle() {
        let mut c = Character::new("Hero", CharacterClass::Cleric);
        c.health = 40;
        let mut battle = Battle::new(&mut c, create_enemy("goblin", 1).unwrap());
        battle.start().unwrap();

        let report = battle
            .take_turn(PlayerAction::SpecialAbility, &mut lucky())
            .unwrap();
        assert_eq!(
            report.player,
            PlayerTurnResult::Ability(AbilityOutcome::Heal { healed: 30 })
        );
        // Healed to 70, then goblin hits for 8 - 10/4 = 6
        assert_eq!(battle.character().health, 64);
    }

    #[test]
    fn test_fight_runs_to_completion() {
        let mut c = Character::new("Hero", CharacterClass::Warrior);
        let mut battle = Battle::new(&mut c, create_enemy("goblin", 1).unwrap());
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let outcome = battle.fight(|_| PlayerAction::Attack, &mut rng).unwrap();
        assert_eq!(outcome, BattleOutcome::Victory(Payout::new(25, 10)));
        // 13 damage per hit: goblin falls on the 4th attack after 3 replies
        assert_eq!(battle.rounds(), 4);
        assert_eq!(battle.character().health, 105);
    }

    #[test]
    fn test_fight_is_reproducible_with_seed() {
        let run = |seed: u64| {
            let mut c = Character::new("Hero", CharacterClass::Rogue);
            let mut battle = Battle::new(&mut c, create_enemy("orc", 3).unwrap());
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let outcome = battle
                .fight(|_| PlayerAction::SpecialAbility, &mut rng)
                .unwrap();
            (outcome, battle.rounds(), battle.character().health)
        };
        assert_eq!(run(7), run(7));
    }

    #[test]
    fn test_fight_with_dead_character() {
        let mut c = Character::new("Hero", CharacterClass::Warrior);
        c.health = 0;
        let mut battle = Battle::new(&mut c, create_enemy("goblin", 1).unwrap());
        assert!(matches!(
            battle.fight(|_| PlayerAction::Attack, &mut lucky()),
            Err(GameError::CharacterDead(_))
        ));
    }

    #[test]
    fn test_attempt_escape_uses_supplied_rng() {
        assert!(attempt_escape(&mut lucky()));
        assert!(!attempt_escape(&mut unlucky()));
    }
}
