//! Quest ledger: lifecycle transitions and eligibility queries.
//!
//! The ledger only moves identifiers between a character's active and
//! completed sets. Rewards come back as a [`Payout`] for the caller to apply,
//! the same way combat victories do.

use super::types::{QuestDefinition, QuestState, QuestTable};
use crate::character::{Character, Payout};
use crate::game::error::{GameError, Result};

fn lookup<'a>(quests: &'a QuestTable, quest_id: &str) -> Result<&'a QuestDefinition> {
    quests
        .get(quest_id)
        .ok_or_else(|| GameError::QuestNotFound(quest_id.to_string()))
}

fn prerequisite_met(character: &Character, quest: &QuestDefinition) -> bool {
    quest
        .prerequisite
        .quest_id()
        .map_or(true, |id| character.completed_quests.contains(id))
}

pub fn quest_state(character: &Character, quest: &QuestDefinition) -> QuestState {
    if character.completed_quests.contains(&quest.id) {
        QuestState::Completed
    } else if character.active_quests.contains(&quest.id) {
        QuestState::Active
    } else if character.level >= quest.required_level && prerequisite_met(character, quest) {
        QuestState::Available
    } else {
        QuestState::Locked
    }
}

/// Checks every acceptance rule, reporting the first one that fails.
pub fn can_accept_quest(character: &Character, quest_id: &str, quests: &QuestTable) -> Result<()> {
    let quest = lookup(quests, quest_id)?;

    if character.active_quests.contains(quest_id) {
        return Err(GameError::QuestAlreadyActive(quest_id.to_string()));
    }
    if character.completed_quests.contains(quest_id) {
        return Err(GameError::QuestAlreadyCompleted(quest_id.to_string()));
    }
    if character.level < quest.required_level {
        return Err(GameError::InsufficientLevel {
            required: quest.required_level,
            current: character.level,
        });
    }
    if !prerequisite_met(character, quest) {
        return Err(GameError::QuestRequirementsNotMet {
            quest_id: quest_id.to_string(),
            prerequisite: quest.prerequisite.to_string(),
        });
    }
    Ok(())
}

/// available -> active
pub fn accept_quest(character: &mut Character, quest_id: &str, quests: &QuestTable) -> Result<()> {
    can_accept_quest(character, quest_id, quests)?;
    character.active_quests.insert(quest_id.to_string());
    tracing::info!(quest_id, "quest accepted");
    Ok(())
}

/// active -> available/locked. Nothing is recorded as completed.
pub fn abandon_quest(character: &mut Character, quest_id: &str) -> Result<()> {
    if !character.active_quests.remove(quest_id) {
        return Err(GameError::QuestNotActive(quest_id.to_string()));
    }
    tracing::info!(quest_id, "quest abandoned");
    Ok(())
}

/// active -> completed. Returns the quest's rewards without granting them.
pub fn complete_quest(
    character: &mut Character,
    quest_id: &str,
    quests: &QuestTable,
) -> Result<Payout> {
    if !character.active_quests.contains(quest_id) {
        return Err(GameError::QuestNotActive(quest_id.to_string()));
    }
    let payout = lookup(quests, quest_id)?.rewards();

    character.active_quests.remove(quest_id);
    character.completed_quests.insert(quest_id.to_string());
    tracing::info!(quest_id, xp = payout.xp, gold = payout.gold, "quest completed");
    Ok(payout)
}

fn collect<'a>(quests: &'a QuestTable, ids: impl Iterator<Item = &'a String>) -> Vec<&'a QuestDefinition> {
    ids.filter_map(|id| quests.get(id)).collect()
}

pub fn active_quests<'a>(character: &'a Character, quests: &'a QuestTable) -> Vec<&'a QuestDefinition> {
    collect(quests, character.active_quests.iter())
}

pub fn completed_quests<'a>(
    character: &'a Character,
    quests: &'a QuestTable,
) -> Vec<&'a QuestDefinition> {
    collect(quests, character.completed_quests.iter())
}

/// Quests the character could accept right now, lowest level first.
pub fn available_quests<'a>(character: &Character, quests: &'a QuestTable) -> Vec<&'a QuestDefinition> {
    let mut available: Vec<_> = quests
        .values()
        .filter(|quest| quest_state(character, quest) == QuestState::Available)
        .collect();
    available.sort_by(|a, b| (a.required_level, &a.id).cmp(&(b.required_level, &b.id)));
    available
}

/// Quests whose level requirement falls within `min_level..=max_level`.
pub fn quests_for_level(quests: &QuestTable, min_level: u32, max_level: u32) -> Vec<&QuestDefinition> {
    let mut found: Vec<_> = quests
        .values()
        .filter(|quest| (min_level..=max_level).contains(&quest.required_level))
        .collect();
    found.sort_by(|a, b| (a.required_level, &a.id).cmp(&(b.required_level, &b.id)));
    found
}

/// The prerequisite chain leading to `quest_id`, root first.
pub fn prerequisite_chain(quest_id: &str, quests: &QuestTable) -> Result<Vec<String>> {
    let mut chain = vec![quest_id.to_string()];
    let mut current = lookup(quests, quest_id)?;

    while let Some(prerequisite) = current.prerequisite.quest_id() {
        // Loaded tables are acyclic; this only guards hand-built ones
        if chain.len() > quests.len() {
            return Err(GameError::InvalidDataFormat(format!(
                "prerequisite cycle through '{}'",
                quest_id
            )));
        }
        current = lookup(quests, prerequisite)?;
        chain.push(current.id.clone());
    }

    chain.reverse();
    Ok(chain)
}

/// Percentage of all known quests the character has completed.
pub fn completion_percentage(character: &Character, quests: &QuestTable) -> f64 {
    if quests.is_empty() {
        return 0.0;
    }
    let completed = quests
        .keys()
        .filter(|id| character.completed_quests.contains(*id))
        .count();
    completed as f64 / quests.len() as f64 * 100.0
}

/// Sum of rewards from every completed quest.
pub fn total_rewards_earned(character: &Character, quests: &QuestTable) -> Payout {
    completed_quests(character, quests)
        .into_iter()
        .fold(Payout::none(), |total, quest| total + quest.rewards())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::CharacterClass;
    use crate::quests::types::Prerequisite;

    fn quest(id: &str, level: u32, prerequisite: Prerequisite) -> QuestDefinition {
        QuestDefinition {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            reward_xp: 50 * level,
            reward_gold: 25 * level,
            required_level: level,
            prerequisite,
        }
    }

    fn table() -> QuestTable {
        [
            quest("first_quest", 1, Prerequisite::None),
            quest("goblin_menace", 2, Prerequisite::Quest("first_quest".to_string())),
            quest("orc_warlord", 3, Prerequisite::Quest("goblin_menace".to_string())),
            quest("side_errand", 1, Prerequisite::None),
        ]
        .into_iter()
        .map(|q| (q.id.clone(), q))
        .collect()
    }

    fn hero() -> Character {
        Character::new("Tester", CharacterClass::Warrior)
    }

    #[test]
    fn test_accept_available_quest() {
        let quests = table();
        let mut c = hero();
        accept_quest(&mut c, "first_quest", &quests).unwrap();
        assert!(c.active_quests.contains("first_quest"));
        assert_eq!(quest_state(&c, &quests["first_quest"]), QuestState::Active);
    }

    #[test]
    fn test_accept_unknown_quest() {
        let mut c = hero();
        assert_eq!(
            accept_quest(&mut c, "nope", &table()),
            Err(GameError::QuestNotFound("nope".to_string()))
        );
    }

    #[test]
    fn test_accept_twice_fails() {
        let quests = table();
        let mut c = hero();
        accept_quest(&mut c, "first_quest", &quests).unwrap();
        assert_eq!(
            accept_quest(&mut c, "first_quest", &quests),
            Err(GameError::QuestAlreadyActive("first_quest".to_string()))
        );
    }

    #[test]
    fn test_accept_completed_fails() {
        let quests = table();
        let mut c = hero();
        accept_quest(&mut c, "first_quest", &quests).unwrap();
        complete_quest(&mut c, "first_quest", &quests).unwrap();
        assert_eq!(
            accept_quest(&mut c, "first_quest", &quests),
            Err(GameError::QuestAlreadyCompleted("first_quest".to_string()))
        );
    }

    #[test]
    fn test_level_gate() {
        let quests = table();
        let mut c = hero();
        c.completed_quests.insert("first_quest".to_string());
        assert_eq!(
            accept_quest(&mut c, "goblin_menace", &quests),
            Err(GameError::InsufficientLevel {
                required: 2,
                current: 1
            })
        );
        assert_eq!(quest_state(&c, &quests["goblin_menace"]), QuestState::Locked);

        c.level = 2;
        accept_quest(&mut c, "goblin_menace", &quests).unwrap();
    }

    #[test]
    fn test_prerequisite_gate() {
        let quests = table();
        let mut c = hero();
        c.level = 5;
        assert_eq!(
            accept_quest(&mut c, "goblin_menace", &quests),
            Err(GameError::QuestRequirementsNotMet {
                quest_id: "goblin_menace".to_string(),
                prerequisite: "first_quest".to_string(),
            })
        );
        assert!(c.active_quests.is_empty());
    }

    #[test]
    fn test_complete_moves_to_completed_and_returns_rewards() {
        let quests = table();
        let mut c = hero();
        accept_quest(&mut c, "first_quest", &quests).unwrap();

        let payout = complete_quest(&mut c, "first_quest", &quests).unwrap();
        assert_eq!(payout, Payout::new(50, 25));
        assert!(c.active_quests.is_empty());
        assert!(c.completed_quests.contains("first_quest"));

        // Rewards are not applied by the ledger
        assert_eq!(c.experience, 0);
        assert_eq!(c.gold, 100);
    }

    #[test]
    fn test_complete_inactive_fails() {
        let quests = table();
        let mut c = hero();
        assert_eq!(
            complete_quest(&mut c, "first_quest", &quests),
            Err(GameError::QuestNotActive("first_quest".to_string()))
        );
    }

    #[test]
    fn test_abandon_then_reaccept() {
        let quests = table();
        let mut c = hero();
        accept_quest(&mut c, "first_quest", &quests).unwrap();
        abandon_quest(&mut c, "first_quest").unwrap();

        assert!(c.active_quests.is_empty());
        assert!(c.completed_quests.is_empty());
        assert_eq!(quest_state(&c, &quests["first_quest"]), QuestState::Available);

        accept_quest(&mut c, "first_quest", &quests).unwrap();
        assert!(c.active_quests.contains("first_quest"));
    }

    #[test]
    fn test_abandon_inactive_fails() {
        let mut c = hero();
        assert_eq!(
            abandon_quest(&mut c, "first_quest"),
            Err(GameError::QuestNotActive("first_quest".to_string()))
        );
    }

    #[test]
    fn test_available_quests_sorted() {
        let quests = table();
        let mut c = hero();
        let ids: Vec<_> = available_quests(&c, &quests).iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["first_quest", "side_errand"]);

        c.level = 2;
        c.completed_quests.insert("first_quest".to_string());
        let ids: Vec<_> = available_quests(&c, &quests).iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["side_errand", "goblin_menace"]);
    }

    #[test]
    fn test_active_and_completed_lists() {
        let quests = table();
        let mut c = hero();
        accept_quest(&mut c, "first_quest", &quests).unwrap();
        accept_quest(&mut c, "side_errand", &quests).unwrap();
        complete_quest(&mut c, "side_errand", &quests).unwrap();

        assert_eq!(active_quests(&c, &quests).len(), 1);
        assert_eq!(completed_quests(&c, &quests)[0].id, "side_errand");
    }

    #[test]
    fn test_prerequisite_chain() {
        let quests = table();
        assert_eq!(
            prerequisite_chain("orc_warlord", &quests).unwrap(),
            vec!["first_quest", "goblin_menace", "orc_warlord"]
        );
        assert_eq!(prerequisite_chain("side_errand", &quests).unwrap(), vec!["side_errand"]);
    }

    #[test]
    fn test_prerequisite_chain_detects_cycle() {
        let mut quests = table();
        quests.insert(
            "first_quest".to_string(),
            quest("first_quest", 1, Prerequisite::Quest("orc_warlord".to_string())),
        );
        assert!(matches!(
            prerequisite_chain("orc_warlord", &quests),
            Err(GameError::InvalidDataFormat(_))
        ));
    }

    #[test]
    fn test_quests_for_level() {
        let quests = table();
        let ids: Vec<_> = quests_for_level(&quests, 2, 3).iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["goblin_menace", "orc_warlord"]);
    }

    #[test]
    fn test_completion_and_rewards() {
        let quests = table();
        let mut c = hero();
        assert_eq!(completion_percentage(&c, &quests), 0.0);
        assert_eq!(completion_percentage(&c, &QuestTable::new()), 0.0);

        c.completed_quests.insert("first_quest".to_string());
        c.completed_quests.insert("goblin_menace".to_string());
        assert_eq!(completion_percentage(&c, &quests), 50.0);
        assert_eq!(total_rewards_earned(&c, &quests), Payout::new(150, 75));
    }
}
