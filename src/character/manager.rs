use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::progression::xp_for_next_level;
use super::types::{Character, CharacterClass};
use crate::game::constants::{MAX_INVENTORY_SIZE, MAX_NAME_LENGTH, SAVE_FILE_SUFFIX, SAVE_VERSION};
use crate::game::error::{GameError, Result};
use crate::items::equipment::{EquippedItem, Equipment};

/// On-disk layout of a saved character.
#[derive(Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CharacterSaveData {
    version: u32,
    last_save_time: i64,
    name: String,
    class: CharacterClass,
    level: u32,
    health: i32,
    max_health: i32,
    strength: i32,
    magic: i32,
    experience: u32,
    gold: u32,
    inventory: Vec<String>,
    equipped_weapon: Option<EquippedItem>,
    equipped_armor: Option<EquippedItem>,
    active_quests: BTreeSet<String>,
    completed_quests: BTreeSet<String>,
}

impl CharacterSaveData {
    fn from_character(character: &Character) -> Self {
        Self {
            version: SAVE_VERSION,
            last_save_time: Utc::now().timestamp(),
            name: character.name.clone(),
            class: character.class,
            level: character.level,
            health: character.health,
            max_health: character.max_health,
            strength: character.strength,
            magic: character.magic,
            experience: character.experience,
            gold: character.gold,
            inventory: character.inventory.clone(),
            equipped_weapon: character.equipment.weapon.clone(),
            equipped_armor: character.equipment.armor.clone(),
            active_quests: character.active_quests.clone(),
            completed_quests: character.completed_quests.clone(),
        }
    }

    fn into_character(self) -> Character {
        Character {
            name: self.name,
            class: self.class,
            level: self.level,
            health: self.health,
            max_health: self.max_health,
            strength: self.strength,
            magic: self.magic,
            experience: self.experience,
            gold: self.gold,
            inventory: self.inventory,
            equipment: Equipment {
                weapon: self.equipped_weapon,
                armor: self.equipped_armor,
            },
            active_quests: self.active_quests,
            completed_quests: self.completed_quests,
        }
    }
}

/// Saves, loads and lists characters in a single directory.
///
/// Each character lives in `<sanitized name>_save.json`.
pub struct CharacterManager {
    save_dir: PathBuf,
}

impl CharacterManager {
    /// Uses `~/.quest-chronicles/saves`, creating it if needed.
    pub fn new() -> Result<Self> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| GameError::SaveFailed("could not determine home directory".into()))?;
        Self::with_dir(home_dir.join(".quest-chronicles").join("saves"))
    }

    pub fn with_dir(save_dir: impl Into<PathBuf>) -> Result<Self> {
        let save_dir = save_dir.into();
        fs::create_dir_all(&save_dir)
            .map_err(|e| GameError::SaveFailed(format!("{}: {e}", save_dir.display())))?;
        Ok(Self { save_dir })
    }

    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    fn save_path(&self, name: &str) -> PathBuf {
        self.save_dir
            .join(format!("{}{SAVE_FILE_SUFFIX}", sanitize_name(name)))
    }

    pub fn save_character(&self, character: &Character) -> Result<()> {
        let save_data = CharacterSaveData::from_character(character);
        let json = serde_json::to_string_pretty(&save_data)
            .map_err(|e| GameError::SaveFailed(e.to_string()))?;

        let filepath = self.save_path(character.name());
        fs::write(&filepath, json)
            .map_err(|e| GameError::SaveFailed(format!("{}: {e}", filepath.display())))?;

        tracing::debug!(name = character.name(), path = %filepath.display(), "character saved");
        Ok(())
    }

    pub fn load_character(&self, name: &str) -> Result<Character> {
        let filepath = self.save_path(name);
        if !filepath.exists() {
            return Err(GameError::CharacterNotFound(name.to_string()));
        }

        let json_content = fs::read_to_string(&filepath)
            .map_err(|e| GameError::SaveFileCorrupted(format!("{}: {e}", filepath.display())))?;

        let save_data: CharacterSaveData = serde_json::from_str(&json_content)
            .map_err(|e| GameError::InvalidSaveData(e.to_string()))?;

        if save_data.version != SAVE_VERSION {
            return Err(GameError::InvalidSaveData(format!(
                "unsupported save version {}",
                save_data.version
            )));
        }

        let character = save_data.into_character();
        validate_character(&character)?;

        tracing::debug!(name = character.name(), "character loaded");
        Ok(character)
    }

    /// Names of every save in the directory, sorted.
    pub fn list_saved_characters(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.save_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(GameError::SaveFileCorrupted(e.to_string())),
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let filename = entry.file_name().into_string().ok()?;
                filename
                    .strip_suffix(SAVE_FILE_SUFFIX)
                    .filter(|stem| !stem.is_empty())
                    .map(str::to_string)
            })
            .collect();

        names.sort();
        Ok(names)
    }

    pub fn delete_character(&self, name: &str) -> Result<()> {
        let filepath = self.save_path(name);
        if !filepath.exists() {
            return Err(GameError::CharacterNotFound(name.to_string()));
        }
        fs::remove_file(&filepath)
            .map_err(|e| GameError::SaveFailed(format!("{}: {e}", filepath.display())))?;
        tracing::info!(name, "save deleted");
        Ok(())
    }
}

/// Rejects loaded state that no sequence of game operations could produce.
fn validate_character(character: &Character) -> Result<()> {
    let invalid = |msg: String| Err(GameError::InvalidSaveData(msg));

    if character.level < 1 {
        return invalid("level must be at least 1".into());
    }
    if character.experience >= xp_for_next_level(character.level) {
        return invalid(format!(
            "experience {} exceeds the level {} threshold",
            character.experience, character.level
        ));
    }
    if character.health < 0 || character.health > character.max_health {
        return invalid(format!(
            "health {} outside 0..={}",
            character.health, character.max_health
        ));
    }
    if character.inventory.len() > MAX_INVENTORY_SIZE {
        return invalid(format!(
            "{} items carried, capacity is {MAX_INVENTORY_SIZE}",
            character.inventory.len()
        ));
    }
    if let Some(quest_id) = character
        .active_quests
        .intersection(&character.completed_quests)
        .next()
    {
        return invalid(format!("quest '{quest_id}' is both active and completed"));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> std::result::Result<(), String> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err("Name cannot be empty".to_string());
    }

    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(format!("Name must be {MAX_NAME_LENGTH} characters or less"));
    }

    let valid_chars = trimmed
        .chars()
        .all(|c| c.is_alphanumeric() || c == ' ' || c == '-' || c == '_');

    if !valid_chars {
        return Err(
            "Name can only contain letters, numbers, spaces, hyphens, and underscores".to_string(),
        );
    }

    Ok(())
}

/// Maps a display name to its file stem. Case is kept so listed names read back naturally.
pub fn sanitize_name(name: &str) -> String {
    name.trim()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::Stat;
    use crate::items::types::StatEffect;
    use tempfile::TempDir;

    fn manager() -> (TempDir, CharacterManager) {
        let dir = tempfile::tempdir().unwrap();
        let manager = CharacterManager::with_dir(dir.path()).unwrap();
        (dir, manager)
    }

    fn seasoned_rogue() -> Character {
        let mut c = Character::new("Shade", CharacterClass::Rogue);
        c.level = 3;
        c.experience = 120;
        c.gold = 42;
        c.health = 70;
        c.strength = 20;
        c.inventory = vec!["health_potion".into(), "health_potion".into()];
        c.equipment.weapon = Some(EquippedItem {
            item_id: "iron_sword".into(),
            applied: StatEffect::new(Stat::Strength, 5),
        });
        c.active_quests.insert("goblin_menace".into());
        c.completed_quests.insert("first_quest".into());
        c
    }

    #[test]
    fn test_validate_name_valid() {
        assert!(validate_name("Hero").is_ok());
        assert!(validate_name("Test 123").is_ok());
        assert!(validate_name("Warrior-2").is_ok());
        assert!(validate_name("under_score").is_ok());
    }

    #[test]
    fn test_validate_name_rejects() {
        assert!(validate_name("   ").is_err());
        assert!(validate_name("12345678901234567").is_err());
        assert!(validate_name("hello!world").is_err());
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("Hero"), "Hero");
        assert_eq!(sanitize_name("Mage the Great"), "Mage_the_Great");
        assert_eq!(sanitize_name("Test!!!"), "Test");
        assert_eq!(sanitize_name("   Spaces   "), "Spaces");
    }

    #[test]
    fn test_save_and_load_preserves_state() {
        let (_dir, manager) = manager();
        let rogue = seasoned_rogue();

        manager.save_character(&rogue).unwrap();
        assert!(manager.save_dir().join("Shade_save.json").exists());

        let loaded = manager.load_character("Shade").unwrap();
        assert_eq!(loaded, rogue);
    }

    #[test]
    fn test_save_overwrites_previous() {
        let (_dir, manager) = manager();
        let mut rogue = seasoned_rogue();
        manager.save_character(&rogue).unwrap();

        rogue.gold = 999;
        manager.save_character(&rogue).unwrap();

        assert_eq!(manager.load_character("Shade").unwrap().gold, 999);
        assert_eq!(manager.list_saved_characters().unwrap(), vec!["Shade"]);
    }

    #[test]
    fn test_load_missing_character() {
        let (_dir, manager) = manager();
        assert_eq!(
            manager.load_character("Nobody"),
            Err(GameError::CharacterNotFound("Nobody".to_string()))
        );
    }

    #[test]
    fn test_load_malformed_json() {
        let (_dir, manager) = manager();
        fs::write(manager.save_dir().join("Broken_save.json"), "{ not json").unwrap();
        let err = manager.load_character("Broken").unwrap_err();
        assert!(matches!(err, GameError::InvalidSaveData(_)));
        assert!(err.is_save_error());
    }

    #[test]
    fn test_load_rejects_unknown_fields() {
        let (_dir, manager) = manager();
        manager.save_character(&seasoned_rogue()).unwrap();

        let path = manager.save_dir().join("Shade_save.json");
        let mut value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        value["cheat_mode"] = serde_json::Value::Bool(true);
        fs::write(&path, value.to_string()).unwrap();

        assert!(matches!(
            manager.load_character("Shade"),
            Err(GameError::InvalidSaveData(_))
        ));
    }

    #[test]
    fn test_load_rejects_impossible_state() {
        let (_dir, manager) = manager();

        let mut overhealed = seasoned_rogue();
        overhealed.health = overhealed.max_health + 1;
        manager.save_character(&overhealed).unwrap();
        assert!(matches!(
            manager.load_character("Shade"),
            Err(GameError::InvalidSaveData(_))
        ));

        let mut conflicted = seasoned_rogue();
        conflicted.completed_quests.insert("goblin_menace".into());
        manager.save_character(&conflicted).unwrap();
        assert!(matches!(
            manager.load_character("Shade"),
            Err(GameError::InvalidSaveData(_))
        ));

        let mut hoarder = seasoned_rogue();
        hoarder.inventory = vec!["rock".into(); MAX_INVENTORY_SIZE + 1];
        manager.save_character(&hoarder).unwrap();
        assert!(matches!(
            manager.load_character("Shade"),
            Err(GameError::InvalidSaveData(_))
        ));
    }

    #[test]
    fn test_list_and_delete() {
        let (_dir, manager) = manager();
        assert!(manager.list_saved_characters().unwrap().is_empty());

        manager
            .save_character(&Character::new("Zed", CharacterClass::Mage))
            .unwrap();
        manager
            .save_character(&Character::new("Anna Belle", CharacterClass::Cleric))
            .unwrap();
        fs::write(manager.save_dir().join("notes.txt"), "ignored").unwrap();

        assert_eq!(
            manager.list_saved_characters().unwrap(),
            vec!["Anna_Belle", "Zed"]
        );

        // Listed names load back to the same character
        assert_eq!(
            manager.load_character("Anna_Belle").unwrap().name(),
            "Anna Belle"
        );

        manager.delete_character("Zed").unwrap();
        assert_eq!(manager.list_saved_characters().unwrap(), vec!["Anna_Belle"]);
        assert_eq!(
            manager.delete_character("Zed"),
            Err(GameError::CharacterNotFound("Zed".to_string()))
        );
    }
}
