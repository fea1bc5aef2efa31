//! Flat-file quest and item tables.
//!
//! Records are blocks of `KEY: value` lines separated by blank lines. Keys
//! are case-insensitive and each must appear exactly once. Any malformed
//! record fails the whole load; nothing is skipped.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::game::constants::{ITEMS_FILE, QUESTS_FILE};
use crate::game::error::{GameError, Result};
use crate::items::types::{ItemDefinition, ItemTable, ItemType, StatEffect};
use crate::quests::types::{Prerequisite, QuestDefinition, QuestTable};

const QUEST_KEYS: [&str; 7] = [
    "quest_id",
    "title",
    "description",
    "reward_xp",
    "reward_gold",
    "required_level",
    "prerequisite",
];

const ITEM_KEYS: [&str; 6] = ["item_id", "name", "type", "effect", "cost", "description"];

const DEFAULT_QUESTS: &str = "\
QUEST_ID: first_quest
TITLE: First Steps
DESCRIPTION: Prove yourself by completing this simple task.
REWARD_XP: 50
REWARD_GOLD: 25
REQUIRED_LEVEL: 1
PREREQUISITE: NONE

QUEST_ID: goblin_menace
TITLE: Goblin Menace
DESCRIPTION: Clear out the goblins troubling the nearby farms.
REWARD_XP: 100
REWARD_GOLD: 50
REQUIRED_LEVEL: 2
PREREQUISITE: first_quest
";

const DEFAULT_ITEMS: &str = "\
ITEM_ID: health_potion
NAME: Health Potion
TYPE: consumable
EFFECT: health:30
COST: 25
DESCRIPTION: Restores a moderate amount of health.

ITEM_ID: iron_sword
NAME: Iron Sword
TYPE: weapon
EFFECT: strength:5
COST: 100
DESCRIPTION: A basic sword that increases strength.

ITEM_ID: leather_armor
NAME: Leather Armor
TYPE: armor
EFFECT: max_health:10
COST: 80
DESCRIPTION: Basic armor that increases maximum health.
";

/// One record's fields, keyed by lowercase name.
struct Block {
    number: usize,
    fields: HashMap<String, String>,
}

impl Block {
    fn error(&self, kind: &str, msg: impl std::fmt::Display) -> GameError {
        GameError::InvalidDataFormat(format!("{kind} block {}: {msg}", self.number))
    }

    /// Prefixes a parse error with this block's position.
    fn context(&self, kind: &str, err: GameError) -> GameError {
        match err {
            GameError::InvalidDataFormat(msg) => self.error(kind, msg),
            other => other,
        }
    }

    fn take(&mut self, kind: &str, key: &str) -> Result<String> {
        self.fields
            .remove(key)
            .ok_or_else(|| self.error(kind, format!("missing {}", key.to_uppercase())))
    }

    fn take_int(&mut self, kind: &str, key: &str) -> Result<u32> {
        let raw = self.take(kind, key)?;
        match raw.parse::<i64>() {
            Ok(value) if value < 0 => Err(self.error(
                kind,
                format!("{} must not be negative, got {value}", key.to_uppercase()),
            )),
            Ok(value) => u32::try_from(value).map_err(|_| {
                self.error(kind, format!("{} is out of range", key.to_uppercase()))
            }),
            Err(_) => Err(self.error(
                kind,
                format!("{} must be an integer, got '{raw}'", key.to_uppercase()),
            )),
        }
    }
}

/// Splits `text` into blocks and validates each line against `allowed` keys.
fn parse_blocks(text: &str, kind: &str, allowed: &[&str]) -> Result<Vec<Block>> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines().map(str::trim).chain(std::iter::once("")) {
        if !line.is_empty() {
            current.push(line);
            continue;
        }
        if current.is_empty() {
            continue;
        }

        let mut block = Block {
            number: blocks.len() + 1,
            fields: HashMap::new(),
        };
        for line in current.drain(..) {
            let Some((key, value)) = line.split_once(':') else {
                return Err(block.error(kind, format!("line '{line}' has no ':'")));
            };
            let key = key.trim().to_ascii_lowercase();
            if !allowed.contains(&key.as_str()) {
                return Err(block.error(kind, format!("unknown key '{}'", key.to_uppercase())));
            }
            if block.fields.contains_key(&key) {
                return Err(block.error(kind, format!("duplicate key '{}'", key.to_uppercase())));
            }
            block.fields.insert(key, value.trim().to_string());
        }
        blocks.push(block);
    }

    Ok(blocks)
}

fn read_data_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(GameError::MissingDataFile(path.display().to_string()));
    }
    fs::read_to_string(path)
        .map_err(|e| GameError::CorruptedData(format!("{}: {e}", path.display())))
}

/// Parses quest definitions and validates the prerequisite graph.
pub fn parse_quests(text: &str) -> Result<QuestTable> {
    let mut quests = QuestTable::new();

    for mut block in parse_blocks(text, "quest", &QUEST_KEYS)? {
        let quest = QuestDefinition {
            id: block.take("quest", "quest_id")?,
            title: block.take("quest", "title")?,
            description: block.take("quest", "description")?,
            reward_xp: block.take_int("quest", "reward_xp")?,
            reward_gold: block.take_int("quest", "reward_gold")?,
            required_level: block.take_int("quest", "required_level")?,
            prerequisite: Prerequisite::parse(&block.take("quest", "prerequisite")?),
        };

        if quest.id.is_empty() {
            return Err(block.error("quest", "QUEST_ID is empty"));
        }
        if quest.required_level < 1 {
            return Err(block.error("quest", "REQUIRED_LEVEL must be at least 1"));
        }
        if quests.contains_key(&quest.id) {
            return Err(block.error("quest", format!("duplicate quest id '{}'", quest.id)));
        }
        quests.insert(quest.id.clone(), quest);
    }

    validate_prerequisites(&quests)?;
    Ok(quests)
}

/// Every prerequisite must exist and no quest may depend on itself.
fn validate_prerequisites(quests: &QuestTable) -> Result<()> {
    for quest in quests.values() {
        let mut seen = HashSet::from([quest.id.as_str()]);
        let mut current = quest;

        while let Some(prerequisite) = current.prerequisite.quest_id() {
            current = quests.get(prerequisite).ok_or_else(|| {
                GameError::InvalidDataFormat(format!(
                    "quest '{}' requires unknown quest '{prerequisite}'",
                    current.id
                ))
            })?;
            if !seen.insert(current.id.as_str()) {
                return Err(GameError::InvalidDataFormat(format!(
                    "prerequisite cycle through '{}'",
                    quest.id
                )));
            }
        }
    }
    Ok(())
}

pub fn parse_items(text: &str) -> Result<ItemTable> {
    let mut items = ItemTable::new();

    for mut block in parse_blocks(text, "item", &ITEM_KEYS)? {
        let id = block.take("item", "item_id")?;
        let name = block.take("item", "name")?;
        let item_type: ItemType = block
            .take("item", "type")?
            .parse()
            .map_err(|e| block.context("item", e))?;
        let effect: StatEffect = block
            .take("item", "effect")?
            .parse()
            .map_err(|e| block.context("item", e))?;
        let cost = block.take_int("item", "cost")?;
        let description = block.take("item", "description")?;

        if id.is_empty() {
            return Err(block.error("item", "ITEM_ID is empty"));
        }
        if items.contains_key(&id) {
            return Err(block.error("item", format!("duplicate item id '{id}'")));
        }
        items.insert(
            id.clone(),
            ItemDefinition {
                id,
                name,
                item_type,
                effect,
                cost,
                description,
            },
        );
    }

    Ok(items)
}

pub fn load_quests(path: &Path) -> Result<QuestTable> {
    let quests = parse_quests(&read_data_file(path)?)?;
    tracing::debug!(path = %path.display(), count = quests.len(), "quests loaded");
    Ok(quests)
}

pub fn load_items(path: &Path) -> Result<ItemTable> {
    let items = parse_items(&read_data_file(path)?)?;
    tracing::debug!(path = %path.display(), count = items.len(), "items loaded");
    Ok(items)
}

/// Loads `quests.txt` and `items.txt` from `dir`.
pub fn load_game_data(dir: &Path) -> Result<(QuestTable, ItemTable)> {
    Ok((
        load_quests(&dir.join(QUESTS_FILE))?,
        load_items(&dir.join(ITEMS_FILE))?,
    ))
}

/// The built-in starter tables, without touching the filesystem.
pub fn default_game_data() -> Result<(QuestTable, ItemTable)> {
    Ok((parse_quests(DEFAULT_QUESTS)?, parse_items(DEFAULT_ITEMS)?))
}

/// Writes the starter quest and item files into `dir`, leaving existing files alone.
pub fn create_default_data_files(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .map_err(|e| GameError::CorruptedData(format!("{}: {e}", dir.display())))?;

    for (filename, contents) in [(QUESTS_FILE, DEFAULT_QUESTS), (ITEMS_FILE, DEFAULT_ITEMS)] {
        let path = dir.join(filename);
        if path.exists() {
            continue;
        }
        fs::write(&path, contents)
            .map_err(|e| GameError::CorruptedData(format!("{}: {e}", path.display())))?;
        tracing::info!(path = %path.display(), "default data file created");
    }
    Ok(())
}
