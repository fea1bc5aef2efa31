//! Error kinds surfaced by the rules engine and its collaborators.
//!
//! Every failure is local and synchronous: operations return
//! [`GameError`] at the point of violation and never retry. The driving
//! layer decides how to present them.

use crate::items::ItemType;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, GameError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    // Character creation and persistence
    #[error("invalid character class '{0}' (valid: Warrior, Mage, Rogue, Cleric)")]
    InvalidCharacterClass(String),

    #[error("no save file found for '{0}'")]
    CharacterNotFound(String),

    #[error("save file could not be read: {0}")]
    SaveFileCorrupted(String),

    #[error("invalid save data: {0}")]
    InvalidSaveData(String),

    #[error("could not write save file: {0}")]
    SaveFailed(String),

    #[error("{0} is dead")]
    CharacterDead(String),

    // Inventory and equipment
    #[error("inventory is full")]
    InventoryFull,

    #[error("item '{0}' not found in inventory")]
    ItemNotFound(String),

    #[error("item '{item_id}' is {actual}, expected {expected}")]
    InvalidItemType {
        item_id: String,
        expected: ItemType,
        actual: ItemType,
    },

    #[error("not enough gold: need {needed}, have {available}")]
    InsufficientResources { needed: u32, available: u32 },

    #[error("unknown stat '{0}'")]
    UnknownStat(String),

    // Quests
    #[error("quest '{0}' does not exist")]
    QuestNotFound(String),

    #[error("quest '{0}' is already active")]
    QuestAlreadyActive(String),

    #[error("quest '{0}' is already completed")]
    QuestAlreadyCompleted(String),

    #[error("level {required} required, character is level {current}")]
    InsufficientLevel { required: u32, current: u32 },

    #[error("quest '{quest_id}' requires '{prerequisite}' to be completed first")]
    QuestRequirementsNotMet {
        quest_id: String,
        prerequisite: String,
    },

    #[error("quest '{0}' is not active")]
    QuestNotActive(String),

    // Combat
    #[error("unknown enemy type '{0}'")]
    InvalidTarget(String),

    #[error("combat is not active")]
    CombatNotActive,

    // Data files
    #[error("data file not found: {0}")]
    MissingDataFile(String),

    #[error("invalid data format: {0}")]
    InvalidDataFormat(String),

    #[error("data file could not be read: {0}")]
    CorruptedData(String),
}

impl GameError {
    pub(crate) fn unknown_stat(stat: &str) -> Self {
        GameError::UnknownStat(stat.to_string())
    }

    /// True for the errors raised by the persistence boundary.
    pub fn is_save_error(&self) -> bool {
        matches!(
            self,
            GameError::CharacterNotFound(_)
                | GameError::SaveFailed(_)
                | GameError::SaveFileCorrupted(_)
                | GameError::InvalidSaveData(_)
        )
    }
}

