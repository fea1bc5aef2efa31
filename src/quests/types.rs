use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::character::Payout;

/// The quest that must be completed first, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prerequisite {
    None,
    Quest(String),
}

impl Prerequisite {
    /// Parses the data-file form, where `none` (any case) means no prerequisite.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case("none") {
            Prerequisite::None
        } else {
            Prerequisite::Quest(value.to_string())
        }
    }

    pub fn quest_id(&self) -> Option<&str> {
        match self {
            Prerequisite::None => None,
            Prerequisite::Quest(id) => Some(id),
        }
    }
}

impl fmt::Display for Prerequisite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prerequisite::None => f.write_str("none"),
            Prerequisite::Quest(id) => f.write_str(id),
        }
    }
}

/// Read-only quest record produced by the data loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestDefinition {
    pub id: String,
    pub title: String,
    pub description: String,
    pub reward_xp: u32,
    pub reward_gold: u32,
    pub required_level: u32,
    pub prerequisite: Prerequisite,
}

impl QuestDefinition {
    pub fn rewards(&self) -> Payout {
        Payout::new(self.reward_xp, self.reward_gold)
    }
}

/// Where a quest stands for a particular character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestState {
    Locked,
    Available,
    Active,
    Completed,
}

impl QuestState {
    pub fn name(&self) -> &'static str {
        match self {
            QuestState::Locked => "Locked",
            QuestState::Available => "Available",
            QuestState::Active => "Active",
            QuestState::Completed => "Completed",
        }
    }
}

pub type QuestTable = HashMap<String, QuestDefinition>;
