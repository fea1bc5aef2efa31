// Inventory
pub const MAX_INVENTORY_SIZE: usize = 20;

// New characters
pub const STARTING_LEVEL: u32 = 1;
pub const STARTING_GOLD: u32 = 100;

// XP and leveling: threshold for the next level is level * XP_PER_LEVEL
pub const XP_PER_LEVEL: u32 = 100;
pub const LEVEL_UP_MAX_HEALTH: i32 = 10;
pub const LEVEL_UP_STRENGTH: i32 = 2;
pub const LEVEL_UP_MAGIC: i32 = 2;

// Death and revival
pub const REVIVE_COST_PER_LEVEL: u32 = 50;

// Combat
pub const MIN_DAMAGE: i32 = 1;
pub const DEFENSE_DIVISOR: i32 = 4;
pub const ESCAPE_CHANCE: f64 = 0.5;
pub const ENEMY_HEALTH_PER_LEVEL: i32 = 10;

// Exploring meets an enemy at the character's level plus an offset in this range
pub const EXPLORE_LEVEL_OFFSET_MIN: i32 = -1;
pub const EXPLORE_LEVEL_OFFSET_MAX: i32 = 2;

// Special abilities
pub const POWER_STRIKE_MULTIPLIER: i32 = 2;
pub const FIREBALL_MULTIPLIER: i32 = 2;
pub const CRITICAL_STRIKE_MULTIPLIER: i32 = 3;
pub const CRITICAL_STRIKE_CHANCE: f64 = 0.5;
pub const CLERIC_HEAL_AMOUNT: i32 = 30;

// Shop: items sell back for cost / SELL_PRICE_DIVISOR
pub const SELL_PRICE_DIVISOR: u32 = 2;

// Persistence
pub const SAVE_VERSION: u32 = 1;
pub const SAVE_FILE_SUFFIX: &str = "_save.json";
pub const MAX_NAME_LENGTH: usize = 16;

// Data files
pub const QUESTS_FILE: &str = "quests.txt";
pub const ITEMS_FILE: &str = "items.txt";
