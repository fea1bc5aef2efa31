use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use chronicles::character::{
    create_character, revive_cost, validate_name, xp_for_next_level, Character, CharacterManager,
};
use chronicles::combat::{BattleOutcome, PlayerAction, PlayerTurnResult, SpecialAbility};
use chronicles::data::{create_default_data_files, load_game_data};
use chronicles::game::constants::MAX_INVENTORY_SIZE;
use chronicles::items::{count_item, EquipmentSlot};
use chronicles::quests::{active_quests, available_quests, completed_quests, completion_percentage};
use chronicles::{GameSession, Result};
use rand::Rng;

const USAGE: &str = "\
Quest Chronicles - turn-based terminal RPG

Usage: chronicles [--data-dir <path>]

Options:
  --data-dir <path>  Directory holding quests.txt and items.txt
                     (default: ~/.quest-chronicles/data)
  --help             Show this help message

Set RUST_LOG (e.g. RUST_LOG=chronicles=debug) for diagnostic output on stderr.";

/// Reads trimmed lines from the player. `None` means input is exhausted.
struct Console<R> {
    input: R,
}

impl<R: BufRead> Console<R> {
    fn prompt(&mut self, message: &str) -> io::Result<Option<String>> {
        print!("{message}");
        io::stdout().flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

/// How a game session ended.
enum SessionEnd {
    ToMenu,
    GameOver,
    Quit,
}

fn main() -> io::Result<()> {
    let mut data_dir: Option<PathBuf> = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                println!("{USAGE}");
                return Ok(());
            }
            "--data-dir" => match args.next() {
                Some(path) => data_dir = Some(PathBuf::from(path)),
                None => {
                    eprintln!("--data-dir needs a path");
                    std::process::exit(1);
                }
            },
            other => {
                eprintln!("Unknown argument: {other}");
                eprintln!("Run 'chronicles --help' for usage.");
                std::process::exit(1);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let data_dir = match data_dir.or_else(|| {
        dirs::home_dir().map(|home| home.join(".quest-chronicles").join("data"))
    }) {
        Some(dir) => dir,
        None => {
            eprintln!("Could not determine home directory; pass --data-dir");
            std::process::exit(1);
        }
    };

    let (quests, items) = match create_default_data_files(&data_dir)
        .and_then(|_| load_game_data(&data_dir))
    {
        Ok(tables) => tables,
        Err(e) => {
            eprintln!("Error loading game data: {e}");
            eprintln!("Please check the files in {}", data_dir.display());
            std::process::exit(1);
        }
    };
    tracing::info!(quests = quests.len(), items = items.len(), "game data loaded");

    let manager = CharacterManager::new().map_err(io::Error::other)?;
    let mut console = Console {
        input: io::stdin().lock(),
    };
    let mut rng = rand::thread_rng();

    println!("==================================================");
    println!("     QUEST CHRONICLES");
    println!("==================================================");

    loop {
        println!("\n--- MAIN MENU ---");
        println!("1. New Game");
        println!("2. Load Game");
        println!("3. Exit");
        let Some(choice) = console.prompt("Enter choice (1-3): ")? else {
            break;
        };

        let session = match choice.as_str() {
            "1" => new_game(&mut console, &manager)?,
            "2" => load_game(&mut console, &manager)?,
            "3" => break,
            _ => {
                println!("Invalid choice, please enter 1, 2, or 3.");
                continue;
            }
        };

        if let Some(character) = session {
            let mut session = GameSession::new(character, quests.clone(), items.clone());
            match game_loop(&mut console, &manager, &mut session, &mut rng)? {
                SessionEnd::ToMenu => {}
                SessionEnd::GameOver => println!("\nGAME OVER"),
                SessionEnd::Quit => break,
            }
        }
    }

    println!("\nThanks for playing Quest Chronicles!");
    Ok(())
}

fn new_game<R: BufRead>(
    console: &mut Console<R>,
    manager: &CharacterManager,
) -> io::Result<Option<Character>> {
    println!("\n--- NEW GAME ---");
    let Some(name) = console.prompt("Character name: ")? else {
        return Ok(None);
    };
    if let Err(msg) = validate_name(&name) {
        println!("{msg}");
        return Ok(None);
    }

    println!("Classes: Warrior, Mage, Rogue, Cleric");
    let Some(class) = console.prompt("Choose your class: ")? else {
        return Ok(None);
    };
    let character = match create_character(name.trim(), &capitalize(&class)) {
        Ok(character) => character,
        Err(e) => {
            println!("{e}");
            return Ok(None);
        }
    };

    println!(
        "\nWelcome, {} the {}!",
        character.name(),
        character.class()
    );
    autosave(manager, &character);
    Ok(Some(character))
}

fn load_game<R: BufRead>(
    console: &mut Console<R>,
    manager: &CharacterManager,
) -> io::Result<Option<Character>> {
    let saves = match manager.list_saved_characters() {
        Ok(saves) => saves,
        Err(e) => {
            println!("Could not list saves: {e}");
            return Ok(None);
        }
    };
    if saves.is_empty() {
        println!("\nNo saved characters found.");
        return Ok(None);
    }

    println!("\n--- SAVED CHARACTERS ---");
    for (i, name) in saves.iter().enumerate() {
        println!("{}. {}", i + 1, name);
    }
    let Some(choice) = console.prompt("Load which character? ")? else {
        return Ok(None);
    };
    let name = match choice.parse::<usize>() {
        Ok(n) if (1..=saves.len()).contains(&n) => saves[n - 1].clone(),
        _ => choice,
    };

    match manager.load_character(&name) {
        Ok(character) => {
            println!("\nWelcome back, {}!", character.name());
            Ok(Some(character))
        }
        Err(e) => {
            println!("Could not load '{name}': {e}");
            Ok(None)
        }
    }
}

fn game_loop<R: BufRead>(
    console: &mut Console<R>,
    manager: &CharacterManager,
    session: &mut GameSession,
    rng: &mut impl Rng,
) -> io::Result<SessionEnd> {
    loop {
        if session.character().is_dead() && !handle_death(console, manager, session)? {
            return Ok(SessionEnd::GameOver);
        }

        println!("\n--- GAME MENU ---");
        println!("1. View Character Stats");
        println!("2. Inventory");
        println!("3. Quests");
        println!("4. Explore");
        println!("5. Shop");
        println!("6. Save Game");
        println!("7. Return to Main Menu");
        let Some(choice) = console.prompt("Choice: ")? else {
            autosave(manager, session.character());
            return Ok(SessionEnd::Quit);
        };

        match choice.as_str() {
            "1" => show_stats(session),
            "2" => inventory_menu(console, manager, session)?,
            "3" => quest_menu(console, manager, session)?,
            "4" => explore(console, manager, session, rng)?,
            "5" => shop_menu(console, manager, session)?,
            "6" => match manager.save_character(session.character()) {
                Ok(()) => println!("Game saved."),
                Err(e) => println!("Save failed: {e}"),
            },
            "7" => {
                autosave(manager, session.character());
                return Ok(SessionEnd::ToMenu);
            }
            _ => println!("Invalid choice."),
        }
    }
}

fn show_stats(session: &GameSession) {
    let c = session.character();
    println!("\n=== {} ===", c.name());
    println!("Class: {}", c.class());
    println!("Level: {}", c.level);
    println!("XP: {}/{}", c.experience, xp_for_next_level(c.level));
    println!("Health: {}/{}", c.health, c.max_health);
    println!("Strength: {}", c.strength);
    println!("Magic: {}", c.magic);
    println!("Gold: {}", c.gold);
    println!(
        "Ability: {}",
        SpecialAbility::for_class(c.class()).name()
    );
    println!(
        "Quests completed: {} ({:.0}%)",
        c.completed_quests.len(),
        completion_percentage(c, session.quests())
    );
}

fn show_inventory(session: &GameSession) {
    let c = session.character();
    println!("\n=== INVENTORY ({}/{MAX_INVENTORY_SIZE}) ===", c.inventory.len());
    let mut seen: Vec<&str> = Vec::new();
    for id in &c.inventory {
        if seen.contains(&id.as_str()) {
            continue;
        }
        seen.push(id);
        let name = session.item(id).map_or(id.as_str(), |item| item.name.as_str());
        println!("  {name} [{id}] x{}", count_item(c, id));
    }
    if c.inventory.is_empty() {
        println!("  (empty)");
    }
    for slot in [EquipmentSlot::Weapon, EquipmentSlot::Armor] {
        match c.equipment.get(slot) {
            Some(equipped) => println!("{}: {} ({})", slot.name(), equipped.item_id, equipped.applied),
            None => println!("{}: none", slot.name()),
        }
    }
}

fn inventory_menu<R: BufRead>(
    console: &mut Console<R>,
    manager: &CharacterManager,
    session: &mut GameSession,
) -> io::Result<()> {
    loop {
        show_inventory(session);
        println!("Commands: use <id>, equip <id>, unequip weapon|armor, back");
        let Some(line) = console.prompt("> ")? else {
            return Ok(());
        };
        let (command, arg) = split_command(&line);

        let result: Result<String> = match command {
            "use" => session
                .use_item(arg)
                .map(|effect| format!("Used {arg} ({effect}).")),
            "equip" => session
                .equip_item(arg)
                .map(|slot| format!("Equipped {arg} as {}.", slot.name())),
            "unequip" => {
                let slot = match arg {
                    "weapon" => EquipmentSlot::Weapon,
                    "armor" => EquipmentSlot::Armor,
                    _ => {
                        println!("Unequip weapon or armor.");
                        continue;
                    }
                };
                session.unequip(slot).map(|item| match item {
                    Some(id) => format!("Unequipped {id}."),
                    None => "Nothing equipped there.".to_string(),
                })
            }
            "back" | "" => return Ok(()),
            _ => {
                println!("Unknown command.");
                continue;
            }
        };

        report(result, manager, session);
    }
}

fn quest_menu<R: BufRead>(
    console: &mut Console<R>,
    manager: &CharacterManager,
    session: &mut GameSession,
) -> io::Result<()> {
    loop {
        let c = session.character();
        println!("\n=== QUESTS ===");
        println!("Active:");
        for quest in active_quests(c, session.quests()) {
            println!("  [{}] {} - {}", quest.id, quest.title, quest.description);
        }
        println!("Available:");
        for quest in available_quests(c, session.quests()) {
            println!(
                "  [{}] {} (level {}, {} XP, {} gold)",
                quest.id, quest.title, quest.required_level, quest.reward_xp, quest.reward_gold
            );
        }
        println!("Completed:");
        for quest in completed_quests(c, session.quests()) {
            println!("  [{}] {}", quest.id, quest.title);
        }

        println!("Commands: accept <id>, abandon <id>, complete <id>, back");
        let Some(line) = console.prompt("> ")? else {
            return Ok(());
        };
        let (command, arg) = split_command(&line);

        let result: Result<String> = match command {
            "accept" => session.accept_quest(arg).map(|_| format!("Accepted {arg}.")),
            "abandon" => session.abandon_quest(arg).map(|_| format!("Abandoned {arg}.")),
            "complete" => session.complete_quest(arg).map(|reward| {
                let mut msg = format!(
                    "Quest complete! Gained {} XP and {} gold.",
                    reward.payout.xp, reward.payout.gold
                );
                if reward.leveled_up {
                    msg.push_str(" Level up!");
                }
                msg
            }),
            "back" | "" => return Ok(()),
            _ => {
                println!("Unknown command.");
                continue;
            }
        };

        report(result, manager, session);
    }
}

fn shop_menu<R: BufRead>(
    console: &mut Console<R>,
    manager: &CharacterManager,
    session: &mut GameSession,
) -> io::Result<()> {
    loop {
        println!("\n=== SHOP === (gold: {})", session.character().gold);
        for item in session.shop_items() {
            println!(
                "  [{}] {} - {} gold ({}, {})",
                item.id, item.name, item.cost, item.item_type, item.effect
            );
        }

        println!("Commands: buy <id>, sell <id>, back");
        let Some(line) = console.prompt("> ")? else {
            return Ok(());
        };
        let (command, arg) = split_command(&line);

        let result: Result<String> = match command {
            "buy" => session.buy(arg).map(|_| format!("Bought {arg}.")),
            "sell" => session
                .sell(arg)
                .map(|gold| format!("Sold {arg} for {gold} gold.")),
            "back" | "" => return Ok(()),
            _ => {
                println!("Unknown command.");
                continue;
            }
        };

        report(result, manager, session);
    }
}

fn explore<R: BufRead>(
    console: &mut Console<R>,
    manager: &CharacterManager,
    session: &mut GameSession,
    rng: &mut impl Rng,
) -> io::Result<()> {
    let enemy = session.encounter(rng);
    println!(
        "\nA wild {} appears! ({} HP)",
        enemy.name, enemy.health
    );

    let outcome = {
        let mut battle = session.battle(enemy);
        if let Err(e) = battle.start() {
            println!("{e}");
            return Ok(());
        }

        loop {
            if let Some(outcome) = battle.outcome() {
                break outcome;
            }
            println!(
                "\n{}: {}/{} HP   {}: {} HP",
                battle.character().name(),
                battle.character().health,
                battle.character().max_health,
                battle.enemy().name,
                battle.enemy().health
            );
            println!("1. Attack  2. Special Ability  3. Flee");
            let action = match console.prompt("Action: ")?.as_deref() {
                Some("1") => PlayerAction::Attack,
                Some("2") => PlayerAction::SpecialAbility,
                Some("3") | None => PlayerAction::Flee,
                Some(_) => {
                    println!("Invalid action.");
                    continue;
                }
            };

            match battle.take_turn(action, rng) {
                Ok(report) => {
                    match report.player {
                        PlayerTurnResult::Attacked { damage } => {
                            println!("You hit for {damage} damage.")
                        }
                        PlayerTurnResult::Ability(ability) => println!("{}", ability.describe()),
                        PlayerTurnResult::Escaped => println!("You escaped!"),
                        PlayerTurnResult::EscapeFailed => println!("You failed to escape!"),
                    }
                    if let Some(damage) = report.enemy_damage {
                        println!("{} hits you for {damage} damage.", battle.enemy().name);
                    }
                }
                Err(e) => {
                    println!("{e}");
                    break BattleOutcome::Escaped;
                }
            }
        }
    };

    match session.settle_battle(outcome) {
        Ok(Some(reward)) => {
            println!(
                "\nVictory! Gained {} XP and {} gold.",
                reward.payout.xp, reward.payout.gold
            );
            if reward.leveled_up {
                println!("Level up! You are now level {}.", session.character().level);
            }
        }
        Ok(None) if outcome == BattleOutcome::Defeat => println!("\nYou have been defeated..."),
        Ok(None) => {}
        Err(e) => println!("{e}"),
    }
    autosave(manager, session.character());
    Ok(())
}

/// Offers a paid revival. Returns false when the game is over.
fn handle_death<R: BufRead>(
    console: &mut Console<R>,
    manager: &CharacterManager,
    session: &mut GameSession,
) -> io::Result<bool> {
    println!("\n==================================================");
    println!("YOU HAVE DIED");
    println!("==================================================");
    let cost = revive_cost(session.character());
    println!("Revive for {cost} gold? (you have {})", session.character().gold);
    println!("1. Yes");
    println!("2. No (quit)");

    if console.prompt("Choice: ")?.as_deref() != Some("1") {
        return Ok(false);
    }
    match session.revive_with_gold() {
        Ok(_) => {
            println!("You have been revived!");
            autosave(manager, session.character());
            Ok(true)
        }
        Err(e) => {
            println!("{e}");
            Ok(false)
        }
    }
}

/// Prints an operation's outcome and saves after a success.
fn report(result: Result<String>, manager: &CharacterManager, session: &GameSession) {
    match result {
        Ok(msg) => {
            println!("{msg}");
            autosave(manager, session.character());
        }
        Err(e) => println!("{e}"),
    }
}

fn autosave(manager: &CharacterManager, character: &Character) {
    if let Err(e) = manager.save_character(character) {
        tracing::warn!(error = %e, "auto-save failed");
        println!("Warning: auto-save failed: {e}");
    }
}

fn split_command(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((command, arg)) => (command, arg.trim()),
        None => (line, ""),
    }
}

fn capitalize(word: &str) -> String {
    let word = word.trim().to_lowercase();
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
