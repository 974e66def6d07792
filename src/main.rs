//! Spellforge - Spell-Crafting Action RPG Prototype
//!
//! A prototype implementation of a 2D action RPG built around composing
//! custom spells from components, clearing a five-level dungeon, and
//! progressing a character through quests, loot, and levels.

use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use spellforge::camera::CameraPlugin;
use spellforge::cli;
use spellforge::combat::CombatPlugin;
use spellforge::entities::EnemyRegistryPlugin;
use spellforge::headless::{run_headless, HeadlessRunConfig};
use spellforge::items::ItemsPlugin;
use spellforge::save::SavePlugin;
use spellforge::spells::SpellLibraryPlugin;
use spellforge::states::{GameState, StatesPlugin};
use spellforge::ui::UiPlugin;

fn main() {
    let args = cli::parse_args();

    if let Some(config_path) = args.headless {
        let mut config = match HeadlessRunConfig::load_from_file(&config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        };
        if let Some(output) = args.output {
            config.output_path = Some(output.to_string_lossy().into_owned());
        }
        if let Some(max_duration) = args.max_duration {
            config.max_duration_secs = max_duration;
        }
        if let Some(seed) = args.seed {
            config.seed = Some(seed);
        }

        match run_headless(config) {
            Ok(result) => {
                println!(
                    "Enemies defeated: {}, damage dealt: {}, damage taken: {}, survived: {}",
                    result.enemies_defeated,
                    result.damage_dealt,
                    result.damage_taken,
                    result.survived
                );
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    App::new()
        // Bevy default plugins with custom window settings
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Spellforge".to_string(),
                resolution: (1280.0, 720.0).into(),
                resizable: true,
                ..default()
            }),
            ..default()
        }))
        // Our game plugins
        .add_plugins((
            EguiPlugin,
            SpellLibraryPlugin,
            EnemyRegistryPlugin,
            ItemsPlugin,
            StatesPlugin,
            CameraPlugin,
            CombatPlugin,
            UiPlugin,
            SavePlugin,
        ))
        // Start in the main menu state
        .init_state::<GameState>()
        .run();
}
