//! Spellforge - Spell-Crafting Action RPG Prototype
//!
//! A prototype implementation of a 2D action RPG built around composing
//! custom spells from components, clearing a five-level dungeon, and
//! progressing a character through quests, loot, and levels.
//!
//! This library exposes the core game modules for testing and reuse.

pub mod camera;
pub mod cli;
pub mod combat;
pub mod entities;
pub mod error;
pub mod headless;
pub mod items;
pub mod keybindings;
pub mod quests;
pub mod rng;
pub mod save;
pub mod spells;
pub mod states;
pub mod ui;
pub mod world;

// Re-export commonly used types
pub use combat::{CombatLog, CombatLogEventType};
pub use entities::{PlayerStats, StatKind};
pub use headless::{run_headless, HeadlessRunConfig, RunResult};
pub use rng::GameRng;
pub use spells::{compose, CasterProfile, CooldownTable, Spell, SpellComponent};
pub use world::{AreaId, WorldMap};
