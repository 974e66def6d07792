//! Data-Driven Preset Spell Library
//!
//! Preset spells are defined in `assets/config/spells.ron` instead of being
//! hardcoded, so balance changes don't require recompilation. The file is
//! loaded and validated once at startup; the resulting `SpellLibrary`
//! resource is immutable for the rest of the run.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::types::Spell;
use crate::error::DataLoadError;

const CONFIG_PATH: &str = "assets/config/spells.ron";

/// Spells every new character starts with.
pub const STARTING_SPELLS: &[&str] = &["fireball", "heal", "lightning", "shield"];

/// Root structure for the spells.ron file.
#[derive(Debug, Serialize, Deserialize)]
pub struct SpellLibraryConfig {
    pub spells: Vec<Spell>,
}

/// Resource containing every preset spell, in file order.
///
/// Loaded from `assets/config/spells.ron` at startup. Access via
/// `Res<SpellLibrary>` in systems.
#[derive(Resource)]
pub struct SpellLibrary {
    spells: Vec<Spell>,
}

impl Default for SpellLibrary {
    /// Load the library from the default config file.
    /// Panics if the file cannot be loaded - use for tests only.
    fn default() -> Self {
        load_spell_library().expect("Failed to load spell library in Default impl")
    }
}

impl SpellLibrary {
    pub fn new(config: SpellLibraryConfig) -> Self {
        Self {
            spells: config.spells,
        }
    }

    /// Look up a preset by id.
    pub fn get(&self, id: &str) -> Option<&Spell> {
        self.spells.iter().find(|s| s.id == id)
    }

    /// All presets in file order.
    pub fn iter(&self) -> impl Iterator<Item = &Spell> {
        self.spells.iter()
    }

    pub fn len(&self) -> usize {
        self.spells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }

    /// Check that the starter spells every character depends on exist.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let missing: Vec<String> = STARTING_SPELLS
            .iter()
            .filter(|id| self.get(id).is_none())
            .map(|id| id.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(missing)
        }
    }
}

/// Load preset spells from assets/config/spells.ron
pub fn load_spell_library() -> Result<SpellLibrary, DataLoadError> {
    let contents =
        std::fs::read_to_string(CONFIG_PATH).map_err(|e| DataLoadError::ReadError {
            path: CONFIG_PATH.to_string(),
            details: e.to_string(),
        })?;

    let config: SpellLibraryConfig =
        ron::from_str(&contents).map_err(|e| DataLoadError::ParseError {
            path: CONFIG_PATH.to_string(),
            details: e.to_string(),
        })?;

    let library = SpellLibrary::new(config);

    library.validate().map_err(|missing| DataLoadError::MissingEntries {
        path: CONFIG_PATH.to_string(),
        missing,
    })?;

    info!("Loaded {} preset spells from {}", library.len(), CONFIG_PATH);

    Ok(library)
}

/// Bevy plugin for preset spell loading
pub struct SpellLibraryPlugin;

impl Plugin for SpellLibraryPlugin {
    fn build(&self, app: &mut App) {
        match load_spell_library() {
            Ok(library) => {
                app.insert_resource(library);
            }
            Err(e) => {
                // Config must be valid for the game to be playable at all
                panic!("Failed to load spell library: {}", e);
            }
        }
    }
}
