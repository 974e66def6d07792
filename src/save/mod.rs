//! Save snapshots
//!
//! Persistence is a flat JSON snapshot of everything the player carries
//! across sessions. Saves are requested by gameplay (area transitions,
//! the pause menu) via `SaveRequest` and written at the end of the tick.
//! There is no migration logic; an unreadable file loads as `None`.

use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entities::{Player, PlayerStats};
use crate::items::Inventory;
use crate::quests::QuestLog;
use crate::spells::SpellBook;
use crate::world::{AreaId, WorldMap};

/// Default save location relative to the working directory.
pub const SAVE_PATH: &str = "saves/spellforge_save.json";

/// Request a snapshot write at the end of the current tick.
#[derive(Event, Default)]
pub struct SaveRequest;

/// Everything restored on load.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub stats: PlayerStats,
    pub position: [f32; 2],
    pub area: AreaId,
    pub dungeon_level: usize,
    pub inventory: Inventory,
    pub spellbook: SpellBook,
    pub quests: QuestLog,
    /// Seconds since the Unix epoch at capture time.
    pub saved_at: u64,
}

impl GameSnapshot {
    pub fn capture(
        stats: &PlayerStats,
        position: Vec2,
        world: &WorldMap,
        inventory: &Inventory,
        spellbook: &SpellBook,
        quests: &QuestLog,
    ) -> Self {
        let saved_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            stats: stats.clone(),
            position: [position.x, position.y],
            area: world.current_id(),
            dungeon_level: world.dungeon_level(),
            inventory: inventory.clone(),
            spellbook: spellbook.clone(),
            quests: quests.clone(),
            saved_at,
        }
    }

    /// Write the snapshot as JSON, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(path, json)
    }

    /// Load a snapshot. Missing or unreadable files load as `None`.
    pub fn load_from(path: &Path) -> Option<Self> {
        let contents = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!("Save file {} is unreadable: {}", path.display(), e);
                None
            }
        }
    }
}

/// Writes a snapshot when one or more saves were requested this tick.
pub fn handle_save_requests(
    mut requests: EventReader<SaveRequest>,
    stats: Query<(&PlayerStats, &Transform), With<Player>>,
    world: Res<WorldMap>,
    inventory: Res<Inventory>,
    spellbook: Res<SpellBook>,
    quests: Res<QuestLog>,
) {
    if requests.read().count() == 0 {
        return;
    }
    let Ok((stats, transform)) = stats.get_single() else {
        return;
    };
    let snapshot = GameSnapshot::capture(
        stats,
        transform.translation.truncate(),
        &world,
        &inventory,
        &spellbook,
        &quests,
    );
    if let Err(e) = snapshot.save_to(Path::new(SAVE_PATH)) {
        warn!("Failed to write save file: {}", e);
    }
}

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SaveRequest>().add_systems(
            PostUpdate,
            handle_save_requests.run_if(resource_exists::<WorldMap>),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::GameRng;

    fn snapshot_for_test() -> GameSnapshot {
        let mut rng = GameRng::from_seed(1);
        let world = WorldMap::new(&mut rng);
        GameSnapshot::capture(
            &PlayerStats::default(),
            Vec2::new(300.0, 300.0),
            &world,
            &Inventory::default(),
            &SpellBook::default(),
            &QuestLog::default(),
        )
    }

    #[test]
    fn test_snapshot_round_trips_through_json() {
        let snapshot = snapshot_for_test();
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: GameSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.area, AreaId::Village);
        assert_eq!(restored.position, [300.0, 300.0]);
        assert_eq!(restored.stats.level, snapshot.stats.level);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = std::env::temp_dir().join("spellforge_save_test");
        let path = dir.join("slot.json");
        let snapshot = snapshot_for_test();

        snapshot.save_to(&path).unwrap();
        let restored = GameSnapshot::load_from(&path).expect("snapshot should load");
        assert_eq!(restored.dungeon_level, 0);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_missing_file_loads_as_none() {
        assert!(GameSnapshot::load_from(Path::new("/nonexistent/slot.json")).is_none());
    }

    #[test]
    fn test_corrupt_file_loads_as_none() {
        let dir = std::env::temp_dir().join("spellforge_corrupt_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("slot.json");
        std::fs::write(&path, "not json at all").unwrap();

        assert!(GameSnapshot::load_from(&path).is_none());

        let _ = std::fs::remove_dir_all(dir);
    }
}
