//! Dungeon level generation
//!
//! The dungeon is five descriptor-driven levels with exactly one
//! materialized at a time. Terrain is rooms-and-corridors: a dark-stone
//! fill, 4-6 random rectangular rooms carved to floor, L-shaped corridors
//! between consecutive rooms, then a variation pass. Room overlap is
//! tolerated; overlapping rooms merge into one larger floor area.

use bevy::prelude::*;

use crate::rng::GameRng;

use super::{
    Area, AreaExit, AreaFeature, AreaId, ExitTarget, FeatureKind, SpawnDescriptor, TileGrid,
    TileKind,
};

pub const DUNGEON_MAX_LEVELS: usize = 5;

const DUNGEON_SIZE: Vec2 = Vec2::new(800.0, 600.0);

/// Fixed spawn slots filled from the level's enemy pool.
const SPAWN_POSITIONS: [Vec2; 5] = [
    Vec2::new(200.0, 300.0),
    Vec2::new(500.0, 350.0),
    Vec2::new(350.0, 500.0),
    Vec2::new(600.0, 200.0),
    Vec2::new(150.0, 450.0),
];

/// Static description of one dungeon level.
pub struct DungeonLevel {
    pub name: &'static str,
    pub enemies: &'static [&'static str],
    pub loot: &'static [&'static str],
    pub spell_reward: &'static str,
    pub boss: Option<&'static str>,
}

/// The five levels, shallowest first. The boss guards the last one.
pub const DUNGEON_LEVELS: [DungeonLevel; DUNGEON_MAX_LEVELS] = [
    DungeonLevel {
        name: "Upper Chambers",
        enemies: &["skeleton", "giant_spider"],
        loot: &["health_potion", "mana_potion", "crystal_shard"],
        spell_reward: "dispel",
        boss: None,
    },
    DungeonLevel {
        name: "Guard Quarters",
        enemies: &["skeleton", "skeleton_mage"],
        loot: &["greater_health_potion", "mana_crystal", "apprentice_wand"],
        spell_reward: "ice_shield",
        boss: None,
    },
    DungeonLevel {
        name: "Ancient Armory",
        enemies: &["skeleton_mage", "shadow_wraith"],
        loot: &["crystal_staff", "mage_robes", "ring_of_power"],
        spell_reward: "chain_lightning",
        boss: None,
    },
    DungeonLevel {
        name: "Ritual Chambers",
        enemies: &["shadow_wraith", "fire_elemental"],
        loot: &["staff_of_flames", "robes_of_the_elements", "grimoire_of_shadows"],
        spell_reward: "meteor",
        boss: None,
    },
    DungeonLevel {
        name: "Heart of Darkness",
        enemies: &["shadow_wraith"],
        loot: &["archmage_rod", "crystal_of_power", "dragon_scale"],
        spell_reward: "time_stop",
        boss: Some("shadow_wraith"),
    },
];

/// Where the player lands after taking stairs. Offset from the stair
/// trigger rects so arrival does not immediately re-trigger them.
pub fn stair_arrival_position(descending: bool) -> Vec2 {
    if descending {
        Vec2::new(180.0, 180.0)
    } else {
        Vec2::new(620.0, 420.0)
    }
}

/// Materialize one dungeon level: terrain, spawns, features and exits.
pub fn build_level(level: usize, rng: &mut GameRng) -> Area {
    let descriptor = &DUNGEON_LEVELS[level.min(DUNGEON_MAX_LEVELS - 1)];
    let mut grid = TileGrid::filled(DUNGEON_SIZE, TileKind::DarkStone);

    carve_rooms_and_corridors(&mut grid, rng);
    grid.add_variation(rng, TileKind::Stone, 0.1);

    let mut spawns: Vec<SpawnDescriptor> = descriptor
        .enemies
        .iter()
        .zip(SPAWN_POSITIONS)
        .map(|(archetype, position)| SpawnDescriptor {
            archetype: (*archetype).to_string(),
            position,
        })
        .collect();
    if let Some(boss) = descriptor.boss {
        spawns.push(SpawnDescriptor {
            archetype: boss.to_string(),
            position: Vec2::new(400.0, 200.0),
        });
    }

    let mut features = vec![
        AreaFeature {
            kind: FeatureKind::Chest,
            name: "Ancient Chest".to_string(),
            position: Vec2::new(150.0, 200.0),
            size: Vec2::new(30.0, 20.0),
        },
        AreaFeature {
            kind: FeatureKind::Altar,
            name: "Arcane Circle".to_string(),
            position: Vec2::new(600.0, 400.0),
            size: Vec2::new(40.0, 40.0),
        },
    ];
    if descriptor.boss.is_some() {
        features.push(AreaFeature {
            kind: FeatureKind::Altar,
            name: "Portal of Shadows".to_string(),
            position: Vec2::new(400.0, 150.0),
            size: Vec2::new(60.0, 60.0),
        });
    }

    let mut exits = Vec::new();
    if level == 0 {
        exits.push(AreaExit {
            target: ExitTarget::Area(AreaId::Castle),
            position: Vec2::new(350.0, 0.0),
            size: Vec2::new(100.0, 50.0),
        });
    } else {
        exits.push(AreaExit {
            target: ExitTarget::DungeonLevel(level - 1),
            position: Vec2::new(100.0, 100.0),
            size: Vec2::new(40.0, 40.0),
        });
    }
    if level + 1 < DUNGEON_MAX_LEVELS {
        exits.push(AreaExit {
            target: ExitTarget::DungeonLevel(level + 1),
            position: Vec2::new(700.0, 500.0),
            size: Vec2::new(40.0, 40.0),
        });
    }

    Area {
        id: AreaId::Dungeon,
        size: DUNGEON_SIZE,
        grid,
        exits,
        spawns,
        features,
        npcs: Vec::new(),
        safe_zone: false,
        start_position: Vec2::new(100.0, 100.0),
        ambient_pool: descriptor.enemies.iter().map(|e| e.to_string()).collect(),
        ambient_cap: 5,
    }
}

struct Room {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
}

impl Room {
    fn center(&self) -> (usize, usize) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

fn carve_rooms_and_corridors(grid: &mut TileGrid, rng: &mut GameRng) {
    let rooms = carve_rooms(grid, rng);
    for pair in rooms.windows(2) {
        let (x1, y1) = pair[0].center();
        let (x2, y2) = pair[1].center();
        // L-shaped corridor: horizontal run first, then vertical.
        carve_corridor(grid, x1, y1, x2, y1);
        carve_corridor(grid, x2, y1, x2, y2);
    }
}

fn carve_rooms(grid: &mut TileGrid, rng: &mut GameRng) -> Vec<Room> {
    let width = grid.width();
    let height = grid.height();
    let count = 4 + rng.random_index(3);
    let mut rooms = Vec::with_capacity(count);

    for _ in 0..count {
        let room_width = 3 + rng.random_index(4);
        let room_height = 3 + rng.random_index(4);
        let x = 1 + rng.random_index(width.saturating_sub(room_width + 2).max(1));
        let y = 1 + rng.random_index(height.saturating_sub(room_height + 2).max(1));

        grid.fill_rect(x, y, x + room_width, y + room_height, TileKind::Stone);
        rooms.push(Room {
            x,
            y,
            width: room_width,
            height: room_height,
        });
    }
    rooms
}

fn carve_corridor(grid: &mut TileGrid, x1: usize, y1: usize, x2: usize, y2: usize) {
    for x in x1.min(x2)..=x1.max(x2) {
        grid.set(x, y1, TileKind::Stone);
    }
    for y in y1.min(y2)..=y1.max(y2) {
        grid.set(x2, y, TileKind::Stone);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_terrain_is_mostly_dark_stone_with_floor() {
        let mut rng = GameRng::from_seed(11);
        let area = build_level(0, &mut rng);
        let total = area.grid.width() * area.grid.height();
        let floor = area.grid.count(TileKind::Stone);
        assert!(floor > 0, "rooms and corridors carve floor tiles");
        assert!(area.grid.count(TileKind::DarkStone) + floor > total / 2);
    }

    #[test]
    fn test_regeneration_is_idempotent_in_structure_counts() {
        let mut rng = GameRng::from_seed(5);
        let first = build_level(2, &mut rng);
        let second = build_level(2, &mut rng);
        // Exact tiles differ between rolls but the materialized lists
        // are deterministic by construction.
        assert_eq!(first.spawns.len(), second.spawns.len());
        assert_eq!(first.features.len(), second.features.len());
        assert_eq!(first.exits.len(), second.exits.len());
    }

    #[test]
    fn test_boss_only_on_final_level() {
        let mut rng = GameRng::from_seed(2);
        for level in 0..DUNGEON_MAX_LEVELS - 1 {
            let area = build_level(level, &mut rng);
            assert!(
                area.features.iter().all(|f| f.name != "Portal of Shadows"),
                "level {level} should not hold the boss portal"
            );
        }
        let last = build_level(DUNGEON_MAX_LEVELS - 1, &mut rng);
        assert!(last
            .spawns
            .iter()
            .any(|s| s.archetype == "shadow_wraith"));
        assert!(last.features.iter().any(|f| f.name == "Portal of Shadows"));
    }

    #[test]
    fn test_stairs_connect_consecutive_levels() {
        let mut rng = GameRng::from_seed(8);
        let top = build_level(0, &mut rng);
        assert!(top
            .exits
            .iter()
            .any(|e| e.target == ExitTarget::Area(AreaId::Castle)));
        assert!(top
            .exits
            .iter()
            .any(|e| e.target == ExitTarget::DungeonLevel(1)));

        let middle = build_level(2, &mut rng);
        assert!(middle
            .exits
            .iter()
            .any(|e| e.target == ExitTarget::DungeonLevel(1)));
        assert!(middle
            .exits
            .iter()
            .any(|e| e.target == ExitTarget::DungeonLevel(3)));

        let bottom = build_level(DUNGEON_MAX_LEVELS - 1, &mut rng);
        assert!(bottom
            .exits
            .iter()
            .all(|e| e.target != ExitTarget::DungeonLevel(DUNGEON_MAX_LEVELS)));
    }

    #[test]
    fn test_stair_arrivals_clear_trigger_rects() {
        let mut rng = GameRng::from_seed(4);
        let area = build_level(3, &mut rng);
        let down = stair_arrival_position(true);
        let up = stair_arrival_position(false);
        assert!(area.exits.iter().all(|e| !e.contains(down)));
        assert!(area.exits.iter().all(|e| !e.contains(up)));
    }
}
