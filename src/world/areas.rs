//! Static area layouts
//!
//! Village, castle and wilderness each have a fixed layout: a base tile
//! fill, hand-placed paths or patches, features, NPCs and exit rects.
//! Only the stochastic variation pass consults the RNG.

use bevy::prelude::*;

use crate::rng::GameRng;

use super::{
    Area, AreaExit, AreaFeature, AreaId, ExitTarget, FeatureKind, NpcPlacement, SpawnDescriptor,
    TileGrid, TileKind,
};

fn feature(kind: FeatureKind, name: &str, x: f32, y: f32, w: f32, h: f32) -> AreaFeature {
    AreaFeature {
        kind,
        name: name.to_string(),
        position: Vec2::new(x, y),
        size: Vec2::new(w, h),
    }
}

fn npc(id: &str, x: f32, y: f32) -> NpcPlacement {
    NpcPlacement {
        id: id.to_string(),
        position: Vec2::new(x, y),
    }
}

fn spawn(archetype: &str, x: f32, y: f32) -> SpawnDescriptor {
    SpawnDescriptor {
        archetype: archetype.to_string(),
        position: Vec2::new(x, y),
    }
}

fn exit(target: ExitTarget, x: f32, y: f32, w: f32, h: f32) -> AreaExit {
    AreaExit {
        target,
        position: Vec2::new(x, y),
        size: Vec2::new(w, h),
    }
}

/// The starting village. Safe zone, grass with dirt paths.
pub fn village(rng: &mut GameRng) -> Area {
    let size = Vec2::new(800.0, 600.0);
    let mut grid = TileGrid::filled(size, TileKind::Grass);

    // Main horizontal path and the vertical path toward the castle.
    let width = grid.width();
    let height = grid.height();
    let path_y = height / 2;
    grid.fill_rect(0, path_y, width, (path_y + 2).min(height), TileKind::Dirt);
    let castle_path_x = (width as f32 * 0.8) as usize;
    grid.fill_rect(
        castle_path_x,
        0,
        (castle_path_x + 2).min(width),
        height,
        TileKind::Dirt,
    );

    grid.add_variation(rng, TileKind::Dirt, 0.05);

    Area {
        id: AreaId::Village,
        size,
        grid,
        exits: vec![
            exit(ExitTarget::Area(AreaId::Castle), 750.0, 250.0, 50.0, 100.0),
            exit(
                ExitTarget::Area(AreaId::Wilderness),
                350.0,
                550.0,
                100.0,
                50.0,
            ),
        ],
        spawns: Vec::new(),
        features: vec![
            feature(FeatureKind::Building, "The Prancing Pony", 200.0, 150.0, 80.0, 60.0),
            feature(FeatureKind::Building, "General Store", 350.0, 200.0, 100.0, 80.0),
            feature(FeatureKind::Building, "Cottage", 150.0, 300.0, 70.0, 50.0),
            feature(FeatureKind::Building, "The Forge", 400.0, 350.0, 90.0, 70.0),
            feature(FeatureKind::Altar, "Village Well", 400.0, 250.0, 30.0, 30.0),
            feature(FeatureKind::Sign, "Welcome to Willowbrook", 300.0, 100.0, 20.0, 20.0),
        ],
        npcs: vec![
            npc("shopkeeper", 400.0, 240.0),
            npc("blacksmith", 445.0, 385.0),
            npc("innkeeper", 240.0, 180.0),
            npc("villager", 380.0, 270.0),
            npc("villager", 180.0, 320.0),
        ],
        safe_zone: true,
        start_position: Vec2::new(300.0, 300.0),
        ambient_pool: Vec::new(),
        ambient_cap: 0,
    }
}

/// The royal castle. Safe zone, stone with a marble hall.
pub fn castle(rng: &mut GameRng) -> Area {
    let size = Vec2::new(800.0, 600.0);
    let mut grid = TileGrid::filled(size, TileKind::Stone);

    // Marble throne room in the center.
    let width = grid.width();
    let height = grid.height();
    grid.fill_rect(
        (width as f32 * 0.3) as usize,
        (height as f32 * 0.2) as usize,
        (width as f32 * 0.7) as usize,
        (height as f32 * 0.6) as usize,
        TileKind::Wood,
    );

    grid.add_variation(rng, TileKind::DarkStone, 0.1);

    Area {
        id: AreaId::Castle,
        size,
        grid,
        exits: vec![
            exit(ExitTarget::Area(AreaId::Village), 0.0, 250.0, 50.0, 100.0),
            exit(ExitTarget::Area(AreaId::Dungeon), 400.0, 550.0, 100.0, 50.0),
        ],
        spawns: Vec::new(),
        features: vec![
            feature(FeatureKind::Building, "Royal Throne Room", 300.0, 150.0, 200.0, 200.0),
            feature(FeatureKind::Building, "Arcane Tower", 550.0, 100.0, 80.0, 120.0),
            feature(FeatureKind::Building, "Royal Armory", 500.0, 350.0, 100.0, 80.0),
            feature(FeatureKind::Building, "Royal Library", 150.0, 350.0, 100.0, 100.0),
            feature(FeatureKind::Altar, "Altar of Light", 400.0, 120.0, 40.0, 40.0),
            feature(FeatureKind::Portal, "Dungeon Entrance", 400.0, 500.0, 60.0, 40.0),
        ],
        npcs: vec![
            npc("king", 400.0, 200.0),
            npc("court_wizard", 590.0, 160.0),
            npc("guard", 350.0, 150.0),
            npc("guard", 450.0, 150.0),
            npc("guard", 400.0, 480.0),
        ],
        safe_zone: true,
        start_position: Vec2::new(400.0, 400.0),
        ambient_pool: Vec::new(),
        ambient_cap: 0,
    }
}

/// The wilderness. Hostile, forest patches and a lake.
pub fn wilderness(rng: &mut GameRng) -> Area {
    let size = Vec2::new(1200.0, 900.0);
    let mut grid = TileGrid::filled(size, TileKind::Grass);

    forest_patch(&mut grid, rng, 0.2, 0.1, 0.3, 0.4);
    forest_patch(&mut grid, rng, 0.6, 0.5, 0.35, 0.4);
    lake(&mut grid, 0.4, 0.6, 5);

    grid.add_variation(rng, TileKind::Dirt, 0.15);
    grid.add_variation(rng, TileKind::Sand, 0.05);

    Area {
        id: AreaId::Wilderness,
        size,
        grid,
        exits: vec![exit(
            ExitTarget::Area(AreaId::Village),
            550.0,
            0.0,
            100.0,
            50.0,
        )],
        spawns: vec![
            spawn("goblin", 200.0, 300.0),
            spawn("goblin", 700.0, 400.0),
            spawn("goblin", 1000.0, 600.0),
            spawn("orc", 400.0, 500.0),
            spawn("orc", 800.0, 200.0),
            spawn("giant_spider", 250.0, 150.0),
            spawn("giant_spider", 900.0, 700.0),
            spawn("skeleton", 350.0, 250.0),
            spawn("skeleton_mage", 750.0, 500.0),
            spawn("fire_elemental", 820.0, 580.0),
        ],
        features: vec![
            feature(FeatureKind::Building, "Ancient Ruins", 300.0, 200.0, 100.0, 80.0),
            feature(FeatureKind::Altar, "Dark Altar", 800.0, 600.0, 50.0, 50.0),
            feature(FeatureKind::Chest, "Hidden Chest", 150.0, 450.0, 30.0, 20.0),
            feature(FeatureKind::Altar, "Abandoned Campfire", 600.0, 300.0, 40.0, 40.0),
            feature(FeatureKind::Altar, "Crystal Spring", 500.0, 550.0, 30.0, 30.0),
            feature(FeatureKind::Sign, "Beware: dangerous creatures", 400.0, 100.0, 20.0, 30.0),
        ],
        npcs: Vec::new(),
        safe_zone: false,
        start_position: Vec2::new(250.0, 250.0),
        ambient_pool: vec![
            "goblin".to_string(),
            "giant_spider".to_string(),
            "orc".to_string(),
        ],
        ambient_cap: 3,
    }
}

/// Dense forest over a proportional rectangle, 80% fill for ragged edges.
fn forest_patch(grid: &mut TileGrid, rng: &mut GameRng, x: f32, y: f32, w: f32, h: f32) {
    let width = grid.width();
    let height = grid.height();
    let x0 = (width as f32 * x) as usize;
    let x1 = (width as f32 * (x + w)) as usize;
    let y0 = (height as f32 * y) as usize;
    let y1 = (height as f32 * (y + h)) as usize;

    for ty in y0..y1.min(height) {
        for tx in x0..x1.min(width) {
            if rng.roll(0.8) {
                grid.set(tx, ty, TileKind::Wood);
            }
        }
    }
}

/// Circular lake by point-in-circle test around a proportional center.
fn lake(grid: &mut TileGrid, cx: f32, cy: f32, radius: i32) {
    let center_x = (grid.width() as f32 * cx) as i32;
    let center_y = (grid.height() as f32 * cy) as i32;

    for y in (center_y - radius)..=(center_y + radius) {
        for x in (center_x - radius)..=(center_x + radius) {
            if x < 0 || y < 0 {
                continue;
            }
            let dx = x - center_x;
            let dy = y - center_y;
            if dx * dx + dy * dy <= radius * radius {
                grid.set(x as usize, y as usize, TileKind::Water);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_village_is_safe_with_two_exits() {
        let mut rng = GameRng::from_seed(1);
        let area = village(&mut rng);
        assert!(area.safe_zone);
        assert!(area.spawns.is_empty());
        assert_eq!(area.exits.len(), 2);
        assert!(area
            .exits
            .iter()
            .any(|e| e.target == ExitTarget::Area(AreaId::Castle)));
        assert!(area
            .exits
            .iter()
            .any(|e| e.target == ExitTarget::Area(AreaId::Wilderness)));
    }

    #[test]
    fn test_village_paths_survive_variation() {
        let mut rng = GameRng::from_seed(1);
        let area = village(&mut rng);
        // Paths plus 5% variation leave a substantial dirt share.
        let dirt = area.grid.count(TileKind::Dirt);
        let total = area.grid.width() * area.grid.height();
        assert!(dirt > total / 10);
    }

    #[test]
    fn test_wilderness_has_lake_and_forests() {
        let mut rng = GameRng::from_seed(9);
        let area = wilderness(&mut rng);
        assert!(!area.safe_zone);
        assert!(area.grid.count(TileKind::Water) >= 60);
        assert!(area.grid.count(TileKind::Wood) > 100);
        assert_eq!(area.ambient_cap, 3);
        assert_eq!(area.spawns.len(), 10);
    }

    #[test]
    fn test_castle_exits_lead_to_village_and_dungeon() {
        let mut rng = GameRng::from_seed(3);
        let area = castle(&mut rng);
        assert!(area.safe_zone);
        let targets: Vec<_> = area.exits.iter().map(|e| e.target).collect();
        assert!(targets.contains(&ExitTarget::Area(AreaId::Village)));
        assert!(targets.contains(&ExitTarget::Area(AreaId::Dungeon)));
    }
}
