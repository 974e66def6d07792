//! Validation tests for the data-driven definition files
//!
//! These tests verify that:
//! - The spell, enemy, and item config files load and validate
//! - Every id referenced by areas, dungeon levels, and loot tables exists
//! - Starter content is self-consistent

use spellforge::entities::EnemyRegistry;
use spellforge::items::ItemRegistry;
use spellforge::rng::GameRng;
use spellforge::spells::presets::{SpellLibrary, STARTING_SPELLS};
use spellforge::spells::SpellBook;
use spellforge::world::dungeon::DUNGEON_LEVELS;
use spellforge::world::{areas, dungeon};

// =============================================================================
// Config loading
// =============================================================================

#[test]
fn test_all_config_files_load() {
    let spells = SpellLibrary::default();
    let enemies = EnemyRegistry::default();
    let items = ItemRegistry::default();

    assert!(!spells.is_empty());
    assert!(!enemies.is_empty());
    assert!(!items.is_empty());
}

#[test]
fn test_starting_spells_exist_and_seed_the_book() {
    let library = SpellLibrary::default();
    let book = SpellBook::with_starting_spells(&library);

    assert_eq!(book.len(), STARTING_SPELLS.len());
    for id in STARTING_SPELLS {
        assert!(book.knows(id), "starting spell '{}' not learned", id);
    }
}

#[test]
fn test_preset_damage_spells_carry_damage_effects() {
    let library = SpellLibrary::default();
    for spell in library.iter() {
        if spell.damage.is_some() {
            assert!(
                !spell.effects.is_empty(),
                "damage spell '{}' has no effects",
                spell.id
            );
        }
        assert!(spell.mana_cost > 0, "spell '{}' is free to cast", spell.id);
        assert!(!spell.is_custom, "preset '{}' flagged custom", spell.id);
    }
}

// =============================================================================
// Cross references
// =============================================================================

#[test]
fn test_enemy_loot_tables_reference_defined_items() {
    let enemies = EnemyRegistry::default();
    let items = ItemRegistry::default();

    for id in enemies.ids().map(String::from).collect::<Vec<_>>() {
        let archetype = enemies.get(&id).unwrap();
        for loot in &archetype.loot_table {
            assert!(
                items.get(loot).is_some(),
                "enemy '{}' drops unknown item '{}'",
                id,
                loot
            );
        }
    }
}

#[test]
fn test_area_spawns_reference_defined_enemies() {
    let enemies = EnemyRegistry::default();
    let mut rng = GameRng::from_seed(7);

    for area in [
        areas::village(&mut rng),
        areas::castle(&mut rng),
        areas::wilderness(&mut rng),
    ] {
        for spawn in &area.spawns {
            assert!(
                enemies.get(&spawn.archetype).is_some(),
                "area '{}' spawns unknown enemy '{}'",
                area.id.name(),
                spawn.archetype
            );
        }
        for archetype in &area.ambient_pool {
            assert!(enemies.get(archetype).is_some());
        }
    }
}

#[test]
fn test_dungeon_levels_reference_defined_content() {
    let enemies = EnemyRegistry::default();
    let items = ItemRegistry::default();
    let spells = SpellLibrary::default();

    for (depth, level) in DUNGEON_LEVELS.iter().enumerate() {
        for enemy in level.enemies {
            assert!(
                enemies.get(enemy).is_some(),
                "dungeon level {} spawns unknown enemy '{}'",
                depth,
                enemy
            );
        }
        for loot in level.loot {
            assert!(
                items.get(loot).is_some(),
                "dungeon level {} drops unknown item '{}'",
                depth,
                loot
            );
        }
        assert!(
            spells.get(level.spell_reward).is_some(),
            "dungeon level {} rewards unknown spell '{}'",
            depth,
            level.spell_reward
        );
        if let Some(boss) = level.boss {
            assert!(enemies.get(boss).is_some());
        }
    }
}

#[test]
fn test_dungeon_generation_spawns_match_level_roster() {
    let mut rng = GameRng::from_seed(11);
    for depth in 0..DUNGEON_LEVELS.len() {
        let area = dungeon::build_level(depth, &mut rng);
        let roster = &DUNGEON_LEVELS[depth];
        for spawn in &area.spawns {
            assert!(
                roster.enemies.contains(&spawn.archetype.as_str())
                    || Some(spawn.archetype.as_str()) == roster.boss,
                "level {} spawned '{}' outside its roster",
                depth,
                spawn.archetype
            );
        }
    }
}

// =============================================================================
// Starting kit
// =============================================================================

#[test]
fn test_starting_kit_is_equippable_at_level_one() {
    use spellforge::items::Inventory;
    use spellforge::PlayerStats;

    let items = ItemRegistry::default();
    let mut inv = Inventory::with_starting_items(&items);
    let stats = PlayerStats::default();

    let slot = inv.equip_item(&items, "wooden_staff", &stats).unwrap();
    assert_eq!(inv.equipped(slot), Some("wooden_staff"));

    let bonuses = inv.equipment_bonuses(&items);
    assert_eq!(bonuses.intelligence, 2);
    assert_eq!(bonuses.spell_power, 5);
}
