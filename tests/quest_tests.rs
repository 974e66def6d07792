//! Integration tests for the quest system against the real data tables
//!
//! These tests verify that:
//! - Default quest rewards reference defined items and spells
//! - Kill objectives reference defined enemy archetypes
//! - The full accept/progress/complete flow works end to end

use spellforge::entities::EnemyRegistry;
use spellforge::items::{Inventory, ItemRegistry};
use spellforge::quests::{default_quest_table, ObjectiveKind, QuestLog, QuestReward};
use spellforge::spells::presets::SpellLibrary;
use spellforge::PlayerStats;

// =============================================================================
// Data cross references
// =============================================================================

#[test]
fn test_quest_rewards_reference_defined_content() {
    let items = ItemRegistry::default();
    let spells = SpellLibrary::default();

    for quest in default_quest_table() {
        for reward in &quest.rewards {
            match reward {
                QuestReward::Item { id, .. } => {
                    assert!(
                        items.get(id).is_some(),
                        "quest '{}' rewards unknown item '{}'",
                        quest.id,
                        id
                    );
                }
                QuestReward::Spell(id) => {
                    assert!(
                        spells.get(id).is_some(),
                        "quest '{}' rewards unknown spell '{}'",
                        quest.id,
                        id
                    );
                }
                QuestReward::Experience(amount) => assert!(*amount > 0),
                QuestReward::Gold(amount) => assert!(*amount > 0),
            }
        }
    }
}

#[test]
fn test_kill_objectives_reference_defined_enemies() {
    let enemies = EnemyRegistry::default();

    for quest in default_quest_table() {
        for objective in &quest.objectives {
            if objective.kind == ObjectiveKind::Kill {
                assert!(
                    enemies.get(&objective.target).is_some(),
                    "quest '{}' tracks kills of unknown enemy '{}'",
                    quest.id,
                    objective.target
                );
            }
        }
    }
}

#[test]
fn test_collect_objectives_reference_defined_items() {
    let items = ItemRegistry::default();

    for quest in default_quest_table() {
        for objective in &quest.objectives {
            if objective.kind == ObjectiveKind::Collect {
                assert!(
                    items.get(&objective.target).is_some(),
                    "quest '{}' collects unknown item '{}'",
                    quest.id,
                    objective.target
                );
            }
        }
    }
}

// =============================================================================
// Accept/progress/complete flow
// =============================================================================

#[test]
fn test_goblin_quest_full_flow() {
    let mut log = QuestLog::with_default_quests();

    // Below the level requirement the quest stays hidden
    let mut stats = PlayerStats::default();
    let inventory = Inventory::default();
    log.refresh_available(&stats, &inventory);
    assert!(!log.available().iter().any(|q| q.id == "goblin_problem"));

    stats.gain_experience(400);
    assert!(stats.level >= 3);
    log.refresh_available(&stats, &inventory);
    assert!(log.available().iter().any(|q| q.id == "goblin_problem"));

    assert!(log.accept("goblin_problem"));
    assert!(log.is_active("goblin_problem"));

    for _ in 0..9 {
        let completed = log.report_progress(ObjectiveKind::Kill, "goblin", 1);
        assert!(completed.is_empty());
    }
    let completed = log.report_progress(ObjectiveKind::Kill, "goblin", 1);
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, "goblin_problem");
    assert!(log.is_completed("goblin_problem"));

    // Completed quests never re-enter the pool
    log.refresh_available(&stats, &inventory);
    assert!(!log.available().iter().any(|q| q.id == "goblin_problem"));
}

#[test]
fn test_quest_chain_unlocks_after_prerequisite() {
    let mut log = QuestLog::with_default_quests();
    let mut stats = PlayerStats::default();
    stats.gain_experience(2000);
    let inventory = Inventory::default();

    log.refresh_available(&stats, &inventory);
    assert!(!log.available().iter().any(|q| q.id == "dungeon_cleansing"));

    // Clear the prerequisite main quest
    assert!(log.accept("castle_investigation"));
    log.report_progress(ObjectiveKind::Explore, "dungeon", 1);
    let completed = log.report_progress(ObjectiveKind::Explore, "dungeon_level", 3);
    assert!(completed.iter().any(|q| q.id == "castle_investigation"));

    log.refresh_available(&stats, &inventory);
    assert!(log.available().iter().any(|q| q.id == "dungeon_cleansing"));
}
