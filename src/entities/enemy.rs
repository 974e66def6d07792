//! Enemy entities and the archetype registry
//!
//! Enemy archetypes are data, defined in `assets/config/enemies.ron` and
//! loaded into an immutable `EnemyRegistry` at startup. Spawning an enemy
//! stamps a fresh `Enemy` component from its archetype; an unknown
//! archetype id falls back to the weakest defined type with a warning.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::DataLoadError;

const CONFIG_PATH: &str = "assets/config/enemies.ron";

/// Seconds between an enemy's melee attacks.
pub const ENEMY_ATTACK_COOLDOWN: f32 = 2.0;

/// How an enemy weighs aggression against self-preservation. Currently a
/// descriptive tag carried from config; the reactive two-threshold policy
/// behaves the same for all profiles.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum AiProfile {
    Aggressive,
    Defensive,
    Balanced,
}

/// One enemy archetype as defined in config.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnemyArchetype {
    pub id: String,
    pub name: String,
    pub level: u32,
    pub health: i32,
    pub mana: f32,
    pub strength: u32,
    pub intelligence: u32,
    pub dexterity: u32,
    pub experience_reward: u32,
    pub gold_reward: u32,
    #[serde(default)]
    pub loot_table: Vec<String>,
    pub ai_profile: AiProfile,
}

/// A live enemy. Position lives on the entity's `Transform`.
#[derive(Component, Clone, Debug)]
pub struct Enemy {
    pub archetype: String,
    pub name: String,
    pub level: u32,
    pub health: i32,
    pub max_health: i32,
    pub mana: f32,
    pub max_mana: f32,
    pub strength: u32,
    pub intelligence: u32,
    pub dexterity: u32,
    pub experience_reward: u32,
    pub gold_reward: u32,
    pub loot_table: Vec<String>,
    pub ai_profile: AiProfile,
    /// Game-clock timestamp of the last attack, seconds.
    pub last_attack_time: f32,
}

impl Enemy {
    pub fn from_archetype(archetype: &EnemyArchetype) -> Self {
        Self {
            archetype: archetype.id.clone(),
            name: archetype.name.clone(),
            level: archetype.level,
            health: archetype.health,
            max_health: archetype.health,
            mana: archetype.mana,
            max_mana: archetype.mana,
            strength: archetype.strength,
            intelligence: archetype.intelligence,
            dexterity: archetype.dexterity,
            experience_reward: archetype.experience_reward,
            gold_reward: archetype.gold_reward,
            loot_table: archetype.loot_table.clone(),
            ai_profile: archetype.ai_profile,
            last_attack_time: 0.0,
        }
    }

    /// Movement speed in pixels per second.
    pub fn move_speed(&self) -> f32 {
        50.0 + self.dexterity as f32 * 2.0
    }

    pub fn defense(&self) -> i32 {
        (self.dexterity / 3) as i32 + 2
    }

    pub fn take_damage(&mut self, amount: i32) {
        self.health = (self.health - amount).max(0);
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Whether the per-enemy attack cooldown has elapsed at `now`.
    pub fn can_attack(&self, now: f32) -> bool {
        now - self.last_attack_time >= ENEMY_ATTACK_COOLDOWN
    }
}

/// Root structure for the enemies.ron file.
#[derive(Debug, Serialize, Deserialize)]
pub struct EnemyRegistryConfig {
    pub enemies: Vec<EnemyArchetype>,
}

/// Resource containing all enemy archetypes.
///
/// Loaded from `assets/config/enemies.ron` at startup.
#[derive(Resource)]
pub struct EnemyRegistry {
    archetypes: Vec<EnemyArchetype>,
}

impl Default for EnemyRegistry {
    /// Load from the default config file.
    /// Panics if the file cannot be loaded - use for tests only.
    fn default() -> Self {
        load_enemy_registry().expect("Failed to load enemy registry in Default impl")
    }
}

impl EnemyRegistry {
    pub fn new(config: EnemyRegistryConfig) -> Self {
        Self {
            archetypes: config.enemies,
        }
    }

    pub fn get(&self, id: &str) -> Option<&EnemyArchetype> {
        self.archetypes.iter().find(|a| a.id == id)
    }

    /// The lowest-level archetype, used as the unknown-id fallback.
    pub fn weakest(&self) -> &EnemyArchetype {
        self.archetypes
            .iter()
            .min_by_key(|a| a.level)
            .expect("enemy registry validated non-empty at load")
    }

    /// Resolve an archetype id, falling back to the weakest type when the
    /// id is unknown.
    pub fn resolve(&self, id: &str) -> &EnemyArchetype {
        match self.get(id) {
            Some(archetype) => archetype,
            None => {
                let fallback = self.weakest();
                warn!(
                    "Unknown enemy type '{}', falling back to '{}'",
                    id, fallback.id
                );
                fallback
            }
        }
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.archetypes.iter().map(|a| a.id.as_str())
    }

    /// Check that the archetypes the areas and quests reference exist.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let expected = [
            "goblin",
            "orc",
            "skeleton",
            "skeleton_mage",
            "giant_spider",
            "fire_elemental",
            "shadow_wraith",
            "dragon",
        ];
        let missing: Vec<String> = expected
            .into_iter()
            .filter(|id| self.get(id).is_none())
            .map(String::from)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(missing)
        }
    }
}

/// Load enemy archetypes from assets/config/enemies.ron
pub fn load_enemy_registry() -> Result<EnemyRegistry, DataLoadError> {
    let contents =
        std::fs::read_to_string(CONFIG_PATH).map_err(|e| DataLoadError::ReadError {
            path: CONFIG_PATH.to_string(),
            details: e.to_string(),
        })?;

    let config: EnemyRegistryConfig =
        ron::from_str(&contents).map_err(|e| DataLoadError::ParseError {
            path: CONFIG_PATH.to_string(),
            details: e.to_string(),
        })?;

    let registry = EnemyRegistry::new(config);

    registry
        .validate()
        .map_err(|missing| DataLoadError::MissingEntries {
            path: CONFIG_PATH.to_string(),
            missing,
        })?;

    info!(
        "Loaded {} enemy archetypes from {}",
        registry.len(),
        CONFIG_PATH
    );

    Ok(registry)
}

/// Bevy plugin for enemy archetype loading
pub struct EnemyRegistryPlugin;

impl Plugin for EnemyRegistryPlugin {
    fn build(&self, app: &mut App) {
        match load_enemy_registry() {
            Ok(registry) => {
                app.insert_resource(registry);
            }
            Err(e) => {
                panic!("Failed to load enemy registry: {}", e);
            }
        }
    }
}

/// Spawn an enemy of the given archetype at a world position.
pub fn spawn_enemy(
    commands: &mut Commands,
    registry: &EnemyRegistry,
    archetype_id: &str,
    position: Vec2,
) -> Entity {
    let archetype = registry.resolve(archetype_id);
    let enemy = Enemy::from_archetype(archetype);
    debug!("Spawned {} at ({:.0}, {:.0})", enemy.name, position.x, position.y);
    commands
        .spawn((
            enemy,
            Transform::from_translation(position.extend(0.0)),
        ))
        .id()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archetype(id: &str, level: u32, dexterity: u32) -> EnemyArchetype {
        EnemyArchetype {
            id: id.to_string(),
            name: id.to_string(),
            level,
            health: 40,
            mana: 10.0,
            strength: 8,
            intelligence: 4,
            dexterity,
            experience_reward: 15,
            gold_reward: 10,
            loot_table: vec![],
            ai_profile: AiProfile::Aggressive,
        }
    }

    fn registry() -> EnemyRegistry {
        EnemyRegistry::new(EnemyRegistryConfig {
            enemies: vec![
                archetype("orc", 3, 8),
                archetype("goblin", 1, 12),
                archetype("dragon", 25, 20),
            ],
        })
    }

    #[test]
    fn test_unknown_archetype_falls_back_to_weakest() {
        let registry = registry();
        assert_eq!(registry.resolve("slime_king").id, "goblin");
        assert_eq!(registry.resolve("orc").id, "orc");
    }

    #[test]
    fn test_move_speed_and_defense_formulas() {
        let enemy = Enemy::from_archetype(&archetype("goblin", 1, 12));
        assert_eq!(enemy.move_speed(), 74.0);
        assert_eq!(enemy.defense(), 6);
    }

    #[test]
    fn test_attack_cooldown_window() {
        let mut enemy = Enemy::from_archetype(&archetype("goblin", 1, 12));
        enemy.last_attack_time = 10.0;
        assert!(!enemy.can_attack(11.0));
        assert!(enemy.can_attack(12.0));
    }

    #[test]
    fn test_damage_clamps_at_zero() {
        let mut enemy = Enemy::from_archetype(&archetype("goblin", 1, 12));
        enemy.take_damage(1000);
        assert_eq!(enemy.health, 0);
        assert!(enemy.is_dead());
    }
}
