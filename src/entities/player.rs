//! Player entity
//!
//! The player is an entity with a `Player` marker, a `Transform`, and a
//! `PlayerStats` component. Stat arithmetic lives on `PlayerStats` so it
//! can be tested without an ECS world.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::keybindings::PlayerInput;

/// Movement speed in pixels per second.
pub const MOVE_SPEED: f32 = 150.0;

/// Mana regenerated per second.
pub const MANA_REGEN_PER_SECOND: f32 = 5.0;

/// Stat points granted per level.
pub const POINTS_PER_LEVEL: u32 = 3;

/// Marker component for the player entity.
#[derive(Component)]
pub struct Player;

/// A stat the player can spend points on.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StatKind {
    Strength,
    Intelligence,
    Dexterity,
}

/// The player's full stat block.
#[derive(Component, Clone, Debug, Serialize, Deserialize)]
pub struct PlayerStats {
    pub level: u32,
    pub experience: u32,
    pub experience_to_next: u32,
    pub health: i32,
    pub max_health: i32,
    pub mana: f32,
    pub max_mana: f32,
    pub strength: u32,
    pub intelligence: u32,
    pub dexterity: u32,
    pub available_points: u32,
    pub gold: u32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            level: 1,
            experience: 0,
            experience_to_next: 100,
            health: 100,
            max_health: 100,
            mana: 50.0,
            max_mana: 50.0,
            strength: 10,
            intelligence: 10,
            dexterity: 10,
            available_points: 0,
            gold: 100,
        }
    }
}

/// Experience required to go from `level` to `level + 1`.
pub fn experience_required(level: u32) -> u32 {
    (100.0 * 1.5f32.powi(level as i32 - 1)).floor() as u32
}

impl PlayerStats {
    pub fn take_damage(&mut self, amount: i32) {
        self.health = (self.health - amount).max(0);
    }

    pub fn heal(&mut self, amount: i32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    pub fn restore_mana(&mut self, amount: f32) {
        self.mana = (self.mana + amount).min(self.max_mana);
    }

    pub fn regenerate_mana(&mut self, delta: f32) {
        self.restore_mana(MANA_REGEN_PER_SECOND * delta);
    }

    pub fn defense(&self) -> i32 {
        (self.dexterity / 2) as i32 + 5
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Grant experience, leveling up as many times as the total allows.
    /// Returns the number of levels gained.
    pub fn gain_experience(&mut self, amount: u32) -> u32 {
        self.experience += amount;
        let mut levels = 0;
        while self.experience >= self.experience_to_next {
            self.level_up();
            levels += 1;
        }
        levels
    }

    fn level_up(&mut self) {
        self.experience -= self.experience_to_next;
        self.level += 1;
        self.available_points += POINTS_PER_LEVEL;

        self.max_health += 10 + (self.strength as i32) * 2;
        self.max_mana += 5.0 + self.intelligence as f32 * 3.0;
        // Full refill on level up
        self.health = self.max_health;
        self.mana = self.max_mana;

        self.experience_to_next = experience_required(self.level + 1);
    }

    /// Spend one available point on a stat. Returns false with no change
    /// when no points are available.
    pub fn allocate_point(&mut self, stat: StatKind) -> bool {
        if self.available_points == 0 {
            return false;
        }
        self.available_points -= 1;
        match stat {
            StatKind::Strength => {
                self.strength += 1;
                self.max_health += 2;
                self.health = (self.health + 2).min(self.max_health);
            }
            StatKind::Intelligence => {
                self.intelligence += 1;
                self.max_mana += 3.0;
                self.mana = (self.mana + 3.0).min(self.max_mana);
            }
            StatKind::Dexterity => {
                self.dexterity += 1;
            }
        }
        true
    }

    pub fn add_gold(&mut self, amount: u32) {
        self.gold += amount;
    }

    /// Spend gold if affordable. Returns false with no change otherwise.
    pub fn spend_gold(&mut self, amount: u32) -> bool {
        if self.gold < amount {
            return false;
        }
        self.gold -= amount;
        true
    }
}

/// Move the player from the captured input state.
pub fn player_movement(
    time: Res<Time>,
    input: Res<PlayerInput>,
    mut query: Query<&mut Transform, With<Player>>,
) {
    let Ok(mut transform) = query.get_single_mut() else {
        return;
    };

    let mut move_x = 0.0;
    let mut move_y = 0.0;
    if input.move_left {
        move_x -= 1.0;
    }
    if input.move_right {
        move_x += 1.0;
    }
    if input.move_up {
        move_y += 1.0;
    }
    if input.move_down {
        move_y -= 1.0;
    }

    // Normalize diagonal movement
    if move_x != 0.0 && move_y != 0.0 {
        move_x *= 0.707;
        move_y *= 0.707;
    }

    let step = MOVE_SPEED * time.delta_secs();
    transform.translation.x += move_x * step;
    transform.translation.y += move_y * step;
}

/// Tick mana regeneration.
pub fn regenerate_player_mana(time: Res<Time>, mut query: Query<&mut PlayerStats, With<Player>>) {
    for mut stats in &mut query {
        stats.regenerate_mana(time.delta_secs());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_experience_curve() {
        assert_eq!(experience_required(1), 100);
        assert_eq!(experience_required(2), 150);
        assert_eq!(experience_required(3), 225);
        assert_eq!(experience_required(4), 337);
    }

    #[test]
    fn test_level_up_applies_growth_and_refill() {
        let mut stats = PlayerStats::default();
        stats.take_damage(50);

        let levels = stats.gain_experience(100);
        assert_eq!(levels, 1);
        assert_eq!(stats.level, 2);
        assert_eq!(stats.available_points, 3);
        // +10 + strength*2
        assert_eq!(stats.max_health, 130);
        assert_eq!(stats.health, 130);
        // +5 + intelligence*3
        assert_eq!(stats.max_mana, 85.0);
        assert_eq!(stats.mana, 85.0);
        assert_eq!(stats.experience_to_next, experience_required(3));
    }

    #[test]
    fn test_multiple_level_ups_from_one_grant() {
        let mut stats = PlayerStats::default();
        let levels = stats.gain_experience(400);
        assert!(levels >= 2);
        assert_eq!(stats.level, 1 + levels);
    }

    #[test]
    fn test_allocate_point_requires_availability() {
        let mut stats = PlayerStats::default();
        assert!(!stats.allocate_point(StatKind::Strength));

        stats.available_points = 1;
        assert!(stats.allocate_point(StatKind::Strength));
        assert_eq!(stats.strength, 11);
        assert_eq!(stats.max_health, 102);
        assert_eq!(stats.available_points, 0);
    }

    #[test]
    fn test_health_clamps_at_zero_and_max() {
        let mut stats = PlayerStats::default();
        stats.take_damage(500);
        assert_eq!(stats.health, 0);
        assert!(stats.is_dead());

        stats.heal(5000);
        assert_eq!(stats.health, stats.max_health);
    }

    #[test]
    fn test_mana_regen_clamps_at_max() {
        let mut stats = PlayerStats::default();
        stats.mana = 48.0;
        stats.regenerate_mana(1.0);
        assert_eq!(stats.mana, 50.0);
    }

    #[test]
    fn test_spend_gold_rejects_overdraft() {
        let mut stats = PlayerStats::default();
        assert!(!stats.spend_gold(500));
        assert_eq!(stats.gold, 100);
        assert!(stats.spend_gold(60));
        assert_eq!(stats.gold, 40);
    }

    #[test]
    fn test_defense_formula() {
        let stats = PlayerStats {
            dexterity: 13,
            ..Default::default()
        };
        assert_eq!(stats.defense(), 11);
    }
}
