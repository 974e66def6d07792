//! Combat events
//!
//! Defines the events that occur during combat for logging and processing.

use bevy::prelude::*;

/// Event fired when the player takes damage
#[derive(Event)]
pub struct PlayerDamagedEvent {
    /// Final damage after mitigation
    pub amount: i32,
    /// Name of the attacker
    pub source: String,
}

/// Event fired when an enemy takes damage
#[derive(Event)]
pub struct EnemyDamagedEvent {
    /// The enemy entity hit
    pub target: Entity,
    /// Final damage after mitigation
    pub amount: i32,
    /// What caused the damage (attack or spell name)
    pub source: String,
}

/// Event requesting mitigated damage against every enemy in a circle
#[derive(Event)]
pub struct AreaDamageEvent {
    /// Center of the impact in world coordinates
    pub center: Vec2,
    /// Impact radius in world units
    pub radius: f32,
    /// Attack power fed into mitigation independently per target
    pub power: i32,
    /// What caused the damage, for the log
    pub source: String,
}

/// Event requesting a spell cast from the player's spell book
#[derive(Event)]
pub struct CastSpellEvent {
    /// Id of a known spell
    pub spell_id: String,
    /// World position the cast is aimed at
    pub target: Vec2,
}

/// Event fired after an enemy's defeat has been fully processed
#[derive(Event)]
pub struct EnemyDefeatedEvent {
    /// Archetype id of the defeated enemy
    pub archetype: String,
    /// Display name
    pub name: String,
    /// Experience awarded
    pub experience: u32,
    /// Gold awarded
    pub gold: u32,
}

/// Event fired when the player's health reaches zero
#[derive(Event)]
pub struct PlayerDefeatedEvent;
