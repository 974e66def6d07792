//! Combat system
//!
//! Per-tick combat runs in three ordered phases:
//!
//! 1. **Resources** - clock, mana regeneration, cooldown decay, debuff expiry
//! 2. **Movement** - player movement, enemy approach
//! 3. **CombatResolution** - attacks, casts, area damage, defeat processing
//!
//! Later phases read state mutated by earlier ones (an attack must see this
//! tick's movement), so the ordering is enforced with chained system sets.

pub mod events;
pub mod log;
pub mod systems;

use bevy::prelude::*;

pub use events::{
    AreaDamageEvent, CastSpellEvent, EnemyDamagedEvent, EnemyDefeatedEvent, PlayerDamagedEvent,
    PlayerDefeatedEvent,
};
pub use log::{CombatLog, CombatLogEntry, CombatLogEventType};
pub use systems::{mitigated_damage, Slowed};

use crate::entities::player;
use crate::quests::QuestProgressEvent;
use crate::rng::GameRng;
use crate::states::GameState;
use crate::world;

/// Seconds elapsed since the run started. Drives enemy attack timestamps.
#[derive(Resource, Default)]
pub struct GameClock {
    pub elapsed: f32,
}

/// System set labels for per-tick phase ordering.
///
/// Use these to ensure proper ordering when adding custom systems that
/// interact with the simulation.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum TickPhase {
    /// Phase 1: clock, regeneration, cooldown decay, debuff expiry
    Resources,
    /// Phase 2: player movement, enemy approach
    Movement,
    /// Phase 3: attacks, casts, area damage, defeat processing
    CombatResolution,
}

/// Configures the ordering between tick phases.
///
/// Call this once during app setup before adding simulation systems.
pub fn configure_tick_ordering(app: &mut App) {
    app.configure_sets(
        Update,
        (
            TickPhase::Resources,
            TickPhase::Movement,
            TickPhase::CombatResolution,
        )
            .chain(),
    );
}

/// Registers the events and resources the simulation systems rely on.
pub fn register_combat_events(app: &mut App) {
    app.add_event::<PlayerDamagedEvent>()
        .add_event::<EnemyDamagedEvent>()
        .add_event::<AreaDamageEvent>()
        .add_event::<CastSpellEvent>()
        .add_event::<EnemyDefeatedEvent>()
        .add_event::<PlayerDefeatedEvent>()
        .add_event::<QuestProgressEvent>()
        .init_resource::<GameClock>()
        .init_resource::<CombatLog>();
}

/// Adds the core simulation systems to the app.
///
/// Both graphical and headless modes need these.
///
/// # Arguments
/// * `app` - The Bevy App to add systems to
/// * `run_condition` - A run condition (e.g., `in_state(GameState::Playing)`)
pub fn add_core_tick_systems<M>(app: &mut App, run_condition: impl Condition<M> + Clone)
where
    M: 'static,
{
    // Phase 1: Resources
    app.add_systems(
        Update,
        (
            systems::tick_game_clock,
            player::regenerate_player_mana,
            systems::tick_cooldowns,
            systems::tick_slow_debuffs,
        )
            .chain()
            .in_set(TickPhase::Resources)
            .run_if(run_condition.clone()),
    );

    // Phase 2: Movement
    app.add_systems(
        Update,
        (player::player_movement, systems::enemy_approach)
            .chain()
            .in_set(TickPhase::Movement)
            .run_if(run_condition.clone()),
    );

    // Phase 3: Combat Resolution
    app.add_systems(
        Update,
        (
            systems::enemy_attacks,
            systems::player_melee_attack,
            systems::process_cast_events,
            systems::apply_area_damage,
            systems::process_defeats,
            systems::check_player_defeat,
        )
            .chain()
            .in_set(TickPhase::CombatResolution)
            .run_if(run_condition.clone()),
    );

    // After combat: quest and dungeon payouts, then area transitions and
    // ambient spawns
    app.add_systems(
        Update,
        (
            crate::quests::apply_quest_progress,
            world::grant_dungeon_clear_rewards,
            world::check_area_transitions,
            world::ambient_enemy_spawns,
        )
            .chain()
            .after(TickPhase::CombatResolution)
            .run_if(run_condition),
    );
}

/// Plugin wiring the full per-tick simulation for the graphical game.
///
/// The headless runner builds the same systems itself with an
/// always-true run condition.
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameRng>();
        configure_tick_ordering(app);
        register_combat_events(app);
        add_core_tick_systems(app, in_state(GameState::Playing));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_phase_labels_are_distinct() {
        assert_ne!(TickPhase::Resources, TickPhase::Movement);
        assert_ne!(TickPhase::Movement, TickPhase::CombatResolution);
    }
}
