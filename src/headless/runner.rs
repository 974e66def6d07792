//! Headless run execution
//!
//! Runs the full simulation without any graphical output, suitable for
//! automated testing and balance analysis. A scripted policy drives the
//! player: walk toward the nearest enemy, hold the melee attack in
//! range, and cast the first ready known spell at it.

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

use crate::combat::systems::{ENGAGEMENT_RADIUS, PLAYER_MELEE_RANGE};
use crate::combat::{
    self, CastSpellEvent, CombatLog, CombatLogEventType, EnemyDamagedEvent, EnemyDefeatedEvent,
    PlayerDamagedEvent, TickPhase,
};
use crate::entities::{spawn_enemy, Enemy, EnemyRegistry, Player, PlayerStats};
use crate::items::{Inventory, ItemRegistry, ItemsPlugin};
use crate::keybindings::PlayerInput;
use crate::quests::QuestLog;
use crate::rng::GameRng;
use crate::save::SaveRequest;
use crate::spells::{CooldownTable, SpellBook, SpellLibrary, SpellLibraryPlugin};
use crate::world::WorldMap;

use super::config::HeadlessRunConfig;

/// Simulation step used for headless runs. Decoupled from wall clock so
/// seeded runs replay identically at full speed.
const HEADLESS_TICK: f64 = 1.0 / 60.0;

/// Result of a completed headless run
///
/// This struct provides programmatic access to run results for testing
/// and analysis.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    /// Enemies defeated during the run
    pub enemies_defeated: u32,
    /// Total damage the player dealt
    pub damage_dealt: i32,
    /// Total damage the player took after mitigation
    pub damage_taken: i32,
    /// Whether the player was still alive at run end
    pub survived: bool,
    /// Player level at run end
    pub final_level: u32,
    /// Run duration in game seconds
    pub run_time: f32,
    /// Random seed used (if deterministic mode)
    pub random_seed: Option<u64>,
}

/// How a headless run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunEnding {
    PlayerDefeated,
    AreaCleared,
    TimedOut,
}

/// Resource tracking headless run state
#[derive(Resource)]
pub struct HeadlessRunState {
    /// Maximum run duration before timing out
    pub max_duration: f32,
    /// Elapsed run time in game seconds
    pub elapsed_time: f32,
    /// Custom output path for the run log
    pub output_path: Option<String>,
    /// Random seed (if provided)
    pub random_seed: Option<u64>,
    /// Running totals accumulated from combat events
    pub enemies_defeated: u32,
    pub damage_dealt: i32,
    pub damage_taken: i32,
    /// Whether the run has completed
    pub run_complete: bool,
    /// Run result (populated when the run completes)
    pub result: Option<RunResult>,
}

/// Plugin for headless run execution
pub struct HeadlessPlugin {
    pub config: HeadlessRunConfig,
}

impl Plugin for HeadlessPlugin {
    fn build(&self, app: &mut App) {
        let area = self
            .config
            .area_id()
            .expect("Invalid headless run configuration");

        let mut rng = match self.config.seed {
            Some(seed) => {
                info!("Using deterministic RNG with seed: {}", seed);
                GameRng::from_seed(seed)
            }
            None => {
                info!("Using non-deterministic RNG (no seed provided)");
                GameRng::from_entropy()
            }
        };

        let mut world_map = WorldMap::new(&mut rng);
        world_map.activate(area, &mut rng);

        app.insert_resource(rng)
            .insert_resource(world_map)
            .insert_resource(HeadlessRunState {
                max_duration: self.config.max_duration_secs,
                elapsed_time: 0.0,
                output_path: self.config.output_path.clone(),
                random_seed: self.config.seed,
                enemies_defeated: 0,
                damage_dealt: 0,
                damage_taken: 0,
                run_complete: false,
                result: None,
            })
            .insert_resource(StartingStats(stats_for_level(self.config.player_level)))
            .init_resource::<PlayerInput>()
            .init_resource::<CooldownTable>();

        combat::configure_tick_ordering(app);
        combat::register_combat_events(app);
        app.add_event::<SaveRequest>();

        // The session quest log; area transitions and kills feed it the
        // same way they do in the graphical game.
        app.insert_resource(QuestLog::with_default_quests());

        combat::add_core_tick_systems(app, || true);

        app.add_systems(Startup, headless_setup_run)
            .add_systems(
                Update,
                scripted_player_policy.before(TickPhase::Resources),
            )
            .add_systems(
                Update,
                (headless_track_run, headless_check_run_end)
                    .chain()
                    .after(TickPhase::CombatResolution),
            )
            .add_systems(PostUpdate, headless_exit_on_complete);
    }
}

/// Initial stats for a run starting above level 1. Experience is granted
/// through the normal curve so health and mana growth match a played
/// character; stat points stay unspent.
fn stats_for_level(level: u32) -> PlayerStats {
    let mut stats = PlayerStats::default();
    while stats.level < level {
        let needed = stats.experience_to_next - stats.experience;
        stats.gain_experience(needed);
    }
    stats
}

/// Stats carried into the player spawn. Inserted by the plugin so the
/// setup system does not depend on config parsing.
#[derive(Resource)]
struct StartingStats(PlayerStats);

/// Setup system for a headless run
fn headless_setup_run(
    mut commands: Commands,
    world_map: Res<WorldMap>,
    enemy_registry: Res<EnemyRegistry>,
    items: Res<ItemRegistry>,
    library: Res<SpellLibrary>,
    starting_stats: Res<StartingStats>,
    mut combat_log: ResMut<CombatLog>,
) {
    combat_log.clear();
    combat_log.log(
        CombatLogEventType::RunEvent,
        format!("Run started (headless mode) in {}", world_map.current_id().name()),
    );

    let area = world_map.current();
    for spawn in area.spawns.clone() {
        spawn_enemy(
            &mut commands,
            &enemy_registry,
            &spawn.archetype,
            spawn.position,
        );
    }

    commands.spawn((
        Player,
        starting_stats.0.clone(),
        Transform::from_translation(area.start_position.extend(1.0)),
    ));

    commands.insert_resource(Inventory::with_starting_items(&items));
    commands.insert_resource(SpellBook::with_starting_spells(&library));

    info!(
        "Headless run setup complete: {} at player level {}, {} enemies",
        world_map.current_id().name(),
        starting_stats.0.level,
        area.spawns.len()
    );
}

/// Scripted player policy: approach the nearest enemy, hold the attack
/// inside melee range, and cast the first ready spell once engaged.
fn scripted_player_policy(
    mut input: ResMut<PlayerInput>,
    player: Query<(&Transform, &PlayerStats), With<Player>>,
    enemies: Query<&Transform, With<Enemy>>,
    spellbook: Option<Res<SpellBook>>,
    cooldowns: Res<CooldownTable>,
    mut casts: EventWriter<CastSpellEvent>,
) {
    input.clear();

    let Ok((player_transform, stats)) = player.get_single() else {
        return;
    };
    let origin = player_transform.translation.truncate();

    let Some(nearest) = enemies
        .iter()
        .map(|t| t.translation.truncate())
        .min_by(|a, b| {
            a.distance_squared(origin)
                .partial_cmp(&b.distance_squared(origin))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    else {
        return;
    };

    let delta = nearest - origin;
    let distance = delta.length();

    // Close to just inside melee range, with a dead zone so the policy
    // does not jitter on the boundary.
    if distance > PLAYER_MELEE_RANGE * 0.75 {
        input.move_right = delta.x > 8.0;
        input.move_left = delta.x < -8.0;
        input.move_up = delta.y > 8.0;
        input.move_down = delta.y < -8.0;
    }

    input.attack_held = distance <= PLAYER_MELEE_RANGE;

    if distance <= ENGAGEMENT_RADIUS {
        if let Some(spellbook) = spellbook {
            let ready = spellbook
                .known_spells()
                .iter()
                .find(|spell| cooldowns.can_cast(spell, stats.mana));
            if let Some(spell) = ready {
                casts.send(CastSpellEvent {
                    spell_id: spell.id.clone(),
                    target: nearest,
                });
            }
        }
    }
}

/// Track elapsed run time and accumulate combat totals from events.
fn headless_track_run(
    time: Res<Time>,
    mut state: ResMut<HeadlessRunState>,
    mut enemy_damage: EventReader<EnemyDamagedEvent>,
    mut player_damage: EventReader<PlayerDamagedEvent>,
    mut defeats: EventReader<EnemyDefeatedEvent>,
) {
    state.elapsed_time += time.delta_secs();
    for event in enemy_damage.read() {
        state.damage_dealt += event.amount;
    }
    for event in player_damage.read() {
        state.damage_taken += event.amount;
    }
    state.enemies_defeated += defeats.read().count() as u32;
}

/// Check whether the run has ended: player dead, area cleared, or timeout.
fn headless_check_run_end(
    player: Query<&PlayerStats, With<Player>>,
    enemies: Query<(), With<Enemy>>,
    mut state: ResMut<HeadlessRunState>,
    mut combat_log: ResMut<CombatLog>,
) {
    if state.run_complete {
        return;
    }

    let alive = player.get_single().map(|s| !s.is_dead()).unwrap_or(false);

    let ending = if !alive {
        Some(RunEnding::PlayerDefeated)
    } else if enemies.is_empty() {
        Some(RunEnding::AreaCleared)
    } else if state.elapsed_time >= state.max_duration {
        Some(RunEnding::TimedOut)
    } else {
        None
    };

    let Some(ending) = ending else {
        return;
    };

    let message = match ending {
        RunEnding::PlayerDefeated => "Run ended: player defeated",
        RunEnding::AreaCleared => "Run ended: area cleared",
        RunEnding::TimedOut => "Run ended: timed out",
    };
    info!("{} after {:.1}s", message, state.elapsed_time);
    combat_log.log(CombatLogEventType::RunEvent, message.to_string());

    let final_level = player.get_single().map(|s| s.level).unwrap_or(0);
    let result = RunResult {
        enemies_defeated: state.enemies_defeated,
        damage_dealt: state.damage_dealt,
        damage_taken: state.damage_taken,
        survived: alive,
        final_level,
        run_time: state.elapsed_time,
        random_seed: state.random_seed,
    };

    if let Some(path) = state.output_path.clone() {
        save_run_log(&result, &combat_log, Path::new(&path));
    }

    state.result = Some(result);
    state.run_complete = true;
}

/// Document written next to the result for post-run analysis.
#[derive(Serialize)]
struct RunLogDocument<'a> {
    result: &'a RunResult,
    entries: &'a [crate::combat::CombatLogEntry],
}

/// Save the run summary and the full combat log as JSON.
fn save_run_log(result: &RunResult, combat_log: &CombatLog, path: &Path) {
    let document = RunLogDocument {
        result,
        entries: &combat_log.entries,
    };
    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&document)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    };
    match write() {
        Ok(()) => println!("Run complete. Log saved to: {}", path.display()),
        Err(e) => eprintln!("Failed to save run log: {}", e),
    }
}

/// Exit the app when the run is complete
fn headless_exit_on_complete(state: Res<HeadlessRunState>, mut exit: EventWriter<AppExit>) {
    if state.run_complete {
        exit.send(AppExit::Success);
    }
}

/// Run a headless simulation with the given configuration.
///
/// Blocks until the run ends and returns the result. The simulation is
/// stepped at a fixed tick independent of wall clock, so a 300 second
/// run finishes in well under a second of real time.
pub fn run_headless(config: HeadlessRunConfig) -> Result<RunResult, String> {
    config.validate()?;

    println!("Starting headless run...");
    println!("  Area: {}", config.area);
    println!("  Player level: {}", config.player_level);
    println!("  Max duration: {:.0}s", config.max_duration_secs);
    if let Some(seed) = config.seed {
        println!("  Seed: {}", seed);
    }

    let mut app = App::new();
    app
        // Minimal plugins - no window, no rendering
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::ZERO)))
        // Fixed virtual timestep for deterministic, faster-than-realtime runs
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            HEADLESS_TICK,
        )))
        // Transform and hierarchy plugins needed for entity positions
        .add_plugins(TransformPlugin)
        .add_plugins(HierarchyPlugin)
        // Definition tables from config files
        .add_plugins(SpellLibraryPlugin)
        .add_plugins(crate::entities::EnemyRegistryPlugin)
        .add_plugins(ItemsPlugin)
        // The headless run plugin
        .add_plugins(HeadlessPlugin { config });

    // Drive the schedule manually: `App::run` moves the `App` into its
    // runner and leaves this binding empty, which would lose the result.
    loop {
        app.update();
        if app.world().resource::<HeadlessRunState>().run_complete {
            break;
        }
    }

    let state = app.world().resource::<HeadlessRunState>();
    state
        .result
        .clone()
        .ok_or_else(|| "Run ended without producing a result".to_string())
}
