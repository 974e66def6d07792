//! Game state management
//!
//! Defines the core game states and transitions between them. The main
//! menu offers a fresh start or continuing from the save file; entering
//! `Playing` builds the session (world, player, inventory, spellbook,
//! quest log) and leaving it tears the session down.

use std::path::Path;

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::combat::{CastSpellEvent, CombatLog, CombatLogEventType, GameClock, TickPhase};
use crate::entities::{spawn_enemy, Enemy, EnemyRegistry, Player, PlayerStats};
use crate::items::{Inventory, ItemRegistry};
use crate::keybindings::{capture_player_input, GameAction, Keybindings, PlayerInput};
use crate::quests::QuestLog;
use crate::rng::GameRng;
use crate::save::{GameSnapshot, SaveRequest, SAVE_PATH};
use crate::spells::{CooldownTable, SpellBook, SpellLibrary};
use crate::world::{AreaId, WorldMap};

/// The core game states representing the main screens/modes of the game.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    /// Main menu - entry point
    #[default]
    MainMenu,
    /// Active play session - the live simulation
    Playing,
}

/// Which overlay panels are open during play.
#[derive(Resource, Default)]
pub struct PanelVisibility {
    pub inventory: bool,
    pub quests: bool,
    pub crafting: bool,
    pub character: bool,
}

/// Plugin for managing game states and transitions
pub struct StatesPlugin;

impl Plugin for StatesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PanelVisibility>()
            .init_resource::<Keybindings>()
            .init_resource::<PlayerInput>()
            .add_systems(Update, main_menu_ui.run_if(in_state(GameState::MainMenu)))
            .add_systems(OnEnter(GameState::Playing), setup_play_session)
            .add_systems(OnExit(GameState::Playing), cleanup_play_session)
            .add_systems(
                Update,
                (capture_player_input, toggle_panels, handle_escape_key)
                    .chain()
                    .before(TickPhase::Resources)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                Update,
                cast_selected_spell
                    .in_set(TickPhase::Movement)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

// ============================================================================
// Main Menu (egui)
// ============================================================================

fn main_menu_ui(
    mut contexts: EguiContexts,
    mut next_state: ResMut<NextState<GameState>>,
    mut exit_events: EventWriter<AppExit>,
) {
    let ctx = contexts.ctx_mut();

    let mut style = (*ctx.style()).clone();
    style.visuals.window_fill = egui::Color32::from_rgb(20, 20, 30);
    style.visuals.panel_fill = egui::Color32::from_rgb(20, 20, 30);
    ctx.set_style(style);

    let has_save = Path::new(SAVE_PATH).exists();

    egui::CentralPanel::default()
        .frame(egui::Frame::none().fill(egui::Color32::from_rgb(20, 20, 30)))
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(150.0);

                ui.heading(
                    egui::RichText::new("SPELLFORGE")
                        .size(72.0)
                        .color(egui::Color32::from_rgb(153, 187, 230)),
                );

                ui.add_space(10.0);

                ui.label(
                    egui::RichText::new("Forge spells. Clear the dungeon.")
                        .size(24.0)
                        .color(egui::Color32::from_rgb(128, 140, 153)),
                );

                ui.add_space(60.0);

                let button_size = egui::vec2(280.0, 60.0);

                if has_save {
                    if ui
                        .add_sized(
                            button_size,
                            egui::Button::new(
                                egui::RichText::new("CONTINUE")
                                    .size(28.0)
                                    .color(egui::Color32::from_rgb(217, 230, 242)),
                            ),
                        )
                        .clicked()
                    {
                        info!("Continue pressed - resuming saved session");
                        next_state.set(GameState::Playing);
                    }

                    ui.add_space(10.0);
                }

                if ui
                    .add_sized(
                        button_size,
                        egui::Button::new(
                            egui::RichText::new("NEW GAME")
                                .size(28.0)
                                .color(egui::Color32::from_rgb(217, 230, 242)),
                        ),
                    )
                    .clicked()
                {
                    info!("New game pressed - discarding save");
                    if has_save {
                        if let Err(e) = std::fs::remove_file(SAVE_PATH) {
                            warn!("Could not remove old save: {}", e);
                        }
                    }
                    next_state.set(GameState::Playing);
                }

                ui.add_space(10.0);

                if ui
                    .add_sized(
                        button_size,
                        egui::Button::new(
                            egui::RichText::new("EXIT")
                                .size(28.0)
                                .color(egui::Color32::from_rgb(217, 230, 242)),
                        ),
                    )
                    .clicked()
                {
                    exit_events.send(AppExit::Success);
                }
            });

            ui.with_layout(egui::Layout::bottom_up(egui::Align::RIGHT), |ui| {
                ui.add_space(20.0);
                ui.horizontal(|ui| {
                    ui.add_space(20.0);
                    ui.label(
                        egui::RichText::new("v0.1.0 - Prototype")
                            .size(14.0)
                            .color(egui::Color32::from_rgb(102, 102, 102)),
                    );
                });
            });
        });
}

// ============================================================================
// Play session lifecycle
// ============================================================================

fn setup_play_session(
    mut commands: Commands,
    mut rng: ResMut<GameRng>,
    enemy_registry: Res<EnemyRegistry>,
    items: Res<ItemRegistry>,
    library: Res<SpellLibrary>,
    mut log: ResMut<CombatLog>,
    mut clock: ResMut<GameClock>,
) {
    log.clear();
    clock.elapsed = 0.0;

    let mut world = WorldMap::new(&mut rng);
    let snapshot = GameSnapshot::load_from(Path::new(SAVE_PATH));

    let (stats, position, inventory, spellbook, quests) = match snapshot {
        Some(s) => {
            world.activate(s.area, &mut rng);
            if s.area == AreaId::Dungeon {
                world.set_current_level(s.dungeon_level, &mut rng);
            }
            info!("Resuming in {} at level {}", s.area.name(), s.stats.level);
            (
                s.stats,
                Vec2::new(s.position[0], s.position[1]),
                s.inventory,
                s.spellbook,
                s.quests,
            )
        }
        None => (
            PlayerStats::default(),
            world.current().start_position,
            Inventory::with_starting_items(&items),
            SpellBook::with_starting_spells(&library),
            QuestLog::with_default_quests(),
        ),
    };

    for spawn in world.current().spawns.clone() {
        spawn_enemy(
            &mut commands,
            &enemy_registry,
            &spawn.archetype,
            spawn.position,
        );
    }

    commands.spawn((
        Player,
        stats,
        Sprite::from_color(Color::srgb(0.3, 0.5, 0.9), Vec2::splat(24.0)),
        Transform::from_translation(position.extend(1.0)),
    ));

    log.log(
        CombatLogEventType::RunEvent,
        format!("Entered {}", world.current_id().name()),
    );

    commands.insert_resource(world);
    commands.insert_resource(inventory);
    commands.insert_resource(spellbook);
    commands.insert_resource(quests);
    commands.insert_resource(CooldownTable::default());
}

fn cleanup_play_session(
    mut commands: Commands,
    players: Query<Entity, With<Player>>,
    enemies: Query<Entity, With<Enemy>>,
    mut panels: ResMut<PanelVisibility>,
    mut input: ResMut<PlayerInput>,
) {
    for entity in players.iter().chain(enemies.iter()) {
        commands.entity(entity).despawn_recursive();
    }
    *panels = PanelVisibility::default();
    input.clear();
}

// ============================================================================
// In-session input handling
// ============================================================================

fn toggle_panels(
    keyboard: Res<ButtonInput<KeyCode>>,
    bindings: Res<Keybindings>,
    mut panels: ResMut<PanelVisibility>,
) {
    if bindings.action_just_pressed(GameAction::ToggleInventory, &keyboard) {
        panels.inventory = !panels.inventory;
    }
    if bindings.action_just_pressed(GameAction::ToggleQuests, &keyboard) {
        panels.quests = !panels.quests;
    }
    if bindings.action_just_pressed(GameAction::ToggleSpellCrafting, &keyboard) {
        panels.crafting = !panels.crafting;
    }
    if bindings.action_just_pressed(GameAction::ToggleCharacter, &keyboard) {
        panels.character = !panels.character;
    }
}

/// ESC closes open panels first, then saves and returns to the menu.
fn handle_escape_key(
    keyboard: Res<ButtonInput<KeyCode>>,
    bindings: Res<Keybindings>,
    mut panels: ResMut<PanelVisibility>,
    mut save_events: EventWriter<SaveRequest>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if !bindings.action_just_pressed(GameAction::Back, &keyboard) {
        return;
    }
    if panels.inventory || panels.quests || panels.crafting || panels.character {
        *panels = PanelVisibility::default();
        return;
    }
    save_events.send(SaveRequest);
    next_state.set(GameState::MainMenu);
}

/// Turns a pressed spell slot into a cast at the nearest enemy.
fn cast_selected_spell(
    input: Res<PlayerInput>,
    spellbook: Res<SpellBook>,
    player: Query<&Transform, With<Player>>,
    enemies: Query<&Transform, With<Enemy>>,
    mut casts: EventWriter<CastSpellEvent>,
) {
    let Some(slot) = input.cast_slot else {
        return;
    };
    let Some(spell) = spellbook.known_spells().get(slot) else {
        return;
    };
    let Ok(player_transform) = player.get_single() else {
        return;
    };
    let origin = player_transform.translation.truncate();

    let target = enemies
        .iter()
        .map(|t| t.translation.truncate())
        .min_by(|a, b| {
            a.distance_squared(origin)
                .partial_cmp(&b.distance_squared(origin))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or(origin);

    casts.send(CastSpellEvent {
        spell_id: spell.id.clone(),
        target,
    });
}
