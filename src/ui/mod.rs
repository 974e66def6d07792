//! In-game UI
//!
//! egui overlays during play: the HUD (vitals, spell hotbar, combat log
//! feed) and the toggleable panels (inventory, quests, spell crafting,
//! character sheet). Panels mutate state through the same APIs gameplay
//! uses; failures surface as status lines instead of popups.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::combat::{CombatLog, CombatLogEventType};
use crate::entities::{Player, PlayerStats, StatKind};
use crate::items::{EquipSlot, Inventory, ItemRegistry};
use crate::quests::QuestLog;
use crate::spells::types::ComponentList;
use crate::spells::{
    available_components, compose, estimated_mana_cost, CasterProfile, ComponentValue,
    CooldownTable, SpellBook, SpellComponent,
};
use crate::states::{GameState, PanelVisibility};

/// Plugin for the in-game UI overlays
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CraftingDraft>().add_systems(
            Update,
            (hud_ui, panels_ui)
                .chain()
                .run_if(in_state(GameState::Playing)),
        );
    }
}

/// In-progress spell design in the crafting panel.
#[derive(Resource, Default)]
pub struct CraftingDraft {
    pub name: String,
    pub selected: ComponentList,
    pub status: String,
}

impl CraftingDraft {
    fn clear(&mut self) {
        self.name.clear();
        self.selected.clear();
        self.status.clear();
    }
}

const BAR_GREEN: egui::Color32 = egui::Color32::from_rgb(89, 179, 89);
const BAR_BLUE: egui::Color32 = egui::Color32::from_rgb(77, 128, 217);
const BAR_GOLD: egui::Color32 = egui::Color32::from_rgb(204, 172, 77);

fn vital_bar(ui: &mut egui::Ui, label: &str, value: f32, max: f32, color: egui::Color32) {
    let fraction = if max > 0.0 {
        (value / max).clamp(0.0, 1.0)
    } else {
        0.0
    };
    ui.add(
        egui::ProgressBar::new(fraction)
            .desired_width(180.0)
            .fill(color)
            .text(format!("{} {:.0}/{:.0}", label, value, max)),
    );
}

// ============================================================================
// HUD
// ============================================================================

fn hud_ui(
    mut contexts: EguiContexts,
    player: Query<&PlayerStats, With<Player>>,
    spellbook: Res<SpellBook>,
    cooldowns: Res<CooldownTable>,
    log: Res<CombatLog>,
) {
    let Ok(stats) = player.get_single() else {
        return;
    };
    let ctx = contexts.ctx_mut();

    egui::Area::new(egui::Id::new("hud_vitals"))
        .fixed_pos(egui::pos2(12.0, 12.0))
        .show(ctx, |ui| {
            egui::Frame::window(&ctx.style()).show(ui, |ui| {
                ui.label(
                    egui::RichText::new(format!("Level {}", stats.level))
                        .size(16.0)
                        .color(egui::Color32::from_rgb(230, 217, 191)),
                );
                vital_bar(ui, "HP", stats.health as f32, stats.max_health as f32, BAR_GREEN);
                vital_bar(ui, "MP", stats.mana, stats.max_mana, BAR_BLUE);
                vital_bar(
                    ui,
                    "XP",
                    stats.experience as f32,
                    stats.experience_to_next as f32,
                    BAR_GOLD,
                );
                ui.label(format!("Gold: {}", stats.gold));
            });
        });

    // Spell hotbar, first four known spells
    egui::Area::new(egui::Id::new("hud_hotbar"))
        .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -12.0])
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                for (index, spell) in spellbook.known_spells().iter().take(4).enumerate() {
                    let remaining = cooldowns.remaining(&spell.id);
                    let ready = remaining <= 0.0 && stats.mana >= spell.mana_cost as f32;
                    let text = if remaining > 0.0 {
                        format!("[{}] {}\n{:.1}s", index + 1, spell.name, remaining)
                    } else {
                        format!("[{}] {}\n{} MP", index + 1, spell.name, spell.mana_cost)
                    };
                    let color = if ready {
                        egui::Color32::from_rgb(217, 230, 242)
                    } else {
                        egui::Color32::from_rgb(115, 115, 128)
                    };
                    ui.add_sized(
                        egui::vec2(110.0, 44.0),
                        egui::Button::new(egui::RichText::new(text).size(13.0).color(color)),
                    );
                }
            });
        });

    // Recent combat log lines
    egui::Area::new(egui::Id::new("hud_log"))
        .anchor(egui::Align2::LEFT_BOTTOM, [12.0, -12.0])
        .show(ctx, |ui| {
            for entry in log.recent(6) {
                let color = match entry.event_type {
                    CombatLogEventType::Damage => egui::Color32::from_rgb(217, 128, 128),
                    CombatLogEventType::Healing => egui::Color32::from_rgb(128, 204, 128),
                    CombatLogEventType::LevelUp => egui::Color32::from_rgb(230, 204, 102),
                    _ => egui::Color32::from_rgb(166, 166, 179),
                };
                ui.label(
                    egui::RichText::new(format!("[{:.1}] {}", entry.timestamp, entry.message))
                        .size(13.0)
                        .color(color),
                );
            }
        });
}

// ============================================================================
// Panels
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn panels_ui(
    mut contexts: EguiContexts,
    panels: Res<PanelVisibility>,
    mut player: Query<&mut PlayerStats, With<Player>>,
    registry: Res<ItemRegistry>,
    mut inventory: ResMut<Inventory>,
    mut spellbook: ResMut<SpellBook>,
    mut quest_log: ResMut<QuestLog>,
    mut draft: ResMut<CraftingDraft>,
) {
    let Ok(mut stats) = player.get_single_mut() else {
        return;
    };
    let ctx = contexts.ctx_mut();

    if panels.inventory {
        inventory_panel(ctx, &registry, &mut inventory, &mut stats);
    }
    if panels.quests {
        quest_panel(ctx, &mut quest_log, &stats, &inventory);
    }
    if panels.crafting {
        crafting_panel(ctx, &mut draft, &stats, &mut spellbook);
    }
    if panels.character {
        character_panel(ctx, &mut stats, &inventory, &registry);
    }
}

fn inventory_panel(
    ctx: &egui::Context,
    registry: &ItemRegistry,
    inventory: &mut Inventory,
    stats: &mut PlayerStats,
) {
    egui::Window::new("Inventory")
        .default_width(340.0)
        .show(ctx, |ui| {
            ui.label(format!(
                "Weight {:.1} / 100.0   Slots {} / 30",
                inventory.total_weight(registry),
                inventory.slots().len()
            ));
            ui.separator();

            let mut use_request = None;
            let mut equip_request = None;
            for slot in inventory.slots().to_vec() {
                let Some(def) = registry.get(&slot.item_id) else {
                    continue;
                };
                ui.horizontal(|ui| {
                    ui.label(format!("{} x{}", def.name, slot.quantity));
                    if def.use_effect.is_some() && ui.small_button("Use").clicked() {
                        use_request = Some(slot.item_id.clone());
                    }
                    if def.stats.is_some() && ui.small_button("Equip").clicked() {
                        equip_request = Some(slot.item_id.clone());
                    }
                });
            }
            if let Some(id) = use_request {
                if let Err(err) = inventory.use_item(registry, &id, stats) {
                    info!("{}", err);
                }
            }
            if let Some(id) = equip_request {
                if let Err(err) = inventory.equip_item(registry, &id, stats) {
                    info!("{}", err);
                }
            }

            ui.separator();
            ui.label(egui::RichText::new("Equipped").size(15.0));
            let mut unequip_request = None;
            for slot in [
                EquipSlot::Weapon,
                EquipSlot::Armor,
                EquipSlot::Helmet,
                EquipSlot::Boots,
                EquipSlot::Accessory1,
                EquipSlot::Accessory2,
            ] {
                if let Some(id) = inventory.equipped(slot) {
                    let name = registry.get(id).map_or(id, |d| d.name.as_str());
                    let id = id.to_string();
                    ui.horizontal(|ui| {
                        ui.label(format!("{}: {}", slot.label(), name));
                        if ui.small_button("Remove").clicked() {
                            unequip_request = Some((slot, id));
                        }
                    });
                }
            }
            if let Some((slot, _)) = unequip_request {
                if let Err(err) = inventory.unequip_item(registry, slot) {
                    info!("{}", err);
                }
            }
        });
}

fn quest_panel(
    ctx: &egui::Context,
    quest_log: &mut QuestLog,
    stats: &PlayerStats,
    inventory: &Inventory,
) {
    quest_log.refresh_available(stats, inventory);

    egui::Window::new("Quests")
        .default_width(360.0)
        .show(ctx, |ui| {
            ui.label(egui::RichText::new("Active").size(15.0));
            for quest in quest_log.active().to_vec() {
                ui.label(egui::RichText::new(&quest.title).strong());
                for objective in &quest.objectives {
                    ui.label(format!(
                        "  {} ({}/{})",
                        objective.description, objective.current, objective.required
                    ));
                }
            }

            ui.separator();
            ui.label(egui::RichText::new("Available").size(15.0));
            let mut accept_request = None;
            for quest in quest_log.available().to_vec() {
                ui.horizontal(|ui| {
                    ui.label(&quest.title);
                    if ui.small_button("Accept").clicked() {
                        accept_request = Some(quest.id.clone());
                    }
                });
            }
            if let Some(id) = accept_request {
                quest_log.accept(&id);
            }

            ui.separator();
            ui.label(format!("Completed: {}", quest_log.completed().len()));
        });
}

fn crafting_panel(
    ctx: &egui::Context,
    draft: &mut CraftingDraft,
    stats: &PlayerStats,
    spellbook: &mut SpellBook,
) {
    let available = available_components(stats.level);

    egui::Window::new("Spell Crafting")
        .default_width(420.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Name:");
                ui.text_edit_singleline(&mut draft.name);
            });

            for (heading, group) in [
                ("Elements", &available.elements),
                ("Shapes", &available.shapes),
                ("Powers", &available.powers),
                ("Effects", &available.effects),
            ] {
                ui.label(egui::RichText::new(heading).size(14.0));
                ui.horizontal_wrapped(|ui| {
                    for component in group {
                        if ui.small_button(component_label(component)).clicked() {
                            draft.selected.push(*component);
                        }
                    }
                });
            }

            ui.separator();
            ui.horizontal_wrapped(|ui| {
                ui.label("Selected:");
                let mut remove_request = None;
                for (index, component) in draft.selected.iter().enumerate() {
                    if ui.small_button(component_label(component)).clicked() {
                        remove_request = Some(index);
                    }
                }
                if let Some(index) = remove_request {
                    draft.selected.remove(index);
                }
            });
            ui.label(format!(
                "Estimated mana cost: {}",
                estimated_mana_cost(&draft.selected)
            ));

            ui.horizontal(|ui| {
                if ui.button("Forge").clicked() {
                    let caster = CasterProfile {
                        level: stats.level,
                        intelligence: stats.intelligence,
                        current_mana: stats.mana as u32,
                    };
                    match compose(&draft.selected, &draft.name, &caster) {
                        Ok(spell) => {
                            draft.status = format!("Learned {}", spell.name);
                            spellbook.learn(spell);
                            draft.clear();
                        }
                        Err(err) => draft.status = err.to_string(),
                    }
                }
                if ui.button("Clear").clicked() {
                    draft.clear();
                }
            });

            if !draft.status.is_empty() {
                ui.label(
                    egui::RichText::new(&draft.status)
                        .color(egui::Color32::from_rgb(230, 204, 102)),
                );
            }
        });
}

fn component_label(component: &SpellComponent) -> String {
    match component.value {
        ComponentValue::Element(e) => e.label().to_string(),
        ComponentValue::Shape(s) => s.label().to_string(),
        ComponentValue::Power(p) => p.label().to_string(),
        ComponentValue::Effect(e) => e.label().to_string(),
    }
}

fn character_panel(
    ctx: &egui::Context,
    stats: &mut PlayerStats,
    inventory: &Inventory,
    registry: &ItemRegistry,
) {
    egui::Window::new("Character")
        .default_width(260.0)
        .show(ctx, |ui| {
            let bonuses = inventory.equipment_bonuses(registry);
            ui.label(format!("Level {}   Defense {}", stats.level, stats.defense()));
            ui.label(format!(
                "XP {} / {}",
                stats.experience, stats.experience_to_next
            ));
            ui.separator();
            ui.label(format!("Points available: {}", stats.available_points));
            for (kind, label, bonus) in [
                (StatKind::Strength, "Strength", bonuses.strength),
                (StatKind::Intelligence, "Intelligence", bonuses.intelligence),
                (StatKind::Dexterity, "Dexterity", bonuses.dexterity),
            ] {
                let base = match kind {
                    StatKind::Strength => stats.strength,
                    StatKind::Intelligence => stats.intelligence,
                    StatKind::Dexterity => stats.dexterity,
                };
                ui.horizontal(|ui| {
                    if bonus != 0 {
                        ui.label(format!("{}: {} (+{})", label, base, bonus));
                    } else {
                        ui.label(format!("{}: {}", label, base));
                    }
                    if stats.available_points > 0 && ui.small_button("+").clicked() {
                        stats.allocate_point(kind);
                    }
                });
            }
        });
}
