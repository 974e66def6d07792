//! Core combat systems
//!
//! Enemy AI is a two-threshold reactive policy: approach inside the
//! engagement radius, swing inside the melee radius. There is no
//! pathfinding. All variance flows through `GameRng` so seeded runs are
//! reproducible.

use bevy::prelude::*;

use super::events::{
    AreaDamageEvent, CastSpellEvent, EnemyDamagedEvent, EnemyDefeatedEvent, PlayerDamagedEvent,
    PlayerDefeatedEvent,
};
use super::log::{CombatLog, CombatLogEventType};
use super::GameClock;
use crate::entities::{Enemy, Player, PlayerStats};
use crate::items::{Inventory, ItemRegistry};
use crate::keybindings::PlayerInput;
use crate::quests::{ObjectiveKind, QuestProgressEvent};
use crate::rng::GameRng;
use crate::spells::{CooldownTable, EffectKind, SpellBook};

/// Enemies start chasing the player inside this distance.
pub const ENGAGEMENT_RADIUS: f32 = 200.0;

/// Enemies swing at the player inside this distance.
pub const MELEE_RADIUS: f32 = 50.0;

/// The player's melee attack reaches this far.
pub const PLAYER_MELEE_RANGE: f32 = 60.0;

/// Impact radius for spell damage effects.
pub const SPELL_IMPACT_RADIUS: f32 = 50.0;

/// Loot drop chance per loot-table entry.
pub const LOOT_DROP_CHANCE: f32 = 0.3;

/// Movement-slow debuff applied by ice spells and the like.
#[derive(Component, Debug, Clone)]
pub struct Slowed {
    /// Slow strength as a percentage (25 = 25% slower).
    pub percent: i32,
    /// Seconds until the debuff wears off.
    pub remaining: f32,
}

impl Slowed {
    pub fn speed_multiplier(&self) -> f32 {
        (1.0 - self.percent as f32 / 100.0).max(0.0)
    }
}

/// Mitigated damage: attack power minus defense, floored at 1, with
/// uniform variance in [0.8, 1.2], truncated to an integer.
pub fn mitigated_damage(power: i32, defense: i32, rng: &mut GameRng) -> i32 {
    let reduced = (power - defense).max(1) as f32;
    (reduced * rng.random_range(0.8, 1.2)).floor() as i32
}

/// Advance the shared game clock and keep the combat log's time in sync.
pub fn tick_game_clock(
    time: Res<Time>,
    mut clock: ResMut<GameClock>,
    mut log: ResMut<CombatLog>,
) {
    clock.elapsed += time.delta_secs();
    log.game_time = clock.elapsed;
}

/// Decay spell cooldowns.
pub fn tick_cooldowns(time: Res<Time>, mut cooldowns: ResMut<CooldownTable>) {
    cooldowns.tick(time.delta_secs());
}

/// Tick slow debuffs, removing them when they expire.
pub fn tick_slow_debuffs(
    time: Res<Time>,
    mut commands: Commands,
    mut slowed: Query<(Entity, &mut Slowed)>,
) {
    for (entity, mut slow) in &mut slowed {
        slow.remaining -= time.delta_secs();
        if slow.remaining <= 0.0 {
            commands.entity(entity).remove::<Slowed>();
        }
    }
}

/// Move engaged enemies toward the player.
pub fn enemy_approach(
    time: Res<Time>,
    player: Query<&Transform, (With<Player>, Without<Enemy>)>,
    mut enemies: Query<(&Enemy, &mut Transform, Option<&Slowed>), Without<Player>>,
) {
    let Ok(player_transform) = player.get_single() else {
        return;
    };
    let player_pos = player_transform.translation.truncate();

    for (enemy, mut transform, slowed) in &mut enemies {
        let pos = transform.translation.truncate();
        let to_player = player_pos - pos;
        let distance = to_player.length();
        if distance >= ENGAGEMENT_RADIUS || distance == 0.0 {
            continue;
        }

        let mut speed = enemy.move_speed();
        if let Some(slow) = slowed {
            speed *= slow.speed_multiplier();
        }
        let step = (to_player / distance) * speed * time.delta_secs();
        transform.translation.x += step.x;
        transform.translation.y += step.y;
    }
}

/// Enemies in melee range attack the player when their cooldown allows.
pub fn enemy_attacks(
    clock: Res<GameClock>,
    mut rng: ResMut<GameRng>,
    mut player: Query<(&Transform, &mut PlayerStats), With<Player>>,
    mut enemies: Query<(&mut Enemy, &Transform), Without<Player>>,
    mut damaged: EventWriter<PlayerDamagedEvent>,
    mut log: ResMut<CombatLog>,
) {
    let Ok((player_transform, mut stats)) = player.get_single_mut() else {
        return;
    };
    let player_pos = player_transform.translation.truncate();

    for (mut enemy, transform) in &mut enemies {
        let distance = transform.translation.truncate().distance(player_pos);
        if distance >= MELEE_RADIUS || !enemy.can_attack(clock.elapsed) {
            continue;
        }

        let damage = mitigated_damage(enemy.strength as i32, stats.defense(), &mut rng);
        stats.take_damage(damage);
        enemy.last_attack_time = clock.elapsed;

        log.log(
            CombatLogEventType::Damage,
            format!("{} hits you for {} damage", enemy.name, damage),
        );
        damaged.send(PlayerDamagedEvent {
            amount: damage,
            source: enemy.name.clone(),
        });
    }
}

/// While the attack input is held, the player swings at every enemy in
/// melee reach.
pub fn player_melee_attack(
    input: Res<PlayerInput>,
    mut rng: ResMut<GameRng>,
    player: Query<(&Transform, &PlayerStats), With<Player>>,
    mut enemies: Query<(Entity, &Transform, &mut Enemy), Without<Player>>,
    mut damaged: EventWriter<EnemyDamagedEvent>,
    mut log: ResMut<CombatLog>,
) {
    if !input.attack_held {
        return;
    }
    let Ok((player_transform, stats)) = player.get_single() else {
        return;
    };
    let player_pos = player_transform.translation.truncate();

    for (entity, transform, mut enemy) in &mut enemies {
        let distance = transform.translation.truncate().distance(player_pos);
        if distance > PLAYER_MELEE_RANGE {
            continue;
        }

        let damage = mitigated_damage(stats.strength as i32, enemy.defense(), &mut rng);
        enemy.take_damage(damage);

        log.log(
            CombatLogEventType::Damage,
            format!("You hit {} for {} damage", enemy.name, damage),
        );
        damaged.send(EnemyDamagedEvent {
            target: entity,
            amount: damage,
            source: "melee".to_string(),
        });
    }
}

/// Resolve cast requests against the spell book and the cast gate, then
/// apply the spell's effects.
#[allow(clippy::too_many_arguments)]
pub fn process_cast_events(
    mut casts: EventReader<CastSpellEvent>,
    mut commands: Commands,
    book: Res<SpellBook>,
    mut cooldowns: ResMut<CooldownTable>,
    mut player: Query<&mut PlayerStats, With<Player>>,
    enemies: Query<(Entity, &Transform), With<Enemy>>,
    mut area_damage: EventWriter<AreaDamageEvent>,
    mut log: ResMut<CombatLog>,
) {
    let Ok(mut stats) = player.get_single_mut() else {
        return;
    };

    for cast in casts.read() {
        let Some(spell) = book.get(&cast.spell_id) else {
            warn!("Cast of unknown spell '{}' ignored", cast.spell_id);
            continue;
        };

        if let Err(err) = cooldowns.cast(spell, &mut stats.mana) {
            info!("Cannot cast {}: {}", spell.name, err);
            continue;
        }

        log.log(
            CombatLogEventType::SpellCast,
            format!("You cast {}", spell.name),
        );

        for effect in &spell.effects {
            match effect.kind {
                EffectKind::Damage => {
                    area_damage.send(AreaDamageEvent {
                        center: cast.target,
                        radius: SPELL_IMPACT_RADIUS,
                        power: effect.magnitude,
                        source: spell.name.clone(),
                    });
                }
                EffectKind::Healing => {
                    stats.heal(effect.magnitude);
                    log.log(
                        CombatLogEventType::Healing,
                        format!("{} restores {} health", spell.name, effect.magnitude),
                    );
                }
                EffectKind::Debuff => {
                    for (entity, transform) in &enemies {
                        let distance =
                            transform.translation.truncate().distance(cast.target);
                        if distance <= SPELL_IMPACT_RADIUS {
                            commands.entity(entity).insert(Slowed {
                                percent: effect.magnitude,
                                remaining: effect.duration.unwrap_or(5.0),
                            });
                            log.log(
                                CombatLogEventType::DebuffApplied,
                                format!("{} slows a target", spell.name),
                            );
                        }
                    }
                }
                EffectKind::Buff | EffectKind::Utility => {
                    log.log(
                        CombatLogEventType::SpellCast,
                        format!("{} takes effect", spell.name),
                    );
                }
            }
        }
    }
}

/// Apply mitigated damage to every enemy inside each impact circle.
pub fn apply_area_damage(
    mut events: EventReader<AreaDamageEvent>,
    mut rng: ResMut<GameRng>,
    mut enemies: Query<(Entity, &Transform, &mut Enemy)>,
    mut damaged: EventWriter<EnemyDamagedEvent>,
    mut log: ResMut<CombatLog>,
) {
    for event in events.read() {
        for (entity, transform, mut enemy) in &mut enemies {
            let distance = transform.translation.truncate().distance(event.center);
            if distance > event.radius {
                continue;
            }

            let damage = mitigated_damage(event.power, enemy.defense(), &mut rng);
            enemy.take_damage(damage);

            log.log(
                CombatLogEventType::Damage,
                format!("{} hits {} for {} damage", event.source, enemy.name, damage),
            );
            damaged.send(EnemyDamagedEvent {
                target: entity,
                amount: damage,
                source: event.source.clone(),
            });
        }
    }
}

/// Remove defeated enemies after distributing rewards. Despawning the
/// entity here guarantees rewards are paid exactly once.
#[allow(clippy::too_many_arguments)]
pub fn process_defeats(
    mut commands: Commands,
    mut rng: ResMut<GameRng>,
    enemies: Query<(Entity, &Enemy)>,
    mut player: Query<&mut PlayerStats, With<Player>>,
    items: Res<ItemRegistry>,
    mut inventory: ResMut<Inventory>,
    mut defeated: EventWriter<EnemyDefeatedEvent>,
    mut progress: EventWriter<QuestProgressEvent>,
    mut log: ResMut<CombatLog>,
) {
    let Ok(mut stats) = player.get_single_mut() else {
        return;
    };

    for (entity, enemy) in &enemies {
        if !enemy.is_dead() {
            continue;
        }

        let levels = stats.gain_experience(enemy.experience_reward);
        stats.add_gold(enemy.gold_reward);

        log.log(
            CombatLogEventType::Defeat,
            format!(
                "Defeated {}! Gained {} XP and {} gold",
                enemy.name, enemy.experience_reward, enemy.gold_reward
            ),
        );
        if levels > 0 {
            log.log(
                CombatLogEventType::LevelUp,
                format!("Level up! Now level {}", stats.level),
            );
        }

        for loot_id in &enemy.loot_table {
            if !rng.roll(LOOT_DROP_CHANCE) {
                continue;
            }
            match inventory.add_item(&items, loot_id, 1) {
                Ok(()) => {
                    log.log(
                        CombatLogEventType::Loot,
                        format!("{} dropped {}", enemy.name, loot_id),
                    );
                    progress.send(QuestProgressEvent {
                        kind: ObjectiveKind::Collect,
                        target: loot_id.clone(),
                        amount: 1,
                    });
                }
                Err(err) => info!("Dropped loot '{}' lost: {}", loot_id, err),
            }
        }

        defeated.send(EnemyDefeatedEvent {
            archetype: enemy.archetype.clone(),
            name: enemy.name.clone(),
            experience: enemy.experience_reward,
            gold: enemy.gold_reward,
        });
        progress.send(QuestProgressEvent {
            kind: ObjectiveKind::Kill,
            target: enemy.archetype.clone(),
            amount: 1,
        });

        commands.entity(entity).despawn();
    }
}

/// Fire a single defeat event when the player's health reaches zero.
pub fn check_player_defeat(
    player: Query<&PlayerStats, With<Player>>,
    mut announced: Local<bool>,
    mut defeated: EventWriter<PlayerDefeatedEvent>,
    mut log: ResMut<CombatLog>,
) {
    let Ok(stats) = player.get_single() else {
        return;
    };
    if stats.is_dead() {
        if !*announced {
            *announced = true;
            log.log(CombatLogEventType::RunEvent, "You have died".to_string());
            defeated.send(PlayerDefeatedEvent);
        }
    } else {
        *announced = false;
    }
}
